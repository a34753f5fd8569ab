// vim: set ai et ts=4 sw=4 sts=4:
pub mod util;
pub mod error;
pub mod grid;
pub mod puzzle;
pub mod solver;
pub mod strategy;
pub mod render;

pub use error::Error;
pub use grid::Cell;
pub use puzzle::Puzzle;
pub use strategy::{SearchOptions, SolveEvent, SolveOutcome, Strategy};
