// vim: set ai et ts=4 sw=4 sts=4:
pub mod trim;
pub mod push;
pub mod brute;

use super::error::Error;
use super::grid::Cell;

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum Speed {
    Fast,
    Slow,
}

/// A constraint solver for a single line. Implementations receive a trimmed
/// line and its (possibly edge-adjusted) hints, and either return a revised
/// line, report no progress, or prove a contradiction.
pub trait LineSolver {
    fn name(&self) -> &'static str;
    fn speed(&self) -> Speed;

    /// `Ok(Some(line))` with at least one newly determined cell,
    /// `Ok(None)` when nothing new could be deduced,
    /// `Err(Contradiction)` when no hint-consistent completion exists.
    fn solve_line(&self, line: &[Cell], hints: &[usize]) -> Result<Option<Vec<Cell>>, Error>;
}

/// All line solvers, fastest first. The strategy exhausts cheap propagation
/// before paying for the combinatorial solver again.
pub fn all_solvers() -> Vec<Box<dyn LineSolver>> {
    vec![
        Box::new(push::PushSolver),
        Box::new(brute::BruteForceSolver),
    ]
}
