// vim: set ai et ts=4 sw=4 sts=4:
use std::fmt;
use std::convert::TryFrom;
use std::rc::Rc;
use std::cell::RefCell;

use super::error::Error;
use super::util::{Direction, Direction::*};

/// Tri-state value of a single square.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum Cell {
    Unknown,
    Filled,
    Empty,
}

impl Cell {
    /// External tri-state encoding: 1 = filled, 0 = unknown, -1 = empty.
    pub fn to_i8(self) -> i8 {
        match self {
            Cell::Filled  =>  1,
            Cell::Unknown =>  0,
            Cell::Empty   => -1,
        }
    }
    pub fn fmt_visual(self) -> &'static str {
        match self {
            Cell::Filled  => "\u{25A0}",
            Cell::Empty   => " ",
            Cell::Unknown => ".",
        }
    }
}

impl TryFrom<i8> for Cell {
    type Error = Error;
    fn try_from(value: i8) -> Result<Self, Error> {
        match value {
             1 => Ok(Cell::Filled),
             0 => Ok(Cell::Unknown),
            -1 => Ok(Cell::Empty),
             _ => Err(Error::config(format!("not a valid cell value: {}", value))),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.fmt_visual())
    }
}

pub fn cells_from_i8(values: &[i8]) -> Result<Vec<Cell>, Error> {
    values.iter().map(|&v| Cell::try_from(v)).collect()
}

// ------------------------------------------------

/// The puzzle board: a single flat, row-major array of cells. Row and
/// column views index into this one array; the storage is never duplicated.
#[derive(Clone)]
pub struct Grid {
    width:  usize,
    height: usize,
    cells:  Vec<Cell>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Grid {
            width,
            height,
            cells: vec![Cell::Unknown; width * height],
        }
    }
    pub fn with_cells(width: usize, height: usize, cells: Vec<Cell>) -> Self {
        assert_eq!(cells.len(), width * height);
        Grid { width, height, cells }
    }

    pub fn width(&self) -> usize  { self.width }
    pub fn height(&self) -> usize { self.height }

    pub fn get(&self, x: usize, y: usize) -> Cell {
        self.cells[y * self.width + x]
    }
    pub fn set(&mut self, x: usize, y: usize, value: Cell) {
        self.cells[y * self.width + x] = value;
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
    pub fn unknown_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == Cell::Unknown).count()
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grid(w={}, h={})", self.width(), self.height())
    }
}

// ------------------------------------------------

/// Live view of one row or column. Holds a reference to the shared grid and
/// maps line-local offsets onto it; a write through any view is immediately
/// visible through every other view.
#[derive(Debug, Clone)]
pub struct LineView {
    pub direction: Direction,
    pub index:     usize,
    pub length:    usize,
    grid:          Rc<RefCell<Grid>>,
}

impl LineView {
    pub fn new(grid: &Rc<RefCell<Grid>>, direction: Direction, index: usize) -> Self {
        let length = match direction {
            Horizontal => grid.borrow().width(),
            Vertical   => grid.borrow().height(),
        };
        LineView {
            direction,
            index,
            length,
            grid: Rc::clone(grid),
        }
    }

    fn cell_index(&self, at: usize) -> (usize, usize) {
        match self.direction {
            Horizontal => (at, self.index),
            Vertical   => (self.index, at),
        }
    }

    pub fn get(&self, at: usize) -> Cell {
        let (x, y) = self.cell_index(at);
        self.grid.borrow().get(x, y)
    }
    pub fn set(&self, at: usize, value: Cell) {
        let (x, y) = self.cell_index(at);
        self.grid.borrow_mut().set(x, y, value);
    }

    pub fn to_vec(&self) -> Vec<Cell> {
        (0..self.length).map(|at| self.get(at)).collect()
    }
    pub fn unknown_count(&self) -> usize {
        (0..self.length).filter(|&at| self.get(at) == Cell::Unknown).count()
    }

    /// Writes back a solved line, returning the offsets whose value actually
    /// changed. Only differing cells are touched.
    pub fn write(&self, new_line: &[Cell]) -> Vec<usize> {
        assert_eq!(new_line.len(), self.length);
        let mut changed = Vec::new();
        for at in 0..self.length {
            if self.get(at) != new_line[at] {
                self.set(at, new_line[at]);
                changed.push(at);
            }
        }
        changed
    }
}
