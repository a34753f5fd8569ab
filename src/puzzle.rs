// vim: set ai et ts=4 sw=4 sts=4:
use std::fmt;
use std::convert::TryFrom;
use std::rc::Rc;
use std::cell::RefCell;
use yaml_rust::Yaml;
use yaml_rust::yaml::Hash;

use super::error::Error;
use super::grid::{Grid, Cell, LineView, cells_from_i8};
use super::util::{Direction::*, run_lengths};

/// Canonical puzzle state: the hint lists plus one shared grid behind the
/// row and column views. Hints are immutable after construction and shared
/// by reference with trial branches; every branch owns its own grid.
#[derive(Debug, Clone)]
pub struct Puzzle {
    row_hints: Rc<Vec<Vec<usize>>>,
    col_hints: Rc<Vec<Vec<usize>>>,
    grid:      Rc<RefCell<Grid>>,
}

impl Puzzle {
    pub fn new(row_hints: Vec<Vec<usize>>, col_hints: Vec<Vec<usize>>)
        -> Result<Self, Error>
    {
        Self::build(row_hints, col_hints, None)
    }

    /// Constructs a puzzle with explicit initial content in the external
    /// tri-state encoding (1 = filled, 0 = unknown, -1 = empty).
    pub fn with_content(row_hints: Vec<Vec<usize>>,
                        col_hints: Vec<Vec<usize>>,
                        content: &[i8])
        -> Result<Self, Error>
    {
        Self::build(row_hints, col_hints, Some(cells_from_i8(content)?))
    }

    fn build(row_hints: Vec<Vec<usize>>,
             col_hints: Vec<Vec<usize>>,
             content: Option<Vec<Cell>>)
        -> Result<Self, Error>
    {
        let row_hints = Self::clean_hints(row_hints)?;
        let col_hints = Self::clean_hints(col_hints)?;
        let height = row_hints.len();
        let width = col_hints.len();

        let row_sum: usize = row_hints.iter().flatten().sum();
        let col_sum: usize = col_hints.iter().flatten().sum();
        if row_sum != col_sum {
            return Err(Error::config(format!(
                "row hints sum to {} but column hints sum to {}", row_sum, col_sum)));
        }

        let grid = match content {
            None        => Grid::new(width, height),
            Some(cells) => {
                if cells.len() != width * height {
                    return Err(Error::config(format!(
                        "content holds {} cells, expected {}", cells.len(), width * height)));
                }
                Grid::with_cells(width, height, cells)
            }
        };
        Ok(Puzzle {
            row_hints: Rc::new(row_hints),
            col_hints: Rc::new(col_hints),
            grid:      Rc::new(RefCell::new(grid)),
        })
    }

    // a lone 0 means "no runs in this line"; zeros anywhere else are invalid
    fn clean_hints(hints: Vec<Vec<usize>>) -> Result<Vec<Vec<usize>>, Error> {
        hints.into_iter()
             .map(|h| {
                 if h == [0] {
                     return Ok(Vec::new());
                 }
                 if h.iter().any(|&x| x == 0) {
                     return Err(Error::config("hint of length 0 in a multi-hint line"));
                 }
                 Ok(h)
             })
             .collect()
    }

    pub fn width(&self) -> usize  { self.grid.borrow().width() }
    pub fn height(&self) -> usize { self.grid.borrow().height() }

    pub fn row_hints(&self) -> &[Vec<usize>] { &self.row_hints }
    pub fn col_hints(&self) -> &[Vec<usize>] { &self.col_hints }

    pub fn row(&self, index: usize) -> LineView {
        LineView::new(&self.grid, Horizontal, index)
    }
    pub fn column(&self, index: usize) -> LineView {
        LineView::new(&self.grid, Vertical, index)
    }

    /// Immutable point-in-time copy of the grid contents.
    pub fn snapshot(&self) -> Vec<Cell> {
        self.grid.borrow().cells().to_vec()
    }

    /// Copies another puzzle's state into this one. Used to adopt the
    /// result of a successful trial branch.
    pub fn import(&self, other: &Puzzle) {
        let snapshot = other.snapshot();
        let mut grid = self.grid.borrow_mut();
        assert_eq!(snapshot.len(), grid.cells().len());
        *grid = Grid::with_cells(grid.width(), grid.height(), snapshot);
    }

    /// An independent clone for a trial branch: the hint lists are shared
    /// by reference, the grid is seeded from the given snapshot.
    pub fn branch_with_content(&self, content: Vec<Cell>) -> Puzzle {
        let grid = Grid::with_cells(self.width(), self.height(), content);
        Puzzle {
            row_hints: Rc::clone(&self.row_hints),
            col_hints: Rc::clone(&self.col_hints),
            grid:      Rc::new(RefCell::new(grid)),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.grid.borrow().cells().iter().all(|&c| c != Cell::Unknown)
    }

    pub fn is_solved(&self) -> bool {
        if !self.is_finished() {
            return false;
        }
        let line_ok = |view: &LineView, hints: &[usize]| run_lengths(&view.to_vec()) == hints;
        (0..self.height()).all(|y| line_ok(&self.row(y), &self.row_hints[y]))
            && (0..self.width()).all(|x| line_ok(&self.column(x), &self.col_hints[x]))
    }

    pub fn unknown_count(&self) -> usize {
        self.grid.borrow().unknown_count()
    }
}

// YAML input and output. `rows` and `cols` are lists whose entries are
// either a whitespace-separated string ("1 4"), a single integer, or null
// for an empty line; `content` is an optional flat list of tri-state
// integers.
impl Puzzle {
    pub fn from_yaml(doc: &Yaml) -> Result<Puzzle, Error> {
        let row_hints = Self::parse_hint_list(&doc["rows"], "rows")?;
        let cols = match &doc["cols"] {
            Yaml::BadValue => &doc["columns"],
            other          => other,
        };
        let col_hints = Self::parse_hint_list(cols, "cols")?;
        match &doc["content"] {
            Yaml::BadValue => Self::build(row_hints, col_hints, None),
            content        => {
                let values = content.as_vec()
                    .ok_or_else(|| Error::config("content must be a list"))?
                    .iter()
                    .map(|v| v.as_i64()
                              .and_then(|x| i8::try_from(x).ok())
                              .ok_or_else(|| Error::config("content must hold integers")))
                    .collect::<Result<Vec<i8>, Error>>()?;
                Self::build(row_hints, col_hints, Some(cells_from_i8(&values)?))
            }
        }
    }

    fn parse_hint_list(input: &Yaml, what: &str) -> Result<Vec<Vec<usize>>, Error> {
        let list = input.as_vec()
            .ok_or_else(|| Error::config(format!("missing or malformed '{}' list", what)))?;
        list.iter()
            .map(|entry| Self::parse_hints(entry))
            .collect()
    }

    fn parse_hints(input: &Yaml) -> Result<Vec<usize>, Error> {
        match input {
            Yaml::String(s)  => s.split_whitespace()
                                 .map(|part| part.parse::<usize>()
                                                 .map_err(|_| Error::config(format!("bad hint value '{}'", part))))
                                 .collect(),
            Yaml::Integer(i) => {
                let value = usize::try_from(*i)
                    .map_err(|_| Error::config(format!("bad hint value '{}'", i)))?;
                Ok(vec![value])
            }
            Yaml::Null       => Ok(Vec::new()),
            // the list form to_yaml emits
            Yaml::Array(items) => items.iter()
                                       .map(|item| item.as_i64()
                                                       .and_then(|x| usize::try_from(x).ok())
                                                       .ok_or_else(|| Error::config(format!("bad hint value {:?}", item))))
                                       .collect(),
            _ => Err(Error::config(format!("unexpected hint entry: {:?}", input))),
        }
    }

    /// Serialization form `{columns, rows, content}` for persistence and
    /// external rendering.
    pub fn to_yaml(&self) -> Yaml {
        let hint_list = |hints: &[Vec<usize>]| {
            Yaml::Array(hints.iter()
                             .map(|h| Yaml::Array(h.iter()
                                                   .map(|&x| Yaml::Integer(x as i64))
                                                   .collect()))
                             .collect())
        };
        let content = Yaml::Array(self.snapshot()
                                      .iter()
                                      .map(|c| Yaml::Integer(c.to_i8() as i64))
                                      .collect());
        let mut hash = Hash::new();
        hash.insert(Yaml::String("columns".to_string()), hint_list(&self.col_hints));
        hash.insert(Yaml::String("rows".to_string()), hint_list(&self.row_hints));
        hash.insert(Yaml::String("content".to_string()), content);
        Yaml::Hash(hash)
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", super::render::ascii(self, false))
    }
}
