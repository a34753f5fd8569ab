// vim: set ai et ts=4 sw=4 sts=4:
use crate::error::Error;
use crate::grid::Cell;
use super::{LineSolver, Speed};

/// Interval-overlap constraint propagation on one line: each hint block's
/// leftmost and rightmost feasible start is computed by pushing the blocks
/// from either edge; a cell inside the overlap of both placements of a
/// block is Filled, a cell no block can ever reach is Empty.
pub struct PushSolver;

impl LineSolver for PushSolver {
    fn name(&self) -> &'static str { "push" }
    fn speed(&self) -> Speed { Speed::Fast }

    fn solve_line(&self, line: &[Cell], hints: &[usize]) -> Result<Option<Vec<Cell>>, Error> {
        let deduced = deduce(line, hints)?;
        if deduced == line {
            return Ok(None);
        }
        Ok(Some(deduced))
    }
}

/// Leftmost feasible placement of all hint blocks, in order, consistent
/// with the existing marks: no block covers an Empty cell, every Filled
/// cell is covered, neighbouring blocks are separated by at least one cell.
/// Returns the line with the blocks drawn in, or None if no placement
/// exists. Also serves as the feasibility oracle for the gap distributor.
pub fn push_left(line: &[Cell], hints: &[usize]) -> Option<Vec<Cell>> {
    let starts = leftmost_starts(line, hints)?;
    let mut result = line.to_vec();
    for (&start, &length) in starts.iter().zip(hints.iter()) {
        for cell in &mut result[start..start+length] {
            *cell = Cell::Filled;
        }
    }
    Some(result)
}

/// Start offsets of the leftmost feasible placement, or None.
fn leftmost_starts(line: &[Cell], hints: &[usize]) -> Option<Vec<usize>> {
    fit(line, hints, 0)
}

// Greedy placement with backtracking: try the first block as far left as
// possible, recurse for the rest, and shift right on failure. The first
// block can never start beyond the first Filled cell at or after `pos`,
// since blocks are placed in order and every Filled cell must be covered.
fn fit(line: &[Cell], hints: &[usize], pos: usize) -> Option<Vec<usize>> {
    let pos = pos.min(line.len());
    let (&length, rest) = match hints.split_first() {
        None => {
            if line[pos..].iter().any(|&c| c == Cell::Filled) {
                return None;
            }
            return Some(Vec::new());
        }
        Some(split) => split,
    };

    let limit = line[pos..].iter()
                           .position(|&c| c == Cell::Filled)
                           .map(|offset| pos + offset)
                           .unwrap_or(line.len());
    let mut start = pos;
    while start <= limit && start + length <= line.len() {
        let block_fits = line[start..start+length].iter().all(|&c| c != Cell::Empty)
            && (start + length == line.len() || line[start+length] != Cell::Filled);
        if block_fits {
            if let Some(mut rest_starts) = fit(line, rest, start + length + 1) {
                rest_starts.insert(0, start);
                return Some(rest_starts);
            }
        }
        start += 1;
    }
    None
}

/// Full interval deduction. Returns the revised line (possibly identical);
/// Err when not even a leftmost placement exists.
pub(crate) fn deduce(line: &[Cell], hints: &[usize]) -> Result<Vec<Cell>, Error> {
    let left = leftmost_starts(line, hints)
        .ok_or_else(|| no_placement(line, hints))?;

    // rightmost placement: push the mirrored line, then mirror back
    let reversed: Vec<Cell> = line.iter().rev().cloned().collect();
    let rhints: Vec<usize> = hints.iter().rev().cloned().collect();
    let rstarts = leftmost_starts(&reversed, &rhints)
        .ok_or_else(|| no_placement(line, hints))?;
    let right: Vec<usize> = hints.iter()
                                 .enumerate()
                                 .map(|(i, &length)| {
                                     let mirrored = rstarts[hints.len() - 1 - i];
                                     line.len() - mirrored - length
                                 })
                                 .collect();

    let mut result = line.to_vec();
    for i in 0..hints.len() {
        // overlap of the leftmost and rightmost placements is forced
        for at in right[i]..left[i] + hints[i] {
            result[at] = Cell::Filled;
        }
    }
    for at in 0..line.len() {
        // a cell outside every block's reachable range can never be covered
        let coverable = (0..hints.len()).any(|i| left[i] <= at && at < right[i] + hints[i]);
        if !coverable && result[at] == Cell::Unknown {
            result[at] = Cell::Empty;
        }
    }
    Ok(result)
}

fn no_placement(line: &[Cell], hints: &[usize]) -> Error {
    let encoded: Vec<i8> = line.iter().map(|&c| c.to_i8()).collect();
    Error::contradiction(format!("no placement of {:?} in line {:?}", hints, encoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::cells_from_i8;

    fn l(values: &[i8]) -> Vec<Cell> {
        cells_from_i8(values).unwrap()
    }
    fn pushed(line: &[i8], hints: &[usize]) -> Option<Vec<i8>> {
        push_left(&l(line), hints).map(|cells| cells.iter().map(|c| c.to_i8()).collect())
    }
    fn solved(line: &[i8], hints: &[usize]) -> Option<Vec<i8>> {
        PushSolver.solve_line(&l(line), hints)
                  .unwrap()
                  .map(|cells| cells.iter().map(|c| c.to_i8()).collect())
    }

    #[test]
    fn push_single_hint_on_an_empty_line() {
        assert_eq!(pushed(&[0, 0, 0, 0, 0], &[3]), Some(vec![1, 1, 1, 0, 0]));
        assert_eq!(pushed(&[0, 0, 0], &[3]), Some(vec![1, 1, 1]));
        assert_eq!(pushed(&[0, 0], &[3]), None);
    }

    #[test]
    fn push_multiple_hints_on_an_empty_line() {
        assert_eq!(pushed(&[0, 0, 0, 0, 0], &[1, 2]), Some(vec![1, 0, 1, 1, 0]));
        assert_eq!(pushed(&[0, 0, 0, 0, 0, 0, 0, 0], &[3, 1, 1]),
                   Some(vec![1, 1, 1, 0, 1, 0, 1, 0]));
        assert_eq!(pushed(&[0, 0, 0, 0], &[2, 2]), None);
    }

    #[test]
    fn push_single_hint_on_a_partially_filled_line() {
        assert_eq!(pushed(&[0, 1, 0, 0, 0], &[3]), Some(vec![1, 1, 1, 0, 0]));
        assert_eq!(pushed(&[0, 1, 0], &[3]), Some(vec![1, 1, 1]));
        assert_eq!(pushed(&[0, 0, 0, 1, 0, 0], &[3]), Some(vec![0, 1, 1, 1, 0, 0]));
        assert_eq!(pushed(&[0, 1, 0, 1, 0, 0], &[2]), None);
        assert_eq!(pushed(&[0, 0, 0, 1, 1, 0], &[3]), Some(vec![0, 0, 1, 1, 1, 0]));
        assert_eq!(pushed(&[0, 0, 1, 0, 1, 0], &[4]), Some(vec![0, 1, 1, 1, 1, 0]));
        assert_eq!(pushed(&[0, 1], &[3]), None);
        assert_eq!(pushed(&[1, 0, 1, 0, 1, 0, 1], &[2]), None);
    }

    #[test]
    fn push_multiple_hints_on_a_partially_filled_line() {
        assert_eq!(pushed(&[0, 1, 0, 0, 0], &[3, 1]), Some(vec![1, 1, 1, 0, 1]));
        assert_eq!(pushed(&[0, 1, 0, 0, 0, 0, 0], &[3, 2]),
                   Some(vec![1, 1, 1, 0, 1, 1, 0]));
        assert_eq!(pushed(&[0, 1, 0, 1, 0, 1], &[3, 1]), Some(vec![0, 1, 1, 1, 0, 1]));
        assert_eq!(pushed(&[0, 0, 0, 1, 1, 0, 0, 0, 0], &[2, 3, 1]),
                   Some(vec![1, 1, 0, 1, 1, 1, 0, 1, 0]));
        assert_eq!(pushed(&[0, 1, 0, 1, 0, 1, 1, 0, 0, 0, 0], &[3, 3, 1]),
                   Some(vec![0, 1, 1, 1, 0, 1, 1, 1, 0, 1, 0]));
        assert_eq!(pushed(&[0, 1, 0, 1, 0, 1, 1, 0, 1, 0, 1], &[3, 3, 1]), None);
    }

    #[test]
    fn push_with_no_hints() {
        assert_eq!(pushed(&[0, 0, -1], &[]), Some(vec![0, 0, -1]));
        assert_eq!(pushed(&[0, 1, 0], &[]), None);
    }

    #[test]
    fn solve_empty_line_with_one_hint() {
        assert_eq!(solved(&[0, 0, 0, 0, 0], &[3]), Some(vec![0, 0, 1, 0, 0]));
        assert_eq!(solved(&[0, 0, 0, 0, 0], &[4]), Some(vec![0, 1, 1, 1, 0]));
        assert_eq!(solved(&[0, 0, 0, 0, 0], &[5]), Some(vec![1, 1, 1, 1, 1]));
        assert_eq!(solved(&[0, 0, 0, 0, 0], &[2]), None);
    }

    #[test]
    fn solve_empty_line_with_multiple_hints() {
        assert_eq!(solved(&[0, 0, 0, 0, 0, 0], &[2, 2]), Some(vec![0, 1, 0, 0, 1, 0]));
        assert_eq!(solved(&[0, 0, 0, 0, 0, 0, 0, 0, 0, 0], &[4, 1, 1]),
                   Some(vec![0, 0, 1, 1, 0, 0, 0, 0, 0, 0]));
        assert_eq!(solved(&[0, 0, 0, 0, 0, 0], &[2, 1]), None);
    }

    #[test]
    fn solve_partially_filled_line_with_one_hint() {
        assert_eq!(solved(&[0, 1, 0, 0, 0, 0], &[3]), Some(vec![0, 1, 1, 0, -1, -1]));
        assert_eq!(solved(&[1, 0, 0, 0, 0], &[3]), Some(vec![1, 1, 1, -1, -1]));
        assert_eq!(solved(&[0, 0, 0, 0, 1, 0, 0, 0, 0, 0], &[4]),
                   Some(vec![-1, 0, 0, 0, 1, 0, 0, 0, -1, -1]));
        assert_eq!(solved(&[0, 0, 0, 0, 1, 0, 1, 0, 0, 0], &[4]),
                   Some(vec![-1, -1, -1, 0, 1, 1, 1, 0, -1, -1]));
    }

    #[test]
    fn solve_partially_filled_line_with_multiple_hints() {
        assert_eq!(solved(&[0, 1, 0, 0, 0, 0, 1, 0], &[3, 3]),
                   Some(vec![0, 1, 1, 0, 0, 1, 1, 0]));
        assert_eq!(solved(&[0, 1, 0, 0, 0, 1, 0], &[3, 3]),
                   Some(vec![1, 1, 1, -1, 1, 1, 1]));
        assert_eq!(solved(&[1, 0, 0, 0, 0, 1], &[3, 2]),
                   Some(vec![1, 1, 1, -1, 1, 1]));
        assert_eq!(solved(&[0, 0, 0, 0, 1, 0, 0, 0, 0, 0], &[4, 1]),
                   Some(vec![-1, 0, 0, 0, 1, 0, 0, 0, 0, 0]));
        assert_eq!(solved(&[0, 0, 0, 0, 1, 0, 1, 0, 0, 0], &[4, 2]),
                   Some(vec![-1, 0, 0, 1, 1, 0, 1, 0, 0, 0]));
    }

    #[test]
    fn solve_with_gaps() {
        assert_eq!(solved(&[0, 0, -1, 0, 1], &[1]), Some(vec![-1, -1, -1, -1, 1]));
        assert_eq!(solved(&[0, 0, 0, -1, 1, 0, 0, -1, 0, 0, 0], &[3, 1, 3]),
                   Some(vec![1, 1, 1, -1, 1, -1, -1, -1, 1, 1, 1]));
        // no new information
        assert_eq!(solved(&[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, -1, 1, 1, 0, 0, 1, 1, 1, 0, 0, 0, 0],
                          &[2, 3, 7]),
                   None);
        assert_eq!(solved(&[-1, -1, -1, -1, -1, -1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
                            0, 0, 0, -1, -1, 1, 1, -1, 0, 0, 0, 0, 0, 0, -1, -1, -1, -1, 1, -1],
                          &[14, 1, 2, 2, 1, 1]),
                   Some(vec![-1, -1, -1, -1, -1, -1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
                             -1, 0, 0, -1, -1, 1, 1, -1, 0, 0, 0, 0, 0, 0, -1, -1, -1, -1, 1, -1]));
    }

    #[test]
    fn solve_reports_contradictions() {
        match PushSolver.solve_line(&l(&[1, 0, 1, 0, 1, 0, 1]), &[2]) {
            Err(Error::Contradiction(_)) => {}
            other => panic!("expected contradiction, got {:?}", other),
        }
        // a filled cell with no hints to cover it
        assert!(PushSolver.solve_line(&l(&[0, 1, 0]), &[]).is_err());
    }

    #[test]
    fn solve_with_no_hints_empties_the_line() {
        assert_eq!(solved(&[0, 0, -1], &[]), Some(vec![-1, -1, -1]));
    }

    #[test]
    fn solve_never_unsets_a_determined_cell() {
        let line = l(&[0, 1, 0, 0, 0, -1]);
        let result = deduce(&line, &[2]).unwrap();
        for (before, after) in line.iter().zip(result.iter()) {
            if *before != Cell::Unknown {
                assert_eq!(before, after);
            }
        }
    }
}
