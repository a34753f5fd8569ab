// vim: set ai et ts=4 sw=4 sts=4:
use std::ops::Range;

use crate::error::Error;
use crate::grid::Cell;
use super::{LineSolver, Speed};
use super::push;

/// One hint-to-gap assignment: for every gap, the (possibly empty) ordered
/// slice of hints placed inside it.
pub type Distribution = Vec<Vec<usize>>;

#[derive(PartialEq, Debug)]
pub struct GapDistribution {
    pub gaps: Vec<Range<usize>>,
    pub distributions: Vec<Distribution>,
}

/// Maximal runs of non-Empty cells.
pub fn find_gaps(line: &[Cell]) -> Vec<Range<usize>> {
    let mut gaps = Vec::new();
    let mut start = None;
    for (i, &cell) in line.iter().enumerate() {
        match (cell != Cell::Empty, start) {
            (true, None)     => start = Some(i),
            (false, Some(s)) => { gaps.push(s..i); start = None; }
            _                => {}
        }
    }
    if let Some(s) = start {
        gaps.push(s..line.len());
    }
    gaps
}

fn gap_fits(line: &[Cell], gap: &Range<usize>, hints: &[usize]) -> bool {
    push::push_left(&line[gap.clone()], hints).is_some()
}

/// Enumerates every way of assigning a contiguous, order-preserving prefix
/// of the hints to the first gap and the remainder to the rest, validating
/// each gap in isolation with the push solver's feasibility oracle.
///
/// Returns None when the line consists of a single infeasible gap; a result
/// with an empty distribution list likewise means no valid completion
/// exists.
pub fn distribute(line: &[Cell], hints: &[usize]) -> Option<GapDistribution> {
    let gaps = find_gaps(line);
    if gaps.len() == 1 {
        if !gap_fits(line, &gaps[0], hints) {
            return None;
        }
        return Some(GapDistribution {
            gaps,
            distributions: vec![vec![hints.to_vec()]],
        });
    }
    let distributions = distribute_over(line, &gaps, hints);
    Some(GapDistribution { gaps, distributions })
}

fn distribute_over(line: &[Cell], gaps: &[Range<usize>], hints: &[usize]) -> Vec<Distribution> {
    if gaps.is_empty() {
        return Vec::new();
    }
    if gaps.len() == 1 {
        if gap_fits(line, &gaps[0], hints) {
            return vec![vec![hints.to_vec()]];
        }
        return Vec::new();
    }
    let mut distributions = Vec::new();
    for count in 0..=hints.len() {
        if !gap_fits(line, &gaps[0], &hints[..count]) {
            continue;
        }
        for rest in distribute_over(line, &gaps[1..], &hints[count..]) {
            let mut item = Vec::with_capacity(gaps.len());
            item.push(hints[..count].to_vec());
            item.extend(rest);
            distributions.push(item);
        }
    }
    distributions
}

/// Combinatorial line solver: derives one candidate deduction per feasible
/// hint distribution by solving each gap independently with its assigned
/// sub-hints, then keeps only the cell values every candidate agrees on.
/// Cost grows combinatorially with hint count versus gap count; the
/// strategy bounds how often this runs.
pub struct BruteForceSolver;

impl LineSolver for BruteForceSolver {
    fn name(&self) -> &'static str { "brute-force" }
    fn speed(&self) -> Speed { Speed::Slow }

    fn solve_line(&self, line: &[Cell], hints: &[usize]) -> Result<Option<Vec<Cell>>, Error> {
        let result = distribute(line, hints)
            .ok_or_else(|| Error::contradiction("no gap can host the hints"))?;
        if result.distributions.is_empty() {
            return Err(Error::contradiction("no feasible hint distribution over the gaps"));
        }

        let mut merged: Option<Vec<Cell>> = None;
        for distribution in &result.distributions {
            let candidate = candidate_line(line, &result.gaps, distribution)?;
            merged = Some(match merged {
                None => candidate,
                Some(mut acc) => {
                    for (have, new) in acc.iter_mut().zip(candidate) {
                        if *have != new {
                            *have = Cell::Unknown;
                        }
                    }
                    acc
                }
            });
        }
        // merging may only add information on cells that were still open
        let mut solved = merged.unwrap_or_else(|| line.to_vec());
        for (at, &cell) in line.iter().enumerate() {
            if cell != Cell::Unknown {
                solved[at] = cell;
            }
        }
        if solved == line {
            return Ok(None);
        }
        Ok(Some(solved))
    }
}

// Deduction for one distribution: each gap is handled on its own, a gap
// with no hints assigned must end up all Empty.
fn candidate_line(line: &[Cell], gaps: &[Range<usize>], distribution: &Distribution)
    -> Result<Vec<Cell>, Error>
{
    let mut result = line.to_vec();
    for (gap, gap_hints) in gaps.iter().zip(distribution.iter()) {
        if gap_hints.is_empty() {
            for at in gap.clone() {
                result[at] = Cell::Empty;
            }
            continue;
        }
        let deduced = push::deduce(&line[gap.clone()], gap_hints)?;
        result[gap.clone()].copy_from_slice(&deduced);
    }
    Ok(result)
}
