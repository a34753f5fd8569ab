// vim: set ai et ts=4 sw=4 sts=4:
use std::cell::RefCell;

use log::{debug, trace};

use super::error::Error;
use super::grid::Cell;
use super::puzzle::Puzzle;
use super::solver::{LineSolver, Speed, all_solvers};
use super::solver::trim;
use super::util::{Direction, Direction::*, hint_sum};

/// Knobs for the trial-and-error search. `max_depth` counts nested guess
/// levels; 0 disables guessing entirely and leaves pure propagation.
/// `max_guesses` caps the number of candidate cells tried per level.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct SearchOptions {
    pub max_depth:   usize,
    pub max_guesses: usize,
    pub randomize:   bool,
    pub seed:        Option<u64>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            max_depth:   3,
            max_guesses: 100,
            randomize:   true,
            seed:        None,
        }
    }
}

/// Final verdict on a puzzle.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum SolveOutcome {
    /// Every cell determined and the result matches all hints.
    Solved,
    /// A line solver proved the hints inconsistent with the grid.
    Contradiction,
    /// The grid came out fully determined but does not match the hints.
    Unsolvable,
    /// Deduction and search ran to completion without settling the grid.
    Undetermined,
    /// The search gave up on a depth or guess budget; a deeper run might
    /// still settle the puzzle.
    BudgetExhausted,
}

/// Progress callbacks, primarily for interactive frontends.
#[derive(Debug)]
pub enum SolveEvent<'a> {
    LineVisited    { solver: &'static str, direction: Direction, index: usize },
    LineChanged    { solver: &'static str, direction: Direction, index: usize, changed: &'a [usize] },
    Guess          { depth: usize, cell: usize },
    GuessDisproved { depth: usize, cell: usize },
}

enum GuessResult {
    /// A trial branch ended in a verified solution.
    Solved(Puzzle),
    /// Every candidate at this level was tried and disproved or abandoned,
    /// with no budget cut along the way.
    Exhausted,
    /// The guess cap or the depth bound truncated the search somewhere
    /// below this level.
    BudgetExceeded,
}

// Per-(line, solver) visitation flags. A solver skips a line it has already
// seen until a perpendicular write dirties that line again.
struct Visited {
    rows:    Vec<Vec<bool>>,
    columns: Vec<Vec<bool>>,
}

impl Visited {
    fn new(width: usize, height: usize, solver_count: usize) -> Self {
        Visited {
            rows:    vec![vec![false; solver_count]; height],
            columns: vec![vec![false; solver_count]; width],
        }
    }

    fn flags(&mut self, direction: Direction, index: usize) -> &mut [bool] {
        match direction {
            Horizontal => &mut self.rows[index],
            Vertical   => &mut self.columns[index],
        }
    }

    /// A write at `offset` of a line invalidates every solver's work on the
    /// perpendicular line through that cell.
    fn clear_crossing(&mut self, direction: Direction, offset: usize) {
        let flags = match direction {
            Horizontal => &mut self.columns[offset],
            Vertical   => &mut self.rows[offset],
        };
        for flag in flags.iter_mut() {
            *flag = false;
        }
    }
}

/// Drives the line solvers over a puzzle to fixpoint, then falls back to
/// depth-bounded trial and error when deduction alone stalls.
pub struct Strategy {
    solvers:  Vec<Box<dyn LineSolver>>,
    options:  SearchOptions,
    rng:      RefCell<fastrand::Rng>,
    observer: Option<Box<dyn Fn(&SolveEvent)>>,
}

impl Strategy {
    pub fn new(solvers: Vec<Box<dyn LineSolver>>, options: SearchOptions) -> Self {
        // an owned generator, so seeded strategies cannot disturb each other
        let rng = match options.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None       => fastrand::Rng::new(),
        };
        Strategy { solvers, options, rng: RefCell::new(rng), observer: None }
    }

    pub fn with_defaults() -> Self {
        Self::new(all_solvers(), SearchOptions::default())
    }

    pub fn with_options(options: SearchOptions) -> Self {
        Self::new(all_solvers(), options)
    }

    pub fn set_observer(&mut self, observer: impl Fn(&SolveEvent) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    fn emit(&self, event: SolveEvent) {
        if let Some(observer) = &self.observer {
            observer(&event);
        }
    }

    /// Solves the puzzle in place as far as the configuration allows.
    pub fn solve(&self, puzzle: &Puzzle) -> SolveOutcome {
        if let Err(e) = self.propagate(puzzle) {
            debug!("propagation stopped: {}", e);
            return SolveOutcome::Contradiction;
        }
        if puzzle.is_finished() {
            return match puzzle.is_solved() {
                true  => SolveOutcome::Solved,
                false => SolveOutcome::Unsolvable,
            };
        }
        if self.options.max_depth == 0 {
            return SolveOutcome::Undetermined;
        }

        debug!("deduction stalled with {} unknown cells, guessing", puzzle.unknown_count());
        match self.guess_and_conquer(puzzle, 1) {
            GuessResult::Solved(solution) => {
                puzzle.import(&solution);
                SolveOutcome::Solved
            }
            GuessResult::Exhausted      => SolveOutcome::Undetermined,
            GuessResult::BudgetExceeded => SolveOutcome::BudgetExhausted,
        }
    }

    /// Runs the solver list to fixpoint: whenever a solver changes anything,
    /// the list restarts from the fastest solver, so cheap propagation is
    /// exhausted before the combinatorial solvers run again.
    fn propagate(&self, puzzle: &Puzzle) -> Result<(), Error> {
        let mut visited = Visited::new(puzzle.width(), puzzle.height(), self.solvers.len());
        loop {
            let mut progress = false;
            for (solver_index, solver) in self.solvers.iter().enumerate() {
                let before = puzzle.snapshot();
                self.solve_once(puzzle, solver.as_ref(), solver_index, &mut visited)?;
                if puzzle.snapshot() != before {
                    progress = true;
                    break;
                }
            }
            if !progress {
                return Ok(());
            }
        }
    }

    fn solve_once(&self, puzzle: &Puzzle, solver: &dyn LineSolver,
                  solver_index: usize, visited: &mut Visited)
        -> Result<(), Error>
    {
        let short_circuited =
            self.run_direction(puzzle, Horizontal, solver, solver_index, visited)?;
        if short_circuited {
            return Ok(());
        }
        self.run_direction(puzzle, Vertical, solver, solver_index, visited)?;
        Ok(())
    }

    /// Applies one solver to every dirty line of one orientation. Returns
    /// true when a slow solver made progress and the rest of the pass should
    /// be abandoned in favour of the faster solvers.
    fn run_direction(&self, puzzle: &Puzzle, direction: Direction,
                     solver: &dyn LineSolver, solver_index: usize,
                     visited: &mut Visited)
        -> Result<bool, Error>
    {
        let slow = solver.speed() == Speed::Slow;
        let hints = match direction {
            Horizontal => puzzle.row_hints(),
            Vertical   => puzzle.col_hints(),
        };
        let view = |index: usize| match direction {
            Horizontal => puzzle.row(index),
            Vertical   => puzzle.column(index),
        };

        let mut agenda: Vec<(usize, u64)> = (0..hints.len())
            .filter_map(|index| {
                let unknowns = view(index).unknown_count();
                if unknowns == 0 {
                    return None;
                }
                let estimate = match slow {
                    false => 0,
                    true  => line_estimate(unknowns, &hints[index]),
                };
                Some((index, estimate))
            })
            .collect();
        if slow {
            // cheapest lines first: they get the chance to short-circuit
            // the pass before an expensive line is attempted
            agenda.sort_by_key(|&(_, estimate)| estimate);
        }

        for (index, estimate) in agenda {
            let flags = visited.flags(direction, index);
            if flags[solver_index] {
                continue;
            }
            flags[solver_index] = true;

            self.emit(SolveEvent::LineVisited { solver: solver.name(), direction, index });
            debug!("running {} on {} {} (estimate {})", solver.name(), direction, index, estimate);

            let line = view(index).to_vec();
            let (trimmed, trimmed_hints, info) = trim::trim(&line, &hints[index])?;
            let solved = solver.solve_line(&trimmed, &trimmed_hints)?;
            if let Some(new_line) = solved {
                let changed = view(index).write(&trim::restore(&new_line, &info));
                if !changed.is_empty() {
                    for &offset in &changed {
                        visited.clear_crossing(direction, offset);
                    }
                    self.emit(SolveEvent::LineChanged {
                        solver: solver.name(), direction, index, changed: &changed,
                    });
                    trace!("{} {} now {:?}, revisiting crossing lines {:?}",
                           direction, index, view(index).to_vec(), changed);
                    if slow {
                        return Ok(true);
                    }
                }
            }
        }
        Ok(false)
    }

    /// Depth-bounded backtracking over the puzzle's unknown cells.
    ///
    /// Each candidate cell is hypothesized Filled in an independent clone
    /// and propagated to fixpoint. A contradiction, or a completed grid
    /// that fails verification, disproves the hypothesis: the cell is
    /// marked Empty in this level's snapshot and the search moves on. A
    /// partial result recurses one level deeper while the depth budget
    /// lasts, then reverts the cell.
    fn guess_and_conquer(&self, puzzle: &Puzzle, depth: usize) -> GuessResult {
        let mut snapshot = puzzle.snapshot();
        let mut candidates: Vec<usize> = snapshot.iter()
            .enumerate()
            .filter(|&(_, &cell)| cell == Cell::Unknown)
            .map(|(index, _)| index)
            .collect();

        let mut truncated = candidates.len() > self.options.max_guesses;
        let tries = candidates.len().min(self.options.max_guesses);
        for attempt in 0..tries {
            let pick = match self.options.randomize {
                true  => self.rng.borrow_mut().usize(..candidates.len()),
                false => 0,
            };
            let cell = candidates.remove(pick);

            snapshot[cell] = Cell::Filled;
            let trial = puzzle.branch_with_content(snapshot.clone());
            self.emit(SolveEvent::Guess { depth, cell });
            debug!("[depth {}] guess {}/{}: hypothesizing cell {} filled",
                   depth, attempt + 1, tries, cell);

            match self.propagate(&trial) {
                Ok(()) if trial.is_finished() => {
                    if trial.is_solved() {
                        debug!("[depth {}] cell {} completed the puzzle", depth, cell);
                        return GuessResult::Solved(trial);
                    }
                    // completed but wrong: the hypothesis is disproved
                    snapshot[cell] = Cell::Empty;
                    self.emit(SolveEvent::GuessDisproved { depth, cell });
                }
                Ok(()) => {
                    if depth < self.options.max_depth {
                        match self.guess_and_conquer(&trial, depth + 1) {
                            GuessResult::Solved(solution) => return GuessResult::Solved(solution),
                            GuessResult::BudgetExceeded   => truncated = true,
                            GuessResult::Exhausted        => {}
                        }
                    } else {
                        truncated = true;
                    }
                    snapshot[cell] = Cell::Unknown;
                }
                Err(e) => {
                    debug!("[depth {}] cell {} disproved: {}", depth, cell, e);
                    snapshot[cell] = Cell::Empty;
                    self.emit(SolveEvent::GuessDisproved { depth, cell });
                }
            }
        }
        match truncated {
            true  => GuessResult::BudgetExceeded,
            false => GuessResult::Exhausted,
        }
    }
}

// (unknowns - hint_sum)^hint_count, or 0 for lines that are trivial or
// cannot fit their hints at all.
fn line_estimate(unknowns: usize, hints: &[usize]) -> u64 {
    let need = hint_sum(hints);
    if unknowns < need {
        return 0;
    }
    ((unknowns - need) as u64).saturating_pow(hints.len() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deduce_only() -> Strategy {
        Strategy::with_options(SearchOptions {
            max_depth: 0,
            randomize: false,
            ..SearchOptions::default()
        })
    }
    fn sequential(max_depth: usize) -> Strategy {
        Strategy::with_options(SearchOptions {
            max_depth,
            randomize: false,
            ..SearchOptions::default()
        })
    }
    fn snapshot_i8(puzzle: &Puzzle) -> Vec<i8> {
        puzzle.snapshot().iter().map(|c| c.to_i8()).collect()
    }

    #[test]
    fn estimates_line_cost() {
        assert_eq!(line_estimate(5, &[5]), 0);
        assert_eq!(line_estimate(4, &[2, 2]), 0);
        assert_eq!(line_estimate(10, &[2, 2]), 25);
        assert_eq!(line_estimate(3, &[]), 1);
    }

    #[test]
    fn solves_a_single_cell() {
        let puzzle = Puzzle::new(vec![vec![1]], vec![vec![1]]).unwrap();
        assert_eq!(deduce_only().solve(&puzzle), SolveOutcome::Solved);
        assert_eq!(snapshot_i8(&puzzle), vec![1]);
    }

    #[test]
    fn solves_by_pure_propagation() {
        // a T shape: full top row, full middle column
        let puzzle = Puzzle::new(
            vec![vec![5], vec![1], vec![1], vec![1], vec![1]],
            vec![vec![1], vec![1], vec![5], vec![1], vec![1]],
        ).unwrap();
        assert_eq!(deduce_only().solve(&puzzle), SolveOutcome::Solved);
        assert_eq!(snapshot_i8(&puzzle), vec![
             1,  1, 1,  1,  1,
            -1, -1, 1, -1, -1,
            -1, -1, 1, -1, -1,
            -1, -1, 1, -1, -1,
            -1, -1, 1, -1, -1,
        ]);
    }

    #[test]
    fn detects_a_contradiction() {
        // 1+1 runs cannot fit in a 2-wide row
        let puzzle = Puzzle::new(vec![vec![1, 1]], vec![vec![1], vec![1]]).unwrap();
        assert_eq!(deduce_only().solve(&puzzle), SolveOutcome::Contradiction);
    }

    #[test]
    fn reports_a_wrong_prefilled_grid_as_unsolvable() {
        let puzzle = Puzzle::with_content(vec![vec![1], vec![1]],
                                          vec![vec![2], vec![]],
                                          &[-1, 1, 1, -1]).unwrap();
        assert_eq!(deduce_only().solve(&puzzle), SolveOutcome::Unsolvable);
    }

    #[test]
    fn ambiguous_puzzle_stalls_without_guessing() {
        let puzzle = Puzzle::new(vec![vec![1], vec![1]], vec![vec![1], vec![1]]).unwrap();
        assert_eq!(deduce_only().solve(&puzzle), SolveOutcome::Undetermined);
        assert_eq!(puzzle.unknown_count(), 4);
    }

    #[test]
    fn guessing_settles_an_ambiguous_puzzle() {
        let puzzle = Puzzle::new(vec![vec![1], vec![1]], vec![vec![1], vec![1]]).unwrap();
        assert_eq!(sequential(3).solve(&puzzle), SolveOutcome::Solved);
        assert!(puzzle.is_solved());
        // sequential order tries cell 0 first, which propagates to the
        // anti-diagonal solution
        assert_eq!(snapshot_i8(&puzzle), vec![1, -1, -1, 1]);
    }

    #[test]
    fn randomized_guessing_still_verifies() {
        let puzzle = Puzzle::new(vec![vec![1], vec![1]], vec![vec![1], vec![1]]).unwrap();
        let strategy = Strategy::with_options(SearchOptions {
            seed: Some(7),
            ..SearchOptions::default()
        });
        // every cell of this puzzle belongs to some solution, so any guess
        // order must end in a verified fill
        assert_eq!(strategy.solve(&puzzle), SolveOutcome::Solved);
        assert!(puzzle.is_solved());
    }

    #[test]
    fn wrong_guess_is_disproved_and_search_recovers() {
        use std::cell::RefCell;
        use std::rc::Rc;

        // propagation stalls with every cell open; filling the top-left
        // corner forces an impossible run in the third row, so the search
        // has to refute that hypothesis before it can finish
        let puzzle = Puzzle::new(
            vec![vec![1], vec![2], vec![1], vec![1, 1]],
            vec![vec![1], vec![2], vec![2], vec![1]],
        ).unwrap();

        let disproved = Rc::new(RefCell::new(0usize));
        let seen = Rc::clone(&disproved);
        let mut strategy = sequential(2);
        strategy.set_observer(move |event| {
            if let SolveEvent::GuessDisproved { .. } = event {
                *seen.borrow_mut() += 1;
            }
        });

        assert_eq!(strategy.solve(&puzzle), SolveOutcome::Solved);
        assert!(*disproved.borrow() > 0);
        assert_eq!(snapshot_i8(&puzzle), vec![
            -1,  1, -1, -1,
            -1,  1,  1, -1,
            -1, -1,  1, -1,
             1, -1, -1,  1,
        ]);
    }

    #[test]
    fn trial_that_completes_without_matching_hints_is_rejected() {
        use std::cell::RefCell;
        use std::rc::Rc;

        // one-per-column hints make the rows complements of each other, so
        // only one placement of the 2-run survives globally; guessing the
        // top-left corner completes the grid into a non-solution instead of
        // hitting a line contradiction
        let puzzle = Puzzle::new(
            vec![vec![2], vec![1, 1]],
            vec![vec![1], vec![1], vec![1], vec![1]],
        ).unwrap();

        let disproved = Rc::new(RefCell::new(0usize));
        let seen = Rc::clone(&disproved);
        let mut strategy = sequential(2);
        strategy.set_observer(move |event| {
            if let SolveEvent::GuessDisproved { .. } = event {
                *seen.borrow_mut() += 1;
            }
        });

        assert_eq!(strategy.solve(&puzzle), SolveOutcome::Solved);
        assert!(*disproved.borrow() > 0);
        assert_eq!(snapshot_i8(&puzzle), vec![
            -1,  1,  1, -1,
             1, -1, -1,  1,
        ]);
    }

    #[test]
    fn seeded_strategies_keep_independent_rng_state() {
        let seeded = |seed| Strategy::with_options(SearchOptions {
            seed: Some(seed),
            ..SearchOptions::default()
        });
        let ambiguous = || Puzzle::new(vec![vec![1], vec![1]],
                                       vec![vec![1], vec![1]]).unwrap();

        let a = seeded(7);
        let b = seeded(7);
        let first = ambiguous();
        assert_eq!(a.solve(&first), SolveOutcome::Solved);

        // a differently seeded strategy running in between must not
        // disturb b's draw sequence
        assert_eq!(seeded(99).solve(&ambiguous()), SolveOutcome::Solved);

        let second = ambiguous();
        assert_eq!(b.solve(&second), SolveOutcome::Solved);
        assert_eq!(first.snapshot(), second.snapshot());
    }

    #[test]
    fn depth_budget_cuts_nested_guessing() {
        // permutation-matrix hints: one guess leaves another ambiguous
        // 2x2 block, so a single level cannot finish
        let rows = vec![vec![1], vec![1], vec![1]];
        let cols = vec![vec![1], vec![1], vec![1]];

        let shallow = Puzzle::new(rows.clone(), cols.clone()).unwrap();
        assert_eq!(sequential(1).solve(&shallow), SolveOutcome::BudgetExhausted);
        assert!(!shallow.is_finished());

        let deep = Puzzle::new(rows, cols).unwrap();
        assert_eq!(sequential(2).solve(&deep), SolveOutcome::Solved);
        assert!(deep.is_solved());
    }

    #[test]
    fn observer_sees_progress() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let changes = Rc::new(RefCell::new(0usize));
        let seen = Rc::clone(&changes);
        let mut strategy = deduce_only();
        strategy.set_observer(move |event| {
            if let SolveEvent::LineChanged { .. } = event {
                *seen.borrow_mut() += 1;
            }
        });

        let puzzle = Puzzle::new(vec![vec![1]], vec![vec![1]]).unwrap();
        assert_eq!(strategy.solve(&puzzle), SolveOutcome::Solved);
        assert!(*changes.borrow() > 0);
    }
}
