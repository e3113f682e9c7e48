use serde::Serialize;

use crate::core::{
    connectivity::{Group, find_groups},
    gravity::settle,
    grid::Grid,
};

/// Points per cleared puyo before the chain multiplier.
pub const SCORE_BASE: u64 = 10;

/// Base of the per-chain score multiplier (`CHAIN_MULTIPLIER_BASE^(chain - 1)`).
pub const CHAIN_MULTIPLIER_BASE: u64 = 2;

/// Score awarded for clearing `cleared` puyos at chain number `chain` (1-based).
///
/// Saturates at `u64::MAX` instead of overflowing on absurd chain lengths.
///
/// ```
/// use rensa_engine::chain_score;
///
/// assert_eq!(chain_score(4, 1), 40);
/// assert_eq!(chain_score(4, 2), 80);
/// assert_eq!(chain_score(6, 3), 240);
/// ```
#[must_use]
pub fn chain_score(cleared: usize, chain: u32) -> u64 {
    let multiplier = CHAIN_MULTIPLIER_BASE.saturating_pow(chain.saturating_sub(1));
    u64::try_from(cleared)
        .unwrap_or(u64::MAX)
        .saturating_mul(SCORE_BASE)
        .saturating_mul(multiplier)
}

/// Result of a single clear iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainClear {
    /// 1-based chain number of this clear within its resolution.
    pub chain: u32,
    /// Number of puyos removed.
    pub cleared: usize,
    /// Score awarded for this clear.
    pub score: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum ChainPhase {
    /// Gravity is about to run; `first` is set for the settle right after the lock.
    Dropping { first: bool },
    /// Gravity has settled; the next step looks for clearable groups.
    Checking,
    /// Groups have been found and are about to be removed.
    Clearing { groups: Vec<Group> },
    Finished,
}

/// Outcome of one [`ChainController::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum ChainStep {
    /// Gravity ran to a fixed point, moving `moved` puyos one row in total.
    Settled { moved: usize, first: bool },
    /// Clearable groups were detected and are now pending.
    GroupsFound,
    /// Pending groups were removed.
    Cleared(ChainClear),
    /// Nothing left to clear; the resolution is over.
    Stable,
}

/// Drives a lock's cascade of gravity and clears, one atomic transition per step.
///
/// The controller borrows the grid only for the duration of each step and
/// knows nothing about timing. A resolution always terminates: every clear
/// removes at least [`CLEAR_THRESHOLD`](crate::CLEAR_THRESHOLD) puyos and
/// nothing is ever added.
///
/// # Example
///
/// ```
/// use rensa_engine::{ChainController, ChainStep, Grid};
///
/// let mut grid = Grid::from_rows(&["R.....", "RRR..."]).unwrap();
/// let mut chain = ChainController::new();
///
/// assert!(chain.step(&mut grid).is_settled());
/// assert_eq!(chain.step(&mut grid), ChainStep::GroupsFound);
/// let ChainStep::Cleared(clear) = chain.step(&mut grid) else { panic!() };
/// assert_eq!((clear.chain, clear.cleared, clear.score), (1, 4, 40));
///
/// chain.run_to_end(&mut grid);
/// assert!(chain.is_finished());
/// assert!(grid.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ChainController {
    phase: ChainPhase,
    chain_count: u32,
    total_score: u64,
}

impl Default for ChainController {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainController {
    /// Starts a resolution with a chain count of zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: ChainPhase::Dropping { first: true },
            chain_count: 0,
            total_score: 0,
        }
    }

    #[must_use]
    pub fn phase(&self) -> &ChainPhase {
        &self.phase
    }

    #[must_use]
    pub fn chain_count(&self) -> u32 {
        self.chain_count
    }

    /// Total score awarded so far in this resolution.
    #[must_use]
    pub fn total_score(&self) -> u64 {
        self.total_score
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase.is_finished()
    }

    /// Groups detected by the last check and not yet cleared.
    #[must_use]
    pub fn pending_groups(&self) -> &[Group] {
        match &self.phase {
            ChainPhase::Clearing { groups } => groups.as_slice(),
            _ => &[],
        }
    }

    /// Performs exactly one transition of the resolution.
    pub fn step(&mut self, grid: &mut Grid) -> ChainStep {
        match std::mem::replace(&mut self.phase, ChainPhase::Finished) {
            ChainPhase::Dropping { first } => {
                let moved = settle(grid);
                self.phase = ChainPhase::Checking;
                ChainStep::Settled { moved, first }
            }
            ChainPhase::Checking => {
                let groups = find_groups(grid);
                if groups.is_empty() {
                    ChainStep::Stable
                } else {
                    self.phase = ChainPhase::Clearing { groups };
                    ChainStep::GroupsFound
                }
            }
            ChainPhase::Clearing { groups } => {
                self.chain_count += 1;
                let mut cleared = 0;
                for pos in groups.iter().flat_map(|group| &group.cells) {
                    grid.set(pos.x, pos.y, None);
                    cleared += 1;
                }
                let score = chain_score(cleared, self.chain_count);
                self.total_score = self.total_score.saturating_add(score);
                self.phase = ChainPhase::Dropping { first: false };
                ChainStep::Cleared(ChainClear {
                    chain: self.chain_count,
                    cleared,
                    score,
                })
            }
            ChainPhase::Finished => ChainStep::Stable,
        }
    }

    /// Steps until the resolution finishes, returning every clear in order.
    pub fn run_to_end(&mut self, grid: &mut Grid) -> Vec<ChainClear> {
        let mut clears = vec![];
        while !self.is_finished() {
            if let ChainStep::Cleared(clear) = self.step(grid) {
                clears.push(clear);
            }
        }
        clears
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_clear_still_settles_once() {
        let mut grid = Grid::from_rows(&["R.....", "......", "B....."]).unwrap();
        let mut chain = ChainController::new();

        assert_eq!(
            chain.step(&mut grid),
            ChainStep::Settled {
                moved: 1,
                first: true
            }
        );
        assert_eq!(chain.step(&mut grid), ChainStep::Stable);
        assert!(chain.is_finished());
        assert_eq!(chain.chain_count(), 0);
        assert_eq!(chain.step(&mut grid), ChainStep::Stable);
        assert_eq!(grid.occupied_count(), 2);
    }

    #[test]
    fn test_two_chain_scores_40_then_80() {
        // Clearing the four reds drops the blue on top onto three more blues.
        let mut grid = Grid::from_rows(&[
            "B.....", //
            "R.....", //
            "RRR...", //
            "BBB...",
        ])
        .unwrap();
        let mut chain = ChainController::new();

        let clears = chain.run_to_end(&mut grid);
        assert_eq!(
            clears,
            [
                ChainClear {
                    chain: 1,
                    cleared: 4,
                    score: 40
                },
                ChainClear {
                    chain: 2,
                    cleared: 4,
                    score: 80
                },
            ]
        );
        assert_eq!(chain.chain_count(), 2);
        assert_eq!(chain.total_score(), 120);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_simultaneous_groups_share_one_chain() {
        let mut grid = Grid::from_rows(&["RRRRGG", "BBBBGG"]).unwrap();
        let mut chain = ChainController::new();

        let clears = chain.run_to_end(&mut grid);
        assert_eq!(clears.len(), 1);
        assert_eq!(clears[0].cleared, 12);
        assert_eq!(clears[0].score, 120);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_pending_groups_visible_between_steps() {
        let mut grid = Grid::from_rows(&["YYYY.."]).unwrap();
        let mut chain = ChainController::new();
        chain.step(&mut grid);
        assert!(chain.pending_groups().is_empty());

        assert_eq!(chain.step(&mut grid), ChainStep::GroupsFound);
        assert_eq!(chain.pending_groups().len(), 1);
        // Highlighting leaves the grid untouched.
        assert_eq!(grid.occupied_count(), 4);

        assert!(chain.step(&mut grid).is_cleared());
        assert!(chain.pending_groups().is_empty());
        assert!(chain.phase().is_dropping());
    }

    #[test]
    fn test_later_settles_are_not_first() {
        let mut grid = Grid::from_rows(&["GGGG.."]).unwrap();
        let mut chain = ChainController::new();
        chain.step(&mut grid);
        chain.step(&mut grid);
        chain.step(&mut grid);
        assert_eq!(
            chain.step(&mut grid),
            ChainStep::Settled {
                moved: 0,
                first: false
            }
        );
    }

    #[test]
    fn test_chain_score_saturates() {
        assert_eq!(chain_score(0, 1), 0);
        assert_eq!(chain_score(4, 70), u64::MAX);
        assert_eq!(chain_score(usize::MAX, 1), u64::MAX);
    }
}
