use serde::Serialize;

use super::chain::ChainClear;

/// Number of buckets in [`GameStats::chain_histogram`]; the last one collects every longer chain.
pub const CHAIN_HISTOGRAM_LEN: usize = 8;

/// Game statistics tracking score, locked pairs, and chains.
///
/// - **Score**: sum of every clear's score, never decreasing
/// - **Locked pairs**: number of pairs merged into the grid
/// - **Cleared puyos**: total puyos removed by clears
/// - **Max chain**: longest chain reached in any resolution
/// - **Chain histogram**: resolutions counted by the chain length they reached
///
/// # Example
///
/// ```
/// use rensa_engine::{ChainClear, GameStats};
///
/// let mut stats = GameStats::new();
/// stats.record_lock();
/// stats.record_clear(&ChainClear { chain: 1, cleared: 4, score: 40 });
/// stats.record_clear(&ChainClear { chain: 2, cleared: 4, score: 80 });
/// stats.complete_resolution(2);
///
/// assert_eq!(stats.score(), 120);
/// assert_eq!(stats.cleared_puyos(), 8);
/// assert_eq!(stats.max_chain(), 2);
/// assert_eq!(stats.chain_histogram()[2], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStats {
    score: u64,
    locked_pairs: usize,
    cleared_puyos: usize,
    max_chain: u32,
    chain_histogram: [usize; CHAIN_HISTOGRAM_LEN],
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    /// Creates a new game statistics tracker with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            locked_pairs: 0,
            cleared_puyos: 0,
            max_chain: 0,
            chain_histogram: [0; CHAIN_HISTOGRAM_LEN],
        }
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub const fn locked_pairs(&self) -> usize {
        self.locked_pairs
    }

    #[must_use]
    pub const fn cleared_puyos(&self) -> usize {
        self.cleared_puyos
    }

    #[must_use]
    pub const fn max_chain(&self) -> u32 {
        self.max_chain
    }

    /// Returns how many resolutions ended at each chain length.
    ///
    /// - `[0]`: locks that cleared nothing
    /// - `[n]`: resolutions that reached an `n`-chain
    /// - `[CHAIN_HISTOGRAM_LEN - 1]`: that length or longer
    #[must_use]
    pub const fn chain_histogram(&self) -> &[usize; CHAIN_HISTOGRAM_LEN] {
        &self.chain_histogram
    }

    pub const fn record_lock(&mut self) {
        self.locked_pairs += 1;
    }

    pub const fn record_clear(&mut self, clear: &ChainClear) {
        self.cleared_puyos += clear.cleared;
        self.score = self.score.saturating_add(clear.score);
    }

    /// Closes a resolution that reached `chain_count` chains.
    pub fn complete_resolution(&mut self, chain_count: u32) {
        self.max_chain = self.max_chain.max(chain_count);
        let bucket = usize::try_from(chain_count)
            .unwrap_or(usize::MAX)
            .min(CHAIN_HISTOGRAM_LEN - 1);
        self.chain_histogram[bucket] += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let stats = GameStats::new();
        assert_eq!(stats.score(), 0);
        assert_eq!(stats.locked_pairs(), 0);
        assert_eq!(stats.max_chain(), 0);
        assert!(stats.chain_histogram().iter().all(|n| *n == 0));
    }

    #[test]
    fn test_histogram_buckets() {
        let mut stats = GameStats::new();
        stats.complete_resolution(0);
        stats.complete_resolution(0);
        stats.complete_resolution(3);
        stats.complete_resolution(9);
        stats.complete_resolution(12);

        assert_eq!(stats.chain_histogram(), &[2, 0, 0, 1, 0, 0, 0, 2]);
        assert_eq!(stats.max_chain(), 12);
    }

    #[test]
    fn test_score_saturates() {
        let mut stats = GameStats::new();
        stats.record_clear(&ChainClear {
            chain: 60,
            cleared: 4,
            score: u64::MAX,
        });
        stats.record_clear(&ChainClear {
            chain: 61,
            cleared: 4,
            score: 10,
        });
        assert_eq!(stats.score(), u64::MAX);
    }
}
