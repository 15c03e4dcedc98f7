//! Per-outcome statistics tracking for bulk runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use strum::IntoEnumIterator;

use super::types::Outcome;

/// Thread-safe outcome counters for a bulk resolution run.
///
/// All outcome types are initialized to zero on creation. Counters use
/// relaxed atomics; the values are end-of-run telemetry, not control flow.
pub struct OutcomeStats {
    counts: HashMap<Outcome, AtomicUsize>,
}

impl OutcomeStats {
    pub fn new() -> Self {
        let mut counts = HashMap::new();
        for outcome in Outcome::iter() {
            counts.insert(outcome, AtomicUsize::new(0));
        }
        OutcomeStats { counts }
    }

    /// Increment the counter for an outcome.
    pub fn increment(&self, outcome: Outcome) {
        if let Some(counter) = self.counts.get(&outcome) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            // Unreachable if new() initialized every variant; log rather than panic
            log::error!("missing outcome counter for {:?}", outcome);
        }
    }

    /// Current count for an outcome.
    pub fn get(&self, outcome: Outcome) -> usize {
        self.counts
            .get(&outcome)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Total number of recorded outcomes.
    pub fn total(&self) -> usize {
        self.counts.values().map(|c| c.load(Ordering::Relaxed)).sum()
    }
}

impl Default for OutcomeStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Logs a per-outcome breakdown at the end of a bulk run.
pub fn print_outcome_statistics(stats: &OutcomeStats) {
    log::info!("Resolution outcomes:");
    for outcome in Outcome::iter() {
        let count = stats.get(outcome);
        if count > 0 {
            log::info!("  {}: {}", outcome, count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_stats_initialization() {
        let stats = OutcomeStats::new();
        for outcome in Outcome::iter() {
            assert_eq!(stats.get(outcome), 0);
        }
        assert_eq!(stats.total(), 0);
    }

    #[test]
    fn test_stats_increment() {
        let stats = OutcomeStats::new();
        stats.increment(Outcome::CacheHit);
        stats.increment(Outcome::CacheHit);
        stats.increment(Outcome::Failed);
        assert_eq!(stats.get(Outcome::CacheHit), 2);
        assert_eq!(stats.get(Outcome::Failed), 1);
        assert_eq!(stats.total(), 3);
    }
}
