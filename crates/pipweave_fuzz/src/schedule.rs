//! Per-design work order over ttpips.
//!
//! Each design shuffles every ttpip with the run RNG and then stable-sorts by
//! ascending coverage, so the least covered ttpips come first and ties keep
//! their shuffled order. Routing slots walk the order cyclically.

use pipweave_config::SchedulerConfig;
use pipweave_graph::TileTypePip;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::coverage::CoverageState;

/// The fixed ttpip order for one design.
#[derive(Debug, Clone)]
pub struct WorkOrder {
    order: Vec<TileTypePip>,
}

impl WorkOrder {
    /// Shuffles all ttpips, then stable-sorts by current count.
    pub fn build(coverage: &CoverageState, rng: &mut impl Rng) -> Self {
        let mut order: Vec<TileTypePip> = coverage.iter().map(|(t, _)| t).collect();
        order.shuffle(rng);
        order.sort_by_key(|&t| coverage.count(t));
        Self { order }
    }

    /// The ttpip for slot `i`, wrapping around. `None` if there are no ttpips.
    pub fn slot(&self, i: usize) -> Option<TileTypePip> {
        if self.is_empty() {
            None
        } else {
            Some(self.order[i % self.len()])
        }
    }

    /// The full order.
    pub fn as_slice(&self) -> &[TileTypePip] {
        &self.order
    }

    /// Number of ttpips in the order.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if there is nothing to schedule.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Attempts allowed for a ttpip in one slot: rare ttpips get the larger
/// budget.
pub fn retry_budget(count: u64, config: &SchedulerConfig) -> u32 {
    if count < config.rare_threshold {
        config.rare_retries
    } else {
        config.common_retries
    }
}
