//! Configuration types deserialized from `pipweave.toml`.

use serde::Deserialize;

/// The top-level campaign configuration.
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CampaignConfig {
    /// Work-order and retry-budget tuning.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Search bounds and endpoint sampling probabilities.
    #[serde(default)]
    pub router: RouterConfig,
    /// Per-design sizing.
    #[serde(default)]
    pub design: DesignConfig,
}

/// Controls how routing slots are distributed over ttpips.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SchedulerConfig {
    /// A ttpip with fewer successful routes than this is considered rare.
    pub rare_threshold: u64,
    /// Routing attempts per slot for rare ttpips.
    pub rare_retries: u32,
    /// Routing attempts per slot for already well-covered ttpips.
    pub common_retries: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            rare_threshold: 25,
            rare_retries: 20,
            common_retries: 2,
        }
    }
}

/// Bounds and sampling probabilities for the bidirectional search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RouterConfig {
    /// Maximum number of dequeued nodes per search direction.
    pub max_iterations: usize,
    /// Chance that a node exposing site pins is tried as an endpoint.
    pub endpoint_accept_probability: f64,
    /// Chance that a node is checked against the constant-source naming rule.
    pub constant_accept_probability: f64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500_000,
            endpoint_accept_probability: 0.5,
            constant_accept_probability: 0.7,
        }
    }
}

/// Sizing of a single generated design.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DesignConfig {
    /// Number of routing slots attempted per design.
    pub slots: usize,
    /// Probability that any given node is disabled for the whole design.
    pub disable_probability: f64,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            slots: 1000,
            disable_probability: 0.05,
        }
    }
}
