//! Parsing and validation of `pipweave.toml` campaign configuration files.
//!
//! The configuration file is optional; every field has a default matching the
//! tuning used for clock-fabric fuzzing campaigns. The loaded
//! [`CampaignConfig`] is consumed by the scheduler, the router and the design
//! loop in `pipweave_fuzz`.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, validate_config};
pub use types::*;
