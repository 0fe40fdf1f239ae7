//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::CampaignConfig;
use std::path::Path;

/// Loads and validates a campaign configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<CampaignConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a campaign configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<CampaignConfig, ConfigError> {
    let config: CampaignConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks value ranges that serde cannot express.
pub fn validate_config(config: &CampaignConfig) -> Result<(), ConfigError> {
    check_probability(
        "router.endpoint_accept_probability",
        config.router.endpoint_accept_probability,
    )?;
    check_probability(
        "router.constant_accept_probability",
        config.router.constant_accept_probability,
    )?;
    check_probability(
        "design.disable_probability",
        config.design.disable_probability,
    )?;
    if config.router.max_iterations == 0 {
        return Err(ConfigError::ValidationError(
            "router.max_iterations must be positive".to_string(),
        ));
    }
    if config.design.slots == 0 {
        return Err(ConfigError::ValidationError(
            "design.slots must be positive".to_string(),
        ));
    }
    if config.scheduler.rare_retries == 0 || config.scheduler.common_retries == 0 {
        return Err(ConfigError::ValidationError(
            "scheduler retry budgets must be positive".to_string(),
        ));
    }
    Ok(())
}

fn check_probability(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{field} must be within [0, 1], got {value}"
        )))
    }
}
