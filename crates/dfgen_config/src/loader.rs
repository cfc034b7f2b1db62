//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{CampaignConfig, ModeKind, TechnologyKind};
use std::path::Path;

/// Loads and validates a campaign configuration file.
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

/// Checks that every sweep list is populated and every value is in range.
pub fn validate_config(config: &CampaignConfig) -> Result<(), ConfigError> {
    let campaign = &config.campaign;
    let grammar = &config.grammar;
    let invalid = |msg: String| Err(ConfigError::ValidationError(msg));

    if campaign.graph_sizes.is_empty() {
        return Err(ConfigError::MissingField("campaign.graph_sizes".to_string()));
    }
    if campaign.arch_sizes.is_empty() {
        return Err(ConfigError::MissingField("campaign.arch_sizes".to_string()));
    }
    match campaign.technology {
        TechnologyKind::Cgra if campaign.interconnects.is_empty() => {
            return Err(ConfigError::MissingField("campaign.interconnects".to_string()));
        }
        TechnologyKind::Qca if campaign.qca_schemes.is_empty() => {
            return Err(ConfigError::MissingField("campaign.qca_schemes".to_string()));
        }
        _ => {}
    }
    if campaign.technology == TechnologyKind::Qca && campaign.mode == ModeKind::Random {
        return invalid("random mode is only available for cgra".to_string());
    }

    if campaign.graph_sizes.contains(&0) {
        return invalid("graph sizes must be at least 1".to_string());
    }
    if let Some([r, c]) = campaign.arch_sizes.iter().find(|[r, c]| *r == 0 || *c == 0) {
        return invalid(format!("architecture size {r}x{c} is empty"));
    }
    if campaign.max_difficulty == 0 {
        return invalid("max_difficulty must be at least 1".to_string());
    }
    if campaign.ii == Some(0) {
        return invalid("ii must be at least 1".to_string());
    }
    if let Some(bits) = campaign
        .interconnects
        .iter()
        .find(|bits| bits.len() != 4 || !bits.chars().all(|ch| ch == '0' || ch == '1'))
    {
        return invalid(format!("interconnect '{bits}' must be 4 characters of 0/1"));
    }
    if let Some(token) = campaign
        .qca_schemes
        .iter()
        .find(|token| !matches!(token.trim().to_ascii_uppercase().as_str(), "U" | "R" | "T"))
    {
        return invalid(format!("unknown QCA scheme '{token}' (expected U, R or T)"));
    }
    if !(0.0..=1.0).contains(&campaign.alpha) {
        return invalid(format!("alpha {} must be within [0, 1]", campaign.alpha));
    }

    let [k_min, k_max] = grammar.k_range;
    if k_min == 0 || k_min > k_max {
        return invalid(format!(
            "k_range [{k_min}, {k_max}] must satisfy 1 <= min <= max"
        ));
    }
    if grammar.max_path_length == 0 {
        return invalid("max_path_length must be at least 1".to_string());
    }
    if grammar.retries_multiplier == 0 {
        return invalid("retries_multiplier must be at least 1".to_string());
    }
    if !(0.0..=1.0).contains(&grammar.merge_alpha) {
        return invalid(format!(
            "merge_alpha {} must be within [0, 1]",
            grammar.merge_alpha
        ));
    }
    Ok(())
}
