//! Configuration validator for hunt-core
//!
//! Validates configuration values to ensure they are within acceptable ranges.

use super::loader::{Config, ConfigError, LoggingConfig, PacingConfig, ScreenConfig, TargetingConfig};
use crate::engage::{AcquireMode, DelayRange};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_targeting(&config.targeting)?;
        Self::validate_screen(&config.screen, &config.targeting)?;
        Self::validate_pacing(&config.pacing)?;
        Self::validate_logging(&config.logging)?;
        Ok(())
    }

    fn validate_targeting(targeting: &TargetingConfig) -> Result<(), ConfigError> {
        if let Some(profile) = targeting.profiles.iter().find(|p| p.name.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "Target profile name cannot be empty (distance {})",
                profile.engage_distance
            )));
        }
        Ok(())
    }

    fn validate_screen(screen: &ScreenConfig, targeting: &TargetingConfig) -> Result<(), ConfigError> {
        if screen.square_size <= 0 {
            return Err(ConfigError::Invalid(
                "Square size must be greater than 0".to_string(),
            ));
        }

        if targeting.acquire == AcquireMode::BattleList && screen.battle_list.is_empty() {
            return Err(ConfigError::Invalid(
                "Battle-list acquisition needs a non-empty screen.battle_list region".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_pacing(pacing: &PacingConfig) -> Result<(), ConfigError> {
        let bands: [(&str, DelayRange); 7] = [
            ("poll", pacing.poll),
            ("acquire", pacing.acquire),
            ("post_move", pacing.post_move),
            ("loot_settle", pacing.loot_settle),
            ("loot_open", pacing.loot_open),
            ("skin_press", pacing.skin_press),
            ("skin_interact", pacing.skin_interact),
        ];
        for (name, band) in bands {
            if !band.is_valid() {
                return Err(ConfigError::Invalid(format!(
                    "Delay band {} is inverted: {}",
                    name, band
                )));
            }
        }

        if pacing.stuck_threshold_ms == 0 {
            return Err(ConfigError::Invalid(
                "Stuck threshold must be greater than 0".to_string(),
            ));
        }

        if pacing.search_radius <= 0 {
            return Err(ConfigError::Invalid(
                "Search radius must be at least 1".to_string(),
            ));
        }

        if pacing.node_budget == 0 {
            return Err(ConfigError::Invalid(
                "Planner node budget must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                logging.level, valid_levels
            )));
        }

        Ok(())
    }
}

/// Validates a configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    ConfigValidator::validate(config)
}
