//! Default configuration values for hunt-core

use crate::core::types::Architecture;
use crate::engage::{AcquireMode, DelayRange, LootMode};
use serde::{Deserialize, Serialize};

/// Default configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDefaults {
    pub process: ProcessDefaults,
    pub targeting: TargetingDefaults,
    pub screen: ScreenDefaults,
    pub pacing: PacingDefaults,
    pub logging: LoggingDefaults,
}

/// Default attach configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessDefaults {
    pub architecture: Architecture,
    pub enable_debug_privilege: bool,
}

/// Default targeting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetingDefaults {
    pub acquire: AcquireMode,
    pub attack_key: u32,
    pub loot_mode: LootMode,
}

/// Default screen geometry; the centre and battle list need calibrating
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenDefaults {
    pub center_x: i32,
    pub center_y: i32,
    pub square_size: i32,
    pub title_bar_offset: i32,
}

/// Default pacing bands, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingDefaults {
    pub poll: DelayRange,
    pub acquire: DelayRange,
    pub post_move: DelayRange,
    pub loot_settle: DelayRange,
    pub loot_open: DelayRange,
    pub skin_press: DelayRange,
    pub skin_interact: DelayRange,
    pub stuck_threshold_ms: u64,
    pub search_radius: i32,
    pub node_budget: usize,
}

/// Default logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingDefaults {
    pub level: String,
    pub file: String,
}

/// Returns the default configuration
pub fn default_config() -> ConfigDefaults {
    ConfigDefaults {
        process: ProcessDefaults {
            architecture: Architecture::X64,
            enable_debug_privilege: true,
        },
        targeting: TargetingDefaults {
            acquire: AcquireMode::Hotkey,
            attack_key: 1,
            loot_mode: LootMode::Collect,
        },
        screen: ScreenDefaults {
            center_x: 0,
            center_y: 0,
            square_size: 32,
            title_bar_offset: 0,
        },
        pacing: PacingDefaults {
            poll: DelayRange::new(70, 100),
            acquire: DelayRange::new(100, 150),
            post_move: DelayRange::new(100, 200),
            loot_settle: DelayRange::new(400, 500),
            loot_open: DelayRange::new(300, 500),
            skin_press: DelayRange::new(10, 50),
            skin_interact: DelayRange::new(150, 250),
            stuck_threshold_ms: 400,
            search_radius: 10,
            node_budget: 4096,
        },
        logging: LoggingDefaults {
            level: "info".to_string(),
            // Empty logs to stderr only
            file: String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pacing_defaults() {
        let config = default_config();
        assert_eq!(config.pacing.poll, DelayRange::new(70, 100));
        assert_eq!(config.pacing.post_move, DelayRange::new(100, 200));
        assert_eq!(config.pacing.stuck_threshold_ms, 400);
        assert_eq!(config.pacing.search_radius, 10);
        assert_eq!(config.pacing.node_budget, 4096);
    }

    #[test]
    fn test_screen_defaults() {
        let config = default_config();
        assert_eq!(config.screen.square_size, 32);
        assert_eq!(config.screen.title_bar_offset, 0);
    }

    #[test]
    fn test_serialization() {
        let config = default_config();
        let serialized = toml::to_string(&config).unwrap();
        assert!(serialized.contains("stuck_threshold_ms"));

        let deserialized: ConfigDefaults = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.pacing.loot_open, config.pacing.loot_open);
        assert_eq!(deserialized.process.architecture, Architecture::X64);
    }
}
