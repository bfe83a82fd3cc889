//! Configuration loader for hunt-core
//!
//! Handles loading configuration from TOML files and merging with defaults.

use super::defaults::default_config;
use crate::core::types::{Architecture, Waypoint};
use crate::engage::{AcquireMode, DelayRange, LootMode, LootTable, ScreenRegion, TargetProfile};
use crate::game::AddressMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_process")]
    pub process: ProcessConfig,

    #[serde(default)]
    pub addresses: AddressMap,

    #[serde(default = "default_targeting")]
    pub targeting: TargetingConfig,

    #[serde(default = "default_screen")]
    pub screen: ScreenConfig,

    #[serde(default = "default_pacing")]
    pub pacing: PacingConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

/// Which process to attach to and how
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessConfig {
    #[serde(default)]
    pub pid: Option<u32>,
    #[serde(default = "default_architecture")]
    pub architecture: Architecture,
    #[serde(default = "default_enable_debug_privilege")]
    pub enable_debug_privilege: bool,
    /// Skips main-module resolution when set
    #[serde(default)]
    pub base_override: Option<u64>,
}

/// Target acquisition and post-kill behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetingConfig {
    #[serde(default = "default_acquire")]
    pub acquire: AcquireMode,
    #[serde(default = "default_attack_key")]
    pub attack_key: u32,
    #[serde(default)]
    pub profiles: Vec<TargetProfile>,
    /// JSON export with more profiles, appended after `profiles`
    #[serde(default)]
    pub profiles_file: Option<PathBuf>,
    #[serde(default)]
    pub blacklist: Vec<Waypoint>,
    #[serde(default)]
    pub loot_table: LootTable,
    #[serde(default = "default_loot_mode")]
    pub loot_mode: LootMode,
}

/// Game-window geometry used to turn tiles into screen points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenConfig {
    #[serde(default = "default_center_x")]
    pub center_x: i32,
    #[serde(default = "default_center_y")]
    pub center_y: i32,
    #[serde(default = "default_square_size")]
    pub square_size: i32,
    #[serde(default = "default_title_bar_offset")]
    pub title_bar_offset: i32,
    #[serde(default)]
    pub battle_list: ScreenRegion,
}

/// Randomized delays and movement tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_poll")]
    pub poll: DelayRange,
    #[serde(default = "default_acquire_delay")]
    pub acquire: DelayRange,
    #[serde(default = "default_post_move")]
    pub post_move: DelayRange,
    #[serde(default = "default_loot_settle")]
    pub loot_settle: DelayRange,
    #[serde(default = "default_loot_open")]
    pub loot_open: DelayRange,
    #[serde(default = "default_skin_press")]
    pub skin_press: DelayRange,
    #[serde(default = "default_skin_interact")]
    pub skin_interact: DelayRange,
    #[serde(default = "default_stuck_threshold_ms")]
    pub stuck_threshold_ms: u64,
    #[serde(default = "default_search_radius")]
    pub search_radius: i32,
    /// Planner expansions allowed per step before giving up
    #[serde(default = "default_node_budget")]
    pub node_budget: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_file")]
    pub file: String,
}

/// Configuration loader
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigLoader {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Loads configuration from file
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::FileNotFound(
                self.config_path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Loads configuration or returns defaults if file doesn't exist
    pub fn load_or_default(&self) -> Config {
        self.load().unwrap_or_else(|_| Config::default())
    }

    /// Saves configuration to file
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Loads `hunt.toml` from the working directory, falling back to defaults
pub fn load_config() -> Config {
    ConfigLoader::new("hunt.toml").load_or_default()
}

// Default functions for serde
fn default_process() -> ProcessConfig {
    let defaults = default_config();
    ProcessConfig {
        pid: None,
        architecture: defaults.process.architecture,
        enable_debug_privilege: defaults.process.enable_debug_privilege,
        base_override: None,
    }
}

fn default_targeting() -> TargetingConfig {
    let defaults = default_config();
    TargetingConfig {
        acquire: defaults.targeting.acquire,
        attack_key: defaults.targeting.attack_key,
        profiles: Vec::new(),
        profiles_file: None,
        blacklist: Vec::new(),
        loot_table: LootTable::default(),
        loot_mode: defaults.targeting.loot_mode,
    }
}

fn default_screen() -> ScreenConfig {
    let defaults = default_config();
    ScreenConfig {
        center_x: defaults.screen.center_x,
        center_y: defaults.screen.center_y,
        square_size: defaults.screen.square_size,
        title_bar_offset: defaults.screen.title_bar_offset,
        battle_list: ScreenRegion::default(),
    }
}

fn default_pacing() -> PacingConfig {
    let defaults = default_config().pacing;
    PacingConfig {
        poll: defaults.poll,
        acquire: defaults.acquire,
        post_move: defaults.post_move,
        loot_settle: defaults.loot_settle,
        loot_open: defaults.loot_open,
        skin_press: defaults.skin_press,
        skin_interact: defaults.skin_interact,
        stuck_threshold_ms: defaults.stuck_threshold_ms,
        search_radius: defaults.search_radius,
        node_budget: defaults.node_budget,
    }
}

fn default_logging() -> LoggingConfig {
    let defaults = default_config();
    LoggingConfig {
        level: defaults.logging.level,
        file: defaults.logging.file,
    }
}

// Individual field defaults
fn default_architecture() -> Architecture {
    default_config().process.architecture
}

fn default_enable_debug_privilege() -> bool {
    default_config().process.enable_debug_privilege
}

fn default_acquire() -> AcquireMode {
    default_config().targeting.acquire
}

fn default_attack_key() -> u32 {
    default_config().targeting.attack_key
}

fn default_loot_mode() -> LootMode {
    default_config().targeting.loot_mode
}

fn default_center_x() -> i32 {
    default_config().screen.center_x
}

fn default_center_y() -> i32 {
    default_config().screen.center_y
}

fn default_square_size() -> i32 {
    default_config().screen.square_size
}

fn default_title_bar_offset() -> i32 {
    default_config().screen.title_bar_offset
}

fn default_poll() -> DelayRange {
    default_config().pacing.poll
}

fn default_acquire_delay() -> DelayRange {
    default_config().pacing.acquire
}

fn default_post_move() -> DelayRange {
    default_config().pacing.post_move
}

fn default_loot_settle() -> DelayRange {
    default_config().pacing.loot_settle
}

fn default_loot_open() -> DelayRange {
    default_config().pacing.loot_open
}

fn default_skin_press() -> DelayRange {
    default_config().pacing.skin_press
}

fn default_skin_interact() -> DelayRange {
    default_config().pacing.skin_interact
}

fn default_stuck_threshold_ms() -> u64 {
    default_config().pacing.stuck_threshold_ms
}

fn default_search_radius() -> i32 {
    default_config().pacing.search_radius
}

fn default_node_budget() -> usize {
    default_config().pacing.node_budget
}

fn default_log_level() -> String {
    default_config().logging.level
}

fn default_log_file() -> String {
    default_config().logging.file
}

impl Default for Config {
    fn default() -> Self {
        Config {
            process: default_process(),
            addresses: AddressMap::default(),
            targeting: default_targeting(),
            screen: default_screen(),
            pacing: default_pacing(),
            logging: default_logging(),
        }
    }
}
