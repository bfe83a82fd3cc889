//! Configuration module for hunt-core
//!
//! Provides configuration loading, validation, and default settings
//! for the engagement engine.

mod defaults;
mod loader;
mod validator;

pub use defaults::{default_config, ConfigDefaults};
pub use loader::{
    load_config, ConfigLoader, LoggingConfig, PacingConfig, ProcessConfig, ScreenConfig,
    TargetingConfig,
};
pub use validator::{validate_config, ConfigValidator};

// Re-export the main configuration structure
pub use loader::Config;

// Configuration-related error type
pub use loader::ConfigError;

// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;
