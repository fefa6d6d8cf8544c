//! Default paths for parkwise components
//!
//! Paths are user-writable by default (no root required):
//! - Config: `$XDG_CONFIG_HOME/parkwise/config.toml` or `~/.config/parkwise/config.toml`
//! - Data: `$XDG_DATA_HOME/parkwise` or `~/.local/share/parkwise`

use std::path::PathBuf;

/// Environment variable for overriding the config file path
pub const PARKWISE_CONFIG_ENV: &str = "PARKWISE_CONFIG";

/// Environment variable for overriding the data directory
pub const PARKWISE_DATA_DIR_ENV: &str = "PARKWISE_DATA_DIR";

/// Database filename within the data directory
pub const DATABASE_FILENAME: &str = "parkwise.db";

/// Application subdirectory name
const APP_DIR: &str = "parkwise";

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$PARKWISE_CONFIG` environment variable (if set)
/// 2. `$XDG_CONFIG_HOME/parkwise/config.toml`
/// 3. `~/.config/parkwise/config.toml`
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(PARKWISE_CONFIG_ENV) {
        return PathBuf::from(path);
    }

    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join("config.toml");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join("config.toml");
    }

    PathBuf::from("/etc").join(APP_DIR).join("config.toml")
}

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$PARKWISE_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/parkwise` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/parkwise` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(PARKWISE_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking PARKWISE_DATA_DIR.
/// Used for config defaults where the env var is checked separately.
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("data")
}
