//! Centralized application directory paths.
//!
//! Single source of truth for the filesystem locations aura uses. Uses the
//! [`dirs`] crate for platform-appropriate resolution.
//!
//! # Environment Overrides
//!
//! - `AURA_DATA_DIR` — overrides [`data_dir`]
//! - `AURA_CONFIG_DIR` — overrides [`config_dir`]

use std::path::PathBuf;

/// Application data root directory.
///
/// Used for log files. Resolves to `dirs::data_dir()/aura/` by default;
/// override with `AURA_DATA_DIR`.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("AURA_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join("aura"))
        .unwrap_or_else(|| PathBuf::from("/tmp/aura-data"))
}

/// Application config directory.
///
/// Used for `config.toml`. Resolves to `dirs::config_dir()/aura/` by
/// default; override with `AURA_CONFIG_DIR`.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("AURA_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("aura"))
        .unwrap_or_else(|| PathBuf::from("/tmp/aura-config"))
}

/// Log file directory (`data_dir()/logs/`).
#[must_use]
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}

/// Default config file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}
