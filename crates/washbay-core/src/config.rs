//! Configuration resolution for Washbay.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/washbay/settings.json)
//! 3. Explicit config file (--config)
//! 4. Environment variables
//! 5. CLI arguments (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Complete Washbay configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// Server-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub database_path: Option<PathBuf>,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 50071,
            database_path: None,
            log_level: "info".to_string(),
        }
    }
}

/// Booking / loyalty programme configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Coins credited to the owner of a redeemed referral code.
    pub referrer_bonus: i64,
    /// Coins credited to the user who redeems a referral code.
    pub redeemer_bonus: i64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            referrer_bonus: 50,
            redeemer_bonus: 25,
        }
    }
}

/// Notification dispatch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// External notifier endpoint; `None` means log-only dispatch.
    pub webhook_url: Option<String>,
    /// Per-request timeout for webhook delivery (seconds).
    pub webhook_timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            webhook_timeout_secs: 10,
        }
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config(explicit_path: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    // Load global config
    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            let global = load_config_file(&global_path)?;
            merge_config(&mut config, global);
        }
    }

    // Load explicit config file (must exist when given)
    if let Some(path) = explicit_path {
        let explicit = load_config_file(path)?;
        merge_config(&mut config, explicit);
    }

    // Apply environment overrides
    apply_env_overrides(&mut config);

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|h| PathBuf::from(h).join(".washbay").join("settings.json"))
    }
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library/Application Support/washbay/settings.json"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
            .map(|p| p.join("washbay").join("settings.json"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        None
    }
}

/// Get the default database path for the server.
pub fn database_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|h| PathBuf::from(h).join(".washbay").join("market.db"))
    }
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library/Application Support/washbay/market.db"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
            .map(|p| p.join("washbay").join("market.db"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        None
    }
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn merge_config(base: &mut Config, overlay: Config) {
    if overlay.server.database_path.is_some() {
        base.server.database_path = overlay.server.database_path;
    }
    base.server.port = overlay.server.port;
    base.server.log_level = overlay.server.log_level;

    base.booking = overlay.booking;

    if overlay.notify.webhook_url.is_some() {
        base.notify.webhook_url = overlay.notify.webhook_url;
    }
    base.notify.webhook_timeout_secs = overlay.notify.webhook_timeout_secs;
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(val) = std::env::var("WASHBAY_PORT") {
        if let Ok(n) = val.parse() {
            config.server.port = n;
        }
    }
    if let Ok(val) = std::env::var("WASHBAY_LOG_LEVEL") {
        config.server.log_level = val;
    }
    if let Ok(val) = std::env::var("WASHBAY_REFERRER_BONUS") {
        if let Ok(n) = val.parse() {
            config.booking.referrer_bonus = n;
        }
    }
    if let Ok(val) = std::env::var("WASHBAY_REDEEMER_BONUS") {
        if let Ok(n) = val.parse() {
            config.booking.redeemer_bonus = n;
        }
    }
    if let Ok(val) = std::env::var("WASHBAY_NOTIFY_URL") {
        config.notify.webhook_url = Some(val);
    }
}
