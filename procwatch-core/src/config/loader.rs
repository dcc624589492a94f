//! Configuration loading and saving for procwatch.
//!
//! [`ConfigLoader::load`] reads `config.toml` from the application config
//! directory. A missing file yields the defaults; a present file is parsed,
//! merged over the defaults by serde, and then validated. Relative rule list
//! and icon mapping paths are resolved against the directory holding the
//! configuration file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::types::{MAX_INTERVAL, MIN_INTERVAL};
use crate::config::CoreConfig;
use crate::error::{ConfigError, CoreError};
use crate::utils::fs as pw_fs;
use crate::utils::paths::{get_app_config_dir, get_app_state_dir};

/// Name of the configuration file inside the application config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// `ConfigLoader` provides static methods to load, validate and persist [`CoreConfig`].
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads and validates the configuration from the default location.
    ///
    /// # Errors
    ///
    /// Returns a `CoreError` if the config directory cannot be determined, the
    /// file exists but cannot be read or parsed, or validation fails.
    pub fn load() -> Result<CoreConfig, CoreError> {
        let path = Self::default_config_path()?;
        Self::load_from(&path)
    }

    /// Path of `config.toml` inside the application config directory.
    pub fn default_config_path() -> Result<PathBuf, CoreError> {
        Ok(get_app_config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Loads and validates the configuration from an explicit file.
    ///
    /// A missing or empty file produces the default configuration.
    pub fn load_from(path: &Path) -> Result<CoreConfig, CoreError> {
        let mut config = match fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => CoreConfig::default(),
            Ok(content) => toml::from_str(&content).map_err(ConfigError::ParseError)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No configuration at {:?}, using defaults", path);
                CoreConfig::default()
            }
            Err(e) => {
                return Err(CoreError::Config(ConfigError::ReadError {
                    path: path.to_path_buf(),
                    source: e,
                }));
            }
        };

        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::validate_config(&mut config, &base_dir)?;
        Ok(config)
    }

    /// Writes the configuration as TOML, atomically.
    ///
    /// The content goes to a sibling temporary file first and is renamed over
    /// the target, so a crash mid-write never leaves a truncated config behind.
    pub fn save(config: &CoreConfig, path: &Path) -> Result<(), CoreError> {
        let content = toml::to_string_pretty(config).map_err(ConfigError::SerializeError)?;
        pw_fs::write_string_atomically(path, &content)?;
        tracing::debug!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Validates the loaded `CoreConfig` and normalizes it in place.
    ///
    /// - log level and format are lowercased and checked;
    /// - admission limits, record height and intervals must be positive;
    /// - relative list/mapping paths are joined onto `base_dir`;
    /// - a relative log file path is resolved against the state directory and
    ///   its parent directory created.
    pub fn validate_config(config: &mut CoreConfig, base_dir: &Path) -> Result<(), CoreError> {
        let level_lower = config.logging.level.to_lowercase();
        match level_lower.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => config.logging.level = level_lower,
            _ => {
                return Err(validation(format!(
                    "Invalid log level: '{}'. Must be one of trace, debug, info, warn, error.",
                    config.logging.level
                )));
            }
        }

        let format_lower = config.logging.format.to_lowercase();
        match format_lower.as_str() {
            "text" | "json" => config.logging.format = format_lower,
            _ => {
                return Err(validation(format!(
                    "Invalid log format: '{}'. Must be one of text, json.",
                    config.logging.format
                )));
            }
        }

        if let Some(file_path) = &config.logging.file_path {
            let absolute = if file_path.is_absolute() {
                file_path.clone()
            } else {
                get_app_state_dir()?.join(file_path)
            };
            if let Some(parent_dir) = absolute.parent() {
                if !parent_dir.exists() {
                    pw_fs::ensure_dir_exists(parent_dir)?;
                }
            }
            config.logging.file_path = Some(absolute);
        }

        check_interval("monitor.poll_interval", config.monitor.poll_interval)?;
        check_interval("monitor.rule_reload_interval", config.monitor.rule_reload_interval)?;

        let notifications = &config.notifications;
        if notifications.rate_limit == 0 {
            return Err(validation("notifications.rate_limit must be at least 1".to_string()));
        }
        if notifications.max_notifications == 0 {
            return Err(validation("notifications.max_notifications must be at least 1".to_string()));
        }
        if notifications.height <= 0 {
            return Err(validation("notifications.height must be positive".to_string()));
        }
        if notifications.collapsed_width <= 0 {
            return Err(validation("notifications.collapsed_width must be positive".to_string()));
        }
        if notifications.spacing < 0 {
            return Err(validation("notifications.spacing must not be negative".to_string()));
        }
        if notifications.queue_limit == 0 {
            return Err(validation("notifications.queue_limit must be at least 1".to_string()));
        }
        if notifications.queue_drain_interval == 0 {
            return Err(validation("notifications.queue_drain_interval must be greater than zero".to_string()));
        }

        let paths = &mut config.paths;
        for path in [
            &mut paths.block_list,
            &mut paths.allow_list,
            &mut paths.custom_icons,
            &mut paths.custom_icons_dir,
        ] {
            if path.is_relative() {
                *path = base_dir.join(&*path);
            }
        }

        Ok(())
    }
}

/// Accepts cadences in seconds that convert to a duration within
/// `[MIN_INTERVAL, MAX_INTERVAL]`.
fn check_interval(name: &str, secs: f64) -> Result<(), CoreError> {
    match Duration::try_from_secs_f64(secs) {
        Ok(interval) if (MIN_INTERVAL..=MAX_INTERVAL).contains(&interval) => Ok(()),
        _ => Err(validation(format!(
            "{} must be between {} and {} seconds, got {}",
            name,
            MIN_INTERVAL.as_secs_f64(),
            MAX_INTERVAL.as_secs_f64(),
            secs
        ))),
    }
}

fn validation(message: String) -> CoreError {
    CoreError::Config(ConfigError::ValidationError(message))
}
