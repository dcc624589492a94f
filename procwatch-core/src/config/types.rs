//! Configuration data structures for procwatch.
//!
//! These structs are populated by deserializing `config.toml`. Missing fields
//! take their values from [`super::defaults`], and unknown fields are rejected
//! via `#[serde(deny_unknown_fields)]` so typos surface as parse errors instead
//! of being silently ignored.

use super::defaults;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration settings for the logging subsystem.
///
/// # Examples
///
/// ```
/// use procwatch_core::config::LoggingConfig;
/// use std::path::PathBuf;
///
/// let default_log_config = LoggingConfig::default();
/// assert_eq!(default_log_config.level, "info");
/// assert_eq!(default_log_config.file_path, None);
///
/// let toml_str = r#"
/// level = "debug"
/// file_path = "/var/log/procwatch.log"
/// format = "json"
/// "#;
/// let log_config: LoggingConfig = toml::from_str(toml_str).unwrap();
/// assert_eq!(log_config.file_path, Some(PathBuf::from("/var/log/procwatch.log")));
/// assert_eq!(log_config.format, "json");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// One of "trace", "debug", "info", "warn", "error" (case-insensitive).
    #[serde(default = "defaults::default_log_level")]
    pub level: String,
    /// Optional log file. Relative paths are resolved against the state directory.
    #[serde(default = "defaults::default_log_file_path", skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    /// "text" or "json".
    #[serde(default = "defaults::default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        defaults::default_logging_config()
    }
}

/// Settings for the process feed and rule list reloading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    /// Process feed cadence in seconds.
    #[serde(default = "defaults::default_poll_interval")]
    pub poll_interval: f64,
    /// Cadence of the rule and icon mapping file modification checks, in seconds.
    #[serde(default = "defaults::default_rule_reload_interval")]
    pub rule_reload_interval: f64,
    /// When `false`, blocked processes are still announced (flagged as blocked).
    #[serde(default = "defaults::default_true")]
    pub blocking_enabled: bool,
    /// Whether processes no rule applies to are announced.
    #[serde(default = "defaults::default_true")]
    pub show_unmatched: bool,
}

/// Shortest accepted polling or reload cadence.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);
/// Longest accepted polling or reload cadence.
pub const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Converts a cadence in seconds, clamped to `[MIN_INTERVAL, MAX_INTERVAL]`.
/// Values that are not a valid duration at all map to `MAX_INTERVAL`.
pub fn interval_from_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs)
        .unwrap_or(MAX_INTERVAL)
        .clamp(MIN_INTERVAL, MAX_INTERVAL)
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        interval_from_secs(self.poll_interval)
    }

    pub fn rule_reload_interval(&self) -> Duration {
        interval_from_secs(self.rule_reload_interval)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        defaults::default_monitor_config()
    }
}

/// Notification stack geometry, timing and admission limits.
///
/// Pixel values are signed because layout arithmetic routinely produces
/// positions above the screen origin before clamping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationConfig {
    #[serde(default = "defaults::default_true")]
    pub enabled: bool,
    /// Maximum admissions within any one-second window.
    #[serde(default = "defaults::default_rate_limit")]
    pub rate_limit: u32,
    /// Soft capacity of the stack, in records.
    #[serde(default = "defaults::default_max_notifications")]
    pub max_notifications: u32,
    /// Fade length in milliseconds.
    #[serde(default = "defaults::default_fade_duration")]
    pub fade_duration: u64,
    /// Idle time before the fade starts, in milliseconds.
    #[serde(default = "defaults::default_display_time")]
    pub display_time: u64,
    #[serde(default = "defaults::default_margin_right")]
    pub margin_right: i32,
    #[serde(default = "defaults::default_margin_bottom")]
    pub margin_bottom: i32,
    #[serde(default = "defaults::default_spacing")]
    pub spacing: i32,
    /// Highest y a record may occupy.
    #[serde(default = "defaults::default_top_margin")]
    pub top_margin: i32,
    /// Record height in pixels.
    #[serde(default = "defaults::default_notification_height")]
    pub height: i32,
    /// Icon-only footprint in pixels.
    #[serde(default = "defaults::default_collapsed_width")]
    pub collapsed_width: i32,
    /// Queue drain tick in milliseconds.
    #[serde(default = "defaults::default_queue_drain_interval")]
    pub queue_drain_interval: u64,
    /// Most records kept waiting for a slot; further ones are dropped.
    #[serde(default = "defaults::default_queue_limit")]
    pub queue_limit: usize,
    /// Show every record at full width.
    #[serde(default = "defaults::default_false")]
    pub expanded_view: bool,
    #[serde(default = "defaults::default_screen_width")]
    pub screen_width: i32,
    #[serde(default = "defaults::default_screen_height")]
    pub screen_height: i32,
}

impl NotificationConfig {
    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_duration)
    }

    pub fn display_time(&self) -> Duration {
        Duration::from_millis(self.display_time)
    }

    pub fn queue_drain_interval(&self) -> Duration {
        Duration::from_millis(self.queue_drain_interval)
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        defaults::default_notification_config()
    }
}

/// Icon cache bounds and icon lookup settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IconConfig {
    #[serde(default = "defaults::default_icon_cache_max_size")]
    pub icon_cache_max_size: usize,
    /// Entry lifetime in seconds.
    #[serde(default = "defaults::default_icon_cache_timeout")]
    pub icon_cache_timeout: u64,
    /// Upper bound for one provider lookup, in milliseconds.
    #[serde(default = "defaults::default_resolve_timeout")]
    pub resolve_timeout: u64,
    /// Directories searched for `<name>.png` / `<name>.svg`.
    #[serde(default = "defaults::default_theme_dirs")]
    pub theme_dirs: Vec<PathBuf>,
}

impl IconConfig {
    pub fn icon_cache_timeout(&self) -> Duration {
        Duration::from_secs(self.icon_cache_timeout)
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout)
    }
}

impl Default for IconConfig {
    fn default() -> Self {
        defaults::default_icon_config()
    }
}

/// Locations of the rule lists and icon mapping files.
///
/// Relative paths are resolved against the application config directory by
/// [`super::ConfigLoader`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    #[serde(default = "defaults::default_block_list_path")]
    pub block_list: PathBuf,
    #[serde(default = "defaults::default_allow_list_path")]
    pub allow_list: PathBuf,
    /// `key,icon_name` overrides.
    #[serde(default = "defaults::default_custom_icons_path")]
    pub custom_icons: PathBuf,
    /// Directory holding the images named by `custom_icons`.
    #[serde(default = "defaults::default_custom_icons_dir")]
    pub custom_icons_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        defaults::default_paths_config()
    }
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use procwatch_core::config::CoreConfig;
///
/// let loaded: CoreConfig = toml::from_str(r#"
/// [notifications]
/// rate_limit = 5
/// "#).unwrap();
/// assert_eq!(loaded.notifications.rate_limit, 5);
/// assert_eq!(loaded.notifications.max_notifications, 20);
/// assert_eq!(loaded.icons.icon_cache_max_size, 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    #[serde(default = "defaults::default_logging_config")]
    pub logging: LoggingConfig,
    #[serde(default = "defaults::default_monitor_config")]
    pub monitor: MonitorConfig,
    #[serde(default = "defaults::default_notification_config")]
    pub notifications: NotificationConfig,
    #[serde(default = "defaults::default_icon_config")]
    pub icons: IconConfig,
    #[serde(default = "defaults::default_paths_config")]
    pub paths: PathsConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            logging: defaults::default_logging_config(),
            monitor: defaults::default_monitor_config(),
            notifications: defaults::default_notification_config(),
            icons: defaults::default_icon_config(),
            paths: defaults::default_paths_config(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_notification_config_defaults() {
        let config = NotificationConfig::default();
        assert_eq!(config.rate_limit, 10);
        assert_eq!(config.max_notifications, 20);
        assert_eq!(config.fade_duration(), Duration::from_millis(2000));
        assert_eq!(config.display_time(), Duration::from_millis(5000));
        assert_eq!((config.margin_right, config.margin_bottom, config.spacing), (4, 50, 2));
        assert_eq!(config.top_margin, 10);
        assert_eq!(config.queue_drain_interval(), Duration::from_secs(1));
        assert_eq!(config.queue_limit, 100);
    }

    #[test]
    fn test_monitor_config_durations() {
        let config = MonitorConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.rule_reload_interval(), Duration::from_secs(5));
        assert!(config.blocking_enabled);
    }

    #[test]
    fn test_monitor_intervals_never_leave_accepted_range() {
        let mut config = MonitorConfig::default();
        config.poll_interval = 1e-10;
        config.rule_reload_interval = 1e20;
        assert_eq!(config.poll_interval(), MIN_INTERVAL);
        assert_eq!(config.rule_reload_interval(), MAX_INTERVAL);

        config.poll_interval = f64::NAN;
        assert_eq!(config.poll_interval(), MAX_INTERVAL);
        config.poll_interval = 0.5;
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_icon_config_defaults() {
        let config = IconConfig::default();
        assert_eq!(config.icon_cache_max_size, 1000);
        assert_eq!(config.icon_cache_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_core_config_deserialize_empty_uses_defaults() {
        let config: CoreConfig = toml::from_str("").unwrap();
        assert_eq!(config, CoreConfig::default());
    }

    #[test]
    fn test_core_config_rejects_unknown_fields() {
        let result = toml::from_str::<CoreConfig>("[notifications]\nrate_limt = 3\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_core_config_round_trips_through_toml() {
        let mut config = CoreConfig::default();
        config.notifications.expanded_view = true;
        config.monitor.blocking_enabled = false;
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: CoreConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_logging_config_deserialize_from_json() {
        let config: LoggingConfig = serde_json::from_str(r#"{"level": "trace"}"#).unwrap();
        assert_eq!(config.level, "trace");
        assert_eq!(config.format, "text");
    }
}
