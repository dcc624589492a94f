//! Default configuration values for procwatch.
//!
//! These functions are used by `serde`'s `default` attribute in the configuration
//! structures to provide values for fields missing from `config.toml`.

use super::types::{IconConfig, LoggingConfig, MonitorConfig, NotificationConfig, PathsConfig};
use std::path::PathBuf;

pub(super) fn default_logging_config() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        file_path: default_log_file_path(),
        format: default_log_format(),
    }
}

/// Returns the default log level string (`"info"`).
pub(super) fn default_log_level() -> String {
    "info".to_string()
}

/// No log file by default.
pub(super) fn default_log_file_path() -> Option<PathBuf> {
    None
}

/// Returns the default log format string (`"text"`).
pub(super) fn default_log_format() -> String {
    "text".to_string()
}

pub(super) fn default_monitor_config() -> MonitorConfig {
    MonitorConfig {
        poll_interval: default_poll_interval(),
        rule_reload_interval: default_rule_reload_interval(),
        blocking_enabled: default_true(),
        show_unmatched: default_true(),
    }
}

/// Process feed cadence in seconds.
pub(super) fn default_poll_interval() -> f64 {
    0.5
}

/// Rule and mapping file modification check cadence in seconds.
pub(super) fn default_rule_reload_interval() -> f64 {
    5.0
}

pub(super) fn default_true() -> bool {
    true
}

pub(super) fn default_false() -> bool {
    false
}

pub(super) fn default_notification_config() -> NotificationConfig {
    NotificationConfig {
        enabled: default_true(),
        rate_limit: default_rate_limit(),
        max_notifications: default_max_notifications(),
        fade_duration: default_fade_duration(),
        display_time: default_display_time(),
        margin_right: default_margin_right(),
        margin_bottom: default_margin_bottom(),
        spacing: default_spacing(),
        top_margin: default_top_margin(),
        height: default_notification_height(),
        collapsed_width: default_collapsed_width(),
        queue_drain_interval: default_queue_drain_interval(),
        queue_limit: default_queue_limit(),
        expanded_view: default_false(),
        screen_width: default_screen_width(),
        screen_height: default_screen_height(),
    }
}

/// Admissions allowed per sliding one-second window.
pub(super) fn default_rate_limit() -> u32 {
    10
}

pub(super) fn default_max_notifications() -> u32 {
    20
}

/// Fade-out length in milliseconds.
pub(super) fn default_fade_duration() -> u64 {
    2000
}

/// Idle time before fading starts, in milliseconds.
pub(super) fn default_display_time() -> u64 {
    5000
}

pub(super) fn default_margin_right() -> i32 {
    4
}

pub(super) fn default_margin_bottom() -> i32 {
    50
}

pub(super) fn default_spacing() -> i32 {
    2
}

pub(super) fn default_top_margin() -> i32 {
    10
}

pub(super) fn default_notification_height() -> i32 {
    64
}

pub(super) fn default_collapsed_width() -> i32 {
    52
}

/// Queue drain tick in milliseconds.
pub(super) fn default_queue_drain_interval() -> u64 {
    1000
}

pub(super) fn default_queue_limit() -> usize {
    100
}

pub(super) fn default_screen_width() -> i32 {
    1920
}

pub(super) fn default_screen_height() -> i32 {
    1080
}

pub(super) fn default_icon_config() -> IconConfig {
    IconConfig {
        icon_cache_max_size: default_icon_cache_max_size(),
        icon_cache_timeout: default_icon_cache_timeout(),
        resolve_timeout: default_resolve_timeout(),
        theme_dirs: default_theme_dirs(),
    }
}

pub(super) fn default_icon_cache_max_size() -> usize {
    1000
}

/// Icon cache entry lifetime in seconds.
pub(super) fn default_icon_cache_timeout() -> u64 {
    300
}

/// Upper bound for a single icon provider lookup, in milliseconds.
pub(super) fn default_resolve_timeout() -> u64 {
    2000
}

pub(super) fn default_theme_dirs() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/usr/share/pixmaps"),
        PathBuf::from("/usr/share/icons/hicolor/48x48/apps"),
    ]
}

pub(super) fn default_paths_config() -> PathsConfig {
    PathsConfig {
        block_list: default_block_list_path(),
        allow_list: default_allow_list_path(),
        custom_icons: default_custom_icons_path(),
        custom_icons_dir: default_custom_icons_dir(),
    }
}

pub(super) fn default_block_list_path() -> PathBuf {
    PathBuf::from("block_list.txt")
}

pub(super) fn default_allow_list_path() -> PathBuf {
    PathBuf::from("allow_list.txt")
}

pub(super) fn default_custom_icons_path() -> PathBuf {
    PathBuf::from("custom_icons.txt")
}

pub(super) fn default_custom_icons_dir() -> PathBuf {
    PathBuf::from("custom_icons")
}
