//! Configuration management for procwatch.
//!
//! - [`types`]: the configuration schema rooted at [`CoreConfig`].
//! - [`defaults`]: default values referenced by the serde attributes.
//! - [`loader`]: [`ConfigLoader`], which loads, validates and atomically saves
//!   `config.toml`.
//!
//! # Examples
//!
//! ```rust,ignore
//! use procwatch_core::config::ConfigLoader;
//!
//! match ConfigLoader::load() {
//!     Ok(config) => println!("rate limit: {}", config.notifications.rate_limit),
//!     Err(e) => {
//!         procwatch_core::logging::init_minimal_logging();
//!         tracing::error!("Configuration error: {}", e);
//!     }
//! }
//! ```

pub mod defaults;
pub mod loader;
pub mod types;

pub use loader::{ConfigLoader, CONFIG_FILE_NAME};
pub use types::{CoreConfig, IconConfig, LoggingConfig, MonitorConfig, NotificationConfig, PathsConfig};
