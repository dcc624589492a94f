//! # procwatch core library (`procwatch-core`)
//!
//! Foundation shared by every procwatch crate:
//!
//! - **Error handling**: [`CoreError`] with the more specific [`ConfigError`]
//!   and [`LoggingError`].
//! - **Configuration**: the TOML schema rooted at [`CoreConfig`], loaded and
//!   validated by [`ConfigLoader`].
//! - **Logging**: `tracing` based console and rolling-file output.
//! - **Utilities**: filesystem helpers, application directories and the path
//!   normalization used for rule matching and icon cache keys.
//!
//! ```rust,ignore
//! use procwatch_core::config::ConfigLoader;
//! use procwatch_core::logging::init_logging;
//!
//! fn main() -> Result<(), procwatch_core::CoreError> {
//!     let config = ConfigLoader::load()?;
//!     init_logging(&config.logging, false)?;
//!     tracing::info!("procwatch core initialized");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod utils;

pub use config::{ConfigLoader, CoreConfig, IconConfig, LoggingConfig, MonitorConfig, NotificationConfig, PathsConfig};
pub use error::{ConfigError, CoreError, LoggingError};
pub use logging::{init_logging, init_minimal_logging};
