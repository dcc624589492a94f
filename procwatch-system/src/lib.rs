//! System layer of procwatch.
//!
//! Connects the domain components to the machine: a `/proc` polling feed,
//! watchers for the rule lists and icon mappings, a theme-directory icon
//! provider, and the [`Orchestrator`] control loop that owns the notification
//! scheduler.

pub mod error;
pub mod events;
pub mod icon_provider;
pub mod orchestrator;
pub mod process_feed;
pub mod tasks;
pub mod view;
pub mod watchers;

pub use error::{SystemError, SystemResult};
pub use events::{ControlEvent, ControlHandle, Interaction, ResolvedIcon, StatusReport};
pub use icon_provider::{IconLookup, IconProvider, NoIconProvider, ThemeIconProvider};
pub use orchestrator::{Orchestrator, OrchestratorParts};
pub use process_feed::ProcFsFeed;
pub use tasks::BackgroundTasks;
pub use view::LoggingNotificationView;
pub use watchers::{IconMappingWatcher, RuleListWatcher};
