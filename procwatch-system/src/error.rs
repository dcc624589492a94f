use procwatch_core::CoreError;
use procwatch_domain::{DomainError, IconError, NotificationError, RuleError};
use std::path::PathBuf;
use thiserror::Error;

pub type SystemResult<T> = Result<T, SystemError>;

#[derive(Error, Debug)]
pub enum SystemError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Failed to read process table at {path:?}: {source}")]
    ProcessTable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Control loop is no longer running")]
    ControlLoopClosed,
    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<RuleError> for SystemError {
    fn from(err: RuleError) -> Self {
        SystemError::Domain(err.into())
    }
}

impl From<IconError> for SystemError {
    fn from(err: IconError) -> Self {
        SystemError::Domain(err.into())
    }
}

impl From<NotificationError> for SystemError {
    fn from(err: NotificationError) -> Self {
        SystemError::Domain(err.into())
    }
}
