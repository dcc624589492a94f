use procwatch_core::error::CoreError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Icon lookup failures. All are recoverable: the caller falls back to a
/// generated placeholder.
#[derive(Debug, Error)]
pub enum IconError {
    #[error("Icon resolution failed for '{key}': {reason}")]
    Resolution { key: String, reason: String },

    #[error("Icon resolution for '{key}' timed out after {timeout:?}")]
    Timeout { key: String, timeout: Duration },

    #[error("Failed to load icon mappings from {path:?}")]
    MappingLoad {
        path: PathBuf,
        #[source]
        source: CoreError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_error_display() {
        let err = IconError::Timeout { key: "/usr/bin/top".into(), timeout: Duration::from_millis(1500) };
        assert_eq!(err.to_string(), "Icon resolution for '/usr/bin/top' timed out after 1.5s");
        let err = IconError::Resolution { key: "x".into(), reason: "no file".into() };
        assert_eq!(err.to_string(), "Icon resolution failed for 'x': no file");
    }
}
