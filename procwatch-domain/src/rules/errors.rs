use procwatch_core::error::CoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    /// A rule list could not be read. Callers keep whatever list they had.
    #[error("Failed to load rule list from {path:?}")]
    ConfigLoad {
        path: PathBuf,
        #[source]
        source: CoreError,
    },

    #[error("Failed to update rule list at {path:?}")]
    Persist {
        path: PathBuf,
        #[source]
        source: CoreError,
    },

    #[error("Invalid rule entry '{0}'")]
    InvalidEntry(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    #[test]
    fn test_rule_error_display_and_source() {
        let err = RuleError::ConfigLoad {
            path: PathBuf::from("/cfg/block_list.txt"),
            source: CoreError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "denied")),
        };
        assert_eq!(err.to_string(), "Failed to load rule list from \"/cfg/block_list.txt\"");
        assert!(err.source().is_some());
        assert_eq!(RuleError::InvalidEntry("#x".into()).to_string(), "Invalid rule entry '#x'");
    }
}
