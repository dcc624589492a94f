//! Error type aggregating the domain's component errors.

use procwatch_core::CoreError;
use thiserror::Error;

use crate::icons::IconError;
use crate::notifications::NotificationError;
use crate::rules::RuleError;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Rules(#[from] RuleError),

    #[error(transparent)]
    Icons(#[from] IconError),

    #[error(transparent)]
    Notification(#[from] NotificationError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::NotificationId;

    #[test]
    fn test_domain_error_is_transparent() {
        let id = NotificationId::new();
        let err: DomainError = NotificationError::UnknownNotification(id).into();
        assert_eq!(err.to_string(), format!("Notification with ID '{id}' not found."));
        let err: DomainError = RuleError::InvalidEntry("x".into()).into();
        assert!(matches!(err, DomainError::Rules(_)));
    }
}
