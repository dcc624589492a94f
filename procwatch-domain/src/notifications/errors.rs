use thiserror::Error;

use super::types::NotificationId;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification with ID '{0}' not found.")]
    UnknownNotification(NotificationId),

    /// The presentation layer failed to draw or withdraw a record.
    #[error("View failed for notification '{id}': {message}")]
    View { id: NotificationId, message: String },
}

impl NotificationError {
    pub fn view(id: NotificationId, message: impl Into<String>) -> Self {
        NotificationError::View { id, message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_error_display() {
        let id = NotificationId::new();
        let err = NotificationError::view(id, "surface gone");
        assert_eq!(err.to_string(), format!("View failed for notification '{id}': surface gone"));
    }
}
