use super::errors::NotificationError;
use super::types::{NotificationId, NotificationRecord};

/// Presentation side of the scheduler.
///
/// `render` is called whenever a record appears, moves, changes width or
/// changes flags, with the record's current geometry. `remove` is called once
/// when a record leaves the screen. Implementations must not call back into
/// the scheduler.
pub trait NotificationView: Send {
    fn render(&mut self, record: &NotificationRecord) -> Result<(), NotificationError>;

    fn remove(&mut self, id: NotificationId) -> Result<(), NotificationError>;
}

impl<V: NotificationView + ?Sized> NotificationView for Box<V> {
    fn render(&mut self, record: &NotificationRecord) -> Result<(), NotificationError> {
        (**self).render(record)
    }

    fn remove(&mut self, id: NotificationId) -> Result<(), NotificationError> {
        (**self).remove(id)
    }
}
