use super::{Notification, NotificationInsert};
use crate::repository::Error;
use async_trait::async_trait;
use bson::oid::ObjectId;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationsRepository: Send + Sync {
    ///
    /// Inserts all notifications as unread.
    /// Either all notifications are saved or none of them.
    ///
    /// A failed insert is undone by deleting everything saved with the same batch id.
    /// When that delete fails as well the saved part of the batch stays behind,
    /// is never pushed and is only reported in logs with its batch id.
    ///
    /// ### Returns
    /// Inserted notifications in the same order
    ///
    async fn insert_many(
        &self,
        notifications: Vec<NotificationInsert>,
    ) -> Result<Vec<Notification>, Error>;

    ///
    /// Finds page of user notifications sorted descending by creation date
    ///
    /// ### Returns
    /// Found notifications and total number of user notifications
    ///
    async fn find_many(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Notification>, u64), Error>;

    async fn count_unread(&self, user_id: i64) -> Result<u64, Error>;

    ///
    /// Marks notification as read. Marking already read notification succeeds.
    ///
    /// ### Errors
    /// - [Error::NoDocumentUpdated] when
    ///     - notification does not exist
    ///     - notification does not belong to the user
    ///
    async fn update_read(&self, id: ObjectId, user_id: i64) -> Result<(), Error>;

    ///
    /// Marks all user notifications as read
    ///
    /// ### Returns
    /// Number of notifications that changed
    ///
    async fn update_all_read(&self, user_id: i64) -> Result<u64, Error>;

    ///
    /// ### Errors
    /// - [Error::NoDocumentUpdated] when
    ///     - notification does not exist
    ///     - notification does not belong to the user
    ///
    async fn delete(&self, id: ObjectId, user_id: i64) -> Result<(), Error>;
}
