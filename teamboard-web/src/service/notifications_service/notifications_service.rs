use super::{ProjectSnapshot, UserSummary};
use crate::{
    dto::{input, output},
    error::Error,
};
use async_trait::async_trait;
use bson::oid::ObjectId;
use time::OffsetDateTime;

///
/// Creates notifications for business events, stores them and pushes them
/// to connected users. Membership changes also enqueue emails.
///
/// Triggers fail only when notifications could not be stored.
/// Push and email failures are logged.
///
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationsService: Send + Sync {
    async fn notify_team_created(
        &self,
        team_name: &str,
        leader: &UserSummary,
        created_at: OffsetDateTime,
    ) -> Result<(), Error>;

    async fn notify_team_updated(
        &self,
        team_id: i64,
        team_name: &str,
        info_changed: bool,
        leader_changed: bool,
    ) -> Result<(), Error>;

    ///
    /// member_ids have to be captured before the team is deleted
    ///
    async fn notify_team_deleted(&self, team_name: &str, member_ids: &[i64])
        -> Result<(), Error>;

    async fn notify_team_member_added(
        &self,
        team_id: i64,
        team_name: &str,
        user: &UserSummary,
    ) -> Result<(), Error>;

    async fn notify_team_member_removed(
        &self,
        team_id: i64,
        team_name: &str,
        user: &UserSummary,
    ) -> Result<(), Error>;

    async fn notify_project_created(
        &self,
        project_name: &str,
        leader_name: &str,
        created_at: OffsetDateTime,
        members: &[UserSummary],
    ) -> Result<(), Error>;

    ///
    /// Notifies removed, added and retained members in a single batch
    ///
    async fn notify_project_updated(
        &self,
        before: &ProjectSnapshot,
        after: &ProjectSnapshot,
        members_before: &[UserSummary],
        members_after: &[UserSummary],
    ) -> Result<(), Error>;

    ///
    /// Has to be called before project members are deleted
    ///
    async fn notify_project_deleted(&self, project_id: i64, project_name: &str)
        -> Result<(), Error>;

    ///
    /// ### Errors
    /// - [Error::Validation] when
    ///     - limit is outside of 1..=100
    ///     - offset is negative
    ///
    async fn find_notifications(
        &self,
        user_id: i64,
        pagination: input::Pagination,
    ) -> Result<output::NotificationsPage, Error>;

    async fn unread_count(&self, user_id: i64) -> Result<output::UnreadCount, Error>;

    ///
    /// Marking already read notification succeeds
    ///
    /// ### Errors
    /// - [Error::NotificationNotExist] when notification
    ///   does not exist or belongs to other user
    ///
    async fn mark_as_read(&self, user_id: i64, id: ObjectId) -> Result<(), Error>;

    async fn mark_all_as_read(&self, user_id: i64) -> Result<(), Error>;

    ///
    /// ### Errors
    /// - [Error::NotificationNotExist] when notification
    ///   does not exist or belongs to other user
    ///
    async fn delete_notification(&self, user_id: i64, id: ObjectId) -> Result<(), Error>;
}
