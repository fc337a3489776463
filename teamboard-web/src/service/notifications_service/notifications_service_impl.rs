use super::{MembershipDiff, NotificationsService, ProjectSnapshot, UserSummary};
use crate::{
    dto::{
        input::{self, MAX_PAGE_LIMIT},
        output,
    },
    error::Error,
    repository::{self, MembershipsRepository, NotificationInsert, NotificationsRepository},
    service::{relay::NotificationRelay, websockets_service::ConnectionRegistry},
};
use anyhow::anyhow;
use async_trait::async_trait;
use bson::oid::ObjectId;
use email_jobs::{EmailJobsProducer, ProjectMembershipEmail, TeamMembershipEmail};
use std::{
    collections::{BTreeSet, HashMap, HashSet},
    sync::Arc,
};
use time::{macros::format_description, OffsetDateTime};

pub struct NotificationsServiceImpl {
    notifications_repository: Arc<dyn NotificationsRepository>,
    memberships_repository: Arc<dyn MembershipsRepository>,
    relay: Arc<dyn NotificationRelay>,
    registry: Arc<ConnectionRegistry>,
    email_jobs_producer: Arc<dyn EmailJobsProducer>,
}

impl NotificationsServiceImpl {
    pub fn new(
        notifications_repository: Arc<dyn NotificationsRepository>,
        memberships_repository: Arc<dyn MembershipsRepository>,
        relay: Arc<dyn NotificationRelay>,
        registry: Arc<ConnectionRegistry>,
        email_jobs_producer: Arc<dyn EmailJobsProducer>,
    ) -> Self {
        Self {
            notifications_repository,
            memberships_repository,
            relay,
            registry,
            email_jobs_producer,
        }
    }

    fn notification(user_id: i64, title: &str, content: &str) -> NotificationInsert {
        NotificationInsert {
            user_id,
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    fn format_created_at(created_at: OffsetDateTime) -> Result<String, Error> {
        created_at
            .format(format_description!(
                "[year]-[month]-[day] [hour]:[minute]:[second]"
            ))
            .map_err(|err| Error::UnexpectedError(anyhow!("failed to format created_at: {err}")))
    }

    fn validate_pagination(pagination: &input::Pagination) -> Result<(), Error> {
        if pagination.limit < 1 || pagination.limit > MAX_PAGE_LIMIT {
            return Err(Error::Validation("limit must be between 1 and 100"));
        }
        if pagination.offset < 0 {
            return Err(Error::Validation("offset must not be negative"));
        }

        Ok(())
    }

    ///
    /// Stores all notifications of a single event and pushes every stored one
    ///
    async fn create_and_push(&self, notifications: Vec<NotificationInsert>) -> Result<(), Error> {
        if notifications.is_empty() {
            tracing::debug!("no recipients");
            return Ok(());
        }

        let notifications = self
            .notifications_repository
            .insert_many(notifications)
            .await?;
        tracing::info!(count = notifications.len(), "created notifications");

        for notification in notifications {
            self.push(output::NotificationEvent {
                user_id: notification.user_id,
                title: notification.title,
                content: notification.content,
            })
            .await;
        }

        Ok(())
    }

    async fn push(&self, event: output::NotificationEvent) {
        match self.relay.publish(&event).await {
            Ok(()) => tracing::debug!(user_id = event.user_id, "relayed notification"),
            Err(err) => {
                tracing::warn!(user_id = event.user_id, %err, "relay failed, delivering locally");
                self.registry.send(event.user_id, Arc::new(event)).await;
            }
        }
    }

    async fn send_team_join_email(&self, user: &UserSummary, team_name: &str) {
        let data = TeamMembershipEmail {
            user_name: user.name.clone(),
            team_name: team_name.to_string(),
        };
        let result =
            email_jobs::send_team_join_email(self.email_jobs_producer.as_ref(), &user.email, &data)
                .await;
        if let Err(err) = result {
            tracing::warn!(user_id = user.id, %err, "failed to enqueue team join email");
        }
    }

    async fn send_team_leave_email(&self, user: &UserSummary, team_name: &str) {
        let data = TeamMembershipEmail {
            user_name: user.name.clone(),
            team_name: team_name.to_string(),
        };
        let result =
            email_jobs::send_team_leave_email(self.email_jobs_producer.as_ref(), &user.email, &data)
                .await;
        if let Err(err) = result {
            tracing::warn!(user_id = user.id, %err, "failed to enqueue team leave email");
        }
    }

    async fn send_project_join_email(&self, user: &UserSummary, project_name: &str) {
        let data = ProjectMembershipEmail {
            user_name: user.name.clone(),
            project_name: project_name.to_string(),
        };
        let result = email_jobs::send_project_join_email(
            self.email_jobs_producer.as_ref(),
            &user.email,
            &data,
        )
        .await;
        if let Err(err) = result {
            tracing::warn!(user_id = user.id, %err, "failed to enqueue project join email");
        }
    }

    async fn send_project_leave_email(&self, user: &UserSummary, project_name: &str) {
        let data = ProjectMembershipEmail {
            user_name: user.name.clone(),
            project_name: project_name.to_string(),
        };
        let result = email_jobs::send_project_leave_email(
            self.email_jobs_producer.as_ref(),
            &user.email,
            &data,
        )
        .await;
        if let Err(err) = result {
            tracing::warn!(user_id = user.id, %err, "failed to enqueue project leave email");
        }
    }
}

#[async_trait]
impl NotificationsService for NotificationsServiceImpl {
    async fn notify_team_created(
        &self,
        team_name: &str,
        leader: &UserSummary,
        created_at: OffsetDateTime,
    ) -> Result<(), Error> {
        tracing::info!(team_name, leader_id = leader.id, "notifying team created");

        let content = format!(
            "Team '{team_name}' has been created. Manager: {}. Created at: {}",
            leader.name,
            Self::format_created_at(created_at)?,
        );
        let notifications = vec![Self::notification(leader.id, "New Team Created", &content)];
        self.create_and_push(notifications).await?;

        self.send_team_join_email(leader, team_name).await;

        Ok(())
    }

    async fn notify_team_updated(
        &self,
        team_id: i64,
        team_name: &str,
        info_changed: bool,
        leader_changed: bool,
    ) -> Result<(), Error> {
        tracing::info!(team_id, info_changed, leader_changed, "notifying team updated");

        let mut content = format!("Team '{team_name}' has been updated. Changes: ");
        if info_changed {
            content.push_str("Team information changed. ");
        }
        if leader_changed {
            content.push_str("Team leader changed.");
        }

        let member_ids = self
            .memberships_repository
            .find_active_member_ids_by_team(team_id)
            .await?
            .into_iter()
            .collect::<BTreeSet<_>>();
        let notifications = member_ids
            .into_iter()
            .map(|user_id| Self::notification(user_id, "Team Updated", &content))
            .collect();

        self.create_and_push(notifications).await
    }

    async fn notify_team_deleted(
        &self,
        team_name: &str,
        member_ids: &[i64],
    ) -> Result<(), Error> {
        tracing::info!(team_name, members = member_ids.len(), "notifying team deleted");

        let content = format!("Team '{team_name}' has been deleted.");
        let notifications = member_ids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|user_id| Self::notification(user_id, "Team Deleted", &content))
            .collect();

        self.create_and_push(notifications).await
    }

    async fn notify_team_member_added(
        &self,
        team_id: i64,
        team_name: &str,
        user: &UserSummary,
    ) -> Result<(), Error> {
        tracing::info!(team_id, user_id = user.id, "notifying team member added");

        let member_ids = self
            .memberships_repository
            .find_active_member_ids_by_team(team_id)
            .await?
            .into_iter()
            .collect::<BTreeSet<_>>();

        let user_content = format!("You have been added to the team '{team_name}'.");
        let members_content = format!("User '{}' has joined your team.", user.name);
        let mut notifications = vec![Self::notification(user.id, "Added to Team", &user_content)];
        notifications.extend(
            member_ids
                .into_iter()
                .filter(|member_id| *member_id != user.id)
                .map(|member_id| {
                    Self::notification(member_id, "New Team Member", &members_content)
                }),
        );
        self.create_and_push(notifications).await?;

        self.send_team_join_email(user, team_name).await;

        Ok(())
    }

    async fn notify_team_member_removed(
        &self,
        team_id: i64,
        team_name: &str,
        user: &UserSummary,
    ) -> Result<(), Error> {
        tracing::info!(team_id, user_id = user.id, "notifying team member removed");

        let member_ids = self
            .memberships_repository
            .find_active_member_ids_by_team(team_id)
            .await?
            .into_iter()
            .collect::<BTreeSet<_>>();

        let user_content = format!("You have been removed from the team '{team_name}'.");
        let members_content = format!("User '{}' has been removed from your team.", user.name);
        let mut notifications = vec![Self::notification(
            user.id,
            "Removed from Team",
            &user_content,
        )];
        notifications.extend(
            member_ids
                .into_iter()
                .filter(|member_id| *member_id != user.id)
                .map(|member_id| {
                    Self::notification(member_id, "Team Member Removed", &members_content)
                }),
        );
        self.create_and_push(notifications).await?;

        self.send_team_leave_email(user, team_name).await;

        Ok(())
    }

    async fn notify_project_created(
        &self,
        project_name: &str,
        leader_name: &str,
        created_at: OffsetDateTime,
        members: &[UserSummary],
    ) -> Result<(), Error> {
        let mut seen = HashSet::new();
        let members = members
            .iter()
            .filter(|member| seen.insert(member.id))
            .collect::<Vec<_>>();
        tracing::info!(project_name, members = members.len(), "notifying project created");

        let content = format!(
            "Project '{project_name}' has been created. Manager: {leader_name}. Created at: {}",
            Self::format_created_at(created_at)?,
        );
        let notifications = members
            .iter()
            .map(|member| Self::notification(member.id, "New Project Created", &content))
            .collect();
        self.create_and_push(notifications).await?;

        for member in members {
            self.send_project_join_email(member, project_name).await;
        }

        Ok(())
    }

    async fn notify_project_updated(
        &self,
        before: &ProjectSnapshot,
        after: &ProjectSnapshot,
        members_before: &[UserSummary],
        members_after: &[UserSummary],
    ) -> Result<(), Error> {
        let ids_before = members_before
            .iter()
            .map(|member| member.id)
            .collect::<Vec<_>>();
        let ids_after = members_after
            .iter()
            .map(|member| member.id)
            .collect::<Vec<_>>();
        let diff = MembershipDiff::compute(&ids_before, &ids_after);
        let info_changed = before.info_changed(after);
        tracing::info!(
            project_name = %after.name,
            removed = diff.removed.len(),
            added = diff.added.len(),
            retained = diff.retained.len(),
            info_changed,
            "notifying project updated"
        );

        let mut notifications = Vec::new();

        let removed_content = format!("You have been removed from the project '{}'.", before.name);
        notifications.extend(diff.removed.iter().map(|user_id| {
            Self::notification(*user_id, "Removed from Project", &removed_content)
        }));

        let added_content = format!("You have been added to the project '{}'.", after.name);
        notifications.extend(
            diff.added
                .iter()
                .map(|user_id| Self::notification(*user_id, "Added to Project", &added_content)),
        );

        if info_changed || diff.members_changed() {
            let mut content = format!("Project '{}' has been updated.", after.name);
            if info_changed {
                content.push_str(" Basic information has changed.");
            }
            if !diff.added.is_empty() {
                content.push_str(&format!(
                    " {} member(s) have been added.",
                    diff.added.len()
                ));
            }
            if !diff.removed.is_empty() {
                content.push_str(&format!(
                    " {} member(s) have been removed.",
                    diff.removed.len()
                ));
            }

            notifications.extend(diff.retained.iter().map(|user_id| {
                Self::notification(*user_id, "Project Information Updated", &content)
            }));
        }

        self.create_and_push(notifications).await?;

        let users = members_before
            .iter()
            .chain(members_after.iter())
            .map(|member| (member.id, member))
            .collect::<HashMap<_, _>>();
        for user_id in &diff.added {
            if let Some(user) = users.get(user_id) {
                self.send_project_join_email(user, &after.name).await;
            }
        }
        for user_id in &diff.removed {
            if let Some(user) = users.get(user_id) {
                self.send_project_leave_email(user, &before.name).await;
            }
        }

        Ok(())
    }

    async fn notify_project_deleted(
        &self,
        project_id: i64,
        project_name: &str,
    ) -> Result<(), Error> {
        tracing::info!(project_id, "notifying project deleted");

        let member_ids = self
            .memberships_repository
            .find_member_ids_by_project(project_id)
            .await?
            .into_iter()
            .collect::<BTreeSet<_>>();

        let content = format!(
            "Project '{project_name}' has been deleted. Please contact project manager for next steps."
        );
        let notifications = member_ids
            .into_iter()
            .map(|user_id| Self::notification(user_id, "Project Deleted", &content))
            .collect();

        self.create_and_push(notifications).await
    }

    async fn find_notifications(
        &self,
        user_id: i64,
        pagination: input::Pagination,
    ) -> Result<output::NotificationsPage, Error> {
        tracing::info!(user_id, ?pagination, "finding notifications");

        Self::validate_pagination(&pagination)?;

        let (notifications, total) = self
            .notifications_repository
            .find_many(user_id, pagination.limit, pagination.offset)
            .await?;
        tracing::info!(count = notifications.len(), total, "found notifications");

        let notifications = notifications
            .into_iter()
            .map(output::Notification::from)
            .collect();

        Ok(output::NotificationsPage {
            notifications,
            total,
        })
    }

    async fn unread_count(&self, user_id: i64) -> Result<output::UnreadCount, Error> {
        let unread_count = self.notifications_repository.count_unread(user_id).await?;

        Ok(output::UnreadCount { unread_count })
    }

    async fn mark_as_read(&self, user_id: i64, id: ObjectId) -> Result<(), Error> {
        tracing::info!(user_id, %id, "marking notification as read");

        self.notifications_repository
            .update_read(id, user_id)
            .await
            .map_err(|err| match err {
                repository::Error::NoDocumentUpdated => Error::NotificationNotExist,
                err => Error::Database(err),
            })?;

        tracing::info!("marked notification as read");

        Ok(())
    }

    async fn mark_all_as_read(&self, user_id: i64) -> Result<(), Error> {
        tracing::info!(user_id, "marking all notifications as read");

        let count = self
            .notifications_repository
            .update_all_read(user_id)
            .await?;

        tracing::info!(count, "marked notifications as read");

        Ok(())
    }

    async fn delete_notification(&self, user_id: i64, id: ObjectId) -> Result<(), Error> {
        tracing::info!(user_id, %id, "deleting notification");

        self.notifications_repository
            .delete(id, user_id)
            .await
            .map_err(|err| match err {
                repository::Error::NoDocumentUpdated => Error::NotificationNotExist,
                err => Error::Database(err),
            })?;

        tracing::info!("deleted notification");

        Ok(())
    }
}
