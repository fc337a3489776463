use crate::repository::Error;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipsRepository: Send + Sync {
    ///
    /// Ids of users that are members of the team and have not left it
    ///
    async fn find_active_member_ids_by_team(&self, team_id: i64) -> Result<Vec<i64>, Error>;

    async fn find_member_ids_by_project(&self, project_id: i64) -> Result<Vec<i64>, Error>;
}
