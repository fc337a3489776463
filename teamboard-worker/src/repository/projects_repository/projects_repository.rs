use super::ProjectDeadline;
use crate::repository::Error;
use async_trait::async_trait;
use time::Date;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectsRepository: Send + Sync {
    ///
    /// Projects with end date within `from..=to` together with their members,
    /// ordered by end date
    ///
    async fn find_due_between(&self, from: Date, to: Date) -> Result<Vec<ProjectDeadline>, Error>;
}
