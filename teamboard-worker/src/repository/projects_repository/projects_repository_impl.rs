use super::{
    entity::{ProjectFindEntity, ProjectMemberFindEntity, UserFindEntity},
    ProjectDeadline, ProjectDeadlineMember, ProjectsRepository,
};
use crate::repository::Error;
use async_trait::async_trait;
use bson::{doc, DateTime};
use futures::TryStreamExt;
use mongodb::Database;
use std::collections::HashMap;
use time::Date;

const PROJECTS: &str = "projects";
const PROJECT_MEMBERS: &str = "project_members";
const USERS: &str = "users";

pub struct ProjectsRepositoryImpl {
    database: Database,
}

impl ProjectsRepositoryImpl {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn start_of_day(date: Date) -> DateTime {
        DateTime::from(date.midnight().assume_utc())
    }

    async fn find_projects(&self, from: Date, to: Date) -> Result<Vec<ProjectFindEntity>, Error> {
        let until = to.next_day().unwrap_or(to);
        let projects = self
            .database
            .collection::<ProjectFindEntity>(PROJECTS)
            .find(doc! {
                "end_date": {
                    "$ne": None::<DateTime>,
                    "$gte": Self::start_of_day(from),
                    "$lt": Self::start_of_day(until),
                },
            })
            .sort(doc! { "end_date": 1, "_id": 1 })
            .await?
            .try_collect::<Vec<_>>()
            .await?;

        Ok(projects)
    }

    async fn find_members(
        &self,
        project_ids: Vec<i64>,
    ) -> Result<Vec<ProjectMemberFindEntity>, Error> {
        let members = self
            .database
            .collection::<ProjectMemberFindEntity>(PROJECT_MEMBERS)
            .find(doc! { "project_id": { "$in": project_ids } })
            .sort(doc! { "user_id": 1 })
            .await?
            .try_collect::<Vec<_>>()
            .await?;

        Ok(members)
    }

    async fn find_users(&self, user_ids: Vec<i64>) -> Result<HashMap<i64, UserFindEntity>, Error> {
        let users = self
            .database
            .collection::<UserFindEntity>(USERS)
            .find(doc! { "_id": { "$in": user_ids } })
            .await?
            .try_collect::<Vec<_>>()
            .await?;

        Ok(users.into_iter().map(|user| (user._id, user)).collect())
    }
}

#[async_trait]
impl ProjectsRepository for ProjectsRepositoryImpl {
    async fn find_due_between(&self, from: Date, to: Date) -> Result<Vec<ProjectDeadline>, Error> {
        let projects = self.find_projects(from, to).await?;
        if projects.is_empty() {
            return Ok(Vec::new());
        }

        let project_ids = projects.iter().map(|project| project._id).collect();
        let project_members = self.find_members(project_ids).await?;

        let mut user_ids = project_members
            .iter()
            .map(|member| member.user_id)
            .collect::<Vec<_>>();
        user_ids.sort_unstable();
        user_ids.dedup();
        let users = self.find_users(user_ids).await?;

        let mut members_by_project = HashMap::<i64, Vec<ProjectDeadlineMember>>::new();
        for member in project_members {
            let Some(user) = users.get(&member.user_id) else {
                tracing::warn!(
                    project_id = member.project_id,
                    user_id = member.user_id,
                    "project member without user"
                );
                continue;
            };

            members_by_project
                .entry(member.project_id)
                .or_default()
                .push(ProjectDeadlineMember {
                    name: user.name.clone(),
                    email: user.email.clone(),
                });
        }

        let deadlines = projects
            .into_iter()
            .map(|project| ProjectDeadline {
                members: members_by_project.remove(&project._id).unwrap_or_default(),
                name: project.name,
                end_date: project.end_date.to_time_0_3().date(),
            })
            .collect();

        Ok(deadlines)
    }
}
