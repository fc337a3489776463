use super::MembershipsRepository;
use crate::repository::Error;
use async_trait::async_trait;
use bson::{doc, Bson, DateTime, Document};
use mongodb::Database;

const TEAM_MEMBERS: &str = "team_members";
const PROJECT_MEMBERS: &str = "project_members";

pub struct MembershipsRepositoryImpl {
    database: Database,
}

impl MembershipsRepositoryImpl {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn user_ids(values: Vec<Bson>) -> Vec<i64> {
        let mut user_ids = values
            .into_iter()
            .filter_map(|value| match value {
                Bson::Int64(user_id) => Some(user_id),
                Bson::Int32(user_id) => Some(user_id as i64),
                other => {
                    tracing::warn!(value = %other, "skipping member with invalid user_id");
                    None
                }
            })
            .collect::<Vec<_>>();
        user_ids.sort_unstable();

        user_ids
    }
}

#[async_trait]
impl MembershipsRepository for MembershipsRepositoryImpl {
    async fn find_active_member_ids_by_team(&self, team_id: i64) -> Result<Vec<i64>, Error> {
        let values = self
            .database
            .collection::<Document>(TEAM_MEMBERS)
            .distinct(
                "user_id",
                doc! {
                    "team_id": team_id,
                    "left_at": None as Option<DateTime>,
                },
            )
            .await?;

        Ok(Self::user_ids(values))
    }

    async fn find_member_ids_by_project(&self, project_id: i64) -> Result<Vec<i64>, Error> {
        let values = self
            .database
            .collection::<Document>(PROJECT_MEMBERS)
            .distinct("user_id", doc! { "project_id": project_id })
            .await?;

        Ok(Self::user_ids(values))
    }
}
