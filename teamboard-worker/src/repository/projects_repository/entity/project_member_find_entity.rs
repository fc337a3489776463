use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ProjectMemberFindEntity {
    pub project_id: i64,
    pub user_id: i64,
}
