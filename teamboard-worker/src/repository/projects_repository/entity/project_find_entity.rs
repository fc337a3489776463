use bson::DateTime;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ProjectFindEntity {
    pub _id: i64,
    pub name: String,
    pub end_date: DateTime,
}
