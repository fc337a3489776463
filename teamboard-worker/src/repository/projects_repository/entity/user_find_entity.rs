use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct UserFindEntity {
    pub _id: i64,
    pub name: String,
    pub email: String,
}
