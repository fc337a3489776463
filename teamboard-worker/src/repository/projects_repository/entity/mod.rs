mod project_find_entity;
mod project_member_find_entity;
mod user_find_entity;

pub use project_find_entity::*;
pub use project_member_find_entity::*;
pub use user_find_entity::*;
