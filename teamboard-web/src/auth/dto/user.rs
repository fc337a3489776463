///
/// User information retrieved from his JWT.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct User {
    pub id: i64,
}
