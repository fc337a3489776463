use serde::Deserialize;

///
/// `exp` is required as well, it's checked by [jsonwebtoken::Validation]
///
#[derive(Deserialize)]
pub struct JwtClaims {
    pub user_id: i64,
}
