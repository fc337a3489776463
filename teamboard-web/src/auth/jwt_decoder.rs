use super::{dto::JwtClaims, User};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use std::sync::Arc;

///
/// Decodes and validates JWT carrying `user_id` and `exp` claims
///
#[derive(Clone)]
pub struct JwtDecoder {
    inner: Arc<JwtDecoderInner>,
}

struct JwtDecoderInner {
    key: DecodingKey,
    validation: Validation,
}

impl JwtDecoder {
    pub fn new(key: DecodingKey, algorithms: Vec<Algorithm>) -> Self {
        let mut validation = Validation::default();
        validation.algorithms = algorithms;

        let inner = JwtDecoderInner { key, validation };

        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn decode(&self, token: &str) -> Result<User, jsonwebtoken::errors::Error> {
        let token_data =
            jsonwebtoken::decode::<JwtClaims>(token, &self.inner.key, &self.inner.validation)?;

        Ok(User {
            id: token_data.claims.user_id,
        })
    }
}
