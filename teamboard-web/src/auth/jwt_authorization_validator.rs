use super::{JwtDecoder, User};
use anyhow::anyhow;
use axum::{
    body::Body,
    http::{header::AUTHORIZATION, HeaderValue, Request, Response, StatusCode},
};
use tower_http::validate_request::ValidateRequest;

///
/// Middleware that validates JWT in Authorization header.
/// If Authorization is correct [User] is added to request extensions.
///
#[derive(Clone)]
pub struct JwtAuthorizationValidator {
    decoder: JwtDecoder,
}

impl JwtAuthorizationValidator {
    pub fn new(decoder: JwtDecoder) -> Self {
        Self { decoder }
    }

    fn try_parse_authorization_header(
        &self,
        authorization_header: Option<&HeaderValue>,
    ) -> anyhow::Result<User> {
        let Some(authorization_header) = authorization_header else {
            return Err(anyhow!("missing Authorization header"));
        };
        let Ok(authorization_value) = authorization_header.to_str() else {
            return Err(anyhow!("illegal character in Authorization header"));
        };
        let Some(token) = authorization_value.strip_prefix("Bearer ") else {
            return Err(anyhow!("unsupported authorization type"));
        };

        Ok(self.decoder.decode(token)?)
    }
}

impl<B> ValidateRequest<B> for JwtAuthorizationValidator {
    type ResponseBody = Body;

    fn validate(&mut self, request: &mut Request<B>) -> Result<(), Response<Self::ResponseBody>> {
        let authorization_header = request.headers().get(AUTHORIZATION);

        let user = self
            .try_parse_authorization_header(authorization_header)
            .map_err(|err| {
                tracing::warn!(%err, "auth error");
                let mut response = Response::new(Body::empty());
                *response.status_mut() = StatusCode::UNAUTHORIZED;
                response
            })?;

        request.extensions_mut().insert(user);

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::auth::test::{create_expired_jwt, create_jwt, TEST_JWT_SECRET};
    use axum::{
        body::Body,
        http::{header::AUTHORIZATION, HeaderValue, Method, Request, StatusCode},
        routing::get,
        Extension, Router,
    };
    use jsonwebtoken::{Algorithm, DecodingKey};
    use tower::ServiceExt;
    use tower_http::validate_request::ValidateRequestHeaderLayer;

    fn validator() -> JwtAuthorizationValidator {
        JwtAuthorizationValidator::new(JwtDecoder::new(
            DecodingKey::from_secret(TEST_JWT_SECRET),
            vec![Algorithm::HS256],
        ))
    }

    #[tokio::test]
    async fn missing_authorization_header() {
        test_invalid_authorization_header(None).await;
    }

    #[tokio::test]
    async fn invalid_authorization_header() {
        test_invalid_authorization_header("invalid characters ąćś").await;
    }

    #[tokio::test]
    async fn authorization_type_not_bearer() {
        test_invalid_authorization_header("Basic dXNlcjpwYXNz").await;
    }

    #[tokio::test]
    async fn invalid_token() {
        test_invalid_authorization_header("Bearer that's not correct JWT").await;
    }

    #[tokio::test]
    async fn expired_token() {
        let authorization = format!("Bearer {}", create_expired_jwt(5));
        test_invalid_authorization_header(authorization.as_str()).await;
    }

    #[tokio::test]
    async fn correct_request_extension() {
        let authorization = format!("Bearer {}", create_jwt(5));

        let router = Router::new()
            .route(
                "/",
                get(|Extension(user): Extension<User>| async move {
                    match user.id == 5 {
                        true => StatusCode::OK,
                        false => StatusCode::INTERNAL_SERVER_ERROR,
                    }
                }),
            )
            .route_layer(ValidateRequestHeaderLayer::custom(validator()));

        let request = Request::builder()
            .method(Method::GET)
            .uri("/")
            .header(AUTHORIZATION, authorization)
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK)
    }

    async fn test_invalid_authorization_header(authorization: impl Into<Option<&str>>) {
        let router = Router::new()
            .route("/", get(|| async { StatusCode::OK }))
            .route_layer(ValidateRequestHeaderLayer::custom(validator()));

        let mut request = Request::builder()
            .method(Method::GET)
            .uri("/")
            .body(Body::empty())
            .unwrap();
        if let Some(authorization) = authorization.into() {
            request
                .headers_mut()
                .insert(AUTHORIZATION, HeaderValue::from_bytes(authorization.as_bytes()).unwrap());
        }

        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
