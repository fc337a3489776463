use crate::auth::{JwtAuthorizationValidator, JwtDecoder};
use axum::{body::Body, http::Request};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    trace::{DefaultOnRequest, DefaultOnResponse, MakeSpan, TraceLayer},
    validate_request::ValidateRequestHeaderLayer,
};
use tracing::{Level, Span};
use uuid::Uuid;

pub struct ApplicationMiddleware {
    pub auth: ValidateRequestHeaderLayer<JwtAuthorizationValidator>,
    pub trace: TraceLayer<SharedClassifier<ServerErrorsAsFailures>, RequestSpan>,
}

pub fn create_middleware(jwt_decoder: JwtDecoder) -> ApplicationMiddleware {
    let auth = ValidateRequestHeaderLayer::custom(JwtAuthorizationValidator::new(jwt_decoder));

    let trace = TraceLayer::new_for_http()
        .make_span_with(RequestSpan)
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    ApplicationMiddleware { auth, trace }
}

///
/// Span with unique request id, so logs of concurrent requests can be told apart
///
#[derive(Clone)]
pub struct RequestSpan;

impl MakeSpan<Body> for RequestSpan {
    fn make_span(&mut self, request: &Request<Body>) -> Span {
        tracing::info_span!(
            "Request",
            id = %Uuid::new_v4(),
            method = %request.method(),
            path = %request.uri().path(),
        )
    }
}
