//! Gateway-injected identity header extractor.

use axum::extract::FromRequestParts;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

/// Header the gateway sets after validating the caller's access token.
pub const ACCOUNT_ID_HEADER: &str = "x-nextube-account-id";

/// Why the identity header could not be read. Renders as a 401 with the
/// services' `{kind, message}` error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdentityRejection {
    #[error("missing account identity")]
    Missing,
    #[error("malformed account identity")]
    Malformed,
}

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "kind": "UNAUTHENTICATED",
            "message": self.to_string(),
        });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

/// Caller identity injected by the gateway via `x-nextube-account-id`.
///
/// Rejects with 401 if the header is absent or cannot be parsed as UUID.
#[derive(Debug, Clone)]
pub struct IdentityHeaders {
    pub account_id: Uuid,
}

impl<S> FromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = IdentityRejection;

    // Values are read synchronously so the returned future is 'static.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let account_id = match parts.headers.get(ACCOUNT_ID_HEADER) {
            None => Err(IdentityRejection::Missing),
            Some(v) => v
                .to_str()
                .ok()
                .and_then(|s| s.parse::<Uuid>().ok())
                .ok_or(IdentityRejection::Malformed),
        };

        async move { Ok(Self { account_id: account_id? }) }
    }
}
