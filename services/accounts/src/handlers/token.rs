use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use serde::Serialize;

use nextube_auth_types::{cookie::ACCESS_TOKEN_COOKIE, token::validate_access_token};

use crate::error::AccountsServiceError;
use crate::handlers::session::token_expires_headers;
use crate::state::AppState;

#[derive(Serialize)]
pub struct CheckTokenResponse {
    pub account_id: uuid::Uuid,
    pub access_token_exp: u64,
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
}

// ── GET /users/token ─────────────────────────────────────────────────────────

/// Forward-auth target for the gateway. Reads the access token from its
/// cookie, falling back to an `Authorization: Bearer` header.
pub async fn check_token(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AccountsServiceError> {
    let token_value = jar
        .get(ACCESS_TOKEN_COOKIE)
        .map(|c| c.value().to_owned())
        .or_else(|| bearer(&headers))
        .ok_or(AccountsServiceError::InvalidToken)?;

    let info = validate_access_token(&token_value, &state.keys.access_secret)
        .map_err(|_| AccountsServiceError::InvalidToken)?;

    let body = CheckTokenResponse {
        account_id: info.account_id,
        access_token_exp: info.access_token_exp,
    };
    Ok((
        StatusCode::OK,
        token_expires_headers(info.access_token_exp),
        Json(body),
    ))
}
