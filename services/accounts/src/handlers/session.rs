use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use nextube_auth_types::{
    cookie::{REFRESH_TOKEN_COOKIE, clear_cookies, set_access_token_cookie, set_refresh_token_cookie},
    identity::IdentityHeaders,
};

use crate::domain::types::AccountView;
use crate::error::AccountsServiceError;
use crate::handlers::extract::Json;
use crate::state::AppState;
use crate::usecase::session::{
    ChangePasswordInput, ChangePasswordUseCase, LoginInput, LoginUseCase, LogoutUseCase,
    RefreshTokenUseCase,
};
use crate::usecase::token::SessionTokens;

pub const X_NEXTUBE_ACCESS_TOKEN_EXPIRES: &str = "x-nextube-access-token-expires";

pub(crate) fn token_expires_headers(exp: u64) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(X_NEXTUBE_ACCESS_TOKEN_EXPIRES),
        HeaderValue::from(exp),
    );
    headers
}

/// Put both tokens of a fresh pair into cookies.
pub(crate) fn session_cookies(jar: CookieJar, state: &AppState, tokens: &SessionTokens) -> CookieJar {
    let jar = set_access_token_cookie(
        jar,
        tokens.access_token.clone(),
        state.cookie_domain.clone(),
        state.keys.access_ttl_secs,
    );
    set_refresh_token_cookie(
        jar,
        tokens.refresh_token.clone(),
        state.cookie_domain.clone(),
        state.keys.refresh_ttl_secs,
    )
}

/// Body for every endpoint that starts a session. Tokens are also set as
/// cookies; the body copy serves non-browser clients.
#[derive(Serialize)]
pub struct SessionResponse {
    pub account: AccountView,
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_exp: u64,
}

impl SessionResponse {
    pub fn new(account: AccountView, tokens: SessionTokens) -> Self {
        Self {
            account,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            access_token_exp: tokens.access_token_exp,
        }
    }
}

// ── POST /users/login ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "email", alias = "username")]
    pub identifier: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AccountsServiceError> {
    let usecase = LoginUseCase {
        accounts: state.account_repo(),
        keys: state.keys.clone(),
    };
    let out = usecase
        .execute(LoginInput {
            identifier: body.identifier,
            password: body.password,
        })
        .await?;

    let jar = session_cookies(jar, &state, &out.tokens);
    let headers = token_expires_headers(out.tokens.access_token_exp);
    Ok((
        StatusCode::OK,
        jar,
        headers,
        Json(SessionResponse::new(out.account, out.tokens)),
    ))
}

// ── POST /users/logout ───────────────────────────────────────────────────────

pub async fn logout(
    State(state): State<AppState>,
    identity: IdentityHeaders,
    jar: CookieJar,
) -> Result<impl IntoResponse, AccountsServiceError> {
    let usecase = LogoutUseCase {
        accounts: state.account_repo(),
    };
    usecase.execute(identity.account_id).await?;

    let jar = clear_cookies(jar, state.cookie_domain.clone());
    Ok((StatusCode::NO_CONTENT, jar))
}

// ── POST /users/refresh-token ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_exp: u64,
}

/// Token named explicitly in a JSON body wins over the cookie, which may be
/// stale.
fn presented_refresh_token(jar: &CookieJar, body: &[u8]) -> Option<String> {
    serde_json::from_slice::<RefreshTokenRequest>(body)
        .ok()
        .map(|b| b.refresh_token)
        .filter(|t| !t.is_empty())
        .or_else(|| jar.get(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_owned()))
}

/// Accepts the refresh token from a JSON body or from its cookie.
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<impl IntoResponse, AccountsServiceError> {
    let presented =
        presented_refresh_token(&jar, &body).ok_or(AccountsServiceError::InvalidRefreshToken)?;

    let usecase = RefreshTokenUseCase {
        accounts: state.account_repo(),
        keys: state.keys.clone(),
    };
    let out = usecase.execute(&presented).await?;

    let jar = session_cookies(jar, &state, &out.tokens);
    let headers = token_expires_headers(out.tokens.access_token_exp);
    let body = RefreshTokenResponse {
        access_token: out.tokens.access_token,
        refresh_token: out.tokens.refresh_token,
        access_token_exp: out.tokens.access_token_exp,
    };
    Ok((StatusCode::OK, jar, headers, Json(body)))
}

// ── POST /users/change-password ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    identity: IdentityHeaders,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<StatusCode, AccountsServiceError> {
    let usecase = ChangePasswordUseCase {
        accounts: state.account_repo(),
    };
    usecase
        .execute(ChangePasswordInput {
            account_id: identity.account_id,
            old_password: body.old_password,
            new_password: body.new_password,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
