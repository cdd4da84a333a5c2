use axum::{extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use nextube_auth_types::identity::IdentityHeaders;

use crate::domain::types::AccountView;
use crate::error::AccountsServiceError;
use crate::handlers::extract::Json;
use crate::handlers::session::{session_cookies, token_expires_headers};
use crate::state::AppState;
use crate::usecase::federated::{
    CompleteProfileInput, CompleteProfileUseCase, FederatedLoginUseCase,
};

// ── POST /users/google-login ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct GoogleLoginRequest {
    #[serde(alias = "credential")]
    pub id_token: String,
}

#[derive(Serialize)]
pub struct GoogleLoginResponse {
    pub account: AccountView,
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_exp: u64,
    pub profile_complete: bool,
}

pub async fn google_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<GoogleLoginRequest>,
) -> Result<impl IntoResponse, AccountsServiceError> {
    let usecase = FederatedLoginUseCase {
        accounts: state.account_repo(),
        identity: state.google.clone(),
        mailer: state.mailer.clone(),
        keys: state.keys.clone(),
    };
    let out = usecase.execute(&body.id_token).await?;

    let jar = session_cookies(jar, &state, &out.tokens);
    let headers = token_expires_headers(out.tokens.access_token_exp);
    let status = if out.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let body = GoogleLoginResponse {
        profile_complete: out.account.profile_complete,
        account: out.account,
        access_token: out.tokens.access_token,
        refresh_token: out.tokens.refresh_token,
        access_token_exp: out.tokens.access_token_exp,
    };
    Ok((status, jar, headers, Json(body)))
}

// ── PATCH /users/complete-profile ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CompleteProfileRequest {
    pub username: String,
    pub password: String,
}

pub async fn complete_profile(
    State(state): State<AppState>,
    identity: IdentityHeaders,
    Json(body): Json<CompleteProfileRequest>,
) -> Result<impl IntoResponse, AccountsServiceError> {
    let usecase = CompleteProfileUseCase {
        accounts: state.account_repo(),
    };
    let account = usecase
        .execute(CompleteProfileInput {
            account_id: identity.account_id,
            username: body.username,
            password: body.password,
        })
        .await?;
    Ok(Json(account))
}
