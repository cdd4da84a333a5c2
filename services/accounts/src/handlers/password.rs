use axum::{extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use nextube_auth_types::cookie::clear_cookies;

use crate::error::AccountsServiceError;
use crate::handlers::extract::Json;
use crate::state::AppState;
use crate::usecase::password_reset::{
    RequestPasswordResetUseCase, ResetPasswordInput, ResetPasswordUseCase,
};

// ── POST /users/forgot-password ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<StatusCode, AccountsServiceError> {
    let usecase = RequestPasswordResetUseCase {
        accounts: state.account_repo(),
        mailer: state.mailer.clone(),
        keys: state.keys.clone(),
        reset_url_base: state.reset_url_base.clone(),
    };
    usecase.execute(&body.email).await?;
    Ok(StatusCode::ACCEPTED)
}

// ── POST /users/reset-password ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// Existing sessions end with the reset, so the caller's cookies go too.
pub async fn reset_password(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AccountsServiceError> {
    let usecase = ResetPasswordUseCase {
        accounts: state.account_repo(),
        keys: state.keys.clone(),
    };
    usecase
        .execute(ResetPasswordInput {
            token: body.token,
            new_password: body.new_password,
        })
        .await?;

    let jar = clear_cookies(jar, state.cookie_domain.clone());
    Ok((StatusCode::NO_CONTENT, jar))
}
