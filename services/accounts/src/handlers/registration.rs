use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::domain::types::OTP_TTL_SECS;
use crate::error::AccountsServiceError;
use crate::handlers::extract::{Json, Multipart};
use crate::handlers::multipart::MultipartForm;
use crate::state::AppState;
use crate::usecase::registration::{
    CompleteRegistrationInput, CompleteRegistrationUseCase, RegisterInput, RegisterUseCase,
    ResendOtpUseCase,
};

#[derive(Serialize)]
pub struct OtpSentResponse {
    pub otp_sent: bool,
    pub expires_in: u64,
}

impl OtpSentResponse {
    fn sent() -> Self {
        Self {
            otp_sent: true,
            expires_in: OTP_TTL_SECS,
        }
    }
}

// ── POST /users/register ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AccountsServiceError> {
    let usecase = RegisterUseCase {
        accounts: state.account_repo(),
        otps: state.otp_register(),
        mailer: state.mailer.clone(),
    };
    usecase
        .execute(RegisterInput {
            email: body.email,
            username: body.username,
        })
        .await?;
    Ok((StatusCode::ACCEPTED, Json(OtpSentResponse::sent())))
}

// ── POST /users/resend-otp ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResendOtpRequest {
    pub email: String,
}

pub async fn resend_otp(
    State(state): State<AppState>,
    Json(body): Json<ResendOtpRequest>,
) -> Result<impl IntoResponse, AccountsServiceError> {
    let usecase = ResendOtpUseCase {
        accounts: state.account_repo(),
        otps: state.otp_register(),
        mailer: state.mailer.clone(),
    };
    usecase.execute(&body.email).await?;
    Ok((StatusCode::ACCEPTED, Json(OtpSentResponse::sent())))
}

// ── POST /users/verify-otp ───────────────────────────────────────────────────

/// Multipart form: text fields `email`, `otp`, `full_name`, `username`,
/// `password`; file fields `avatar` (required) and `cover_image`.
pub async fn verify_otp(
    State(state): State<AppState>,
    Multipart(multipart): Multipart,
) -> Result<impl IntoResponse, AccountsServiceError> {
    let mut form = MultipartForm::read(multipart).await?;
    let input = CompleteRegistrationInput {
        email: form.text("email"),
        code: form.text("otp"),
        full_name: form.text("full_name"),
        username: form.text("username"),
        password: form.text("password"),
        avatar: form.take_file("avatar"),
        cover_image: form.take_file("cover_image"),
    };

    let usecase = CompleteRegistrationUseCase {
        accounts: state.account_repo(),
        otps: state.otp_register(),
        media: state.media.clone(),
        mailer: state.mailer.clone(),
    };
    let account = usecase.execute(input).await?;
    Ok((StatusCode::CREATED, Json(account)))
}
