use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Accounts service error variants.
#[derive(Debug, thiserror::Error)]
pub enum AccountsServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("avatar is required")]
    AvatarRequired,
    #[error("invalid otp")]
    InvalidOtp,
    #[error("otp expired")]
    OtpExpired,
    #[error("account already exists")]
    AccountAlreadyExists,
    #[error("username already taken")]
    UsernameTaken,
    #[error("email already taken")]
    EmailTaken,
    #[error("otp already issued")]
    OtpAlreadyIssued,
    #[error("profile incomplete")]
    ProfileIncomplete,
    #[error("profile already complete")]
    ProfileAlreadyComplete,
    #[error("too many otp requests")]
    TooManyOtpRequests,
    #[error("account not found")]
    AccountNotFound,
    #[error("channel not found")]
    ChannelNotFound,
    #[error("invalid credential")]
    InvalidCredential,
    #[error("invalid token")]
    InvalidToken,
    #[error("invalid refresh token")]
    InvalidRefreshToken,
    #[error("invalid reset grant")]
    InvalidResetGrant,
    #[error("invalid federated token")]
    InvalidFederatedToken,
    #[error("federated email not verified")]
    UnverifiedFederatedEmail,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AccountsServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::AvatarRequired => "AVATAR_REQUIRED",
            Self::InvalidOtp => "INVALID_OTP",
            Self::OtpExpired => "OTP_EXPIRED",
            Self::AccountAlreadyExists => "ACCOUNT_ALREADY_EXISTS",
            Self::UsernameTaken => "USERNAME_TAKEN",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::OtpAlreadyIssued => "OTP_ALREADY_ISSUED",
            Self::ProfileIncomplete => "PROFILE_INCOMPLETE",
            Self::ProfileAlreadyComplete => "PROFILE_ALREADY_COMPLETE",
            Self::TooManyOtpRequests => "TOO_MANY_OTP_REQUESTS",
            Self::AccountNotFound => "ACCOUNT_NOT_FOUND",
            Self::ChannelNotFound => "CHANNEL_NOT_FOUND",
            Self::InvalidCredential => "INVALID_CREDENTIAL",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::InvalidResetGrant => "INVALID_RESET_GRANT",
            Self::InvalidFederatedToken => "INVALID_FEDERATED_TOKEN",
            Self::UnverifiedFederatedEmail => "UNVERIFIED_FEDERATED_EMAIL",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::AvatarRequired | Self::InvalidOtp | Self::OtpExpired => {
                StatusCode::BAD_REQUEST
            }
            Self::AccountAlreadyExists
            | Self::UsernameTaken
            | Self::EmailTaken
            | Self::OtpAlreadyIssued
            | Self::ProfileIncomplete
            | Self::ProfileAlreadyComplete => StatusCode::CONFLICT,
            Self::TooManyOtpRequests => StatusCode::TOO_MANY_REQUESTS,
            Self::AccountNotFound | Self::ChannelNotFound => StatusCode::NOT_FOUND,
            Self::InvalidCredential
            | Self::InvalidToken
            | Self::InvalidRefreshToken
            | Self::InvalidResetGrant
            | Self::InvalidFederatedToken
            | Self::UnverifiedFederatedEmail => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AccountsServiceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AccountsServiceError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<MultipartRejection> for AccountsServiceError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for AccountsServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // TraceLayer already records every response status; only 500s carry
        // a cause worth logging.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
