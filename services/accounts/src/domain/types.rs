use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use nextube_core::serde::to_rfc3339_ms;
use nextube_domain::account::Provider;
use nextube_domain::relationship::LikeTargetKind;

use crate::error::AccountsServiceError;

/// Login material. `Pending` is a federated account that has not chosen a
/// username and password yet; completing the profile is the only way out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Complete {
        username: String,
        password_hash: String,
    },
    Pending,
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub provider: Provider,
    pub credentials: Credentials,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn username(&self) -> Option<&str> {
        match &self.credentials {
            Credentials::Complete { username, .. } => Some(username),
            Credentials::Pending => None,
        }
    }

    pub fn password_hash(&self) -> Option<&str> {
        match &self.credentials {
            Credentials::Complete { password_hash, .. } => Some(password_hash),
            Credentials::Pending => None,
        }
    }

    pub fn is_profile_complete(&self) -> bool {
        matches!(self.credentials, Credentials::Complete { .. })
    }

    /// Projection returned to the account owner. Never carries the password
    /// hash or the refresh token.
    pub fn sanitized(&self) -> AccountView {
        AccountView {
            id: self.id,
            email: self.email.clone(),
            username: self.username().map(str::to_owned),
            full_name: self.full_name.clone(),
            avatar: self.avatar.clone(),
            cover_image: self.cover_image.clone(),
            provider: self.provider,
            profile_complete: self.is_profile_complete(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Projection other accounts may see.
    pub fn public(&self) -> PublicAccount {
        PublicAccount {
            id: self.id,
            username: self.username().map(str::to_owned),
            full_name: self.full_name.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub provider: Provider,
    pub profile_complete: bool,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicAccount {
    pub id: Uuid,
    pub username: Option<String>,
    pub full_name: String,
    pub avatar: String,
}

/// Fields that `update_details` may overwrite. `None` leaves the column alone.
#[derive(Debug, Clone, Default)]
pub struct AccountDetailsPatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
}

// ── Relationship ledger ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionEdge {
    pub subscriber_id: Uuid,
    pub channel_id: Uuid,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LikeEdge {
    pub actor_id: Uuid,
    pub target_id: Uuid,
    pub target_kind: LikeTargetKind,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Video {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub video_file: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelStats {
    pub subscriber_count: u64,
    pub following_count: u64,
    pub is_subscribed: bool,
}

/// Totals for the caller's own channel. `like_count` counts likes the
/// account has given; `video_like_count` counts likes its videos received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub view_count: u64,
    pub subscriber_count: u64,
    pub video_count: u64,
    pub like_count: u64,
    pub video_like_count: u64,
}

// ── One-time codes ───────────────────────────────────────────────────────────

/// Outcome of an atomic check-and-consume against the OTP register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpCheck {
    /// Code matched; the entry is gone.
    Matched,
    /// Entry exists but the code differs; the entry is kept.
    Mismatch,
    /// No entry for this email.
    Missing,
    /// Entry was past its expiry; it has been deleted.
    Expired,
}

/// OTP validity window in seconds.
pub const OTP_TTL_SECS: u64 = 300;

/// Extra Redis key lifetime after expiry so a late verify reports `Expired`
/// rather than `Missing`.
pub const OTP_EVICTION_GRACE_SECS: u64 = 60;

/// Password-reset grant validity in seconds.
pub const RESET_GRANT_TTL_SECS: u64 = 900;

// ── Collaborators ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailKind {
    Otp { code: String },
    Welcome { full_name: String },
    ResetLink { link: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub kind: EmailKind,
}

/// A file received from a multipart body, held in memory until uploaded.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredMedia {
    pub url: String,
    /// Playback length for audio/video uploads; `None` for images.
    pub duration: Option<f64>,
}

/// Profile asserted by a federated identity provider after verifying an ID token.
#[derive(Debug, Clone)]
pub struct FederatedProfile {
    pub email: String,
    pub email_verified: bool,
    pub name: String,
    pub picture: Option<String>,
}

// ── Input rules ──────────────────────────────────────────────────────────────

pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 128;
pub const USERNAME_MAX_LEN: usize = 30;

/// Lowercase and trim an email address, rejecting anything without a
/// `local@domain.tld` shape.
pub fn normalize_email(raw: &str) -> Result<String, AccountsServiceError> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(AccountsServiceError::Validation("invalid email".to_owned()));
    }
    Ok(email)
}

/// Lowercase a username and check its charset (`a-z`, `0-9`, `_`, `.`).
pub fn normalize_username(raw: &str) -> Result<String, AccountsServiceError> {
    let username = raw.trim().to_lowercase();
    if username.is_empty() || username.chars().count() > USERNAME_MAX_LEN {
        return Err(AccountsServiceError::Validation(format!(
            "username must be 1 to {USERNAME_MAX_LEN} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        return Err(AccountsServiceError::Validation(
            "username may only contain letters, digits, '_' and '.'".to_owned(),
        ));
    }
    Ok(username)
}

pub fn validate_password(password: &str) -> Result<(), AccountsServiceError> {
    let len = password.chars().count();
    if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
        return Err(AccountsServiceError::Validation(format!(
            "password must be {PASSWORD_MIN_LEN} to {PASSWORD_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Trim a required free-text field, rejecting blanks.
pub fn require_text(value: &str, field: &'static str) -> Result<String, AccountsServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AccountsServiceError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_owned())
}
