use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use nextube_domain::account::Provider;

use crate::crypto::{generate_otp, hash_password};
use crate::domain::repository::{AccountRepository, Mailer, MediaStorage, OtpRegister};
use crate::domain::types::{
    Account, AccountView, Credentials, EmailKind, MediaUpload, OTP_TTL_SECS, OtpCheck,
    OutboundEmail, normalize_email, normalize_username, require_text, validate_password,
};
use crate::error::AccountsServiceError;

/// Store a fresh code and mail it. `on_cooldown` is returned when a live code
/// already exists. A send failure propagates; the stored code stays.
async fn issue_otp<O: OtpRegister, M: Mailer>(
    otps: &O,
    mailer: &M,
    email: &str,
    on_cooldown: AccountsServiceError,
) -> Result<(), AccountsServiceError> {
    let code = generate_otp();
    if !otps.insert_if_absent(email, &code, OTP_TTL_SECS).await? {
        return Err(on_cooldown);
    }
    mailer
        .send(&OutboundEmail {
            to: email.to_owned(),
            kind: EmailKind::Otp { code },
        })
        .await?;
    info!(email, "otp issued");
    Ok(())
}

async fn ensure_available<A: AccountRepository>(
    accounts: &A,
    email: &str,
    username: Option<&str>,
) -> Result<(), AccountsServiceError> {
    if accounts.find_by_email(email).await?.is_some() {
        return Err(AccountsServiceError::AccountAlreadyExists);
    }
    if let Some(username) = username {
        if accounts.find_by_username(username).await?.is_some() {
            return Err(AccountsServiceError::AccountAlreadyExists);
        }
    }
    Ok(())
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub email: String,
    pub username: Option<String>,
}

pub struct RegisterUseCase<A, O, M>
where
    A: AccountRepository,
    O: OtpRegister,
    M: Mailer,
{
    pub accounts: A,
    pub otps: O,
    pub mailer: M,
}

impl<A, O, M> RegisterUseCase<A, O, M>
where
    A: AccountRepository,
    O: OtpRegister,
    M: Mailer,
{
    pub async fn execute(&self, input: RegisterInput) -> Result<(), AccountsServiceError> {
        let email = normalize_email(&input.email)?;
        let username = input
            .username
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .map(normalize_username)
            .transpose()?;

        ensure_available(&self.accounts, &email, username.as_deref()).await?;

        issue_otp(
            &self.otps,
            &self.mailer,
            &email,
            AccountsServiceError::OtpAlreadyIssued,
        )
        .await
    }
}

// ── ResendOtp ────────────────────────────────────────────────────────────────

pub struct ResendOtpUseCase<A, O, M>
where
    A: AccountRepository,
    O: OtpRegister,
    M: Mailer,
{
    pub accounts: A,
    pub otps: O,
    pub mailer: M,
}

impl<A, O, M> ResendOtpUseCase<A, O, M>
where
    A: AccountRepository,
    O: OtpRegister,
    M: Mailer,
{
    pub async fn execute(&self, email: &str) -> Result<(), AccountsServiceError> {
        let email = normalize_email(email)?;
        ensure_available(&self.accounts, &email, None).await?;
        issue_otp(
            &self.otps,
            &self.mailer,
            &email,
            AccountsServiceError::TooManyOtpRequests,
        )
        .await
    }
}

// ── CompleteRegistration ─────────────────────────────────────────────────────

pub struct CompleteRegistrationInput {
    pub email: String,
    pub code: String,
    pub full_name: String,
    pub username: String,
    pub password: String,
    pub avatar: Option<MediaUpload>,
    pub cover_image: Option<MediaUpload>,
}

pub struct CompleteRegistrationUseCase<A, O, S, M>
where
    A: AccountRepository,
    O: OtpRegister,
    S: MediaStorage,
    M: Mailer,
{
    pub accounts: A,
    pub otps: O,
    pub media: S,
    pub mailer: M,
}

impl<A, O, S, M> CompleteRegistrationUseCase<A, O, S, M>
where
    A: AccountRepository,
    O: OtpRegister,
    S: MediaStorage,
    M: Mailer,
{
    pub async fn execute(
        &self,
        input: CompleteRegistrationInput,
    ) -> Result<AccountView, AccountsServiceError> {
        // Everything checkable without side effects runs before the code is
        // consumed, so a typo does not burn the OTP.
        let email = normalize_email(&input.email)?;
        let code = require_text(&input.code, "otp")?;
        let full_name = require_text(&input.full_name, "full_name")?;
        let username = normalize_username(&input.username)?;
        validate_password(&input.password)?;
        let avatar = input.avatar.ok_or(AccountsServiceError::AvatarRequired)?;

        ensure_available(&self.accounts, &email, Some(&username)).await?;

        match self.otps.take_if_match(&email, &code).await? {
            OtpCheck::Matched => {}
            OtpCheck::Mismatch | OtpCheck::Missing => return Err(AccountsServiceError::InvalidOtp),
            OtpCheck::Expired => return Err(AccountsServiceError::OtpExpired),
        }

        let avatar = self.media.upload(&avatar).await?;
        let cover_image = match &input.cover_image {
            Some(cover) => Some(self.media.upload(cover).await?.url),
            None => None,
        };

        let now = Utc::now();
        let account = Account {
            id: Uuid::now_v7(),
            email,
            full_name,
            avatar: avatar.url,
            cover_image,
            provider: Provider::Local,
            credentials: Credentials::Complete {
                username,
                password_hash: hash_password(&input.password)?,
            },
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };
        self.accounts.create(&account).await?;
        info!(account_id = %account.id, "account registered");

        let welcome = OutboundEmail {
            to: account.email.clone(),
            kind: EmailKind::Welcome {
                full_name: account.full_name.clone(),
            },
        };
        if let Err(e) = self.mailer.send(&welcome).await {
            warn!(error = %e, account_id = %account.id, "welcome email failed");
        }

        Ok(account.sanitized())
    }
}
