use anyhow::Context as _;
use tracing::{info, warn};
use url::Url;

use crate::crypto::{hash_password, password_fingerprint};
use crate::domain::repository::{AccountRepository, Mailer};
use crate::domain::types::{EmailKind, OutboundEmail, normalize_email, validate_password};
use crate::error::AccountsServiceError;
use crate::usecase::token::{TokenKeys, issue_reset_grant, validate_reset_grant};

fn reset_link(base: &str, grant: &str) -> Result<String, AccountsServiceError> {
    let mut url = Url::parse(base).context("parse reset url base")?;
    url.query_pairs_mut().append_pair("token", grant);
    Ok(url.into())
}

// ── RequestPasswordReset ─────────────────────────────────────────────────────

pub struct RequestPasswordResetUseCase<A: AccountRepository, M: Mailer> {
    pub accounts: A,
    pub mailer: M,
    pub keys: TokenKeys,
    pub reset_url_base: String,
}

impl<A: AccountRepository, M: Mailer> RequestPasswordResetUseCase<A, M> {
    pub async fn execute(&self, email: &str) -> Result<(), AccountsServiceError> {
        let email = normalize_email(email)?;
        let account = self
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or(AccountsServiceError::AccountNotFound)?;

        // A pending federated account has no password to reset.
        let hash = account
            .password_hash()
            .ok_or(AccountsServiceError::ProfileIncomplete)?;

        let fingerprint = password_fingerprint(hash, &self.keys.reset_secret)?;
        let grant = issue_reset_grant(account.id, fingerprint, &self.keys)?;
        let link = reset_link(&self.reset_url_base, &grant)?;

        let message = OutboundEmail {
            to: account.email.clone(),
            kind: EmailKind::ResetLink { link },
        };
        if let Err(e) = self.mailer.send(&message).await {
            warn!(error = %e, account_id = %account.id, "reset email failed");
        }
        info!(account_id = %account.id, "password reset requested");
        Ok(())
    }
}

// ── ResetPassword ────────────────────────────────────────────────────────────

pub struct ResetPasswordInput {
    pub token: String,
    pub new_password: String,
}

pub struct ResetPasswordUseCase<A: AccountRepository> {
    pub accounts: A,
    pub keys: TokenKeys,
}

impl<A: AccountRepository> ResetPasswordUseCase<A> {
    pub async fn execute(&self, input: ResetPasswordInput) -> Result<(), AccountsServiceError> {
        validate_password(&input.new_password)?;
        let grant = validate_reset_grant(&input.token, &self.keys)?;

        let account = self
            .accounts
            .find_by_id(grant.account_id)
            .await?
            .ok_or(AccountsServiceError::InvalidResetGrant)?;

        // Once the hash changes the fingerprint no longer matches, so a grant
        // works at most once.
        let current = account
            .password_hash()
            .ok_or(AccountsServiceError::InvalidResetGrant)?;
        if password_fingerprint(current, &self.keys.reset_secret)? != grant.fingerprint {
            return Err(AccountsServiceError::InvalidResetGrant);
        }

        let new_hash = hash_password(&input.new_password)?;
        self.accounts
            .reset_password_hash(account.id, &new_hash)
            .await?;
        info!(account_id = %account.id, "password reset");
        Ok(())
    }
}
