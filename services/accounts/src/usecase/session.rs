use tracing::info;
use uuid::Uuid;

use crate::crypto::{hash_password, verify_password};
use crate::domain::repository::AccountRepository;
use crate::domain::types::{Account, AccountView, validate_password};
use crate::error::AccountsServiceError;
use crate::usecase::token::{SessionTokens, TokenKeys, issue_session, validate_refresh_token};

/// Mint a pair and make its refresh token the only one on file.
pub(crate) async fn start_session<A: AccountRepository>(
    accounts: &A,
    account_id: Uuid,
    keys: &TokenKeys,
) -> Result<SessionTokens, AccountsServiceError> {
    let tokens = issue_session(account_id, keys)?;
    accounts
        .set_refresh_token(account_id, Some(&tokens.refresh_token))
        .await?;
    Ok(tokens)
}

#[derive(Debug)]
pub struct SessionOutput {
    pub account: AccountView,
    pub tokens: SessionTokens,
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    /// Email or username.
    pub identifier: String,
    pub password: String,
}

pub struct LoginUseCase<A: AccountRepository> {
    pub accounts: A,
    pub keys: TokenKeys,
}

impl<A: AccountRepository> LoginUseCase<A> {
    pub async fn execute(&self, input: LoginInput) -> Result<SessionOutput, AccountsServiceError> {
        let identifier = input.identifier.trim().to_lowercase();
        if identifier.is_empty() || input.password.is_empty() {
            return Err(AccountsServiceError::Validation(
                "identifier and password are required".to_owned(),
            ));
        }

        let account = self
            .find_by_identifier(&identifier)
            .await?
            .ok_or(AccountsServiceError::AccountNotFound)?;

        let hash = account
            .password_hash()
            .ok_or(AccountsServiceError::InvalidCredential)?;
        if !verify_password(&input.password, hash) {
            return Err(AccountsServiceError::InvalidCredential);
        }

        let tokens = start_session(&self.accounts, account.id, &self.keys).await?;
        info!(account_id = %account.id, "login");
        Ok(SessionOutput {
            account: account.sanitized(),
            tokens,
        })
    }

    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Account>, AccountsServiceError> {
        if let Some(account) = self.accounts.find_by_email(identifier).await? {
            return Ok(Some(account));
        }
        self.accounts.find_by_username(identifier).await
    }
}

// ── Logout ───────────────────────────────────────────────────────────────────

pub struct LogoutUseCase<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> LogoutUseCase<A> {
    /// Clears the refresh slot. Clearing an empty slot is not an error.
    pub async fn execute(&self, account_id: Uuid) -> Result<(), AccountsServiceError> {
        self.accounts.set_refresh_token(account_id, None).await
    }
}

// ── RefreshToken ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct RefreshTokenOutput {
    pub account_id: Uuid,
    pub tokens: SessionTokens,
}

pub struct RefreshTokenUseCase<A: AccountRepository> {
    pub accounts: A,
    pub keys: TokenKeys,
}

impl<A: AccountRepository> RefreshTokenUseCase<A> {
    pub async fn execute(
        &self,
        presented: &str,
    ) -> Result<RefreshTokenOutput, AccountsServiceError> {
        let account_id = validate_refresh_token(presented, &self.keys)?;

        self.accounts
            .find_by_id(account_id)
            .await?
            .ok_or(AccountsServiceError::InvalidRefreshToken)?;

        let tokens = issue_session(account_id, &self.keys)?;

        // Compare-and-swap: a superseded, logged-out or concurrently rotated
        // token matches zero rows.
        let rotated = self
            .accounts
            .rotate_refresh_token(account_id, presented, &tokens.refresh_token)
            .await?;
        if !rotated {
            return Err(AccountsServiceError::InvalidRefreshToken);
        }

        Ok(RefreshTokenOutput { account_id, tokens })
    }
}

// ── ChangePassword ───────────────────────────────────────────────────────────

pub struct ChangePasswordInput {
    pub account_id: Uuid,
    pub old_password: String,
    pub new_password: String,
}

pub struct ChangePasswordUseCase<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> ChangePasswordUseCase<A> {
    pub async fn execute(&self, input: ChangePasswordInput) -> Result<(), AccountsServiceError> {
        validate_password(&input.new_password)?;

        let account = self
            .accounts
            .find_by_id(input.account_id)
            .await?
            .ok_or(AccountsServiceError::AccountNotFound)?;

        let hash = account
            .password_hash()
            .ok_or(AccountsServiceError::InvalidCredential)?;
        if !verify_password(&input.old_password, hash) {
            return Err(AccountsServiceError::InvalidCredential);
        }

        let new_hash = hash_password(&input.new_password)?;
        self.accounts
            .update_password_hash(account.id, &new_hash)
            .await?;
        info!(account_id = %account.id, "password changed");
        Ok(())
    }
}
