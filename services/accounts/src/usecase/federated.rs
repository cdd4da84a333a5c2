use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use nextube_domain::account::Provider;

use crate::crypto::hash_password;
use crate::domain::repository::{AccountRepository, FederatedIdentityPort, Mailer};
use crate::domain::types::{
    Account, AccountView, Credentials, EmailKind, FederatedProfile, OutboundEmail,
    normalize_email, normalize_username, validate_password,
};
use crate::error::AccountsServiceError;
use crate::usecase::session::start_session;
use crate::usecase::token::{SessionTokens, TokenKeys};

// ── FederatedLogin ───────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct FederatedLoginOutput {
    pub account: AccountView,
    pub tokens: SessionTokens,
    /// `true` when this call created the account.
    pub created: bool,
}

pub struct FederatedLoginUseCase<A, F, M>
where
    A: AccountRepository,
    F: FederatedIdentityPort,
    M: Mailer,
{
    pub accounts: A,
    pub identity: F,
    pub mailer: M,
    pub keys: TokenKeys,
}

impl<A, F, M> FederatedLoginUseCase<A, F, M>
where
    A: AccountRepository,
    F: FederatedIdentityPort,
    M: Mailer,
{
    pub async fn execute(&self, id_token: &str) -> Result<FederatedLoginOutput, AccountsServiceError> {
        if id_token.trim().is_empty() {
            return Err(AccountsServiceError::Validation(
                "id_token is required".to_owned(),
            ));
        }

        let profile = self.identity.verify(id_token).await?;
        let email = normalize_email(&profile.email)
            .map_err(|_| AccountsServiceError::InvalidFederatedToken)?;

        if let Some(existing) = self.accounts.find_by_email(&email).await? {
            return self.login_existing(existing, &profile).await;
        }

        let account = new_pending_account(email, &profile);
        match self.accounts.create(&account).await {
            Ok(()) => {}
            // Lost a creation race with a concurrent login for the same email.
            Err(AccountsServiceError::AccountAlreadyExists) => {
                let existing = self
                    .accounts
                    .find_by_email(&account.email)
                    .await?
                    .ok_or(AccountsServiceError::AccountAlreadyExists)?;
                return self.login_existing(existing, &profile).await;
            }
            Err(e) => return Err(e),
        }
        info!(account_id = %account.id, provider = %account.provider, "federated account created");

        let welcome = OutboundEmail {
            to: account.email.clone(),
            kind: EmailKind::Welcome {
                full_name: account.full_name.clone(),
            },
        };
        if let Err(e) = self.mailer.send(&welcome).await {
            warn!(error = %e, account_id = %account.id, "welcome email failed");
        }

        let tokens = start_session(&self.accounts, account.id, &self.keys).await?;
        Ok(FederatedLoginOutput {
            account: account.sanitized(),
            tokens,
            created: true,
        })
    }

    /// Merge-by-email, gated on the provider vouching for the address.
    async fn login_existing(
        &self,
        account: Account,
        profile: &FederatedProfile,
    ) -> Result<FederatedLoginOutput, AccountsServiceError> {
        if !profile.email_verified {
            return Err(AccountsServiceError::UnverifiedFederatedEmail);
        }
        let tokens = start_session(&self.accounts, account.id, &self.keys).await?;
        info!(account_id = %account.id, "federated login");
        Ok(FederatedLoginOutput {
            account: account.sanitized(),
            tokens,
            created: false,
        })
    }
}

fn new_pending_account(email: String, profile: &FederatedProfile) -> Account {
    let full_name = match profile.name.trim() {
        "" => email.split('@').next().unwrap_or_default().to_owned(),
        name => name.to_owned(),
    };
    let now = Utc::now();
    Account {
        id: Uuid::now_v7(),
        email,
        full_name,
        avatar: profile.picture.clone().unwrap_or_default(),
        cover_image: None,
        provider: Provider::Google,
        credentials: Credentials::Pending,
        refresh_token: None,
        created_at: now,
        updated_at: now,
    }
}

// ── CompleteProfile ──────────────────────────────────────────────────────────

pub struct CompleteProfileInput {
    pub account_id: Uuid,
    pub username: String,
    pub password: String,
}

pub struct CompleteProfileUseCase<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> CompleteProfileUseCase<A> {
    pub async fn execute(
        &self,
        input: CompleteProfileInput,
    ) -> Result<AccountView, AccountsServiceError> {
        let username = normalize_username(&input.username)?;
        validate_password(&input.password)?;

        let account = self
            .accounts
            .find_by_id(input.account_id)
            .await?
            .ok_or(AccountsServiceError::AccountNotFound)?;
        if account.is_profile_complete() {
            return Err(AccountsServiceError::ProfileAlreadyComplete);
        }

        if let Some(owner) = self.accounts.find_by_username(&username).await? {
            if owner.id != account.id {
                return Err(AccountsServiceError::UsernameTaken);
            }
        }

        let password_hash = hash_password(&input.password)?;
        // The repository only updates rows still pending; the unique index
        // catches a username grabbed in between.
        let completed = self
            .accounts
            .complete_profile(account.id, &username, &password_hash)
            .await?;
        if !completed {
            return Err(AccountsServiceError::ProfileAlreadyComplete);
        }
        info!(account_id = %account.id, "profile completed");

        let account = self
            .accounts
            .find_by_id(account.id)
            .await?
            .ok_or(AccountsServiceError::AccountNotFound)?;
        Ok(account.sanitized())
    }
}
