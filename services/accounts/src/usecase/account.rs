use tracing::info;
use uuid::Uuid;

use crate::domain::repository::{AccountRepository, MediaStorage};
use crate::domain::types::{
    AccountDetailsPatch, AccountView, MediaUpload, normalize_email, require_text,
};
use crate::error::AccountsServiceError;

// ── CurrentAccount ───────────────────────────────────────────────────────────

pub struct CurrentAccountUseCase<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> CurrentAccountUseCase<A> {
    pub async fn execute(&self, account_id: Uuid) -> Result<AccountView, AccountsServiceError> {
        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or(AccountsServiceError::AccountNotFound)?;
        Ok(account.sanitized())
    }
}

// ── UpdateDetails ────────────────────────────────────────────────────────────

pub struct UpdateDetailsInput {
    pub account_id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
}

pub struct UpdateDetailsUseCase<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> UpdateDetailsUseCase<A> {
    pub async fn execute(
        &self,
        input: UpdateDetailsInput,
    ) -> Result<AccountView, AccountsServiceError> {
        let patch = AccountDetailsPatch {
            full_name: input
                .full_name
                .as_deref()
                .map(|n| require_text(n, "full_name"))
                .transpose()?,
            email: input.email.as_deref().map(normalize_email).transpose()?,
        };
        if patch.full_name.is_none() && patch.email.is_none() {
            return Err(AccountsServiceError::Validation(
                "full_name or email is required".to_owned(),
            ));
        }

        if let Some(email) = &patch.email {
            if let Some(owner) = self.accounts.find_by_email(email).await? {
                if owner.id != input.account_id {
                    return Err(AccountsServiceError::EmailTaken);
                }
            }
        }

        let account = self
            .accounts
            .update_details(input.account_id, &patch)
            .await?
            .ok_or(AccountsServiceError::AccountNotFound)?;
        Ok(account.sanitized())
    }
}

// ── UpdateMedia ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaSlot {
    Avatar,
    CoverImage,
}

pub struct UpdateMediaUseCase<A: AccountRepository, S: MediaStorage> {
    pub accounts: A,
    pub media: S,
}

impl<A: AccountRepository, S: MediaStorage> UpdateMediaUseCase<A, S> {
    pub async fn execute(
        &self,
        account_id: Uuid,
        slot: MediaSlot,
        upload: Option<MediaUpload>,
    ) -> Result<AccountView, AccountsServiceError> {
        let upload = upload.ok_or_else(|| match slot {
            MediaSlot::Avatar => AccountsServiceError::AvatarRequired,
            MediaSlot::CoverImage => {
                AccountsServiceError::Validation("cover_image is required".to_owned())
            }
        })?;

        if self.accounts.find_by_id(account_id).await?.is_none() {
            return Err(AccountsServiceError::AccountNotFound);
        }

        let stored = self.media.upload(&upload).await?;
        let updated = match slot {
            MediaSlot::Avatar => self.accounts.update_avatar(account_id, &stored.url).await?,
            MediaSlot::CoverImage => {
                self.accounts
                    .update_cover_image(account_id, &stored.url)
                    .await?
            }
        };
        let account = updated.ok_or(AccountsServiceError::AccountNotFound)?;
        info!(account_id = %account.id, slot = ?slot, "media updated");
        Ok(account.sanitized())
    }
}
