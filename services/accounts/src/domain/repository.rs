#![allow(async_fn_in_trait)]

use uuid::Uuid;

use nextube_domain::relationship::LikeTargetKind;

use crate::domain::types::{
    Account, AccountDetailsPatch, FederatedProfile, LikeEdge, MediaUpload, OtpCheck,
    OutboundEmail, StoredMedia, SubscriptionEdge, Video,
};
use crate::error::AccountsServiceError;

/// Credential store.
pub trait AccountRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AccountsServiceError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountsServiceError>;

    /// Lookup by already-lowercased username.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, AccountsServiceError>;

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Account>, AccountsServiceError>;

    /// Insert a new account. A unique-index violation on email or username
    /// surfaces as `AccountAlreadyExists`.
    async fn create(&self, account: &Account) -> Result<(), AccountsServiceError>;

    /// Unconditionally overwrite (or clear) the refresh slot.
    async fn set_refresh_token(
        &self,
        id: Uuid,
        token: Option<&str>,
    ) -> Result<(), AccountsServiceError>;

    /// Replace the refresh slot only if it still holds `expected`.
    /// Returns `false` when the slot held anything else.
    async fn rotate_refresh_token(
        &self,
        id: Uuid,
        expected: &str,
        new: &str,
    ) -> Result<bool, AccountsServiceError>;

    /// Overwrite the password hash and clear the refresh slot in one write.
    async fn reset_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), AccountsServiceError>;

    async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), AccountsServiceError>;

    /// Set username and password on a pending account. Returns `false` when the
    /// account was already complete. A username collision surfaces as
    /// `UsernameTaken`.
    async fn complete_profile(
        &self,
        id: Uuid,
        username: &str,
        password_hash: &str,
    ) -> Result<bool, AccountsServiceError>;

    /// Apply a details patch. An email collision surfaces as `EmailTaken`.
    async fn update_details(
        &self,
        id: Uuid,
        patch: &AccountDetailsPatch,
    ) -> Result<Option<Account>, AccountsServiceError>;

    async fn update_avatar(
        &self,
        id: Uuid,
        url: &str,
    ) -> Result<Option<Account>, AccountsServiceError>;

    async fn update_cover_image(
        &self,
        id: Uuid,
        url: &str,
    ) -> Result<Option<Account>, AccountsServiceError>;
}

/// Subscription edges keyed by (subscriber, channel).
pub trait SubscriptionRepository: Send + Sync {
    /// Returns `true` if an edge was deleted.
    async fn delete(
        &self,
        subscriber_id: Uuid,
        channel_id: Uuid,
    ) -> Result<bool, AccountsServiceError>;

    /// `INSERT … ON CONFLICT DO NOTHING`. Returns the edge as stored.
    async fn insert_if_absent(
        &self,
        subscriber_id: Uuid,
        channel_id: Uuid,
    ) -> Result<SubscriptionEdge, AccountsServiceError>;

    async fn exists(
        &self,
        subscriber_id: Uuid,
        channel_id: Uuid,
    ) -> Result<bool, AccountsServiceError>;

    async fn list_by_channel(
        &self,
        channel_id: Uuid,
    ) -> Result<Vec<SubscriptionEdge>, AccountsServiceError>;

    async fn list_by_subscriber(
        &self,
        subscriber_id: Uuid,
    ) -> Result<Vec<SubscriptionEdge>, AccountsServiceError>;

    async fn count_by_channel(&self, channel_id: Uuid) -> Result<u64, AccountsServiceError>;

    async fn count_by_subscriber(&self, subscriber_id: Uuid) -> Result<u64, AccountsServiceError>;
}

/// Like edges keyed by (actor, target, kind).
pub trait LikeRepository: Send + Sync {
    async fn delete(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        kind: LikeTargetKind,
    ) -> Result<bool, AccountsServiceError>;

    async fn insert_if_absent(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        kind: LikeTargetKind,
    ) -> Result<LikeEdge, AccountsServiceError>;

    /// Most recent first.
    async fn list_by_actor(
        &self,
        actor_id: Uuid,
        kind: LikeTargetKind,
    ) -> Result<Vec<LikeEdge>, AccountsServiceError>;

    async fn count_for_targets(
        &self,
        kind: LikeTargetKind,
        target_ids: &[Uuid],
    ) -> Result<u64, AccountsServiceError>;

    /// Likes given by `actor_id`, across every target kind.
    async fn count_by_actor(&self, actor_id: Uuid) -> Result<u64, AccountsServiceError>;
}

/// Read-only access to videos owned by the catalogue service.
pub trait VideoRepository: Send + Sync {
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Video>, AccountsServiceError>;

    async fn list_ids_by_owner(&self, owner_id: Uuid) -> Result<Vec<Uuid>, AccountsServiceError>;

    /// Sum of the view counters of every video `owner_id` uploaded.
    async fn total_views_by_owner(&self, owner_id: Uuid) -> Result<u64, AccountsServiceError>;
}

/// Short-lived email → code register with cooldown and single-use verify.
pub trait OtpRegister: Send + Sync {
    /// Store `code` unless a live entry exists. Returns `false` on cooldown.
    async fn insert_if_absent(
        &self,
        email: &str,
        code: &str,
        ttl_secs: u64,
    ) -> Result<bool, AccountsServiceError>;

    /// Atomically compare and, on match or expiry, delete.
    async fn take_if_match(&self, email: &str, code: &str) -> Result<OtpCheck, AccountsServiceError>;
}

pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), AccountsServiceError>;
}

pub trait MediaStorage: Send + Sync {
    async fn upload(&self, upload: &MediaUpload) -> Result<StoredMedia, AccountsServiceError>;
}

/// Verifies a provider-issued ID token and returns the asserted profile.
pub trait FederatedIdentityPort: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<FederatedProfile, AccountsServiceError>;
}
