use std::collections::HashMap;

use uuid::Uuid;

use nextube_domain::relationship::Toggle;

use crate::domain::repository::{AccountRepository, SubscriptionRepository};
use crate::domain::types::{PublicAccount, SubscriptionEdge};
use crate::error::AccountsServiceError;

/// Resolve counterpart ids to public projections, keeping `ids` order and
/// dropping accounts that no longer exist.
async fn public_accounts<A: AccountRepository>(
    accounts: &A,
    ids: Vec<Uuid>,
) -> Result<Vec<PublicAccount>, AccountsServiceError> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let by_id: HashMap<Uuid, PublicAccount> = accounts
        .find_many(&ids)
        .await?
        .into_iter()
        .map(|a| (a.id, a.public()))
        .collect();
    Ok(ids.iter().filter_map(|id| by_id.get(id).cloned()).collect())
}

// ── ToggleSubscription ───────────────────────────────────────────────────────

pub struct ToggleSubscriptionUseCase<A: AccountRepository, S: SubscriptionRepository> {
    pub accounts: A,
    pub subscriptions: S,
}

impl<A: AccountRepository, S: SubscriptionRepository> ToggleSubscriptionUseCase<A, S> {
    /// Delete-first toggle. Self-subscription is allowed.
    pub async fn execute(
        &self,
        subscriber_id: Uuid,
        channel_id: Uuid,
    ) -> Result<Toggle<SubscriptionEdge>, AccountsServiceError> {
        if self.accounts.find_by_id(channel_id).await?.is_none() {
            return Err(AccountsServiceError::ChannelNotFound);
        }

        if self.subscriptions.delete(subscriber_id, channel_id).await? {
            return Ok(Toggle::Removed);
        }
        // A concurrent toggle that inserted first leaves the edge present,
        // which is the outcome this call asked for.
        let edge = self
            .subscriptions
            .insert_if_absent(subscriber_id, channel_id)
            .await?;
        Ok(Toggle::Added(edge))
    }
}

// ── ListSubscribers / ListSubscriptions ──────────────────────────────────────

pub struct ListSubscribersUseCase<A: AccountRepository, S: SubscriptionRepository> {
    pub accounts: A,
    pub subscriptions: S,
}

impl<A: AccountRepository, S: SubscriptionRepository> ListSubscribersUseCase<A, S> {
    pub async fn execute(&self, channel_id: Uuid) -> Result<Vec<PublicAccount>, AccountsServiceError> {
        let ids = self
            .subscriptions
            .list_by_channel(channel_id)
            .await?
            .into_iter()
            .map(|e| e.subscriber_id)
            .collect();
        public_accounts(&self.accounts, ids).await
    }
}

pub struct ListSubscriptionsUseCase<A: AccountRepository, S: SubscriptionRepository> {
    pub accounts: A,
    pub subscriptions: S,
}

impl<A: AccountRepository, S: SubscriptionRepository> ListSubscriptionsUseCase<A, S> {
    pub async fn execute(
        &self,
        subscriber_id: Uuid,
    ) -> Result<Vec<PublicAccount>, AccountsServiceError> {
        let ids = self
            .subscriptions
            .list_by_subscriber(subscriber_id)
            .await?
            .into_iter()
            .map(|e| e.channel_id)
            .collect();
        public_accounts(&self.accounts, ids).await
    }
}
