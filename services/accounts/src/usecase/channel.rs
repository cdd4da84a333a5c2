use serde::Serialize;
use uuid::Uuid;

use nextube_domain::relationship::LikeTargetKind;

use crate::domain::repository::{
    AccountRepository, LikeRepository, SubscriptionRepository, VideoRepository,
};
use crate::domain::types::{ChannelStats, DashboardStats, PublicAccount, normalize_username};
use crate::error::AccountsServiceError;

#[derive(Debug, Serialize)]
pub struct ChannelProfile {
    #[serde(flatten)]
    pub account: PublicAccount,
    pub cover_image: Option<String>,
    #[serde(flatten)]
    pub stats: ChannelStats,
}

// ── ChannelProfile ───────────────────────────────────────────────────────────

pub struct ChannelProfileUseCase<A: AccountRepository, S: SubscriptionRepository> {
    pub accounts: A,
    pub subscriptions: S,
}

impl<A: AccountRepository, S: SubscriptionRepository> ChannelProfileUseCase<A, S> {
    /// Counts are computed per call; nothing is cached.
    pub async fn execute(
        &self,
        username: &str,
        viewer_id: Option<Uuid>,
    ) -> Result<ChannelProfile, AccountsServiceError> {
        let username =
            normalize_username(username).map_err(|_| AccountsServiceError::ChannelNotFound)?;
        let channel = self
            .accounts
            .find_by_username(&username)
            .await?
            .ok_or(AccountsServiceError::ChannelNotFound)?;

        let subscriber_count = self.subscriptions.count_by_channel(channel.id).await?;
        let following_count = self.subscriptions.count_by_subscriber(channel.id).await?;
        let is_subscribed = match viewer_id {
            Some(viewer) => self.subscriptions.exists(viewer, channel.id).await?,
            None => false,
        };

        Ok(ChannelProfile {
            account: channel.public(),
            cover_image: channel.cover_image.clone(),
            stats: ChannelStats {
                subscriber_count,
                following_count,
                is_subscribed,
            },
        })
    }
}

// ── DashboardStats ───────────────────────────────────────────────────────────

pub struct DashboardStatsUseCase<S, L, V>
where
    S: SubscriptionRepository,
    L: LikeRepository,
    V: VideoRepository,
{
    pub subscriptions: S,
    pub likes: L,
    pub videos: V,
}

impl<S, L, V> DashboardStatsUseCase<S, L, V>
where
    S: SubscriptionRepository,
    L: LikeRepository,
    V: VideoRepository,
{
    pub async fn execute(&self, account_id: Uuid) -> Result<DashboardStats, AccountsServiceError> {
        let subscriber_count = self.subscriptions.count_by_channel(account_id).await?;
        let view_count = self.videos.total_views_by_owner(account_id).await?;
        let like_count = self.likes.count_by_actor(account_id).await?;
        let video_ids = self.videos.list_ids_by_owner(account_id).await?;
        let video_like_count = if video_ids.is_empty() {
            0
        } else {
            self.likes
                .count_for_targets(LikeTargetKind::Video, &video_ids)
                .await?
        };
        Ok(DashboardStats {
            view_count,
            subscriber_count,
            video_count: video_ids.len() as u64,
            like_count,
            video_like_count,
        })
    }
}
