use std::collections::HashMap;

use uuid::Uuid;

use nextube_domain::relationship::{LikeTargetKind, Toggle};

use crate::domain::repository::{LikeRepository, VideoRepository};
use crate::domain::types::{LikeEdge, Video};
use crate::error::AccountsServiceError;

// ── ToggleLike ───────────────────────────────────────────────────────────────

pub struct ToggleLikeUseCase<L: LikeRepository> {
    pub likes: L,
}

impl<L: LikeRepository> ToggleLikeUseCase<L> {
    pub async fn execute(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        kind: LikeTargetKind,
    ) -> Result<Toggle<LikeEdge>, AccountsServiceError> {
        if self.likes.delete(actor_id, target_id, kind).await? {
            return Ok(Toggle::Removed);
        }
        let edge = self
            .likes
            .insert_if_absent(actor_id, target_id, kind)
            .await?;
        Ok(Toggle::Added(edge))
    }
}

// ── ListLikedVideos ──────────────────────────────────────────────────────────

pub struct ListLikedVideosUseCase<L: LikeRepository, V: VideoRepository> {
    pub likes: L,
    pub videos: V,
}

impl<L: LikeRepository, V: VideoRepository> ListLikedVideosUseCase<L, V> {
    /// Most recently liked first. Likes whose video is gone are skipped.
    pub async fn execute(&self, actor_id: Uuid) -> Result<Vec<Video>, AccountsServiceError> {
        let edges = self
            .likes
            .list_by_actor(actor_id, LikeTargetKind::Video)
            .await?;
        if edges.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<Uuid> = edges.iter().map(|e| e.target_id).collect();
        let mut by_id: HashMap<Uuid, Video> = self
            .videos
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|v| (v.id, v))
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}
