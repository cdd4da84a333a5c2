use axum::{
    extract::State,
    response::IntoResponse,
};

use nextube_auth_types::identity::IdentityHeaders;
use nextube_domain::relationship::LikeTargetKind;

use crate::error::AccountsServiceError;
use crate::handlers::extract::{Json, Path};
use crate::handlers::{ToggleResponse, parse_path_id};
use crate::state::AppState;
use crate::usecase::like::{ListLikedVideosUseCase, ToggleLikeUseCase};

// ── POST /likes/toggle/{kind}/{target_id} ────────────────────────────────────

/// `kind` is the short route segment: `v`, `c` or `t`.
pub async fn toggle_like(
    State(state): State<AppState>,
    identity: IdentityHeaders,
    Path((kind, target_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AccountsServiceError> {
    let kind = LikeTargetKind::from_route_segment(&kind)
        .ok_or_else(|| AccountsServiceError::Validation(format!("unknown like target: {kind}")))?;
    let target_id = parse_path_id(&target_id, "target id")?;

    let usecase = ToggleLikeUseCase {
        likes: state.like_repo(),
    };
    let toggle = usecase.execute(identity.account_id, target_id, kind).await?;
    Ok(Json(ToggleResponse::from(toggle)))
}

// ── GET /likes/videos ────────────────────────────────────────────────────────

pub async fn liked_videos(
    State(state): State<AppState>,
    identity: IdentityHeaders,
) -> Result<impl IntoResponse, AccountsServiceError> {
    let usecase = ListLikedVideosUseCase {
        likes: state.like_repo(),
        videos: state.video_repo(),
    };
    Ok(Json(usecase.execute(identity.account_id).await?))
}
