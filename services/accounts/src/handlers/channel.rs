use axum::{
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
};
use uuid::Uuid;

use nextube_auth_types::identity::{ACCOUNT_ID_HEADER, IdentityHeaders};

use crate::error::AccountsServiceError;
use crate::handlers::extract::{Json, Path};
use crate::state::AppState;
use crate::usecase::channel::{ChannelProfileUseCase, DashboardStatsUseCase};

/// The channel page is public; a gateway-verified viewer only adds
/// `is_subscribed`.
fn viewer_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(ACCOUNT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

// ── GET /users/channel/{username} ────────────────────────────────────────────

pub async fn channel_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AccountsServiceError> {
    let usecase = ChannelProfileUseCase {
        accounts: state.account_repo(),
        subscriptions: state.subscription_repo(),
    };
    let profile = usecase.execute(&username, viewer_id(&headers)).await?;
    Ok(Json(profile))
}

// ── GET /dashboard/stats ─────────────────────────────────────────────────────

pub async fn dashboard_stats(
    State(state): State<AppState>,
    identity: IdentityHeaders,
) -> Result<impl IntoResponse, AccountsServiceError> {
    let usecase = DashboardStatsUseCase {
        subscriptions: state.subscription_repo(),
        likes: state.like_repo(),
        videos: state.video_repo(),
    };
    let stats = usecase.execute(identity.account_id).await?;
    Ok(Json(stats))
}
