use axum::{
    extract::State,
    response::IntoResponse,
};

use nextube_auth_types::identity::IdentityHeaders;

use crate::error::AccountsServiceError;
use crate::handlers::extract::{Json, Path};
use crate::handlers::{ToggleResponse, parse_path_id};
use crate::state::AppState;
use crate::usecase::subscription::{
    ListSubscribersUseCase, ListSubscriptionsUseCase, ToggleSubscriptionUseCase,
};

// ── POST /subscriptions/c/{channel_id} ───────────────────────────────────────

pub async fn toggle_subscription(
    State(state): State<AppState>,
    identity: IdentityHeaders,
    Path(channel_id): Path<String>,
) -> Result<impl IntoResponse, AccountsServiceError> {
    let channel_id = parse_path_id(&channel_id, "channel id")?;
    let usecase = ToggleSubscriptionUseCase {
        accounts: state.account_repo(),
        subscriptions: state.subscription_repo(),
    };
    let toggle = usecase.execute(identity.account_id, channel_id).await?;
    Ok(Json(ToggleResponse::from(toggle)))
}

// ── GET /subscriptions/c/{channel_id} ────────────────────────────────────────

pub async fn list_subscribers(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> Result<impl IntoResponse, AccountsServiceError> {
    let channel_id = parse_path_id(&channel_id, "channel id")?;
    let usecase = ListSubscribersUseCase {
        accounts: state.account_repo(),
        subscriptions: state.subscription_repo(),
    };
    Ok(Json(usecase.execute(channel_id).await?))
}

// ── GET /subscriptions/u/{subscriber_id} ─────────────────────────────────────

pub async fn list_subscriptions(
    State(state): State<AppState>,
    Path(subscriber_id): Path<String>,
) -> Result<impl IntoResponse, AccountsServiceError> {
    let subscriber_id = parse_path_id(&subscriber_id, "subscriber id")?;
    let usecase = ListSubscriptionsUseCase {
        accounts: state.account_repo(),
        subscriptions: state.subscription_repo(),
    };
    Ok(Json(usecase.execute(subscriber_id).await?))
}
