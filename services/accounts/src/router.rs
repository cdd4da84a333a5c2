use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use nextube_core::health::{healthz, readyz};
use nextube_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    account::{current_user, update_account, update_avatar, update_cover_image},
    channel::{channel_profile, dashboard_stats},
    federated::{complete_profile, google_login},
    like::{liked_videos, toggle_like},
    password::{forgot_password, reset_password},
    registration::{register, resend_otp, verify_otp},
    session::{change_password, login, logout, refresh_token},
    subscription::{list_subscribers, list_subscriptions, toggle_subscription},
    token::check_token,
};
use crate::state::AppState;

/// Upper bound for multipart bodies carrying images.
pub const MEDIA_BODY_LIMIT: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let media_dir = state.media.root.clone();

    // Routes that accept image uploads get a larger body limit.
    let uploads = Router::new()
        .route("/users/verify-otp", post(verify_otp))
        .route("/users/avatar", patch(update_avatar))
        .route("/users/cover-image", patch(update_cover_image))
        .layer(DefaultBodyLimit::max(MEDIA_BODY_LIMIT));

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz::<AppState>))
        // Registration
        .route("/users/register", post(register))
        .route("/users/resend-otp", post(resend_otp))
        // Sessions
        .route("/users/login", post(login))
        .route("/users/google-login", post(google_login))
        .route("/users/logout", post(logout))
        .route("/users/refresh-token", post(refresh_token))
        .route("/users/token", get(check_token))
        // Passwords
        .route("/users/change-password", post(change_password))
        .route("/users/forgot-password", post(forgot_password))
        .route("/users/reset-password", post(reset_password))
        // Account
        .route("/users/current-user", get(current_user))
        .route("/users/update-account", patch(update_account))
        .route("/users/complete-profile", patch(complete_profile))
        // Channels
        .route("/users/channel/{username}", get(channel_profile))
        .route("/dashboard/stats", get(dashboard_stats))
        // Subscriptions
        .route(
            "/subscriptions/c/{channel_id}",
            post(toggle_subscription).get(list_subscribers),
        )
        .route("/subscriptions/u/{subscriber_id}", get(list_subscriptions))
        // Likes
        .route("/likes/toggle/{kind}/{target_id}", post(toggle_like))
        .route("/likes/videos", get(liked_videos))
        .merge(uploads)
        .nest_service("/media", ServeDir::new(media_dir))
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(propagate_request_id_layer()),
        )
        .with_state(state)
}
