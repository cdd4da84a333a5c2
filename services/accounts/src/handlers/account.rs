use axum::{extract::State, response::IntoResponse};
use serde::Deserialize;

use nextube_auth_types::identity::IdentityHeaders;

use crate::domain::types::AccountView;
use crate::error::AccountsServiceError;
use crate::handlers::extract::{Json, Multipart};
use crate::handlers::multipart::MultipartForm;
use crate::state::AppState;
use crate::usecase::account::{
    CurrentAccountUseCase, MediaSlot, UpdateDetailsInput, UpdateDetailsUseCase, UpdateMediaUseCase,
};

// ── GET /users/current-user ──────────────────────────────────────────────────

pub async fn current_user(
    State(state): State<AppState>,
    identity: IdentityHeaders,
) -> Result<impl IntoResponse, AccountsServiceError> {
    let usecase = CurrentAccountUseCase {
        accounts: state.account_repo(),
    };
    let account = usecase.execute(identity.account_id).await?;
    Ok(Json(account))
}

// ── PATCH /users/update-account ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateAccountRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

pub async fn update_account(
    State(state): State<AppState>,
    identity: IdentityHeaders,
    Json(body): Json<UpdateAccountRequest>,
) -> Result<impl IntoResponse, AccountsServiceError> {
    let usecase = UpdateDetailsUseCase {
        accounts: state.account_repo(),
    };
    let account = usecase
        .execute(UpdateDetailsInput {
            account_id: identity.account_id,
            full_name: body.full_name,
            email: body.email,
        })
        .await?;
    Ok(Json(account))
}

// ── PATCH /users/avatar, /users/cover-image ──────────────────────────────────

async fn replace_media(
    state: AppState,
    account_id: uuid::Uuid,
    slot: MediaSlot,
    field: &str,
    multipart: axum::extract::Multipart,
) -> Result<Json<AccountView>, AccountsServiceError> {
    let mut form = MultipartForm::read(multipart).await?;
    let usecase = UpdateMediaUseCase {
        accounts: state.account_repo(),
        media: state.media.clone(),
    };
    let account = usecase
        .execute(account_id, slot, form.take_file(field))
        .await?;
    Ok(Json(account))
}

pub async fn update_avatar(
    State(state): State<AppState>,
    identity: IdentityHeaders,
    Multipart(multipart): Multipart,
) -> Result<impl IntoResponse, AccountsServiceError> {
    replace_media(state, identity.account_id, MediaSlot::Avatar, "avatar", multipart).await
}

pub async fn update_cover_image(
    State(state): State<AppState>,
    identity: IdentityHeaders,
    Multipart(multipart): Multipart,
) -> Result<impl IntoResponse, AccountsServiceError> {
    replace_media(
        state,
        identity.account_id,
        MediaSlot::CoverImage,
        "cover_image",
        multipart,
    )
    .await
}
