use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use nextube_accounts_schema::{accounts, likes, subscriptions, videos};
use nextube_core::sea_ext::is_unique_violation;
use nextube_domain::account::Provider;
use nextube_domain::relationship::LikeTargetKind;

use crate::domain::repository::{
    AccountRepository, LikeRepository, SubscriptionRepository, VideoRepository,
};
use crate::domain::types::{
    Account, AccountDetailsPatch, Credentials, LikeEdge, SubscriptionEdge, Video,
};
use crate::error::AccountsServiceError;

/// Map a write error, turning unique-index violations into `on_conflict`.
fn write_err(
    err: DbErr,
    on_conflict: AccountsServiceError,
    what: &'static str,
) -> AccountsServiceError {
    if is_unique_violation(&err) {
        on_conflict
    } else {
        AccountsServiceError::Internal(anyhow::Error::new(err).context(what))
    }
}

// ── Account repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAccountRepository {
    pub db: DatabaseConnection,
}

impl AccountRepository for DbAccountRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AccountsServiceError> {
        let model = accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find account by id")?;
        model.map(account_from_model).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountsServiceError> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find account by email")?;
        model.map(account_from_model).transpose()
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, AccountsServiceError> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::Username.eq(username))
            .one(&self.db)
            .await
            .context("find account by username")?;
        model.map(account_from_model).transpose()
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Account>, AccountsServiceError> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find accounts by ids")?;
        models.into_iter().map(account_from_model).collect()
    }

    async fn create(&self, account: &Account) -> Result<(), AccountsServiceError> {
        accounts::ActiveModel {
            id: Set(account.id),
            email: Set(account.email.clone()),
            username: Set(account.username().map(str::to_owned)),
            password_hash: Set(account.password_hash().map(str::to_owned)),
            full_name: Set(account.full_name.clone()),
            avatar: Set(account.avatar.clone()),
            cover_image: Set(account.cover_image.clone()),
            provider: Set(account.provider.as_str().to_owned()),
            refresh_token: Set(account.refresh_token.clone()),
            created_at: Set(account.created_at),
            updated_at: Set(account.updated_at),
        }
        .insert(&self.db)
        .await
        .map_err(|e| write_err(e, AccountsServiceError::AccountAlreadyExists, "create account"))?;
        Ok(())
    }

    async fn set_refresh_token(
        &self,
        id: Uuid,
        token: Option<&str>,
    ) -> Result<(), AccountsServiceError> {
        accounts::Entity::update_many()
            .col_expr(
                accounts::Column::RefreshToken,
                Expr::value(token.map(str::to_owned)),
            )
            .filter(accounts::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("set refresh token")?;
        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        id: Uuid,
        expected: &str,
        new: &str,
    ) -> Result<bool, AccountsServiceError> {
        let result = accounts::Entity::update_many()
            .col_expr(accounts::Column::RefreshToken, Expr::value(new.to_owned()))
            .filter(accounts::Column::Id.eq(id))
            .filter(accounts::Column::RefreshToken.eq(expected))
            .exec(&self.db)
            .await
            .context("rotate refresh token")?;
        Ok(result.rows_affected == 1)
    }

    async fn reset_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), AccountsServiceError> {
        accounts::Entity::update_many()
            .col_expr(
                accounts::Column::PasswordHash,
                Expr::value(password_hash.to_owned()),
            )
            .col_expr(
                accounts::Column::RefreshToken,
                Expr::value(Option::<String>::None),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(accounts::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("reset password hash")?;
        Ok(())
    }

    async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), AccountsServiceError> {
        accounts::Entity::update_many()
            .col_expr(
                accounts::Column::PasswordHash,
                Expr::value(password_hash.to_owned()),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(accounts::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("update password hash")?;
        Ok(())
    }

    async fn complete_profile(
        &self,
        id: Uuid,
        username: &str,
        password_hash: &str,
    ) -> Result<bool, AccountsServiceError> {
        let result = accounts::Entity::update_many()
            .col_expr(accounts::Column::Username, Expr::value(username.to_owned()))
            .col_expr(
                accounts::Column::PasswordHash,
                Expr::value(password_hash.to_owned()),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(accounts::Column::Id.eq(id))
            .filter(accounts::Column::PasswordHash.is_null())
            .exec(&self.db)
            .await
            .map_err(|e| write_err(e, AccountsServiceError::UsernameTaken, "complete profile"))?;
        Ok(result.rows_affected == 1)
    }

    async fn update_details(
        &self,
        id: Uuid,
        patch: &AccountDetailsPatch,
    ) -> Result<Option<Account>, AccountsServiceError> {
        let mut update = accounts::Entity::update_many()
            .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(accounts::Column::Id.eq(id));
        if let Some(full_name) = &patch.full_name {
            update = update.col_expr(accounts::Column::FullName, Expr::value(full_name.clone()));
        }
        if let Some(email) = &patch.email {
            update = update.col_expr(accounts::Column::Email, Expr::value(email.clone()));
        }
        let result = update
            .exec(&self.db)
            .await
            .map_err(|e| write_err(e, AccountsServiceError::EmailTaken, "update account details"))?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn update_avatar(
        &self,
        id: Uuid,
        url: &str,
    ) -> Result<Option<Account>, AccountsServiceError> {
        self.set_media_column(id, accounts::Column::Avatar, Some(url))
            .await
    }

    async fn update_cover_image(
        &self,
        id: Uuid,
        url: &str,
    ) -> Result<Option<Account>, AccountsServiceError> {
        self.set_media_column(id, accounts::Column::CoverImage, Some(url))
            .await
    }
}

impl DbAccountRepository {
    async fn set_media_column(
        &self,
        id: Uuid,
        column: accounts::Column,
        url: Option<&str>,
    ) -> Result<Option<Account>, AccountsServiceError> {
        let result = accounts::Entity::update_many()
            .col_expr(column, Expr::value(url.map(str::to_owned)))
            .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(accounts::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("update account media")?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }
}

fn account_from_model(model: accounts::Model) -> Result<Account, AccountsServiceError> {
    let provider = model
        .provider
        .parse::<Provider>()
        .with_context(|| format!("account {} has unknown provider", model.id))?;
    let credentials = match (model.username, model.password_hash) {
        (Some(username), Some(password_hash)) => Credentials::Complete {
            username,
            password_hash,
        },
        _ => Credentials::Pending,
    };
    Ok(Account {
        id: model.id,
        email: model.email,
        full_name: model.full_name,
        avatar: model.avatar,
        cover_image: model.cover_image,
        provider,
        credentials,
        refresh_token: model.refresh_token,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Subscription repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSubscriptionRepository {
    pub db: DatabaseConnection,
}

impl SubscriptionRepository for DbSubscriptionRepository {
    async fn delete(
        &self,
        subscriber_id: Uuid,
        channel_id: Uuid,
    ) -> Result<bool, AccountsServiceError> {
        let result = subscriptions::Entity::delete_many()
            .filter(subscriptions::Column::SubscriberId.eq(subscriber_id))
            .filter(subscriptions::Column::ChannelId.eq(channel_id))
            .exec(&self.db)
            .await
            .context("delete subscription")?;
        Ok(result.rows_affected > 0)
    }

    async fn insert_if_absent(
        &self,
        subscriber_id: Uuid,
        channel_id: Uuid,
    ) -> Result<SubscriptionEdge, AccountsServiceError> {
        let now = Utc::now();
        let model = subscriptions::ActiveModel {
            subscriber_id: Set(subscriber_id),
            channel_id: Set(channel_id),
            created_at: Set(now),
        };
        subscriptions::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    subscriptions::Column::SubscriberId,
                    subscriptions::Column::ChannelId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("insert subscription")?;

        let stored = subscriptions::Entity::find_by_id((subscriber_id, channel_id))
            .one(&self.db)
            .await
            .context("read back subscription")?;
        Ok(stored.map(subscription_from_model).unwrap_or(SubscriptionEdge {
            subscriber_id,
            channel_id,
            created_at: now,
        }))
    }

    async fn exists(
        &self,
        subscriber_id: Uuid,
        channel_id: Uuid,
    ) -> Result<bool, AccountsServiceError> {
        let model = subscriptions::Entity::find_by_id((subscriber_id, channel_id))
            .one(&self.db)
            .await
            .context("find subscription")?;
        Ok(model.is_some())
    }

    async fn list_by_channel(
        &self,
        channel_id: Uuid,
    ) -> Result<Vec<SubscriptionEdge>, AccountsServiceError> {
        let models = subscriptions::Entity::find()
            .filter(subscriptions::Column::ChannelId.eq(channel_id))
            .order_by_desc(subscriptions::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list subscriptions by channel")?;
        Ok(models.into_iter().map(subscription_from_model).collect())
    }

    async fn list_by_subscriber(
        &self,
        subscriber_id: Uuid,
    ) -> Result<Vec<SubscriptionEdge>, AccountsServiceError> {
        let models = subscriptions::Entity::find()
            .filter(subscriptions::Column::SubscriberId.eq(subscriber_id))
            .order_by_desc(subscriptions::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list subscriptions by subscriber")?;
        Ok(models.into_iter().map(subscription_from_model).collect())
    }

    async fn count_by_channel(&self, channel_id: Uuid) -> Result<u64, AccountsServiceError> {
        let count = subscriptions::Entity::find()
            .filter(subscriptions::Column::ChannelId.eq(channel_id))
            .count(&self.db)
            .await
            .context("count subscribers")?;
        Ok(count)
    }

    async fn count_by_subscriber(&self, subscriber_id: Uuid) -> Result<u64, AccountsServiceError> {
        let count = subscriptions::Entity::find()
            .filter(subscriptions::Column::SubscriberId.eq(subscriber_id))
            .count(&self.db)
            .await
            .context("count subscriptions")?;
        Ok(count)
    }
}

fn subscription_from_model(model: subscriptions::Model) -> SubscriptionEdge {
    SubscriptionEdge {
        subscriber_id: model.subscriber_id,
        channel_id: model.channel_id,
        created_at: model.created_at,
    }
}

// ── Like repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbLikeRepository {
    pub db: DatabaseConnection,
}

impl LikeRepository for DbLikeRepository {
    async fn delete(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        kind: LikeTargetKind,
    ) -> Result<bool, AccountsServiceError> {
        let result = likes::Entity::delete_many()
            .filter(likes::Column::ActorId.eq(actor_id))
            .filter(likes::Column::TargetId.eq(target_id))
            .filter(likes::Column::TargetKind.eq(kind.as_str()))
            .exec(&self.db)
            .await
            .context("delete like")?;
        Ok(result.rows_affected > 0)
    }

    async fn insert_if_absent(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        kind: LikeTargetKind,
    ) -> Result<LikeEdge, AccountsServiceError> {
        let now = Utc::now();
        let model = likes::ActiveModel {
            actor_id: Set(actor_id),
            target_id: Set(target_id),
            target_kind: Set(kind.as_str().to_owned()),
            created_at: Set(now),
        };
        likes::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    likes::Column::ActorId,
                    likes::Column::TargetId,
                    likes::Column::TargetKind,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("insert like")?;

        let stored = likes::Entity::find_by_id((actor_id, target_id, kind.as_str().to_owned()))
            .one(&self.db)
            .await
            .context("read back like")?;
        match stored {
            Some(model) => like_from_model(model),
            None => Ok(LikeEdge {
                actor_id,
                target_id,
                target_kind: kind,
                created_at: now,
            }),
        }
    }

    async fn list_by_actor(
        &self,
        actor_id: Uuid,
        kind: LikeTargetKind,
    ) -> Result<Vec<LikeEdge>, AccountsServiceError> {
        let models = likes::Entity::find()
            .filter(likes::Column::ActorId.eq(actor_id))
            .filter(likes::Column::TargetKind.eq(kind.as_str()))
            .order_by_desc(likes::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list likes by actor")?;
        models.into_iter().map(like_from_model).collect()
    }

    async fn count_for_targets(
        &self,
        kind: LikeTargetKind,
        target_ids: &[Uuid],
    ) -> Result<u64, AccountsServiceError> {
        let count = likes::Entity::find()
            .filter(likes::Column::TargetKind.eq(kind.as_str()))
            .filter(likes::Column::TargetId.is_in(target_ids.iter().copied()))
            .count(&self.db)
            .await
            .context("count likes for targets")?;
        Ok(count)
    }

    async fn count_by_actor(&self, actor_id: Uuid) -> Result<u64, AccountsServiceError> {
        let count = likes::Entity::find()
            .filter(likes::Column::ActorId.eq(actor_id))
            .count(&self.db)
            .await
            .context("count likes by actor")?;
        Ok(count)
    }
}

fn like_from_model(model: likes::Model) -> Result<LikeEdge, AccountsServiceError> {
    let target_kind = model
        .target_kind
        .parse::<LikeTargetKind>()
        .context("like row has unknown target kind")?;
    Ok(LikeEdge {
        actor_id: model.actor_id,
        target_id: model.target_id,
        target_kind,
        created_at: model.created_at,
    })
}

// ── Video repository (read-only) ─────────────────────────────────────────────

#[derive(Clone)]
pub struct DbVideoRepository {
    pub db: DatabaseConnection,
}

impl VideoRepository for DbVideoRepository {
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Video>, AccountsServiceError> {
        let models = videos::Entity::find()
            .filter(videos::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find videos by ids")?;
        Ok(models.into_iter().map(video_from_model).collect())
    }

    async fn list_ids_by_owner(&self, owner_id: Uuid) -> Result<Vec<Uuid>, AccountsServiceError> {
        let ids = videos::Entity::find()
            .select_only()
            .column(videos::Column::Id)
            .filter(videos::Column::OwnerId.eq(owner_id))
            .into_tuple::<Uuid>()
            .all(&self.db)
            .await
            .context("list video ids by owner")?;
        Ok(ids)
    }

    async fn total_views_by_owner(&self, owner_id: Uuid) -> Result<u64, AccountsServiceError> {
        // Summed here: Postgres widens SUM(bigint) to numeric.
        let views = videos::Entity::find()
            .select_only()
            .column(videos::Column::Views)
            .filter(videos::Column::OwnerId.eq(owner_id))
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .context("list video views by owner")?;
        Ok(views.into_iter().map(|v| v.max(0) as u64).sum())
    }
}

fn video_from_model(model: videos::Model) -> Video {
    Video {
        id: model.id,
        owner_id: model.owner_id,
        title: model.title,
        description: model.description,
        thumbnail: model.thumbnail,
        video_file: model.video_file,
        duration: model.duration,
        views: model.views,
        is_published: model.is_published,
        created_at: model.created_at,
    }
}
