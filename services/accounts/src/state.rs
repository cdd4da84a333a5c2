use deadpool_redis::Pool as RedisPool;
use deadpool_redis::redis;
use sea_orm::DatabaseConnection;

use nextube_core::health::Readiness;

use crate::infra::cache::RedisOtpRegister;
use crate::infra::db::{
    DbAccountRepository, DbLikeRepository, DbSubscriptionRepository, DbVideoRepository,
};
use crate::infra::google::GoogleIdentityVerifier;
use crate::infra::mailer::SmtpMailer;
use crate::infra::media::DiskMediaStorage;
use crate::usecase::token::TokenKeys;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: RedisPool,
    pub keys: TokenKeys,
    pub cookie_domain: String,
    pub reset_url_base: String,
    pub mailer: SmtpMailer,
    pub media: DiskMediaStorage,
    pub google: GoogleIdentityVerifier,
}

impl AppState {
    pub fn account_repo(&self) -> DbAccountRepository {
        DbAccountRepository {
            db: self.db.clone(),
        }
    }

    pub fn subscription_repo(&self) -> DbSubscriptionRepository {
        DbSubscriptionRepository {
            db: self.db.clone(),
        }
    }

    pub fn like_repo(&self) -> DbLikeRepository {
        DbLikeRepository {
            db: self.db.clone(),
        }
    }

    pub fn video_repo(&self) -> DbVideoRepository {
        DbVideoRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_register(&self) -> RedisOtpRegister {
        RedisOtpRegister {
            pool: self.redis.clone(),
        }
    }
}

impl Readiness for AppState {
    async fn is_ready(&self) -> bool {
        if let Err(e) = self.db.ping().await {
            tracing::warn!(error = %e, "postgres not ready");
            return false;
        }
        let mut conn = match self.redis.get().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(error = %e, "redis pool not ready");
                return false;
            }
        };
        match redis::cmd("PING").query_async::<String>(&mut conn).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "redis not ready");
                false
            }
        }
    }
}
