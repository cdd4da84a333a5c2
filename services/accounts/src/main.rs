use sea_orm::Database;
use tracing::info;

use nextube_accounts::config::AccountsConfig;
use nextube_accounts::infra::google::GoogleIdentityVerifier;
use nextube_accounts::infra::mailer::SmtpMailer;
use nextube_accounts::infra::media::DiskMediaStorage;
use nextube_accounts::router::build_router;
use nextube_accounts::state::AppState;
use nextube_accounts::usecase::token::TokenKeys;

#[tokio::main]
async fn main() {
    nextube_core::tracing::init_tracing("info,sea_orm=warn");

    let config = AccountsConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    let mailer = SmtpMailer::new(config.smtp_url.as_deref(), &config.email_from)
        .expect("invalid SMTP configuration");
    if !mailer.is_configured() {
        info!("SMTP_URL not set, outbound email goes to the log");
    }

    tokio::fs::create_dir_all(&config.media_dir)
        .await
        .expect("failed to create media directory");
    let media = DiskMediaStorage::new(&config.media_dir, &config.media_base_url);

    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .expect("failed to build HTTP client");

    let state = AppState {
        db,
        redis,
        keys: TokenKeys {
            access_secret: config.access_token_secret,
            refresh_secret: config.refresh_token_secret,
            reset_secret: config.reset_token_secret,
            access_ttl_secs: config.access_token_ttl_secs,
            refresh_ttl_secs: config.refresh_token_ttl_secs,
        },
        cookie_domain: config.cookie_domain,
        reset_url_base: config.reset_url_base,
        mailer,
        media,
        google: GoogleIdentityVerifier::new(http, config.google_client_id),
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.accounts_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("accounts service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
