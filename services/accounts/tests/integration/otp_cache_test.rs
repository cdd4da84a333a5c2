//! Runs the OTP scripts against a live Redis:
//! `REDIS_URL=redis://127.0.0.1:6379 cargo test -p nextube-accounts -- --ignored`

use std::time::Duration;

use uuid::Uuid;

use nextube_accounts::domain::repository::OtpRegister;
use nextube_accounts::domain::types::OtpCheck;
use nextube_accounts::infra::cache::RedisOtpRegister;

fn register() -> RedisOtpRegister {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_owned());
    let pool = deadpool_redis::Config::from_url(&url)
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .unwrap();
    RedisOtpRegister { pool }
}

fn unique_email() -> String {
    format!("{}@otp.test", Uuid::now_v7())
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn should_block_reissue_while_live_and_consume_on_match() {
    let otp = register();
    let email = unique_email();

    assert!(otp.insert_if_absent(&email, "1234", 60).await.unwrap());
    assert!(!otp.insert_if_absent(&email, "9999", 60).await.unwrap());

    assert_eq!(otp.take_if_match(&email, "1234").await.unwrap(), OtpCheck::Matched);
    assert_eq!(otp.take_if_match(&email, "1234").await.unwrap(), OtpCheck::Missing);
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn should_keep_entry_after_mismatch() {
    let otp = register();
    let email = unique_email();
    otp.insert_if_absent(&email, "1234", 60).await.unwrap();

    assert_eq!(otp.take_if_match(&email, "0000").await.unwrap(), OtpCheck::Mismatch);
    assert_eq!(otp.take_if_match(&email, "1234").await.unwrap(), OtpCheck::Matched);
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn should_report_expired_once_then_missing() {
    let otp = register();
    let email = unique_email();
    otp.insert_if_absent(&email, "1234", 1).await.unwrap();

    tokio::time::sleep(Duration::from_millis(2100)).await;

    // The grace period keeps the key around so expiry is told apart from
    // absence; the expired read deletes it.
    assert_eq!(otp.take_if_match(&email, "1234").await.unwrap(), OtpCheck::Expired);
    assert_eq!(otp.take_if_match(&email, "1234").await.unwrap(), OtpCheck::Missing);
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn should_allow_reissue_after_expiry() {
    let otp = register();
    let email = unique_email();
    otp.insert_if_absent(&email, "1234", 1).await.unwrap();

    tokio::time::sleep(Duration::from_millis(2100)).await;

    assert!(otp.insert_if_absent(&email, "5678", 60).await.unwrap());
    assert_eq!(otp.take_if_match(&email, "5678").await.unwrap(), OtpCheck::Matched);
}
