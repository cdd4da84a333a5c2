use deadpool_redis::Pool;
use deadpool_redis::redis::{self, RedisError};

use crate::domain::repository::OtpRegister;
use crate::domain::types::{OTP_EVICTION_GRACE_SECS, OtpCheck};
use crate::error::AccountsServiceError;

// Both scripts read the Redis server clock, so issuer and verifier agree on
// expiry regardless of which replica of this service runs them. They are sent
// with EVAL; each runs atomically on the server.

/// KEYS[1] = otp key; ARGV = code, ttl secs, eviction grace secs.
/// Returns 1 when stored, 0 when a live entry blocks it.
const ISSUE_SCRIPT: &str = r#"
local now = tonumber(redis.call('TIME')[1])
local expires_at = redis.call('HGET', KEYS[1], 'expires_at')
if expires_at and tonumber(expires_at) > now then
    return 0
end
local ttl = tonumber(ARGV[2])
redis.call('DEL', KEYS[1])
redis.call('HSET', KEYS[1], 'code', ARGV[1], 'expires_at', now + ttl)
redis.call('EXPIRE', KEYS[1], ttl + tonumber(ARGV[3]))
return 1
"#;

/// KEYS[1] = otp key; ARGV[1] = presented code.
const VERIFY_SCRIPT: &str = r#"
local entry = redis.call('HMGET', KEYS[1], 'code', 'expires_at')
if not entry[1] then
    return 'missing'
end
local now = tonumber(redis.call('TIME')[1])
if tonumber(entry[2]) <= now then
    redis.call('DEL', KEYS[1])
    return 'expired'
end
if entry[1] ~= ARGV[1] then
    return 'mismatch'
end
redis.call('DEL', KEYS[1])
return 'matched'
"#;

/// `EVAL <script> 1 <key>`; callers append ARGV.
fn eval(script: &str, key: String) -> redis::Cmd {
    let mut cmd = redis::cmd("EVAL");
    cmd.arg(script).arg(1).arg(key);
    cmd
}

fn otp_key(email: &str) -> String {
    format!("otp:{email}")
}

#[derive(Clone)]
pub struct RedisOtpRegister {
    pub pool: Pool,
}

impl OtpRegister for RedisOtpRegister {
    async fn insert_if_absent(
        &self,
        email: &str,
        code: &str,
        ttl_secs: u64,
    ) -> Result<bool, AccountsServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AccountsServiceError::Internal(e.into()))?;
        let stored: i64 = eval(ISSUE_SCRIPT, otp_key(email))
            .arg(code)
            .arg(ttl_secs)
            .arg(OTP_EVICTION_GRACE_SECS)
            .query_async(&mut conn)
            .await
            .map_err(|e: RedisError| AccountsServiceError::Internal(e.into()))?;
        Ok(stored == 1)
    }

    async fn take_if_match(
        &self,
        email: &str,
        code: &str,
    ) -> Result<OtpCheck, AccountsServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AccountsServiceError::Internal(e.into()))?;
        let outcome: String = eval(VERIFY_SCRIPT, otp_key(email))
            .arg(code)
            .query_async(&mut conn)
            .await
            .map_err(|e: RedisError| AccountsServiceError::Internal(e.into()))?;
        parse_outcome(&outcome)
    }
}

fn parse_outcome(outcome: &str) -> Result<OtpCheck, AccountsServiceError> {
    match outcome {
        "matched" => Ok(OtpCheck::Matched),
        "mismatch" => Ok(OtpCheck::Mismatch),
        "missing" => Ok(OtpCheck::Missing),
        "expired" => Ok(OtpCheck::Expired),
        other => Err(AccountsServiceError::Internal(anyhow::anyhow!(
            "unexpected otp script outcome: {other}"
        ))),
    }
}
