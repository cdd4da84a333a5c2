use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use nextube_auth_types::token::{JwtClaims, TokenType, validate_token};

use crate::domain::types::RESET_GRANT_TTL_SECS;
use crate::error::AccountsServiceError;

/// Signing material and lifetimes for every token this service mints.
#[derive(Debug, Clone)]
pub struct TokenKeys {
    pub access_secret: String,
    pub refresh_secret: String,
    pub reset_secret: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
}

/// Freshly minted access/refresh pair.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: String,
    pub access_token_exp: u64,
    pub refresh_token: String,
    pub refresh_token_exp: u64,
}

/// Claims recovered from a verified reset grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetGrant {
    pub account_id: Uuid,
    pub fingerprint: String,
}

fn now_secs() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

fn sign(
    account_id: Uuid,
    typ: TokenType,
    exp: u64,
    pwv: Option<String>,
    secret: &str,
) -> Result<String, AccountsServiceError> {
    let claims = JwtClaims {
        sub: account_id.to_string(),
        exp,
        typ,
        jti: Uuid::new_v4().to_string(),
        pwv,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AccountsServiceError::Internal(e.into()))
}

pub fn issue_session(
    account_id: Uuid,
    keys: &TokenKeys,
) -> Result<SessionTokens, AccountsServiceError> {
    let now = now_secs();
    let access_token_exp = now + keys.access_ttl_secs;
    let refresh_token_exp = now + keys.refresh_ttl_secs;
    Ok(SessionTokens {
        access_token: sign(
            account_id,
            TokenType::Access,
            access_token_exp,
            None,
            &keys.access_secret,
        )?,
        access_token_exp,
        refresh_token: sign(
            account_id,
            TokenType::Refresh,
            refresh_token_exp,
            None,
            &keys.refresh_secret,
        )?,
        refresh_token_exp,
    })
}

/// Signature, expiry and `typ` only. Whether the token is still the one on
/// file is the rotation step's job.
pub fn validate_refresh_token(token: &str, keys: &TokenKeys) -> Result<Uuid, AccountsServiceError> {
    let claims = validate_token(token, &keys.refresh_secret, TokenType::Refresh)
        .map_err(|_| AccountsServiceError::InvalidRefreshToken)?;
    claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| AccountsServiceError::InvalidRefreshToken)
}

pub fn issue_reset_grant(
    account_id: Uuid,
    fingerprint: String,
    keys: &TokenKeys,
) -> Result<String, AccountsServiceError> {
    let exp = now_secs() + RESET_GRANT_TTL_SECS;
    sign(
        account_id,
        TokenType::Reset,
        exp,
        Some(fingerprint),
        &keys.reset_secret,
    )
}

pub fn validate_reset_grant(token: &str, keys: &TokenKeys) -> Result<ResetGrant, AccountsServiceError> {
    let claims = validate_token(token, &keys.reset_secret, TokenType::Reset)
        .map_err(|_| AccountsServiceError::InvalidResetGrant)?;
    let account_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| AccountsServiceError::InvalidResetGrant)?;
    let fingerprint = claims.pwv.ok_or(AccountsServiceError::InvalidResetGrant)?;
    Ok(ResetGrant {
        account_id,
        fingerprint,
    })
}
