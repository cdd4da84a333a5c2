//! JWT claims and access-token validation.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "USE_ONLY_IN_ACCOUNTS_SERVICE", test))]
use serde::Serialize;
use uuid::Uuid;

/// Account identity extracted from a validated access token.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub account_id: Uuid,
    pub access_token_exp: u64,
}

/// Errors returned by token validation.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("unexpected token type")]
    WrongType,
}

/// Purpose a token was minted for. Checked on every validation so a refresh
/// token can never pass as an access token (or vice versa).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_ACCOUNTS_SERVICE", test), derive(Serialize))]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
    Reset,
}

/// JWT claims payload shared by token creation (accounts service) and
/// validation (gateway).
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | account ID (UUID string) |
/// | `exp` | `exp` | expiration, seconds since epoch |
/// | `typ` | custom | [`TokenType`] |
/// | `jti` | `jti` | random nonce; makes every minted token distinct |
/// | `pwv` | custom | password fingerprint, reset grants only |
///
/// [`Serialize`] requires the **`USE_ONLY_IN_ACCOUNTS_SERVICE`** feature; the
/// accounts service is the sole issuer.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_ACCOUNTS_SERVICE", test), derive(Serialize))]
pub struct JwtClaims {
    pub sub: String,
    pub exp: u64,
    pub typ: TokenType,
    #[serde(default)]
    pub jti: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pwv: Option<String>,
}

// ── Core decode (private) ────────────────────────────────────────────────

/// HS256, exp checked (default 60s leeway), required claims `exp` + `sub`.
fn decode_jwt(token: &str, secret: &str) -> Result<JwtClaims, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    Ok(data.claims)
}

fn decode_typed(token: &str, secret: &str, expected: TokenType) -> Result<JwtClaims, AuthError> {
    let claims = decode_jwt(token, secret)?;
    if claims.typ != expected {
        return Err(AuthError::WrongType);
    }
    Ok(claims)
}

// ── Public: all consumers ────────────────────────────────────────────────

/// Validate an access token (cookie or bearer value), returning the identity.
///
/// Pure: no store lookup. The gateway calls this (through the accounts
/// service's `GET /users/token`) on every authenticated request.
pub fn validate_access_token(value: &str, secret: &str) -> Result<TokenInfo, AuthError> {
    let claims = decode_typed(value, secret, TokenType::Access)?;
    let account_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| AuthError::Malformed)?;
    Ok(TokenInfo {
        account_id,
        access_token_exp: claims.exp,
    })
}

// ── Feature-gated: accounts service only ─────────────────────────────────

/// Validate a token of the given type and return raw claims.
///
/// Used by the refresh and password-reset flows, which need claims beyond the
/// account id. Requires the `USE_ONLY_IN_ACCOUNTS_SERVICE` feature.
#[cfg(any(feature = "USE_ONLY_IN_ACCOUNTS_SERVICE", test))]
pub fn validate_token(
    token: &str,
    secret: &str,
    expected: TokenType,
) -> Result<JwtClaims, AuthError> {
    decode_typed(token, secret, expected)
}
