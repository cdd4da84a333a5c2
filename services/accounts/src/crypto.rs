//! Password hashing and one-time code generation.

use anyhow::anyhow;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use hmac::{Hmac, Mac};
use rand::RngExt;
use sha2::Sha256;

use crate::error::AccountsServiceError;

type HmacSha256 = Hmac<Sha256>;

/// Bytes of the HMAC kept in a reset grant's fingerprint.
const FINGERPRINT_BYTES: usize = 16;

/// Argon2id with a fresh random salt, encoded as a PHC string.
pub fn hash_password(password: &str) -> Result<String, AccountsServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("hash password: {e}"))?;
    Ok(hash.to_string())
}

/// Constant-time check of `password` against a stored PHC string.
/// An unparseable stored hash counts as a mismatch.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(password_hash) else {
        tracing::warn!("stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Four-digit numeric code in `1000..=9999`.
pub fn generate_otp() -> String {
    rand::rng().random_range(1000..=9999u16).to_string()
}

/// Keyed digest of the stored password hash, hex-encoded. Changes whenever
/// the password (or its salt) changes, which is what makes a reset grant
/// single-use. Reveals nothing about the hash without `key`.
pub fn password_fingerprint(password_hash: &str, key: &str) -> Result<String, AccountsServiceError> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|e| anyhow!("fingerprint key: {e}"))?;
    mac.update(password_hash.as_bytes());
    let digest = mac.finalize().into_bytes();
    Ok(hex::encode(&digest[..FINGERPRINT_BYTES]))
}
