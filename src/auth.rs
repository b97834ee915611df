//! Password hashing and bearer-token signing.
//!
//! Hashes and tokens are opaque to the persistence layer; this module is the
//! only place that knows their shape. Passwords are stored as
//! `salt$hex-digest` with an iterated SHA-256 digest; tokens are compact
//! `userId.expiryUnixSecs.signature` strings signed with HMAC-SHA256.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const HASH_ROUNDS: u32 = 10_000;

/// Verified contents of a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: String,
    pub expires_at: i64,
}

pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{}${}", salt, digest_password(&salt, password))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, digest)) => digest_password(salt, password) == digest,
        None => false,
    }
}

fn digest_password(salt: &str, password: &str) -> String {
    let mut acc = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(password.as_bytes())
        .finalize();
    for _ in 1..HASH_ROUNDS {
        acc = Sha256::new().chain_update(acc).finalize();
    }
    hex::encode(acc)
}

pub fn sign_token(user_id: &str, secret: &str, ttl_secs: i64, now_unix: i64) -> String {
    let payload = format!("{}.{}", user_id, now_unix + ttl_secs);
    let signature = hex::encode(mac(secret, &payload).finalize().into_bytes());
    format!("{payload}.{signature}")
}

/// Check signature and expiry; any malformed or stale token is `None`.
pub fn verify_token(token: &str, secret: &str, now_unix: i64) -> Option<TokenClaims> {
    let (payload, signature) = token.rsplit_once('.')?;
    let expected = hex::decode(signature).ok()?;
    mac(secret, payload).verify_slice(&expected).ok()?;

    let (user_id, expiry) = payload.split_once('.')?;
    let expires_at: i64 = expiry.parse().ok()?;
    if user_id.is_empty() || expires_at <= now_unix {
        return None;
    }

    Some(TokenClaims {
        user_id: user_id.to_string(),
        expires_at,
    })
}

fn mac(secret: &str, payload: &str) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload.as_bytes());
    mac
}
