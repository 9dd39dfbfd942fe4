//! Access verification and session credentials
//!
//! The dashboard is gated by a single password whose salted SHA-256 digest
//! lives in the settings table under `access_password_hash`, stored as
//! `sha256$<salt>$<digest>`. A missing digest disables access checks
//! entirely. Sessions are opaque random tokens with no rotation or expiry.

use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::SqlitePool;

#[cfg(feature = "sqlx")]
use crate::error::Result;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "snipspace_session";

/// Settings key holding the encoded access password hash.
pub const ACCESS_HASH_KEY: &str = "access_password_hash";

const HASH_SCHEME: &str = "sha256";

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Random 16-byte salt as hex.
pub fn generate_salt() -> String {
    let salt: [u8; 16] = rand::thread_rng().gen();
    to_hex(&salt)
}

/// SHA-256 digest of salt + password, as hex.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Encode a password into the stored `sha256$<salt>$<digest>` form.
pub fn encode_access_hash(password: &str) -> String {
    let salt = generate_salt();
    let digest = hash_password(password, &salt);
    format!("{HASH_SCHEME}${salt}${digest}")
}

/// Verify a plaintext password against a stored encoded hash.
///
/// Malformed stored values verify as false rather than erroring.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(scheme), Some(salt), Some(digest)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != HASH_SCHEME {
        return false;
    }
    hash_password(password, salt) == digest.to_lowercase()
}

/// Opaque session token (random UUID).
pub fn generate_session_token() -> String {
    Uuid::new_v4().to_string()
}

/// Load the encoded access hash from settings, if configured.
#[cfg(feature = "sqlx")]
pub async fn load_access_hash(db: &SqlitePool) -> Result<Option<String>> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(ACCESS_HASH_KEY)
            .fetch_optional(db)
            .await?;
    Ok(row.map(|(value,)| value))
}

/// Ensure an access hash exists, seeding it from `password` when the
/// settings table has none. Returns the effective hash; `None` means no
/// password is configured and access checks are disabled.
#[cfg(feature = "sqlx")]
pub async fn ensure_access_hash(
    db: &SqlitePool,
    password: Option<&str>,
) -> Result<Option<String>> {
    if let Some(existing) = load_access_hash(db).await? {
        return Ok(Some(existing));
    }

    let Some(password) = password.filter(|p| !p.is_empty()) else {
        return Ok(None);
    };

    let encoded = encode_access_hash(password);
    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
        .bind(ACCESS_HASH_KEY)
        .bind(&encoded)
        .execute(db)
        .await?;
    Ok(Some(encoded))
}
