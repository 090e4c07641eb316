use std::sync::OnceLock;

use bcrypt::{BcryptError, DEFAULT_COST};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(#[from] BcryptError),

    #[error("Password worker failed: {0}")]
    Worker(String),
}

/// Salted adaptive hash of `password` at the default bcrypt cost.
pub async fn hash_password(password: &str) -> Result<String, PasswordError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, DEFAULT_COST))
        .await
        .map_err(|e| PasswordError::Worker(e.to_string()))?
        .map_err(PasswordError::from)
}

/// Check `password` against a stored bcrypt hash.
///
/// A stored hash that bcrypt cannot parse verifies as `false`; it never
/// matches anything and the caller only needs a yes/no answer.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let password = password.to_string();
    let hash = hash.to_string();

    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| PasswordError::Worker(e.to_string()))?;

    match outcome {
        Ok(matches) => Ok(matches),
        Err(e) => {
            tracing::warn!("Stored password hash could not be verified: {}", e);
            Ok(false)
        }
    }
}

/// Burn one verification's worth of time for an email with no account.
pub async fn verify_dummy(password: &str) -> Result<(), PasswordError> {
    let password = password.to_string();

    tokio::task::spawn_blocking(move || {
        let hash = dummy_hash()?;
        let _ = bcrypt::verify(password, hash);
        Ok::<(), PasswordError>(())
    })
    .await
    .map_err(|e| PasswordError::Worker(e.to_string()))?
}

fn dummy_hash() -> Result<&'static str, PasswordError> {
    static DUMMY: OnceLock<String> = OnceLock::new();

    if let Some(hash) = DUMMY.get() {
        return Ok(hash.as_str());
    }
    let hash = bcrypt::hash("not-a-real-account-password", DEFAULT_COST)?;
    Ok(DUMMY.get_or_init(|| hash).as_str())
}
