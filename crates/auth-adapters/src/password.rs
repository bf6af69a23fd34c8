//! Argon2id password hashing.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use domains::{DomainError, PasswordHasher, Result};

/// Hashes on the blocking pool so request workers are not stalled by the KDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }
}

fn hash_blocking(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DomainError::Internal(format!("failed to hash password: {e}")))
}

fn verify_blocking(password: &str, hash: &str) -> bool {
    // An unparseable stored hash can never match.
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is malformed");
            return false;
        }
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[async_trait]
impl PasswordHasher for Argon2Hasher {
    async fn hash(&self, password: &str) -> Result<String> {
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hash_blocking(&password))
            .await
            .map_err(DomainError::internal)?
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || verify_blocking(&password, &hash))
            .await
            .map_err(DomainError::internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hasher = Argon2Hasher::new();
        let hash = hasher.hash("hunter22").await.unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("hunter22", &hash).await.unwrap());
        assert!(!hasher.verify("hunter23", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn salts_differ_between_hashes() {
        let hasher = Argon2Hasher::new();
        let a = hasher.hash("same-password").await.unwrap();
        let b = hasher.hash("same-password").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn malformed_hash_never_matches() {
        let hasher = Argon2Hasher::new();
        assert!(!hasher.verify("anything", "not-a-phc-string").await.unwrap());
    }
}
