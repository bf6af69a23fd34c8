//! Credential adapters: password hashing and bearer tokens.

pub mod password;
#[cfg(feature = "auth-jwt")]
pub mod jwt;

pub use password::Argon2Hasher;
#[cfg(feature = "auth-jwt")]
pub use jwt::JwtCodec;
