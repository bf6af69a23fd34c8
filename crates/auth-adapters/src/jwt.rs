//! HS256 bearer tokens.

use chrono::{Duration, Utc};
use domains::{DomainError, Result, TokenClaims, TokenCodec};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

#[derive(Clone)]
pub struct JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtCodec {
    pub fn new(secret: &[u8], ttl_hours: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::hours(ttl_hours),
        }
    }
}

impl std::fmt::Debug for JwtCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtCodec").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl TokenCodec for JwtCodec {
    fn issue(&self, user_id: Uuid, is_admin: bool) -> Result<String> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: user_id,
            admin: is_admin,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| DomainError::Internal(format!("failed to sign token: {e}")))
    }

    fn verify(&self, token: &str) -> Result<TokenClaims> {
        decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected bearer token");
                DomainError::Unauthenticated("Not authorized to access this route".into())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-that-is-long-enough-for-hs256";

    #[test]
    fn issued_token_verifies() {
        let codec = JwtCodec::new(SECRET, 24);
        let id = Uuid::new_v4();
        let token = codec.issue(id, true).unwrap();

        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.sub, id);
        assert!(claims.admin);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn wrong_secret_is_unauthenticated() {
        let token = JwtCodec::new(SECRET, 24).issue(Uuid::new_v4(), false).unwrap();
        let other = JwtCodec::new(b"a-completely-different-signing-secret", 24);

        let err = other.verify(&token).unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = JwtCodec::new(SECRET, -1);
        let token = codec.issue(Uuid::new_v4(), false).unwrap();
        assert!(codec.verify(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let codec = JwtCodec::new(SECRET, 24);
        assert!(codec.verify("not.a.jwt").is_err());
    }
}
