//! Resolves request principals and decides ownership-based mutations.

use std::fmt;
use std::sync::Arc;

use domains::{DomainError, Principal, Result, TokenCodec, UserRepository};
use tracing::debug;
use uuid::Uuid;

/// Mutations gated by ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    UpdateComment,
    DeleteComment,
    UpdateProduct,
    DeleteProduct,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::UpdateComment => "update this comment",
            Action::DeleteComment => "delete this comment",
            Action::UpdateProduct => "update this product",
            Action::DeleteProduct => "delete this product",
        })
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[derive(Clone)]
pub struct AccessGuard {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenCodec>,
}

impl AccessGuard {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<dyn TokenCodec>) -> Self {
        Self { users, tokens }
    }

    /// Verifies `token` and loads the user it names.
    ///
    /// The role comes from the stored user, not from the token, so a demoted
    /// admin loses rights as soon as the row changes.
    pub async fn authenticate(&self, token: &str) -> Result<Principal> {
        let claims = self.tokens.verify(token)?;
        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| {
                debug!(user_id = %claims.sub, "token names a user that no longer exists");
                DomainError::Unauthenticated("No user found with this id".into())
            })?;
        Ok(Principal::from(&user))
    }

    /// Allowed when the principal owns the resource or is an admin.
    pub fn authorize(&self, principal: &Principal, owner_id: Uuid, action: Action) -> Result<()> {
        if principal.id == owner_id || principal.is_admin() {
            return Ok(());
        }
        debug!(user_id = %principal.id, %owner_id, %action, "mutation refused");
        Err(DomainError::Forbidden(format!("Not authorized to {action}")))
    }

    pub fn require_admin(&self, principal: &Principal) -> Result<()> {
        if principal.is_admin() {
            Ok(())
        } else {
            Err(DomainError::Forbidden("Admins only".into()))
        }
    }
}
