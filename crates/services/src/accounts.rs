//! Registration, login and the principal's own views.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    DomainError, PasswordHasher, Principal, Product, ProductRepository, Result, Role, Store, TokenCodec, User,
    UserRepository, VoteRepository,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::products::ProductService;
use crate::validation;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Products the principal submitted and products they currently upvote.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub submitted_products: Vec<Product>,
    pub upvoted_products: Vec<Product>,
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    products: Arc<dyn ProductRepository>,
    votes: Arc<dyn VoteRepository>,
    catalog: ProductService,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenCodec>,
}

impl AccountService {
    pub fn new(
        store: &Store,
        catalog: ProductService,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenCodec>,
    ) -> Self {
        Self {
            users: store.users.clone(),
            products: store.products.clone(),
            votes: store.votes.clone(),
            catalog,
            hasher,
            tokens,
        }
    }

    /// Creates a regular account and returns a signed token for it.
    pub async fn register(&self, input: Registration) -> Result<String> {
        let username = validation::required_text(&input.username, "Username")?;
        let email = validation::email(&input.email)?;
        validation::password(&input.password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::Conflict("User already exists".into()));
        }
        let user = User {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash: self.hasher.hash(&input.password).await?,
            role: Role::Regular,
            avatar: None,
            created_at: Utc::now(),
        };
        self.users.insert(user.clone()).await?;
        info!(user_id = %user.id, "user registered");
        self.tokens.issue(user.id, false)
    }

    pub async fn login(&self, input: Credentials) -> Result<String> {
        if input.email.trim().is_empty() || input.password.is_empty() {
            return Err(DomainError::validation("Please provide email and password"));
        }
        let invalid = || DomainError::Unauthenticated("Invalid credentials".into());
        let email = input.email.trim().to_lowercase();
        let user = self.users.find_by_email(&email).await?.ok_or_else(invalid)?;
        if !self.hasher.verify(&input.password, &user.password_hash).await? {
            warn!(user_id = %user.id, "failed login");
            return Err(invalid());
        }
        self.tokens.issue(user.id, user.role.is_admin())
    }

    pub async fn me(&self, principal: &Principal) -> Result<User> {
        self.users
            .find_by_id(principal.id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", principal.id))
    }

    pub async fn profile(&self, principal: &Principal) -> Result<Profile> {
        let submitted_products = self.catalog.owned_by(principal.id).await?;
        let voted = self.votes.product_ids_for_user(principal.id).await?;
        let upvoted_products = self.products.find_many(voted).await?;
        Ok(Profile {
            submitted_products,
            upvoted_products,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{
        MockCommentRepository, MockPasswordHasher, MockProductRepository, MockTokenCodec, MockUserRepository,
        MockVoteRepository,
    };

    use crate::access_guard::AccessGuard;

    fn service(users: MockUserRepository, hasher: MockPasswordHasher, tokens: MockTokenCodec) -> AccountService {
        let users: Arc<dyn UserRepository> = Arc::new(users);
        let tokens: Arc<dyn TokenCodec> = Arc::new(tokens);
        let store = Store::new(
            users.clone(),
            Arc::new(MockProductRepository::new()),
            Arc::new(MockCommentRepository::new()),
            Arc::new(MockVoteRepository::new()),
        );
        let catalog = ProductService::new(&store, AccessGuard::new(users, tokens.clone()));
        AccountService::new(&store, catalog, Arc::new(hasher), tokens)
    }

    fn stored_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            password_hash: "hash".into(),
            role: Role::Admin,
            avatar: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn register_rejects_taken_email() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(stored_user())));
        users.expect_insert().never();
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_hash().never();

        let err = service(users, hasher, MockTokenCodec::new())
            .register(Registration {
                username: "ada".into(),
                email: "ADA@example.com".into(),
                password: "secret123".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::Conflict("User already exists".into()));
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_unauthenticated() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(stored_user())));
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_verify().returning(|_, _| Ok(false));
        let mut tokens = MockTokenCodec::new();
        tokens.expect_issue().never();

        let err = service(users, hasher, tokens)
            .login(Credentials {
                email: "ada@example.com".into(),
                password: "wrong-password".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn login_issues_token_with_admin_flag() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(stored_user())));
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_verify().returning(|_, _| Ok(true));
        let mut tokens = MockTokenCodec::new();
        tokens
            .expect_issue()
            .withf(|_, admin| *admin)
            .returning(|_, _| Ok("signed".into()));

        let token = service(users, hasher, tokens)
            .login(Credentials {
                email: "ada@example.com".into(),
                password: "secret123".into(),
            })
            .await
            .unwrap();
        assert_eq!(token, "signed");
    }
}
