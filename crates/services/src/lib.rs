//! Core logic of the launchpad backend.
//!
//! Every service receives the [`Store`] handle at construction and talks to it
//! only through the port traits, so tests can swap in mocks or the in-memory
//! adapter.

pub mod access_guard;
pub mod accounts;
pub mod analytics;
pub mod cascades;
pub mod comment_tree;
pub mod counters;
pub mod products;
pub mod slug;
pub mod validation;
pub mod vote_ledger;

use std::sync::Arc;

use domains::{PasswordHasher, Store, TokenCodec};

pub use access_guard::{AccessGuard, Action};
pub use accounts::AccountService;
pub use analytics::AnalyticsService;
pub use cascades::Cascades;
pub use comment_tree::CommentTree;
pub use products::ProductService;
pub use vote_ledger::VoteLedger;

/// Every service wired to one store.
#[derive(Clone)]
pub struct Services {
    pub guard: AccessGuard,
    pub votes: VoteLedger,
    pub comments: CommentTree,
    pub products: ProductService,
    pub accounts: AccountService,
    pub analytics: AnalyticsService,
    pub cascades: Cascades,
}

impl Services {
    pub fn new(store: Store, hasher: Arc<dyn PasswordHasher>, tokens: Arc<dyn TokenCodec>) -> Self {
        let guard = AccessGuard::new(store.users.clone(), tokens.clone());
        let products = ProductService::new(&store, guard.clone());
        Self {
            votes: VoteLedger::new(&store),
            comments: CommentTree::new(&store, guard.clone()),
            accounts: AccountService::new(&store, products.clone(), hasher, tokens),
            analytics: AnalyticsService::new(&store),
            cascades: Cascades::new(&store),
            products,
            guard,
        }
    }
}
