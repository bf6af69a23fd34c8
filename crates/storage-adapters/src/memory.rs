//! # In-memory store
//!
//! `DashMap`-backed implementation of every repository port. Each method
//! touches one row under one shard lock, which gives the same per-document
//! atomicity the services expect from a real store. Votes are keyed by
//! (product, user) so the uniqueness constraint is the map key itself.
//!
//! Never hold a map guard across an `.await` or while writing the same map.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use domains::{
    Category, CategoryCount, Comment, CommentRepository, DomainError, Product, ProductPage, ProductQuery,
    ProductRepository, ProductSort, Result, User, UserRepository, Vote, VoteRepository,
};
use tracing::debug;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<Uuid, User>,
    emails: DashMap<String, Uuid>,
    usernames: DashMap<String, Uuid>,
    products: DashMap<Uuid, Product>,
    comments: DashMap<Uuid, Comment>,
    votes: DashMap<(Uuid, Uuid), Vote>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Total order used for product listings; ties fall back to id so paging is stable.
fn compare_products(sort: ProductSort, a: &Product, b: &Product) -> Ordering {
    let primary = match sort {
        ProductSort::Newest => b.created_at.cmp(&a.created_at),
        ProductSort::Oldest => a.created_at.cmp(&b.created_at),
        ProductSort::Upvotes => b
            .upvotes_count
            .cmp(&a.upvotes_count)
            .then(b.created_at.cmp(&a.created_at)),
        ProductSort::Comments => b
            .comments_count
            .cmp(&a.comments_count)
            .then(b.created_at.cmp(&a.created_at)),
        ProductSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    };
    primary.then(a.id.cmp(&b.id))
}

fn window<T>(items: Vec<T>, offset: u64, limit: u64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(limit).collect()
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: User) -> Result<()> {
        let email = match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => return Err(DomainError::Conflict("User already exists".into())),
            Entry::Vacant(slot) => slot,
        };
        match self.usernames.entry(user.username.clone()) {
            Entry::Occupied(_) => return Err(DomainError::Conflict("Username is taken".into())),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }
        email.insert(user.id);
        self.users.insert(user.id, user);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let id = match self.emails.get(email) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.users.len() as u64)
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn insert(&self, product: Product) -> Result<()> {
        match self.products.entry(product.id) {
            Entry::Occupied(_) => Err(DomainError::Conflict(format!("product {} exists", product.id))),
            Entry::Vacant(slot) => {
                slot.insert(product);
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(self.products.get(&id).map(|p| p.clone()))
    }

    async fn find_many(&self, ids: Vec<Uuid>) -> Result<Vec<Product>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.products.get(id).map(|p| p.clone()))
            .collect())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        Ok(self.products.iter().any(|p| p.slug == slug))
    }

    async fn list(&self, query: ProductQuery) -> Result<ProductPage> {
        let mut items: Vec<Product> = self
            .products
            .iter()
            .filter(|p| query.matches(p.value()))
            .map(|p| p.value().clone())
            .collect();
        items.sort_by(|a, b| compare_products(query.sort, a, b));
        let total = items.len() as u64;
        Ok(ProductPage {
            items: window(items, query.offset, query.limit),
            total,
        })
    }

    async fn update_details(&self, product: Product) -> Result<Option<Product>> {
        let Some(mut stored) = self.products.get_mut(&product.id) else {
            return Ok(None);
        };
        stored.name = product.name;
        stored.slug = product.slug;
        stored.tagline = product.tagline;
        stored.description = product.description;
        stored.website = product.website;
        stored.category = product.category;
        stored.logo = product.logo;
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.products.remove(&id).is_some())
    }

    async fn adjust_upvotes(&self, id: Uuid, delta: i64) -> Result<()> {
        if let Some(mut product) = self.products.get_mut(&id) {
            product.upvotes_count += delta;
        }
        Ok(())
    }

    async fn set_upvotes_count(&self, id: Uuid, count: i64) -> Result<()> {
        if let Some(mut product) = self.products.get_mut(&id) {
            product.upvotes_count = count;
        }
        Ok(())
    }

    async fn set_comments_count(&self, id: Uuid, count: i64) -> Result<()> {
        if let Some(mut product) = self.products.get_mut(&id) {
            product.comments_count = count;
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.products.len() as u64)
    }

    async fn top(&self, sort: ProductSort, limit: u64) -> Result<Vec<Product>> {
        let page = ProductRepository::list(
            self,
            ProductQuery {
                sort,
                limit,
                ..ProductQuery::default()
            },
        )
        .await?;
        Ok(page.items)
    }

    async fn category_counts(&self) -> Result<Vec<CategoryCount>> {
        let mut counts: BTreeMap<Category, u64> = BTreeMap::new();
        for product in self.products.iter() {
            *counts.entry(product.category).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect())
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn insert(&self, comment: Comment) -> Result<()> {
        match self.comments.entry(comment.id) {
            Entry::Occupied(_) => Err(DomainError::Conflict(format!("comment {} exists", comment.id))),
            Entry::Vacant(slot) => {
                slot.insert(comment);
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        Ok(self.comments.get(&id).map(|c| c.clone()))
    }

    async fn find_many(&self, ids: Vec<Uuid>) -> Result<Vec<Comment>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.comments.get(id).map(|c| c.clone()))
            .collect())
    }

    async fn list_top_level(&self, product_id: Uuid) -> Result<Vec<Comment>> {
        let mut top: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.product_id == product_id && c.parent_id.is_none())
            .map(|c| c.value().clone())
            .collect();
        top.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(top)
    }

    async fn update_content(&self, id: Uuid, content: String, username: String) -> Result<Option<Comment>> {
        let Some(mut comment) = self.comments.get_mut(&id) else {
            return Ok(None);
        };
        comment.content = content;
        comment.username = username;
        Ok(Some(comment.clone()))
    }

    async fn append_reply(&self, parent_id: Uuid, reply_id: Uuid) -> Result<()> {
        if let Some(mut parent) = self.comments.get_mut(&parent_id) {
            if !parent.replies.contains(&reply_id) {
                parent.replies.push(reply_id);
            }
        }
        Ok(())
    }

    async fn remove_reply(&self, parent_id: Uuid, reply_id: Uuid) -> Result<()> {
        if let Some(mut parent) = self.comments.get_mut(&parent_id) {
            parent.replies.retain(|id| *id != reply_id);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.comments.remove(&id).is_some())
    }

    async fn delete_by_parent(&self, parent_id: Uuid) -> Result<u64> {
        let ids: Vec<Uuid> = self
            .comments
            .iter()
            .filter(|c| c.parent_id == Some(parent_id))
            .map(|c| c.id)
            .collect();
        Ok(ids.iter().filter(|id| self.comments.remove(*id).is_some()).count() as u64)
    }

    async fn delete_by_product(&self, product_id: Uuid) -> Result<u64> {
        let ids: Vec<Uuid> = self
            .comments
            .iter()
            .filter(|c| c.product_id == product_id)
            .map(|c| c.id)
            .collect();
        let removed = ids.iter().filter(|id| self.comments.remove(*id).is_some()).count() as u64;
        debug!(%product_id, removed, "comments removed for product");
        Ok(removed)
    }

    async fn count_by_product(&self, product_id: Uuid) -> Result<u64> {
        Ok(self.comments.iter().filter(|c| c.product_id == product_id).count() as u64)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.comments.len() as u64)
    }
}

#[async_trait]
impl VoteRepository for MemoryStore {
    async fn insert(&self, vote: Vote) -> Result<()> {
        match self.votes.entry((vote.product_id, vote.user_id)) {
            Entry::Occupied(_) => Err(DomainError::Conflict(format!(
                "user {} already voted for product {}",
                vote.user_id, vote.product_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(vote);
                Ok(())
            }
        }
    }

    async fn find(&self, product_id: Uuid, user_id: Uuid) -> Result<Option<Vote>> {
        Ok(self.votes.get(&(product_id, user_id)).map(|v| v.clone()))
    }

    async fn delete(&self, product_id: Uuid, user_id: Uuid) -> Result<bool> {
        Ok(self.votes.remove(&(product_id, user_id)).is_some())
    }

    async fn delete_by_product(&self, product_id: Uuid) -> Result<u64> {
        let keys: Vec<(Uuid, Uuid)> = self
            .votes
            .iter()
            .filter(|v| v.key().0 == product_id)
            .map(|v| *v.key())
            .collect();
        Ok(keys.iter().filter(|k| self.votes.remove(*k).is_some()).count() as u64)
    }

    async fn count_by_product(&self, product_id: Uuid) -> Result<u64> {
        Ok(self.votes.iter().filter(|v| v.key().0 == product_id).count() as u64)
    }

    async fn product_ids_for_user(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let mut votes: Vec<Vote> = self
            .votes
            .iter()
            .filter(|v| v.key().1 == user_id)
            .map(|v| v.value().clone())
            .collect();
        votes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(votes.into_iter().map(|v| v.product_id).collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.votes.len() as u64)
    }
}
