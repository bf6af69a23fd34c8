//! Product submission, listing and owner/admin mutation.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    Category, DomainError, Principal, Product, ProductQuery, ProductRepository, ProductSort, Result, Store,
    DEFAULT_LOGO,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::access_guard::{AccessGuard, Action};
use crate::cascades::{Cascades, ProductCascade};
use crate::slug::unique_slug;
use crate::validation::{self, MAX_PRODUCT_NAME_CHARS, MAX_TAGLINE_CHARS};

pub const DEFAULT_PAGE_SIZE: u64 = 25;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub category: String,
    pub logo: Option<String>,
}

/// Fields to change; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub category: Option<String>,
    pub logo: Option<String>,
}

/// Listing parameters as they arrive from a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total: u64,
}

#[derive(Debug, Clone)]
pub struct ProductListing {
    pub products: Vec<Product>,
    pub pagination: Pagination,
}

#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    cascades: Cascades,
    guard: AccessGuard,
}

impl ProductService {
    pub fn new(store: &Store, guard: AccessGuard) -> Self {
        Self {
            products: store.products.clone(),
            cascades: Cascades::new(store),
            guard,
        }
    }

    pub async fn create(&self, owner: &Principal, input: NewProduct) -> Result<Product> {
        let name = validation::bounded_text(&input.name, "Name", MAX_PRODUCT_NAME_CHARS)?;
        let tagline = validation::bounded_text(&input.tagline, "Tagline", MAX_TAGLINE_CHARS)?;
        let description = validation::required_text(&input.description, "Description")?;
        let website = validation::website(&input.website)?;
        let category: Category = input.category.trim().parse()?;
        let logo = input
            .logo
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_LOGO.to_string());

        let slug = unique_slug(&name, self.products.as_ref()).await?;
        let product = Product {
            id: Uuid::new_v4(),
            name,
            slug,
            tagline,
            description,
            website,
            category,
            owner_id: owner.id,
            logo,
            upvotes_count: 0,
            comments_count: 0,
            created_at: Utc::now(),
        };
        self.products.insert(product.clone()).await?;
        info!(product_id = %product.id, slug = %product.slug, user_id = %owner.id, "product created");
        Ok(product)
    }

    pub async fn get(&self, id: Uuid) -> Result<Product> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Product", id))
    }

    pub async fn list(&self, params: ListParams) -> Result<ProductListing> {
        let page = params.page.unwrap_or(1).max(1);
        let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let category = match params.category.as_deref().map(str::trim) {
            Some("") | None => None,
            Some(raw) => Some(raw.parse::<Category>()?),
        };
        let sort = match params.sort.as_deref().map(str::trim) {
            Some("") | None => ProductSort::Newest,
            Some(raw) => raw.parse()?,
        };
        let search = params
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let offset = (page - 1)
            .checked_mul(limit)
            .ok_or_else(|| DomainError::validation("page out of range"))?;

        let result = self
            .products
            .list(ProductQuery {
                search,
                category,
                owner_id: None,
                sort,
                offset,
                limit,
            })
            .await?;
        Ok(ProductListing {
            products: result.items,
            pagination: Pagination {
                current_page: page,
                total_pages: result.total.div_ceil(limit),
                total: result.total,
            },
        })
    }

    /// Every product owned by `owner_id`, newest first.
    pub async fn owned_by(&self, owner_id: Uuid) -> Result<Vec<Product>> {
        let page = self
            .products
            .list(ProductQuery {
                owner_id: Some(owner_id),
                limit: u64::MAX,
                ..ProductQuery::default()
            })
            .await?;
        Ok(page.items)
    }

    pub async fn update(&self, requester: &Principal, id: Uuid, patch: ProductPatch) -> Result<Product> {
        let mut product = self.get(id).await?;
        self.guard
            .authorize(requester, product.owner_id, Action::UpdateProduct)?;

        if let Some(name) = patch.name {
            let name = validation::bounded_text(&name, "Name", MAX_PRODUCT_NAME_CHARS)?;
            if name != product.name {
                product.slug = unique_slug(&name, self.products.as_ref()).await?;
                product.name = name;
            }
        }
        if let Some(tagline) = patch.tagline {
            product.tagline = validation::bounded_text(&tagline, "Tagline", MAX_TAGLINE_CHARS)?;
        }
        if let Some(description) = patch.description {
            product.description = validation::required_text(&description, "Description")?;
        }
        if let Some(website) = patch.website {
            product.website = validation::website(&website)?;
        }
        if let Some(category) = patch.category {
            product.category = category.trim().parse()?;
        }
        if let Some(logo) = patch.logo {
            let logo = logo.trim();
            product.logo = if logo.is_empty() { DEFAULT_LOGO } else { logo }.to_string();
        }

        let updated = self
            .products
            .update_details(product)
            .await?
            .ok_or_else(|| DomainError::not_found("Product", id))?;
        info!(product_id = %id, user_id = %requester.id, "product updated");
        Ok(updated)
    }

    /// Deletes the product, then its comments and votes.
    pub async fn delete(&self, requester: &Principal, id: Uuid) -> Result<ProductCascade> {
        let product = self.get(id).await?;
        self.guard
            .authorize(requester, product.owner_id, Action::DeleteProduct)?;

        self.products.delete(id).await?;
        let report = self.cascades.on_product_deleted(id).await?;
        info!(product_id = %id, user_id = %requester.id, "product deleted");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{
        MockCommentRepository, MockProductRepository, MockTokenCodec, MockUserRepository, MockVoteRepository,
        ProductPage, Role,
    };

    fn service(products: MockProductRepository) -> ProductService {
        let users: Arc<dyn domains::UserRepository> = Arc::new(MockUserRepository::new());
        let store = Store::new(
            users.clone(),
            Arc::new(products),
            Arc::new(MockCommentRepository::new()),
            Arc::new(MockVoteRepository::new()),
        );
        ProductService::new(&store, AccessGuard::new(users, Arc::new(MockTokenCodec::new())))
    }

    fn owner() -> Principal {
        Principal {
            id: Uuid::new_v4(),
            username: "maker".into(),
            role: Role::Regular,
        }
    }

    fn input() -> NewProduct {
        NewProduct {
            name: "  Launch Kit ".into(),
            tagline: "Ship faster".into(),
            description: "Everything to launch.".into(),
            website: "https://launchkit.dev".into(),
            category: "DevTools".into(),
            logo: None,
        }
    }

    #[tokio::test]
    async fn create_derives_slug_and_zeroes_counters() {
        let mut products = MockProductRepository::new();
        products.expect_slug_exists().returning(|_| Ok(false));
        products.expect_insert().times(1).returning(|_| Ok(()));

        let owner = owner();
        let product = service(products).create(&owner, input()).await.unwrap();
        assert_eq!(product.name, "Launch Kit");
        assert_eq!(product.slug, "launch-kit");
        assert_eq!(product.owner_id, owner.id);
        assert_eq!(product.logo, DEFAULT_LOGO);
        assert_eq!((product.upvotes_count, product.comments_count), (0, 0));
    }

    #[tokio::test]
    async fn create_rejects_unknown_category() {
        let mut products = MockProductRepository::new();
        products.expect_insert().never();

        let err = service(products)
            .create(
                &owner(),
                NewProduct {
                    category: "Games".into(),
                    ..input()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn list_translates_page_into_offset() {
        let mut products = MockProductRepository::new();
        products
            .expect_list()
            .withf(|q| q.offset == 20 && q.limit == 10 && q.sort == ProductSort::Upvotes)
            .returning(|_| {
                Ok(ProductPage {
                    items: Vec::new(),
                    total: 21,
                })
            });

        let listing = service(products)
            .list(ListParams {
                sort: Some("upvotes".into()),
                page: Some(3),
                limit: Some(10),
                ..ListParams::default()
            })
            .await
            .unwrap();
        assert_eq!(
            listing.pagination,
            Pagination {
                current_page: 3,
                total_pages: 3,
                total: 21
            }
        );
    }
}
