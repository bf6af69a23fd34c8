//! # PostgreSQL store
//!
//! Maps the relational schema in `migrations/` onto the domain models.
//! Vote uniqueness is the `votes_product_user_key` constraint; its violation
//! surfaces as `DomainError::Conflict`. Counter updates are single `UPDATE`
//! statements so concurrent writers never lose each other's deltas.

use async_trait::async_trait;
use domains::{
    Category, CategoryCount, Comment, CommentRepository, DomainError, Product, ProductPage, ProductQuery,
    ProductRepository, ProductSort, Result, Role, User, UserRepository, Vote, VoteRepository,
};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, max_connections: u32) -> std::result::Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        info!(max_connections, "connected to postgres");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn db_err(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            let message = match db.constraint() {
                Some(c) if c.starts_with("users_") => "User already exists",
                Some("votes_product_user_key") => "Product already upvoted",
                _ => "Duplicate record",
            };
            return DomainError::Conflict(message.into());
        }
    }
    DomainError::internal(err)
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn user_from_row(row: &PgRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id").map_err(db_err)?,
        username: row.try_get("username").map_err(db_err)?,
        email: row.try_get("email").map_err(db_err)?,
        password_hash: row.try_get("password_hash").map_err(db_err)?,
        role: Role::from_admin_flag(row.try_get("is_admin").map_err(db_err)?),
        avatar: row.try_get("avatar").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
    })
}

fn product_from_row(row: &PgRow) -> Result<Product> {
    let category: String = row.try_get("category").map_err(db_err)?;
    Ok(Product {
        id: row.try_get("id").map_err(db_err)?,
        name: row.try_get("name").map_err(db_err)?,
        slug: row.try_get("slug").map_err(db_err)?,
        tagline: row.try_get("tagline").map_err(db_err)?,
        description: row.try_get("description").map_err(db_err)?,
        website: row.try_get("website").map_err(db_err)?,
        category: category
            .parse()
            .map_err(|_| DomainError::Internal(format!("unknown category '{category}' in store")))?,
        owner_id: row.try_get("owner_id").map_err(db_err)?,
        logo: row.try_get("logo").map_err(db_err)?,
        upvotes_count: row.try_get("upvotes_count").map_err(db_err)?,
        comments_count: row.try_get("comments_count").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
    })
}

fn comment_from_row(row: &PgRow) -> Result<Comment> {
    Ok(Comment {
        id: row.try_get("id").map_err(db_err)?,
        content: row.try_get("content").map_err(db_err)?,
        product_id: row.try_get("product_id").map_err(db_err)?,
        author_id: row.try_get("author_id").map_err(db_err)?,
        username: row.try_get("username").map_err(db_err)?,
        parent_id: row.try_get("parent_id").map_err(db_err)?,
        replies: row.try_get("replies").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
    })
}

fn vote_from_row(row: &PgRow) -> Result<Vote> {
    Ok(Vote {
        id: row.try_get("id").map_err(db_err)?,
        product_id: row.try_get("product_id").map_err(db_err)?,
        user_id: row.try_get("user_id").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
    })
}

fn order_clause(sort: ProductSort) -> &'static str {
    match sort {
        ProductSort::Newest => "created_at DESC, id",
        ProductSort::Oldest => "created_at ASC, id",
        ProductSort::Upvotes => "upvotes_count DESC, created_at DESC, id",
        ProductSort::Comments => "comments_count DESC, created_at DESC, id",
        ProductSort::Name => "lower(name) ASC, id",
    }
}

/// Escapes LIKE metacharacters so user input matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &ProductQuery) {
    if let Some(category) = query.category {
        qb.push(" AND category = ").push_bind(category.as_str());
    }
    if let Some(owner) = query.owner_id {
        qb.push(" AND owner_id = ").push_bind(owner);
    }
    if let Some(term) = &query.search {
        let pattern = like_pattern(term);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR tagline ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

async fn count_rows(pool: &PgPool, sql: &str, id: Option<Uuid>) -> Result<u64> {
    let mut query = sqlx::query(sql);
    if let Some(id) = id {
        query = query.bind(id);
    }
    let row = query.fetch_one(pool).await.map_err(db_err)?;
    let count: i64 = row.try_get(0).map_err(db_err)?;
    Ok(count.max(0) as u64)
}

#[async_trait]
impl UserRepository for PgStore {
    async fn insert(&self, user: User) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, is_admin, avatar, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.is_admin())
        .bind(&user.avatar)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn count(&self) -> Result<u64> {
        count_rows(&self.pool, "SELECT COUNT(*) FROM users", None).await
    }
}

#[async_trait]
impl ProductRepository for PgStore {
    async fn insert(&self, product: Product) -> Result<()> {
        sqlx::query(
            "INSERT INTO products (id, name, slug, tagline, description, website, category, owner_id, logo, \
             upvotes_count, comments_count, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.tagline)
        .bind(&product.description)
        .bind(&product.website)
        .bind(product.category.as_str())
        .bind(product.owner_id)
        .bind(&product.logo)
        .bind(product.upvotes_count)
        .bind(product.comments_count)
        .bind(product.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        sqlx::query("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(product_from_row)
            .transpose()
    }

    async fn find_many(&self, ids: Vec<Uuid>) -> Result<Vec<Product>> {
        let rows = sqlx::query("SELECT * FROM products WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        let mut found = rows.iter().map(product_from_row).collect::<Result<Vec<_>>>()?;
        found.sort_by_key(|p| ids.iter().position(|id| *id == p.id));
        Ok(found)
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM products WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        row.try_get(0).map_err(db_err)
    }

    async fn list(&self, query: ProductQuery) -> Result<ProductPage> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products WHERE TRUE");
        push_filters(&mut count_qb, &query);
        let total: i64 = count_qb
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?
            .try_get(0)
            .map_err(db_err)?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM products WHERE TRUE");
        push_filters(&mut qb, &query);
        qb.push(" ORDER BY ")
            .push(order_clause(query.sort))
            .push(" LIMIT ")
            .push_bind(to_i64(query.limit))
            .push(" OFFSET ")
            .push_bind(to_i64(query.offset));
        let rows = qb.build().fetch_all(&self.pool).await.map_err(db_err)?;

        Ok(ProductPage {
            items: rows.iter().map(product_from_row).collect::<Result<_>>()?,
            total: total.max(0) as u64,
        })
    }

    async fn update_details(&self, product: Product) -> Result<Option<Product>> {
        sqlx::query(
            "UPDATE products SET name = $2, slug = $3, tagline = $4, description = $5, website = $6, \
             category = $7, logo = $8 WHERE id = $1 RETURNING *",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.tagline)
        .bind(&product.description)
        .bind(&product.website)
        .bind(product.category.as_str())
        .bind(&product.logo)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .as_ref()
        .map(product_from_row)
        .transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn adjust_upvotes(&self, id: Uuid, delta: i64) -> Result<()> {
        sqlx::query("UPDATE products SET upvotes_count = upvotes_count + $2 WHERE id = $1")
            .bind(id)
            .bind(delta)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn set_upvotes_count(&self, id: Uuid, count: i64) -> Result<()> {
        sqlx::query("UPDATE products SET upvotes_count = $2 WHERE id = $1")
            .bind(id)
            .bind(count)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn set_comments_count(&self, id: Uuid, count: i64) -> Result<()> {
        sqlx::query("UPDATE products SET comments_count = $2 WHERE id = $1")
            .bind(id)
            .bind(count)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        count_rows(&self.pool, "SELECT COUNT(*) FROM products", None).await
    }

    async fn top(&self, sort: ProductSort, limit: u64) -> Result<Vec<Product>> {
        let sql = format!("SELECT * FROM products ORDER BY {} LIMIT $1", order_clause(sort));
        let rows = sqlx::query(&sql)
            .bind(to_i64(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(product_from_row).collect()
    }

    async fn category_counts(&self) -> Result<Vec<CategoryCount>> {
        let rows = sqlx::query("SELECT category, COUNT(*) AS count FROM products GROUP BY category")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter()
            .map(|row| {
                let category: String = row.try_get("category").map_err(db_err)?;
                let count: i64 = row.try_get("count").map_err(db_err)?;
                Ok(CategoryCount {
                    category: category.parse::<Category>()?,
                    count: count.max(0) as u64,
                })
            })
            .collect()
    }
}

#[async_trait]
impl CommentRepository for PgStore {
    async fn insert(&self, comment: Comment) -> Result<()> {
        sqlx::query(
            "INSERT INTO comments (id, content, product_id, author_id, username, parent_id, replies, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(comment.id)
        .bind(&comment.content)
        .bind(comment.product_id)
        .bind(comment.author_id)
        .bind(&comment.username)
        .bind(comment.parent_id)
        .bind(&comment.replies)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        sqlx::query("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(comment_from_row)
            .transpose()
    }

    async fn find_many(&self, ids: Vec<Uuid>) -> Result<Vec<Comment>> {
        let rows = sqlx::query("SELECT * FROM comments WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        let mut found = rows.iter().map(comment_from_row).collect::<Result<Vec<_>>>()?;
        found.sort_by_key(|c| ids.iter().position(|id| *id == c.id));
        Ok(found)
    }

    async fn list_top_level(&self, product_id: Uuid) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT * FROM comments WHERE product_id = $1 AND parent_id IS NULL ORDER BY created_at DESC, id",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(comment_from_row).collect()
    }

    async fn update_content(&self, id: Uuid, content: String, username: String) -> Result<Option<Comment>> {
        sqlx::query("UPDATE comments SET content = $2, username = $3 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(content)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(comment_from_row)
            .transpose()
    }

    async fn append_reply(&self, parent_id: Uuid, reply_id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE comments SET replies = array_append(replies, $2) \
             WHERE id = $1 AND NOT ($2 = ANY(replies))",
        )
        .bind(parent_id)
        .bind(reply_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn remove_reply(&self, parent_id: Uuid, reply_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE comments SET replies = array_remove(replies, $2) WHERE id = $1")
            .bind(parent_id)
            .bind(reply_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_parent(&self, parent_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM comments WHERE parent_id = $1")
            .bind(parent_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected())
    }

    async fn delete_by_product(&self, product_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM comments WHERE product_id = $1")
            .bind(product_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        debug!(%product_id, removed = result.rows_affected(), "comments removed for product");
        Ok(result.rows_affected())
    }

    async fn count_by_product(&self, product_id: Uuid) -> Result<u64> {
        count_rows(&self.pool, "SELECT COUNT(*) FROM comments WHERE product_id = $1", Some(product_id)).await
    }

    async fn count(&self) -> Result<u64> {
        count_rows(&self.pool, "SELECT COUNT(*) FROM comments", None).await
    }
}

#[async_trait]
impl VoteRepository for PgStore {
    async fn insert(&self, vote: Vote) -> Result<()> {
        sqlx::query("INSERT INTO votes (id, product_id, user_id, created_at) VALUES ($1, $2, $3, $4)")
            .bind(vote.id)
            .bind(vote.product_id)
            .bind(vote.user_id)
            .bind(vote.created_at)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn find(&self, product_id: Uuid, user_id: Uuid) -> Result<Option<Vote>> {
        sqlx::query("SELECT * FROM votes WHERE product_id = $1 AND user_id = $2")
            .bind(product_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(vote_from_row)
            .transpose()
    }

    async fn delete(&self, product_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM votes WHERE product_id = $1 AND user_id = $2")
            .bind(product_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_product(&self, product_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM votes WHERE product_id = $1")
            .bind(product_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected())
    }

    async fn count_by_product(&self, product_id: Uuid) -> Result<u64> {
        count_rows(&self.pool, "SELECT COUNT(*) FROM votes WHERE product_id = $1", Some(product_id)).await
    }

    async fn product_ids_for_user(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let rows = sqlx::query("SELECT product_id FROM votes WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter()
            .map(|row| row.try_get("product_id").map_err(db_err))
            .collect()
    }

    async fn count(&self) -> Result<u64> {
        count_rows(&self.pool, "SELECT COUNT(*) FROM votes", None).await
    }
}
