//! Product slugs.
//!
//! Slugs are derived from the product name. `unique_slug` probes the store for
//! a free suffix, but nothing at the store level enforces uniqueness, so two
//! concurrent creates with the same name can still end up sharing a slug.

use domains::{ProductRepository, Result};

/// Lower-cases `text`, keeps ASCII alphanumerics and collapses every other
/// run of characters into a single `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Returns `slugify(text)`, or the first of `-1`, `-2`, … not yet taken.
pub async fn unique_slug(text: &str, products: &dyn ProductRepository) -> Result<String> {
    let base = match slugify(text) {
        s if s.is_empty() => "product".to_string(),
        s => s,
    };
    if !products.slug_exists(&base).await? {
        return Ok(base);
    }
    let mut n = 1u32;
    loop {
        let candidate = format!("{base}-{n}");
        if !products.slug_exists(&candidate).await? {
            return Ok(candidate);
        }
        n += 1;
    }
}
