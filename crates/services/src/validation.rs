//! Input checks shared by the services. Every check runs before any write.

use std::sync::LazyLock;

use domains::{DomainError, Result};
use regex::Regex;

/// Maximum length of a comment or reply, in characters.
pub const MAX_COMMENT_CHARS: usize = 500;
pub const MAX_PRODUCT_NAME_CHARS: usize = 50;
pub const MAX_TAGLINE_CHARS: usize = 100;
pub const MIN_PASSWORD_CHARS: usize = 6;

/// Trims `raw` and rejects empty or oversized comment bodies.
pub fn comment_content(raw: &str, what: &str) -> Result<String> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(DomainError::validation(format!("{what} content is required")));
    }
    if content.chars().count() > MAX_COMMENT_CHARS {
        return Err(DomainError::validation(format!(
            "{what} cannot be more than {MAX_COMMENT_CHARS} characters"
        )));
    }
    Ok(content.to_string())
}

/// Trims `raw` and requires between 1 and `max` characters.
pub fn bounded_text(raw: &str, field: &str, max: usize) -> Result<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    if value.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{field} cannot be more than {max} characters"
        )));
    }
    Ok(value.to_string())
}

pub fn required_text(raw: &str, field: &str) -> Result<String> {
    bounded_text(raw, field, usize::MAX)
}

/// `http(s)://host.tld` followed by an optional path, query or fragment.
static WEBSITE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b[-a-zA-Z0-9()@:%_+.~#?&/=]*$",
    )
    .expect("website pattern compiles")
});

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[[:word:]]+([.-]?[[:word:]]+)*@[[:word:]]+([.-]?[[:word:]]+)*(\.[[:word:]]{2,3})+$")
        .expect("email pattern compiles")
});

pub fn website(raw: &str) -> Result<String> {
    let url = raw.trim();
    if !WEBSITE.is_match(url) {
        return Err(DomainError::validation("Please use a valid URL with HTTP or HTTPS"));
    }
    Ok(url.to_string())
}

/// Checks the `local@domain.tld` shape and lower-cases the result.
pub fn email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    if !EMAIL.is_match(&email) {
        return Err(DomainError::validation("Please add a valid email"));
    }
    Ok(email)
}

pub fn password(raw: &str) -> Result<()> {
    if raw.chars().count() < MIN_PASSWORD_CHARS {
        return Err(DomainError::validation(format!(
            "Password must be {MIN_PASSWORD_CHARS} or more characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_content_is_trimmed() {
        assert_eq!(comment_content("  Great tool!  ", "Comment").unwrap(), "Great tool!");
    }

    #[test]
    fn comment_content_rejects_blank_and_oversized() {
        assert!(matches!(
            comment_content("   \n", "Comment"),
            Err(DomainError::Validation(_))
        ));
        let long = "x".repeat(MAX_COMMENT_CHARS + 1);
        assert!(comment_content(&long, "Comment").is_err());
        let exact = "é".repeat(MAX_COMMENT_CHARS);
        assert!(comment_content(&exact, "Comment").is_ok());
    }

    #[test]
    fn website_requires_scheme_and_dotted_host() {
        assert!(website("https://launchpad.dev/launch?ref=1").is_ok());
        assert!(website("http://www.example.com").is_ok());
        assert!(website("ftp://example.com").is_err());
        assert!(website("https://localhost").is_err());
        assert!(website("https://exa mple.com").is_err());
        assert!(website("see https://example.com").is_err());
    }

    #[test]
    fn email_is_normalized() {
        assert_eq!(email(" Ada@Example.COM ").unwrap(), "ada@example.com");
        assert!(email("ada.example.com").is_err());
        assert!(email("ada@example").is_err());
        assert!(email("@example.com").is_err());
        assert!(email("ada.lovelace@math-dept.example.org").is_ok());
    }

    #[test]
    fn email_rejects_malformed_domains() {
        assert!(email("ada@-.io").is_err());
        assert!(email("ada@example.comxyz").is_err());
        assert!(email("ada@@example.com").is_err());
        assert!(email("ada @example.com").is_err());
    }

    #[test]
    fn password_has_a_minimum_length() {
        assert!(password("12345").is_err());
        assert!(password("123456").is_ok());
    }
}
