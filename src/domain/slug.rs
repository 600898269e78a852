//! Slug normalization and validation.
//!
//! Slugs are the primary key of a post and double as file names for the
//! file-backed store, so they are restricted to `[a-z0-9]+(-[a-z0-9]+)*`.

use slug::slugify;

use super::error::DomainError;

/// Trim and lowercase `input`, then check that the result is URL-safe.
///
/// Blank input yields [`DomainError::Validation`] as well; callers that treat
/// a missing slug differently should check for blankness first.
pub fn normalize_slug(input: &str) -> Result<String, DomainError> {
    let candidate = input.trim().to_lowercase();
    if candidate.is_empty() {
        return Err(DomainError::validation("slug must not be empty"));
    }

    if is_valid_slug(&candidate) {
        return Ok(candidate);
    }

    let suggestion = slugify(&candidate);
    if suggestion.is_empty() {
        Err(DomainError::validation(format!(
            "slug `{candidate}` must contain only lowercase letters, digits and single hyphens"
        )))
    } else {
        Err(DomainError::validation(format!(
            "slug `{candidate}` is not URL-safe; try `{suggestion}`"
        )))
    }
}

/// Whether `value` already satisfies the slug grammar.
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value.split('-').all(|part| {
            !part.is_empty()
                && part
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_hyphenated_slugs() {
        assert!(is_valid_slug("hello-world-2"));
        assert!(is_valid_slug("a"));
    }

    #[test]
    fn rejects_malformed_slugs() {
        for value in ["", "-a", "a-", "a--b", "A", "a b", "a_b", "../etc", "ü"] {
            assert!(!is_valid_slug(value), "`{value}` should be rejected");
        }
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_slug("  My-Post ").unwrap(), "my-post");
    }

    #[test]
    fn normalize_rejects_unsafe_input_with_suggestion() {
        let err = normalize_slug("hello world").unwrap_err();
        assert!(err.to_string().contains("hello-world"));
        assert!(normalize_slug("../../passwd").is_err());
        assert!(normalize_slug("   ").is_err());
    }
}
