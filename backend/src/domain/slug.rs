//! URL slugs derived from display names.
//!
//! Slugs are trimmed, non-empty identifiers composed of lowercase ASCII
//! letters, digits, and single hyphens.

/// Derive a slug from `name`.
///
/// Letters and digits are lowercased, `&` becomes `and`, whitespace and
/// separators collapse into one hyphen, and anything else is dropped.
///
/// # Examples
/// ```
/// use devcamper::domain::slugify;
///
/// assert_eq!(slugify("ModernTech Bootcamp"), "moderntech-bootcamp");
/// assert_eq!(slugify("  Codemasters & Co. "), "codemasters-and-co");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for ch in name.chars() {
        let piece = match ch {
            c if c.is_ascii_alphanumeric() => Some(c.to_ascii_lowercase().to_string()),
            '&' => Some("and".to_owned()),
            c if c.is_whitespace() || matches!(c, '-' | '_' | '/') => {
                pending_hyphen = true;
                None
            }
            _ => None,
        };
        if let Some(text) = piece {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push_str(&text);
        }
    }
    slug
}

/// Return `true` when `value` is a valid slug.
pub(crate) fn is_valid_slug(value: &str) -> bool {
    is_trimmed_non_empty(value) && has_allowed_slug_chars(value) && !value.contains("--")
}

fn is_trimmed_non_empty(value: &str) -> bool {
    !value.is_empty() && value.trim_matches('-') == value
}

fn has_allowed_slug_chars(value: &str) -> bool {
    value
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}
