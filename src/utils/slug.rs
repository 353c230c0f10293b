//! Slug generation for tag names.

use deunicode::deunicode;

/// Turn a free-form name into a URL-safe slug.
///
/// Unicode is transliterated to ASCII, runs of non-alphanumeric
/// characters collapse to a single `-`, and the result is lowercased.
/// An empty result falls back to `"untitled"`.
pub fn slugify(name: &str) -> String {
    let ascii = deunicode(name);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;

    for c in ascii.chars() {
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

    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Advent of Code"), "advent-of-code");
        assert_eq!(slugify("  effects  "), "effects");
        assert_eq!(slugify("C++ / Rust"), "c-rust");
    }

    #[test]
    fn test_slugify_unicode() {
        assert_eq!(slugify("Café Crème"), "cafe-creme");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify("!!!"), "untitled");
        assert_eq!(slugify(""), "untitled");
    }
}
