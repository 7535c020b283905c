//! Post file names: slug derivation and ordering prefixes

use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

use crate::error::{Error, Result};

lazy_static! {
    static ref POST_FILE_NAME: Regex = Regex::new(r"^\d+-(.+)\.md$").unwrap();
    static ref ORDER_PREFIX: Regex = Regex::new(r"^(\d+)-").unwrap();
}

/// Derive the slug from a file name such as `003-hello-world.md`
pub fn derive_slug(file_name: &str) -> Result<String> {
    POST_FILE_NAME
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| Error::InvalidSlug(file_name.to_string()))
}

/// Derive the slug from a post path
pub fn slug_for_path(path: &Path) -> Result<String> {
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::InvalidSlug(path.display().to_string()))?;
    derive_slug(file_name)
}

/// Whether a file name belongs to the requested slug (`-{slug}.md` suffix)
pub fn matches_slug(file_name: &str, slug: &str) -> bool {
    file_name.ends_with(&format!("-{}.md", slug))
}

/// Numeric ordering prefix of a file name, if any
pub fn order_prefix(file_name: &str) -> Option<u64> {
    ORDER_PREFIX
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Build a file name for a new post, zero-padding the prefix
pub fn post_file_name(order: u64, width: usize, slug: &str) -> String {
    format!("{:0width$}-{}.md", order, slug, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_slug() {
        assert_eq!(derive_slug("003-hello-world.md").unwrap(), "hello-world");
        assert_eq!(derive_slug("42-foo.md").unwrap(), "foo");
    }

    #[test]
    fn test_derive_slug_rejects_unprefixed_names() {
        for name in ["readme.md", "003-.md", "003-hello.markdown", "-foo.md"] {
            match derive_slug(name) {
                Err(Error::InvalidSlug(n)) => assert_eq!(n, name),
                other => panic!("expected InvalidSlug for {}, got {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_slug_for_path() {
        let path = Path::new("posts/010-rust-notes.md");
        assert_eq!(slug_for_path(path).unwrap(), "rust-notes");
    }

    #[test]
    fn test_matches_slug() {
        assert!(matches_slug("001-hello-world.md", "hello-world"));
        assert!(!matches_slug("001-other.md", "hello-world"));
    }

    #[test]
    fn test_order_prefix_and_file_name() {
        assert_eq!(order_prefix("007-seven.md"), Some(7));
        assert_eq!(order_prefix("readme.md"), None);
        assert_eq!(post_file_name(8, 3, "eight"), "008-eight.md");
        assert_eq!(post_file_name(1234, 3, "big"), "1234-big.md");
    }
}
