//! URL helper functions

use crate::config::SiteConfig;

/// Directory posts are served under
pub const BLOG_DIR: &str = "blog";

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/_app/style.css") // -> "/site/_app/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/blog/") // -> "https://example.com/site/blog/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Root-relative URL of a post page
pub fn post_url(config: &SiteConfig, slug: &str) -> String {
    url_for(config, &format!("{}/{}/", BLOG_DIR, slug))
}
