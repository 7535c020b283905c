//! markpress: a small static blog engine
//!
//! Posts are markdown files named `<NNN>-<slug>.md` with a YAML front-matter
//! header. The content pipeline validates the header, derives slugs from
//! file names and renders bodies to HTML with highlighted code, for both a
//! static build and a development server.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod offline;
pub mod server;
pub mod templates;

pub use error::{Error, Result};

use std::path::{Path, PathBuf};

/// A blog site rooted at a directory
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory holding the post files
    pub posts_dir: PathBuf,
    /// Static assets copied into the build
    pub static_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Blog {
    /// Create a new blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> anyhow::Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a blog with an explicit configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let posts_dir = base_dir.join(&config.posts_dir);
        let static_dir = base_dir.join(&config.static_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            posts_dir,
            static_dir,
            public_dir,
        }
    }

    /// The post catalog; drafts are visible when `development` is set or
    /// the config renders drafts
    pub fn catalog(&self, development: bool) -> content::Catalog {
        content::Catalog::new(
            &self.posts_dir,
            development || self.config.render_drafts,
        )
    }

    /// Markdown renderer configured from the site's highlight settings
    pub fn renderer(&self) -> Result<content::MarkdownRenderer> {
        content::MarkdownRenderer::from_config(&self.config.highlight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_blog_defaults_without_config() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.posts_dir, dir.path().join("posts"));
        assert_eq!(blog.public_dir, dir.path().join("build"));
        assert!(!blog.catalog(false).include_drafts());
        assert!(blog.catalog(true).include_drafts());
    }

    #[test]
    fn test_blog_reads_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("_config.yml"),
            "posts_dir: content\nrender_drafts: true\n",
        )
        .unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.posts_dir, dir.path().join("content"));
        assert!(blog.catalog(false).include_drafts());
    }
}
