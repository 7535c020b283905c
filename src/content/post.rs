//! Post models

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::markdown::Heading;
use super::FrontMatter;
use crate::error::{Error, Result};

/// Raw contents of one post file
#[derive(Debug, Clone)]
pub struct Document {
    /// Source file path
    pub path: PathBuf,
    /// Raw text, front-matter included
    pub raw: String,
}

impl Document {
    /// Read a document from disk
    pub async fn read(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| Error::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            raw,
        })
    }

    /// Parse the front-matter, returning it with the trimmed body
    pub fn parse(&self) -> Result<(FrontMatter, &str)> {
        FrontMatter::parse(&self.raw).map_err(|e| e.at(&self.path))
    }
}

/// A post as shown in list views
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    pub slug: String,
    pub frontmatter: FrontMatter,
}

/// A fully rendered post for the detail view
#[derive(Debug, Clone, Serialize)]
pub struct RenderedPost {
    pub slug: String,
    pub frontmatter: FrontMatter,
    /// Same as `frontmatter.title`, exposed for page titles
    pub title: String,
    /// Rendered HTML body
    pub content: String,
    /// Headings in document order, for in-page navigation
    pub headings: Vec<Heading>,
}
