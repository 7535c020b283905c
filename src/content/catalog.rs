//! Post catalog - discovers post files and builds list and detail views

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::filename::{matches_slug, slug_for_path};
use super::{Document, MarkdownRenderer, PostSummary, RenderedPost};
use crate::error::{Error, Result};

/// The collection of posts under one directory
#[derive(Debug, Clone)]
pub struct Catalog {
    posts_dir: PathBuf,
    include_drafts: bool,
}

impl Catalog {
    /// Create a catalog; drafts are only listed when `include_drafts` is set
    pub fn new<P: Into<PathBuf>>(posts_dir: P, include_drafts: bool) -> Self {
        Self {
            posts_dir: posts_dir.into(),
            include_drafts,
        }
    }

    pub fn include_drafts(&self) -> bool {
        self.include_drafts
    }

    /// List post files, sorted by path
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        if !self.posts_dir.exists() {
            tracing::debug!("Posts directory {:?} does not exist", self.posts_dir);
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.posts_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = entry.map_err(|e| Error::Read {
                path: e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.posts_dir.clone()),
                source: e.into(),
            })?;
            if entry.file_type().is_file() && is_markdown_file(entry.path()) {
                paths.push(entry.into_path());
            }
        }

        paths.sort();
        Ok(paths)
    }

    /// List view: slug and front-matter of every visible post, in path order
    ///
    /// Documents are read concurrently; bodies are not rendered.
    pub async fn list(&self) -> Result<Vec<PostSummary>> {
        let handles: Vec<_> = self
            .discover()?
            .into_iter()
            .map(|path| tokio::spawn(load_summary(path)))
            .collect();

        let mut posts = Vec::with_capacity(handles.len());
        let mut seen: HashMap<String, PathBuf> = HashMap::new();

        for handle in handles {
            let (path, summary) = handle.await??;

            if let Some(first) = seen.insert(summary.slug.clone(), path.clone()) {
                return Err(Error::DuplicateSlug {
                    slug: summary.slug,
                    first,
                    second: path,
                });
            }

            if summary.frontmatter.draft && !self.include_drafts {
                tracing::debug!("Skipping draft {:?}", path);
                continue;
            }
            posts.push(summary);
        }

        tracing::debug!("Listed {} posts from {:?}", posts.len(), self.posts_dir);
        Ok(posts)
    }

    /// Find the file for a slug by its `-{slug}.md` suffix
    ///
    /// A file whose own slug is exactly `slug` wins over a longer name that
    /// merely ends the same way (`002-world.md` over `001-hello-world.md`).
    pub fn find(&self, slug: &str) -> Result<PathBuf> {
        let matches: Vec<PathBuf> = self
            .discover()?
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .and_then(|s| s.to_str())
                    .map(|name| matches_slug(name, slug))
                    .unwrap_or(false)
            })
            .collect();

        let exact = matches
            .iter()
            .find(|path| slug_for_path(path).ok().as_deref() == Some(slug))
            .cloned();

        exact
            .or_else(|| matches.into_iter().next())
            .ok_or_else(|| Error::NotFound(slug.to_string()))
    }

    /// Detail view for a slug
    pub async fn load(&self, slug: &str, renderer: &MarkdownRenderer) -> Result<RenderedPost> {
        let path = self.find(slug)?;
        self.render_path(&path, renderer).await
    }

    /// Detail view for a known post file
    pub async fn render_path(&self, path: &Path, renderer: &MarkdownRenderer) -> Result<RenderedPost> {
        let slug = slug_for_path(path)?;
        let document = Document::read(path).await?;
        let (frontmatter, body) = document.parse()?;

        if frontmatter.draft && !self.include_drafts {
            tracing::debug!("Refusing to render draft {:?}", path);
            return Err(Error::NotFound(slug));
        }

        let rendered = renderer.render(body)?;
        tracing::debug!(
            "Rendered {:?} ({} headings)",
            path,
            rendered.headings.len()
        );

        Ok(RenderedPost {
            slug,
            title: frontmatter.title.clone(),
            frontmatter,
            content: rendered.html,
            headings: rendered.headings,
        })
    }
}

async fn load_summary(path: PathBuf) -> Result<(PathBuf, PostSummary)> {
    let slug = slug_for_path(&path)?;
    let document = Document::read(&path).await?;
    let (frontmatter, _) = document.parse()?;
    Ok((path, PostSummary { slug, frontmatter }))
}

/// Check if a file is a markdown post
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md")
        .unwrap_or(false)
}
