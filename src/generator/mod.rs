//! Generator module - writes the static site

use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::content::{Catalog, MarkdownRenderer};
use crate::error::{Error, Result};
use crate::helpers::BLOG_DIR;
use crate::offline::{OfflineManifest, APP_DIR};
use crate::templates::{SiteData, TemplateRenderer};
use crate::Blog;

/// What a build produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Posts on the list page
    pub listed: usize,
    /// Post pages written
    pub pages: usize,
    /// Static assets copied
    pub assets: usize,
}

/// Static site generator
pub struct Generator<'a> {
    blog: &'a Blog,
    catalog: Catalog,
    renderer: MarkdownRenderer,
    templates: TemplateRenderer,
}

impl<'a> Generator<'a> {
    /// Create a new generator; `drafts` includes draft posts
    pub fn new(blog: &'a Blog, drafts: bool) -> Result<Self> {
        Ok(Self {
            blog,
            catalog: blog.catalog(drafts),
            renderer: blog.renderer()?,
            templates: TemplateRenderer::new()?,
        })
    }

    /// Generate the entire site
    pub async fn generate(&self) -> Result<BuildReport> {
        let public_dir = &self.blog.public_dir;
        // Pages from an earlier build (drafts included) must not survive
        clean_public_dir(public_dir)?;
        create_dir(public_dir)?;

        let mut report = BuildReport {
            assets: self.copy_static_assets()?,
            ..Default::default()
        };

        let site = SiteData::new(&self.blog.config, true);

        let posts = self.catalog.list().await?;
        let index = self
            .templates
            .render_index(&site, &self.blog.config, &posts)?;
        write_page(&public_dir.join("index.html"), &index)?;
        write_page(&public_dir.join(BLOG_DIR).join("index.html"), &index)?;
        report.listed = posts.len();

        for path in self.catalog.discover()? {
            let post = match self.catalog.render_path(&path, &self.renderer).await {
                Ok(post) => post,
                // Drafts outside development mode
                Err(Error::NotFound(slug)) => {
                    tracing::debug!("Not publishing {}", slug);
                    continue;
                }
                Err(e) => return Err(e),
            };
            let html = self.templates.render_post(&site, &post)?;
            let dest = public_dir.join(BLOG_DIR).join(&post.slug).join("index.html");
            write_page(&dest, &html)?;
            report.pages += 1;
        }

        let not_found = self.templates.render_not_found(&site, "Not found")?;
        write_page(&public_dir.join("404.html"), &not_found)?;

        OfflineManifest::scan(public_dir, &site.root)?.write(public_dir)?;

        tracing::info!(
            "Built {} post pages, {} listed, {} assets",
            report.pages,
            report.listed,
            report.assets
        );
        Ok(report)
    }

    /// Copy the static directory into `_app/`
    fn copy_static_assets(&self) -> Result<usize> {
        let static_dir = &self.blog.static_dir;
        if !static_dir.exists() {
            return Ok(0);
        }

        let dest_root = self.blog.public_dir.join(APP_DIR);
        let mut copied = 0;

        for entry in WalkDir::new(static_dir).follow_links(true) {
            let entry = entry.map_err(|e| Error::Read {
                path: static_dir.clone(),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(static_dir)
                .unwrap_or(entry.path());
            let dest = dest_root.join(relative);
            if let Some(parent) = dest.parent() {
                create_dir(parent)?;
            }
            fs::copy(entry.path(), &dest).map_err(|source| Error::Write {
                path: dest.clone(),
                source,
            })?;
            copied += 1;
        }

        Ok(copied)
    }
}

/// Remove the public directory; returns whether there was one to remove
pub fn clean_public_dir(public_dir: &Path) -> Result<bool> {
    if !public_dir.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(public_dir).map_err(|source| Error::Write {
        path: public_dir.to_path_buf(),
        source,
    })?;
    tracing::debug!("Removed {:?}", public_dir);
    Ok(true)
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn write_page(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }
    fs::write(path, html).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    fn post(title: &str, draft: bool) -> String {
        format!(
            "---\ntitle: {}\ndate: 2024-02-02\nexcerpt: e\ndescription: d\ndraft: {}\n---\n\n## Part one\n\n```rust\nfn main() {{}}\n```\n",
            title, draft
        )
    }

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let posts = dir.path().join("posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(posts.join("001-first.md"), post("First", false)).unwrap();
        fs::write(posts.join("002-wip.md"), post("Wip", true)).unwrap();
        let assets = dir.path().join("static/fonts");
        fs::create_dir_all(&assets).unwrap();
        fs::write(dir.path().join("static/style.css"), "body {}").unwrap();
        fs::write(assets.join("serif.woff2"), "").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_generate_site() {
        let dir = site();
        let blog = Blog::with_config(dir.path().to_path_buf(), SiteConfig::default());
        let report = Generator::new(&blog, false)
            .unwrap()
            .generate()
            .await
            .unwrap();

        assert_eq!(
            report,
            BuildReport {
                listed: 1,
                pages: 1,
                assets: 2
            }
        );

        let public = dir.path().join("build");
        let index = fs::read_to_string(public.join("index.html")).unwrap();
        assert!(index.contains("/blog/first/"));
        assert!(!index.contains("/blog/wip/"));
        assert!(public.join("blog/index.html").exists());

        let page = fs::read_to_string(public.join("blog/first/index.html")).unwrap();
        assert!(page.contains(r#"id="part-one""#));
        assert!(page.contains("highlight rust"));
        assert!(!public.join("blog/wip").exists());

        assert!(public.join("_app/fonts/serif.woff2").exists());
        assert!(public.join("404.html").exists());

        let worker = fs::read_to_string(public.join("service-worker.js")).unwrap();
        assert!(worker.contains(r#""/_app/style.css""#));
        assert!(worker.contains(r#""/index.html""#));
    }

    #[tokio::test]
    async fn test_generate_with_drafts() {
        let dir = site();
        let blog = Blog::with_config(dir.path().to_path_buf(), SiteConfig::default());
        let report = Generator::new(&blog, true)
            .unwrap()
            .generate()
            .await
            .unwrap();
        assert_eq!(report.listed, 2);
        assert_eq!(report.pages, 2);
        assert!(dir.path().join("build/blog/wip/index.html").exists());
    }

    #[tokio::test]
    async fn test_production_build_drops_earlier_draft_pages() {
        let dir = site();
        let blog = Blog::with_config(dir.path().to_path_buf(), SiteConfig::default());
        let public = dir.path().join("build");
        fs::create_dir_all(&public).unwrap();
        fs::write(public.join("leftover.html"), "old").unwrap();

        Generator::new(&blog, true).unwrap().generate().await.unwrap();
        assert!(public.join("blog/wip/index.html").exists());
        assert!(!public.join("leftover.html").exists());

        Generator::new(&blog, false).unwrap().generate().await.unwrap();
        assert!(!public.join("blog/wip").exists());
        assert!(public.join("blog/first/index.html").exists());
        let worker = fs::read_to_string(public.join("service-worker.js")).unwrap();
        assert!(!worker.contains("leftover"));
    }

    #[tokio::test]
    async fn test_generate_fails_on_invalid_post() {
        let dir = site();
        fs::write(dir.path().join("posts/003-broken.md"), "no header").unwrap();
        let blog = Blog::with_config(dir.path().to_path_buf(), SiteConfig::default());
        let result = Generator::new(&blog, false).unwrap().generate().await;
        assert!(matches!(result, Err(Error::MalformedDocument { .. })));
    }
}
