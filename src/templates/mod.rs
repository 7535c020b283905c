//! Built-in page templates using the Tera template engine
//!
//! The templates are embedded in the binary; page data is passed in as
//! serializable view structs.

use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{FrontMatter, PostSummary, RenderedPost};
use crate::error::Result;
use crate::helpers::{format_date, full_url_for, post_url, url_for};

/// Template renderer with the embedded site theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Tera's escaper also rewrites `/`, which mangles URLs; templates
        // escape text fields explicitly instead
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("index.html", include_str!("site/index.html")),
            ("post.html", include_str!("site/post.html")),
            ("404.html", include_str!("site/404.html")),
        ])?;

        tera.register_filter("date_format", date_format_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// List page
    pub fn render_index(&self, site: &SiteData, config: &SiteConfig, posts: &[PostSummary]) -> Result<String> {
        let entries: Vec<PostEntry> = posts
            .iter()
            .map(|post| PostEntry {
                slug: &post.slug,
                url: post_url(config, &post.slug),
                frontmatter: &post.frontmatter,
            })
            .collect();

        let mut context = Context::new();
        context.insert("site", site);
        context.insert("posts", &entries);
        self.render("index.html", &context)
    }

    /// Post page
    pub fn render_post(&self, site: &SiteData, post: &RenderedPost) -> Result<String> {
        let mut context = Context::new();
        context.insert("site", site);
        context.insert("post", post);
        self.render("post.html", &context)
    }

    /// Not-found page carrying a diagnostic message
    pub fn render_not_found(&self, site: &SiteData, message: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("site", site);
        context.insert("message", message);
        self.render("404.html", &context)
    }
}

/// Tera filter: format an ISO date string with a Moment-style format
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "YYYY-MM-DD".to_string(),
    };

    let formatted = chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .ok()
        .and_then(|date| format_date(&date, &format));

    Ok(tera::Value::String(formatted.unwrap_or(s)))
}

/// Site-wide template data
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    /// Root path, always ending with `/`
    pub root: String,
    /// Absolute URL of the root, used for canonical links
    pub base_url: String,
    /// Whether pages register the offline service worker
    pub offline: bool,
}

impl SiteData {
    pub fn new(config: &SiteConfig, offline: bool) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            root: url_for(config, ""),
            base_url: full_url_for(config, ""),
            offline,
        }
    }
}

#[derive(Debug, Serialize)]
struct PostEntry<'a> {
    slug: &'a str,
    url: String,
    frontmatter: &'a FrontMatter,
}
