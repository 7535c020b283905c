//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::filename::{order_prefix, post_file_name};
use crate::Blog;

/// Create a new draft post with the next ordering prefix
pub fn create_post(blog: &Blog, title: &str, slug: Option<&str>) -> Result<PathBuf> {
    let slug = match slug {
        Some(s) => slug::slugify(s),
        None => slug::slugify(title),
    };
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a slug from {:?}", title);
    }

    fs::create_dir_all(&blog.posts_dir)?;

    let catalog = blog.catalog(true);
    let mut next = 1;
    for path in catalog.discover()? {
        let name = path.file_name().and_then(|s| s.to_str()).unwrap_or_default();
        if name.ends_with(&format!("-{}.md", slug)) {
            anyhow::bail!("A post with slug {:?} already exists: {:?}", slug, path);
        }
        if let Some(order) = order_prefix(name) {
            next = next.max(order + 1);
        }
    }

    let file_path = blog
        .posts_dir
        .join(post_file_name(next, blog.config.prefix_width, &slug));

    let content = format!(
        r#"---
title: {}
date: {}
excerpt: ''
description: ''
draft: true
---
"#,
        serde_yaml::to_string(title)?.trim_end(),
        chrono::Local::now().format("%Y-%m-%d")
    );

    fs::write(&file_path, content)?;
    tracing::info!("Created {:?}", file_path);

    Ok(file_path)
}
