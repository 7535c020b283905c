//! Initialize a new blog

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const CONFIG: &str = r#"# Site
title: My Blog
description: ''
author: John Doe
language: en

# URL
url: http://example.com
root: /

# Directory
posts_dir: posts
static_dir: static
public_dir: build

# Writing
render_drafts: false
prefix_width: 3
highlight:
  theme: InspiredGitHub
  line_number: false
"#;

const STYLE: &str = r#"body {
  max-width: 42rem;
  margin: 0 auto;
  padding: 1rem;
  font-family: system-ui, sans-serif;
  line-height: 1.6;
}

.post-item time,
.post time {
  color: #666;
  font-size: 0.9rem;
}

.draft {
  margin-left: 0.5rem;
  color: #b45309;
}

figure.highlight pre {
  padding: 1rem;
  overflow-x: auto;
}
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("A site already exists in {:?}", target_dir);
    }

    fs::create_dir_all(target_dir.join("posts"))?;
    fs::create_dir_all(target_dir.join("static"))?;

    fs::write(&config_path, CONFIG).context("writing _config.yml")?;
    fs::write(target_dir.join("static/style.css"), STYLE)?;

    let today = chrono::Local::now().format("%Y-%m-%d");
    let sample_post = format!(
        r#"---
title: Hello World
date: {}
excerpt: The first post on this blog.
description: A short tour of how posts are written.
---

Welcome! Posts live in `posts/` and are named `<number>-<slug>.md`.
The number orders the posts, the rest becomes the URL.

## Writing a post

```bash
$ markpress new "My New Post"
```

## Previewing

```bash
$ markpress server
```

## Building

```bash
$ markpress generate
```
"#,
        today
    );

    fs::write(target_dir.join("posts/001-hello-world.md"), sample_post)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Blog;

    #[tokio::test]
    async fn test_init_creates_valid_site() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();

        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.config.title, "My Blog");
        let posts = blog.catalog(false).list().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "hello-world");
        assert!(blog.static_dir.join("style.css").exists());
    }

    #[test]
    fn test_init_refuses_existing_site() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();
        assert!(init_site(dir.path()).is_err());
    }
}
