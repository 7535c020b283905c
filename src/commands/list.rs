//! List posts

use anyhow::Result;

use crate::Blog;

/// Print the list view
pub async fn run(blog: &Blog, drafts: bool, json: bool) -> Result<()> {
    let posts = blog.catalog(drafts).list().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&posts)?);
        return Ok(());
    }

    println!("Posts ({}):", posts.len());
    for post in posts {
        let draft = if post.frontmatter.draft { " (draft)" } else { "" };
        println!(
            "  {} - {} [{}]{}",
            post.frontmatter.date.format("%Y-%m-%d"),
            post.frontmatter.title,
            post.slug,
            draft
        );
    }

    Ok(())
}
