//! Render a single post

use anyhow::Result;

use crate::Blog;

/// Print the detail view of one post
pub async fn run(blog: &Blog, slug: &str, drafts: bool, json: bool) -> Result<()> {
    let renderer = blog.renderer()?;
    let post = blog.catalog(drafts).load(slug, &renderer).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&post)?);
        return Ok(());
    }

    println!("{} ({})", post.title, post.frontmatter.date.format("%Y-%m-%d"));
    for heading in &post.headings {
        let indent = "  ".repeat(heading.depth.saturating_sub(1) as usize);
        println!("{}- {} #{}", indent, heading.text, heading.slug);
    }
    println!();
    println!("{}", post.content);

    Ok(())
}
