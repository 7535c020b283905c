//! Clean the public directory

use anyhow::Result;

use crate::generator::clean_public_dir;
use crate::Blog;

/// Remove the public directory
pub fn run(blog: &Blog) -> Result<()> {
    if clean_public_dir(&blog.public_dir)? {
        tracing::info!("Deleted: {:?}", blog.public_dir);
    }

    Ok(())
}
