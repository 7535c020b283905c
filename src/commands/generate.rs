//! Generate static files

use anyhow::Result;

use crate::generator::{BuildReport, Generator};
use crate::Blog;

/// Generate the static site
pub async fn run(blog: &Blog, drafts: bool) -> Result<BuildReport> {
    let start = std::time::Instant::now();

    let report = Generator::new(blog, drafts)?.generate().await?;

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(report)
}
