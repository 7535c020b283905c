//! Content module - front-matter, the post catalog and markdown rendering

pub mod catalog;
mod frontmatter;
mod markdown;
mod post;
pub mod filename;

pub use catalog::Catalog;
pub use frontmatter::{FieldErrors, FrontMatter, FrontMatterError};
pub use markdown::{Heading, MarkdownRenderer, RenderedMarkdown};
pub use post::{Document, PostSummary, RenderedPost};
