//! Helper functions shared by the renderer, templates and server

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
