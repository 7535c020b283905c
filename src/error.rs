//! Error types for the content pipeline

use std::path::PathBuf;

use crate::content::FieldErrors;

/// Convenience alias used throughout the library
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while discovering, parsing or rendering posts
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The document does not start with a `---` delimited header
    #[error("{}: front-matter delimiters not found", path.display())]
    MalformedDocument { path: PathBuf },

    /// The header is present but does not match the front-matter schema
    #[error("{}: invalid front-matter\n{}", path.display(), errors)]
    InvalidFrontmatter { path: PathBuf, errors: FieldErrors },

    /// The file name does not encode `<NNN>-<slug>.md`
    #[error("invalid slug: {0:?} must be named <number>-<slug>.md")]
    InvalidSlug(String),

    /// Two files derive the same slug
    #[error("duplicate slug {:?} in {} and {}", slug, first.display(), second.display())]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// No document matches the requested slug
    #[error("post not found: {0}")]
    NotFound(String),

    #[error("unknown highlight theme {0:?}")]
    UnknownTheme(String),

    #[error("failed to read {}: {}", path.display(), source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {}", path.display(), source)]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Template(#[from] tera::Error),

    #[error(transparent)]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    /// Whether the error should surface as a 404 to readers
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::MalformedDocument { .. } | Error::InvalidFrontmatter { .. }
        )
    }

    /// Human-readable diagnostic body for a not-found response
    pub fn diagnostic(&self) -> String {
        match self {
            Error::NotFound(_) => "Not found".to_string(),
            Error::InvalidFrontmatter { errors, .. } => errors.to_json_pretty(),
            other => other.to_string(),
        }
    }
}
