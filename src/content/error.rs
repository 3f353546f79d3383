//! Errors raised while reading the content directory

use std::path::PathBuf;
use thiserror::Error;

use super::frontmatter::FrontMatterError;

/// Failures of the content store
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("cannot read content directory {path:?}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no content file for {id:?} in {dir:?}")]
    NotFound { id: String, dir: PathBuf },

    #[error("invalid post identifier {0:?}")]
    InvalidIdentifier(String),

    #[error("cannot read {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed front-matter in {path:?}: {source}")]
    MalformedMetadata {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },
}

impl ContentError {
    /// True when the requested post does not exist (or could never exist)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ContentError::NotFound { .. } | ContentError::InvalidIdentifier(_)
        )
    }
}
