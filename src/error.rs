//! Errors raised while converting a document.
//!
//! Failures fall into two kinds. A [`ResourceError`] means the source document
//! or the destination matrix could not be opened, read, written or closed. A
//! [`ProcessingError`] covers anything that goes wrong while turning
//! paragraphs into matrix rows.

use std::{io, path::PathBuf};

/// Any error raised during a conversion run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A source or destination could not be used.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Sentences could not be processed or recorded.
    #[error(transparent)]
    Processing(#[from] ProcessingError),
}

/// A source or destination could not be opened, read, written or closed.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// The file does not exist.
    #[error("no such file or directory: {}", path.display())]
    NotFound {
        /// The missing file.
        path: PathBuf,
    },

    /// An I/O operation failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The destination is the source document itself.
    #[error("refusing to overwrite source document {}", path.display())]
    Overwrite {
        /// The path shared by the source and the destination.
        path: PathBuf,
    },

    /// The matrix could not be encoded.
    #[error("failed to render {}: {source}", path.display())]
    Render {
        /// The destination being rendered.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: csv::Error,
    },
}

impl ResourceError {
    /// Classifies an I/O error on `path`, separating "not found" from other
    /// failures.
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Whether this error means the file does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Sentences could not be processed or recorded.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    /// A requirement row could not be handed to the matrix.
    #[error("failed to record requirement {id}: {source}")]
    Record {
        /// The ID assigned to the requirement.
        id: usize,
        /// The underlying error.
        #[source]
        source: ResourceError,
    },
}
