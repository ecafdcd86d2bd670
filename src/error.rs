//! Error taxonomy shared by every routine in the crate.
//!
//! Each routine validates its inputs on entry and reports the first violated
//! precondition. No partially built buffer is ever returned alongside an error.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    /// Array rank outside `[1, 4]`, mismatched element type or inconsistent
    /// element count.
    #[error("shape error: {0}")]
    Shape(String),

    /// A drawing color does not have one component per channel.
    #[error("color has {actual} components but the image has {expected} channels")]
    ColorArity { expected: usize, actual: usize },

    /// The transform matrix has no inverse.
    #[error("transform matrix is singular")]
    SingularMatrix,

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file was readable but its content is not a recognized format.
    #[error("unrecognized format in {}: {reason}", path.display())]
    Format { path: PathBuf, reason: String },

    /// Failure reported by the `image` codecs while encoding.
    #[error("codec error: {0}")]
    Codec(String),
}

impl ImageError {
    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for the two file-level failures: unreadable path or unknown format.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Format { .. })
    }
}

pub type Result<T, E = ImageError> = std::result::Result<T, E>;
