use std::path::{Path, PathBuf};

/// Convenience result type used across softshadow.
pub type ShadowResult<T> = Result<T, ShadowError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Bad geometry is never an error: the rasterizer clamps it and logs. Everything here is
/// recoverable from the engine's point of view.
#[derive(thiserror::Error, Debug)]
pub enum ShadowError {
    /// A shadow spec or configuration value outside the supported range.
    #[error("validation error: {0}")]
    Validation(String),

    /// The image codec failed to encode or decode pixels.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Reading or writing a persisted cache entry failed.
    #[error("storage error at '{}': {source}", .path.display())]
    Storage {
        /// File or directory the failing operation touched.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShadowError {
    /// Build a [`ShadowError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ShadowError::Encoding`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build a [`ShadowError::Storage`] value for `path`.
    pub fn storage(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
