//! Error types for shellcloud-core.

use thiserror::Error;

/// Result type for shellcloud-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating or replacing a cloud.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A generation parameter is out of range. The update is rejected and
    /// the live cloud is left untouched.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: String,
    },

    /// The scene could not construct a mesh for a shell.
    #[error("failed to construct mesh for shell {shell}: {source}")]
    MeshConstruction {
        shell: u32,
        #[source]
        source: SceneError,
    },
}

impl Error {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Whether this error is a rejected parameter update.
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Error::InvalidParameter { .. })
    }
}

/// Errors reported by a [`Scene`](crate::Scene) implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Creating GPU (or other backing) resources for a mesh failed.
    #[error("mesh construction failed: {0}")]
    Construction(String),

    /// Releasing a mesh's geometry or material failed.
    #[error("mesh disposal failed: {0}")]
    Disposal(String),
}
