//! Errors raised while declaring an app and while rendering its content.

use thiserror::Error;
use trellis_router::{BuildError, FileRole};

/// Failure of a page's content step
///
/// Contained by the nearest error fallback on the route chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ContentError {
    message: String,
}

impl ContentError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<MetadataResolutionError> for ContentError {
    fn from(err: MetadataResolutionError) -> Self {
        ContentError::new(err.to_string())
    }
}

/// Failure of a dynamic metadata resolver
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("metadata for `{node}` could not be resolved: {message}")]
pub struct MetadataResolutionError {
    /// Route file whose metadata source failed
    pub node: String,
    pub message: String,
}

impl MetadataResolutionError {
    /// Creates an error from inside a resolver; the node is filled in by the caller
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            node: String::new(),
            message: message.into(),
        }
    }

    pub fn at(mut self, node: impl Into<String>) -> Self {
        self.node = node.into();
        self
    }
}

/// An app that cannot be assembled from its declarations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("a {role} handler for `{file}` is registered more than once")]
    DuplicateHandler { file: String, role: FileRole },

    #[error("`{file}` is a {found} file but was registered as a {expected}")]
    RoleMismatch {
        file: String,
        expected: FileRole,
        found: FileRole,
    },

    #[error("metadata is registered for `{file}`, which is not a declared page or layout")]
    MetadataTarget { file: String },
}

/// The navigation channel is gone
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("navigation to `{href}` was dropped: no runtime is listening")]
pub struct NavigationError {
    pub href: String,
}
