//! Error types

use crate::config::ConfigError;
use crate::types::RelationshipCategory;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving a navigation request.
///
/// Most misses are not errors at all: unreadable files are skipped and
/// unmatched probes yield no candidates. What remains is a broken rule table
/// or configuration, and reading the file the user clicked in.
#[derive(Debug, Error)]
pub enum NavError {
    /// Failed to read a document
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A rule template does not compile into a usable locator
    #[error("Invalid {category} rule: {message}")]
    Rule {
        category: RelationshipCategory,
        message: String,
    },

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl NavError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        NavError::Io {
            path: path.into(),
            source,
        }
    }
}
