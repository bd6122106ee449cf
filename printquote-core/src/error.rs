//! Error types for model ingestion and catalog loading.

use thiserror::Error;

/// Result type for model ingestion.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that reject an uploaded model.
///
/// Degenerate geometry (no triangles, zero volume) is not an error; it
/// parses into a zero-valued [`ParsedModel`](crate::ParsedModel).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The buffer matches no recognized encoding.
    #[error("unsupported model format: {reason}")]
    UnsupportedFormat {
        /// What did not match.
        reason: String,
    },

    /// The declared structure needs more bytes than the buffer holds.
    #[error("truncated STL data: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes implied by the header.
        expected: u64,
        /// Bytes actually present.
        actual: usize,
    },

    /// The file name has an extension the upload boundary does not accept.
    #[error("unsupported file type: {file_name} (expected .stl, .obj or .3mf)")]
    UnsupportedExtension {
        /// Name of the rejected file.
        file_name: String,
    },
}

impl ModelError {
    /// Create an `UnsupportedFormat` error with the given reason.
    #[must_use]
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            reason: reason.into(),
        }
    }
}

/// Errors raised while building a material or quality catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog document is not valid JSON for the expected shape.
    #[error("failed to decode catalog: {0}")]
    Decode(#[from] serde_json::Error),

    /// A table has no entries.
    #[error("{table} catalog is empty")]
    Empty {
        /// Which table.
        table: &'static str,
    },

    /// Two entries share an id.
    #[error("duplicate {table} id: {id}")]
    DuplicateId {
        /// Which table.
        table: &'static str,
        /// The repeated id.
        id: String,
    },

    /// The configured default id is not present.
    #[error("default {table} id {id:?} is not in the catalog")]
    UnknownDefault {
        /// Which table.
        table: &'static str,
        /// The missing id.
        id: String,
    },

    /// An entry carries a value the estimator cannot use.
    #[error("invalid {table} entry {id:?}: {message}")]
    InvalidEntry {
        /// Which table.
        table: &'static str,
        /// Offending entry.
        id: String,
        /// What is wrong with it.
        message: String,
    },
}
