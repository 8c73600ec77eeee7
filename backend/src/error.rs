//! Error types for the Monday item normalizer.
//!
//! This module defines the error hierarchy used across the crate:
//!
//! - [`ColumnParseError`] - Fault while interpreting a single column value
//! - [`TransformError`] - Whole-record faults (malformed item payload)
//! - [`PipelineError`] - Batch execution errors (operation selector, aborts)
//! - [`ServerError`] - HTTP layer errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Column-level faults never leave [`crate::parser::parse_column_value`]:
//! they are logged there and turned into a null result.

use thiserror::Error;

// =============================================================================
// Column Parsing Errors
// =============================================================================

/// Fault while extracting the canonical shape of one column value.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ColumnParseError {
    /// A nested field has a shape the extraction cannot work with.
    #[error("Invalid field '{field}' in {column_type} value: {message}")]
    InvalidField {
        column_type: String,
        field: &'static str,
        message: String,
    },
}

// =============================================================================
// Record Transformation Errors
// =============================================================================

/// Errors that make a whole item unusable.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The item failed structural validation.
    #[error("Malformed item: {}", .0.join("; "))]
    MalformedInput(Vec<String>),

    /// JSON decoding of the item failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Batch execution errors.
///
/// This is the error type returned by [`crate::transform::pipeline::execute`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The operation selector names something other than `transform`.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// An item failed and the batch is not running in continue-on-fail mode.
    #[error("Item {index} failed: {source}")]
    Item {
        index: usize,
        #[source]
        source: TransformError,
    },

    /// The batch document is neither an item nor a list of items.
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    /// IO error while reading a batch file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error while decoding a batch document.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Socket or runtime failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for column parsing internals.
pub type ColumnParseResult<T> = Result<T, ColumnParseError>;

/// Result type for record transformation.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for batch execution.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
