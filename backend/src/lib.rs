//! # Monday parser - normalize Monday.com board items
//!
//! Turns raw items fetched from the Monday.com GraphQL API into stable,
//! predictable records for workflow automation hosts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Monday item │────▶│   Parser    │────▶│  Mappable   │────▶│ Normalized  │
//! │   (JSON)    │     │ (per type)  │     │  reducer    │     │   record    │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use monday_parser::{transform_item, RecordDefaults};
//!
//! let item: serde_json::Value = serde_json::from_str(&body)?;
//! let record = transform_item(&item, &RecordDefaults::default())?;
//! println!("{}", record.mappable_column_values["status"]);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Raw item and normalized record structures
//! - [`parser`] - Column value parsing per column type
//! - [`transform`] - Mappable reduction, record assembly, batch execution
//! - [`validation`] - Structural item schema validation
//! - [`api`] - HTTP API server and log sink

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ColumnParseError,
    TransformError,
    PipelineError,
    ServerError,
    TransformResult,
    PipelineResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    ColumnType,
    ColumnDescriptor,
    RawItem,
    TransformedRecord,
    TransformedColumnValue,
    AdditionalInfo,
    DEFAULT_COLOR,
};

// =============================================================================
// Re-exports - Parser
// =============================================================================

pub use parser::{
    parse_column_value,
    parse_tagged_value,
    parse_column,
    is_truthy,
    display_string,
    ParsedValue,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    mappable_value,
    transform_item,
    transform_item_at,
    transform_raw_item,
    RecordDefaults,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid, validate, is_valid_item, validate_item};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{
    TransformRequest,
    TransformResponse,
    ResponseMetadata,
    error_response,
};

// Batch execution
pub mod pipeline {
    pub use crate::transform::pipeline::*;
}

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
