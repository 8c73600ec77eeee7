//! Transformation module.
//!
//! This module turns raw Monday items into normalized records:
//! - Mappable: reduce parsed column values for field mapping
//! - Record: assemble one normalized record per item
//! - Pipeline: batch execution for workflow hosts

pub mod mappable;
pub mod pipeline;
pub mod record;

pub use mappable::mappable_value;
pub use pipeline::*;
pub use record::*;
