//! Batch execution for workflow hosts.
//!
//! A host hands over a list of items plus an operation selector, and
//! collects one output per item. Each item may carry an "Input JSON"
//! parameter that replaces the item payload when it decodes.
//!
//! # Example
//!
//! ```rust,ignore
//! use monday_parser::pipeline::{execute, load_batch_file, TransformOptions};
//!
//! let items = load_batch_file("items.json")?;
//! let result = execute(&items, &TransformOptions::default())?;
//! println!("{} ok, {} failed", result.succeeded, result.failed);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use std::str::FromStr;

use super::record::{transform_item, RecordDefaults};
use crate::api::logs::{log_error_indent, log_info, log_success, log_warning, log_warning_indent};
use crate::error::{PipelineError, PipelineResult};

/// Operations a host can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Normalize Monday items.
    Transform,
}

impl FromStr for Operation {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transform" => Ok(Operation::Transform),
            other => Err(PipelineError::UnsupportedOperation(other.to_string())),
        }
    }
}

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// Operation selector as given by the host.
    pub operation: String,

    /// Record failures per item instead of aborting the batch.
    pub continue_on_fail: bool,

    /// Fallbacks for board, group and email.
    pub defaults: RecordDefaults,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            operation: "transform".to_string(),
            continue_on_fail: false,
            defaults: RecordDefaults::default(),
        }
    }
}

/// One item handed over by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    /// Item payload.
    #[serde(default)]
    pub json: Value,

    /// "Input JSON" parameter: a JSON string or an already-decoded value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_json: Option<Value>,
}

impl BatchItem {
    pub fn new(json: Value) -> Self {
        Self { json, input_json: None }
    }

    pub fn with_input_json(mut self, input_json: Value) -> Self {
        self.input_json = Some(input_json);
        self
    }

    /// The payload to transform.
    ///
    /// A string parameter is decoded; if that fails the item payload is
    /// used instead.
    pub fn resolve_input(&self) -> Value {
        match &self.input_json {
            None => self.json.clone(),
            Some(Value::String(raw)) => match serde_json::from_str(raw) {
                Ok(decoded) => decoded,
                Err(_) => self.json.clone(),
            },
            Some(other) => other.clone(),
        }
    }
}

/// Failure recorded against an item in continue-on-fail mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemFailure {
    pub item_index: usize,
    pub message: String,
}

/// One output handed back to the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemOutput {
    pub json: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ItemFailure>,
}

/// Result of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    /// One output per input item, in input order.
    pub items: Vec<ItemOutput>,
    pub succeeded: usize,
    pub failed: usize,
}

/// Run the selected operation over every item.
///
/// An unsupported operation fails before any item is touched. Without
/// `continue_on_fail` the first failing item aborts the batch.
pub fn execute(items: &[BatchItem], options: &TransformOptions) -> PipelineResult<BatchResult> {
    let operation: Operation = options.operation.parse()?;

    log_info(format!("⚙️  Running '{:?}' on {} item(s)", operation, items.len()));

    let mut outputs = Vec::with_capacity(items.len());
    let mut failed = 0;

    for (index, item) in items.iter().enumerate() {
        let input = item.resolve_input();

        match transform_item(&input, &options.defaults) {
            Ok(record) => {
                outputs.push(ItemOutput {
                    json: serde_json::to_value(&record)?,
                    error: None,
                });
            }
            Err(source) if options.continue_on_fail => {
                failed += 1;
                log_warning_indent(format!("Item {}: {}", index, source), 1);
                outputs.push(ItemOutput {
                    json: Value::Object(Map::new()),
                    error: Some(ItemFailure {
                        item_index: index,
                        message: source.to_string(),
                    }),
                });
            }
            Err(source) => {
                log_error_indent(format!("Item {}: {}", index, source), 1);
                return Err(PipelineError::Item { index, source });
            }
        }
    }

    let succeeded = outputs.len() - failed;
    if failed == 0 {
        log_success(format!("Transformed {} item(s)", succeeded));
    } else {
        log_warning(format!("Transformed {} item(s), {} failed", succeeded, failed));
    }

    Ok(BatchResult {
        items: outputs,
        succeeded,
        failed,
    })
}

/// Read a batch document: a single item object or an array of items.
pub fn load_batch(content: &str) -> PipelineResult<Vec<BatchItem>> {
    let document: Value = serde_json::from_str(content)?;
    batch_from_value(document)
}

/// Read a batch document from a file.
pub fn load_batch_file<P: AsRef<Path>>(path: P) -> PipelineResult<Vec<BatchItem>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    load_batch(&content)
}

/// Split a decoded batch document into items.
pub fn batch_from_value(document: Value) -> PipelineResult<Vec<BatchItem>> {
    match document {
        Value::Array(items) => Ok(items.into_iter().map(BatchItem::new).collect()),
        item @ Value::Object(_) => Ok(vec![BatchItem::new(item)]),
        other => Err(PipelineError::InvalidBatch(format!(
            "expected an item object or an array of items, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
