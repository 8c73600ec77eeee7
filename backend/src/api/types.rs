//! REST API types for workflow hosts.
//!
//! Request and response bodies use camelCase keys. Output records keep the
//! snake_case field names of the normalized record.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::transform::pipeline::{BatchItem, BatchResult, ItemOutput};

/// Body of `POST /api/transform`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformRequest {
    /// Raw Monday items.
    #[serde(default)]
    pub items: Vec<Value>,

    /// Operation selector (default: "transform")
    #[serde(default)]
    pub operation: Option<String>,

    #[serde(default)]
    pub continue_on_fail: bool,

    /// "Input JSON" parameter, applied to every item.
    #[serde(default)]
    pub input_json: Option<Value>,
}

impl TransformRequest {
    /// Items in the form the batch adapter expects.
    pub fn batch(&self) -> Vec<BatchItem> {
        self.items
            .iter()
            .map(|item| {
                let batch = BatchItem::new(item.clone());
                match &self.input_json {
                    Some(input) => batch.with_input_json(input.clone()),
                    None => batch,
                }
            })
            .collect()
    }
}

/// Response sent after a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Status: "ok" or "partial"
    pub status: String,

    /// One output per input item
    pub items: Vec<ItemOutput>,

    pub metadata: ResponseMetadata,
}

/// Counts for a batch run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl From<BatchResult> for TransformResponse {
    fn from(result: BatchResult) -> Self {
        TransformResponse {
            job_id: Uuid::new_v4().to_string(),
            status: if result.failed == 0 { "ok" } else { "partial" }.to_string(),
            metadata: ResponseMetadata {
                total: result.items.len(),
                succeeded: result.succeeded,
                failed: result.failed,
            },
            items: result.items,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "items": [],
        "metadata": {
            "total": 0,
            "succeeded": 0,
            "failed": 0
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::pipeline::ItemFailure;

    #[test]
    fn test_request_defaults() {
        let request: TransformRequest = serde_json::from_value(json!({ "items": [{ "id": "1" }] })).unwrap();
        assert_eq!(request.items.len(), 1);
        assert!(request.operation.is_none());
        assert!(!request.continue_on_fail);

        let batch = request.batch();
        assert_eq!(batch[0].json["id"], "1");
        assert!(batch[0].input_json.is_none());
    }

    #[test]
    fn test_request_camel_case() {
        let request: TransformRequest = serde_json::from_value(json!({
            "items": [{ "id": "1" }, { "id": "2" }],
            "operation": "transform",
            "continueOnFail": true,
            "inputJson": "{\"id\":\"9\"}"
        }))
        .unwrap();

        assert!(request.continue_on_fail);
        let batch = request.batch();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1].resolve_input()["id"], "9");
    }

    #[test]
    fn test_response_from_batch() {
        let result = BatchResult {
            items: vec![
                ItemOutput { json: json!({ "id": "1" }), error: None },
                ItemOutput {
                    json: json!({}),
                    error: Some(ItemFailure { item_index: 1, message: "bad".into() }),
                },
            ],
            succeeded: 1,
            failed: 1,
        };

        let response = TransformResponse::from(result);
        assert_eq!(response.status, "partial");
        assert_eq!(response.metadata, ResponseMetadata { total: 2, succeeded: 1, failed: 1 });
        assert!(Uuid::parse_str(&response.job_id).is_ok());

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["items"][1]["error"]["itemIndex"], 1);
        assert!(body.get("jobId").is_some());
    }

    #[test]
    fn test_error_response_shape() {
        let body = error_response("Unsupported operation: delete");
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "Unsupported operation: delete");
        assert_eq!(body["items"], json!([]));
    }
}
