//! JSON Schema validation of raw Monday items.
//!
//! Only the structure the transformer cannot do without is checked: the
//! item is an object and `column_values` is a list of objects with a string
//! `id`. Everything else about a column (value, text, type, metadata) is
//! handled per column and never rejects the item.
//!
//! The schema is embedded at compile time from `schemas/monday-item.json`
//! and compiled once.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use monday_parser::{validate_item, is_valid_item};
//!
//! let item = json!({
//!     "id": "123",
//!     "column_values": [{ "id": "status", "type": "status", "value": null }]
//! });
//! assert!(validate_item(&item).is_ok());
//! assert!(!is_valid_item(&json!([1, 2, 3])));
//! ```

use jsonschema::Validator;
use once_cell::sync::Lazy;
use serde_json::Value;

static ITEM_VALIDATOR: Lazy<Validator> = Lazy::new(|| {
    let schema: Value = serde_json::from_str(include_str!("../../schemas/monday-item.json"))
        .expect("Invalid embedded schema");
    jsonschema::draft7::new(&schema).expect("Invalid embedded schema")
});

/// Validate a JSON value against a JSON schema.
///
/// # Returns
/// * `Ok(())` when valid
/// * `Err(Vec<String>)` with one message per violation
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;
    collect_errors(&validator, data)
}

fn collect_errors(validator: &Validator, data: &Value) -> Result<(), Vec<String>> {
    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick boolean check.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate a raw item against the embedded item schema.
pub fn validate_item(data: &Value) -> Result<(), Vec<String>> {
    collect_errors(&ITEM_VALIDATOR, data)
}

/// Quick check against the item schema.
pub fn is_valid_item(data: &Value) -> bool {
    ITEM_VALIDATOR.is_valid(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_item() {
        let item = json!({
            "id": "123",
            "name": "Task",
            "board": { "id": "1" },
            "group": null,
            "column_values": [
                {
                    "id": "status",
                    "type": "status",
                    "value": "{\"index\":1}",
                    "text": "Done",
                    "column": { "title": "Status", "settings_str": "{}" }
                },
                { "id": "empty", "value": null, "text": null, "type": null, "column": null }
            ]
        });
        assert!(is_valid_item(&item));
        assert!(validate_item(&item).is_ok());
    }

    #[test]
    fn test_minimal_item() {
        assert!(is_valid_item(&json!({})));
        assert!(is_valid_item(&json!({ "column_values": null })));
    }

    #[test]
    fn test_non_object_item() {
        assert!(!is_valid_item(&json!([1, 2, 3])));
        assert!(!is_valid_item(&json!("item")));
        assert!(!is_valid_item(&Value::Null));
    }

    #[test]
    fn test_column_without_id() {
        let item = json!({ "column_values": [{ "type": "text", "value": "\"x\"" }] });
        let errors = validate_item(&item).unwrap_err();
        assert!(!errors.is_empty());
        assert!(errors.iter().any(|e| e.contains("id")));
    }

    #[test]
    fn test_column_values_not_a_list() {
        assert!(!is_valid_item(&json!({ "column_values": "nope" })));
        assert!(!is_valid_item(&json!({ "column_values": { "id": "a" } })));
    }

    #[test]
    fn test_loose_column_fields_accepted() {
        let item = json!({
            "board": "b-1",
            "column_values": [
                { "id": "a", "type": 7, "text": 12, "column": { "title": 5, "settings_str": {} } },
                { "id": "b", "column": "Budget" }
            ]
        });
        assert!(validate_item(&item).is_ok());
    }

    #[test]
    fn test_non_object_column_rejected() {
        assert!(!is_valid_item(&json!({ "column_values": [null] })));
        assert!(!is_valid_item(&json!({ "column_values": [{ "id": 5 }] })));
    }

    #[test]
    fn test_generic_validate() {
        let schema = json!({ "type": "object", "required": ["id"] });
        assert!(validate(&schema, &json!({ "id": 1 })).is_ok());
        assert!(!is_valid(&schema, &json!({})));

        let errors = validate(&json!({ "type": 12 }), &json!({})).unwrap_err();
        assert!(errors[0].starts_with("Invalid schema"));
    }
}
