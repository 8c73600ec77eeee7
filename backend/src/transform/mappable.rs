//! Mappable value reduction.
//!
//! Reduces a parsed column value to the simplest form a field-mapping
//! consumer (spreadsheet, CRM) can use directly:
//!
//! | Column type                          | Mappable value                        |
//! |--------------------------------------|---------------------------------------|
//! | text, numbers, formula, item_id      | rendered text, else the parsed value  |
//! | status                               | rendered text                         |
//! | checkbox                             | `{ checked, text }`                   |
//! | anything else (object)               | parsed object with a `text` field     |
//! | anything else (scalar)               | parsed value                          |

use serde_json::{Map, Value};

use crate::models::{ColumnDescriptor, ColumnType};
use crate::parser::{is_truthy, ParsedValue};

/// Compute the mappable value of one column.
///
/// The parsed value is never modified; objects are copied before the
/// rendered text is added.
pub fn mappable_value(column: &ColumnDescriptor, parsed: Option<&ParsedValue>) -> Value {
    let Some(parsed) = parsed else {
        return Value::Null;
    };

    let column_type = column.column_type();
    let rendered = column.rendered_text();

    if column_type.is_scalar() {
        return match rendered {
            Some(text) => text.clone(),
            None => parsed.to_json(),
        };
    }

    match (&column_type, parsed) {
        (ColumnType::Status, _) => column.text.clone().unwrap_or(Value::Null),

        (ColumnType::Checkbox, ParsedValue::Checkbox(checkbox)) => {
            let mut map = Map::new();
            map.insert("checked".to_string(), Value::Bool(checkbox.checked));
            // Absent text stays absent
            if let Some(text) = &column.text {
                map.insert("text".to_string(), text.clone());
            }
            Value::Object(map)
        }
        (ColumnType::Checkbox, _) => Value::Null,

        _ => {
            let mut value = parsed.to_json();
            if let (Value::Object(map), Some(text)) = (&mut value, rendered) {
                if !map.get("text").is_some_and(is_truthy) {
                    map.insert("text".to_string(), text.clone());
                }
            }
            value
        }
    }
}
