//! Column value parser.
//!
//! Turns the loosely-typed `value` of a Monday column into a canonical
//! shape chosen by the column type. Raw values arrive as JSON-encoded
//! strings, already-decoded JSON, primitives, or nothing at all.
//!
//! # Contract
//!
//! - Falsy raw values (`null`, `""`, `0`, `false`) parse to `None`.
//! - A string that is not valid JSON is returned unchanged.
//! - Object-shaped types return `None` when the decoded value is not an
//!   object, except `long_text`, `email` and `phone`, which wrap scalars.
//! - Faults inside the per-type extraction are logged and become `None`.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use monday_parser::{parse_column_value, ColumnType};
//!
//! let raw = json!(r#"{"checked":"true","changed_at":"2024-03-01"}"#);
//! let parsed = parse_column_value(&raw, &ColumnType::Checkbox).unwrap();
//! assert_eq!(parsed.to_json()["checked"], true);
//! ```

pub mod values;

use serde_json::Value;

use crate::api::logs::log_warning;
use crate::error::ColumnParseResult;
use crate::models::{ColumnDescriptor, ColumnType};

pub use values::*;

/// JavaScript-style truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// String form of a scalar, as a loosely-typed host would render it.
pub fn display_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) if n.is_f64() => n.as_f64().map(float_string).unwrap_or_default(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Float rendering with exponent notation outside `[1e-6, 1e21)`.
fn float_string(f: f64) -> String {
    let magnitude = f.abs();
    if f == 0.0 {
        return "0".to_string();
    }
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let formatted = format!("{:e}", f);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        };
    }
    f.to_string()
}

/// Parse a raw column value into its canonical shape.
///
/// Never fails: any fault during extraction is logged and yields `None`.
pub fn parse_column_value(raw: &Value, column_type: &ColumnType) -> Option<ParsedValue> {
    if !is_truthy(raw) {
        return None;
    }

    let decoded = match raw {
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(decoded) => decoded,
            // Not JSON: already a final simple value
            Err(_) => return Some(ParsedValue::Raw(raw.clone())),
        },
        other => other.clone(),
    };

    match try_parse(&decoded, column_type) {
        Ok(parsed) => parsed,
        Err(err) => {
            log_warning(format!(
                "Error parsing column value of type {}: {}",
                column_type, err
            ));
            None
        }
    }
}

/// Parse the value of one column descriptor.
///
/// A truthy type tag that is not a string selects no rule: the value is
/// logged and parses to `None`.
pub fn parse_column(column: &ColumnDescriptor) -> Option<ParsedValue> {
    let raw = column.raw_value();
    if !column.has_dispatchable_tag() && is_truthy(raw) {
        log_warning(format!(
            "Error parsing column value of type {}: type tag is not a string",
            column.type_tag
        ));
        return None;
    }
    parse_column_value(raw, &column.column_type())
}

/// Parse with a raw type tag instead of a resolved [`ColumnType`].
pub fn parse_tagged_value(raw: &Value, type_tag: &str) -> Option<ParsedValue> {
    parse_column_value(raw, &ColumnType::from_tag(type_tag))
}

/// Per-type extraction on an already-decoded value.
fn try_parse(decoded: &Value, column_type: &ColumnType) -> ColumnParseResult<Option<ParsedValue>> {
    use ColumnType as T;
    use ParsedValue as P;

    let obj = decoded.as_object();

    let parsed = match column_type {
        T::Text | T::Numbers | T::Formula | T::ItemId | T::Other(_) => passthrough(decoded),

        // Status also has a bare-index legacy encoding
        T::Status => match obj {
            Some(o) => Some(P::Status(StatusValue::from_object(o))),
            None => passthrough(decoded),
        },

        T::LongText => Some(P::LongText(match obj {
            Some(o) => LongTextValue::from_object(o),
            None => LongTextValue::from_scalar(decoded),
        })),
        T::Email => Some(P::Email(match obj {
            Some(o) => EmailValue::from_object(o),
            None => EmailValue::from_scalar(decoded),
        })),
        T::Phone => Some(P::Phone(match obj {
            Some(o) => PhoneValue::from_object(o),
            None => PhoneValue::from_scalar(decoded),
        })),

        T::People => match obj {
            Some(o) => Some(P::People(PeopleValue::from_object(o)?)),
            None => None,
        },

        T::CreationLog => obj.map(|o| P::CreationLog(CreationLogValue::from_object(o))),
        T::Checkbox => obj.map(|o| P::Checkbox(CheckboxValue::from_object(o))),
        T::Link => obj.map(|o| P::Link(LinkValue::from_object(o))),
        T::Date => obj.map(|o| P::Date(DateValue::from_object(o))),
        T::Timeline => obj.map(|o| P::Timeline(TimelineValue::from_object(o))),
        T::Dropdown => obj.map(|o| P::Dropdown(DropdownValue::from_object(o))),
        T::Tags => obj.map(|o| P::Tags(TagsValue::from_object(o))),
        T::File => obj.map(|o| P::File(FileValue::from_object(o))),
        T::BoardRelation | T::Dependency => {
            obj.map(|o| P::LinkedItems(LinkedItemsValue::from_object(o)))
        }
        T::Mirror => obj.map(|o| P::Mirror(MirrorValue::from_object(o))),
        T::Location => obj.map(|o| P::Location(LocationValue::from_object(o))),
        T::Country => obj.map(|o| P::Country(CountryValue::from_object(o))),
        T::Rating => obj.map(|o| P::Rating(RatingValue::from_object(o))),
        T::Vote => obj.map(|o| P::Vote(VoteValue::from_object(o))),
        T::Hour => obj.map(|o| P::Hour(HourValue::from_object(o))),
        T::Week => obj.map(|o| P::Week(WeekValue::from_object(o))),
        T::WorldClock => obj.map(|o| P::WorldClock(WorldClockValue::from_object(o))),
        T::TimeTracking => obj.map(|o| P::TimeTracking(TimeTrackingValue::from_object(o))),
        T::Button => obj.map(|o| P::Button(ButtonValue::from_object(o))),
        T::LastUpdated => obj.map(|o| P::LastUpdated(LastUpdatedValue::from_object(o))),
        T::Doc => obj.map(|o| P::Doc(DocValue::from_object(o))),
        T::Color(_) => obj.map(|o| P::Color(ColorValue::from_object(o))),
    };

    Ok(parsed)
}

/// Decoded value as-is; a decoded `null` is still no value.
fn passthrough(decoded: &Value) -> Option<ParsedValue> {
    match decoded {
        Value::Null => None,
        other => Some(ParsedValue::Raw(other.clone())),
    }
}
