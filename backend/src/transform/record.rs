//! Record transformer.
//!
//! Turns one raw Monday item into a [`TransformedRecord`]: identity fields,
//! board and group descriptors, the creator id from the `creation_log`
//! column, the detailed column list and the id-keyed mappable values.
//!
//! ```text
//! item.column_values ──┬─▶ parse_column_value ──▶ additional_info ──▶ column_values[]
//!                      └─────────────────────────▶ mappable_value ──▶ mappable_column_values{}
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use std::env;

use crate::error::{TransformError, TransformResult};
use crate::models::{
    AdditionalInfo, BoardInfo, ColumnDescriptor, ColumnType, GroupInfo, RawItem,
    TransformedColumnValue, TransformedRecord, DEFAULT_COLOR,
};
use crate::parser::{is_truthy, parse_column, parse_column_value, ParsedValue};
use crate::validation::validate_item;

use super::mappable::mappable_value;

/// Board id used when the item carries none.
pub const DEFAULT_BOARD_ID: &str = "1234567890";
/// Group id used when the item carries none.
pub const DEFAULT_GROUP_ID: &str = "topics";
/// Group title used when the item carries none.
pub const DEFAULT_GROUP_TITLE: &str = "Parsed Items";
/// Synthetic address pattern; `{id}` is replaced by the item id.
pub const DEFAULT_EMAIL_PATTERN: &str = "item_{id}@monday.com";

/// Column ids with this prefix get color `additional_info`.
const COLOR_ID_PREFIX: &str = "color_";

/// Fallbacks for fields the item does not carry.
///
/// No lookup against the Monday API is made, so these are static. `None`
/// leaves the field null.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDefaults {
    pub board_id: Option<String>,
    pub group_id: Option<String>,
    pub group_title: Option<String>,
    pub email_pattern: Option<String>,
}

impl Default for RecordDefaults {
    fn default() -> Self {
        Self {
            board_id: Some(DEFAULT_BOARD_ID.to_string()),
            group_id: Some(DEFAULT_GROUP_ID.to_string()),
            group_title: Some(DEFAULT_GROUP_TITLE.to_string()),
            email_pattern: Some(DEFAULT_EMAIL_PATTERN.to_string()),
        }
    }
}

impl RecordDefaults {
    /// No fallbacks: missing board, group and email stay null.
    pub fn unset() -> Self {
        Self {
            board_id: None,
            group_id: None,
            group_title: None,
            email_pattern: None,
        }
    }

    /// Built-in defaults overridden by `MONDAY_PARSER_*` environment variables.
    ///
    /// An empty variable disables that fallback.
    pub fn from_env() -> Self {
        // Try loading .env file
        let _ = dotenvy::dotenv();

        let mut defaults = Self::default();
        override_from_env(&mut defaults.board_id, "MONDAY_PARSER_BOARD_ID");
        override_from_env(&mut defaults.group_id, "MONDAY_PARSER_GROUP_ID");
        override_from_env(&mut defaults.group_title, "MONDAY_PARSER_GROUP_TITLE");
        override_from_env(&mut defaults.email_pattern, "MONDAY_PARSER_EMAIL_PATTERN");
        defaults
    }

    /// Synthetic email for an item id.
    pub fn email_for(&self, item_id: &Value) -> Option<String> {
        let id = match item_id {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Number(n) if is_truthy(item_id) => n.to_string(),
            _ => "unknown".to_string(),
        };
        self.email_pattern
            .as_ref()
            .map(|pattern| pattern.replace("{id}", &id))
    }
}

fn override_from_env(slot: &mut Option<String>, key: &str) {
    if let Ok(value) = env::var(key) {
        *slot = Some(value).filter(|v| !v.is_empty());
    }
}

/// Transform one decoded item, stamping `updated_at` with the current time.
pub fn transform_item(item: &Value, defaults: &RecordDefaults) -> TransformResult<TransformedRecord> {
    transform_item_at(item, defaults, Utc::now())
}

/// Transform one decoded item with an explicit processing time.
///
/// Fails only when the item as a whole is unusable; bad columns degrade to
/// null fields.
pub fn transform_item_at(
    item: &Value,
    defaults: &RecordDefaults,
    now: DateTime<Utc>,
) -> TransformResult<TransformedRecord> {
    validate_item(item).map_err(TransformError::MalformedInput)?;
    let raw: RawItem = serde_json::from_value(item.clone())?;
    Ok(transform_raw_item(&raw, defaults, now))
}

/// Transform an already-typed item.
pub fn transform_raw_item(
    item: &RawItem,
    defaults: &RecordDefaults,
    now: DateTime<Utc>,
) -> TransformedRecord {
    let columns: &[ColumnDescriptor] = item.column_values.as_deref().unwrap_or(&[]);

    let mut column_values = Vec::with_capacity(columns.len());
    let mut mappable_column_values = Map::new();

    for column in columns {
        let column_type = column.column_type();
        let parsed = parse_column(column);

        column_values.push(TransformedColumnValue {
            id: column.id.clone(),
            value: column.value.clone(),
            text: column.text.clone(),
            title: column.title(),
            additional_info: additional_info(column, &column_type, parsed.as_ref()),
        });

        // Later duplicates overwrite earlier ones
        mappable_column_values.insert(column.id.clone(), mappable_value(column, parsed.as_ref()));
    }

    TransformedRecord {
        id: item.id.clone(),
        name: item.name.clone(),
        created_at: item.created_at.clone(),
        state: item.state.clone(),
        email: resolve_email(item, defaults),
        updated_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        board: BoardInfo {
            id: truthy_or_default(
                item.board.get("id"),
                defaults.board_id.as_deref(),
            ),
        },
        group: GroupInfo {
            id: truthy_or_default(
                item.group.get("id"),
                defaults.group_id.as_deref(),
            ),
            title: truthy_or_default(
                item.group.get("title"),
                defaults.group_title.as_deref(),
            ),
            deleted: false,
            archived: false,
        },
        assets: Vec::new(),
        parent_item: None,
        subitems: Vec::new(),
        creator_id: creator_id(columns),
        column_values,
        mappable_column_values,
    }
}

/// Creator id from the first `creation_log` column, wherever it sits.
pub fn creator_id(columns: &[ColumnDescriptor]) -> Value {
    columns
        .iter()
        .find(|c| c.column_type() == ColumnType::CreationLog)
        .and_then(|c| parse_column_value(c.raw_value(), &ColumnType::CreationLog))
        .and_then(|parsed| match parsed {
            ParsedValue::CreationLog(log) => log.creator_id,
            _ => None,
        })
        .unwrap_or(Value::Null)
}

/// Serialized auxiliary info for status, numbers-with-unit and `color_*` columns.
pub fn additional_info(
    column: &ColumnDescriptor,
    column_type: &ColumnType,
    parsed: Option<&ParsedValue>,
) -> Option<String> {
    let parsed_object = parsed
        .filter(|p| p.is_object())
        .map(ParsedValue::to_json);

    match column_type {
        ColumnType::Status => parsed_object.and_then(|p| {
            display_info(column, &p, json!(DEFAULT_COLOR))
        }),
        ColumnType::Numbers => numbers_unit(column),
        _ if column.id.starts_with(COLOR_ID_PREFIX) => parsed_object.and_then(|p| {
            let color = field_or(&p, "color", json!(DEFAULT_COLOR));
            display_info(column, &p, color)
        }),
        _ => None,
    }
}

fn display_info(column: &ColumnDescriptor, parsed: &Value, color: Value) -> Option<String> {
    let label = match column.rendered_text() {
        Some(text) => Some(text.clone()),
        None => parsed.get("label").cloned(),
    };
    let info = AdditionalInfo {
        label,
        color,
        changed_at: field_or(parsed, "changed_at", json!("")),
    };
    serde_json::to_string(&info).ok()
}

/// Unit from the column settings; undecodable settings are ignored.
fn numbers_unit(column: &ColumnDescriptor) -> Option<String> {
    let settings = column.settings_str().filter(|s| !s.is_empty()).unwrap_or("{}");
    let settings: Value = serde_json::from_str(settings).ok()?;
    let unit = settings.get("unit").filter(|u| is_truthy(u))?;
    serde_json::to_string(unit).ok()
}

fn field_or(value: &Value, key: &str, fallback: Value) -> Value {
    value
        .get(key)
        .filter(|v| is_truthy(v))
        .cloned()
        .unwrap_or(fallback)
}

fn truthy_or_default(value: Option<&Value>, fallback: Option<&str>) -> Value {
    match value {
        Some(v) if is_truthy(v) => v.clone(),
        _ => fallback.map(|f| json!(f)).unwrap_or(Value::Null),
    }
}

fn resolve_email(item: &RawItem, defaults: &RecordDefaults) -> Value {
    if is_truthy(&item.email) {
        return item.email.clone();
    }
    defaults
        .email_for(&item.id)
        .map(Value::String)
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn sample_item() -> Value {
        json!({
            "id": "123456789",
            "name": "Website redesign",
            "created_at": "2023-01-01T00:00:00Z",
            "state": "active",
            "column_values": [
                {
                    "id": "status",
                    "type": "status",
                    "value": "{\"index\":1,\"label\":\"Working on it\",\"post_id\":null,\"changed_at\":\"2023-01-01T10:00:00Z\"}",
                    "text": "Working on it",
                    "column": { "title": "Status" }
                },
                {
                    "id": "numbers",
                    "type": "numbers",
                    "value": "\"1200\"",
                    "text": "1200",
                    "column": { "title": "Budget", "settings_str": "{\"unit\":\"USD\"}" }
                },
                {
                    "id": "color_17",
                    "type": "color",
                    "value": "{\"label\":\"Red\",\"index\":2}",
                    "text": "",
                    "column": { "title": "Priority" }
                },
                {
                    "id": "check",
                    "type": "checkbox",
                    "value": "{\"checked\":\"true\",\"changed_at\":\"t1\"}",
                    "text": "Done",
                    "column": { "title": "Approved" }
                },
                {
                    "id": "people",
                    "type": "people",
                    "value": "{\"personsAndTeams\":[{\"id\":1,\"kind\":\"person\"},{\"id\":2,\"kind\":\"team\"},{\"id\":3,\"kind\":\"person\"}]}",
                    "text": "Alice, Design, Bob",
                    "column": { "title": "Owners" }
                },
                {
                    "id": "creation_log",
                    "type": "creation_log",
                    "value": "{\"creator_id\":\"u42\",\"created_at\":\"2024-01-01\"}",
                    "text": "",
                    "column": { "title": "Created" }
                }
            ]
        })
    }

    fn transform(item: &Value) -> TransformedRecord {
        transform_item_at(item, &RecordDefaults::default(), fixed_now()).unwrap()
    }

    fn column<'a>(record: &'a TransformedRecord, id: &str) -> &'a TransformedColumnValue {
        record.column_values.iter().find(|c| c.id == id).unwrap()
    }

    #[test]
    fn test_identity_and_defaults() {
        let record = transform(&sample_item());
        assert_eq!(record.id, json!("123456789"));
        assert_eq!(record.name, json!("Website redesign"));
        assert_eq!(record.updated_at, "2024-06-01T12:00:00.000Z");
        assert_eq!(record.board.id, json!(DEFAULT_BOARD_ID));
        assert_eq!(record.group.id, json!(DEFAULT_GROUP_ID));
        assert_eq!(record.group.title, json!(DEFAULT_GROUP_TITLE));
        assert!(!record.group.deleted && !record.group.archived);
        assert_eq!(record.email, json!("item_123456789@monday.com"));
        assert!(record.assets.is_empty());
        assert!(record.subitems.is_empty());
        assert_eq!(record.parent_item, None);
    }

    #[test]
    fn test_item_fields_win_over_defaults() {
        let mut item = sample_item();
        item["board"] = json!({ "id": "555" });
        item["group"] = json!({ "id": "new_group", "title": "Inbox" });
        item["email"] = json!("pulse@example.com");

        let record = transform(&item);
        assert_eq!(record.board.id, json!("555"));
        assert_eq!(record.group.id, json!("new_group"));
        assert_eq!(record.group.title, json!("Inbox"));
        assert_eq!(record.email, json!("pulse@example.com"));
    }

    #[test]
    fn test_unset_defaults_give_null() {
        let record = transform_item_at(&sample_item(), &RecordDefaults::unset(), fixed_now()).unwrap();
        assert_eq!(record.board.id, Value::Null);
        assert_eq!(record.group.title, Value::Null);
        assert_eq!(record.email, Value::Null);
    }

    #[test]
    fn test_email_for_missing_id() {
        let defaults = RecordDefaults::default();
        assert_eq!(defaults.email_for(&Value::Null).as_deref(), Some("item_unknown@monday.com"));
        assert_eq!(defaults.email_for(&json!(77)).as_deref(), Some("item_77@monday.com"));
    }

    #[test]
    fn test_column_order_preserved() {
        let record = transform(&sample_item());
        let ids: Vec<&str> = record.column_values.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["status", "numbers", "color_17", "check", "people", "creation_log"]);
        let keys: Vec<&str> = record.mappable_column_values.keys().map(String::as_str).collect();
        assert_eq!(keys, ids);
    }

    #[test]
    fn test_status_additional_info() {
        let record = transform(&sample_item());
        let status = column(&record, "status");
        assert_eq!(status.title, json!("Status"));
        assert_eq!(
            status.additional_info.as_deref(),
            Some(r##"{"label":"Working on it","color":"#00c875","changed_at":"2023-01-01T10:00:00Z"}"##)
        );
        assert_eq!(record.mappable_column_values["status"], json!("Working on it"));
    }

    #[test]
    fn test_numbers_unit() {
        let record = transform(&sample_item());
        assert_eq!(column(&record, "numbers").additional_info.as_deref(), Some("\"USD\""));
        assert_eq!(record.mappable_column_values["numbers"], json!("1200"));
    }

    #[test]
    fn test_numbers_bad_settings_ignored() {
        let item = json!({
            "id": "1",
            "column_values": [
                { "id": "n1", "type": "numbers", "value": "5", "column": { "settings_str": "{not json" } },
                { "id": "n2", "type": "numbers", "value": "5", "column": { "settings_str": "{}" } },
                { "id": "n3", "type": "numbers", "value": "5" }
            ]
        });
        let record = transform(&item);
        assert!(record.column_values.iter().all(|c| c.additional_info.is_none()));
    }

    #[test]
    fn test_color_column_default() {
        let record = transform(&sample_item());
        let color = column(&record, "color_17");
        assert_eq!(
            color.additional_info.as_deref(),
            Some(r##"{"label":"Red","color":"#00c875","changed_at":""}"##)
        );
        assert_eq!(record.mappable_column_values["color_17"]["color"], "#00c875");
    }

    #[test]
    fn test_color_prefix_on_other_type() {
        let item = json!({
            "id": "1",
            "column_values": [{
                "id": "color_mkx",
                "type": "mystery",
                "value": { "label": "Blue", "color": "#0086c0", "changed_at": "t9" },
                "text": "Blue"
            }]
        });
        let record = transform(&item);
        assert_eq!(
            record.column_values[0].additional_info.as_deref(),
            Some(r##"{"label":"Blue","color":"#0086c0","changed_at":"t9"}"##)
        );
    }

    #[test]
    fn test_status_scalar_has_no_additional_info() {
        let item = json!({
            "id": "1",
            "column_values": [{ "id": "status", "type": "status", "value": "3", "text": "Done" }]
        });
        let record = transform(&item);
        assert!(record.column_values[0].additional_info.is_none());
        assert_eq!(record.mappable_column_values["status"], json!("Done"));
    }

    #[test]
    fn test_checkbox_and_people_mappable() {
        let record = transform(&sample_item());
        assert_eq!(record.mappable_column_values["check"], json!({ "checked": true, "text": "Done" }));
        let people = &record.mappable_column_values["people"];
        assert_eq!(people["persons_count"], 2);
        assert_eq!(people["teams_count"], 1);
        assert_eq!(people["text"], "Alice, Design, Bob");
    }

    #[test]
    fn test_creator_id_regardless_of_position() {
        let record = transform(&sample_item());
        assert_eq!(record.creator_id, json!("u42"));

        let mut item = sample_item();
        let columns = item["column_values"].as_array_mut().unwrap();
        columns.rotate_right(1);
        assert_eq!(columns[0]["id"], "creation_log");
        assert_eq!(transform(&item).creator_id, json!("u42"));
    }

    #[test]
    fn test_missing_creation_log() {
        let item = json!({ "id": "1", "column_values": [] });
        assert_eq!(transform(&item).creator_id, Value::Null);
    }

    #[test]
    fn test_duplicate_ids_last_wins() {
        let item = json!({
            "id": "1",
            "column_values": [
                { "id": "dup", "type": "text", "value": "\"first\"", "text": "first" },
                { "id": "dup", "type": "text", "value": "\"second\"", "text": "second" }
            ]
        });
        let record = transform(&item);
        assert_eq!(record.column_values.len(), 2);
        assert_eq!(record.mappable_column_values.len(), 1);
        assert_eq!(record.mappable_column_values["dup"], json!("second"));
    }

    #[test]
    fn test_bad_column_does_not_poison_record() {
        let item = json!({
            "id": "1",
            "column_values": [
                { "id": "people", "type": "people", "value": "{\"personsAndTeams\":\"oops\"}", "text": "?" },
                { "id": "text", "type": "text", "value": "\"fine\"", "text": "fine" }
            ]
        });
        let record = transform(&item);
        assert_eq!(record.mappable_column_values["people"], Value::Null);
        assert_eq!(record.mappable_column_values["text"], json!("fine"));
    }

    #[test]
    fn test_loosely_typed_column_fields_degrade_per_column() {
        let item = json!({
            "id": "1",
            "column_values": [
                { "id": "a", "type": "text", "text": "x", "value": "\"x\"", "column": { "title": 5 } },
                { "id": "b", "type": "text", "text": "y", "value": "\"y\"" },
                { "id": "c", "type": 7, "text": 12, "value": "{\"k\":1}" },
                { "id": "d", "type": "numbers", "value": "3", "column": { "settings_str": { "unit": "USD" } } }
            ]
        });
        let record = transform(&item);

        assert_eq!(record.column_values.len(), 4);
        assert_eq!(record.column_values[0].title, json!(5));
        assert_eq!(record.mappable_column_values["a"], json!("x"));
        assert_eq!(record.mappable_column_values["b"], json!("y"));

        // Untyped tag: value kept, parse degrades to null
        assert_eq!(record.column_values[2].text, Some(json!(12)));
        assert_eq!(record.mappable_column_values["c"], Value::Null);

        assert!(record.column_values[3].additional_info.is_none());
    }

    #[test]
    fn test_absent_column_keys_left_out() {
        let item = json!({ "id": "1", "column_values": [{ "id": "empty", "type": "text" }] });
        let out = serde_json::to_value(transform(&item)).unwrap();
        let column = &out["column_values"][0];

        assert!(column.get("value").is_none());
        assert!(column.get("text").is_none());
        assert_eq!(column["title"], "");
    }

    #[test]
    fn test_non_object_board_and_group_use_defaults() {
        let item = json!({ "id": "1", "board": "b-1", "group": 3 });
        let record = transform(&item);
        assert_eq!(record.board.id, json!(DEFAULT_BOARD_ID));
        assert_eq!(record.group.title, json!(DEFAULT_GROUP_TITLE));
    }

    #[test]
    fn test_transform_is_repeatable() {
        let item = sample_item();
        assert_eq!(transform(&item), transform(&item));

        let first = transform_item(&item, &RecordDefaults::default()).unwrap();
        let mut second = transform_item(&item, &RecordDefaults::default()).unwrap();
        second.updated_at = first.updated_at.clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_item_rejected() {
        let err = transform_item_at(&json!("not an item"), &RecordDefaults::default(), fixed_now())
            .unwrap_err();
        assert!(matches!(err, TransformError::MalformedInput(_)));

        let err = transform_item_at(
            &json!({ "column_values": [{ "type": "text" }] }),
            &RecordDefaults::default(),
            fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, TransformError::MalformedInput(_)));
    }

    #[test]
    fn test_serialized_shape() {
        let record = transform(&sample_item());
        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["parent_item"], Value::Null);
        assert_eq!(out["assets"], json!([]));
        assert!(out["column_values"][3].get("additional_info").is_none());
        assert_eq!(out["column_values"][1]["additional_info"], "\"USD\"");
    }
}
