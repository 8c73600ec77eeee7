//! Domain models for the Monday item normalizer.
//!
//! This module contains the wire structures used throughout the crate:
//!
//! - [`ColumnType`] - Column type tag (`status`, `people`, `color_*`, ...)
//! - [`RawItem`] / [`ColumnDescriptor`] - Items as delivered by the Monday API
//! - [`TransformedRecord`] / [`TransformedColumnValue`] - Normalized output

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::parser::is_truthy;

/// Color used when a status or color column carries no explicit color.
pub const DEFAULT_COLOR: &str = "#00c875";

// =============================================================================
// Column Type
// =============================================================================

/// Semantic kind of a column, as carried by the `type` field.
///
/// Unknown tags containing `color` map to [`ColumnType::Color`], every
/// other unknown tag to [`ColumnType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Status,
    Checkbox,
    LongText,
    Link,
    Date,
    Timeline,
    People,
    Dropdown,
    Tags,
    Email,
    Phone,
    File,
    BoardRelation,
    Dependency,
    Mirror,
    Location,
    Country,
    Rating,
    Vote,
    Hour,
    Week,
    WorldClock,
    TimeTracking,
    Formula,
    Button,
    LastUpdated,
    ItemId,
    Doc,
    Text,
    Numbers,
    CreationLog,
    /// `color` or any tag containing it (`color_picker`, `colorful`, ...).
    Color(String),
    /// Anything else; values pass through untouched.
    Other(String),
}

impl ColumnType {
    /// Every tag with a dedicated extraction rule, in display order.
    pub const KNOWN_TAGS: &'static [&'static str] = &[
        "status",
        "checkbox",
        "long_text",
        "link",
        "date",
        "timeline",
        "people",
        "dropdown",
        "tags",
        "email",
        "phone",
        "file",
        "board_relation",
        "dependency",
        "mirror",
        "location",
        "country",
        "rating",
        "vote",
        "hour",
        "week",
        "world_clock",
        "time_tracking",
        "formula",
        "button",
        "last_updated",
        "item_id",
        "doc",
        "text",
        "numbers",
        "creation_log",
        "color",
    ];

    /// Resolve a raw type tag.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "status" => Self::Status,
            "checkbox" => Self::Checkbox,
            "long_text" => Self::LongText,
            "link" => Self::Link,
            "date" => Self::Date,
            "timeline" => Self::Timeline,
            "people" => Self::People,
            "dropdown" => Self::Dropdown,
            "tags" => Self::Tags,
            "email" => Self::Email,
            "phone" => Self::Phone,
            "file" => Self::File,
            "board_relation" => Self::BoardRelation,
            "dependency" => Self::Dependency,
            "mirror" => Self::Mirror,
            "location" => Self::Location,
            "country" => Self::Country,
            "rating" => Self::Rating,
            "vote" => Self::Vote,
            "hour" => Self::Hour,
            "week" => Self::Week,
            "world_clock" => Self::WorldClock,
            "time_tracking" => Self::TimeTracking,
            "formula" => Self::Formula,
            "button" => Self::Button,
            "last_updated" => Self::LastUpdated,
            "item_id" => Self::ItemId,
            "doc" => Self::Doc,
            "text" => Self::Text,
            "numbers" => Self::Numbers,
            "creation_log" => Self::CreationLog,
            other if other.contains("color") => Self::Color(other.to_string()),
            other => Self::Other(other.to_string()),
        }
    }

    /// The tag string this type was resolved from.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Status => "status",
            Self::Checkbox => "checkbox",
            Self::LongText => "long_text",
            Self::Link => "link",
            Self::Date => "date",
            Self::Timeline => "timeline",
            Self::People => "people",
            Self::Dropdown => "dropdown",
            Self::Tags => "tags",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::File => "file",
            Self::BoardRelation => "board_relation",
            Self::Dependency => "dependency",
            Self::Mirror => "mirror",
            Self::Location => "location",
            Self::Country => "country",
            Self::Rating => "rating",
            Self::Vote => "vote",
            Self::Hour => "hour",
            Self::Week => "week",
            Self::WorldClock => "world_clock",
            Self::TimeTracking => "time_tracking",
            Self::Formula => "formula",
            Self::Button => "button",
            Self::LastUpdated => "last_updated",
            Self::ItemId => "item_id",
            Self::Doc => "doc",
            Self::Text => "text",
            Self::Numbers => "numbers",
            Self::CreationLog => "creation_log",
            Self::Color(tag) | Self::Other(tag) => tag,
        }
    }

    /// Types whose mappable value is the rendered text.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Text | Self::Numbers | Self::Formula | Self::ItemId)
    }
}

impl From<&str> for ColumnType {
    fn from(tag: &str) -> Self {
        Self::from_tag(tag)
    }
}

impl From<Option<&str>> for ColumnType {
    fn from(tag: Option<&str>) -> Self {
        Self::from_tag(tag.unwrap_or(""))
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Input Items
// =============================================================================

/// Column metadata nested under `column`.
///
/// Fields are kept as delivered; only a string `settings_str` is decoded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ColumnMeta {
    /// Column title shown on the board.
    #[serde(default)]
    pub title: Value,
    /// JSON-encoded column settings (carries `unit` for numbers columns).
    #[serde(default)]
    pub settings_str: Value,
}

/// One column value of an item.
///
/// Only `id` is typed strictly. `None` marks an absent key, which is left
/// out of the output; an explicit `null` is kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnDescriptor {
    pub id: String,
    /// Raw value: usually a JSON-encoded string, sometimes already decoded.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Text rendered by Monday.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub text: Option<Value>,
    /// Raw type tag.
    #[serde(default, rename = "type")]
    pub type_tag: Value,
    /// Non-object metadata is dropped.
    #[serde(default, deserialize_with = "object_meta")]
    pub column: Option<ColumnMeta>,
}

static NULL: Value = Value::Null;

impl ColumnDescriptor {
    /// Column type from the tag; a non-string tag resolves like a missing one.
    pub fn column_type(&self) -> ColumnType {
        ColumnType::from(self.type_tag.as_str())
    }

    /// A truthy tag that is not a string cannot select an extraction rule.
    pub fn has_dispatchable_tag(&self) -> bool {
        self.type_tag.is_string() || !is_truthy(&self.type_tag)
    }

    /// Raw value, `null` when absent.
    pub fn raw_value(&self) -> &Value {
        self.value.as_ref().unwrap_or(&NULL)
    }

    /// Rendered text, when truthy.
    pub fn rendered_text(&self) -> Option<&Value> {
        self.text.as_ref().filter(|t| is_truthy(t))
    }

    /// Column title, `""` when missing or falsy.
    pub fn title(&self) -> Value {
        self.column
            .as_ref()
            .map(|c| &c.title)
            .filter(|t| is_truthy(t))
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()))
    }

    pub fn settings_str(&self) -> Option<&str> {
        self.column.as_ref().and_then(|c| c.settings_str.as_str())
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn object_meta<'de, D>(deserializer: D) -> Result<Option<ColumnMeta>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        meta @ Value::Object(_) => serde_json::from_value(meta).ok(),
        _ => None,
    })
}

/// An item as returned by the Monday API.
///
/// `board` and `group` are kept loose: only their `id`/`title` keys are read.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawItem {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub created_at: Value,
    #[serde(default)]
    pub state: Value,
    #[serde(default)]
    pub email: Value,
    #[serde(default)]
    pub board: Value,
    #[serde(default)]
    pub group: Value,
    #[serde(default)]
    pub column_values: Option<Vec<ColumnDescriptor>>,
}

// =============================================================================
// Output Records
// =============================================================================

/// Board descriptor on the output record.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BoardInfo {
    pub id: Value,
}

/// Group descriptor on the output record.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GroupInfo {
    pub id: Value,
    pub title: Value,
    pub deleted: bool,
    pub archived: bool,
}

/// Auxiliary display data serialized into `additional_info`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdditionalInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Value>,
    pub color: Value,
    pub changed_at: Value,
}

/// One normalized column.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TransformedColumnValue {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Value>,
    pub title: Value,
    /// JSON string; only set for status, numbers with a unit, and `color_*` columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

/// A fully normalized item.
///
/// `assets`, `parent_item` and `subitems` are always empty: the source
/// items do not carry them.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TransformedRecord {
    pub id: Value,
    pub name: Value,
    pub created_at: Value,
    pub state: Value,
    pub email: Value,
    pub updated_at: String,
    pub board: BoardInfo,
    pub group: GroupInfo,
    pub assets: Vec<Value>,
    pub parent_item: Option<Value>,
    pub subitems: Vec<Value>,
    pub creator_id: Value,
    pub column_values: Vec<TransformedColumnValue>,
    pub mappable_column_values: Map<String, Value>,
}

// =============================================================================
// Tests
// =============================================================================
