//! Canonical shapes produced by the column value parser.
//!
//! One struct per column type. Fields absent from the source object are
//! left out of the serialized shape; explicit nulls are kept.

use serde::Serialize;
use serde_json::{json, Map, Value};

use super::{display_string, is_truthy};
use crate::error::{ColumnParseError, ColumnParseResult};
use crate::models::DEFAULT_COLOR;

/// Parsed column value, discriminated by column type.
///
/// Serializes as the inner shape with no tag.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ParsedValue {
    CreationLog(CreationLogValue),
    Status(StatusValue),
    Checkbox(CheckboxValue),
    LongText(LongTextValue),
    Link(LinkValue),
    Date(DateValue),
    Timeline(TimelineValue),
    People(PeopleValue),
    Dropdown(DropdownValue),
    Tags(TagsValue),
    Email(EmailValue),
    Phone(PhoneValue),
    File(FileValue),
    /// `board_relation` and `dependency` share a shape.
    LinkedItems(LinkedItemsValue),
    Mirror(MirrorValue),
    Location(LocationValue),
    Country(CountryValue),
    Rating(RatingValue),
    Vote(VoteValue),
    Hour(HourValue),
    Week(WeekValue),
    WorldClock(WorldClockValue),
    TimeTracking(TimeTrackingValue),
    Button(ButtonValue),
    LastUpdated(LastUpdatedValue),
    Doc(DocValue),
    Color(ColorValue),
    /// Decoded value returned unchanged (text, numbers, formula, unknown tags).
    Raw(Value),
}

impl ParsedValue {
    /// JSON form of the canonical shape.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Whether the canonical shape is a JSON object.
    pub fn is_object(&self) -> bool {
        match self {
            ParsedValue::Raw(value) => value.is_object(),
            _ => true,
        }
    }
}

// =============================================================================
// Field helpers
// =============================================================================

/// Copy a field if present (explicit null included).
fn pick(obj: &Map<String, Value>, key: &str) -> Option<Value> {
    obj.get(key).cloned()
}

/// `obj[key]` when truthy, otherwise `fallback`.
fn truthy_or(obj: &Map<String, Value>, key: &str, fallback: Value) -> Value {
    match obj.get(key) {
        Some(value) if is_truthy(value) => value.clone(),
        _ => fallback,
    }
}

// =============================================================================
// Shapes
// =============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreationLogValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<Value>,
}

impl CreationLogValue {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            created_at: pick(obj, "created_at"),
            creator_id: pick(obj, "creator_id"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<Value>,
}

impl StatusValue {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            label: pick(obj, "label"),
            index: pick(obj, "index"),
            post_id: pick(obj, "post_id"),
            changed_at: pick(obj, "changed_at"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CheckboxValue {
    pub checked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<Value>,
}

impl CheckboxValue {
    /// `checked` is stored either as the string `"true"` or as a boolean.
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        let checked = match obj.get("checked") {
            Some(Value::Bool(checked)) => *checked,
            Some(Value::String(s)) => s == "true",
            _ => false,
        };
        Self {
            checked,
            changed_at: pick(obj, "changed_at"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LongTextValue {
    pub text: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<Value>,
}

impl LongTextValue {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            text: truthy_or(obj, "text", json!("")),
            changed_at: Some(truthy_or(obj, "changed_at", json!(""))),
        }
    }

    /// Legacy encoding: the value is the text itself.
    pub fn from_scalar(value: &Value) -> Self {
        Self {
            text: Value::String(display_string(value)),
            changed_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LinkValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<Value>,
}

impl LinkValue {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            url: pick(obj, "url"),
            text: pick(obj, "text"),
            changed_at: pick(obj, "changed_at"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DateValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<Value>,
}

impl DateValue {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            date: pick(obj, "date"),
            time: pick(obj, "time"),
            changed_at: pick(obj, "changed_at"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimelineValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visualization_type: Option<Value>,
}

impl TimelineValue {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            from: pick(obj, "from"),
            to: pick(obj, "to"),
            changed_at: pick(obj, "changed_at"),
            visualization_type: pick(obj, "visualization_type"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PeopleValue {
    #[serde(rename = "personsAndTeams")]
    pub persons_and_teams: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<Value>,
    pub persons_count: usize,
    pub teams_count: usize,
}

impl PeopleValue {
    /// Counts members by their `kind` discriminator.
    ///
    /// Fails when `personsAndTeams` is set but not a list, or holds a null.
    pub fn from_object(obj: &Map<String, Value>) -> ColumnParseResult<Self> {
        let persons_and_teams = truthy_or(obj, "personsAndTeams", json!([]));
        let members = persons_and_teams
            .as_array()
            .ok_or_else(|| invalid_people("expected a list"))?;

        let mut persons_count = 0;
        let mut teams_count = 0;
        for member in members {
            let kind = match member {
                Value::Null => return Err(invalid_people("null member")),
                Value::Object(m) => m.get("kind").and_then(Value::as_str),
                _ => None,
            };
            match kind {
                Some("person") => persons_count += 1,
                Some("team") => teams_count += 1,
                _ => {}
            }
        }

        Ok(Self {
            persons_and_teams,
            changed_at: pick(obj, "changed_at"),
            persons_count,
            teams_count,
        })
    }
}

fn invalid_people(message: &str) -> ColumnParseError {
    ColumnParseError::InvalidField {
        column_type: "people".to_string(),
        field: "personsAndTeams",
        message: message.to_string(),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DropdownValue {
    pub ids: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<Value>,
}

impl DropdownValue {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            ids: truthy_or(obj, "ids", json!([])),
            changed_at: pick(obj, "changed_at"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TagsValue {
    pub tag_ids: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<Value>,
}

impl TagsValue {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            tag_ids: truthy_or(obj, "tag_ids", json!([])),
            changed_at: pick(obj, "changed_at"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmailValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<Value>,
}

impl EmailValue {
    /// `text` falls back to the address itself.
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        let text = match obj.get("text") {
            Some(text) if is_truthy(text) => Some(text.clone()),
            _ => pick(obj, "email"),
        };
        Self {
            email: pick(obj, "email"),
            text,
            changed_at: pick(obj, "changed_at"),
        }
    }

    /// Legacy encoding: the value is the bare address.
    pub fn from_scalar(value: &Value) -> Self {
        let address = Value::String(display_string(value));
        Self {
            email: Some(address.clone()),
            text: Some(address),
            changed_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PhoneValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Value>,
    #[serde(rename = "countryShortName", skip_serializing_if = "Option::is_none")]
    pub country_short_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<Value>,
}

impl PhoneValue {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            phone: pick(obj, "phone"),
            country_short_name: pick(obj, "countryShortName"),
            changed_at: pick(obj, "changed_at"),
        }
    }

    /// Legacy encoding: the value is the bare number.
    pub fn from_scalar(value: &Value) -> Self {
        Self {
            phone: Some(Value::String(display_string(value))),
            country_short_name: None,
            changed_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FileValue {
    pub files: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<Value>,
}

impl FileValue {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            files: truthy_or(obj, "files", json!([])),
            changed_at: pick(obj, "changed_at"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LinkedItemsValue {
    #[serde(rename = "linkedPulseIds")]
    pub linked_pulse_ids: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<Value>,
}

impl LinkedItemsValue {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            linked_pulse_ids: truthy_or(obj, "linkedPulseIds", json!([])),
            changed_at: pick(obj, "changed_at"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MirrorValue {
    #[serde(rename = "linkedPulseId", skip_serializing_if = "Option::is_none")]
    pub linked_pulse_id: Option<Value>,
    #[serde(rename = "linkedPulseColumnId", skip_serializing_if = "Option::is_none")]
    pub linked_pulse_column_id: Option<Value>,
}

impl MirrorValue {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            linked_pulse_id: pick(obj, "linkedPulseId"),
            linked_pulse_column_id: pick(obj, "linkedPulseColumnId"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LocationValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<Value>,
}

impl LocationValue {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            address: pick(obj, "address"),
            lat: pick(obj, "lat"),
            lng: pick(obj, "lng"),
            changed_at: pick(obj, "changed_at"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CountryValue {
    #[serde(rename = "countryCode", skip_serializing_if = "Option::is_none")]
    pub country_code: Option<Value>,
    #[serde(rename = "countryName", skip_serializing_if = "Option::is_none")]
    pub country_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<Value>,
}

impl CountryValue {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            country_code: pick(obj, "countryCode"),
            country_name: pick(obj, "countryName"),
            changed_at: pick(obj, "changed_at"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RatingValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<Value>,
}

impl RatingValue {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            rating: pick(obj, "rating"),
            changed_at: pick(obj, "changed_at"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VoteValue {
    pub votes: Value,
    pub voters: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<Value>,
}

impl VoteValue {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            votes: truthy_or(obj, "votes", json!([])),
            voters: truthy_or(obj, "voters", json!([])),
            changed_at: pick(obj, "changed_at"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HourValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minute: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<Value>,
}

impl HourValue {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            hour: pick(obj, "hour"),
            minute: pick(obj, "minute"),
            changed_at: pick(obj, "changed_at"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeekValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<Value>,
    #[serde(rename = "startDate", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Value>,
    #[serde(rename = "endDate", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<Value>,
}

impl WeekValue {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            week: pick(obj, "week"),
            start_date: pick(obj, "startDate"),
            end_date: pick(obj, "endDate"),
            changed_at: pick(obj, "changed_at"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorldClockValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<Value>,
}

impl WorldClockValue {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            timezone: pick(obj, "timezone"),
            changed_at: pick(obj, "changed_at"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimeTrackingValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Value>,
    #[serde(rename = "startDate", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<Value>,
}

impl TimeTrackingValue {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            duration: pick(obj, "duration"),
            start_date: pick(obj, "startDate"),
            status: pick(obj, "status"),
            changed_at: pick(obj, "changed_at"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ButtonValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Value>,
}

impl ButtonValue {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            label: pick(obj, "label"),
            color: pick(obj, "color"),
            url: pick(obj, "url"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LastUpdatedValue {
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updater: Option<Value>,
}

impl LastUpdatedValue {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            updated_at: pick(obj, "updatedAt"),
            updater: pick(obj, "updater"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DocValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<Value>,
}

impl DocValue {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            file_id: pick(obj, "file_id"),
            changed_at: pick(obj, "changed_at"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ColorValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<Value>,
    pub changed_at: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Value>,
    pub color: Value,
}

impl ColorValue {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            index: pick(obj, "index"),
            post_id: pick(obj, "post_id"),
            changed_at: truthy_or(obj, "changed_at", json!("")),
            label: pick(obj, "label"),
            color: truthy_or(obj, "color", json!(DEFAULT_COLOR)),
        }
    }
}
