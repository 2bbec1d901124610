//! Item data model: the unit record of a collection and its lifecycle status.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::connector::Record;
use crate::error::ActionError;

/// Field inside a backend record that carries the item identifier.
pub const ID_FIELD: &str = "_id";

/// Reserved identifier value for items whose backend id is not yet known.
pub const UNKNOWN_ID: &str = "unknown";

/// Opaque item identifier.
///
/// Backends issue numeric or string ids, so the raw JSON value is kept as-is.
/// The string `"unknown"` is reserved for placeholders created by optimistic
/// creation before the backend has assigned a real id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ItemId(Value);

impl ItemId {
    /// The reserved sentinel for a not-yet-assigned identifier.
    pub fn unknown() -> Self {
        Self(Value::String(UNKNOWN_ID.to_owned()))
    }

    /// Extracts the identifier from a backend record, falling back to the
    /// unknown sentinel when the record carries no id field.
    pub fn of(record: &Record) -> Self {
        record.get(ID_FIELD).cloned().map_or_else(Self::unknown, Self)
    }

    /// Whether this id is the unassigned-placeholder sentinel.
    pub fn is_unknown(&self) -> bool {
        matches!(&self.0, Value::String(s) if s == UNKNOWN_ID)
    }

    /// The raw JSON value of the identifier.
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for ItemId {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<i64> for ItemId {
    fn from(value: i64) -> Self {
        Self(Value::from(value))
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_owned()))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Strings render without the JSON quotes.
        match &self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{other}"),
        }
    }
}

/// Lifecycle status of a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemStatus {
    /// An optimistic placeholder awaiting backend confirmation.
    Creating,
    /// A detail fetch for this item is in flight.
    Loading,
    /// A patch for this item is in flight.
    Patching,
    Ready,
    /// The last operation on this item failed; `data` holds the last good
    /// representation and `errors` what went wrong.
    Errored,
}

/// Unit record of a collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub id: ItemId,
    pub status: ItemStatus,
    /// Last known server/client representation.
    pub data: Record,
    /// Ordered item-scoped error log.
    pub errors: Vec<ActionError>,
}

impl Item {
    /// Builds an item from a backend record, extracting the id from its
    /// `_id` field.
    pub fn from_record(record: &Record, status: ItemStatus) -> Self {
        Self {
            id: ItemId::of(record),
            status,
            data: record.clone(),
            errors: Vec::new(),
        }
    }

    /// Shallow field merge: entries in `fields` win over existing data.
    pub fn merge_data(&mut self, fields: &Record) {
        for (key, value) in fields {
            self.data.insert(key.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::connector::record;

    #[test]
    fn id_extraction_prefers_the_id_field() {
        let item = Item::from_record(&record(json!({ "_id": 7, "name": "x" })), ItemStatus::Ready);
        assert_eq!(item.id, ItemId::from(7));
        assert!(!item.id.is_unknown());
    }

    #[test]
    fn missing_id_falls_back_to_the_sentinel() {
        let item = Item::from_record(&record(json!({ "name": "x" })), ItemStatus::Ready);
        assert!(item.id.is_unknown());
        assert_eq!(item.id.to_string(), "unknown");
    }

    #[test]
    fn merge_is_shallow_and_last_write_wins() {
        let mut item = Item::from_record(
            &record(json!({ "_id": 1, "name": "first", "kept": true })),
            ItemStatus::Ready,
        );
        item.merge_data(&record(json!({ "name": "renamed", "added": 2 })));
        assert_eq!(
            item.data,
            record(json!({ "_id": 1, "name": "renamed", "kept": true, "added": 2 }))
        );
    }
}
