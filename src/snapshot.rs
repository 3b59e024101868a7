//! Device snapshot types
//!
//! A [`DeviceSnapshot`] holds the four record groups returned by the router.
//! Each [`Record`] is a flat mapping of field name to [`FieldValue`]; lookups
//! of absent fields yield [`FieldValue::Null`], which normalizes to zero.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw value of a single device field
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Field absent or empty element
    #[default]
    Null,
    /// Numeric value as delivered by the client
    Number(f64),
    /// Textual value, possibly with a unit suffix
    Text(String),
}

impl FieldValue {
    /// Text form of the value, `None` for [`FieldValue::Null`]
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Text(s) => Some(s.clone()),
        }
    }

    /// Whether the value carries no data
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

/// One record group as returned by a single device read
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

static NULL: FieldValue = FieldValue::Null;

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Look up a field; absent fields read as [`FieldValue::Null`]
    pub fn get(&self, field: &str) -> &FieldValue {
        self.fields.get(field).unwrap_or(&NULL)
    }

    /// Text of a field, empty string when absent
    pub fn text(&self, field: &str) -> String {
        self.get(field).as_text().unwrap_or_default()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// The four record groups a router exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Signal,
    TrafficStatistics,
    Notifications,
    DeviceInformation,
}

/// Last-known-good copy of all four record groups
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub signal: Record,
    pub traffic_statistics: Record,
    pub notifications: Record,
    pub device_information: Record,
}

impl DeviceSnapshot {
    /// Borrow the record for a group
    pub fn group(&self, group: Group) -> &Record {
        match group {
            Group::Signal => &self.signal,
            Group::TrafficStatistics => &self.traffic_statistics,
            Group::Notifications => &self.notifications,
            Group::DeviceInformation => &self.device_information,
        }
    }

    /// True until the first successful fetch
    pub fn is_empty(&self) -> bool {
        self.signal.is_empty()
            && self.traffic_statistics.is_empty()
            && self.notifications.is_empty()
            && self.device_information.is_empty()
    }
}
