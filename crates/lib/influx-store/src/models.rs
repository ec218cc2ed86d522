use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::schema::{COL_FIELD, COL_MEASUREMENT, COL_TIME, COL_VALUE};

/// A single decoded cell from a Flux result table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FluxValue {
    Null,
    Bool(bool),
    Long(i64),
    UnsignedLong(u64),
    Double(f64),
    String(String),
    Time(DateTime<FixedOffset>),
}

impl FluxValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(value) => Some(*value),
            Self::Long(value) => Some(*value as f64),
            Self::UnsignedLong(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_time(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Self::Time(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for FluxValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FluxValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for FluxValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<i64> for FluxValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<bool> for FluxValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<FixedOffset>> for FluxValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::Time(value)
    }
}

/// One result row flattened together with its table metadata columns.
///
/// Columns vary per measurement, so a record is keyed by column name rather
/// than by a fixed schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    values: BTreeMap<String, FluxValue>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: FluxValue) -> Option<FluxValue> {
        self.values.insert(column.into(), value)
    }

    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<FluxValue>) -> Self {
        self.insert(column, value.into());
        self
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&FluxValue> {
        self.values.get(column)
    }

    #[must_use]
    pub fn measurement(&self) -> Option<&str> {
        self.get(COL_MEASUREMENT).and_then(FluxValue::as_str)
    }

    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.get(COL_FIELD).and_then(FluxValue::as_str)
    }

    #[must_use]
    pub fn value(&self) -> Option<&FluxValue> {
        self.get(COL_VALUE)
    }

    #[must_use]
    pub fn time(&self) -> Option<&DateTime<FixedOffset>> {
        self.get(COL_TIME).and_then(FluxValue::as_time)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, FluxValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FluxValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Latest observed value for one field of a measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSnapshot {
    pub field: String,
    pub value: FluxValue,
    pub time: FluxValue,
}

impl FieldSnapshot {
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        Self {
            field: record.field().unwrap_or_default().to_string(),
            value: record.value().cloned().unwrap_or(FluxValue::Null),
            time: record.get(COL_TIME).cloned().unwrap_or(FluxValue::Null),
        }
    }
}

/// Per-field latest values for a measurement seen in the lookback window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementSummary {
    pub measurement: String,
    pub fields: Vec<FieldSnapshot>,
}
