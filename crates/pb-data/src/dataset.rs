//! Records and datasets produced by ingestion

use indexmap::IndexMap;
use serde::Serialize;

use crate::value::Value;

/// One row: an ordered mapping from field name to value.
///
/// Created once per input row and immutable afterwards; there is no API for
/// changing a field after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    pub fn new(fields: IndexMap<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// An ordered sequence of records.
///
/// Schema uniformity is assumed, not enforced: every record is expected to
/// expose the same field set in the same order, but nothing here checks it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
