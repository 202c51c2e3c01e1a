// Immutable records keyed by their first column, plus a JSON view over a schema.
use std::hash::{Hash, Hasher};

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::core::schema::{ColumnKind, Schema};

#[derive(Clone, Debug)]
pub struct Record {
    values: Box<[String]>,
}

impl Record {
    /// `values[0]` is the primary key. Callers guarantee at least one value.
    pub fn new(values: Vec<String>) -> Self {
        Self {
            values: values.into_boxed_slice(),
        }
    }

    pub fn key(&self) -> &str {
        &self.values[0]
    }

    /// Panics when `index` is past the last column; see [`Record::get`].
    pub fn value(&self, index: usize) -> &str {
        &self.values[index]
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Serializes a record as `{column: value}`; integer columns become numbers.
pub struct RecordView<'a> {
    pub schema: &'a Schema,
    pub record: &'a Record,
}

impl Serialize for RecordView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.schema.len()))?;
        for (column, value) in self.schema.columns().iter().zip(self.record.values()) {
            match (column.kind, value.parse::<i64>()) {
                (ColumnKind::Integer, Ok(number)) => map.serialize_entry(&column.name, &number)?,
                _ => map.serialize_entry(&column.name, value)?,
            }
        }
        map.end()
    }
}
