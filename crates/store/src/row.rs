use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row as _, TypeInfo, ValueRef};

use crate::error::Result;

/// A result row keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    pub(crate) fn from_sqlite(row: &SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        let mut columns = Map::with_capacity(row.columns().len());

        for (idx, column) in row.columns().iter().enumerate() {
            let raw = row.try_get_raw(idx)?;
            let value = if raw.is_null() {
                Value::Null
            } else {
                let type_info = raw.type_info();
                match type_info.name() {
                    "INTEGER" => Value::from(row.try_get_unchecked::<i64, _>(idx)?),
                    "REAL" => serde_json::Number::from_f64(row.try_get_unchecked::<f64, _>(idx)?)
                        .map_or(Value::Null, Value::Number),
                    "BLOB" => Value::from(row.try_get_unchecked::<Vec<u8>, _>(idx)?),
                    _ => Value::String(row.try_get_unchecked::<String, _>(idx)?),
                }
            };
            columns.insert(column.name().to_string(), value);
        }

        Ok(Self(columns))
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Returns an integer column, if present and integral.
    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.0.get(column).and_then(Value::as_i64)
    }

    /// Decodes the row into a typed record.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.0.clone()))?)
    }

    pub fn into_json(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Row {
    fn from(columns: Map<String, Value>) -> Self {
        Self(columns)
    }
}
