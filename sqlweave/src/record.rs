//! Result rows

use crate::builder::IntoValues;
use crate::{Result, Value};
use serde::de::DeserializeOwned;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One result row: column name to [`Value`], in the order the driver returned
/// the columns.
///
/// Records are built by drivers. A column name that appears twice (for
/// example `id` from both sides of a join) keeps the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    columns: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut record = Self::new();
        for (column, value) in pairs {
            record.set(column, value);
        }
        record
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// The column's value, or `default` when the column is absent
    pub fn get_or(&self, column: &str, default: Value) -> Value {
        self.get(column).cloned().unwrap_or(default)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Set a column, replacing its value in place if already present
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.columns.push((column, value)),
        }
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        let index = self.columns.iter().position(|(name, _)| name == column)?;
        Some(self.columns.remove(index).1)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Value of the first column, used for single-cell queries
    pub fn into_first_value(self) -> Option<Value> {
        self.columns.into_iter().next().map(|(_, value)| value)
    }

    pub fn into_pairs(self) -> Vec<(String, Value)> {
        self.columns
    }

    /// JSON object view of the row
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .columns
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }

    /// Map the row onto a serde type by column name
    pub fn deserialize<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        Ok(serde_json::from_value(self.to_json())?)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl IntoValues for Record {
    fn into_values(self) -> Vec<(String, Value)> {
        self.columns
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, &value.to_json())?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{table, Action};
    use serde::Deserialize;

    fn sample() -> Record {
        Record::from_pairs(vec![
            ("id".to_string(), Value::I64(1)),
            ("name".to_string(), Value::from("shi")),
            ("nickname".to_string(), Value::Null),
        ])
    }

    #[test]
    fn test_lookup() {
        let record = sample();
        assert_eq!(record.get("name"), Some(&Value::from("shi")));
        assert_eq!(record.get("missing"), None);
        assert!(record.has_column("nickname"));
        assert_eq!(record.get_or("missing", Value::from(0)), Value::from(0));
        assert_eq!(record.len(), 3);
        assert_eq!(record.columns().collect::<Vec<_>>(), vec!["id", "name", "nickname"]);
    }

    #[test]
    fn test_duplicate_column_keeps_last_value() {
        let record: Record = vec![
            ("id".to_string(), Value::I64(1)),
            ("id".to_string(), Value::I64(2)),
        ]
        .into_iter()
        .collect();
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("id"), Some(&Value::I64(2)));
    }

    #[test]
    fn test_deserialize() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct User {
            id: i64,
            name: String,
            nickname: Option<String>,
        }

        let user: User = sample().deserialize().unwrap();
        assert_eq!(
            user,
            User {
                id: 1,
                name: "shi".to_string(),
                nickname: None
            }
        );
    }

    #[test]
    fn test_serialize_as_object() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json, serde_json::json!({"id": 1, "name": "shi", "nickname": null}));
    }

    #[test]
    fn test_record_can_be_inserted() {
        let mut record = sample();
        record.remove("id");
        let query = table("user_copy").value(record).compile(Action::Insert).unwrap();
        assert_eq!(query.sql(), "INSERT INTO user_copy (name, nickname) VALUES (?, ?)");
    }

    #[test]
    fn test_first_value() {
        assert_eq!(sample().into_first_value(), Some(Value::I64(1)));
        assert_eq!(Record::new().into_first_value(), None);
    }
}
