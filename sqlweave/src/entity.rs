//! Minimal ORM record: a typed column map bound to a table schema
//!
//! Column types are declared up front with [`FieldType`], which is what lets
//! [`Entity::set_intelligent`] turn raw strings (form input, CSV cells, ...)
//! into properly typed [`Value`]s.

use crate::builder::{IntoValues, QueryBuilder};
use crate::executor::Db;
use crate::record::Record;
use crate::{Error, Result, Value};
use std::sync::Arc;

/// Declared type of an entity field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    Int,
    Float,
    Text,
    Bytes,
    Json,
}

impl FieldType {
    /// Parse a raw string into a value of this type
    pub fn coerce(&self, column: &str, raw: &str) -> Result<Value> {
        let trimmed = raw.trim();
        match self {
            FieldType::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(Value::Bool(true)),
                "0" | "false" | "no" | "off" | "" => Ok(Value::Bool(false)),
                _ => Err(Error::invalid_value(
                    column,
                    format!("'{}' is not a boolean", raw),
                )),
            },
            FieldType::Int => trimmed.parse::<i64>().map(Value::I64).map_err(|e| {
                Error::invalid_value(column, format!("'{}' is not an integer: {}", raw, e))
            }),
            FieldType::Float => trimmed.parse::<f64>().map(Value::F64).map_err(|e| {
                Error::invalid_value(column, format!("'{}' is not a number: {}", raw, e))
            }),
            FieldType::Text => Ok(Value::String(raw.to_string())),
            FieldType::Bytes => Ok(Value::Bytes(raw.as_bytes().to_vec())),
            FieldType::Json => serde_json::from_str(raw)
                .map(Value::Json)
                .map_err(|e| Error::invalid_value(column, format!("invalid JSON: {}", e))),
        }
    }
}

/// Table name, primary key and declared fields of an entity type
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySchema {
    table: String,
    primary_key: String,
    fields: Vec<(String, FieldType)>,
}

impl EntitySchema {
    /// Schema for `table` with primary key `id` and no fields yet
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            primary_key: "id".to_string(),
            fields: Vec::new(),
        }
    }

    pub fn primary_key(mut self, column: &str) -> Self {
        self.primary_key = column.to_string();
        self
    }

    /// Declare a field; declaring the same name again changes its type
    pub fn field(mut self, column: &str, field_type: FieldType) -> Self {
        match self.fields.iter_mut().find(|(name, _)| name == column) {
            Some(slot) => slot.1 = field_type,
            None => self.fields.push((column.to_string(), field_type)),
        }
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn primary_key_column(&self) -> &str {
        &self.primary_key
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.field_type(column).is_some()
    }

    pub fn field_type(&self, column: &str) -> Option<FieldType> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, field_type)| *field_type)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// A query builder on this schema's table
    pub fn query(&self) -> QueryBuilder {
        QueryBuilder::new().table(&self.table)
    }

    /// Load the row whose primary key equals `id`
    pub fn find_by_pk<D, V>(self: &Arc<Self>, db: &D, id: V) -> Result<Option<Entity>>
    where
        D: Db,
        V: Into<Value>,
    {
        let record = self
            .query()
            .where_((self.primary_key.as_str(), id.into()))
            .find(db)?;

        Ok(record.map(|record| {
            let mut entity = Entity::new(Arc::clone(self));
            entity.original(record);
            entity
        }))
    }
}

/// A row of an [`EntitySchema`] table with change tracking
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    schema: Arc<EntitySchema>,
    data: Record,
    dirty: Vec<String>,
    loaded: bool,
}

impl Entity {
    pub fn new(schema: Arc<EntitySchema>) -> Self {
        Self {
            schema,
            data: Record::new(),
            dirty: Vec::new(),
            loaded: false,
        }
    }

    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.schema.has_column(column)
    }

    /// Set a declared column and mark it dirty when the value changes
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> Result<()> {
        if !self.has_column(column) {
            return Err(Error::unknown_column(&self.schema.table, column));
        }

        let value = value.into();
        if self.data.get(column) != Some(&value) {
            self.data.set(column, value);
            if !self.dirty.iter().any(|name| name == column) {
                self.dirty.push(column.to_string());
            }
        }
        Ok(())
    }

    /// Set a column from a raw string, converted by the field's declared type
    ///
    /// ```
    /// use std::sync::Arc;
    /// use sqlweave::{Entity, EntitySchema, FieldType, Value};
    ///
    /// let schema = Arc::new(EntitySchema::new("user").field("id", FieldType::Int));
    /// let mut user = Entity::new(schema);
    /// user.set_intelligent("id", "123").unwrap();
    /// assert_eq!(user.get("id"), Some(&Value::I64(123)));
    /// ```
    pub fn set_intelligent(&mut self, column: &str, raw: &str) -> Result<()> {
        let field_type = self
            .schema
            .field_type(column)
            .ok_or_else(|| Error::unknown_column(&self.schema.table, column))?;
        let value = field_type.coerce(column, raw)?;
        self.set(column, value)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.data.get(column)
    }

    pub fn get_or(&self, column: &str, default: Value) -> Value {
        self.data.get_or(column, default)
    }

    /// Set several columns. With `expected`, keys outside it are skipped.
    pub fn values<V>(&mut self, values: V, expected: Option<&[&str]>) -> Result<&mut Self>
    where
        V: IntoValues,
    {
        for (column, value) in values.into_values() {
            if let Some(expected) = expected {
                if !expected.contains(&column.as_str()) {
                    continue;
                }
            }
            self.set(&column, value)?;
        }
        Ok(self)
    }

    /// All current column values
    pub fn as_map(&self) -> &Record {
        &self.data
    }

    /// Replace the data with a persisted row and clear the dirty set
    pub fn original(&mut self, record: Record) -> &mut Self {
        self.data = record;
        self.dirty.clear();
        self.loaded = true;
        self
    }

    /// Columns changed since construction or the last [`original`](Self::original)
    pub fn dirty(&self) -> &[String] {
        &self.dirty
    }

    /// Changed columns with their current values, ready for `QueryBuilder::sets`
    pub fn dirty_values(&self) -> Vec<(String, Value)> {
        self.dirty
            .iter()
            .map(|column| (column.clone(), self.get_or(column, Value::Null)))
            .collect()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn pk(&self) -> Option<&Value> {
        self.data.get(&self.schema.primary_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::mock::MockDb;
    use crate::{values, Action};

    fn user_schema() -> Arc<EntitySchema> {
        Arc::new(
            EntitySchema::new("user")
                .field("id", FieldType::Int)
                .field("name", FieldType::Text)
                .field("active", FieldType::Bool)
                .field("score", FieldType::Float)
                .field("meta", FieldType::Json),
        )
    }

    #[test]
    fn test_coerce() {
        assert_eq!(FieldType::Int.coerce("id", " 42 ").unwrap(), Value::I64(42));
        assert_eq!(FieldType::Bool.coerce("a", "Yes").unwrap(), Value::Bool(true));
        assert_eq!(FieldType::Bool.coerce("a", "0").unwrap(), Value::Bool(false));
        assert_eq!(FieldType::Float.coerce("s", "1.5").unwrap(), Value::F64(1.5));
        assert_eq!(
            FieldType::Json.coerce("m", r#"{"k":1}"#).unwrap(),
            Value::Json(serde_json::json!({"k": 1}))
        );
        assert!(matches!(
            FieldType::Int.coerce("id", "abc"),
            Err(Error::InvalidValue { .. })
        ));
        assert!(matches!(
            FieldType::Bool.coerce("a", "maybe"),
            Err(Error::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_set_unknown_column() {
        let mut user = Entity::new(user_schema());
        let err = user.set("nickname", "x").unwrap_err();
        assert!(matches!(err, Error::UnknownColumn { ref table, ref column }
            if table == "user" && column == "nickname"));
        assert!(user.set_intelligent("nickname", "x").is_err());
    }

    #[test]
    fn test_set_intelligent_uses_declared_type() {
        let mut user = Entity::new(user_schema());
        user.set_intelligent("id", "7").unwrap();
        user.set_intelligent("active", "true").unwrap();
        user.set_intelligent("name", " Shi ").unwrap();
        assert_eq!(user.get("id"), Some(&Value::I64(7)));
        assert_eq!(user.get("active"), Some(&Value::Bool(true)));
        assert_eq!(user.get("name"), Some(&Value::from(" Shi ")));
        assert_eq!(user.dirty(), &["id", "active", "name"]);
    }

    #[test]
    fn test_values_with_expected_keys() {
        let mut user = Entity::new(user_schema());
        user.values(
            values! { "name" => "shi", "score" => 9.5, "id" => 3 },
            Some(&["name", "score"][..]),
        )
        .unwrap();
        assert_eq!(user.get("name"), Some(&Value::from("shi")));
        assert_eq!(user.get("id"), None);

        let result = user.values(values! { "password" => "x" }, None);
        assert!(matches!(result, Err(Error::UnknownColumn { .. })));
    }

    #[test]
    fn test_original_clears_dirty() {
        let mut user = Entity::new(user_schema());
        user.set("name", "shi").unwrap();
        assert!(!user.is_loaded());

        user.original(Record::from_pairs(vec![
            ("id".to_string(), Value::I64(1)),
            ("name".to_string(), Value::from("wang")),
        ]));
        assert!(user.is_loaded());
        assert!(user.dirty().is_empty());
        assert_eq!(user.pk(), Some(&Value::I64(1)));

        // unchanged value is not dirty
        user.set("name", "wang").unwrap();
        assert!(user.dirty().is_empty());

        user.set("name", "li").unwrap();
        assert_eq!(user.dirty_values(), vec![("name".to_string(), Value::from("li"))]);
        assert_eq!(user.get_or("score", Value::F64(0.0)), Value::F64(0.0));
        assert_eq!(user.as_map().len(), 2);
    }

    #[test]
    fn test_dirty_values_feed_update() {
        let schema = user_schema();
        let mut user = Entity::new(Arc::clone(&schema));
        user.original(Record::from_pairs(vec![("id".to_string(), Value::I64(5))]));
        user.set("name", "wang").unwrap();

        let query = schema
            .query()
            .sets(user.dirty_values())
            .where_(("id", user.get_or("id", Value::Null)))
            .compile(Action::Update)
            .unwrap();
        assert_eq!(query.sql(), "UPDATE user SET name = ? WHERE id = ?");
    }

    #[test]
    fn test_find_by_pk() {
        let schema = user_schema();
        let db = MockDb::new().with_rows(vec![Record::from_pairs(vec![
            ("id".to_string(), Value::I64(5)),
            ("name".to_string(), Value::from("shi")),
        ])]);

        let user = schema.find_by_pk(&db, 5).unwrap().unwrap();
        assert!(user.is_loaded());
        assert_eq!(user.get("name"), Some(&Value::from("shi")));
        assert_eq!(
            db.statements()[0].0,
            "SELECT * FROM user WHERE id = ? LIMIT 1"
        );

        let empty = MockDb::new();
        assert!(schema.find_by_pk(&empty, 6).unwrap().is_none());
    }

    #[test]
    fn test_custom_primary_key() {
        let schema = EntitySchema::new("session")
            .primary_key("token")
            .field("token", FieldType::Text);
        assert_eq!(schema.primary_key_column(), "token");
        assert_eq!(schema.columns().collect::<Vec<_>>(), vec!["token"]);
    }
}
