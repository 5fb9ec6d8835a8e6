//! INSERT action compiler

use super::common::Action;
use super::state::ClauseState;
use crate::{Error, Result, Value};

/// Emit `INSERT INTO <table> (<columns>) VALUES (<placeholders>)` and bind the
/// assigned values in column order.
pub(crate) fn compile_insert(state: &ClauseState, params: &mut Vec<Value>) -> Result<String> {
    if state.values.is_empty() {
        return Err(Error::EmptyValues {
            action: Action::Insert,
        });
    }

    let columns: Vec<&str> = state.values.iter().map(|(column, _)| column.as_str()).collect();
    let placeholders = vec!["?"; columns.len()].join(", ");
    params.extend(state.values.iter().map(|(_, value)| value.clone()));

    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        state.table,
        columns.join(", "),
        placeholders
    ))
}

#[cfg(test)]
mod tests {
    use crate::{table, values, Action, Error, Value};
    use std::collections::HashMap;

    #[test]
    fn test_insert_builder() {
        let query = table("user")
            .value(values! { "name" => "shi", "age" => 1 })
            .compile(Action::Insert)
            .unwrap();
        assert_eq!(query.sql(), "INSERT INTO user (name, age) VALUES (?, ?)");
        assert_eq!(query.params(), &[Value::from("shi"), Value::from(1)]);
    }

    #[test]
    fn test_insert_from_hash_map_is_deterministic() {
        let mut data = HashMap::new();
        data.insert("name".to_string(), Value::from("John"));
        data.insert("age".to_string(), Value::from(30));

        let query = table("users").value(data).compile(Action::Insert).unwrap();
        assert_eq!(query.sql(), "INSERT INTO users (age, name) VALUES (?, ?)");
        assert_eq!(query.params(), &[Value::from(30), Value::from("John")]);
    }

    #[test]
    fn test_insert_ignores_decoration() {
        let query = table("users")
            .set("name", "John")
            .where_(("id", 1))
            .order_by_desc("id")
            .limit(3)
            .compile(Action::Insert)
            .unwrap();
        assert_eq!(query.sql(), "INSERT INTO users (name) VALUES (?)");
        assert_eq!(query.params().len(), 1);
    }

    #[test]
    fn test_insert_empty_data_fails() {
        let result = table("users").compile(Action::Insert);
        assert!(matches!(
            result,
            Err(Error::EmptyValues {
                action: Action::Insert
            })
        ));
    }
}
