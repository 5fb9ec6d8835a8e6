//! DELETE action compiler

use super::state::ClauseState;
use crate::{Result, Value};

pub(crate) fn compile_delete(state: &ClauseState, _params: &mut Vec<Value>) -> Result<String> {
    Ok(format!("DELETE FROM {}", state.table))
}

#[cfg(test)]
mod tests {
    use crate::{op, table, Action};

    #[test]
    fn test_delete_builder() {
        let query = table("users").where_(("age", op::LT, 18)).compile(Action::Delete).unwrap();
        assert_eq!(query.sql(), "DELETE FROM users WHERE age < ?");
        assert_eq!(query.params(), &[18.into()]);
    }

    #[test]
    fn test_delete_multiple_conditions() {
        let query = table("users")
            .where_(("age", op::LT, 18))
            .or_where(("status", "inactive"))
            .compile(Action::Delete)
            .unwrap();
        assert_eq!(query.sql(), "DELETE FROM users WHERE age < ? OR status = ?");
    }

    #[test]
    fn test_delete_without_where_is_allowed() {
        let query = table("sessions").compile(Action::Delete).unwrap();
        assert_eq!(query.sql(), "DELETE FROM sessions");
        assert!(query.params().is_empty());
    }

    #[test]
    fn test_delete_ignores_projection() {
        let query = table("users")
            .select(("id", "name"))
            .where_(("id", 3))
            .compile(Action::Delete)
            .unwrap();
        assert_eq!(query.sql(), "DELETE FROM users WHERE id = ?");
    }
}
