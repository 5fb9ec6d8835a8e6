//! Clause fragments accumulated by [`QueryBuilder`](super::QueryBuilder)
//!
//! Nothing in here produces SQL. Fragments are stored in call order and only
//! arranged into statement order by the compilers.

use super::common::{
    Column, JoinClause, OrderByClause, Predicate, WhereCondition, WhereConnector,
};
use crate::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClauseState {
    pub table: String,
    pub distinct: bool,
    pub columns: Vec<Column>,
    /// Column assignments, unique by column, in first-assignment order
    pub values: Vec<(String, Value)>,
    pub wheres: Vec<WhereCondition>,
    pub joins: Vec<JoinClause>,
    pub group_by: Vec<String>,
    pub havings: Vec<WhereCondition>,
    pub order_by: Vec<OrderByClause>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl ClauseState {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            ..Self::default()
        }
    }

    /// Assign a column, replacing an earlier assignment of the same column in place
    pub fn assign(&mut self, column: String, value: Value) {
        match self.values.iter_mut().find(|(existing, _)| *existing == column) {
            Some(slot) => slot.1 = value,
            None => self.values.push((column, value)),
        }
    }

    pub fn push_where(&mut self, predicate: Predicate, connector: WhereConnector) {
        self.wheres.push(WhereCondition {
            predicate,
            connector,
        });
    }

    pub fn push_having(&mut self, predicate: Predicate, connector: WhereConnector) {
        self.havings.push(WhereCondition {
            predicate,
            connector,
        });
    }
}
