//! SELECT action compiler

use super::state::ClauseState;
use crate::{Result, Value};

/// Emit `SELECT [DISTINCT] <columns> FROM <table>`. Binds nothing.
pub(crate) fn compile_select(state: &ClauseState, _params: &mut Vec<Value>) -> Result<String> {
    let mut sql = String::from("SELECT ");

    if state.distinct {
        sql.push_str("DISTINCT ");
    }

    if state.columns.is_empty() {
        sql.push('*');
    } else {
        let columns: Vec<String> = state.columns.iter().map(|c| c.to_sql()).collect();
        sql.push_str(&columns.join(", "));
    }

    sql.push_str(" FROM ");
    sql.push_str(&state.table);

    Ok(sql)
}
