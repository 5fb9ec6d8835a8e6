//! UPDATE action compiler

use super::common::Action;
use super::state::ClauseState;
use crate::{Error, Result, Value};

/// Emit `UPDATE <table> SET <col> = ?, ...` and bind values in assignment order.
pub(crate) fn compile_update(state: &ClauseState, params: &mut Vec<Value>) -> Result<String> {
    if state.values.is_empty() {
        return Err(Error::EmptyValues {
            action: Action::Update,
        });
    }

    let set_parts: Vec<String> = state
        .values
        .iter()
        .map(|(column, value)| {
            params.push(value.clone());
            format!("{} = ?", column)
        })
        .collect();

    Ok(format!("UPDATE {} SET {}", state.table, set_parts.join(", ")))
}
