//! Decoration compiler: JOIN, WHERE, GROUP BY, HAVING, ORDER BY, LIMIT/OFFSET
//!
//! Clauses are emitted in that fixed order no matter which order the builder
//! methods were called in. Parameters are appended in emission order so they
//! line up with the `?` placeholders.

use super::common::{JoinClause, OrderByClause, Predicate, WhereCondition};
use super::state::ClauseState;
use crate::operator::OperatorKind;
use crate::{Error, Operator, Result, Value};

pub(crate) fn compile_decoration(state: &ClauseState, params: &mut Vec<Value>) -> Result<String> {
    let mut sql = String::new();

    compile_joins(&state.joins, &mut sql)?;
    compile_conditions(" WHERE ", &state.wheres, &mut sql, params)?;

    if !state.group_by.is_empty() {
        sql.push_str(" GROUP BY ");
        sql.push_str(&state.group_by.join(", "));
    }

    compile_conditions(" HAVING ", &state.havings, &mut sql, params)?;
    compile_order_by(&state.order_by, &mut sql);

    match (state.limit, state.offset) {
        (Some(limit), Some(offset)) => {
            sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));
        }
        (Some(limit), None) => sql.push_str(&format!(" LIMIT {}", limit)),
        // SQLite and MySQL only accept OFFSET after a LIMIT; -1 means unbounded
        (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {}", offset)),
        (None, None) => {}
    }

    Ok(sql)
}

fn compile_joins(joins: &[JoinClause], sql: &mut String) -> Result<()> {
    for join in joins {
        if join.table.trim().is_empty() {
            return Err(Error::malformed_predicate(
                &join.table,
                format!("{} JOIN requires a table", join.join_type),
            ));
        }

        sql.push_str(&format!(" {} JOIN {}", join.join_type, join.table));

        let mut conditions = Vec::with_capacity(join.on_conditions.len());
        for condition in &join.on_conditions {
            if !condition.operator.is_valid()
                || condition.operator.kind() != OperatorKind::Comparison
            {
                return Err(Error::malformed_predicate(
                    &condition.left_column,
                    format!("operator '{}' cannot compare join columns", condition.operator),
                ));
            }
            conditions.push(format!(
                "{} {} {}",
                condition.left_column, condition.operator, condition.right_column
            ));
        }

        if !conditions.is_empty() {
            sql.push_str(" ON ");
            sql.push_str(&conditions.join(" AND "));
        }
    }
    Ok(())
}

fn compile_conditions(
    keyword: &str,
    conditions: &[WhereCondition],
    sql: &mut String,
    params: &mut Vec<Value>,
) -> Result<()> {
    for (i, condition) in conditions.iter().enumerate() {
        if i == 0 {
            sql.push_str(keyword);
        } else {
            sql.push_str(condition.connector.as_sql());
        }
        sql.push_str(&compile_predicate(&condition.predicate, params)?);
    }
    Ok(())
}

fn compile_predicate(predicate: &Predicate, params: &mut Vec<Value>) -> Result<String> {
    match predicate {
        Predicate::Compare {
            column,
            operator,
            value,
        } => compile_compare(column, operator, value, params),
        Predicate::Raw { sql, params: raw } => {
            if sql.trim().is_empty() {
                return Err(Error::malformed_predicate(sql, "raw expression is empty"));
            }
            let expected = count_placeholders(sql);
            if expected != raw.len() {
                return Err(Error::malformed_predicate(
                    sql,
                    format!("expected {} parameters, got {}", expected, raw.len()),
                ));
            }
            params.extend(raw.iter().cloned());
            Ok(format!("({})", sql))
        }
    }
}

fn compile_compare(
    column: &str,
    operator: &Operator,
    value: &Value,
    params: &mut Vec<Value>,
) -> Result<String> {
    if column.trim().is_empty() {
        return Err(Error::malformed_predicate(column, "column name is empty"));
    }
    if !operator.is_valid() {
        return Err(Error::malformed_predicate(
            column,
            format!("unknown operator '{}'", operator),
        ));
    }

    match operator.kind() {
        OperatorKind::Comparison => {
            if value.is_null() {
                // `col = NULL` never matches anything
                if *operator == Operator::EQ || *operator == Operator::IS {
                    return Ok(format!("{} IS NULL", column));
                }
                if *operator == Operator::NEQ || *operator == Operator::IS_NOT {
                    return Ok(format!("{} IS NOT NULL", column));
                }
            }
            if value.as_array().is_some() {
                return Err(Error::malformed_predicate(
                    column,
                    format!("operator '{}' cannot take a list of values", operator),
                ));
            }
            params.push(value.clone());
            Ok(format!("{} {} ?", column, operator))
        }
        OperatorKind::List => {
            let items = match value {
                Value::Array(items) => items.as_slice(),
                single => std::slice::from_ref(single),
            };
            if items.is_empty() {
                return Err(Error::malformed_predicate(
                    column,
                    format!("{} requires at least one value", operator),
                ));
            }
            let placeholders = vec!["?"; items.len()].join(", ");
            params.extend(items.iter().cloned());
            Ok(format!("{} {} ({})", column, operator, placeholders))
        }
        OperatorKind::Range => match value {
            Value::Array(bounds) if bounds.len() == 2 => {
                params.extend(bounds.iter().cloned());
                Ok(format!("{} {} ? AND ?", column, operator))
            }
            _ => Err(Error::malformed_predicate(
                column,
                format!("{} requires exactly two values", operator),
            )),
        },
        OperatorKind::Nullness if value.is_null() => Ok(format!("{} {}", column, operator)),
        OperatorKind::Nullness => Err(Error::malformed_predicate(
            column,
            format!("{} does not take a value", operator),
        )),
    }
}

fn compile_order_by(order_by: &[OrderByClause], sql: &mut String) {
    if order_by.is_empty() {
        return;
    }
    let parts: Vec<String> = order_by
        .iter()
        .map(|clause| format!("{} {}", clause.column, clause.direction))
        .collect();
    sql.push_str(" ORDER BY ");
    sql.push_str(&parts.join(", "));
}

/// Count `?` placeholders outside quoted literals and identifiers.
pub(crate) fn count_placeholders(sql: &str) -> usize {
    let mut count = 0;
    let mut quote: Option<char> = None;
    for ch in sql.chars() {
        match quote {
            // a doubled quote closes and reopens, which nets out the same
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None => match ch {
                '\'' | '"' | '`' => quote = Some(ch),
                '?' => count += 1,
                _ => {}
            },
        }
    }
    count
}
