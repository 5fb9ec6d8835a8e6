//! The query builder facade and compiled statements

use super::common::{
    Action, Column, IntoColumns, IntoCondition, IntoSelection, IntoValues, JoinClause,
    JoinCondition, JoinType, OrderByClause, Predicate, SortDirection, WhereConnector,
};
use super::decoration::{compile_decoration, count_placeholders};
use super::state::ClauseState;
use super::{delete, insert, select, update};
use crate::executor::Db;
use crate::record::Record;
use crate::{Error, IntoOperator, Operator, Result, Value};
use serde::de::DeserializeOwned;
use std::fmt;

/// A SQL statement and the parameters bound to its `?` placeholders, in order
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    action: Action,
    sql: String,
    params: Vec<Value>,
}

impl CompiledQuery {
    pub fn action(&self) -> Action {
        self.action
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Number of `?` placeholders in the SQL text; always equals `params().len()`
    pub fn placeholder_count(&self) -> usize {
        count_placeholders(&self.sql)
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql)
    }
}

/// Deferred SQL builder
///
/// Builder methods only record clause fragments, in any order, and never
/// fail. SQL is generated when a terminal operation ([`find`](Self::find),
/// [`find_all`](Self::find_all), [`count`](Self::count), [`insert`](Self::insert),
/// [`update`](Self::update), [`delete`](Self::delete)) picks the statement kind,
/// or when [`compile`](Self::compile) is called directly.
///
/// # Examples
///
/// ```
/// use sqlweave::{op, table, Action};
///
/// let query = table("users")
///     .where_(("age", op::GT, 18))
///     .order_by_desc("created_at")
///     .limit(10)
///     .compile(Action::Select)
///     .unwrap();
///
/// assert_eq!(
///     query.sql(),
///     "SELECT * FROM users WHERE age > ? ORDER BY created_at DESC LIMIT 10"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBuilder {
    state: ClauseState,
}

impl QueryBuilder {
    /// Create a builder with no table; compiling it fails until [`table`](Self::table) is set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, name: &str) -> Self {
        self.state.table = name.to_string();
        self
    }

    /// Add columns to the projection. An empty projection selects `*`.
    pub fn select<T>(mut self, columns: T) -> Self
    where
        T: IntoSelection,
    {
        self.state.columns.extend(columns.into_selection());
        self
    }

    pub fn select_as(mut self, expr: &str, alias: &str) -> Self {
        self.state.columns.push(Column::new(expr).as_alias(alias));
        self
    }

    /// Clear the projection back to `*`
    pub fn select_all(mut self) -> Self {
        self.state.columns.clear();
        self
    }

    pub fn distinct(mut self) -> Self {
        self.state.distinct = true;
        self
    }

    /// Add a WHERE condition, AND-combined with earlier ones
    ///
    /// ```
    /// use sqlweave::{op, table, Action};
    ///
    /// let query = table("user")
    ///     .where_(("id", "=", 5))
    ///     .where_(("age", op::GTE, 18))
    ///     .compile(Action::Select)
    ///     .unwrap();
    /// assert_eq!(query.sql(), "SELECT * FROM user WHERE id = ? AND age >= ?");
    /// ```
    pub fn where_<C>(self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.push_condition(condition, WhereConnector::And)
    }

    pub fn and_where<C>(self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.push_condition(condition, WhereConnector::And)
    }

    pub fn or_where<C>(self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.push_condition(condition, WhereConnector::Or)
    }

    pub fn where_null(self, column: &str) -> Self {
        self.where_((column, Operator::IS_NULL, Value::Null))
    }

    pub fn where_not_null(self, column: &str) -> Self {
        self.where_((column, Operator::IS_NOT_NULL, Value::Null))
    }

    /// `column IN (?, ?, ...)`, one placeholder per element
    pub fn where_in<V>(self, column: &str, values: V) -> Self
    where
        V: Into<Value>,
    {
        self.where_((column, Operator::IN, values))
    }

    pub fn where_not_in<V>(self, column: &str, values: V) -> Self
    where
        V: Into<Value>,
    {
        self.where_((column, Operator::NOT_IN, values))
    }

    pub fn where_between<L, H>(self, column: &str, low: L, high: H) -> Self
    where
        L: Into<Value>,
        H: Into<Value>,
    {
        let bounds = Value::Array(vec![low.into(), high.into()]);
        self.where_((column, Operator::BETWEEN, bounds))
    }

    /// Add a hand-written condition. It is wrapped in parentheses and its
    /// `?` count must match `params`.
    pub fn where_raw(mut self, sql: &str, params: Vec<Value>) -> Self {
        self.state.push_where(raw(sql, params), WhereConnector::And);
        self
    }

    pub fn or_where_raw(mut self, sql: &str, params: Vec<Value>) -> Self {
        self.state.push_where(raw(sql, params), WhereConnector::Or);
        self
    }

    /// Assign column values for INSERT or UPDATE
    ///
    /// Assigning a column twice keeps its first position and the last value.
    pub fn value<V>(mut self, values: V) -> Self
    where
        V: IntoValues,
    {
        for (column, value) in values.into_values() {
            self.state.assign(column, value);
        }
        self
    }

    /// Alias of [`value`](Self::value) that reads better for UPDATE
    pub fn sets<V>(self, values: V) -> Self
    where
        V: IntoValues,
    {
        self.value(values)
    }

    pub fn set<V>(mut self, column: &str, value: V) -> Self
    where
        V: Into<Value>,
    {
        self.state.assign(column.to_string(), value.into());
        self
    }

    /// Add a join comparing two columns
    pub fn join<O>(
        mut self,
        join_type: JoinType,
        table: &str,
        left_column: &str,
        operator: O,
        right_column: &str,
    ) -> Self
    where
        O: IntoOperator,
    {
        self.state.joins.push(JoinClause {
            join_type,
            table: table.to_string(),
            on_conditions: vec![JoinCondition {
                left_column: left_column.to_string(),
                operator: operator.into_operator(),
                right_column: right_column.to_string(),
            }],
        });
        self
    }

    pub fn inner_join(self, table: &str, left_column: &str, right_column: &str) -> Self {
        self.join(JoinType::Inner, table, left_column, Operator::EQ, right_column)
    }

    pub fn left_join(self, table: &str, left_column: &str, right_column: &str) -> Self {
        self.join(JoinType::Left, table, left_column, Operator::EQ, right_column)
    }

    pub fn right_join(self, table: &str, left_column: &str, right_column: &str) -> Self {
        self.join(JoinType::Right, table, left_column, Operator::EQ, right_column)
    }

    pub fn cross_join(mut self, table: &str) -> Self {
        self.state.joins.push(JoinClause {
            join_type: JoinType::Cross,
            table: table.to_string(),
            on_conditions: Vec::new(),
        });
        self
    }

    /// Append GROUP BY columns
    pub fn group_by<C>(mut self, columns: C) -> Self
    where
        C: IntoColumns,
    {
        self.state.group_by.extend(columns.into_columns());
        self
    }

    pub fn having<C>(mut self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.state.push_having(compare(condition), WhereConnector::And);
        self
    }

    pub fn or_having<C>(mut self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.state.push_having(compare(condition), WhereConnector::Or);
        self
    }

    pub fn having_raw(mut self, sql: &str, params: Vec<Value>) -> Self {
        self.state.push_having(raw(sql, params), WhereConnector::And);
        self
    }

    pub fn order_by(mut self, column: &str, direction: SortDirection) -> Self {
        self.state.order_by.push(OrderByClause {
            column: column.to_string(),
            direction,
        });
        self
    }

    pub fn order_by_asc(self, column: &str) -> Self {
        self.order_by(column, SortDirection::Asc)
    }

    pub fn order_by_desc(self, column: &str) -> Self {
        self.order_by(column, SortDirection::Desc)
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.state.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.state.offset = Some(offset);
        self
    }

    /// Set LIMIT/OFFSET for a 1-based page number. Page 0 is treated as page 1.
    pub fn page(self, page: u64, per_page: u64) -> Self {
        let skip = page.saturating_sub(1).saturating_mul(per_page);
        self.limit(per_page).offset(skip)
    }

    /// Fragments recorded so far
    pub fn state(&self) -> &ClauseState {
        &self.state
    }

    /// Compile the recorded fragments as the given statement kind.
    ///
    /// Compiling does not consume or change the builder, so the same builder
    /// can be compiled repeatedly and as different actions.
    pub fn compile(&self, action: Action) -> Result<CompiledQuery> {
        compile_state(&self.state, action)
    }

    /// Fetch the first matching row. Runs the SELECT with `LIMIT 1`, or
    /// `LIMIT 0` when the caller already asked for no rows.
    pub fn find<D>(mut self, db: &D) -> Result<Option<Record>>
    where
        D: Db,
    {
        self.state.limit = Some(self.state.limit.map_or(1, |limit| limit.min(1)));
        let query = prepare(&self.state, Action::Select)?;
        db.query_row(query.sql(), query.params(), Ok)
    }

    /// Fetch every matching row
    pub fn find_all<D>(self, db: &D) -> Result<Vec<Record>>
    where
        D: Db,
    {
        let query = prepare(&self.state, Action::Select)?;
        db.query_rows(query.sql(), query.params(), Ok)
    }

    /// [`find`](Self::find), deserializing the row into `T`
    pub fn find_as<T, D>(self, db: &D) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        D: Db,
    {
        self.find(db)?.map(|record| record.deserialize()).transpose()
    }

    /// [`find_all`](Self::find_all), deserializing each row into `T`
    pub fn find_all_as<T, D>(self, db: &D) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        D: Db,
    {
        let query = prepare(&self.state, Action::Select)?;
        db.query_rows(query.sql(), query.params(), |record| record.deserialize())
    }

    /// Count matching rows
    ///
    /// Runs a derived `SELECT count(1) AS num` that keeps the table, joins
    /// and filters but drops the projection, ordering and pagination. A
    /// DISTINCT or grouped query is counted as a subquery so the result is
    /// the number of rows it would return. The builder itself is left
    /// untouched.
    pub fn count<D>(&self, db: &D) -> Result<u64>
    where
        D: Db,
    {
        let query = log_statement(Action::Select, compile_count(&self.state))?;
        match db.query_cell(query.sql(), query.params())? {
            Value::Null => Ok(0),
            cell => cell
                .as_i64()
                .and_then(|n| u64::try_from(n).ok())
                .ok_or_else(|| Error::driver(format!("count returned a non-integer value: {}", cell))),
        }
    }

    /// Insert one row and return the generated row id, or 0 when the driver
    /// reports none
    pub fn insert<D>(self, db: &D) -> Result<i64>
    where
        D: Db,
    {
        let query = prepare(&self.state, Action::Insert)?;
        let result = db.execute(query.sql(), query.params())?;
        Ok(result.last_insert_id.unwrap_or(0))
    }

    /// Run the UPDATE; true when at least one row changed
    pub fn update<D>(self, db: &D) -> Result<bool>
    where
        D: Db,
    {
        let query = prepare(&self.state, Action::Update)?;
        let result = db.execute(query.sql(), query.params())?;
        Ok(result.rows_affected > 0)
    }

    /// Run the DELETE; true when at least one row was removed
    pub fn delete<D>(self, db: &D) -> Result<bool>
    where
        D: Db,
    {
        let query = prepare(&self.state, Action::Delete)?;
        let result = db.execute(query.sql(), query.params())?;
        Ok(result.rows_affected > 0)
    }

    fn push_condition<C>(mut self, condition: C, connector: WhereConnector) -> Self
    where
        C: IntoCondition,
    {
        self.state.push_where(compare(condition), connector);
        self
    }
}

fn compare<C: IntoCondition>(condition: C) -> Predicate {
    let (column, operator, value) = condition.into_condition();
    Predicate::Compare {
        column,
        operator,
        value,
    }
}

fn raw(sql: &str, params: Vec<Value>) -> Predicate {
    Predicate::Raw {
        sql: sql.to_string(),
        params,
    }
}

fn compile_state(state: &ClauseState, action: Action) -> Result<CompiledQuery> {
    if state.table.trim().is_empty() {
        return Err(Error::MissingTable { action });
    }

    let mut params = Vec::new();
    let mut sql = match action {
        Action::Select => select::compile_select(state, &mut params)?,
        Action::Insert => insert::compile_insert(state, &mut params)?,
        Action::Update => update::compile_update(state, &mut params)?,
        Action::Delete => delete::compile_delete(state, &mut params)?,
    };

    if action.has_decoration() {
        sql.push_str(&compile_decoration(state, &mut params)?);
    }

    Ok(CompiledQuery {
        action,
        sql,
        params,
    })
}

fn compile_count(state: &ClauseState) -> Result<CompiledQuery> {
    let mut state = state.clone();
    state.order_by.clear();
    state.limit = None;
    state.offset = None;

    if state.distinct || !state.group_by.is_empty() {
        let (inner, params) = compile_state(&state, Action::Select)?.into_parts();
        return Ok(CompiledQuery {
            action: Action::Select,
            sql: format!("SELECT count(1) AS num FROM ({}) AS counted", inner),
            params,
        });
    }

    state.columns = vec![Column::new("count(1)").as_alias("num")];
    compile_state(&state, Action::Select)
}

/// Compile for a terminal operation and log the statement handed to the driver
fn prepare(state: &ClauseState, action: Action) -> Result<CompiledQuery> {
    log_statement(action, compile_state(state, action))
}

fn log_statement(action: Action, compiled: Result<CompiledQuery>) -> Result<CompiledQuery> {
    match compiled {
        Ok(query) => {
            tracing::debug!(
                target: "sqlweave::sql",
                action = %action,
                sql = %query.sql(),
                param_count = query.params().len(),
                "executing statement"
            );
            Ok(query)
        }
        Err(err) => {
            tracing::debug!(
                target: "sqlweave::sql",
                action = %action,
                error = %err,
                "statement rejected before execution"
            );
            Err(err)
        }
    }
}
