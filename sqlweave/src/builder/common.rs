//! Common types and traits shared by the clause accumulator and the compilers

use crate::{IntoOperator, Operator, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Statement kind, chosen by the terminal operation that compiles the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Select,
    Insert,
    Update,
    Delete,
}

impl Action {
    /// Whether WHERE/JOIN/ORDER BY/... are emitted for this statement kind
    pub fn has_decoration(&self) -> bool {
        !matches!(self, Action::Insert)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Select => write!(f, "SELECT"),
            Action::Insert => write!(f, "INSERT"),
            Action::Update => write!(f, "UPDATE"),
            Action::Delete => write!(f, "DELETE"),
        }
    }
}

/// Trait for conditions that can be used in WHERE and HAVING clauses
pub trait IntoCondition {
    fn into_condition(self) -> (String, Operator, Value);
}

// Implementation for shorthand equality: where_(("age", 18))
impl<T> IntoCondition for (&str, T)
where
    T: Into<Value>,
{
    fn into_condition(self) -> (String, Operator, Value) {
        (self.0.to_string(), Operator::EQ, self.1.into())
    }
}

// Implementation for explicit operators: where_(("age", op::GT, 18)) or where_(("age", ">", 18))
impl<T, O> IntoCondition for (&str, O, T)
where
    T: Into<Value>,
    O: IntoOperator,
{
    fn into_condition(self) -> (String, Operator, Value) {
        (self.0.to_string(), self.1.into_operator(), self.2.into())
    }
}

/// How a condition attaches to the one before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhereConnector {
    And,
    Or,
}

impl WhereConnector {
    pub fn as_sql(&self) -> &'static str {
        match self {
            WhereConnector::And => " AND ",
            WhereConnector::Or => " OR ",
        }
    }
}

/// A single filter expression
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column <operator> value`
    Compare {
        column: String,
        operator: Operator,
        value: Value,
    },
    /// Hand-written SQL with its own `?` placeholders
    Raw { sql: String, params: Vec<Value> },
}

/// A WHERE or HAVING condition
#[derive(Debug, Clone, PartialEq)]
pub struct WhereCondition {
    pub predicate: Predicate,
    pub connector: WhereConnector,
}

/// Aggregation function types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
    CountDistinct,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    fn wrap(&self, column: &str) -> String {
        match self {
            AggregateFunction::Count => format!("COUNT({})", column),
            AggregateFunction::CountDistinct => format!("COUNT(DISTINCT {})", column),
            AggregateFunction::Sum => format!("SUM({})", column),
            AggregateFunction::Avg => format!("AVG({})", column),
            AggregateFunction::Min => format!("MIN({})", column),
            AggregateFunction::Max => format!("MAX({})", column),
        }
    }
}

/// A projected column: a column name or SQL expression with an optional alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub expr: String,
    pub alias: Option<String>,
}

impl Column {
    pub fn new(expr: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            alias: None,
        }
    }

    /// `COUNT(*)`
    pub fn count_all() -> Self {
        Self::new("COUNT(*)")
    }

    pub fn count(column: &str) -> Self {
        Self::aggregate(AggregateFunction::Count, column)
    }

    pub fn count_distinct(column: &str) -> Self {
        Self::aggregate(AggregateFunction::CountDistinct, column)
    }

    pub fn sum(column: &str) -> Self {
        Self::aggregate(AggregateFunction::Sum, column)
    }

    pub fn avg(column: &str) -> Self {
        Self::aggregate(AggregateFunction::Avg, column)
    }

    pub fn min(column: &str) -> Self {
        Self::aggregate(AggregateFunction::Min, column)
    }

    pub fn max(column: &str) -> Self {
        Self::aggregate(AggregateFunction::Max, column)
    }

    pub fn aggregate(function: AggregateFunction, column: &str) -> Self {
        Self::new(function.wrap(column))
    }

    /// Add alias to this column
    pub fn as_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn to_sql(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} AS {}", self.expr, alias),
            None => self.expr.clone(),
        }
    }
}

/// Trait to convert various types into plain column lists (GROUP BY)
pub trait IntoColumns {
    fn into_columns(self) -> Vec<String>;
}

impl IntoColumns for &str {
    fn into_columns(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoColumns for String {
    fn into_columns(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoColumns for Vec<String> {
    fn into_columns(self) -> Vec<String> {
        self
    }
}

impl IntoColumns for Vec<&str> {
    fn into_columns(self) -> Vec<String> {
        self.into_iter().map(|s| s.to_string()).collect()
    }
}

impl IntoColumns for (&str, &str) {
    fn into_columns(self) -> Vec<String> {
        vec![self.0.to_string(), self.1.to_string()]
    }
}

impl IntoColumns for (&str, &str, &str) {
    fn into_columns(self) -> Vec<String> {
        vec![self.0.to_string(), self.1.to_string(), self.2.to_string()]
    }
}

/// Trait to convert various types into projected columns (SELECT)
pub trait IntoSelection {
    fn into_selection(self) -> Vec<Column>;
}

impl IntoSelection for &str {
    fn into_selection(self) -> Vec<Column> {
        vec![Column::new(self)]
    }
}

impl IntoSelection for String {
    fn into_selection(self) -> Vec<Column> {
        vec![Column::new(self)]
    }
}

impl IntoSelection for Column {
    fn into_selection(self) -> Vec<Column> {
        vec![self]
    }
}

impl IntoSelection for Vec<Column> {
    fn into_selection(self) -> Vec<Column> {
        self
    }
}

impl IntoSelection for Vec<&str> {
    fn into_selection(self) -> Vec<Column> {
        self.into_iter().map(Column::new).collect()
    }
}

impl IntoSelection for Vec<String> {
    fn into_selection(self) -> Vec<Column> {
        self.into_iter().map(Column::new).collect()
    }
}

impl<const N: usize> IntoSelection for [&str; N] {
    fn into_selection(self) -> Vec<Column> {
        self.into_iter().map(Column::new).collect()
    }
}

impl IntoSelection for (&str, &str) {
    fn into_selection(self) -> Vec<Column> {
        vec![Column::new(self.0), Column::new(self.1)]
    }
}

impl IntoSelection for (&str, &str, &str) {
    fn into_selection(self) -> Vec<Column> {
        vec![Column::new(self.0), Column::new(self.1), Column::new(self.2)]
    }
}

impl IntoSelection for (&str, &str, &str, &str) {
    fn into_selection(self) -> Vec<Column> {
        vec![
            Column::new(self.0),
            Column::new(self.1),
            Column::new(self.2),
            Column::new(self.3),
        ]
    }
}

// Mixed tuples with aggregate columns
impl IntoSelection for (&str, Column) {
    fn into_selection(self) -> Vec<Column> {
        vec![Column::new(self.0), self.1]
    }
}

impl IntoSelection for (&str, Column, Column) {
    fn into_selection(self) -> Vec<Column> {
        vec![Column::new(self.0), self.1, self.2]
    }
}

/// Trait for column/value assignments used by INSERT and UPDATE
///
/// Ordered inputs keep their order; hash maps are sorted by key so the
/// generated SQL does not depend on hashing.
pub trait IntoValues {
    fn into_values(self) -> Vec<(String, Value)>;
}

impl<K, V> IntoValues for Vec<(K, V)>
where
    K: Into<String>,
    V: Into<Value>,
{
    fn into_values(self) -> Vec<(String, Value)> {
        self.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
    }
}

impl<K, V, const N: usize> IntoValues for [(K, V); N]
where
    K: Into<String>,
    V: Into<Value>,
{
    fn into_values(self) -> Vec<(String, Value)> {
        self.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
    }
}

impl<K, V> IntoValues for BTreeMap<K, V>
where
    K: Into<String>,
    V: Into<Value>,
{
    fn into_values(self) -> Vec<(String, Value)> {
        self.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
    }
}

impl<K, V, S> IntoValues for HashMap<K, V, S>
where
    K: Into<String>,
    V: Into<Value>,
{
    fn into_values(self) -> Vec<(String, Value)> {
        let mut values: Vec<(String, Value)> =
            self.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        values.sort_by(|a, b| a.0.cmp(&b.0));
        values
    }
}

/// JOIN types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Inner => write!(f, "INNER"),
            JoinType::Left => write!(f, "LEFT"),
            JoinType::Right => write!(f, "RIGHT"),
            JoinType::Full => write!(f, "FULL OUTER"),
            JoinType::Cross => write!(f, "CROSS"),
        }
    }
}

/// A condition in a JOIN ON clause, comparing two columns
#[derive(Debug, Clone, PartialEq)]
pub struct JoinCondition {
    pub left_column: String,
    pub operator: Operator,
    pub right_column: String,
}

/// A complete JOIN clause with table and conditions
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub join_type: JoinType,
    pub table: String,
    pub on_conditions: Vec<JoinCondition>,
}

/// Sort direction for ORDER BY clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// An ORDER BY clause
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByClause {
    pub column: String,
    pub direction: SortDirection,
}

/// Build an ordered list of column assignments for [`IntoValues`] consumers.
///
/// ```
/// use sqlweave::{values, Value};
///
/// let row = values! { "name" => "shi", "age" => 1 };
/// assert_eq!(row[0], ("name".to_string(), Value::from("shi")));
/// assert_eq!(row[1], ("age".to_string(), Value::from(1)));
/// ```
#[macro_export]
macro_rules! values {
    ($($column:expr => $value:expr),* $(,)?) => {
        ::std::vec![$((::std::string::String::from($column), $crate::Value::from($value))),*]
    };
}
