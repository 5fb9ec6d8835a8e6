//! SQL operator types and conversions

use std::borrow::Cow;
use std::fmt::{self, Display};

/// How an operator consumes its right-hand value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    /// `col <op> ?`
    Comparison,
    /// `col IN (?, ?, ...)`
    List,
    /// `col BETWEEN ? AND ?`
    Range,
    /// `col IS NULL`, binds nothing
    Nullness,
}

/// SQL comparison operator
///
/// Operators parsed from strings that are not recognised are kept as-is and
/// rejected when the statement is compiled, so builder calls never fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    sql: Cow<'static, str>,
    known: bool,
}

impl Operator {
    pub const GT: Self = Operator::known(">");
    pub const LT: Self = Operator::known("<");
    pub const EQ: Self = Operator::known("=");
    pub const NEQ: Self = Operator::known("!=");
    pub const GTE: Self = Operator::known(">=");
    pub const LTE: Self = Operator::known("<=");
    pub const LIKE: Self = Operator::known("LIKE");
    pub const NOT_LIKE: Self = Operator::known("NOT LIKE");
    pub const IN: Self = Operator::known("IN");
    pub const NOT_IN: Self = Operator::known("NOT IN");
    pub const BETWEEN: Self = Operator::known("BETWEEN");
    pub const IS: Self = Operator::known("IS");
    pub const IS_NOT: Self = Operator::known("IS NOT");
    pub const IS_NULL: Self = Operator::known("IS NULL");
    pub const IS_NOT_NULL: Self = Operator::known("IS NOT NULL");

    const fn known(op: &'static str) -> Self {
        Operator {
            sql: Cow::Borrowed(op),
            known: true,
        }
    }

    /// Create a custom operator for database-specific operations
    ///
    /// # Examples
    /// ```
    /// use sqlweave::Operator;
    ///
    /// // SQLite GLOB matching
    /// let glob = Operator::custom("GLOB");
    /// assert_eq!(glob.as_str(), "GLOB");
    /// ```
    pub const fn custom(op: &'static str) -> Self {
        Operator::known(op)
    }

    /// Parse an operator from user input. Never fails; see [`Operator::is_valid`].
    pub fn parse(op: &str) -> Self {
        let normalized = op.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
        match normalized.as_str() {
            ">" => Operator::GT,
            "<" => Operator::LT,
            "=" | "==" => Operator::EQ,
            "!=" | "<>" => Operator::NEQ,
            ">=" => Operator::GTE,
            "<=" => Operator::LTE,
            "LIKE" => Operator::LIKE,
            "NOT LIKE" => Operator::NOT_LIKE,
            "IN" => Operator::IN,
            "NOT IN" => Operator::NOT_IN,
            "BETWEEN" => Operator::BETWEEN,
            "IS" => Operator::IS,
            "IS NOT" => Operator::IS_NOT,
            "IS NULL" => Operator::IS_NULL,
            "IS NOT NULL" => Operator::IS_NOT_NULL,
            _ => Operator {
                sql: Cow::Owned(op.to_string()),
                known: false,
            },
        }
    }

    /// Get the string representation of the operator
    pub fn as_str(&self) -> &str {
        &self.sql
    }

    /// Whether this operator can be compiled
    pub fn is_valid(&self) -> bool {
        self.known && !self.sql.trim().is_empty()
    }

    pub fn kind(&self) -> OperatorKind {
        if *self == Operator::IN || *self == Operator::NOT_IN {
            OperatorKind::List
        } else if *self == Operator::BETWEEN {
            OperatorKind::Range
        } else if *self == Operator::IS_NULL || *self == Operator::IS_NOT_NULL {
            OperatorKind::Nullness
        } else {
            OperatorKind::Comparison
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql)
    }
}

/// Trait for types that can be converted to SQL operators
pub trait IntoOperator {
    fn into_operator(self) -> Operator;
}

impl IntoOperator for Operator {
    fn into_operator(self) -> Operator {
        self
    }
}

impl IntoOperator for &str {
    fn into_operator(self) -> Operator {
        Operator::parse(self)
    }
}

impl IntoOperator for String {
    fn into_operator(self) -> Operator {
        Operator::parse(&self)
    }
}

/// Convenience module for operator constants
pub mod op {
    use super::Operator;

    pub const GT: Operator = Operator::GT;
    pub const LT: Operator = Operator::LT;
    pub const EQ: Operator = Operator::EQ;
    pub const NEQ: Operator = Operator::NEQ;
    pub const GTE: Operator = Operator::GTE;
    pub const LTE: Operator = Operator::LTE;
    pub const LIKE: Operator = Operator::LIKE;
    pub const NOT_LIKE: Operator = Operator::NOT_LIKE;
    pub const IN: Operator = Operator::IN;
    pub const NOT_IN: Operator = Operator::NOT_IN;
    pub const BETWEEN: Operator = Operator::BETWEEN;
    pub const IS: Operator = Operator::IS;
    pub const IS_NOT: Operator = Operator::IS_NOT;
    pub const IS_NULL: Operator = Operator::IS_NULL;
    pub const IS_NOT_NULL: Operator = Operator::IS_NOT_NULL;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_constants() {
        assert_eq!(Operator::GT.as_str(), ">");
        assert_eq!(Operator::LT.as_str(), "<");
        assert_eq!(Operator::EQ.as_str(), "=");
        assert_eq!(Operator::LIKE.as_str(), "LIKE");
    }

    #[test]
    fn test_string_conversion() {
        assert_eq!(">".into_operator(), Operator::GT);
        assert_eq!("like".into_operator(), Operator::LIKE);
        assert_eq!("<>".into_operator(), Operator::NEQ);
        assert_eq!("not   in".into_operator(), Operator::NOT_IN);
        assert_eq!("is not null".into_operator(), Operator::IS_NOT_NULL);
    }

    #[test]
    fn test_bare_is_stays_a_comparison() {
        assert_eq!("is".into_operator(), Operator::IS);
        assert_eq!("IS  not".into_operator(), Operator::IS_NOT);
        assert_eq!(op::IS.kind(), OperatorKind::Comparison);
        assert_eq!(op::IS_NOT.kind(), OperatorKind::Comparison);
        assert_ne!("is".into_operator(), Operator::IS_NULL);
    }

    #[test]
    fn test_unknown_operator_is_kept_but_invalid() {
        let op = "INVALID".into_operator();
        assert!(!op.is_valid());
        assert_eq!(op.as_str(), "INVALID");
        assert!(!"".into_operator().is_valid());
    }

    #[test]
    fn test_custom_operator() {
        let custom_op = Operator::custom("GLOB");
        assert!(custom_op.is_valid());
        assert_eq!(custom_op.kind(), OperatorKind::Comparison);
    }

    #[test]
    fn test_operator_kinds() {
        assert_eq!(op::IN.kind(), OperatorKind::List);
        assert_eq!(op::NOT_IN.kind(), OperatorKind::List);
        assert_eq!(op::BETWEEN.kind(), OperatorKind::Range);
        assert_eq!(op::IS_NULL.kind(), OperatorKind::Nullness);
        assert_eq!(op::GTE.kind(), OperatorKind::Comparison);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Operator::GT), ">");
        assert_eq!(format!("{}", Operator::NOT_LIKE), "NOT LIKE");
    }
}
