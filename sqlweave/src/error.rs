//! Error types for sqlweave

use crate::builder::Action;
use thiserror::Error;

/// Boxed error produced by a database driver
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for sqlweave operations
#[derive(Error, Debug)]
pub enum Error {
    /// A statement was compiled before any table was set
    #[error("Missing table: a table is required to compile a {action} statement")]
    MissingTable { action: Action },

    /// INSERT or UPDATE compiled without any column values
    #[error("Empty values: {action} requires at least one column value")]
    EmptyValues { action: Action },

    /// A WHERE/HAVING predicate cannot be turned into SQL
    #[error("Malformed predicate on '{column}': {message}")]
    MalformedPredicate { column: String, message: String },

    /// Failure reported by the database driver, passed through untouched
    #[error("Driver error: {0}")]
    Driver(#[source] DriverError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Column not declared by an entity schema
    #[error("Column '{column}' not found in table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// A value could not be coerced into the declared field type
    #[error("Invalid value for column '{column}': {message}")]
    InvalidValue { column: String, message: String },

    /// Invalid driver configuration
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Convenience Result type for sqlweave operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new malformed predicate error
    pub fn malformed_predicate(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedPredicate {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Wrap an arbitrary driver failure
    pub fn driver(err: impl Into<DriverError>) -> Self {
        Self::Driver(err.into())
    }

    /// Create a new unknown column error
    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Create a new invalid value error
    pub fn invalid_value(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True for errors raised while compiling, before any driver call
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            Self::MissingTable { .. } | Self::EmptyValues { .. } | Self::MalformedPredicate { .. }
        )
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Self::Driver(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_table_error() {
        let err = Error::MissingTable {
            action: Action::Select,
        };
        assert!(err.is_compile_error());
        assert_eq!(
            err.to_string(),
            "Missing table: a table is required to compile a SELECT statement"
        );
    }

    #[test]
    fn test_empty_values_error() {
        let err = Error::EmptyValues {
            action: Action::Insert,
        };
        assert_eq!(
            err.to_string(),
            "Empty values: INSERT requires at least one column value"
        );
    }

    #[test]
    fn test_malformed_predicate_error() {
        let err = Error::malformed_predicate("age", "unknown operator 'INVALID'");
        assert!(matches!(err, Error::MalformedPredicate { .. }));
        assert_eq!(
            err.to_string(),
            "Malformed predicate on 'age': unknown operator 'INVALID'"
        );
    }

    #[test]
    fn test_driver_error_passthrough() {
        let err = Error::driver("disk I/O error");
        assert!(!err.is_compile_error());
        assert_eq!(err.to_string(), "Driver error: disk I/O error");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_unknown_column_error() {
        let err = Error::unknown_column("user", "nickname");
        assert_eq!(err.to_string(), "Column 'nickname' not found in table 'user'");
    }
}
