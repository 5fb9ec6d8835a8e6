//! Driver interface and the bundled SQLite driver

use crate::record::Record;
use crate::{Result, Value};

/// Outcome of a statement that returns no rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecuteResult {
    pub rows_affected: u64,
    /// Row id generated by an INSERT, when the driver reports one
    pub last_insert_id: Option<i64>,
}

/// Trait for database drivers
///
/// The builder compiles a statement into SQL with `?` placeholders plus an
/// ordered parameter list and hands both to one of these methods. Driver
/// failures are returned as [`Error::Driver`](crate::Error::Driver) and are
/// not retried.
pub trait Db {
    /// Execute a statement that returns no rows (INSERT, UPDATE, DELETE, DDL)
    fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecuteResult>;

    /// Run a query and map every row, in a single pass over the result set
    fn query_rows<T, F>(&self, sql: &str, params: &[Value], mapper: F) -> Result<Vec<T>>
    where
        F: FnMut(Record) -> Result<T>;

    /// Run a query and map the first row, if any
    fn query_row<T, F>(&self, sql: &str, params: &[Value], mapper: F) -> Result<Option<T>>
    where
        F: FnOnce(Record) -> Result<T>;

    /// First column of the first row, or `Value::Null` when there is no row
    fn query_cell(&self, sql: &str, params: &[Value]) -> Result<Value> {
        let cell = self.query_row(sql, params, |record| Ok(record.into_first_value()))?;
        Ok(cell.flatten().unwrap_or(Value::Null))
    }
}

/// SQLite driver on top of sqlx
///
/// sqlx is async; [`SqliteDb`] owns a single-threaded tokio runtime and blocks
/// on it for every call, so the builder API stays synchronous.
#[cfg(feature = "sqlite")]
pub mod sqlite {
    use super::*;
    use crate::config::SqliteConfig;
    use crate::Error;
    use futures::TryStreamExt;
    use sqlx::sqlite::{
        Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow,
    };
    use sqlx::{Column as _, Decode, Row as _, TypeInfo as _, ValueRef as _};
    use std::str::FromStr;

    type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

    /// A SQLite database reachable through a single pooled connection
    pub struct SqliteDb {
        runtime: tokio::runtime::Runtime,
        pool: SqlitePool,
    }

    impl SqliteDb {
        /// Open (and by default create) the database described by `config`
        pub fn open(config: &SqliteConfig) -> Result<Self> {
            config.validate()?;

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(Error::driver)?;

            let options = SqliteConnectOptions::from_str(&config.url)?
                .create_if_missing(config.create_if_missing)
                .busy_timeout(config.busy_timeout)
                .foreign_keys(config.foreign_keys);

            // One long-lived connection: an in-memory database lives exactly
            // as long as its connection.
            let pool = runtime.block_on(
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options),
            )?;

            tracing::debug!(url = %config.url, "opened sqlite database");
            Ok(Self { runtime, pool })
        }

        /// Open a private in-memory database
        pub fn in_memory() -> Result<Self> {
            Self::open(&SqliteConfig::in_memory())
        }

        /// Open the database named by `SQLWEAVE_DATABASE_URL`
        pub fn from_env() -> Result<Self> {
            Self::open(&SqliteConfig::from_env()?)
        }
    }

    impl Db for SqliteDb {
        fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecuteResult> {
            tracing::trace!(sql, params = params.len(), "sqlite execute");
            let query = bind_values_to_query(sqlx::query(sql), params);
            let result = self.runtime.block_on(query.execute(&self.pool))?;
            Ok(ExecuteResult {
                rows_affected: result.rows_affected(),
                last_insert_id: Some(result.last_insert_rowid()),
            })
        }

        fn query_rows<T, F>(&self, sql: &str, params: &[Value], mut mapper: F) -> Result<Vec<T>>
        where
            F: FnMut(Record) -> Result<T>,
        {
            tracing::trace!(sql, params = params.len(), "sqlite query");
            let query = bind_values_to_query(sqlx::query(sql), params);
            self.runtime.block_on(async {
                let mut rows = query.fetch(&self.pool);
                let mut results = Vec::new();
                while let Some(row) = rows.try_next().await? {
                    results.push(mapper(row_to_record(&row)?)?);
                }
                Ok::<_, Error>(results)
            })
        }

        fn query_row<T, F>(&self, sql: &str, params: &[Value], mapper: F) -> Result<Option<T>>
        where
            F: FnOnce(Record) -> Result<T>,
        {
            tracing::trace!(sql, params = params.len(), "sqlite query");
            let query = bind_values_to_query(sqlx::query(sql), params);
            let record: Option<Record> = self.runtime.block_on(async {
                let mut rows = query.fetch(&self.pool);
                match rows.try_next().await? {
                    Some(row) => Ok::<_, Error>(Some(row_to_record(&row)?)),
                    None => Ok(None),
                }
            })?;
            record.map(mapper).transpose()
        }
    }

    impl Drop for SqliteDb {
        fn drop(&mut self) {
            self.runtime.block_on(self.pool.close());
        }
    }

    /// Bind sqlweave Values to a SQLx query, in placeholder order
    fn bind_values_to_query<'q>(mut query: SqliteQuery<'q>, params: &'q [Value]) -> SqliteQuery<'q> {
        for param in params {
            query = match param {
                Value::Null => query.bind(None::<i64>),
                Value::Bool(b) => query.bind(*b),
                Value::I32(i) => query.bind(*i),
                Value::I64(i) => query.bind(*i),
                Value::F32(f) => query.bind(*f),
                Value::F64(f) => query.bind(*f),
                Value::String(s) => query.bind(s.as_str()),
                Value::Bytes(b) => query.bind(b.as_slice()),
                // SQLite has no JSON or array column type; store the JSON text
                Value::Json(_) | Value::Array(_) => query.bind(param.to_json().to_string()),
            };
        }
        query
    }

    fn row_to_record(row: &SqliteRow) -> Result<Record> {
        let mut pairs = Vec::with_capacity(row.len());
        for (index, column) in row.columns().iter().enumerate() {
            let raw = row.try_get_raw(index)?;
            let value = if raw.is_null() {
                Value::Null
            } else {
                let storage = raw.type_info().name().to_string();
                match storage.as_str() {
                    "INTEGER" => Value::I64(<i64 as Decode<'_, Sqlite>>::decode(raw).map_err(Error::Driver)?),
                    "BOOLEAN" => Value::Bool(<bool as Decode<'_, Sqlite>>::decode(raw).map_err(Error::Driver)?),
                    "REAL" => Value::F64(<f64 as Decode<'_, Sqlite>>::decode(raw).map_err(Error::Driver)?),
                    "BLOB" => Value::Bytes(<Vec<u8> as Decode<'_, Sqlite>>::decode(raw).map_err(Error::Driver)?),
                    _ => Value::String(<String as Decode<'_, Sqlite>>::decode(raw).map_err(Error::Driver)?),
                }
            };
            pairs.push((column.name().to_string(), value));
        }
        Ok(Record::from_pairs(pairs))
    }

}

#[cfg(test)]
pub(crate) mod mock {
    //! Recording driver for builder tests

    use super::*;
    use crate::Error;
    use std::cell::RefCell;

    #[derive(Default)]
    pub(crate) struct MockDb {
        statements: RefCell<Vec<(String, Vec<Value>)>>,
        rows: Vec<Record>,
        cell: Option<Value>,
        execute_result: ExecuteResult,
        should_fail: bool,
    }

    impl MockDb {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn failing() -> Self {
            Self {
                should_fail: true,
                ..Self::default()
            }
        }

        pub(crate) fn with_rows(mut self, rows: Vec<Record>) -> Self {
            self.rows = rows;
            self
        }

        pub(crate) fn with_cell(mut self, cell: Value) -> Self {
            self.cell = Some(cell);
            self
        }

        pub(crate) fn with_execute_result(mut self, rows_affected: u64, last_insert_id: Option<i64>) -> Self {
            self.execute_result = ExecuteResult {
                rows_affected,
                last_insert_id,
            };
            self
        }

        /// Every statement handed to the driver, in call order
        pub(crate) fn statements(&self) -> Vec<(String, Vec<Value>)> {
            self.statements.borrow().clone()
        }

        fn record(&self, sql: &str, params: &[Value]) -> Result<()> {
            self.statements
                .borrow_mut()
                .push((sql.to_string(), params.to_vec()));
            if self.should_fail {
                return Err(Error::driver("mock driver failure"));
            }
            Ok(())
        }
    }

    impl Db for MockDb {
        fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecuteResult> {
            self.record(sql, params)?;
            Ok(self.execute_result)
        }

        fn query_rows<T, F>(&self, sql: &str, params: &[Value], mapper: F) -> Result<Vec<T>>
        where
            F: FnMut(Record) -> Result<T>,
        {
            self.record(sql, params)?;
            self.rows.iter().cloned().map(mapper).collect()
        }

        fn query_row<T, F>(&self, sql: &str, params: &[Value], mapper: F) -> Result<Option<T>>
        where
            F: FnOnce(Record) -> Result<T>,
        {
            self.record(sql, params)?;
            self.rows.first().cloned().map(mapper).transpose()
        }

        fn query_cell(&self, sql: &str, params: &[Value]) -> Result<Value> {
            self.record(sql, params)?;
            Ok(self.cell.clone().unwrap_or(Value::Null))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockDb;
    use super::*;

    struct RowsOnly(Vec<Record>);

    impl Db for RowsOnly {
        fn execute(&self, _sql: &str, _params: &[Value]) -> Result<ExecuteResult> {
            Ok(ExecuteResult::default())
        }

        fn query_rows<T, F>(&self, _sql: &str, _params: &[Value], mapper: F) -> Result<Vec<T>>
        where
            F: FnMut(Record) -> Result<T>,
        {
            self.0.iter().cloned().map(mapper).collect()
        }

        fn query_row<T, F>(&self, _sql: &str, _params: &[Value], mapper: F) -> Result<Option<T>>
        where
            F: FnOnce(Record) -> Result<T>,
        {
            self.0.first().cloned().map(mapper).transpose()
        }
    }

    #[test]
    fn test_default_query_cell_reads_first_column() {
        let db = RowsOnly(vec![Record::from_pairs(vec![
            ("num".to_string(), Value::I64(3)),
            ("other".to_string(), Value::I64(9)),
        ])]);
        assert_eq!(db.query_cell("SELECT 1", &[]).unwrap(), Value::I64(3));
        assert_eq!(RowsOnly(Vec::new()).query_cell("SELECT 1", &[]).unwrap(), Value::Null);
    }

    #[test]
    fn test_mock_records_statements() {
        let db = MockDb::new().with_execute_result(1, Some(4));
        let result = db.execute("DELETE FROM t WHERE id = ?", &[Value::from(1)]).unwrap();
        assert_eq!(result.rows_affected, 1);
        assert_eq!(
            db.statements(),
            vec![("DELETE FROM t WHERE id = ?".to_string(), vec![Value::from(1)])]
        );
    }

    #[test]
    fn test_mock_failure() {
        let db = MockDb::failing();
        assert!(matches!(db.execute("x", &[]), Err(crate::Error::Driver(_))));
    }
}
