//! sqlweave - a deferred-compilation SQL query builder with a minimal record layer
//!
//! Builder methods only record clause fragments; nothing becomes SQL until a
//! terminal operation decides what kind of statement to run. The same chain
//! of `where_`/`order_by`/`limit` calls can therefore back a SELECT, UPDATE,
//! DELETE or `count`.
//!
//! ```
//! use sqlweave::{op, table, values, Action, Value};
//!
//! let query = table("user")
//!     .sets(values! { "name" => "wang", "age" => 2 })
//!     .where_(("id", "=", 5))
//!     .compile(Action::Update)
//!     .unwrap();
//!
//! assert_eq!(query.sql(), "UPDATE user SET name = ?, age = ? WHERE id = ?");
//! assert_eq!(query.params(), &[Value::from("wang"), Value::from(2), Value::from(5)]);
//!
//! let adults = table("user").where_(("age", op::GTE, 18)).compile(Action::Select).unwrap();
//! assert_eq!(adults.sql(), "SELECT * FROM user WHERE age >= ?");
//! ```
//!
//! Statements run through a [`Db`] driver. With the default `sqlite` feature
//! the crate ships [`SqliteDb`], built on sqlx.

pub mod builder;
pub mod config;
pub mod entity;
pub mod error;
pub mod executor;
pub mod operator;
pub mod record;
pub mod value;

// Re-export main types
pub use builder::{
    Action, AggregateFunction, Column, CompiledQuery, IntoColumns, IntoCondition, IntoSelection,
    IntoValues, JoinType, QueryBuilder, SortDirection, WhereConnector,
};
pub use config::SqliteConfig;
pub use entity::{Entity, EntitySchema, FieldType};
pub use error::{Error, Result};
#[cfg(feature = "sqlite")]
pub use executor::sqlite::SqliteDb;
pub use executor::{Db, ExecuteResult};
pub use operator::{op, IntoOperator, Operator, OperatorKind};
pub use record::Record;
pub use value::Value;

/// Create a new query builder for the given table
pub fn table(name: &str) -> QueryBuilder {
    QueryBuilder::new().table(name)
}
