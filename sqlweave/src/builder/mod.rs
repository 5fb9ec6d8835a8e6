//! Query builder module
//!
//! The builder accumulates clause fragments in [`state`]; statements are
//! produced by the action compilers ([`select`], [`insert`], [`update`],
//! [`delete`]) followed by the shared [`decoration`] compiler.

pub mod common;
pub mod decoration;
pub mod delete;
pub mod insert;
pub mod query;
pub mod select;
pub mod state;
pub mod update;

pub use common::{
    Action, AggregateFunction, Column, IntoColumns, IntoCondition, IntoSelection, IntoValues,
    JoinClause, JoinCondition, JoinType, OrderByClause, Predicate, SortDirection,
    WhereCondition, WhereConnector,
};
pub use query::{CompiledQuery, QueryBuilder};
pub use state::ClauseState;
