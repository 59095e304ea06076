//! Core type definitions used across the ERP workspace.

pub mod filter;
pub mod id;
pub mod pagination;
pub mod query;
pub mod sorting;

pub use filter::{ConditionGroup, Conjunction, FieldPath, FilterField, FilterOp, FilterValue};
pub use id::*;
pub use pagination::{Page, Paginator};
pub use query::{ListParams, ListQuery};
pub use sorting::{SortDirection, SortField, resolve_sort};
