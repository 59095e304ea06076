//! Core traits defined in `erp-core` and implemented by other crates.

pub mod repository;

pub use repository::Repository;
