//! # erp-database
//!
//! PostgreSQL connection management, migrations, list-query translation
//! and the concrete repositories for ERP entities.

pub mod connection;
pub mod error;
pub mod migration;
pub mod query;
pub mod repositories;

pub use connection::DatabasePool;
