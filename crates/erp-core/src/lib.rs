//! # erp-core
//!
//! Core crate for the ERP data layer. Contains the unified error system,
//! configuration schemas, typed identifiers, the list-query vocabulary
//! (filters, condition groups, sorting, pagination) and the generic
//! repository trait.
//!
//! This crate has **no** internal dependencies on other ERP crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
