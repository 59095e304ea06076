//! # erp-entity
//!
//! Domain entity models for the ERP data layer. Every struct in this crate
//! represents a database table row or a write payload. Row structs derive
//! `sqlx::FromRow`; payloads derive `validator::Validate` and are checked
//! with [`validation::validate_payload`] before any statement runs.
//!
//! Audit columns (acting users and timestamps) are loaded from the store
//! but never serialized.

pub mod product;
pub mod sequence;
pub mod validation;
