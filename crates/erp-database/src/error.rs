//! Mapping of driver errors and transaction helpers.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::warn;

use erp_core::error::{AppError, ErrorKind};
use erp_core::result::AppResult;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// Map a driver error to an [`AppError`], classifying constraint violations.
///
/// Unique violations become `Conflict`, foreign key violations `NotFound`
/// and check violations `Validation`. Numeric overflow is a `Conflict`.
/// Everything else is a `Database` error.
pub fn map_db_error(err: sqlx::Error, context: &str) -> AppError {
    let classified = match &err {
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => Some((
                    ErrorKind::Conflict,
                    format!("{context}: duplicate value violates '{constraint}'"),
                )),
                Some(FOREIGN_KEY_VIOLATION) => Some((
                    ErrorKind::NotFound,
                    format!("{context}: referenced row does not exist ('{constraint}')"),
                )),
                Some(CHECK_VIOLATION) => Some((
                    ErrorKind::Validation,
                    format!("{context}: value violates '{constraint}'"),
                )),
                Some(NUMERIC_OUT_OF_RANGE) => Some((
                    ErrorKind::Conflict,
                    format!("{context}: value is out of range"),
                )),
                _ => None,
            }
        }
        _ => None,
    };

    match classified {
        Some((kind, message)) => AppError::with_source(kind, message, err),
        None => AppError::with_source(ErrorKind::Database, context.to_string(), err),
    }
}

/// Open a transaction on `pool`.
pub async fn begin(pool: &PgPool) -> AppResult<Transaction<'static, Postgres>> {
    pool.begin()
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e))
}

/// Commit `tx`.
pub async fn commit(tx: Transaction<'static, Postgres>) -> AppResult<()> {
    tx.commit()
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e))
}

/// Roll back `tx` after `err`; a failing rollback is attached to `err`.
pub async fn rollback(tx: Transaction<'static, Postgres>, err: AppError) -> AppError {
    match tx.rollback().await {
        Ok(()) => err,
        Err(rollback_err) => {
            warn!(error = %rollback_err, cause = %err, "Transaction rollback failed");
            err.suppress(AppError::with_source(
                ErrorKind::Database,
                "Failed to roll back transaction",
                rollback_err,
            ))
        }
    }
}
