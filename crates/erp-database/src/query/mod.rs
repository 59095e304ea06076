//! List query translation and execution.
//!
//! Every list operation follows the same template: compile the typed query
//! against the entity's [`table::Table`] descriptor, count the matching rows,
//! then fetch one page in a stable order.

pub mod compile;
pub mod table;

use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};
use tracing::debug;

use erp_core::config::QueryConfig;
use erp_core::error::{AppError, ErrorKind};
use erp_core::result::AppResult;
use erp_core::types::pagination::{Page, Paginator};
use erp_core::types::query::ListQuery;

pub use compile::CompiledQuery;
pub use table::Table;

/// Run a list query and return one page together with its paginator.
pub async fn fetch_page<T>(
    pool: &PgPool,
    table: &'static Table,
    query: &ListQuery,
    config: &QueryConfig,
) -> AppResult<Page<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let compiled = CompiledQuery::compile(table, query, config)?;

    let mut count = compiled.count_builder();
    debug!(table = table.name, sql = count.sql(), "Counting rows");
    let total: i64 = count
        .build_query_scalar()
        .fetch_one(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to count {}", table.name),
                e,
            )
        })?;

    let mut select = compiled.select_builder();
    debug!(table = table.name, sql = select.sql(), "Selecting page");
    let items = select
        .build_query_as::<T>()
        .fetch_all(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to list {}", table.name),
                e,
            )
        })?;

    let paginator = Paginator::new(compiled.limit(), compiled.offset(), total.max(0) as u64);
    Ok(Page::new(paginator, items))
}
