//! Sequence counter repository implementation.

use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool};
use tracing::info;

use erp_core::config::QueryConfig;
use erp_core::error::AppError;
use erp_core::result::AppResult;
use erp_core::traits::Repository;
use erp_core::types::id::{SequenceId, UserId};
use erp_core::types::pagination::Page;
use erp_core::types::query::ListQuery;
use erp_entity::sequence::{CreateSequence, Sequence, UpdateSequence, format_sequence};
use erp_entity::validation::validate_payload;

use crate::error::{begin, commit, map_db_error, rollback};
use crate::query::{fetch_page, table::SEQUENCES};

/// Repository for sequence counters and number allocation.
#[derive(Debug, Clone)]
pub struct SequenceRepository {
    pool: PgPool,
    query_config: QueryConfig,
}

impl SequenceRepository {
    /// Create a new sequence repository.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            query_config: QueryConfig::default(),
        }
    }

    /// Override the list query defaults.
    pub fn with_query_config(mut self, query_config: QueryConfig) -> Self {
        self.query_config = query_config;
        self
    }

    /// Allocate the next number for `struct_name`.
    ///
    /// The increment and the read of the new value are one statement, so
    /// concurrent callers are serialized on the counter row and never get
    /// the same number.
    pub async fn next_value(&self, struct_name: &str) -> AppResult<String> {
        Self::next_value_with(&self.pool, struct_name).await
    }

    /// Allocate the next number for `struct_name` on a caller supplied
    /// executor, typically an open transaction, so the allocation commits or
    /// rolls back with the document that consumes it.
    pub async fn next_value_with<'e, E>(executor: E, struct_name: &str) -> AppResult<String>
    where
        E: PgExecutor<'e>,
    {
        let row: Option<(String, i64, i64)> = sqlx::query_as(
            "UPDATE sequences SET current = current + 1, updated_at = NOW() \
             WHERE struct_name = $1 AND active AND is_default \
             RETURNING prefix, padding, current",
        )
        .bind(struct_name)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_db_error(e, "Failed to allocate sequence number"))?;

        let (prefix, padding, current) = row.ok_or_else(|| {
            AppError::not_found(format!(
                "No active default sequence for '{struct_name}'"
            ))
        })?;

        let value = format_sequence(&prefix, padding, current);
        info!(struct_name, value = %value, "Allocated sequence number");
        Ok(value)
    }

    /// The number the next allocation for `struct_name` would return.
    pub async fn preview_next(&self, struct_name: &str) -> AppResult<String> {
        self.find_default(struct_name).await?.preview_next()
    }

    /// Find the active default counter for `struct_name`.
    pub async fn find_default(&self, struct_name: &str) -> AppResult<Sequence> {
        sqlx::query_as::<_, Sequence>(
            "SELECT * FROM sequences WHERE struct_name = $1 AND active AND is_default",
        )
        .bind(struct_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to find default sequence"))?
        .ok_or_else(|| AppError::not_found(format!("No active default sequence for '{struct_name}'")))
    }

    /// Create a new counter in its own transaction.
    pub async fn create(&self, data: &CreateSequence, actor: Option<UserId>) -> AppResult<Sequence> {
        validate_payload(data)?;

        let mut tx = begin(&self.pool).await?;
        let inserted = sqlx::query_as::<_, Sequence>(
            "INSERT INTO sequences \
                 (name, prefix, current, padding, struct_name, active, is_default, \
                  create_user_id, update_user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) \
             RETURNING *",
        )
        .bind(data.name.trim())
        .bind(data.prefix.trim())
        .bind(data.current)
        .bind(data.padding)
        .bind(data.struct_name.trim())
        .bind(data.active)
        .bind(data.is_default)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error(e, "Failed to create sequence"));

        match inserted {
            Ok(sequence) => {
                commit(tx).await?;
                info!(id = %sequence.id, name = %sequence.name, "Created sequence");
                Ok(sequence)
            }
            Err(e) => Err(rollback(tx, e).await),
        }
    }

    /// Find a counter by primary key.
    pub async fn find_by_id(&self, id: SequenceId) -> AppResult<Sequence> {
        sqlx::query_as::<_, Sequence>("SELECT * FROM sequences WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Failed to find sequence by id"))?
            .ok_or_else(|| AppError::not_found(format!("Sequence {id} not found")))
    }

    /// Find a counter by its unique name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Sequence> {
        sqlx::query_as::<_, Sequence>("SELECT * FROM sequences WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Failed to find sequence by name"))?
            .ok_or_else(|| AppError::not_found(format!("Sequence '{name}' not found")))
    }

    /// Filtered, sorted, paginated listing.
    pub async fn list(&self, query: &ListQuery) -> AppResult<Page<Sequence>> {
        fetch_page(&self.pool, &SEQUENCES, query, &self.query_config).await
    }

    /// Update the given columns of an existing counter.
    pub async fn update_by_id(
        &self,
        id: SequenceId,
        data: &UpdateSequence,
        actor: Option<UserId>,
    ) -> AppResult<Sequence> {
        validate_payload(data)?;

        let updated = sqlx::query_as::<_, Sequence>(
            "UPDATE sequences SET name = COALESCE($2, name), \
                                  prefix = COALESCE($3, prefix), \
                                  current = COALESCE($4, current), \
                                  padding = COALESCE($5, padding), \
                                  struct_name = COALESCE($6, struct_name), \
                                  active = COALESCE($7, active), \
                                  is_default = COALESCE($8, is_default), \
                                  update_user_id = COALESCE($9, update_user_id), \
                                  updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(data.name.as_deref().map(str::trim))
        .bind(data.prefix.as_deref().map(str::trim))
        .bind(data.current)
        .bind(data.padding)
        .bind(data.struct_name.as_deref().map(str::trim))
        .bind(data.active)
        .bind(data.is_default)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to update sequence"))?;

        let rows_affected = u64::from(updated.is_some());
        let updated =
            updated.ok_or_else(|| AppError::not_found(format!("Sequence {id} not found")))?;

        info!(id = %id, rows_affected, "Updated sequence");
        Ok(updated)
    }

    /// Delete a counter by primary key.
    pub async fn delete_by_id(&self, id: SequenceId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM sequences WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Failed to delete sequence"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Sequence {id} not found")));
        }
        info!(id = %id, rows_affected = result.rows_affected(), "Deleted sequence");
        Ok(())
    }

    /// Count total counters.
    pub async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sequences")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Failed to count sequences"))?;
        Ok(count as u64)
    }
}

#[async_trait]
impl Repository<Sequence, SequenceId> for SequenceRepository {
    type Create = CreateSequence;
    type Update = UpdateSequence;

    async fn create(&self, data: &CreateSequence, actor: Option<UserId>) -> AppResult<Sequence> {
        SequenceRepository::create(self, data, actor).await
    }

    async fn find_by_id(&self, id: SequenceId) -> AppResult<Sequence> {
        SequenceRepository::find_by_id(self, id).await
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Sequence> {
        SequenceRepository::find_by_name(self, name).await
    }

    async fn list(&self, query: &ListQuery) -> AppResult<Page<Sequence>> {
        SequenceRepository::list(self, query).await
    }

    async fn update_by_id(
        &self,
        id: SequenceId,
        data: &UpdateSequence,
        actor: Option<UserId>,
    ) -> AppResult<Sequence> {
        SequenceRepository::update_by_id(self, id, data, actor).await
    }

    async fn delete_by_id(&self, id: SequenceId) -> AppResult<()> {
        SequenceRepository::delete_by_id(self, id).await
    }

    async fn count(&self) -> AppResult<u64> {
        SequenceRepository::count(self).await
    }
}
