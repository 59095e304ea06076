//! Product attribute repository implementation.

use sqlx::PgPool;
use tracing::info;

use erp_core::config::QueryConfig;
use erp_core::error::{AppError, ErrorKind};
use erp_core::result::AppResult;
use erp_core::types::id::{ProductAttributeId, UserId};
use erp_core::types::pagination::Page;
use erp_core::types::query::ListQuery;
use erp_entity::product::{CreateProductAttribute, ProductAttribute};
use erp_entity::validation::validate_payload;

use crate::error::map_db_error;
use crate::query::{fetch_page, table::PRODUCT_ATTRIBUTES};

/// Repository for product attributes.
#[derive(Debug, Clone)]
pub struct ProductAttributeRepository {
    pool: PgPool,
    query_config: QueryConfig,
}

impl ProductAttributeRepository {
    /// Create a new product attribute repository.
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

    /// Create a new attribute.
    pub async fn create(
        &self,
        data: &CreateProductAttribute,
        actor: Option<UserId>,
    ) -> AppResult<ProductAttribute> {
        validate_payload(data)?;

        let attribute = sqlx::query_as::<_, ProductAttribute>(
            "INSERT INTO product_attributes (name, sequence, create_user_id, update_user_id) \
             VALUES ($1, $2, $3, $3) RETURNING *",
        )
        .bind(data.name.trim())
        .bind(data.sequence)
        .bind(actor)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to create product attribute"))?;

        info!(id = %attribute.id, name = %attribute.name, "Created product attribute");
        Ok(attribute)
    }

    /// Find an attribute by ID.
    pub async fn find_by_id(&self, id: ProductAttributeId) -> AppResult<ProductAttribute> {
        sqlx::query_as::<_, ProductAttribute>("SELECT * FROM product_attributes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Failed to find product attribute by id"))?
            .ok_or_else(|| AppError::not_found(format!("Product attribute {id} not found")))
    }

    /// Find an attribute by name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<ProductAttribute> {
        sqlx::query_as::<_, ProductAttribute>("SELECT * FROM product_attributes WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Failed to find product attribute by name"))?
            .ok_or_else(|| AppError::not_found(format!("Product attribute '{name}' not found")))
    }

    /// Filtered, sorted, paginated listing.
    pub async fn list(&self, query: &ListQuery) -> AppResult<Page<ProductAttribute>> {
        fetch_page(&self.pool, &PRODUCT_ATTRIBUTES, query, &self.query_config).await
    }

    /// Delete an attribute. Fails with `Conflict` while values still reference it.
    pub async fn delete_by_id(&self, id: ProductAttributeId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM product_attributes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match map_db_error(e, "Failed to delete product attribute") {
                err if err.is_not_found() => AppError::new(
                    ErrorKind::Conflict,
                    format!("Product attribute {id} still has values"),
                )
                .suppress(err),
                err => err,
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Product attribute {id} not found")));
        }
        info!(id = %id, rows_affected = result.rows_affected(), "Deleted product attribute");
        Ok(())
    }
}
