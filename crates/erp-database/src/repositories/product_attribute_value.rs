//! Product attribute value repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};

use erp_core::config::QueryConfig;
use erp_core::error::AppError;
use erp_core::result::AppResult;
use erp_core::traits::Repository;
use erp_core::types::id::{ProductAttributeId, ProductAttributeValueId, ProductId, UserId};
use erp_core::types::pagination::Page;
use erp_core::types::query::ListQuery;
use erp_entity::product::{
    CreateProductAttributeValue, ProductAttribute, ProductAttributeValue,
    ProductAttributeValueDetail, UpdateProductAttributeValue,
};
use erp_entity::validation::validate_payload;

use crate::error::{begin, commit, map_db_error, rollback};
use crate::query::{fetch_page, table::PRODUCT_ATTRIBUTE_VALUES};

/// Repository for product attribute values and their product links.
#[derive(Debug, Clone)]
pub struct ProductAttributeValueRepository {
    pool: PgPool,
    query_config: QueryConfig,
}

impl ProductAttributeValueRepository {
    /// Create a new attribute value repository.
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

    /// Create a value and its product links in one transaction.
    ///
    /// A missing attribute or product rolls the whole insert back.
    pub async fn create(
        &self,
        data: &CreateProductAttributeValue,
        actor: Option<UserId>,
    ) -> AppResult<ProductAttributeValue> {
        validate_payload(data)?;
        let attribute_id = data
            .attribute_id
            .ok_or_else(|| AppError::validation("attribute is required"))?;

        let mut tx = begin(&self.pool).await?;
        match insert_value(&mut tx, data, attribute_id, actor).await {
            Ok(value) => {
                commit(tx).await?;
                info!(
                    id = %value.id,
                    name = %value.name,
                    products = data.product_ids.len(),
                    "Created product attribute value"
                );
                Ok(value)
            }
            Err(e) => Err(rollback(tx, e).await),
        }
    }

    /// Find a value by ID.
    pub async fn find_by_id(&self, id: ProductAttributeValueId) -> AppResult<ProductAttributeValue> {
        sqlx::query_as::<_, ProductAttributeValue>(
            "SELECT * FROM product_attribute_values WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to find product attribute value by id"))?
        .ok_or_else(|| AppError::not_found(format!("Product attribute value {id} not found")))
    }

    /// Find a value by name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<ProductAttributeValue> {
        sqlx::query_as::<_, ProductAttributeValue>(
            "SELECT * FROM product_attribute_values WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to find product attribute value by name"))?
        .ok_or_else(|| AppError::not_found(format!("Product attribute value '{name}' not found")))
    }

    /// Find a value with its attribute and product links loaded.
    pub async fn find_detail_by_id(
        &self,
        id: ProductAttributeValueId,
    ) -> AppResult<ProductAttributeValueDetail> {
        let value = self.find_by_id(id).await?;
        let mut details = self.load_details(vec![value]).await?;
        details
            .pop()
            .ok_or_else(|| AppError::internal(format!("Details for value {id} were not loaded")))
    }

    /// Products linked to a value, ascending by ID.
    pub async fn product_ids(&self, id: ProductAttributeValueId) -> AppResult<Vec<ProductId>> {
        sqlx::query_scalar::<_, ProductId>(
            "SELECT product_id FROM product_attribute_value_products \
             WHERE value_id = $1 ORDER BY product_id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to load product links"))
    }

    /// Filtered, sorted, paginated listing.
    pub async fn list(&self, query: &ListQuery) -> AppResult<Page<ProductAttributeValue>> {
        fetch_page(&self.pool, &PRODUCT_ATTRIBUTE_VALUES, query, &self.query_config).await
    }

    /// Like [`list`](Self::list), with attributes and product links loaded.
    ///
    /// Projections are ignored so that every value carries a real attribute id.
    pub async fn list_detailed(
        &self,
        query: &ListQuery,
    ) -> AppResult<Page<ProductAttributeValueDetail>> {
        let mut query = query.clone();
        query.fields.clear();

        let page = self.list(&query).await?;
        let details = self.load_details(page.items).await?;
        Ok(Page::new(page.paginator, details))
    }

    /// Update a value; `product_ids`, when given, replaces every link.
    pub async fn update_by_id(
        &self,
        id: ProductAttributeValueId,
        data: &UpdateProductAttributeValue,
        actor: Option<UserId>,
    ) -> AppResult<ProductAttributeValue> {
        validate_payload(data)?;

        let mut tx = begin(&self.pool).await?;
        match update_value(&mut tx, id, data, actor).await {
            Ok((value, rows_affected)) => {
                commit(tx).await?;
                info!(id = %id, rows_affected, "Updated product attribute value");
                Ok(value)
            }
            Err(e) => Err(rollback(tx, e).await),
        }
    }

    /// Delete a value; its product links go with it.
    pub async fn delete_by_id(&self, id: ProductAttributeValueId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM product_attribute_values WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Failed to delete product attribute value"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Product attribute value {id} not found"
            )));
        }
        info!(
            id = %id,
            rows_affected = result.rows_affected(),
            "Deleted product attribute value"
        );
        Ok(())
    }

    /// Count total values.
    pub async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_attribute_values")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Failed to count product attribute values"))?;
        Ok(count as u64)
    }

    /// Attach attributes and product links with one query each.
    async fn load_details(
        &self,
        values: Vec<ProductAttributeValue>,
    ) -> AppResult<Vec<ProductAttributeValueDetail>> {
        if values.is_empty() {
            return Ok(Vec::new());
        }

        let mut attribute_ids: Vec<i64> = values.iter().map(|v| v.attribute_id.get()).collect();
        attribute_ids.sort_unstable();
        attribute_ids.dedup();
        let value_ids: Vec<i64> = values.iter().map(|v| v.id.get()).collect();

        let attributes: HashMap<ProductAttributeId, ProductAttribute> =
            sqlx::query_as::<_, ProductAttribute>(
                "SELECT * FROM product_attributes WHERE id = ANY($1)",
            )
            .bind(&attribute_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Failed to load product attributes"))?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        let links: Vec<(ProductAttributeValueId, ProductId)> = sqlx::query_as(
            "SELECT value_id, product_id FROM product_attribute_value_products \
             WHERE value_id = ANY($1) ORDER BY value_id, product_id",
        )
        .bind(&value_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to load product links"))?;

        let mut products: HashMap<ProductAttributeValueId, Vec<ProductId>> = HashMap::new();
        for (value_id, product_id) in links {
            products.entry(value_id).or_default().push(product_id);
        }
        debug!(
            values = values.len(),
            attributes = attributes.len(),
            "Loaded attribute value details"
        );

        values
            .into_iter()
            .map(|value| {
                let attribute = attributes.get(&value.attribute_id).cloned().ok_or_else(|| {
                    AppError::internal(format!(
                        "Attribute {} of value {} is missing",
                        value.attribute_id, value.id
                    ))
                })?;
                let product_ids = products.remove(&value.id).unwrap_or_default();
                Ok(ProductAttributeValueDetail {
                    value,
                    attribute,
                    product_ids,
                })
            })
            .collect()
    }
}

async fn ensure_attribute(conn: &mut PgConnection, id: ProductAttributeId) -> AppResult<()> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM product_attributes WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| map_db_error(e, "Failed to look up product attribute"))?;

    if !exists {
        return Err(AppError::not_found(format!("Product attribute {id} not found")));
    }
    Ok(())
}

async fn replace_links(
    conn: &mut PgConnection,
    value_id: ProductAttributeValueId,
    product_ids: &[ProductId],
    clear_existing: bool,
) -> AppResult<()> {
    if clear_existing {
        sqlx::query("DELETE FROM product_attribute_value_products WHERE value_id = $1")
            .bind(value_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| map_db_error(e, "Failed to clear product links"))?;
    }

    let mut ids: Vec<i64> = product_ids.iter().map(|p| p.get()).collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO product_attribute_value_products (value_id, product_id) \
         SELECT $1, UNNEST($2::bigint[])",
    )
    .bind(value_id)
    .bind(&ids)
    .execute(&mut *conn)
    .await
    .map_err(|e| map_db_error(e, "Failed to link products"))?;
    Ok(())
}

async fn insert_value(
    conn: &mut PgConnection,
    data: &CreateProductAttributeValue,
    attribute_id: ProductAttributeId,
    actor: Option<UserId>,
) -> AppResult<ProductAttributeValue> {
    ensure_attribute(conn, attribute_id).await?;

    let value = sqlx::query_as::<_, ProductAttributeValue>(
        "INSERT INTO product_attribute_values \
             (name, attribute_id, price_extra, sequence, create_user_id, update_user_id) \
         VALUES ($1, $2, $3, $4, $5, $5) RETURNING *",
    )
    .bind(data.name.trim())
    .bind(attribute_id)
    .bind(data.price_extra)
    .bind(data.sequence)
    .bind(actor)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_db_error(e, "Failed to create product attribute value"))?;

    replace_links(conn, value.id, &data.product_ids, false).await?;
    Ok(value)
}

async fn update_value(
    conn: &mut PgConnection,
    id: ProductAttributeValueId,
    data: &UpdateProductAttributeValue,
    actor: Option<UserId>,
) -> AppResult<(ProductAttributeValue, u64)> {
    if let Some(attribute_id) = data.attribute_id {
        ensure_attribute(conn, attribute_id).await?;
    }

    let value = sqlx::query_as::<_, ProductAttributeValue>(
        "UPDATE product_attribute_values SET name = COALESCE($2, name), \
                                             attribute_id = COALESCE($3, attribute_id), \
                                             price_extra = COALESCE($4, price_extra), \
                                             sequence = COALESCE($5, sequence), \
                                             update_user_id = COALESCE($6, update_user_id), \
                                             updated_at = NOW() \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.attribute_id)
    .bind(data.price_extra)
    .bind(data.sequence)
    .bind(actor)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| map_db_error(e, "Failed to update product attribute value"))?;

    let rows_affected = u64::from(value.is_some());
    let value = value
        .ok_or_else(|| AppError::not_found(format!("Product attribute value {id} not found")))?;

    if let Some(product_ids) = &data.product_ids {
        replace_links(conn, id, product_ids, true).await?;
    }
    Ok((value, rows_affected))
}

#[async_trait]
impl Repository<ProductAttributeValue, ProductAttributeValueId> for ProductAttributeValueRepository {
    type Create = CreateProductAttributeValue;
    type Update = UpdateProductAttributeValue;

    async fn create(
        &self,
        data: &CreateProductAttributeValue,
        actor: Option<UserId>,
    ) -> AppResult<ProductAttributeValue> {
        ProductAttributeValueRepository::create(self, data, actor).await
    }

    async fn find_by_id(&self, id: ProductAttributeValueId) -> AppResult<ProductAttributeValue> {
        ProductAttributeValueRepository::find_by_id(self, id).await
    }

    async fn find_by_name(&self, name: &str) -> AppResult<ProductAttributeValue> {
        ProductAttributeValueRepository::find_by_name(self, name).await
    }

    async fn list(&self, query: &ListQuery) -> AppResult<Page<ProductAttributeValue>> {
        ProductAttributeValueRepository::list(self, query).await
    }

    async fn update_by_id(
        &self,
        id: ProductAttributeValueId,
        data: &UpdateProductAttributeValue,
        actor: Option<UserId>,
    ) -> AppResult<ProductAttributeValue> {
        ProductAttributeValueRepository::update_by_id(self, id, data, actor).await
    }

    async fn delete_by_id(&self, id: ProductAttributeValueId) -> AppResult<()> {
        ProductAttributeValueRepository::delete_by_id(self, id).await
    }

    async fn count(&self) -> AppResult<u64> {
        ProductAttributeValueRepository::count(self).await
    }
}
