//! Product attribute value entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use erp_core::types::id::{ProductAttributeId, ProductAttributeValueId, ProductId, UserId};

use super::attribute::ProductAttribute;

/// A value of a product attribute ("Red" for "Color"), linked to the
/// product variants that carry it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductAttributeValue {
    /// Primary key.
    pub id: ProductAttributeValueId,
    /// User who created the row.
    #[serde(skip)]
    pub create_user_id: Option<UserId>,
    /// User who last updated the row.
    #[serde(skip)]
    pub update_user_id: Option<UserId>,
    /// When the row was created.
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
    /// Unique value name.
    pub name: String,
    /// Parent attribute.
    pub attribute_id: ProductAttributeId,
    /// Price added to a variant carrying this value.
    pub price_extra: f64,
    /// Display order.
    pub sequence: i32,
}

/// An attribute value with its parent attribute and product links loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductAttributeValueDetail {
    /// The value row.
    #[serde(flatten)]
    pub value: ProductAttributeValue,
    /// The parent attribute.
    pub attribute: ProductAttribute,
    /// Linked product variants.
    pub product_ids: Vec<ProductId>,
}

/// Data required to create a new attribute value.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProductAttributeValue {
    /// Unique value name.
    #[validate(length(min = 1, max = 128), custom(function = "crate::validation::not_blank"))]
    pub name: String,
    /// Parent attribute; must reference an existing attribute.
    #[validate(required(message = "attribute is required"))]
    pub attribute_id: Option<ProductAttributeId>,
    /// Product variants to link.
    #[serde(default)]
    pub product_ids: Vec<ProductId>,
    /// Extra price.
    #[serde(default)]
    pub price_extra: f64,
    /// Display order.
    #[serde(default)]
    pub sequence: i32,
}

impl CreateProductAttributeValue {
    /// A value of `attribute_id` with no extra price and no product links.
    pub fn new(name: impl Into<String>, attribute_id: ProductAttributeId) -> Self {
        Self {
            name: name.into(),
            attribute_id: Some(attribute_id),
            product_ids: Vec::new(),
            price_extra: 0.0,
            sequence: 0,
        }
    }

    /// Set the extra price.
    pub fn with_price_extra(mut self, price_extra: f64) -> Self {
        self.price_extra = price_extra;
        self
    }

    /// Set the linked products.
    pub fn with_products(mut self, product_ids: Vec<ProductId>) -> Self {
        self.product_ids = product_ids;
        self
    }
}

/// Fields to change on an existing attribute value; `None` leaves a column as is.
///
/// `product_ids`, when present, replaces the full set of product links.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProductAttributeValue {
    /// New name.
    #[validate(length(min = 1, max = 128), custom(function = "crate::validation::not_blank"))]
    pub name: Option<String>,
    /// New parent attribute.
    pub attribute_id: Option<ProductAttributeId>,
    /// New extra price.
    pub price_extra: Option<f64>,
    /// New display order.
    pub sequence: Option<i32>,
    /// Replacement product links.
    pub product_ids: Option<Vec<ProductId>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_payload;

    #[test]
    fn test_attribute_is_required() {
        let data: CreateProductAttributeValue =
            serde_json::from_str(r#"{"name":"Red"}"#).expect("deserialize");
        let err = validate_payload(&data).unwrap_err();
        assert_eq!(err.kind, erp_core::error::ErrorKind::Validation);
    }

    #[test]
    fn test_builder() {
        let data = CreateProductAttributeValue::new("Red", ProductAttributeId::new(3))
            .with_price_extra(1.5)
            .with_products(vec![ProductId::new(10), ProductId::new(11)]);
        validate_payload(&data).expect("valid");
        assert_eq!(data.product_ids.len(), 2);
        assert_eq!(data.price_extra, 1.5);
    }

    #[test]
    fn test_detail_flattens_value() {
        let now = Utc::now();
        let detail = ProductAttributeValueDetail {
            value: ProductAttributeValue {
                id: ProductAttributeValueId::new(5),
                create_user_id: None,
                update_user_id: None,
                created_at: now,
                updated_at: now,
                name: "Red".into(),
                attribute_id: ProductAttributeId::new(3),
                price_extra: 0.0,
                sequence: 1,
            },
            attribute: ProductAttribute {
                id: ProductAttributeId::new(3),
                create_user_id: None,
                update_user_id: None,
                created_at: now,
                updated_at: now,
                name: "Color".into(),
                sequence: 0,
            },
            product_ids: vec![ProductId::new(10)],
        };
        let json = serde_json::to_value(&detail).expect("serialize");
        assert_eq!(json["name"], "Red");
        assert_eq!(json["attribute"]["name"], "Color");
        assert_eq!(json["product_ids"][0], 10);
    }
}
