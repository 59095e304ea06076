//! Product attribute entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use erp_core::types::id::{ProductAttributeId, UserId};

/// A product attribute such as "Color" or "Size"; the parent of attribute values.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductAttribute {
    /// Primary key.
    pub id: ProductAttributeId,
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
    /// Unique attribute name.
    pub name: String,
    /// Display order.
    pub sequence: i32,
}

/// Data required to create a new product attribute.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProductAttribute {
    /// Unique attribute name.
    #[validate(length(min = 1, max = 128), custom(function = "crate::validation::not_blank"))]
    pub name: String,
    /// Display order.
    #[serde(default)]
    pub sequence: i32,
}

impl CreateProductAttribute {
    /// An attribute with display order zero.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sequence: 0,
        }
    }
}
