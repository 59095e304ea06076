//! Product attribute entities.

pub mod attribute;
pub mod attribute_value;

pub use attribute::{CreateProductAttribute, ProductAttribute};
pub use attribute_value::{
    CreateProductAttributeValue, ProductAttributeValue, ProductAttributeValueDetail,
    UpdateProductAttributeValue,
};
