//! Repository implementations for all ERP entities.

pub mod product_attribute;
pub mod product_attribute_value;
pub mod sequence;

pub use product_attribute::ProductAttributeRepository;
pub use product_attribute_value::ProductAttributeValueRepository;
pub use sequence::SequenceRepository;
