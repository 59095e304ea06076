//! Product attribute value CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use erp_core::config::AppConfig;
use erp_core::error::AppError;
use erp_core::types::id::{ProductAttributeId, ProductAttributeValueId, ProductId};
use erp_database::repositories::ProductAttributeValueRepository;
use erp_entity::product::{
    CreateProductAttributeValue, ProductAttributeValueDetail, UpdateProductAttributeValue,
};

use super::list::ListArgs;

/// Arguments for attribute value commands
#[derive(Debug, Args)]
pub struct AttributeValueArgs {
    /// Attribute value subcommand
    #[command(subcommand)]
    pub command: AttributeValueCommand,
}

/// Attribute value subcommands
#[derive(Debug, Subcommand)]
pub enum AttributeValueCommand {
    /// List values with their attribute and products
    List(ListArgs),
    /// Show a value by ID
    Get {
        /// Value ID
        id: ProductAttributeValueId,
    },
    /// Show a value by name
    GetByName {
        /// Value name
        name: String,
    },
    /// Create a value
    Create {
        /// Unique name
        #[arg(long)]
        name: String,
        /// Parent attribute ID
        #[arg(long)]
        attribute: ProductAttributeId,
        /// Extra price
        #[arg(long, default_value_t = 0.0)]
        price_extra: f64,
        /// Display order
        #[arg(long, default_value_t = 0)]
        sequence: i32,
        /// Linked product ID; repeatable
        #[arg(long = "product")]
        products: Vec<ProductId>,
    },
    /// Change a value
    Update {
        /// Value ID
        id: ProductAttributeValueId,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New parent attribute ID
        #[arg(long)]
        attribute: Option<ProductAttributeId>,
        /// New extra price
        #[arg(long)]
        price_extra: Option<f64>,
        /// New display order
        #[arg(long)]
        sequence: Option<i32>,
        /// Replacement product links; repeatable
        #[arg(long = "product")]
        products: Vec<ProductId>,
        /// Remove every product link
        #[arg(long, conflicts_with = "products")]
        clear_products: bool,
    },
    /// Delete a value and its product links
    Delete {
        /// Value ID
        id: ProductAttributeValueId,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct ValueRow {
    id: i64,
    name: String,
    attribute: String,
    price_extra: f64,
    sequence: i32,
    products: String,
}

impl From<&ProductAttributeValueDetail> for ValueRow {
    fn from(d: &ProductAttributeValueDetail) -> Self {
        Self {
            id: d.value.id.get(),
            name: d.value.name.clone(),
            attribute: d.attribute.name.clone(),
            price_extra: d.value.price_extra,
            sequence: d.value.sequence,
            products: d
                .product_ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// Execute attribute value commands
pub async fn execute(
    args: &AttributeValueArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let repo =
        ProductAttributeValueRepository::new(pool.into_pool()).with_query_config(config.query);

    match &args.command {
        AttributeValueCommand::List(list) => {
            let page = repo.list_detailed(&list.to_query()?).await?;
            let rows: Vec<ValueRow> = page.items.iter().map(ValueRow::from).collect();
            output::print_page(&rows, &page.paginator, format);
        }
        AttributeValueCommand::Get { id } => {
            output::print_item(&repo.find_detail_by_id(*id).await?, format);
        }
        AttributeValueCommand::GetByName { name } => {
            let value = repo.find_by_name(name).await?;
            output::print_item(&repo.find_detail_by_id(value.id).await?, format);
        }
        AttributeValueCommand::Create {
            name,
            attribute,
            price_extra,
            sequence,
            products,
        } => {
            let data = CreateProductAttributeValue {
                name: name.clone(),
                attribute_id: Some(*attribute),
                product_ids: products.clone(),
                price_extra: *price_extra,
                sequence: *sequence,
            };
            let created = repo.create(&data, None).await?;
            output::print_success(&format!(
                "Attribute value '{}' created (id {}, {} products)",
                created.name,
                created.id,
                products.len()
            ));
        }
        AttributeValueCommand::Update {
            id,
            name,
            attribute,
            price_extra,
            sequence,
            products,
            clear_products,
        } => {
            let product_ids = if *clear_products {
                Some(Vec::new())
            } else if products.is_empty() {
                None
            } else {
                Some(products.clone())
            };
            let data = UpdateProductAttributeValue {
                name: name.clone(),
                attribute_id: *attribute,
                price_extra: *price_extra,
                sequence: *sequence,
                product_ids,
            };
            repo.update_by_id(*id, &data, None).await?;
            output::print_item(&repo.find_detail_by_id(*id).await?, format);
        }
        AttributeValueCommand::Delete { id, force } => {
            let value = repo.find_by_id(*id).await?;
            if !super::confirm(&format!("Delete attribute value '{}'?", value.name), *force)? {
                println!("Cancelled.");
                return Ok(());
            }
            repo.delete_by_id(*id).await?;
            output::print_success(&format!("Attribute value '{}' deleted", value.name));
        }
    }

    Ok(())
}
