//! Product attribute CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use erp_core::config::AppConfig;
use erp_core::error::AppError;
use erp_core::types::id::ProductAttributeId;
use erp_database::repositories::ProductAttributeRepository;
use erp_entity::product::{CreateProductAttribute, ProductAttribute};

use super::list::ListArgs;

/// Arguments for attribute commands
#[derive(Debug, Args)]
pub struct AttributeArgs {
    /// Attribute subcommand
    #[command(subcommand)]
    pub command: AttributeCommand,
}

/// Attribute subcommands
#[derive(Debug, Subcommand)]
pub enum AttributeCommand {
    /// List attributes
    List(ListArgs),
    /// Create an attribute
    Create {
        /// Unique name
        name: String,
        /// Display order
        #[arg(long, default_value_t = 0)]
        sequence: i32,
    },
    /// Delete an attribute that has no values
    Delete {
        /// Attribute ID
        id: ProductAttributeId,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct AttributeRow {
    id: i64,
    name: String,
    sequence: i32,
}

impl From<&ProductAttribute> for AttributeRow {
    fn from(a: &ProductAttribute) -> Self {
        Self {
            id: a.id.get(),
            name: a.name.clone(),
            sequence: a.sequence,
        }
    }
}

/// Execute attribute commands
pub async fn execute(
    args: &AttributeArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let repo = ProductAttributeRepository::new(pool.into_pool()).with_query_config(config.query);

    match &args.command {
        AttributeCommand::List(list) => {
            let page = repo.list(&list.to_query()?).await?;
            let rows: Vec<AttributeRow> = page.items.iter().map(AttributeRow::from).collect();
            output::print_page(&rows, &page.paginator, format);
        }
        AttributeCommand::Create { name, sequence } => {
            let data = CreateProductAttribute {
                name: name.clone(),
                sequence: *sequence,
            };
            let created = repo.create(&data, None).await?;
            output::print_success(&format!(
                "Attribute '{}' created (id {})",
                created.name, created.id
            ));
        }
        AttributeCommand::Delete { id, force } => {
            let attribute = repo.find_by_id(*id).await?;
            if !super::confirm(&format!("Delete attribute '{}'?", attribute.name), *force)? {
                println!("Cancelled.");
                return Ok(());
            }
            repo.delete_by_id(*id).await?;
            output::print_success(&format!("Attribute '{}' deleted", attribute.name));
        }
    }

    Ok(())
}
