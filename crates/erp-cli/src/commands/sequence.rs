//! Sequence counter CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use erp_core::config::AppConfig;
use erp_core::error::AppError;
use erp_core::types::id::SequenceId;
use erp_database::repositories::SequenceRepository;
use erp_entity::sequence::{CreateSequence, Sequence, UpdateSequence};

use super::list::ListArgs;

/// Arguments for sequence commands
#[derive(Debug, Args)]
pub struct SequenceArgs {
    /// Sequence subcommand
    #[command(subcommand)]
    pub command: SequenceCommand,
}

/// Sequence subcommands
#[derive(Debug, Subcommand)]
pub enum SequenceCommand {
    /// List counters
    List(ListArgs),
    /// Show a counter by ID
    Get {
        /// Counter ID
        id: SequenceId,
    },
    /// Show a counter by name
    GetByName {
        /// Counter name
        name: String,
    },
    /// Create a counter
    Create {
        /// Unique name
        #[arg(long)]
        name: String,
        /// Unique prefix
        #[arg(long)]
        prefix: String,
        /// Entity the counter numbers
        #[arg(long)]
        struct_name: String,
        /// Digit count
        #[arg(long, default_value_t = erp_entity::sequence::model::DEFAULT_PADDING)]
        padding: i64,
        /// Starting value
        #[arg(long, default_value_t = 0)]
        current: i64,
        /// Create the counter inactive
        #[arg(long)]
        inactive: bool,
        /// Do not make the counter the default for its entity
        #[arg(long)]
        not_default: bool,
    },
    /// Change a counter
    Update {
        /// Counter ID
        id: SequenceId,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New prefix
        #[arg(long)]
        prefix: Option<String>,
        /// New digit count
        #[arg(long)]
        padding: Option<i64>,
        /// New current value
        #[arg(long)]
        current: Option<i64>,
        /// New active flag
        #[arg(long)]
        active: Option<bool>,
        /// New default flag
        #[arg(long)]
        default: Option<bool>,
    },
    /// Allocate the next number for an entity
    Next {
        /// Entity name
        struct_name: String,
        /// Show the next number without allocating it
        #[arg(long)]
        preview: bool,
    },
    /// Delete a counter
    Delete {
        /// Counter ID
        id: SequenceId,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

/// Sequence display row for table output
#[derive(Debug, Serialize, Tabled)]
struct SequenceRow {
    /// ID
    id: i64,
    /// Name
    name: String,
    /// Entity
    struct_name: String,
    /// Prefix
    prefix: String,
    /// Current
    current: i64,
    /// Next number
    next: String,
    /// Active
    active: bool,
    /// Default
    default: bool,
}

impl From<&Sequence> for SequenceRow {
    fn from(s: &Sequence) -> Self {
        Self {
            id: s.id.get(),
            name: s.name.clone(),
            struct_name: s.struct_name.clone(),
            prefix: s.prefix.clone(),
            current: s.current,
            next: s.preview_next().unwrap_or_else(|_| "exhausted".to_string()),
            active: s.active,
            default: s.is_default,
        }
    }
}

/// Execute sequence commands
pub async fn execute(
    args: &SequenceArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let repo = SequenceRepository::new(pool.into_pool()).with_query_config(config.query);

    match &args.command {
        SequenceCommand::List(list) => {
            let page = repo.list(&list.to_query()?).await?;
            let rows: Vec<SequenceRow> = page.items.iter().map(SequenceRow::from).collect();
            output::print_page(&rows, &page.paginator, format);
        }
        SequenceCommand::Get { id } => {
            output::print_item(&repo.find_by_id(*id).await?, format);
        }
        SequenceCommand::GetByName { name } => {
            output::print_item(&repo.find_by_name(name).await?, format);
        }
        SequenceCommand::Create {
            name,
            prefix,
            struct_name,
            padding,
            current,
            inactive,
            not_default,
        } => {
            let mut data = CreateSequence::new(name, prefix, struct_name)
                .with_padding(*padding)
                .with_current(*current);
            data.active = !inactive;
            data.is_default = !not_default;

            let created = repo.create(&data, None).await?;
            output::print_success(&format!(
                "Sequence '{}' created (id {}, next {})",
                created.name,
                created.id,
                created.preview_next()?
            ));
        }
        SequenceCommand::Update {
            id,
            name,
            prefix,
            padding,
            current,
            active,
            default,
        } => {
            let data = UpdateSequence {
                name: name.clone(),
                prefix: prefix.clone(),
                current: *current,
                padding: *padding,
                struct_name: None,
                active: *active,
                is_default: *default,
            };
            let updated = repo.update_by_id(*id, &data, None).await?;
            output::print_item(&updated, format);
        }
        SequenceCommand::Next {
            struct_name,
            preview,
        } => {
            let value = if *preview {
                repo.preview_next(struct_name).await?
            } else {
                repo.next_value(struct_name).await?
            };
            output::print_value(&value, format);
        }
        SequenceCommand::Delete { id, force } => {
            let sequence = repo.find_by_id(*id).await?;
            let prompt = format!("Delete sequence '{}' ({})?", sequence.name, sequence.prefix);
            if !super::confirm(&prompt, *force)? {
                println!("Cancelled.");
                return Ok(());
            }
            repo.delete_by_id(*id).await?;
            output::print_success(&format!("Sequence '{}' deleted", sequence.name));
        }
    }

    Ok(())
}
