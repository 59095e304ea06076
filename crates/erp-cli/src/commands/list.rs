//! Shared list arguments for `list` subcommands.

use clap::Args;

use erp_core::error::AppError;
use erp_core::types::query::{ListParams, ListQuery};

/// Filtering, sorting and paging flags.
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Filter as `field[__op]=value`; repeatable
    #[arg(short = 'q', long = "query", value_parser = parse_key_value)]
    pub query: Vec<(String, String)>,

    /// Exclusion as `field[__op]=value`; repeatable
    #[arg(short = 'x', long = "exclude", value_parser = parse_key_value)]
    pub exclude: Vec<(String, String)>,

    /// Columns to load; repeatable
    #[arg(long = "field")]
    pub fields: Vec<String>,

    /// Sort columns; repeatable
    #[arg(long)]
    pub sortby: Vec<String>,

    /// Sort orders (`asc` or `desc`); one per `--sortby`, or a single one for all
    #[arg(long)]
    pub order: Vec<String>,

    /// Rows to skip
    #[arg(long, default_value_t = 0)]
    pub offset: u64,

    /// Page size; 0 selects the configured default
    #[arg(long, default_value_t = 0)]
    pub limit: u64,
}

impl ListArgs {
    /// Build a typed list query from the flags.
    pub fn to_query(&self) -> Result<ListQuery, AppError> {
        let params = ListParams {
            query: self.query.iter().cloned().collect(),
            exclude: self.exclude.iter().cloned().collect(),
            fields: self.fields.clone(),
            sortby: self.sortby.clone(),
            order: self.order.clone(),
            offset: self.offset,
            limit: self.limit,
            ..Default::default()
        };
        ListQuery::from_params(&params)
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("name__icontains=order=1"),
            Ok(("name__icontains".to_string(), "order=1".to_string()))
        );
        assert!(parse_key_value("name").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_to_query() {
        let args = ListArgs {
            query: vec![("struct_name".into(), "sale_order".into())],
            exclude: vec![],
            fields: vec![],
            sortby: vec!["name".into()],
            order: vec!["desc".into()],
            offset: 0,
            limit: 5,
        };
        let query = args.to_query().expect("query");
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.sort.len(), 1);
        assert_eq!(query.limit, 5);
    }
}
