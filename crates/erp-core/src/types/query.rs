//! Typed list query: filters, excludes, condition groups, projection,
//! sorting and offset/limit pagination.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::QueryConfig;
use crate::result::AppResult;

use super::filter::{ConditionGroup, FieldPath, FilterField};
use super::sorting::{SortField, resolve_sort};

/// A fully typed list query against one entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Filters that must all match.
    #[serde(default)]
    pub filters: Vec<FilterField>,
    /// Filters that must not match (each one is negated on its own).
    #[serde(default)]
    pub excludes: Vec<FilterField>,
    /// Additional parenthesised condition groups.
    #[serde(default)]
    pub conditions: Vec<ConditionGroup>,
    /// Columns to load; empty loads every column.
    #[serde(default)]
    pub fields: Vec<FieldPath>,
    /// Ordering, applied in sequence.
    #[serde(default)]
    pub sort: Vec<SortField>,
    /// Number of rows to skip.
    #[serde(default)]
    pub offset: u64,
    /// Maximum rows to return; zero selects the default page size.
    #[serde(default)]
    pub limit: u64,
}

impl ListQuery {
    /// An empty query: every row, default page size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter.
    pub fn filter(mut self, filter: FilterField) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add an exclusion.
    pub fn exclude(mut self, filter: FilterField) -> Self {
        self.excludes.push(filter);
        self
    }

    /// Add a condition group.
    pub fn condition(mut self, group: ConditionGroup) -> Self {
        self.conditions.push(group);
        self
    }

    /// Restrict the loaded columns.
    pub fn fields(mut self, fields: Vec<FieldPath>) -> Self {
        self.fields = fields;
        self
    }

    /// Append a sort field.
    pub fn sort_by(mut self, sort: SortField) -> Self {
        self.sort.push(sort);
        self
    }

    /// Set offset and limit.
    pub fn page(mut self, offset: u64, limit: u64) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    /// The limit actually applied: the default when zero, clamped to the maximum.
    pub fn effective_limit(&self, config: &QueryConfig) -> u64 {
        if self.limit == 0 {
            config.default_page_size.max(1)
        } else {
            self.limit.min(config.max_page_size.max(1))
        }
    }

    /// Build a typed query from raw, string-keyed parameters.
    pub fn from_params(params: &ListParams) -> AppResult<Self> {
        let filters = params
            .query
            .iter()
            .map(|(k, v)| FilterField::parse(k, v))
            .collect::<AppResult<Vec<_>>>()?;

        let excludes = params
            .exclude
            .iter()
            .map(|(k, v)| FilterField::parse(k, v))
            .collect::<AppResult<Vec<_>>>()?;

        let conditions = params
            .cond
            .iter()
            .map(|(key, entries)| {
                let filters = entries
                    .iter()
                    .map(|(k, v)| FilterField::parse(k, v))
                    .collect::<AppResult<Vec<_>>>()?;
                ConditionGroup::from_key(key, filters)
            })
            .collect::<AppResult<Vec<_>>>()?;

        let fields = params
            .fields
            .iter()
            .map(|f| FieldPath::parse(f))
            .collect::<AppResult<Vec<_>>>()?;

        let sort = resolve_sort(&params.sortby, &params.order)?;

        Ok(Self {
            filters,
            excludes,
            conditions,
            fields,
            sort,
            offset: params.offset,
            limit: params.limit,
        })
    }
}

/// Raw list parameters as an HTTP layer would collect them from a query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListParams {
    /// `path[__op]` → value filters.
    #[serde(default)]
    pub query: BTreeMap<String, String>,
    /// `path[__op]` → value exclusions.
    #[serde(default)]
    pub exclude: BTreeMap<String, String>,
    /// `and`/`or`/`and_not`/`or_not` → filters of that group.
    #[serde(default)]
    pub cond: BTreeMap<String, BTreeMap<String, String>>,
    /// Columns to load.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Sort fields.
    #[serde(default)]
    pub sortby: Vec<String>,
    /// Sort orders (`asc`/`desc`).
    #[serde(default)]
    pub order: Vec<String>,
    /// Rows to skip.
    #[serde(default)]
    pub offset: u64,
    /// Page size; zero selects the default.
    #[serde(default)]
    pub limit: u64,
}
