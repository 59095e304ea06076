//! Translation of a typed [`ListQuery`] into `COUNT` and page statements.

use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};

use erp_core::config::QueryConfig;
use erp_core::error::AppError;
use erp_core::result::AppResult;
use erp_core::types::filter::{
    ConditionGroup, Conjunction, FieldPath, FilterField, FilterOp, FilterValue,
};
use erp_core::types::query::ListQuery;
use erp_core::types::sorting::SortDirection;

use super::table::{ColumnKind, Table};

/// A value coerced to its column's type, ready to be bound.
#[derive(Debug, Clone, PartialEq)]
enum BindValue {
    Text(String),
    BigInt(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    One(BindValue),
    Many(Vec<BindValue>),
    Null(bool),
}

#[derive(Debug, Clone, PartialEq)]
struct Predicate {
    column: String,
    op: FilterOp,
    operand: Operand,
}

#[derive(Debug, Clone, PartialEq)]
enum Clause {
    Match(Predicate),
    Exclude(Predicate),
    Group {
        conjunction: Conjunction,
        negated: bool,
        predicates: Vec<Predicate>,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct Join {
    table: &'static str,
    alias: String,
    on_left: String,
    on_right: String,
}

/// A validated list query, resolved against a table descriptor.
///
/// Compiling never touches the database, so a query with an unknown
/// field or a malformed value fails before any statement is sent.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    table: &'static Table,
    joins: Vec<Join>,
    clauses: Vec<Clause>,
    order: Vec<(String, SortDirection)>,
    projection: Option<Vec<&'static str>>,
    limit: i64,
    offset: i64,
}

impl CompiledQuery {
    /// Resolve `query` against `table`, applying the page-size defaults in `config`.
    pub fn compile(
        table: &'static Table,
        query: &ListQuery,
        config: &QueryConfig,
    ) -> AppResult<Self> {
        let effective_limit = query.effective_limit(config);
        let limit = i64::try_from(effective_limit)
            .map_err(|_| AppError::validation(format!("limit {effective_limit} is out of range")))?;
        let offset = i64::try_from(query.offset)
            .map_err(|_| AppError::validation(format!("offset {} is out of range", query.offset)))?;

        let mut compiled = Self {
            table,
            joins: Vec::new(),
            clauses: Vec::new(),
            order: Vec::new(),
            projection: None,
            limit,
            offset,
        };

        for filter in &query.filters {
            let predicate = compiled.predicate(filter)?;
            compiled.clauses.push(Clause::Match(predicate));
        }
        for filter in &query.excludes {
            let predicate = compiled.predicate(filter)?;
            compiled.clauses.push(Clause::Exclude(predicate));
        }
        for group in &query.conditions {
            let clause = compiled.group(group)?;
            if let Some(clause) = clause {
                compiled.clauses.push(clause);
            }
        }

        if !query.fields.is_empty() {
            let mut projection = vec!["id"];
            for path in &query.fields {
                if !path.is_local() {
                    return Err(AppError::validation(format!(
                        "Cannot project related field '{path}'"
                    )));
                }
                let column = table.column(path.column_name()).ok_or_else(|| {
                    AppError::validation(format!("unknown field '{path}' on {}", table.name))
                })?;
                if !projection.contains(&column.name) {
                    projection.push(column.name);
                }
            }
            compiled.projection = Some(projection);
        }

        let id_column = format!("{}.id", table.alias);
        for sort in &query.sort {
            let (column, _) = compiled.resolve(&sort.path)?;
            compiled.order.push((column, sort.direction));
        }
        if !compiled.order.iter().any(|(c, _)| *c == id_column) {
            compiled.order.push((id_column, SortDirection::Asc));
        }

        Ok(compiled)
    }

    /// Effective page size.
    pub fn limit(&self) -> u64 {
        self.limit.unsigned_abs()
    }

    /// Rows skipped.
    pub fn offset(&self) -> u64 {
        self.offset.unsigned_abs()
    }

    /// Statement counting every row that matches the filters.
    pub fn count_builder(&self) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM ");
        self.push_from(&mut builder);
        self.push_where(&mut builder);
        builder
    }

    /// Statement selecting one page of rows.
    pub fn select_builder(&self) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new("SELECT ");
        let alias = self.table.alias;
        let select_list: Vec<String> = self
            .table
            .columns
            .iter()
            .map(|column| {
                let loaded = self
                    .projection
                    .as_ref()
                    .is_none_or(|p| p.contains(&column.name));
                if loaded {
                    format!("{alias}.{}", column.name)
                } else {
                    format!("{} AS {}", column.zero_expr(), column.name)
                }
            })
            .collect();
        builder.push(select_list.join(", "));
        builder.push(" FROM ");
        self.push_from(&mut builder);
        self.push_where(&mut builder);

        let order: Vec<String> = self
            .order
            .iter()
            .map(|(column, direction)| format!("{column} {}", direction.as_sql()))
            .collect();
        builder.push(" ORDER BY ");
        builder.push(order.join(", "));

        builder.push(" LIMIT ");
        builder.push_bind(self.limit);
        builder.push(" OFFSET ");
        builder.push_bind(self.offset);
        builder
    }

    fn push_from(&self, builder: &mut QueryBuilder<'static, Postgres>) {
        builder.push(format!("{} AS {}", self.table.name, self.table.alias));
        for join in &self.joins {
            builder.push(format!(
                " LEFT JOIN {} AS {} ON {} = {}",
                join.table, join.alias, join.on_left, join.on_right
            ));
        }
    }

    fn push_where(&self, builder: &mut QueryBuilder<'static, Postgres>) {
        for (i, clause) in self.clauses.iter().enumerate() {
            builder.push(if i == 0 { " WHERE " } else { " AND " });
            match clause {
                Clause::Match(predicate) => push_predicate(builder, predicate),
                Clause::Exclude(predicate) => {
                    builder.push("NOT (");
                    push_predicate(builder, predicate);
                    builder.push(")");
                }
                Clause::Group {
                    conjunction,
                    negated,
                    predicates,
                } => {
                    if *negated {
                        builder.push("NOT ");
                    }
                    builder.push("(");
                    for (j, predicate) in predicates.iter().enumerate() {
                        if j > 0 {
                            builder.push(conjunction.as_sql());
                        }
                        push_predicate(builder, predicate);
                    }
                    builder.push(")");
                }
            }
        }
    }

    /// Resolve a field path to a qualified column, registering the joins it needs.
    fn resolve(&mut self, path: &FieldPath) -> AppResult<(String, ColumnKind)> {
        let mut table = self.table;
        let mut alias = table.alias.to_string();

        for segment in path.relations() {
            let relation = table.relation(segment).ok_or_else(|| {
                AppError::validation(format!("unknown relation '{segment}' on {}", table.name))
            })?;
            let joined_alias = format!("{alias}__{}", relation.name);
            if !self.joins.iter().any(|j| j.alias == joined_alias) {
                self.joins.push(Join {
                    table: relation.target.name,
                    alias: joined_alias.clone(),
                    on_left: format!("{joined_alias}.{}", relation.target_column),
                    on_right: format!("{alias}.{}", relation.local_column),
                });
            }
            table = relation.target;
            alias = joined_alias;
        }

        let column = table.column(path.column_name()).ok_or_else(|| {
            AppError::validation(format!("unknown field '{path}' on {}", self.table.name))
        })?;
        Ok((format!("{alias}.{}", column.name), column.kind))
    }

    fn predicate(&mut self, filter: &FilterField) -> AppResult<Predicate> {
        let (column, kind) = self.resolve(&filter.path)?;
        let operand = operand(kind, filter)?;
        Ok(Predicate {
            column,
            op: filter.op,
            operand,
        })
    }

    fn group(&mut self, group: &ConditionGroup) -> AppResult<Option<Clause>> {
        if group.filters.is_empty() {
            return Ok(None);
        }
        let predicates = group
            .filters
            .iter()
            .map(|f| self.predicate(f))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(Some(Clause::Group {
            conjunction: group.conjunction,
            negated: group.negated,
            predicates,
        }))
    }
}

fn push_predicate(builder: &mut QueryBuilder<'static, Postgres>, predicate: &Predicate) {
    let column = &predicate.column;
    match (&predicate.operand, predicate.op) {
        (Operand::Null(is_null), _) => {
            builder.push(format!(
                "{column} {}",
                if *is_null { "IS NULL" } else { "IS NOT NULL" }
            ));
        }
        (Operand::Many(values), _) => {
            if values.is_empty() {
                builder.push("FALSE");
                return;
            }
            builder.push(format!("{column} IN ("));
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    builder.push(", ");
                }
                push_bind(builder, value);
            }
            builder.push(")");
        }
        (Operand::One(value), op) => match op {
            FilterOp::IExact => {
                builder.push(format!("LOWER({column}) = LOWER("));
                push_bind(builder, value);
                builder.push(")");
            }
            op if op.is_pattern() => {
                let keyword = if op.is_case_insensitive() { "ILIKE" } else { "LIKE" };
                builder.push(format!("{column} {keyword} "));
                push_bind(builder, value);
                builder.push(" ESCAPE '\\'");
            }
            _ => {
                builder.push(format!("{column} {} ", comparison(op)));
                push_bind(builder, value);
            }
        },
    }
}

fn push_bind(builder: &mut QueryBuilder<'static, Postgres>, value: &BindValue) {
    match value {
        BindValue::Text(v) => builder.push_bind(v.clone()),
        BindValue::BigInt(v) => builder.push_bind(*v),
        BindValue::Float(v) => builder.push_bind(*v),
        BindValue::Bool(v) => builder.push_bind(*v),
        BindValue::Timestamp(v) => builder.push_bind(*v),
    };
}

fn comparison(op: FilterOp) -> &'static str {
    match op {
        FilterOp::Gt => ">",
        FilterOp::Gte => ">=",
        FilterOp::Lt => "<",
        FilterOp::Lte => "<=",
        _ => "=",
    }
}

fn operand(kind: ColumnKind, filter: &FilterField) -> AppResult<Operand> {
    let path = &filter.path;
    match filter.op {
        FilterOp::IsNull => {
            let flag = match coerce(ColumnKind::Bool, &filter.value, path)? {
                BindValue::Bool(b) => b,
                _ => true,
            };
            Ok(Operand::Null(flag))
        }
        FilterOp::In => match &filter.value {
            FilterValue::List(items) => items
                .iter()
                .map(|v| coerce(kind, v, path))
                .collect::<AppResult<Vec<_>>>()
                .map(Operand::Many),
            single => Ok(Operand::Many(vec![coerce(kind, single, path)?])),
        },
        op if op.is_pattern() || op == FilterOp::IExact => {
            if kind != ColumnKind::Text {
                return Err(AppError::validation(format!(
                    "Operator '{op}' requires a text field, '{path}' is not one"
                )));
            }
            let text = match coerce(kind, &filter.value, path)? {
                BindValue::Text(t) => t,
                _ => String::new(),
            };
            if op == FilterOp::IExact {
                return Ok(Operand::One(BindValue::Text(text)));
            }
            let escaped = escape_like(&text);
            let pattern = match op {
                FilterOp::Contains | FilterOp::IContains => format!("%{escaped}%"),
                FilterOp::StartsWith | FilterOp::IStartsWith => format!("{escaped}%"),
                _ => format!("%{escaped}"),
            };
            Ok(Operand::One(BindValue::Text(pattern)))
        }
        FilterOp::Exact if filter.value == FilterValue::Null => Ok(Operand::Null(true)),
        _ => Ok(Operand::One(coerce(kind, &filter.value, path)?)),
    }
}

fn coerce(kind: ColumnKind, value: &FilterValue, path: &FieldPath) -> AppResult<BindValue> {
    let invalid = || {
        AppError::validation(format!(
            "Invalid value {value:?} for {} field '{path}'",
            kind.sql_type()
        ))
    };

    let coerced = match (kind, value) {
        (ColumnKind::Text, FilterValue::String(s)) => BindValue::Text(s.clone()),
        (ColumnKind::Text, FilterValue::Integer(i)) => BindValue::Text(i.to_string()),
        (ColumnKind::Text, FilterValue::Float(f)) => BindValue::Text(f.to_string()),
        (ColumnKind::Text, FilterValue::Boolean(b)) => BindValue::Text(b.to_string()),

        (ColumnKind::BigInt | ColumnKind::Int, FilterValue::Integer(i)) => BindValue::BigInt(*i),
        (ColumnKind::BigInt | ColumnKind::Int, FilterValue::String(s)) => {
            BindValue::BigInt(s.trim().parse().map_err(|_| invalid())?)
        }

        (ColumnKind::Float, FilterValue::Float(f)) => BindValue::Float(*f),
        (ColumnKind::Float, FilterValue::Integer(i)) => BindValue::Float(*i as f64),
        (ColumnKind::Float, FilterValue::String(s)) => {
            BindValue::Float(s.trim().parse().map_err(|_| invalid())?)
        }

        (ColumnKind::Bool, FilterValue::Boolean(b)) => BindValue::Bool(*b),
        (ColumnKind::Bool, FilterValue::Integer(i)) => BindValue::Bool(*i != 0),
        (ColumnKind::Bool, FilterValue::String(s)) => {
            match s.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "1" | "yes" => BindValue::Bool(true),
                "false" | "f" | "0" | "no" => BindValue::Bool(false),
                _ => return Err(invalid()),
            }
        }

        (ColumnKind::Timestamp, FilterValue::String(s)) => BindValue::Timestamp(
            DateTime::parse_from_rfc3339(s.trim())
                .map_err(|_| invalid())?
                .with_timezone(&Utc),
        ),

        _ => return Err(invalid()),
    };
    Ok(coerced)
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
