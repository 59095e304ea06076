//! Filter types for dynamic query building.
//!
//! A filter targets a [`FieldPath`] written in dot notation (`attribute.name`).
//! Leading segments name relations, the last one names a column. Filters
//! arriving as query-string keys use the `path__op` form
//! (`name__icontains`, `attribute.name__exact`) and are parsed with
//! [`FilterField::parse`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

/// Separator between a field path and its operator in query-string keys.
pub const OP_SEPARATOR: &str = "__";

/// A dot-notation path to a column, possibly through relations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a path such as `attribute.name` or `Attribute__Name`.
    ///
    /// Segments are normalised to snake case so that `StructName` and
    /// `struct_name` address the same column.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let segments: Vec<String> = raw
            .replace(OP_SEPARATOR, ".")
            .split('.')
            .map(|s| to_snake_case(s.trim()))
            .collect();

        if segments.iter().any(|s| s.is_empty()) {
            return Err(AppError::validation(format!("Invalid field path '{raw}'")));
        }
        if let Some(bad) = segments
            .iter()
            .find(|s| !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
        {
            return Err(AppError::validation(format!(
                "Invalid character in field path segment '{bad}'"
            )));
        }
        Ok(Self { segments })
    }

    /// Path to a column of the root table.
    pub fn column(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    /// The relation segments (everything but the last segment).
    pub fn relations(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    /// The column segment.
    pub fn column_name(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Whether the path addresses a column of the root table.
    pub fn is_local(&self) -> bool {
        self.segments.len() == 1
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl FromStr for FieldPath {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}

/// Filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    /// Exact equality.
    Exact,
    /// Case-insensitive equality.
    IExact,
    /// Substring match.
    Contains,
    /// Case-insensitive substring match.
    IContains,
    /// Prefix match.
    StartsWith,
    /// Case-insensitive prefix match.
    IStartsWith,
    /// Suffix match.
    EndsWith,
    /// Case-insensitive suffix match.
    IEndsWith,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// List membership.
    In,
    /// `IS NULL` when the value is true, `IS NOT NULL` when false.
    IsNull,
}

impl FilterOp {
    /// Return the operator's query-string suffix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::IExact => "iexact",
            Self::Contains => "contains",
            Self::IContains => "icontains",
            Self::StartsWith => "startswith",
            Self::IStartsWith => "istartswith",
            Self::EndsWith => "endswith",
            Self::IEndsWith => "iendswith",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
            Self::IsNull => "isnull",
        }
    }

    /// Look up an operator by its query-string suffix.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        let op = match suffix.to_ascii_lowercase().as_str() {
            "exact" => Self::Exact,
            "iexact" => Self::IExact,
            "contains" => Self::Contains,
            "icontains" => Self::IContains,
            "startswith" => Self::StartsWith,
            "istartswith" => Self::IStartsWith,
            "endswith" => Self::EndsWith,
            "iendswith" => Self::IEndsWith,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "in" => Self::In,
            "isnull" => Self::IsNull,
            _ => return None,
        };
        Some(op)
    }

    /// Whether the operator is a text pattern match.
    pub fn is_pattern(&self) -> bool {
        matches!(
            self,
            Self::Contains
                | Self::IContains
                | Self::StartsWith
                | Self::IStartsWith
                | Self::EndsWith
                | Self::IEndsWith
        )
    }

    /// Whether the operator compares case-insensitively.
    pub fn is_case_insensitive(&self) -> bool {
        matches!(
            self,
            Self::IExact | Self::IContains | Self::IStartsWith | Self::IEndsWith
        )
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A dynamic filter value.
///
/// Values coming from query strings are kept as [`FilterValue::String`] and
/// coerced to the column's type when the query is translated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// A boolean value.
    Boolean(bool),
    /// An integer value.
    Integer(i64),
    /// A floating-point value.
    Float(f64),
    /// A string value.
    String(String),
    /// A list of values (for the `in` operator).
    List(Vec<FilterValue>),
    /// Null / no value.
    Null,
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// A single filter condition on a field path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterField {
    /// The field to filter on.
    pub path: FieldPath,
    /// The comparison operator.
    pub op: FilterOp,
    /// The value to compare against.
    pub value: FilterValue,
}

impl FilterField {
    /// Create a new filter field.
    pub fn new(path: FieldPath, op: FilterOp, value: impl Into<FilterValue>) -> Self {
        Self {
            path,
            op,
            value: value.into(),
        }
    }

    /// Shorthand for an equality filter on a root column.
    pub fn eq(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(FieldPath::column(column), FilterOp::Exact, value)
    }

    /// Parse a query-string key (`path` or `path__op`) and its raw value.
    ///
    /// A value for the `in` operator is split on commas.
    pub fn parse(key: &str, raw_value: &str) -> AppResult<Self> {
        let (path_part, op) = match key.rsplit_once(OP_SEPARATOR) {
            Some((path, suffix)) => match FilterOp::from_suffix(suffix) {
                Some(op) => (path, op),
                None => (key, FilterOp::Exact),
            },
            None => (key, FilterOp::Exact),
        };

        let path = FieldPath::parse(path_part)?;
        let value = match op {
            FilterOp::In => FilterValue::List(
                raw_value
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(FilterValue::from)
                    .collect(),
            ),
            _ => FilterValue::String(raw_value.to_string()),
        };

        Ok(Self { path, op, value })
    }
}

/// How filters inside a [`ConditionGroup`] are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conjunction {
    /// All filters must match.
    And,
    /// At least one filter must match.
    Or,
}

impl Conjunction {
    /// Return the SQL keyword for this conjunction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }
}

/// A parenthesised group of filters, ANDed with the rest of the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionGroup {
    /// How the filters are combined.
    pub conjunction: Conjunction,
    /// Negate the whole group.
    #[serde(default)]
    pub negated: bool,
    /// The filters in this group.
    pub filters: Vec<FilterField>,
}

impl ConditionGroup {
    /// A group whose filters must all match.
    pub fn all(filters: Vec<FilterField>) -> Self {
        Self {
            conjunction: Conjunction::And,
            negated: false,
            filters,
        }
    }

    /// A group of which at least one filter must match.
    pub fn any(filters: Vec<FilterField>) -> Self {
        Self {
            conjunction: Conjunction::Or,
            negated: false,
            filters,
        }
    }

    /// Negate this group.
    pub fn not(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// Build a group from a condition-map key: `and`, `or`, `and_not`, `or_not`.
    pub fn from_key(key: &str, filters: Vec<FilterField>) -> AppResult<Self> {
        match key.to_ascii_lowercase().as_str() {
            "and" => Ok(Self::all(filters)),
            "or" => Ok(Self::any(filters)),
            "and_not" | "not" => Ok(Self::all(filters).not()),
            "or_not" => Ok(Self::any(filters).not()),
            other => Err(AppError::validation(format!(
                "Unknown condition '{other}'. Must be one of [and|or|and_not|or_not]"
            ))),
        }
    }
}

/// Convert `CamelCase` identifiers to `snake_case`; snake case input is unchanged.
pub fn to_snake_case(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("StructName"), "struct_name");
        assert_eq!(to_snake_case("IsDefault"), "is_default");
        assert_eq!(to_snake_case("AttributeID"), "attribute_id");
        assert_eq!(to_snake_case("ID"), "id");
        assert_eq!(to_snake_case("price_extra"), "price_extra");
    }

    #[test]
    fn test_field_path_dot_and_double_underscore() {
        let dotted = FieldPath::parse("Attribute.Name").expect("parse");
        let joined = FieldPath::parse("attribute__name").expect("parse");
        assert_eq!(dotted, joined);
        assert_eq!(dotted.relations(), &["attribute".to_string()]);
        assert_eq!(dotted.column_name(), "name");
        assert!(!dotted.is_local());
    }

    #[test]
    fn test_field_path_rejects_injection() {
        assert!(FieldPath::parse("name; DROP TABLE sequences").is_err());
        assert!(FieldPath::parse("attribute..name").is_err());
        assert!(FieldPath::parse("").is_err());
    }

    #[test]
    fn test_parse_key_with_operator() {
        let f = FilterField::parse("attribute.name__icontains", "col").expect("parse");
        assert_eq!(f.op, FilterOp::IContains);
        assert_eq!(f.path.to_string(), "attribute.name");
        assert_eq!(f.value, FilterValue::String("col".into()));
    }

    #[test]
    fn test_parse_key_without_operator_is_exact() {
        let f = FilterField::parse("StructName", "sale_order").expect("parse");
        assert_eq!(f.op, FilterOp::Exact);
        assert_eq!(f.path.to_string(), "struct_name");
    }

    #[test]
    fn test_parse_in_splits_on_commas() {
        let f = FilterField::parse("id__in", "1, 2,3,").expect("parse");
        assert_eq!(
            f.value,
            FilterValue::List(vec!["1".into(), "2".into(), "3".into()])
        );
    }

    #[test]
    fn test_condition_group_keys() {
        let g = ConditionGroup::from_key("or_not", vec![]).expect("key");
        assert_eq!(g.conjunction, Conjunction::Or);
        assert!(g.negated);
        assert!(ConditionGroup::from_key("xor", vec![]).is_err());
    }
}
