//! Sorting types for list queries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

use super::filter::FieldPath;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// Return the SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(AppError::validation(
                "Invalid order. Must be either [asc|desc]",
            )),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// A field path and the direction to sort it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    /// Field to sort by.
    pub path: FieldPath,
    /// Sort direction.
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortField {
    /// Create a new sort field.
    pub fn new(path: FieldPath, direction: SortDirection) -> Self {
        Self { path, direction }
    }

    /// Create an ascending sort on a root column.
    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(FieldPath::column(column), SortDirection::Asc)
    }

    /// Create a descending sort on a root column.
    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(FieldPath::column(column), SortDirection::Desc)
    }
}

/// Pair up `sortby` fields with `order` directions.
///
/// - one order per field: applied pairwise;
/// - a single order: applied to every field;
/// - no fields: any order is rejected as unused;
/// - anything else is a size mismatch.
pub fn resolve_sort<S: AsRef<str>, O: AsRef<str>>(
    sortby: &[S],
    order: &[O],
) -> AppResult<Vec<SortField>> {
    if sortby.is_empty() {
        if !order.is_empty() {
            return Err(AppError::validation("unused 'order' fields"));
        }
        return Ok(Vec::new());
    }

    let directions: Vec<SortDirection> = if order.len() == sortby.len() {
        order
            .iter()
            .map(|o| o.as_ref().parse())
            .collect::<AppResult<_>>()?
    } else if order.len() == 1 {
        let direction: SortDirection = order[0].as_ref().parse()?;
        vec![direction; sortby.len()]
    } else {
        return Err(AppError::validation(
            "'sortby', 'order' sizes mismatch or 'order' size is not 1",
        ));
    };

    sortby
        .iter()
        .zip(directions)
        .map(|(field, direction)| Ok(SortField::new(FieldPath::parse(field.as_ref())?, direction)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const NONE: [&str; 0] = [];

    #[test]
    fn test_pairwise_orders() {
        let sort = resolve_sort(&["name", "prefix"], &["desc", "asc"]).expect("resolve");
        assert_eq!(sort, vec![SortField::desc("name"), SortField::asc("prefix")]);
    }

    #[test]
    fn test_single_order_applies_to_all() {
        let sort = resolve_sort(&["name", "prefix", "current"], &["desc"]).expect("resolve");
        assert_eq!(sort.len(), 3);
        assert!(sort.iter().all(|s| s.direction == SortDirection::Desc));
    }

    #[test]
    fn test_size_mismatch() {
        let err = resolve_sort(&["name", "prefix", "current"], &["asc", "desc"]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("sizes mismatch"));
    }

    #[test]
    fn test_unused_order() {
        let err = resolve_sort(&NONE, &["asc"]).unwrap_err();
        assert_eq!(err.message, "unused 'order' fields");
    }

    #[test]
    fn test_invalid_direction() {
        let err = resolve_sort(&["name"], &["up"]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("[asc|desc]"));
    }

    #[test]
    fn test_empty_is_empty() {
        assert!(resolve_sort(&NONE, &NONE).expect("resolve").is_empty());
    }
}
