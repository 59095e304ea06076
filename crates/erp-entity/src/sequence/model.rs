//! Sequence counter entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use erp_core::error::{AppError, ErrorKind};
use erp_core::result::AppResult;
use erp_core::types::id::{SequenceId, UserId};

use super::format::format_sequence;

/// Default number of digits a counter is padded to.
pub const DEFAULT_PADDING: i64 = 8;
/// Widest padding accepted for a counter.
pub const MAX_PADDING: i64 = 32;

/// A named, prefixed, zero-padded counter used to number business
/// documents (sales orders, purchase orders, ...).
///
/// At most one `active` and `is_default` row exists per `struct_name`;
/// that row is the one allocation draws from.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Sequence {
    /// Primary key.
    pub id: SequenceId,
    /// User who created the row.
    #[serde(skip)]
    pub create_user_id: Option<UserId>,
    /// User who last updated the row.
    #[serde(skip)]
    pub update_user_id: Option<UserId>,
    /// When the row was created.
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
    /// Unique counter name.
    pub name: String,
    /// Unique prefix placed before the number.
    pub prefix: String,
    /// Last value handed out.
    pub current: i64,
    /// Digit count the number is zero-padded to.
    pub padding: i64,
    /// Entity (table) the counter numbers.
    pub struct_name: String,
    /// Whether the counter may be allocated from.
    pub active: bool,
    /// Whether this is the default counter for `struct_name`.
    pub is_default: bool,
}

impl Sequence {
    /// Render an arbitrary value with this counter's prefix and padding.
    pub fn format_value(&self, value: i64) -> String {
        format_sequence(&self.prefix, self.padding, value)
    }

    /// The string the next allocation will return.
    ///
    /// Fails with `Conflict` once `current` has reached `i64::MAX`.
    pub fn preview_next(&self) -> AppResult<String> {
        let next = self.current.checked_add(1).ok_or_else(|| {
            AppError::new(
                ErrorKind::Conflict,
                format!("Sequence '{}' is exhausted", self.name),
            )
        })?;
        Ok(self.format_value(next))
    }
}

/// Data required to create a new sequence counter.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSequence {
    /// Unique counter name.
    #[validate(length(min = 1, max = 128), custom(function = "crate::validation::not_blank"))]
    pub name: String,
    /// Unique prefix.
    #[validate(length(min = 1, max = 32), custom(function = "crate::validation::not_blank"))]
    pub prefix: String,
    /// Starting value; the first allocation returns `current + 1`.
    #[serde(default)]
    #[validate(range(min = 0))]
    pub current: i64,
    /// Digit count.
    #[serde(default = "default_padding")]
    #[validate(range(min = 0, max = 32))]
    pub padding: i64,
    /// Entity (table) the counter numbers.
    #[validate(length(min = 1, max = 128), custom(function = "crate::validation::not_blank"))]
    pub struct_name: String,
    /// Whether the counter may be allocated from.
    #[serde(default = "default_true")]
    pub active: bool,
    /// Whether this is the default counter for `struct_name`.
    #[serde(default = "default_true")]
    pub is_default: bool,
}

impl CreateSequence {
    /// An active default counter for `struct_name` with the default padding.
    pub fn new(
        name: impl Into<String>,
        prefix: impl Into<String>,
        struct_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            current: 0,
            padding: DEFAULT_PADDING,
            struct_name: struct_name.into(),
            active: true,
            is_default: true,
        }
    }

    /// Set the padding width.
    pub fn with_padding(mut self, padding: i64) -> Self {
        self.padding = padding;
        self
    }

    /// Set the starting value.
    pub fn with_current(mut self, current: i64) -> Self {
        self.current = current;
        self
    }
}

/// Fields to change on an existing counter; `None` leaves a column as is.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateSequence {
    /// New name.
    #[validate(length(min = 1, max = 128), custom(function = "crate::validation::not_blank"))]
    pub name: Option<String>,
    /// New prefix.
    #[validate(length(min = 1, max = 32), custom(function = "crate::validation::not_blank"))]
    pub prefix: Option<String>,
    /// New current value.
    #[validate(range(min = 0))]
    pub current: Option<i64>,
    /// New padding.
    #[validate(range(min = 0, max = 32))]
    pub padding: Option<i64>,
    /// New entity name.
    #[validate(length(min = 1, max = 128), custom(function = "crate::validation::not_blank"))]
    pub struct_name: Option<String>,
    /// New active flag.
    pub active: Option<bool>,
    /// New default flag.
    pub is_default: Option<bool>,
}

fn default_padding() -> i64 {
    DEFAULT_PADDING
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_payload;

    fn sample() -> Sequence {
        Sequence {
            id: SequenceId::new(1),
            create_user_id: Some(UserId::new(9)),
            update_user_id: Some(UserId::new(9)),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            name: "Sales Order".into(),
            prefix: "SO".into(),
            current: 41,
            padding: 6,
            struct_name: "sale_order".into(),
            active: true,
            is_default: true,
        }
    }

    #[test]
    fn test_preview_next() {
        assert_eq!(sample().preview_next().expect("preview"), "SO000042");
    }

    #[test]
    fn test_preview_next_at_max_is_exhausted() {
        let update = UpdateSequence {
            current: Some(i64::MAX),
            ..Default::default()
        };
        validate_payload(&update).expect("i64::MAX is a storable counter");

        let last = Sequence {
            current: i64::MAX,
            ..sample()
        };
        let err = last.preview_next().expect_err("no value after i64::MAX");
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert!(err.message.contains("exhausted"));

        let almost = Sequence {
            current: i64::MAX - 1,
            ..sample()
        };
        assert_eq!(
            almost.preview_next().expect("last value"),
            format!("SO{}", i64::MAX)
        );
    }

    #[test]
    fn test_audit_fields_are_not_serialized() {
        let json = serde_json::to_value(sample()).expect("serialize");
        assert!(json.get("create_user_id").is_none());
        assert!(json.get("created_at").is_none());
        assert_eq!(json["prefix"], "SO");
    }

    #[test]
    fn test_create_defaults_from_json() {
        let data: CreateSequence = serde_json::from_str(
            r#"{"name":"Purchase","prefix":"PO","struct_name":"purchase_order"}"#,
        )
        .expect("deserialize");
        assert_eq!(data.padding, DEFAULT_PADDING);
        assert_eq!(data.current, 0);
        assert!(data.active && data.is_default);
        validate_payload(&data).expect("valid");
    }

    #[test]
    fn test_create_rejects_blank_and_wide_padding() {
        let blank = CreateSequence::new("  ", "SO", "sale_order");
        assert!(validate_payload(&blank).is_err());

        let wide = CreateSequence::new("SO", "SO", "sale_order").with_padding(MAX_PADDING + 1);
        assert!(validate_payload(&wide).is_err());

        let negative = CreateSequence::new("SO", "SO", "sale_order").with_current(-1);
        assert!(validate_payload(&negative).is_err());
    }

    #[test]
    fn test_update_validates_present_fields_only() {
        assert!(validate_payload(&UpdateSequence::default()).is_ok());
        let bad = UpdateSequence {
            padding: Some(99),
            ..Default::default()
        };
        assert!(validate_payload(&bad).is_err());
    }
}
