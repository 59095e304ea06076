//! Payload validation shared by every write path.

use validator::Validate;

use erp_core::error::{AppError, ErrorKind};
use erp_core::result::AppResult;

/// Validate a write payload, mapping failures to `ErrorKind::Validation`.
pub fn validate_payload<T: Validate>(payload: &T) -> AppResult<()> {
    payload.validate().map_err(|e| {
        AppError::with_source(ErrorKind::Validation, format!("Invalid payload: {e}"), e)
    })
}

/// Reject names that are blank once trimmed.
pub(crate) fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}
