use validator::ValidationError;

use crate::utils::time::parse_deadline;

/// Only ISO-8601 dates (`2030-01-31`) or RFC 3339 timestamps are accepted.
pub fn validate_deadline(deadline: &str) -> Result<(), ValidationError> {
    let deadline = deadline.trim();
    if deadline.is_empty() {
        return Err(ValidationError::new("deadline_required"));
    }

    if parse_deadline(deadline).is_some() {
        return Ok(());
    }

    Err(ValidationError::new("deadline_not_iso8601"))
}
