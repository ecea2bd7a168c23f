//! Date helpers shared by request parsing and derived fields.

use chrono::NaiveDate;

use crate::domain::error::DomainError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` request value; `field` names it in the error.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| DomainError::invalid_date(field, raw))
}

/// Whole days from `today` until `end`; negative once `end` has passed.
pub fn days_until(end: NaiveDate, today: NaiveDate) -> i64 {
    end.signed_duration_since(today).num_days()
}
