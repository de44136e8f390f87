//! Stored interval listing.

use chrono::{DateTime, Utc};

use super::Context;
use crate::core::parse_report_day;
use crate::error::StudyError;
use crate::output::format_records;

/// Execute history command
///
/// `date` accepts `today`, `yesterday` or `YYYY-MM-DD`, resolved against
/// `now`.
///
/// # Errors
///
/// Returns an error if the date cannot be parsed or the store cannot be
/// read.
pub fn history(
    ctx: &Context,
    now: DateTime<Utc>,
    user: Option<u64>,
    date: Option<&str>,
    limit: usize,
) -> Result<String, StudyError> {
    let day = date
        .map(|input| {
            parse_report_day(input, now).ok_or_else(|| {
                StudyError::Parse(format!(
                    "invalid date '{input}'; use today, yesterday or YYYY-MM-DD"
                ))
            })
        })
        .transpose()?;

    let store = ctx.open_store()?;
    let records = store.records(user, day, limit)?;
    format_records(&records, ctx.format)
}
