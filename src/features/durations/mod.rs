//! The duration log.
//!
//! Every closed stretch of voice time becomes one immutable interval record.
//! Daily totals are always derived from these records, never stored.

pub mod record;
pub mod store;

pub use record::{DailyTotal, IntervalRecord, MemberTotal};
pub use store::DurationStore;
