use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rendering of `MessageRecord::date`, e.g. `2024-05-01 13:45:07.123456`.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// A single stored submission.
///
/// Built by the relay once a payload has been decoded; never mutated after
/// construction. Each record becomes a fresh document in the store.
///
/// # Fields
///
/// - `date` - Relay receipt time, local clock, microsecond precision.
/// - `username` - URL-decoded `username` form field.
/// - `message` - URL-decoded `message` form field, empty when absent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub date: String,
    pub username: String,
    pub message: String,
}

impl MessageRecord {
    pub fn new(received_at: NaiveDateTime, username: String, message: String) -> Self {
        Self {
            date: received_at.format(DATE_FORMAT).to_string(),
            username,
            message,
        }
    }

    /// Parses `date` back into a timestamp. `None` for documents not written by the relay.
    pub fn received_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.date, DATE_FORMAT).ok()
    }
}

/// Hands out receipt timestamps that never go backwards within one relay.
///
/// Ordering is kept on UTC instants and only rendered in local time on the
/// way out, so a DST change moves the rendered `date` but never holds it. A
/// real clock step backwards (NTP, manual change) repeats the last instant.
#[derive(Debug, Default)]
pub struct ReceiptClock {
    last: Option<DateTime<Utc>>,
}

impl ReceiptClock {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Local wall time of the next receipt.
    pub fn now(&mut self) -> NaiveDateTime {
        self.observe(Utc::now()).with_timezone(&Local).naive_local()
    }

    pub(crate) fn observe(&mut self, instant: DateTime<Utc>) -> DateTime<Utc> {
        let issued = match self.last {
            Some(last) if last > instant => last,
            _ => instant,
        };
        self.last = Some(issued);
        issued
    }
}
