use std::time::UNIX_EPOCH;

use chrono::{DateTime, TimeZone, Utc};

/// Where and when a report arrived, as seen by the mailbox side.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
	pub received_at: DateTime<Utc>,
	pub email_sender: String,
	pub email_subject: String,
	pub report_file_name: String,
}

impl Receipt {
	/// A receipt for a report read from a local file rather than a mailbox.
	pub fn from_file(file_name: &str) -> Receipt {
		Receipt {
			received_at: Utc::now(),
			email_sender: String::new(),
			email_subject: String::new(),
			report_file_name: file_name.to_string(),
		}
	}
}

/// Converts epoch seconds to UTC, falling back to the epoch when out of range.
pub fn epoch_seconds(secs: i64) -> DateTime<Utc> {
	Utc.timestamp_opt(secs, 0).single().unwrap_or_else(|| DateTime::<Utc>::from(UNIX_EPOCH))
}
