use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::result_type::ResultType;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DateRange {
	pub start_datetime: DateTime<Utc>,
	pub end_datetime: DateTime<Utc>
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Policy {
	/// `tlsa`, `sts` or `no-policy-found`.
	pub policy_type: String,
	/// The applied TLSA records or MTA-STS policy, one line per entry.
	#[serde(default)]
	pub policy_string: Vec<String>,
	pub policy_domain: String,
	/// MX host patterns from an MTA-STS policy.
	#[serde(default)]
	pub mx_host: Vec<String>
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Summary {
	pub total_successful_session_count: u64,
	pub total_failure_session_count: u64
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FailureDetail {
	pub result_type: ResultType,
	#[serde(default)]
	pub sending_mta_ip: String,
	#[serde(default)]
	pub receiving_mx_hostname: String,
	#[serde(default)]
	pub receiving_mx_helo: String,
	#[serde(default)]
	pub receiving_ip: String,
	#[serde(default)]
	pub failed_session_count: u64,
	#[serde(default)]
	pub additional_information: String,
	#[serde(default)]
	pub failure_reason_code: String
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TlsPolicy {
	pub policy: Policy,
	#[serde(default)]
	pub summary: Summary,
	#[serde(default)]
	pub failure_details: Vec<FailureDetail>
}

/// An SMTP TLS report (RFC 8460).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Report {
	pub organization_name: String,
	/// Normally one full UTC day.
	pub date_range: DateRange,
	#[serde(default)]
	pub contact_info: String,
	pub report_id: String,
	pub policies: Vec<TlsPolicy>
}
