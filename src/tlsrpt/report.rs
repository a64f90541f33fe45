use chrono::{DateTime, Utc};

use super::result_type::ResultType;
use super::types::{Report, TlsPolicy};
use crate::receipt::Receipt;

/// Session counts for one policy, optionally narrowed to one receiving IP.
#[derive(Debug, Clone, PartialEq)]
pub struct TlsRptReportRow {
	pub domain_name: String,
	/// Empty for the per-policy summary row.
	pub ip_address: String,
	pub policy_type: String,
	pub policy_string: Vec<String>,
	pub mx_host: Vec<String>,
	pub result_type: Option<ResultType>,

	pub successful_session_count: u64,
	pub failed_session_count: u64,
}

/// An ingested TLS-RPT report.
#[derive(Debug, Clone, PartialEq)]
pub struct TlsRptReport {
	pub domain_owner: String,
	pub organization_name: String,
	pub domain_name: String,
	pub report_id: String,
	pub extra_contact_info: String,
	pub range_start: DateTime<Utc>,
	pub range_end: DateTime<Utc>,

	pub received_at: DateTime<Utc>,
	pub email_sender: String,
	pub email_subject: String,
	pub report_file_name: String,

	pub total_number_of_sessions: u64,
	pub content: String,

	pub rows: Vec<TlsRptReportRow>,
}

fn policy_rows(policy: &TlsPolicy) -> Vec<TlsRptReportRow> {
	let row = |ip_address: &str, result_type: Option<ResultType>, successful: u64, failed: u64| TlsRptReportRow {
		domain_name: policy.policy.policy_domain.clone(),
		ip_address: ip_address.to_string(),
		policy_type: policy.policy.policy_type.clone(),
		policy_string: policy.policy.policy_string.clone(),
		mx_host: policy.policy.mx_host.clone(),
		result_type,
		successful_session_count: successful,
		failed_session_count: failed,
	};

	let mut rows: Vec<TlsRptReportRow> = policy
		.failure_details
		.iter()
		.map(|detail| row(&detail.receiving_ip, Some(detail.result_type.clone()), 0, detail.failed_session_count))
		.collect();

	// failures not broken out in any detail stay on the summary row
	let detailed: u64 = policy.failure_details.iter().map(|d| d.failed_session_count).sum();
	let summary = &policy.summary;
	rows.push(row(
		"",
		None,
		summary.total_successful_session_count,
		summary.total_failure_session_count.saturating_sub(detailed),
	));

	rows
}

impl Report {
	/// Builds the canonical report for `domain_owner` out of a decoded document.
	///
	/// Each policy becomes one row per failure detail plus one summary row.
	/// The rows of a policy add up to its summary counts unless the failure
	/// details report more sessions than the summary does; the details are
	/// kept as reported then. The session total always follows the summaries.
	pub fn into_report(self, domain_owner: &str, receipt: Receipt, content: String) -> TlsRptReport {
		let rows: Vec<TlsRptReportRow> = self.policies.iter().flat_map(policy_rows).collect();
		let total_number_of_sessions = self
			.policies
			.iter()
			.map(|p| p.summary.total_successful_session_count + p.summary.total_failure_session_count)
			.sum();

		TlsRptReport {
			domain_owner: domain_owner.to_string(),
			organization_name: self.organization_name,
			domain_name: self
				.policies
				.first()
				.map(|p| p.policy.policy_domain.clone())
				.unwrap_or_default(),
			report_id: self.report_id,
			extra_contact_info: self.contact_info,
			range_start: self.date_range.start_datetime,
			range_end: self.date_range.end_datetime,

			received_at: receipt.received_at,
			email_sender: receipt.email_sender,
			email_subject: receipt.email_subject,
			report_file_name: receipt.report_file_name,

			total_number_of_sessions,
			content,

			rows,
		}
	}
}
