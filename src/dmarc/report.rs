use chrono::{DateTime, Utc};
use log::warn;

use super::types::{Feedback, Record};
use crate::receipt::{epoch_seconds, Receipt};

/// What the receiver did with the messages in a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
	None,
	Quarantine,
	Reject,
}

impl Disposition {
	/// Parses a wire disposition. Unknown values are treated as `none`.
	pub fn parse(value: &str) -> Disposition {
		match value.trim().to_lowercase().as_str() {
			"" | "none" => Disposition::None,
			"quarantine" => Disposition::Quarantine,
			"reject" => Disposition::Reject,
			other => {
				warn!("unknown DMARC disposition '{}', treating as none", other);
				Disposition::None
			},
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Disposition::None => "none",
			Disposition::Quarantine => "quarantine",
			Disposition::Reject => "reject",
		}
	}
}

/// One source IP and authentication outcome within a report.
#[derive(Debug, Clone, PartialEq)]
pub struct DmarcReportRow {
	pub email_count: u64,
	pub source_ip: String,
	pub resolved_hostname: String,

	pub envelope_to: String,
	pub envelope_from: String,
	pub header_from: String,

	pub spf_domain: String,
	pub spf_result: String,
	pub spf_scope: String,

	pub dkim_domain: String,
	pub dkim_selector: String,
	pub dkim_result: String,

	pub spf_aligned: bool,
	pub dkim_aligned: bool,
	pub inferred_aligned: bool,
	pub disposition: Disposition,
}

/// An ingested aggregate report.
///
/// `(domain_owner, report_id, organization_name)` identifies a report; the
/// report id alone is only unique within the reporting organization.
#[derive(Debug, Clone, PartialEq)]
pub struct DmarcReport {
	pub domain_owner: String,
	pub organization_name: String,
	pub domain_name: String,
	pub extra_contact_info: String,
	pub report_id: String,
	pub range_start: DateTime<Utc>,
	pub range_end: DateTime<Utc>,

	pub received_at: DateTime<Utc>,
	pub email_sender: String,
	pub email_subject: String,
	pub report_file_name: String,

	pub total_number_of_emails: u64,
	pub content: String,

	pub rows: Vec<DmarcReportRow>,
}

impl From<&Record> for DmarcReportRow {
	fn from(record: &Record) -> DmarcReportRow {
		let spf = record.auth_results.spf.first();
		let dkim = record.auth_results.dkim.first();
		let evaluated = &record.row.policy_evaluated;

		let spf_aligned = evaluated.spf.eq_ignore_ascii_case("pass");
		let dkim_aligned = evaluated.dkim.eq_ignore_ascii_case("pass");

		DmarcReportRow {
			email_count: record.row.count,
			source_ip: record.row.source_ip.trim().to_string(),
			resolved_hostname: String::new(),

			envelope_to: record.identifiers.envelope_to.clone(),
			envelope_from: record.identifiers.envelope_from.clone(),
			header_from: record.identifiers.header_from.clone(),

			spf_domain: spf.map(|s| s.domain.clone()).unwrap_or_default(),
			spf_result: spf.map(|s| s.result.to_lowercase()).unwrap_or_default(),
			spf_scope: spf.map(|s| s.scope.clone()).unwrap_or_default(),

			dkim_domain: dkim.map(|d| d.domain.clone()).unwrap_or_default(),
			dkim_selector: dkim.map(|d| d.selector.clone()).unwrap_or_default(),
			dkim_result: dkim.map(|d| d.result.to_lowercase()).unwrap_or_default(),

			spf_aligned,
			dkim_aligned,
			inferred_aligned: spf_aligned || dkim_aligned,
			disposition: Disposition::parse(&evaluated.disposition),
		}
	}
}

impl Feedback {
	/// Builds the canonical report for `domain_owner` out of a decoded document.
	///
	/// `content` is the raw document text kept alongside the report.
	pub fn into_report(self, domain_owner: &str, receipt: Receipt, content: String) -> DmarcReport {
		let rows: Vec<DmarcReportRow> = self.record.iter().map(DmarcReportRow::from).collect();
		let metadata = self.report_metadata;

		DmarcReport {
			domain_owner: domain_owner.to_string(),
			organization_name: metadata.org_name,
			domain_name: self.policy_published.domain,
			extra_contact_info: metadata.extra_contact_info,
			report_id: metadata.report_id,
			range_start: epoch_seconds(metadata.date_range.begin),
			range_end: epoch_seconds(metadata.date_range.end),

			received_at: receipt.received_at,
			email_sender: receipt.email_sender,
			email_subject: receipt.email_subject,
			report_file_name: receipt.report_file_name,

			total_number_of_emails: rows.iter().map(|r| r.email_count).sum(),
			content,

			rows,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dmarc::parse_feedback;

	const TWO_RECORDS: &str = r#"<feedback>
	<report_metadata>
		<org_name>Mail.Example</org_name>
		<email>dmarc@mail.example</email>
		<report_id>r-2</report_id>
		<date_range><begin>1747008000</begin><end>1747094399</end></date_range>
	</report_metadata>
	<policy_published><domain>example.com</domain><p>reject</p></policy_published>
	<record>
		<row>
			<source_ip>192.0.2.10</source_ip>
			<count>7</count>
			<policy_evaluated><disposition>reject</disposition><dkim>fail</dkim><spf>fail</spf></policy_evaluated>
		</row>
		<identifiers><header_from>example.com</header_from></identifiers>
		<auth_results>
			<spf><domain>spoof.example.org</domain><result>FAIL</result></spf>
		</auth_results>
	</record>
	<record>
		<row>
			<source_ip>192.0.2.20</source_ip>
			<count>5</count>
			<policy_evaluated><disposition>none</disposition><dkim>pass</dkim><spf>fail</spf></policy_evaluated>
		</row>
		<identifiers><envelope_from>example.com</envelope_from><header_from>example.com</header_from></identifiers>
		<auth_results>
			<dkim><domain>example.com</domain><selector>k1</selector><result>pass</result></dkim>
			<spf><domain>example.com</domain><scope>mfrom</scope><result>fail</result></spf>
		</auth_results>
	</record>
</feedback>"#;

	#[test]
	fn converts_records_into_rows() {
		let feedback = parse_feedback("two.xml", TWO_RECORDS.as_bytes()).unwrap();
		let report = feedback.into_report("example.com", Receipt::from_file("two.xml"), TWO_RECORDS.to_string());

		assert_eq!(report.domain_owner, "example.com");
		assert_eq!(report.organization_name, "Mail.Example");
		assert_eq!(report.domain_name, "example.com");
		assert_eq!(report.report_id, "r-2");
		assert_eq!(report.range_start.timestamp(), 1747008000);
		assert_eq!(report.total_number_of_emails, 12);
		assert_eq!(report.report_file_name, "two.xml");

		let rejected = &report.rows[0];
		assert_eq!(rejected.spf_result, "fail");
		assert_eq!(rejected.dkim_result, "");
		assert!(!rejected.inferred_aligned);
		assert_eq!(rejected.disposition, Disposition::Reject);

		let signed = &report.rows[1];
		assert_eq!(signed.dkim_selector, "k1");
		assert_eq!(signed.spf_scope, "mfrom");
		assert!(signed.dkim_aligned);
		assert!(!signed.spf_aligned);
		assert!(signed.inferred_aligned);
		assert_eq!(signed.envelope_from, "example.com");
	}

	#[test]
	fn unknown_disposition_falls_back_to_none() {
		assert_eq!(Disposition::parse("Quarantine"), Disposition::Quarantine);
		assert_eq!(Disposition::parse("sideline"), Disposition::None);
	}
}
