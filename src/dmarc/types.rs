use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReportDateRange {
	pub begin: i64,
	pub end: i64
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReportMetadata {
	pub org_name: String,
	pub email: String,
	pub extra_contact_info: String,
	pub report_id: String,
	pub date_range: ReportDateRange,
	pub error: Vec<String>
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Policy {
	pub domain: String,
	pub adkim: String,
	pub aspf: String,
	pub p: String,
	pub sp: String,
	pub pct: String
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PolicyOverrideReason {
	#[serde(rename = "type")]
	pub kind: String,
	pub comment: String
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecordRowPolicy {
	pub disposition: String,
	pub dkim: String,
	pub spf: String,
	pub reason: Vec<PolicyOverrideReason>
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecordRow {
	pub source_ip: String,
	pub count: u64,
	pub policy_evaluated: RecordRowPolicy
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecordIdentifiers {
	pub envelope_to: String,
	pub envelope_from: String,
	pub header_from: String
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecordDKIMResult {
	pub domain: String,
	pub result: String,
	pub selector: String
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecordSPFResult {
	pub domain: String,
	pub scope: String,
	pub result: String
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecordResults {
	pub dkim: Vec<RecordDKIMResult>,
	pub spf: Vec<RecordSPFResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Record {
	pub row: RecordRow,
	pub identifiers: RecordIdentifiers,
	pub auth_results: RecordResults
}

/// The `feedback` root of an aggregate report.
///
/// Metadata and the published policy must be present; records may be absent.
#[derive(Debug, Deserialize)]
pub struct Feedback {
	pub report_metadata: ReportMetadata,
	pub policy_published: Policy,
	#[serde(default)]
	pub record: Vec<Record>
}
