use std::collections::BTreeMap;

use super::report::{DmarcReport, DmarcReportRow};
use crate::rollup::{self, percentage, Rollup};

/// Compliance statistics for one source IP.
///
/// Percentages are taken over report rows, not over emails: a row covering
/// one message weighs as much as a row covering ten thousand.
#[derive(Debug, Clone, PartialEq)]
pub struct DmarcSource {
	pub ip_address: String,
	pub reported_emails: u64,
	pub spf_alignment_percentage: f64,
	pub dkim_alignment_percentage: f64,
	pub dmarc_alignment_percentage: f64,
}

/// Per-IP statistics for one reported domain of a domain owner.
#[derive(Debug, Clone, PartialEq)]
pub struct DmarcSources {
	pub domain_owner: String,
	pub organization_name: String,
	pub domain: String,
	pub sources: Vec<DmarcSource>,
}

impl Rollup for DmarcSources {
	fn domain(&self) -> &str {
		&self.domain
	}
}

#[derive(Debug, Default)]
struct Tally {
	rows: u64,
	emails: u64,
	spf_pass: u64,
	dkim_pass: u64,
	aligned: u64,
}

impl Tally {
	fn add(&mut self, row: &DmarcReportRow) {
		self.rows += 1;
		self.emails += row.email_count;
		if row.spf_result == "pass" {
			self.spf_pass += 1;
		}
		if row.dkim_result == "pass" {
			self.dkim_pass += 1;
		}
		if row.inferred_aligned {
			self.aligned += 1;
		}
	}

	fn into_source(self, ip_address: &str) -> DmarcSource {
		DmarcSource {
			ip_address: ip_address.to_string(),
			reported_emails: self.emails,
			spf_alignment_percentage: percentage(self.spf_pass, self.rows),
			dkim_alignment_percentage: percentage(self.dkim_pass, self.rows),
			dmarc_alignment_percentage: percentage(self.aligned, self.rows),
		}
	}
}

struct DomainTally<'a> {
	organization_name: &'a str,
	by_ip: BTreeMap<&'a str, Tally>,
}

/// Folds every report of `domain_owner` into one rollup per reported domain.
///
/// Reports of other owners are ignored. Reports without rows contribute
/// nothing, so no domain or IP appears without at least one row behind it.
/// The organization name on a rollup is the one of the last contributing
/// report. Output is ordered by domain, sources by IP.
pub fn aggregate(domain_owner: &str, reports: &[DmarcReport]) -> Vec<DmarcSources> {
	let mut domains: BTreeMap<&str, DomainTally> = BTreeMap::new();

	for report in reports.iter().filter(|r| r.domain_owner == domain_owner) {
		if report.rows.is_empty() {
			continue;
		}

		let domain = domains.entry(report.domain_name.as_str()).or_insert_with(|| DomainTally {
			organization_name: "",
			by_ip: BTreeMap::new(),
		});
		domain.organization_name = &report.organization_name;

		for row in &report.rows {
			domain.by_ip.entry(row.source_ip.as_str()).or_default().add(row);
		}
	}

	domains
		.into_iter()
		.map(|(domain, tally)| DmarcSources {
			domain_owner: domain_owner.to_string(),
			organization_name: tally.organization_name.to_string(),
			domain: domain.to_string(),
			sources: tally
				.by_ip
				.into_iter()
				.map(|(ip, cell)| cell.into_source(ip))
				.collect(),
		})
		.collect()
}

/// Replaces or appends each fresh rollup in `existing`.
pub fn merge(existing: &mut Vec<DmarcSources>, fresh: Vec<DmarcSources>) {
	rollup::merge(existing, fresh)
}
