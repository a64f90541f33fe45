use std::collections::BTreeMap;

use super::report::TlsRptReport;
use crate::rollup::{self, percentage, Rollup};

/// TLS session success for one domain of a domain owner.
///
/// `successful_session_percentage` is `None` when no sessions were reported
/// for the domain at all.
#[derive(Debug, Clone, PartialEq)]
pub struct TlsRptSources {
	pub domain_owner: String,
	pub organization_name: String,
	pub domain: String,
	pub successful_session_percentage: Option<f64>,
}

impl Rollup for TlsRptSources {
	fn domain(&self) -> &str {
		&self.domain
	}
}

#[derive(Debug, Default, Clone, Copy)]
struct Sessions {
	successful: u64,
	failed: u64,
}

struct DomainTally<'a> {
	organization_name: &'a str,
	by_ip: BTreeMap<&'a str, Sessions>,
}

/// Folds every report of `domain_owner` into one success rate per domain.
///
/// Rows are partitioned by their own policy domain, so a report covering
/// several domains feeds several rollups. Sessions are summed per receiving
/// IP and then across IPs; the per-IP breakdown is not kept. The organization
/// name is the one of the last report contributing rows to the domain.
pub fn aggregate(domain_owner: &str, reports: &[TlsRptReport]) -> Vec<TlsRptSources> {
	let mut domains: BTreeMap<&str, DomainTally> = BTreeMap::new();

	for report in reports.iter().filter(|r| r.domain_owner == domain_owner) {
		for row in &report.rows {
			let name = if row.domain_name.is_empty() { report.domain_name.as_str() } else { row.domain_name.as_str() };
			let domain = domains.entry(name).or_insert_with(|| DomainTally {
				organization_name: "",
				by_ip: BTreeMap::new(),
			});
			domain.organization_name = &report.organization_name;

			let sessions = domain.by_ip.entry(row.ip_address.as_str()).or_default();
			sessions.successful += row.successful_session_count;
			sessions.failed += row.failed_session_count;
		}
	}

	domains
		.into_iter()
		.map(|(domain, tally)| {
			let (successful, failed) = tally
				.by_ip
				.values()
				.fold((0, 0), |(s, f), ip| (s + ip.successful, f + ip.failed));
			let total = successful + failed;

			TlsRptSources {
				domain_owner: domain_owner.to_string(),
				organization_name: tally.organization_name.to_string(),
				domain: domain.to_string(),
				successful_session_percentage: if total == 0 { None } else { Some(percentage(successful, total)) },
			}
		})
		.collect()
}

/// Replaces or appends each fresh rollup in `existing`.
pub fn merge(existing: &mut Vec<TlsRptSources>, fresh: Vec<TlsRptSources>) {
	rollup::merge(existing, fresh)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::receipt::epoch_seconds;
	use crate::tlsrpt::report::TlsRptReportRow;

	fn row(domain: &str, ip: &str, successful: u64, failed: u64) -> TlsRptReportRow {
		TlsRptReportRow {
			domain_name: domain.to_string(),
			ip_address: ip.to_string(),
			policy_type: "sts".to_string(),
			policy_string: Vec::new(),
			mx_host: vec![format!("mx.{}", domain)],
			result_type: None,
			successful_session_count: successful,
			failed_session_count: failed,
		}
	}

	fn report(owner: &str, org: &str, domain: &str, rows: Vec<TlsRptReportRow>) -> TlsRptReport {
		TlsRptReport {
			domain_owner: owner.to_string(),
			organization_name: org.to_string(),
			domain_name: domain.to_string(),
			report_id: format!("{}-{}", org, domain),
			extra_contact_info: String::new(),
			range_start: epoch_seconds(1747094400),
			range_end: epoch_seconds(1747180799),
			received_at: epoch_seconds(1747180800),
			email_sender: String::new(),
			email_subject: String::new(),
			report_file_name: String::new(),
			total_number_of_sessions: rows.iter().map(|r| r.successful_session_count + r.failed_session_count).sum(),
			content: String::new(),
			rows,
		}
	}

	#[test]
	fn collapses_ips_into_one_percentage() {
		let reports = vec![
			report("example.com", "Google Inc.", "example.com", vec![row("example.com", "", 30, 0), row("example.com", "203.0.113.5", 0, 10)]),
			report("example.com", "Microsoft", "example.com", vec![row("example.com", "", 60, 0)]),
		];

		let sources = aggregate("example.com", &reports);
		assert_eq!(sources.len(), 1);
		assert_eq!(sources[0].organization_name, "Microsoft");
		assert_eq!(sources[0].successful_session_percentage, Some(90.0));
	}

	#[test]
	fn zero_sessions_has_no_percentage() {
		let reports = vec![report("example.com", "Google Inc.", "example.com", vec![row("example.com", "", 0, 0)])];

		let sources = aggregate("example.com", &reports);
		assert_eq!(sources.len(), 1);
		assert_eq!(sources[0].successful_session_percentage, None);
	}

	#[test]
	fn other_owners_are_ignored() {
		let reports = vec![
			report("example.com", "Google Inc.", "example.com", vec![row("example.com", "", 10, 0)]),
			report("example.org", "Google Inc.", "example.com", vec![row("example.com", "", 0, 10)]),
		];

		let sources = aggregate("example.com", &reports);
		assert_eq!(sources[0].successful_session_percentage, Some(100.0));
	}

	#[test]
	fn merge_keeps_one_rollup_per_domain() {
		let reports = vec![
			report("example.com", "Google Inc.", "example.com", vec![row("example.com", "", 1, 1)]),
			report("example.com", "Google Inc.", "mail.example.com", vec![row("mail.example.com", "", 1, 0)]),
		];

		let mut existing = Vec::new();
		merge(&mut existing, aggregate("example.com", &reports));
		merge(&mut existing, aggregate("example.com", &reports));

		assert_eq!(existing.len(), 2);
		assert_eq!(existing[0].successful_session_percentage, Some(50.0));
		assert_eq!(existing[1].successful_session_percentage, Some(100.0));
	}

	#[test]
	fn rows_follow_their_own_policy_domain() {
		let reports = vec![report(
			"example.com",
			"Google Inc.",
			"example.com",
			vec![row("example.com", "", 100, 0), row("mail.example.com", "203.0.113.5", 0, 60), row("mail.example.com", "", 0, 40)],
		)];

		let sources = aggregate("example.com", &reports);
		assert_eq!(sources.len(), 2);
		assert_eq!(sources[0].domain, "example.com");
		assert_eq!(sources[0].successful_session_percentage, Some(100.0));
		assert_eq!(sources[1].domain, "mail.example.com");
		assert_eq!(sources[1].organization_name, "Google Inc.");
		assert_eq!(sources[1].successful_session_percentage, Some(0.0));
	}

	#[test]
	fn rows_without_a_domain_use_the_report_domain() {
		let reports = vec![report("example.com", "Google Inc.", "example.com", vec![row("", "", 3, 1)])];

		let sources = aggregate("example.com", &reports);
		assert_eq!(sources.len(), 1);
		assert_eq!(sources[0].domain, "example.com");
		assert_eq!(sources[0].successful_session_percentage, Some(75.0));
	}

	#[test]
	fn input_order_does_not_change_rates() {
		let reports = vec![
			report("example.com", "Google Inc.", "example.com", vec![row("example.com", "", 7, 0), row("example.com", "203.0.113.5", 0, 3)]),
			report("example.com", "Microsoft", "example.com", vec![row("example.com", "", 11, 0), row("mail.example.com", "203.0.113.9", 2, 5)]),
			report("example.com", "Yahoo", "mail.example.com", vec![row("mail.example.com", "", 13, 0)]),
		];
		let mut reversed = reports.clone();
		reversed.reverse();
		let mut rotated = reports.clone();
		rotated.rotate_left(1);

		let rates = |reports: &[TlsRptReport]| {
			aggregate("example.com", reports)
				.into_iter()
				.map(|s| (s.domain, s.successful_session_percentage))
				.collect::<Vec<_>>()
		};
		assert_eq!(rates(&reports), rates(&reversed));
		assert_eq!(rates(&reports), rates(&rotated));
	}

	#[test]
	fn percentages_stay_within_bounds() {
		let reports = vec![
			report("example.com", "Google Inc.", "a.example.com", vec![row("a.example.com", "", 0, 9)]),
			report("example.com", "Google Inc.", "b.example.com", vec![row("b.example.com", "", 9, 0)]),
			report("example.com", "Google Inc.", "c.example.com", vec![row("c.example.com", "", 1, 2), row("c.example.com", "203.0.113.5", 0, 4)]),
			report("example.com", "Google Inc.", "d.example.com", vec![row("d.example.com", "", 0, 0)]),
		];

		let sources = aggregate("example.com", &reports);
		assert_eq!(sources.len(), 4);
		for source in &sources {
			if let Some(rate) = source.successful_session_percentage {
				assert!(rate >= 0.0 && rate <= 100.0, "{} out of bounds: {}", source.domain, rate);
			}
		}
		assert_eq!(sources[0].successful_session_percentage, Some(0.0));
		assert_eq!(sources[1].successful_session_percentage, Some(100.0));
		assert_eq!(sources[3].successful_session_percentage, None);
	}
}
