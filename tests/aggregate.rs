use std::fs;
use std::io::Write;
use std::path::PathBuf;

use mailwatch::dmarc::parse_feedback;
use mailwatch::ingest::{self, ReportKind};
use mailwatch::store::{DmarcRepository, MemoryStore, TlsRptRepository};
use mailwatch::tlsrpt::{parse_report, CompressionType};
use mailwatch::{IngestError, Receipt, StoreError};

fn testdata(name: &str) -> PathBuf {
	PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/testdata").join(name)
}

fn google_dmarc() -> Vec<u8> {
	fs::read(testdata("dmarc/google.com!example.com!1747008000!1747094399.xml")).unwrap()
}

#[test]
fn dmarc_rollup_from_fixture() {
	let store = MemoryStore::new();
	ingest::ingest_dmarc(&store, "example.com", &google_dmarc(), Receipt::from_file("google.xml")).unwrap();
	ingest::refresh_rollups(&store, "example.com").unwrap();

	let sources = store.get_dmarc_sources("example.com").unwrap();
	assert_eq!(sources.len(), 1);
	assert_eq!(sources[0].domain, "example.com");
	assert_eq!(sources[0].organization_name, "google.com");

	let google = sources[0].sources.iter().find(|s| s.ip_address == "192.0.2.1").unwrap();
	assert_eq!(google.reported_emails, 100);
	assert_eq!(google.dkim_alignment_percentage, 100.0);
	assert_eq!(google.dmarc_alignment_percentage, 100.0);

	let sendgrid = sources[0].sources.iter().find(|s| s.ip_address == "149.72.61.220").unwrap();
	assert_eq!(sendgrid.reported_emails, 50);
	assert_eq!(sendgrid.spf_alignment_percentage, 100.0);
	assert_eq!(sendgrid.dkim_alignment_percentage, 0.0);
	assert_eq!(sendgrid.dmarc_alignment_percentage, 0.0);

	let stored = store.get_dmarc_report_by_id("example.com", "8639335954371369510").unwrap();
	assert!(stored.content.contains("<org_name>google.com</org_name>"));
}

#[test]
fn rerunning_aggregation_is_stable() {
	let store = MemoryStore::new();
	ingest::ingest_dmarc(&store, "example.com", &google_dmarc(), Receipt::from_file("google.xml")).unwrap();
	ingest::ingest_file(&store, "example.com", &testdata("tlsrpt/google.com!example.com!1747094400!1747180799!001.json.gz")).unwrap();

	ingest::refresh_rollups(&store, "example.com").unwrap();
	let dmarc_first = store.get_dmarc_sources("example.com").unwrap();
	let tlsrpt_first = store.get_tlsrpt_sources("example.com").unwrap();

	ingest::refresh_rollups(&store, "example.com").unwrap();
	assert_eq!(store.get_dmarc_sources("example.com").unwrap(), dmarc_first);
	assert_eq!(store.get_tlsrpt_sources("example.com").unwrap(), tlsrpt_first);
	assert_eq!(tlsrpt_first.len(), 1);
	assert_eq!(tlsrpt_first[0].successful_session_percentage, Some(95.0));
}

#[test]
fn reports_of_other_owners_do_not_leak() {
	let store = MemoryStore::new();
	ingest::ingest_dmarc(&store, "example.com", &google_dmarc(), Receipt::from_file("google.xml")).unwrap();
	ingest::ingest_dmarc(&store, "example.org", &google_dmarc(), Receipt::from_file("google.xml")).unwrap();

	// the mixed set still only counts example.com's own report
	let mut everything = store.get_dmarc_reports("example.com").unwrap();
	everything.extend(store.get_dmarc_reports("example.org").unwrap());
	store.write_dmarc_sources_aggregate("example.com", &everything).unwrap();

	let sources = store.get_dmarc_sources("example.com").unwrap();
	assert_eq!(sources[0].sources.iter().map(|s| s.reported_emails).sum::<u64>(), 150);
	assert!(store.get_dmarc_sources("example.org").unwrap().is_empty());
}

#[test]
fn rollups_keep_domains_untouched_by_new_reports() {
	let store = MemoryStore::new();
	ingest::ingest_dmarc(&store, "example.com", &google_dmarc(), Receipt::from_file("google.xml")).unwrap();
	ingest::refresh_rollups(&store, "example.com").unwrap();

	let other = String::from_utf8(google_dmarc()).unwrap().replace("<domain>example.com</domain>\n    <adkim>", "<domain>news.example.com</domain>\n    <adkim>");
	let report = parse_feedback("news.xml", other.as_bytes())
		.unwrap()
		.into_report("example.com", Receipt::from_file("news.xml"), other.clone());
	assert_eq!(report.domain_name, "news.example.com");
	store.write_dmarc_sources_aggregate("example.com", &[report]).unwrap();

	let domains: Vec<String> = store.get_dmarc_sources("example.com").unwrap().into_iter().map(|s| s.domain).collect();
	assert_eq!(domains, vec!["example.com".to_string(), "news.example.com".to_string()]);
}

#[test]
fn tlsrpt_zero_sessions_has_no_percentage() {
	let doc = r#"{"organization-name":"Quiet Inc.","date-range":{"start-datetime":"2025-05-13T00:00:00Z","end-datetime":"2025-05-13T23:59:59Z"},"report-id":"quiet","policies":[{"policy":{"policy-type":"no-policy-found","policy-domain":"example.com"},"summary":{"total-successful-session-count":0,"total-failure-session-count":0}}]}"#;
	let store = MemoryStore::new();
	ingest::ingest_tlsrpt(&store, "example.com", doc.as_bytes(), CompressionType::None, Receipt::from_file("quiet.json")).unwrap();
	ingest::refresh_rollups(&store, "example.com").unwrap();

	let sources = store.get_tlsrpt_sources("example.com").unwrap();
	assert_eq!(sources.len(), 1);
	assert_eq!(sources[0].organization_name, "Quiet Inc.");
	assert_eq!(sources[0].successful_session_percentage, None);
}

#[test]
fn malformed_files_are_reported_and_not_stored() {
	let mut file = tempfile::Builder::new().suffix(".xml").tempfile().unwrap();
	file.write_all(b"<feedback><report_metadata>").unwrap();
	file.flush().unwrap();

	let store = MemoryStore::new();
	match ingest::ingest_file(&store, "example.com", file.path()) {
		Err(IngestError::Decode(_)) => {},
		other => panic!("unexpected result: {:?}", other),
	}
	assert!(store.get_dmarc_reports("example.com").unwrap().is_empty());
}

#[test]
fn zipped_dmarc_file() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("google.com!example.com!1747008000!1747094399.zip");
	{
		let mut writer = zip::ZipWriter::new(fs::File::create(&path).unwrap());
		writer.start_file("google.com!example.com!1747008000!1747094399.xml", zip::write::FileOptions::default()).unwrap();
		writer.write_all(&google_dmarc()).unwrap();
		writer.finish().unwrap();
	}

	let store = MemoryStore::new();
	assert_eq!(ingest::ingest_file(&store, "example.com", &path).unwrap(), ReportKind::Dmarc);
	assert_eq!(store.get_dmarc_reports("example.com").unwrap()[0].report_id, "8639335954371369510");
}

#[test]
fn lookup_by_id() {
	let store = MemoryStore::new();
	let json = fs::read(testdata("tlsrpt/google.com!example.com!1747094400!1747180799!001.json")).unwrap();
	let decoded = parse_report("google.json", json.as_slice(), CompressionType::None).unwrap();
	store.write_tlsrpt_report("example.com", &decoded.into_report("example.com", Receipt::from_file("google.json"), String::new())).unwrap();

	assert!(store.get_tlsrpt_report_by_id("example.com", "2025-05-13T00:00:00Z_example.com").is_ok());
	match store.get_tlsrpt_report_by_id("example.com", "missing") {
		Err(StoreError::NotFound { owner, report_id }) => {
			assert_eq!(owner, "example.com");
			assert_eq!(report_id, "missing");
		},
		other => panic!("unexpected result: {:?}", other),
	}
}
