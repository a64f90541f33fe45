use std::env;
use std::error::Error;
use std::fs;
use std::net::TcpStream;
use std::path::Path;

use chrono::Utc;
use imap_proto::types::{Address, SectionPath};
use log::{error, info, warn};
use native_tls::{TlsConnector, TlsStream};
use regex::Regex;
use simple_error::bail;

use mailwatch::config::{self, IMAPConfig};
use mailwatch::ingest::{self, ReportKind};
use mailwatch::message;
use mailwatch::store::{self, Repository};
use mailwatch::{IngestError, Receipt};

fn main() {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = run() {
		error!("{}", e);
		std::process::exit(1);
	}
}

fn run() -> Result<(), Box<dyn Error>> {
	/*
	 * config parsing
	 */
	let config_path_text = env::var("MAILWATCH_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
	let config_path = Path::new(&config_path_text);
	if !config_path.exists() {
		warn!("Could not find config at {}, creating default...", config_path.display());
		fs::write(config_path, toml::to_string(&config::DEFAULT)?)?;
	}

	let config_text = fs::read_to_string(config_path)?;
	let config = config::parse(&config_text)?;

	/*
	 * report store
	 */
	let store = store::open(&config.database)?;

	/*
	 * ingestion: files named on the command line, otherwise the mailboxes
	 */
	let files: Vec<String> = env::args().skip(1).collect();
	if files.is_empty() {
		let mailboxes = [(ReportKind::Dmarc, &config.dmarc), (ReportKind::TlsRpt, &config.tlsrpt)];
		for (kind, mailbox) in mailboxes.iter() {
			if !mailbox.enabled {
				info!("{:?} mailbox disabled, skipping", kind);
				continue;
			}
			poll_mailbox(&*store, config.domain_owner, *kind, mailbox)?;
		}
	} else {
		for file in &files {
			match ingest::ingest_file(&*store, config.domain_owner, Path::new(file)) {
				Ok(kind) => info!("stored {:?} report from {}", kind, file),
				Err(IngestError::Store(e)) => return Err(e.into()),
				Err(e) => warn!("skipping {}: {}", file, e),
			}
		}
	}

	ingest::refresh_rollups(&*store, config.domain_owner)?;
	info!("rollups for {} are up to date", config.domain_owner);

	Ok(())
}

fn format_address(address: &Address) -> String {
	let mailbox = address.mailbox.as_ref().map(|m| String::from_utf8_lossy(m).into_owned()).unwrap_or_default();
	let host = address.host.as_ref().map(|h| String::from_utf8_lossy(h).into_owned()).unwrap_or_default();
	if host.is_empty() {
		mailbox
	} else {
		format!("{}@{}", mailbox, host)
	}
}

fn mark_seen(session: &mut imap::Session<TlsStream<TcpStream>>, message: u32) -> Result<(), Box<dyn Error>> {
	session.store(message.to_string(), "+FLAGS (\\Seen)")?;
	Ok(())
}

/// Ingests the report attachment of every unseen message in the mailbox.
///
/// A message is flagged `\Seen` once its report is stored or found unusable.
/// Storage failures abort the run and leave the message unseen for the next one.
fn poll_mailbox(store: &dyn Repository, domain_owner: &str, kind: ReportKind, mailbox: &IMAPConfig) -> Result<(), Box<dyn Error>> {
	if !mailbox.tls {
		bail!("mailbox {} has tls = false, plaintext IMAP is not supported", mailbox.username);
	}

	let re = Regex::new(r"Report-ID:\s*<?([^>\s]+)>?")?;

	/*
	 * imap connection
	 */
	let tls = TlsConnector::builder().build()?;
	let client = imap::connect((mailbox.host, mailbox.port), mailbox.host, &tls)?;
	let mut session: imap::Session<TlsStream<TcpStream>> = client.login(mailbox.username, mailbox.password).map_err(|e| e.0)?;

	let selected = session.select(mailbox.folder)?;
	info!("{} on {} has {} message(s)", mailbox.folder, mailbox.host, selected.exists);

	let mut unseen: Vec<u32> = session.search("UNSEEN")?.into_iter().collect();
	unseen.sort();
	if unseen.is_empty() {
		info!("no unseen {:?} reports", kind);
		session.logout()?;
		return Ok(());
	}

	let sequence_set = unseen.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(",");
	let fetch_results = session.fetch(sequence_set, "(ENVELOPE BODYSTRUCTURE)")?;

	for fetch_result in fetch_results.iter() {
		let envelope = match fetch_result.envelope() {
			Some(envelope) => envelope,
			None => {
				warn!("message {} has no envelope, skipping", fetch_result.message);
				continue;
			},
		};
		let subject_text = envelope.subject.as_ref().map(|s| String::from_utf8_lossy(s).into_owned()).unwrap_or_default();
		let sender = envelope
			.from
			.as_ref()
			.and_then(|from| from.first())
			.map(format_address)
			.unwrap_or_default();

		let report_id = match re.captures(&subject_text).and_then(|c| c.get(1)) {
			Some(m) => m.as_str().to_string(),
			None => {
				info!("Skipping subject line '{}'", subject_text);
				mark_seen(&mut session, fetch_result.message)?;
				continue;
			},
		};

		let report_info = fetch_result.bodystructure().and_then(|b| message::find_report(b, "".to_string()));
		let (part_number, file_type) = match report_info {
			Some(info) => info,
			None => {
				warn!("Couldn't find report attachment in message for ID {}", report_id);
				mark_seen(&mut session, fetch_result.message)?;
				continue;
			},
		};

		// peek so the message stays unseen until its report is stored
		let message_results = session.fetch(fetch_result.message.to_string(), message::body_peek_query(&part_number))?;
		let body_data = match message_results
			.first()
			.and_then(|m| m.section(&SectionPath::Part(message::part_path(&part_number), None)))
		{
			Some(data) => data,
			None => {
				warn!("Server returned no body for part {} of report ID {}", part_number, report_id);
				continue;
			},
		};

		let receipt = Receipt {
			received_at: Utc::now(),
			email_sender: sender,
			email_subject: subject_text.clone(),
			report_file_name: format!("{}#{}", report_id, part_number),
		};
		match ingest::ingest_attachment(store, domain_owner, kind, file_type, message::decode_body(body_data), receipt) {
			Ok(()) => info!("stored {:?} report {}", kind, report_id),
			Err(e) if e.is_retryable() => {
				session.logout()?;
				return Err(e.into());
			},
			Err(e) => warn!("skipping report ID {}: {}", report_id, e),
		}
		mark_seen(&mut session, fetch_result.message)?;
	}

	session.logout()?;
	Ok(())
}
