//! Turning report attachments into stored canonical reports.

use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::dmarc::{self, DmarcReport};
use crate::error::{IngestError, StoreError};
use crate::message::{self, ReportFileType};
use crate::receipt::Receipt;
use crate::store::{DmarcRepository, TlsRptRepository};
use crate::tlsrpt::{self, CompressionType, TlsRptReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
	Dmarc,
	TlsRpt,
}

impl ReportKind {
	/// TLS-RPT files are conventionally named `*.json` or `*.json.gz`.
	pub fn from_file_name(name: &str) -> ReportKind {
		if name.to_lowercase().contains(".json") {
			ReportKind::TlsRpt
		} else {
			ReportKind::Dmarc
		}
	}
}

/// Decodes a DMARC document and stores it for `domain_owner`.
pub fn ingest_dmarc<S: DmarcRepository + ?Sized>(store: &S, domain_owner: &str, document: &[u8], receipt: Receipt) -> Result<DmarcReport, IngestError> {
	let name = receipt.report_file_name.clone();
	let feedback = dmarc::parse_feedback(&name, document)?;
	let report = feedback.into_report(domain_owner, receipt, String::from_utf8_lossy(document).into_owned());

	debug!("DMARC report {} from {} has {} row(s)", report.report_id, report.organization_name, report.rows.len());
	store.write_dmarc_report(domain_owner, &report)?;
	Ok(report)
}

/// Decodes a TLS-RPT document, gzip-compressed or not, and stores it for `domain_owner`.
pub fn ingest_tlsrpt<S: TlsRptRepository + ?Sized>(
	store: &S,
	domain_owner: &str,
	data: &[u8],
	compression: CompressionType,
	receipt: Receipt,
) -> Result<TlsRptReport, IngestError> {
	let name = receipt.report_file_name.clone();
	let decoded = tlsrpt::parse_report(&name, data, compression)?;
	let content = match compression {
		CompressionType::None => String::from_utf8_lossy(data).into_owned(),
		CompressionType::Gzip => String::from_utf8_lossy(&message::gunzip(&name, data)?).into_owned(),
	};
	let report = decoded.into_report(domain_owner, receipt, content);

	debug!("TLS-RPT report {} from {} has {} row(s)", report.report_id, report.organization_name, report.rows.len());
	store.write_tlsrpt_report(domain_owner, &report)?;
	Ok(report)
}

/// Unpacks an attachment of the given packaging and ingests the report inside.
pub fn ingest_attachment<S: DmarcRepository + TlsRptRepository + ?Sized>(
	store: &S,
	domain_owner: &str,
	kind: ReportKind,
	file_type: ReportFileType,
	data: Vec<u8>,
	receipt: Receipt,
) -> Result<(), IngestError> {
	let name = receipt.report_file_name.clone();
	match kind {
		ReportKind::Dmarc => {
			let document = message::read_report(&name, file_type, data)?;
			ingest_dmarc(store, domain_owner, &document, receipt)?;
		},
		ReportKind::TlsRpt => {
			// gzip goes to the decoder as is, zip has to be opened here
			let (document, compression) = match file_type {
				ReportFileType::Gzip => (data, CompressionType::Gzip),
				other => (message::read_report(&name, other, data)?, CompressionType::None),
			};
			ingest_tlsrpt(store, domain_owner, &document, compression, receipt)?;
		},
	}
	Ok(())
}

/// Ingests a report file from disk, inferring its kind and packaging from the name.
pub fn ingest_file<S: DmarcRepository + TlsRptRepository + ?Sized>(store: &S, domain_owner: &str, path: &Path) -> Result<ReportKind, IngestError> {
	let file_name = path
		.file_name()
		.map(|n| n.to_string_lossy().into_owned())
		.unwrap_or_else(|| path.display().to_string());
	let data = fs::read(path).map_err(|e| IngestError::Attachment {
		name: file_name.clone(),
		reason: e.to_string(),
	})?;

	let kind = ReportKind::from_file_name(&file_name);
	let file_type = ReportFileType::from_file_name(&file_name);
	info!("ingesting {} as {:?} ({:?})", file_name, kind, file_type);

	ingest_attachment(store, domain_owner, kind, file_type, data, Receipt::from_file(&file_name))?;
	Ok(kind)
}

/// Recomputes every rollup of `domain_owner` from all of its stored reports.
pub fn refresh_rollups<S: DmarcRepository + TlsRptRepository + ?Sized>(store: &S, domain_owner: &str) -> Result<(), StoreError> {
	let dmarc_reports = store.get_dmarc_reports(domain_owner)?;
	store.write_dmarc_sources_aggregate(domain_owner, &dmarc_reports)?;

	let tlsrpt_reports = store.get_tlsrpt_reports(domain_owner)?;
	store.write_tlsrpt_sources_aggregate(domain_owner, &tlsrpt_reports)?;
	Ok(())
}
