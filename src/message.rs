use flate2::read::GzDecoder;
use imap_proto::types::BodyStructure;
use log::debug;
use std::io::{prelude::*, Cursor};

use crate::error::{DecodeError, IngestError};

/// How a report attachment is packaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFileType {
	Gzip,
	Zip,
	Xml,
	Json,
}

impl ReportFileType {
	pub fn from_mime(ty: &str, subtype: &str) -> Option<ReportFileType> {
		match (ty.to_lowercase().as_str(), subtype.to_lowercase().as_str()) {
			("application", "gzip") | ("application", "x-gzip") | ("application", "tlsrpt+gzip") => Some(ReportFileType::Gzip),
			("application", "zip") | ("application", "x-zip-compressed") => Some(ReportFileType::Zip),
			("application", "xml") | ("text", "xml") => Some(ReportFileType::Xml),
			("application", "json") | ("application", "tlsrpt+json") => Some(ReportFileType::Json),
			_ => None,
		}
	}

	pub fn from_file_name(name: &str) -> ReportFileType {
		let name = name.to_lowercase();
		if name.ends_with(".gz") {
			ReportFileType::Gzip
		} else if name.ends_with(".zip") {
			ReportFileType::Zip
		} else if name.ends_with(".json") {
			ReportFileType::Json
		} else {
			ReportFileType::Xml
		}
	}
}

/// Searches the given IMAP BodyStructure for a report file.
///
/// Returns the IMAP part number (e.g. `1.2`) of the first attachment that
/// looks like a report, together with its packaging.
pub fn find_report(body_structure: &BodyStructure, prefix: String) -> Option<(String, ReportFileType)> {
	match body_structure {
		BodyStructure::Multipart { common: _, bodies, extension: _ } => {
			// unwrap the multipart message
			for (i, body) in bodies.iter().enumerate() {
				let mut actual_prefix = prefix.clone();
				if actual_prefix != "" {
					actual_prefix += ".";
				}
				let result = find_report(body, actual_prefix + &(i + 1).to_string());
				if result.is_some() {
					return result;
				}
			}

			None
		},

		BodyStructure::Basic { common, other: _, extension: _ } => {
			let part_number = match prefix.as_str() {
				"" => "1".to_string(),
				_ => prefix,
			};

			ReportFileType::from_mime(&common.ty.ty, &common.ty.subtype).map(|filetype| (part_number, filetype))
		},

		BodyStructure::Text { common, other: _, lines: _, extension: _ } => {
			// text/xml is an attachment, anything else is the human-readable part
			let part_number = match prefix.as_str() {
				"" => "1".to_string(),
				_ => prefix,
			};

			match ReportFileType::from_mime(&common.ty.ty, &common.ty.subtype) {
				Some(ReportFileType::Xml) => Some((part_number, ReportFileType::Xml)),
				_ => None,
			}
		},

		BodyStructure::Message { common: _, other: _, envelope: _, body: _, lines: _, extension: _, } => {
			// forwarded messages are not followed
			None
		},
	}
}

/// Parses an IMAP part number such as `1.2` into its components.
pub fn part_path(part_number: &str) -> Vec<u32> {
	part_number.split('.').filter_map(|p| p.parse().ok()).collect()
}

/// FETCH item for a body part that leaves the message's `\Seen` flag alone.
pub fn body_peek_query(part_number: &str) -> String {
	format!("BODY.PEEK[{}]", part_number)
}

/// Undoes the base64 transfer encoding of a body part, if it has one.
pub fn decode_body(raw: &[u8]) -> Vec<u8> {
	let text: Vec<u8> = raw.iter().cloned().filter(|b| !b.is_ascii_whitespace()).collect();
	match base64::decode(&text) {
		Ok(decoded) => decoded,
		Err(e) => {
			debug!("body part of {} bytes is not base64 ({}), using it as is", raw.len(), e);
			raw.to_vec()
		},
	}
}

/// Decompresses a gzip stream completely.
pub fn gunzip(name: &str, data: &[u8]) -> Result<Vec<u8>, DecodeError> {
	let mut result = Vec::new();
	GzDecoder::new(data).read_to_end(&mut result).map_err(|source| DecodeError::Gzip {
		name: name.to_string(),
		source,
	})?;
	Ok(result)
}

/// Given a report type and the raw data in bytes, unpacks the report document.
pub fn read_report(name: &str, report_type: ReportFileType, data: Vec<u8>) -> Result<Vec<u8>, IngestError> {
	let attachment_error = |reason: String| IngestError::Attachment {
		name: name.to_string(),
		reason,
	};

	match report_type {
		ReportFileType::Gzip => Ok(gunzip(name, &data)?),
		ReportFileType::Zip => {
			let body_reader = Cursor::new(data);
			let mut archive = zip::ZipArchive::new(body_reader).map_err(|e| attachment_error(e.to_string()))?;

			if archive.len() != 1 {
				return Err(attachment_error(format!("ZIP archive has {} files, expected one", archive.len())));
			}

			let mut report_file = archive.by_index(0).map_err(|e| attachment_error(e.to_string()))?;
			let mut result = Vec::new();
			report_file.read_to_end(&mut result).map_err(|e| attachment_error(e.to_string()))?;
			Ok(result)
		},
		ReportFileType::Xml | ReportFileType::Json => Ok(data),
	}
}
