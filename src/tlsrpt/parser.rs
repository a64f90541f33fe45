use std::io::{BufReader, Read};

use flate2::read::GzDecoder;

use super::types::Report;
use crate::error::DecodeError;

/// Transport-level compression of a TLS-RPT report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
	None,
	Gzip,
}

/// Decodes one TLS-RPT JSON document, decompressing it first if needed.
///
/// The decompressor is owned by this call and is dropped on every return path.
pub fn parse_report<R: Read>(name: &str, reader: R, compression: CompressionType) -> Result<Report, DecodeError> {
	match compression {
		CompressionType::None => decode_json(name, BufReader::new(reader)),
		CompressionType::Gzip => {
			let mut decompressed = Vec::new();
			GzDecoder::new(reader)
				.read_to_end(&mut decompressed)
				.map_err(|source| DecodeError::Gzip {
					name: name.to_string(),
					source,
				})?;
			decode_json(name, decompressed.as_slice())
		},
	}
}

fn decode_json<R: Read>(name: &str, reader: R) -> Result<Report, DecodeError> {
	serde_json::from_reader(reader).map_err(|source| DecodeError::Json {
		name: name.to_string(),
		source,
	})
}
