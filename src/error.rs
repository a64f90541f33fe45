use std::io;

use thiserror::Error;

/// A report stream could not be turned into a report document.
///
/// Every variant carries the name of the offending stream (usually the
/// attachment or file name) so a failure in a batch can be traced back.
#[derive(Debug, Error)]
pub enum DecodeError {
	#[error("{name}: malformed DMARC feedback: {source}")]
	Xml {
		name: String,
		#[source]
		source: serde_xml_rs::Error,
	},

	#[error("{name}: corrupt gzip stream: {source}")]
	Gzip {
		name: String,
		#[source]
		source: io::Error,
	},

	#[error("{name}: malformed TLS-RPT report: {source}")]
	Json {
		name: String,
		#[source]
		source: serde_json::Error,
	},
}

impl DecodeError {
	/// Name of the stream that failed to decode.
	pub fn name(&self) -> &str {
		match self {
			DecodeError::Xml { name, .. } => name,
			DecodeError::Gzip { name, .. } => name,
			DecodeError::Json { name, .. } => name,
		}
	}
}

#[derive(Debug, Error)]
pub enum StoreError {
	#[error("no report {report_id} for {owner}")]
	NotFound { owner: String, report_id: String },

	#[error("database error: {0}")]
	Mysql(#[from] mysql::Error),

	#[error("could not encode column: {0}")]
	Encoding(#[from] serde_json::Error),

	#[error("stored data is corrupt: {0}")]
	Corrupt(String),
}

#[derive(Debug, Error)]
pub enum IngestError {
	#[error(transparent)]
	Decode(#[from] DecodeError),

	#[error(transparent)]
	Store(#[from] StoreError),

	#[error("unusable attachment {name}: {reason}")]
	Attachment { name: String, reason: String },
}

impl IngestError {
	/// Whether the attachment should be tried again on a later run.
	///
	/// Only storage failures qualify; a document that failed to decode or
	/// unpack will fail the same way next time.
	pub fn is_retryable(&self) -> bool {
		matches!(self, IngestError::Store(_))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn only_store_failures_are_retried() {
		let store = IngestError::from(StoreError::Corrupt("no id for inserted report".to_string()));
		assert!(store.is_retryable());

		let attachment = IngestError::Attachment {
			name: "r.zip".to_string(),
			reason: "ZIP archive has 2 files, expected one".to_string(),
		};
		assert!(!attachment.is_retryable());

		let decode = IngestError::from(DecodeError::Gzip {
			name: "r.json.gz".to_string(),
			source: io::Error::new(io::ErrorKind::InvalidData, "invalid gzip header"),
		});
		assert!(!decode.is_retryable());
		assert_eq!(decode.to_string(), "r.json.gz: corrupt gzip stream: invalid gzip header");
	}
}
