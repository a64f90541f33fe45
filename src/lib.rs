//! Collects DMARC aggregate reports and SMTP TLS reports for a domain owner,
//! stores them in canonical form and keeps per-domain compliance rollups.

pub mod config;
pub mod dmarc;
pub mod error;
pub mod ingest;
pub mod message;
pub mod receipt;
pub mod rollup;
pub mod store;
pub mod tlsrpt;

pub use error::{DecodeError, IngestError, StoreError};
pub use receipt::Receipt;
