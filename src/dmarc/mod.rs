//! DMARC aggregate reports (RFC 7489): decoding, canonical reports and rollups.

pub mod aggregate;
pub mod parser;
pub mod report;
pub mod types;

pub use aggregate::{DmarcSource, DmarcSources};
pub use parser::parse_feedback;
pub use report::{Disposition, DmarcReport, DmarcReportRow};
pub use types::Feedback;
