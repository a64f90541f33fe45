//! SMTP TLS reports (RFC 8460): decoding, canonical reports and rollups.

pub mod aggregate;
pub mod parser;
pub mod report;
pub mod result_type;
pub mod types;

pub use aggregate::TlsRptSources;
pub use parser::{parse_report, CompressionType};
pub use report::{TlsRptReport, TlsRptReportRow};
pub use result_type::{Category, ResultType};
pub use types::Report;
