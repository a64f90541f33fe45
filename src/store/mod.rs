//! Persistence of canonical reports and their rollups.
//!
//! Both report kinds share the same contract. Refreshing rollups reads the
//! current ones, folds the given reports and upserts the result; callers run
//! at most one refresh per domain owner at a time.

pub mod memory;
pub mod sql;

use log::info;

use crate::config::{Backend, DatabaseConfig};
use crate::dmarc::{self, DmarcReport, DmarcSources};
use crate::error::StoreError;
use crate::tlsrpt::{self, TlsRptReport, TlsRptSources};

pub use self::memory::MemoryStore;
pub use self::sql::{MigrateDirection, MysqlStore};

pub trait DmarcRepository {
	fn get_dmarc_reports(&self, domain_owner: &str) -> Result<Vec<DmarcReport>, StoreError>;

	/// Fails with `StoreError::NotFound` when the owner has no such report.
	fn get_dmarc_report_by_id(&self, domain_owner: &str, report_id: &str) -> Result<DmarcReport, StoreError>;

	/// Appends a report. Reports are never updated once written.
	fn write_dmarc_report(&self, domain_owner: &str, report: &DmarcReport) -> Result<(), StoreError>;

	fn get_dmarc_sources(&self, domain_owner: &str) -> Result<Vec<DmarcSources>, StoreError>;

	/// Replaces every stored rollup of the owner with `sources`.
	fn replace_dmarc_sources(&self, domain_owner: &str, sources: Vec<DmarcSources>) -> Result<(), StoreError>;

	/// Recomputes the rollups touched by `reports` and stores them.
	fn write_dmarc_sources_aggregate(&self, domain_owner: &str, reports: &[DmarcReport]) -> Result<(), StoreError> {
		let mut sources = self.get_dmarc_sources(domain_owner)?;
		let fresh = dmarc::aggregate::aggregate(domain_owner, reports);
		info!("refreshing {} DMARC rollup(s) for {}", fresh.len(), domain_owner);

		dmarc::aggregate::merge(&mut sources, fresh);
		self.replace_dmarc_sources(domain_owner, sources)
	}
}

pub trait TlsRptRepository {
	fn get_tlsrpt_reports(&self, domain_owner: &str) -> Result<Vec<TlsRptReport>, StoreError>;

	/// Fails with `StoreError::NotFound` when the owner has no such report.
	fn get_tlsrpt_report_by_id(&self, domain_owner: &str, report_id: &str) -> Result<TlsRptReport, StoreError>;

	fn write_tlsrpt_report(&self, domain_owner: &str, report: &TlsRptReport) -> Result<(), StoreError>;

	fn get_tlsrpt_sources(&self, domain_owner: &str) -> Result<Vec<TlsRptSources>, StoreError>;

	fn replace_tlsrpt_sources(&self, domain_owner: &str, sources: Vec<TlsRptSources>) -> Result<(), StoreError>;

	fn write_tlsrpt_sources_aggregate(&self, domain_owner: &str, reports: &[TlsRptReport]) -> Result<(), StoreError> {
		let mut sources = self.get_tlsrpt_sources(domain_owner)?;
		let fresh = tlsrpt::aggregate::aggregate(domain_owner, reports);
		info!("refreshing {} TLS-RPT rollup(s) for {}", fresh.len(), domain_owner);

		tlsrpt::aggregate::merge(&mut sources, fresh);
		self.replace_tlsrpt_sources(domain_owner, sources)
	}
}

/// Everything the ingestion side needs from a backend.
pub trait Repository: DmarcRepository + TlsRptRepository + Send + Sync {}

impl<T: DmarcRepository + TlsRptRepository + Send + Sync> Repository for T {}

/// Opens the backend named in the configuration.
pub fn open(config: &DatabaseConfig) -> Result<Box<dyn Repository>, StoreError> {
	match config.backend {
		Backend::Memory => {
			info!("using in-memory report store");
			Ok(Box::new(MemoryStore::new()))
		},
		Backend::Mysql => {
			info!("connecting to MySQL at {}", config.host);
			let store = MysqlStore::connect(config)?;
			store.migrate(MigrateDirection::Up)?;
			Ok(Box::new(store))
		},
	}
}
