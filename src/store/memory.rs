use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{DmarcRepository, TlsRptRepository};
use crate::dmarc::{DmarcReport, DmarcSources};
use crate::error::StoreError;
use crate::tlsrpt::{TlsRptReport, TlsRptSources};

#[derive(Debug, Default)]
struct OwnerData {
	dmarc_reports: Vec<DmarcReport>,
	dmarc_sources: Vec<DmarcSources>,
	tlsrpt_reports: Vec<TlsRptReport>,
	tlsrpt_sources: Vec<TlsRptSources>,
}

/// Keeps everything in process memory, keyed by domain owner.
#[derive(Debug, Default)]
pub struct MemoryStore {
	owners: Mutex<HashMap<String, OwnerData>>,
}

impl MemoryStore {
	pub fn new() -> MemoryStore {
		MemoryStore::default()
	}

	fn owners(&self) -> MutexGuard<'_, HashMap<String, OwnerData>> {
		// the data stays consistent even if a writer panicked; every write is a single push or swap
		self.owners.lock().unwrap_or_else(PoisonError::into_inner)
	}

	fn read<T, F: FnOnce(&OwnerData) -> T>(&self, domain_owner: &str, f: F) -> Option<T> {
		self.owners().get(domain_owner).map(f)
	}

	fn write<F: FnOnce(&mut OwnerData)>(&self, domain_owner: &str, f: F) {
		f(self.owners().entry(domain_owner.to_string()).or_default())
	}
}

fn not_found(domain_owner: &str, report_id: &str) -> StoreError {
	StoreError::NotFound {
		owner: domain_owner.to_string(),
		report_id: report_id.to_string(),
	}
}

impl DmarcRepository for MemoryStore {
	fn get_dmarc_reports(&self, domain_owner: &str) -> Result<Vec<DmarcReport>, StoreError> {
		Ok(self.read(domain_owner, |d| d.dmarc_reports.clone()).unwrap_or_default())
	}

	fn get_dmarc_report_by_id(&self, domain_owner: &str, report_id: &str) -> Result<DmarcReport, StoreError> {
		self.read(domain_owner, |d| d.dmarc_reports.iter().find(|r| r.report_id == report_id).cloned())
			.flatten()
			.ok_or_else(|| not_found(domain_owner, report_id))
	}

	fn write_dmarc_report(&self, domain_owner: &str, report: &DmarcReport) -> Result<(), StoreError> {
		self.write(domain_owner, |d| d.dmarc_reports.push(report.clone()));
		Ok(())
	}

	fn get_dmarc_sources(&self, domain_owner: &str) -> Result<Vec<DmarcSources>, StoreError> {
		Ok(self.read(domain_owner, |d| d.dmarc_sources.clone()).unwrap_or_default())
	}

	fn replace_dmarc_sources(&self, domain_owner: &str, sources: Vec<DmarcSources>) -> Result<(), StoreError> {
		self.write(domain_owner, |d| d.dmarc_sources = sources);
		Ok(())
	}
}

impl TlsRptRepository for MemoryStore {
	fn get_tlsrpt_reports(&self, domain_owner: &str) -> Result<Vec<TlsRptReport>, StoreError> {
		Ok(self.read(domain_owner, |d| d.tlsrpt_reports.clone()).unwrap_or_default())
	}

	fn get_tlsrpt_report_by_id(&self, domain_owner: &str, report_id: &str) -> Result<TlsRptReport, StoreError> {
		self.read(domain_owner, |d| d.tlsrpt_reports.iter().find(|r| r.report_id == report_id).cloned())
			.flatten()
			.ok_or_else(|| not_found(domain_owner, report_id))
	}

	fn write_tlsrpt_report(&self, domain_owner: &str, report: &TlsRptReport) -> Result<(), StoreError> {
		self.write(domain_owner, |d| d.tlsrpt_reports.push(report.clone()));
		Ok(())
	}

	fn get_tlsrpt_sources(&self, domain_owner: &str) -> Result<Vec<TlsRptSources>, StoreError> {
		Ok(self.read(domain_owner, |d| d.tlsrpt_sources.clone()).unwrap_or_default())
	}

	fn replace_tlsrpt_sources(&self, domain_owner: &str, sources: Vec<TlsRptSources>) -> Result<(), StoreError> {
		self.write(domain_owner, |d| d.tlsrpt_sources = sources);
		Ok(())
	}
}
