use mysql::prelude::*;
use mysql::*;

use super::{DmarcRepository, TlsRptRepository};
use crate::config::DatabaseConfig;
use crate::dmarc::{Disposition, DmarcReport, DmarcReportRow, DmarcSource, DmarcSources};
use crate::error::StoreError;
use crate::receipt::epoch_seconds;
use crate::tlsrpt::{ResultType, TlsRptReport, TlsRptReportRow, TlsRptSources};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateDirection {
	Up,
	Down,
}

const CREATE_TABLES: &[&str] = &[
	"CREATE TABLE IF NOT EXISTS dmarc_reports (
		id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
		domain_owner VARCHAR(255) NOT NULL,
		organization_name VARCHAR(255) NOT NULL,
		domain_name VARCHAR(255) NOT NULL,
		extra_contact_info TEXT NOT NULL,
		report_id VARCHAR(255) NOT NULL,
		range_start BIGINT NOT NULL,
		range_end BIGINT NOT NULL,
		received_at BIGINT NOT NULL,
		email_sender VARCHAR(255) NOT NULL,
		email_subject TEXT NOT NULL,
		report_file_name VARCHAR(255) NOT NULL,
		total_number_of_emails BIGINT UNSIGNED NOT NULL,
		content MEDIUMTEXT NOT NULL,
		INDEX dmarc_reports_owner (domain_owner, report_id)
	)",
	"CREATE TABLE IF NOT EXISTS dmarc_report_rows (
		report_ref BIGINT UNSIGNED NOT NULL,
		position INT UNSIGNED NOT NULL,
		email_count BIGINT UNSIGNED NOT NULL,
		source_ip VARCHAR(64) NOT NULL,
		resolved_hostname VARCHAR(255) NOT NULL,
		envelope_to VARCHAR(255) NOT NULL,
		envelope_from VARCHAR(255) NOT NULL,
		header_from VARCHAR(255) NOT NULL,
		spf_domain VARCHAR(255) NOT NULL,
		spf_result VARCHAR(32) NOT NULL,
		spf_scope VARCHAR(32) NOT NULL,
		dkim_domain VARCHAR(255) NOT NULL,
		dkim_selector VARCHAR(255) NOT NULL,
		dkim_result VARCHAR(32) NOT NULL,
		spf_aligned BOOLEAN NOT NULL,
		dkim_aligned BOOLEAN NOT NULL,
		inferred_aligned BOOLEAN NOT NULL,
		disposition VARCHAR(16) NOT NULL,
		PRIMARY KEY (report_ref, position),
		FOREIGN KEY (report_ref) REFERENCES dmarc_reports (id) ON DELETE CASCADE
	)",
	"CREATE TABLE IF NOT EXISTS dmarc_sources (
		domain_owner VARCHAR(255) NOT NULL,
		position INT UNSIGNED NOT NULL,
		organization_name VARCHAR(255) NOT NULL,
		domain VARCHAR(255) NOT NULL,
		PRIMARY KEY (domain_owner, position)
	)",
	"CREATE TABLE IF NOT EXISTS dmarc_source_ips (
		domain_owner VARCHAR(255) NOT NULL,
		domain VARCHAR(255) NOT NULL,
		position INT UNSIGNED NOT NULL,
		ip_address VARCHAR(64) NOT NULL,
		reported_emails BIGINT UNSIGNED NOT NULL,
		spf_alignment_percentage DOUBLE NOT NULL,
		dkim_alignment_percentage DOUBLE NOT NULL,
		dmarc_alignment_percentage DOUBLE NOT NULL,
		PRIMARY KEY (domain_owner, domain, position)
	)",
	"CREATE TABLE IF NOT EXISTS tlsrpt_reports (
		id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
		domain_owner VARCHAR(255) NOT NULL,
		organization_name VARCHAR(255) NOT NULL,
		domain_name VARCHAR(255) NOT NULL,
		report_id VARCHAR(255) NOT NULL,
		extra_contact_info TEXT NOT NULL,
		range_start BIGINT NOT NULL,
		range_end BIGINT NOT NULL,
		received_at BIGINT NOT NULL,
		email_sender VARCHAR(255) NOT NULL,
		email_subject TEXT NOT NULL,
		report_file_name VARCHAR(255) NOT NULL,
		total_number_of_sessions BIGINT UNSIGNED NOT NULL,
		content MEDIUMTEXT NOT NULL,
		INDEX tlsrpt_reports_owner (domain_owner, report_id)
	)",
	"CREATE TABLE IF NOT EXISTS tlsrpt_report_rows (
		report_ref BIGINT UNSIGNED NOT NULL,
		position INT UNSIGNED NOT NULL,
		domain_name VARCHAR(255) NOT NULL,
		ip_address VARCHAR(64) NOT NULL,
		policy_type VARCHAR(32) NOT NULL,
		policy_string TEXT NOT NULL,
		mx_host TEXT NOT NULL,
		result_type VARCHAR(64) NULL,
		successful_session_count BIGINT UNSIGNED NOT NULL,
		failed_session_count BIGINT UNSIGNED NOT NULL,
		PRIMARY KEY (report_ref, position),
		FOREIGN KEY (report_ref) REFERENCES tlsrpt_reports (id) ON DELETE CASCADE
	)",
	"CREATE TABLE IF NOT EXISTS tlsrpt_sources (
		domain_owner VARCHAR(255) NOT NULL,
		position INT UNSIGNED NOT NULL,
		organization_name VARCHAR(255) NOT NULL,
		domain VARCHAR(255) NOT NULL,
		successful_session_percentage DOUBLE NULL,
		PRIMARY KEY (domain_owner, position)
	)",
];

const DROP_TABLES: &[&str] = &[
	"DROP TABLE IF EXISTS tlsrpt_sources",
	"DROP TABLE IF EXISTS tlsrpt_report_rows",
	"DROP TABLE IF EXISTS tlsrpt_reports",
	"DROP TABLE IF EXISTS dmarc_source_ips",
	"DROP TABLE IF EXISTS dmarc_sources",
	"DROP TABLE IF EXISTS dmarc_report_rows",
	"DROP TABLE IF EXISTS dmarc_reports",
];

const DMARC_REPORT_COLUMNS: &str = "id, organization_name, domain_name, extra_contact_info, report_id, range_start, range_end, received_at, email_sender, email_subject, report_file_name, total_number_of_emails, content";

const TLSRPT_REPORT_COLUMNS: &str = "id, organization_name, domain_name, report_id, extra_contact_info, range_start, range_end, received_at, email_sender, email_subject, report_file_name, total_number_of_sessions, content";

/// Stores reports and rollups in MySQL.
pub struct MysqlStore {
	pool: Pool,
}

fn take<T: FromValue>(row: &mut Row, column: &str) -> std::result::Result<T, StoreError> {
	match row.take_opt(column) {
		Some(Ok(value)) => Ok(value),
		Some(Err(e)) => Err(StoreError::Corrupt(format!("column {}: {:?}", column, e))),
		None => Err(StoreError::Corrupt(format!("missing column {}", column))),
	}
}

fn not_found(domain_owner: &str, report_id: &str) -> StoreError {
	StoreError::NotFound {
		owner: domain_owner.to_string(),
		report_id: report_id.to_string(),
	}
}

impl MysqlStore {
	pub fn connect(config: &DatabaseConfig) -> std::result::Result<MysqlStore, StoreError> {
		let opts = OptsBuilder::new()
			.ip_or_hostname(Some(config.host))
			.user(Some(config.username))
			.pass(Some(config.password))
			.db_name(Some(config.database));

		Ok(MysqlStore {
			pool: Pool::new(opts)?,
		})
	}

	/// Creates (`Up`) or drops (`Down`) every table the store uses.
	pub fn migrate(&self, direction: MigrateDirection) -> std::result::Result<(), StoreError> {
		let mut conn = self.pool.get_conn()?;
		let statements = match direction {
			MigrateDirection::Up => CREATE_TABLES,
			MigrateDirection::Down => DROP_TABLES,
		};
		for statement in statements {
			conn.query_drop(*statement)?;
		}
		Ok(())
	}

	fn load_dmarc_report(&self, conn: &mut PooledConn, domain_owner: &str, mut row: Row) -> std::result::Result<DmarcReport, StoreError> {
		let id: u64 = take(&mut row, "id")?;

		let mut rows = Vec::new();
		let stored: Vec<Row> = conn.exec(
			"SELECT * FROM dmarc_report_rows WHERE report_ref = :id ORDER BY position",
			params! { "id" => id },
		)?;
		for mut r in stored {
			let disposition: String = take(&mut r, "disposition")?;
			rows.push(DmarcReportRow {
				email_count: take(&mut r, "email_count")?,
				source_ip: take(&mut r, "source_ip")?,
				resolved_hostname: take(&mut r, "resolved_hostname")?,
				envelope_to: take(&mut r, "envelope_to")?,
				envelope_from: take(&mut r, "envelope_from")?,
				header_from: take(&mut r, "header_from")?,
				spf_domain: take(&mut r, "spf_domain")?,
				spf_result: take(&mut r, "spf_result")?,
				spf_scope: take(&mut r, "spf_scope")?,
				dkim_domain: take(&mut r, "dkim_domain")?,
				dkim_selector: take(&mut r, "dkim_selector")?,
				dkim_result: take(&mut r, "dkim_result")?,
				spf_aligned: take(&mut r, "spf_aligned")?,
				dkim_aligned: take(&mut r, "dkim_aligned")?,
				inferred_aligned: take(&mut r, "inferred_aligned")?,
				disposition: Disposition::parse(&disposition),
			});
		}

		Ok(DmarcReport {
			domain_owner: domain_owner.to_string(),
			organization_name: take(&mut row, "organization_name")?,
			domain_name: take(&mut row, "domain_name")?,
			extra_contact_info: take(&mut row, "extra_contact_info")?,
			report_id: take(&mut row, "report_id")?,
			range_start: epoch_seconds(take(&mut row, "range_start")?),
			range_end: epoch_seconds(take(&mut row, "range_end")?),
			received_at: epoch_seconds(take(&mut row, "received_at")?),
			email_sender: take(&mut row, "email_sender")?,
			email_subject: take(&mut row, "email_subject")?,
			report_file_name: take(&mut row, "report_file_name")?,
			total_number_of_emails: take(&mut row, "total_number_of_emails")?,
			content: take(&mut row, "content")?,
			rows,
		})
	}

	fn load_tlsrpt_report(&self, conn: &mut PooledConn, domain_owner: &str, mut row: Row) -> std::result::Result<TlsRptReport, StoreError> {
		let id: u64 = take(&mut row, "id")?;

		let mut rows = Vec::new();
		let stored: Vec<Row> = conn.exec(
			"SELECT * FROM tlsrpt_report_rows WHERE report_ref = :id ORDER BY position",
			params! { "id" => id },
		)?;
		for mut r in stored {
			let policy_string: String = take(&mut r, "policy_string")?;
			let mx_host: String = take(&mut r, "mx_host")?;
			let result_type: Option<String> = take(&mut r, "result_type")?;
			rows.push(TlsRptReportRow {
				domain_name: take(&mut r, "domain_name")?,
				ip_address: take(&mut r, "ip_address")?,
				policy_type: take(&mut r, "policy_type")?,
				policy_string: serde_json::from_str(&policy_string)?,
				mx_host: serde_json::from_str(&mx_host)?,
				result_type: result_type.map(ResultType::from),
				successful_session_count: take(&mut r, "successful_session_count")?,
				failed_session_count: take(&mut r, "failed_session_count")?,
			});
		}

		Ok(TlsRptReport {
			domain_owner: domain_owner.to_string(),
			organization_name: take(&mut row, "organization_name")?,
			domain_name: take(&mut row, "domain_name")?,
			report_id: take(&mut row, "report_id")?,
			extra_contact_info: take(&mut row, "extra_contact_info")?,
			range_start: epoch_seconds(take(&mut row, "range_start")?),
			range_end: epoch_seconds(take(&mut row, "range_end")?),
			received_at: epoch_seconds(take(&mut row, "received_at")?),
			email_sender: take(&mut row, "email_sender")?,
			email_subject: take(&mut row, "email_subject")?,
			report_file_name: take(&mut row, "report_file_name")?,
			total_number_of_sessions: take(&mut row, "total_number_of_sessions")?,
			content: take(&mut row, "content")?,
			rows,
		})
	}
}

impl DmarcRepository for MysqlStore {
	fn get_dmarc_reports(&self, domain_owner: &str) -> std::result::Result<Vec<DmarcReport>, StoreError> {
		let mut conn = self.pool.get_conn()?;
		let stored: Vec<Row> = conn.exec(
			format!("SELECT {} FROM dmarc_reports WHERE domain_owner = :owner ORDER BY id", DMARC_REPORT_COLUMNS),
			params! { "owner" => domain_owner },
		)?;

		stored
			.into_iter()
			.map(|row| self.load_dmarc_report(&mut conn, domain_owner, row))
			.collect()
	}

	fn get_dmarc_report_by_id(&self, domain_owner: &str, report_id: &str) -> std::result::Result<DmarcReport, StoreError> {
		let mut conn = self.pool.get_conn()?;
		let stored: Option<Row> = conn.exec_first(
			format!("SELECT {} FROM dmarc_reports WHERE domain_owner = :owner AND report_id = :report_id ORDER BY id LIMIT 1", DMARC_REPORT_COLUMNS),
			params! { "owner" => domain_owner, "report_id" => report_id },
		)?;

		match stored {
			Some(row) => self.load_dmarc_report(&mut conn, domain_owner, row),
			None => Err(not_found(domain_owner, report_id)),
		}
	}

	fn write_dmarc_report(&self, domain_owner: &str, report: &DmarcReport) -> std::result::Result<(), StoreError> {
		let mut conn = self.pool.get_conn()?;
		let mut tx = conn.start_transaction(TxOpts::default())?;

		tx.exec_drop(
			"INSERT INTO dmarc_reports (domain_owner, organization_name, domain_name, extra_contact_info, report_id, range_start, range_end, received_at, email_sender, email_subject, report_file_name, total_number_of_emails, content)
			VALUES (:owner, :organization_name, :domain_name, :extra_contact_info, :report_id, :range_start, :range_end, :received_at, :email_sender, :email_subject, :report_file_name, :total, :content)",
			params! {
				"owner" => domain_owner,
				"organization_name" => report.organization_name.as_str(),
				"domain_name" => report.domain_name.as_str(),
				"extra_contact_info" => report.extra_contact_info.as_str(),
				"report_id" => report.report_id.as_str(),
				"range_start" => report.range_start.timestamp(),
				"range_end" => report.range_end.timestamp(),
				"received_at" => report.received_at.timestamp(),
				"email_sender" => report.email_sender.as_str(),
				"email_subject" => report.email_subject.as_str(),
				"report_file_name" => report.report_file_name.as_str(),
				"total" => report.total_number_of_emails,
				"content" => report.content.as_str()
			},
		)?;
		let id: u64 = tx
			.exec_first("SELECT LAST_INSERT_ID()", ())?
			.ok_or_else(|| StoreError::Corrupt("no id for inserted report".to_string()))?;

		tx.exec_batch(
			"INSERT INTO dmarc_report_rows (report_ref, position, email_count, source_ip, resolved_hostname, envelope_to, envelope_from, header_from, spf_domain, spf_result, spf_scope, dkim_domain, dkim_selector, dkim_result, spf_aligned, dkim_aligned, inferred_aligned, disposition)
			VALUES (:id, :position, :email_count, :source_ip, :resolved_hostname, :envelope_to, :envelope_from, :header_from, :spf_domain, :spf_result, :spf_scope, :dkim_domain, :dkim_selector, :dkim_result, :spf_aligned, :dkim_aligned, :inferred_aligned, :disposition)",
			report.rows.iter().enumerate().map(|(position, row)| params! {
				"id" => id,
				"position" => position as u64,
				"email_count" => row.email_count,
				"source_ip" => row.source_ip.as_str(),
				"resolved_hostname" => row.resolved_hostname.as_str(),
				"envelope_to" => row.envelope_to.as_str(),
				"envelope_from" => row.envelope_from.as_str(),
				"header_from" => row.header_from.as_str(),
				"spf_domain" => row.spf_domain.as_str(),
				"spf_result" => row.spf_result.as_str(),
				"spf_scope" => row.spf_scope.as_str(),
				"dkim_domain" => row.dkim_domain.as_str(),
				"dkim_selector" => row.dkim_selector.as_str(),
				"dkim_result" => row.dkim_result.as_str(),
				"spf_aligned" => row.spf_aligned,
				"dkim_aligned" => row.dkim_aligned,
				"inferred_aligned" => row.inferred_aligned,
				"disposition" => row.disposition.as_str()
			}),
		)?;

		tx.commit()?;
		Ok(())
	}

	fn get_dmarc_sources(&self, domain_owner: &str) -> std::result::Result<Vec<DmarcSources>, StoreError> {
		let mut conn = self.pool.get_conn()?;
		let stored: Vec<(String, String)> = conn.exec(
			"SELECT organization_name, domain FROM dmarc_sources WHERE domain_owner = :owner ORDER BY position",
			params! { "owner" => domain_owner },
		)?;

		let mut all = Vec::with_capacity(stored.len());
		for (organization_name, domain) in stored {
			let sources = conn.exec_map(
				"SELECT ip_address, reported_emails, spf_alignment_percentage, dkim_alignment_percentage, dmarc_alignment_percentage
				FROM dmarc_source_ips WHERE domain_owner = :owner AND domain = :domain ORDER BY position",
				params! { "owner" => domain_owner, "domain" => domain.as_str() },
				|(ip_address, reported_emails, spf, dkim, dmarc)| DmarcSource {
					ip_address,
					reported_emails,
					spf_alignment_percentage: spf,
					dkim_alignment_percentage: dkim,
					dmarc_alignment_percentage: dmarc,
				},
			)?;
			all.push(DmarcSources {
				domain_owner: domain_owner.to_string(),
				organization_name,
				domain,
				sources,
			});
		}
		Ok(all)
	}

	fn replace_dmarc_sources(&self, domain_owner: &str, sources: Vec<DmarcSources>) -> std::result::Result<(), StoreError> {
		let mut conn = self.pool.get_conn()?;
		let mut tx = conn.start_transaction(TxOpts::default())?;

		tx.exec_drop("DELETE FROM dmarc_source_ips WHERE domain_owner = :owner", params! { "owner" => domain_owner })?;
		tx.exec_drop("DELETE FROM dmarc_sources WHERE domain_owner = :owner", params! { "owner" => domain_owner })?;

		tx.exec_batch(
			"INSERT INTO dmarc_sources (domain_owner, position, organization_name, domain) VALUES (:owner, :position, :organization_name, :domain)",
			sources.iter().enumerate().map(|(position, s)| params! {
				"owner" => domain_owner,
				"position" => position as u64,
				"organization_name" => s.organization_name.as_str(),
				"domain" => s.domain.as_str()
			}),
		)?;
		for s in &sources {
			tx.exec_batch(
				"INSERT INTO dmarc_source_ips (domain_owner, domain, position, ip_address, reported_emails, spf_alignment_percentage, dkim_alignment_percentage, dmarc_alignment_percentage)
				VALUES (:owner, :domain, :position, :ip_address, :reported_emails, :spf, :dkim, :dmarc)",
				s.sources.iter().enumerate().map(|(position, source)| params! {
					"owner" => domain_owner,
					"domain" => s.domain.as_str(),
					"position" => position as u64,
					"ip_address" => source.ip_address.as_str(),
					"reported_emails" => source.reported_emails,
					"spf" => source.spf_alignment_percentage,
					"dkim" => source.dkim_alignment_percentage,
					"dmarc" => source.dmarc_alignment_percentage
				}),
			)?;
		}

		tx.commit()?;
		Ok(())
	}
}

impl TlsRptRepository for MysqlStore {
	fn get_tlsrpt_reports(&self, domain_owner: &str) -> std::result::Result<Vec<TlsRptReport>, StoreError> {
		let mut conn = self.pool.get_conn()?;
		let stored: Vec<Row> = conn.exec(
			format!("SELECT {} FROM tlsrpt_reports WHERE domain_owner = :owner ORDER BY id", TLSRPT_REPORT_COLUMNS),
			params! { "owner" => domain_owner },
		)?;

		stored
			.into_iter()
			.map(|row| self.load_tlsrpt_report(&mut conn, domain_owner, row))
			.collect()
	}

	fn get_tlsrpt_report_by_id(&self, domain_owner: &str, report_id: &str) -> std::result::Result<TlsRptReport, StoreError> {
		let mut conn = self.pool.get_conn()?;
		let stored: Option<Row> = conn.exec_first(
			format!("SELECT {} FROM tlsrpt_reports WHERE domain_owner = :owner AND report_id = :report_id ORDER BY id LIMIT 1", TLSRPT_REPORT_COLUMNS),
			params! { "owner" => domain_owner, "report_id" => report_id },
		)?;

		match stored {
			Some(row) => self.load_tlsrpt_report(&mut conn, domain_owner, row),
			None => Err(not_found(domain_owner, report_id)),
		}
	}

	fn write_tlsrpt_report(&self, domain_owner: &str, report: &TlsRptReport) -> std::result::Result<(), StoreError> {
		let mut encoded_rows = Vec::with_capacity(report.rows.len());
		for row in &report.rows {
			encoded_rows.push((serde_json::to_string(&row.policy_string)?, serde_json::to_string(&row.mx_host)?));
		}

		let mut conn = self.pool.get_conn()?;
		let mut tx = conn.start_transaction(TxOpts::default())?;

		tx.exec_drop(
			"INSERT INTO tlsrpt_reports (domain_owner, organization_name, domain_name, report_id, extra_contact_info, range_start, range_end, received_at, email_sender, email_subject, report_file_name, total_number_of_sessions, content)
			VALUES (:owner, :organization_name, :domain_name, :report_id, :extra_contact_info, :range_start, :range_end, :received_at, :email_sender, :email_subject, :report_file_name, :total, :content)",
			params! {
				"owner" => domain_owner,
				"organization_name" => report.organization_name.as_str(),
				"domain_name" => report.domain_name.as_str(),
				"report_id" => report.report_id.as_str(),
				"extra_contact_info" => report.extra_contact_info.as_str(),
				"range_start" => report.range_start.timestamp(),
				"range_end" => report.range_end.timestamp(),
				"received_at" => report.received_at.timestamp(),
				"email_sender" => report.email_sender.as_str(),
				"email_subject" => report.email_subject.as_str(),
				"report_file_name" => report.report_file_name.as_str(),
				"total" => report.total_number_of_sessions,
				"content" => report.content.as_str()
			},
		)?;
		let id: u64 = tx
			.exec_first("SELECT LAST_INSERT_ID()", ())?
			.ok_or_else(|| StoreError::Corrupt("no id for inserted report".to_string()))?;

		tx.exec_batch(
			"INSERT INTO tlsrpt_report_rows (report_ref, position, domain_name, ip_address, policy_type, policy_string, mx_host, result_type, successful_session_count, failed_session_count)
			VALUES (:id, :position, :domain_name, :ip_address, :policy_type, :policy_string, :mx_host, :result_type, :successful, :failed)",
			report.rows.iter().zip(encoded_rows.iter()).enumerate().map(|(position, (row, (policy_string, mx_host)))| params! {
				"id" => id,
				"position" => position as u64,
				"domain_name" => row.domain_name.as_str(),
				"ip_address" => row.ip_address.as_str(),
				"policy_type" => row.policy_type.as_str(),
				"policy_string" => policy_string.as_str(),
				"mx_host" => mx_host.as_str(),
				"result_type" => row.result_type.as_ref().map(|r| r.key().to_string()),
				"successful" => row.successful_session_count,
				"failed" => row.failed_session_count
			}),
		)?;

		tx.commit()?;
		Ok(())
	}

	fn get_tlsrpt_sources(&self, domain_owner: &str) -> std::result::Result<Vec<TlsRptSources>, StoreError> {
		let mut conn = self.pool.get_conn()?;
		let sources = conn.exec_map(
			"SELECT organization_name, domain, successful_session_percentage FROM tlsrpt_sources WHERE domain_owner = :owner ORDER BY position",
			params! { "owner" => domain_owner },
			|(organization_name, domain, successful_session_percentage)| TlsRptSources {
				domain_owner: domain_owner.to_string(),
				organization_name,
				domain,
				successful_session_percentage,
			},
		)?;
		Ok(sources)
	}

	fn replace_tlsrpt_sources(&self, domain_owner: &str, sources: Vec<TlsRptSources>) -> std::result::Result<(), StoreError> {
		let mut conn = self.pool.get_conn()?;
		let mut tx = conn.start_transaction(TxOpts::default())?;

		tx.exec_drop("DELETE FROM tlsrpt_sources WHERE domain_owner = :owner", params! { "owner" => domain_owner })?;
		tx.exec_batch(
			"INSERT INTO tlsrpt_sources (domain_owner, position, organization_name, domain, successful_session_percentage)
			VALUES (:owner, :position, :organization_name, :domain, :percentage)",
			sources.iter().enumerate().map(|(position, s)| params! {
				"owner" => domain_owner,
				"position" => position as u64,
				"organization_name" => s.organization_name.as_str(),
				"domain" => s.domain.as_str(),
				"percentage" => s.successful_session_percentage
			}),
		)?;

		tx.commit()?;
		Ok(())
	}
}
