use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
	Memory,
	Mysql
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Config<'a> {
	/// The account reports are collected for.
	pub domain_owner: &'a str,

	#[serde(borrow)]
	pub database: DatabaseConfig<'a>,

	#[serde(borrow)]
	pub dmarc: IMAPConfig<'a>,

	#[serde(borrow)]
	pub tlsrpt: IMAPConfig<'a>
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DatabaseConfig<'a> {
	pub backend: Backend,
	pub host: &'a str,
	pub username: &'a str,
	pub password: &'a str,
	pub database: &'a str
}

#[derive(Debug, Deserialize, Serialize)]
pub struct IMAPConfig<'a> {
	pub enabled: bool,
	pub host: &'a str,
	pub port: u16,
	pub tls: bool,
	pub username: &'a str,
	pub password: &'a str,
	pub folder: &'a str
}

pub const DEFAULT: Config = Config{
	domain_owner: "some-cool-address.invalid",
	database: DatabaseConfig{
		backend: Backend::Mysql,
		host: "localhost",
		username: "username",
		password: "password123",
		database: "mailwatch"
	},
	dmarc: IMAPConfig{
		enabled: true,
		host: "localhost",
		port: 993,
		tls: true,
		username: "reports@dmarc.some-cool-address.invalid",
		password: "password123",
		folder: "INBOX"
	},
	tlsrpt: IMAPConfig{
		enabled: true,
		host: "localhost",
		port: 993,
		tls: true,
		username: "reports@tlsrpt.some-cool-address.invalid",
		password: "password123",
		folder: "INBOX"
	}
};

/// Reads the configuration out of `text`, borrowing strings from it.
pub fn parse(text: &str) -> Result<Config<'_>, toml::de::Error> {
	toml::from_str(text)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_survives_a_write_and_read() {
		let text = toml::to_string(&DEFAULT).unwrap();
		let config = parse(&text).unwrap();

		assert_eq!(config.domain_owner, DEFAULT.domain_owner);
		assert_eq!(config.database.backend, Backend::Mysql);
		assert_eq!(config.tlsrpt.username, "reports@tlsrpt.some-cool-address.invalid");
	}

	#[test]
	fn memory_backend() {
		let text = r#"
domain_owner = "example.com"

[database]
backend = "memory"
host = ""
username = ""
password = ""
database = ""

[dmarc]
enabled = false
host = "imap.example.com"
port = 993
tls = true
username = "dmarc@example.com"
password = "secret"
folder = "INBOX"

[tlsrpt]
enabled = true
host = "imap.example.com"
port = 993
tls = true
username = "tlsrpt@example.com"
password = "secret"
folder = "Reports/TLS"
"#;
		let config = parse(text).unwrap();
		assert_eq!(config.database.backend, Backend::Memory);
		assert!(!config.dmarc.enabled);
		assert_eq!(config.tlsrpt.folder, "Reports/TLS");
	}
}
