use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
	NegotiationFailure,
	PolicyFailure,
	GeneralFailure,
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Category::NegotiationFailure => "Negotiation Failure",
			Category::PolicyFailure => "Policy Failure",
			Category::GeneralFailure => "General Failure",
		})
	}
}

/// Why a session failed, as reported in `result-type`.
///
/// Keys not defined by RFC 8460 are kept as `Other` so that reports from
/// newer producers still decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResultType {
	StartTlsNotSupported,
	CertificateHostMismatch,
	CertificateExpired,
	CertificateNotTrusted,
	ValidationFailure,
	TlsaInvalid,
	DnssecInvalid,
	DaneRequired,
	StsPolicyFetchError,
	StsPolicyInvalid,
	StsWebPkiInvalid,
	Other(String),
}

impl ResultType {
	pub fn key(&self) -> &str {
		match self {
			ResultType::StartTlsNotSupported => "starttls-not-supported",
			ResultType::CertificateHostMismatch => "certificate-host-mismatch",
			ResultType::CertificateExpired => "certificate-expired",
			ResultType::CertificateNotTrusted => "certificate-not-trusted",
			ResultType::ValidationFailure => "validation-failure",
			ResultType::TlsaInvalid => "tlsa-invalid",
			ResultType::DnssecInvalid => "dnssec-invalid",
			ResultType::DaneRequired => "dane-required",
			ResultType::StsPolicyFetchError => "sts-policy-fetch-error",
			ResultType::StsPolicyInvalid => "sts-policy-invalid",
			ResultType::StsWebPkiInvalid => "sts-webpki-invalid",
			ResultType::Other(key) => key,
		}
	}

	pub fn category(&self) -> Category {
		match self {
			ResultType::StartTlsNotSupported => Category::NegotiationFailure,
			ResultType::ValidationFailure | ResultType::Other(_) => Category::GeneralFailure,
			_ => Category::PolicyFailure,
		}
	}

	pub fn detail(&self) -> &'static str {
		match self {
			ResultType::StartTlsNotSupported => "The recipient MX did not support STARTTLS.",
			ResultType::CertificateHostMismatch => "The certificate presented did not adhere to the constraints of the MTA-STS or DANE policy, e.g. the MX hostname is not among its subject alternative names.",
			ResultType::CertificateExpired => "The certificate presented has expired.",
			ResultType::CertificateNotTrusted => "The certificate could not be trusted, e.g. an unknown certification authority, name constraints or a broken chain.",
			ResultType::ValidationFailure => "A general failure not covered by any other result type.",
			ResultType::TlsaInvalid => "None of the TLSA records of a DANE policy were valid.",
			ResultType::DnssecInvalid => "The recursive resolver returned no valid records.",
			ResultType::DaneRequired => "The sender requires DANE for this destination but no DNSSEC-validated TLSA records were present for the MX host.",
			ResultType::StsPolicyFetchError => "The MTA-STS policy could not be retrieved, e.g. the policy host is unreachable.",
			ResultType::StsPolicyInvalid => "The MTA-STS policy failed validation.",
			ResultType::StsWebPkiInvalid => "The MTA-STS policy could not be authenticated using PKIX validation.",
			ResultType::Other(_) => "",
		}
	}
}

impl From<&str> for ResultType {
	fn from(key: &str) -> ResultType {
		match key {
			"starttls-not-supported" => ResultType::StartTlsNotSupported,
			"certificate-host-mismatch" => ResultType::CertificateHostMismatch,
			"certificate-expired" => ResultType::CertificateExpired,
			"certificate-not-trusted" => ResultType::CertificateNotTrusted,
			"validation-failure" => ResultType::ValidationFailure,
			"tlsa-invalid" => ResultType::TlsaInvalid,
			"dnssec-invalid" => ResultType::DnssecInvalid,
			"dane-required" => ResultType::DaneRequired,
			"sts-policy-fetch-error" => ResultType::StsPolicyFetchError,
			"sts-policy-invalid" => ResultType::StsPolicyInvalid,
			"sts-webpki-invalid" => ResultType::StsWebPkiInvalid,
			other => ResultType::Other(other.to_string()),
		}
	}
}

impl From<String> for ResultType {
	fn from(key: String) -> ResultType {
		ResultType::from(key.as_str())
	}
}

impl From<ResultType> for String {
	fn from(result_type: ResultType) -> String {
		result_type.key().to_string()
	}
}

impl fmt::Display for ResultType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.key())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn known_keys_map_to_variants() {
		assert_eq!(ResultType::from("certificate-expired"), ResultType::CertificateExpired);
		assert_eq!(ResultType::from("starttls-not-supported").category(), Category::NegotiationFailure);
		assert_eq!(ResultType::from("sts-webpki-invalid").category(), Category::PolicyFailure);
		assert_eq!(ResultType::from("validation-failure").category(), Category::GeneralFailure);
	}

	#[test]
	fn unknown_keys_are_kept() {
		let result_type: ResultType = serde_json::from_str("\"mx-on-fire\"").unwrap();
		assert_eq!(result_type, ResultType::Other("mx-on-fire".to_string()));
		assert_eq!(result_type.category(), Category::GeneralFailure);
		assert_eq!(result_type.detail(), "");
		assert_eq!(serde_json::to_string(&result_type).unwrap(), "\"mx-on-fire\"");
	}

	#[test]
	fn serializes_as_key() {
		assert_eq!(serde_json::to_string(&ResultType::DaneRequired).unwrap(), "\"dane-required\"");
		assert_eq!(ResultType::DaneRequired.to_string(), "dane-required");
	}
}
