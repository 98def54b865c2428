//! Owned certificate view over `x509-parser`, plus the name decoders and the
//! diagnostic snapshot built from it.

pub mod info;
pub mod name;

pub use info::{format_date, CertInfo};
pub use name::{parse_subject, parse_subject_alt_name, DistinguishedName};

use sha2::{Digest, Sha512};
use std::fmt;
use thiserror::Error;
use ::time::OffsetDateTime;
use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::*;

/// Certificate parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CertificateError {
    #[error("PEM parse error: {0}")]
    Pem(String),
    #[error("unexpected PEM label: {0}")]
    Label(String),
    #[error("X.509 parse error: {0}")]
    X509(String),
}

const EKU_ANY: &str = "2.5.29.37.0";
const EKU_SERVER_AUTH: &str = "1.3.6.1.5.5.7.3.1";
const EKU_CLIENT_AUTH: &str = "1.3.6.1.5.5.7.3.2";
const EKU_CODE_SIGNING: &str = "1.3.6.1.5.5.7.3.3";
const EKU_EMAIL_PROTECTION: &str = "1.3.6.1.5.5.7.3.4";
const EKU_TIME_STAMPING: &str = "1.3.6.1.5.5.7.3.8";
const EKU_OCSP_SIGNING: &str = "1.3.6.1.5.5.7.3.9";

/// Short names used when rendering name attributes; anything else is
/// rendered as a dotted OID.
const ATTRIBUTE_SHORT_NAMES: &[(&str, &str)] = &[
    ("2.5.4.3", "CN"),
    ("2.5.4.4", "SN"),
    ("2.5.4.5", "serialNumber"),
    ("2.5.4.6", "C"),
    ("2.5.4.7", "L"),
    ("2.5.4.8", "ST"),
    ("2.5.4.9", "street"),
    ("2.5.4.10", "O"),
    ("2.5.4.11", "OU"),
    ("2.5.4.15", "businessCategory"),
    ("2.5.4.17", "postalCode"),
    ("2.5.4.42", "GN"),
    ("1.2.840.113549.1.9.1", "emailAddress"),
    ("1.3.6.1.4.1.311.60.2.1.1", "jurisdictionL"),
    ("1.3.6.1.4.1.311.60.2.1.2", "jurisdictionST"),
    ("1.3.6.1.4.1.311.60.2.1.3", "jurisdictionC"),
];

/// A parsed, immutable X.509 certificate.
#[derive(Clone)]
pub struct Certificate {
    der: Vec<u8>,
    raw_subject: Vec<u8>,
    raw_issuer: Vec<u8>,
    raw_public_key: Vec<u8>,
    subject: String,
    issuer: String,
    subject_alt_name: Option<String>,
    not_before: OffsetDateTime,
    not_after: OffsetDateTime,
    fingerprint: String,
    fingerprint512: String,
    serial_number: String,
    is_ca: bool,
    ext_key_usage: Vec<String>,
}

impl Certificate {
    /// Parse a single PEM `CERTIFICATE` block.
    pub fn from_pem(pem: &str) -> Result<Self, CertificateError> {
        let normalized = pem.replace("\r\n", "\n");
        let (_, block) = parse_x509_pem(normalized.as_bytes())
            .map_err(|e| CertificateError::Pem(e.to_string()))?;
        if block.label != "CERTIFICATE" {
            return Err(CertificateError::Label(block.label));
        }
        Self::from_der(&block.contents)
    }

    /// Parse DER bytes.
    pub fn from_der(der: &[u8]) -> Result<Self, CertificateError> {
        let (_, cert) =
            X509Certificate::from_der(der).map_err(|e| CertificateError::X509(e.to_string()))?;
        let tbs = &cert.tbs_certificate;

        let subject_alt_name = match tbs.subject_alternative_name() {
            Ok(Some(ext)) => Some(render_general_names(&ext.value.general_names)),
            _ => None,
        };

        let ext_key_usage = match tbs.extended_key_usage() {
            Ok(Some(ext)) => eku_oids(ext.value),
            _ => Vec::new(),
        };

        Ok(Self {
            der: der.to_vec(),
            raw_subject: tbs.subject().as_raw().to_vec(),
            raw_issuer: tbs.issuer().as_raw().to_vec(),
            raw_public_key: tbs.public_key().raw.to_vec(),
            subject: render_name(tbs.subject()),
            issuer: render_name(tbs.issuer()),
            subject_alt_name,
            not_before: tbs.validity().not_before.to_datetime(),
            not_after: tbs.validity().not_after.to_datetime(),
            fingerprint: colon_hex(ring::digest::digest(&ring::digest::SHA1_FOR_LEGACY_USE_ONLY, der).as_ref()),
            fingerprint512: colon_hex(&Sha512::digest(der)),
            serial_number: serial_hex(tbs.raw_serial()),
            is_ca: tbs.is_ca(),
            ext_key_usage,
        })
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Subject as `KEY=value` lines.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Issuer as `KEY=value` lines.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn subject_alt_name(&self) -> Option<&str> {
        self.subject_alt_name.as_deref()
    }

    pub fn not_before(&self) -> OffsetDateTime {
        self.not_before
    }

    pub fn not_after(&self) -> OffsetDateTime {
        self.not_after
    }

    /// True when `now` falls inside the validity window (bounds inclusive).
    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        now >= self.not_before && now <= self.not_after
    }

    /// SHA-1 fingerprint, `AA:BB:...`.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// SHA-512 fingerprint, `AA:BB:...`.
    pub fn fingerprint512(&self) -> &str {
        &self.fingerprint512
    }

    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    pub fn is_ca(&self) -> bool {
        self.is_ca
    }

    /// Extended key usage OIDs in dotted form.
    pub fn ext_key_usage(&self) -> &[String] {
        &self.ext_key_usage
    }

    pub fn has_ext_key_usage(&self, oid: &str) -> bool {
        self.ext_key_usage.iter().any(|o| o == oid)
    }

    /// DER of the subject name.
    pub fn raw_subject(&self) -> &[u8] {
        &self.raw_subject
    }

    /// DER of the issuer name.
    pub fn raw_issuer(&self) -> &[u8] {
        &self.raw_issuer
    }

    /// True iff `issuer` is named as this certificate's issuer and its key
    /// verifies this certificate's signature.
    pub fn issued_by(&self, issuer: &Certificate) -> bool {
        if self.raw_issuer != issuer.raw_subject {
            return false;
        }

        let (Ok((_, child)), Ok((_, public_key))) = (
            X509Certificate::from_der(&self.der),
            SubjectPublicKeyInfo::from_der(&issuer.raw_public_key),
        ) else {
            return false;
        };

        child.verify_signature(Some(&public_key)).is_ok()
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject)
            .field("issuer", &self.issuer)
            .field("fingerprint", &self.fingerprint)
            .field("serial_number", &self.serial_number)
            .field("is_ca", &self.is_ca)
            .finish()
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for Certificate {}

fn render_name(name: &X509Name<'_>) -> String {
    let mut lines = Vec::new();
    for rdn in name.iter() {
        for attr in rdn.iter() {
            let oid = attr.attr_type().to_id_string();
            let key = ATTRIBUTE_SHORT_NAMES
                .iter()
                .find(|(o, _)| *o == oid)
                .map(|(_, short)| short.to_string())
                .unwrap_or(oid);
            let value = match attr.as_str() {
                Ok(s) => s.to_string(),
                Err(_) => String::from_utf8_lossy(attr.attr_value().data).into_owned(),
            };
            lines.push(format!("{}={}", key, render_value(&value)));
        }
    }
    lines.join("\n")
}

fn render_value(value: &str) -> String {
    if value.chars().any(char::is_control) {
        return serde_json::to_string(value).unwrap_or_else(|_| value.escape_default().to_string());
    }
    value.replace(',', "\\,")
}

fn render_general_names(names: &[GeneralName<'_>]) -> String {
    names
        .iter()
        .filter_map(|name| match name {
            GeneralName::DNSName(dns) => Some(format!("DNS:{}", dns)),
            GeneralName::RFC822Name(email) => Some(format!("email:{}", email)),
            GeneralName::URI(uri) => Some(format!("URI:{}", uri)),
            GeneralName::IPAddress(ip) => render_ip(ip).map(|ip| format!("IP Address:{}", ip)),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_ip(raw: &[u8]) -> Option<std::net::IpAddr> {
    match raw.len() {
        4 => <[u8; 4]>::try_from(raw).ok().map(std::net::IpAddr::from),
        16 => <[u8; 16]>::try_from(raw).ok().map(std::net::IpAddr::from),
        _ => None,
    }
}

fn eku_oids(eku: &ExtendedKeyUsage<'_>) -> Vec<String> {
    let flags = [
        (eku.any, EKU_ANY),
        (eku.server_auth, EKU_SERVER_AUTH),
        (eku.client_auth, EKU_CLIENT_AUTH),
        (eku.code_signing, EKU_CODE_SIGNING),
        (eku.email_protection, EKU_EMAIL_PROTECTION),
        (eku.time_stamping, EKU_TIME_STAMPING),
        (eku.ocsp_signing, EKU_OCSP_SIGNING),
    ];
    flags
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, oid)| oid.to_string())
        .chain(eku.other.iter().map(|oid| oid.to_id_string()))
        .collect()
}

fn colon_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":")
}

fn serial_hex(raw: &[u8]) -> String {
    let start = raw.iter().position(|b| *b != 0).unwrap_or(raw.len());
    if start == raw.len() {
        return "00".to_string();
    }
    hex::encode_upper(&raw[start..])
}
