use serde::Serialize;

use crate::cert::CertInfo;
use crate::logotype::HashAlgorithm;

/// Mark types issued as Common Mark Certificates.
const CMC_MARK_TYPES: &[&str] = &["Prior Use Mark", "Modified Registered Mark"];

/// Certificate kind, decided by the subject's mark type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CertificateType {
    /// Verified Mark Certificate.
    #[serde(rename = "VMC")]
    Vmc,
    /// Common Mark Certificate.
    #[serde(rename = "CMC")]
    Cmc,
}

impl CertificateType {
    /// Certificates without a mark type predate the attribute and are VMCs.
    pub fn from_mark_type(mark_type: Option<&str>) -> Self {
        match mark_type {
            Some(mark) if CMC_MARK_TYPES.contains(&mark) => CertificateType::Cmc,
            _ => CertificateType::Vmc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateType::Vmc => "VMC",
            CertificateType::Cmc => "CMC",
        }
    }
}

/// Validated logo with certificate metadata, in transport-safe encodings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoResult {
    pub media_type: String,
    #[serde(rename = "hashAlgo")]
    pub hash_algorithm: Option<HashAlgorithm>,
    /// Lowercase hex.
    pub hash_value: Option<String>,
    /// Base64 of the decompressed image.
    pub logo_file: Option<String>,
    pub valid_hash: Option<bool>,
    #[serde(rename = "type")]
    pub certificate_type: CertificateType,
    pub certificate: CertInfo,
}
