//! Extraction of the embedded brand logo from the RFC 3709 logotype extension.

mod asn1;
mod data_uri;
mod hash;

pub use data_uri::{decode_logo, parse_data_uri, DataUri};
pub use hash::HashAlgorithm;

use subtle::ConstantTimeEq;
use x509_parser::der_parser::oid::Oid;
use x509_parser::prelude::*;

use crate::error::VmcError;

/// LogoType extension OID (RFC 3709): 1.3.6.1.5.5.7.1.12
const LOGOTYPE_OID: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 1, 12];

/// Logo recovered from a certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogotypeImage {
    pub media_type: String,
    /// `None` when the declared algorithm is not recognised.
    pub hash_algorithm: Option<HashAlgorithm>,
    pub hash_value: Option<Vec<u8>>,
    /// `None` when no image could be recovered from the URI.
    pub image: Option<Vec<u8>>,
    /// `Some(true/false)` once checked; `None` when a hash input is missing.
    pub valid_hash: Option<bool>,
}

/// Locate and decode the logotype extension of a DER certificate.
///
/// Only a missing or structurally invalid extension is an error; an
/// unrecoverable image or unknown hash algorithm leaves the field unset.
pub fn extract_logotype(cert_der: &[u8]) -> Result<LogotypeImage, VmcError> {
    let (_, cert) = X509Certificate::from_der(cert_der)
        .map_err(|e| VmcError::MalformedCertificate(e.to_string()))?;

    let logotype_oid = Oid::from(LOGOTYPE_OID)
        .map_err(|_| VmcError::InvalidLogotypeExt("bad logotype OID".into()))?;
    let ext = cert
        .tbs_certificate
        .get_extension_unique(&logotype_oid)
        .map_err(|e| VmcError::InvalidLogotypeExt(e.to_string()))?
        .ok_or_else(|| VmcError::InvalidLogotypeExt("extension not present".into()))?;

    if ext.value.is_empty() {
        return Err(VmcError::InvalidLogotypeExt("empty extension value".into()));
    }

    let details = asn1::subject_logo_details(ext.value)
        .map_err(|e| VmcError::InvalidLogotypeExt(e.0))?;

    let (hash_algorithm, hash_value) = match details.hash {
        Some((oid, value)) => {
            let alg = HashAlgorithm::from_oid(&oid);
            if alg.is_none() {
                tracing::debug!(%oid, "unrecognised logotype hash algorithm");
            }
            (alg, Some(value))
        }
        None => (None, None),
    };

    let image = details.uri.as_deref().and_then(decode_logo);
    let valid_hash = verify_hash(image.as_deref(), hash_algorithm, hash_value.as_deref());

    Ok(LogotypeImage {
        media_type: details.media_type,
        hash_algorithm,
        hash_value,
        image,
        valid_hash,
    })
}

/// Compare the declared digest with one computed over `image`. `None` when
/// any input is missing.
pub fn verify_hash(
    image: Option<&[u8]>,
    algorithm: Option<HashAlgorithm>,
    expected: Option<&[u8]>,
) -> Option<bool> {
    let (image, algorithm, expected) = (image?, algorithm?, expected?);
    let actual = algorithm.digest(image);
    Some(bool::from(actual.as_slice().ct_eq(expected)))
}
