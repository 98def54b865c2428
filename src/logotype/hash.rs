//! Logotype hash algorithms.

use serde::Serialize;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512, Sha512_224, Sha512_256};

/// Hash algorithms accepted in `HashAlgAndValue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HashAlgorithm {
    #[serde(rename = "sha1")]
    Sha1,
    #[serde(rename = "sha224")]
    Sha224,
    #[serde(rename = "sha256")]
    Sha256,
    #[serde(rename = "sha384")]
    Sha384,
    #[serde(rename = "sha512")]
    Sha512,
    #[serde(rename = "sha512-224")]
    Sha512_224,
    #[serde(rename = "sha512-256")]
    Sha512_256,
}

const ALGORITHMS: &[(&str, HashAlgorithm)] = &[
    ("1.3.14.3.2.26", HashAlgorithm::Sha1),
    ("2.16.840.1.101.3.4.2.4", HashAlgorithm::Sha224),
    ("2.16.840.1.101.3.4.2.1", HashAlgorithm::Sha256),
    ("2.16.840.1.101.3.4.2.2", HashAlgorithm::Sha384),
    ("2.16.840.1.101.3.4.2.3", HashAlgorithm::Sha512),
    ("2.16.840.1.101.3.4.2.5", HashAlgorithm::Sha512_224),
    ("2.16.840.1.101.3.4.2.6", HashAlgorithm::Sha512_256),
];

impl HashAlgorithm {
    /// Map a dotted algorithm OID; unknown OIDs give `None`.
    pub fn from_oid(oid: &str) -> Option<Self> {
        ALGORITHMS
            .iter()
            .find(|(o, _)| *o == oid)
            .map(|(_, alg)| *alg)
    }

    pub fn oid(&self) -> &'static str {
        ALGORITHMS
            .iter()
            .find(|(_, alg)| alg == self)
            .map(|(o, _)| *o)
            .unwrap_or_default()
    }

    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha224 => "sha224",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
            HashAlgorithm::Sha512_224 => "sha512-224",
            HashAlgorithm::Sha512_256 => "sha512-256",
        }
    }

    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha1 => {
                let digest = ring::digest::digest(&ring::digest::SHA1_FOR_LEGACY_USE_ONLY, data);
                digest.as_ref().to_vec()
            }
            HashAlgorithm::Sha224 => Sha224::digest(data).to_vec(),
            HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            HashAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
            HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
            HashAlgorithm::Sha512_224 => Sha512_224::digest(data).to_vec(),
            HashAlgorithm::Sha512_256 => Sha512_256::digest(data).to_vec(),
        }
    }
}
