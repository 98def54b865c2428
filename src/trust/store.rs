use std::sync::OnceLock;

use crate::cert::Certificate;
use crate::common::split_pem_bundle;
use crate::error::VmcError;

/// Anchor PEMs for the VMC/CMC issuers listed by the BIMI Group, as a JSON
/// array of PEM strings.
const BUNDLED_ROOTS: &str = include_str!("../../data/root-store.json");

/// Set of trusted anchor certificates.
#[derive(Debug, Clone, Default)]
pub struct RootStore {
    anchors: Vec<Certificate>,
}

impl RootStore {
    /// Store loaded from the bundled anchor list.
    pub fn create() -> Self {
        match Self::from_json(BUNDLED_ROOTS) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(error = %e, "bundled root store is not a JSON array of PEM strings");
                Self::empty()
            }
        }
    }

    /// Store from a JSON array of PEM strings, the `data/root-store.json`
    /// format. Unparsable entries are skipped as in [`from_pems`](Self::from_pems).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let pems: Vec<String> = serde_json::from_str(json)?;
        Ok(Self::from_pems(pems))
    }

    /// Shared, immutable instance of the bundled store.
    pub fn bundled() -> &'static RootStore {
        static BUNDLED: OnceLock<RootStore> = OnceLock::new();
        BUNDLED.get_or_init(RootStore::create)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a store from PEM strings. Entries that fail to parse are logged
    /// and skipped.
    pub fn from_pems<I, S>(pems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = Self::empty();
        for (index, pem) in pems.into_iter().enumerate() {
            match Certificate::from_pem(pem.as_ref()) {
                Ok(cert) => {
                    store.insert(cert);
                }
                Err(e) => {
                    tracing::warn!(index, error = %e, pem = pem.as_ref(), "failed to parse root certificate");
                }
            }
        }
        store
    }

    /// Add a trust anchor. Returns `false` without changing the store when a
    /// certificate with the same SHA-512 fingerprint is already present.
    pub fn add_cert(&mut self, pem: &str) -> Result<bool, VmcError> {
        let cert = Certificate::from_pem(pem)?;
        Ok(self.insert(cert))
    }

    /// Add every certificate of a concatenated PEM bundle, such as one
    /// issuer's published root file. Nothing is added unless every block
    /// parses. Returns how many anchors were new.
    pub fn add_pem_bundle(&mut self, bundle: &[u8]) -> Result<usize, VmcError> {
        let blocks = split_pem_bundle(bundle);
        if blocks.is_empty() {
            return Err(VmcError::EmptyBundle);
        }
        let certs = blocks
            .iter()
            .map(|pem| Certificate::from_pem(pem))
            .collect::<Result<Vec<_>, _>>()?;
        let mut added = 0;
        for cert in certs {
            if self.insert(cert) {
                added += 1;
            }
        }
        Ok(added)
    }

    fn insert(&mut self, cert: Certificate) -> bool {
        if self.contains(cert.fingerprint512()) {
            return false;
        }
        self.anchors.push(cert);
        true
    }

    /// Whether an anchor with this SHA-512 fingerprint is present.
    pub fn contains(&self, fingerprint512: &str) -> bool {
        self.anchors
            .iter()
            .any(|anchor| anchor.fingerprint512() == fingerprint512)
    }

    pub fn anchors(&self) -> impl Iterator<Item = &Certificate> {
        self.anchors.iter()
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}
