//! Validate a VMC/CMC bundle and return its embedded logo.

mod types;

pub use types::{CertificateType, LogoResult};

use std::sync::Arc;

use base64::Engine;
use time::OffsetDateTime;

use crate::cert::{CertInfo, Certificate};
use crate::common::split_pem_bundle;
use crate::error::VmcError;
use crate::logotype::extract_logotype;
use crate::trust::{validate_chain, RootStore};

/// Per-call options.
#[derive(Debug, Clone, Copy, Default)]
pub struct VmcOptions<'a> {
    /// Trust anchors; the bundled store when `None`.
    pub root_store: Option<&'a RootStore>,
    /// Validation time; wall clock when `None`.
    pub now: Option<OffsetDateTime>,
}

impl<'a> VmcOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_store(mut self, store: &'a RootStore) -> Self {
        self.root_store = Some(store);
        self
    }

    pub fn at(mut self, now: OffsetDateTime) -> Self {
        self.now = Some(now);
        self
    }
}

/// Parse every PEM block of a bundle as a certificate, in order.
pub fn parse_bundle(pem: &[u8]) -> Result<Vec<Certificate>, VmcError> {
    let blocks = split_pem_bundle(pem);
    if blocks.is_empty() {
        return Err(VmcError::EmptyBundle);
    }
    blocks
        .iter()
        .map(|block| Certificate::from_pem(block).map_err(VmcError::from))
        .collect()
}

/// Validate the chain in `pem` (leaf first) and extract the leaf's logo.
pub fn vmc(pem: impl AsRef<[u8]>, options: &VmcOptions<'_>) -> Result<LogoResult, VmcError> {
    let store: &RootStore = match options.root_store {
        Some(store) => store,
        None => RootStore::bundled(),
    };

    let certs = parse_bundle(pem.as_ref())?;
    let chain = validate_chain(&certs, store, options.now)?.ok_or(VmcError::EmptyChain)?;
    let leaf = &chain[0];

    let logo = extract_logotype(leaf.der())?;
    let certificate = CertInfo::from(leaf);
    let certificate_type = CertificateType::from_mark_type(certificate.subject.mark_type());

    tracing::debug!(
        fingerprint = %certificate.fingerprint,
        certificate_type = certificate_type.as_str(),
        valid_hash = ?logo.valid_hash,
        "mark certificate validated"
    );

    Ok(LogoResult {
        media_type: logo.media_type,
        hash_algorithm: logo.hash_algorithm,
        hash_value: logo.hash_value.map(hex::encode),
        logo_file: logo
            .image
            .map(|image| base64::engine::general_purpose::STANDARD.encode(image)),
        valid_hash: logo.valid_hash,
        certificate_type,
        certificate,
    })
}

/// Validator bound to one trust store, shareable across tasks.
#[derive(Debug, Clone)]
pub struct VmcVerifier {
    root_store: Arc<RootStore>,
}

impl VmcVerifier {
    pub fn new(root_store: Arc<RootStore>) -> Self {
        Self { root_store }
    }

    /// Verifier over a fresh copy of the bundled anchors.
    pub fn with_bundled_roots() -> Self {
        Self::new(Arc::new(RootStore::create()))
    }

    pub fn root_store(&self) -> &RootStore {
        &self.root_store
    }

    pub fn verify(&self, pem: &[u8], now: Option<OffsetDateTime>) -> Result<LogoResult, VmcError> {
        let options = VmcOptions {
            root_store: Some(&*self.root_store),
            now,
        };
        vmc(pem, &options)
    }

    /// Same as [`verify`](Self::verify), run on tokio's blocking pool.
    pub async fn verify_async(
        &self,
        pem: Vec<u8>,
        now: Option<OffsetDateTime>,
    ) -> Result<LogoResult, VmcError> {
        let verifier = self.clone();
        match tokio::task::spawn_blocking(move || verifier.verify(&pem, now)).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(VmcError::Aborted),
        }
    }
}
