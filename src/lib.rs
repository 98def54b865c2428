//! BIMI mark certificate validation: VMC and CMC chains, and the RFC 3709
//! logotype embedded in the leaf.
//!
//! No network access happens here. Bundles are supplied by the caller, and
//! trust is decided against a [`RootStore`] (the bundled anchors by default).

pub mod cert;
pub mod common;
pub mod error;
pub mod logotype;
pub mod trust;
pub mod vmc;

#[cfg(test)]
mod test_support;

pub use cert::{CertInfo, Certificate, DistinguishedName};
pub use error::{ErrorCode, ErrorDetails, VmcError};
pub use logotype::{extract_logotype, HashAlgorithm, LogotypeImage};
pub use trust::{validate_chain, RootStore};
pub use vmc::{vmc, CertificateType, LogoResult, VmcOptions, VmcVerifier};
