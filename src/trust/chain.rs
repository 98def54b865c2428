use time::OffsetDateTime;

use super::store::RootStore;
use crate::cert::Certificate;
use crate::error::{ErrorDetails, VmcError};

/// id-kp-BrandIndicatorforMessageIdentification
pub const BIMI_EKU_OID: &str = "1.3.6.1.5.5.7.3.31";

const BIMI_EKU_DESCRIPTION: &str = "BIMI certificates must include the id-kp-BrandIndicatorforMessageIdentification Extended Key Usage OID";

/// How the chain's terminal certificate was tied to a trust anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustRule {
    /// The terminal certificate is itself a trusted anchor.
    Fingerprint,
    /// The terminal certificate was issued by a trusted anchor that is not
    /// part of the presented chain.
    IssuedByAnchor,
}

/// First anchor that vouches for `chain_root`, in store order.
pub fn find_trust_anchor<'s>(
    chain_root: &Certificate,
    store: &'s RootStore,
) -> Option<(&'s Certificate, TrustRule)> {
    store.anchors().find_map(|anchor| {
        if anchor.fingerprint512() == chain_root.fingerprint512() {
            Some((anchor, TrustRule::Fingerprint))
        } else if chain_root.issued_by(anchor) {
            Some((anchor, TrustRule::IssuedByAnchor))
        } else {
            None
        }
    })
}

/// Validate an ordered chain (leaf first) against `store` at `now`.
///
/// Returns `Ok(None)` for an empty chain and the unchanged chain on success.
pub fn validate_chain<'c>(
    chain: &'c [Certificate],
    store: &RootStore,
    now: Option<OffsetDateTime>,
) -> Result<Option<&'c [Certificate]>, VmcError> {
    let (Some(leaf), Some(chain_root)) = (chain.first(), chain.last()) else {
        return Ok(None);
    };
    let now = now.unwrap_or_else(OffsetDateTime::now_utc);

    check_time(leaf, now)?;

    for pair in chain.windows(2) {
        let (child, parent) = (&pair[0], &pair[1]);
        check_ca(parent)?;
        if !child.issued_by(parent) {
            return Err(VmcError::InvalidChain {
                details: ErrorDetails::for_cert(child),
            });
        }
        check_time(parent, now)?;
    }

    match find_trust_anchor(chain_root, store) {
        Some((anchor, rule)) => {
            if rule == TrustRule::IssuedByAnchor {
                check_time(anchor, now)?;
            }
            check_ca(anchor)?;
            tracing::debug!(?rule, anchor = anchor.fingerprint(), "chain anchored");
        }
        None => {
            return Err(VmcError::SelfSignedCertInChain {
                details: ErrorDetails::for_cert(leaf),
            });
        }
    }

    if !leaf.has_ext_key_usage(BIMI_EKU_OID) {
        return Err(VmcError::BimiExtKeyMissing {
            details: ErrorDetails::with_description(leaf, BIMI_EKU_DESCRIPTION),
        });
    }

    Ok(Some(chain))
}

fn check_time(cert: &Certificate, now: OffsetDateTime) -> Result<(), VmcError> {
    if cert.is_valid_at(now) {
        return Ok(());
    }
    tracing::debug!(fingerprint = cert.fingerprint(), %now, "certificate outside validity window");
    Err(VmcError::CertificateExpired {
        details: ErrorDetails::for_cert(cert),
    })
}

fn check_ca(cert: &Certificate) -> Result<(), VmcError> {
    if cert.is_ca() {
        return Ok(());
    }
    Err(VmcError::NotCertificateAuthority {
        details: ErrorDetails::for_cert(cert),
    })
}
