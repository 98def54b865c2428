//! Trust anchors and chain validation.

pub mod chain;
pub mod store;

pub use chain::{find_trust_anchor, validate_chain, TrustRule, BIMI_EKU_OID};
pub use store::RootStore;
