//! Infrastructure shared by the certificate, trust and logotype layers.

pub mod pem;

pub use pem::split_pem_bundle;
