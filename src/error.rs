use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::cert::{CertInfo, Certificate, CertificateError};

/// Machine-readable failure codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidCertBundle,
    InvalidChain,
    CertificateVerificationError,
    SelfSignedCertInChain,
    BimiExtKeyMissing,
    InvalidLogotypeExt,
    Aborted,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidCertBundle => "INVALID_CERT_BUNDLE",
            ErrorCode::InvalidChain => "INVALID_CHAIN",
            ErrorCode::CertificateVerificationError => "CERTIFICATE_VERIFICATION_ERROR",
            ErrorCode::SelfSignedCertInChain => "SELF_SIGNED_CERT_IN_CHAIN",
            ErrorCode::BimiExtKeyMissing => "BIMI_EXT_KEY_MISSING",
            ErrorCode::InvalidLogotypeExt => "INVALID_LOGOTYPE_EXT",
            ErrorCode::Aborted => "ABORTED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic payload attached to certificate-level failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub certificate: CertInfo,
}

impl ErrorDetails {
    pub fn for_cert(cert: &Certificate) -> Box<Self> {
        Box::new(Self {
            description: None,
            certificate: CertInfo::from(cert),
        })
    }

    pub fn with_description(cert: &Certificate, description: impl Into<String>) -> Box<Self> {
        Box::new(Self {
            description: Some(description.into()),
            certificate: CertInfo::from(cert),
        })
    }
}

/// VMC validation and extraction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmcError {
    #[error("Empty or missing certificate bundle")]
    EmptyBundle,
    #[error("Invalid certificate in bundle: {0}")]
    MalformedCertificate(String),
    #[error("Empty or missing certificate chain")]
    EmptyChain,
    #[error("Invalid certificate chain")]
    InvalidChain { details: Box<ErrorDetails> },
    #[error("The certificate has expired or is not yet valid")]
    CertificateExpired { details: Box<ErrorDetails> },
    #[error("Signing certificate is not a certificate authority")]
    NotCertificateAuthority { details: Box<ErrorDetails> },
    #[error("Self signed certificate in certificate chain")]
    SelfSignedCertInChain { details: Box<ErrorDetails> },
    #[error("Certificate is missing required Extended Key Usage identifier")]
    BimiExtKeyMissing { details: Box<ErrorDetails> },
    #[error("Invalid or missing logotype extension in the certificate: {0}")]
    InvalidLogotypeExt(String),
    #[error("validation task was cancelled")]
    Aborted,
}

impl VmcError {
    pub fn code(&self) -> ErrorCode {
        match self {
            VmcError::EmptyBundle | VmcError::MalformedCertificate(_) => {
                ErrorCode::InvalidCertBundle
            }
            VmcError::EmptyChain | VmcError::InvalidChain { .. } => ErrorCode::InvalidChain,
            VmcError::CertificateExpired { .. } | VmcError::NotCertificateAuthority { .. } => {
                ErrorCode::CertificateVerificationError
            }
            VmcError::SelfSignedCertInChain { .. } => ErrorCode::SelfSignedCertInChain,
            VmcError::BimiExtKeyMissing { .. } => ErrorCode::BimiExtKeyMissing,
            VmcError::InvalidLogotypeExt(_) => ErrorCode::InvalidLogotypeExt,
            VmcError::Aborted => ErrorCode::Aborted,
        }
    }

    /// Certificate snapshot of the offending certificate, when there is one.
    pub fn details(&self) -> Option<&ErrorDetails> {
        match self {
            VmcError::InvalidChain { details }
            | VmcError::CertificateExpired { details }
            | VmcError::NotCertificateAuthority { details }
            | VmcError::SelfSignedCertInChain { details }
            | VmcError::BimiExtKeyMissing { details } => Some(&**details),
            _ => None,
        }
    }
}

impl From<CertificateError> for VmcError {
    fn from(e: CertificateError) -> Self {
        VmcError::MalformedCertificate(e.to_string())
    }
}
