use serde::Serialize;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use super::name::{parse_subject, parse_subject_alt_name, DistinguishedName};
use super::Certificate;

const ISO_8601_MILLIS: &[FormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
);

/// Decoded certificate metadata, used both in results and in error details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertInfo {
    pub subject: DistinguishedName,
    pub subject_alt_name: Vec<String>,
    pub fingerprint: String,
    pub serial_number: String,
    pub valid_from: String,
    pub valid_to: String,
    pub issuer: DistinguishedName,
}

impl CertInfo {
    pub fn from_certificate(cert: &Certificate) -> Self {
        Self {
            subject: parse_subject(cert.subject()),
            subject_alt_name: parse_subject_alt_name(cert.subject_alt_name().unwrap_or("")),
            fingerprint: cert.fingerprint().to_string(),
            serial_number: cert.serial_number().to_string(),
            valid_from: format_date(cert.not_before()),
            valid_to: format_date(cert.not_after()),
            issuer: parse_subject(cert.issuer()),
        }
    }
}

impl From<&Certificate> for CertInfo {
    fn from(cert: &Certificate) -> Self {
        Self::from_certificate(cert)
    }
}

/// Render a timestamp as UTC ISO-8601 with milliseconds, e.g.
/// `2022-07-09T08:30:14.715Z`.
pub fn format_date(date: OffsetDateTime) -> String {
    let utc = date.to_offset(UtcOffset::UTC);
    utc.format(ISO_8601_MILLIS)
        .unwrap_or_else(|_| utc.unix_timestamp().to_string())
}
