//! Navigation of the RFC 3709 `LogotypeExtn` structure.
//!
//! ```text
//! LogotypeExtn ::= SEQUENCE {
//!    communityLogos  [0] EXPLICIT SEQUENCE OF LogotypeInfo OPTIONAL,
//!    issuerLogo      [1] EXPLICIT LogotypeInfo OPTIONAL,
//!    subjectLogo     [2] EXPLICIT LogotypeInfo OPTIONAL,
//!    otherLogos      [3] EXPLICIT SEQUENCE OF OtherLogotypeInfo OPTIONAL }
//!
//! LogotypeInfo ::= CHOICE {
//!    direct          [0] LogotypeData,
//!    indirect        [1] LogotypeReference }
//!
//! LogotypeData ::= SEQUENCE {
//!    image           SEQUENCE OF LogotypeImage OPTIONAL,
//!    audio           [1] SEQUENCE OF LogotypeAudio OPTIONAL }
//!
//! LogotypeImage ::= SEQUENCE {
//!    imageDetails    LogotypeDetails,
//!    imageInfo       LogotypeImageInfo OPTIONAL }
//!
//! LogotypeDetails ::= SEQUENCE {
//!    mediaType       IA5String,
//!    logotypeHash    SEQUENCE SIZE (1..MAX) OF HashAlgAndValue,
//!    logotypeURI     SEQUENCE SIZE (1..MAX) OF IA5String }
//!
//! HashAlgAndValue ::= SEQUENCE {
//!    hashAlg         AlgorithmIdentifier,
//!    hashValue       OCTET STRING }
//! ```

use asn1_rs::{Any, Class, FromBer, Tag};
use x509_parser::prelude::FromDer;
use x509_parser::x509::AlgorithmIdentifier;

/// First image entry of the direct subject logo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogotypeDetails {
    pub media_type: String,
    /// First declared hash: algorithm OID (dotted) and value.
    pub hash: Option<(String, Vec<u8>)>,
    /// First declared URI.
    pub uri: Option<String>,
}

/// Structural decode failure, with a short reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureError(pub String);

type Result<T> = std::result::Result<T, StructureError>;

fn fail<T>(reason: impl Into<String>) -> Result<T> {
    Err(StructureError(reason.into()))
}

fn element(input: &[u8]) -> Result<Any<'_>> {
    match Any::from_ber(input) {
        Ok((_, any)) => Ok(any),
        Err(e) => fail(format!("ASN.1 decode: {}", e)),
    }
}

/// All elements packed in `content`.
fn elements(content: &[u8]) -> Result<Vec<Any<'_>>> {
    let mut out = Vec::new();
    let mut rest = content;
    while !rest.is_empty() {
        match Any::from_ber(rest) {
            Ok((next, any)) => {
                out.push(any);
                rest = next;
            }
            Err(e) => return fail(format!("ASN.1 decode: {}", e)),
        }
    }
    Ok(out)
}

fn is_universal(any: &Any<'_>, tag: Tag) -> bool {
    any.header.class() == Class::Universal && any.header.tag() == tag
}

fn is_context(any: &Any<'_>, number: u32) -> bool {
    any.header.class() == Class::ContextSpecific && any.header.tag() == Tag(number)
}

fn expect_sequence<'a>(any: &Any<'a>, what: &str) -> Result<&'a [u8]> {
    if is_universal(any, Tag::Sequence) {
        Ok(any.data)
    } else {
        fail(format!("{} is not a SEQUENCE", what))
    }
}

/// Decode the extension value down to the first direct subject logo image.
pub fn subject_logo_details(extn_value: &[u8]) -> Result<LogotypeDetails> {
    let extn = element(extn_value)?;
    let fields = elements(expect_sequence(&extn, "LogotypeExtn")?)?;

    let Some(subject_logo) = fields.iter().find(|f| is_context(f, 2)) else {
        return fail("no subjectLogo");
    };
    let info = element(subject_logo.data)?;
    if !is_context(&info, 0) {
        return fail("subjectLogo is not direct");
    }

    let data = elements(info.data)?;
    let Some(images) = data.iter().find(|d| is_universal(d, Tag::Sequence)) else {
        return fail("no logotype image");
    };
    let images = elements(images.data)?;
    let Some(image) = images.first() else {
        return fail("empty logotype image list");
    };
    let image_fields = elements(expect_sequence(image, "LogotypeImage")?)?;
    let Some(details) = image_fields.first() else {
        return fail("no imageDetails");
    };

    parse_details(expect_sequence(details, "LogotypeDetails")?)
}

fn parse_details(content: &[u8]) -> Result<LogotypeDetails> {
    let fields = elements(content)?;
    let mut fields = fields.iter();

    let media_type = match fields.next() {
        Some(f) if is_universal(f, Tag::Ia5String) => String::from_utf8_lossy(f.data).into_owned(),
        _ => return fail("mediaType is not an IA5String"),
    };

    let hash = match fields.next() {
        Some(f) => first_hash(expect_sequence(f, "logotypeHash")?)?,
        None => None,
    };

    let uri = match fields.next() {
        Some(f) => elements(expect_sequence(f, "logotypeURI")?)?
            .iter()
            .find(|u| is_universal(u, Tag::Ia5String))
            .map(|u| String::from_utf8_lossy(u.data).into_owned()),
        None => None,
    };

    Ok(LogotypeDetails {
        media_type,
        hash,
        uri,
    })
}

fn first_hash(content: &[u8]) -> Result<Option<(String, Vec<u8>)>> {
    let hashes = elements(content)?;
    let Some(entry) = hashes.first() else {
        return Ok(None);
    };
    let entry = expect_sequence(entry, "HashAlgAndValue")?;

    let (rest, alg) = match AlgorithmIdentifier::from_der(entry) {
        Ok(parsed) => parsed,
        Err(e) => return fail(format!("hashAlg: {}", e)),
    };
    let value = element(rest)?;
    if !is_universal(&value, Tag::OctetString) {
        return fail("hashValue is not an OCTET STRING");
    }

    Ok(Some((alg.algorithm.to_id_string(), value.data.to_vec())))
}
