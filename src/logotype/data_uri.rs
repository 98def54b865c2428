use std::io::Read;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use flate2::read::MultiGzDecoder;

const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Parsed `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri<'a> {
    /// Text between `data:` and the first comma.
    pub header: &'a str,
    pub media_type: &'a str,
    pub base64: bool,
    pub content: &'a str,
}

/// Split a `data:` URI into header fields and payload. Anything that is not
/// a data URI, or has no comma, gives `None`.
pub fn parse_data_uri(uri: &str) -> Option<DataUri<'_>> {
    let rest = uri.strip_prefix("data:")?;
    let (header, content) = rest.split_once(',')?;
    let mut parts = header.split(';');
    let media_type = parts.next().unwrap_or("");
    let base64 = parts.next() == Some("base64");
    Some(DataUri {
        header,
        media_type,
        base64,
        content,
    })
}

/// Normalise base64 text the way browsers and Node read it: the URL-safe
/// alphabet is folded into the standard one, characters outside the alphabet
/// are skipped, and decoding stops at the first `=`. A dangling final sextet
/// carries no whole byte and is dropped.
fn base64_alphabet_only(content: &str) -> String {
    let mut cleaned: String = content
        .chars()
        .take_while(|c| *c != '=')
        .filter_map(|c| match c {
            '-' => Some('+'),
            '_' => Some('/'),
            c if c.is_ascii_alphanumeric() || c == '+' || c == '/' => Some(c),
            _ => None,
        })
        .collect();
    if cleaned.len() % 4 == 1 {
        cleaned.pop();
    }
    cleaned
}

/// Recover the image bytes from a logotype URI: base64-decode when flagged,
/// then gunzip.
pub fn decode_logo(uri: &str) -> Option<Vec<u8>> {
    let Some(data) = parse_data_uri(uri) else {
        tracing::debug!("logotype URI is not a data URI");
        return None;
    };
    if data.content.is_empty() {
        return None;
    }

    let payload = if data.base64 {
        match LENIENT_BASE64.decode(base64_alphabet_only(data.content)) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(error = %e, "logotype data URI is not valid base64");
                return None;
            }
        }
    } else {
        data.content.as_bytes().to_vec()
    };

    if payload.is_empty() {
        return None;
    }

    let mut image = Vec::new();
    match MultiGzDecoder::new(payload.as_slice()).read_to_end(&mut image) {
        Ok(_) => Some(image),
        Err(e) => {
            tracing::debug!(error = %e, media_type = data.media_type, "logotype payload is not gzip");
            None
        }
    }
}
