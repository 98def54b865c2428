use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};

static SAN_DNS_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^DNS:|,\s*DNS:").unwrap());

/// Attribute keys (short names or dotted OIDs) and their long names.
const SUBJECT_ATTRIBUTES: &[(&str, &str)] = &[
    // BIMI Group private enterprise arc
    ("1.3.6.1.4.1.53087.1.2", "trademarkOfficeName"),
    ("1.3.6.1.4.1.53087.1.3", "trademarkCountryOrRegionName"),
    ("1.3.6.1.4.1.53087.1.4", "trademarkRegistration"),
    ("1.3.6.1.4.1.53087.1.5", "legalEntityIdentifier"),
    ("1.3.6.1.4.1.53087.1.6", "wordMark"),
    ("1.3.6.1.4.1.53087.1.13", "markType"),
    ("1.3.6.1.4.1.53087.4.1", "pilotIdentifier"),
    ("CN", "commonName"),
    ("O", "organizationName"),
    ("OU", "organizationalUnitName"),
    ("L", "localityName"),
    ("ST", "stateOrProvinceName"),
    ("S", "stateOrProvinceName"),
    ("C", "countryName"),
    ("jurisdictionC", "jurisdictionCountryName"),
    ("jurisdictionST", "jurisdictionStateOrProvinceName"),
    ("jurisdictionL", "jurisdictionLocalityName"),
];

/// Long name of the mark type attribute.
pub const MARK_TYPE: &str = "markType";

fn attribute_name(key: &str) -> &str {
    SUBJECT_ATTRIBUTES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, name)| *name)
        .unwrap_or(key)
}

/// Decoded subject or issuer name.
///
/// Keeps first-seen order; a repeated attribute overwrites the earlier value
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    entries: Vec<(String, String)>,
}

impl DistinguishedName {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn common_name(&self) -> Option<&str> {
        self.get("commonName")
    }

    pub fn mark_type(&self) -> Option<&str> {
        self.get(MARK_TYPE)
    }
}

impl Serialize for DistinguishedName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Decode a line-oriented `KEY=value` name string.
///
/// Lines are split on `\n` (an optional preceding `\r` is dropped), never on
/// commas. Lines without `=` are skipped.
pub fn parse_subject(subject: &str) -> DistinguishedName {
    let mut name = DistinguishedName::new();
    for line in subject.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some((key, value)) = parse_subject_line(line) {
            name.insert(key, value);
        }
    }
    name
}

fn parse_subject_line(line: &str) -> Option<(String, String)> {
    let (raw_key, raw_value) = line.split_once('=')?;
    let key = attribute_name(raw_key).to_string();
    let mut value = raw_value.replace("\\,", ",");

    if value.starts_with('"') {
        // Left verbatim when it is not a valid JSON string.
        if let Ok(unquoted) = serde_json::from_str::<String>(&value) {
            value = unquoted;
        }
    }

    Some((key, value))
}

/// Decode a `DNS:a, DNS:b` subject alternative name string into DNS names.
///
/// Splits on a leading `DNS:` or on `,` followed by optional whitespace and
/// `DNS:`. Entries are trimmed and empty ones dropped; order and duplicates
/// are kept.
pub fn parse_subject_alt_name(san: &str) -> Vec<String> {
    SAN_DNS_SEPARATOR
        .split(san)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_subject() {
        assert!(parse_subject("").is_empty());
    }

    #[test]
    fn standard_attributes() {
        let name = parse_subject("C=US\nST=Georgia\nL=Atlanta\nO=Cable News Network, Inc.\nCN=Cable News Network, Inc.");
        assert_eq!(name.get("countryName"), Some("US"));
        assert_eq!(name.get("stateOrProvinceName"), Some("Georgia"));
        assert_eq!(name.get("localityName"), Some("Atlanta"));
        assert_eq!(name.common_name(), Some("Cable News Network, Inc."));
        assert_eq!(name.len(), 5);
    }

    #[test]
    fn bimi_oids_are_named() {
        let name = parse_subject(
            "1.3.6.1.4.1.53087.1.4=5817930\n1.3.6.1.4.1.53087.1.13=Prior Use Mark\n1.3.6.1.4.1.53087.4.1=pilot-7",
        );
        assert_eq!(name.get("trademarkRegistration"), Some("5817930"));
        assert_eq!(name.mark_type(), Some("Prior Use Mark"));
        assert_eq!(name.get("pilotIdentifier"), Some("pilot-7"));
    }

    #[test]
    fn unknown_keys_pass_through() {
        let name = parse_subject("serialNumber=C0806592\n2.5.4.15=Private Organization");
        assert_eq!(name.get("serialNumber"), Some("C0806592"));
        assert_eq!(name.get("2.5.4.15"), Some("Private Organization"));
    }

    #[test]
    fn escaped_commas() {
        let name = parse_subject("O=Example\\, Inc.");
        assert_eq!(name.get("organizationName"), Some("Example, Inc."));
    }

    #[test]
    fn json_quoted_values() {
        let name = parse_subject("CN=\"line one\\nline two\"\nO=\"unterminated");
        assert_eq!(name.common_name(), Some("line one\nline two"));
        assert_eq!(name.get("organizationName"), Some("\"unterminated"));
    }

    #[test]
    fn lines_without_separator_and_crlf() {
        let name = parse_subject("garbage\r\nCN=foo\r\n\r\n");
        assert_eq!(name.len(), 1);
        assert_eq!(name.common_name(), Some("foo"));
    }

    #[test]
    fn value_keeps_later_equals_signs() {
        let name = parse_subject("CN=a=b");
        assert_eq!(name.common_name(), Some("a=b"));
    }

    #[test]
    fn duplicate_keys_last_wins() {
        let name = parse_subject("OU=first\nCN=x\nOU=second");
        assert_eq!(name.get("organizationalUnitName"), Some("second"));
        let keys: Vec<&str> = name.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["organizationalUnitName", "commonName"]);
    }

    #[test]
    fn serializes_as_map() {
        let name = parse_subject("CN=foo\nC=US");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, r#"{"commonName":"foo","countryName":"US"}"#);
    }

    #[test]
    fn san_single() {
        assert_eq!(parse_subject_alt_name("DNS:cnn.com"), vec!["cnn.com"]);
    }

    #[test]
    fn san_multiple_with_spacing() {
        assert_eq!(
            parse_subject_alt_name("DNS:a.example, DNS:b.example,DNS:c.example"),
            vec!["a.example", "b.example", "c.example"]
        );
    }

    #[test]
    fn san_duplicates_and_empty() {
        assert_eq!(parse_subject_alt_name("DNS:x, DNS:x"), vec!["x", "x"]);
        assert!(parse_subject_alt_name("").is_empty());
        assert!(parse_subject_alt_name("DNS:").is_empty());
    }

    #[test]
    fn san_separator_needs_leading_dns_or_comma() {
        assert_eq!(
            parse_subject_alt_name("DNS:a.example,\tDNS:b.example"),
            vec!["a.example", "b.example"]
        );
        assert_eq!(parse_subject_alt_name("x.example DNS:y"), vec!["x.example DNS:y"]);
    }

    #[test]
    fn san_other_kinds_are_not_split() {
        assert_eq!(
            parse_subject_alt_name("DNS:a.example, email:x@a.example"),
            vec!["a.example, email:x@a.example"]
        );
    }
}
