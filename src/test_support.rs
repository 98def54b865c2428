//! Certificate and logotype builders shared by the unit tests.

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use rcgen::{
    BasicConstraints, CertificateParams, CustomExtension, DnType, ExtendedKeyUsagePurpose, IsCa,
    KeyPair, SanType, SerialNumber,
};

pub const BIMI_EKU: &str = "1.3.6.1.5.5.7.3.31";
pub const LOGOTYPE_ARCS: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 1, 12];
pub const SHA1_OID: &str = "1.3.14.3.2.26";
pub const SHA256_OID: &str = "2.16.840.1.101.3.4.2.1";

pub const TEST_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.2" baseProfile="tiny-ps" viewBox="0 0 100 100"><title>Test</title><rect width="100" height="100" fill="red"/></svg>"#;

const BIMI_EKU_ARCS: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 3, 31];
const MARK_TYPE_ARCS: &[u64] = &[1, 3, 6, 1, 4, 1, 53087, 1, 13];
const TRADEMARK_REGISTRATION_ARCS: &[u64] = &[1, 3, 6, 1, 4, 1, 53087, 1, 4];

/// A minted certificate together with what is needed to sign with it.
pub struct Issued {
    pub pem: String,
    pub der: Vec<u8>,
    cert: rcgen::Certificate,
    key: KeyPair,
}

fn key_pair() -> KeyPair {
    KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).expect("key pair")
}

fn finish(params: CertificateParams, issuer: Option<&Issued>) -> Issued {
    let key = key_pair();
    let cert = match issuer {
        Some(issuer) => params
            .signed_by(&key, &issuer.cert, &issuer.key)
            .expect("signed cert"),
        None => params.self_signed(&key).expect("self-signed cert"),
    };
    Issued {
        pem: cert.pem(),
        der: cert.der().to_vec(),
        cert,
        key,
    }
}

/// CA certificate valid 2024-01-01 .. 2030-12-31, self-signed when `issuer` is `None`.
pub fn make_ca(cn: &str, issuer: Option<&Issued>) -> Issued {
    make_ca_with_validity(cn, issuer, (2024, 1, 1), (2030, 12, 31))
}

pub fn make_ca_with_validity(
    cn: &str,
    issuer: Option<&Issued>,
    not_before: (i32, u8, u8),
    not_after: (i32, u8, u8),
) -> Issued {
    let mut params = CertificateParams::new(Vec::<String>::new()).expect("CertificateParams");
    params.distinguished_name.push(DnType::CommonName, cn);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.not_before = rcgen::date_time_ymd(not_before.0, not_before.1, not_before.2);
    params.not_after = rcgen::date_time_ymd(not_after.0, not_after.1, not_after.2);
    finish(params, issuer)
}

/// Leaf (mark holder) certificate options.
pub struct LeafSpec {
    pub common_name: &'static str,
    pub mark_type: Option<&'static str>,
    pub dns_names: Vec<&'static str>,
    pub bimi_eku: bool,
    pub not_before: (i32, u8, u8),
    pub not_after: (i32, u8, u8),
    /// Raw logotype extension value; `None` omits the extension.
    pub logotype: Option<Vec<u8>>,
}

impl Default for LeafSpec {
    fn default() -> Self {
        Self {
            common_name: "Example Brand, Inc.",
            mark_type: Some("Registered Mark"),
            dns_names: vec!["example.com"],
            bimi_eku: true,
            not_before: (2024, 1, 1),
            not_after: (2030, 12, 31),
            logotype: Some(default_logotype()),
        }
    }
}

impl LeafSpec {
    pub fn build(self, issuer: &Issued) -> Issued {
        let mut params = CertificateParams::new(Vec::<String>::new()).expect("CertificateParams");
        params
            .distinguished_name
            .push(DnType::CommonName, self.common_name);
        params.distinguished_name.push(
            DnType::CustomDnType(TRADEMARK_REGISTRATION_ARCS.to_vec()),
            "5817930",
        );
        if let Some(mark_type) = self.mark_type {
            params
                .distinguished_name
                .push(DnType::CustomDnType(MARK_TYPE_ARCS.to_vec()), mark_type);
        }
        params.is_ca = IsCa::NoCa;
        params.serial_number = Some(SerialNumber::from(vec![0x0a, 0x1b, 0x2c]));
        params.not_before =
            rcgen::date_time_ymd(self.not_before.0, self.not_before.1, self.not_before.2);
        params.not_after =
            rcgen::date_time_ymd(self.not_after.0, self.not_after.1, self.not_after.2);

        if self.bimi_eku {
            params
                .extended_key_usages
                .push(ExtendedKeyUsagePurpose::Other(BIMI_EKU_ARCS.to_vec()));
        }
        for name in self.dns_names {
            params
                .subject_alt_names
                .push(SanType::DnsName(name.try_into().expect("dns name")));
        }
        if let Some(value) = self.logotype {
            params
                .custom_extensions
                .push(CustomExtension::from_oid_content(LOGOTYPE_ARCS, value));
        }

        finish(params, Some(issuer))
    }
}

// ─── Logotype encoding ───────────────────────────────────────────────

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("gzip write");
    encoder.finish().expect("gzip finish")
}

pub fn sha256(data: &[u8]) -> Vec<u8> {
    ring::digest::digest(&ring::digest::SHA256, data)
        .as_ref()
        .to_vec()
}

pub fn sha1(data: &[u8]) -> Vec<u8> {
    ring::digest::digest(&ring::digest::SHA1_FOR_LEGACY_USE_ONLY, data)
        .as_ref()
        .to_vec()
}

pub fn svgz_data_uri(svg: &str) -> String {
    use base64::Engine;
    let b64 = base64::engine::general_purpose::STANDARD.encode(gzip(svg.as_bytes()));
    format!("data:image/svg+xml;base64,{}", b64)
}

/// Gzipped `TEST_SVG` as a base64 data URI with its SHA-256.
pub fn default_logotype() -> Vec<u8> {
    logotype_extension(
        "image/svg+xml",
        Some((SHA256_OID, sha256(TEST_SVG.as_bytes()))),
        &[svgz_data_uri(TEST_SVG).as_str()],
    )
}

/// DER LogotypeExtn with a single direct subject logo image.
pub fn logotype_extension(media_type: &str, hash: Option<(&str, Vec<u8>)>, uris: &[&str]) -> Vec<u8> {
    let hashes = match hash {
        Some((oid, value)) => {
            let alg = der(0x30, &der_oid(oid));
            let entry = der(0x30, &[alg, der(0x04, &value)].concat());
            der(0x30, &entry)
        }
        None => der(0x30, &[]),
    };
    let uri_list: Vec<u8> = uris.iter().flat_map(|u| der(0x16, u.as_bytes())).collect();
    let details = der(
        0x30,
        &[der(0x16, media_type.as_bytes()), hashes, der(0x30, &uri_list)].concat(),
    );
    let image = der(0x30, &details);
    let images = der(0x30, &image);
    subject_logo(&der(0xa0, &images))
}

/// Wrap a LogotypeInfo in `[2]` subjectLogo inside LogotypeExtn.
pub fn subject_logo(info: &[u8]) -> Vec<u8> {
    der(0x30, &der(0xa2, info))
}

pub fn der(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    let len = content.len();
    if len < 0x80 {
        out.push(len as u8);
    } else {
        let bytes: Vec<u8> = len
            .to_be_bytes()
            .iter()
            .copied()
            .skip_while(|b| *b == 0)
            .collect();
        out.push(0x80 | bytes.len() as u8);
        out.extend(bytes);
    }
    out.extend_from_slice(content);
    out
}

pub fn der_oid(dotted: &str) -> Vec<u8> {
    let arcs: Vec<u64> = dotted.split('.').map(|a| a.parse().expect("arc")).collect();
    let mut body = encode_arc(arcs[0] * 40 + arcs[1]);
    for arc in &arcs[2..] {
        body.extend(encode_arc(*arc));
    }
    der(0x06, &body)
}

fn encode_arc(mut arc: u64) -> Vec<u8> {
    let mut out = vec![(arc & 0x7f) as u8];
    arc >>= 7;
    while arc > 0 {
        out.push(0x80 | (arc & 0x7f) as u8);
        arc >>= 7;
    }
    out.reverse();
    out
}
