//! Certificate inspection and chain validation
//!
//! Uses x509-parser with its `verify` feature for signature checks.

use crate::error::CryptoError;
use x509_parser::certificate::X509Certificate;
use x509_parser::pem::{parse_x509_pem, Pem};
use x509_parser::x509::X509Name;

/// Fields of a certificate the bootstrap tooling cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    /// Subject common name.
    pub subject_cn: String,
    /// Subject organization, empty when absent.
    pub organization: String,
    /// Issuer common name.
    pub issuer_cn: String,
    /// Basic constraints CA flag.
    pub is_ca: bool,
    /// Key usage allows digitalSignature.
    pub digital_signature: bool,
    /// Key usage allows keyEncipherment.
    pub key_encipherment: bool,
}

fn parse_pem(pem: &[u8], what: &str) -> Result<Pem, CryptoError> {
    let (_, pem) = parse_x509_pem(pem)
        .map_err(|e| CryptoError::Certificate(format!("{what}: invalid PEM: {e}")))?;
    Ok(pem)
}

fn parse_cert<'a>(pem: &'a Pem, what: &str) -> Result<X509Certificate<'a>, CryptoError> {
    pem.parse_x509()
        .map_err(|e| CryptoError::Certificate(format!("{what}: invalid certificate: {e}")))
}

fn first_cn(name: &X509Name<'_>) -> String {
    name.iter_common_name()
        .next()
        .and_then(|attr| attr.as_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn first_org(name: &X509Name<'_>) -> String {
    name.iter_organization()
        .next()
        .and_then(|attr| attr.as_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Parse a PEM certificate and extract its [`CertificateInfo`].
pub fn inspect_certificate(pem: &[u8]) -> Result<CertificateInfo, CryptoError> {
    let pem = parse_pem(pem, "certificate")?;
    let cert = parse_cert(&pem, "certificate")?;
    let key_usage = cert
        .key_usage()
        .map_err(|e| CryptoError::Certificate(format!("certificate: invalid key usage: {e}")))?
        .map(|ext| *ext.value);
    Ok(CertificateInfo {
        subject_cn: first_cn(cert.subject()),
        organization: first_org(cert.subject()),
        issuer_cn: first_cn(cert.issuer()),
        is_ca: cert.is_ca(),
        digital_signature: key_usage.is_some_and(|ku| ku.digital_signature()),
        key_encipherment: key_usage.is_some_and(|ku| ku.key_encipherment()),
    })
}

fn check_issued_by(
    child: &X509Certificate<'_>,
    issuer: &X509Certificate<'_>,
    what: &str,
) -> Result<(), CryptoError> {
    if child.issuer().as_raw() != issuer.subject().as_raw() {
        return Err(CryptoError::Verification(format!(
            "{what}: issuer {} does not match {}",
            child.issuer(),
            issuer.subject()
        )));
    }
    if !child.validity().is_valid() {
        return Err(CryptoError::Verification(format!(
            "{what}: certificate is outside its validity period"
        )));
    }
    child
        .verify_signature(Some(issuer.public_key()))
        .map_err(|e| CryptoError::Verification(format!("{what}: bad signature: {e}")))
}

/// Check that `child` was signed by `issuer`.
///
/// Passing the same certificate twice checks a self-signed certificate.
pub fn verify_issued_by(child: &[u8], issuer: &[u8]) -> Result<(), CryptoError> {
    let child_pem = parse_pem(child, "child")?;
    let issuer_pem = parse_pem(issuer, "issuer")?;
    let child = parse_cert(&child_pem, "child")?;
    let issuer = parse_cert(&issuer_pem, "issuer")?;
    check_issued_by(&child, &issuer, "certificate")
}

/// Validate a three-level chain: a self-signed root CA, an agency CA signed
/// by the root, and a node certificate signed by the agency.
pub fn verify_chain(root: &[u8], agency: &[u8], leaf: &[u8]) -> Result<(), CryptoError> {
    let root_pem = parse_pem(root, "root")?;
    let agency_pem = parse_pem(agency, "agency")?;
    let leaf_pem = parse_pem(leaf, "node")?;
    let root = parse_cert(&root_pem, "root")?;
    let agency = parse_cert(&agency_pem, "agency")?;
    let leaf = parse_cert(&leaf_pem, "node")?;

    for (cert, what) in [(&root, "root"), (&agency, "agency")] {
        if !cert.is_ca() {
            return Err(CryptoError::Verification(format!(
                "{what} certificate is not a CA"
            )));
        }
    }

    check_issued_by(&root, &root, "root")?;
    check_issued_by(&agency, &root, "agency")?;
    check_issued_by(&leaf, &agency, "node")
}
