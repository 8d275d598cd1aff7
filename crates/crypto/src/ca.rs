//! Cluster certificate authority
//!
//! Every cluster gets a fresh two-level PKI:
//!
//! ```text
//! root CA (self-signed, ECDSA P-256)
//!   └── agency CA (signed by root, path length 0)
//!         └── node certificate (Ed25519 subject key, signed by agency)
//! ```
//!
//! Node certificates are issued through a certificate signing request that
//! is built, parsed and signed in memory and then dropped; CSRs never reach
//! the disk.

use crate::error::CryptoError;
use crate::keys::{KeyAlgorithm, PrivateKey};
use rcgen::{
    BasicConstraints, Certificate, CertificateParams, CertificateSigningRequestParams,
    DistinguishedName, DnType, ExtendedKeyUsagePurpose, IsCa, KeyUsagePurpose, SanType,
};
use std::net::IpAddr;
use time::{Duration, OffsetDateTime};
use tracing::debug;

/// Common name of the root certificate.
pub const ROOT_COMMON_NAME: &str = "ca";

/// Common name of the agency certificate.
pub const AGENCY_COMMON_NAME: &str = "agency";

/// Distinguished name fields and validity shared by every certificate of a
/// cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertSubject {
    /// Country (C).
    pub country: String,
    /// State or province (ST).
    pub province: String,
    /// Locality (L).
    pub locality: String,
    /// Organization (O) of the root and agency certificates.
    pub organization: String,
    /// Validity period in days, starting now.
    pub validity_days: u32,
}

impl Default for CertSubject {
    fn default() -> Self {
        Self {
            country: "CN".to_string(),
            province: "ZJ".to_string(),
            locality: "HZ".to_string(),
            organization: "permnet".to_string(),
            validity_days: 3650,
        }
    }
}

/// Node certificate request.
#[derive(Debug, Clone)]
pub struct LeafRequest<'a> {
    /// Common name (CN).
    pub name: &'a str,
    /// Organization label (O), e.g. `Node1`.
    pub organization: &'a str,
    /// Address placed in the subject alternative names.
    pub ip: Option<IpAddr>,
    /// Whether the issued certificate may sign others.
    pub is_ca: bool,
}

fn base_params(
    subject: &CertSubject,
    common_name: &str,
    organization: &str,
) -> Result<CertificateParams, CryptoError> {
    let now = OffsetDateTime::now_utc();
    let not_after = now
        .checked_add(Duration::days(i64::from(subject.validity_days)))
        .ok_or_else(|| {
            CryptoError::Signing(format!(
                "validity of {} days overflows",
                subject.validity_days
            ))
        })?;

    let mut params = CertificateParams::default();
    params.not_before = now;
    params.not_after = not_after;
    params.distinguished_name = distinguished_name(subject, common_name, organization);
    Ok(params)
}

fn distinguished_name(
    subject: &CertSubject,
    common_name: &str,
    organization: &str,
) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CountryName, subject.country.as_str());
    dn.push(DnType::StateOrProvinceName, subject.province.as_str());
    dn.push(DnType::LocalityName, subject.locality.as_str());
    dn.push(DnType::OrganizationName, organization);
    dn.push(DnType::CommonName, common_name);
    dn
}

fn ca_key_usages() -> Vec<KeyUsagePurpose> {
    vec![
        KeyUsagePurpose::KeyCertSign,
        KeyUsagePurpose::CrlSign,
        KeyUsagePurpose::DigitalSignature,
    ]
}

/// Create the self-signed root certificate.
pub fn create_root(subject: &CertSubject) -> Result<(PrivateKey, Certificate), CryptoError> {
    let root_key = PrivateKey::generate(KeyAlgorithm::EcdsaP256)?;

    let mut params = base_params(subject, ROOT_COMMON_NAME, &subject.organization)?;
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = ca_key_usages();

    let cert = params
        .self_signed(root_key.key_pair()?)
        .map_err(|e| CryptoError::Signing(format!("self-sign root certificate: {e}")))?;
    Ok((root_key, cert))
}

/// Issue the agency certificate, signed by the root.
pub fn issue_agency(
    root_key: &PrivateKey,
    root_cert: &Certificate,
    subject: &CertSubject,
) -> Result<(PrivateKey, Certificate), CryptoError> {
    let agency_key = PrivateKey::generate(KeyAlgorithm::EcdsaP256)?;

    let mut params = base_params(subject, AGENCY_COMMON_NAME, &subject.organization)?;
    params.is_ca = IsCa::Ca(BasicConstraints::Constrained(0));
    params.key_usages = ca_key_usages();

    let cert = params
        .signed_by(agency_key.key_pair()?, root_cert, root_key.key_pair()?)
        .map_err(|e| CryptoError::Signing(format!("sign agency certificate: {e}")))?;
    Ok((agency_key, cert))
}

/// Issue a node certificate, signed by the agency.
///
/// Generates the Ed25519 subject key, wraps the request in a CSR, parses the
/// CSR back and signs it with the agency key.
pub fn issue_leaf(
    request: &LeafRequest<'_>,
    agency_key: &PrivateKey,
    agency_cert: &Certificate,
    subject: &CertSubject,
) -> Result<(PrivateKey, Certificate), CryptoError> {
    let leaf_key = PrivateKey::generate(KeyAlgorithm::Ed25519)?;

    // The CSR only carries the subject and SANs; validity and usages are
    // decided by the issuer below.
    let mut request_params = CertificateParams::default();
    request_params.distinguished_name =
        distinguished_name(subject, request.name, request.organization);
    if let Some(ip) = request.ip {
        request_params.subject_alt_names.push(SanType::IpAddress(ip));
    }

    let csr = request_params
        .serialize_request(leaf_key.key_pair()?)
        .map_err(|e| CryptoError::Signing(format!("create CSR for {}: {e}", request.organization)))?;
    let mut csr_params = CertificateSigningRequestParams::from_der(csr.der())
        .map_err(|e| CryptoError::Signing(format!("parse CSR for {}: {e}", request.organization)))?;
    drop(csr);

    let validity = base_params(subject, request.name, request.organization)?;
    csr_params.params.not_before = validity.not_before;
    csr_params.params.not_after = validity.not_after;
    if request.is_ca {
        csr_params.params.is_ca = IsCa::Ca(BasicConstraints::Constrained(0));
        csr_params.params.key_usages = ca_key_usages();
    } else {
        csr_params.params.is_ca = IsCa::NoCa;
        // Ed25519 keys sign only; keyEncipherment is not allowed for them
        csr_params.params.key_usages = vec![KeyUsagePurpose::DigitalSignature];
        csr_params.params.extended_key_usages = vec![
            ExtendedKeyUsagePurpose::ServerAuth,
            ExtendedKeyUsagePurpose::ClientAuth,
        ];
    }

    let cert = csr_params
        .signed_by(agency_cert, agency_key.key_pair()?)
        .map_err(|e| {
            CryptoError::Signing(format!("sign certificate for {}: {e}", request.organization))
        })?;

    debug!(
        "Issued certificate CN={} O={} (ca={})",
        request.name, request.organization, request.is_ca
    );
    Ok((leaf_key, cert))
}

/// Root and agency key material of one generation run.
///
/// Only the certificates are meant to leave the run's output root; the two
/// private keys stay next to it.
pub struct CaMaterial {
    root_key: PrivateKey,
    root_cert: Certificate,
    agency_key: PrivateKey,
    agency_cert: Certificate,
    subject: CertSubject,
}

impl CaMaterial {
    /// Create the root and the agency.
    pub fn create(subject: CertSubject) -> Result<Self, CryptoError> {
        let (root_key, root_cert) = create_root(&subject)?;
        let (agency_key, agency_cert) = issue_agency(&root_key, &root_cert, &subject)?;
        debug!("Created root and agency certificates for {}", subject.organization);
        Ok(Self {
            root_key,
            root_cert,
            agency_key,
            agency_cert,
            subject,
        })
    }

    /// Issue a node certificate signed by the agency.
    pub fn issue_leaf(
        &self,
        request: &LeafRequest<'_>,
    ) -> Result<(PrivateKey, Certificate), CryptoError> {
        issue_leaf(request, &self.agency_key, &self.agency_cert, &self.subject)
    }

    /// Subject used for every certificate.
    pub fn subject(&self) -> &CertSubject {
        &self.subject
    }

    /// Root private key.
    pub fn root_key(&self) -> &PrivateKey {
        &self.root_key
    }

    /// Agency private key.
    pub fn agency_key(&self) -> &PrivateKey {
        &self.agency_key
    }

    /// Root certificate, PEM encoded.
    pub fn root_cert_pem(&self) -> String {
        self.root_cert.pem()
    }

    /// Agency certificate, PEM encoded.
    pub fn agency_cert_pem(&self) -> String {
        self.agency_cert.pem()
    }
}

impl std::fmt::Debug for CaMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaMaterial")
            .field("subject", &self.subject)
            .field("root_key", &self.root_key)
            .field("agency_key", &self.agency_key)
            .finish_non_exhaustive()
    }
}
