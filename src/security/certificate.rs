//! Self-signed TLS certificate generation.
//!
//! # Responsibilities
//! - Classify configured hosts into IP and DNS subject alternative names
//! - Generate a key pair and a certificate signed by that same key
//! - Persist `cert.pem` and `key.pem` readable by the owner only
//!
//! # Design Decisions
//! - No CA chain: collectors pin the certificate (or its fingerprint)
//! - Generation is pure; nothing touches the disk until [`SelfSignedPair::write_to`]
//! - A failure writing `key.pem` leaves `cert.pem` in place

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use rand::rngs::OsRng;
use rand::RngCore;
use rcgen::{
    CertificateParams, DistinguishedName, DnType, DnValue, ExtendedKeyUsagePurpose, IsCa,
    KeyUsagePurpose, SanType, SerialNumber,
};
use sha2::{Digest, Sha256};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use zeroize::Zeroizing;

use crate::security::keys::{KeySpec, PrivateKey};

/// Organization written into the certificate subject.
pub const DEFAULT_ORGANIZATION: &str = "WHIDS Manager";

/// How long a generated certificate stays valid.
pub const DEFAULT_VALIDITY: Duration = Duration::days(365);

/// File name of the PEM certificate.
pub const CERT_FILE: &str = "cert.pem";

/// File name of the PEM private key.
pub const KEY_FILE: &str = "key.pem";

/// Size of the random serial number in bytes (128 bits).
const SERIAL_BYTES: usize = 16;

/// Errors that can occur while generating or persisting a certificate.
#[derive(Debug, Error)]
pub enum CertGenError {
    /// No host to bind the certificate to.
    #[error("no host configured: set `host` in the manager configuration")]
    NoHosts,

    #[error("host {host:?} is neither an IP address nor a valid DNS name: {source}")]
    InvalidDnsName {
        host: String,
        #[source]
        source: rcgen::Error,
    },

    #[error("failed to generate private key: {0}")]
    KeyGeneration(String),

    #[error("failed to generate serial number: {0}")]
    SerialNumber(#[source] rand::Error),

    #[error("validity window overflows the supported date range")]
    Validity,

    /// The private key could not be marshaled.
    #[error("unable to marshal private key as {format}: {reason}")]
    KeyEncoding { format: &'static str, reason: String },

    #[error("failed to create certificate: {0}")]
    Signing(#[source] rcgen::Error),

    #[error("failed to {step} {path:?}: {source}")]
    Write {
        step: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Subject alternative names split by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectAltNames {
    pub ips: Vec<IpAddr>,
    pub dns_names: Vec<String>,
}

impl SubjectAltNames {
    pub fn is_empty(&self) -> bool {
        self.ips.is_empty() && self.dns_names.is_empty()
    }

    fn to_san_types(&self) -> Result<Vec<SanType>, CertGenError> {
        let mut sans: Vec<SanType> = self.ips.iter().copied().map(SanType::IpAddress).collect();
        for name in &self.dns_names {
            let san = name
                .clone()
                .try_into()
                .map(SanType::DnsName)
                .map_err(|source| CertGenError::InvalidDnsName {
                    host: name.clone(),
                    source,
                })?;
            sans.push(san);
        }
        Ok(sans)
    }
}

/// Split hosts into IP literals and DNS names.
///
/// A host is an IP entry iff it parses as an IP address. Blank entries are
/// skipped and repeated entries keep only their first occurrence.
pub fn classify_hosts<S: AsRef<str>>(hosts: &[S]) -> SubjectAltNames {
    let mut sans = SubjectAltNames::default();
    for host in hosts {
        let host = host.as_ref().trim();
        if host.is_empty() {
            continue;
        }
        match host.parse::<IpAddr>() {
            Ok(ip) => {
                if !sans.ips.contains(&ip) {
                    sans.ips.push(ip);
                }
            }
            Err(_) => {
                if !sans.dns_names.iter().any(|n| n == host) {
                    sans.dns_names.push(host.to_string());
                }
            }
        }
    }
    sans
}

/// Issues self-signed certificates for the manager.
#[derive(Debug, Clone)]
pub struct CertificateAuthority {
    key_spec: KeySpec,
    organization: String,
    validity: Duration,
}

impl Default for CertificateAuthority {
    fn default() -> Self {
        Self::new(KeySpec::default())
    }
}

impl CertificateAuthority {
    pub fn new(key_spec: KeySpec) -> Self {
        Self {
            key_spec,
            organization: DEFAULT_ORGANIZATION.to_string(),
            validity: DEFAULT_VALIDITY,
        }
    }

    /// Generate a key pair and a certificate valid for `hosts`.
    pub fn generate_self_signed<S: AsRef<str>>(
        &self,
        hosts: &[S],
    ) -> Result<SelfSignedPair, CertGenError> {
        let sans = classify_hosts(hosts);
        if sans.is_empty() {
            return Err(CertGenError::NoHosts);
        }
        let subject_alt_names = sans.to_san_types()?;

        tracing::info!(
            key = ?self.key_spec,
            ips = ?sans.ips,
            dns_names = ?sans.dns_names,
            "Generating self-signed certificate"
        );

        let key = PrivateKey::generate(self.key_spec)?;
        let signing_key = key.signing_key()?;

        let not_before = OffsetDateTime::now_utc();
        let not_after = not_before
            .checked_add(self.validity)
            .ok_or(CertGenError::Validity)?;

        let mut distinguished_name = DistinguishedName::new();
        distinguished_name.push(
            DnType::OrganizationName,
            DnValue::Utf8String(self.organization.clone()),
        );

        let mut params = CertificateParams::default();
        params.serial_number = Some(random_serial()?);
        params.distinguished_name = distinguished_name;
        params.not_before = not_before;
        params.not_after = not_after;
        params.key_usages = vec![
            KeyUsagePurpose::DigitalSignature,
            KeyUsagePurpose::KeyEncipherment,
        ];
        params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];
        params.is_ca = IsCa::ExplicitNoCa;
        params.subject_alt_names = subject_alt_names;

        let cert = params
            .self_signed(&signing_key)
            .map_err(CertGenError::Signing)?;

        Ok(SelfSignedPair {
            cert_pem: cert.pem(),
            cert_der: cert.der().to_vec(),
            key_pem: key.to_pem()?,
            key_label: key.pem_label(),
        })
    }
}

/// A generated certificate and its private key, PEM encoded.
pub struct SelfSignedPair {
    cert_pem: String,
    cert_der: Vec<u8>,
    key_pem: Zeroizing<String>,
    key_label: &'static str,
}

impl SelfSignedPair {
    pub fn cert_pem(&self) -> &str {
        &self.cert_pem
    }

    pub fn cert_der(&self) -> &[u8] {
        &self.cert_der
    }

    pub fn key_pem(&self) -> &str {
        &self.key_pem
    }

    /// PEM block label of the private key.
    pub fn key_label(&self) -> &'static str {
        self.key_label
    }

    /// SHA-256 of the DER certificate, as colon separated uppercase hex.
    pub fn fingerprint(&self) -> String {
        Sha256::digest(&self.cert_der)
            .iter()
            .map(|b| hex::encode_upper([*b]))
            .collect::<Vec<_>>()
            .join(":")
    }

    /// Write `cert.pem` then `key.pem` into `dir`, owner read/write only.
    ///
    /// Returns the paths written, certificate first.
    pub fn write_to(&self, dir: &Path) -> Result<(PathBuf, PathBuf), CertGenError> {
        let cert_path = dir.join(CERT_FILE);
        write_private_file(&cert_path, self.cert_pem.as_bytes())?;
        tracing::info!(path = ?cert_path, "Written certificate");

        let key_path = dir.join(KEY_FILE);
        write_private_file(&key_path, self.key_pem.as_bytes())?;
        tracing::info!(path = ?key_path, label = self.key_label, "Written private key");

        Ok((cert_path, key_path))
    }
}

impl std::fmt::Debug for SelfSignedPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelfSignedPair")
            .field("fingerprint", &self.fingerprint())
            .field("key_label", &self.key_label)
            .finish_non_exhaustive()
    }
}

fn random_serial() -> Result<SerialNumber, CertGenError> {
    let mut serial = [0u8; SERIAL_BYTES];
    OsRng
        .try_fill_bytes(&mut serial)
        .map_err(CertGenError::SerialNumber)?;
    Ok(SerialNumber::from_slice(&serial))
}

fn write_private_file(path: &Path, contents: &[u8]) -> Result<(), CertGenError> {
    let fail = |step: &'static str| {
        move |source: io::Error| CertGenError::Write {
            step,
            path: path.to_path_buf(),
            source,
        }
    };

    let mut file = private_open_options()
        .open(path)
        .map_err(fail("open"))?;
    file.write_all(contents).map_err(fail("write"))?;
    file.sync_all().map_err(fail("flush"))?;

    // The mode above only applies when the file is created.
    set_permission_0600(path).map_err(fail("restrict permissions of"))
}

#[cfg(unix)]
fn private_open_options() -> OpenOptions {
    use std::os::unix::fs::OpenOptionsExt;
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true).mode(0o600);
    options
}

#[cfg(not(unix))]
fn private_open_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    options
}

#[cfg(unix)]
fn set_permission_0600(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn set_permission_0600(_path: &Path) -> io::Result<()> {
    Ok(())
}
