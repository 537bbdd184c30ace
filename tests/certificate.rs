//! Certificate generation tests, checked against an independent X.509 parser.

use std::io::BufReader;
use std::net::IpAddr;

use hids_manager::app::{generate_certificate, AppError};
use hids_manager::security::{CertGenError, CertificateAuthority, KeySpec, SelfSignedPair};
use rustls_pemfile::Item;
use x509_parser::prelude::*;

const ONE_YEAR_SECS: i64 = 365 * 86_400;

fn ec_pair(hosts: &[&str]) -> SelfSignedPair {
    CertificateAuthority::new(KeySpec::EcdsaP256)
        .generate_self_signed(hosts)
        .unwrap()
}

fn san_entries(cert: &X509Certificate<'_>) -> (Vec<IpAddr>, Vec<String>) {
    let san = cert
        .subject_alternative_name()
        .unwrap()
        .expect("certificate has no SAN extension");

    let mut ips = Vec::new();
    let mut dns_names = Vec::new();
    for name in &san.value.general_names {
        match name {
            GeneralName::IPAddress(bytes) => {
                let ip = match bytes.len() {
                    4 => IpAddr::from(<[u8; 4]>::try_from(*bytes).unwrap()),
                    16 => IpAddr::from(<[u8; 16]>::try_from(*bytes).unwrap()),
                    n => panic!("unexpected IP SAN length {n}"),
                };
                ips.push(ip);
            }
            GeneralName::DNSName(name) => dns_names.push(name.to_string()),
            other => panic!("unexpected SAN entry {other:?}"),
        }
    }
    (ips, dns_names)
}

#[test]
fn test_certificate_fields() {
    let pair = ec_pair(&["10.0.0.5"]);
    let (_, cert) = parse_x509_certificate(pair.cert_der()).unwrap();

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;
    let not_before = cert.validity().not_before.timestamp();
    let not_after = cert.validity().not_after.timestamp();
    assert!(not_before <= now + 1);
    assert!(now <= not_after);
    assert_eq!(not_after - not_before, ONE_YEAR_SECS);

    assert_eq!(cert.issuer().as_raw(), cert.subject().as_raw());
    let organization = cert
        .subject()
        .iter_organization()
        .next()
        .expect("no organization")
        .as_str()
        .unwrap();
    assert_eq!(organization, "WHIDS Manager");

    let key_usage = cert.key_usage().unwrap().expect("no key usage");
    assert!(key_usage.value.digital_signature());
    assert!(key_usage.value.key_encipherment());

    let eku = cert.extended_key_usage().unwrap().expect("no extended key usage");
    assert!(eku.value.server_auth);

    let constraints = cert.basic_constraints().unwrap().expect("no basic constraints");
    assert!(!constraints.value.ca);

    assert!(cert.tbs_certificate.serial.bits() <= 128);
}

#[test]
fn test_ip_host_yields_ip_san_only() {
    let pair = ec_pair(&["10.0.0.5"]);
    let (_, cert) = parse_x509_certificate(pair.cert_der()).unwrap();

    let (ips, dns_names) = san_entries(&cert);
    assert_eq!(ips, vec!["10.0.0.5".parse::<IpAddr>().unwrap()]);
    assert!(dns_names.is_empty());
}

#[test]
fn test_dns_host_yields_dns_san_only() {
    let pair = ec_pair(&["manager.internal"]);
    let (_, cert) = parse_x509_certificate(pair.cert_der()).unwrap();

    let (ips, dns_names) = san_entries(&cert);
    assert!(ips.is_empty());
    assert_eq!(dns_names, vec!["manager.internal".to_string()]);
}

#[test]
fn test_mixed_hosts_are_split_without_duplicates() {
    let pair = ec_pair(&["10.0.0.5", "manager.internal", "::1", "10.0.0.5", "manager.internal"]);
    let (_, cert) = parse_x509_certificate(pair.cert_der()).unwrap();

    let (ips, dns_names) = san_entries(&cert);
    assert_eq!(
        ips,
        vec![
            "10.0.0.5".parse::<IpAddr>().unwrap(),
            "::1".parse::<IpAddr>().unwrap()
        ]
    );
    assert_eq!(dns_names, vec!["manager.internal".to_string()]);
}

#[test]
fn test_pem_blocks_have_expected_labels() {
    let pair = ec_pair(&["localhost"]);

    let mut cert_reader = BufReader::new(pair.cert_pem().as_bytes());
    assert!(matches!(
        rustls_pemfile::read_one(&mut cert_reader).unwrap(),
        Some(Item::X509Certificate(_))
    ));

    let mut key_reader = BufReader::new(pair.key_pem().as_bytes());
    assert!(matches!(
        rustls_pemfile::read_one(&mut key_reader).unwrap(),
        Some(Item::Sec1Key(_))
    ));
    assert_eq!(pair.key_label(), "EC PRIVATE KEY");
}

#[test]
fn test_rsa_key_is_pkcs1() {
    let pair = CertificateAuthority::new(KeySpec::Rsa { bits: 2048 })
        .generate_self_signed(&["localhost"])
        .unwrap();

    let mut key_reader = BufReader::new(pair.key_pem().as_bytes());
    assert!(matches!(
        rustls_pemfile::read_one(&mut key_reader).unwrap(),
        Some(Item::Pkcs1Key(_))
    ));
    assert_eq!(pair.key_label(), "RSA PRIVATE KEY");

    let (_, cert) = parse_x509_certificate(pair.cert_der()).unwrap();
    assert_eq!(cert.issuer().as_raw(), cert.subject().as_raw());
}

#[test]
fn test_each_generation_uses_fresh_serial() {
    let first = ec_pair(&["localhost"]);
    let second = ec_pair(&["localhost"]);

    let (_, a) = parse_x509_certificate(first.cert_der()).unwrap();
    let (_, b) = parse_x509_certificate(second.cert_der()).unwrap();
    assert_ne!(a.raw_serial(), b.raw_serial());
    assert_ne!(first.fingerprint(), second.fingerprint());
}

#[test]
fn test_written_files_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let pair = ec_pair(&["10.0.0.5"]);

    let (cert_path, key_path) = pair.write_to(dir.path()).unwrap();

    assert_eq!(std::fs::read_to_string(&cert_path).unwrap(), pair.cert_pem());
    assert_eq!(std::fs::read_to_string(&key_path).unwrap(), pair.key_pem());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        for path in [&cert_path, &key_path] {
            let mode = std::fs::metadata(path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600, "{path:?} is not owner-only");
        }
    }
}

#[test]
fn test_blank_configured_host_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("manager.toml");
    std::fs::write(&config_path, "host = \"   \"\nport = 8000\n").unwrap();

    let err = generate_certificate(&config_path, KeySpec::EcdsaP256, dir.path()).unwrap_err();

    assert!(matches!(err, AppError::CertGen(CertGenError::NoHosts)));
    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec!["manager.toml"]);
}

#[test]
fn test_write_into_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let pair = ec_pair(&["localhost"]);

    let err = pair.write_to(&dir.path().join("missing")).unwrap_err();
    assert!(matches!(err, CertGenError::Write { step: "open", .. }));
}
