//! Configuration schema definitions.
//!
//! Only `host` is consumed by this crate's bootstrap code (certificate
//! generation). The remaining fields belong to the manager collaborator,
//! which validates them when it is constructed.

use serde::{Deserialize, Serialize};

/// Root configuration for the manager.
///
/// Every field defaults to its zero value so that a skeleton can be dumped
/// and partially filled in. Unknown fields are ignored by the deserializer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Host the manager is reachable at (IP literal or DNS name).
    ///
    /// Also used as the subject alternative name of generated certificates.
    pub host: String,

    /// TCP port the manager listens on.
    pub port: u16,

    /// API keys of collectors allowed to talk to the manager.
    pub authorized: Vec<String>,

    /// TLS certificate and key used by the listener.
    pub tls: TlsConfig,
}

impl ManagerConfig {
    /// Hosts to bind a generated certificate to.
    ///
    /// Blank entries are dropped, so an unset `host` yields an empty list.
    pub fn certificate_hosts(&self) -> Vec<String> {
        let host = self.host.trim();
        if host.is_empty() {
            Vec::new()
        } else {
            vec![host.to_string()]
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert: String,

    /// Path to private key file (PEM).
    pub key: String,
}

impl TlsConfig {
    /// TLS is served only when both paths are set.
    pub fn is_enabled(&self) -> bool {
        !self.cert.is_empty() && !self.key.is_empty()
    }
}
