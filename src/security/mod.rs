//! Security bootstrap subsystem.
//!
//! # Data Flow
//! ```text
//! -key:
//!     api_key.rs (OsRng bytes → hex) → stdout → operator copies into
//!     manager `authorized` and collector configuration
//!
//! -certgen:
//!     config host → certificate.rs (classify SANs)
//!     → keys.rs (RSA-4096 / P-256 key)
//!     → certificate.rs (self-sign) → cert.pem, key.pem (0600)
//! ```
//!
//! # Design Decisions
//! - Only the OS random source is used; its failure is fatal
//! - No CA hierarchy: certificates are self-signed and pinned out of band
//! - Key material is never cached; encoded keys are zeroized after writing

pub mod api_key;
pub mod certificate;
pub mod keys;

pub use api_key::{generate_api_key, ApiKey, KeyGenError, DEFAULT_KEY_SIZE};
pub use certificate::{
    classify_hosts, CertGenError, CertificateAuthority, SelfSignedPair, SubjectAltNames,
};
pub use keys::{KeySpec, PrivateKey};
