//! Collector API key generation.

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;
use zeroize::Zeroizing;

/// Number of random bytes in a key printed by `-key`.
pub const DEFAULT_KEY_SIZE: usize = 32;

/// Errors that can occur while generating an API key.
#[derive(Debug, Error)]
pub enum KeyGenError {
    #[error("API key size must be greater than zero")]
    InvalidSize,

    /// The OS random source failed. There is no fallback to a weaker RNG.
    #[error("secure random source unavailable: {0}")]
    Entropy(#[from] rand::Error),
}

/// A shared secret presented by collectors to authenticate to the manager.
///
/// Rendered as lowercase hex; the text decodes back to the generated bytes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ApiKey(String);

impl ApiKey {
    /// The key text as it goes into configuration files.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of random bytes the key encodes.
    pub fn byte_len(&self) -> usize {
        self.0.len() / 2
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Generate an API key of `size` random bytes.
pub fn generate_api_key(size: usize) -> Result<ApiKey, KeyGenError> {
    if size == 0 {
        return Err(KeyGenError::InvalidSize);
    }

    let mut bytes = Zeroizing::new(vec![0u8; size]);
    OsRng.try_fill_bytes(bytes.as_mut_slice())?;

    Ok(ApiKey(hex::encode(bytes.as_slice())))
}
