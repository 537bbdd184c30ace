//! Top-level actions and the process error boundary.
//!
//! Library code returns errors; only [`AppError::exit_code`] decides how the
//! process ends.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::cli::Action;
use crate::config::{dump_skeleton, load_config, ConfigError};
use crate::lifecycle::{subscribe_interrupt, LifecycleController, LifecycleError};
use crate::manager::{HttpManager, Manager};
use crate::security::{
    generate_api_key, CertGenError, CertificateAuthority, KeyGenError, KeySpec, DEFAULT_KEY_SIZE,
};

/// Exit code for a private key that could not be marshaled.
pub const EXIT_KEY_ENCODING: u8 = 3;

/// Exit code after a forced stop on a repeated interrupt.
pub const EXIT_FORCED_STOP: u8 = 130;

/// Exit code for every other fatal error.
pub const EXIT_FAILURE: u8 = 1;

/// Any fatal error of the process.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to generate API key: {0}")]
    KeyGen(#[from] KeyGenError),

    #[error("failed to generate key/cert pair: {0}")]
    CertGen(#[from] CertGenError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::CertGen(CertGenError::KeyEncoding { .. }) => EXIT_KEY_ENCODING,
            Self::Lifecycle(LifecycleError::ForcedStop) => EXIT_FORCED_STOP,
            _ => EXIT_FAILURE,
        }
    }
}

/// Perform `action` to completion.
pub async fn execute(action: Action) -> Result<(), AppError> {
    match action {
        Action::GenerateKey => generate_key(),
        Action::DumpConfig => {
            print!("{}", dump_skeleton()?);
            Ok(())
        }
        Action::GenerateCertificate { config, key_spec } => {
            generate_certificate(&config, key_spec, Path::new(".")).map(|_| ())
        }
        Action::Run { config } => run_manager::<HttpManager>(&config).await,
    }
}

fn generate_key() -> Result<(), AppError> {
    let key = generate_api_key(DEFAULT_KEY_SIZE)?;
    println!("New API key: {key}");
    println!("Please manually update client and manager configuration file to make it effective");
    Ok(())
}

/// Generate `cert.pem` and `key.pem` in `out_dir` for the configured host.
pub fn generate_certificate(
    config_path: &Path,
    key_spec: KeySpec,
    out_dir: &Path,
) -> Result<(PathBuf, PathBuf), AppError> {
    let config = load_config(config_path)?;

    let hosts = config.certificate_hosts();
    let pair = CertificateAuthority::new(key_spec).generate_self_signed(hosts.as_slice())?;
    let written = pair.write_to(out_dir)?;

    tracing::info!(fingerprint = %pair.fingerprint(), "Certificate SHA-256 fingerprint, distribute it to collectors");
    tracing::info!("Certificate and key generated should be used for testing purposes only");
    Ok(written)
}

/// Load the configuration and run a manager of type `M` until it stops.
pub async fn run_manager<M: Manager>(config_path: &Path) -> Result<(), AppError> {
    let config = load_config(config_path)?;

    let mut controller = LifecycleController::<M>::start(config, subscribe_interrupt).await?;
    controller.run().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
