//! Command line interface.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::security::KeySpec;

/// Long flags that may also be spelled with a single dash (`-key`).
const SINGLE_DASH_FLAGS: &[&str] = &["key", "certgen", "dump-config", "ecdsa"];

#[derive(Debug, Parser)]
#[command(name = "hids-manager")]
#[command(version, about = "Manager for remote HIDS collectors", long_about = None)]
pub struct Cli {
    /// Generate a random collector API key. Both collector and manager
    /// configuration files need to be updated with it.
    #[arg(long = "key")]
    pub keygen: bool,

    /// Generate a key and certificate pair (cert.pem, key.pem) for TLS
    /// connections, bound to the host in the configuration file.
    #[arg(long)]
    pub certgen: bool,

    /// Dump a skeleton of the manager configuration.
    #[arg(long)]
    pub dump_config: bool,

    /// With -certgen, generate an ECDSA P-256 key instead of RSA-4096.
    #[arg(long, requires = "certgen")]
    pub ecdsa: bool,

    /// Manager configuration file.
    #[arg(value_name = "CONFIG_FILE", required_unless_present_any = ["keygen", "dump_config"])]
    pub config: Option<PathBuf>,
}

/// What the process was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    GenerateKey,
    DumpConfig,
    GenerateCertificate { config: PathBuf, key_spec: KeySpec },
    Run { config: PathBuf },
}

impl Cli {
    /// Parse the process arguments, accepting single-dash long flags.
    pub fn parse_args() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Pick the action; when several flags are set the first of `-key`,
    /// `-dump-config`, `-certgen` wins.
    pub fn action(&self) -> Action {
        if self.keygen {
            return Action::GenerateKey;
        }
        if self.dump_config {
            return Action::DumpConfig;
        }

        // clap enforces the path whenever neither early exit flag is set.
        let config = self.config.clone().unwrap_or_default();
        if self.certgen {
            let key_spec = if self.ecdsa {
                KeySpec::EcdsaP256
            } else {
                KeySpec::default()
            };
            Action::GenerateCertificate { config, key_spec }
        } else {
            Action::Run { config }
        }
    }
}

/// Rewrite `-certgen` style flags to `--certgen`.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 {
                return arg;
            }
            let long = arg
                .to_str()
                .and_then(|s| s.strip_prefix('-'))
                .filter(|flag| SINGLE_DASH_FLAGS.contains(flag))
                .map(|flag| format!("--{flag}"));
            match long {
                Some(long) => long.into(),
                None => arg,
            }
        })
        .collect()
}
