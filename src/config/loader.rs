//! Configuration loading from disk.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::config::schema::ManagerConfig;

/// Error type for configuration loading.
///
/// Opening, reading and parsing are reported separately so the operator can
/// tell a missing file from a malformed one.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to open configuration file {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read configuration file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration data in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to render configuration skeleton: {0}")]
    Render(#[source] toml::ser::Error),
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ManagerConfig, ConfigError> {
    let mut file = File::open(path).map_err(|source| ConfigError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let config: ManagerConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = ?path, host = %config.host, port = config.port, "Configuration loaded");
    Ok(config)
}

/// Render a zero-valued configuration as an editable template.
pub fn dump_skeleton() -> Result<String, ConfigError> {
    render_template(&ManagerConfig::default())
}

fn render_template<T: Serialize>(value: &T) -> Result<String, ConfigError> {
    toml::to_string_pretty(value).map_err(ConfigError::Render)
}
