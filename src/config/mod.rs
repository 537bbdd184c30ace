//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (open, read, parse)
//!     → ManagerConfig (immutable for the process lifetime)
//!     → certificate generation (host) / manager construction (everything)
//!
//! -dump-config:
//!     ManagerConfig::default() → loader.rs (pretty TOML) → stdout
//! ```
//!
//! # Design Decisions
//! - Config is loaded once; there is no hot reload
//! - All fields have zero-value defaults so a skeleton round-trips
//! - Unknown fields are ignored; the manager validates what it uses

pub mod loader;
pub mod schema;

pub use loader::{dump_skeleton, load_config, ConfigError};
pub use schema::{ManagerConfig, TlsConfig};
