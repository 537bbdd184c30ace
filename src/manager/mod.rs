//! Manager collaborator.
//!
//! # Data Flow
//! ```text
//! ManagerConfig
//!     → Manager::build (bind listener, load TLS material)
//!     → Manager::run   (serve until stopped)          ← main task
//!     → Manager::shutdown (request graceful stop)     ← interrupt path
//!     → Manager::wait  (block until fully stopped)    ← main task
//! ```
//!
//! # Design Decisions
//! - The lifecycle controller only depends on the [`Manager`] trait
//! - `shutdown` may be called while `run` is in flight, or before it starts
//! - Graceful stop has no deadline

pub mod auth;
pub mod server;
pub mod tls;

use std::future::Future;
use std::io;

use thiserror::Error;

use crate::config::ManagerConfig;

pub use server::HttpManager;

/// Errors surfaced by a manager implementation.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to load TLS material: {0}")]
    Tls(#[source] io::Error),

    #[error("manager is already running")]
    AlreadyRunning,

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

/// Operations the lifecycle controller needs from a manager.
pub trait Manager: Sized + Send + Sync {
    /// Construct the manager from a loaded configuration.
    fn build(config: &ManagerConfig) -> impl Future<Output = Result<Self, ManagerError>> + Send;

    /// Serve until the manager stops on its own or is shut down.
    fn run(&self) -> impl Future<Output = Result<(), ManagerError>> + Send;

    /// Request a graceful stop.
    fn shutdown(&self) -> impl Future<Output = ()> + Send;

    /// Resolve once the manager has fully stopped.
    fn wait(&self) -> impl Future<Output = ()> + Send;
}
