//! HIDS Manager Library
//!
//! Security bootstrap (API keys, self-signed TLS material) and process
//! lifecycle for the manager that coordinates remote collectors.

pub mod app;
pub mod cli;
pub mod config;
pub mod lifecycle;
pub mod manager;
pub mod observability;
pub mod security;

pub use config::ManagerConfig;
pub use lifecycle::{LifecycleController, ManagerState};
pub use manager::{HttpManager, Manager};
