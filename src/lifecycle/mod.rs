//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (controller.rs):
//!     ManagerConfig → Manager::build → Created
//!
//! Run (controller.rs):
//!     Running: race Manager::run against interrupts
//!     first interrupt → Manager::shutdown (once) → ShuttingDown
//!     run returns → Manager::wait → Stopped
//!
//! Signals (signals.rs):
//!     SIGINT → listener task → single-slot channel → controller
//! ```
//!
//! # Design Decisions
//! - Fail fast: manager construction errors are fatal, no retry
//! - Graceful stop is unbounded; the manager decides when it is done
//! - A second interrupt during shutdown forces exit

pub mod controller;
pub mod signals;

pub use controller::{LifecycleController, LifecycleError, ManagerState};
pub use signals::{channel, subscribe_interrupt, InterruptSender, Interrupts};
