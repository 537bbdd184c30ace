//! Manager lifecycle controller.
//!
//! Owns the configuration, the manager and the interrupt subscription for the
//! whole process lifetime, and drives the manager through
//! `Created → Running → ShuttingDown → Stopped`.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::config::ManagerConfig;
use crate::lifecycle::signals::Interrupts;
use crate::manager::{Manager, ManagerError};

/// Lifecycle state of the managed manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    /// Constructed, not yet running.
    Created,
    /// Run loop in progress.
    Running,
    /// Shutdown requested or run loop returned; waiting for full stop.
    ShuttingDown,
    /// Manager confirmed it has stopped.
    Stopped,
}

impl fmt::Display for ManagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::ShuttingDown => "shutting-down",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Errors ending the manager lifecycle.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to create manager: {0}")]
    Construction(#[source] ManagerError),

    /// The run loop failed; reported once the manager has stopped.
    #[error("manager stopped with an error: {0}")]
    Runtime(#[source] ManagerError),

    #[error("failed to subscribe to the interrupt signal: {0}")]
    Signal(#[source] io::Error),

    #[error("interrupted again while shutting down, forcing exit")]
    ForcedStop,
}

/// Drives a [`Manager`] from construction to full stop.
pub struct LifecycleController<M> {
    config: ManagerConfig,
    manager: M,
    state: ManagerState,
    interrupts: Interrupts,
    shutdown_requested: bool,
}

impl<M: Manager> LifecycleController<M> {
    /// Construct the manager from `config`.
    ///
    /// `subscribe` is only called once construction succeeded; the returned
    /// subscription triggers shutdown while running.
    pub async fn start<F>(config: ManagerConfig, subscribe: F) -> Result<Self, LifecycleError>
    where
        F: FnOnce() -> io::Result<Interrupts>,
    {
        let manager = M::build(&config)
            .await
            .map_err(LifecycleError::Construction)?;
        tracing::debug!(state = %ManagerState::Created, "Manager constructed");

        let interrupts = subscribe().map_err(LifecycleError::Signal)?;
        Ok(Self {
            config,
            manager,
            state: ManagerState::Created,
            interrupts,
            shutdown_requested: false,
        })
    }

    pub fn state(&self) -> ManagerState {
        self.state
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }

    /// Run the manager until it has fully stopped.
    ///
    /// The first interrupt requests a graceful shutdown; an interrupt after
    /// that aborts with [`LifecycleError::ForcedStop`]. There is no deadline
    /// on the graceful path.
    pub async fn run(&mut self) -> Result<(), LifecycleError> {
        let Self {
            manager,
            state,
            interrupts,
            shutdown_requested,
            ..
        } = self;
        let manager: &M = manager;

        transition(state, ManagerState::Running);

        let run_result = {
            let run = manager.run();
            tokio::pin!(run);
            loop {
                tokio::select! {
                    result = &mut run => break result,
                    Some(()) = interrupts.recv() => {
                        on_interrupt(manager, state, shutdown_requested).await?;
                    }
                }
            }
        };

        if let Err(e) = &run_result {
            tracing::error!(error = %e, "Manager run loop failed");
        }
        if *state == ManagerState::Running {
            tracing::info!("Manager run loop returned, waiting for it to stop");
            transition(state, ManagerState::ShuttingDown);
        }

        {
            let wait = manager.wait();
            tokio::pin!(wait);
            loop {
                tokio::select! {
                    () = &mut wait => break,
                    Some(()) = interrupts.recv() => {
                        on_interrupt(manager, state, shutdown_requested).await?;
                    }
                }
            }
        }

        transition(state, ManagerState::Stopped);
        run_result.map_err(LifecycleError::Runtime)
    }
}

/// Handle one interrupt: request shutdown the first time, force exit after.
async fn on_interrupt<M: Manager>(
    manager: &M,
    state: &mut ManagerState,
    shutdown_requested: &mut bool,
) -> Result<(), LifecycleError> {
    if *shutdown_requested {
        tracing::warn!("Received another interrupt while shutting down");
        return Err(LifecycleError::ForcedStop);
    }

    tracing::info!("Received interrupt, shutting the manager down properly");
    *shutdown_requested = true;
    if *state == ManagerState::Running {
        transition(state, ManagerState::ShuttingDown);
    }
    manager.shutdown().await;
    Ok(())
}

fn transition(state: &mut ManagerState, next: ManagerState) {
    tracing::debug!(from = %state, to = %next, "Manager state transition");
    *state = next;
}
