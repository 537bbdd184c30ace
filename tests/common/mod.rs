//! Shared utilities for lifecycle and manager integration tests.

#![allow(dead_code)]

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hids_manager::manager::{Manager, ManagerError};
use hids_manager::ManagerConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::watch;

/// How a [`FakeManager`] behaves, selected through the config `host`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    /// `run` blocks until `shutdown` is called.
    BlockUntilShutdown,
    /// `run` returns at once; `wait` blocks until `shutdown` is called.
    ReturnEarly,
    /// `run` fails at once and the manager is stopped.
    FailRun,
    /// `run` never returns, even after `shutdown`.
    IgnoreShutdown,
    /// `build` fails.
    Unbuildable,
}

impl Behaviour {
    fn name(self) -> &'static str {
        match self {
            Self::BlockUntilShutdown => "block",
            Self::ReturnEarly => "return-early",
            Self::FailRun => "fail-run",
            Self::IgnoreShutdown => "ignore-shutdown",
            Self::Unbuildable => "unbuildable",
        }
    }

    fn from_name(name: &str) -> Self {
        [
            Self::BlockUntilShutdown,
            Self::ReturnEarly,
            Self::FailRun,
            Self::IgnoreShutdown,
            Self::Unbuildable,
        ]
        .into_iter()
        .find(|b| b.name() == name)
        .unwrap_or(Self::BlockUntilShutdown)
    }
}

/// Configuration that makes [`FakeManager::build`] pick `behaviour`.
pub fn fake_config(behaviour: Behaviour) -> ManagerConfig {
    ManagerConfig {
        host: behaviour.name().to_string(),
        ..Default::default()
    }
}

/// Manager collaborator that records how the controller drives it.
pub struct FakeManager {
    behaviour: Behaviour,
    shutdown_calls: Arc<AtomicUsize>,
    stop_requested: watch::Sender<bool>,
    stopped: watch::Sender<bool>,
}

impl FakeManager {
    /// Counter of `shutdown` invocations, shareable with the test body.
    pub fn shutdown_calls(&self) -> Arc<AtomicUsize> {
        self.shutdown_calls.clone()
    }
}

impl Manager for FakeManager {
    async fn build(config: &ManagerConfig) -> Result<Self, ManagerError> {
        let behaviour = Behaviour::from_name(&config.host);
        if behaviour == Behaviour::Unbuildable {
            return Err(ManagerError::Bind {
                addr: config.host.clone(),
                source: io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
            });
        }

        Ok(Self {
            behaviour,
            shutdown_calls: Arc::new(AtomicUsize::new(0)),
            stop_requested: watch::channel(false).0,
            stopped: watch::channel(false).0,
        })
    }

    async fn run(&self) -> Result<(), ManagerError> {
        match self.behaviour {
            Behaviour::BlockUntilShutdown => {
                let mut stop = self.stop_requested.subscribe();
                let _ = stop.wait_for(|s| *s).await;
                self.stopped.send_replace(true);
                Ok(())
            }
            Behaviour::ReturnEarly => Ok(()),
            Behaviour::FailRun => {
                self.stopped.send_replace(true);
                Err(ManagerError::Serve(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "listener died",
                )))
            }
            Behaviour::IgnoreShutdown | Behaviour::Unbuildable => {
                std::future::pending::<()>().await;
                Ok(())
            }
        }
    }

    async fn shutdown(&self) {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
        self.stop_requested.send_replace(true);
        if self.behaviour == Behaviour::ReturnEarly {
            self.stopped.send_replace(true);
        }
    }

    async fn wait(&self) {
        let mut stopped = self.stopped.subscribe();
        let _ = stopped.wait_for(|s| *s).await;
    }
}

/// Wait until `counter` reaches `target`, polling.
pub async fn wait_for_count(counter: &AtomicUsize, target: usize) {
    while counter.load(Ordering::SeqCst) < target {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Send a bare HTTP/1.1 GET and return the raw response text.
pub async fn http_get(addr: SocketAddr, path: &str, api_key: Option<&str>) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let mut request = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    if let Some(key) = api_key {
        request.push_str(&format!("Api-Key: {key}\r\n"));
    }
    request.push_str("\r\n");

    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}
