//! OS signal handling.
//!
//! # Responsibilities
//! - Subscribe to the process interrupt (SIGINT / Ctrl-C)
//! - Forward each delivery into a single-slot channel owned by the controller
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - One persistent signal stream, installed synchronously on subscribe
//! - Deliveries while one is still pending are coalesced
//! - Only the interrupt signal is handled

use std::io;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Sending half of an interrupt channel.
#[derive(Debug, Clone)]
pub struct InterruptSender {
    tx: mpsc::Sender<()>,
}

impl InterruptSender {
    /// Deliver an interrupt.
    ///
    /// Returns `false` once the receiving side is gone.
    pub fn notify(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => true,
            Err(TrySendError::Closed(())) => false,
        }
    }
}

/// Receiving half of an interrupt channel.
#[derive(Debug)]
pub struct Interrupts {
    rx: mpsc::Receiver<()>,
}

impl Interrupts {
    /// Wait for the next interrupt. `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<()> {
        self.rx.recv().await
    }
}

/// Create an interrupt channel not attached to any OS signal.
pub fn channel() -> (InterruptSender, Interrupts) {
    let (tx, rx) = mpsc::channel(1);
    (InterruptSender { tx }, Interrupts { rx })
}

/// Subscribe to the process interrupt signal.
///
/// The OS handler is installed before this returns, so an interrupt delivered
/// right after subscribing is queued instead of killing the process. Spawns
/// the forwarding task; must be called from within a Tokio runtime.
pub fn subscribe_interrupt() -> io::Result<Interrupts> {
    let mut stream = interrupt_stream()?;
    let (sender, interrupts) = channel();

    tokio::spawn(async move {
        while stream.recv().await.is_some() {
            tracing::info!("Received SIGINT");
            if !sender.notify() {
                break;
            }
        }
    });

    Ok(interrupts)
}

#[cfg(unix)]
fn interrupt_stream() -> io::Result<tokio::signal::unix::Signal> {
    tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
}

#[cfg(windows)]
fn interrupt_stream() -> io::Result<tokio::signal::windows::CtrlC> {
    tokio::signal::windows::ctrl_c()
}
