//! HTTP(S) manager serving collectors.
//!
//! # Responsibilities
//! - Bind the configured host/port at construction time
//! - Serve TLS when a certificate/key pair is configured
//! - Authenticate collectors by API key
//! - Stop gracefully on request and report when fully stopped

use std::net::{SocketAddr, TcpListener};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use axum::{middleware, routing::get, Router};
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use crate::config::ManagerConfig;
use crate::manager::auth::{api_key_middleware, AuthorizedKeys};
use crate::manager::tls::load_tls_config;
use crate::manager::{Manager, ManagerError};

/// Listener bound at construction, consumed by the first `run`.
enum Binding {
    Plain(TcpListener),
    Tls(TcpListener, RustlsConfig),
}

/// Manager that accepts collector connections over HTTP or HTTPS.
pub struct HttpManager {
    binding: Mutex<Option<Binding>>,
    router: Router,
    handle: Handle,
    stopped: watch::Sender<bool>,
    local_addr: SocketAddr,
    tls: bool,
}

impl HttpManager {
    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Whether connections are served over TLS.
    pub fn is_tls(&self) -> bool {
        self.tls
    }

    fn build_router(keys: AuthorizedKeys) -> Router {
        Router::new()
            .route("/ping", get(ping))
            .layer(middleware::from_fn_with_state(keys, api_key_middleware))
            .layer(TraceLayer::new_for_http())
    }
}

impl Manager for HttpManager {
    async fn build(config: &ManagerConfig) -> Result<Self, ManagerError> {
        let addr = format!("{}:{}", config.host, config.port);
        let bind_error = |source| ManagerError::Bind {
            addr: addr.clone(),
            source,
        };

        let listener = TcpListener::bind((config.host.as_str(), config.port)).map_err(bind_error)?;
        listener.set_nonblocking(true).map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;

        let binding = if config.tls.is_enabled() {
            let tls = load_tls_config(Path::new(&config.tls.cert), Path::new(&config.tls.key)).await?;
            Binding::Tls(listener, tls)
        } else {
            tracing::warn!("No TLS certificate configured, collectors will connect in clear text");
            Binding::Plain(listener)
        };

        let keys = AuthorizedKeys::new(config.authorized.iter().cloned());
        if keys.is_empty() {
            tracing::warn!("No authorized collector keys configured, every request will be rejected");
        }

        let (stopped, _) = watch::channel(false);
        Ok(Self {
            tls: matches!(binding, Binding::Tls(..)),
            binding: Mutex::new(Some(binding)),
            router: Self::build_router(keys),
            handle: Handle::new(),
            stopped,
            local_addr,
        })
    }

    async fn run(&self) -> Result<(), ManagerError> {
        let binding = self
            .binding
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(ManagerError::AlreadyRunning)?;

        tracing::info!(address = %self.local_addr, tls = self.tls, "Manager listening for collectors");

        let app = self.router.clone().into_make_service();
        let result = match binding {
            Binding::Plain(listener) => {
                axum_server::from_tcp(listener)
                    .handle(self.handle.clone())
                    .serve(app)
                    .await
            }
            Binding::Tls(listener, tls) => {
                axum_server::from_tcp_rustls(listener, tls)
                    .handle(self.handle.clone())
                    .serve(app)
                    .await
            }
        };

        self.stopped.send_replace(true);
        tracing::info!("Manager stopped");
        result.map_err(ManagerError::Serve)
    }

    async fn shutdown(&self) {
        tracing::info!(connections = self.handle.connection_count(), "Shutting the manager down");
        self.handle.graceful_shutdown(None);
    }

    async fn wait(&self) {
        let mut stopped = self.stopped.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = stopped.wait_for(|stopped| *stopped).await;
    }
}

async fn ping() -> &'static str {
    "pong"
}
