//! HTTPS server: TLS listener, routing, and the request pipeline.
//!
//! # Responsibilities
//! - Load TLS material from disk and build the rustls listener.
//! - Define the axum router with the fixed-order middleware chain.
//! - Inject shared application state (`AppState`) into handlers.

pub mod cors;
pub mod handlers;
pub mod middleware;
pub mod pagination;
pub mod router;
pub mod state;
pub mod tls;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;
use tracing::{debug, info, warn};

use crate::config::Config;
use state::AppState;

/// Handle to a running HTTPS server.
///
/// Returned by [`Server::start`] once the listening socket is bound. The
/// startup signal is single-shot: `start` either resolves with this handle
/// or fails with the TLS/bind error, never both.
#[derive(Debug)]
pub struct Server {
    local_addr: SocketAddr,
    accept_loop: tokio::task::JoinHandle<()>,
}

impl Server {
    /// Bring up the HTTPS listener.
    ///
    /// Reads the TLS material from disk (fatal on failure, before any socket
    /// is opened), builds the router, and binds the configured port — the
    /// `PORT` environment override has already been folded into
    /// [`Config::port`] by the configuration layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS material cannot be read or parsed, or if
    /// the listener cannot be bound.
    pub async fn start(cfg: &Config, state: AppState) -> Result<Self> {
        let tls_config = tls::load_server_config(&cfg.tls_dir)?;
        let acceptor = TlsAcceptor::from(tls_config);

        let app = router::build(state);

        let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        let local_addr = listener
            .local_addr()
            .context("failed to read listener address")?;

        info!(port = local_addr.port(), env = %cfg.env, "server started");

        let accept_loop = tokio::spawn(accept_loop(listener, acceptor, app));

        Ok(Self {
            local_addr,
            accept_loop,
        })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Run until the accept loop exits. Under normal operation it never
    /// does; the process is stopped by signal.
    pub async fn wait(self) -> Result<()> {
        self.accept_loop.await.context("accept loop terminated")
    }

    /// Stop accepting connections and release the listener.
    pub fn shutdown(&self) {
        self.accept_loop.abort();
    }
}

/// Accept loop: TLS handshake per connection, then HTTP service over the
/// negotiated stream. Per-connection errors are logged and never tear down
/// the listener.
async fn accept_loop(listener: TcpListener, acceptor: TlsAcceptor, app: axum::Router) {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                debug!(%peer_addr, "accepted TCP connection");
                let acceptor = acceptor.clone();
                let app = app.clone();
                tokio::spawn(async move {
                    if let Err(e) = serve_connection(stream, acceptor, app).await {
                        warn!(%peer_addr, error = %e, "connection error");
                    }
                });
            }
            Err(e) => {
                warn!(error = %e, "accept error");
            }
        }
    }
}

/// TLS handshake and HTTP/1.1 + HTTP/2 service for a single connection.
async fn serve_connection(stream: TcpStream, acceptor: TlsAcceptor, app: axum::Router) -> Result<()> {
    let tls_stream = acceptor
        .accept(stream)
        .await
        .context("TLS handshake failed")?;

    let service = hyper_util::service::TowerToHyperService::new(app);
    hyper_util::server::conn::auto::Builder::new(hyper_util::rt::TokioExecutor::new())
        .serve_connection(hyper_util::rt::TokioIo::new(tls_stream), service)
        .await
        .map_err(|e| anyhow::anyhow!("connection failed: {e}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_tls_dir(tls_dir: &str) -> Config {
        Config {
            port: 8443,
            env: "test".into(),
            tls_dir: tls_dir.into(),
            allowed_origins: "http://localhost:3000".into(),
            log_level: "info".into(),
        }
    }

    #[tokio::test]
    async fn start_fails_before_bind_when_tls_material_is_missing() {
        let cfg = config_with_tls_dir("/nonexistent/live/api.example.test");
        let err = Server::start(&cfg, AppState::default()).await.unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("privkey.pem"), "unexpected error: {msg}");
        // The wrapper embeds the underlying read error.
        assert!(err.chain().count() >= 2);
    }

    #[tokio::test]
    async fn shutdown_releases_the_listener() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let local_addr = listener.local_addr().unwrap();
        let accept_loop = tokio::spawn(async move {
            loop {
                let _ = listener.accept().await;
            }
        });
        let server = Server {
            local_addr,
            accept_loop,
        };
        assert_eq!(server.local_addr(), local_addr);

        server.shutdown();
        // The aborted accept loop surfaces as the wait error.
        let err = server.wait().await.unwrap_err();
        assert!(format!("{err:#}").contains("accept loop"));

        // The port is free again once the loop is gone.
        let rebound = TcpListener::bind(local_addr).await;
        assert!(rebound.is_ok());
    }
}
