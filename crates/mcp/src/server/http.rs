//! Streamable HTTP hosting for the DA tool server.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use axum::Router;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::server::core::{DaMcpCore, DaToolServices};

/// Loopback HTTP host that mounts the tool server under `/mcp`.
#[derive(Clone)]
pub struct McpHttpServer {
    bind_address: SocketAddr,
    services: Arc<DaToolServices>,
}

impl McpHttpServer {
    pub fn new(bind_address: SocketAddr, services: Arc<DaToolServices>) -> Self {
        Self { bind_address, services }
    }

    /// Bind the listener and serve in the background until [`RunningMcpHttpServer::stop`].
    pub async fn start(self) -> Result<RunningMcpHttpServer> {
        let cancellation_token = CancellationToken::new();
        let services = self.services;
        let service: StreamableHttpService<DaMcpCore, LocalSessionManager> = StreamableHttpService::new(
            move || Ok(DaMcpCore::new(Arc::clone(&services))),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig {
                stateful_mode: true,
                sse_keep_alive: None,
                cancellation_token: cancellation_token.child_token(),
                ..Default::default()
            },
        );

        let listener = tokio::net::TcpListener::bind(self.bind_address)
            .await
            .with_context(|| format!("failed to bind MCP HTTP server to {}", self.bind_address))?;
        let bound_address = listener.local_addr()?;
        info!(address = %bound_address, "DA tools available over HTTP at /mcp");

        let router = Router::new().nest_service("/mcp", service);
        let shutdown = cancellation_token.child_token();
        let server_handle = tokio::spawn(async move {
            let serve = axum::serve(listener, router).with_graceful_shutdown(async move { shutdown.cancelled().await });
            if let Err(error) = serve.await {
                warn!(error = %error, "MCP HTTP server stopped with an error");
            }
        });

        Ok(RunningMcpHttpServer {
            bound_address,
            cancellation_token,
            server_handle,
        })
    }
}

/// Handle to a background HTTP host.
#[derive(Debug)]
pub struct RunningMcpHttpServer {
    bound_address: SocketAddr,
    cancellation_token: CancellationToken,
    server_handle: JoinHandle<()>,
}

impl RunningMcpHttpServer {
    /// Address actually bound, with the ephemeral port resolved.
    pub fn bound_address(&self) -> SocketAddr {
        self.bound_address
    }

    /// Cancel open sessions and wait for the listener task to exit.
    pub async fn stop(self) -> Result<()> {
        self.cancellation_token.cancel();
        self.server_handle
            .await
            .map_err(|error| anyhow!("MCP HTTP server task failed: {error}"))?;
        info!(address = %self.bound_address, "MCP HTTP server stopped");
        Ok(())
    }
}

/// Parse `bind_address` (default `127.0.0.1:0`), refusing anything off the loopback interface.
pub fn resolve_bind_address(bind_address: Option<&str>) -> Result<SocketAddr> {
    let address = bind_address.unwrap_or("127.0.0.1:0");
    let parsed: SocketAddr = address
        .parse()
        .map_err(|error| anyhow!("invalid MCP HTTP bind address '{address}': {error}"))?;
    if !is_loopback(parsed.ip()) {
        return Err(anyhow!("MCP HTTP server must bind to a loopback address, got {}", parsed.ip()));
    }
    Ok(parsed)
}

fn is_loopback(address: IpAddr) -> bool {
    match address {
        IpAddr::V4(ip) => ip.is_loopback(),
        IpAddr::V6(ip) => ip.is_loopback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use da_api::DaConfig;

    #[test]
    fn defaults_to_ephemeral_loopback_port() {
        let address = resolve_bind_address(None).unwrap();
        assert!(address.ip().is_loopback());
        assert_eq!(address.port(), 0);
    }

    #[test]
    fn rejects_non_loopback_addresses() {
        let error = resolve_bind_address(Some("0.0.0.0:8080")).unwrap_err();
        assert!(error.to_string().contains("loopback"));
        assert!(resolve_bind_address(Some("[::1]:9000")).is_ok());
        assert!(resolve_bind_address(Some("localhost")).is_err());
    }

    #[tokio::test]
    async fn starts_and_stops_on_ephemeral_port() {
        let services = Arc::new(DaToolServices::from_config(&DaConfig::default()).unwrap());
        let running = McpHttpServer::new(resolve_bind_address(None).unwrap(), services)
            .start()
            .await
            .unwrap();

        let address = running.bound_address();
        assert_ne!(address.port(), 0);
        assert!(tokio::net::TcpStream::connect(address).await.is_ok());
        running.stop().await.unwrap();
    }
}
