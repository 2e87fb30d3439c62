// crates/product-service-http/src/server.rs
// ============================================================================
// Module: Product Server
// Description: Bind/serve wrapper around the product router.
// Purpose: Provide addressable startup and graceful shutdown for callers.
// Dependencies: axum, tokio
// ============================================================================

//! ## Overview
//! [`ProductServer`] binds a listener up front so the local address is known
//! before serving begins, then serves the router until the shutdown signal
//! fires. Bind and serve failures are surfaced, never swallowed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

// ============================================================================
// SECTION: Server Errors
// ============================================================================

/// Errors returned by the product server.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound.
    #[error("failed to bind {addr}: {reason}")]
    Bind {
        /// Requested bind address.
        addr: String,
        /// Underlying failure description.
        reason: String,
    },
    /// The server terminated with an error.
    #[error("server terminated: {0}")]
    Serve(String),
}

// ============================================================================
// SECTION: Product Server
// ============================================================================

/// Bound-but-not-yet-serving product server.
///
/// # Invariants
/// - The local address is available from bind time onward.
pub struct ProductServer {
    /// Bound listener awaiting `serve`.
    listener: TcpListener,
    /// Address the listener is bound to.
    local_addr: SocketAddr,
    /// Router served once `serve` runs.
    router: Router,
}

impl ProductServer {
    /// Binds the server to the given address.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] when the listener cannot be bound.
    pub async fn bind(addr: &str, router: Router) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr).await.map_err(|err| ServerError::Bind {
            addr: addr.to_string(),
            reason: err.to_string(),
        })?;
        let local_addr = listener.local_addr().map_err(|err| ServerError::Bind {
            addr: addr.to_string(),
            reason: err.to_string(),
        })?;
        Ok(Self {
            listener,
            local_addr,
            router,
        })
    }

    /// Returns the bound local address.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves until the shutdown signal fires or the server fails.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Serve`] when the accept loop terminates with an
    /// error.
    pub async fn serve(self, shutdown: oneshot::Receiver<()>) -> Result<(), ServerError> {
        tracing::info!(addr = %self.local_addr, "product server accepting connections");
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.await;
            })
            .await
            .map_err(|err| ServerError::Serve(err.to_string()))
    }
}
