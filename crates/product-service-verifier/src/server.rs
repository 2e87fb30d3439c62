// crates/product-service-verifier/src/server.rs
// ============================================================================
// Module: Provider Server Lifecycle
// Description: Background provider startup with active readiness checks.
// Purpose: Guarantee the provider accepts traffic before verification begins.
// Dependencies: product-service-http, tokio
// ============================================================================

//! ## Overview
//! Starts the wired provider on an ephemeral loopback port on a background
//! tokio task. Readiness is established by bounded TCP-connect polling, not
//! a fixed sleep, and an early server-task death is surfaced as an error so
//! a failed start aborts the run instead of hanging it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::time::Duration;
use std::time::Instant;

use axum::Router;
use product_service_http::ProductServer;
use product_service_http::ServerError;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Delay between readiness probes.
const READINESS_PROBE_INTERVAL: Duration = Duration::from_millis(25);

// ============================================================================
// SECTION: Lifecycle Errors
// ============================================================================

/// Errors raised by the provider server lifecycle.
///
/// # Invariants
/// - A provider that cannot start fails the run; it never hangs it.
#[derive(Debug, Error)]
pub enum ProviderServerError {
    /// The provider could not be bound.
    #[error("provider server failed to start: {0}")]
    Start(String),
    /// The server task ended before the provider became ready.
    #[error("provider server exited before readiness: {0}")]
    ExitedEarly(String),
    /// The server task panicked.
    #[error("provider server task panicked: {0}")]
    Panicked(String),
    /// The provider never accepted a connection within the timeout.
    #[error("provider readiness timeout after {attempts} attempts: {last_error}")]
    ReadinessTimeout {
        /// Number of probes attempted.
        attempts: u32,
        /// Last connect failure observed.
        last_error: String,
    },
}

// ============================================================================
// SECTION: Server Handle
// ============================================================================

/// Handle for the background provider server.
///
/// # Invariants
/// - The base URL is known from spawn time onward.
pub struct ProviderServerHandle {
    /// Address the provider is bound to.
    local_addr: SocketAddr,
    /// Base URL verification requests target.
    base_url: String,
    /// Graceful-shutdown trigger.
    shutdown: Option<oneshot::Sender<()>>,
    /// Background serve task.
    join: JoinHandle<Result<(), ServerError>>,
}

impl ProviderServerHandle {
    /// Returns the provider base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the bound local address.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Waits until the provider accepts connections.
    ///
    /// Polls with bounded retries until `timeout` elapses. An early task
    /// death is reported immediately instead of timing out.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderServerError::ReadinessTimeout`] on timeout and
    /// [`ProviderServerError::ExitedEarly`] or
    /// [`ProviderServerError::Panicked`] when the server task died.
    pub async fn wait_until_ready(&mut self, timeout: Duration) -> Result<(), ProviderServerError> {
        let start = Instant::now();
        let mut attempts = 0u32;
        loop {
            attempts = attempts.saturating_add(1);
            if self.join.is_finished() {
                return Err(self.collect_exit().await);
            }
            match TcpStream::connect(self.local_addr).await {
                Ok(_) => return Ok(()),
                Err(err) => {
                    // A refused connect right after task death must report
                    // the exit, not a timeout.
                    if self.join.is_finished() {
                        return Err(self.collect_exit().await);
                    }
                    if start.elapsed() > timeout {
                        return Err(ProviderServerError::ReadinessTimeout {
                            attempts,
                            last_error: err.to_string(),
                        });
                    }
                    sleep(READINESS_PROBE_INTERVAL).await;
                }
            }
        }
    }

    /// Fires the graceful-shutdown signal without consuming the handle.
    ///
    /// The server task's subsequent exit stays observable through
    /// [`Self::wait_until_ready`]; [`Self::shutdown`] is the consuming
    /// variant that also joins the task.
    pub fn trigger_shutdown(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }

    /// Shuts the provider down and awaits the background task.
    pub async fn shutdown(mut self) {
        self.trigger_shutdown();
        if let Err(err) = self.join.await {
            tracing::warn!(error = %err, "provider server task did not join cleanly");
        }
    }

    /// Collects the terminal error of a finished server task.
    async fn collect_exit(&mut self) -> ProviderServerError {
        match (&mut self.join).await {
            Ok(Ok(())) => {
                ProviderServerError::ExitedEarly("server stopped without error".to_string())
            }
            Ok(Err(err)) => ProviderServerError::ExitedEarly(err.to_string()),
            Err(join_err) => ProviderServerError::Panicked(join_err.to_string()),
        }
    }
}

// ============================================================================
// SECTION: Spawn
// ============================================================================

/// Starts the provider router on an ephemeral loopback port.
///
/// The bound base URL is available on the returned handle before any request
/// is issued; callers must still await readiness via
/// [`ProviderServerHandle::wait_until_ready`].
///
/// # Errors
///
/// Returns [`ProviderServerError::Start`] when the listener cannot be bound.
pub async fn spawn_provider(router: Router) -> Result<ProviderServerHandle, ProviderServerError> {
    let server = ProductServer::bind("127.0.0.1:0", router)
        .await
        .map_err(|err| ProviderServerError::Start(err.to_string()))?;
    let local_addr = server.local_addr();
    let base_url = format!("http://{local_addr}");
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = tokio::spawn(async move { server.serve(shutdown_rx).await });
    tracing::debug!(%base_url, "provider server spawned");
    Ok(ProviderServerHandle {
        local_addr,
        base_url,
        shutdown: Some(shutdown_tx),
        join,
    })
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::use_debug,
    reason = "Test-only panic-based assertions are permitted."
)]
mod tests {
    use std::future::pending;
    use std::net::SocketAddr;
    use std::time::Duration;

    use product_service_http::ServerError;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tokio::task::JoinHandle;
    use tokio::time::sleep;

    use super::ProviderServerError;
    use super::ProviderServerHandle;

    /// Binds and releases an ephemeral port nothing listens on.
    async fn unused_addr() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        addr
    }

    /// Builds a handle around an injected server task.
    fn handle_for(
        addr: SocketAddr,
        join: JoinHandle<Result<(), ServerError>>,
    ) -> ProviderServerHandle {
        let (shutdown, _ignored_rx) = oneshot::channel();
        ProviderServerHandle {
            local_addr: addr,
            base_url: format!("http://{addr}"),
            shutdown: Some(shutdown),
            join,
        }
    }

    /// Waits until the injected task has finished.
    async fn await_finish(handle: &ProviderServerHandle) {
        for _ in 0..200u32 {
            if handle.join.is_finished() {
                return;
            }
            sleep(Duration::from_millis(5)).await;
        }
        panic!("injected server task did not finish");
    }

    /// Tests a cleanly stopped server task surfaces as an early exit.
    #[tokio::test]
    async fn clean_task_stop_surfaces_early_exit() {
        let join = tokio::spawn(async { Ok::<(), ServerError>(()) });
        let mut handle = handle_for(unused_addr().await, join);
        await_finish(&handle).await;

        let err = handle.wait_until_ready(Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, ProviderServerError::ExitedEarly(_)));
    }

    /// Tests a serve failure surfaces its error detail through readiness.
    #[tokio::test]
    async fn serve_failure_surfaces_through_readiness() {
        let join =
            tokio::spawn(async { Err(ServerError::Serve("accept loop failed".to_string())) });
        let mut handle = handle_for(unused_addr().await, join);
        await_finish(&handle).await;

        let err = handle.wait_until_ready(Duration::from_secs(1)).await.unwrap_err();
        let ProviderServerError::ExitedEarly(detail) = err else {
            panic!("expected early exit, got {err:?}");
        };
        assert!(detail.contains("accept loop failed"));
    }

    /// Tests a panicked server task is reported as panicked.
    #[tokio::test]
    async fn panicked_task_is_reported() {
        let join: JoinHandle<Result<(), ServerError>> =
            tokio::spawn(async { panic!("server task crashed") });
        let mut handle = handle_for(unused_addr().await, join);
        await_finish(&handle).await;

        let err = handle.wait_until_ready(Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, ProviderServerError::Panicked(_)));
    }

    /// Tests readiness gives up with a timeout when nothing ever listens.
    #[tokio::test]
    async fn readiness_times_out_against_dead_address() {
        let join = tokio::spawn(pending::<Result<(), ServerError>>());
        let mut handle = handle_for(unused_addr().await, join);

        let err = handle.wait_until_ready(Duration::from_millis(100)).await.unwrap_err();
        let ProviderServerError::ReadinessTimeout { attempts, .. } = err else {
            panic!("expected readiness timeout, got {err:?}");
        };
        assert!(attempts >= 1);
        handle.join.abort();
    }
}
