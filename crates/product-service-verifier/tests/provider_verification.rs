// crates/product-service-verifier/tests/provider_verification.rs
// ============================================================================
// Module: Provider Verification Tests
// Description: End-to-end verification runs against an in-test stub broker.
// Purpose: Prove fetch, replay, aggregation, and publication work together.
// Dependencies: axum, product-service-verifier, serde_json, tokio
// ============================================================================

//! ## Overview
//! Spins up a stub pact broker and a live provider, then drives full
//! verification runs through [`verify_provider`]: every interaction replays,
//! an empty document is a hard failure, broker errors fail closed, and
//! results are published back to the broker's HAL link.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::missing_docs_in_private_items,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use axum::routing::post;
use product_service_verifier::ContractSettings;
use product_service_verifier::EngineError;
use product_service_verifier::PRODUCT_BODY_PARSER_ERROR_STATE;
use product_service_verifier::PRODUCT_DOES_NOT_EXIST_STATE;
use product_service_verifier::PRODUCT_EXISTS_STATE;
use product_service_verifier::PRODUCT_ONE_ID_MISSING_STATE;
use product_service_verifier::ProviderFixture;
use product_service_verifier::ProviderServerHandle;
use product_service_verifier::StateHandlerRegistry;
use product_service_verifier::VerifyError;
use product_service_verifier::product_state_handlers;
use product_service_verifier::spawn_provider;
use product_service_verifier::verify_provider;
use serde_json::Value;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

// ============================================================================
// SECTION: Stub Broker
// ============================================================================

/// In-test pact broker serving one document and capturing published results.
struct StubBroker {
    /// Base URL the broker listens on.
    base_url: String,
    /// Verification-result payloads received on the publish link.
    published: Arc<Mutex<Vec<Value>>>,
    /// Graceful-shutdown trigger.
    shutdown: oneshot::Sender<()>,
    /// Background serve task.
    join: JoinHandle<()>,
}

impl StubBroker {
    /// Shuts the broker down and awaits the background task.
    async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.join.await;
    }

    /// Returns a copy of the captured publish payloads.
    fn published(&self) -> Vec<Value> {
        self.published.lock().unwrap().clone()
    }
}

/// Starts the stub broker; the document is built once the base URL is known
/// so its publish link can point back at the broker itself.
async fn spawn_stub_broker(build_document: impl FnOnce(&str) -> Value) -> StubBroker {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let document = Arc::new(build_document(&base_url));
    let published: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));

    let latest_document = Arc::clone(&document);
    let override_document = Arc::clone(&document);
    let publish_log = Arc::clone(&published);
    let router = Router::new()
        .route(
            "/pacts/provider/ProductService/consumer/web-client/latest/master.json",
            get(move || {
                let document = Arc::clone(&latest_document);
                async move { Json((*document).clone()) }
            }),
        )
        .route(
            "/pact.json",
            get(move || {
                let document = Arc::clone(&override_document);
                async move { Json((*document).clone()) }
            }),
        )
        .route(
            "/publish",
            post(move |Json(payload): Json<Value>| {
                let publish_log = Arc::clone(&publish_log);
                async move {
                    publish_log.lock().unwrap().push(payload);
                    StatusCode::OK
                }
            }),
        );

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let join = tokio::spawn(async move {
        let _ = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await;
    });
    StubBroker {
        base_url,
        published,
        shutdown: shutdown_tx,
        join,
    }
}

/// Builds a pact document whose publish link targets the stub broker.
fn contract_document(broker_base_url: &str, interactions: Value) -> Value {
    json!({
        "consumer": { "name": "web-client" },
        "provider": { "name": "ProductService" },
        "interactions": interactions,
        "_links": {
            "pb:publish-verification-results": {
                "href": format!("{broker_base_url}/publish")
            }
        }
    })
}

// ============================================================================
// SECTION: Run Helpers
// ============================================================================

/// Installs a process-wide subscriber so replay logs surface on failure.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Live provider plus the registry closing over its mock.
struct LiveProvider {
    /// Background provider server.
    server: ProviderServerHandle,
    /// State setups over the provider's mock.
    registry: StateHandlerRegistry,
}

/// Boots the wired provider and waits for readiness.
async fn start_provider() -> LiveProvider {
    init_tracing();
    let fixture = ProviderFixture::new();
    let registry = product_state_handlers(&fixture.mock()).unwrap();
    let mut server = spawn_provider(fixture.into_router()).await.unwrap();
    server.wait_until_ready(Duration::from_secs(5)).await.unwrap();
    LiveProvider { server, registry }
}

/// Builds broker-backed settings that publish results.
fn broker_settings(broker_base_url: &str) -> ContractSettings {
    ContractSettings {
        host: "127.0.0.1".to_string(),
        provider_name: "ProductService".to_string(),
        broker_base_url: broker_base_url.to_string(),
        consumer_name: "web-client".to_string(),
        consumer_tags: vec!["master".to_string()],
        provider_version: "1.0.0".to_string(),
        provider_branch: "master".to_string(),
        publish_results: true,
        ..ContractSettings::default()
    }
}

// ============================================================================
// SECTION: Full Runs
// ============================================================================

/// Tests a full run replays every recorded interaction and publishes success.
#[tokio::test(flavor = "multi_thread")]
async fn full_run_replays_every_interaction_and_publishes() {
    let broker = spawn_stub_broker(|base_url| {
        contract_document(
            base_url,
            json!([
                {
                    "description": "a request for an existing product",
                    "providerState": PRODUCT_EXISTS_STATE,
                    "request": { "method": "GET", "path": "/products/existing-id" },
                    "response": {
                        "status": 200,
                        "headers": { "Content-Type": "application/json" },
                        "body": { "name": "Canvas Tote", "code": "BAG-104" }
                    }
                },
                {
                    "description": "a request for a missing product",
                    "providerState": PRODUCT_DOES_NOT_EXIST_STATE,
                    "request": { "method": "GET", "path": "/products/missing-id" },
                    "response": { "status": 400, "body": { "code": 20001 } }
                },
                {
                    "description": "a bulk request where one id is missing",
                    "providerState": PRODUCT_ONE_ID_MISSING_STATE,
                    "request": {
                        "method": "POST",
                        "path": "/products/bulk",
                        "headers": { "Content-Type": "application/json" },
                        "body": { "ids": ["a", "b", "c"] }
                    },
                    "response": { "status": 400, "body": { "code": 20003 } }
                },
                {
                    "description": "a bulk request with no ids",
                    "providerState": PRODUCT_BODY_PARSER_ERROR_STATE,
                    "request": {
                        "method": "POST",
                        "path": "/products/bulk",
                        "headers": { "Content-Type": "application/json" },
                        "body": { "ids": [] }
                    },
                    "response": { "status": 400, "body": { "code": 20002 } }
                }
            ]),
        )
    })
    .await;
    let provider = start_provider().await;
    let settings = broker_settings(&broker.base_url);

    // The base URL is composed from the configured host, as a suite would.
    let provider_base_url = settings.provider_base_url(provider.server.local_addr().port());
    let outcome = verify_provider(&settings, &provider.registry, &provider_base_url)
        .await
        .unwrap();

    assert_eq!(outcome.total, 4);
    assert!(outcome.results.iter().all(|result| result.passed));

    let published = broker.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0]["success"], json!(true));
    assert_eq!(published[0]["providerApplicationVersion"], json!("1.0.0"));
    assert_eq!(published[0]["providerVersionBranch"], json!("master"));

    provider.server.shutdown().await;
    broker.stop().await;
}

/// Tests a document with zero interactions is a hard failure.
#[tokio::test(flavor = "multi_thread")]
async fn empty_document_is_a_hard_failure() {
    let broker = spawn_stub_broker(|base_url| contract_document(base_url, json!([]))).await;
    let provider = start_provider().await;
    let settings = broker_settings(&broker.base_url);

    let err = verify_provider(&settings, &provider.registry, provider.server.base_url())
        .await
        .unwrap_err();
    assert!(matches!(err, VerifyError::NoInteractions));
    // Nothing is published for a run that never replayed anything.
    assert!(broker.published().is_empty());

    provider.server.shutdown().await;
    broker.stop().await;
}

/// Tests a mismatched interaction fails the run and publishes the failure.
#[tokio::test(flavor = "multi_thread")]
async fn mismatch_fails_run_and_publishes_failure() {
    let broker = spawn_stub_broker(|base_url| {
        contract_document(
            base_url,
            json!([
                {
                    "description": "a request expecting success for a missing product",
                    "providerState": PRODUCT_DOES_NOT_EXIST_STATE,
                    "request": { "method": "GET", "path": "/products/missing-id" },
                    "response": { "status": 200 }
                }
            ]),
        )
    })
    .await;
    let provider = start_provider().await;
    let settings = broker_settings(&broker.base_url);

    let err = verify_provider(&settings, &provider.registry, provider.server.base_url())
        .await
        .unwrap_err();
    let VerifyError::InteractionFailures { failed, total, results } = err else {
        panic!("expected interaction failures, got {err:?}");
    };
    assert_eq!(failed, 1);
    assert_eq!(total, 1);
    assert!(results[0].failure.as_deref().is_some_and(|detail| detail.contains("status mismatch")));

    let published = broker.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0]["success"], json!(false));

    provider.server.shutdown().await;
    broker.stop().await;
}

/// Tests an interaction naming an unregistered state fails, not panics.
#[tokio::test(flavor = "multi_thread")]
async fn unregistered_state_fails_the_interaction() {
    let broker = spawn_stub_broker(|base_url| {
        contract_document(
            base_url,
            json!([
                {
                    "description": "a request with an unknown provider state",
                    "providerState": "warehouse is on fire",
                    "request": { "method": "GET", "path": "/products/any" },
                    "response": { "status": 200 }
                }
            ]),
        )
    })
    .await;
    let provider = start_provider().await;
    let mut settings = broker_settings(&broker.base_url);
    settings.publish_results = false;

    let err = verify_provider(&settings, &provider.registry, provider.server.base_url())
        .await
        .unwrap_err();
    let VerifyError::InteractionFailures { results, .. } = err else {
        panic!("expected interaction failures, got {err:?}");
    };
    assert!(
        results[0]
            .failure
            .as_deref()
            .is_some_and(|detail| detail.contains("no state handler"))
    );

    provider.server.shutdown().await;
    broker.stop().await;
}

// ============================================================================
// SECTION: Broker Failures and Overrides
// ============================================================================

/// Tests a broker error fails the run closed before any replay.
#[tokio::test(flavor = "multi_thread")]
async fn broker_error_fails_closed() {
    let broker = spawn_stub_broker(|base_url| contract_document(base_url, json!([]))).await;
    let provider = start_provider().await;
    let mut settings = broker_settings(&broker.base_url);
    settings.pact_url_override = Some(format!("{}/missing.json", broker.base_url));

    let err = verify_provider(&settings, &provider.registry, provider.server.base_url())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        VerifyError::Broker(EngineError::FetchStatus { status: 404, .. })
    ));

    provider.server.shutdown().await;
    broker.stop().await;
}

/// Tests an override URL short-circuits broker-path resolution.
#[tokio::test(flavor = "multi_thread")]
async fn override_url_short_circuits_resolution() {
    let broker = spawn_stub_broker(|base_url| {
        contract_document(
            base_url,
            json!([
                {
                    "description": "a request for a missing product",
                    "providerState": PRODUCT_DOES_NOT_EXIST_STATE,
                    "request": { "method": "GET", "path": "/products/missing-id" },
                    "response": { "status": 400, "body": { "code": 20001 } }
                }
            ]),
        )
    })
    .await;
    let provider = start_provider().await;
    let settings = ContractSettings {
        provider_name: "ProductService".to_string(),
        pact_url_override: Some(format!("{}/pact.json", broker.base_url)),
        ..ContractSettings::default()
    };

    let outcome = verify_provider(&settings, &provider.registry, provider.server.base_url())
        .await
        .unwrap();
    assert_eq!(outcome.total, 1);
    assert!(outcome.results[0].passed);

    provider.server.shutdown().await;
    broker.stop().await;
}
