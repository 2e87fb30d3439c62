// crates/product-service-verifier/tests/state_routing.rs
// ============================================================================
// Module: State Routing Tests
// Description: Provider-state behavior observed through the live HTTP surface.
// Purpose: Exercise each state setup against the routes it arranges.
// Dependencies: product-service-verifier, reqwest, tokio
// ============================================================================

//! ## Overview
//! Boots the provider fixture on an ephemeral port, invokes each built-in
//! state setup the way the verification engine would, and asserts the HTTP
//! responses the recorded contract expects.

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

use std::time::Duration;

use product_service_verifier::PRODUCT_DOES_NOT_EXIST_STATE;
use product_service_verifier::PRODUCT_EXISTS_STATE;
use product_service_verifier::PRODUCT_ONE_ID_MISSING_STATE;
use product_service_verifier::ProviderFixture;
use product_service_verifier::ProviderServerHandle;
use product_service_verifier::StateHandlerRegistry;
use product_service_verifier::product_state_handlers;
use product_service_verifier::spawn_provider;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Live provider plus the registry closing over its mock.
struct LiveProvider {
    server: ProviderServerHandle,
    registry: StateHandlerRegistry,
}

async fn start_provider() -> LiveProvider {
    let fixture = ProviderFixture::new();
    let registry = product_state_handlers(&fixture.mock()).unwrap();
    let mut server = spawn_provider(fixture.into_router()).await.unwrap();
    server.wait_until_ready(Duration::from_secs(5)).await.unwrap();
    LiveProvider { server, registry }
}

fn arrange(provider: &LiveProvider, state: &str) {
    provider.registry.run_before_each().unwrap();
    provider.registry.get(state).unwrap()().unwrap();
}

// ============================================================================
// SECTION: Single Lookup States
// ============================================================================

/// Tests the product-exists state yields 200 with the product id in the body.
#[tokio::test(flavor = "multi_thread")]
async fn product_exists_state_yields_ok_with_id() {
    let provider = start_provider().await;
    arrange(&provider, PRODUCT_EXISTS_STATE);

    let response = reqwest::get(format!("{}/products/any-id", provider.server.base_url()))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(body["name"], "Canvas Tote");

    provider.server.shutdown().await;
}

/// Tests the product-missing state yields 400 with the not-found code.
#[tokio::test(flavor = "multi_thread")]
async fn product_does_not_exist_state_yields_not_found_code() {
    let provider = start_provider().await;
    arrange(&provider, PRODUCT_DOES_NOT_EXIST_STATE);

    let response = reqwest::get(format!("{}/products/any-id", provider.server.base_url()))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], 20001);

    provider.server.shutdown().await;
}

// ============================================================================
// SECTION: Bulk Lookup States
// ============================================================================

/// Tests the partial-bulk state yields 400 with the one-or-more-missing code.
#[tokio::test(flavor = "multi_thread")]
async fn one_id_missing_state_yields_missing_code() {
    let provider = start_provider().await;
    arrange(&provider, PRODUCT_ONE_ID_MISSING_STATE);

    let response = reqwest::Client::new()
        .post(format!("{}/products/bulk", provider.server.base_url()))
        .json(&serde_json::json!({ "ids": ["a", "b", "c"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], 20003);

    provider.server.shutdown().await;
}

/// Tests an empty id list fails in the handler with no state arranged.
#[tokio::test(flavor = "multi_thread")]
async fn empty_ids_fail_without_any_arrangement() {
    let provider = start_provider().await;
    provider.registry.run_before_each().unwrap();

    let response = reqwest::Client::new()
        .post(format!("{}/products/bulk", provider.server.base_url()))
        .json(&serde_json::json!({ "ids": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], 20002);

    provider.server.shutdown().await;
}

/// Tests expectations do not leak across interactions once reset runs.
#[tokio::test(flavor = "multi_thread")]
async fn before_each_reset_prevents_expectation_leakage() {
    let provider = start_provider().await;
    arrange(&provider, PRODUCT_EXISTS_STATE);

    // The next interaction runs without a state of its own.
    provider.registry.run_before_each().unwrap();

    let response = reqwest::get(format!("{}/products/any-id", provider.server.base_url()))
        .await
        .unwrap();
    // The unarmed mock fails the lookup, surfacing the processing code.
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], 10001);

    provider.server.shutdown().await;
}
