// crates/product-service-verifier/src/engine.rs
// ============================================================================
// Module: Verification Engine
// Description: Fetches pact documents and replays interactions against a provider.
// Purpose: Produce per-interaction verification results and publish them back.
// Dependencies: reqwest, serde_json, state handler registry
// ============================================================================

//! ## Overview
//! The engine drives one verification pass: fetch the pact document from its
//! resolved location, replay every recorded interaction serially against the
//! live provider (arranging provider state first), and compare actual
//! status, headers, and body against the recorded expectation. Broker
//! communication failures fail closed and are kept distinct from
//! interaction mismatches.
//!
//! Body comparison follows pact's default matching: objects match by
//! expected-key containment, arrays element-wise with equal length,
//! primitives by equality.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use reqwest::Client;
use reqwest::Method;
use reqwest::header::HeaderMap;
use serde_json::Value;
use thiserror::Error;

use crate::document::Interaction;
use crate::document::InteractionRequest;
use crate::document::PactDocument;
use crate::states::StateHandlerRegistry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// HAL relation of the broker's publish-verification-results endpoint.
pub const PUBLISH_VERIFICATION_RESULTS_REL: &str = "pb:publish-verification-results";

// ============================================================================
// SECTION: Engine Errors
// ============================================================================

/// Broker-communication errors raised by the engine.
///
/// # Invariants
/// - These are fatal to the run and never conflated with interaction
///   mismatches.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The pact document could not be fetched.
    #[error("failed to fetch pact document from {url}: {reason}")]
    Fetch {
        /// Document URL.
        url: String,
        /// Underlying failure description.
        reason: String,
    },
    /// The broker answered a non-success status for the document.
    #[error("pact broker answered {status} for {url}")]
    FetchStatus {
        /// Document URL.
        url: String,
        /// Broker status code.
        status: u16,
    },
    /// The pact document could not be decoded.
    #[error("pact document could not be decoded: {0}")]
    Decode(String),
    /// Publication was requested but the document carries no publish link.
    #[error("pact document carries no {PUBLISH_VERIFICATION_RESULTS_REL} link")]
    MissingPublishLink,
    /// Publishing verification results failed.
    #[error("failed to publish verification results: {0}")]
    Publish(String),
    /// The broker rejected the published results.
    #[error("broker rejected verification results with status {0}")]
    PublishStatus(u16),
}

// ============================================================================
// SECTION: Verification Results
// ============================================================================

/// Outcome of replaying one recorded interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    /// Interaction description from the pact document.
    pub description: String,
    /// Provider-state names the interaction required.
    pub states: Vec<String>,
    /// Whether the actual response matched the recorded expectation.
    pub passed: bool,
    /// Mismatch detail when the interaction failed.
    pub failure: Option<String>,
}

/// Result report published back to the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    /// Whether every interaction passed.
    pub success: bool,
    /// Provider version the verification ran against.
    pub provider_version: String,
    /// Provider branch the verification ran against.
    pub provider_branch: String,
}

// ============================================================================
// SECTION: Verification Engine
// ============================================================================

/// Replays pact interactions against a live provider.
///
/// # Invariants
/// - Interactions are replayed serially, in document order.
/// - State setup always precedes the corresponding request.
pub struct VerificationEngine {
    /// HTTP client for broker and provider traffic.
    client: Client,
    /// Bearer credential for broker API calls.
    broker_token: Option<String>,
}

impl VerificationEngine {
    /// Creates an engine with an optional broker bearer token.
    #[must_use]
    pub fn new(broker_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            broker_token,
        }
    }

    /// Fetches and decodes the pact document at the given URL.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Fetch`], [`EngineError::FetchStatus`], or
    /// [`EngineError::Decode`] when the broker call or decoding fails.
    pub async fn fetch_document(&self, pact_url: &str) -> Result<PactDocument, EngineError> {
        let mut request = self.client.get(pact_url);
        if let Some(token) = &self.broker_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(|err| EngineError::Fetch {
            url: pact_url.to_string(),
            reason: err.to_string(),
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::FetchStatus {
                url: pact_url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await.map_err(|err| EngineError::Fetch {
            url: pact_url.to_string(),
            reason: err.to_string(),
        })?;
        serde_json::from_slice(&body).map_err(|err| EngineError::Decode(err.to_string()))
    }

    /// Replays every interaction serially and returns one result apiece.
    pub async fn replay(
        &self,
        document: &PactDocument,
        provider_base_url: &str,
        registry: &StateHandlerRegistry,
    ) -> Vec<VerificationResult> {
        let mut results = Vec::with_capacity(document.interactions.len());
        for interaction in &document.interactions {
            let failure =
                self.replay_interaction(interaction, provider_base_url, registry).await;
            let passed = failure.is_none();
            if let Some(detail) = &failure {
                tracing::warn!(
                    description = %interaction.description,
                    detail = %detail,
                    "interaction failed verification"
                );
            } else {
                tracing::info!(description = %interaction.description, "interaction verified");
            }
            results.push(VerificationResult {
                description: interaction.description.clone(),
                states: interaction.state_names().iter().map(ToString::to_string).collect(),
                passed,
                failure,
            });
        }
        results
    }

    /// Publishes the run report to the document's publish link.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingPublishLink`] when the document carries
    /// no publish relation, and [`EngineError::Publish`] or
    /// [`EngineError::PublishStatus`] when the broker call fails.
    pub async fn publish_results(
        &self,
        document: &PactDocument,
        report: &PublishReport,
    ) -> Result<(), EngineError> {
        let href = document
            .link_href(PUBLISH_VERIFICATION_RESULTS_REL)
            .ok_or(EngineError::MissingPublishLink)?;
        let payload = serde_json::json!({
            "success": report.success,
            "providerApplicationVersion": report.provider_version,
            "providerVersionBranch": report.provider_branch,
            "verifiedBy": { "implementation": "product-service-verifier" },
        });
        let mut request = self.client.post(href).json(&payload);
        if let Some(token) = &self.broker_token {
            request = request.bearer_auth(token);
        }
        let response =
            request.send().await.map_err(|err| EngineError::Publish(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::PublishStatus(status.as_u16()));
        }
        tracing::info!(
            success = report.success,
            provider_version = %report.provider_version,
            "verification results published"
        );
        Ok(())
    }

    /// Replays one interaction; returns the mismatch detail on failure.
    async fn replay_interaction(
        &self,
        interaction: &Interaction,
        provider_base_url: &str,
        registry: &StateHandlerRegistry,
    ) -> Option<String> {
        if let Err(err) = registry.run_before_each() {
            return Some(format!("before-each setup failed: {err}"));
        }
        for name in interaction.state_names() {
            let Some(handler) = registry.get(name) else {
                return Some(format!("no state handler registered for \"{name}\""));
            };
            if let Err(err) = handler() {
                return Some(format!("state \"{name}\" setup failed: {err}"));
            }
        }

        let response = match self.send_recorded_request(&interaction.request, provider_base_url).await
        {
            Ok(response) => response,
            Err(detail) => return Some(detail),
        };

        let actual_status = response.status().as_u16();
        if actual_status != interaction.response.status {
            return Some(format!(
                "status mismatch: expected {}, got {actual_status}",
                interaction.response.status
            ));
        }

        if let Some(detail) = match_headers(&interaction.response.headers, response.headers()) {
            return Some(detail);
        }

        let Some(expected_body) = interaction.response.body.as_ref() else {
            return None;
        };
        let actual_bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => return Some(format!("failed to read response body: {err}")),
        };
        match serde_json::from_slice::<Value>(&actual_bytes) {
            Ok(actual_body) => match_body(expected_body, &actual_body, "$").err(),
            Err(err) => Some(format!("response body is not valid JSON: {err}")),
        }
    }

    /// Sends a recorded request to the live provider.
    async fn send_recorded_request(
        &self,
        recorded: &InteractionRequest,
        provider_base_url: &str,
    ) -> Result<reqwest::Response, String> {
        let method = Method::from_bytes(recorded.method.as_bytes())
            .map_err(|err| format!("invalid recorded method {:?}: {err}", recorded.method))?;
        let mut url = format!("{provider_base_url}{}", recorded.path);
        if let Some(query) = &recorded.query {
            url.push('?');
            url.push_str(query);
        }
        let mut request = self.client.request(method, url);
        for (name, value) in &recorded.headers {
            request = request.header(name, value);
        }
        if let Some(body) = &recorded.body {
            request = request.json(body);
        }
        request.send().await.map_err(|err| format!("request failed: {err}"))
    }
}

// ============================================================================
// SECTION: Matching
// ============================================================================

/// Checks every expected header is present with the recorded value.
fn match_headers(expected: &BTreeMap<String, String>, actual: &HeaderMap) -> Option<String> {
    for (name, expected_value) in expected {
        let values: Vec<&str> = actual
            .get_all(name)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        if values.is_empty() {
            return Some(format!("missing expected header {name}"));
        }
        let actual_value = values.join(", ");
        if !header_value_matches(expected_value, &actual_value) {
            return Some(format!(
                "header {name} mismatch: expected {expected_value:?}, got {actual_value:?}"
            ));
        }
    }
    None
}

/// Compares header values, ignoring parameters on media types.
fn header_value_matches(expected: &str, actual: &str) -> bool {
    if expected == actual {
        return true;
    }
    // Recorded "application/json" must accept "application/json; charset=utf-8".
    actual.split(';').next().map(str::trim) == Some(expected)
}

/// Compares a recorded body against the actual one, pact-style.
///
/// Objects match by expected-key containment, arrays element-wise with equal
/// length, primitives by equality. `path` names the mismatch location.
fn match_body(expected: &Value, actual: &Value, path: &str) -> Result<(), String> {
    match (expected, actual) {
        (Value::Object(expected_map), Value::Object(actual_map)) => {
            for (key, expected_value) in expected_map {
                let child_path = format!("{path}.{key}");
                let Some(actual_value) = actual_map.get(key) else {
                    return Err(format!("body missing expected key at {child_path}"));
                };
                match_body(expected_value, actual_value, &child_path)?;
            }
            Ok(())
        }
        (Value::Array(expected_items), Value::Array(actual_items)) => {
            if expected_items.len() != actual_items.len() {
                return Err(format!(
                    "body array length mismatch at {path}: expected {}, got {}",
                    expected_items.len(),
                    actual_items.len()
                ));
            }
            for (index, (expected_item, actual_item)) in
                expected_items.iter().zip(actual_items).enumerate()
            {
                match_body(expected_item, actual_item, &format!("{path}[{index}]"))?;
            }
            Ok(())
        }
        _ => {
            if expected == actual {
                Ok(())
            } else {
                Err(format!(
                    "body mismatch at {path}: expected {expected}, got {actual}"
                ))
            }
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only panic-based assertions are permitted."
)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::PactDocument;
    use super::VerificationEngine;
    use super::header_value_matches;
    use super::match_body;
    use crate::states::StateHandlerError;
    use crate::states::StateHandlerRegistry;

    /// Tests objects match by expected-key containment.
    #[test]
    fn object_matching_allows_extra_actual_keys() {
        let expected = json!({ "id": "p-1" });
        let actual = json!({ "id": "p-1", "name": "Canvas Tote", "price": 44.5 });
        assert!(match_body(&expected, &actual, "$").is_ok());
    }

    /// Tests a missing expected key is reported with its path.
    #[test]
    fn object_matching_reports_missing_key_path() {
        let expected = json!({ "products": [{ "id": "p-1" }] });
        let actual = json!({ "products": [{ "name": "x" }] });
        let err = match_body(&expected, &actual, "$").unwrap_err();
        assert!(err.contains("$.products[0].id"));
    }

    /// Tests arrays must match element-wise with equal length.
    #[test]
    fn array_matching_requires_equal_length() {
        let expected = json!([1, 2, 3]);
        let actual = json!([1, 2]);
        let err = match_body(&expected, &actual, "$").unwrap_err();
        assert!(err.contains("length mismatch"));
    }

    /// Tests primitive values compare by equality.
    #[test]
    fn primitive_mismatch_is_reported() {
        let err = match_body(&json!(20001), &json!(20003), "$.code").unwrap_err();
        assert!(err.contains("expected 20001, got 20003"));
    }

    /// Tests media-type headers tolerate charset parameters.
    #[test]
    fn header_matching_ignores_media_type_parameters() {
        assert!(header_value_matches("application/json", "application/json; charset=utf-8"));
        assert!(header_value_matches("application/json", "application/json"));
        assert!(!header_value_matches("application/json", "text/html"));
    }

    /// Tests a failing before-each hook fails the interaction before replay.
    #[tokio::test]
    async fn failing_before_each_fails_the_interaction() {
        let mut registry = StateHandlerRegistry::new();
        registry.set_before_each(Arc::new(|| {
            Err(StateHandlerError::Setup("expectation state unavailable".to_string()))
        }));
        let document: PactDocument = serde_json::from_value(json!({
            "consumer": { "name": "web-client" },
            "provider": { "name": "ProductService" },
            "interactions": [{
                "description": "a request for a product",
                "request": { "method": "GET", "path": "/products/p-1" },
                "response": { "status": 200 }
            }]
        }))
        .unwrap();

        // No request is sent; the base URL is never dialed.
        let engine = VerificationEngine::new(None);
        let results = engine.replay(&document, "http://127.0.0.1:9", &registry).await;
        assert!(!results[0].passed);
        assert!(
            results[0]
                .failure
                .as_deref()
                .is_some_and(|detail| detail.contains("before-each setup failed"))
        );
    }
}
