// crates/product-service-verifier/src/document.rs
// ============================================================================
// Module: Pact Document Model
// Description: Wire model of a published pact contract document.
// Purpose: Decode broker documents for replay and result publication.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Serde model for the pact document the broker serves: pacticipants, the
//! recorded interactions, and the HAL links used to publish verification
//! results. Both the v2 singular `providerState` and the v3 `providerStates`
//! list are accepted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Document
// ============================================================================

/// Consumer or provider participant of a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pacticipant {
    /// Participant name as registered with the broker.
    pub name: String,
}

/// Provider state attached to an interaction (v3 shape).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderState {
    /// State name the provider must arrange.
    pub name: String,
    /// Optional state parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Recorded request of an interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRequest {
    /// HTTP method.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Raw query string, when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Request headers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Request body, when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// Recorded expected response of an interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionResponse {
    /// Expected HTTP status.
    pub status: u16,
    /// Expected headers; each must be present with the recorded value.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Expected body, when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// One recorded consumer/provider interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Human-readable interaction description.
    pub description: String,
    /// v2 singular provider state.
    #[serde(
        default,
        rename = "providerState",
        skip_serializing_if = "Option::is_none"
    )]
    pub provider_state: Option<String>,
    /// v3 provider state list.
    #[serde(
        default,
        rename = "providerStates",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub provider_states: Vec<ProviderState>,
    /// Recorded request to replay.
    pub request: InteractionRequest,
    /// Expected response.
    pub response: InteractionResponse,
}

impl Interaction {
    /// Returns every provider-state name the interaction requires.
    ///
    /// The v3 list wins when both shapes are present.
    #[must_use]
    pub fn state_names(&self) -> Vec<&str> {
        if self.provider_states.is_empty() {
            return self.provider_state.as_deref().into_iter().collect();
        }
        self.provider_states.iter().map(|state| state.name.as_str()).collect()
    }
}

/// HAL link embedded in a pact document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalLink {
    /// Link target.
    pub href: String,
}

/// Published pact document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PactDocument {
    /// Consumer participant.
    pub consumer: Pacticipant,
    /// Provider participant.
    pub provider: Pacticipant,
    /// Recorded interactions.
    #[serde(default)]
    pub interactions: Vec<Interaction>,
    /// HAL links served by the broker.
    #[serde(default, rename = "_links", skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, HalLink>,
}

impl PactDocument {
    /// Looks up a HAL link href by relation name.
    #[must_use]
    pub fn link_href(&self, rel: &str) -> Option<&str> {
        self.links.get(rel).map(|link| link.href.as_str())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only panic-based assertions are permitted."
)]
mod tests {
    use super::Interaction;
    use super::PactDocument;

    /// Tests a v2 document with a singular provider state decodes.
    #[test]
    fn decodes_v2_singular_state() {
        let interaction: Interaction = serde_json::from_value(serde_json::json!({
            "description": "a request for a product",
            "providerState": "product exists for id",
            "request": { "method": "GET", "path": "/products/42" },
            "response": { "status": 200 }
        }))
        .unwrap();
        assert_eq!(interaction.state_names(), vec!["product exists for id"]);
    }

    /// Tests the v3 state list wins over the singular field.
    #[test]
    fn v3_state_list_wins() {
        let interaction: Interaction = serde_json::from_value(serde_json::json!({
            "description": "a bulk request",
            "providerState": "ignored",
            "providerStates": [{ "name": "first" }, { "name": "second" }],
            "request": { "method": "POST", "path": "/products/bulk" },
            "response": { "status": 400 }
        }))
        .unwrap();
        assert_eq!(interaction.state_names(), vec!["first", "second"]);
    }

    /// Tests an interaction without states yields no names.
    #[test]
    fn stateless_interaction_yields_no_names() {
        let interaction: Interaction = serde_json::from_value(serde_json::json!({
            "description": "create a product",
            "request": { "method": "POST", "path": "/products" },
            "response": { "status": 200 }
        }))
        .unwrap();
        assert!(interaction.state_names().is_empty());
    }

    /// Tests the publish link resolves through `_links`.
    #[test]
    fn publish_link_resolves() {
        let document: PactDocument = serde_json::from_value(serde_json::json!({
            "consumer": { "name": "web-client" },
            "provider": { "name": "ProductService" },
            "interactions": [],
            "_links": {
                "pb:publish-verification-results": {
                    "href": "http://localhost/publish"
                }
            }
        }))
        .unwrap();
        assert_eq!(
            document.link_href("pb:publish-verification-results"),
            Some("http://localhost/publish")
        );
    }
}
