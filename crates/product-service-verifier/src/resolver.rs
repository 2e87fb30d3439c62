// crates/product-service-verifier/src/resolver.rs
// ============================================================================
// Module: Contract Location Resolver
// Description: Pure pact-URL construction from contract settings.
// Purpose: Compute which published pact document a run verifies.
// Dependencies: contract settings
// ============================================================================

//! ## Overview
//! Resolution precedence, first match wins:
//! 1. an explicit override URL is returned unmodified;
//! 2. an empty consumer version selects the latest document on the default
//!    branch;
//! 3. otherwise the version-pinned document is selected.
//!
//! The resolver performs no network calls and no validation; blank required
//! fields are rejected earlier by [`ContractSettings::validate`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::settings::ContractSettings;

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves the pact document URL for the run.
#[must_use]
pub fn resolve_pact_url(settings: &ContractSettings) -> String {
    if let Some(url) = &settings.pact_url_override {
        return url.clone();
    }
    if settings.consumer_version.is_empty() {
        return format!(
            "{}/pacts/provider/{}/consumer/{}/latest/master.json",
            settings.broker_base_url, settings.provider_name, settings.consumer_name
        );
    }
    format!(
        "{}/pacts/provider/{}/consumer/{}/version/{}.json",
        settings.broker_base_url,
        settings.provider_name,
        settings.consumer_name,
        settings.consumer_version
    )
}

#[cfg(test)]
mod tests {
    use super::resolve_pact_url;
    use crate::settings::ContractSettings;

    /// Builds settings with the broker fields a resolution needs.
    fn base_settings() -> ContractSettings {
        ContractSettings {
            provider_name: "ProductService".to_string(),
            broker_base_url: "http://localhost".to_string(),
            consumer_name: "web-client".to_string(),
            ..ContractSettings::default()
        }
    }

    /// Tests the override URL wins regardless of other fields.
    #[test]
    fn override_url_wins() {
        let settings = ContractSettings {
            pact_url_override: Some("https://broker.example/custom.json".to_string()),
            consumer_version: "1.2.3".to_string(),
            ..base_settings()
        };
        assert_eq!(resolve_pact_url(&settings), "https://broker.example/custom.json");
    }

    /// Tests an empty consumer version selects the latest document shape.
    #[test]
    fn empty_consumer_version_selects_latest() {
        let settings = base_settings();
        assert_eq!(
            resolve_pact_url(&settings),
            "http://localhost/pacts/provider/ProductService/consumer/web-client/latest/master.json"
        );
    }

    /// Tests a pinned consumer version selects the version shape.
    #[test]
    fn pinned_consumer_version_selects_versioned_document() {
        let settings = ContractSettings {
            consumer_version: "6f2a9c1".to_string(),
            ..base_settings()
        };
        assert_eq!(
            resolve_pact_url(&settings),
            "http://localhost/pacts/provider/ProductService/consumer/web-client/version/6f2a9c1.json"
        );
    }

    /// Tests the two broker shapes are mutually exclusive for one input.
    #[test]
    fn latest_and_versioned_shapes_never_overlap() {
        let latest = resolve_pact_url(&base_settings());
        let pinned = resolve_pact_url(&ContractSettings {
            consumer_version: "1.0.0".to_string(),
            ..base_settings()
        });
        assert!(latest.contains("/latest/master.json"));
        assert!(pinned.contains("/version/1.0.0.json"));
        assert_ne!(latest, pinned);
    }
}
