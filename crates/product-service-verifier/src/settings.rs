// crates/product-service-verifier/src/settings.rs
// ============================================================================
// Module: Contract Settings
// Description: Run-scoped configuration for contract verification.
// Purpose: Collect environment input once and validate it before the run.
// Dependencies: thiserror, url
// ============================================================================

//! ## Overview
//! [`ContractSettings`] is constructed once per verification run, either from
//! the process environment or from an explicit lookup. No other component
//! reads environment state. Required fields are validated up front so a
//! blank provider or consumer name fails the run at startup instead of
//! degrading into a malformed pact URL.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Broker base URL used outside CI.
pub const LOCAL_BROKER_BASE_URL: &str = "http://localhost";

/// Provider name this harness verifies.
pub const PROVIDER_NAME: &str = "ProductService";

// ============================================================================
// SECTION: Settings Errors
// ============================================================================

/// Errors raised while validating contract settings.
///
/// # Invariants
/// - Validation failures are fatal to the run and never degraded into URLs
///   with empty path segments.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// A required setting is blank.
    #[error("required setting is blank: {0}")]
    MissingField(&'static str),
    /// The broker base URL could not be parsed.
    #[error("broker base url is invalid: {0}")]
    InvalidBrokerUrl(String),
}

// ============================================================================
// SECTION: Contract Settings
// ============================================================================

/// Immutable per-run settings for provider verification.
///
/// # Invariants
/// - Constructed once per run; components receive it by reference.
/// - When `consumer_version` is empty, resolution falls back to the latest
///   document on the default branch.
/// - `pact_url_override` always wins over broker-based resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractSettings {
    /// Host the provider serves on; joined with the bound port by
    /// [`Self::provider_base_url`].
    pub host: String,
    /// Provider name as published to the broker.
    pub provider_name: String,
    /// Base URL of the pact broker.
    pub broker_base_url: String,
    /// Consumer whose contract is verified.
    pub consumer_name: String,
    /// Consumer version pin; empty selects the latest document.
    pub consumer_version: String,
    /// Consumer tags carried for run reporting.
    ///
    /// Document selection is URL-based and already pins the tag in the
    /// resolved path (the latest shape targets `master`), so tags never
    /// influence which document is fetched; they are logged at run start.
    pub consumer_tags: Vec<String>,
    /// Provider version reported when publishing results.
    pub provider_version: String,
    /// Provider branch reported when publishing results.
    pub provider_branch: String,
    /// Bearer credential for broker API calls.
    pub broker_token: Option<String>,
    /// Explicit pact document URL; short-circuits resolution when set.
    pub pact_url_override: Option<String>,
    /// Whether verification results are published back to the broker.
    pub publish_results: bool,
}

impl ContractSettings {
    /// Builds settings from the process environment.
    ///
    /// This is the only place the harness reads environment state.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an explicit key lookup.
    ///
    /// The broker base URL defaults to [`LOCAL_BROKER_BASE_URL`] unless the
    /// `CI` flag is set, in which case `PACT_BROKER_BASE_URL` is used.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).unwrap_or_default();
        let broker_base_url = if get("CI") == "true" {
            get("PACT_BROKER_BASE_URL")
        } else {
            LOCAL_BROKER_BASE_URL.to_string()
        };
        Self {
            host: "localhost".to_string(),
            provider_name: PROVIDER_NAME.to_string(),
            broker_base_url,
            consumer_name: get("CONSUMER_NAME"),
            consumer_version: get("CONSUMER_VERSION"),
            consumer_tags: split_tags(&get("CONSUMER_TAGS")),
            provider_version: get("PROVIDER_VERSION"),
            provider_branch: get("PROVIDER_BRANCH"),
            broker_token: lookup("PACT_BROKER_TOKEN").filter(|token| !token.is_empty()),
            pact_url_override: lookup("PACT_URL").filter(|value| !value.is_empty()),
            publish_results: get("PACT_PUBLISH_RESULTS") == "true",
        }
    }

    /// Composes the provider base URL from the host and the bound port.
    ///
    /// The port is only known once the provider server is bound, so it is
    /// supplied by the caller rather than carried in the settings.
    #[must_use]
    pub fn provider_base_url(&self, port: u16) -> String {
        format!("http://{}:{port}", self.host)
    }

    /// Validates that every field required by the run is present.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingField`] when a required field is blank
    /// and [`SettingsError::InvalidBrokerUrl`] when the broker base URL does
    /// not parse.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.provider_name.is_empty() {
            return Err(SettingsError::MissingField("provider name"));
        }
        if self.pact_url_override.is_none() {
            if self.broker_base_url.is_empty() {
                return Err(SettingsError::MissingField("broker base url"));
            }
            if Url::parse(&self.broker_base_url).is_err() {
                return Err(SettingsError::InvalidBrokerUrl(self.broker_base_url.clone()));
            }
            if self.consumer_name.is_empty() {
                return Err(SettingsError::MissingField("consumer name"));
            }
        }
        if self.publish_results && self.provider_version.is_empty() {
            return Err(SettingsError::MissingField("provider version"));
        }
        Ok(())
    }
}

/// Splits a comma-separated tag list, dropping empty entries.
fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::ContractSettings;
    use super::SettingsError;

    /// Builds a key-value map standing in for the process environment.
    fn lookup_from(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(key, value)| ((*key).to_string(), (*value).to_string())).collect()
    }

    /// Builds settings from the given key-value pairs.
    fn settings_from(pairs: &[(&str, &str)]) -> ContractSettings {
        let map = lookup_from(pairs);
        ContractSettings::from_lookup(|key| map.get(key).cloned())
    }

    /// Tests the broker base URL defaults to localhost outside CI.
    #[test]
    fn broker_base_defaults_to_localhost_outside_ci() {
        let settings = settings_from(&[("PACT_BROKER_BASE_URL", "https://broker.example")]);
        assert_eq!(settings.broker_base_url, "http://localhost");
    }

    /// Tests the CI flag switches to the remote broker address.
    #[test]
    fn ci_flag_selects_remote_broker() {
        let settings = settings_from(&[
            ("CI", "true"),
            ("PACT_BROKER_BASE_URL", "https://broker.example"),
        ]);
        assert_eq!(settings.broker_base_url, "https://broker.example");
    }

    /// Tests the provider base URL joins the host with the bound port.
    #[test]
    fn provider_base_url_joins_host_and_port() {
        let settings = settings_from(&[]);
        assert_eq!(settings.provider_base_url(8007), "http://localhost:8007");
    }

    /// Tests tags split on commas and drop blanks.
    #[test]
    fn consumer_tags_split_on_commas() {
        let settings = settings_from(&[("CONSUMER_TAGS", "dev, staging,,prod")]);
        assert_eq!(settings.consumer_tags, vec!["dev", "staging", "prod"]);
    }

    /// Tests a blank consumer name fails validation when no override is set.
    #[test]
    fn validation_requires_consumer_name_without_override() {
        let settings = settings_from(&[]);
        assert_eq!(settings.validate(), Err(SettingsError::MissingField("consumer name")));
    }

    /// Tests an override URL relaxes broker and consumer requirements.
    #[test]
    fn validation_accepts_override_without_broker_fields() {
        let settings = settings_from(&[("PACT_URL", "https://broker.example/pact.json")]);
        assert_eq!(settings.validate(), Ok(()));
    }

    /// Tests publishing requires a provider version.
    #[test]
    fn validation_requires_provider_version_when_publishing() {
        let settings = settings_from(&[
            ("PACT_URL", "https://broker.example/pact.json"),
            ("PACT_PUBLISH_RESULTS", "true"),
        ]);
        assert_eq!(settings.validate(), Err(SettingsError::MissingField("provider version")));
    }

    /// Tests an unparseable broker base URL fails validation.
    #[test]
    fn validation_rejects_malformed_broker_url() {
        let settings = ContractSettings {
            broker_base_url: "not a url".to_string(),
            consumer_name: "web-client".to_string(),
            provider_name: "ProductService".to_string(),
            ..ContractSettings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::InvalidBrokerUrl("not a url".to_string()))
        );
    }
}
