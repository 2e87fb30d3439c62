// crates/product-service-verifier/src/orchestrator.rs
// ============================================================================
// Module: Verification Orchestrator
// Description: Single-entry orchestration of one provider verification run.
// Purpose: Resolve, replay, aggregate, and publish one pass/fail outcome.
// Dependencies: engine, resolver, settings, state handler registry
// ============================================================================

//! ## Overview
//! [`verify_provider`] drives the engine once per run: validate settings,
//! resolve the pact document location, replay every interaction against the
//! live provider, and aggregate a single outcome. A document with zero
//! interactions is a hard failure, and results are published back to the
//! broker when the run is configured to do so. Nothing is retried;
//! verification is expected to be deterministic given correctly arranged
//! state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::engine::EngineError;
use crate::engine::PublishReport;
use crate::engine::VerificationEngine;
use crate::engine::VerificationResult;
use crate::resolver::resolve_pact_url;
use crate::settings::ContractSettings;
use crate::settings::SettingsError;
use crate::states::StateHandlerRegistry;

// ============================================================================
// SECTION: Verify Errors
// ============================================================================

/// Terminal errors of a verification run.
///
/// # Invariants
/// - Broker-communication failures and interaction mismatches are distinct
///   variants; reporting never conflates them.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Run configuration is invalid.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// Broker communication failed.
    #[error(transparent)]
    Broker(#[from] EngineError),
    /// The pact document contains no interactions.
    #[error("pact document contains no interactions")]
    NoInteractions,
    /// One or more interactions failed verification.
    #[error("{failed} of {total} interactions failed verification")]
    InteractionFailures {
        /// Number of failed interactions.
        failed: usize,
        /// Total interactions attempted.
        total: usize,
        /// Failed results with their mismatch details.
        results: Vec<VerificationResult>,
    },
}

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Aggregated outcome of a successful verification run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOutcome {
    /// Total interactions attempted.
    pub total: usize,
    /// Per-interaction results, in document order.
    pub results: Vec<VerificationResult>,
}

// ============================================================================
// SECTION: Orchestration
// ============================================================================

/// Runs one provider verification pass against the live base URL.
///
/// # Errors
///
/// Returns [`VerifyError::Settings`] on invalid configuration,
/// [`VerifyError::Broker`] on broker-communication failure,
/// [`VerifyError::NoInteractions`] when the document is empty, and
/// [`VerifyError::InteractionFailures`] when any interaction mismatched.
pub async fn verify_provider(
    settings: &ContractSettings,
    registry: &StateHandlerRegistry,
    provider_base_url: &str,
) -> Result<VerificationOutcome, VerifyError> {
    settings.validate()?;
    let pact_url = resolve_pact_url(settings);
    tracing::info!(
        %pact_url,
        provider = %settings.provider_name,
        consumer = %settings.consumer_name,
        tags = ?settings.consumer_tags,
        "starting provider verification"
    );

    let engine = VerificationEngine::new(settings.broker_token.clone());
    let document = engine.fetch_document(&pact_url).await?;
    if document.interactions.is_empty() {
        return Err(VerifyError::NoInteractions);
    }

    let results = engine.replay(&document, provider_base_url, registry).await;
    let total = results.len();
    let failed: Vec<VerificationResult> =
        results.iter().filter(|result| !result.passed).cloned().collect();
    let success = failed.is_empty();

    if settings.publish_results {
        let report = PublishReport {
            success,
            provider_version: settings.provider_version.clone(),
            provider_branch: settings.provider_branch.clone(),
        };
        engine.publish_results(&document, &report).await?;
    }

    tracing::info!(total, failed = failed.len(), "provider verification finished");
    if !success {
        return Err(VerifyError::InteractionFailures {
            failed: failed.len(),
            total,
            results: failed,
        });
    }
    Ok(VerificationOutcome { total, results })
}
