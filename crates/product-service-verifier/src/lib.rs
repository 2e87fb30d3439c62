// crates/product-service-verifier/src/lib.rs
// ============================================================================
// Module: Product Service Verifier Library
// Description: Provider-side consumer-driven contract verification harness.
// Purpose: Resolve, replay, and report pact contract verification runs.
// Dependencies: axum, product-service-core, product-service-http, reqwest, tokio
// ============================================================================

//! ## Overview
//! Provider-side CDC verification harness for the product service. The
//! harness resolves which published pact document to verify, boots a live
//! provider whose persistence seam is a programmable mock, exposes named
//! provider-state setup hooks, replays every recorded interaction against
//! the live server, and reports per-interaction pass/fail.
//! Invariants:
//! - Environment state is read once, at [`ContractSettings`] construction.
//! - State setup always precedes the corresponding replayed request;
//!   interactions are replayed serially, never concurrently.
//! - A pact document with zero interactions is a hard failure.
//! - Broker-communication failures are distinguished from interaction
//!   mismatches in the error taxonomy.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod document;
pub mod engine;
pub mod fixture;
pub mod orchestrator;
pub mod resolver;
pub mod server;
pub mod settings;
pub mod states;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use document::HalLink;
pub use document::Interaction;
pub use document::InteractionRequest;
pub use document::InteractionResponse;
pub use document::PactDocument;
pub use document::Pacticipant;
pub use document::ProviderState;
pub use engine::EngineError;
pub use engine::PUBLISH_VERIFICATION_RESULTS_REL;
pub use engine::PublishReport;
pub use engine::VerificationEngine;
pub use engine::VerificationResult;
pub use fixture::BulkOutcome;
pub use fixture::CreateOutcome;
pub use fixture::FixtureError;
pub use fixture::LookupOutcome;
pub use fixture::MockProductRepository;
pub use fixture::ProviderFixture;
pub use fixture::sample_product;
pub use orchestrator::VerificationOutcome;
pub use orchestrator::VerifyError;
pub use orchestrator::verify_provider;
pub use resolver::resolve_pact_url;
pub use server::ProviderServerError;
pub use server::ProviderServerHandle;
pub use server::spawn_provider;
pub use settings::ContractSettings;
pub use settings::LOCAL_BROKER_BASE_URL;
pub use settings::PROVIDER_NAME;
pub use settings::SettingsError;
pub use states::BeforeEachHook;
pub use states::PRODUCT_BODY_PARSER_ERROR_STATE;
pub use states::PRODUCT_DOES_NOT_EXIST_STATE;
pub use states::PRODUCT_EXISTS_STATE;
pub use states::PRODUCT_ONE_ID_MISSING_STATE;
pub use states::RegistryError;
pub use states::StateHandler;
pub use states::StateHandlerError;
pub use states::StateHandlerRegistry;
pub use states::product_state_handlers;
