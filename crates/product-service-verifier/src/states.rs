// crates/product-service-verifier/src/states.rs
// ============================================================================
// Module: State Handler Registry
// Description: Named provider-state setup hooks for the verification engine.
// Purpose: Arrange mock expectations before each recorded interaction replays.
// Dependencies: fixture mock, thiserror
// ============================================================================

//! ## Overview
//! The verification engine invokes the handler registered under an
//! interaction's provider-state name immediately before replaying it. A
//! handler's only side effect is arming the shared mock; assertions happen
//! implicitly when a mismatched expectation fails the eventual HTTP
//! response. The registry is built once before the server starts and is
//! read-only afterwards.
//!
//! The multi-id success-path state ("all requested products exist") is a
//! known coverage gap inherited from the recorded contract and is not
//! installed by default; callers can register it externally.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use crate::fixture::BulkOutcome;
use crate::fixture::LookupOutcome;
use crate::fixture::MockProductRepository;
use crate::fixture::sample_product;

// ============================================================================
// SECTION: State Names
// ============================================================================

/// State: the single lookup resolves to a stored product.
pub const PRODUCT_EXISTS_STATE: &str = "product exists for id";

/// State: the single lookup resolves to no product.
pub const PRODUCT_DOES_NOT_EXIST_STATE: &str = "product does not exist for id";

/// State: the handler's own validation produces the failure; no arrangement.
pub const PRODUCT_BODY_PARSER_ERROR_STATE: &str = "body parser error - no id given";

/// State: the bulk lookup resolves fewer products than requested.
pub const PRODUCT_ONE_ID_MISSING_STATE: &str = "one of the requested ids does not exist";

// ============================================================================
// SECTION: Registry Errors
// ============================================================================

/// Errors raised while building the registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A state name was registered twice within one run.
    #[error("duplicate state handler: {0}")]
    DuplicateState(String),
}

/// Errors raised by a state setup hook.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StateHandlerError {
    /// The setup could not arrange the required state.
    #[error("state setup failed: {0}")]
    Setup(String),
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Zero-argument state setup hook.
pub type StateHandler = Arc<dyn Fn() -> Result<(), StateHandlerError> + Send + Sync>;

/// Hook invoked before every interaction, regardless of its states.
pub type BeforeEachHook = Arc<dyn Fn() -> Result<(), StateHandlerError> + Send + Sync>;

/// Mapping from provider-state name to its setup hook.
///
/// # Invariants
/// - State names are unique within one verification run.
/// - The mapping is read-only once verification starts; only the mock state
///   the hooks manipulate stays mutable.
#[derive(Default)]
pub struct StateHandlerRegistry {
    /// Registered hooks keyed by state name.
    handlers: BTreeMap<String, StateHandler>,
    /// Per-interaction expectation scoping hook.
    before_each: Option<BeforeEachHook>,
}

impl StateHandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a setup hook under the given state name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateState`] when the name is taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: StateHandler,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.handlers.contains_key(&name) {
            return Err(RegistryError::DuplicateState(name));
        }
        self.handlers.insert(name, handler);
        Ok(())
    }

    /// Installs the hook run before every interaction.
    pub fn set_before_each(&mut self, hook: BeforeEachHook) {
        self.before_each = Some(hook);
    }

    /// Runs the per-interaction hook, when installed.
    ///
    /// # Errors
    ///
    /// Returns [`StateHandlerError::Setup`] when the hook cannot restore the
    /// baseline state; the interaction must fail rather than replay against
    /// leaked expectations.
    pub fn run_before_each(&self) -> Result<(), StateHandlerError> {
        match &self.before_each {
            Some(hook) => hook(),
            None => Ok(()),
        }
    }

    /// Looks up the hook for a state name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StateHandler> {
        self.handlers.get(name)
    }

    /// Returns the registered state names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Returns the number of registered states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

// ============================================================================
// SECTION: Product States
// ============================================================================

/// Builds the registry for the product provider over the shared mock.
///
/// Every hook closes over the same mock instance the live server reads from
/// and replaces expectations rather than queueing them, so repeat
/// invocations for interactions sharing a state stay idempotent. The
/// registry's before-each hook resets the mock so expectations never leak
/// into unrelated interactions.
///
/// # Errors
///
/// Returns [`RegistryError::DuplicateState`] when a built-in state name
/// collides, which indicates a programming error in this module.
pub fn product_state_handlers(
    mock: &MockProductRepository,
) -> Result<StateHandlerRegistry, RegistryError> {
    let mut registry = StateHandlerRegistry::new();

    let reset_mock = mock.clone();
    registry.set_before_each(Arc::new(move || {
        reset_mock.reset().map_err(|err| StateHandlerError::Setup(err.to_string()))
    }));

    let exists_mock = mock.clone();
    registry.register(
        PRODUCT_EXISTS_STATE,
        Arc::new(move || {
            exists_mock
                .expect_get_product_by_id(LookupOutcome::Found(sample_product(None)))
                .map_err(|err| StateHandlerError::Setup(err.to_string()))
        }),
    )?;

    let missing_mock = mock.clone();
    registry.register(
        PRODUCT_DOES_NOT_EXIST_STATE,
        Arc::new(move || {
            missing_mock
                .expect_get_product_by_id(LookupOutcome::NotFound)
                .map_err(|err| StateHandlerError::Setup(err.to_string()))
        }),
    )?;

    // The failure is produced by handler-layer validation; nothing to arm.
    registry.register(PRODUCT_BODY_PARSER_ERROR_STATE, Arc::new(|| Ok(())))?;

    let partial_mock = mock.clone();
    registry.register(
        PRODUCT_ONE_ID_MISSING_STATE,
        Arc::new(move || {
            partial_mock
                .expect_get_products_by_ids(BulkOutcome::Products(vec![]))
                .map_err(|err| StateHandlerError::Setup(err.to_string()))
        }),
    )?;

    Ok(registry)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only panic-based assertions are permitted."
)]
mod tests {
    use std::sync::Arc;

    use product_service_core::ProductRepository;

    use super::PRODUCT_DOES_NOT_EXIST_STATE;
    use super::PRODUCT_EXISTS_STATE;
    use super::RegistryError;
    use super::StateHandlerError;
    use super::StateHandlerRegistry;
    use super::product_state_handlers;
    use crate::fixture::MockProductRepository;

    /// Tests the built-in registry carries the four recorded states.
    #[test]
    fn built_in_registry_carries_recorded_states() {
        let mock = MockProductRepository::new();
        let registry = product_state_handlers(&mock).unwrap();
        assert_eq!(registry.len(), 4);
        assert!(registry.get(PRODUCT_EXISTS_STATE).is_some());
    }

    /// Tests duplicate registration is rejected.
    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = StateHandlerRegistry::new();
        registry.register("some state", Arc::new(|| Ok(()))).unwrap();
        let err = registry.register("some state", Arc::new(|| Ok(()))).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateState("some state".to_string()));
    }

    /// Tests repeated setup invocations stay idempotent.
    #[tokio::test]
    async fn state_setups_are_idempotent() {
        let mock = MockProductRepository::new();
        let registry = product_state_handlers(&mock).unwrap();
        let handler = registry.get(PRODUCT_DOES_NOT_EXIST_STATE).unwrap();
        handler().unwrap();
        handler().unwrap();
        assert_eq!(mock.get_product_by_id("any").await, Ok(None));
    }

    /// Tests the before-each hook clears leaked expectations.
    #[tokio::test]
    async fn before_each_hook_resets_expectations() {
        let mock = MockProductRepository::new();
        let registry = product_state_handlers(&mock).unwrap();
        registry.get(PRODUCT_EXISTS_STATE).unwrap()().unwrap();
        registry.run_before_each().unwrap();
        assert!(mock.get_product_by_id("any").await.is_err());
    }

    /// Tests a failing before-each hook propagates instead of vanishing.
    #[test]
    fn failing_before_each_hook_propagates() {
        let mut registry = StateHandlerRegistry::new();
        registry.set_before_each(Arc::new(|| {
            Err(StateHandlerError::Setup("baseline reset failed".to_string()))
        }));
        assert_eq!(
            registry.run_before_each(),
            Err(StateHandlerError::Setup("baseline reset failed".to_string()))
        );
    }

    /// Tests a poisoned mock turns state setup into a setup error.
    #[test]
    fn poisoned_mock_fails_state_setup() {
        let mock = MockProductRepository::new();
        let registry = product_state_handlers(&mock).unwrap();
        mock.poison();

        let err = registry.get(PRODUCT_EXISTS_STATE).unwrap()().unwrap_err();
        let StateHandlerError::Setup(reason) = err;
        assert!(reason.contains("poisoned"));
        assert!(registry.run_before_each().is_err());
    }
}
