// crates/product-service-verifier/src/fixture.rs
// ============================================================================
// Module: Provider Fixture
// Description: Programmable repository mock and wired provider fixture.
// Purpose: Boot a real provider whose persistence seam is scripted per state.
// Dependencies: async-trait, axum, product-service-core, product-service-http
// ============================================================================

//! ## Overview
//! [`MockProductRepository`] is the programmable stand-in for the persistence
//! collaborator. Expectations are replace-on-set, so state setups stay
//! idempotent when the verification engine invokes them more than once, and
//! [`MockProductRepository::reset`] clears them between interactions. A call
//! with no expectation set fails as a backend error naming the unexpected
//! call; the mismatch surfaces through the HTTP response, never through an
//! in-handler assertion. A poisoned expectation lock is surfaced from every
//! accessor, setters included, so a failed arrangement cannot masquerade as
//! an armed state.
//!
//! [`ProviderFixture`] wires mock, service, and router so the mock handle it
//! hands out is the same instance the served requests observe.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use async_trait::async_trait;
use axum::Router;
use product_service_core::Product;
use product_service_core::ProductRepository;
use product_service_core::ProductService;
use product_service_core::ProductType;
use product_service_core::RepositoryError;
use product_service_http::product_router;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

// ============================================================================
// SECTION: Fixture Errors
// ============================================================================

/// Errors raised while manipulating the mock's expectation state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FixtureError {
    /// The expectation lock was poisoned by a panicking holder.
    #[error("mock expectation state poisoned")]
    Poisoned,
}

// ============================================================================
// SECTION: Scripted Outcomes
// ============================================================================

/// Scripted outcome of a single lookup.
#[derive(Debug, Clone)]
pub enum LookupOutcome {
    /// The lookup resolves to a stored product.
    Found(Product),
    /// The lookup resolves to no product.
    NotFound,
    /// The backing store fails.
    Backend(String),
}

/// Scripted outcome of a bulk lookup.
#[derive(Debug, Clone)]
pub enum BulkOutcome {
    /// The lookup resolves to the given products (possibly fewer than asked).
    Products(Vec<Product>),
    /// The backing store fails.
    Backend(String),
}

/// Scripted outcome of a create call.
#[derive(Debug, Clone)]
pub enum CreateOutcome {
    /// The store echoes the product it was handed.
    Echo,
    /// The store answers with the given stored record.
    Stored(Product),
    /// The backing store fails.
    Backend(String),
}

/// Expectations currently armed on the mock.
#[derive(Debug, Clone, Default)]
struct Expectations {
    /// Armed single-lookup outcome.
    get_product_by_id: Option<LookupOutcome>,
    /// Armed bulk-lookup outcome.
    get_products_by_ids: Option<BulkOutcome>,
    /// Armed create outcome.
    create_product: Option<CreateOutcome>,
}

// ============================================================================
// SECTION: Mock Repository
// ============================================================================

/// Programmable repository mock shared between state setups and the server.
///
/// # Invariants
/// - Cloning shares the same expectation state.
/// - Expectation setters replace, never queue, so setups are idempotent.
#[derive(Debug, Clone, Default)]
pub struct MockProductRepository {
    /// Shared expectation state.
    expectations: Arc<Mutex<Expectations>>,
}

impl MockProductRepository {
    /// Creates a mock with no expectations armed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the single-lookup outcome, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Poisoned`] when the expectation lock is
    /// poisoned; the outcome is not armed in that case.
    pub fn expect_get_product_by_id(&self, outcome: LookupOutcome) -> Result<(), FixtureError> {
        self.armed()?.get_product_by_id = Some(outcome);
        Ok(())
    }

    /// Arms the bulk-lookup outcome, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Poisoned`] when the expectation lock is
    /// poisoned; the outcome is not armed in that case.
    pub fn expect_get_products_by_ids(&self, outcome: BulkOutcome) -> Result<(), FixtureError> {
        self.armed()?.get_products_by_ids = Some(outcome);
        Ok(())
    }

    /// Arms the create outcome, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Poisoned`] when the expectation lock is
    /// poisoned; the outcome is not armed in that case.
    pub fn expect_create_product(&self, outcome: CreateOutcome) -> Result<(), FixtureError> {
        self.armed()?.create_product = Some(outcome);
        Ok(())
    }

    /// Clears every armed expectation.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Poisoned`] when the expectation lock is
    /// poisoned.
    pub fn reset(&self) -> Result<(), FixtureError> {
        *self.armed()? = Expectations::default();
        Ok(())
    }

    /// Locks the expectation state, surfacing poisoning instead of hiding it.
    fn armed(&self) -> Result<MutexGuard<'_, Expectations>, FixtureError> {
        self.expectations.lock().map_err(|_| FixtureError::Poisoned)
    }

    /// Reads a snapshot of the armed expectations.
    fn snapshot(&self) -> Result<Expectations, RepositoryError> {
        self.armed()
            .map(|guard| guard.clone())
            .map_err(|err| RepositoryError::Backend(err.to_string()))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only lock poisoning requires a panicking holder."
)]
impl MockProductRepository {
    /// Poisons the expectation lock by panicking while holding it.
    pub(crate) fn poison(&self) {
        let poisoner = self.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.expectations.lock().unwrap();
            panic!("poison the expectation lock");
        })
        .join();
    }
}

#[async_trait]
impl ProductRepository for MockProductRepository {
    async fn get_product_by_id(&self, id: &str) -> Result<Option<Product>, RepositoryError> {
        match self.snapshot()?.get_product_by_id {
            Some(LookupOutcome::Found(product)) => Ok(Some(product)),
            Some(LookupOutcome::NotFound) => Ok(None),
            Some(LookupOutcome::Backend(reason)) => Err(RepositoryError::Backend(reason)),
            None => Err(RepositoryError::Backend(format!(
                "unexpected call: get_product_by_id({id})"
            ))),
        }
    }

    async fn get_products_by_ids(&self, ids: &[String]) -> Result<Vec<Product>, RepositoryError> {
        match self.snapshot()?.get_products_by_ids {
            Some(BulkOutcome::Products(products)) => Ok(products),
            Some(BulkOutcome::Backend(reason)) => Err(RepositoryError::Backend(reason)),
            None => Err(RepositoryError::Backend(format!(
                "unexpected call: get_products_by_ids({} ids)",
                ids.len()
            ))),
        }
    }

    async fn create_product(&self, product: Product) -> Result<Product, RepositoryError> {
        match self.snapshot()?.create_product {
            Some(CreateOutcome::Echo) => Ok(product),
            Some(CreateOutcome::Stored(stored)) => Ok(stored),
            Some(CreateOutcome::Backend(reason)) => Err(RepositoryError::Backend(reason)),
            None => Err(RepositoryError::Backend("unexpected call: create_product".to_string())),
        }
    }
}

// ============================================================================
// SECTION: Provider Fixture
// ============================================================================

/// Fully wired provider whose persistence seam is the shared mock.
///
/// # Invariants
/// - The mock handle returned by [`ProviderFixture::mock`] shares state with
///   the repository the router serves from.
pub struct ProviderFixture {
    /// Router serving the product routes over the mock.
    router: Router,
    /// Shared mock handle.
    mock: MockProductRepository,
}

impl ProviderFixture {
    /// Wires mock, service, and router.
    #[must_use]
    pub fn new() -> Self {
        let mock = MockProductRepository::new();
        let service = ProductService::new(Arc::new(mock.clone()));
        Self {
            router: product_router(service),
            mock,
        }
    }

    /// Returns a handle to the shared mock.
    #[must_use]
    pub fn mock(&self) -> MockProductRepository {
        self.mock.clone()
    }

    /// Consumes the fixture and returns the router to serve.
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }
}

impl Default for ProviderFixture {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SECTION: Sample Data
// ============================================================================

/// Builds a fully populated product for state setups.
///
/// A fresh identifier is generated when `id` is `None`.
#[must_use]
pub fn sample_product(id: Option<&str>) -> Product {
    let now = OffsetDateTime::now_utc();
    Product {
        id: id.map_or_else(|| Uuid::new_v4().to_string(), str::to_string),
        name: "Canvas Tote".to_string(),
        code: "BAG-104".to_string(),
        color: "olive".to_string(),
        created_at: now,
        updated_at: now,
        buying_price: 18.0,
        selling_price: 44.5,
        image_url: "https://cdn.example/products/bag-104.png".to_string(),
        product_type: ProductType::Bag,
        provider: "Northwind".to_string(),
        creator: "Northwind Studio".to_string(),
        distributor: "Northwind Logistics".to_string(),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only panic-based assertions are permitted."
)]
mod tests {
    use product_service_core::ProductRepository;
    use product_service_core::RepositoryError;

    use super::BulkOutcome;
    use super::FixtureError;
    use super::LookupOutcome;
    use super::MockProductRepository;
    use super::ProviderFixture;
    use super::sample_product;

    /// Tests cloned handles share expectation state.
    #[tokio::test]
    async fn cloned_handles_share_expectations() {
        let fixture = ProviderFixture::new();
        let handle = fixture.mock();
        handle
            .expect_get_product_by_id(LookupOutcome::Found(sample_product(Some("p-1"))))
            .unwrap();

        let other = fixture.mock();
        let product = other.get_product_by_id("p-1").await.unwrap();
        assert_eq!(product.unwrap().id, "p-1");
    }

    /// Tests setters replace rather than queue outcomes.
    #[tokio::test]
    async fn expectation_setters_replace() {
        let mock = MockProductRepository::new();
        mock.expect_get_product_by_id(LookupOutcome::Backend("boom".to_string())).unwrap();
        mock.expect_get_product_by_id(LookupOutcome::NotFound).unwrap();

        assert_eq!(mock.get_product_by_id("p-1").await, Ok(None));
        // Non-consuming: the armed outcome survives repeated calls.
        assert_eq!(mock.get_product_by_id("p-1").await, Ok(None));
    }

    /// Tests an unarmed call surfaces as a backend error naming the call.
    #[tokio::test]
    async fn unarmed_call_fails_with_unexpected_call() {
        let mock = MockProductRepository::new();
        let err = mock.get_products_by_ids(&["a".to_string()]).await.unwrap_err();
        let RepositoryError::Backend(reason) = err;
        assert!(reason.contains("unexpected call"));
    }

    /// Tests reset clears every armed expectation.
    #[tokio::test]
    async fn reset_clears_expectations() {
        let mock = MockProductRepository::new();
        mock.expect_get_products_by_ids(BulkOutcome::Products(vec![])).unwrap();
        mock.reset().unwrap();
        assert!(mock.get_products_by_ids(&[]).await.is_err());
    }

    /// Tests a poisoned lock is surfaced by setters and repository calls.
    #[tokio::test]
    async fn poisoned_lock_is_surfaced_not_swallowed() {
        let mock = MockProductRepository::new();
        mock.poison();

        assert_eq!(
            mock.expect_get_product_by_id(LookupOutcome::NotFound),
            Err(FixtureError::Poisoned)
        );
        assert_eq!(mock.reset(), Err(FixtureError::Poisoned));
        let RepositoryError::Backend(reason) = mock.get_product_by_id("p-1").await.unwrap_err();
        assert!(reason.contains("poisoned"));
    }
}
