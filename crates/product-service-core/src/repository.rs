// crates/product-service-core/src/repository.rs
// ============================================================================
// Module: Product Repository Capability
// Description: Persistence seam for product storage.
// Purpose: Provide a dyn-compatible capability so stores and test doubles interchange.
// Dependencies: async-trait, thiserror
// ============================================================================

//! ## Overview
//! The persistence capability consumed by [`crate::ProductService`]. Absence
//! is data, not failure: a missing row is `Ok(None)` and a bulk lookup
//! returns only the rows it found. [`RepositoryError`] is reserved for
//! infrastructure failures.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use thiserror::Error;

use crate::model::Product;

// ============================================================================
// SECTION: Repository Errors
// ============================================================================

/// Errors returned by repository implementations.
///
/// # Invariants
/// - Absent rows are never reported as errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// The backing store failed.
    #[error("repository backend failure: {0}")]
    Backend(String),
}

// ============================================================================
// SECTION: Repository Capability
// ============================================================================

/// Persistence capability for products.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Looks up a single product by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Backend`] when the store fails.
    async fn get_product_by_id(&self, id: &str) -> Result<Option<Product>, RepositoryError>;

    /// Looks up products for the given identifiers, returning only the rows found.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Backend`] when the store fails.
    async fn get_products_by_ids(&self, ids: &[String]) -> Result<Vec<Product>, RepositoryError>;

    /// Persists a product and returns the stored record with timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Backend`] when the store fails.
    async fn create_product(&self, product: Product) -> Result<Product, RepositoryError>;
}
