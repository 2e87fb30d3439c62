// crates/product-service-core/src/service.rs
// ============================================================================
// Module: Product Service
// Description: Application service mapping repository output to wire DTOs.
// Purpose: Enforce domain error mapping between storage and the HTTP surface.
// Dependencies: product repository capability, tracing, uuid, time
// ============================================================================

//! ## Overview
//! [`ProductService`] owns the repository seam and maps its output onto wire
//! DTOs and stable error codes:
//! - absent single lookup → [`ProductError::NotFound`];
//! - incomplete bulk lookup → [`ProductError::OneOrMoreProductsNotFound`];
//! - backend failure → [`ProductError::Processing`], with the cause logged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ProductError;
use crate::model::Product;
use crate::model::ProductType;
use crate::repository::ProductRepository;
use crate::request::CreateProductRequest;
use crate::request::GetProductsByIdsRequest;
use crate::response::CreateProductResponse;
use crate::response::GetProductResponse;
use crate::response::GetProductsResponse;

// ============================================================================
// SECTION: Product Service
// ============================================================================

/// Application service for product operations.
///
/// # Invariants
/// - The repository handle is shared, never re-created per request.
#[derive(Clone)]
pub struct ProductService {
    /// Persistence capability.
    repository: Arc<dyn ProductRepository>,
}

impl ProductService {
    /// Creates a service over the given repository.
    #[must_use]
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self { repository }
    }

    /// Looks up a single product by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::NotFound`] when the product does not exist and
    /// [`ProductError::Processing`] on backend failure.
    pub async fn get_product_by_id(&self, id: &str) -> Result<GetProductResponse, ProductError> {
        let product = self.repository.get_product_by_id(id).await.map_err(|err| {
            tracing::error!(product_id = id, error = %err, "could not get product");
            ProductError::Processing
        })?;
        product.as_ref().map(GetProductResponse::from).ok_or(ProductError::NotFound)
    }

    /// Looks up products for the given identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::OneOrMoreProductsNotFound`] when any requested
    /// identifier did not resolve and [`ProductError::Processing`] on backend
    /// failure.
    pub async fn get_products_by_ids(
        &self,
        request: GetProductsByIdsRequest,
    ) -> Result<GetProductsResponse, ProductError> {
        let products = self.repository.get_products_by_ids(&request.ids).await.map_err(|err| {
            tracing::error!(error = %err, "could not get products");
            ProductError::Processing
        })?;
        if products.len() != request.ids.len() {
            return Err(ProductError::OneOrMoreProductsNotFound);
        }
        Ok(GetProductsResponse::from_products(&products))
    }

    /// Creates a product from the validated request.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::InvalidProductType`] when the type label is
    /// outside the vocabulary and [`ProductError::Processing`] on backend
    /// failure.
    pub async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<CreateProductResponse, ProductError> {
        let product_type = ProductType::from_label(&request.product_type)
            .ok_or(ProductError::InvalidProductType)?;
        let now = OffsetDateTime::now_utc();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: request.name,
            code: request.code,
            color: request.color,
            created_at: now,
            updated_at: now,
            buying_price: request.buying_price,
            selling_price: request.selling_price,
            image_url: request.image_url,
            product_type,
            provider: request.provider,
            creator: request.creator,
            distributor: request.distributor,
        };
        let stored = self.repository.create_product(product).await.map_err(|err| {
            tracing::error!(error = %err, "could not create product");
            ProductError::Processing
        })?;
        Ok(CreateProductResponse::from(&stored))
    }
}
