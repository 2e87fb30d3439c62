// crates/product-service-core/src/lib.rs
// ============================================================================
// Module: Product Service Core Library
// Description: Domain model, repository capability, and service layer.
// Purpose: Provide the product domain consumed by the HTTP and verifier crates.
// Dependencies: async-trait, serde, thiserror, time, uuid
// ============================================================================

//! ## Overview
//! Core product domain: the [`Product`] model, the [`ProductRepository`]
//! capability seam, and the [`ProductService`] that maps repository output to
//! wire DTOs and stable error codes.
//! Invariants:
//! - Error codes are stable for programmatic handling by consumers.
//! - Absent rows are modeled as `Ok(None)` / short lists, never as errors.
//! - The repository seam is dyn-compatible so test doubles can stand in.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod error;
pub mod model;
pub mod repository;
pub mod request;
pub mod response;
pub mod service;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::AT_LEAST_ONE_PRODUCT_ID_IS_REQUIRED;
pub use error::BODY_PARSER;
pub use error::ErrorBody;
pub use error::INVALID_PRODUCT_TYPE;
pub use error::ONE_OR_MORE_PRODUCTS_NOT_FOUND;
pub use error::PROCESSING;
pub use error::PRODUCT_NOT_FOUND;
pub use error::PRODUCT_TYPE_IS_REQUIRED;
pub use error::ProductError;
pub use model::Product;
pub use model::ProductType;
pub use repository::ProductRepository;
pub use repository::RepositoryError;
pub use request::CreateProductRequest;
pub use request::GetProductsByIdsRequest;
pub use response::CreateProductResponse;
pub use response::GetProductResponse;
pub use response::GetProductsResponse;
pub use service::ProductService;
