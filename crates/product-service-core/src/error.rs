// crates/product-service-core/src/error.rs
// ============================================================================
// Module: Product Errors
// Description: Stable error codes and the wire error body.
// Purpose: Provide the error vocabulary consumers assert against.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Domain error vocabulary with stable numeric codes. Consumers of the HTTP
//! surface match on `code`, so codes must never be renumbered. All domain
//! errors map to HTTP 400 at the handler layer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Error Codes
// ============================================================================

/// A processing failure occurred while handling the request.
pub const PROCESSING: u32 = 10001;
/// The request body could not be parsed.
pub const BODY_PARSER: u32 = 10002;
/// No product exists for the given identifier.
pub const PRODUCT_NOT_FOUND: u32 = 20001;
/// A bulk lookup was issued without any product identifiers.
pub const AT_LEAST_ONE_PRODUCT_ID_IS_REQUIRED: u32 = 20002;
/// At least one identifier in a bulk lookup did not resolve.
pub const ONE_OR_MORE_PRODUCTS_NOT_FOUND: u32 = 20003;
/// Product creation was issued without a product type.
pub const PRODUCT_TYPE_IS_REQUIRED: u32 = 20004;
/// Product creation was issued with an unknown product type.
pub const INVALID_PRODUCT_TYPE: u32 = 20005;

// ============================================================================
// SECTION: Wire Error Body
// ============================================================================

/// JSON error body returned by the HTTP surface.
///
/// # Invariants
/// - Field names are stable wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable numeric error code.
    pub code: u32,
    /// Human-readable message.
    pub message: String,
}

// ============================================================================
// SECTION: Product Error
// ============================================================================

/// Errors surfaced by the product service and handler layers.
///
/// # Invariants
/// - Every variant carries exactly one stable error code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProductError {
    /// No product exists for the given identifier.
    #[error("Product not found.")]
    NotFound,
    /// A bulk lookup was issued without any product identifiers.
    #[error("At least one product id must be given.")]
    AtLeastOneProductIdRequired,
    /// At least one identifier in a bulk lookup did not resolve.
    #[error("At least one of given product ids does not exist.")]
    OneOrMoreProductsNotFound,
    /// Product creation was issued without a product type.
    #[error("Product type is required.")]
    ProductTypeRequired,
    /// Product creation was issued with an unknown product type.
    #[error("Invalid product type.")]
    InvalidProductType,
    /// The request body could not be parsed.
    #[error("Could not parse request body.")]
    BodyParser,
    /// A processing failure occurred while handling the request.
    #[error("An error occurred while processing the request.")]
    Processing,
}

impl ProductError {
    /// Returns the stable numeric code for the error.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            Self::NotFound => PRODUCT_NOT_FOUND,
            Self::AtLeastOneProductIdRequired => AT_LEAST_ONE_PRODUCT_ID_IS_REQUIRED,
            Self::OneOrMoreProductsNotFound => ONE_OR_MORE_PRODUCTS_NOT_FOUND,
            Self::ProductTypeRequired => PRODUCT_TYPE_IS_REQUIRED,
            Self::InvalidProductType => INVALID_PRODUCT_TYPE,
            Self::BodyParser => BODY_PARSER,
            Self::Processing => PROCESSING,
        }
    }

    /// Builds the wire error body for the error.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code(),
            message: self.to_string(),
        }
    }
}
