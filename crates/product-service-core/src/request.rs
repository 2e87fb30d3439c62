// crates/product-service-core/src/request.rs
// ============================================================================
// Module: Product Requests
// Description: Inbound request DTOs and their validation.
// Purpose: Decode and validate the HTTP request bodies for product operations.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Inbound DTOs for the product routes. Validation runs before any
//! repository interaction and surfaces domain error codes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::error::ProductError;
use crate::model::ProductType;

// ============================================================================
// SECTION: Bulk Lookup Request
// ============================================================================

/// Body of `POST /products/bulk`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetProductsByIdsRequest {
    /// Identifiers to resolve.
    #[serde(default)]
    pub ids: Vec<String>,
}

impl GetProductsByIdsRequest {
    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::AtLeastOneProductIdRequired`] when `ids` is empty.
    pub fn validate(&self) -> Result<(), ProductError> {
        if self.ids.is_empty() {
            return Err(ProductError::AtLeastOneProductIdRequired);
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Create Request
// ============================================================================

/// Body of `POST /products`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateProductRequest {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Internal product code.
    #[serde(default)]
    pub code: String,
    /// Color label.
    #[serde(default)]
    pub color: String,
    /// Acquisition price.
    #[serde(default)]
    pub buying_price: f64,
    /// Listed price.
    #[serde(default)]
    pub selling_price: f64,
    /// Image location.
    #[serde(default)]
    pub image_url: String,
    /// Product type label.
    #[serde(default, rename = "type")]
    pub product_type: String,
    /// Supplying provider name.
    #[serde(default)]
    pub provider: String,
    /// Creator name.
    #[serde(default)]
    pub creator: String,
    /// Distributor name.
    #[serde(default)]
    pub distributor: String,
}

impl CreateProductRequest {
    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::ProductTypeRequired`] when the type is absent
    /// and [`ProductError::InvalidProductType`] when it is outside the
    /// vocabulary.
    pub fn validate(&self) -> Result<(), ProductError> {
        if self.product_type.is_empty() {
            return Err(ProductError::ProductTypeRequired);
        }
        if ProductType::from_label(&self.product_type).is_none() {
            return Err(ProductError::InvalidProductType);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only panic-based assertions are permitted."
)]
mod tests {
    use super::CreateProductRequest;
    use super::GetProductsByIdsRequest;
    use crate::error::ProductError;

    /// Tests an empty id list is rejected before any lookup.
    #[test]
    fn bulk_request_requires_at_least_one_id() {
        let request = GetProductsByIdsRequest { ids: vec![] };
        assert_eq!(request.validate(), Err(ProductError::AtLeastOneProductIdRequired));

        let request = GetProductsByIdsRequest {
            ids: vec!["a".to_string()],
        };
        assert_eq!(request.validate(), Ok(()));
    }

    /// Tests a missing ids field decodes to an empty list.
    #[test]
    fn bulk_request_defaults_missing_ids() {
        let request: GetProductsByIdsRequest = serde_json::from_str("{}").unwrap();
        assert!(request.ids.is_empty());
    }

    /// Tests create validation covers missing and unknown types.
    #[test]
    fn create_request_validates_product_type() {
        let mut request = CreateProductRequest::default();
        assert_eq!(request.validate(), Err(ProductError::ProductTypeRequired));

        request.product_type = "spaceship".to_string();
        assert_eq!(request.validate(), Err(ProductError::InvalidProductType));

        request.product_type = "bag".to_string();
        assert_eq!(request.validate(), Ok(()));
    }
}
