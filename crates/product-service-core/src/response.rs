// crates/product-service-core/src/response.rs
// ============================================================================
// Module: Product Responses
// Description: Outbound response DTOs for product operations.
// Purpose: Map stored products onto the wire shapes consumers recorded.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Outbound DTOs for the product routes. Field names and shapes are consumer
//! contract; `GetProductResponse` exposes the selling price as `price`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

use crate::model::Product;

// ============================================================================
// SECTION: Lookup Responses
// ============================================================================

/// Body of a successful `GET /products/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetProductResponse {
    /// Product identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Internal product code.
    pub code: String,
    /// Color label.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last-update timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Listed price.
    pub price: f64,
    /// Image location.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image_url: String,
    /// Product type label.
    #[serde(rename = "type")]
    pub product_type: String,
}

impl From<&Product> for GetProductResponse {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            code: product.code.clone(),
            color: product.color.clone(),
            created_at: product.created_at,
            updated_at: product.updated_at,
            price: product.selling_price,
            image_url: product.image_url.clone(),
            product_type: product.product_type.as_str().to_string(),
        }
    }
}

/// Body of a successful `POST /products/bulk`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetProductsResponse {
    /// Resolved products, in repository order.
    pub products: Vec<GetProductResponse>,
}

impl GetProductsResponse {
    /// Maps stored products onto the bulk response shape.
    #[must_use]
    pub fn from_products(products: &[Product]) -> Self {
        Self {
            products: products.iter().map(GetProductResponse::from).collect(),
        }
    }
}

// ============================================================================
// SECTION: Create Response
// ============================================================================

/// Body of a successful `POST /products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProductResponse {
    /// Product identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Internal product code.
    pub code: String,
    /// Color label.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last-update timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Acquisition price.
    pub buying_price: f64,
    /// Listed price.
    pub selling_price: f64,
    /// Image location.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image_url: String,
    /// Product type label.
    #[serde(rename = "type")]
    pub product_type: String,
    /// Supplying provider name.
    pub provider: String,
    /// Creator name.
    pub creator: String,
    /// Distributor name.
    pub distributor: String,
}

impl From<&Product> for CreateProductResponse {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            code: product.code.clone(),
            color: product.color.clone(),
            created_at: product.created_at,
            updated_at: product.updated_at,
            buying_price: product.buying_price,
            selling_price: product.selling_price,
            image_url: product.image_url.clone(),
            product_type: product.product_type.as_str().to_string(),
            provider: product.provider.clone(),
            creator: product.creator.clone(),
            distributor: product.distributor.clone(),
        }
    }
}
