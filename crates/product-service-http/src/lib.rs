// crates/product-service-http/src/lib.rs
// ============================================================================
// Module: Product Service HTTP Library
// Description: Axum routing layer and server wrapper for the product service.
// Purpose: Bind the product service operations to their HTTP surface.
// Dependencies: axum, product-service-core, tokio
// ============================================================================

//! ## Overview
//! HTTP surface for the product service: the [`product_router`] wiring the
//! three product routes and the [`ProductServer`] bind/serve wrapper.
//! Invariants:
//! - Every error response is HTTP 400 with the stable JSON error body.
//! - Body-parse failures surface the body-parser code before any service call.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod handler;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use handler::product_router;
pub use server::ProductServer;
pub use server::ServerError;
