// crates/product-service-http/src/handler.rs
// ============================================================================
// Module: Product Handlers
// Description: Axum handlers for the product routes.
// Purpose: Decode requests, run validation, and map service results to responses.
// Dependencies: axum, product-service-core
// ============================================================================

//! ## Overview
//! Handlers for the three product routes. The error mapping is uniform:
//! validation, body-parse, and domain failures all answer 400 with the JSON
//! error body, matching what consumers recorded in their contracts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use product_service_core::CreateProductRequest;
use product_service_core::GetProductsByIdsRequest;
use product_service_core::ProductError;
use product_service_core::ProductService;

// ============================================================================
// SECTION: Router
// ============================================================================

/// Builds the product router over the given service.
#[must_use]
pub fn product_router(service: ProductService) -> Router {
    Router::new()
        .route("/products", post(create_product))
        .route("/products/bulk", post(get_products_by_ids))
        .route("/products/{id}", get(get_product_by_id))
        .with_state(service)
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Maps a domain error onto the uniform 400 response.
fn error_response(err: &ProductError) -> Response {
    (StatusCode::BAD_REQUEST, Json(err.to_body())).into_response()
}

/// Handles `GET /products/{id}`.
async fn get_product_by_id(
    State(service): State<ProductService>,
    Path(id): Path<String>,
) -> Response {
    tracing::info!(product_id = %id, "get product by id request arrived");
    match service.get_product_by_id(&id).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(err) => error_response(&err),
    }
}

/// Handles `POST /products/bulk`.
async fn get_products_by_ids(
    State(service): State<ProductService>,
    payload: Result<Json<GetProductsByIdsRequest>, JsonRejection>,
) -> Response {
    tracing::info!("get products by ids request arrived");
    let Ok(Json(request)) = payload else {
        return error_response(&ProductError::BodyParser);
    };
    if let Err(err) = request.validate() {
        return error_response(&err);
    }
    match service.get_products_by_ids(request).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(err) => error_response(&err),
    }
}

/// Handles `POST /products`.
async fn create_product(
    State(service): State<ProductService>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Response {
    tracing::info!("create product request arrived");
    let Ok(Json(request)) = payload else {
        return error_response(&ProductError::BodyParser);
    };
    if let Err(err) = request.validate() {
        return error_response(&err);
    }
    match service.create_product(request).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(err) => error_response(&err),
    }
}
