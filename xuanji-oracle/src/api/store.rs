//! Storefront catalogue endpoints

use axum::{
    extract::{rejection::PathRejection, Path},
    routing::get,
    Json, Router,
};

use crate::services::{catalog, find_product, Product};
use crate::{ApiResult, AppState};

/// GET /api/store/products
pub async fn list_products() -> Json<&'static [Product]> {
    Json(catalog())
}

/// GET /api/store/products/:id
pub async fn get_product(path: Result<Path<u32>, PathRejection>) -> ApiResult<Json<Product>> {
    let Path(id) = path?;
    Ok(Json(*find_product(id)?))
}

pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/api/store/products", get(list_products))
        .route("/api/store/products/:id", get(get_product))
}
