use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use tracing::{error, warn};

use bazaar_types::http::{ProductCard, StorefrontQuery, StorefrontResponse};
use bazaar_types::product::ProductFilter;

use crate::AppState;

/// Filtered listing of approved products, echoing the filter values back for
/// the presentation layer's search form.
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<StorefrontQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let filter = ProductFilter {
        q: query.q.clone(),
        min_price: query.min_price,
        max_price: query.max_price,
    };

    // Run the blocking store read off the async runtime
    let db = state.db.clone();
    let products = tokio::task::spawn_blocking(move || db.list_approved(&filter))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|e| {
            error!("Storefront query failed: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(StorefrontResponse {
        products: products.into_iter().map(ProductCard::from).collect(),
        q: query.q,
        min_price: query.min_price,
        max_price: query.max_price,
    }))
}

/// Purchase trigger. Enqueues the ticket spawn on the worker and redirects
/// back to the listing regardless of the outcome — the buyer never waits for
/// channel provisioning.
pub async fn buy(State(state): State<AppState>, Path(product_id): Path<i64>) -> Redirect {
    let db = state.db.clone();
    match tokio::task::spawn_blocking(move || db.get_product(product_id)).await {
        Ok(Ok(Some(product))) => state.tickets.enqueue(product),
        Ok(Ok(None)) => warn!("Buy request for unknown product {}", product_id),
        Ok(Err(e)) => error!("Product lookup for buy failed: {:#}", e),
        Err(e) => error!("spawn_blocking join error: {}", e),
    }

    Redirect::to("/")
}
