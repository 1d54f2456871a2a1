pub mod health;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Uri},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::branches;
use crate::documents::handlers as documents;
use crate::errors::AppError;
use crate::loans;
use crate::recommendations::handlers as recommendations;
use crate::scholarships;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/loans", get(loans::handle_list_loans))
        .route("/ocr", post(documents::handle_extract))
        .route("/recommend", post(recommendations::handle_recommend))
        .route("/scholarships", post(scholarships::handle_find_scholarships))
        .route("/nearest-branches", post(branches::handle_nearest_branches))
        .fallback(not_found)
        .layer(body_limit)
        .with_state(state)
}

/// CORS for the browser front-end: explicit origins with credentials, so
/// methods and headers mirror the preflight instead of using wildcards.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("Invalid CORS origin '{origin}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}
