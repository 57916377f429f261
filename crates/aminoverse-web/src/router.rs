//! Axum router: maps all URL paths to handlers.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::error::panic_response;
use crate::handlers::{
    assistant::{conversation, refine_query},
    protein::{protein_analysis, protein_drugs, protein_info, protein_report, protein_structure},
    system::{api_index, health},
};
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState, cors_permissive: bool) -> Router {
    let shared: SharedState = Arc::new(state);

    let router = Router::new()
        .route("/",     get(health))
        .route("/api",  get(api_index))
        .route("/api/", get(api_index))

        // Per-protein lookups
        .route("/api/protein/{name}",           get(protein_info))
        .route("/api/protein/{name}/structure", get(protein_structure))
        .route("/api/protein/{name}/drugs",     get(protein_drugs))
        .route("/api/protein/{name}/analysis",  get(protein_analysis))
        .route("/api/protein/{name}/report",    get(protein_report))

        // AI
        .route("/api/refine-query", post(refine_query))
        .route("/api/conversation", post(conversation))

        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(panic_response)),
        )
        .with_state(shared);

    if cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
