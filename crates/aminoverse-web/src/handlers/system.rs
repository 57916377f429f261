//! Liveness and capability listing.

use axum::Json;
use serde_json::{json, Value};

/// GET /
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "AminoVerse API is running",
    }))
}

/// GET /api/
pub async fn api_index() -> Json<Value> {
    Json(json!({
        "status": "online",
        "message": "AminoVerse API v1.0",
        "endpoints": {
            "GET /api/protein/{protein_name}": "Get basic protein information",
            "GET /api/protein/{protein_name}/analysis": "Get AI-generated protein analysis",
            "GET /api/protein/{protein_name}/structure": "Get protein 3D structure data",
            "GET /api/protein/{protein_name}/drugs": "Get drug associations",
            "GET /api/protein/{protein_name}/report": "Get function, structure and drug data in one response",
            "POST /api/refine-query": "Refine a protein query using AI",
            "POST /api/conversation": "Ask a follow-up question with the full message history",
        }
    }))
}
