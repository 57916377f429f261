//! AI-backed endpoints: query refinement and stateless conversation.

use aminoverse_llm::AiSuggestion;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::ApiError;
use crate::state::SharedState;

/// Fields are taken as raw JSON; any non-empty value is accepted and rendered as text.
#[derive(Debug, Deserialize)]
pub struct RefineQueryRequest {
    #[serde(default)]
    pub query: Value,
}

#[derive(Debug, Deserialize)]
pub struct ConversationRequest {
    #[serde(default)]
    pub messages: Value,
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub response: Option<String>,
}

fn invalid_body(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
}

/// Null, false, zero and empty strings, lists or objects count as missing.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

/// Strings verbatim, anything else as its JSON text.
fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// POST /api/refine-query
pub async fn refine_query(
    State(state): State<SharedState>,
    payload: Result<Json<RefineQueryRequest>, JsonRejection>,
) -> Result<Json<AiSuggestion>, ApiError> {
    let Json(req) = payload.map_err(invalid_body)?;
    if is_blank(&req.query) {
        return Err(ApiError::BadRequest("Missing 'query' field in request".to_string()));
    }
    let query = as_text(&req.query);

    Ok(Json(state.assistant.refine_query(&query).await))
}

/// POST /api/conversation
///
/// `messages` alternates user/assistant starting with the user and ends with
/// the current question. Nothing is kept between calls.
pub async fn conversation(
    State(state): State<SharedState>,
    payload: Result<Json<ConversationRequest>, JsonRejection>,
) -> Result<Json<ConversationResponse>, ApiError> {
    let Json(req) = payload.map_err(invalid_body)?;
    let messages: Vec<String> = match &req.messages {
        Value::Array(items) if !items.is_empty() => items.iter().map(as_text).collect(),
        _ => return Err(ApiError::BadRequest("Missing 'messages' field in request".to_string())),
    };

    let response = match state.assistant.converse(&messages).await {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(error = %e, "Conversation reply unavailable");
            None
        }
    };

    Ok(Json(ConversationResponse { response }))
}
