//! Router-level errors and their JSON rendering.

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": msg }))),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": msg }))),
            ApiError::Internal(err) => {
                error!(error = ?err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({
                        "error": err.to_string(),
                        "details": format!("{:?}", err),
                    })),
                )
            }
        };

        body.into_response()
    }
}

/// Render a handler panic like any other internal error.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };

    ApiError::Internal(anyhow::anyhow!("Handler panicked: {}", details)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::BadRequest("x".into()).into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("x".into()).into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_panic_payloads() {
        assert_eq!(panic_response(Box::new("static")).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(panic_response(Box::new(String::from("owned"))).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(panic_response(Box::new(42_u8)).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
