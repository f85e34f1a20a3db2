use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::fmt::Display;

/// Body text returned whenever the ThingSpeak fetch fails. The cause stays in the server log.
pub const UPSTREAM_ERROR_MESSAGE: &str = "Erro ao buscar dados";

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn upstream(err: impl Display) -> Self {
        tracing::error!("ThingSpeak fetch failed: {err:#}");
        Self::internal(UPSTREAM_ERROR_MESSAGE)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
