// src/errors.rs

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use serde_json::json;
use thiserror::Error;

use crate::validation::FormErrors;

pub const MISSING_THUMBNAIL_MESSAGE: &str = "Product thumbnail image is required.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Nie znaleziono zasobu")]
    NotFound,

    #[error("Formularz zawiera błędy ({} pól)", .0.len())]
    InvalidForm(FormErrors),

    #[error("{}", MISSING_THUMBNAIL_MESSAGE)]
    MissingThumbnail,

    #[error("Nieprawidłowe dane wejściowe: {0}")]
    UnprocessableEntity(String),

    #[error("Niepoprawne żądanie: {0}")]
    BadRequest(String),

    #[error("Błąd zewnętrznego backendu: {0}")]
    Backend(String),

    #[error("Błąd konfiguracji: {0}")]
    Config(String),

    #[error("Wewnętrzny błąd serwera: {0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
            AppError::InvalidForm(errors) => {
                let messages = errors
                    .iter()
                    .map(|(field, message)| format!("{}: {}", field, message))
                    .collect::<Vec<_>>();
                (StatusCode::UNPROCESSABLE_ENTITY, messages.join("; "))
            }
            AppError::MissingThumbnail => (
                StatusCode::UNPROCESSABLE_ENTITY,
                MISSING_THUMBNAIL_MESSAGE.to_string(),
            ),
            AppError::UnprocessableEntity(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Backend(message) => {
                tracing::error!("Błąd backendu produktów: {}", message);
                (
                    StatusCode::BAD_GATEWAY,
                    "Saving the product failed, please try again.".to_string(),
                )
            }
            AppError::Config(message) => {
                tracing::error!("Błąd konfiguracji: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            AppError::InternalServerError(message) => {
                tracing::error!("Wewnętrzny błąd serwera: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        tracing::error!("Błąd przetwarzania Multipart: {:?}", err);
        AppError::UnprocessableEntity(format!("Could not read the selected files: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            tracing::error!("Szczegóły błędu budowania Reqwest: {:?}", err);
        }
        AppError::Backend(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_thumbnail_maps_to_unprocessable_entity() {
        let response = AppError::MissingThumbnail.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], MISSING_THUMBNAIL_MESSAGE);
    }

    #[test]
    fn backend_failures_surface_as_bad_gateway() {
        let response = AppError::Backend("connection refused".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
