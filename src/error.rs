use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::models::InvoiceStatus;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("Invoice not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Conflict(String),

    #[error("Payments are not available: {0}")]
    NotPayable(InvoiceStatus),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Internal(err.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Error::Validation(message) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            Error::NotFound => (StatusCode::NOT_FOUND, json!({ "error": "Invoice not found" })),
            Error::Unauthorized => (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" })),
            Error::Conflict(message) => (StatusCode::CONFLICT, json!({ "error": message })),
            Error::NotPayable(current) => (
                StatusCode::CONFLICT,
                json!({
                    "error": format!("Payments are not available: {}", current),
                    "status": current,
                }),
            ),
            Error::Internal(cause) => {
                tracing::error!(error = %cause, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_payable_carries_the_current_status() {
        let err = Error::NotPayable(InvoiceStatus::Cancelled);
        assert_eq!(err.to_string(), "Payments are not available: cancelled");
    }

    #[test]
    fn maps_to_expected_status_codes() {
        let cases = [
            (Error::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (Error::NotFound, StatusCode::NOT_FOUND),
            (Error::Unauthorized, StatusCode::UNAUTHORIZED),
            (Error::Conflict("collision".into()), StatusCode::CONFLICT),
            (
                Error::NotPayable(InvoiceStatus::Expired),
                StatusCode::CONFLICT,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
