use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::Error;
use crate::services::invoices::{self, CreateInvoiceRequest};

use super::AppState;

#[derive(Deserialize)]
pub struct LoginPayload {
    pub username: Option<String>,
    pub password: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Response, Error> {
    let (username, password) = match (payload.username.as_deref(), payload.password.as_deref()) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
        _ => {
            return Err(Error::Validation(
                "Username and password required".to_string(),
            ))
        }
    };

    if !state.auth.login(username, password) {
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid credentials" })),
        )
            .into_response());
    }

    tracing::info!("admin session opened");
    let headers = set_cookie(state.auth.session_cookie())?;
    Ok((headers, Json(json!({ "success": true }))).into_response())
}

pub async fn logout(State(state): State<AppState>) -> Result<Response, Error> {
    let headers = set_cookie(state.auth.clear_cookie())?;
    Ok((headers, Json(json!({ "success": true }))).into_response())
}

pub async fn list_invoices(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, Error> {
    require_session(&state, &headers)?;
    let invoices = invoices::list_all(&state.db)?;
    Ok(Json(json!({ "invoices": invoices })).into_response())
}

pub async fn create_invoice(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateInvoiceRequest>,
) -> Result<Response, Error> {
    require_session(&state, &headers)?;
    let invoice = invoices::create(&state.db, &state.config, payload)?;
    Ok(Json(json!({ "invoice": invoice })).into_response())
}

/// The gate in front of every admin operation: reject before any store
/// access so an unauthenticated caller learns nothing about what exists.
fn require_session(state: &AppState, headers: &HeaderMap) -> Result<(), Error> {
    let cookie = headers.get(header::COOKIE).and_then(|v| v.to_str().ok());
    if state.auth.check(cookie) {
        Ok(())
    } else {
        Err(Error::Unauthorized)
    }
}

fn set_cookie(value: String) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&value)
        .map_err(|e| Error::Internal(anyhow::anyhow!("Set-Cookie value: {e}")))?;
    headers.insert(header::SET_COOKIE, value);
    Ok(headers)
}
