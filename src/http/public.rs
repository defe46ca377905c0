use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::Error;
use crate::services::invoices;

use super::AppState;

#[derive(Deserialize)]
pub struct LookupParams {
    /// Knowledge of the receipt string is the only credential for viewing.
    #[serde(rename = "ref")]
    pub reference: Option<String>,
}

pub async fn lookup(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> Result<Json<Value>, Error> {
    let reference = params
        .reference
        .filter(|r| !r.is_empty())
        .ok_or_else(|| Error::Validation("Reference required".to_string()))?;
    let invoice = invoices::lookup(&state.db, &reference)?;
    Ok(Json(json!({ "invoice": invoice })))
}

#[derive(Deserialize)]
pub struct PayPayload {
    pub receipt: Option<String>,
}

pub async fn pay(
    State(state): State<AppState>,
    Json(payload): Json<PayPayload>,
) -> Result<Json<Value>, Error> {
    let receipt = payload
        .receipt
        .filter(|r| !r.is_empty())
        .ok_or_else(|| Error::Validation("Receipt required".to_string()))?;
    let invoice = invoices::pay(&state.db, &receipt)?;
    Ok(Json(json!({ "invoice": invoice })))
}
