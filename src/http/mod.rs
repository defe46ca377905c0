pub mod admin;
pub mod public;

use axum::routing::{get, post};
use axum::Router;
use std::sync::{Arc, Mutex};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Database;
use crate::services::auth::Authenticator;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub auth: Arc<Authenticator>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        let auth = Authenticator::new(config.credentials(), config.secure_cookies);
        AppState {
            db: Arc::new(Mutex::new(db)),
            auth: Arc::new(auth),
            config: Arc::new(config),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/login", post(admin::login))
        .route("/admin/logout", post(admin::logout))
        .route(
            "/admin/invoices",
            get(admin::list_invoices).post(admin::create_invoice),
        )
        .route("/invoices/lookup", get(public::lookup))
        .route("/invoices/pay", post(public::pay))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
