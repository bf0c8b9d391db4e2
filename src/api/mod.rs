//! JSON REST API over the CRM.
//!
//! | Prefix | Module |
//! |--------|--------|
//! | `/health` | [`routes_health`] |
//! | `/api/dashboard` | [`routes_dashboard`] |
//! | `/api/contacts` | [`routes_contacts`] |
//! | `/api/companies` | [`routes_companies`] |
//! | `/api/deals` | [`routes_deals`] |
//! | `/api/follow-ups` | [`routes_follow_ups`] |
//! | `/api/interactions` | [`routes_interactions`] |
//!
//! When an API token is configured every `/api` route requires
//! `Authorization: Bearer <token>`; `/health` stays open.

mod error;
mod routes_companies;
mod routes_contacts;
mod routes_dashboard;
mod routes_deals;
mod routes_follow_ups;
mod routes_health;
mod routes_interactions;

pub use error::ApiError;

use anyhow::Result;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::crm::Crm;

pub struct AppState {
    pub crm: Crm,
    /// Bearer token required on `/api` routes. `None` leaves them open.
    pub api_token: Option<String>,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl AppState {
    pub fn new(crm: Crm) -> Self {
        Self {
            crm,
            api_token: None,
            cors_origins: Vec::new(),
        }
    }

    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    /// Run store work on the blocking pool. The SQLite connection is
    /// synchronous and must not stall the async workers.
    pub(crate) async fn blocking<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Crm) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let crm = self.crm.clone();
        tokio::task::spawn_blocking(move || f(&crm))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?
    }
}

async fn require_token(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let Some(expected) = state.api_token.as_deref() else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if provided == Some(expected) {
        next.run(request).await
    } else {
        ApiError::Unauthorized.into_response()
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o.trim()) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(parsed)
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/api/dashboard/summary", get(routes_dashboard::handler_summary))
        .route("/api/dashboard/stale-deals", get(routes_dashboard::handler_stale_deals))
        .route("/api/dashboard/action-feed", get(routes_dashboard::handler_action_feed))
        .route(
            "/api/contacts",
            get(routes_contacts::handler_list).post(routes_contacts::handler_create),
        )
        .route(
            "/api/contacts/from-linkedin",
            post(routes_contacts::handler_from_linkedin),
        )
        .route(
            "/api/contacts/{id}",
            get(routes_contacts::handler_get)
                .put(routes_contacts::handler_update)
                .delete(routes_contacts::handler_delete),
        )
        .route(
            "/api/companies",
            get(routes_companies::handler_list).post(routes_companies::handler_create),
        )
        .route(
            "/api/companies/{id}",
            get(routes_companies::handler_get).put(routes_companies::handler_update),
        )
        .route(
            "/api/deals",
            get(routes_deals::handler_list).post(routes_deals::handler_create),
        )
        .route(
            "/api/deals/{id}",
            get(routes_deals::handler_get).put(routes_deals::handler_update),
        )
        .route("/api/deals/{id}/stage", patch(routes_deals::handler_update_stage))
        .route(
            "/api/follow-ups",
            get(routes_follow_ups::handler_list).post(routes_follow_ups::handler_create),
        )
        .route(
            "/api/follow-ups/{id}/complete",
            patch(routes_follow_ups::handler_complete),
        )
        .route(
            "/api/follow-ups/{id}/snooze",
            patch(routes_follow_ups::handler_snooze),
        )
        .route(
            "/api/interactions",
            get(routes_interactions::handler_list).post(routes_interactions::handler_create),
        )
        .route(
            "/api/interactions/{id}",
            put(routes_interactions::handler_update),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/health", get(routes_health::handler_health))
        .merge(api)
        .layer(cors_layer(&state.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on `bind` until Ctrl+C.
pub async fn serve(state: Arc<AppState>, bind: &str) -> Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("received Ctrl+C, shutting down");
        })
        .await?;
    Ok(())
}
