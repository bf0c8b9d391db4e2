//! Read-only aggregate views. Each request loads a fresh snapshot (through
//! the store cache) and runs the pure feed functions over it.

use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::feed::{build_action_feed, build_summary, stale_deals, ActionFeed, DashboardSummary, StaleDealsReport};

pub(super) async fn handler_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardSummary>, ApiError> {
    state
        .blocking(|crm| Ok(Json(build_summary(&crm.snapshot()?, crm.now()))))
        .await
}

pub(super) async fn handler_stale_deals(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StaleDealsReport>, ApiError> {
    state
        .blocking(|crm| Ok(Json(stale_deals(&crm.deals.all()?, crm.now()))))
        .await
}

pub(super) async fn handler_action_feed(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ActionFeed>, ApiError> {
    state
        .blocking(|crm| Ok(Json(build_action_feed(&crm.snapshot()?, crm.now()))))
        .await
}
