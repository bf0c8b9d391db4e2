use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::error::require;
use super::{ApiError, AppState};
use crate::models::{Deal, Stage};
use crate::store::{to_fields, Row};

#[derive(Debug, Default, Deserialize)]
pub(super) struct DealQuery {
    stage: Option<String>,
    priority: Option<String>,
    contact_id: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub(super) struct NewDeal {
    title: String,
    contact_id: String,
    company_id: String,
    stage: String,
    /// Accepts a JSON number or numeric text.
    value: serde_json::Value,
    currency: String,
    priority: String,
    expected_close: String,
    notes: String,
}

impl NewDeal {
    fn into_fields(mut self) -> Result<Row, ApiError> {
        require("title", &self.title)?;
        if self.stage.is_empty() {
            self.stage = Stage::Lead.as_str().to_string();
        }
        if self.currency.is_empty() {
            self.currency = "USD".to_string();
        }
        if self.priority.is_empty() {
            self.priority = "medium".to_string();
        }
        Ok(to_fields(&self)?)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct DealPatch {
    title: Option<String>,
    contact_id: Option<String>,
    company_id: Option<String>,
    stage: Option<String>,
    value: Option<serde_json::Value>,
    currency: Option<String>,
    priority: Option<String>,
    expected_close: Option<String>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct StageChange {
    stage: String,
}

pub(super) async fn handler_list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DealQuery>,
) -> Result<Json<Vec<Deal>>, ApiError> {
    state
        .blocking(move |crm| {
            let deals = crm.deals.get_all(&[
                ("stage", query.stage.as_deref().unwrap_or("")),
                ("priority", query.priority.as_deref().unwrap_or("")),
                ("contact_id", query.contact_id.as_deref().unwrap_or("")),
            ])?;
            Ok(Json(deals))
        })
        .await
}

pub(super) async fn handler_create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewDeal>,
) -> Result<(StatusCode, Json<Deal>), ApiError> {
    let fields = body.into_fields()?;
    state
        .blocking(move |crm| Ok((StatusCode::CREATED, Json(crm.deals.create(fields)?))))
        .await
}

pub(super) async fn handler_get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Deal>, ApiError> {
    state
        .blocking(move |crm| {
            crm.deals
                .get_by_id(&id)?
                .map(Json)
                .ok_or(ApiError::NotFound("Deal"))
        })
        .await
}

pub(super) async fn handler_update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<DealPatch>,
) -> Result<Json<Deal>, ApiError> {
    let fields = to_fields(&patch)?;
    state
        .blocking(move |crm| {
            crm.deals
                .update(&id, fields)?
                .map(Json)
                .ok_or(ApiError::NotFound("Deal"))
        })
        .await
}

/// Move a deal to another pipeline stage. Only the seven known stages are
/// accepted.
pub(super) async fn handler_update_stage(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(change): Json<StageChange>,
) -> Result<Json<Deal>, ApiError> {
    let stage = Stage::parse(change.stage.trim())
        .ok_or_else(|| ApiError::Validation(format!("invalid stage '{}'", change.stage)))?;

    state
        .blocking(move |crm| {
            let mut fields = Row::new();
            fields.insert("stage".to_string(), stage.as_str().to_string());
            let deal = crm
                .deals
                .update(&id, fields)?
                .ok_or(ApiError::NotFound("Deal"))?;
            info!(deal_id = %deal.id, stage = stage.as_str(), "deal stage changed");
            Ok(Json(deal))
        })
        .await
}
