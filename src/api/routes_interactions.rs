use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::require;
use super::{ApiError, AppState};
use crate::clock::iso_timestamp;
use crate::models::{Direction, Interaction, InteractionType};
use crate::store::{to_fields, Row};

#[derive(Debug, Default, Deserialize)]
pub(super) struct InteractionQuery {
    contact_id: Option<String>,
    deal_id: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub(super) struct NewInteraction {
    contact_id: String,
    deal_id: String,
    #[serde(rename = "type")]
    kind: String,
    subject: String,
    body: String,
    url: String,
    direction: String,
    occurred_at: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct InteractionPatch {
    contact_id: Option<String>,
    deal_id: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    subject: Option<String>,
    body: Option<String>,
    url: Option<String>,
    direction: Option<String>,
    occurred_at: Option<String>,
}

pub(super) async fn handler_list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InteractionQuery>,
) -> Result<Json<Vec<Interaction>>, ApiError> {
    state
        .blocking(move |crm| {
            let interactions = crm.interactions.get_all(&[
                ("contact_id", query.contact_id.as_deref().unwrap_or("")),
                ("deal_id", query.deal_id.as_deref().unwrap_or("")),
                ("type", query.kind.as_deref().unwrap_or("")),
            ])?;
            Ok(Json(interactions))
        })
        .await
}

pub(super) async fn handler_create(
    State(state): State<Arc<AppState>>,
    Json(mut body): Json<NewInteraction>,
) -> Result<(StatusCode, Json<Interaction>), ApiError> {
    require("contact_id", &body.contact_id)?;
    if body.kind.is_empty() {
        body.kind = InteractionType::Note.as_str().to_string();
    }
    if body.direction.is_empty() {
        body.direction = Direction::Outbound.as_str().to_string();
    }

    state
        .blocking(move |crm| {
            if body.occurred_at.is_empty() {
                body.occurred_at = iso_timestamp(crm.now());
            }
            let fields: Row = to_fields(&body)?;
            Ok((StatusCode::CREATED, Json(crm.interactions.create(fields)?)))
        })
        .await
}

pub(super) async fn handler_update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<InteractionPatch>,
) -> Result<Json<Interaction>, ApiError> {
    let fields = to_fields(&patch)?;
    state
        .blocking(move |crm| {
            crm.interactions
                .update(&id, fields)?
                .map(Json)
                .ok_or(ApiError::NotFound("Interaction"))
        })
        .await
}
