use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::require;
use super::{ApiError, AppState};
use crate::clock::{date_string, iso_timestamp};
use crate::models::{FollowUp, FollowUpStatus, SHEET_FALSE};
use crate::store::{to_fields, Row};

#[derive(Debug, Default, Deserialize)]
pub(super) struct FollowUpQuery {
    status: Option<String>,
    contact_id: Option<String>,
    /// Only pending follow-ups due before today.
    #[serde(default)]
    overdue: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub(super) struct NewFollowUp {
    contact_id: String,
    deal_id: String,
    title: String,
    due_date: String,
    due_time: String,
    status: String,
    reminder_sent: String,
    notes: String,
}

impl NewFollowUp {
    fn into_fields(mut self) -> Result<Row, ApiError> {
        require("contact_id", &self.contact_id)?;
        require("title", &self.title)?;
        require("due_date", &self.due_date)?;
        if self.status.is_empty() {
            self.status = FollowUpStatus::Pending.as_str().to_string();
        }
        if self.reminder_sent.is_empty() {
            self.reminder_sent = SHEET_FALSE.to_string();
        }
        Ok(to_fields(&self)?)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct Snooze {
    due_date: String,
    due_time: Option<String>,
}

pub(super) async fn handler_list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FollowUpQuery>,
) -> Result<Json<Vec<FollowUp>>, ApiError> {
    state
        .blocking(move |crm| {
            let mut follow_ups = crm.follow_ups.get_all(&[
                ("status", query.status.as_deref().unwrap_or("")),
                ("contact_id", query.contact_id.as_deref().unwrap_or("")),
            ])?;
            if query.overdue {
                let today = date_string(crm.now());
                follow_ups.retain(|f| f.is_pending() && !f.due_date.is_empty() && f.due_date < today);
            }
            Ok(Json(follow_ups))
        })
        .await
}

pub(super) async fn handler_create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewFollowUp>,
) -> Result<(StatusCode, Json<FollowUp>), ApiError> {
    let fields = body.into_fields()?;
    state
        .blocking(move |crm| Ok((StatusCode::CREATED, Json(crm.follow_ups.create(fields)?))))
        .await
}

pub(super) async fn handler_complete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FollowUp>, ApiError> {
    state
        .blocking(move |crm| {
            let mut fields = Row::new();
            fields.insert("status".to_string(), FollowUpStatus::Completed.as_str().to_string());
            fields.insert("completed_at".to_string(), iso_timestamp(crm.now()));
            crm.follow_ups
                .update(&id, fields)?
                .map(Json)
                .ok_or(ApiError::NotFound("Follow-up"))
        })
        .await
}

/// Push a follow-up to a new date. The reminder is re-armed so it fires
/// again on the new date.
pub(super) async fn handler_snooze(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(snooze): Json<Snooze>,
) -> Result<Json<FollowUp>, ApiError> {
    require("due_date", &snooze.due_date)?;
    state
        .blocking(move |crm| {
            let mut fields = Row::new();
            fields.insert("due_date".to_string(), snooze.due_date);
            if let Some(time) = snooze.due_time {
                fields.insert("due_time".to_string(), time);
            }
            fields.insert("status".to_string(), FollowUpStatus::Snoozed.as_str().to_string());
            fields.insert("reminder_sent".to_string(), SHEET_FALSE.to_string());
            crm.follow_ups
                .update(&id, fields)?
                .map(Json)
                .ok_or(ApiError::NotFound("Follow-up"))
        })
        .await
}
