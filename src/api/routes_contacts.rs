use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::error::require;
use super::{ApiError, AppState};
use crate::models::{Contact, ContactStatus};
use crate::store::{to_fields, Row};

const SEARCH_FIELDS: &[&str] = &["first_name", "last_name", "email", "company_id", "tags", "notes"];

#[derive(Debug, Default, Deserialize)]
pub(super) struct ContactQuery {
    q: Option<String>,
    status: Option<String>,
    tag: Option<String>,
    company_id: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub(super) struct NewContact {
    first_name: String,
    last_name: String,
    company_id: String,
    email: String,
    phone: String,
    role: String,
    linkedin_url: String,
    urls: String,
    source: String,
    referral_contact_id: String,
    tags: String,
    notes: String,
    status: String,
    segment: String,
    engagement_stage: String,
    inbound_channel: String,
    do_not_contact: String,
    campaign_id: String,
}

impl NewContact {
    fn into_fields(mut self) -> Result<Row, ApiError> {
        require("first_name", &self.first_name)?;
        if self.source.is_empty() {
            self.source = "other".to_string();
        }
        if self.status.is_empty() {
            self.status = ContactStatus::Active.as_str().to_string();
        }
        Ok(to_fields(&self)?)
    }
}

/// Partial update: only the fields present in the body are written.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct ContactPatch {
    first_name: Option<String>,
    last_name: Option<String>,
    company_id: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    role: Option<String>,
    linkedin_url: Option<String>,
    urls: Option<String>,
    source: Option<String>,
    referral_contact_id: Option<String>,
    tags: Option<String>,
    notes: Option<String>,
    status: Option<String>,
    segment: Option<String>,
    engagement_stage: Option<String>,
    inbound_channel: Option<String>,
    do_not_contact: Option<String>,
    campaign_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct LinkedInProfile {
    first_name: String,
    last_name: String,
    role: String,
    company_name: String,
    linkedin_url: String,
    email: String,
    phone: String,
}

pub(super) async fn handler_list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ContactQuery>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    state
        .blocking(move |crm| {
            let status = query.status.unwrap_or_default();
            let mut contacts = match query.q.as_deref().filter(|q| !q.trim().is_empty()) {
                Some(q) => crm.contacts.search(q.trim(), SEARCH_FIELDS)?,
                None => crm.contacts.get_all(&[
                    ("status", status.as_str()),
                    ("company_id", query.company_id.as_deref().unwrap_or("")),
                ])?,
            };

            if let Some(tag) = query.tag.as_deref().filter(|t| !t.is_empty()) {
                contacts.retain(|c| c.has_tag(tag));
            }
            if status.is_empty() {
                contacts.retain(|c| !c.is_archived());
            }
            Ok(Json(contacts))
        })
        .await
}

pub(super) async fn handler_create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewContact>,
) -> Result<(StatusCode, Json<Contact>), ApiError> {
    let fields = body.into_fields()?;
    state
        .blocking(move |crm| {
            let contact = crm.contacts.create(fields)?;
            Ok((StatusCode::CREATED, Json(contact)))
        })
        .await
}

pub(super) async fn handler_get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Contact>, ApiError> {
    state
        .blocking(move |crm| {
            crm.contacts
                .get_by_id(&id)?
                .map(Json)
                .ok_or(ApiError::NotFound("Contact"))
        })
        .await
}

pub(super) async fn handler_update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<ContactPatch>,
) -> Result<Json<Contact>, ApiError> {
    let fields = to_fields(&patch)?;
    state
        .blocking(move |crm| {
            crm.contacts
                .update(&id, fields)?
                .map(Json)
                .ok_or(ApiError::NotFound("Contact"))
        })
        .await
}

/// Archives the contact; the row stays in the store.
pub(super) async fn handler_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .blocking(move |crm| {
            if crm.contacts.delete(&id)? {
                Ok(StatusCode::NO_CONTENT)
            } else {
                Err(ApiError::NotFound("Contact"))
            }
        })
        .await
}

/// Capture a profile from LinkedIn. Profiles already on file (matched by
/// URL) are refreshed with the non-empty fields instead of duplicated.
pub(super) async fn handler_from_linkedin(
    State(state): State<Arc<AppState>>,
    Json(profile): Json<LinkedInProfile>,
) -> Result<(StatusCode, Json<Contact>), ApiError> {
    require("first_name", &profile.first_name)?;
    require("linkedin_url", &profile.linkedin_url)?;

    state
        .blocking(move |crm| {
            let mut fields = Row::new();
            for (key, value) in [
                ("first_name", &profile.first_name),
                ("last_name", &profile.last_name),
                ("role", &profile.role),
                ("email", &profile.email),
                ("phone", &profile.phone),
            ] {
                if !value.is_empty() {
                    fields.insert(key.to_string(), value.clone());
                }
            }

            if let Some(existing) = crm.contacts.find_by_field("linkedin_url", &profile.linkedin_url)? {
                let updated = crm
                    .contacts
                    .update(&existing.id, fields)?
                    .ok_or(ApiError::NotFound("Contact"))?;
                info!(contact_id = %updated.id, "refreshed contact from LinkedIn");
                return Ok((StatusCode::OK, Json(updated)));
            }

            if !profile.company_name.is_empty() {
                let company = match crm.companies.find_by_field("name", &profile.company_name)? {
                    Some(company) => company,
                    None => {
                        let mut company = Row::new();
                        company.insert("name".to_string(), profile.company_name.clone());
                        crm.companies.create(company)?
                    }
                };
                fields.insert("company_id".to_string(), company.id);
            }

            fields.insert("linkedin_url".to_string(), profile.linkedin_url.clone());
            fields.insert("source".to_string(), "linkedin".to_string());
            fields.insert("status".to_string(), ContactStatus::Active.as_str().to_string());

            let contact = crm.contacts.create(fields)?;
            info!(contact_id = %contact.id, "created contact from LinkedIn");
            Ok((StatusCode::CREATED, Json(contact)))
        })
        .await
}
