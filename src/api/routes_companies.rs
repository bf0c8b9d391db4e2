use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::require;
use super::{ApiError, AppState};
use crate::models::{Company, Contact};
use crate::store::to_fields;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub(super) struct NewCompany {
    name: String,
    industry: String,
    website: String,
    size: String,
    notes: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct CompanyPatch {
    name: Option<String>,
    industry: Option<String>,
    website: Option<String>,
    size: Option<String>,
    notes: Option<String>,
}

/// A company together with every contact linked to it.
#[derive(Debug, Serialize)]
pub(super) struct CompanyDetail {
    #[serde(flatten)]
    company: Company,
    contacts: Vec<Contact>,
}

pub(super) async fn handler_list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Company>>, ApiError> {
    state.blocking(|crm| Ok(Json(crm.companies.all()?))).await
}

pub(super) async fn handler_create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewCompany>,
) -> Result<(StatusCode, Json<Company>), ApiError> {
    require("name", &body.name)?;
    let fields = to_fields(&body)?;
    state
        .blocking(move |crm| Ok((StatusCode::CREATED, Json(crm.companies.create(fields)?))))
        .await
}

pub(super) async fn handler_get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CompanyDetail>, ApiError> {
    state
        .blocking(move |crm| {
            let company = crm
                .companies
                .get_by_id(&id)?
                .ok_or(ApiError::NotFound("Company"))?;
            let contacts = crm.contacts.get_all(&[("company_id", company.id.as_str())])?;
            Ok(Json(CompanyDetail { company, contacts }))
        })
        .await
}

pub(super) async fn handler_update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<CompanyPatch>,
) -> Result<Json<Company>, ApiError> {
    let fields = to_fields(&patch)?;
    state
        .blocking(move |crm| {
            crm.companies
                .update(&id, fields)?
                .map(Json)
                .ok_or(ApiError::NotFound("Company"))
        })
        .await
}
