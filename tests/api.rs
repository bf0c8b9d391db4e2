//! Router tests.
//!
//! Requests go straight into the axum router through
//! `tower::ServiceExt::oneshot`; the store is in-memory SQLite on a fixed
//! clock (2026-10-18 12:00 UTC).

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use vosscrm::api::{build_router, AppState};
use vosscrm::clock::FixedClock;
use vosscrm::Crm;

fn crm() -> Crm {
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap(),
    ));
    Crm::open_memory(clock).unwrap()
}

fn app_for(crm: &Crm, token: Option<&str>) -> Router {
    let state = AppState::new(crm.clone()).with_api_token(token.map(str::to_string));
    build_router(Arc::new(state))
}

async fn send(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(json!(null));
    (status, json)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None, None).await
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body), None).await
}

#[tokio::test]
async fn health_is_open() {
    let crm = crm();
    let (status, json) = get(app_for(&crm, Some("secret")), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn api_requires_token_when_configured() {
    let crm = crm();

    let (status, json) = get(app_for(&crm, Some("secret")), "/api/contacts").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(json["error"].is_string());

    let (status, _) = send(app_for(&crm, Some("secret")), "GET", "/api/contacts", None, Some("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = send(app_for(&crm, Some("secret")), "GET", "/api/contacts", None, Some("secret")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn follow_up_due_today_reaches_action_feed() {
    let crm = crm();

    let (status, contact) = post_json(
        app_for(&crm, None),
        "/api/contacts",
        json!({ "first_name": "Ada", "last_name": "Lovelace" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(contact["status"], "active");
    assert_eq!(contact["source"], "other");
    let contact_id = contact["id"].as_str().unwrap().to_string();

    let (status, follow_up) = post_json(
        app_for(&crm, None),
        "/api/follow-ups",
        json!({ "contact_id": contact_id, "title": "Send proposal", "due_date": "2026-10-18" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(follow_up["status"], "pending");
    assert_eq!(follow_up["reminder_sent"], "FALSE");

    let (status, feed) = get(app_for(&crm, None), "/api/dashboard/action-feed").await;
    assert_eq!(status, StatusCode::OK);
    let due_today = feed["action_required"]["due_today"].as_array().unwrap();
    assert_eq!(due_today.len(), 1);
    assert_eq!(due_today[0]["title"], "Send proposal");
    assert_eq!(due_today[0]["contact_name"], "Ada Lovelace");
    assert_eq!(feed["action_required"]["due_today_total"], 1);
}

#[tokio::test]
async fn missing_records_are_404() {
    let crm = crm();
    for uri in ["/api/contacts/nope", "/api/deals/nope", "/api/companies/nope"] {
        let (status, json) = get(app_for(&crm, None), uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert!(json["error"].as_str().unwrap().ends_with("not found"));
    }

    let (status, _) = send(app_for(&crm, None), "PATCH", "/api/follow-ups/nope/complete", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(app_for(&crm, None), "DELETE", "/api/contacts/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn required_fields_are_422() {
    let crm = crm();
    let (status, json) = post_json(app_for(&crm, None), "/api/contacts", json!({ "last_name": "X" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "first_name is required");

    let (status, _) = post_json(app_for(&crm, None), "/api/follow-ups", json!({ "contact_id": "c1", "title": "t" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn deal_stage_change_is_validated() {
    let crm = crm();
    let (status, deal) = post_json(app_for(&crm, None), "/api/deals", json!({ "title": "Retainer", "value": 5000 })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(deal["stage"], "lead");
    assert_eq!(deal["currency"], "USD");
    assert_eq!(deal["priority"], "medium");
    assert_eq!(deal["value"], "5000");
    let uri = format!("/api/deals/{}/stage", deal["id"].as_str().unwrap());

    let (status, json) = send(app_for(&crm, None), "PATCH", &uri, Some(json!({ "stage": "banana" })), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().unwrap().contains("banana"));

    let (status, json) = send(app_for(&crm, None), "PATCH", &uri, Some(json!({ "stage": "proposal" })), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["stage"], "proposal");
}

#[tokio::test]
async fn archived_contacts_hidden_from_list() {
    let crm = crm();
    let (_, keep) = post_json(app_for(&crm, None), "/api/contacts", json!({ "first_name": "Keep" })).await;
    let (_, gone) = post_json(app_for(&crm, None), "/api/contacts", json!({ "first_name": "Gone" })).await;

    let uri = format!("/api/contacts/{}", gone["id"].as_str().unwrap());
    let (status, _) = send(app_for(&crm, None), "DELETE", &uri, None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, list) = get(app_for(&crm, None), "/api/contacts").await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], keep["id"]);

    let (_, archived) = get(app_for(&crm, None), "/api/contacts?status=archived").await;
    assert_eq!(archived.as_array().unwrap().len(), 1);

    // Soft delete keeps the record reachable by id.
    let (status, json) = get(app_for(&crm, None), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "archived");
}

#[tokio::test]
async fn linkedin_capture_dedupes_by_url() {
    let crm = crm();
    let profile = json!({
        "first_name": "Grace",
        "last_name": "Hopper",
        "company_name": "Navy Labs",
        "linkedin_url": "https://linkedin.com/in/grace",
    });

    let (status, first) = post_json(app_for(&crm, None), "/api/contacts/from-linkedin", profile).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["source"], "linkedin");
    assert!(!first["company_id"].as_str().unwrap().is_empty());

    let (status, second) = post_json(
        app_for(&crm, None),
        "/api/contacts/from-linkedin",
        json!({ "first_name": "Grace", "role": "Rear Admiral", "linkedin_url": "https://linkedin.com/in/grace" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["role"], "Rear Admiral");
    assert_eq!(second["last_name"], "Hopper");

    let uri = format!("/api/companies/{}", first["company_id"].as_str().unwrap());
    let (status, company) = get(app_for(&crm, None), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(company["name"], "Navy Labs");
    assert_eq!(company["contacts"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn snooze_rearms_reminder() {
    let crm = crm();
    let (_, follow_up) = post_json(
        app_for(&crm, None),
        "/api/follow-ups",
        json!({ "contact_id": "c1", "title": "Call", "due_date": "2026-10-10", "reminder_sent": "TRUE" }),
    )
    .await;

    let (_, overdue) = get(app_for(&crm, None), "/api/follow-ups?overdue=true").await;
    assert_eq!(overdue.as_array().unwrap().len(), 1);

    let uri = format!("/api/follow-ups/{}/snooze", follow_up["id"].as_str().unwrap());
    let (status, json) = send(
        app_for(&crm, None),
        "PATCH",
        &uri,
        Some(json!({ "due_date": "2026-10-25", "due_time": "09:00" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "snoozed");
    assert_eq!(json["reminder_sent"], "FALSE");
    assert_eq!(json["due_time"], "09:00");

    let (_, overdue) = get(app_for(&crm, None), "/api/follow-ups?overdue=true").await;
    assert!(overdue.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn interaction_defaults() {
    let crm = crm();
    let (status, json) = post_json(app_for(&crm, None), "/api/interactions", json!({ "contact_id": "c1" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["type"], "note");
    assert_eq!(json["direction"], "outbound");
    assert!(json["occurred_at"].as_str().unwrap().starts_with("2026-10-18T12:00:00"));

    let (_, list) = get(app_for(&crm, None), "/api/interactions?type=call").await;
    assert!(list.as_array().unwrap().is_empty());
}
