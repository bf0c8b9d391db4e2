use axum::Json;

pub(super) async fn handler_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
