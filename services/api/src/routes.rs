use crate::infra::{AppState, Services};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use consigna::eligibility::EligibilityOutcome;
use consigna::error::AppError;
use consigna::spreadsheet::ImportSummary;
use consigna::tabular::CsvUpload;
use consigna::users::{UserPatch, UserView};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Serialize)]
pub(crate) struct ExportResponse {
    pub(crate) csv: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteResponse {
    pub(crate) message: &'static str,
    pub(crate) user: UserView,
}

/// User, eligibility and operational endpoints over shared services.
pub(crate) fn router(services: Services) -> Router {
    Router::new()
        .route(
            "/user/spreadsheet",
            get(export_spreadsheet).post(import_spreadsheet),
        )
        .route("/user", get(list_users))
        .route(
            "/user/:uuid",
            get(show_user).put(update_user).delete(delete_user),
        )
        .route("/eligibility/:user_uuid", get(check_eligibility))
        .with_state(services)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn import_spreadsheet(
    State(services): State<Services>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<ImportSummary>), AppError> {
    let mime_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let upload = CsvUpload::from_bytes(mime_type, &body)?;
    let summary = services.spreadsheet.import(&upload)?;
    Ok((StatusCode::CREATED, Json(summary)))
}

pub(crate) async fn export_spreadsheet(
    State(services): State<Services>,
) -> Result<Json<ExportResponse>, AppError> {
    let csv = services.spreadsheet.export()?;
    Ok(Json(ExportResponse { csv }))
}

pub(crate) async fn list_users(
    State(services): State<Services>,
) -> Result<Json<Vec<UserView>>, AppError> {
    let users = services.users.find_all()?;
    Ok(Json(users.iter().map(|user| user.view()).collect()))
}

pub(crate) async fn show_user(
    State(services): State<Services>,
    Path(uuid): Path<String>,
) -> Result<Json<UserView>, AppError> {
    let user = services.users.find_by_id(&uuid)?;
    Ok(Json(user.view()))
}

pub(crate) async fn update_user(
    State(services): State<Services>,
    Path(uuid): Path<String>,
    Json(patch): Json<UserPatch>,
) -> Result<Json<UserView>, AppError> {
    let user = services.users.update_by_id(&uuid, &patch)?;
    Ok(Json(user.view()))
}

pub(crate) async fn delete_user(
    State(services): State<Services>,
    Path(uuid): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let user = services.users.delete_by_id(&uuid)?;
    Ok(Json(DeleteResponse {
        message: "User deleted successfully",
        user: user.view(),
    }))
}

pub(crate) async fn check_eligibility(
    State(services): State<Services>,
    Path(user_uuid): Path<String>,
) -> Result<Json<EligibilityOutcome>, AppError> {
    let outcome = services.eligibility.check(&user_uuid)?;
    Ok(Json(outcome))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use axum::response::Response;
    use consigna::eligibility::EligibilityPolicy;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    const CSV: &str = "name,cpf,email\nAna Souza,48472338088,ana@example.com\nBruno Lima,16742019077,bruno@example.com\n";

    fn app(services: Services) -> Router {
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        router(services).layer(Extension(state))
    }

    async fn send(app: &Router, method: Method, uri: &str, content_type: &str, body: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .expect("request builds");
        app.clone().oneshot(request).await.expect("router responds")
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    async fn imported_app() -> (Router, Vec<Value>) {
        let app = app(Services::in_memory(EligibilityPolicy::default()));
        let response = send(&app, Method::POST, "/user/spreadsheet", "text/csv", CSV).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let listed = send(&app, Method::GET, "/user", "application/json", "").await;
        let users = json_body(listed).await.as_array().cloned().expect("user list");
        (app, users)
    }

    #[tokio::test]
    async fn import_creates_users_and_reports_count() {
        let app = app(Services::in_memory(EligibilityPolicy::default()));
        let response = send(&app, Method::POST, "/user/spreadsheet", "text/csv", CSV).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        assert_eq!(body["created_users"], 2);
        assert!(body["date_time"].is_string());

        let export = send(&app, Method::GET, "/user/spreadsheet", "text/plain", "").await;
        assert_eq!(export.status(), StatusCode::OK);
        assert_eq!(json_body(export).await["csv"], CSV);
    }

    #[tokio::test]
    async fn import_rejects_non_csv_and_duplicates() {
        let app = app(Services::in_memory(EligibilityPolicy::default()));

        let response = send(&app, Method::POST, "/user/spreadsheet", "application/json", CSV).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "The file type is not valid");

        let duplicated = "name,cpf,email\nAna Souza,48472338088,ana@example.com\nAna Clara,48472338088,clara@example.com\n";
        let response = send(&app, Method::POST, "/user/spreadsheet", "text/csv", duplicated).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            json_body(response).await["error"],
            "Spreadsheet error: line 3 | CPF already created"
        );

        let listed = send(&app, Method::GET, "/user", "application/json", "").await;
        assert_eq!(json_body(listed).await, Value::Array(Vec::new()));
    }

    #[tokio::test]
    async fn show_update_and_delete_a_user() {
        let (app, users) = imported_app().await;
        let id = users[0]["id"].as_str().expect("id").to_string();
        let uri = format!("/user/{id}");

        let shown = send(&app, Method::GET, &uri, "application/json", "").await;
        assert_eq!(shown.status(), StatusCode::OK);
        let shown = json_body(shown).await;
        assert_eq!(shown["name"], "Ana Souza");
        assert!(shown["dateCreation"].is_string());

        let updated = send(
            &app,
            Method::PUT,
            &uri,
            "application/json",
            r#"{"email":"new@x.com"}"#,
        )
        .await;
        assert_eq!(updated.status(), StatusCode::OK);
        let updated = json_body(updated).await;
        assert_eq!(updated["email"], "new@x.com");
        assert_eq!(updated["cpf"], "48472338088");

        let deleted = send(&app, Method::DELETE, &uri, "application/json", "").await;
        assert_eq!(deleted.status(), StatusCode::OK);
        assert_eq!(
            json_body(deleted).await["message"],
            "User deleted successfully"
        );

        let missing = send(&app, Method::GET, &uri, "application/json", "").await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(missing).await["error"], "The user does not exist");
    }

    #[tokio::test]
    async fn invalid_ids_and_patches_are_bad_requests() {
        let (app, users) = imported_app().await;

        let response = send(&app, Method::GET, "/user/42", "application/json", "").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"],
            "The user ID is not a valid UUID"
        );

        let uri = format!("/user/{}", users[1]["id"].as_str().expect("id"));
        let response = send(&app, Method::PUT, &uri, "application/json", r#"{"cpf":"48992300088"}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "The user cpf is not valid");

        let response = send(&app, Method::PUT, &uri, "application/json", r#"{"cpf":"48472338088"}"#).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn eligibility_without_employee_record_is_not_found() {
        let (app, users) = imported_app().await;
        let uri = format!("/eligibility/{}", users[0]["id"].as_str().expect("id"));

        let response = send(&app, Method::GET, &uri, "application/json", "").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(response).await["error"],
            "Employee not active in any partner company."
        );
    }

    #[tokio::test]
    async fn eligibility_reports_seeded_employees() {
        let services = Services::in_memory(EligibilityPolicy::default());
        let today = services.users.now().date();
        let seeded = crate::demo::seed(&services, today).expect("seeded");
        let app = app(services);

        let uri = format!("/eligibility/{}", seeded[0].user_id);
        let response = send(&app, Method::GET, &uri, "application/json", "").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "eligible": true, "message": "Employee is eligible for consigned credit." })
        );
    }

    #[tokio::test]
    async fn operational_endpoints_respond() {
        let app = app(Services::in_memory(EligibilityPolicy::default()));

        let health = send(&app, Method::GET, "/health", "application/json", "").await;
        assert_eq!(health.status(), StatusCode::OK);

        let ready = send(&app, Method::GET, "/ready", "application/json", "").await;
        assert_eq!(json_body(ready).await["status"], "ready");

        let metrics = send(&app, Method::GET, "/metrics", "text/plain", "").await;
        assert_eq!(metrics.status(), StatusCode::OK);
    }
}
