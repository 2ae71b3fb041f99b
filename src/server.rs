//! HTTP API.
//!
//! | Method | Path                      | Response                          |
//! |--------|---------------------------|-----------------------------------|
//! | GET    | `/`                       | liveness payload                  |
//! | POST   | `/read-folder`            | the new `pending` task record     |
//! | GET    | `/read-folder/{task_id}`  | the current task record, or 404   |
//! | GET    | `/tasks?status=`          | task summaries keyed by id        |
//! | GET    | `/stats`                  | counters over every task          |
//!
//! Errors are returned as `{"detail": "..."}`.

use crate::cli::ServeArgs;
use crate::error::{ErrorKind, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use docscan_config::ServerConfig;
use docscan_tasks::error::{Error as TaskError, ErrorKind as TaskErrorKind};
use docscan_tasks::{Coordinator, GlobalStats, ScanTask, TaskListing};
use exn::ResultExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;

pub const SERVICE_NAME: &str = "docscan";

pub fn router(coordinator: Coordinator) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/read-folder", post(read_folder))
        .route("/read-folder/{task_id}", get(get_task))
        .route("/tasks", get(list_tasks))
        .route("/stats", get(stats))
        .with_state(coordinator)
}

/// Serve the API until Ctrl+C.
pub async fn serve(config: &ServerConfig, args: ServeArgs, coordinator: Coordinator) -> Result<()> {
    let host = args.host.unwrap_or_else(|| config.host.clone());
    let port = args.port.unwrap_or(config.port);
    let address = format!("{host}:{port}");
    let listener = TcpListener::bind((host.as_str(), port))
        .await
        .or_raise(|| ErrorKind::Bind(address.clone()))?;
    tracing::info!(%address, "Listening");
    axum::serve(listener, router(coordinator))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .or_raise(|| ErrorKind::Server)?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub service: String,
    pub version: String,
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Debug, Deserialize)]
pub struct FolderScanRequest {
    pub folder_path: String,
    pub max_file_size_mb: Option<u32>,
}

async fn read_folder(
    State(coordinator): State<Coordinator>,
    payload: std::result::Result<Json<FolderScanRequest>, JsonRejection>,
) -> std::result::Result<Json<ScanTask>, ApiError> {
    let Json(request) = payload?;
    let task = coordinator.submit(request.folder_path, request.max_file_size_mb).await?;
    Ok(Json(task))
}

async fn get_task(
    State(coordinator): State<Coordinator>,
    Path(task_id): Path<String>,
) -> std::result::Result<Json<Arc<ScanTask>>, ApiError> {
    Ok(Json(coordinator.get_task(&task_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

async fn list_tasks(
    State(coordinator): State<Coordinator>,
    Query(query): Query<ListQuery>,
) -> std::result::Result<Json<TaskListing>, ApiError> {
    Ok(Json(coordinator.list_tasks(query.status.as_deref()).await?))
}

async fn stats(State(coordinator): State<Coordinator>) -> Json<GlobalStats> {
    Json(coordinator.global_stats().await)
}

/// Error response rendered as `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}
impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        let kind: &TaskErrorKind = &err;
        let status = match kind {
            TaskErrorKind::NotFound(_) => StatusCode::NOT_FOUND,
            TaskErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            kind if kind.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            detail: kind.to_string(),
        }
    }
}
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, detail = %self.detail, "Request failed");
        }
        (self.status, Json(serde_json::json!({ "detail": self.detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header};
    use docscan_tasks::CoordinatorConfig;
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app() -> (Coordinator, Router) {
        let coordinator = Coordinator::new(CoordinatorConfig::default());
        (coordinator.clone(), router(coordinator))
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (_, router) = app();
        let (status, body) = send(&router, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], SERVICE_NAME);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_submit_and_fetch() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("note.txt"), "one two three").unwrap();
        let (coordinator, router) = app();

        let folder = dir.path().to_string_lossy().into_owned();
        let (status, body) = send(&router, post_json("/read-folder", serde_json::json!({ "folder_path": folder }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "pending");
        assert_eq!(body["folder_path"], folder.as_str());
        assert_eq!(body["max_file_size_mb"], 50);
        let task_id = body["task_id"].as_str().unwrap().to_string();

        coordinator.wait_for(&task_id, Duration::from_secs(10)).await.unwrap();
        let (status, body) = send(&router, get(&format!("/read-folder/{task_id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "completed");
        assert_eq!(body["documents"][0]["filename"], "note.txt");
        assert_eq!(body["documents"][0]["word_count"], 3);
        assert_eq!(body["stats"], serde_json::json!({"files_read": 1, "errors_count": 0, "errors": []}));

        let (status, body) = send(&router, get("/tasks?status=completed")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_tasks"], 1);
        assert_eq!(body["tasks"][&task_id]["document_count"], 1);
        assert!(body["tasks"][&task_id].get("documents").is_none());

        let (status, body) = send(&router, get("/stats")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({
                "total_tasks": 1,
                "completed_tasks": 1,
                "failed_tasks": 0,
                "total_documents": 1,
                "total_words": 3
            })
        );
    }

    #[rstest::rstest]
    #[case(serde_json::json!({ "folder_path": "/data", "max_file_size_mb": 0 }))]
    #[case(serde_json::json!({ "folder_path": "/data", "max_file_size_mb": 1001 }))]
    #[case(serde_json::json!({ "folder_path": "/data", "max_file_size_mb": -5 }))]
    #[case(serde_json::json!({ "max_file_size_mb": 10 }))]
    #[tokio::test]
    async fn test_submit_validation(#[case] body: Value) {
        let (coordinator, router) = app();
        let (status, body) = send(&router, post_json("/read-folder", body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().is_some_and(|detail| !detail.is_empty()));
        assert_eq!(coordinator.global_stats().await.total_tasks, 0);
    }

    #[tokio::test]
    async fn test_unknown_task() {
        let (_, router) = app();
        for id in ["00000000-0000-4000-8000-000000000000", "not-a-task"] {
            let (status, body) = send(&router, get(&format!("/read-folder/{id}"))).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["detail"], format!("Task {id} not found"));
        }
    }

    #[tokio::test]
    async fn test_unknown_status_filter() {
        let (_, router) = app();
        let (status, body) = send(&router, get("/tasks?status=archived")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"], "unknown task status: archived");
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let (_, router) = app();
        let (status, body) = send(&router, get("/tasks")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "total_tasks": 0, "tasks": {} }));
    }
}
