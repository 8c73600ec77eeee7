//! HTTP server for the Monday item normalizer.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/health`         | Health check                         |
//! | POST   | `/api/transform`  | Normalize a batch of Monday items    |
//! | GET    | `/api/logs`       | SSE stream for real-time logs        |

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{error_response, TransformRequest, TransformResponse};
use crate::error::{PipelineError, ServerError, ServerResult};
use crate::transform::pipeline::{execute, TransformOptions};
use crate::transform::RecordDefaults;

/// Shared handler state.
#[derive(Debug, Clone)]
struct AppState {
    defaults: Arc<RecordDefaults>,
}

/// Start the HTTP server
pub async fn start_server(port: u16) -> ServerResult<()> {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let app = router(RecordDefaults::from_env()).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    eprintln!("🚀 Monday parser running on http://localhost:{}", port);
    eprintln!("   POST /api/transform - Normalize items");
    eprintln!("   GET  /api/logs      - SSE log stream");
    eprintln!("   GET  /health        - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(defaults: RecordDefaults) -> Router {
    let state = AppState {
        defaults: Arc::new(defaults),
    };

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/transform", post(transform))
        .route("/api/logs", get(sse_logs))
        .with_state(state)
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "monday-parser",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "transform": "POST /api/transform",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        // Lagged receivers skip missed entries
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Batch transform endpoint
async fn transform(
    State(state): State<AppState>,
    payload: Result<Json<TransformRequest>, JsonRejection>,
) -> ServerResult<Json<TransformResponse>> {
    let Json(request) = payload.map_err(|e| ServerError::BadRequest(e.body_text()))?;

    log_info(format!("📥 Transform request: {} item(s)", request.items.len()));

    let options = TransformOptions {
        operation: request
            .operation
            .clone()
            .unwrap_or_else(|| TransformOptions::default().operation),
        continue_on_fail: request.continue_on_fail,
        defaults: (*state.defaults).clone(),
    };

    let result = execute(&request.batch(), &options)?;

    Ok(Json(TransformResponse::from(result)))
}

/// Request faults map to 400, everything else to 500.
impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Pipeline(PipelineError::Io(_) | PipelineError::Json(_))
            | ServerError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServerError::Pipeline(_) => StatusCode::BAD_REQUEST,
        };

        let message = self.to_string();
        log_error(message.as_str());
        (status, Json(error_response(&message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> State<AppState> {
        State(AppState {
            defaults: Arc::new(RecordDefaults::default()),
        })
    }

    fn item(id: &str) -> Value {
        json!({
            "id": id,
            "name": "Task",
            "column_values": [
                { "id": "status", "type": "status", "value": "{\"index\":1}", "text": "Done" }
            ]
        })
    }

    async fn run(request: TransformRequest) -> ServerResult<Json<TransformResponse>> {
        transform(state(), Ok(Json(request))).await
    }

    async fn error_body(err: ServerError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "monday-parser");
    }

    #[tokio::test]
    async fn test_transform_ok() {
        let request = TransformRequest {
            items: vec![item("1"), item("2")],
            ..TransformRequest::default()
        };
        let Json(response) = run(request).await.unwrap();

        assert_eq!(response.status, "ok");
        assert_eq!(response.metadata.total, 2);
        assert_eq!(response.items[0].json["mappable_column_values"]["status"], "Done");
        assert_eq!(response.items[0].json["board"]["id"], "1234567890");
    }

    #[tokio::test]
    async fn test_transform_unsupported_operation() {
        let request = TransformRequest {
            items: vec![item("1")],
            operation: Some("delete".to_string()),
            ..TransformRequest::default()
        };
        let err = run(request).await.unwrap_err();
        assert!(matches!(err, ServerError::Pipeline(PipelineError::UnsupportedOperation(_))));

        let (status, body) = error_body(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert!(body["error"].as_str().unwrap().contains("delete"));
    }

    #[tokio::test]
    async fn test_transform_partial() {
        let request = TransformRequest {
            items: vec![json!(42), item("2")],
            continue_on_fail: true,
            ..TransformRequest::default()
        };
        let Json(response) = run(request).await.unwrap();

        assert_eq!(response.status, "partial");
        assert_eq!(response.metadata.failed, 1);
        assert_eq!(response.items[0].json, json!({}));
    }

    #[tokio::test]
    async fn test_transform_abort_is_bad_request() {
        let request = TransformRequest {
            items: vec![json!("not an item")],
            ..TransformRequest::default()
        };
        let err = run(request).await.unwrap_err();
        assert!(matches!(err, ServerError::Pipeline(PipelineError::Item { index: 0, .. })));

        let (status, _) = error_body(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_error_status_mapping() {
        let (status, body) = error_body(ServerError::BadRequest("missing body".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("missing body"));

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        let (status, _) = error_body(ServerError::Io(io)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
