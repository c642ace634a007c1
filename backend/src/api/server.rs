//! HTTP Server for the Remesas API.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                               |
//! |--------|-------------------|-------------------------------------------|
//! | GET    | `/health`         | Health check                              |
//! | POST   | `/api/upload`     | Upload an export, get the report as JSON  |
//! | POST   | `/api/download`   | Upload an export, get the report as CSV   |
//! | GET    | `/api/logs`       | SSE stream for real-time logs             |

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
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

use super::logs::{log_info, LOG_BROADCASTER};
use super::types::{error_response, UploadResponse};
use crate::config::Config;
use crate::error::{ServerError, ServerResult};
use crate::transform::pipeline::{
    failure_notice, report_failure, selected_file_notice, transform_bytes, PipelineResult,
    TransformOptions, NO_FILE_WARNING,
};

/// Multipart field holding the export.
const FILE_FIELD: &str = "file";

/// Shared handler state
#[derive(Clone)]
struct AppState {
    options: Arc<TransformOptions>,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ServerError::Pipeline(err) => (StatusCode::UNPROCESSABLE_ENTITY, failure_notice(err)),
            ServerError::Io(err) => (StatusCode::INTERNAL_SERVER_ERROR, failure_notice(err)),
            ServerError::Task(err) => (StatusCode::INTERNAL_SERVER_ERROR, failure_notice(err)),
        };
        (status, Json(error_response(&message))).into_response()
    }
}

/// Build the application router.
pub fn router(config: &Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    let state = AppState {
        options: Arc::new(TransformOptions {
            sheet: config.sheet.clone(),
            delimiter: None,
        }),
    };

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/upload", post(upload))
        .route("/api/download", post(download))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> ServerResult<()> {
    let app = router(&config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    println!("🚀 Remesas server running on http://localhost:{}", config.port);
    println!("   POST /api/upload   - Upload export, JSON report");
    println!("   POST /api/download - Upload export, CSV report");
    println!("   GET  /api/logs     - SSE log stream");
    println!("   GET  /health       - Health check");
    println!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "remesas",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "upload": "POST /api/upload",
            "download": "POST /api/download",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload endpoint: report as JSON
async fn upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ServerError> {
    let result = run_upload(&state, multipart).await?;
    Ok(Json(UploadResponse::from(result)))
}

/// Download endpoint: report as a CSV attachment
async fn download(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ServerError> {
    let result = run_upload(&state, multipart).await?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (header::CONTENT_DISPOSITION, content_disposition(&result.file_name)),
    ];
    Ok((headers, result.csv).into_response())
}

async fn run_upload(state: &AppState, multipart: Multipart) -> ServerResult<PipelineResult> {
    let (file_name, bytes) = read_file_field(multipart).await?;

    println!("\n{}", "=".repeat(70));
    log_info(selected_file_notice(&file_name));
    println!("{}\n", "=".repeat(70));

    // Parsing and rendering are CPU-bound; keep them off the async workers.
    let options = Arc::clone(&state.options);
    let result = tokio::task::spawn_blocking(move || {
        transform_bytes(&bytes, &file_name, &options).map_err(report_failure)
    })
    .await??;

    Ok(result)
}

/// Pull the uploaded file out of the form.
///
/// A browser submitting an empty file input still sends the part, with no
/// name and no bytes; that counts as no file.
async fn read_file_field(mut multipart: Multipart) -> ServerResult<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_default();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;

        if file_name.is_empty() && bytes.is_empty() {
            break;
        }
        let file_name = if file_name.is_empty() { "reporte".to_string() } else { file_name };
        return Ok((file_name, bytes.to_vec()));
    }

    Err(ServerError::BadRequest(NO_FILE_WARNING.to_string()))
}

/// `Content-Disposition` value for the report download.
fn content_disposition(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}
