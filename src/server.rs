use crate::config::Config;
use crate::engines::{EngineInfo, EngineRegistry};
use crate::error::{ErrorResponse, OcrError};
use crate::session::{Screen, Session, SessionSnapshot};
use crate::tool_config::Tool;
use crate::upload::{Upload, FREE_TIER_MAX_BYTES};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

const DOWNLOAD_FILE_NAME: &str = "extracted_text.txt";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engines: Arc<EngineRegistry>,
    pub config: Arc<Config>,
    /// The single interactive session. Holding the lock for a whole
    /// extraction serializes user actions.
    pub session: Arc<Mutex<Session>>,
}

impl AppState {
    pub fn new(config: Config, engines: EngineRegistry) -> Self {
        Self {
            engines: Arc::new(engines),
            config: Arc::new(config),
            session: Arc::new(Mutex::new(Session::new())),
        }
    }
}

/// OCR response
#[derive(Serialize)]
pub struct OcrResponse {
    pub text: String,
    pub text_found: bool,
    pub tool: Tool,
    pub processing_time_ms: u64,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server info response
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub tools: Vec<EngineInfo>,
    pub free_tier_max_bytes: usize,
    pub max_upload_size_bytes: usize,
}

#[derive(Deserialize)]
pub struct SelectToolRequest {
    pub tool: Tool,
}

#[derive(Deserialize)]
pub struct NavigateRequest {
    pub to: Screen,
}

#[derive(Deserialize)]
pub struct ApiKeyRequest {
    pub api_key: String,
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let engines = EngineRegistry::new(&config);
    let addr = format!("{}:{}", config.host, config.port);

    let app = router(AppState::new(config, engines));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    let max_upload_size = state.config.max_upload_size;

    Router::new()
        .route("/ocr", post(handle_ocr))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .route("/session", get(handle_session))
        .route("/session/tool", post(handle_select_tool))
        .route("/session/navigate", post(handle_navigate))
        .route("/session/config", patch(handle_update_config))
        .route("/session/api-key", put(handle_set_api_key))
        .route("/result.txt", get(handle_download))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .with_state(state)
}

/// Handle one extraction for the current session
async fn handle_ocr(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<OcrResponse>, OcrError> {
    let mut upload = Upload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| OcrError::InvalidRequest(format!("Failed to parse multipart: {}", e)))?
    {
        if field.name() == Some("file") {
            upload.file_name = field.file_name().unwrap_or_default().to_string();
            upload.bytes = field
                .bytes()
                .await
                .map_err(|e| OcrError::InvalidRequest(format!("Failed to read file data: {}", e)))?
                .to_vec();
        }
    }

    let mut session = state.session.lock().await;
    let (config, api_key) = session.extraction_context()?;
    let tool = config.tool();
    let engine = state
        .engines
        .get(tool)
        .ok_or_else(|| OcrError::Internal(format!("No engine registered for {}", tool)))?;

    let start = Instant::now();
    tracing::info!(
        "Extracting text from '{}' ({} bytes) with {}",
        upload.file_name,
        upload.bytes.len(),
        tool
    );

    let outcome = engine.extract(&upload, &config, &api_key).await;
    let processing_time_ms = start.elapsed().as_millis() as u64;
    session.record_result(&outcome);

    match outcome {
        Ok(text) => {
            tracing::info!(
                "Extraction completed in {}ms, text length: {}",
                processing_time_ms,
                text.len()
            );
            Ok(Json(OcrResponse {
                text,
                text_found: true,
                tool,
                processing_time_ms,
            }))
        }
        Err(OcrError::NoTextExtracted) => {
            tracing::info!("Extraction completed in {}ms, no text found", processing_time_ms);
            Ok(Json(OcrResponse {
                text: session.last_result().to_string(),
                text_found: false,
                tool,
                processing_time_ms,
            }))
        }
        Err(e) => {
            if e.is_input_error() {
                tracing::info!("Upload rejected: {}", e);
            } else {
                tracing::warn!("Extraction failed after {}ms: {}", processing_time_ms, e);
            }
            Err(e)
        }
    }
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle info requests
async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        tools: state.engines.info(),
        free_tier_max_bytes: FREE_TIER_MAX_BYTES,
        max_upload_size_bytes: state.config.max_upload_size,
    })
}

async fn handle_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.session.lock().await.snapshot())
}

async fn handle_select_tool(
    State(state): State<AppState>,
    Json(request): Json<SelectToolRequest>,
) -> Result<Json<SessionSnapshot>, OcrError> {
    let mut session = state.session.lock().await;
    session.select_tool(request.tool)?;
    Ok(Json(session.snapshot()))
}

async fn handle_navigate(
    State(state): State<AppState>,
    Json(request): Json<NavigateRequest>,
) -> Result<Json<SessionSnapshot>, OcrError> {
    let mut session = state.session.lock().await;
    match (request.to, session.screen()) {
        (Screen::Home, _) => session.go_home(),
        (Screen::Config, Screen::Extraction) => session.back_to_config()?,
        (Screen::Config, _) => session.go_to_config()?,
        (Screen::Extraction, _) => session.proceed_to_extraction()?,
    }
    Ok(Json(session.snapshot()))
}

async fn handle_update_config(
    State(state): State<AppState>,
    Json(patch): Json<Map<String, Value>>,
) -> Result<Json<SessionSnapshot>, OcrError> {
    let mut session = state.session.lock().await;
    session.update_config(patch)?;
    Ok(Json(session.snapshot()))
}

async fn handle_set_api_key(
    State(state): State<AppState>,
    Json(request): Json<ApiKeyRequest>,
) -> Json<SessionSnapshot> {
    let mut session = state.session.lock().await;
    session.set_api_key(request.api_key);
    Json(session.snapshot())
}

/// Offer the last result as a plain-text attachment
async fn handle_download(State(state): State<AppState>) -> Response {
    let session = state.session.lock().await;
    if session.last_result().is_empty() {
        let body = Json(ErrorResponse {
            error: "No extraction result to download".to_string(),
            code: "NO_RESULT".to_string(),
        });
        return (StatusCode::NOT_FOUND, body).into_response();
    }

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", DOWNLOAD_FILE_NAME),
            ),
        ],
        session.last_result().to_string(),
    )
        .into_response()
}
