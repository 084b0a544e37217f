//! HTTP server exposing studio sessions as a JSON API

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::config::Config;
use crate::core::{
    CatalogError, Message, Provider, ProviderInfo, SessionError, SessionStore, SettingsError,
    SubmitOutcome, Toggle, VisionOutcome,
};
use crate::dashboard::{self, ComparisonView, DashboardView};
use crate::llm::SamplingConfig;
use crate::services::StudioService;
use crate::vision::ImageUpload;
use crate::voice::{VoiceError, VoiceSettings};

/// Shared application state
pub struct AppState {
    pub service: StudioService,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(service: StudioService) -> Self {
        Self {
            service,
            sessions: SessionStore::new(),
        }
    }
}

/// JSON error body with a status code
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: e.to_string(),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        Self::bad_request(e.to_string())
    }
}

impl From<SettingsError> for ApiError {
    fn from(e: SettingsError) -> Self {
        Self::bad_request(e.to_string())
    }
}

impl From<VoiceError> for ApiError {
    fn from(e: VoiceError) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: e.to_string(),
        }
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    source: String,
    sessions: usize,
    /// Provider id -> whether its calls can currently succeed
    providers: BTreeMap<&'static str, bool>,
}

#[derive(Debug, Serialize)]
struct SessionCreated {
    id: Uuid,
    view: DashboardView,
}

#[derive(Debug, Deserialize)]
struct SendMessageRequest {
    message: String,
}

#[derive(Debug, Serialize)]
struct SendMessageResponse {
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<Message>,
    view: DashboardView,
}

#[derive(Debug, Deserialize)]
struct SetProviderRequest {
    provider: String,
}

#[derive(Debug, Deserialize)]
struct SetModelRequest {
    model: String,
}

/// Toggles to change; omitted ones keep their value
#[derive(Debug, Deserialize)]
struct SetTogglesRequest {
    #[serde(default)]
    voice: Option<bool>,
    #[serde(default)]
    vision: Option<bool>,
    #[serde(default)]
    multi_provider: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct SetSamplingRequest {
    #[serde(default)]
    temperature: Option<f32>,
    #[serde(default)]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct SetVoiceRequest {
    #[serde(default)]
    speed: Option<f32>,
    #[serde(default)]
    pitch: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct CompareRequest {
    prompt: String,
}

#[derive(Debug, Deserialize)]
struct VisionRequest {
    /// Base64-encoded JPEG, PNG or GIF
    image: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    question: String,
}

#[derive(Debug, Serialize)]
struct VisionResponse {
    result: VisionOutcome,
    view: DashboardView,
}

/// Build the API router around shared state
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/providers", get(list_providers))
        .route("/sessions", post(create_session))
        .route("/sessions/:id", axum::routing::delete(delete_session))
        .route("/sessions/:id/view", get(get_view))
        .route("/sessions/:id/messages", post(send_message))
        .route("/sessions/:id/provider", put(set_provider))
        .route("/sessions/:id/model", put(set_model))
        .route("/sessions/:id/toggles", put(set_toggles))
        .route("/sessions/:id/sampling", put(set_sampling))
        .route("/sessions/:id/voice", put(set_voice))
        .route("/sessions/:id/recording/start", post(start_recording))
        .route("/sessions/:id/recording/stop", post(stop_recording))
        .route("/sessions/:id/compare", post(compare))
        .route("/sessions/:id/vision", post(analyze_image))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_http_server(config: &Config, host: &str, port: u16) -> Result<()> {
    let service = StudioService::from_config(config)?;
    let state = Arc::new(AppState::new(service));

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("HTTP server listening on {}", addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::VERSION,
        source: state.service.controller.source_name().to_string(),
        sessions: state.sessions.len(),
        providers: state
            .service
            .catalog
            .providers()
            .map(|p| (p.id(), state.service.controller.is_available(p)))
            .collect(),
    })
}

async fn list_providers(State(state): State<Arc<AppState>>) -> Json<Vec<ProviderInfo>> {
    Json(state.service.catalog.list())
}

async fn create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.service.new_session();
    let view = dashboard::render(&session, &state.service.catalog);
    let id = state.sessions.create(session);
    (StatusCode::CREATED, Json(SessionCreated { id, view }))
}

async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.sessions.remove(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_view(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<DashboardView>> {
    let session = state.sessions.get(&id)?;
    let session = session.lock().await;
    Ok(Json(dashboard::render(&session, &state.service.catalog)))
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<Json<SendMessageResponse>> {
    let session = state.sessions.get(&id)?;
    let mut session = session.lock().await;
    let session = &mut *session;

    let selection = session.selection.clone();
    let outcome = state
        .service
        .controller
        .submit(&mut session.transcript, &req.message, &selection, &session.sampling)
        .await;

    let (label, error) = match &outcome {
        SubmitOutcome::Ignored => ("ignored", None),
        SubmitOutcome::Replied => ("replied", None),
        SubmitOutcome::Failed(e) => ("failed", Some(e.to_string())),
        SubmitOutcome::Cancelled => ("cancelled", None),
    };
    let reply = if outcome.is_ignored() {
        None
    } else {
        session.transcript.last().cloned()
    };

    Ok(Json(SendMessageResponse {
        outcome: label,
        error,
        reply,
        view: dashboard::render(session, &state.service.catalog),
    }))
}

async fn set_provider(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SetProviderRequest>,
) -> ApiResult<Json<DashboardView>> {
    let provider: Provider = req.provider.parse()?;
    let session = state.sessions.get(&id)?;
    let mut session = session.lock().await;
    session.set_provider(&state.service.catalog, provider);
    Ok(Json(dashboard::render(&session, &state.service.catalog)))
}

async fn set_model(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SetModelRequest>,
) -> ApiResult<Json<DashboardView>> {
    let session = state.sessions.get(&id)?;
    let mut session = session.lock().await;
    session.set_model(&state.service.catalog, &req.model)?;
    Ok(Json(dashboard::render(&session, &state.service.catalog)))
}

async fn set_toggles(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SetTogglesRequest>,
) -> ApiResult<Json<DashboardView>> {
    let session = state.sessions.get(&id)?;
    let mut session = session.lock().await;
    let updates = [
        (Toggle::Voice, req.voice),
        (Toggle::Vision, req.vision),
        (Toggle::MultiProvider, req.multi_provider),
    ];
    for (toggle, value) in updates {
        if let Some(value) = value {
            session.toggles.set(toggle, value);
        }
    }
    Ok(Json(dashboard::render(&session, &state.service.catalog)))
}

async fn set_sampling(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SetSamplingRequest>,
) -> ApiResult<Json<DashboardView>> {
    let session = state.sessions.get(&id)?;
    let mut session = session.lock().await;
    // Validate both values before applying either
    let sampling = SamplingConfig::new(
        req.temperature.unwrap_or(session.sampling.temperature()),
        req.max_tokens.unwrap_or(session.sampling.max_tokens()),
    )?;
    session.sampling = sampling;
    Ok(Json(dashboard::render(&session, &state.service.catalog)))
}

async fn set_voice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SetVoiceRequest>,
) -> ApiResult<Json<DashboardView>> {
    let session = state.sessions.get(&id)?;
    let mut session = session.lock().await;
    let voice = VoiceSettings::new(
        req.speed.unwrap_or(session.voice.speed()),
        req.pitch.unwrap_or(session.voice.pitch()),
    )?;
    session.voice = voice;
    Ok(Json(dashboard::render(&session, &state.service.catalog)))
}

async fn start_recording(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<DashboardView>> {
    let session = state.sessions.get(&id)?;
    let mut session = session.lock().await;
    session.start_recording()?;
    Ok(Json(dashboard::render(&session, &state.service.catalog)))
}

async fn stop_recording(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<DashboardView>> {
    let session = state.sessions.get(&id)?;
    let mut session = session.lock().await;
    let clip = session.stop_recording()?;
    tracing::debug!(session = %id, bytes = clip.bytes.len(), "Recording stopped");
    Ok(Json(dashboard::render(&session, &state.service.catalog)))
}

async fn compare(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CompareRequest>,
) -> ApiResult<Response> {
    let session = state.sessions.get(&id)?;
    let mut session = session.lock().await;
    let catalog = &state.service.catalog;

    let report = state
        .service
        .controller
        .compare_all(&req.prompt, &session.selection, catalog, &session.sampling)
        .await;
    let Some(report) = report else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let view: ComparisonView = dashboard::comparison_view(Some(&report), catalog);
    session.last_comparison = Some(report);
    Ok(Json(view).into_response())
}

async fn analyze_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<VisionRequest>,
) -> ApiResult<Json<VisionResponse>> {
    let session = state.sessions.get(&id)?;
    let mut session = session.lock().await;
    if !session.toggles.vision_enabled {
        return Err(ApiError::bad_request("Vision is disabled for this session"));
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(req.image.trim())
        .map_err(|e| ApiError::bad_request(format!("Invalid base64 image: {}", e)))?;
    let name = req.name.unwrap_or_else(|| "upload".to_string());
    let upload = match ImageUpload::from_bytes(name, bytes) {
        Ok(upload) => upload,
        Err(e) => {
            session.record_vision_error(&req.question, &e);
            return Err(ApiError::bad_request(e.to_string()));
        }
    };

    let result = state
        .service
        .vision
        .analyze(&upload, &req.question, &session.selection)
        .await;
    session.record_vision(&upload, &req.question, result);

    let outcome = session
        .vision
        .last_result
        .clone()
        .unwrap_or_else(|| VisionOutcome::Error("No result".to_string()));
    Ok(Json(VisionResponse {
        result: outcome,
        view: dashboard::render(&session, &state.service.catalog),
    }))
}
