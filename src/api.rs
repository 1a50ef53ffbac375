use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::constants::log_format;
use crate::error::{Result, SurveyError};
use crate::render::session_page;
use crate::session::Choice;
use crate::survey::{SessionView, SurveyService};

pub struct AppState {
    pub survey: SurveyService,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            survey: SurveyService::new(&config),
            config,
        }
    }
}

impl IntoResponse for SurveyError {
    fn into_response(self) -> Response {
        let status = match &self {
            SurveyError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(start_session))
        .route("/health", get(health))
        .route("/session/{id}", get(show_session))
        .route("/session/{id}/choice", post(submit_choice_form))
        .route("/session/{id}/reset", post(reset_form))
        .route("/api/session", post(api_start_session))
        .route("/api/session/{id}", get(api_view))
        .route("/api/session/{id}/choice", post(api_submit_choice))
        .route("/api/session/{id}/reset", post(api_reset))
        .route("/export", post(export_responses))
        .with_state(state)
}

pub async fn run_server(state: Arc<AppState>) -> Result<()> {
    let addr = state.config.bind_addr.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;
    info!("Survey server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Session calls may append to the response log, so they run off the async workers.
async fn blocking<T, F>(state: &Arc<AppState>, f: F) -> Result<T>
where
    F: FnOnce(&SurveyService) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || f(&state.survey)).await?
}

#[derive(Deserialize)]
struct ChoiceForm {
    choice: String,
}

#[derive(Deserialize)]
struct ExportForm {
    password: String,
}

async fn health() -> &'static str {
    "ok"
}

async fn start_session(State(state): State<Arc<AppState>>) -> Redirect {
    let id = state.survey.start_session();
    Redirect::to(&format!("/session/{}", id))
}

async fn show_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>> {
    let view = blocking(&state, move |survey| survey.view(id)).await?;
    Ok(Html(session_page(&view, state.survey.export_enabled())))
}

async fn submit_choice_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Form(form): Form<ChoiceForm>,
) -> Result<Redirect> {
    let choice: Choice = form.choice.parse()?;
    blocking(&state, move |survey| survey.submit(id, choice)).await?;
    Ok(Redirect::to(&format!("/session/{}", id)))
}

async fn reset_form(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Result<Redirect> {
    state.survey.reset(id)?;
    Ok(Redirect::to(&format!("/session/{}", id)))
}

async fn api_start_session(State(state): State<Arc<AppState>>) -> Result<(StatusCode, Json<SessionView>)> {
    let id = state.survey.start_session();
    let view = state.survey.view(id)?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn api_view(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>> {
    Ok(Json(blocking(&state, move |survey| survey.view(id)).await?))
}

async fn api_submit_choice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<ChoiceForm>,
) -> Result<Json<SessionView>> {
    let choice: Choice = body.choice.parse()?;
    Ok(Json(blocking(&state, move |survey| survey.submit(id, choice)).await?))
}

async fn api_reset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>> {
    Ok(Json(state.survey.reset(id)?))
}

async fn export_responses(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ExportForm>,
) -> Response {
    let exported = blocking(&state, move |survey| Ok(survey.export(&form.password))).await;
    match exported {
        Ok(Some(bytes)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, log_format::EXPORT_MIME.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", log_format::EXPORT_FILE_NAME),
                ),
            ],
            bytes,
        )
            .into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => e.into_response(),
    }
}
