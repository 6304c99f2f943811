use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::{
    GenerationSummary, NewEntry, Timetable, TimetableEngine, TimetableEntry, TimetableError,
    TimetableStats,
    conflict::Conflict,
    diagnostics::ScheduleWarning,
    timetable::TimetableData,
    view::{EntryRow, ViewFilter},
};

#[derive(Clone)]
pub struct AppState {
    timetable: Arc<RwLock<Timetable>>,
    engine: Arc<TimetableEngine>,
}

impl AppState {
    pub fn new(timetable: Timetable, engine: TimetableEngine) -> Self {
        Self {
            timetable: Arc::new(RwLock::new(timetable)),
            engine: Arc::new(engine),
        }
    }

    pub fn with_shared(timetable: Arc<RwLock<Timetable>>, engine: Arc<TimetableEngine>) -> Self {
        Self { timetable, engine }
    }

    fn timetable(&self) -> Arc<RwLock<Timetable>> {
        self.timetable.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<TimetableError> for ApiError {
    fn from(value: TimetableError) -> Self {
        match value {
            TimetableError::Conflict(_) | TimetableError::DuplicateId { .. } => {
                ApiError::Conflict(value.to_string())
            }
            TimetableError::NotFound { .. } => ApiError::NotFound(value.to_string()),
            other => ApiError::Invalid(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/snapshot", get(get_snapshot).put(replace_snapshot))
        .route("/stats", get(stats))
        .route("/entries", get(list_entries).post(create_entry))
        .route("/entries/:id", delete(delete_entry))
        .route("/generate", post(generate))
        .route("/warnings", get(warnings))
        .route("/audit", get(audit))
        .route("/timetable", get(master_timetable))
        .route("/timetable/class/:id", get(class_timetable))
        .route("/timetable/teacher/:id", get(teacher_timetable))
        .route("/time_slots/:id", delete(delete_time_slot))
        .route("/subjects/:id", delete(delete_subject))
        .route("/teachers/:id", delete(delete_teacher))
        .route("/classes/:id", delete(delete_class))
        .route("/lab_rooms/:id", delete(delete_lab_room))
        .with_state(state)
}

pub async fn serve(
    addr: SocketAddr,
    timetable: Timetable,
    engine: TimetableEngine,
) -> std::io::Result<()> {
    let state = AppState::new(timetable, engine);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "http api listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_snapshot(State(state): State<AppState>) -> Json<TimetableData> {
    let timetable = state.timetable();
    let data = timetable.read().to_data();
    Json(data)
}

async fn replace_snapshot(
    State(state): State<AppState>,
    Json(data): Json<TimetableData>,
) -> Result<Json<TimetableData>, ApiError> {
    let replacement =
        Timetable::from_data(data).map_err(|err| ApiError::invalid(err.to_string()))?;
    let timetable = state.timetable();
    let current = {
        let mut guard = timetable.write();
        *guard = replacement;
        guard.to_data()
    };
    Ok(Json(current))
}

async fn stats(State(state): State<AppState>) -> Json<TimetableStats> {
    let timetable = state.timetable();
    let stats = timetable.read().stats();
    Json(stats)
}

async fn list_entries(State(state): State<AppState>) -> Json<Vec<TimetableEntry>> {
    let timetable = state.timetable();
    let entries = timetable.read().entries().to_vec();
    Json(entries)
}

async fn create_entry(
    State(state): State<AppState>,
    Json(entry): Json<NewEntry>,
) -> Result<(StatusCode, Json<TimetableEntry>), ApiError> {
    let timetable = state.timetable();
    let created = {
        let mut guard = timetable.write();
        guard.add_entry(entry)?
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn delete_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let timetable = state.timetable();
    let removed = timetable.write().remove_entry(&entry_id);
    if !removed {
        return Err(ApiError::not_found(format!("entry {entry_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn generate(State(state): State<AppState>) -> Result<Json<GenerationSummary>, ApiError> {
    let timetable = state.timetable();
    let summary = {
        let mut guard = timetable.write();
        guard
            .generate(&state.engine)
            .map_err(|err| ApiError::invalid(err.to_string()))?
    };
    Ok(Json(summary))
}

async fn warnings(State(state): State<AppState>) -> Json<Vec<ScheduleWarning>> {
    let timetable = state.timetable();
    let warnings = timetable.read().warnings().to_vec();
    Json(warnings)
}

async fn audit(State(state): State<AppState>) -> Json<Vec<Conflict>> {
    let timetable = state.timetable();
    let conflicts = timetable.read().audit();
    Json(conflicts)
}

async fn master_timetable(State(state): State<AppState>) -> Json<Vec<EntryRow>> {
    let timetable = state.timetable();
    let rows = timetable.read().rows(&ViewFilter::Master);
    Json(rows)
}

async fn class_timetable(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
) -> Result<Json<Vec<EntryRow>>, ApiError> {
    let timetable = state.timetable();
    let guard = timetable.read();
    if guard.resources().class(&class_id).is_none() {
        return Err(ApiError::not_found(format!("class {class_id} not found")));
    }
    Ok(Json(guard.rows(&ViewFilter::Class(class_id))))
}

async fn teacher_timetable(
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
) -> Result<Json<Vec<EntryRow>>, ApiError> {
    let timetable = state.timetable();
    let guard = timetable.read();
    if guard.resources().teacher(&teacher_id).is_none() {
        return Err(ApiError::not_found(format!(
            "teacher {teacher_id} not found"
        )));
    }
    Ok(Json(guard.rows(&ViewFilter::Teacher(teacher_id))))
}

fn removed_or_not_found(removed: bool, kind: &str, id: &str) -> Result<StatusCode, ApiError> {
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("{kind} {id} not found")))
    }
}

async fn delete_time_slot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let removed = state.timetable().write().remove_time_slot(&id);
    removed_or_not_found(removed, "time slot", &id)
}

async fn delete_subject(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let removed = state.timetable().write().remove_subject(&id);
    removed_or_not_found(removed, "subject", &id)
}

async fn delete_teacher(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let removed = state.timetable().write().remove_teacher(&id);
    removed_or_not_found(removed, "teacher", &id)
}

async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let removed = state.timetable().write().remove_class(&id);
    removed_or_not_found(removed, "class", &id)
}

async fn delete_lab_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let removed = state.timetable().write().remove_lab_room(&id);
    removed_or_not_found(removed, "lab room", &id)
}
