use crate::data::{
    AutoScheduleReport, ClearReport, RosterSnapshot, ScheduleRequest, SectionId, TeacherId,
    TeacherLoadRow, TimetableEntry,
};
use crate::engine;
use crate::error::SchedulerError;
use crate::planner::PlannerSettings;
use crate::store::mutations;
use crate::time_grid::TimeGridRegistry;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info};
use rusqlite::Connection;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use tower::limit::GlobalConcurrencyLimitLayer;

/// Shared by every handler. The connection mutex serialises all store work
/// within this process; runs from separate processes against the same
/// database file are only kept apart by SQLite's own locking.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub registry: Arc<TimeGridRegistry>,
    pub settings: PlannerSettings,
}

impl AppState {
    pub fn new(conn: Connection, registry: TimeGridRegistry, settings: PlannerSettings) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            registry: Arc::new(registry),
            settings,
        }
    }

    /// Runs `f` against the connection on the blocking pool.
    async fn with_db<T, F>(&self, f: F) -> Result<T, SchedulerError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection, &TimeGridRegistry, &PlannerSettings) -> Result<T, SchedulerError>
            + Send
            + 'static,
    {
        let db = Arc::clone(&self.db);
        let registry = Arc::clone(&self.registry);
        let settings = self.settings;
        tokio::task::spawn_blocking(move || {
            let mut conn = db
                .lock()
                .map_err(|e| SchedulerError::Worker(format!("connection lock poisoned: {e}")))?;
            f(&mut conn, &registry, &settings)
        })
        .await
        .map_err(|e| SchedulerError::Worker(e.to_string()))?
    }
}

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

fn failure(action: &str, e: SchedulerError) -> (StatusCode, String) {
    let status = if e.is_client_error() {
        match &e {
            SchedulerError::SectionNotFound(_) | SchedulerError::TeacherNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::BAD_REQUEST,
        }
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    error!("{action} failed: {e}");
    (status, format!("{action} failed: {e}"))
}

async fn auto_schedule_handler(
    State(state): State<AppState>,
    Json(request): Json<ScheduleRequest>,
) -> ApiResult<AutoScheduleReport> {
    state
        .with_db(move |conn, registry, settings| {
            engine::auto_schedule(conn, registry, settings, &request)
        })
        .await
        .map(Json)
        .map_err(|e| failure("Auto-schedule", e))
}

async fn clear_handler(
    State(state): State<AppState>,
    Json(request): Json<ScheduleRequest>,
) -> ApiResult<ClearReport> {
    state
        .with_db(move |conn, registry, settings| engine::clear(conn, registry, settings, &request))
        .await
        .map(Json)
        .map_err(|e| failure("Remove", e))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecalculateRequest {
    school_year: String,
}

async fn recalculate_handler(
    State(state): State<AppState>,
    Json(request): Json<RecalculateRequest>,
) -> ApiResult<Vec<TeacherLoadRow>> {
    state
        .with_db(move |conn, _, settings| {
            engine::recalculate_loads(conn, settings, &request.school_year)
        })
        .await
        .map(Json)
        .map_err(|e| failure("Recalculate loads", e))
}

async fn loads_handler(
    State(state): State<AppState>,
    Path(school_year): Path<String>,
) -> ApiResult<Vec<TeacherLoadRow>> {
    state
        .with_db(move |conn, _, _| engine::teacher_loads(conn, &school_year))
        .await
        .map(Json)
        .map_err(|e| failure("Load lookup", e))
}

async fn section_schedule_handler(
    State(state): State<AppState>,
    Path((section_id, school_year)): Path<(SectionId, String)>,
) -> ApiResult<Vec<TimetableEntry>> {
    state
        .with_db(move |conn, registry, _| {
            engine::section_schedule(conn, registry, section_id, &school_year)
        })
        .await
        .map(Json)
        .map_err(|e| failure("Section schedule", e))
}

async fn teacher_schedule_handler(
    State(state): State<AppState>,
    Path((teacher_id, school_year)): Path<(TeacherId, String)>,
) -> ApiResult<Vec<TimetableEntry>> {
    state
        .with_db(move |conn, registry, _| {
            engine::teacher_schedule(conn, registry, teacher_id, &school_year)
        })
        .await
        .map(Json)
        .map_err(|e| failure("Teacher schedule", e))
}

async fn roster_handler(
    State(state): State<AppState>,
    Json(snapshot): Json<RosterSnapshot>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .with_db(move |conn, _, _| {
            let tx = conn.transaction()?;
            mutations::import_roster(&tx, &snapshot)?;
            tx.commit()?;
            Ok(())
        })
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(|e| failure("Roster import", e))
}

pub fn router(state: AppState) -> Router {
    // one mutating run at a time
    let actions = Router::new()
        .route("/v1/schedule/auto", post(auto_schedule_handler))
        .route("/v1/schedule/clear", post(clear_handler))
        .route("/v1/loads/recalculate", post(recalculate_handler))
        .route("/v1/roster", post(roster_handler))
        .layer(GlobalConcurrencyLimitLayer::new(1));

    Router::new()
        .route("/v1/loads/:school_year", get(loads_handler))
        .route(
            "/v1/sections/:section_id/schedule/:school_year",
            get(section_schedule_handler),
        )
        .route(
            "/v1/teachers/:teacher_id/schedule/:school_year",
            get(teacher_schedule_handler),
        )
        .merge(actions)
        .with_state(state)
}

pub async fn run_server(bind_addr: &str, state: AppState) -> std::io::Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}
