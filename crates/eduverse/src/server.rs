//! HTTP server startup and routing.
//!
//! All handlers share one [`AppState`]: config, the database pool, the LLM
//! client and the identity gateway, each behind an `Arc`. The only outbound
//! network call is the chat provider.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{MatchedPath, Request},
    http::Method,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::api::{
    admin_api, auth_api, chat_api, classroom_api, profile_api, resource_routes, tools_api,
};
use crate::config::Config;
use crate::metrics;
use crate::shared_state::AppState;
use crate::store::{
    AssessmentColumn, AttendanceRecord, Class, Database, LessonPlan, Mark, Note, PasswordRecord, Student,
    Task, TimetableEntry,
};

pub async fn run_server(cfg: Config) -> anyhow::Result<()> {
    crate::telemetry::init_tracing();
    crate::metrics::init_metrics();
    cfg.print_config();

    let db = Arc::new(Database::open(&cfg.database_path, cfg.database_pool_size)?);
    let purged = db.users.purge_expired_sessions()?;
    if purged > 0 {
        info!("Removed {} expired sessions at startup", purged);
    }

    let addr = cfg.api_addr()?;
    let state = AppState::new(cfg, db);

    info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, build_router(state)).await?;

    Ok(())
}

async fn track_requests(req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_string());
    let response = next.run(req).await;
    metrics::inc_request(&route, response.status().as_u16());
    response
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);
    let timeout = Duration::from_secs(state.config.request_timeout_seconds);

    let resources = Router::new()
        .merge(resource_routes::<Task>("tasks"))
        .merge(resource_routes::<Note>("notes"))
        .merge(resource_routes::<PasswordRecord>("passwords"))
        .merge(resource_routes::<Class>("classes"))
        .merge(resource_routes::<Student>("students"))
        .merge(resource_routes::<AttendanceRecord>("attendance"))
        .merge(resource_routes::<LessonPlan>("lesson-plans"))
        .merge(resource_routes::<TimetableEntry>("timetable"))
        .merge(resource_routes::<AssessmentColumn>("assessments"))
        .merge(resource_routes::<Mark>("marks"));

    Router::new()
        // Identity
        .route("/api/auth/signup", post(auth_api::signup))
        .route("/api/auth/login", post(auth_api::login))
        .route("/api/auth/check", post(auth_api::check))
        .route("/api/auth/logout", post(auth_api::logout))
        // Chat
        .route("/api/chat", post(chat_api::chat))
        .route("/api/chat/create", post(chat_api::create_conversation))
        .route("/api/chat/list", get(chat_api::list_conversations))
        // Profile and dashboard
        .route("/api/profile", get(profile_api::get_profile).put(profile_api::save_profile))
        .route("/api/dashboard", get(profile_api::dashboard))
        // Combined views and batch writes
        .route("/api/tasks/summary", get(classroom_api::task_summary))
        .route("/api/tasks/:id/toggle", post(classroom_api::toggle_task))
        .route("/api/attendance/sheet", get(classroom_api::attendance_sheet))
        .route("/api/attendance/upsert", post(classroom_api::upsert_attendance))
        .route("/api/marks/upsert", post(classroom_api::upsert_marks))
        .route("/api/students/import", post(classroom_api::import_students))
        .route("/api/classes/:id/progress", get(classroom_api::class_progress))
        .route("/api/classes/:id/timetable-grid", get(classroom_api::timetable_grid))
        // Calculators
        .route("/api/tools/convert", post(tools_api::convert))
        .route("/api/tools/password/generate", post(tools_api::generate_password))
        .route("/api/tools/password/strength", post(tools_api::password_strength))
        .route("/api/tools/qr", post(tools_api::qr_payload))
        .route("/api/tools/wellness", get(tools_api::wellness_tips))
        .merge(resources)
        // Operations
        .route("/healthz", get(admin_api::health))
        .route("/admin/stats", get(admin_api::db_stats))
        .route("/metrics", get(metrics::get_metrics))
        .route_layer(middleware::from_fn(track_requests))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .with_state(state)
}
