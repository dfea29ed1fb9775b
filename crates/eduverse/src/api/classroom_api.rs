//! Endpoints that combine rows: attendance sheets, progress, timetable grid,
//! batch upserts and the task completion toggle.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::identity::AuthUser;
use crate::shared_state::AppState;
use crate::store::{
    AssessmentColumn, AttendanceRecord, Class, Mark, NewAttendanceRecord, NewMark, NewStudent, Student,
    Task, TimetableEntry,
};
use crate::tools::{self, AttendanceSheet, TimetableGrid};
use crate::tools::aggregate::{StudentProgress, TodoSummary};

fn class_filter(class_id: i64) -> Vec<(String, String)> {
    vec![("class_id".to_string(), class_id.to_string())]
}

/// POST /api/tasks/:id/toggle
pub async fn toggle_task(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Task>> {
    let tasks = state.db.resource::<Task>();
    let task = tasks.get(&user.user_id, id)?;

    let mut patch = serde_json::Map::new();
    patch.insert("completed".into(), json!(!task.completed));
    Ok(Json(tasks.update(&user.user_id, id, patch)?))
}

/// GET /api/tasks/summary
pub async fn task_summary(State(state): State<AppState>, user: AuthUser) -> Result<Json<TodoSummary>> {
    let tasks = state.db.resource::<Task>().list(&user.user_id, &[])?;
    Ok(Json(tools::todo_summary(&tasks)))
}

#[derive(Debug, Deserialize)]
pub struct SheetQuery {
    pub class_id: i64,
    pub date: String,
}

/// GET /api/attendance/sheet?class_id=..&date=YYYY-MM-DD
pub async fn attendance_sheet(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SheetQuery>,
) -> Result<Json<AttendanceSheet>> {
    if chrono::NaiveDate::parse_from_str(&query.date, "%Y-%m-%d").is_err() {
        return Err(AppError::Validation(format!("Invalid date: {}", query.date)));
    }
    state.db.resource::<Class>().get(&user.user_id, query.class_id)?;

    let students = state.db.resource::<Student>().list(&user.user_id, &class_filter(query.class_id))?;
    let mut filters = class_filter(query.class_id);
    filters.push(("date".to_string(), query.date.clone()));
    let records = state.db.resource::<AttendanceRecord>().list(&user.user_id, &filters)?;

    Ok(Json(tools::attendance_sheet(query.class_id, &query.date, &students, &records)))
}

/// POST /api/attendance/upsert
pub async fn upsert_attendance(
    State(state): State<AppState>,
    user: AuthUser,
    Json(records): Json<Vec<NewAttendanceRecord>>,
) -> Result<Json<Vec<AttendanceRecord>>> {
    Ok(Json(state.db.resource::<AttendanceRecord>().upsert(&user.user_id, &records)?))
}

/// POST /api/marks/upsert
pub async fn upsert_marks(
    State(state): State<AppState>,
    user: AuthUser,
    Json(marks): Json<Vec<NewMark>>,
) -> Result<Json<Vec<Mark>>> {
    Ok(Json(state.db.resource::<Mark>().upsert(&user.user_id, &marks)?))
}

/// POST /api/students/import
pub async fn import_students(
    State(state): State<AppState>,
    user: AuthUser,
    Json(students): Json<Vec<NewStudent>>,
) -> Result<Json<Vec<Student>>> {
    if students.is_empty() {
        return Err(AppError::Validation("No students to import".into()));
    }
    Ok(Json(state.db.resource::<Student>().create_many(&user.user_id, &students)?))
}

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    #[serde(default)]
    pub semester: Option<String>,
}

/// GET /api/classes/:id/progress?semester=..
pub async fn class_progress(
    State(state): State<AppState>,
    user: AuthUser,
    Path(class_id): Path<i64>,
    Query(query): Query<ProgressQuery>,
) -> Result<Json<Vec<StudentProgress>>> {
    state.db.resource::<Class>().get(&user.user_id, class_id)?;

    let mut filters = class_filter(class_id);
    if let Some(semester) = query.semester.filter(|s| !s.is_empty()) {
        filters.push(("semester".to_string(), semester));
    }
    let students = state.db.resource::<Student>().list(&user.user_id, &class_filter(class_id))?;
    let assessments = state.db.resource::<AssessmentColumn>().list(&user.user_id, &filters)?;
    let marks = state.db.resource::<Mark>().list(&user.user_id, &filters)?;

    Ok(Json(tools::student_progress(&students, &assessments, &marks)))
}

/// GET /api/classes/:id/timetable-grid
pub async fn timetable_grid(
    State(state): State<AppState>,
    user: AuthUser,
    Path(class_id): Path<i64>,
) -> Result<Json<TimetableGrid>> {
    state.db.resource::<Class>().get(&user.user_id, class_id)?;
    let entries = state.db.resource::<TimetableEntry>().list(&user.user_id, &class_filter(class_id))?;
    Ok(Json(tools::build_grid(&entries)))
}
