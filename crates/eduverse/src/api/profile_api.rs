//! Profile and dashboard endpoints

use axum::{extract::State, Json};
use serde::Serialize;

use crate::dashboard::{tools_for, ToolEntry};
use crate::error::{AppError, Result};
use crate::identity::AuthUser;
use crate::shared_state::AppState;
use crate::store::{Profile, ProfileFields, Role};

/// GET /api/profile
pub async fn get_profile(State(state): State<AppState>, user: AuthUser) -> Result<Json<Profile>> {
    state
        .db
        .profiles
        .get(&user.user_id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No profile yet".into()))
}

/// PUT /api/profile
pub async fn save_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(fields): Json<ProfileFields>,
) -> Result<Json<Profile>> {
    Ok(Json(state.db.profiles.save(&user.user_id, &fields)?))
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub email: String,
    pub profile: Option<Profile>,
    pub role: Role,
    pub needs_profile: bool,
    pub tools: Vec<ToolEntry>,
}

/// GET /api/dashboard
///
/// Without a profile the student tool set is shown and the client is told to
/// collect one.
pub async fn dashboard(State(state): State<AppState>, user: AuthUser) -> Result<Json<DashboardResponse>> {
    let profile = state.db.profiles.get(&user.user_id)?;
    let role = profile.as_ref().map_or(Role::Student, |p| p.role);
    Ok(Json(DashboardResponse {
        email: user.email,
        needs_profile: profile.is_none(),
        profile,
        role,
        tools: tools_for(role),
    }))
}
