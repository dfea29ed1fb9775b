//! Sign-up, sign-in, session check and sign-out

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::Result;
use crate::identity::{bearer_token, AuthUser, Credentials};
use crate::shared_state::AppState;

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<Value>> {
    let user = state.identity.sign_up(&credentials).await?;
    Ok(Json(json!({
        "message": "Signup successful",
        "user": user,
    })))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<Value>> {
    let session = state.identity.sign_in(&credentials).await?;
    Ok(Json(json!({
        "message": "Login successful",
        "user": session.user,
        "session": session,
    })))
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckRequest {
    #[serde(default, alias = "accessToken")]
    pub access_token: Option<String>,
}

/// POST /api/auth/check
///
/// Token from the body, falling back to the bearer header. A missing or
/// expired session is a 401 with `{"session": null}` rather than an error body.
pub async fn check(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<CheckRequest>>,
) -> Result<Response> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let token = body
        .access_token
        .filter(|t| !t.trim().is_empty())
        .or_else(|| bearer_token(&headers).map(str::to_string));

    let identity = match token {
        Some(token) => state.identity.resolve(&token).await?,
        None => None,
    };

    Ok(match identity {
        Some(user) => Json(json!({ "session": { "user": user } })).into_response(),
        None => (StatusCode::UNAUTHORIZED, Json(json!({ "session": null }))).into_response(),
    })
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>, user: AuthUser) -> Result<Json<Value>> {
    state.identity.sign_out(&user.access_token).await?;
    info!("Signed out {}", user.user_id);
    Ok(Json(json!({ "message": "Signed out" })))
}
