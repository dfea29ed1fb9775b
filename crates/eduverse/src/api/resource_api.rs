//! Generic CRUD handlers shared by every owner-scoped table.
//!
//! `resource_routes::<R>("tasks")` mounts list/create on `/api/tasks` and
//! get/update/delete on `/api/tasks/:id`, all scoped to the caller.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::error::Result;
use crate::identity::AuthUser;
use crate::shared_state::AppState;
use crate::store::{Fields, OwnedResource};

/// GET /api/{resource}?column=value
pub async fn list_resource<R: OwnedResource>(
    State(state): State<AppState>,
    user: AuthUser,
    Query(filters): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<R>>> {
    Ok(Json(state.db.resource::<R>().list(&user.user_id, &filters)?))
}

/// GET /api/{resource}/:id
pub async fn get_resource<R: OwnedResource>(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<R>> {
    Ok(Json(state.db.resource::<R>().get(&user.user_id, id)?))
}

/// POST /api/{resource}
pub async fn create_resource<R: OwnedResource>(
    State(state): State<AppState>,
    user: AuthUser,
    Json(new): Json<R::New>,
) -> Result<Json<R>> {
    Ok(Json(state.db.resource::<R>().create(&user.user_id, &new)?))
}

/// PUT /api/{resource}/:id with a partial body
pub async fn update_resource<R: OwnedResource>(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(patch): Json<Fields>,
) -> Result<Json<R>> {
    Ok(Json(state.db.resource::<R>().update(&user.user_id, id, patch)?))
}

/// DELETE /api/{resource}/:id
pub async fn delete_resource<R: OwnedResource>(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    state.db.resource::<R>().delete(&user.user_id, id)?;
    Ok(Json(json!({ "deleted": id })))
}

pub fn resource_routes<R: OwnedResource>(path: &str) -> Router<AppState> {
    let collection = format!("/api/{}", path);
    let item = format!("{}/:id", collection);
    Router::new()
        .route(&collection, get(list_resource::<R>).post(create_resource::<R>))
        .route(
            &item,
            get(get_resource::<R>)
                .put(update_resource::<R>)
                .delete(delete_resource::<R>),
        )
}
