//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users` | Body: `{"name":"..."}`; returns 201 + user |
//! | `GET`  | `/users/{id}` | Single user |
//! | `GET`  | `/users/{id}/bookmarks` | Bookmarked articles, newest first; requester only |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use quire_core::{bookmark::BookmarkedArticle, store::BlogStore, user::User};
use serde::Deserialize;
use uuid::Uuid;

use crate::{error::ApiError, requester::Requester};

#[derive(Debug, Deserialize)]
pub struct NewUserBody {
  pub name: String,
}

/// `POST /users`
pub async fn create<S: BlogStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewUserBody>,
) -> Result<impl IntoResponse, ApiError> {
  let user = store.add_user(body.name).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/{id}`
pub async fn get_one<S: BlogStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
  let user = store
    .get_user(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;
  Ok(Json(user))
}

/// `GET /users/{id}/bookmarks`. Only `id` itself may read the list.
pub async fn bookmarks<S: BlogStore>(
  State(store): State<Arc<S>>,
  Requester(me): Requester,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<BookmarkedArticle>>, ApiError> {
  if id != me {
    return Err(ApiError::Forbidden(format!("bookmarks of {id} are private")));
  }
  let list = store.list_bookmarks(id).await.map_err(ApiError::store)?;
  Ok(Json(list))
}
