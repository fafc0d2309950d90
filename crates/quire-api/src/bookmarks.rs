//! Handlers for `/articles/{id}/bookmark`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use quire_core::store::BlogStore;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{error::ApiError, requester::Requester};

/// `GET /articles/{id}/bookmark`: `{"bookmarked": bool}` for the requester.
pub async fn status<S: BlogStore>(
  State(store): State<Arc<S>>,
  Path(article_id): Path<Uuid>,
  Requester(user): Requester,
) -> Result<Json<Value>, ApiError> {
  let bookmarked = store
    .is_bookmarked(user, article_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(json!({ "bookmarked": bookmarked })))
}

/// `POST /articles/{id}/bookmark` flips the state and returns the new one.
pub async fn toggle<S: BlogStore>(
  State(store): State<Arc<S>>,
  Path(article_id): Path<Uuid>,
  Requester(user): Requester,
) -> Result<Json<Value>, ApiError> {
  let bookmarked = store
    .toggle_bookmark(user, article_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(json!({ "bookmarked": bookmarked })))
}
