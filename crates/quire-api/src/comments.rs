//! Handlers for comments.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/articles/{id}/comments` | Newest first |
//! | `POST`   | `/articles/{id}/comments` | Body: `{"content":"...","parent_id":null}` |
//! | `DELETE` | `/comments/{id}` | Author only; replies go with it |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use quire_core::{
  comment::{Comment, NewComment},
  store::BlogStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{error::ApiError, requester::Requester};

#[derive(Debug, Deserialize)]
pub struct NewCommentBody {
  pub content:   String,
  pub parent_id: Option<Uuid>,
}

/// `GET /articles/{id}/comments`
pub async fn list<S: BlogStore>(
  State(store): State<Arc<S>>,
  Path(article_id): Path<Uuid>,
) -> Result<Json<Vec<Comment>>, ApiError> {
  let comments = store.list_comments(article_id).await.map_err(ApiError::store)?;
  Ok(Json(comments))
}

/// `POST /articles/{id}/comments`
pub async fn create<S: BlogStore>(
  State(store): State<Arc<S>>,
  Path(article_id): Path<Uuid>,
  Requester(author): Requester,
  Json(body): Json<NewCommentBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = NewComment {
    article_id,
    author_id: author,
    content: body.content,
    parent_id: body.parent_id,
  };
  let comment = store.create_comment(input).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(comment)))
}

/// `DELETE /comments/{id}`
pub async fn delete<S: BlogStore>(
  State(store): State<Arc<S>>,
  Path(comment_id): Path<Uuid>,
  Requester(requester): Requester,
) -> Result<StatusCode, ApiError> {
  store
    .delete_comment(comment_id, requester)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
