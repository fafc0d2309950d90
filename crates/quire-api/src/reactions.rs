//! Handlers for reactions.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/articles/{id}/reactions` | Counts for all twelve kinds |
//! | `GET`    | `/articles/{id}/reaction` | The requester's reaction, or 404 |
//! | `PUT`    | `/articles/{id}/reaction` | Body: `{"kind":"love"}` or `{"glyph":"❤️"}` |
//! | `DELETE` | `/articles/{id}/reaction` | Returns `{"removed": bool}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use quire_core::{
  reaction::{Reaction, ReactionKind, ReactionStats},
  store::BlogStore,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{error::ApiError, requester::Requester};

#[derive(Debug, Deserialize)]
pub struct ReactionBody {
  pub kind:  Option<ReactionKind>,
  pub glyph: Option<String>,
}

impl ReactionBody {
  fn resolve(self) -> Result<ReactionKind, ApiError> {
    match (self.kind, self.glyph) {
      (Some(kind), None) => Ok(kind),
      (None, Some(glyph)) => {
        ReactionKind::from_glyph(&glyph).map_err(|e| ApiError::BadRequest(e.to_string()))
      }
      _ => Err(ApiError::BadRequest("exactly one of `kind` or `glyph` is required".into())),
    }
  }
}

/// `GET /articles/{id}/reactions`
pub async fn stats<S: BlogStore>(
  State(store): State<Arc<S>>,
  Path(article_id): Path<Uuid>,
) -> Result<Json<ReactionStats>, ApiError> {
  let stats = store.reaction_stats(article_id).await.map_err(ApiError::store)?;
  Ok(Json(stats))
}

/// `GET /articles/{id}/reaction`
pub async fn get_mine<S: BlogStore>(
  State(store): State<Arc<S>>,
  Path(article_id): Path<Uuid>,
  Requester(user): Requester,
) -> Result<Json<Reaction>, ApiError> {
  let reaction = store
    .get_reaction(user, article_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("no reaction to article {article_id}")))?;
  Ok(Json(reaction))
}

/// `PUT /articles/{id}/reaction`
pub async fn set<S: BlogStore>(
  State(store): State<Arc<S>>,
  Path(article_id): Path<Uuid>,
  Requester(user): Requester,
  Json(body): Json<ReactionBody>,
) -> Result<Json<Reaction>, ApiError> {
  let kind = body.resolve()?;
  let reaction = store
    .set_reaction(user, article_id, kind)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(reaction))
}

/// `DELETE /articles/{id}/reaction`
pub async fn remove<S: BlogStore>(
  State(store): State<Arc<S>>,
  Path(article_id): Path<Uuid>,
  Requester(user): Requester,
) -> Result<Json<Value>, ApiError> {
  let removed = store
    .remove_reaction(user, article_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(json!({ "removed": removed })))
}
