//! Handlers for `/tags`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/tags` | `?q=` substring, `?limit=` (default 10) |
//! | `POST` | `/tags` | Body: `{"names":[...]}`; find-or-create each |
//! | `GET`  | `/tags/popular` | By article count, `?limit=` (default 10) |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use quire_core::{
  store::BlogStore,
  tag::{Tag, TagCount},
};
use serde::Deserialize;

use crate::error::ApiError;

const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Deserialize, Default)]
pub struct TagSearchParams {
  pub q:     Option<String>,
  pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct TagNamesBody {
  pub names: Vec<String>,
}

/// `GET /tags[?q=...][&limit=...]`
pub async fn search<S: BlogStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<TagSearchParams>,
) -> Result<Json<Vec<Tag>>, ApiError> {
  let tags = store
    .search_tags(params.q, params.limit.unwrap_or(DEFAULT_LIMIT))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(tags))
}

/// `POST /tags`
pub async fn find_or_create<S: BlogStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<TagNamesBody>,
) -> Result<Json<Vec<Tag>>, ApiError> {
  let tags = store
    .find_or_create_tags(body.names)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(tags))
}

/// `GET /tags/popular[?limit=...]`
pub async fn popular<S: BlogStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<TagSearchParams>,
) -> Result<Json<Vec<TagCount>>, ApiError> {
  let tags = store
    .popular_tags(params.limit.unwrap_or(DEFAULT_LIMIT))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(tags))
}
