//! Handlers for the article aggregate.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/articles` | Search; see [`SearchParams`]. Drafts only for the requester |
//! | `POST`   | `/articles` | Body: [`NewArticleBody`]; the requester is the author |
//! | `GET`    | `/articles/{id}` | Counts a view |
//! | `PUT`    | `/articles/{id}` | Body: [`ArticleEditBody`]; full replacement |
//! | `DELETE` | `/articles/{id}` | Cascades to dependents and reviews |
//! | `POST`   | `/articles/{id}/publish`, `/articles/{id}/unpublish` | Idempotent |
//! | `GET`    | `/articles/{id}/reviews` | Published reviews, newest first |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use quire_core::{
  article::{Article, ArticleEdit, ArticleView, BlockKind, NewArticle, NewBlock},
  store::{ArticleQuery, BlogStore, BlogStoreExt},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{error::ApiError, requester::Requester};

// ─── Search ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  /// Case-insensitive title substring.
  pub title:           Option<String>,
  /// Comma-separated tag names; any may match.
  pub tags:            Option<String>,
  /// Case-insensitive author display-name substring.
  pub author:          Option<String>,
  pub author_id:       Option<Uuid>,
  /// Defaults to `true`.
  pub published:       Option<bool>,
  #[serde(default)]
  pub exclude_reviews: bool,
  pub limit:           Option<usize>,
  pub offset:          Option<usize>,
}

impl From<SearchParams> for ArticleQuery {
  fn from(p: SearchParams) -> Self {
    Self {
      title:           p.title,
      tags:            p
        .tags
        .map(|s| {
          s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .collect()
        })
        .unwrap_or_default(),
      author_name:     p.author,
      author_id:       p.author_id,
      published:       p.published.unwrap_or(true),
      exclude_reviews: p.exclude_reviews,
      limit:           p.limit,
      offset:          p.offset,
    }
  }
}

/// `GET /articles[?title=...][&tags=a,b][&author=...][&published=false]...`
///
/// Drafts are only listed for the requester: `published=false` needs the
/// identity header and is narrowed to the requester's own articles.
pub async fn search<S: BlogStore>(
  State(store): State<Arc<S>>,
  requester: Option<Requester>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Article>>, ApiError> {
  let mut query = ArticleQuery::from(params);
  if !query.published {
    let Some(Requester(me)) = requester else {
      return Err(ApiError::Unauthorized("listing drafts requires an identity".into()));
    };
    match query.author_id {
      Some(other) if other != me => {
        return Err(ApiError::Forbidden(format!("drafts of {other} are private")));
      }
      _ => query.author_id = Some(me),
    }
  }
  let articles = store.search_articles(&query).await.map_err(ApiError::store)?;
  Ok(Json(articles))
}

// ─── Bodies ──────────────────────────────────────────────────────────────────

/// A block as sent by clients. The kind is parsed by hand so an unknown one
/// is a 400 rather than a body rejection.
#[derive(Debug, Deserialize)]
pub struct BlockBody {
  pub kind:    String,
  pub content: String,
}

fn parse_blocks(blocks: Vec<BlockBody>) -> Result<Vec<NewBlock>, ApiError> {
  blocks
    .into_iter()
    .map(|b| {
      let kind = BlockKind::parse(&b.kind).map_err(|e| ApiError::BadRequest(e.to_string()))?;
      Ok(NewBlock::new(kind, b.content))
    })
    .collect()
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /articles`.
#[derive(Debug, Deserialize)]
pub struct NewArticleBody {
  pub title:             String,
  #[serde(default)]
  pub short_description: String,
  #[serde(default)]
  pub blocks:            Vec<BlockBody>,
  #[serde(default)]
  pub published:         bool,
  #[serde(default)]
  pub tags:              Vec<String>,
  /// Makes the new article a review of this one.
  pub review_of:         Option<Uuid>,
}

impl NewArticleBody {
  fn into_new_article(self, author_id: Uuid) -> Result<NewArticle, ApiError> {
    Ok(NewArticle {
      author_id,
      title: self.title,
      short_description: self.short_description,
      blocks: parse_blocks(self.blocks)?,
      published: self.published,
      tags: self.tags,
      review_of: self.review_of,
    })
  }
}

/// `POST /articles` returns 201 + the assembled article.
pub async fn create<S: BlogStore>(
  State(store): State<Arc<S>>,
  Requester(author): Requester,
  Json(body): Json<NewArticleBody>,
) -> Result<impl IntoResponse, ApiError> {
  let view = store
    .create_article(body.into_new_article(author)?)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(view)))
}

// ─── Read ────────────────────────────────────────────────────────────────────

/// `GET /articles/{id}`
pub async fn view<S: BlogStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ArticleView>, ApiError> {
  let view = store
    .view_article(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("article {id} not found")))?;
  Ok(Json(view))
}

/// `GET /articles/{id}/reviews`
pub async fn reviews<S: BlogStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Article>>, ApiError> {
  let reviews = store.reviews_of(id).await.map_err(ApiError::store)?;
  Ok(Json(reviews))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /articles/{id}`. Omitted collections are
/// replaced with empty ones.
#[derive(Debug, Deserialize)]
pub struct ArticleEditBody {
  pub title:             String,
  #[serde(default)]
  pub short_description: String,
  #[serde(default)]
  pub blocks:            Vec<BlockBody>,
  #[serde(default)]
  pub published:         bool,
  #[serde(default)]
  pub tags:              Vec<String>,
}

impl TryFrom<ArticleEditBody> for ArticleEdit {
  type Error = ApiError;

  fn try_from(b: ArticleEditBody) -> Result<Self, ApiError> {
    Ok(ArticleEdit {
      title:             b.title,
      short_description: b.short_description,
      blocks:            parse_blocks(b.blocks)?,
      published:         b.published,
      tags:              b.tags,
    })
  }
}

/// `PUT /articles/{id}`
pub async fn update<S: BlogStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Requester(requester): Requester,
  Json(body): Json<ArticleEditBody>,
) -> Result<Json<ArticleView>, ApiError> {
  let view = store
    .update_article(id, requester, body.try_into()?)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(view))
}

/// `DELETE /articles/{id}`
pub async fn delete<S: BlogStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Requester(requester): Requester,
) -> Result<StatusCode, ApiError> {
  store.delete_article(id, requester).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /articles/{id}/publish`
pub async fn publish<S: BlogStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Requester(requester): Requester,
) -> Result<Json<Article>, ApiError> {
  let article = store.publish_article(id, requester).await.map_err(ApiError::store)?;
  Ok(Json(article))
}

/// `POST /articles/{id}/unpublish`
pub async fn unpublish<S: BlogStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Requester(requester): Requester,
) -> Result<Json<Article>, ApiError> {
  let article = store.unpublish_article(id, requester).await.map_err(ApiError::store)?;
  Ok(Json(article))
}
