//! The article aggregate service.
//!
//! Every public function here runs inside the transaction opened by
//! [`crate::SqliteStore`]; a returned `Err` leaves the transaction
//! uncommitted, so nothing done before the failure becomes visible.

use quire_core::{
  Error as CoreError,
  article::{Article, ArticleEdit, ArticleView, NewArticle},
  error::Entity,
};
use rusqlite::{Connection, ErrorCode, OptionalExtension as _, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  Error, Result, blocks, bookmarks, comments,
  encode::{ARTICLE_COLUMNS, RawArticle, decode_uuid, encode_dt, encode_uuid, fold, now},
  reactions, tags, users,
};

// ─── Lookups ─────────────────────────────────────────────────────────────────

pub fn load(conn: &Connection, article_id: Uuid) -> Result<Option<Article>> {
  let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles a WHERE a.article_id = ?1");
  let raw = conn
    .query_row(&sql, params![encode_uuid(article_id)], RawArticle::from_row)
    .optional()?;
  raw.map(RawArticle::into_article).transpose()
}

fn require(conn: &Connection, article_id: Uuid) -> Result<Article> {
  load(conn, article_id)?
    .ok_or_else(|| CoreError::not_found(Entity::Article, article_id).into())
}

/// Fail with `NotFound` unless the article exists.
pub fn require_exists(conn: &Connection, article_id: Uuid) -> Result<()> {
  let exists = conn
    .query_row(
      "SELECT 1 FROM articles WHERE article_id = ?1",
      params![encode_uuid(article_id)],
      |_| Ok(()),
    )
    .optional()?
    .is_some();

  if !exists {
    return Err(CoreError::not_found(Entity::Article, article_id).into());
  }
  Ok(())
}

/// Load the article and check that `requester` wrote it.
fn require_author(
  conn: &Connection,
  article_id: Uuid,
  requester: Uuid,
  action: &'static str,
) -> Result<Article> {
  let article = require(conn, article_id)?;
  if article.author_id != requester {
    return Err(CoreError::forbidden(requester, action).into());
  }
  Ok(article)
}

pub fn has_reviewed(conn: &Connection, user_id: Uuid, article_id: Uuid) -> Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM articles WHERE author_id = ?1 AND review_of = ?2",
        params![encode_uuid(user_id), encode_uuid(article_id)],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

fn published_review_count(conn: &Connection, article_id: Uuid) -> Result<u64> {
  let n: i64 = conn.query_row(
    "SELECT COUNT(*) FROM articles WHERE review_of = ?1 AND published = 1",
    params![encode_uuid(article_id)],
    |row| row.get(0),
  )?;
  Ok(n.max(0) as u64)
}

fn assemble(conn: &Connection, article: Article) -> Result<ArticleView> {
  let id = article.article_id;
  Ok(ArticleView::new(
    article,
    blocks::for_article(conn, id)?,
    tags::for_article(conn, id)?,
    published_review_count(conn, id)?,
  ))
}

pub fn get(conn: &Connection, article_id: Uuid) -> Result<Option<ArticleView>> {
  load(conn, article_id)?.map(|a| assemble(conn, a)).transpose()
}

/// Published reviews of `article_id`, newest-first.
pub fn reviews_of(conn: &Connection, article_id: Uuid) -> Result<Vec<Article>> {
  require_exists(conn, article_id)?;

  let sql = format!(
    "SELECT {ARTICLE_COLUMNS} FROM articles a
     WHERE a.review_of = ?1 AND a.published = 1
     ORDER BY a.created_at DESC, a.rowid DESC"
  );
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(params![encode_uuid(article_id)], RawArticle::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws.into_iter().map(RawArticle::into_article).collect()
}

// ─── Create ──────────────────────────────────────────────────────────────────

fn check_review_target(conn: &Connection, author_id: Uuid, target_id: Uuid) -> Result<()> {
  let target = require(conn, target_id)?;
  if target.is_review() {
    return Err(CoreError::validation("a review cannot target another review").into());
  }
  if has_reviewed(conn, author_id, target_id)? {
    return Err(duplicate_review(author_id, target_id));
  }
  Ok(())
}

fn duplicate_review(author_id: Uuid, target_id: Uuid) -> Error {
  CoreError::Conflict(format!("user {author_id} already reviewed article {target_id}"))
    .into()
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
  matches!(e, rusqlite::Error::SqliteFailure(f, _) if f.code == ErrorCode::ConstraintViolation)
}

pub fn create(conn: &Connection, input: NewArticle) -> Result<ArticleView> {
  let title = input.validate()?;
  users::require(conn, input.author_id)?;
  if let Some(target_id) = input.review_of {
    check_review_target(conn, input.author_id, target_id)?;
  }

  let at = now();
  let article = Article {
    article_id: Uuid::new_v4(),
    author_id: input.author_id,
    title,
    short_description: input.short_description,
    published: input.published,
    created_at: at,
    updated_at: at,
    view_count: 0,
    review_of: input.review_of,
  };

  let inserted = conn.execute(
    "INSERT INTO articles (
       article_id, author_id, title, title_folded, short_description,
       published, created_at, updated_at, view_count, review_of
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9)",
    params![
      encode_uuid(article.article_id),
      encode_uuid(article.author_id),
      article.title,
      fold(&article.title),
      article.short_description,
      article.published,
      encode_dt(article.created_at),
      encode_dt(article.updated_at),
      article.review_of.map(encode_uuid),
    ],
  );
  match (inserted, article.review_of) {
    (Ok(_), _) => {}
    (Err(e), Some(target_id)) if is_constraint_violation(&e) => {
      return Err(duplicate_review(article.author_id, target_id));
    }
    (Err(e), _) => return Err(e.into()),
  }

  let id = article.article_id;
  let blocks = blocks::insert_all(conn, id, input.blocks, at)?;
  let mut tags = tags::find_or_create_many(conn, &input.tags)?;
  tags::replace_links(conn, id, &tags)?;
  tags.sort_by(|a, b| a.name.cmp(&b.name));

  info!(
    article_id = %id,
    author_id = %article.author_id,
    review_of = ?article.review_of,
    blocks = blocks.len(),
    tags = tags.len(),
    "created article"
  );
  Ok(ArticleView::new(article, blocks, tags, 0))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// Replace the mutable state of an article wholesale.
pub fn update(
  conn: &Connection,
  article_id: Uuid,
  requester: Uuid,
  edit: ArticleEdit,
) -> Result<ArticleView> {
  let mut article = require_author(conn, article_id, requester, "update this article")?;
  let title = edit.validate()?;

  let at = now();
  conn.execute(
    "UPDATE articles
     SET title = ?2, title_folded = ?3, short_description = ?4, published = ?5,
         updated_at = ?6
     WHERE article_id = ?1",
    params![
      encode_uuid(article_id),
      title,
      fold(&title),
      edit.short_description,
      edit.published,
      encode_dt(at),
    ],
  )?;

  let blocks = blocks::replace(conn, article_id, edit.blocks, at)?;
  let mut tags = tags::find_or_create_many(conn, &edit.tags)?;
  tags::replace_links(conn, article_id, &tags)?;
  tags.sort_by(|a, b| a.name.cmp(&b.name));

  article.title = title;
  article.short_description = edit.short_description;
  article.published = edit.published;
  article.updated_at = at;

  info!(%article_id, blocks = blocks.len(), tags = tags.len(), "updated article");
  let review_count = published_review_count(conn, article_id)?;
  Ok(ArticleView::new(article, blocks, tags, review_count))
}

pub fn set_published(
  conn: &Connection,
  article_id: Uuid,
  requester: Uuid,
  published: bool,
) -> Result<Article> {
  let action = if published { "publish this article" } else { "unpublish this article" };
  let mut article = require_author(conn, article_id, requester, action)?;

  let at = now();
  conn.execute(
    "UPDATE articles SET published = ?2, updated_at = ?3 WHERE article_id = ?1",
    params![encode_uuid(article_id), published, encode_dt(at)],
  )?;

  article.published = published;
  article.updated_at = at;
  info!(%article_id, published, "set published flag");
  Ok(article)
}

/// Add one view and return the new count.
pub fn increment_views(conn: &Connection, article_id: Uuid) -> Result<u64> {
  let count: Option<i64> = conn
    .query_row(
      "UPDATE articles SET view_count = view_count + 1
       WHERE article_id = ?1
       RETURNING view_count",
      params![encode_uuid(article_id)],
      |row| row.get(0),
    )
    .optional()?;

  match count {
    Some(n) => Ok(n.max(0) as u64),
    None => Err(CoreError::not_found(Entity::Article, article_id).into()),
  }
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// Delete an article and everything it owns. Reviews targeting it are deleted
/// first-class, on behalf of their own authors.
pub fn delete(conn: &Connection, article_id: Uuid, requester: Uuid) -> Result<()> {
  require_author(conn, article_id, requester, "delete this article")?;

  comments::delete_for_article(conn, article_id)?;
  reactions::delete_for_article(conn, article_id)?;
  bookmarks::delete_for_article(conn, article_id)?;
  blocks::delete_for_article(conn, article_id)?;
  tags::unlink_article(conn, article_id)?;

  let mut stmt = conn.prepare_cached(
    "SELECT article_id, author_id FROM articles WHERE review_of = ?1",
  )?;
  let reviews = stmt
    .query_map(params![encode_uuid(article_id)], |row| {
      Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  drop(stmt);

  for (review_id, author_id) in reviews {
    let review_id = decode_uuid(&review_id)?;
    let author_id = decode_uuid(&author_id)?;
    debug!(%article_id, %review_id, "deleting review of deleted article");
    delete(conn, review_id, author_id)?;
  }

  conn.execute(
    "DELETE FROM articles WHERE article_id = ?1",
    params![encode_uuid(article_id)],
  )?;
  info!(%article_id, "deleted article");
  Ok(())
}
