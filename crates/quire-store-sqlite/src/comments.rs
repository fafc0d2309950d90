//! Comments, threaded by an optional parent within the same article.

use quire_core::{
  Error as CoreError,
  comment::{Comment, NewComment},
  error::Entity,
};
use rusqlite::{Connection, OptionalExtension as _, params};
use tracing::debug;
use uuid::Uuid;

use crate::{
  Result, articles,
  encode::{RawComment, decode_uuid, encode_dt, encode_uuid, now},
  users,
};

const COMMENT_COLUMNS: &str =
  "comment_id, article_id, author_id, content, parent_id, created_at, updated_at";

fn get(conn: &Connection, comment_id: Uuid) -> Result<Option<Comment>> {
  let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE comment_id = ?1");
  let raw = conn
    .query_row(&sql, params![encode_uuid(comment_id)], RawComment::from_row)
    .optional()?;
  raw.map(RawComment::into_comment).transpose()
}

pub fn create(conn: &Connection, input: NewComment) -> Result<Comment> {
  let content = input.validate()?;
  articles::require_exists(conn, input.article_id)?;
  users::require(conn, input.author_id)?;

  if let Some(parent_id) = input.parent_id {
    let parent = get(conn, parent_id)?
      .ok_or_else(|| CoreError::not_found(Entity::Comment, parent_id))?;
    if parent.article_id != input.article_id {
      return Err(
        CoreError::validation("a reply must belong to the same article as its parent")
          .into(),
      );
    }
  }

  let at = now();
  let comment = Comment {
    comment_id: Uuid::new_v4(),
    article_id: input.article_id,
    author_id:  input.author_id,
    content,
    parent_id:  input.parent_id,
    created_at: at,
    updated_at: at,
  };

  conn.execute(
    "INSERT INTO comments (
       comment_id, article_id, author_id, content, parent_id, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    params![
      encode_uuid(comment.comment_id),
      encode_uuid(comment.article_id),
      encode_uuid(comment.author_id),
      comment.content,
      comment.parent_id.map(encode_uuid),
      encode_dt(comment.created_at),
      encode_dt(comment.updated_at),
    ],
  )?;

  Ok(comment)
}

/// Delete a comment and, transitively, every reply under it.
pub fn delete(conn: &Connection, comment_id: Uuid, requester: Uuid) -> Result<()> {
  let author: Option<String> = conn
    .query_row(
      "SELECT author_id FROM comments WHERE comment_id = ?1",
      params![encode_uuid(comment_id)],
      |row| row.get(0),
    )
    .optional()?;

  let author = match author {
    Some(a) => decode_uuid(&a)?,
    None => return Err(CoreError::not_found(Entity::Comment, comment_id).into()),
  };
  if author != requester {
    return Err(CoreError::forbidden(requester, "delete this comment").into());
  }

  let n = conn.execute(
    "DELETE FROM comments WHERE comment_id IN (
       WITH RECURSIVE thread(id) AS (
         SELECT ?1
         UNION ALL
         SELECT c.comment_id FROM comments c JOIN thread t ON c.parent_id = t.id
       )
       SELECT id FROM thread
     )",
    params![encode_uuid(comment_id)],
  )?;
  debug!(%comment_id, removed = n, "deleted comment thread");
  Ok(())
}

pub fn list_for_article(conn: &Connection, article_id: Uuid) -> Result<Vec<Comment>> {
  articles::require_exists(conn, article_id)?;

  let sql = format!(
    "SELECT {COMMENT_COLUMNS} FROM comments
     WHERE article_id = ?1
     ORDER BY created_at DESC, rowid DESC"
  );
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(params![encode_uuid(article_id)], RawComment::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws.into_iter().map(RawComment::into_comment).collect()
}

pub fn count_for_article(conn: &Connection, article_id: Uuid) -> Result<u64> {
  articles::require_exists(conn, article_id)?;
  let n: i64 = conn.query_row(
    "SELECT COUNT(*) FROM comments WHERE article_id = ?1",
    params![encode_uuid(article_id)],
    |row| row.get(0),
  )?;
  Ok(n.max(0) as u64)
}

pub fn delete_for_article(conn: &Connection, article_id: Uuid) -> Result<usize> {
  let n = conn.execute(
    "DELETE FROM comments WHERE article_id = ?1",
    params![encode_uuid(article_id)],
  )?;
  debug!(%article_id, removed = n, "deleted comments");
  Ok(n)
}
