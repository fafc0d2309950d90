//! Bookmarks: (user, article) membership with toggle semantics.

use quire_core::bookmark::BookmarkedArticle;
use rusqlite::{Connection, OptionalExtension as _, params};
use tracing::debug;
use uuid::Uuid;

use crate::{
  Result, articles,
  encode::{ARTICLE_COLUMNS, RawArticle, decode_dt, encode_dt, encode_uuid, now},
  users,
};

pub fn exists(conn: &Connection, user_id: Uuid, article_id: Uuid) -> Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM bookmarks WHERE user_id = ?1 AND article_id = ?2",
        params![encode_uuid(user_id), encode_uuid(article_id)],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

/// Read the current state and flip it. Returns the new state.
pub fn toggle(conn: &Connection, user_id: Uuid, article_id: Uuid) -> Result<bool> {
  articles::require_exists(conn, article_id)?;
  users::require(conn, user_id)?;

  let user_id_str = encode_uuid(user_id);
  let article_id_str = encode_uuid(article_id);

  if exists(conn, user_id, article_id)? {
    conn.execute(
      "DELETE FROM bookmarks WHERE user_id = ?1 AND article_id = ?2",
      params![user_id_str, article_id_str],
    )?;
    Ok(false)
  } else {
    conn.execute(
      "INSERT INTO bookmarks (user_id, article_id, added_at) VALUES (?1, ?2, ?3)",
      params![user_id_str, article_id_str, encode_dt(now())],
    )?;
    Ok(true)
  }
}

pub fn list_for_user(conn: &Connection, user_id: Uuid) -> Result<Vec<BookmarkedArticle>> {
  users::require(conn, user_id)?;

  let sql = format!(
    "SELECT {ARTICLE_COLUMNS}, b.added_at
     FROM bookmarks b
     JOIN articles a ON a.article_id = b.article_id
     WHERE b.user_id = ?1
     ORDER BY b.added_at DESC, b.rowid DESC"
  );
  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt
    .query_map(params![encode_uuid(user_id)], |row| {
      Ok((RawArticle::from_row(row)?, row.get::<_, String>(9)?))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  rows
    .into_iter()
    .map(|(raw, added_at)| {
      Ok(BookmarkedArticle { added_at: decode_dt(&added_at)?, article: raw.into_article()? })
    })
    .collect()
}

pub fn count_for_user(conn: &Connection, user_id: Uuid) -> Result<u64> {
  users::require(conn, user_id)?;
  let n: i64 = conn.query_row(
    "SELECT COUNT(*) FROM bookmarks WHERE user_id = ?1",
    params![encode_uuid(user_id)],
    |row| row.get(0),
  )?;
  Ok(n.max(0) as u64)
}

pub fn delete_for_article(conn: &Connection, article_id: Uuid) -> Result<usize> {
  let n = conn.execute(
    "DELETE FROM bookmarks WHERE article_id = ?1",
    params![encode_uuid(article_id)],
  )?;
  debug!(%article_id, removed = n, "deleted bookmarks");
  Ok(n)
}
