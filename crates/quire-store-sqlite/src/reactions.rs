//! Reactions: one row per (user, article), upserted in place.

use quire_core::reaction::{Reaction, ReactionKind, ReactionStats};
use rusqlite::{Connection, OptionalExtension as _, params};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
  Result, articles,
  encode::{RawReaction, encode_dt, encode_uuid, now},
  users,
};

pub fn upsert(
  conn: &Connection,
  user_id: Uuid,
  article_id: Uuid,
  kind: ReactionKind,
) -> Result<Reaction> {
  articles::require_exists(conn, article_id)?;
  users::require(conn, user_id)?;

  let reaction = Reaction { user_id, article_id, kind, reacted_at: now() };

  conn.execute(
    "INSERT INTO reactions (user_id, article_id, kind, reacted_at)
     VALUES (?1, ?2, ?3, ?4)
     ON CONFLICT (user_id, article_id)
     DO UPDATE SET kind = excluded.kind, reacted_at = excluded.reacted_at",
    params![
      encode_uuid(user_id),
      encode_uuid(article_id),
      kind.code(),
      encode_dt(reaction.reacted_at),
    ],
  )?;

  Ok(reaction)
}

pub fn remove(conn: &Connection, user_id: Uuid, article_id: Uuid) -> Result<bool> {
  articles::require_exists(conn, article_id)?;
  let n = conn.execute(
    "DELETE FROM reactions WHERE user_id = ?1 AND article_id = ?2",
    params![encode_uuid(user_id), encode_uuid(article_id)],
  )?;
  Ok(n > 0)
}

pub fn get(conn: &Connection, user_id: Uuid, article_id: Uuid) -> Result<Option<Reaction>> {
  let raw = conn
    .query_row(
      "SELECT user_id, article_id, kind, reacted_at FROM reactions
       WHERE user_id = ?1 AND article_id = ?2",
      params![encode_uuid(user_id), encode_uuid(article_id)],
      RawReaction::from_row,
    )
    .optional()?;
  raw.map(RawReaction::into_reaction).transpose()
}

pub fn stats(conn: &Connection, article_id: Uuid) -> Result<ReactionStats> {
  articles::require_exists(conn, article_id)?;

  let mut stmt = conn.prepare_cached(
    "SELECT kind, COUNT(*) FROM reactions WHERE article_id = ?1 GROUP BY kind",
  )?;
  let rows = stmt
    .query_map(params![encode_uuid(article_id)], |row| {
      Ok((row.get::<_, u8>(0)?, row.get::<_, i64>(1)?))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let counts = rows.into_iter().filter_map(|(code, n)| {
    match ReactionKind::from_code(code) {
      Ok(kind) => Some((kind, n.max(0) as u64)),
      Err(_) => {
        warn!(%article_id, code, "skipping unknown reaction code");
        None
      }
    }
  });

  Ok(ReactionStats::from_counts(article_id, counts))
}

pub fn delete_for_article(conn: &Connection, article_id: Uuid) -> Result<usize> {
  let n = conn.execute(
    "DELETE FROM reactions WHERE article_id = ?1",
    params![encode_uuid(article_id)],
  )?;
  debug!(%article_id, removed = n, "deleted reactions");
  Ok(n)
}
