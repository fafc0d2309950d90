//! Blocks, the ordered body of an article.
//!
//! Positions are never taken from callers: every write replaces the whole
//! sequence and renumbers it `0..n` in input order.

use chrono::{DateTime, Utc};
use quire_core::article::{Block, NewBlock};
use rusqlite::{Connection, params};
use tracing::debug;
use uuid::Uuid;

use crate::{
  Result,
  encode::{RawBlock, encode_dt, encode_uuid},
};

/// Insert `blocks` for an article that currently has none.
pub fn insert_all(
  conn: &Connection,
  article_id: Uuid,
  blocks: Vec<NewBlock>,
  now: DateTime<Utc>,
) -> Result<Vec<Block>> {
  let article_id_str = encode_uuid(article_id);
  let at_str = encode_dt(now);

  let mut stmt = conn.prepare_cached(
    "INSERT INTO blocks (block_id, article_id, kind, content, position, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
  )?;

  let mut stored = Vec::with_capacity(blocks.len());
  for (position, input) in (0u32..).zip(blocks) {
    let block = Block {
      block_id: Uuid::new_v4(),
      article_id,
      kind: input.kind,
      content: input.content,
      position,
      created_at: now,
    };
    stmt.execute(params![
      encode_uuid(block.block_id),
      article_id_str,
      block.kind.as_str(),
      block.content,
      block.position,
      at_str,
    ])?;
    stored.push(block);
  }

  Ok(stored)
}

/// Delete every block of an article; returns the number removed.
pub fn delete_for_article(conn: &Connection, article_id: Uuid) -> Result<usize> {
  let n = conn.execute(
    "DELETE FROM blocks WHERE article_id = ?1",
    params![encode_uuid(article_id)],
  )?;
  debug!(%article_id, removed = n, "deleted blocks");
  Ok(n)
}

/// Delete-all-then-insert-all. Must run inside the caller's transaction.
pub fn replace(
  conn: &Connection,
  article_id: Uuid,
  blocks: Vec<NewBlock>,
  now: DateTime<Utc>,
) -> Result<Vec<Block>> {
  delete_for_article(conn, article_id)?;
  insert_all(conn, article_id, blocks, now)
}

/// Blocks of an article in position order.
pub fn for_article(conn: &Connection, article_id: Uuid) -> Result<Vec<Block>> {
  let mut stmt = conn.prepare_cached(
    "SELECT block_id, article_id, kind, content, position, created_at
     FROM blocks WHERE article_id = ?1 ORDER BY position",
  )?;
  let raws = stmt
    .query_map(params![encode_uuid(article_id)], RawBlock::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws.into_iter().map(RawBlock::into_block).collect()
}
