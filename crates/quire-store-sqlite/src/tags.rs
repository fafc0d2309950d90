//! Tag normaliser persistence and article–tag links.
//!
//! Tag rows are unique by normalised name and by slug. Creation is
//! find-or-create; a name that raced in from another writer is picked up by
//! the `ON CONFLICT` clause and re-read instead of failing.

use quire_core::tag::{Tag, TagCount, normalize_name, normalize_names, slugify};
use rusqlite::{Connection, OptionalExtension as _, params};
use tracing::debug;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{RawTag, contains_pattern, encode_uuid},
};

// ─── Normaliser ──────────────────────────────────────────────────────────────

fn by_name(conn: &Connection, name: &str) -> Result<Option<Tag>> {
  let raw = conn
    .query_row(
      "SELECT tag_id, name, slug FROM tags WHERE name = ?1",
      params![name],
      RawTag::from_row,
    )
    .optional()?;
  raw.map(RawTag::into_tag).transpose()
}

fn slug_taken(conn: &Connection, slug: &str) -> Result<bool> {
  Ok(
    conn
      .query_row("SELECT 1 FROM tags WHERE slug = ?1", params![slug], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

/// The first of `base`, `base-2`, `base-3`, ... not used by another tag.
fn unique_slug(conn: &Connection, base: &str) -> Result<String> {
  if !slug_taken(conn, base)? {
    return Ok(base.to_owned());
  }
  let mut n = 2u32;
  loop {
    let candidate = format!("{base}-{n}");
    if !slug_taken(conn, &candidate)? {
      return Ok(candidate);
    }
    n += 1;
  }
}

pub fn find_or_create(conn: &Connection, raw_name: &str) -> Result<Tag> {
  let name = normalize_name(raw_name)?;
  if let Some(tag) = by_name(conn, &name)? {
    return Ok(tag);
  }

  let slug = unique_slug(conn, &slugify(&name))?;
  let tag = Tag { tag_id: Uuid::new_v4(), name, slug };

  let inserted = conn.execute(
    "INSERT INTO tags (tag_id, name, slug) VALUES (?1, ?2, ?3)
     ON CONFLICT (name) DO NOTHING",
    params![encode_uuid(tag.tag_id), tag.name, tag.slug],
  )?;

  if inserted == 0 {
    return by_name(conn, &tag.name)?
      .ok_or_else(|| Error::Decode(format!("tag {:?} vanished", tag.name)));
  }

  debug!(name = %tag.name, slug = %tag.slug, "created tag");
  Ok(tag)
}

pub fn find_or_create_many(conn: &Connection, raw_names: &[String]) -> Result<Vec<Tag>> {
  normalize_names(raw_names)?
    .iter()
    .map(|name| find_or_create(conn, name))
    .collect()
}

// ─── Article links ───────────────────────────────────────────────────────────

/// Remove every tag association of an article. Tags themselves survive.
pub fn unlink_article(conn: &Connection, article_id: Uuid) -> Result<usize> {
  let n = conn.execute(
    "DELETE FROM article_tags WHERE article_id = ?1",
    params![encode_uuid(article_id)],
  )?;
  debug!(%article_id, removed = n, "deleted tag links");
  Ok(n)
}

/// Make `tags` the complete association set of an article.
pub fn replace_links(conn: &Connection, article_id: Uuid, tags: &[Tag]) -> Result<()> {
  unlink_article(conn, article_id)?;

  let article_id_str = encode_uuid(article_id);
  let mut stmt = conn.prepare_cached(
    "INSERT OR IGNORE INTO article_tags (article_id, tag_id) VALUES (?1, ?2)",
  )?;
  for tag in tags {
    stmt.execute(params![article_id_str, encode_uuid(tag.tag_id)])?;
  }
  Ok(())
}

/// Tags associated with an article, by name.
pub fn for_article(conn: &Connection, article_id: Uuid) -> Result<Vec<Tag>> {
  let mut stmt = conn.prepare_cached(
    "SELECT t.tag_id, t.name, t.slug
     FROM tags t
     JOIN article_tags at ON at.tag_id = t.tag_id
     WHERE at.article_id = ?1
     ORDER BY t.name",
  )?;
  let raws = stmt
    .query_map(params![encode_uuid(article_id)], RawTag::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws.into_iter().map(RawTag::into_tag).collect()
}

// ─── Queries ─────────────────────────────────────────────────────────────────

pub fn search(conn: &Connection, needle: Option<&str>, limit: usize) -> Result<Vec<Tag>> {
  let pattern = contains_pattern(needle.map(str::trim).unwrap_or_default());
  let limit = i64::try_from(limit).unwrap_or(i64::MAX);
  let mut stmt = conn.prepare_cached(
    "SELECT tag_id, name, slug FROM tags
     WHERE name LIKE ?1 ESCAPE '\\'
     ORDER BY name
     LIMIT ?2",
  )?;
  let raws = stmt
    .query_map(params![pattern, limit], RawTag::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws.into_iter().map(RawTag::into_tag).collect()
}

pub fn popular(conn: &Connection, limit: usize) -> Result<Vec<TagCount>> {
  let limit = i64::try_from(limit).unwrap_or(i64::MAX);
  let mut stmt = conn.prepare_cached(
    "SELECT t.tag_id, t.name, t.slug, COUNT(at.article_id) AS uses
     FROM tags t
     LEFT JOIN article_tags at ON at.tag_id = t.tag_id
     GROUP BY t.tag_id
     ORDER BY uses DESC, t.name
     LIMIT ?1",
  )?;
  let rows = stmt
    .query_map(params![limit], |row| {
      Ok((RawTag::from_row(row)?, row.get::<_, i64>(3)?))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  rows
    .into_iter()
    .map(|(raw, uses)| {
      Ok(TagCount { tag: raw.into_tag()?, article_count: uses.max(0) as u64 })
    })
    .collect()
}
