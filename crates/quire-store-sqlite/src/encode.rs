//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that lexical order equals chronological order. UUIDs are stored
//! as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use quire_core::{
  article::{Article, Block, BlockKind},
  comment::Comment,
  reaction::{Reaction, ReactionKind},
  tag::Tag,
  user::User,
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// The current time, truncated to the precision stored in the database so
/// values returned from writes compare equal to values read back.
pub fn now() -> DateTime<Utc> {
  let t = Utc::now();
  decode_dt(&encode_dt(t)).unwrap_or(t)
}

fn decode_count(n: i64) -> Result<u64> {
  u64::try_from(n).map_err(|_| Error::Decode(format!("negative count: {n}")))
}

/// Unicode-aware lower-casing used for the `*_folded` search columns.
pub fn fold(s: &str) -> String { s.to_lowercase() }

/// Build a `LIKE ... ESCAPE '\'` pattern matching `needle` as a substring of a
/// folded column.
pub fn contains_pattern(needle: &str) -> String {
  let mut pattern = String::with_capacity(needle.len() + 2);
  pattern.push('%');
  for c in fold(needle).chars() {
    if matches!(c, '%' | '_' | '\\') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawArticle::from_row`]; expects the table alias `a`.
pub const ARTICLE_COLUMNS: &str = "a.article_id, a.author_id, a.title, \
  a.short_description, a.published, a.created_at, a.updated_at, \
  a.view_count, a.review_of";

/// Raw values read directly from an `articles` row.
pub struct RawArticle {
  pub article_id:        String,
  pub author_id:         String,
  pub title:             String,
  pub short_description: String,
  pub published:         bool,
  pub created_at:        String,
  pub updated_at:        String,
  pub view_count:        i64,
  pub review_of:         Option<String>,
}

impl RawArticle {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      article_id:        row.get(0)?,
      author_id:         row.get(1)?,
      title:             row.get(2)?,
      short_description: row.get(3)?,
      published:         row.get(4)?,
      created_at:        row.get(5)?,
      updated_at:        row.get(6)?,
      view_count:        row.get(7)?,
      review_of:         row.get(8)?,
    })
  }

  pub fn into_article(self) -> Result<Article> {
    Ok(Article {
      article_id:        decode_uuid(&self.article_id)?,
      author_id:         decode_uuid(&self.author_id)?,
      title:             self.title,
      short_description: self.short_description,
      published:         self.published,
      created_at:        decode_dt(&self.created_at)?,
      updated_at:        decode_dt(&self.updated_at)?,
      view_count:        decode_count(self.view_count)?,
      review_of:         self.review_of.as_deref().map(decode_uuid).transpose()?,
    })
  }
}

/// Raw values read from a `blocks` row, in column order
/// `block_id, article_id, kind, content, position, created_at`.
pub struct RawBlock {
  pub block_id:   String,
  pub article_id: String,
  pub kind:       String,
  pub content:    String,
  pub position:   i64,
  pub created_at: String,
}

impl RawBlock {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      block_id:   row.get(0)?,
      article_id: row.get(1)?,
      kind:       row.get(2)?,
      content:    row.get(3)?,
      position:   row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_block(self) -> Result<Block> {
    Ok(Block {
      block_id:   decode_uuid(&self.block_id)?,
      article_id: decode_uuid(&self.article_id)?,
      kind:       BlockKind::parse(&self.kind)?,
      content:    self.content,
      position:   u32::try_from(self.position)
        .map_err(|_| Error::Decode(format!("block position {}", self.position)))?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read from a `tags` row: `tag_id, name, slug`.
pub struct RawTag {
  pub tag_id: String,
  pub name:   String,
  pub slug:   String,
}

impl RawTag {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { tag_id: row.get(0)?, name: row.get(1)?, slug: row.get(2)? })
  }

  pub fn into_tag(self) -> Result<Tag> {
    Ok(Tag { tag_id: decode_uuid(&self.tag_id)?, name: self.name, slug: self.slug })
  }
}

/// Raw values read from a `users` row: `user_id, name, created_at`.
pub struct RawUser {
  pub user_id:    String,
  pub name:       String,
  pub created_at: String,
}

impl RawUser {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { user_id: row.get(0)?, name: row.get(1)?, created_at: row.get(2)? })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    decode_uuid(&self.user_id)?,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read from a `comments` row, in column order
/// `comment_id, article_id, author_id, content, parent_id, created_at,
/// updated_at`.
pub struct RawComment {
  pub comment_id: String,
  pub article_id: String,
  pub author_id:  String,
  pub content:    String,
  pub parent_id:  Option<String>,
  pub created_at: String,
  pub updated_at: String,
}

impl RawComment {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      comment_id: row.get(0)?,
      article_id: row.get(1)?,
      author_id:  row.get(2)?,
      content:    row.get(3)?,
      parent_id:  row.get(4)?,
      created_at: row.get(5)?,
      updated_at: row.get(6)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      comment_id: decode_uuid(&self.comment_id)?,
      article_id: decode_uuid(&self.article_id)?,
      author_id:  decode_uuid(&self.author_id)?,
      content:    self.content,
      parent_id:  self.parent_id.as_deref().map(decode_uuid).transpose()?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read from a `reactions` row:
/// `user_id, article_id, kind, reacted_at`.
pub struct RawReaction {
  pub user_id:    String,
  pub article_id: String,
  pub kind:       u8,
  pub reacted_at: String,
}

impl RawReaction {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:    row.get(0)?,
      article_id: row.get(1)?,
      kind:       row.get(2)?,
      reacted_at: row.get(3)?,
    })
  }

  pub fn into_reaction(self) -> Result<Reaction> {
    Ok(Reaction {
      user_id:    decode_uuid(&self.user_id)?,
      article_id: decode_uuid(&self.article_id)?,
      kind:       ReactionKind::from_code(self.kind)?,
      reacted_at: decode_dt(&self.reacted_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let earlier = DateTime::parse_from_rfc3339("2024-05-01T10:00:01.5Z")
      .unwrap()
      .with_timezone(&Utc);
    let later = DateTime::parse_from_rfc3339("2024-05-01T10:00:01.123456Z")
      .unwrap()
      .with_timezone(&Utc);
    assert!(earlier > later);
    assert!(encode_dt(earlier) > encode_dt(later));
    assert_eq!(decode_dt(&encode_dt(later)).unwrap(), later);
  }

  #[test]
  fn contains_pattern_escapes_wildcards() {
    assert_eq!(contains_pattern("Rust"), "%rust%");
    assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
  }
}
