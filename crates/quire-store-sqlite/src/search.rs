//! Read-only article search.
//!
//! Builds one `SELECT` whose `WHERE` clause grows with the filters set on the
//! [`ArticleQuery`]. Every value is bound as a parameter.

use quire_core::{article::Article, store::ArticleQuery, tag::normalize_name};
use rusqlite::{Connection, params_from_iter, types::Value};

use crate::{
  Result,
  encode::{ARTICLE_COLUMNS, RawArticle, contains_pattern, encode_uuid},
};

/// Page size used when the query does not set one.
pub const DEFAULT_LIMIT: usize = 100;

pub fn articles(conn: &Connection, query: &ArticleQuery) -> Result<Vec<Article>> {
  let mut clauses = vec!["a.published = ?".to_owned()];
  let mut values = vec![Value::Integer(i64::from(query.published))];

  if let Some(title) = query.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
    clauses.push("a.title_folded LIKE ? ESCAPE '\\'".to_owned());
    values.push(Value::Text(contains_pattern(title)));
  }

  if !query.tags.is_empty() {
    // Names that cannot be tags are skipped; a filter made only of those
    // matches nothing.
    let mut names: Vec<String> = Vec::new();
    for name in query.tags.iter().filter_map(|t| normalize_name(t).ok()) {
      if !names.contains(&name) {
        names.push(name);
      }
    }
    if names.is_empty() {
      return Ok(Vec::new());
    }
    let marks = vec!["?"; names.len()].join(", ");
    clauses.push(format!(
      "EXISTS (
         SELECT 1 FROM article_tags at
         JOIN tags t ON t.tag_id = at.tag_id
         WHERE at.article_id = a.article_id AND t.name IN ({marks})
       )"
    ));
    values.extend(names.into_iter().map(Value::Text));
  }

  if let Some(author) = query.author_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
    clauses.push(
      "EXISTS (
         SELECT 1 FROM users u
         WHERE u.user_id = a.author_id AND u.name_folded LIKE ? ESCAPE '\\'
       )"
        .to_owned(),
    );
    values.push(Value::Text(contains_pattern(author)));
  }

  if let Some(author_id) = query.author_id {
    clauses.push("a.author_id = ?".to_owned());
    values.push(Value::Text(encode_uuid(author_id)));
  }

  if query.exclude_reviews {
    clauses.push("a.review_of IS NULL".to_owned());
  }

  let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
  values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
  values.push(Value::Integer(i64::try_from(query.offset.unwrap_or(0)).unwrap_or(i64::MAX)));

  let sql = format!(
    "SELECT {ARTICLE_COLUMNS} FROM articles a
     WHERE {}
     ORDER BY a.created_at DESC, a.rowid DESC
     LIMIT ? OFFSET ?",
    clauses.join(" AND ")
  );

  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(params_from_iter(values), RawArticle::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws.into_iter().map(RawArticle::into_article).collect()
}
