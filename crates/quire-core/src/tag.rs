//! Tags and the pure half of the tag normaliser.
//!
//! A tag is identified by its normalised name: trimmed and lower-cased. The
//! slug is derived from that name deterministically. Persistence (the
//! find-or-create half) lives in the storage backend.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Upper bound on a normalised tag name, in characters.
pub const NAME_MAX_CHARS: usize = 50;

/// Separator substituted for every run of non-alphanumeric characters.
pub const SLUG_SEPARATOR: char = '-';

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
  pub tag_id: Uuid,
  /// Normalised display name; unique.
  pub name:   String,
  /// URL-safe form of `name`; unique.
  pub slug:   String,
}

/// A tag together with the number of articles associated with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagCount {
  #[serde(flatten)]
  pub tag:           Tag,
  pub article_count: u64,
}

/// Canonicalise a free-text tag name.
///
/// Fails with a validation error when the result is empty, exceeds
/// [`NAME_MAX_CHARS`], or would produce an empty slug.
pub fn normalize_name(raw: &str) -> Result<String> {
  let name = raw.trim().to_lowercase();
  if name.is_empty() {
    return Err(Error::validation("tag name must not be empty"));
  }
  if name.chars().count() > NAME_MAX_CHARS {
    return Err(Error::validation(format!(
      "tag name exceeds {NAME_MAX_CHARS} characters: {name:?}"
    )));
  }
  if slugify(&name).is_empty() {
    return Err(Error::validation(format!(
      "tag name has no letters or digits: {name:?}"
    )));
  }
  Ok(name)
}

/// Derive a slug: lower-case, collapse every run of characters that are not
/// letters or digits into one separator, then trim separators at both ends.
///
/// Letters outside ASCII (e.g. Cyrillic) are kept as-is.
pub fn slugify(name: &str) -> String {
  let mut slug = String::with_capacity(name.len());
  let mut pending_sep = false;
  for c in name.chars().flat_map(char::to_lowercase) {
    if c.is_alphanumeric() {
      if pending_sep && !slug.is_empty() {
        slug.push(SLUG_SEPARATOR);
      }
      pending_sep = false;
      slug.push(c);
    } else {
      pending_sep = true;
    }
  }
  slug
}

/// Normalise a batch of names, collapsing duplicates while keeping the order
/// of first appearance.
pub fn normalize_names<I, S>(raw: I) -> Result<Vec<String>>
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let mut names: Vec<String> = Vec::new();
  for r in raw {
    let name = normalize_name(r.as_ref())?;
    if !names.contains(&name) {
      names.push(name);
    }
  }
  Ok(names)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_trims_and_lowercases() {
    assert_eq!(normalize_name("  Rust ").unwrap(), "rust");
    assert_eq!(normalize_name("rust").unwrap(), "rust");
  }

  #[test]
  fn normalize_rejects_empty_and_symbol_only() {
    assert!(matches!(normalize_name("   "), Err(Error::Validation(_))));
    assert!(matches!(normalize_name("!!!"), Err(Error::Validation(_))));
  }

  #[test]
  fn normalize_rejects_overlong() {
    let long = "a".repeat(NAME_MAX_CHARS + 1);
    assert!(matches!(normalize_name(&long), Err(Error::Validation(_))));
    assert!(normalize_name(&"a".repeat(NAME_MAX_CHARS)).is_ok());
  }

  #[test]
  fn slug_collapses_runs_and_trims() {
    assert_eq!(slugify("Hello,   World!"), "hello-world");
    assert_eq!(slugify("--systems__programming--"), "systems-programming");
    assert_eq!(slugify("c++"), "c");
    assert_eq!(slugify("web 2.0"), "web-2-0");
  }

  #[test]
  fn slug_keeps_non_ascii_letters() {
    assert_eq!(slugify("Ёжик в тумане"), "ёжик-в-тумане");
  }

  #[test]
  fn normalize_names_dedups_in_order() {
    let names = normalize_names(["Rust", "go", "rust ", "GO", "zig"]).unwrap();
    assert_eq!(names, vec!["rust", "go", "zig"]);
  }
}
