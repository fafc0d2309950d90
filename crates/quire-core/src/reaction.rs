//! Reaction kinds and reaction records.
//!
//! A reaction is a single (user, article) pair carrying one of twelve fixed
//! kinds. Only the integer code is persisted; glyph and polarity come from the
//! lookup table below and never reach the write path.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator as _};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Kind ────────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  EnumIter,
  strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReactionKind {
  Like,
  Dislike,
  Love,
  Laugh,
  Sad,
  Angry,
  Surprise,
  Fire,
  Thinking,
  Clap,
  Confused,
  Celebrate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
  Positive,
  Neutral,
  Negative,
}

/// Static metadata for one reaction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionMeta {
  pub kind:     ReactionKind,
  pub code:     u8,
  pub glyph:    &'static str,
  pub polarity: Polarity,
}

const fn meta(
  kind: ReactionKind,
  code: u8,
  glyph: &'static str,
  polarity: Polarity,
) -> ReactionMeta {
  ReactionMeta { kind, code, glyph, polarity }
}

/// Indexed by `code - 1`; codes are stable and must never be renumbered.
static TABLE: [ReactionMeta; 12] = [
  meta(ReactionKind::Like, 1, "👍", Polarity::Positive),
  meta(ReactionKind::Dislike, 2, "👎", Polarity::Negative),
  meta(ReactionKind::Love, 3, "❤️", Polarity::Positive),
  meta(ReactionKind::Laugh, 4, "😂", Polarity::Positive),
  meta(ReactionKind::Sad, 5, "😢", Polarity::Negative),
  meta(ReactionKind::Angry, 6, "😠", Polarity::Negative),
  meta(ReactionKind::Surprise, 7, "😮", Polarity::Neutral),
  meta(ReactionKind::Fire, 8, "🔥", Polarity::Positive),
  meta(ReactionKind::Thinking, 9, "🤔", Polarity::Neutral),
  meta(ReactionKind::Clap, 10, "👏", Polarity::Positive),
  meta(ReactionKind::Confused, 11, "😕", Polarity::Negative),
  meta(ReactionKind::Celebrate, 12, "🎉", Polarity::Positive),
];

impl ReactionKind {
  /// Full metadata row for this kind.
  pub fn meta(self) -> &'static ReactionMeta { &TABLE[self as usize] }

  /// The stable integer code stored in the database.
  pub fn code(self) -> u8 { self.meta().code }

  pub fn glyph(self) -> &'static str { self.meta().glyph }

  pub fn polarity(self) -> Polarity { self.meta().polarity }

  pub fn from_code(code: u8) -> Result<Self> {
    TABLE
      .iter()
      .find(|m| m.code == code)
      .map(|m| m.kind)
      .ok_or_else(|| Error::validation(format!("unknown reaction code: {code}")))
  }

  pub fn from_glyph(glyph: &str) -> Result<Self> {
    TABLE
      .iter()
      .find(|m| m.glyph == glyph)
      .map(|m| m.kind)
      .ok_or_else(|| {
        Error::validation(format!("unknown reaction glyph: {glyph:?}"))
      })
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// One user's reaction to one article. Unique per (user, article).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
  pub user_id:    Uuid,
  pub article_id: Uuid,
  pub kind:       ReactionKind,
  pub reacted_at: DateTime<Utc>,
}

/// Per-kind reaction counts for an article. Every kind is present, with zero
/// for kinds nobody picked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionStats {
  pub article_id: Uuid,
  pub counts:     BTreeMap<ReactionKind, u64>,
  pub total:      u64,
}

impl ReactionStats {
  /// Build stats from `(kind, count)` pairs, zero-filling absent kinds.
  pub fn from_counts(
    article_id: Uuid,
    counts: impl IntoIterator<Item = (ReactionKind, u64)>,
  ) -> Self {
    let mut map: BTreeMap<ReactionKind, u64> =
      ReactionKind::iter().map(|k| (k, 0)).collect();
    for (kind, n) in counts {
      *map.entry(kind).or_default() += n;
    }
    let total = map.values().sum();
    Self { article_id, counts: map, total }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn table_order_matches_enum_order() {
    for (i, kind) in ReactionKind::iter().enumerate() {
      assert_eq!(kind.meta().kind, kind);
      assert_eq!(usize::from(kind.code()), i + 1);
    }
    assert_eq!(ReactionKind::iter().count(), 12);
  }

  #[test]
  fn lookup_by_code_and_glyph() {
    assert_eq!(ReactionKind::from_code(8).unwrap(), ReactionKind::Fire);
    assert_eq!(ReactionKind::from_glyph("🎉").unwrap(), ReactionKind::Celebrate);
    assert_eq!(ReactionKind::Surprise.polarity(), Polarity::Neutral);
  }

  #[test]
  fn unknown_code_is_a_validation_error() {
    assert!(matches!(ReactionKind::from_code(0), Err(Error::Validation(_))));
    assert!(matches!(ReactionKind::from_code(13), Err(Error::Validation(_))));
    assert!(matches!(ReactionKind::from_glyph("🦀"), Err(Error::Validation(_))));
  }

  #[test]
  fn stats_zero_fill() {
    let stats = ReactionStats::from_counts(
      Uuid::nil(),
      [(ReactionKind::Like, 3), (ReactionKind::Sad, 1)],
    );
    assert_eq!(stats.counts.len(), 12);
    assert_eq!(stats.counts[&ReactionKind::Like], 3);
    assert_eq!(stats.counts[&ReactionKind::Clap], 0);
    assert_eq!(stats.total, 4);
  }
}
