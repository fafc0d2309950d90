//! The article aggregate: the article row, its ordered blocks, and the inputs
//! accepted by the aggregate operations.
//!
//! An article exclusively owns its blocks, reactions, comments and bookmarks,
//! and shares its tags. A non-null `review_of` makes the article a review of
//! another article; the relation is one level deep.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, tag::Tag};

/// Upper bound on a title, in characters.
pub const TITLE_MAX_CHARS: usize = 70;

/// Upper bound on a short description, in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 100;

// ─── Blocks ──────────────────────────────────────────────────────────────────

/// The content type of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
  Text,
  /// `content` is a reference into the external file store, not inline bytes.
  Media,
  Code,
}

impl BlockKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Text => "text",
      Self::Media => "media",
      Self::Code => "code",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "text" => Ok(Self::Text),
      "media" => Ok(Self::Media),
      "code" => Ok(Self::Code),
      other => Err(Error::validation(format!("unknown block kind: {other:?}"))),
    }
  }
}

/// A stored content segment. `position` is dense and zero-based per article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
  pub block_id:   Uuid,
  pub article_id: Uuid,
  pub kind:       BlockKind,
  pub content:    String,
  pub position:   u32,
  pub created_at: DateTime<Utc>,
}

/// A block as supplied by a caller. Positions are always assigned by the
/// store from the order of the input sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBlock {
  pub kind:    BlockKind,
  pub content: String,
}

impl NewBlock {
  pub fn new(kind: BlockKind, content: impl Into<String>) -> Self {
    Self { kind, content: content.into() }
  }

  pub fn text(content: impl Into<String>) -> Self {
    Self::new(BlockKind::Text, content)
  }
}

// ─── Article ─────────────────────────────────────────────────────────────────

/// The aggregate root row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
  pub article_id:        Uuid,
  pub author_id:         Uuid,
  pub title:             String,
  pub short_description: String,
  pub published:         bool,
  pub created_at:        DateTime<Utc>,
  /// Touched by every mutation of the aggregate.
  pub updated_at:        DateTime<Utc>,
  pub view_count:        u64,
  /// The article this one reviews, if any.
  pub review_of:         Option<Uuid>,
}

impl Article {
  pub fn is_review(&self) -> bool { self.review_of.is_some() }
}

/// The assembled read model for one article. Never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleView {
  #[serde(flatten)]
  pub article:      Article,
  pub is_review:    bool,
  /// Ordered by `position`.
  pub blocks:       Vec<Block>,
  /// Ordered by name.
  pub tags:         Vec<Tag>,
  /// Number of published reviews targeting this article.
  pub review_count: u64,
}

impl ArticleView {
  pub fn new(
    article: Article,
    blocks: Vec<Block>,
    tags: Vec<Tag>,
    review_count: u64,
  ) -> Self {
    Self { is_review: article.is_review(), article, blocks, tags, review_count }
  }

  pub fn tag_names(&self) -> Vec<&str> {
    self.tags.iter().map(|t| t.name.as_str()).collect()
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::BlogStore::create_article`].
#[derive(Debug, Clone)]
pub struct NewArticle {
  pub author_id:         Uuid,
  pub title:             String,
  pub short_description: String,
  pub blocks:            Vec<NewBlock>,
  pub published:         bool,
  pub tags:              Vec<String>,
  pub review_of:         Option<Uuid>,
}

impl NewArticle {
  /// Convenience constructor: an unpublished, untagged draft with no blocks.
  pub fn new(author_id: Uuid, title: impl Into<String>) -> Self {
    Self {
      author_id,
      title: title.into(),
      short_description: String::new(),
      blocks: Vec::new(),
      published: false,
      tags: Vec::new(),
      review_of: None,
    }
  }

  /// Check field bounds, returning the trimmed title.
  pub fn validate(&self) -> Result<String> {
    validate_description(&self.short_description)?;
    validate_title(&self.title)
  }
}

/// Input to [`crate::store::BlogStore::update_article`]: a full replacement of
/// the mutable state of an article.
#[derive(Debug, Clone)]
pub struct ArticleEdit {
  pub title:             String,
  pub short_description: String,
  pub blocks:            Vec<NewBlock>,
  pub published:         bool,
  /// The complete new tag set; empty clears every association.
  pub tags:              Vec<String>,
}

impl ArticleEdit {
  pub fn validate(&self) -> Result<String> {
    validate_description(&self.short_description)?;
    validate_title(&self.title)
  }
}

impl From<ArticleView> for ArticleEdit {
  /// Start an edit from the current state of an article.
  fn from(view: ArticleView) -> Self {
    Self {
      title:             view.article.title,
      short_description: view.article.short_description,
      blocks:            view
        .blocks
        .into_iter()
        .map(|b| NewBlock { kind: b.kind, content: b.content })
        .collect(),
      published:         view.article.published,
      tags:              view.tags.into_iter().map(|t| t.name).collect(),
    }
  }
}

/// Trim a title and check it is non-empty and within bounds.
pub fn validate_title(title: &str) -> Result<String> {
  let trimmed = title.trim();
  if trimmed.is_empty() {
    return Err(Error::validation("title must not be empty"));
  }
  if trimmed.chars().count() > TITLE_MAX_CHARS {
    return Err(Error::validation(format!(
      "title exceeds {TITLE_MAX_CHARS} characters"
    )));
  }
  Ok(trimmed.to_owned())
}

pub fn validate_description(description: &str) -> Result<()> {
  if description.chars().count() > DESCRIPTION_MAX_CHARS {
    return Err(Error::validation(format!(
      "short description exceeds {DESCRIPTION_MAX_CHARS} characters"
    )));
  }
  Ok(())
}
