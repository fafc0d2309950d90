//! Comments on articles, optionally threaded under a parent comment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id: Uuid,
  pub article_id: Uuid,
  pub author_id:  Uuid,
  pub content:    String,
  /// The comment this one replies to; always within the same article.
  pub parent_id:  Option<Uuid>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::BlogStore::create_comment`].
#[derive(Debug, Clone)]
pub struct NewComment {
  pub article_id: Uuid,
  pub author_id:  Uuid,
  pub content:    String,
  pub parent_id:  Option<Uuid>,
}

impl NewComment {
  pub fn new(article_id: Uuid, author_id: Uuid, content: impl Into<String>) -> Self {
    Self { article_id, author_id, content: content.into(), parent_id: None }
  }

  pub fn reply_to(mut self, parent_id: Uuid) -> Self {
    self.parent_id = Some(parent_id);
    self
  }

  /// Returns the trimmed content.
  pub fn validate(&self) -> Result<String> {
    let content = self.content.trim();
    if content.is_empty() {
      return Err(Error::validation("comment must not be empty"));
    }
    Ok(content.to_owned())
  }
}
