//! Bookmarks: a user's saved articles. Pure membership with a timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::article::Article;

/// A bookmark joined with the article it points at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkedArticle {
  pub added_at: DateTime<Utc>,
  pub article:  Article,
}
