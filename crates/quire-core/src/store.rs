//! The `BlogStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `quire-store-sqlite`).
//! Higher layers (`quire-api`, `quire-server`) depend on this abstraction, not
//! on any concrete backend.
//!
//! Every operation that acts on behalf of a user takes that user's id
//! explicitly. Authorship checks happen inside the store, in the same
//! transaction as the mutation they guard.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Classify, ErrorKind,
  article::{Article, ArticleEdit, ArticleView, NewArticle},
  bookmark::BookmarkedArticle,
  comment::{Comment, NewComment},
  reaction::{Reaction, ReactionKind, ReactionStats},
  tag::{Tag, TagCount},
  user::User,
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`BlogStore::search_articles`].
///
/// All set filters must match. Results are ordered newest-first.
#[derive(Debug, Clone)]
pub struct ArticleQuery {
  /// Case-insensitive substring of the title.
  pub title:           Option<String>,
  /// Match-any: the article carries at least one of these tags. Names are
  /// normalised before matching.
  pub tags:            Vec<String>,
  /// Case-insensitive substring of the author's display name.
  pub author_name:     Option<String>,
  pub author_id:       Option<Uuid>,
  /// `true` (the default) lists published articles, `false` lists drafts.
  pub published:       bool,
  /// Only original articles, no reviews.
  pub exclude_reviews: bool,
  pub limit:           Option<usize>,
  pub offset:          Option<usize>,
}

impl Default for ArticleQuery {
  fn default() -> Self {
    Self {
      title:           None,
      tags:            Vec::new(),
      author_name:     None,
      author_id:       None,
      published:       true,
      exclude_reviews: false,
      limit:           None,
      offset:          None,
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Quire storage backend.
///
/// Each multi-step mutation is atomic: a concurrent reader observes either the
/// state before it or the state after it, never an intermediate one.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait BlogStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  fn add_user(
    &self,
    name: String,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Article aggregate ─────────────────────────────────────────────────

  /// Persist an article, its blocks (positions `0..n`), its tag associations
  /// and its review link in one transaction.
  ///
  /// Fails with `NotFound` if the author or review target does not exist, and
  /// `Conflict` if the author already reviewed the target.
  fn create_article(
    &self,
    input: NewArticle,
  ) -> impl Future<Output = Result<ArticleView, Self::Error>> + Send + '_;

  /// Replace title, description, published flag, every block and every tag
  /// association of an article. Only the author may do this.
  fn update_article(
    &self,
    article_id: Uuid,
    requester: Uuid,
    edit: ArticleEdit,
  ) -> impl Future<Output = Result<ArticleView, Self::Error>> + Send + '_;

  /// Delete an article and everything that depends on it, including every
  /// review targeting it (recursively). Only the author may do this.
  fn delete_article(
    &self,
    article_id: Uuid,
    requester: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Set the published flag. Idempotent. Only the author may do this.
  fn set_published(
    &self,
    article_id: Uuid,
    requester: Uuid,
    published: bool,
  ) -> impl Future<Output = Result<Article, Self::Error>> + Send + '_;

  /// Atomically bump the view counter and return its new value.
  fn increment_view_count(
    &self,
    article_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Assemble the read model for an article without counting a view.
  fn get_article(
    &self,
    article_id: Uuid,
  ) -> impl Future<Output = Result<Option<ArticleView>, Self::Error>> + Send + '_;

  /// Whether `user_id` already authored a review of `article_id`.
  fn has_user_reviewed(
    &self,
    user_id: Uuid,
    article_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Published reviews of an article, newest-first.
  fn reviews_of(
    &self,
    article_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Article>, Self::Error>> + Send + '_;

  fn search_articles<'a>(
    &'a self,
    query: &'a ArticleQuery,
  ) -> impl Future<Output = Result<Vec<Article>, Self::Error>> + Send + 'a;

  // ── Tags ──────────────────────────────────────────────────────────────

  /// Return the tag with this normalised name, creating it if absent.
  fn find_or_create_tag(
    &self,
    raw_name: String,
  ) -> impl Future<Output = Result<Tag, Self::Error>> + Send + '_;

  /// Batch form of [`Self::find_or_create_tag`]; duplicate names collapse.
  fn find_or_create_tags(
    &self,
    raw_names: Vec<String>,
  ) -> impl Future<Output = Result<Vec<Tag>, Self::Error>> + Send + '_;

  /// Tags whose name contains `needle` (case-insensitive), by name.
  fn search_tags(
    &self,
    needle: Option<String>,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Tag>, Self::Error>> + Send + '_;

  /// Tags ordered by how many articles carry them.
  fn popular_tags(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<TagCount>, Self::Error>> + Send + '_;

  // ── Reactions ─────────────────────────────────────────────────────────

  /// Insert or replace the user's reaction to an article.
  fn set_reaction(
    &self,
    user_id: Uuid,
    article_id: Uuid,
    kind: ReactionKind,
  ) -> impl Future<Output = Result<Reaction, Self::Error>> + Send + '_;

  /// Returns `true` if a reaction was removed.
  fn remove_reaction(
    &self,
    user_id: Uuid,
    article_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn get_reaction(
    &self,
    user_id: Uuid,
    article_id: Uuid,
  ) -> impl Future<Output = Result<Option<Reaction>, Self::Error>> + Send + '_;

  fn reaction_stats(
    &self,
    article_id: Uuid,
  ) -> impl Future<Output = Result<ReactionStats, Self::Error>> + Send + '_;

  // ── Bookmarks ─────────────────────────────────────────────────────────

  /// Flip the bookmark state and return the new one (`true` = bookmarked).
  fn toggle_bookmark(
    &self,
    user_id: Uuid,
    article_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn is_bookmarked(
    &self,
    user_id: Uuid,
    article_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// A user's bookmarks, most recently added first.
  fn list_bookmarks(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<BookmarkedArticle>, Self::Error>> + Send + '_;

  fn bookmark_count(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  fn create_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// Delete a comment and its replies. Only the comment's author may do this.
  fn delete_comment(
    &self,
    comment_id: Uuid,
    requester: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Comments on an article, newest-first.
  fn list_comments(
    &self,
    article_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  fn comment_count(
    &self,
    article_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}

/// Convenience operations built from the required ones.
pub trait BlogStoreExt: BlogStore {
  /// Count a view and return the freshly assembled article.
  fn view_article(
    &self,
    article_id: Uuid,
  ) -> impl Future<Output = Result<Option<ArticleView>, Self::Error>> + Send + '_
  {
    async move {
      match self.increment_view_count(article_id).await {
        Ok(_) => self.get_article(article_id).await,
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
      }
    }
  }

  fn publish_article(
    &self,
    article_id: Uuid,
    requester: Uuid,
  ) -> impl Future<Output = Result<Article, Self::Error>> + Send + '_
  {
    self.set_published(article_id, requester, true)
  }

  fn unpublish_article(
    &self,
    article_id: Uuid,
    requester: Uuid,
  ) -> impl Future<Output = Result<Article, Self::Error>> + Send + '_
  {
    self.set_published(article_id, requester, false)
  }
}

impl<S: BlogStore> BlogStoreExt for S {}
