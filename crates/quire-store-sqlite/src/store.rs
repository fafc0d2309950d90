//! [`SqliteStore`], the SQLite implementation of [`BlogStore`].

use std::path::Path;

use quire_core::{
  article::{Article, ArticleEdit, ArticleView, NewArticle},
  bookmark::BookmarkedArticle,
  comment::{Comment, NewComment},
  reaction::{Reaction, ReactionKind, ReactionStats},
  store::{ArticleQuery, BlogStore},
  tag::{Tag, TagCount},
  user::User,
};
use rusqlite::{Connection, TransactionBehavior};
use uuid::Uuid;

use crate::{
  Error, Result, articles, bookmarks, comments, reactions, schema::SCHEMA, search, tags,
  users,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Quire store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `op` inside one `IMMEDIATE` transaction. The transaction commits
  /// only when `op` succeeds; on error it is dropped and rolled back.
  async fn write<T, F>(&self, op: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = op(&tx);
        if out.is_ok() {
          tx.commit()?;
        }
        Ok(out)
      })
      .await?
  }

  /// Run `op` against one consistent snapshot.
  async fn read<T, F>(&self, op: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        Ok(op(&tx))
      })
      .await?
  }

  /// Number of rows in `table` whose `column` equals `id`.
  #[cfg(test)]
  pub(crate) async fn count_rows(
    &self,
    table: &'static str,
    column: &'static str,
    id: Uuid,
  ) -> Result<u64> {
    self
      .read(move |conn| {
        let n: i64 = conn.query_row(
          &format!("SELECT COUNT(*) FROM {table} WHERE {column} = ?1"),
          rusqlite::params![crate::encode::encode_uuid(id)],
          |row| row.get(0),
        )?;
        Ok(n.max(0) as u64)
      })
      .await
  }
}

// ─── BlogStore impl ──────────────────────────────────────────────────────────

impl BlogStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, name: String) -> Result<User> {
    self.write(move |conn| users::insert(conn, &name)).await
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    self.read(move |conn| users::get(conn, id)).await
  }

  // ── Article aggregate ─────────────────────────────────────────────────────

  async fn create_article(&self, input: NewArticle) -> Result<ArticleView> {
    self.write(move |conn| articles::create(conn, input)).await
  }

  async fn update_article(
    &self,
    article_id: Uuid,
    requester: Uuid,
    edit: ArticleEdit,
  ) -> Result<ArticleView> {
    self
      .write(move |conn| articles::update(conn, article_id, requester, edit))
      .await
  }

  async fn delete_article(&self, article_id: Uuid, requester: Uuid) -> Result<()> {
    self
      .write(move |conn| articles::delete(conn, article_id, requester))
      .await
  }

  async fn set_published(
    &self,
    article_id: Uuid,
    requester: Uuid,
    published: bool,
  ) -> Result<Article> {
    self
      .write(move |conn| articles::set_published(conn, article_id, requester, published))
      .await
  }

  async fn increment_view_count(&self, article_id: Uuid) -> Result<u64> {
    self
      .write(move |conn| articles::increment_views(conn, article_id))
      .await
  }

  async fn get_article(&self, article_id: Uuid) -> Result<Option<ArticleView>> {
    self.read(move |conn| articles::get(conn, article_id)).await
  }

  async fn has_user_reviewed(&self, user_id: Uuid, article_id: Uuid) -> Result<bool> {
    self
      .read(move |conn| articles::has_reviewed(conn, user_id, article_id))
      .await
  }

  async fn reviews_of(&self, article_id: Uuid) -> Result<Vec<Article>> {
    self.read(move |conn| articles::reviews_of(conn, article_id)).await
  }

  async fn search_articles<'a>(&'a self, query: &'a ArticleQuery) -> Result<Vec<Article>> {
    let query = query.clone();
    self.read(move |conn| search::articles(conn, &query)).await
  }

  // ── Tags ──────────────────────────────────────────────────────────────────

  async fn find_or_create_tag(&self, raw_name: String) -> Result<Tag> {
    self
      .write(move |conn| tags::find_or_create(conn, &raw_name))
      .await
  }

  async fn find_or_create_tags(&self, raw_names: Vec<String>) -> Result<Vec<Tag>> {
    self
      .write(move |conn| tags::find_or_create_many(conn, &raw_names))
      .await
  }

  async fn search_tags(&self, needle: Option<String>, limit: usize) -> Result<Vec<Tag>> {
    self
      .read(move |conn| tags::search(conn, needle.as_deref(), limit))
      .await
  }

  async fn popular_tags(&self, limit: usize) -> Result<Vec<TagCount>> {
    self.read(move |conn| tags::popular(conn, limit)).await
  }

  // ── Reactions ─────────────────────────────────────────────────────────────

  async fn set_reaction(
    &self,
    user_id: Uuid,
    article_id: Uuid,
    kind: ReactionKind,
  ) -> Result<Reaction> {
    self
      .write(move |conn| reactions::upsert(conn, user_id, article_id, kind))
      .await
  }

  async fn remove_reaction(&self, user_id: Uuid, article_id: Uuid) -> Result<bool> {
    self
      .write(move |conn| reactions::remove(conn, user_id, article_id))
      .await
  }

  async fn get_reaction(&self, user_id: Uuid, article_id: Uuid) -> Result<Option<Reaction>> {
    self
      .read(move |conn| reactions::get(conn, user_id, article_id))
      .await
  }

  async fn reaction_stats(&self, article_id: Uuid) -> Result<ReactionStats> {
    self.read(move |conn| reactions::stats(conn, article_id)).await
  }

  // ── Bookmarks ─────────────────────────────────────────────────────────────

  async fn toggle_bookmark(&self, user_id: Uuid, article_id: Uuid) -> Result<bool> {
    self
      .write(move |conn| bookmarks::toggle(conn, user_id, article_id))
      .await
  }

  async fn is_bookmarked(&self, user_id: Uuid, article_id: Uuid) -> Result<bool> {
    self
      .read(move |conn| bookmarks::exists(conn, user_id, article_id))
      .await
  }

  async fn list_bookmarks(&self, user_id: Uuid) -> Result<Vec<BookmarkedArticle>> {
    self
      .read(move |conn| bookmarks::list_for_user(conn, user_id))
      .await
  }

  async fn bookmark_count(&self, user_id: Uuid) -> Result<u64> {
    self
      .read(move |conn| bookmarks::count_for_user(conn, user_id))
      .await
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn create_comment(&self, input: NewComment) -> Result<Comment> {
    self.write(move |conn| comments::create(conn, input)).await
  }

  async fn delete_comment(&self, comment_id: Uuid, requester: Uuid) -> Result<()> {
    self
      .write(move |conn| comments::delete(conn, comment_id, requester))
      .await
  }

  async fn list_comments(&self, article_id: Uuid) -> Result<Vec<Comment>> {
    self
      .read(move |conn| comments::list_for_article(conn, article_id))
      .await
  }

  async fn comment_count(&self, article_id: Uuid) -> Result<u64> {
    self
      .read(move |conn| comments::count_for_article(conn, article_id))
      .await
  }
}
