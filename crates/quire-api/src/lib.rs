//! JSON REST API for Quire.
//!
//! Exposes an axum [`Router`] backed by any [`quire_core::store::BlogStore`].
//! The acting user arrives in the `X-User-Id` header, set by an upstream
//! identity provider; TLS and credentials are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", quire_api::api_router(store.clone()))
//! ```

pub mod articles;
pub mod bookmarks;
pub mod comments;
pub mod error;
pub mod reactions;
pub mod requester;
pub mod tags;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use quire_core::store::BlogStore;

pub use error::ApiError;
pub use requester::{Requester, USER_ID_HEADER};

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: BlogStore + 'static,
{
  Router::new()
    // Users
    .route("/users", post(users::create::<S>))
    .route("/users/{id}", get(users::get_one::<S>))
    .route("/users/{id}/bookmarks", get(users::bookmarks::<S>))
    // Articles
    .route("/articles", get(articles::search::<S>).post(articles::create::<S>))
    .route(
      "/articles/{id}",
      get(articles::view::<S>)
        .put(articles::update::<S>)
        .delete(articles::delete::<S>),
    )
    .route("/articles/{id}/publish", post(articles::publish::<S>))
    .route("/articles/{id}/unpublish", post(articles::unpublish::<S>))
    .route("/articles/{id}/reviews", get(articles::reviews::<S>))
    // Comments
    .route(
      "/articles/{id}/comments",
      get(comments::list::<S>).post(comments::create::<S>),
    )
    .route("/comments/{id}", delete(comments::delete::<S>))
    // Reactions
    .route("/articles/{id}/reactions", get(reactions::stats::<S>))
    .route(
      "/articles/{id}/reaction",
      get(reactions::get_mine::<S>)
        .put(reactions::set::<S>)
        .delete(reactions::remove::<S>),
    )
    // Bookmarks
    .route(
      "/articles/{id}/bookmark",
      get(bookmarks::status::<S>).post(bookmarks::toggle::<S>),
    )
    // Tags
    .route("/tags", get(tags::search::<S>).post(tags::find_or_create::<S>))
    .route("/tags/popular", get(tags::popular::<S>))
    .with_state(store)
}
