//! Integration tests for `SqliteStore` against an in-memory database.

use std::{fmt::Debug, sync::Arc};

use quire_core::{
  Classify, ErrorKind,
  article::{ArticleEdit, BlockKind, NewArticle, NewBlock},
  comment::NewComment,
  reaction::ReactionKind,
  store::{ArticleQuery, BlogStore, BlogStoreExt},
};
use uuid::Uuid;

use crate::{Result, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, name: &str) -> Uuid {
  s.add_user(name.to_owned()).await.unwrap().user_id
}

fn kind_of<T: Debug>(result: Result<T>) -> ErrorKind {
  result.expect_err("operation should fail").kind()
}

fn draft(author: Uuid, title: &str) -> NewArticle {
  NewArticle {
    blocks: vec![NewBlock::text("body")],
    ..NewArticle::new(author, title)
  }
}

fn published(author: Uuid, title: &str) -> NewArticle {
  NewArticle { published: true, ..draft(author, title) }
}

fn review(author: Uuid, target: Uuid, title: &str) -> NewArticle {
  NewArticle { review_of: Some(target), ..published(author, title) }
}

fn positions(view: &quire_core::article::ArticleView) -> Vec<u32> {
  view.blocks.iter().map(|b| b.position).collect()
}

fn drafts_by(author: Uuid) -> ArticleQuery {
  ArticleQuery { author_id: Some(author), published: false, ..Default::default() }
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_user() {
  let s = store().await;
  let added = s.add_user("  Ada ".into()).await.unwrap();
  assert_eq!(added.name, "Ada");

  let fetched = s.get_user(added.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.user_id, added.user_id);
  assert_eq!(fetched.created_at, added.created_at);

  assert!(s.get_user(Uuid::new_v4()).await.unwrap().is_none());
  assert_eq!(kind_of(s.add_user("   ".into()).await), ErrorKind::Validation);
}

// ─── Create / update ─────────────────────────────────────────────────────────

#[tokio::test]
async fn create_article_with_blocks_and_tags() {
  let s = store().await;
  let author = user(&s, "author").await;

  let view = s
    .create_article(NewArticle {
      author_id:         author,
      title:             "Title".into(),
      short_description: "Desc".into(),
      blocks:            vec![
        NewBlock::text("intro"),
        NewBlock::new(BlockKind::Media, "url"),
      ],
      published:         false,
      tags:              vec!["rust".into(), "systems".into()],
      review_of:         None,
    })
    .await
    .unwrap();

  assert_eq!(positions(&view), vec![0, 1]);
  assert_eq!(view.blocks[0].content, "intro");
  assert_eq!(view.blocks[1].kind, BlockKind::Media);
  assert_eq!(view.tag_names(), vec!["rust", "systems"]);
  assert!(!view.article.published);
  assert!(!view.is_review);
  assert_eq!(view.article.view_count, 0);
  assert_eq!(view.article.created_at, view.article.updated_at);

  let stored = s.get_article(view.article.article_id).await.unwrap().unwrap();
  assert_eq!(positions(&stored), vec![0, 1]);
  assert_eq!(stored.tag_names(), vec!["rust", "systems"]);
  assert_eq!(stored.article.created_at, view.article.created_at);
}

#[tokio::test]
async fn update_replaces_blocks_and_tags() {
  let s = store().await;
  let author = user(&s, "author").await;
  let created = s
    .create_article(NewArticle {
      blocks: vec![NewBlock::text("intro"), NewBlock::new(BlockKind::Media, "url")],
      tags: vec!["rust".into(), "systems".into()],
      ..NewArticle::new(author, "Title")
    })
    .await
    .unwrap();
  let id = created.article.article_id;
  let old_block_ids: Vec<Uuid> = created.blocks.iter().map(|b| b.block_id).collect();

  let updated = s
    .update_article(id, author, ArticleEdit {
      title:             "New title".into(),
      short_description: "New desc".into(),
      blocks:            vec![
        NewBlock::text("b0"),
        NewBlock::new(BlockKind::Code, "b1"),
        NewBlock::text("b2"),
      ],
      published:         true,
      tags:              vec!["go".into()],
    })
    .await
    .unwrap();

  assert_eq!(updated.article.title, "New title");
  assert!(updated.article.published);
  assert!(updated.article.updated_at >= created.article.updated_at);
  assert_eq!(updated.tag_names(), vec!["go"]);

  let stored = s.get_article(id).await.unwrap().unwrap();
  assert_eq!(positions(&stored), vec![0, 1, 2]);
  let contents: Vec<&str> = stored.blocks.iter().map(|b| b.content.as_str()).collect();
  assert_eq!(contents, vec!["b0", "b1", "b2"]);
  assert!(stored.blocks.iter().all(|b| !old_block_ids.contains(&b.block_id)));
  assert_eq!(stored.tag_names(), vec!["go"]);

  // Unlinked tags survive.
  for name in ["rust", "systems"] {
    let found = s.search_tags(Some(name.into()), 10).await.unwrap();
    assert_eq!(found.len(), 1, "tag {name} should persist");
  }
}

#[tokio::test]
async fn update_renumbers_blocks_from_input_order() {
  let s = store().await;
  let author = user(&s, "author").await;
  let created = s
    .create_article(NewArticle {
      blocks: (0..5).map(|i| NewBlock::text(format!("block {i}"))).collect(),
      ..NewArticle::new(author, "Many blocks")
    })
    .await
    .unwrap();
  assert_eq!(positions(&created), vec![0, 1, 2, 3, 4]);

  let id = created.article.article_id;
  let mut edit = ArticleEdit::from(created);
  edit.blocks.reverse();
  edit.blocks.truncate(2);
  s.update_article(id, author, edit).await.unwrap();

  let stored = s.get_article(id).await.unwrap().unwrap();
  assert_eq!(positions(&stored), vec![0, 1]);
  assert_eq!(stored.blocks[0].content, "block 4");
  assert_eq!(stored.blocks[1].content, "block 3");
}

#[tokio::test]
async fn update_with_empty_tags_clears_associations() {
  let s = store().await;
  let author = user(&s, "author").await;
  let created = s
    .create_article(NewArticle { tags: vec!["rust".into()], ..draft(author, "T") })
    .await
    .unwrap();
  let id = created.article.article_id;

  let mut edit = ArticleEdit::from(created);
  edit.tags.clear();
  let updated = s.update_article(id, author, edit).await.unwrap();
  assert!(updated.tags.is_empty());
  assert_eq!(s.count_rows("article_tags", "article_id", id).await.unwrap(), 0);
}

#[tokio::test]
async fn create_requires_existing_author() {
  let s = store().await;
  let err = s.create_article(draft(Uuid::new_v4(), "Orphan")).await;
  assert_eq!(kind_of(err), ErrorKind::NotFound);
}

#[tokio::test]
async fn create_validates_fields() {
  let s = store().await;
  let author = user(&s, "author").await;

  assert_eq!(kind_of(s.create_article(draft(author, "   ")).await), ErrorKind::Validation);
  assert_eq!(
    kind_of(s.create_article(draft(author, &"x".repeat(71))).await),
    ErrorKind::Validation
  );
  let long_desc = NewArticle { short_description: "d".repeat(101), ..draft(author, "ok") };
  assert_eq!(kind_of(s.create_article(long_desc).await), ErrorKind::Validation);
}

#[tokio::test]
async fn failed_create_leaves_nothing_behind() {
  let s = store().await;
  let author = user(&s, "author").await;

  // The bad tag is only seen after the article row and blocks were written.
  let input = NewArticle { tags: vec!["fine".into(), "   ".into()], ..draft(author, "T") };
  assert_eq!(kind_of(s.create_article(input).await), ErrorKind::Validation);

  assert!(s.search_articles(&drafts_by(author)).await.unwrap().is_empty());
  assert!(s.search_tags(Some("fine".into()), 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_update_leaves_article_unchanged() {
  let s = store().await;
  let author = user(&s, "author").await;
  let created = s
    .create_article(NewArticle { tags: vec!["rust".into()], ..draft(author, "Before") })
    .await
    .unwrap();
  let id = created.article.article_id;

  let mut edit = ArticleEdit::from(created.clone());
  edit.title = "After".into();
  edit.blocks = vec![NewBlock::text("new")];
  edit.tags = vec!["x".repeat(51)];
  assert_eq!(kind_of(s.update_article(id, author, edit).await), ErrorKind::Validation);

  let stored = s.get_article(id).await.unwrap().unwrap();
  assert_eq!(stored.article.title, "Before");
  assert_eq!(stored.blocks[0].block_id, created.blocks[0].block_id);
  assert_eq!(stored.tag_names(), vec!["rust"]);
}

// ─── Publish / views ─────────────────────────────────────────────────────────

#[tokio::test]
async fn publish_and_unpublish_are_idempotent() {
  let s = store().await;
  let author = user(&s, "author").await;
  let id = s.create_article(draft(author, "T")).await.unwrap().article.article_id;

  let first = s.publish_article(id, author).await.unwrap();
  assert!(first.published);
  let second = s.publish_article(id, author).await.unwrap();
  assert!(second.published);
  assert!(second.updated_at >= first.updated_at);

  let off = s.unpublish_article(id, author).await.unwrap();
  assert!(!off.published);
  assert!(!s.get_article(id).await.unwrap().unwrap().article.published);
}

#[tokio::test]
async fn view_article_counts_views() {
  let s = store().await;
  let author = user(&s, "author").await;
  let id = s.create_article(published(author, "T")).await.unwrap().article.article_id;

  assert_eq!(s.increment_view_count(id).await.unwrap(), 1);
  let viewed = s.view_article(id).await.unwrap().unwrap();
  assert_eq!(viewed.article.view_count, 2);

  // Reading without viewing leaves the counter alone.
  assert_eq!(s.get_article(id).await.unwrap().unwrap().article.view_count, 2);

  assert!(s.view_article(Uuid::new_v4()).await.unwrap().is_none());
  assert_eq!(kind_of(s.increment_view_count(Uuid::new_v4()).await), ErrorKind::NotFound);
}

#[tokio::test]
async fn concurrent_view_increments_are_not_lost() {
  const N: u64 = 32;

  let s = Arc::new(store().await);
  let author = user(&s, "author").await;
  let id = s.create_article(published(author, "Hot")).await.unwrap().article.article_id;

  let handles: Vec<_> = (0..N)
    .map(|_| {
      let s = Arc::clone(&s);
      tokio::spawn(async move {
        s.increment_view_count(id).await.unwrap();
        s.get_article(id).await.unwrap().unwrap().article.view_count
      })
    })
    .collect();

  let mut seen = Vec::new();
  for h in handles {
    seen.push(h.await.unwrap());
  }
  assert!(seen.iter().all(|&n| (1..=N).contains(&n)));
  assert_eq!(s.get_article(id).await.unwrap().unwrap().article.view_count, N);
}

// ─── Authorization ───────────────────────────────────────────────────────────

#[tokio::test]
async fn non_author_mutations_are_forbidden() {
  let s = store().await;
  let author = user(&s, "author").await;
  let intruder = user(&s, "intruder").await;
  let created = s
    .create_article(NewArticle { tags: vec!["rust".into()], ..draft(author, "Mine") })
    .await
    .unwrap();
  let id = created.article.article_id;

  let mut edit = ArticleEdit::from(created.clone());
  edit.title = "Stolen".into();
  assert_eq!(kind_of(s.update_article(id, intruder, edit).await), ErrorKind::Forbidden);
  assert_eq!(kind_of(s.delete_article(id, intruder).await), ErrorKind::Forbidden);
  assert_eq!(kind_of(s.publish_article(id, intruder).await), ErrorKind::Forbidden);
  assert_eq!(kind_of(s.unpublish_article(id, intruder).await), ErrorKind::Forbidden);

  let stored = s.get_article(id).await.unwrap().unwrap();
  assert_eq!(stored.article.title, "Mine");
  assert!(!stored.article.published);
  assert_eq!(stored.article.updated_at, created.article.updated_at);
  assert_eq!(stored.blocks.len(), created.blocks.len());
  assert_eq!(stored.tag_names(), vec!["rust"]);
}

#[tokio::test]
async fn mutations_on_missing_article_are_not_found() {
  let s = store().await;
  let author = user(&s, "author").await;
  let missing = Uuid::new_v4();

  assert_eq!(kind_of(s.delete_article(missing, author).await), ErrorKind::NotFound);
  assert_eq!(kind_of(s.publish_article(missing, author).await), ErrorKind::NotFound);
  let edit = ArticleEdit::from(s.create_article(draft(author, "T")).await.unwrap());
  assert_eq!(kind_of(s.update_article(missing, author, edit).await), ErrorKind::NotFound);
}

// ─── Reviews ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_review_conflicts_and_target_delete_removes_review() {
  let s = store().await;
  let owner = user(&s, "owner").await;
  let critic = user(&s, "critic").await;
  let target = s.create_article(published(owner, "X")).await.unwrap().article.article_id;

  let r = s.create_article(review(critic, target, "R")).await.unwrap();
  assert!(r.is_review);
  assert_eq!(r.article.review_of, Some(target));
  assert!(s.has_user_reviewed(critic, target).await.unwrap());
  assert!(!s.has_user_reviewed(owner, target).await.unwrap());

  let again = s.create_article(review(critic, target, "R again")).await;
  assert_eq!(kind_of(again), ErrorKind::Conflict);

  s.delete_article(target, owner).await.unwrap();
  assert!(s.get_article(r.article.article_id).await.unwrap().is_none());
  assert!(!s.has_user_reviewed(critic, target).await.unwrap());
}

#[tokio::test]
async fn review_flag_tracks_target() {
  let s = store().await;
  let owner = user(&s, "owner").await;
  let critic = user(&s, "critic").await;
  let target = s.create_article(published(owner, "X")).await.unwrap();
  let r = s
    .create_article(review(critic, target.article.article_id, "R"))
    .await
    .unwrap();

  for view in [
    s.get_article(target.article.article_id).await.unwrap().unwrap(),
    s.get_article(r.article.article_id).await.unwrap().unwrap(),
  ] {
    assert_eq!(view.is_review, view.article.review_of.is_some());
  }
}

#[tokio::test]
async fn review_targets_must_exist_and_be_originals() {
  let s = store().await;
  let owner = user(&s, "owner").await;
  let critic = user(&s, "critic").await;

  let missing = s.create_article(review(critic, Uuid::new_v4(), "R")).await;
  assert_eq!(kind_of(missing), ErrorKind::NotFound);

  let target = s.create_article(published(owner, "X")).await.unwrap().article.article_id;
  let r = s.create_article(review(critic, target, "R")).await.unwrap().article.article_id;
  let chained = s.create_article(review(owner, r, "R of R")).await;
  assert_eq!(kind_of(chained), ErrorKind::Validation);
}

#[tokio::test]
async fn reviews_of_lists_published_reviews_newest_first() {
  let s = store().await;
  let owner = user(&s, "owner").await;
  let a = user(&s, "a").await;
  let b = user(&s, "b").await;
  let c = user(&s, "c").await;
  let target = s.create_article(published(owner, "X")).await.unwrap().article.article_id;

  let ra = s.create_article(review(a, target, "A")).await.unwrap().article.article_id;
  let rb = s.create_article(review(b, target, "B")).await.unwrap().article.article_id;
  let hidden = NewArticle { published: false, ..review(c, target, "C") };
  s.create_article(hidden).await.unwrap();

  let reviews: Vec<Uuid> = s
    .reviews_of(target)
    .await
    .unwrap()
    .into_iter()
    .map(|r| r.article_id)
    .collect();
  assert_eq!(reviews, vec![rb, ra]);
  assert_eq!(s.get_article(target).await.unwrap().unwrap().review_count, 2);

  assert_eq!(kind_of(s.reviews_of(Uuid::new_v4()).await), ErrorKind::NotFound);
}

// ─── Cascading delete ────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_removes_every_dependent_row() {
  let s = store().await;
  let owner = user(&s, "owner").await;
  let reader = user(&s, "reader").await;
  let critic = user(&s, "critic").await;

  let article = s
    .create_article(NewArticle {
      tags: vec!["rust".into(), "db".into()],
      blocks: vec![NewBlock::text("a"), NewBlock::text("b")],
      ..published(owner, "Doomed")
    })
    .await
    .unwrap();
  let id = article.article.article_id;

  s.set_reaction(reader, id, ReactionKind::Fire).await.unwrap();
  s.toggle_bookmark(reader, id).await.unwrap();
  let top = s.create_comment(NewComment::new(id, reader, "first")).await.unwrap();
  s.create_comment(NewComment::new(id, owner, "reply").reply_to(top.comment_id))
    .await
    .unwrap();

  let rev = s.create_article(review(critic, id, "Meh")).await.unwrap().article.article_id;
  s.set_reaction(reader, rev, ReactionKind::Clap).await.unwrap();
  s.toggle_bookmark(owner, rev).await.unwrap();
  s.create_comment(NewComment::new(rev, owner, "disagree")).await.unwrap();

  s.delete_article(id, owner).await.unwrap();

  for gone in [id, rev] {
    assert!(s.get_article(gone).await.unwrap().is_none());
    for table in ["comments", "reactions", "bookmarks", "blocks", "article_tags"] {
      assert_eq!(
        s.count_rows(table, "article_id", gone).await.unwrap(),
        0,
        "{table} rows left for {gone}"
      );
    }
  }
  assert_eq!(s.count_rows("articles", "review_of", id).await.unwrap(), 0);

  // Shared tags survive their articles.
  assert_eq!(s.search_tags(Some("rust".into()), 10).await.unwrap().len(), 1);
  assert_eq!(s.bookmark_count(reader).await.unwrap(), 0);
}

// ─── Tags ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn find_or_create_tag_is_idempotent() {
  let s = store().await;
  let a = s.find_or_create_tag("Rust".into()).await.unwrap();
  let b = s.find_or_create_tag("  rust ".into()).await.unwrap();
  assert_eq!(a.tag_id, b.tag_id);
  assert_eq!(a.name, "rust");
  assert_eq!(a.slug, "rust");

  let batch = s
    .find_or_create_tags(vec!["RUST".into(), "Web Dev".into(), "web dev".into()])
    .await
    .unwrap();
  assert_eq!(batch.len(), 2);
  assert_eq!(batch[0].tag_id, a.tag_id);
  assert_eq!(batch[1].slug, "web-dev");

  assert_eq!(kind_of(s.find_or_create_tag(" ".into()).await), ErrorKind::Validation);
}

#[tokio::test]
async fn concurrent_tag_creation_yields_one_row() {
  let s = Arc::new(store().await);

  let handles: Vec<_> = ["Rust", "rust", " RUST", "rUsT", "rust "]
    .into_iter()
    .cycle()
    .take(20)
    .map(|name| {
      let s = Arc::clone(&s);
      tokio::spawn(async move { s.find_or_create_tag(name.to_owned()).await.unwrap() })
    })
    .collect();

  let mut ids = Vec::new();
  for h in handles {
    ids.push(h.await.unwrap().tag_id);
  }
  ids.dedup();
  assert_eq!(ids.len(), 1);
  assert_eq!(s.search_tags(Some("rust".into()), 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn colliding_slugs_get_numbered() {
  let s = store().await;
  let c = s.find_or_create_tag("c".into()).await.unwrap();
  let cpp = s.find_or_create_tag("c++".into()).await.unwrap();
  let c_sharp = s.find_or_create_tag("c#".into()).await.unwrap();

  assert_eq!(c.slug, "c");
  assert_eq!(cpp.slug, "c-2");
  assert_eq!(c_sharp.slug, "c-3");
  assert_ne!(cpp.tag_id, c.tag_id);
}

#[tokio::test]
async fn search_and_popular_tags() {
  let s = store().await;
  let author = user(&s, "author").await;
  for (title, tags) in [
    ("one", vec!["rust", "async"]),
    ("two", vec!["rust"]),
    ("three", vec!["rust", "web"]),
    ("four", vec!["web"]),
  ] {
    let input = NewArticle {
      tags: tags.into_iter().map(str::to_owned).collect(),
      ..published(author, title)
    };
    s.create_article(input).await.unwrap();
  }
  s.find_or_create_tag("unused".into()).await.unwrap();

  let names: Vec<String> = s
    .search_tags(Some("US".into()), 10)
    .await
    .unwrap()
    .into_iter()
    .map(|t| t.name)
    .collect();
  assert_eq!(names, vec!["rust", "unused"]);
  assert_eq!(s.search_tags(None, 2).await.unwrap().len(), 2);
  assert_eq!(s.search_tags(None, usize::MAX).await.unwrap().len(), 4);
  assert_eq!(s.popular_tags(usize::MAX).await.unwrap().len(), 4);

  let popular = s.popular_tags(10).await.unwrap();
  let ranked: Vec<(&str, u64)> = popular
    .iter()
    .map(|t| (t.tag.name.as_str(), t.article_count))
    .collect();
  assert_eq!(ranked, vec![("rust", 3), ("web", 2), ("async", 1), ("unused", 0)]);
}

// ─── Search ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn search_filters_combine() {
  let s = store().await;
  let ada = user(&s, "Ada Lovelace").await;
  let bob = user(&s, "Bob").await;

  let make = |author, title: &str, tags: &[&str], published: bool| NewArticle {
    tags: tags.iter().map(|t| t.to_string()).collect(),
    published,
    ..draft(author, title)
  };
  let rust_intro = s
    .create_article(make(ada, "Intro to Rust", &["rust"], true))
    .await
    .unwrap()
    .article
    .article_id;
  let go_tour = s
    .create_article(make(bob, "A tour of Go", &["go"], true))
    .await
    .unwrap()
    .article
    .article_id;
  let rust_draft = s
    .create_article(make(ada, "Rust draft", &["rust"], false))
    .await
    .unwrap()
    .article
    .article_id;
  let critique = s
    .create_article(review(bob, rust_intro, "Rusty review"))
    .await
    .unwrap()
    .article
    .article_id;

  let ids = |articles: Vec<quire_core::article::Article>| -> Vec<Uuid> {
    articles.into_iter().map(|a| a.article_id).collect()
  };

  // No filters: every published article, newest first.
  let all = s.search_articles(&ArticleQuery::default()).await.unwrap();
  assert_eq!(ids(all), vec![critique, go_tour, rust_intro]);

  let by_title = ArticleQuery { title: Some("RUST".into()), ..Default::default() };
  assert_eq!(ids(s.search_articles(&by_title).await.unwrap()), vec![critique, rust_intro]);

  let by_tags = ArticleQuery { tags: vec!["Go".into(), "rust".into()], ..Default::default() };
  assert_eq!(ids(s.search_articles(&by_tags).await.unwrap()), vec![go_tour, rust_intro]);

  // Names that cannot be tags are skipped rather than failing the search.
  let mixed = ArticleQuery { tags: vec!["!!!".into(), "RUST".into()], ..Default::default() };
  assert_eq!(ids(s.search_articles(&mixed).await.unwrap()), vec![rust_intro]);
  let junk = ArticleQuery { tags: vec!["!!!".into(), " ".into()], ..Default::default() };
  assert!(s.search_articles(&junk).await.unwrap().is_empty());

  let by_author = ArticleQuery { author_name: Some("lovelace".into()), ..Default::default() };
  assert_eq!(ids(s.search_articles(&by_author).await.unwrap()), vec![rust_intro]);

  let originals = ArticleQuery {
    title: Some("rust".into()),
    exclude_reviews: true,
    ..Default::default()
  };
  assert_eq!(ids(s.search_articles(&originals).await.unwrap()), vec![rust_intro]);

  assert_eq!(ids(s.search_articles(&drafts_by(ada)).await.unwrap()), vec![rust_draft]);
  assert!(s.search_articles(&drafts_by(bob)).await.unwrap().is_empty());
}

#[tokio::test]
async fn search_pages_and_escapes_wildcards() {
  let s = store().await;
  let author = user(&s, "author").await;
  let mut created = Vec::new();
  for title in ["100% done", "100 percent", "under_score", "underscore"] {
    created.push(s.create_article(published(author, title)).await.unwrap().article.article_id);
  }

  let percent = ArticleQuery { title: Some("100%".into()), ..Default::default() };
  let found = s.search_articles(&percent).await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].title, "100% done");

  let underscore = ArticleQuery { title: Some("r_s".into()), ..Default::default() };
  let found = s.search_articles(&underscore).await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].title, "under_score");

  let page = ArticleQuery { limit: Some(2), offset: Some(1), ..Default::default() };
  let found: Vec<Uuid> = s
    .search_articles(&page)
    .await
    .unwrap()
    .into_iter()
    .map(|a| a.article_id)
    .collect();
  assert_eq!(found, vec![created[2], created[1]]);
}

// ─── Reactions ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn reactions_upsert_and_count() {
  let s = store().await;
  let author = user(&s, "author").await;
  let u1 = user(&s, "u1").await;
  let u2 = user(&s, "u2").await;
  let id = s.create_article(published(author, "T")).await.unwrap().article.article_id;

  s.set_reaction(u1, id, ReactionKind::Like).await.unwrap();
  s.set_reaction(u1, id, ReactionKind::Love).await.unwrap();
  s.set_reaction(u2, id, ReactionKind::Love).await.unwrap();

  let mine = s.get_reaction(u1, id).await.unwrap().unwrap();
  assert_eq!(mine.kind, ReactionKind::Love);

  let stats = s.reaction_stats(id).await.unwrap();
  assert_eq!(stats.total, 2);
  assert_eq!(stats.counts.len(), 12);
  assert_eq!(stats.counts[&ReactionKind::Love], 2);
  assert_eq!(stats.counts[&ReactionKind::Like], 0);

  assert!(s.remove_reaction(u1, id).await.unwrap());
  assert!(!s.remove_reaction(u1, id).await.unwrap());
  assert!(s.get_reaction(u1, id).await.unwrap().is_none());
  assert_eq!(s.reaction_stats(id).await.unwrap().total, 1);
}

#[tokio::test]
async fn reactions_require_article_and_user() {
  let s = store().await;
  let author = user(&s, "author").await;
  let id = s.create_article(published(author, "T")).await.unwrap().article.article_id;

  let no_article = s.set_reaction(author, Uuid::new_v4(), ReactionKind::Like).await;
  assert_eq!(kind_of(no_article), ErrorKind::NotFound);
  let no_user = s.set_reaction(Uuid::new_v4(), id, ReactionKind::Like).await;
  assert_eq!(kind_of(no_user), ErrorKind::NotFound);
  assert_eq!(kind_of(s.reaction_stats(Uuid::new_v4()).await), ErrorKind::NotFound);
}

// ─── Bookmarks ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn toggle_bookmark_flips_state() {
  let s = store().await;
  let author = user(&s, "author").await;
  let reader = user(&s, "reader").await;
  let id = s.create_article(published(author, "T")).await.unwrap().article.article_id;

  assert!(s.toggle_bookmark(reader, id).await.unwrap());
  assert!(s.is_bookmarked(reader, id).await.unwrap());
  assert!(!s.toggle_bookmark(reader, id).await.unwrap());
  assert!(!s.is_bookmarked(reader, id).await.unwrap());

  assert_eq!(kind_of(s.toggle_bookmark(reader, Uuid::new_v4()).await), ErrorKind::NotFound);
}

#[tokio::test]
async fn list_bookmarks_newest_first() {
  let s = store().await;
  let author = user(&s, "author").await;
  let reader = user(&s, "reader").await;
  let first = s.create_article(published(author, "first")).await.unwrap().article.article_id;
  let second = s.create_article(published(author, "second")).await.unwrap().article.article_id;

  s.toggle_bookmark(reader, first).await.unwrap();
  s.toggle_bookmark(reader, second).await.unwrap();

  let listed: Vec<Uuid> = s
    .list_bookmarks(reader)
    .await
    .unwrap()
    .into_iter()
    .map(|b| b.article.article_id)
    .collect();
  assert_eq!(listed, vec![second, first]);
  assert_eq!(s.bookmark_count(reader).await.unwrap(), 2);
  assert_eq!(kind_of(s.list_bookmarks(Uuid::new_v4()).await), ErrorKind::NotFound);
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn comments_thread_within_one_article() {
  let s = store().await;
  let author = user(&s, "author").await;
  let reader = user(&s, "reader").await;
  let a = s.create_article(published(author, "A")).await.unwrap().article.article_id;
  let b = s.create_article(published(author, "B")).await.unwrap().article.article_id;

  let top = s.create_comment(NewComment::new(a, reader, "  nice  ")).await.unwrap();
  assert_eq!(top.content, "nice");
  let reply = s
    .create_comment(NewComment::new(a, author, "thanks").reply_to(top.comment_id))
    .await
    .unwrap();
  assert_eq!(reply.parent_id, Some(top.comment_id));

  let listed: Vec<Uuid> = s
    .list_comments(a)
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.comment_id)
    .collect();
  assert_eq!(listed, vec![reply.comment_id, top.comment_id]);
  assert_eq!(s.comment_count(a).await.unwrap(), 2);

  let cross = NewComment::new(b, reader, "wrong thread").reply_to(top.comment_id);
  assert_eq!(kind_of(s.create_comment(cross).await), ErrorKind::Validation);
  let orphan = NewComment::new(a, reader, "?").reply_to(Uuid::new_v4());
  assert_eq!(kind_of(s.create_comment(orphan).await), ErrorKind::NotFound);
  let empty = NewComment::new(a, reader, "  ");
  assert_eq!(kind_of(s.create_comment(empty).await), ErrorKind::Validation);
  let nowhere = NewComment::new(Uuid::new_v4(), reader, "hello");
  assert_eq!(kind_of(s.create_comment(nowhere).await), ErrorKind::NotFound);
}

#[tokio::test]
async fn delete_comment_is_author_only_and_takes_replies() {
  let s = store().await;
  let author = user(&s, "author").await;
  let reader = user(&s, "reader").await;
  let id = s.create_article(published(author, "A")).await.unwrap().article.article_id;

  let top = s.create_comment(NewComment::new(id, reader, "top")).await.unwrap();
  let reply = s
    .create_comment(NewComment::new(id, author, "reply").reply_to(top.comment_id))
    .await
    .unwrap();
  s.create_comment(NewComment::new(id, reader, "deep").reply_to(reply.comment_id))
    .await
    .unwrap();
  let other = s.create_comment(NewComment::new(id, author, "other")).await.unwrap();

  assert_eq!(
    kind_of(s.delete_comment(top.comment_id, author).await),
    ErrorKind::Forbidden
  );
  assert_eq!(s.comment_count(id).await.unwrap(), 4);

  s.delete_comment(top.comment_id, reader).await.unwrap();
  let left: Vec<Uuid> = s
    .list_comments(id)
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.comment_id)
    .collect();
  assert_eq!(left, vec![other.comment_id]);

  assert_eq!(
    kind_of(s.delete_comment(top.comment_id, reader).await),
    ErrorKind::NotFound
  );
}
