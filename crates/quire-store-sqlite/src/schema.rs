//! SQL schema for the Quire SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision; future migrations will be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id      TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    name_folded  TEXT NOT NULL,     -- lower-cased copy for searching
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS articles (
    article_id        TEXT PRIMARY KEY,
    author_id         TEXT NOT NULL REFERENCES users(user_id),
    title             TEXT NOT NULL,
    title_folded      TEXT NOT NULL,
    short_description TEXT NOT NULL DEFAULT '',
    published         INTEGER NOT NULL DEFAULT 0,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL,
    view_count        INTEGER NOT NULL DEFAULT 0,
    review_of         TEXT REFERENCES articles(article_id),
    -- NULL review_of values never collide, so plain articles are unaffected.
    UNIQUE (author_id, review_of),
    CHECK  (review_of IS NULL OR review_of != article_id)
);

-- Exclusively owned by an article; replaced wholesale on update.
CREATE TABLE IF NOT EXISTS blocks (
    block_id    TEXT PRIMARY KEY,
    article_id  TEXT NOT NULL REFERENCES articles(article_id),
    kind        TEXT NOT NULL CHECK (kind IN ('text', 'media', 'code')),
    content     TEXT NOT NULL,
    position    INTEGER NOT NULL CHECK (position >= 0),
    created_at  TEXT NOT NULL,
    UNIQUE (article_id, position)
);

-- Shared; deleting an article never deletes a tag.
CREATE TABLE IF NOT EXISTS tags (
    tag_id  TEXT PRIMARY KEY,
    name    TEXT NOT NULL UNIQUE,   -- normalised
    slug    TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS article_tags (
    article_id  TEXT NOT NULL REFERENCES articles(article_id),
    tag_id      TEXT NOT NULL REFERENCES tags(tag_id),
    PRIMARY KEY (article_id, tag_id)
);

CREATE TABLE IF NOT EXISTS reactions (
    user_id     TEXT NOT NULL REFERENCES users(user_id),
    article_id  TEXT NOT NULL REFERENCES articles(article_id),
    kind        INTEGER NOT NULL CHECK (kind BETWEEN 1 AND 12),
    reacted_at  TEXT NOT NULL,
    PRIMARY KEY (user_id, article_id)
);

CREATE TABLE IF NOT EXISTS bookmarks (
    user_id     TEXT NOT NULL REFERENCES users(user_id),
    article_id  TEXT NOT NULL REFERENCES articles(article_id),
    added_at    TEXT NOT NULL,
    PRIMARY KEY (user_id, article_id)
);

CREATE TABLE IF NOT EXISTS comments (
    comment_id  TEXT PRIMARY KEY,
    article_id  TEXT NOT NULL REFERENCES articles(article_id),
    author_id   TEXT NOT NULL REFERENCES users(user_id),
    content     TEXT NOT NULL,
    parent_id   TEXT REFERENCES comments(comment_id),
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS articles_created_idx   ON articles(created_at);
CREATE INDEX IF NOT EXISTS articles_review_idx    ON articles(review_of);
CREATE INDEX IF NOT EXISTS articles_author_idx    ON articles(author_id);
CREATE INDEX IF NOT EXISTS article_tags_tag_idx   ON article_tags(tag_id);
CREATE INDEX IF NOT EXISTS reactions_article_idx  ON reactions(article_id);
CREATE INDEX IF NOT EXISTS bookmarks_article_idx  ON bookmarks(article_id);
CREATE INDEX IF NOT EXISTS comments_article_idx   ON comments(article_id);
CREATE INDEX IF NOT EXISTS comments_parent_idx    ON comments(parent_id);

PRAGMA user_version = 1;
";
