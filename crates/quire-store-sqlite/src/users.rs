//! Users table access.

use quire_core::{
  error::Entity,
  user::{User, validate_name},
};
use rusqlite::{Connection, OptionalExtension as _, params};
use uuid::Uuid;

use crate::{
  Result,
  encode::{RawUser, encode_dt, encode_uuid, fold, now},
};

pub fn insert(conn: &Connection, name: &str) -> Result<User> {
  let user = User {
    user_id:    Uuid::new_v4(),
    name:       validate_name(name)?,
    created_at: now(),
  };

  conn.execute(
    "INSERT INTO users (user_id, name, name_folded, created_at) VALUES (?1, ?2, ?3, ?4)",
    params![
      encode_uuid(user.user_id),
      user.name,
      fold(&user.name),
      encode_dt(user.created_at),
    ],
  )?;

  Ok(user)
}

pub fn get(conn: &Connection, id: Uuid) -> Result<Option<User>> {
  let raw = conn
    .query_row(
      "SELECT user_id, name, created_at FROM users WHERE user_id = ?1",
      params![encode_uuid(id)],
      RawUser::from_row,
    )
    .optional()?;

  raw.map(RawUser::into_user).transpose()
}

/// Fail with `NotFound` unless the user exists.
pub fn require(conn: &Connection, id: Uuid) -> Result<()> {
  let exists = conn
    .query_row(
      "SELECT 1 FROM users WHERE user_id = ?1",
      params![encode_uuid(id)],
      |_| Ok(()),
    )
    .optional()?
    .is_some();

  if !exists {
    return Err(quire_core::Error::not_found(Entity::User, id).into());
  }
  Ok(())
}
