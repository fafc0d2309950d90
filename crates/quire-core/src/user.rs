//! Users: the minimal identity record that authors articles and comments.
//!
//! Credentials live with the external identity provider; the core only needs
//! a stable id and a display name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

/// Trim and check a display name.
pub fn validate_name(name: &str) -> Result<String> {
  let trimmed = name.trim();
  if trimmed.is_empty() {
    return Err(Error::validation("user name must not be empty"));
  }
  Ok(trimmed.to_owned())
}
