//! Error taxonomy for `quire-core`.
//!
//! Every failure a caller can act on falls into one of four kinds. Backends
//! add their own variants for infrastructure failures and report them as
//! [`ErrorKind::Internal`] through [`Classify`].

use thiserror::Error;
use uuid::Uuid;

/// An entity type, used to name what was not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Entity {
  Article,
  User,
  Tag,
  Comment,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("{entity} not found: {id}")]
  NotFound { entity: Entity, id: Uuid },

  #[error("user {user} may not {action}")]
  Forbidden { user: Uuid, action: &'static str },

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("invalid input: {0}")]
  Validation(String),
}

impl Error {
  pub fn not_found(entity: Entity, id: Uuid) -> Self {
    Self::NotFound { entity, id }
  }

  pub fn forbidden(user: Uuid, action: &'static str) -> Self {
    Self::Forbidden { user, action }
  }

  pub fn validation(msg: impl Into<String>) -> Self {
    Self::Validation(msg.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The coarse outcome class of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  NotFound,
  Forbidden,
  Conflict,
  Validation,
  /// Storage or infrastructure failure; not the caller's fault.
  Internal,
}

/// Implemented by every error a [`BlogStore`](crate::store::BlogStore) can
/// return, so transports can branch on the kind instead of the message.
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::NotFound { .. } => ErrorKind::NotFound,
      Self::Forbidden { .. } => ErrorKind::Forbidden,
      Self::Conflict(_) => ErrorKind::Conflict,
      Self::Validation(_) => ErrorKind::Validation,
    }
  }
}
