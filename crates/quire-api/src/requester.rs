//! The acting user, as asserted by the upstream identity provider.

use axum::{
  extract::{FromRequestParts, OptionalFromRequestParts},
  http::request::Parts,
};
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Present in a handler's arguments means the request named a well-formed
/// user id. Whether that user exists is checked by the store.
#[derive(Debug, Clone, Copy)]
pub struct Requester(pub Uuid);

impl<S: Send + Sync> FromRequestParts<S> for Requester {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    let raw = parts
      .headers
      .get(USER_ID_HEADER)
      .and_then(|v| v.to_str().ok())
      .ok_or_else(|| ApiError::Unauthorized(format!("missing {USER_ID_HEADER} header")))?;

    Uuid::parse_str(raw.trim())
      .map(Requester)
      .map_err(|_| ApiError::Unauthorized(format!("malformed {USER_ID_HEADER} header")))
  }
}

/// `Option<Requester>` is `None` only when the header is absent; a malformed
/// header is still rejected.
impl<S: Send + Sync> OptionalFromRequestParts<S> for Requester {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &S,
  ) -> Result<Option<Self>, Self::Rejection> {
    if !parts.headers.contains_key(USER_ID_HEADER) {
      return Ok(None);
    }
    <Self as FromRequestParts<S>>::from_request_parts(parts, state)
      .await
      .map(Some)
  }
}
