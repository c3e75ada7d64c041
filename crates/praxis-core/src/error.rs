//! Error taxonomy shared by every layer.
//!
//! The store trait returns these directly so the HTTP layer can map them to
//! status codes without inspecting backend-specific error types:
//! [`Error::Unauthenticated`]/[`Error::SessionExpired`] → 401,
//! [`Error::Forbidden`] → 403, [`Error::Validation`] → 400,
//! [`Error::NotFound`] → 404, [`Error::Backend`] → 500.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// No token was presented, or the token is unknown.
  #[error("not authenticated")]
  Unauthenticated,

  /// The token exists but its expiry has passed (lazy expiry).
  #[error("session expired")]
  SessionExpired,

  /// The caller's role does not permit the operation.
  #[error("{0}")]
  Forbidden(String),

  /// A missing/invalid reference or malformed field.
  #[error("{0}")]
  Validation(String),

  /// A referenced entity does not exist.
  #[error("{0} not found")]
  NotFound(String),

  /// A storage-layer failure. Logged server-side; clients see a generic
  /// message.
  #[error("store error: {0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap any backend error without the caller naming the boxed type.
  pub fn backend(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Backend(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
