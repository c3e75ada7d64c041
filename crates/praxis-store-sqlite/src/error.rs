//! Error type for `praxis-store-sqlite`.
//!
//! Internal helpers use this enum; the [`crate::SqliteStore`] trait impl
//! converts it into [`praxis_core::Error::Backend`] at the seam.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown discriminant: {0}")]
  UnknownDiscriminant(String),
}

impl From<Error> for praxis_core::Error {
  fn from(e: Error) -> Self {
    praxis_core::Error::backend(e)
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
