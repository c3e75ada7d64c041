//! Bearer-token extractors.
//!
//! [`Auth`] resolves the token to a full [`Identity`] through the store, once
//! per request. [`Bearer`] only pulls the raw token out of the header, for
//! the session endpoints that pass it straight back to the store.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use praxis_core::{auth::Identity, store::ClinicStore};

use crate::{AppState, error::ApiError};

/// The authenticated caller. Handler parameters of this type reject the
/// request with 401 before the handler body runs.
pub struct Auth(pub Identity);

/// The raw bearer token.
pub struct Bearer(pub String);

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Bearer ")
}

impl<S> FromRequestParts<AppState<S>> for Bearer
where
  S: ClinicStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    bearer_token(&parts.headers)
      .map(|t| Bearer(t.to_string()))
      .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))
  }
}

impl<S> FromRequestParts<AppState<S>> for Auth
where
  S: ClinicStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers)
      .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))?;
    let identity = state.store.resolve_session(token).await?;
    Ok(Auth(identity))
  }
}

/// 403 unless the caller is staff (admin or attendant).
pub fn require_staff(identity: &Identity) -> Result<(), ApiError> {
  if identity.is_staff() {
    Ok(())
  } else {
    Err(ApiError::Forbidden("staff role required".into()))
  }
}

/// 403 unless the caller is an administrator.
pub fn require_admin(identity: &Identity) -> Result<(), ApiError> {
  if identity.role == praxis_core::account::Role::Admin {
    Ok(())
  } else {
    Err(ApiError::Forbidden("admin role required".into()))
  }
}

/// 403 for patient-role callers; everything clinical is off limits to them.
pub fn require_clinical(identity: &Identity) -> Result<(), ApiError> {
  if identity.role == praxis_core::account::Role::Patient {
    Err(ApiError::Forbidden("insufficient role".into()))
  } else {
    Ok(())
  }
}
