//! Handlers for `/auth` endpoints, plus the argon2 helpers used everywhere
//! a credential is minted.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/login` | Body: `{"email","password"}` |
//! | `POST` | `/auth/register` | Self-service, always patient role |
//! | `GET`  | `/auth/session` | Account behind the bearer token |
//! | `POST` | `/auth/logout` | Invalidates the bearer token |

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use praxis_core::{
  account::{Account, NewRegistration},
  store::ClinicStore,
};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError, identity::Bearer};

const MIN_PASSWORD_LEN: usize = 6;

// ─── Password hashing ────────────────────────────────────────────────────────

/// Hash a password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2: {e}").into()))
}

/// Verify a password against a stored PHC string. Any parse or verification
/// failure counts as a mismatch.
pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .map(|parsed| {
      Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
    })
    .unwrap_or(false)
}

fn check_password_strength(password: &str) -> Result<(), ApiError> {
  if password.len() < MIN_PASSWORD_LEN {
    return Err(ApiError::BadRequest(format!(
      "password must be at least {MIN_PASSWORD_LEN} characters"
    )));
  }
  Ok(())
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
  pub token:      String,
  pub expires_at: chrono::DateTime<chrono::Utc>,
  pub user:       Account,
}

#[derive(Debug, Serialize)]
pub struct SessionInfo {
  pub user:  Account,
  pub token: String,
}

/// `POST /auth/login`
///
/// Unknown email and wrong password produce the same 401 body, so the
/// endpoint does not leak which addresses are registered.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<SessionResponse>, ApiError>
where
  S: ClinicStore,
{
  let invalid = || ApiError::Unauthorized("invalid credentials".into());

  let auth = state
    .store
    .find_account_by_email(&body.email)
    .await?
    .ok_or_else(invalid)?;

  if !verify_password(&body.password, &auth.password_hash) {
    return Err(invalid());
  }

  let session = state.store.create_session(auth.account.account_id).await?;
  Ok(Json(SessionResponse {
    token:      session.token,
    expires_at: session.expires_at,
    user:       auth.account,
  }))
}

// ─── Register ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub email:     String,
  pub password:  String,
  pub full_name: String,
}

/// `POST /auth/register` — self-service signup, always a patient account.
/// Responds like a login so the client is signed in immediately.
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ClinicStore,
{
  if body.email.trim().is_empty() || body.full_name.trim().is_empty() {
    return Err(ApiError::BadRequest("email and full_name are required".into()));
  }
  check_password_strength(&body.password)?;

  let account_id = state
    .store
    .register_patient_account(NewRegistration {
      email:         body.email,
      full_name:     body.full_name,
      password_hash: hash_password(&body.password)?,
    })
    .await?;

  let session = state.store.create_session(account_id).await?;
  let account = state.store.session_account(&session.token).await?;

  Ok((
    StatusCode::CREATED,
    Json(SessionResponse {
      token:      session.token,
      expires_at: session.expires_at,
      user:       account,
    }),
  ))
}

// ─── Session introspection / logout ──────────────────────────────────────────

/// `GET /auth/session`
pub async fn session<S>(
  State(state): State<AppState<S>>,
  Bearer(token): Bearer,
) -> Result<Json<SessionInfo>, ApiError>
where
  S: ClinicStore,
{
  let user = state.store.session_account(&token).await?;
  Ok(Json(SessionInfo { user, token }))
}

/// `POST /auth/logout` — idempotent.
pub async fn logout<S>(
  State(state): State<AppState<S>>,
  Bearer(token): Bearer,
) -> Result<StatusCode, ApiError>
where
  S: ClinicStore,
{
  state.store.delete_session(&token).await?;
  Ok(StatusCode::NO_CONTENT)
}
