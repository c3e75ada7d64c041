//! Handlers for `/clinicians` endpoints.
//!
//! | Method | Path | Access |
//! |--------|------|--------|
//! | `GET`  | `/clinicians` | any authenticated caller |
//! | `POST` | `/clinicians` | admin |
//! | `PUT`  | `/clinicians/{id}` | admin |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use praxis_core::{
  Patch,
  clinician::{Clinician, ClinicianUpdate, NewClinician},
  store::ClinicStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  auth::hash_password,
  error::ApiError,
  identity::{Auth, require_admin},
};

/// `GET /clinicians` — patients may browse the roster too.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Auth(_identity): Auth,
) -> Result<Json<Vec<Clinician>>, ApiError>
where
  S: ClinicStore,
{
  Ok(Json(state.store.list_clinicians().await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub full_name:   String,
  pub email:       String,
  pub password:    String,
  pub license:     String,
  pub specialty:   Option<String>,
  pub bio:         Option<String>,
  pub session_fee: Option<f64>,
  pub phone:       Option<String>,
}

/// `POST /clinicians`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Auth(identity): Auth,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ClinicStore,
{
  require_admin(&identity)?;
  if body.full_name.trim().is_empty()
    || body.email.trim().is_empty()
    || body.license.trim().is_empty()
  {
    return Err(ApiError::BadRequest(
      "full_name, email, and license are required".into(),
    ));
  }

  let created = state
    .store
    .create_clinician(NewClinician {
      full_name:     body.full_name,
      email:         body.email,
      password_hash: hash_password(&body.password)?,
      license:       body.license,
      specialty:     body.specialty,
      bio:           body.bio,
      session_fee:   body.session_fee,
      phone:         body.phone,
    })
    .await?;

  Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBody {
  pub full_name: Option<String>,
  pub email:     Option<String>,
  pub license:   Option<String>,
  /// New credential, hashed before it reaches the store.
  pub password:  Option<String>,
  #[serde(default)]
  pub specialty: Patch<String>,
  #[serde(default)]
  pub bio: Patch<String>,
  #[serde(default)]
  pub session_fee: Patch<f64>,
  #[serde(default)]
  pub phone: Patch<String>,
  pub active: Option<bool>,
}

/// `PUT /clinicians/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Auth(identity): Auth,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<StatusCode, ApiError>
where
  S: ClinicStore,
{
  require_admin(&identity)?;

  let password_hash = match &body.password {
    Some(p) => Some(hash_password(p)?),
    None => None,
  };

  state
    .store
    .update_clinician(
      id,
      ClinicianUpdate {
        full_name:   body.full_name,
        email:       body.email,
        license:     body.license,
        specialty:   body.specialty,
        bio:         body.bio,
        session_fee: body.session_fee,
        phone:       body.phone,
        active:      body.active,
      },
      password_hash,
    )
    .await?;
  Ok(StatusCode::NO_CONTENT)
}
