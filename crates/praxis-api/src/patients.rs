//! Handlers for `/patients` endpoints.
//!
//! | Method   | Path | Access |
//! |----------|------|--------|
//! | `GET`    | `/patients` | staff + clinicians (scoped) |
//! | `POST`   | `/patients` | staff |
//! | `PUT`    | `/patients/{id}` | admin |
//! | `DELETE` | `/patients/{id}` | admin |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use praxis_core::{
  Patch,
  patient::{NewPatient, Patient, PatientUpdate},
  store::ClinicStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  auth::hash_password,
  error::ApiError,
  identity::{Auth, require_admin, require_clinical, require_staff},
};

/// `GET /patients` — clinicians see only their own patients.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Auth(identity): Auth,
) -> Result<Json<Vec<Patient>>, ApiError>
where
  S: ClinicStore,
{
  require_clinical(&identity)?;
  Ok(Json(state.store.list_patients(identity.scope()).await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub full_name:         String,
  pub email:             String,
  /// Omitted for front-desk-created patients; a random credential is
  /// minted and the patient resets it out of band.
  pub password:          Option<String>,
  pub tax_id:            Option<String>,
  pub phone:             Option<String>,
  pub birth_date:        Option<NaiveDate>,
  pub address:           Option<String>,
  pub insurance:         Option<String>,
  pub emergency_contact: Option<String>,
  pub notes:             Option<String>,
  pub medication:        Option<String>,
  pub clinician_id:      Option<Uuid>,
}

/// `POST /patients`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Auth(identity): Auth,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ClinicStore,
{
  require_staff(&identity)?;
  if body.full_name.trim().is_empty() || body.email.trim().is_empty() {
    return Err(ApiError::BadRequest("full_name and email are required".into()));
  }

  let password = body
    .password
    .unwrap_or_else(|| Uuid::new_v4().hyphenated().to_string());

  let created = state
    .store
    .create_patient(NewPatient {
      full_name:         body.full_name,
      email:             body.email,
      password_hash:     hash_password(&password)?,
      tax_id:            body.tax_id,
      phone:             body.phone,
      birth_date:        body.birth_date,
      address:           body.address,
      insurance:         body.insurance,
      emergency_contact: body.emergency_contact,
      notes:             body.notes,
      medication:        body.medication,
      clinician_id:      body.clinician_id,
    })
    .await?;

  Ok((StatusCode::CREATED, Json(created)))
}

/// Partial-update payload. Absent keys keep the stored value; explicit
/// `null` clears nullable fields.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBody {
  pub full_name: Option<String>,
  pub email:     Option<String>,
  #[serde(default)]
  pub tax_id: Patch<String>,
  #[serde(default)]
  pub phone: Patch<String>,
  #[serde(default)]
  pub birth_date: Patch<NaiveDate>,
  #[serde(default)]
  pub address: Patch<String>,
  #[serde(default)]
  pub insurance: Patch<String>,
  #[serde(default)]
  pub emergency_contact: Patch<String>,
  #[serde(default)]
  pub notes: Patch<String>,
  #[serde(default)]
  pub medication: Patch<String>,
  #[serde(default)]
  pub clinician_id: Patch<Uuid>,
}

/// `PUT /patients/{id}`
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
  state
    .store
    .update_patient(id, PatientUpdate {
      full_name:         body.full_name,
      email:             body.email,
      tax_id:            body.tax_id,
      phone:             body.phone,
      birth_date:        body.birth_date,
      address:           body.address,
      insurance:         body.insurance,
      emergency_contact: body.emergency_contact,
      notes:             body.notes,
      medication:        body.medication,
      clinician_id:      body.clinician_id,
    })
    .await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /patients/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Auth(identity): Auth,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ClinicStore,
{
  require_admin(&identity)?;
  state.store.delete_patient(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
