//! Handlers for `/clinical-records` endpoints.
//!
//! | Method | Path | Access |
//! |--------|------|--------|
//! | `GET`  | `/clinical-records/patient/{id}` | staff + clinicians (scoped) |
//! | `POST` | `/clinical-records` | staff + owning clinician |
//! | `PUT`  | `/clinical-records/{id}` | staff + owning/authoring clinician |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use praxis_core::{
  Patch,
  record::{ClinicalRecord, ClinicalRecordUpdate, NewClinicalRecord},
  store::ClinicStore,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  identity::{Auth, require_clinical},
};

/// `GET /clinical-records/patient/{id}`
pub async fn list_for_patient<S>(
  State(state): State<AppState<S>>,
  Auth(identity): Auth,
  Path(patient_id): Path<Uuid>,
) -> Result<Json<Vec<ClinicalRecord>>, ApiError>
where
  S: ClinicStore,
{
  require_clinical(&identity)?;
  Ok(Json(
    state
      .store
      .list_patient_records(patient_id, identity.scope())
      .await?,
  ))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub patient_id:     Uuid,
  pub clinician_id:   Uuid,
  pub appointment_id: Option<Uuid>,
  pub session_date:   NaiveDate,
  pub kind:           Option<String>,
  pub notes:          Option<String>,
  pub progress:       Option<String>,
  pub plan:           Option<String>,
  pub next_session:   Option<String>,
}

/// `POST /clinical-records`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Auth(identity): Auth,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ClinicStore,
{
  require_clinical(&identity)?;

  let record_id = state
    .store
    .create_record(
      NewClinicalRecord {
        patient_id:     body.patient_id,
        clinician_id:   body.clinician_id,
        appointment_id: body.appointment_id,
        session_date:   body.session_date,
        kind:           body.kind,
        notes:          body.notes,
        progress:       body.progress,
        plan:           body.plan,
        next_session:   body.next_session,
      },
      &identity,
    )
    .await?;

  Ok((StatusCode::CREATED, Json(json!({ "record_id": record_id }))))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBody {
  #[serde(default)]
  pub notes: Patch<String>,
  #[serde(default)]
  pub progress: Patch<String>,
  #[serde(default)]
  pub plan: Patch<String>,
  #[serde(default)]
  pub next_session: Patch<String>,
}

/// `PUT /clinical-records/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Auth(identity): Auth,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<StatusCode, ApiError>
where
  S: ClinicStore,
{
  require_clinical(&identity)?;
  state
    .store
    .update_record(
      id,
      ClinicalRecordUpdate {
        notes:        body.notes,
        progress:     body.progress,
        plan:         body.plan,
        next_session: body.next_session,
      },
      &identity,
    )
    .await?;
  Ok(StatusCode::NO_CONTENT)
}
