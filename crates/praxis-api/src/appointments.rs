//! Handlers for `/appointments` endpoints.
//!
//! | Method | Path | Access |
//! |--------|------|--------|
//! | `GET`  | `/appointments` | staff + clinicians (scoped) |
//! | `POST` | `/appointments` | staff |
//! | `PUT`  | `/appointments/{id}/status` | staff + owning clinician |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use praxis_core::{
  appointment::{Appointment, AppointmentStatus, NewAppointment},
  store::ClinicStore,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  identity::{Auth, require_clinical, require_staff},
};

/// `GET /appointments` — clinicians see only their own bookings.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Auth(identity): Auth,
) -> Result<Json<Vec<Appointment>>, ApiError>
where
  S: ClinicStore,
{
  require_clinical(&identity)?;
  Ok(Json(state.store.list_appointments(identity.scope()).await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub clinician_id:     Uuid,
  pub patient_id:       Uuid,
  pub scheduled_at:     DateTime<Utc>,
  pub duration_minutes: Option<u32>,
  pub notes:            Option<String>,
  pub fee:              Option<f64>,
}

/// `POST /appointments` — every booking starts as `scheduled`.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Auth(identity): Auth,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ClinicStore,
{
  require_staff(&identity)?;

  let appointment_id = state
    .store
    .create_appointment(NewAppointment {
      clinician_id:     body.clinician_id,
      patient_id:       body.patient_id,
      scheduled_at:     body.scheduled_at,
      duration_minutes: body.duration_minutes,
      notes:            body.notes,
      fee:              body.fee,
    })
    .await?;

  Ok((StatusCode::CREATED, Json(json!({ "appointment_id": appointment_id }))))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: AppointmentStatus,
}

/// `PUT /appointments/{id}/status`
///
/// Ownership and the transition graph are enforced by the store; completing
/// an appointment with a fee books the income transaction as a side effect.
pub async fn update_status<S>(
  State(state): State<AppState<S>>,
  Auth(identity): Auth,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<StatusCode, ApiError>
where
  S: ClinicStore,
{
  require_clinical(&identity)?;
  state
    .store
    .update_appointment_status(id, body.status, &identity)
    .await?;
  Ok(StatusCode::NO_CONTENT)
}
