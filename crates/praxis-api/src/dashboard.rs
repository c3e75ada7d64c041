//! Handlers for `/dashboard` endpoints.
//!
//! | Method | Path | Access |
//! |--------|------|--------|
//! | `GET`  | `/dashboard/stats` | staff + clinicians (scoped) |
//! | `GET`  | `/dashboard/today` | staff + clinicians (scoped) |
//! | `GET`  | `/dashboard/upcoming` | staff + clinicians (scoped) |
//! | `GET`  | `/dashboard/performance` | staff |
//! | `GET`  | `/dashboard/my-patients` | clinicians |

use axum::{Json, extract::State};
use praxis_core::{
  dashboard::{
    ClinicianPerformance, DashboardStats, PatientSummary, ScheduleEntry,
  },
  store::ClinicStore,
};

use crate::{
  AppState,
  error::ApiError,
  identity::{Auth, require_clinical, require_staff},
};

/// `GET /dashboard/stats`
pub async fn stats<S>(
  State(state): State<AppState<S>>,
  Auth(identity): Auth,
) -> Result<Json<DashboardStats>, ApiError>
where
  S: ClinicStore,
{
  require_clinical(&identity)?;
  Ok(Json(state.store.dashboard_stats(identity.scope()).await?))
}

/// `GET /dashboard/today`
pub async fn today<S>(
  State(state): State<AppState<S>>,
  Auth(identity): Auth,
) -> Result<Json<Vec<ScheduleEntry>>, ApiError>
where
  S: ClinicStore,
{
  require_clinical(&identity)?;
  Ok(Json(state.store.today_schedule(identity.scope()).await?))
}

/// `GET /dashboard/upcoming`
pub async fn upcoming<S>(
  State(state): State<AppState<S>>,
  Auth(identity): Auth,
) -> Result<Json<Vec<ScheduleEntry>>, ApiError>
where
  S: ClinicStore,
{
  require_clinical(&identity)?;
  Ok(Json(state.store.upcoming_schedule(identity.scope()).await?))
}

/// `GET /dashboard/performance`
pub async fn performance<S>(
  State(state): State<AppState<S>>,
  Auth(identity): Auth,
) -> Result<Json<Vec<ClinicianPerformance>>, ApiError>
where
  S: ClinicStore,
{
  require_staff(&identity)?;
  Ok(Json(state.store.clinician_performance().await?))
}

/// `GET /dashboard/my-patients` — only meaningful for clinician callers.
pub async fn my_patients<S>(
  State(state): State<AppState<S>>,
  Auth(identity): Auth,
) -> Result<Json<Vec<PatientSummary>>, ApiError>
where
  S: ClinicStore,
{
  let Some(clinician_id) = identity.clinician_id else {
    return Err(ApiError::Forbidden("clinician role required".into()));
  };
  Ok(Json(state.store.recent_patients(clinician_id).await?))
}
