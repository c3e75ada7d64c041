//! JSON REST API for Praxis.
//!
//! Exposes an axum [`Router`] backed by any [`praxis_core::store::ClinicStore`].
//! Every request resolves its bearer token to an [`praxis_core::auth::Identity`]
//! once, through the [`identity::Auth`] extractor; handlers only apply role
//! gates on top of that.

pub mod appointments;
pub mod auth;
pub mod clinicians;
pub mod dashboard;
pub mod error;
pub mod financial;
pub mod identity;
pub mod patients;
pub mod records;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post, put},
};
use praxis_core::store::ClinicStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` or the
/// `PRAXIS_*` environment.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,

  /// Administrative account seeded on first start.
  #[serde(default = "default_admin_email")]
  pub admin_email:     String,
  #[serde(default = "default_admin_name")]
  pub admin_full_name: String,
  /// Argon2 PHC string; generate with `praxis-server --hash-password`.
  /// When absent, no admin account is seeded.
  #[serde(default)]
  pub admin_password_hash: Option<String>,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 3001 }
fn default_store_path() -> PathBuf { PathBuf::from("praxis.db") }
fn default_admin_email() -> String { "admin@praxis.local".to_string() }
fn default_admin_name() -> String { "Administrator".to_string() }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                default_host(),
      port:                default_port(),
      store_path:          default_store_path(),
      admin_email:         default_admin_email(),
      admin_full_name:     default_admin_name(),
      admin_password_hash: None,
    }
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S: ClinicStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

impl<S: ClinicStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), config: self.config.clone() }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// `GET /health` — liveness probe, no auth.
async fn health() -> axum::Json<serde_json::Value> {
  axum::Json(serde_json::json!({ "status": "ok" }))
}

/// Build the full application router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ClinicStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/health", get(health))
    // Auth
    .route("/auth/login", post(auth::login::<S>))
    .route("/auth/register", post(auth::register::<S>))
    .route("/auth/session", get(auth::session::<S>))
    .route("/auth/logout", post(auth::logout::<S>))
    // Patients
    .route("/patients", get(patients::list::<S>).post(patients::create::<S>))
    .route("/patients/{id}", put(patients::update::<S>).delete(patients::delete::<S>))
    // Clinicians
    .route("/clinicians", get(clinicians::list::<S>).post(clinicians::create::<S>))
    .route("/clinicians/{id}", put(clinicians::update::<S>))
    // Appointments
    .route("/appointments", get(appointments::list::<S>).post(appointments::create::<S>))
    .route("/appointments/{id}/status", put(appointments::update_status::<S>))
    // Clinical records
    .route("/clinical-records", post(records::create::<S>))
    .route("/clinical-records/{id}", put(records::update::<S>))
    .route("/clinical-records/patient/{id}", get(records::list_for_patient::<S>))
    // Financial
    .route("/financial/report", get(financial::report::<S>))
    .route(
      "/financial/transactions",
      get(financial::list::<S>).post(financial::create::<S>),
    )
    // Dashboard
    .route("/dashboard/stats", get(dashboard::stats::<S>))
    .route("/dashboard/today", get(dashboard::today::<S>))
    .route("/dashboard/upcoming", get(dashboard::upcoming::<S>))
    .route("/dashboard/performance", get(dashboard::performance::<S>))
    .route("/dashboard/my-patients", get(dashboard::my_patients::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests;
