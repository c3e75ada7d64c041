//! Clinician records — the 1:1 extension of clinician-role accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::patch::Patch;

/// A clinician row as returned by list endpoints, with name/phone/email
/// joined in from the owning account and profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clinician {
  pub clinician_id: Uuid,
  pub account_id:   Uuid,
  /// Professional licence identifier; globally unique.
  pub license:      String,
  pub specialty:    Option<String>,
  pub bio:          Option<String>,
  pub session_fee:  Option<f64>,
  /// Only active clinicians may be booked.
  pub active:       bool,
  pub full_name:    String,
  pub phone:        Option<String>,
  pub email:        String,
  pub created_at:   DateTime<Utc>,
}

/// Input for provisioning a clinician: an account, a profile, and the
/// clinician record, created atomically.
#[derive(Debug, Clone)]
pub struct NewClinician {
  pub full_name:     String,
  pub email:         String,
  pub password_hash: String,
  pub license:       String,
  pub specialty:     Option<String>,
  pub bio:           Option<String>,
  pub session_fee:   Option<f64>,
  pub phone:         Option<String>,
}

/// Partial update. `Option` fields are NOT NULL columns (absent = keep);
/// [`Patch`] fields additionally distinguish clearing from keeping.
#[derive(Debug, Clone, Default)]
pub struct ClinicianUpdate {
  pub full_name:   Option<String>,
  pub email:       Option<String>,
  pub license:     Option<String>,
  pub specialty:   Patch<String>,
  pub bio:         Patch<String>,
  pub session_fee: Patch<f64>,
  pub phone:       Patch<String>,
  pub active:      Option<bool>,
}

/// The ids minted when a clinician is provisioned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClinicianCreated {
  pub clinician_id: Uuid,
  pub account_id:   Uuid,
}
