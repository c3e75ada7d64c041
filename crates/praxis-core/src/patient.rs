//! Patient records — the 1:1 extension of patient-role accounts.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{account::ProfileSummary, patch::Patch};

/// The assigned clinician, summarised for patient list rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedClinician {
  pub license:   String,
  pub full_name: String,
}

/// A patient row as returned by list endpoints: patient columns plus nested
/// profile and the assigned clinician, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
  pub patient_id:        Uuid,
  pub account_id:        Uuid,
  /// Assigned clinician. Nullable — "unassigned". Once set, never changed
  /// automatically (first-writer-wins on appointment creation).
  pub clinician_id:      Option<Uuid>,
  pub address:           Option<String>,
  pub emergency_contact: Option<String>,
  pub insurance:         Option<String>,
  pub notes:             Option<String>,
  pub medication:        Option<String>,
  pub email:             String,
  pub created_at:        DateTime<Utc>,
  pub profile:           ProfileSummary,
  pub clinician:         Option<AssignedClinician>,
}

/// Input for provisioning a patient: account (random credential) + profile +
/// patient record, created atomically.
#[derive(Debug, Clone)]
pub struct NewPatient {
  pub full_name:         String,
  pub email:             String,
  pub password_hash:     String,
  pub tax_id:            Option<String>,
  pub phone:             Option<String>,
  pub birth_date:        Option<NaiveDate>,
  pub address:           Option<String>,
  pub insurance:         Option<String>,
  pub emergency_contact: Option<String>,
  pub notes:             Option<String>,
  pub medication:        Option<String>,
  /// Optional up-front assignment; validated for existence and active flag.
  pub clinician_id:      Option<Uuid>,
}

/// Partial update (administrator-only). `Option` fields are NOT NULL
/// columns; [`Patch`] fields distinguish clearing from keeping.
#[derive(Debug, Clone, Default)]
pub struct PatientUpdate {
  pub full_name:         Option<String>,
  pub email:             Option<String>,
  pub tax_id:            Patch<String>,
  pub phone:             Patch<String>,
  pub birth_date:        Patch<NaiveDate>,
  pub address:           Patch<String>,
  pub insurance:         Patch<String>,
  pub emergency_contact: Patch<String>,
  pub notes:             Patch<String>,
  pub medication:        Patch<String>,
  pub clinician_id:      Patch<Uuid>,
}

/// The ids minted when a patient is provisioned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PatientCreated {
  pub patient_id: Uuid,
  pub account_id: Uuid,
}
