//! Clinical records — session notes authored by clinicians.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::patch::Patch;

/// Default record kind when the input omits one.
pub const DEFAULT_RECORD_KIND: &str = "session";

/// A clinical record row, with clinician and author names joined in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalRecord {
  pub record_id:      Uuid,
  pub patient_id:     Uuid,
  pub clinician_id:   Uuid,
  /// Optional link to the appointment this session belonged to; nulled if
  /// the appointment is ever deleted.
  pub appointment_id: Option<Uuid>,
  pub session_date:   NaiveDate,
  /// Free-form type tag, e.g. "session", "evaluation".
  pub kind:           String,
  pub notes:          Option<String>,
  pub progress:       Option<String>,
  pub plan:           Option<String>,
  pub next_session:   Option<String>,
  /// The account that authored the record.
  pub created_by:     Uuid,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
  pub clinician_name: Option<String>,
  pub author_name:    Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewClinicalRecord {
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

/// Partial update of the free-text fields; each is independently
/// keep/clear/overwrite.
#[derive(Debug, Clone, Default)]
pub struct ClinicalRecordUpdate {
  pub notes:        Patch<String>,
  pub progress:     Patch<String>,
  pub plan:         Patch<String>,
  pub next_session: Patch<String>,
}
