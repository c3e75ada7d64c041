//! Accounts and profiles — the identity half of the data model.
//!
//! Every person in the system (staff, clinician, or patient) owns exactly one
//! account; role-specific data hangs off it in the `clinicians`/`patients`
//! tables. A profile is a 1:1 extension holding contact and demographic
//! fields.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role tag carried by every account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Attendant,
  Clinician,
  Patient,
}

impl Role {
  /// Admins and attendants form the front-desk staff; they see unscoped
  /// data everywhere a clinician sees only their own rows.
  pub fn is_staff(self) -> bool {
    matches!(self, Role::Admin | Role::Attendant)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
  pub account_id: Uuid,
  pub email:      String,
  pub full_name:  String,
  pub role:       Role,
  pub created_at: DateTime<Utc>,
}

/// An account paired with its stored credential hash, for login only.
/// Never serialised; the hash must not leave the server process.
#[derive(Debug, Clone)]
pub struct AccountAuth {
  pub account:       Account,
  /// Argon2 PHC string, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// The profile fields embedded in patient list rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
  pub full_name:  String,
  pub tax_id:     Option<String>,
  pub phone:      Option<String>,
  pub birth_date: Option<NaiveDate>,
}

/// Self-service registration input (`POST /auth/register`).
/// The created account always has [`Role::Patient`].
#[derive(Debug, Clone)]
pub struct NewRegistration {
  pub email:         String,
  pub full_name:     String,
  pub password_hash: String,
}
