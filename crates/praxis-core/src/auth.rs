//! Session tokens and the resolved caller identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::Role;

/// How long a freshly issued session token is valid.
pub const SESSION_TTL_DAYS: i64 = 7;

/// A bearer token row. Expiry is lazy: checked at resolution time, never
/// actively evicted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
  pub session_id: Uuid,
  pub account_id: Uuid,
  pub token:      String,
  pub expires_at: DateTime<Utc>,
  pub created_at: DateTime<Utc>,
}

/// The caller identity derived from a bearer token, re-resolved on every
/// request. `clinician_id` is set iff the account owns a clinician record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
  pub account_id:   Uuid,
  pub role:         Role,
  pub clinician_id: Option<Uuid>,
}

impl Identity {
  /// The row-visibility scope this caller gets on role-filtered lists.
  ///
  /// A clinician-role account with a clinician record sees only its own
  /// rows; everyone else (staff, and degenerate clinician accounts with no
  /// record) sees everything, matching the observed route behaviour.
  pub fn scope(&self) -> Scope {
    match (self.role, self.clinician_id) {
      (Role::Clinician, Some(id)) => Scope::Clinician(id),
      _ => Scope::All,
    }
  }

  pub fn is_staff(&self) -> bool {
    self.role.is_staff()
  }
}

/// Row visibility for list/aggregate operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
  /// Admin/attendant: no filtering.
  All,
  /// Clinician: only rows tied to this clinician id.
  Clinician(Uuid),
}

#[cfg(test)]
mod tests {
  use super::*;

  fn identity(role: Role, clinician_id: Option<Uuid>) -> Identity {
    Identity { account_id: Uuid::new_v4(), role, clinician_id }
  }

  #[test]
  fn clinician_with_record_is_scoped() {
    let id = Uuid::new_v4();
    assert_eq!(
      identity(Role::Clinician, Some(id)).scope(),
      Scope::Clinician(id)
    );
  }

  #[test]
  fn staff_roles_are_unscoped() {
    assert_eq!(identity(Role::Admin, None).scope(), Scope::All);
    assert_eq!(identity(Role::Attendant, None).scope(), Scope::All);
  }

  #[test]
  fn clinician_without_record_falls_back_to_all() {
    assert_eq!(identity(Role::Clinician, None).scope(), Scope::All);
  }
}
