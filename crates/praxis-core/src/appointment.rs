//! Appointments and their status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Appointment lifecycle status.
///
/// Legal transitions:
///
/// ```text
/// scheduled ──► confirmed ──► in_progress ──► completed
///     │             │              │
///     └─────────────┴──────────────┴────────► cancelled
/// ```
///
/// `completed` and `cancelled` are terminal. The store rejects any edge not
/// in this graph with a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
  Scheduled,
  Confirmed,
  InProgress,
  Completed,
  Cancelled,
}

impl AppointmentStatus {
  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Completed | Self::Cancelled)
  }

  /// Whether `self → next` is a legal edge. Self-transitions are illegal;
  /// the five-value set itself is validated at deserialisation.
  pub fn can_transition_to(self, next: Self) -> bool {
    use AppointmentStatus::*;
    matches!(
      (self, next),
      (Scheduled, Confirmed)
        | (Scheduled, InProgress)
        | (Scheduled, Cancelled)
        | (Confirmed, InProgress)
        | (Confirmed, Cancelled)
        | (InProgress, Completed)
        | (InProgress, Cancelled)
    )
  }
}

/// An appointment row as returned by list endpoints, enriched with patient
/// name/phone and clinician name/licence via joins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
  pub appointment_id:    Uuid,
  pub clinician_id:      Uuid,
  pub patient_id:        Uuid,
  pub scheduled_at:      DateTime<Utc>,
  pub duration_minutes:  u32,
  pub status:            AppointmentStatus,
  pub notes:             Option<String>,
  pub fee:               Option<f64>,
  pub created_at:        DateTime<Utc>,
  pub patient_name:      Option<String>,
  pub patient_phone:     Option<String>,
  pub clinician_name:    Option<String>,
  pub clinician_license: Option<String>,
}

/// Input for booking an appointment. The clinician must be active; if the
/// patient has no assigned clinician yet, this one is assigned
/// (first-writer-wins).
#[derive(Debug, Clone)]
pub struct NewAppointment {
  pub clinician_id:     Uuid,
  pub patient_id:       Uuid,
  pub scheduled_at:     DateTime<Utc>,
  pub duration_minutes: Option<u32>,
  pub notes:            Option<String>,
  pub fee:              Option<f64>,
}

/// Default session length in minutes when the booking omits one.
pub const DEFAULT_DURATION_MINUTES: u32 = 50;

#[cfg(test)]
mod tests {
  use super::AppointmentStatus::*;

  #[test]
  fn forward_edges_are_legal() {
    assert!(Scheduled.can_transition_to(Confirmed));
    assert!(Scheduled.can_transition_to(InProgress));
    assert!(Confirmed.can_transition_to(InProgress));
    assert!(InProgress.can_transition_to(Completed));
  }

  #[test]
  fn cancellation_is_legal_from_any_non_terminal_state() {
    assert!(Scheduled.can_transition_to(Cancelled));
    assert!(Confirmed.can_transition_to(Cancelled));
    assert!(InProgress.can_transition_to(Cancelled));
  }

  #[test]
  fn terminal_states_admit_no_edges() {
    for next in [Scheduled, Confirmed, InProgress, Completed, Cancelled] {
      assert!(!Completed.can_transition_to(next));
      assert!(!Cancelled.can_transition_to(next));
    }
  }

  #[test]
  fn backward_and_skipped_edges_are_illegal() {
    assert!(!Confirmed.can_transition_to(Scheduled));
    assert!(!Scheduled.can_transition_to(Completed));
    assert!(!Confirmed.can_transition_to(Completed));
    assert!(!InProgress.can_transition_to(Confirmed));
  }

  #[test]
  fn self_transitions_are_illegal() {
    for s in [Scheduled, Confirmed, InProgress, Completed, Cancelled] {
      assert!(!s.can_transition_to(s));
    }
  }
}
