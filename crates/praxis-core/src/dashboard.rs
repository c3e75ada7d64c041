//! Dashboard read models: role-scoped counts, day schedules, and the
//! per-clinician performance rollup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::appointment::AppointmentStatus;

/// Headline counts. For a clinician scope, `total_clinicians` is zero and
/// the remaining counts cover only that clinician's rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
  pub total_clinicians:   u32,
  pub total_patients:     u32,
  pub total_appointments: u32,
  pub appointments_today: u32,
}

/// A compact appointment row for the today/upcoming widgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
  pub appointment_id:   Uuid,
  pub scheduled_at:     DateTime<Utc>,
  pub status:           AppointmentStatus,
  pub duration_minutes: u32,
  pub patient_name:     Option<String>,
  pub clinician_name:   Option<String>,
}

/// A compact patient row for the clinician's "my patients" widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientSummary {
  pub patient_id: Uuid,
  pub account_id: Uuid,
  pub full_name:  String,
  pub tax_id:     Option<String>,
  pub phone:      Option<String>,
  pub insurance:  Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Per-clinician performance rollup (staff only).
///
/// Rates are percentages rounded to two decimals; zero when the clinician
/// has no appointments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicianPerformance {
  pub clinician_id:         Uuid,
  pub clinician_name:       String,
  pub license:              String,
  pub total_patients:       u32,
  pub total_appointments:   u32,
  pub completed:            u32,
  pub cancelled:            u32,
  pub total_records:        u32,
  /// Summed amount of the clinician's paid income transactions.
  pub total_income:         f64,
  /// Mean duration of completed appointments, if any exist.
  pub avg_duration_minutes: Option<f64>,
  pub completion_rate:      f64,
  pub cancellation_rate:    f64,
}

/// Percentage of `part` in `whole`, two-decimal rounding, 0 when `whole`
/// is zero.
pub fn rate_percent(part: u32, whole: u32) -> f64 {
  if whole == 0 {
    return 0.0;
  }
  (f64::from(part) / f64::from(whole) * 10_000.0).round() / 100.0
}

#[cfg(test)]
mod tests {
  use super::rate_percent;

  #[test]
  fn zero_denominator_yields_zero() {
    assert_eq!(rate_percent(5, 0), 0.0);
  }

  #[test]
  fn rounds_to_two_decimals() {
    assert_eq!(rate_percent(1, 3), 33.33);
    assert_eq!(rate_percent(2, 3), 66.67);
    assert_eq!(rate_percent(3, 3), 100.0);
  }
}
