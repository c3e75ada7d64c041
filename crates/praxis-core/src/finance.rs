//! Financial transactions and the aggregated report.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Income or expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
  Income,
  Expense,
}

/// Settlement state. Only `paid` rows count toward report totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
  Pending,
  Paid,
}

/// A transaction row, with clinician name and linked appointment time
/// joined in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
  pub transaction_id:   Uuid,
  /// Set on auto-generated rows; nulled (not cascaded) if the appointment
  /// is deleted.
  pub appointment_id:   Option<Uuid>,
  pub clinician_id:     Uuid,
  pub kind:             TransactionKind,
  pub description:      Option<String>,
  pub amount:           f64,
  pub entry_date:       NaiveDate,
  pub status:           TransactionStatus,
  pub notes:            Option<String>,
  /// True for rows inserted by the appointment-completion side effect.
  pub auto_generated:   bool,
  pub created_at:       DateTime<Utc>,
  pub clinician_name:   Option<String>,
  pub appointment_time: Option<DateTime<Utc>>,
}

/// Input for a manually created transaction (admin only).
#[derive(Debug, Clone)]
pub struct NewTransaction {
  pub appointment_id: Option<Uuid>,
  pub clinician_id:   Uuid,
  pub kind:           Option<TransactionKind>,
  pub description:    Option<String>,
  pub amount:         f64,
  pub entry_date:     Option<NaiveDate>,
  pub status:         Option<TransactionStatus>,
  pub notes:          Option<String>,
}

/// Filters for the transaction list. Date bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
  pub from:         Option<NaiveDate>,
  pub to:           Option<NaiveDate>,
  pub kind:         Option<TransactionKind>,
  pub clinician_id: Option<Uuid>,
}

/// Parameters for the financial report. Date bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct ReportQuery {
  pub from:         Option<NaiveDate>,
  pub to:           Option<NaiveDate>,
  pub clinician_id: Option<Uuid>,
}

/// One side (income or expense) of the report totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSide {
  pub total: f64,
  pub count: u32,
}

/// Per-clinician breakdown row of the financial report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicianReportRow {
  pub clinician_id:   Uuid,
  pub clinician_name: String,
  pub income_total:   f64,
  pub expense_total:  f64,
  pub income_count:   u32,
  pub expense_count:  u32,
}

/// The aggregated financial report. Only `paid` transactions contribute.
/// An empty range yields zero totals and an empty breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialReport {
  pub income:        ReportSide,
  pub expense:       ReportSide,
  pub balance:       f64,
  pub per_clinician: Vec<ClinicianReportRow>,
}
