//! The `ClinicStore` trait — the seam between the HTTP layer and storage.
//!
//! The trait is implemented by storage backends (e.g. `praxis-store-sqlite`).
//! The API layer depends on this abstraction, not on any concrete backend.
//!
//! Methods return [`crate::Error`] directly rather than a backend-specific
//! associated error: role, validation, and not-found outcomes are part of
//! each operation's contract and must cross the seam so the HTTP layer can
//! map them to status codes. Backend failures arrive as
//! [`crate::Error::Backend`].
//!
//! Multi-row operations (provisioning an account + profile + record, or the
//! appointment-completion side effect) are atomic: either every row is
//! written or none is.

use std::future::Future;

use uuid::Uuid;

use crate::{
  account::{Account, AccountAuth, NewRegistration},
  appointment::{Appointment, AppointmentStatus, NewAppointment},
  auth::{Identity, Scope, Session},
  clinician::{Clinician, ClinicianCreated, ClinicianUpdate, NewClinician},
  dashboard::{ClinicianPerformance, DashboardStats, PatientSummary, ScheduleEntry},
  finance::{
    FinancialReport, NewTransaction, ReportQuery, Transaction, TransactionFilter,
  },
  patient::{NewPatient, Patient, PatientCreated, PatientUpdate},
  record::{ClinicalRecord, ClinicalRecordUpdate, NewClinicalRecord},
  Result,
};

/// Abstraction over a Praxis storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (tokio with `axum`).
pub trait ClinicStore: Send + Sync {
  // ── Auth ──────────────────────────────────────────────────────────────

  /// Look up an account and its credential hash by email.
  /// Returns `None` when the email is unknown.
  fn find_account_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<AccountAuth>>> + Send + 'a;

  /// Mint a session token for `account_id`, valid for
  /// [`crate::auth::SESSION_TTL_DAYS`].
  fn create_session(
    &self,
    account_id: Uuid,
  ) -> impl Future<Output = Result<Session>> + Send + '_;

  /// Resolve a bearer token into the caller identity.
  ///
  /// Errors with [`crate::Error::Unauthenticated`] for an unknown token and
  /// [`crate::Error::SessionExpired`] for a known token past its expiry.
  fn resolve_session<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<Identity>> + Send + 'a;

  /// Fetch the account behind a valid token, for `GET /auth/session`.
  /// Same error contract as [`ClinicStore::resolve_session`].
  fn session_account<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<Account>> + Send + 'a;

  /// Delete the session for `token`. Idempotent: deleting an unknown token
  /// succeeds.
  fn delete_session<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  /// Self-service registration: account (role=patient) + profile + patient
  /// record in one transaction. Fails with a validation error when the
  /// email is taken. Returns the new account id.
  fn register_patient_account(
    &self,
    reg: NewRegistration,
  ) -> impl Future<Output = Result<Uuid>> + Send + '_;

  /// Create the administrative account on first start if `email` is not
  /// yet registered. Returns `true` when the account was created.
  fn seed_admin<'a>(
    &'a self,
    email: &'a str,
    full_name: &'a str,
    password_hash: &'a str,
  ) -> impl Future<Output = Result<bool>> + Send + 'a;

  // ── Patients ──────────────────────────────────────────────────────────

  /// List patients visible to `scope`. A clinician sees patients assigned
  /// to them or with at least one appointment with them, deduplicated.
  /// Ordered by creation time, newest first.
  fn list_patients(
    &self,
    scope: Scope,
  ) -> impl Future<Output = Result<Vec<Patient>>> + Send + '_;

  /// Provision account + profile + patient record atomically.
  fn create_patient(
    &self,
    new: NewPatient,
  ) -> impl Future<Output = Result<PatientCreated>> + Send + '_;

  /// Partial update; validates uniqueness of a changed email and the
  /// active flag of a changed clinician assignment.
  fn update_patient(
    &self,
    patient_id: Uuid,
    update: PatientUpdate,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// Delete the owning account; cascade removes profile and patient record,
  /// dependent appointments and clinical records.
  fn delete_patient(
    &self,
    patient_id: Uuid,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  // ── Clinicians ────────────────────────────────────────────────────────

  /// List all clinicians (no role filtering), ordered by name.
  fn list_clinicians(
    &self,
  ) -> impl Future<Output = Result<Vec<Clinician>>> + Send + '_;

  /// Provision account + profile + clinician record atomically. Email and
  /// licence identifier must be globally unique.
  fn create_clinician(
    &self,
    new: NewClinician,
  ) -> impl Future<Output = Result<ClinicianCreated>> + Send + '_;

  /// Partial update, including the active flag and an optional credential
  /// change (`password_hash`, already hashed by the caller).
  fn update_clinician(
    &self,
    clinician_id: Uuid,
    update: ClinicianUpdate,
    password_hash: Option<String>,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  // ── Appointments ──────────────────────────────────────────────────────

  /// List appointments visible to `scope`, newest first, enriched with
  /// patient and clinician details.
  fn list_appointments(
    &self,
    scope: Scope,
  ) -> impl Future<Output = Result<Vec<Appointment>>> + Send + '_;

  /// Book an appointment. The patient must exist and the clinician must be
  /// active; the side effect assigns the clinician to the patient iff the
  /// patient has none (first-writer-wins). Returns the appointment id.
  fn create_appointment(
    &self,
    new: NewAppointment,
  ) -> impl Future<Output = Result<Uuid>> + Send + '_;

  /// Transition an appointment's status.
  ///
  /// A clinician caller must own the appointment. Transitions must follow
  /// the edges of [`AppointmentStatus::can_transition_to`]. On
  /// `completed` with a non-null fee, an income/paid transaction dated
  /// today is inserted idempotently (at most one auto-generated transaction
  /// per appointment, enforced by a unique index).
  fn update_appointment_status<'a>(
    &'a self,
    appointment_id: Uuid,
    status: AppointmentStatus,
    identity: &'a Identity,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  // ── Clinical records ──────────────────────────────────────────────────

  /// List a patient's clinical records visible to `scope`; a clinician sees
  /// only records under their own clinician id. Ordered by session date
  /// then creation time, newest first.
  fn list_patient_records(
    &self,
    patient_id: Uuid,
    scope: Scope,
  ) -> impl Future<Output = Result<Vec<ClinicalRecord>>> + Send + '_;

  /// Author a clinical record. The patient must exist and the clinician
  /// must be active; a clinician caller may only author under their own
  /// clinician id. Returns the record id.
  fn create_record<'a>(
    &'a self,
    new: NewClinicalRecord,
    identity: &'a Identity,
  ) -> impl Future<Output = Result<Uuid>> + Send + 'a;

  /// Update a record's free-text fields. Allowed for the record's owning
  /// clinician, its original author, or staff.
  fn update_record<'a>(
    &'a self,
    record_id: Uuid,
    update: ClinicalRecordUpdate,
    identity: &'a Identity,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  // ── Financial ─────────────────────────────────────────────────────────

  /// Aggregate paid income/expense totals and counts over an inclusive
  /// date range, with a per-clinician breakdown.
  fn financial_report<'a>(
    &'a self,
    query: &'a ReportQuery,
  ) -> impl Future<Output = Result<FinancialReport>> + Send + 'a;

  /// List transactions matching `filter`, newest entry date first.
  fn list_transactions<'a>(
    &'a self,
    filter: &'a TransactionFilter,
  ) -> impl Future<Output = Result<Vec<Transaction>>> + Send + 'a;

  /// Insert a manual transaction. The referenced clinician must exist.
  /// Returns the transaction id.
  fn create_transaction(
    &self,
    new: NewTransaction,
  ) -> impl Future<Output = Result<Uuid>> + Send + '_;

  // ── Dashboard ─────────────────────────────────────────────────────────

  /// Headline counts for `scope`.
  fn dashboard_stats(
    &self,
    scope: Scope,
  ) -> impl Future<Output = Result<DashboardStats>> + Send + '_;

  /// Today's appointments for `scope`, earliest first.
  fn today_schedule(
    &self,
    scope: Scope,
  ) -> impl Future<Output = Result<Vec<ScheduleEntry>>> + Send + '_;

  /// The next ten future appointments for `scope`, earliest first.
  fn upcoming_schedule(
    &self,
    scope: Scope,
  ) -> impl Future<Output = Result<Vec<ScheduleEntry>>> + Send + '_;

  /// The ten most recent patients tied to `clinician_id` (assigned or with
  /// an appointment).
  fn recent_patients(
    &self,
    clinician_id: Uuid,
  ) -> impl Future<Output = Result<Vec<PatientSummary>>> + Send + '_;

  /// Per-clinician performance rollup over all active clinicians, ordered
  /// by appointment count descending.
  fn clinician_performance(
    &self,
  ) -> impl Future<Output = Result<Vec<ClinicianPerformance>>> + Send + '_;
}
