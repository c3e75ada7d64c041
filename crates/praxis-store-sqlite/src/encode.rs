//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings truncated to whole seconds (so
//! SQLite's `date()` understands them); date-only fields as `YYYY-MM-DD`.
//! UUIDs are stored as hyphenated lowercase strings. Enum tags are stored as
//! their lowercase/snake_case wire form.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use praxis_core::{
  account::{Account, ProfileSummary, Role},
  appointment::{Appointment, AppointmentStatus},
  dashboard::{PatientSummary, ScheduleEntry},
  finance::{Transaction, TransactionKind, TransactionStatus},
  patient::{AssignedClinician, Patient},
  record::ClinicalRecord,
  clinician::Clinician,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn decode_uuid_opt(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_dt_opt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_date_opt(s: Option<String>) -> Result<Option<NaiveDate>> {
  s.as_deref().map(decode_date).transpose()
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(r: Role) -> &'static str {
  match r {
    Role::Admin => "admin",
    Role::Attendant => "attendant",
    Role::Clinician => "clinician",
    Role::Patient => "patient",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "admin" => Ok(Role::Admin),
    "attendant" => Ok(Role::Attendant),
    "clinician" => Ok(Role::Clinician),
    "patient" => Ok(Role::Patient),
    other => Err(Error::UnknownDiscriminant(format!("role: {other:?}"))),
  }
}

// ─── AppointmentStatus ───────────────────────────────────────────────────────

pub fn encode_status(s: AppointmentStatus) -> &'static str {
  match s {
    AppointmentStatus::Scheduled => "scheduled",
    AppointmentStatus::Confirmed => "confirmed",
    AppointmentStatus::InProgress => "in_progress",
    AppointmentStatus::Completed => "completed",
    AppointmentStatus::Cancelled => "cancelled",
  }
}

pub fn decode_status(s: &str) -> Result<AppointmentStatus> {
  match s {
    "scheduled" => Ok(AppointmentStatus::Scheduled),
    "confirmed" => Ok(AppointmentStatus::Confirmed),
    "in_progress" => Ok(AppointmentStatus::InProgress),
    "completed" => Ok(AppointmentStatus::Completed),
    "cancelled" => Ok(AppointmentStatus::Cancelled),
    other => Err(Error::UnknownDiscriminant(format!("status: {other:?}"))),
  }
}

// ─── Transaction tags ────────────────────────────────────────────────────────

pub fn encode_tx_kind(k: TransactionKind) -> &'static str {
  match k {
    TransactionKind::Income => "income",
    TransactionKind::Expense => "expense",
  }
}

pub fn decode_tx_kind(s: &str) -> Result<TransactionKind> {
  match s {
    "income" => Ok(TransactionKind::Income),
    "expense" => Ok(TransactionKind::Expense),
    other => Err(Error::UnknownDiscriminant(format!("transaction kind: {other:?}"))),
  }
}

pub fn encode_tx_status(s: TransactionStatus) -> &'static str {
  match s {
    TransactionStatus::Pending => "pending",
    TransactionStatus::Paid => "paid",
  }
}

pub fn decode_tx_status(s: &str) -> Result<TransactionStatus> {
  match s {
    "pending" => Ok(TransactionStatus::Pending),
    "paid" => Ok(TransactionStatus::Paid),
    other => Err(Error::UnknownDiscriminant(format!("transaction status: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read from an `accounts` row.
pub struct RawAccount {
  pub account_id: String,
  pub email:      String,
  pub full_name:  String,
  pub role:       String,
  pub created_at: String,
}

impl RawAccount {
  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      account_id: decode_uuid(&self.account_id)?,
      email:      self.email,
      full_name:  self.full_name,
      role:       decode_role(&self.role)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read from a `patients` row joined with profile, account, and
/// the assigned clinician.
pub struct RawPatient {
  pub patient_id:        String,
  pub account_id:        String,
  pub clinician_id:      Option<String>,
  pub address:           Option<String>,
  pub emergency_contact: Option<String>,
  pub insurance:         Option<String>,
  pub notes:             Option<String>,
  pub medication:        Option<String>,
  pub created_at:        String,
  // profiles join
  pub full_name:         String,
  pub tax_id:            Option<String>,
  pub phone:             Option<String>,
  pub birth_date:        Option<String>,
  // accounts join
  pub email:             String,
  // clinicians join
  pub clinician_license: Option<String>,
  pub clinician_name:    Option<String>,
}

impl RawPatient {
  pub fn into_patient(self) -> Result<Patient> {
    let clinician = match (self.clinician_license, self.clinician_name) {
      (Some(license), Some(full_name)) => {
        Some(AssignedClinician { license, full_name })
      }
      _ => None,
    };

    Ok(Patient {
      patient_id:        decode_uuid(&self.patient_id)?,
      account_id:        decode_uuid(&self.account_id)?,
      clinician_id:      decode_uuid_opt(self.clinician_id)?,
      address:           self.address,
      emergency_contact: self.emergency_contact,
      insurance:         self.insurance,
      notes:             self.notes,
      medication:        self.medication,
      email:             self.email,
      created_at:        decode_dt(&self.created_at)?,
      profile:           ProfileSummary {
        full_name:  self.full_name,
        tax_id:     self.tax_id,
        phone:      self.phone,
        birth_date: decode_date_opt(self.birth_date)?,
      },
      clinician,
    })
  }
}

/// Raw strings read from a `clinicians` row joined with profile and account.
pub struct RawClinician {
  pub clinician_id: String,
  pub account_id:   String,
  pub license:      String,
  pub specialty:    Option<String>,
  pub bio:          Option<String>,
  pub session_fee:  Option<f64>,
  pub active:       i64,
  pub created_at:   String,
  pub full_name:    String,
  pub phone:        Option<String>,
  pub email:        String,
}

impl RawClinician {
  pub fn into_clinician(self) -> Result<Clinician> {
    Ok(Clinician {
      clinician_id: decode_uuid(&self.clinician_id)?,
      account_id:   decode_uuid(&self.account_id)?,
      license:      self.license,
      specialty:    self.specialty,
      bio:          self.bio,
      session_fee:  self.session_fee,
      active:       self.active != 0,
      full_name:    self.full_name,
      phone:        self.phone,
      email:        self.email,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read from an `appointments` row joined with patient and
/// clinician details.
pub struct RawAppointment {
  pub appointment_id:    String,
  pub clinician_id:      String,
  pub patient_id:        String,
  pub scheduled_at:      String,
  pub duration_minutes:  i64,
  pub status:            String,
  pub notes:             Option<String>,
  pub fee:               Option<f64>,
  pub created_at:        String,
  pub patient_name:      Option<String>,
  pub patient_phone:     Option<String>,
  pub clinician_name:    Option<String>,
  pub clinician_license: Option<String>,
}

impl RawAppointment {
  pub fn into_appointment(self) -> Result<Appointment> {
    Ok(Appointment {
      appointment_id:    decode_uuid(&self.appointment_id)?,
      clinician_id:      decode_uuid(&self.clinician_id)?,
      patient_id:        decode_uuid(&self.patient_id)?,
      scheduled_at:      decode_dt(&self.scheduled_at)?,
      duration_minutes:  self.duration_minutes as u32,
      status:            decode_status(&self.status)?,
      notes:             self.notes,
      fee:               self.fee,
      created_at:        decode_dt(&self.created_at)?,
      patient_name:      self.patient_name,
      patient_phone:     self.patient_phone,
      clinician_name:    self.clinician_name,
      clinician_license: self.clinician_license,
    })
  }
}

/// Raw strings read from a `clinical_records` row joined with clinician and
/// author names.
pub struct RawRecord {
  pub record_id:      String,
  pub patient_id:     String,
  pub clinician_id:   String,
  pub appointment_id: Option<String>,
  pub session_date:   String,
  pub kind:           String,
  pub notes:          Option<String>,
  pub progress:       Option<String>,
  pub plan:           Option<String>,
  pub next_session:   Option<String>,
  pub created_by:     String,
  pub created_at:     String,
  pub updated_at:     String,
  pub clinician_name: Option<String>,
  pub author_name:    Option<String>,
}

impl RawRecord {
  pub fn into_record(self) -> Result<ClinicalRecord> {
    Ok(ClinicalRecord {
      record_id:      decode_uuid(&self.record_id)?,
      patient_id:     decode_uuid(&self.patient_id)?,
      clinician_id:   decode_uuid(&self.clinician_id)?,
      appointment_id: decode_uuid_opt(self.appointment_id)?,
      session_date:   decode_date(&self.session_date)?,
      kind:           self.kind,
      notes:          self.notes,
      progress:       self.progress,
      plan:           self.plan,
      next_session:   self.next_session,
      created_by:     decode_uuid(&self.created_by)?,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
      clinician_name: self.clinician_name,
      author_name:    self.author_name,
    })
  }
}

/// Raw strings read from a `transactions` row joined with clinician name and
/// linked appointment time.
pub struct RawTransaction {
  pub transaction_id:   String,
  pub appointment_id:   Option<String>,
  pub clinician_id:     String,
  pub kind:             String,
  pub description:      Option<String>,
  pub amount:           f64,
  pub entry_date:       String,
  pub status:           String,
  pub notes:            Option<String>,
  pub auto_generated:   i64,
  pub created_at:       String,
  pub clinician_name:   Option<String>,
  pub appointment_time: Option<String>,
}

impl RawTransaction {
  pub fn into_transaction(self) -> Result<Transaction> {
    Ok(Transaction {
      transaction_id:   decode_uuid(&self.transaction_id)?,
      appointment_id:   decode_uuid_opt(self.appointment_id)?,
      clinician_id:     decode_uuid(&self.clinician_id)?,
      kind:             decode_tx_kind(&self.kind)?,
      description:      self.description,
      amount:           self.amount,
      entry_date:       decode_date(&self.entry_date)?,
      status:           decode_tx_status(&self.status)?,
      notes:            self.notes,
      auto_generated:   self.auto_generated != 0,
      created_at:       decode_dt(&self.created_at)?,
      clinician_name:   self.clinician_name,
      appointment_time: decode_dt_opt(self.appointment_time)?,
    })
  }
}

/// Raw strings for the today/upcoming schedule widgets.
pub struct RawScheduleEntry {
  pub appointment_id:   String,
  pub scheduled_at:     String,
  pub status:           String,
  pub duration_minutes: i64,
  pub patient_name:     Option<String>,
  pub clinician_name:   Option<String>,
}

impl RawScheduleEntry {
  pub fn into_entry(self) -> Result<ScheduleEntry> {
    Ok(ScheduleEntry {
      appointment_id:   decode_uuid(&self.appointment_id)?,
      scheduled_at:     decode_dt(&self.scheduled_at)?,
      status:           decode_status(&self.status)?,
      duration_minutes: self.duration_minutes as u32,
      patient_name:     self.patient_name,
      clinician_name:   self.clinician_name,
    })
  }
}

/// Raw strings for the clinician's recent-patients widget.
pub struct RawPatientSummary {
  pub patient_id: String,
  pub account_id: String,
  pub full_name:  String,
  pub tax_id:     Option<String>,
  pub phone:      Option<String>,
  pub insurance:  Option<String>,
  pub created_at: String,
}

impl RawPatientSummary {
  pub fn into_summary(self) -> Result<PatientSummary> {
    Ok(PatientSummary {
      patient_id: decode_uuid(&self.patient_id)?,
      account_id: decode_uuid(&self.account_id)?,
      full_name:  self.full_name,
      tax_id:     self.tax_id,
      phone:      self.phone,
      insurance:  self.insurance,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
