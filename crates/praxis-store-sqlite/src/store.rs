//! [`SqliteStore`] — the SQLite implementation of [`ClinicStore`].

use std::path::Path;

use chrono::{Duration, NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use praxis_core::{
  account::{Account, AccountAuth, NewRegistration, Role},
  appointment::{
    Appointment, AppointmentStatus, NewAppointment, DEFAULT_DURATION_MINUTES,
  },
  auth::{Identity, Scope, Session, SESSION_TTL_DAYS},
  clinician::{Clinician, ClinicianCreated, ClinicianUpdate, NewClinician},
  dashboard::{
    rate_percent, ClinicianPerformance, DashboardStats, PatientSummary,
    ScheduleEntry,
  },
  finance::{
    FinancialReport, NewTransaction, ClinicianReportRow, ReportQuery,
    ReportSide, Transaction, TransactionFilter, TransactionKind,
    TransactionStatus,
  },
  patient::{NewPatient, Patient, PatientCreated, PatientUpdate},
  record::{
    ClinicalRecord, ClinicalRecordUpdate, NewClinicalRecord,
    DEFAULT_RECORD_KIND,
  },
  store::ClinicStore,
  Error as CoreError, Patch,
};

use crate::{
  encode::{
    decode_dt, decode_status, encode_date, encode_dt, encode_role,
    encode_status, encode_tx_kind, encode_tx_status, encode_uuid, RawAccount,
    RawAppointment, RawClinician, RawPatient, RawPatientSummary, RawRecord,
    RawScheduleEntry, RawTransaction,
  },
  schema::SCHEMA,
  Error,
};

type CoreResult<T> = praxis_core::Result<T>;

/// Description written on auto-generated income transactions.
const AUTO_TRANSACTION_DESCRIPTION: &str = "service rendered";

// ─── Patch helpers ───────────────────────────────────────────────────────────

/// Resolve a string-valued patch against the currently stored column value.
fn resolve_text(p: Patch<String>, current: Option<String>) -> Option<String> {
  p.resolve(current)
}

/// Resolve a date-valued patch against the stored `YYYY-MM-DD` column.
fn resolve_date(p: Patch<NaiveDate>, current: Option<String>) -> Option<String> {
  match p {
    Patch::Keep => current,
    Patch::Clear => None,
    Patch::Set(d) => Some(encode_date(d)),
  }
}

/// Resolve a uuid-valued patch against the stored hyphenated column.
fn resolve_id(p: Patch<Uuid>, current: Option<String>) -> Option<String> {
  match p {
    Patch::Keep => current,
    Patch::Clear => None,
    Patch::Set(id) => Some(encode_uuid(id)),
  }
}

fn resolve_f64(p: Patch<f64>, current: Option<f64>) -> Option<f64> {
  p.resolve(current)
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Praxis clinic store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> crate::Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> crate::Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> crate::Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SQL fragments ───────────────────────────────────────────────────────────

/// Columns selected for every patient list row, joined with profile,
/// account, and the assigned clinician's licence/name.
const PATIENT_COLUMNS: &str = "
  p.patient_id, p.account_id, p.clinician_id, p.address,
  p.emergency_contact, p.insurance, p.notes, p.medication, p.created_at,
  prof.full_name, prof.tax_id, prof.phone, prof.birth_date,
  a.email,
  cl.license, cl_prof.full_name";

const PATIENT_JOINS: &str = "
  FROM patients p
  JOIN profiles prof   ON prof.account_id = p.account_id
  JOIN accounts a      ON a.account_id = p.account_id
  LEFT JOIN clinicians cl      ON cl.clinician_id = p.clinician_id
  LEFT JOIN profiles cl_prof   ON cl_prof.account_id = cl.account_id";

fn patient_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPatient> {
  Ok(RawPatient {
    patient_id:        row.get(0)?,
    account_id:        row.get(1)?,
    clinician_id:      row.get(2)?,
    address:           row.get(3)?,
    emergency_contact: row.get(4)?,
    insurance:         row.get(5)?,
    notes:             row.get(6)?,
    medication:        row.get(7)?,
    created_at:        row.get(8)?,
    full_name:         row.get(9)?,
    tax_id:            row.get(10)?,
    phone:             row.get(11)?,
    birth_date:        row.get(12)?,
    email:             row.get(13)?,
    clinician_license: row.get(14)?,
    clinician_name:    row.get(15)?,
  })
}

/// Columns selected for every appointment list row.
const APPOINTMENT_COLUMNS: &str = "
  ap.appointment_id, ap.clinician_id, ap.patient_id, ap.scheduled_at,
  ap.duration_minutes, ap.status, ap.notes, ap.fee, ap.created_at,
  prof.full_name, prof.phone,
  cl_prof.full_name, cl.license";

const APPOINTMENT_JOINS: &str = "
  FROM appointments ap
  LEFT JOIN patients p       ON p.patient_id = ap.patient_id
  LEFT JOIN profiles prof    ON prof.account_id = p.account_id
  LEFT JOIN clinicians cl    ON cl.clinician_id = ap.clinician_id
  LEFT JOIN profiles cl_prof ON cl_prof.account_id = cl.account_id";

fn appointment_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawAppointment> {
  Ok(RawAppointment {
    appointment_id:    row.get(0)?,
    clinician_id:      row.get(1)?,
    patient_id:        row.get(2)?,
    scheduled_at:      row.get(3)?,
    duration_minutes:  row.get(4)?,
    status:            row.get(5)?,
    notes:             row.get(6)?,
    fee:               row.get(7)?,
    created_at:        row.get(8)?,
    patient_name:      row.get(9)?,
    patient_phone:     row.get(10)?,
    clinician_name:    row.get(11)?,
    clinician_license: row.get(12)?,
  })
}

const SCHEDULE_COLUMNS: &str = "
  ap.appointment_id, ap.scheduled_at, ap.status, ap.duration_minutes,
  prof.full_name, cl_prof.full_name";

fn schedule_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawScheduleEntry> {
  Ok(RawScheduleEntry {
    appointment_id:   row.get(0)?,
    scheduled_at:     row.get(1)?,
    status:           row.get(2)?,
    duration_minutes: row.get(3)?,
    patient_name:     row.get(4)?,
    clinician_name:   row.get(5)?,
  })
}

// ─── Row-level helpers (run inside `conn.call`) ──────────────────────────────

fn email_taken(
  conn: &rusqlite::Connection,
  email: &str,
  exclude_account: Option<&str>,
) -> rusqlite::Result<bool> {
  let taken: Option<i64> = match exclude_account {
    Some(acc) => conn
      .query_row(
        "SELECT 1 FROM accounts WHERE email = ?1 AND account_id != ?2",
        rusqlite::params![email, acc],
        |r| r.get(0),
      )
      .optional()?,
    None => conn
      .query_row(
        "SELECT 1 FROM accounts WHERE email = ?1",
        rusqlite::params![email],
        |r| r.get(0),
      )
      .optional()?,
  };
  Ok(taken.is_some())
}

fn clinician_is_active(
  conn: &rusqlite::Connection,
  clinician_id: &str,
) -> rusqlite::Result<bool> {
  let found: Option<i64> = conn
    .query_row(
      "SELECT 1 FROM clinicians WHERE clinician_id = ?1 AND active = 1",
      rusqlite::params![clinician_id],
      |r| r.get(0),
    )
    .optional()?;
  Ok(found.is_some())
}

fn patient_exists(
  conn: &rusqlite::Connection,
  patient_id: &str,
) -> rusqlite::Result<bool> {
  let found: Option<i64> = conn
    .query_row(
      "SELECT 1 FROM patients WHERE patient_id = ?1",
      rusqlite::params![patient_id],
      |r| r.get(0),
    )
    .optional()?;
  Ok(found.is_some())
}

fn insert_account(
  conn: &rusqlite::Connection,
  account_id: &str,
  email: &str,
  password_hash: &str,
  full_name: &str,
  role: Role,
  now: &str,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO accounts (account_id, email, password_hash, full_name, role, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    rusqlite::params![account_id, email, password_hash, full_name, encode_role(role), now],
  )?;
  Ok(())
}

fn insert_profile(
  conn: &rusqlite::Connection,
  account_id: &str,
  full_name: &str,
  phone: Option<&str>,
  tax_id: Option<&str>,
  birth_date: Option<&str>,
  now: &str,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO profiles (profile_id, account_id, full_name, phone, tax_id, birth_date, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
    rusqlite::params![
      encode_uuid(Uuid::new_v4()),
      account_id,
      full_name,
      phone,
      tax_id,
      birth_date,
      now,
    ],
  )?;
  Ok(())
}

// ─── ClinicStore impl ────────────────────────────────────────────────────────

impl ClinicStore for SqliteStore {
  // ── Auth ──────────────────────────────────────────────────────────────────

  async fn find_account_by_email(
    &self,
    email: &str,
  ) -> CoreResult<Option<AccountAuth>> {
    let email = email.to_owned();

    let raw: Option<(RawAccount, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT account_id, email, full_name, role, created_at, password_hash
               FROM accounts WHERE email = ?1",
              rusqlite::params![email],
              |row| {
                Ok((
                  RawAccount {
                    account_id: row.get(0)?,
                    email:      row.get(1)?,
                    full_name:  row.get(2)?,
                    role:       row.get(3)?,
                    created_at: row.get(4)?,
                  },
                  row.get::<_, String>(5)?,
                ))
              },
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::Database)?;

    match raw {
      Some((raw, password_hash)) => Ok(Some(AccountAuth {
        account: raw.into_account()?,
        password_hash,
      })),
      None => Ok(None),
    }
  }

  async fn create_session(&self, account_id: Uuid) -> CoreResult<Session> {
    let session = Session {
      session_id: Uuid::new_v4(),
      account_id,
      token:      Uuid::new_v4().hyphenated().to_string(),
      expires_at: Utc::now() + Duration::days(SESSION_TTL_DAYS),
      created_at: Utc::now(),
    };

    let id_str      = encode_uuid(session.session_id);
    let account_str = encode_uuid(account_id);
    let token       = session.token.clone();
    let expires_str = encode_dt(session.expires_at);
    let created_str = encode_dt(session.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (session_id, account_id, token, expires_at, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, account_str, token, expires_str, created_str],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::Database)?;

    Ok(session)
  }

  async fn resolve_session(&self, token: &str) -> CoreResult<Identity> {
    let token = token.to_owned();

    let raw: Option<(String, String, String, Option<String>)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT s.expires_at, a.account_id, a.role, c.clinician_id
               FROM sessions s
               JOIN accounts a       ON a.account_id = s.account_id
               LEFT JOIN clinicians c ON c.account_id = a.account_id
               WHERE s.token = ?1",
              rusqlite::params![token],
              |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
              },
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::Database)?;

    let Some((expires_at, account_id, role, clinician_id)) = raw else {
      return Err(CoreError::Unauthenticated);
    };

    if decode_dt(&expires_at)? <= Utc::now() {
      return Err(CoreError::SessionExpired);
    }

    Ok(Identity {
      account_id:   crate::encode::decode_uuid(&account_id)?,
      role:         crate::encode::decode_role(&role)?,
      clinician_id: crate::encode::decode_uuid_opt(clinician_id)?,
    })
  }

  async fn session_account(&self, token: &str) -> CoreResult<Account> {
    let token = token.to_owned();

    let raw: Option<(String, RawAccount)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT s.expires_at, a.account_id, a.email, a.full_name, a.role, a.created_at
               FROM sessions s
               JOIN accounts a ON a.account_id = s.account_id
               WHERE s.token = ?1",
              rusqlite::params![token],
              |row| {
                Ok((
                  row.get::<_, String>(0)?,
                  RawAccount {
                    account_id: row.get(1)?,
                    email:      row.get(2)?,
                    full_name:  row.get(3)?,
                    role:       row.get(4)?,
                    created_at: row.get(5)?,
                  },
                ))
              },
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::Database)?;

    let Some((expires_at, raw)) = raw else {
      return Err(CoreError::Unauthenticated);
    };

    if decode_dt(&expires_at)? <= Utc::now() {
      return Err(CoreError::SessionExpired);
    }

    Ok(raw.into_account()?)
  }

  async fn delete_session(&self, token: &str) -> CoreResult<()> {
    let token = token.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM sessions WHERE token = ?1",
          rusqlite::params![token],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::Database)?;
    Ok(())
  }

  async fn register_patient_account(
    &self,
    reg: NewRegistration,
  ) -> CoreResult<Uuid> {
    let account_id  = Uuid::new_v4();
    let account_str = encode_uuid(account_id);
    let now         = encode_dt(Utc::now());

    let inner: CoreResult<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if email_taken(&tx, &reg.email, None)? {
          return Ok(Err(CoreError::Validation(
            "email already registered".to_string(),
          )));
        }

        insert_account(
          &tx,
          &account_str,
          &reg.email,
          &reg.password_hash,
          &reg.full_name,
          Role::Patient,
          &now,
        )?;
        insert_profile(&tx, &account_str, &reg.full_name, None, None, None, &now)?;
        tx.execute(
          "INSERT INTO patients (patient_id, account_id, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?3)",
          rusqlite::params![encode_uuid(Uuid::new_v4()), account_str, now],
        )?;

        tx.commit()?;
        Ok(Ok(()))
      })
      .await
      .map_err(Error::Database)?;

    inner?;
    Ok(account_id)
  }

  async fn seed_admin(
    &self,
    email: &str,
    full_name: &str,
    password_hash: &str,
  ) -> CoreResult<bool> {
    let email         = email.to_owned();
    let full_name     = full_name.to_owned();
    let password_hash = password_hash.to_owned();
    let now           = encode_dt(Utc::now());

    let created: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if email_taken(&tx, &email, None)? {
          return Ok(false);
        }

        let account_str = encode_uuid(Uuid::new_v4());
        insert_account(
          &tx,
          &account_str,
          &email,
          &password_hash,
          &full_name,
          Role::Admin,
          &now,
        )?;
        insert_profile(&tx, &account_str, &full_name, None, None, None, &now)?;

        tx.commit()?;
        Ok(true)
      })
      .await
      .map_err(Error::Database)?;

    Ok(created)
  }

  // ── Patients ──────────────────────────────────────────────────────────────

  async fn list_patients(&self, scope: Scope) -> CoreResult<Vec<Patient>> {
    let raws: Vec<RawPatient> = self
      .conn
      .call(move |conn| {
        let rows = match scope {
          Scope::Clinician(id) => {
            let sql = format!(
              "SELECT DISTINCT {PATIENT_COLUMNS} {PATIENT_JOINS}
               LEFT JOIN appointments ap ON ap.patient_id = p.patient_id
               WHERE p.clinician_id = ?1 OR ap.clinician_id = ?1
               ORDER BY p.created_at DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            stmt
              .query_map(rusqlite::params![encode_uuid(id)], patient_from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
          Scope::All => {
            let sql = format!(
              "SELECT {PATIENT_COLUMNS} {PATIENT_JOINS}
               ORDER BY p.created_at DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            stmt
              .query_map([], patient_from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
        };
        Ok(rows)
      })
      .await
      .map_err(Error::Database)?;

    raws
      .into_iter()
      .map(|r| r.into_patient().map_err(Into::into))
      .collect()
  }

  async fn create_patient(&self, new: NewPatient) -> CoreResult<PatientCreated> {
    let created = PatientCreated {
      patient_id: Uuid::new_v4(),
      account_id: Uuid::new_v4(),
    };
    let patient_str = encode_uuid(created.patient_id);
    let account_str = encode_uuid(created.account_id);
    let now         = encode_dt(Utc::now());

    let inner: CoreResult<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if let Some(clinician_id) = new.clinician_id {
          if !clinician_is_active(&tx, &encode_uuid(clinician_id))? {
            return Ok(Err(CoreError::Validation(
              "clinician not found or inactive".to_string(),
            )));
          }
        }

        if email_taken(&tx, &new.email, None)? {
          return Ok(Err(CoreError::Validation(
            "email already registered".to_string(),
          )));
        }

        insert_account(
          &tx,
          &account_str,
          &new.email,
          &new.password_hash,
          &new.full_name,
          Role::Patient,
          &now,
        )?;
        insert_profile(
          &tx,
          &account_str,
          &new.full_name,
          new.phone.as_deref(),
          new.tax_id.as_deref(),
          new.birth_date.map(encode_date).as_deref(),
          &now,
        )?;
        tx.execute(
          "INSERT INTO patients (
             patient_id, account_id, clinician_id, address, emergency_contact,
             insurance, notes, medication, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
          rusqlite::params![
            patient_str,
            account_str,
            new.clinician_id.map(encode_uuid),
            new.address,
            new.emergency_contact,
            new.insurance,
            new.notes,
            new.medication,
            now,
          ],
        )?;

        tx.commit()?;
        Ok(Ok(()))
      })
      .await
      .map_err(Error::Database)?;

    inner?;
    Ok(created)
  }

  async fn update_patient(
    &self,
    patient_id: Uuid,
    update: PatientUpdate,
  ) -> CoreResult<()> {
    let id_str = encode_uuid(patient_id);
    let now    = encode_dt(Utc::now());

    let inner: CoreResult<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        type PatientRow =
          (String, Option<String>, Option<String>, Option<String>, Option<String>, Option<String>, Option<String>);
        let current: Option<PatientRow> = tx
          .query_row(
            "SELECT account_id, clinician_id, address, emergency_contact,
                    insurance, notes, medication
             FROM patients WHERE patient_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok((
                row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?,
                row.get(4)?, row.get(5)?, row.get(6)?,
              ))
            },
          )
          .optional()?;

        let Some((
          account_id, cur_clinician, cur_address, cur_emergency,
          cur_insurance, cur_notes, cur_medication,
        )) = current
        else {
          return Ok(Err(CoreError::NotFound("patient".to_string())));
        };

        if let Some(email) = &update.email {
          if email_taken(&tx, email, Some(&account_id))? {
            return Ok(Err(CoreError::Validation(
              "email already registered to another account".to_string(),
            )));
          }
          tx.execute(
            "UPDATE accounts SET email = ?1 WHERE account_id = ?2",
            rusqlite::params![email, account_id],
          )?;
        }

        if let Some(new_id) = update.clinician_id.set() {
          if !clinician_is_active(&tx, &encode_uuid(*new_id))? {
            return Ok(Err(CoreError::Validation(
              "clinician not found or inactive".to_string(),
            )));
          }
        }

        // Profile fields.
        let (cur_name, cur_phone, cur_tax, cur_birth): (
          String, Option<String>, Option<String>, Option<String>,
        ) = tx.query_row(
          "SELECT full_name, phone, tax_id, birth_date FROM profiles WHERE account_id = ?1",
          rusqlite::params![account_id],
          |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        let full_name = update.full_name.clone().unwrap_or(cur_name);
        tx.execute(
          "UPDATE profiles
           SET full_name = ?1, phone = ?2, tax_id = ?3, birth_date = ?4, updated_at = ?5
           WHERE account_id = ?6",
          rusqlite::params![
            full_name,
            resolve_text(update.phone, cur_phone),
            resolve_text(update.tax_id, cur_tax),
            resolve_date(update.birth_date, cur_birth),
            now,
            account_id,
          ],
        )?;
        if let Some(name) = &update.full_name {
          tx.execute(
            "UPDATE accounts SET full_name = ?1 WHERE account_id = ?2",
            rusqlite::params![name, account_id],
          )?;
        }

        tx.execute(
          "UPDATE patients
           SET clinician_id = ?1, address = ?2, emergency_contact = ?3,
               insurance = ?4, notes = ?5, medication = ?6, updated_at = ?7
           WHERE patient_id = ?8",
          rusqlite::params![
            resolve_id(update.clinician_id, cur_clinician),
            resolve_text(update.address, cur_address),
            resolve_text(update.emergency_contact, cur_emergency),
            resolve_text(update.insurance, cur_insurance),
            resolve_text(update.notes, cur_notes),
            resolve_text(update.medication, cur_medication),
            now,
            id_str,
          ],
        )?;

        tx.commit()?;
        Ok(Ok(()))
      })
      .await
      .map_err(Error::Database)?;

    inner
  }

  async fn delete_patient(&self, patient_id: Uuid) -> CoreResult<()> {
    let id_str = encode_uuid(patient_id);

    let inner: CoreResult<()> = self
      .conn
      .call(move |conn| {
        let account_id: Option<String> = conn
          .query_row(
            "SELECT account_id FROM patients WHERE patient_id = ?1",
            rusqlite::params![id_str],
            |r| r.get(0),
          )
          .optional()?;

        let Some(account_id) = account_id else {
          return Ok(Err(CoreError::NotFound("patient".to_string())));
        };

        // Cascade removes profile, patient row, appointments, and records;
        // transactions survive with appointment_id nulled.
        conn.execute(
          "DELETE FROM accounts WHERE account_id = ?1",
          rusqlite::params![account_id],
        )?;
        Ok(Ok(()))
      })
      .await
      .map_err(Error::Database)?;

    inner
  }

  // ── Clinicians ────────────────────────────────────────────────────────────

  async fn list_clinicians(&self) -> CoreResult<Vec<Clinician>> {
    let raws: Vec<RawClinician> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT c.clinician_id, c.account_id, c.license, c.specialty, c.bio,
                  c.session_fee, c.active, c.created_at,
                  prof.full_name, prof.phone, a.email
           FROM clinicians c
           JOIN profiles prof ON prof.account_id = c.account_id
           JOIN accounts a    ON a.account_id = c.account_id
           ORDER BY prof.full_name",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawClinician {
              clinician_id: row.get(0)?,
              account_id:   row.get(1)?,
              license:      row.get(2)?,
              specialty:    row.get(3)?,
              bio:          row.get(4)?,
              session_fee:  row.get(5)?,
              active:       row.get(6)?,
              created_at:   row.get(7)?,
              full_name:    row.get(8)?,
              phone:        row.get(9)?,
              email:        row.get(10)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::Database)?;

    raws
      .into_iter()
      .map(|r| r.into_clinician().map_err(Into::into))
      .collect()
  }

  async fn create_clinician(
    &self,
    new: NewClinician,
  ) -> CoreResult<ClinicianCreated> {
    let created = ClinicianCreated {
      clinician_id: Uuid::new_v4(),
      account_id:   Uuid::new_v4(),
    };
    let clinician_str = encode_uuid(created.clinician_id);
    let account_str   = encode_uuid(created.account_id);
    let now           = encode_dt(Utc::now());

    let inner: CoreResult<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if email_taken(&tx, &new.email, None)? {
          return Ok(Err(CoreError::Validation(
            "email already registered".to_string(),
          )));
        }

        let license_taken: Option<i64> = tx
          .query_row(
            "SELECT 1 FROM clinicians WHERE license = ?1",
            rusqlite::params![new.license],
            |r| r.get(0),
          )
          .optional()?;
        if license_taken.is_some() {
          return Ok(Err(CoreError::Validation(
            "license already registered".to_string(),
          )));
        }

        insert_account(
          &tx,
          &account_str,
          &new.email,
          &new.password_hash,
          &new.full_name,
          Role::Clinician,
          &now,
        )?;
        insert_profile(
          &tx,
          &account_str,
          &new.full_name,
          new.phone.as_deref(),
          None,
          None,
          &now,
        )?;
        tx.execute(
          "INSERT INTO clinicians (
             clinician_id, account_id, license, specialty, bio, session_fee,
             active, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)",
          rusqlite::params![
            clinician_str,
            account_str,
            new.license,
            new.specialty,
            new.bio,
            new.session_fee,
            now,
          ],
        )?;

        tx.commit()?;
        Ok(Ok(()))
      })
      .await
      .map_err(Error::Database)?;

    inner?;
    Ok(created)
  }

  async fn update_clinician(
    &self,
    clinician_id: Uuid,
    update: ClinicianUpdate,
    password_hash: Option<String>,
  ) -> CoreResult<()> {
    let id_str = encode_uuid(clinician_id);
    let now    = encode_dt(Utc::now());

    let inner: CoreResult<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        type ClinicianRow =
          (String, String, Option<String>, Option<String>, Option<f64>, i64);
        let current: Option<ClinicianRow> = tx
          .query_row(
            "SELECT account_id, license, specialty, bio, session_fee, active
             FROM clinicians WHERE clinician_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok((
                row.get(0)?, row.get(1)?, row.get(2)?,
                row.get(3)?, row.get(4)?, row.get(5)?,
              ))
            },
          )
          .optional()?;

        let Some((account_id, cur_license, cur_specialty, cur_bio, cur_fee, cur_active)) =
          current
        else {
          return Ok(Err(CoreError::NotFound("clinician".to_string())));
        };

        if let Some(email) = &update.email {
          if email_taken(&tx, email, Some(&account_id))? {
            return Ok(Err(CoreError::Validation(
              "email already registered to another account".to_string(),
            )));
          }
          tx.execute(
            "UPDATE accounts SET email = ?1 WHERE account_id = ?2",
            rusqlite::params![email, account_id],
          )?;
        }

        if let Some(license) = &update.license {
          let taken: Option<i64> = tx
            .query_row(
              "SELECT 1 FROM clinicians WHERE license = ?1 AND clinician_id != ?2",
              rusqlite::params![license, id_str],
              |r| r.get(0),
            )
            .optional()?;
          if taken.is_some() {
            return Ok(Err(CoreError::Validation(
              "license already registered to another clinician".to_string(),
            )));
          }
        }

        if let Some(hash) = &password_hash {
          tx.execute(
            "UPDATE accounts SET password_hash = ?1 WHERE account_id = ?2",
            rusqlite::params![hash, account_id],
          )?;
        }

        let (cur_name, cur_phone): (String, Option<String>) = tx.query_row(
          "SELECT full_name, phone FROM profiles WHERE account_id = ?1",
          rusqlite::params![account_id],
          |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let full_name = update.full_name.clone().unwrap_or(cur_name);
        tx.execute(
          "UPDATE profiles SET full_name = ?1, phone = ?2, updated_at = ?3
           WHERE account_id = ?4",
          rusqlite::params![
            full_name,
            resolve_text(update.phone, cur_phone),
            now,
            account_id,
          ],
        )?;
        if let Some(name) = &update.full_name {
          tx.execute(
            "UPDATE accounts SET full_name = ?1 WHERE account_id = ?2",
            rusqlite::params![name, account_id],
          )?;
        }

        tx.execute(
          "UPDATE clinicians
           SET license = ?1, specialty = ?2, bio = ?3, session_fee = ?4,
               active = ?5, updated_at = ?6
           WHERE clinician_id = ?7",
          rusqlite::params![
            update.license.clone().unwrap_or(cur_license),
            resolve_text(update.specialty, cur_specialty),
            resolve_text(update.bio, cur_bio),
            resolve_f64(update.session_fee, cur_fee),
            update.active.map(i64::from).unwrap_or(cur_active),
            now,
            id_str,
          ],
        )?;

        tx.commit()?;
        Ok(Ok(()))
      })
      .await
      .map_err(Error::Database)?;

    inner
  }

  // ── Appointments ──────────────────────────────────────────────────────────

  async fn list_appointments(&self, scope: Scope) -> CoreResult<Vec<Appointment>> {
    let raws: Vec<RawAppointment> = self
      .conn
      .call(move |conn| {
        let rows = match scope {
          Scope::Clinician(id) => {
            let sql = format!(
              "SELECT {APPOINTMENT_COLUMNS} {APPOINTMENT_JOINS}
               WHERE ap.clinician_id = ?1
               ORDER BY ap.scheduled_at DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            stmt
              .query_map(rusqlite::params![encode_uuid(id)], appointment_from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
          Scope::All => {
            let sql = format!(
              "SELECT {APPOINTMENT_COLUMNS} {APPOINTMENT_JOINS}
               ORDER BY ap.scheduled_at DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            stmt
              .query_map([], appointment_from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
        };
        Ok(rows)
      })
      .await
      .map_err(Error::Database)?;

    raws
      .into_iter()
      .map(|r| r.into_appointment().map_err(Into::into))
      .collect()
  }

  async fn create_appointment(&self, new: NewAppointment) -> CoreResult<Uuid> {
    let appointment_id  = Uuid::new_v4();
    let appointment_str = encode_uuid(appointment_id);
    let now             = encode_dt(Utc::now());

    let inner: CoreResult<()> = self
      .conn
      .call(move |conn| {
        let tx            = conn.transaction()?;
        let patient_str   = encode_uuid(new.patient_id);
        let clinician_str = encode_uuid(new.clinician_id);

        if !patient_exists(&tx, &patient_str)? {
          return Ok(Err(CoreError::Validation(
            "patient not found".to_string(),
          )));
        }
        if !clinician_is_active(&tx, &clinician_str)? {
          return Ok(Err(CoreError::Validation(
            "clinician not found or inactive".to_string(),
          )));
        }

        // First-writer-wins: assign this clinician iff the patient has none.
        // The WHERE clause keeps an existing assignment untouched.
        tx.execute(
          "UPDATE patients SET clinician_id = ?1, updated_at = ?2
           WHERE patient_id = ?3 AND clinician_id IS NULL",
          rusqlite::params![clinician_str, now, patient_str],
        )?;

        tx.execute(
          "INSERT INTO appointments (
             appointment_id, clinician_id, patient_id, scheduled_at,
             duration_minutes, status, notes, fee, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, 'scheduled', ?6, ?7, ?8, ?8)",
          rusqlite::params![
            appointment_str,
            clinician_str,
            patient_str,
            encode_dt(new.scheduled_at),
            new.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES),
            new.notes,
            new.fee,
            now,
          ],
        )?;

        tx.commit()?;
        Ok(Ok(()))
      })
      .await
      .map_err(Error::Database)?;

    inner?;
    Ok(appointment_id)
  }

  async fn update_appointment_status(
    &self,
    appointment_id: Uuid,
    status: AppointmentStatus,
    identity: &Identity,
  ) -> CoreResult<()> {
    let id_str   = encode_uuid(appointment_id);
    let identity = *identity;
    let now      = encode_dt(Utc::now());
    let today    = encode_date(Utc::now().date_naive());

    let inner: CoreResult<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let current: Option<(String, String, Option<f64>)> = tx
          .query_row(
            "SELECT clinician_id, status, fee FROM appointments
             WHERE appointment_id = ?1",
            rusqlite::params![id_str],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
          )
          .optional()?;

        let Some((clinician_str, status_str, fee)) = current else {
          return Ok(Err(CoreError::NotFound("appointment".to_string())));
        };

        if identity.role == Role::Clinician {
          match identity.clinician_id {
            None => {
              return Ok(Err(CoreError::Forbidden(
                "no clinician record for this account".to_string(),
              )));
            }
            Some(own) if encode_uuid(own) != clinician_str => {
              return Ok(Err(CoreError::Forbidden(
                "not allowed to modify this appointment".to_string(),
              )));
            }
            Some(_) => {}
          }
        }

        let current_status = match decode_status(&status_str) {
          Ok(s) => s,
          Err(e) => return Ok(Err(e.into())),
        };
        if !current_status.can_transition_to(status) {
          return Ok(Err(CoreError::Validation(format!(
            "illegal status transition: {} -> {}",
            encode_status(current_status),
            encode_status(status),
          ))));
        }

        tx.execute(
          "UPDATE appointments SET status = ?1, updated_at = ?2
           WHERE appointment_id = ?3",
          rusqlite::params![encode_status(status), now, id_str],
        )?;

        // Completion side effect: one income transaction per appointment.
        // OR IGNORE against the partial unique index makes repeated or
        // concurrent completions a no-op instead of a double insert.
        if status == AppointmentStatus::Completed {
          if let Some(fee) = fee {
            tx.execute(
              "INSERT OR IGNORE INTO transactions (
                 transaction_id, appointment_id, clinician_id, kind,
                 description, amount, entry_date, status, auto_generated,
                 created_at, updated_at
               ) VALUES (?1, ?2, ?3, 'income', ?4, ?5, ?6, 'paid', 1, ?7, ?7)",
              rusqlite::params![
                encode_uuid(Uuid::new_v4()),
                id_str,
                clinician_str,
                AUTO_TRANSACTION_DESCRIPTION,
                fee,
                today,
                now,
              ],
            )?;
          }
        }

        tx.commit()?;
        Ok(Ok(()))
      })
      .await
      .map_err(Error::Database)?;

    inner
  }

  // ── Clinical records ──────────────────────────────────────────────────────

  async fn list_patient_records(
    &self,
    patient_id: Uuid,
    scope: Scope,
  ) -> CoreResult<Vec<ClinicalRecord>> {
    let patient_str = encode_uuid(patient_id);

    const RECORD_COLUMNS: &str = "
      r.record_id, r.patient_id, r.clinician_id, r.appointment_id,
      r.session_date, r.kind, r.notes, r.progress, r.plan, r.next_session,
      r.created_by, r.created_at, r.updated_at,
      cl_prof.full_name, author_prof.full_name";
    const RECORD_JOINS: &str = "
      FROM clinical_records r
      LEFT JOIN clinicians cl        ON cl.clinician_id = r.clinician_id
      LEFT JOIN profiles cl_prof     ON cl_prof.account_id = cl.account_id
      LEFT JOIN profiles author_prof ON author_prof.account_id = r.created_by";

    fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRecord> {
      Ok(RawRecord {
        record_id:      row.get(0)?,
        patient_id:     row.get(1)?,
        clinician_id:   row.get(2)?,
        appointment_id: row.get(3)?,
        session_date:   row.get(4)?,
        kind:           row.get(5)?,
        notes:          row.get(6)?,
        progress:       row.get(7)?,
        plan:           row.get(8)?,
        next_session:   row.get(9)?,
        created_by:     row.get(10)?,
        created_at:     row.get(11)?,
        updated_at:     row.get(12)?,
        clinician_name: row.get(13)?,
        author_name:    row.get(14)?,
      })
    }

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let rows = match scope {
          Scope::Clinician(id) => {
            let sql = format!(
              "SELECT {RECORD_COLUMNS} {RECORD_JOINS}
               WHERE r.patient_id = ?1 AND r.clinician_id = ?2
               ORDER BY r.session_date DESC, r.created_at DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            stmt
              .query_map(
                rusqlite::params![patient_str, encode_uuid(id)],
                record_from_row,
              )?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
          Scope::All => {
            let sql = format!(
              "SELECT {RECORD_COLUMNS} {RECORD_JOINS}
               WHERE r.patient_id = ?1
               ORDER BY r.session_date DESC, r.created_at DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            stmt
              .query_map(rusqlite::params![patient_str], record_from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
        };
        Ok(rows)
      })
      .await
      .map_err(Error::Database)?;

    raws
      .into_iter()
      .map(|r| r.into_record().map_err(Into::into))
      .collect()
  }

  async fn create_record(
    &self,
    new: NewClinicalRecord,
    identity: &Identity,
  ) -> CoreResult<Uuid> {
    let record_id  = Uuid::new_v4();
    let record_str = encode_uuid(record_id);
    let author_str = encode_uuid(identity.account_id);
    let identity   = *identity;
    let now        = encode_dt(Utc::now());

    let inner: CoreResult<()> = self
      .conn
      .call(move |conn| {
        let tx            = conn.transaction()?;
        let patient_str   = encode_uuid(new.patient_id);
        let clinician_str = encode_uuid(new.clinician_id);

        if !patient_exists(&tx, &patient_str)? {
          return Ok(Err(CoreError::Validation(
            "patient not found".to_string(),
          )));
        }
        if !clinician_is_active(&tx, &clinician_str)? {
          return Ok(Err(CoreError::Validation(
            "clinician not found or inactive".to_string(),
          )));
        }
        if identity.role == Role::Clinician
          && identity.clinician_id != Some(new.clinician_id)
        {
          return Ok(Err(CoreError::Forbidden(
            "clinicians may only author records under their own id".to_string(),
          )));
        }

        tx.execute(
          "INSERT INTO clinical_records (
             record_id, patient_id, clinician_id, appointment_id, session_date,
             kind, notes, progress, plan, next_session, created_by,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
          rusqlite::params![
            record_str,
            patient_str,
            clinician_str,
            new.appointment_id.map(encode_uuid),
            encode_date(new.session_date),
            new.kind.as_deref().unwrap_or(DEFAULT_RECORD_KIND),
            new.notes,
            new.progress,
            new.plan,
            new.next_session,
            author_str,
            now,
          ],
        )?;

        tx.commit()?;
        Ok(Ok(()))
      })
      .await
      .map_err(Error::Database)?;

    inner?;
    Ok(record_id)
  }

  async fn update_record(
    &self,
    record_id: Uuid,
    update: ClinicalRecordUpdate,
    identity: &Identity,
  ) -> CoreResult<()> {
    let id_str   = encode_uuid(record_id);
    let identity = *identity;
    let now      = encode_dt(Utc::now());

    let inner: CoreResult<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        type RecordRow = (
          String, String, Option<String>, Option<String>, Option<String>, Option<String>,
        );
        let current: Option<RecordRow> = tx
          .query_row(
            "SELECT clinician_id, created_by, notes, progress, plan, next_session
             FROM clinical_records WHERE record_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok((
                row.get(0)?, row.get(1)?, row.get(2)?,
                row.get(3)?, row.get(4)?, row.get(5)?,
              ))
            },
          )
          .optional()?;

        let Some((clinician_str, created_by, cur_notes, cur_progress, cur_plan, cur_next)) =
          current
        else {
          return Ok(Err(CoreError::NotFound("clinical record".to_string())));
        };

        if identity.role == Role::Clinician {
          let owns = identity.clinician_id.map(encode_uuid).as_deref()
            == Some(clinician_str.as_str());
          let authored = encode_uuid(identity.account_id) == created_by;
          if !owns && !authored {
            return Ok(Err(CoreError::Forbidden(
              "not allowed to edit this record".to_string(),
            )));
          }
        }

        tx.execute(
          "UPDATE clinical_records
           SET notes = ?1, progress = ?2, plan = ?3, next_session = ?4,
               updated_at = ?5
           WHERE record_id = ?6",
          rusqlite::params![
            resolve_text(update.notes, cur_notes),
            resolve_text(update.progress, cur_progress),
            resolve_text(update.plan, cur_plan),
            resolve_text(update.next_session, cur_next),
            now,
            id_str,
          ],
        )?;

        tx.commit()?;
        Ok(Ok(()))
      })
      .await
      .map_err(Error::Database)?;

    inner
  }

  // ── Financial ─────────────────────────────────────────────────────────────

  async fn financial_report(&self, query: &ReportQuery) -> CoreResult<FinancialReport> {
    let from      = query.from.map(encode_date);
    let to        = query.to.map(encode_date);
    let clinician = query.clinician_id.map(encode_uuid);

    type RawReportRow = (String, String, f64, f64, i64, i64);
    let (income, expense, rows): (ReportSide, ReportSide, Vec<RawReportRow>) = self
      .conn
      .call(move |conn| {
        let side = |kind: &str| -> rusqlite::Result<ReportSide> {
          conn.query_row(
            "SELECT COALESCE(SUM(amount), 0), COUNT(*)
             FROM transactions
             WHERE kind = ?1 AND status = 'paid'
               AND (?2 IS NULL OR entry_date >= ?2)
               AND (?3 IS NULL OR entry_date <= ?3)
               AND (?4 IS NULL OR clinician_id = ?4)",
            rusqlite::params![kind, from, to, clinician],
            |row| {
              Ok(ReportSide {
                total: row.get(0)?,
                count: row.get::<_, i64>(1)? as u32,
              })
            },
          )
        };

        let income  = side("income")?;
        let expense = side("expense")?;

        let mut stmt = conn.prepare(
          "SELECT t.clinician_id, prof.full_name,
                  COALESCE(SUM(CASE WHEN t.kind = 'income'  THEN t.amount ELSE 0 END), 0),
                  COALESCE(SUM(CASE WHEN t.kind = 'expense' THEN t.amount ELSE 0 END), 0),
                  COUNT(CASE WHEN t.kind = 'income'  THEN t.transaction_id END),
                  COUNT(CASE WHEN t.kind = 'expense' THEN t.transaction_id END)
           FROM transactions t
           JOIN clinicians c  ON c.clinician_id = t.clinician_id
           JOIN profiles prof ON prof.account_id = c.account_id
           WHERE t.status = 'paid'
             AND (?1 IS NULL OR t.entry_date >= ?1)
             AND (?2 IS NULL OR t.entry_date <= ?2)
             AND (?3 IS NULL OR t.clinician_id = ?3)
           GROUP BY t.clinician_id, prof.full_name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![from, to, clinician], |row| {
            Ok((
              row.get(0)?, row.get(1)?, row.get(2)?,
              row.get(3)?, row.get(4)?, row.get(5)?,
            ))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((income, expense, rows))
      })
      .await
      .map_err(Error::Database)?;

    let per_clinician = rows
      .into_iter()
      .map(|(id, name, inc, exp, inc_n, exp_n)| {
        Ok(ClinicianReportRow {
          clinician_id:   crate::encode::decode_uuid(&id)?,
          clinician_name: name,
          income_total:   inc,
          expense_total:  exp,
          income_count:   inc_n as u32,
          expense_count:  exp_n as u32,
        })
      })
      .collect::<crate::Result<Vec<_>>>()?;

    Ok(FinancialReport {
      income,
      expense,
      balance: income.total - expense.total,
      per_clinician,
    })
  }

  async fn list_transactions(
    &self,
    filter: &TransactionFilter,
  ) -> CoreResult<Vec<Transaction>> {
    let from      = filter.from.map(encode_date);
    let to        = filter.to.map(encode_date);
    let kind      = filter.kind.map(encode_tx_kind);
    let clinician = filter.clinician_id.map(encode_uuid);

    let raws: Vec<RawTransaction> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT t.transaction_id, t.appointment_id, t.clinician_id, t.kind,
                  t.description, t.amount, t.entry_date, t.status, t.notes,
                  t.auto_generated, t.created_at,
                  prof.full_name, ap.scheduled_at
           FROM transactions t
           LEFT JOIN clinicians c     ON c.clinician_id = t.clinician_id
           LEFT JOIN profiles prof    ON prof.account_id = c.account_id
           LEFT JOIN appointments ap  ON ap.appointment_id = t.appointment_id
           WHERE (?1 IS NULL OR t.entry_date >= ?1)
             AND (?2 IS NULL OR t.entry_date <= ?2)
             AND (?3 IS NULL OR t.kind = ?3)
             AND (?4 IS NULL OR t.clinician_id = ?4)
           ORDER BY t.entry_date DESC, t.created_at DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![from, to, kind, clinician], |row| {
            Ok(RawTransaction {
              transaction_id:   row.get(0)?,
              appointment_id:   row.get(1)?,
              clinician_id:     row.get(2)?,
              kind:             row.get(3)?,
              description:      row.get(4)?,
              amount:           row.get(5)?,
              entry_date:       row.get(6)?,
              status:           row.get(7)?,
              notes:            row.get(8)?,
              auto_generated:   row.get(9)?,
              created_at:       row.get(10)?,
              clinician_name:   row.get(11)?,
              appointment_time: row.get(12)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::Database)?;

    raws
      .into_iter()
      .map(|r| r.into_transaction().map_err(Into::into))
      .collect()
  }

  async fn create_transaction(&self, new: NewTransaction) -> CoreResult<Uuid> {
    let transaction_id = Uuid::new_v4();
    let id_str         = encode_uuid(transaction_id);
    let now            = encode_dt(Utc::now());
    let today          = encode_date(Utc::now().date_naive());

    let inner: CoreResult<()> = self
      .conn
      .call(move |conn| {
        let clinician_str = encode_uuid(new.clinician_id);

        // Manual entries can target inactive clinicians (e.g. settling old
        // balances); only existence is required.
        let found: Option<i64> = conn
          .query_row(
            "SELECT 1 FROM clinicians WHERE clinician_id = ?1",
            rusqlite::params![clinician_str],
            |r| r.get(0),
          )
          .optional()?;
        if found.is_none() {
          return Ok(Err(CoreError::Validation(
            "clinician not found".to_string(),
          )));
        }

        conn.execute(
          "INSERT INTO transactions (
             transaction_id, appointment_id, clinician_id, kind, description,
             amount, entry_date, status, notes, auto_generated,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, ?10, ?10)",
          rusqlite::params![
            id_str,
            new.appointment_id.map(encode_uuid),
            clinician_str,
            encode_tx_kind(new.kind.unwrap_or(TransactionKind::Income)),
            new.description,
            new.amount,
            new.entry_date.map(encode_date).unwrap_or(today),
            encode_tx_status(new.status.unwrap_or(TransactionStatus::Pending)),
            new.notes,
            now,
          ],
        )?;
        Ok(Ok(()))
      })
      .await
      .map_err(Error::Database)?;

    inner?;
    Ok(transaction_id)
  }

  // ── Dashboard ─────────────────────────────────────────────────────────────

  async fn dashboard_stats(&self, scope: Scope) -> CoreResult<DashboardStats> {
    let today = encode_date(Utc::now().date_naive());

    let stats: DashboardStats = self
      .conn
      .call(move |conn| {
        let count = |sql: &str, params: &[&dyn rusqlite::ToSql]| -> rusqlite::Result<u32> {
          conn
            .query_row(sql, params, |r| r.get::<_, i64>(0))
            .map(|n| n as u32)
        };

        let stats = match scope {
          Scope::Clinician(id) => {
            let id_str = encode_uuid(id);
            DashboardStats {
              total_clinicians:   0,
              total_patients:     count(
                "SELECT COUNT(DISTINCT p.patient_id)
                 FROM patients p
                 LEFT JOIN appointments ap ON ap.patient_id = p.patient_id
                 WHERE p.clinician_id = ?1 OR ap.clinician_id = ?1",
                &[&id_str],
              )?,
              total_appointments: count(
                "SELECT COUNT(*) FROM appointments WHERE clinician_id = ?1",
                &[&id_str],
              )?,
              appointments_today: count(
                "SELECT COUNT(*) FROM appointments
                 WHERE clinician_id = ?1 AND date(scheduled_at) = ?2",
                &[&id_str, &today],
              )?,
            }
          }
          Scope::All => DashboardStats {
            total_clinicians:   count(
              "SELECT COUNT(*) FROM clinicians WHERE active = 1",
              &[],
            )?,
            total_patients:     count("SELECT COUNT(*) FROM patients", &[])?,
            total_appointments: count("SELECT COUNT(*) FROM appointments", &[])?,
            appointments_today: count(
              "SELECT COUNT(*) FROM appointments WHERE date(scheduled_at) = ?1",
              &[&today],
            )?,
          },
        };
        Ok(stats)
      })
      .await
      .map_err(Error::Database)?;

    Ok(stats)
  }

  async fn today_schedule(&self, scope: Scope) -> CoreResult<Vec<ScheduleEntry>> {
    let today = encode_date(Utc::now().date_naive());

    let raws: Vec<RawScheduleEntry> = self
      .conn
      .call(move |conn| {
        let rows = match scope {
          Scope::Clinician(id) => {
            let sql = format!(
              "SELECT {SCHEDULE_COLUMNS} {APPOINTMENT_JOINS}
               WHERE ap.clinician_id = ?1 AND date(ap.scheduled_at) = ?2
               ORDER BY ap.scheduled_at ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            stmt
              .query_map(
                rusqlite::params![encode_uuid(id), today],
                schedule_from_row,
              )?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
          Scope::All => {
            let sql = format!(
              "SELECT {SCHEDULE_COLUMNS} {APPOINTMENT_JOINS}
               WHERE date(ap.scheduled_at) = ?1
               ORDER BY ap.scheduled_at ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            stmt
              .query_map(rusqlite::params![today], schedule_from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
        };
        Ok(rows)
      })
      .await
      .map_err(Error::Database)?;

    raws
      .into_iter()
      .map(|r| r.into_entry().map_err(Into::into))
      .collect()
  }

  async fn upcoming_schedule(&self, scope: Scope) -> CoreResult<Vec<ScheduleEntry>> {
    let now = encode_dt(Utc::now());

    let raws: Vec<RawScheduleEntry> = self
      .conn
      .call(move |conn| {
        let rows = match scope {
          Scope::Clinician(id) => {
            let sql = format!(
              "SELECT {SCHEDULE_COLUMNS} {APPOINTMENT_JOINS}
               WHERE ap.clinician_id = ?1 AND ap.scheduled_at >= ?2
               ORDER BY ap.scheduled_at ASC
               LIMIT 10"
            );
            let mut stmt = conn.prepare(&sql)?;
            stmt
              .query_map(
                rusqlite::params![encode_uuid(id), now],
                schedule_from_row,
              )?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
          Scope::All => {
            let sql = format!(
              "SELECT {SCHEDULE_COLUMNS} {APPOINTMENT_JOINS}
               WHERE ap.scheduled_at >= ?1
               ORDER BY ap.scheduled_at ASC
               LIMIT 10"
            );
            let mut stmt = conn.prepare(&sql)?;
            stmt
              .query_map(rusqlite::params![now], schedule_from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
        };
        Ok(rows)
      })
      .await
      .map_err(Error::Database)?;

    raws
      .into_iter()
      .map(|r| r.into_entry().map_err(Into::into))
      .collect()
  }

  async fn recent_patients(
    &self,
    clinician_id: Uuid,
  ) -> CoreResult<Vec<PatientSummary>> {
    let id_str = encode_uuid(clinician_id);

    let raws: Vec<RawPatientSummary> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT p.patient_id, p.account_id, prof.full_name,
                  prof.tax_id, prof.phone, p.insurance, p.created_at
           FROM patients p
           JOIN profiles prof ON prof.account_id = p.account_id
           LEFT JOIN appointments ap ON ap.patient_id = p.patient_id
           WHERE p.clinician_id = ?1 OR ap.clinician_id = ?1
           ORDER BY p.created_at DESC
           LIMIT 10",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawPatientSummary {
              patient_id: row.get(0)?,
              account_id: row.get(1)?,
              full_name:  row.get(2)?,
              tax_id:     row.get(3)?,
              phone:      row.get(4)?,
              insurance:  row.get(5)?,
              created_at: row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::Database)?;

    raws
      .into_iter()
      .map(|r| r.into_summary().map_err(Into::into))
      .collect()
  }

  async fn clinician_performance(&self) -> CoreResult<Vec<ClinicianPerformance>> {
    type RawPerformanceRow =
      (String, String, String, i64, i64, i64, i64, i64, f64, Option<f64>);
    let rows: Vec<RawPerformanceRow> = self
      .conn
      .call(|conn| {
        // Correlated subqueries instead of a joined GROUP BY: the four-way
        // LEFT JOIN would multiply rows and inflate the sums.
        let mut stmt = conn.prepare(
          "SELECT c.clinician_id, prof.full_name, c.license,
            (SELECT COUNT(*) FROM patients p
              WHERE p.clinician_id = c.clinician_id)       AS total_patients,
            (SELECT COUNT(*) FROM appointments a
              WHERE a.clinician_id = c.clinician_id)       AS total_appointments,
            (SELECT COUNT(*) FROM appointments a
              WHERE a.clinician_id = c.clinician_id
                AND a.status = 'completed')                AS completed,
            (SELECT COUNT(*) FROM appointments a
              WHERE a.clinician_id = c.clinician_id
                AND a.status = 'cancelled')                AS cancelled,
            (SELECT COUNT(*) FROM clinical_records r
              WHERE r.clinician_id = c.clinician_id)       AS total_records,
            (SELECT COALESCE(SUM(t.amount), 0) FROM transactions t
              WHERE t.clinician_id = c.clinician_id
                AND t.kind = 'income' AND t.status = 'paid') AS total_income,
            (SELECT AVG(a.duration_minutes) FROM appointments a
              WHERE a.clinician_id = c.clinician_id
                AND a.status = 'completed')                AS avg_duration
           FROM clinicians c
           JOIN profiles prof ON prof.account_id = c.account_id
           WHERE c.active = 1
           ORDER BY total_appointments DESC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok((
              row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?,
              row.get(4)?, row.get(5)?, row.get(6)?, row.get(7)?,
              row.get(8)?, row.get(9)?,
            ))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::Database)?;

    rows
      .into_iter()
      .map(
        |(id, name, license, patients, appts, completed, cancelled, records, income, avg)| {
          let total_appointments = appts as u32;
          let completed          = completed as u32;
          let cancelled          = cancelled as u32;
          Ok(ClinicianPerformance {
            clinician_id:         crate::encode::decode_uuid(&id)?,
            clinician_name:       name,
            license,
            total_patients:       patients as u32,
            total_appointments,
            completed,
            cancelled,
            total_records:        records as u32,
            total_income:         income,
            avg_duration_minutes: avg,
            completion_rate:      rate_percent(completed, total_appointments),
            cancellation_rate:    rate_percent(cancelled, total_appointments),
          })
        },
      )
      .collect()
  }
}
