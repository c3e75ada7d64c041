//! SQL schema for the Praxis SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS accounts (
    account_id    TEXT PRIMARY KEY,
    email         TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,    -- argon2 PHC string, never plaintext
    full_name     TEXT NOT NULL,
    role          TEXT NOT NULL DEFAULT 'patient',  -- admin|attendant|clinician|patient
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS profiles (
    profile_id  TEXT PRIMARY KEY,
    account_id  TEXT UNIQUE NOT NULL REFERENCES accounts(account_id) ON DELETE CASCADE,
    full_name   TEXT NOT NULL,
    phone       TEXT,
    birth_date  TEXT,            -- YYYY-MM-DD
    tax_id      TEXT UNIQUE,
    avatar_url  TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS clinicians (
    clinician_id TEXT PRIMARY KEY,
    account_id   TEXT UNIQUE NOT NULL REFERENCES accounts(account_id) ON DELETE CASCADE,
    license      TEXT UNIQUE NOT NULL,
    specialty    TEXT,
    bio          TEXT,
    session_fee  REAL,
    active       INTEGER NOT NULL DEFAULT 1,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS patients (
    patient_id        TEXT PRIMARY KEY,
    account_id        TEXT UNIQUE NOT NULL REFERENCES accounts(account_id) ON DELETE CASCADE,
    clinician_id      TEXT REFERENCES clinicians(clinician_id) ON DELETE SET NULL,
    address           TEXT,
    emergency_contact TEXT,
    insurance         TEXT,
    notes             TEXT,
    medication        TEXT,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS appointments (
    appointment_id   TEXT PRIMARY KEY,
    clinician_id     TEXT NOT NULL REFERENCES clinicians(clinician_id) ON DELETE CASCADE,
    patient_id       TEXT NOT NULL REFERENCES patients(patient_id) ON DELETE CASCADE,
    scheduled_at     TEXT NOT NULL,   -- ISO 8601 UTC
    duration_minutes INTEGER NOT NULL DEFAULT 50,
    status           TEXT NOT NULL DEFAULT 'scheduled',
    notes            TEXT,
    fee              REAL,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS clinical_records (
    record_id      TEXT PRIMARY KEY,
    patient_id     TEXT NOT NULL REFERENCES patients(patient_id) ON DELETE CASCADE,
    clinician_id   TEXT NOT NULL REFERENCES clinicians(clinician_id) ON DELETE CASCADE,
    appointment_id TEXT REFERENCES appointments(appointment_id) ON DELETE SET NULL,
    session_date   TEXT NOT NULL,   -- YYYY-MM-DD
    kind           TEXT NOT NULL DEFAULT 'session',
    notes          TEXT,
    progress       TEXT,
    plan           TEXT,
    next_session   TEXT,
    created_by     TEXT NOT NULL REFERENCES accounts(account_id) ON DELETE CASCADE,
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS transactions (
    transaction_id TEXT PRIMARY KEY,
    appointment_id TEXT REFERENCES appointments(appointment_id) ON DELETE SET NULL,
    clinician_id   TEXT NOT NULL REFERENCES clinicians(clinician_id) ON DELETE CASCADE,
    kind           TEXT NOT NULL DEFAULT 'income',   -- income|expense
    description    TEXT,
    amount         REAL NOT NULL,
    entry_date     TEXT NOT NULL,   -- YYYY-MM-DD
    status         TEXT NOT NULL DEFAULT 'pending',  -- pending|paid
    notes          TEXT,
    auto_generated INTEGER NOT NULL DEFAULT 0,
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    session_id TEXT PRIMARY KEY,
    account_id TEXT NOT NULL REFERENCES accounts(account_id) ON DELETE CASCADE,
    token      TEXT UNIQUE NOT NULL,
    expires_at TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- At most one auto-generated transaction per appointment. The completion
-- side effect inserts with OR IGNORE against this index, which makes the
-- transition handler idempotent under concurrent invocation.
CREATE UNIQUE INDEX IF NOT EXISTS transactions_auto_appointment_idx
    ON transactions(appointment_id) WHERE auto_generated = 1;

CREATE INDEX IF NOT EXISTS appointments_clinician_idx ON appointments(clinician_id);
CREATE INDEX IF NOT EXISTS appointments_patient_idx   ON appointments(patient_id);
CREATE INDEX IF NOT EXISTS appointments_time_idx      ON appointments(scheduled_at);
CREATE INDEX IF NOT EXISTS records_patient_idx        ON clinical_records(patient_id);
CREATE INDEX IF NOT EXISTS records_clinician_idx      ON clinical_records(clinician_id);
CREATE INDEX IF NOT EXISTS transactions_clinician_idx ON transactions(clinician_id);
CREATE INDEX IF NOT EXISTS transactions_date_idx      ON transactions(entry_date);
CREATE INDEX IF NOT EXISTS sessions_token_idx         ON sessions(token);

PRAGMA user_version = 1;
";
