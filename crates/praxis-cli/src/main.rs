//! `praxis` — command-line client for the Praxis clinic server.
//!
//! # Usage
//!
//! ```
//! praxis login --email admin@praxis.local --password secret
//! praxis patients list
//! praxis appointments book --clinician <id> --patient <id> --at 2026-09-01T14:00:00Z
//! praxis finance report --from 2026-08-01 --to 2026-08-31
//! ```
//!
//! The session token from `login` is stored in
//! `~/.config/praxis/session.toml` and reused until `logout`.

mod client;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use client::ApiClient;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "praxis", about = "Command-line client for the Praxis clinic server")]
struct Args {
  /// Base URL of the Praxis server.
  #[arg(long, env = "PRAXIS_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Sign in and store the session token.
  Login {
    #[arg(long)]
    email:    String,
    #[arg(long)]
    password: String,
  },
  /// Invalidate and forget the stored session token.
  Logout,
  /// Show the account behind the stored token.
  Whoami,
  /// Patient roster operations.
  Patients {
    #[command(subcommand)]
    command: PatientCommand,
  },
  /// Clinician roster operations.
  Clinicians {
    #[command(subcommand)]
    command: ClinicianCommand,
  },
  /// Appointment operations.
  Appointments {
    #[command(subcommand)]
    command: AppointmentCommand,
  },
  /// Clinical record operations.
  Records {
    #[command(subcommand)]
    command: RecordCommand,
  },
  /// Financial report and ledger operations.
  Finance {
    #[command(subcommand)]
    command: FinanceCommand,
  },
  /// Dashboard widgets.
  Dashboard {
    #[command(subcommand)]
    command: DashboardCommand,
  },
}

#[derive(Subcommand, Debug)]
enum PatientCommand {
  /// List patients visible to the caller.
  List,
  /// Provision a patient (staff only).
  Add {
    #[arg(long)]
    name:  String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    clinician: Option<Uuid>,
  },
  /// Assign or reassign a patient's clinician (admin only).
  Assign {
    id: Uuid,
    #[arg(long)]
    clinician: Uuid,
  },
  /// Delete a patient and its account (admin only).
  Delete { id: Uuid },
}

#[derive(Subcommand, Debug)]
enum ClinicianCommand {
  /// List the clinician roster.
  List,
  /// Provision a clinician (admin only).
  Add {
    #[arg(long)]
    name:     String,
    #[arg(long)]
    email:    String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    license:  String,
    #[arg(long)]
    fee:      Option<f64>,
  },
  /// Deactivate a clinician (admin only).
  Deactivate { id: Uuid },
}

#[derive(Subcommand, Debug)]
enum AppointmentCommand {
  /// List appointments visible to the caller.
  List,
  /// Book an appointment (staff only).
  Book {
    #[arg(long)]
    clinician: Uuid,
    #[arg(long)]
    patient:   Uuid,
    /// RFC 3339 timestamp, e.g. 2026-09-01T14:00:00Z
    #[arg(long)]
    at:        DateTime<Utc>,
    #[arg(long)]
    fee:       Option<f64>,
    #[arg(long)]
    duration:  Option<u32>,
  },
  /// Transition an appointment's status.
  SetStatus {
    id: Uuid,
    /// One of: scheduled, confirmed, in_progress, completed, cancelled
    status: String,
  },
}

#[derive(Subcommand, Debug)]
enum RecordCommand {
  /// List a patient's clinical records.
  List { patient: Uuid },
  /// Author a clinical record.
  Add {
    #[arg(long)]
    patient:   Uuid,
    #[arg(long)]
    clinician: Uuid,
    #[arg(long)]
    date:      NaiveDate,
    #[arg(long)]
    notes:     Option<String>,
  },
}

#[derive(Subcommand, Debug)]
enum FinanceCommand {
  /// Aggregated income/expense report (staff only).
  Report {
    #[arg(long)]
    from: Option<NaiveDate>,
    #[arg(long)]
    to:   Option<NaiveDate>,
  },
  /// List transactions (staff only).
  Transactions {
    /// Filter: income or expense.
    #[arg(long)]
    kind: Option<String>,
  },
  /// Record a manual transaction (admin only).
  Add {
    #[arg(long)]
    clinician:   Uuid,
    #[arg(long)]
    amount:      f64,
    #[arg(long)]
    kind:        Option<String>,
    #[arg(long)]
    description: Option<String>,
  },
}

#[derive(Subcommand, Debug)]
enum DashboardCommand {
  /// Headline counts.
  Stats,
  /// Today's schedule.
  Today,
  /// The next ten upcoming appointments.
  Upcoming,
  /// Per-clinician performance (staff only).
  Performance,
  /// The caller's recent patients (clinicians only).
  MyPatients,
}

// ─── Session file ────────────────────────────────────────────────────────────

/// Shape of `~/.config/praxis/session.toml`.
#[derive(Serialize, Deserialize, Default)]
struct SessionFile {
  #[serde(default)]
  url:   String,
  #[serde(default)]
  token: String,
}

fn session_path() -> Result<PathBuf> {
  if let Ok(path) = std::env::var("PRAXIS_SESSION_FILE") {
    return Ok(PathBuf::from(path));
  }
  let home = std::env::var("HOME").context("HOME is not set")?;
  Ok(PathBuf::from(home).join(".config/praxis/session.toml"))
}

fn load_session() -> SessionFile {
  session_path()
    .ok()
    .and_then(|p| std::fs::read_to_string(p).ok())
    .and_then(|raw| toml::from_str(&raw).ok())
    .unwrap_or_default()
}

fn save_session(session: &SessionFile) -> Result<()> {
  let path = session_path()?;
  if let Some(dir) = path.parent() {
    std::fs::create_dir_all(dir)
      .with_context(|| format!("creating {}", dir.display()))?;
  }
  std::fs::write(&path, toml::to_string_pretty(session)?)
    .with_context(|| format!("writing {}", path.display()))
}

// ─── Entry point ─────────────────────────────────────────────────────────────

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

fn strip_nulls(mut body: Value) -> Value {
  if let Some(map) = body.as_object_mut() {
    map.retain(|_, v| !v.is_null());
  }
  body
}

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let session = load_session();

  let base_url = args
    .url
    .clone()
    .or_else(|| (!session.url.is_empty()).then(|| session.url.clone()))
    .unwrap_or_else(|| "http://localhost:3001".to_string());
  let token = (!session.token.is_empty()).then(|| session.token.clone());

  if !matches!(args.command, Command::Login { .. }) && token.is_none() {
    return Err(anyhow!("no stored session; run `praxis login` first"));
  }

  let client = ApiClient::new(base_url.clone(), token)?;

  match args.command {
    Command::Login { email, password } => {
      let info = client.login(&email, &password).await?;
      save_session(&SessionFile { url: base_url, token: info.token })?;
      println!(
        "signed in as {} ({:?}), session valid until {}",
        info.user.email, info.user.role, info.expires_at
      );
    }
    Command::Logout => {
      client.logout().await?;
      save_session(&SessionFile { url: base_url, token: String::new() })?;
      println!("signed out");
    }
    Command::Whoami => print_json(&client.session().await?.user)?,

    Command::Patients { command } => match command {
      PatientCommand::List => print_json(&client.list_patients().await?)?,
      PatientCommand::Add { name, email, phone, clinician } => {
        let created = client
          .create_patient(strip_nulls(json!({
            "full_name":    name,
            "email":        email,
            "phone":        phone,
            "clinician_id": clinician,
          })))
          .await?;
        print_json(&created)?;
      }
      PatientCommand::Assign { id, clinician } => {
        client
          .update_patient(id, json!({ "clinician_id": clinician }))
          .await?;
        println!("assigned patient {id} to clinician {clinician}");
      }
      PatientCommand::Delete { id } => {
        client.delete_patient(id).await?;
        println!("deleted patient {id}");
      }
    },

    Command::Clinicians { command } => match command {
      ClinicianCommand::List => print_json(&client.list_clinicians().await?)?,
      ClinicianCommand::Add { name, email, password, license, fee } => {
        let created = client
          .create_clinician(strip_nulls(json!({
            "full_name":   name,
            "email":       email,
            "password":    password,
            "license":     license,
            "session_fee": fee,
          })))
          .await?;
        print_json(&created)?;
      }
      ClinicianCommand::Deactivate { id } => {
        client.update_clinician(id, json!({ "active": false })).await?;
        println!("deactivated clinician {id}");
      }
    },

    Command::Appointments { command } => match command {
      AppointmentCommand::List => print_json(&client.list_appointments().await?)?,
      AppointmentCommand::Book { clinician, patient, at, fee, duration } => {
        let created = client
          .create_appointment(strip_nulls(json!({
            "clinician_id":     clinician,
            "patient_id":       patient,
            "scheduled_at":     at,
            "fee":              fee,
            "duration_minutes": duration,
          })))
          .await?;
        print_json(&created)?;
      }
      AppointmentCommand::SetStatus { id, status } => {
        client.set_appointment_status(id, &status).await?;
        println!("appointment {id} is now {status}");
      }
    },

    Command::Records { command } => match command {
      RecordCommand::List { patient } => {
        print_json(&client.list_records(patient).await?)?
      }
      RecordCommand::Add { patient, clinician, date, notes } => {
        let created = client
          .create_record(strip_nulls(json!({
            "patient_id":   patient,
            "clinician_id": clinician,
            "session_date": date,
            "notes":        notes,
          })))
          .await?;
        print_json(&created)?;
      }
    },

    Command::Finance { command } => match command {
      FinanceCommand::Report { from, to } => {
        print_json(&client.financial_report(from, to).await?)?
      }
      FinanceCommand::Transactions { kind } => {
        print_json(&client.list_transactions(kind.as_deref()).await?)?
      }
      FinanceCommand::Add { clinician, amount, kind, description } => {
        let created = client
          .create_transaction(strip_nulls(json!({
            "clinician_id": clinician,
            "amount":       amount,
            "kind":         kind,
            "description":  description,
          })))
          .await?;
        print_json(&created)?;
      }
    },

    Command::Dashboard { command } => match command {
      DashboardCommand::Stats => print_json(&client.dashboard_stats().await?)?,
      DashboardCommand::Today => print_json(&client.today_schedule().await?)?,
      DashboardCommand::Upcoming => {
        print_json(&client.upcoming_schedule().await?)?
      }
      DashboardCommand::Performance => {
        print_json(&client.clinician_performance().await?)?
      }
      DashboardCommand::MyPatients => print_json(&client.my_patients().await?)?,
    },
  }

  Ok(())
}
