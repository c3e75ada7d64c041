//! Async HTTP client wrapping the Praxis JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use praxis_core::{
  account::Account,
  appointment::Appointment,
  clinician::Clinician,
  dashboard::{
    ClinicianPerformance, DashboardStats, PatientSummary, ScheduleEntry,
  },
  finance::{FinancialReport, Transaction},
  patient::Patient,
  record::ClinicalRecord,
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

/// A successful login or registration.
#[derive(Debug, Deserialize)]
pub struct SessionInfo {
  pub token:      String,
  pub expires_at: DateTime<Utc>,
  pub user:       Account,
}

/// The account behind a bearer token.
#[derive(Debug, Deserialize)]
pub struct SessionIdentity {
  pub user: Account,
}

/// Async HTTP client for the Praxis JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
  token:    Option<String>,
}

impl ApiClient {
  pub fn new(base_url: String, token: Option<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url, token })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{path}", self.base_url.trim_end_matches('/'))
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    match &self.token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  /// Send, check the status, and surface the server's `error` field on
  /// failure.
  async fn expect_success(
    resp: reqwest::Response,
    what: &str,
  ) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let detail = resp
      .json::<Value>()
      .await
      .ok()
      .and_then(|v| v["error"].as_str().map(str::to_string))
      .unwrap_or_default();
    Err(anyhow!("{what} → {status}: {detail}"))
  }

  async fn get_json<T: serde::de::DeserializeOwned>(
    &self,
    path: &str,
    query: &[(&str, String)],
  ) -> Result<T> {
    let resp = self
      .auth(self.client.get(self.url(path)))
      .query(query)
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;
    Self::expect_success(resp, path)
      .await?
      .json()
      .await
      .with_context(|| format!("deserialising {path} response"))
  }

  async fn post_json<T: serde::de::DeserializeOwned>(
    &self,
    path: &str,
    body: &Value,
  ) -> Result<T> {
    let resp = self
      .auth(self.client.post(self.url(path)))
      .json(body)
      .send()
      .await
      .with_context(|| format!("POST {path} failed"))?;
    Self::expect_success(resp, path)
      .await?
      .json()
      .await
      .with_context(|| format!("deserialising {path} response"))
  }

  async fn put(&self, path: &str, body: &Value) -> Result<()> {
    let resp = self
      .auth(self.client.put(self.url(path)))
      .json(body)
      .send()
      .await
      .with_context(|| format!("PUT {path} failed"))?;
    Self::expect_success(resp, path).await?;
    Ok(())
  }

  // ── Auth ──────────────────────────────────────────────────────────────────

  /// `POST /auth/login`
  pub async fn login(&self, email: &str, password: &str) -> Result<SessionInfo> {
    self
      .post_json(
        "/auth/login",
        &serde_json::json!({ "email": email, "password": password }),
      )
      .await
  }

  /// `GET /auth/session`
  pub async fn session(&self) -> Result<SessionIdentity> {
    self.get_json("/auth/session", &[]).await
  }

  /// `POST /auth/logout`
  pub async fn logout(&self) -> Result<()> {
    let resp = self
      .auth(self.client.post(self.url("/auth/logout")))
      .send()
      .await
      .context("POST /auth/logout failed")?;
    Self::expect_success(resp, "/auth/logout").await?;
    Ok(())
  }

  // ── Patients ──────────────────────────────────────────────────────────────

  /// `GET /patients`
  pub async fn list_patients(&self) -> Result<Vec<Patient>> {
    self.get_json("/patients", &[]).await
  }

  /// `POST /patients`
  pub async fn create_patient(&self, body: Value) -> Result<Value> {
    self.post_json("/patients", &body).await
  }

  /// `PUT /patients/{id}`
  pub async fn update_patient(&self, id: Uuid, body: Value) -> Result<()> {
    self.put(&format!("/patients/{id}"), &body).await
  }

  /// `DELETE /patients/{id}`
  pub async fn delete_patient(&self, id: Uuid) -> Result<()> {
    let path = format!("/patients/{id}");
    let resp = self
      .auth(self.client.delete(self.url(&path)))
      .send()
      .await
      .with_context(|| format!("DELETE {path} failed"))?;
    Self::expect_success(resp, &path).await?;
    Ok(())
  }

  // ── Clinicians ────────────────────────────────────────────────────────────

  /// `GET /clinicians`
  pub async fn list_clinicians(&self) -> Result<Vec<Clinician>> {
    self.get_json("/clinicians", &[]).await
  }

  /// `POST /clinicians`
  pub async fn create_clinician(&self, body: Value) -> Result<Value> {
    self.post_json("/clinicians", &body).await
  }

  /// `PUT /clinicians/{id}`
  pub async fn update_clinician(&self, id: Uuid, body: Value) -> Result<()> {
    self.put(&format!("/clinicians/{id}"), &body).await
  }

  // ── Appointments ──────────────────────────────────────────────────────────

  /// `GET /appointments`
  pub async fn list_appointments(&self) -> Result<Vec<Appointment>> {
    self.get_json("/appointments", &[]).await
  }

  /// `POST /appointments`
  pub async fn create_appointment(&self, body: Value) -> Result<Value> {
    self.post_json("/appointments", &body).await
  }

  /// `PUT /appointments/{id}/status`
  pub async fn set_appointment_status(
    &self,
    id: Uuid,
    status: &str,
  ) -> Result<()> {
    self
      .put(
        &format!("/appointments/{id}/status"),
        &serde_json::json!({ "status": status }),
      )
      .await
  }

  // ── Clinical records ──────────────────────────────────────────────────────

  /// `GET /clinical-records/patient/{id}`
  pub async fn list_records(&self, patient_id: Uuid) -> Result<Vec<ClinicalRecord>> {
    self
      .get_json(&format!("/clinical-records/patient/{patient_id}"), &[])
      .await
  }

  /// `POST /clinical-records`
  pub async fn create_record(&self, body: Value) -> Result<Value> {
    self.post_json("/clinical-records", &body).await
  }

  // ── Financial ─────────────────────────────────────────────────────────────

  /// `GET /financial/report`
  pub async fn financial_report(
    &self,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
  ) -> Result<FinancialReport> {
    let mut query = Vec::new();
    if let Some(from) = from {
      query.push(("from", from.to_string()));
    }
    if let Some(to) = to {
      query.push(("to", to.to_string()));
    }
    self.get_json("/financial/report", &query).await
  }

  /// `GET /financial/transactions`
  pub async fn list_transactions(
    &self,
    kind: Option<&str>,
  ) -> Result<Vec<Transaction>> {
    let query: Vec<(&str, String)> = match kind {
      Some(kind) => vec![("kind", kind.to_string())],
      None => Vec::new(),
    };
    self.get_json("/financial/transactions", &query).await
  }

  /// `POST /financial/transactions`
  pub async fn create_transaction(&self, body: Value) -> Result<Value> {
    self.post_json("/financial/transactions", &body).await
  }

  // ── Dashboard ─────────────────────────────────────────────────────────────

  /// `GET /dashboard/stats`
  pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
    self.get_json("/dashboard/stats", &[]).await
  }

  /// `GET /dashboard/today`
  pub async fn today_schedule(&self) -> Result<Vec<ScheduleEntry>> {
    self.get_json("/dashboard/today", &[]).await
  }

  /// `GET /dashboard/upcoming`
  pub async fn upcoming_schedule(&self) -> Result<Vec<ScheduleEntry>> {
    self.get_json("/dashboard/upcoming", &[]).await
  }

  /// `GET /dashboard/performance`
  pub async fn clinician_performance(&self) -> Result<Vec<ClinicianPerformance>> {
    self.get_json("/dashboard/performance", &[]).await
  }

  /// `GET /dashboard/my-patients`
  pub async fn my_patients(&self) -> Result<Vec<PatientSummary>> {
    self.get_json("/dashboard/my-patients", &[]).await
  }
}
