//! End-to-end tests for the JSON API against an in-memory store.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use praxis_core::store::ClinicStore as _;
use praxis_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{AppState, ServerConfig, auth::hash_password, router};

const ADMIN_EMAIL: &str = "admin@praxis.test";
const ADMIN_PASSWORD: &str = "admin-secret";

async fn make_state() -> AppState<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  store
    .seed_admin(ADMIN_EMAIL, "Admin", &hash_password(ADMIN_PASSWORD).unwrap())
    .await
    .unwrap();
  AppState {
    store:  Arc::new(store),
    config: Arc::new(ServerConfig::default()),
  }
}

async fn send(
  state: &AppState<SqliteStore>,
  method: &str,
  uri: &str,
  token: Option<&str>,
  body: Option<Value>,
) -> Response {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(token) = token {
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
  }
  let req = match body {
    Some(v) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(v.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  router(state.clone()).oneshot(req).await.unwrap()
}

async fn body_json(resp: Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

async fn login(state: &AppState<SqliteStore>, email: &str, password: &str) -> String {
  let resp = send(
    state,
    "POST",
    "/auth/login",
    None,
    Some(json!({ "email": email, "password": password })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  body_json(resp).await["token"].as_str().unwrap().to_string()
}

async fn admin_token(state: &AppState<SqliteStore>) -> String {
  login(state, ADMIN_EMAIL, ADMIN_PASSWORD).await
}

fn id_field(value: &Value, field: &str) -> Uuid {
  Uuid::parse_str(value[field].as_str().unwrap()).unwrap()
}

async fn create_clinician(
  state: &AppState<SqliteStore>,
  admin: &str,
  name: &str,
  email: &str,
  license: &str,
  password: &str,
) -> Uuid {
  let resp = send(
    state,
    "POST",
    "/clinicians",
    Some(admin),
    Some(json!({
      "full_name": name,
      "email":     email,
      "password":  password,
      "license":   license,
      "session_fee": 150.0,
    })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  id_field(&body_json(resp).await, "clinician_id")
}

async fn create_patient(
  state: &AppState<SqliteStore>,
  admin: &str,
  name: &str,
  email: &str,
  clinician_id: Option<Uuid>,
) -> Uuid {
  let mut body = json!({ "full_name": name, "email": email });
  if let Some(id) = clinician_id {
    body["clinician_id"] = json!(id);
  }
  let resp = send(state, "POST", "/patients", Some(admin), Some(body)).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  id_field(&body_json(resp).await, "patient_id")
}

async fn book(
  state: &AppState<SqliteStore>,
  admin: &str,
  clinician_id: Uuid,
  patient_id: Uuid,
  fee: Option<f64>,
) -> Response {
  send(
    state,
    "POST",
    "/appointments",
    Some(admin),
    Some(json!({
      "clinician_id": clinician_id,
      "patient_id":   patient_id,
      "scheduled_at": (chrono::Utc::now() + chrono::Duration::days(1)).to_rfc3339(),
      "fee":          fee,
    })),
  )
  .await
}

async fn set_status(
  state: &AppState<SqliteStore>,
  token: &str,
  appointment_id: Uuid,
  status: &str,
) -> Response {
  send(
    state,
    "PUT",
    &format!("/appointments/{appointment_id}/status"),
    Some(token),
    Some(json!({ "status": status })),
  )
  .await
}

// ─── Health ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_answers_without_a_token() {
  let state = make_state().await;

  let resp = send(&state, "GET", "/health", None, None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await["status"], "ok");
}

// ─── Auth ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn login_rejects_bad_credentials_uniformly() {
  let state = make_state().await;

  let wrong_password = send(
    &state,
    "POST",
    "/auth/login",
    None,
    Some(json!({ "email": ADMIN_EMAIL, "password": "nope" })),
  )
  .await;
  assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
  assert_eq!(body_json(wrong_password).await["error"], "invalid credentials");

  // Unknown email gets the identical body.
  let unknown_email = send(
    &state,
    "POST",
    "/auth/login",
    None,
    Some(json!({ "email": "ghost@praxis.test", "password": "nope" })),
  )
  .await;
  assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
  assert_eq!(body_json(unknown_email).await["error"], "invalid credentials");
}

#[tokio::test]
async fn register_signs_the_patient_in() {
  let state = make_state().await;

  let resp = send(
    &state,
    "POST",
    "/auth/register",
    None,
    Some(json!({
      "email": "self@praxis.test",
      "password": "hunter22",
      "full_name": "Self Signup",
    })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body = body_json(resp).await;
  assert_eq!(body["user"]["role"], "patient");

  let token = body["token"].as_str().unwrap();
  let session = send(&state, "GET", "/auth/session", Some(token), None).await;
  assert_eq!(session.status(), StatusCode::OK);
  assert_eq!(body_json(session).await["user"]["email"], "self@praxis.test");
}

#[tokio::test]
async fn register_enforces_password_length_and_unique_email() {
  let state = make_state().await;

  let weak = send(
    &state,
    "POST",
    "/auth/register",
    None,
    Some(json!({ "email": "a@praxis.test", "password": "abc", "full_name": "A" })),
  )
  .await;
  assert_eq!(weak.status(), StatusCode::BAD_REQUEST);

  let body = json!({ "email": "a@praxis.test", "password": "hunter22", "full_name": "A" });
  let first = send(&state, "POST", "/auth/register", None, Some(body.clone())).await;
  assert_eq!(first.status(), StatusCode::CREATED);
  let dup = send(&state, "POST", "/auth/register", None, Some(body)).await;
  assert_eq!(dup.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_invalidates_the_token() {
  let state = make_state().await;
  let token = admin_token(&state).await;

  let resp = send(&state, "POST", "/auth/logout", Some(&token), None).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);

  let session = send(&state, "GET", "/auth/session", Some(&token), None).await;
  assert_eq!(session.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
  let state = make_state().await;
  let resp = send(&state, "GET", "/patients", None, None).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ─── Role gates ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn patient_role_is_blocked_from_clinical_surfaces() {
  let state = make_state().await;
  let resp = send(
    &state,
    "POST",
    "/auth/register",
    None,
    Some(json!({ "email": "p@praxis.test", "password": "hunter22", "full_name": "P" })),
  )
  .await;
  let token = body_json(resp).await["token"].as_str().unwrap().to_string();

  for uri in [
    "/patients",
    "/appointments",
    "/dashboard/stats",
    "/financial/report",
  ] {
    let resp = send(&state, "GET", uri, Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN, "GET {uri}");
  }

  // The clinician roster stays browsable.
  let roster = send(&state, "GET", "/clinicians", Some(&token), None).await;
  assert_eq!(roster.status(), StatusCode::OK);
}

#[tokio::test]
async fn clinician_cannot_administer() {
  let state = make_state().await;
  let admin = admin_token(&state).await;
  create_clinician(&state, &admin, "Dr. A", "dra@praxis.test", "CRP-1", "doctor-pw").await;
  let patient_id = create_patient(&state, &admin, "Alice", "alice@praxis.test", None).await;
  let token = login(&state, "dra@praxis.test", "doctor-pw").await;

  let create = send(
    &state,
    "POST",
    "/clinicians",
    Some(&token),
    Some(json!({
      "full_name": "Dr. X", "email": "x@praxis.test",
      "password": "xx-pass", "license": "CRP-9",
    })),
  )
  .await;
  assert_eq!(create.status(), StatusCode::FORBIDDEN);

  let update = send(
    &state,
    "PUT",
    &format!("/patients/{patient_id}"),
    Some(&token),
    Some(json!({ "notes": "peek" })),
  )
  .await;
  assert_eq!(update.status(), StatusCode::FORBIDDEN);

  let tx = send(
    &state,
    "POST",
    "/financial/transactions",
    Some(&token),
    Some(json!({ "clinician_id": Uuid::new_v4(), "amount": 10.0 })),
  )
  .await;
  assert_eq!(tx.status(), StatusCode::FORBIDDEN);
}

// ─── Patients ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn patient_create_and_list_roundtrip() {
  let state = make_state().await;
  let admin = admin_token(&state).await;

  let patient_id =
    create_patient(&state, &admin, "Alice", "alice@praxis.test", None).await;

  let resp = send(&state, "GET", "/patients", Some(&admin), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let rows = body_json(resp).await;
  assert_eq!(rows.as_array().unwrap().len(), 1);
  let row = &rows[0];
  assert_eq!(id_field(row, "patient_id"), patient_id);
  assert_eq!(row["profile"]["full_name"], "Alice");
  assert_eq!(row["email"], "alice@praxis.test");
  // Omitted optional fields come back as explicit nulls.
  assert!(row["address"].is_null());
  assert!(row["clinician_id"].is_null());
  assert!(row["clinician"].is_null());
}

#[tokio::test]
async fn patient_update_clears_and_keeps_fields() {
  let state = make_state().await;
  let admin = admin_token(&state).await;

  let resp = send(
    &state,
    "POST",
    "/patients",
    Some(&admin),
    Some(json!({
      "full_name": "Alice",
      "email": "alice@praxis.test",
      "phone": "555-0100",
      "notes": "intake",
    })),
  )
  .await;
  let patient_id = id_field(&body_json(resp).await, "patient_id");

  // `notes: null` clears; phone is absent and must survive.
  let update = send(
    &state,
    "PUT",
    &format!("/patients/{patient_id}"),
    Some(&admin),
    Some(json!({ "notes": null, "address": "12 Main St" })),
  )
  .await;
  assert_eq!(update.status(), StatusCode::NO_CONTENT);

  let rows = body_json(send(&state, "GET", "/patients", Some(&admin), None).await).await;
  let row = &rows[0];
  assert!(row["notes"].is_null());
  assert_eq!(row["address"], "12 Main St");
  assert_eq!(row["profile"]["phone"], "555-0100");
}

#[tokio::test]
async fn delete_patient_then_404_on_repeat() {
  let state = make_state().await;
  let admin = admin_token(&state).await;
  let patient_id =
    create_patient(&state, &admin, "Alice", "alice@praxis.test", None).await;

  let uri = format!("/patients/{patient_id}");
  let first = send(&state, "DELETE", &uri, Some(&admin), None).await;
  assert_eq!(first.status(), StatusCode::NO_CONTENT);
  let second = send(&state, "DELETE", &uri, Some(&admin), None).await;
  assert_eq!(second.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn clinician_sees_only_their_own_patients() {
  let state = make_state().await;
  let admin = admin_token(&state).await;
  let a = create_clinician(&state, &admin, "Dr. A", "a@praxis.test", "CRP-1", "a-password").await;
  let b = create_clinician(&state, &admin, "Dr. B", "b@praxis.test", "CRP-2", "b-password").await;
  create_patient(&state, &admin, "Alice", "alice@praxis.test", Some(a)).await;
  create_patient(&state, &admin, "Bob", "bob@praxis.test", Some(b)).await;

  let token = login(&state, "a@praxis.test", "a-password").await;
  let rows = body_json(send(&state, "GET", "/patients", Some(&token), None).await).await;
  let rows = rows.as_array().unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0]["profile"]["full_name"], "Alice");

  // Staff still see both.
  let all = body_json(send(&state, "GET", "/patients", Some(&admin), None).await).await;
  assert_eq!(all.as_array().unwrap().len(), 2);
}

// ─── Appointments ────────────────────────────────────────────────────────────

#[tokio::test]
async fn booking_inactive_clinician_is_rejected_without_a_row() {
  let state = make_state().await;
  let admin = admin_token(&state).await;
  let clinician =
    create_clinician(&state, &admin, "Dr. A", "a@praxis.test", "CRP-1", "a-password").await;
  let patient = create_patient(&state, &admin, "Alice", "alice@praxis.test", None).await;

  let deactivate = send(
    &state,
    "PUT",
    &format!("/clinicians/{clinician}"),
    Some(&admin),
    Some(json!({ "active": false })),
  )
  .await;
  assert_eq!(deactivate.status(), StatusCode::NO_CONTENT);

  let resp = book(&state, &admin, clinician, patient, Some(150.0)).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let rows = body_json(send(&state, "GET", "/appointments", Some(&admin), None).await).await;
  assert!(rows.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn status_machine_rejects_skips_and_double_completion() {
  let state = make_state().await;
  let admin = admin_token(&state).await;
  let clinician =
    create_clinician(&state, &admin, "Dr. A", "a@praxis.test", "CRP-1", "a-password").await;
  let patient = create_patient(&state, &admin, "Alice", "alice@praxis.test", None).await;

  let resp = book(&state, &admin, clinician, patient, Some(150.0)).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let id = id_field(&body_json(resp).await, "appointment_id");

  // scheduled -> completed skips the graph.
  let skip = set_status(&state, &admin, id, "completed").await;
  assert_eq!(skip.status(), StatusCode::BAD_REQUEST);

  for status in ["confirmed", "in_progress", "completed"] {
    let resp = set_status(&state, &admin, id, status).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT, "-> {status}");
  }

  // completed is terminal; a second completion changes nothing.
  let again = set_status(&state, &admin, id, "completed").await;
  assert_eq!(again.status(), StatusCode::BAD_REQUEST);

  // Exactly one auto-generated income transaction at the appointment fee.
  let rows =
    body_json(send(&state, "GET", "/financial/transactions", Some(&admin), None).await)
      .await;
  let rows = rows.as_array().unwrap().clone();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0]["amount"], 150.0);
  assert_eq!(rows[0]["kind"], "income");
  assert_eq!(rows[0]["status"], "paid");
  assert_eq!(rows[0]["auto_generated"], true);
}

#[tokio::test]
async fn clinician_cannot_move_a_foreign_appointment() {
  let state = make_state().await;
  let admin = admin_token(&state).await;
  let a = create_clinician(&state, &admin, "Dr. A", "a@praxis.test", "CRP-1", "a-password").await;
  create_clinician(&state, &admin, "Dr. B", "b@praxis.test", "CRP-2", "b-password").await;
  let patient = create_patient(&state, &admin, "Alice", "alice@praxis.test", None).await;

  let resp = book(&state, &admin, a, patient, None).await;
  let id = id_field(&body_json(resp).await, "appointment_id");

  let b_token = login(&state, "b@praxis.test", "b-password").await;
  let forbidden = set_status(&state, &b_token, id, "confirmed").await;
  assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

  let a_token = login(&state, "a@praxis.test", "a-password").await;
  let allowed = set_status(&state, &a_token, id, "confirmed").await;
  assert_eq!(allowed.status(), StatusCode::NO_CONTENT);
}

// ─── Clinical records ────────────────────────────────────────────────────────

#[tokio::test]
async fn record_flow_with_clinician_scoping() {
  let state = make_state().await;
  let admin = admin_token(&state).await;
  let a = create_clinician(&state, &admin, "Dr. A", "a@praxis.test", "CRP-1", "a-password").await;
  let b = create_clinician(&state, &admin, "Dr. B", "b@praxis.test", "CRP-2", "b-password").await;
  let patient = create_patient(&state, &admin, "Alice", "alice@praxis.test", None).await;

  let record = |clinician: Uuid| {
    json!({
      "patient_id":   patient,
      "clinician_id": clinician,
      "session_date": "2026-08-20",
      "notes":        "session notes",
    })
  };

  let a_token = login(&state, "a@praxis.test", "a-password").await;
  let created =
    send(&state, "POST", "/clinical-records", Some(&a_token), Some(record(a))).await;
  assert_eq!(created.status(), StatusCode::CREATED);

  // A clinician may not author under another clinician's id.
  let cross = send(&state, "POST", "/clinical-records", Some(&a_token), Some(record(b))).await;
  assert_eq!(cross.status(), StatusCode::FORBIDDEN);

  // Staff can, though.
  let by_staff = send(&state, "POST", "/clinical-records", Some(&admin), Some(record(b))).await;
  assert_eq!(by_staff.status(), StatusCode::CREATED);

  let uri = format!("/clinical-records/patient/{patient}");
  let mine = body_json(send(&state, "GET", &uri, Some(&a_token), None).await).await;
  assert_eq!(mine.as_array().unwrap().len(), 1);
  let all = body_json(send(&state, "GET", &uri, Some(&admin), None).await).await;
  assert_eq!(all.as_array().unwrap().len(), 2);
}

// ─── Financial ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_report_returns_zero_totals() {
  let state = make_state().await;
  let admin = admin_token(&state).await;

  let resp = send(
    &state,
    "GET",
    "/financial/report?from=2026-01-01&to=2026-12-31",
    Some(&admin),
    None,
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let report = body_json(resp).await;
  assert_eq!(report["income"]["total"], 0.0);
  assert_eq!(report["income"]["count"], 0);
  assert_eq!(report["expense"]["total"], 0.0);
  assert_eq!(report["balance"], 0.0);
  assert!(report["per_clinician"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn manual_transaction_requires_positive_amount() {
  let state = make_state().await;
  let admin = admin_token(&state).await;
  let clinician =
    create_clinician(&state, &admin, "Dr. A", "a@praxis.test", "CRP-1", "a-password").await;

  let bad = send(
    &state,
    "POST",
    "/financial/transactions",
    Some(&admin),
    Some(json!({ "clinician_id": clinician, "amount": -5.0 })),
  )
  .await;
  assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

  let ok = send(
    &state,
    "POST",
    "/financial/transactions",
    Some(&admin),
    Some(json!({
      "clinician_id": clinician,
      "amount": 99.5,
      "kind": "expense",
      "status": "paid",
      "description": "room rental",
    })),
  )
  .await;
  assert_eq!(ok.status(), StatusCode::CREATED);

  let rows = body_json(
    send(&state, "GET", "/financial/transactions?kind=expense", Some(&admin), None).await,
  )
  .await;
  let rows = rows.as_array().unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0]["description"], "room rental");
  assert_eq!(rows[0]["auto_generated"], false);
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn dashboard_widgets_respect_roles() {
  let state = make_state().await;
  let admin = admin_token(&state).await;
  let a = create_clinician(&state, &admin, "Dr. A", "a@praxis.test", "CRP-1", "a-password").await;
  create_patient(&state, &admin, "Alice", "alice@praxis.test", Some(a)).await;
  let token = login(&state, "a@praxis.test", "a-password").await;

  // Performance is staff-only.
  let perf = send(&state, "GET", "/dashboard/performance", Some(&token), None).await;
  assert_eq!(perf.status(), StatusCode::FORBIDDEN);
  let perf = send(&state, "GET", "/dashboard/performance", Some(&admin), None).await;
  assert_eq!(perf.status(), StatusCode::OK);

  // my-patients needs a clinician record.
  let mine = send(&state, "GET", "/dashboard/my-patients", Some(&admin), None).await;
  assert_eq!(mine.status(), StatusCode::FORBIDDEN);
  let mine = send(&state, "GET", "/dashboard/my-patients", Some(&token), None).await;
  assert_eq!(mine.status(), StatusCode::OK);
  let rows = body_json(mine).await;
  assert_eq!(rows.as_array().unwrap().len(), 1);
  assert_eq!(rows[0]["full_name"], "Alice");

  // Scoped stats for the clinician, unscoped for staff.
  let stats = body_json(send(&state, "GET", "/dashboard/stats", Some(&token), None).await).await;
  assert_eq!(stats["total_clinicians"], 0);
  assert_eq!(stats["total_patients"], 1);
  let stats = body_json(send(&state, "GET", "/dashboard/stats", Some(&admin), None).await).await;
  assert_eq!(stats["total_clinicians"], 1);
}

#[tokio::test]
async fn clinician_password_update_changes_login() {
  let state = make_state().await;
  let admin = admin_token(&state).await;
  let clinician =
    create_clinician(&state, &admin, "Dr. A", "a@praxis.test", "CRP-1", "old-password").await;

  let resp = send(
    &state,
    "PUT",
    &format!("/clinicians/{clinician}"),
    Some(&admin),
    Some(json!({ "password": "new-password" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);

  let stale = send(
    &state,
    "POST",
    "/auth/login",
    None,
    Some(json!({ "email": "a@praxis.test", "password": "old-password" })),
  )
  .await;
  assert_eq!(stale.status(), StatusCode::UNAUTHORIZED);
  login(&state, "a@praxis.test", "new-password").await;
}
