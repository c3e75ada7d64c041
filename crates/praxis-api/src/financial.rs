//! Handlers for `/financial` endpoints.
//!
//! | Method | Path | Access |
//! |--------|------|--------|
//! | `GET`  | `/financial/report` | staff |
//! | `GET`  | `/financial/transactions` | staff |
//! | `POST` | `/financial/transactions` | admin |

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use praxis_core::{
  finance::{
    FinancialReport, NewTransaction, ReportQuery, Transaction,
    TransactionFilter, TransactionKind, TransactionStatus,
  },
  store::ClinicStore,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  identity::{Auth, require_admin, require_staff},
};

#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
  pub from:         Option<NaiveDate>,
  pub to:           Option<NaiveDate>,
  pub clinician_id: Option<Uuid>,
}

/// `GET /financial/report[?from=&to=&clinician_id=]`
pub async fn report<S>(
  State(state): State<AppState<S>>,
  Auth(identity): Auth,
  Query(params): Query<ReportParams>,
) -> Result<Json<FinancialReport>, ApiError>
where
  S: ClinicStore,
{
  require_staff(&identity)?;
  let report = state
    .store
    .financial_report(&ReportQuery {
      from:         params.from,
      to:           params.to,
      clinician_id: params.clinician_id,
    })
    .await?;
  Ok(Json(report))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub from:         Option<NaiveDate>,
  pub to:           Option<NaiveDate>,
  pub kind:         Option<TransactionKind>,
  pub clinician_id: Option<Uuid>,
}

/// `GET /financial/transactions[?from=&to=&kind=&clinician_id=]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Auth(identity): Auth,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Transaction>>, ApiError>
where
  S: ClinicStore,
{
  require_staff(&identity)?;
  let transactions = state
    .store
    .list_transactions(&TransactionFilter {
      from:         params.from,
      to:           params.to,
      kind:         params.kind,
      clinician_id: params.clinician_id,
    })
    .await?;
  Ok(Json(transactions))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub clinician_id:   Uuid,
  pub amount:         f64,
  pub appointment_id: Option<Uuid>,
  pub kind:           Option<TransactionKind>,
  pub description:    Option<String>,
  pub entry_date:     Option<NaiveDate>,
  pub status:         Option<TransactionStatus>,
  pub notes:          Option<String>,
}

/// `POST /financial/transactions` — manual ledger entries.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Auth(identity): Auth,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ClinicStore,
{
  require_admin(&identity)?;
  if body.amount <= 0.0 {
    return Err(ApiError::BadRequest("amount must be positive".into()));
  }

  let transaction_id = state
    .store
    .create_transaction(NewTransaction {
      appointment_id: body.appointment_id,
      clinician_id:   body.clinician_id,
      kind:           body.kind,
      description:    body.description,
      amount:         body.amount,
      entry_date:     body.entry_date,
      status:         body.status,
      notes:          body.notes,
    })
    .await?;

  Ok((StatusCode::CREATED, Json(json!({ "transaction_id": transaction_id }))))
}
