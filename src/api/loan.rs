use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::Session;
use crate::infrastructure::AppState;
use crate::services::availability_service::DATE_FORMAT;
use crate::services::{LoanError, ReturnError};

type ApiError = (StatusCode, Json<Value>);

fn error_body(status: StatusCode, message: impl ToString) -> ApiError {
    (status, Json(json!({ "error": message.to_string() })))
}

fn loan_error(e: LoanError) -> ApiError {
    let status = match &e {
        LoanError::Unauthorized => StatusCode::UNAUTHORIZED,
        LoanError::UnknownBook(_) => StatusCode::NOT_FOUND,
        LoanError::MissingBorrower => StatusCode::BAD_REQUEST,
        LoanError::NoCopiesAvailable(_) => StatusCode::CONFLICT,
        LoanError::SourceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    error_body(status, e)
}

fn return_error(e: ReturnError) -> ApiError {
    match &e {
        ReturnError::Unauthorized => error_body(StatusCode::UNAUTHORIZED, &e),
        ReturnError::NoOpenLoan(_) => error_body(StatusCode::NOT_FOUND, &e),
        ReturnError::InvalidSelection { candidates, .. } => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": e.to_string(), "candidates": candidates })),
        ),
        ReturnError::SourceUnavailable(_) => error_body(StatusCode::SERVICE_UNAVAILABLE, &e),
    }
}

#[derive(Deserialize)]
pub struct ListLoansQuery {
    pub open: Option<bool>,
}

pub async fn list_loans(
    State(state): State<AppState>,
    _session: Session,
    Query(query): Query<ListLoansQuery>,
) -> Result<Json<Value>, ApiError> {
    let rows = state
        .library
        .ledger_rows(query.open.unwrap_or(false))
        .await
        .map_err(|e| error_body(StatusCode::SERVICE_UNAVAILABLE, e))?;

    Ok(Json(json!({ "total": rows.len(), "loans": rows })))
}

#[derive(Deserialize)]
pub struct CreateLoanRequest {
    pub code: String,
    pub borrower: String,
    /// Defaults to today
    pub loan_date: Option<String>,
}

pub async fn create_loan(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateLoanRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let date = match payload.loan_date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
            error_body(
                StatusCode::BAD_REQUEST,
                format!("Invalid loan_date '{}', expected YYYY-MM-DD", raw),
            )
        })?,
        None => Local::now().date_naive(),
    };

    let loan = state
        .library
        .record_loan(&session, &payload.code, &payload.borrower, date)
        .await
        .map_err(loan_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "loan": loan, "message": "Loan recorded successfully" })),
    ))
}

#[derive(Deserialize)]
pub struct CandidatesQuery {
    pub code: String,
    pub borrower: Option<String>,
}

/// Open loans for a code, for the caller to pick one by row
pub async fn list_return_candidates(
    State(state): State<AppState>,
    _session: Session,
    Query(query): Query<CandidatesQuery>,
) -> Result<Json<Value>, ApiError> {
    let candidates = state
        .library
        .return_candidates(&query.code, query.borrower.as_deref())
        .await
        .map_err(return_error)?;

    Ok(Json(json!({ "candidates": candidates })))
}

#[derive(Deserialize)]
pub struct ReturnRequest {
    pub code: String,
    pub borrower: Option<String>,
    /// Ledger row of the loan being closed, as listed by the candidates call
    pub row: u32,
}

pub async fn return_loan(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<ReturnRequest>,
) -> Result<Json<Value>, ApiError> {
    let loan = state
        .library
        .record_return(&session, &payload.code, payload.borrower.as_deref(), payload.row)
        .await
        .map_err(return_error)?;

    Ok(Json(
        json!({ "loan": loan, "message": "Return recorded successfully" }),
    ))
}
