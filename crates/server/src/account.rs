//! School account and ledger endpoints.

use api_types::{
    MonthQuery,
    account::{AccountInitialize, AccountView, LedgerEntryView, ManualIncome, MonthlyReportView, Posting},
};
use axum::{Extension, extract::State, http::StatusCode};
use chrono::Utc;
use engine::{Actor, MoneyCents, Month};

use crate::{ServerError, extract::{Json, Query}, server::ServerState, views};

pub async fn get(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.engine.account(&actor).await?;
    Ok(Json(views::account(&account)))
}

pub async fn initialize(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountInitialize>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    let account = state
        .engine
        .initialize_account(&actor, MoneyCents::new(payload.initial_balance_minor))
        .await?;
    Ok((StatusCode::CREATED, Json(views::account(&account))))
}

pub async fn manual_income(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<ManualIncome>,
) -> Result<(StatusCode, Json<Posting>), ServerError> {
    let posting = state
        .engine
        .record_manual_income(
            &actor,
            MoneyCents::new(payload.amount_minor),
            payload.description.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(views::posting(&posting))))
}

pub async fn ledger(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<LedgerEntryView>>, ServerError> {
    let month = Month::parse_opt(query.month.as_deref())?;
    let entries = state.engine.ledger(&actor, month).await?;
    Ok(Json(entries.iter().map(views::ledger_entry).collect()))
}

/// Defaults to the current month.
pub async fn monthly_report(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthlyReportView>, ServerError> {
    let month = Month::parse_opt(query.month.as_deref())?
        .unwrap_or_else(|| Month::of(Utc::now().date_naive()));
    let report = state.engine.monthly_report(&actor, month).await?;
    Ok(Json(views::monthly_report(&report)))
}
