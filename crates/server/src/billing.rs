//! Invoices, payments and the periodic billing jobs.

use api_types::{
    MonthQuery,
    billing::{
        BillingDashboardView, BillingRun, BillingRunView, FeeSettingUpdate, FeeSettingView,
        InvoiceNew, InvoiceView, PaymentNew, PaymentRecorded, PaymentView,
    },
};
use axum::{Extension, extract::State, http::StatusCode};
use chrono::{NaiveDate, Utc};
use engine::{Actor, MoneyCents, Month, NewInvoiceCmd};

use crate::{ServerError, extract::{Json, Query}, server::ServerState, views};

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// The configured due day unless the request overrides it.
fn due_day(state: &ServerState, payload: Option<Json<BillingRun>>) -> Result<u32, ServerError> {
    let run = payload.map(|Json(run)| run).unwrap_or_default();
    let due_day = run.due_day.unwrap_or(state.due_day);
    if !(1..=31).contains(&due_day) {
        return Err(ServerError::Generic(
            "due_day must be between 1 and 31".to_string(),
        ));
    }
    Ok(due_day)
}

pub async fn invoices(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<InvoiceView>>, ServerError> {
    let invoices = state.engine.invoices(&actor, today()).await?;
    Ok(Json(invoices.iter().map(views::invoice).collect()))
}

pub async fn invoice_new(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<InvoiceNew>,
) -> Result<(StatusCode, Json<InvoiceView>), ServerError> {
    let invoice = state
        .engine
        .create_invoice(
            &actor,
            NewInvoiceCmd {
                parent_id: payload.parent_id,
                student_id: payload.student_id,
                month: payload.month.parse::<Month>()?,
                amount: MoneyCents::new(payload.amount_minor),
                due_date: payload.due_date,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(views::invoice(&invoice))))
}

pub async fn payments(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<PaymentView>>, ServerError> {
    let payments = state.engine.payments(&actor).await?;
    Ok(Json(payments.iter().map(views::payment).collect()))
}

pub async fn payment_new(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<PaymentNew>,
) -> Result<(StatusCode, Json<PaymentRecorded>), ServerError> {
    let (invoice, payment) = state
        .engine
        .record_payment(
            &actor,
            payload.invoice_id,
            MoneyCents::new(payload.amount_minor),
            today(),
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(PaymentRecorded {
            invoice: views::invoice(&invoice),
            payment: views::payment(&payment),
        }),
    ))
}

pub async fn fee_setting(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<FeeSettingView>, ServerError> {
    let setting = state.engine.fee_setting(&actor).await?;
    Ok(Json(views::fee_setting(&setting)))
}

pub async fn fee_setting_update(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<FeeSettingUpdate>,
) -> Result<Json<FeeSettingView>, ServerError> {
    let setting = state
        .engine
        .update_fee_setting(&actor, MoneyCents::new(payload.penalty_per_day_minor))
        .await?;
    Ok(Json(views::fee_setting(&setting)))
}

/// Invoice generation, penalties and reminders in one go.
pub async fn run(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    payload: Option<Json<BillingRun>>,
) -> Result<Json<BillingRunView>, ServerError> {
    let due_day = due_day(&state, payload)?;
    let summary = state.engine.run_billing(&actor, today(), due_day).await?;
    Ok(Json(views::billing_run(&summary)))
}

pub async fn generate_invoices(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    payload: Option<Json<BillingRun>>,
) -> Result<Json<BillingRunView>, ServerError> {
    let due_day = due_day(&state, payload)?;
    let summary = state
        .engine
        .generate_monthly_invoices(&actor, today(), due_day)
        .await?;
    Ok(Json(views::billing_run(&summary)))
}

pub async fn apply_penalties(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<BillingRunView>, ServerError> {
    let summary = state.engine.apply_overdue_penalties(&actor, today()).await?;
    Ok(Json(views::billing_run(&summary)))
}

pub async fn send_reminders(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<BillingRunView>, ServerError> {
    let summary = state.engine.send_due_reminders(&actor, today()).await?;
    Ok(Json(views::billing_run(&summary)))
}

pub async fn dashboard(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<BillingDashboardView>, ServerError> {
    let today = today();
    let month = Month::parse_opt(query.month.as_deref())?.unwrap_or_else(|| Month::of(today));
    let dashboard = state.engine.billing_dashboard(&actor, month, today).await?;
    Ok(Json(views::billing_dashboard(&dashboard)))
}
