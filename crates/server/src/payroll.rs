//! Payroll API endpoints.

use api_types::{
    MonthQuery, Review,
    payroll::{
        AdjustmentNew, AdjustmentView, EmployeeView, PayrollGenerate, PayrollIds,
        PayrollSettingUpdate, PayrollSettingView, PayrollView, SalaryUpdate,
    },
};
use axum::{Extension, extract::State, http::StatusCode};
use engine::{
    Actor, AdjustmentCmd, GeneratePayrollCmd, MoneyCents, Month, Percent, ReviewCmd,
};
use uuid::Uuid;

use crate::{ServerError, extract::{Json, Path, Query}, server::ServerState, views};

fn adjustment_cmd(payload: AdjustmentNew) -> Result<AdjustmentCmd, ServerError> {
    Ok(AdjustmentCmd {
        employee_id: payload.employee_id,
        month: payload.month.parse::<Month>()?,
        amount: MoneyCents::new(payload.amount_minor),
        reason: payload.reason,
    })
}

pub async fn list(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<PayrollView>>, ServerError> {
    let month = Month::parse_opt(query.month.as_deref())?;
    let payrolls = state.engine.payrolls(&actor, month).await?;
    Ok(Json(payrolls.iter().map(views::payroll).collect()))
}

pub async fn get(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PayrollView>, ServerError> {
    let payroll = state.engine.payroll(&actor, id).await?;
    Ok(Json(views::payroll(&payroll)))
}

/// Returns the ids of the payrolls written by this run.
pub async fn generate(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<PayrollGenerate>,
) -> Result<(StatusCode, Json<PayrollIds>), ServerError> {
    let payroll_ids = state
        .engine
        .generate_payroll(
            &actor,
            GeneratePayrollCmd {
                month: payload.month.parse::<Month>()?,
                employee_id: payload.employee_id,
                overtime_amount: MoneyCents::new(payload.overtime_amount_minor),
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(PayrollIds { payroll_ids })))
}

pub async fn request_payment(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<PayrollIds>,
) -> Result<Json<PayrollIds>, ServerError> {
    let payroll_ids = state
        .engine
        .request_payroll_payment(&actor, &payload.payroll_ids)
        .await?;
    Ok(Json(PayrollIds { payroll_ids }))
}

pub async fn review(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Review>,
) -> Result<Json<PayrollView>, ServerError> {
    let review = ReviewCmd {
        approve: payload.approve,
        comment: payload.comment,
    };
    let payroll = state.engine.review_payroll(&actor, id, review).await?;
    Ok(Json(views::payroll(&payroll)))
}

pub async fn pay(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PayrollView>, ServerError> {
    let payroll = state.engine.pay_payroll(&actor, id).await?;
    Ok(Json(views::payroll(&payroll)))
}

pub async fn bonus_new(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<AdjustmentNew>,
) -> Result<(StatusCode, Json<AdjustmentView>), ServerError> {
    let bonus = state
        .engine
        .add_bonus(&actor, adjustment_cmd(payload)?)
        .await?;
    Ok((StatusCode::CREATED, Json(views::adjustment(&bonus))))
}

pub async fn deduction_new(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<AdjustmentNew>,
) -> Result<(StatusCode, Json<AdjustmentView>), ServerError> {
    let deduction = state
        .engine
        .add_deduction(&actor, adjustment_cmd(payload)?)
        .await?;
    Ok((StatusCode::CREATED, Json(views::adjustment(&deduction))))
}

pub async fn setting(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<PayrollSettingView>, ServerError> {
    let setting = state.engine.payroll_setting(&actor).await?;
    Ok(Json(views::payroll_setting(&setting)))
}

pub async fn setting_update(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<PayrollSettingUpdate>,
) -> Result<Json<PayrollSettingView>, ServerError> {
    let setting = state
        .engine
        .update_payroll_setting(&actor, Percent::from_bp(payload.tax_rate_bp))
        .await?;
    Ok(Json(views::payroll_setting(&setting)))
}

pub async fn salary_update(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<SalaryUpdate>,
) -> Result<Json<EmployeeView>, ServerError> {
    let employee = state
        .engine
        .update_salary(
            &actor,
            payload.employee_id,
            MoneyCents::new(payload.salary_minor),
        )
        .await?;
    Ok(Json(views::employee(&employee)))
}
