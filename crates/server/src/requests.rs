//! Expense and credit request endpoints.

use api_types::{
    Review,
    requests::{
        CreditNew, CreditView, ExpenseNew, ExpenseView, RepaymentNew, RepaymentRecorded,
    },
};
use axum::{Extension, extract::State, http::StatusCode};
use engine::{
    Actor, ExpenseCategory, MoneyCents, NewCreditCmd, NewExpenseCmd, ReviewCmd,
};
use uuid::Uuid;

use crate::{ServerError, extract::{Json, Path}, server::ServerState, views};

fn review_cmd(payload: Review) -> ReviewCmd {
    ReviewCmd {
        approve: payload.approve,
        comment: payload.comment,
    }
}

pub async fn expenses(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let expenses = state.engine.expenses(&actor).await?;
    Ok(Json(expenses.iter().map(views::expense).collect()))
}

pub async fn expense_new(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let category = ExpenseCategory::try_from(payload.category.trim().to_uppercase().as_str())?;
    let expense = state
        .engine
        .create_expense(
            &actor,
            NewExpenseCmd {
                category,
                title: payload.title,
                amount: MoneyCents::new(payload.amount_minor),
                reason: payload.reason,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(views::expense(&expense))))
}

pub async fn expense_review(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Review>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state
        .engine
        .review_expense(&actor, id, review_cmd(payload))
        .await?;
    Ok(Json(views::expense(&expense)))
}

pub async fn expense_pay(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.pay_expense(&actor, id).await?;
    Ok(Json(views::expense(&expense)))
}

pub async fn credits(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<CreditView>>, ServerError> {
    let credits = state.engine.credits(&actor).await?;
    Ok(Json(credits.iter().map(views::credit).collect()))
}

pub async fn credit_new(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<CreditNew>,
) -> Result<(StatusCode, Json<CreditView>), ServerError> {
    let credit = state
        .engine
        .create_credit(
            &actor,
            NewCreditCmd {
                amount: MoneyCents::new(payload.amount_minor),
                reason: payload.reason,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(views::credit(&credit))))
}

pub async fn credit_review(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Review>,
) -> Result<Json<CreditView>, ServerError> {
    let credit = state
        .engine
        .review_credit(&actor, id, review_cmd(payload))
        .await?;
    Ok(Json(views::credit(&credit)))
}

pub async fn credit_give(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CreditView>, ServerError> {
    let credit = state.engine.give_credit(&actor, id).await?;
    Ok(Json(views::credit(&credit)))
}

pub async fn repayment_new(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RepaymentNew>,
) -> Result<(StatusCode, Json<RepaymentRecorded>), ServerError> {
    let (credit, repayment) = state
        .engine
        .record_repayment(&actor, id, MoneyCents::new(payload.amount_minor))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RepaymentRecorded {
            credit: views::credit(&credit),
            repayment: views::repayment(&repayment),
        }),
    ))
}
