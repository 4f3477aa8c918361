use chrono::Utc;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Action, Actor, EngineError, ExpenseRequest, ExpenseStatus, LedgerEntryType, NewExpenseCmd,
    NotificationCategory, ResultEngine, ReviewCmd, Role, access, expense_requests,
    util::{comment_or_default, normalize_optional_text, normalize_required_text, require_positive},
};

use super::{
    Engine, ledger::post_entry, notifications::notify_users, notifications::users_with_roles,
    with_tx,
};

async fn require_expense<C: ConnectionTrait>(db: &C, expense_id: Uuid) -> ResultEngine<ExpenseRequest> {
    expense_requests::Entity::find_by_id(expense_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("expense request not exists".to_string()))?
        .try_into()
}

async fn save_expense<C: ConnectionTrait>(db: &C, expense: &ExpenseRequest) -> ResultEngine<()> {
    expense_requests::ActiveModel::from(expense).update(db).await?;
    Ok(())
}

impl Engine {
    /// Files an expense reimbursement request and alerts the accountants.
    pub async fn create_expense(
        &self,
        actor: &Actor,
        cmd: NewExpenseCmd,
    ) -> ResultEngine<ExpenseRequest> {
        access::require(actor, Action::CreateExpense)?;
        require_positive(cmd.amount, "amount")?;
        let title = normalize_required_text(&cmd.title, "title")?;
        let reason = normalize_required_text(&cmd.reason, "reason")?;
        with_tx!(self, |db_tx| {
            let expense = ExpenseRequest {
                id: Uuid::new_v4(),
                requested_by: actor.user_id,
                category: cmd.category,
                title,
                amount: cmd.amount,
                reason,
                status: ExpenseStatus::Pending,
                admin_comment: String::new(),
                reviewed_by: None,
                reviewed_at: None,
                paid_by: None,
                paid_at: None,
                created_at: Utc::now(),
            };
            expense_requests::ActiveModel::from(&expense)
                .insert(&db_tx)
                .await?;

            let accountants = users_with_roles(&db_tx, &[Role::Accountant], false).await?;
            notify_users(
                &db_tx,
                accountants,
                NotificationCategory::System,
                "New Expense Request",
                &format!("{} submitted an expense request.", actor.display_name()),
            )
            .await?;
            tracing::info!(expense = %expense.id, amount = %expense.amount, "expense requested");
            Ok(expense)
        })
    }

    /// Staff see every request, everybody else only their own.
    pub async fn expenses(&self, actor: &Actor) -> ResultEngine<Vec<ExpenseRequest>> {
        access::require(actor, Action::ViewExpenses)?;
        let mut query = expense_requests::Entity::find();
        if !actor.is_staff() {
            query = query.filter(expense_requests::Column::RequestedBy.eq(actor.user_id.to_string()));
        }
        query
            .order_by_desc(expense_requests::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(ExpenseRequest::try_from)
            .collect()
    }

    pub async fn review_expense(
        &self,
        actor: &Actor,
        expense_id: Uuid,
        review: ReviewCmd,
    ) -> ResultEngine<ExpenseRequest> {
        access::require(actor, Action::ReviewExpense)?;
        let comment = normalize_optional_text(review.comment.as_deref());
        with_tx!(self, |db_tx| {
            let mut expense = require_expense(&db_tx, expense_id).await?;
            if !expense.status.can_review() {
                tracing::warn!(expense = %expense.id, status = %expense.status, "expense review rejected");
                return Err(EngineError::InvalidState(
                    "only pending requests can be reviewed".to_string(),
                ));
            }
            expense.status = if review.approve {
                ExpenseStatus::Approved
            } else {
                ExpenseStatus::Rejected
            };
            expense.admin_comment = comment;
            expense.reviewed_by = Some(actor.user_id);
            expense.reviewed_at = Some(Utc::now());
            save_expense(&db_tx, &expense).await?;

            notify_users(
                &db_tx,
                [expense.requested_by],
                NotificationCategory::System,
                "Expense Review Update",
                &format!(
                    "Your expense request \"{}\" was {}. Comment: {}.",
                    expense.title,
                    expense.status.as_str().to_lowercase(),
                    comment_or_default(&expense.admin_comment)
                ),
            )
            .await?;
            tracing::info!(expense = %expense.id, status = %expense.status, "expense reviewed");
            Ok(expense)
        })
    }

    /// Pays an approved expense out of the school account.
    pub async fn pay_expense(&self, actor: &Actor, expense_id: Uuid) -> ResultEngine<ExpenseRequest> {
        access::require(actor, Action::PayExpense)?;
        with_tx!(self, |db_tx| {
            let mut expense = require_expense(&db_tx, expense_id).await?;
            if !expense.status.can_pay() {
                tracing::warn!(expense = %expense.id, status = %expense.status, "expense payment rejected");
                return Err(EngineError::InvalidState(
                    "only approved expenses can be paid".to_string(),
                ));
            }
            expense.status = ExpenseStatus::Paid;
            expense.paid_by = Some(actor.user_id);
            expense.paid_at = Some(Utc::now());
            save_expense(&db_tx, &expense).await?;

            post_entry(
                &db_tx,
                LedgerEntryType::ExpensePayment,
                -expense.amount,
                format!(
                    "Expense paid: {} ({}). Reason: {}",
                    expense.title, expense.category, expense.reason
                ),
                Some(actor.user_id),
            )
            .await?;

            notify_users(
                &db_tx,
                [expense.requested_by],
                NotificationCategory::System,
                "Expense Paid",
                &format!("Your expense \"{}\" has been paid by accountant.", expense.title),
            )
            .await?;
            tracing::info!(expense = %expense.id, amount = %expense.amount, "expense paid");
            Ok(expense)
        })
    }
}
