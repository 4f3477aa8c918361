use chrono::Utc;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Action, Actor, CreditRepayment, CreditRequest, CreditStatus, EngineError, LedgerEntryType,
    MoneyCents, NewCreditCmd, NotificationCategory, ResultEngine, ReviewCmd, Role, access,
    credit_repayments, credit_requests,
    util::{comment_or_default, normalize_optional_text, normalize_required_text, require_positive},
};

use super::{
    Engine, ledger::post_entry, notifications::notify_users, notifications::users_with_roles,
    require_employee, require_user, with_tx,
};

async fn require_credit<C: ConnectionTrait>(db: &C, credit_id: Uuid) -> ResultEngine<CreditRequest> {
    credit_requests::Entity::find_by_id(credit_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("credit request not exists".to_string()))?
        .try_into()
}

async fn save_credit<C: ConnectionTrait>(db: &C, credit: &CreditRequest) -> ResultEngine<()> {
    credit_requests::ActiveModel::from(credit).update(db).await?;
    Ok(())
}

/// User id and display name of the employee who owns the credit.
async fn borrower<C: ConnectionTrait>(db: &C, credit: &CreditRequest) -> ResultEngine<(Uuid, String)> {
    let employee = require_employee(db, credit.employee_id).await?;
    let user = require_user(db, employee.user_id).await?;
    Ok((user.id, user.display_name().to_string()))
}

impl Engine {
    /// Requests a cash advance for the actor's own employee profile.
    pub async fn create_credit(&self, actor: &Actor, cmd: NewCreditCmd) -> ResultEngine<CreditRequest> {
        access::require(actor, Action::CreateCredit)?;
        let employee_id = actor
            .employee_id
            .ok_or_else(|| EngineError::Forbidden("an employee profile is required".to_string()))?;
        require_positive(cmd.amount, "amount")?;
        let reason = normalize_required_text(&cmd.reason, "reason")?;
        with_tx!(self, |db_tx| {
            let credit = CreditRequest {
                id: Uuid::new_v4(),
                employee_id,
                amount: cmd.amount,
                reason,
                status: CreditStatus::Pending,
                admin_comment: String::new(),
                reviewed_by: None,
                reviewed_at: None,
                given_by: None,
                given_at: None,
                total_repaid: MoneyCents::ZERO,
                created_at: Utc::now(),
            };
            credit_requests::ActiveModel::from(&credit)
                .insert(&db_tx)
                .await?;

            let accountants = users_with_roles(&db_tx, &[Role::Accountant], false).await?;
            notify_users(
                &db_tx,
                accountants,
                NotificationCategory::System,
                "New Credit Request",
                &format!("{} requested a credit advance.", actor.display_name()),
            )
            .await?;
            tracing::info!(credit = %credit.id, amount = %credit.amount, "credit requested");
            Ok(credit)
        })
    }

    /// Staff see every credit, employees their own, everybody else nothing.
    pub async fn credits(&self, actor: &Actor) -> ResultEngine<Vec<CreditRequest>> {
        access::require(actor, Action::ViewCredits)?;
        let mut query = credit_requests::Entity::find();
        if !actor.is_staff() {
            let Some(employee_id) = actor.employee_id else {
                return Ok(Vec::new());
            };
            query = query.filter(credit_requests::Column::EmployeeId.eq(employee_id.to_string()));
        }
        query
            .order_by_desc(credit_requests::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(CreditRequest::try_from)
            .collect()
    }

    pub async fn review_credit(
        &self,
        actor: &Actor,
        credit_id: Uuid,
        review: ReviewCmd,
    ) -> ResultEngine<CreditRequest> {
        access::require(actor, Action::ReviewCredit)?;
        let comment = normalize_optional_text(review.comment.as_deref());
        with_tx!(self, |db_tx| {
            let mut credit = require_credit(&db_tx, credit_id).await?;
            if !credit.status.can_review() {
                tracing::warn!(credit = %credit.id, status = %credit.status, "credit review rejected");
                return Err(EngineError::InvalidState(
                    "only pending credits can be reviewed".to_string(),
                ));
            }
            credit.status = if review.approve {
                CreditStatus::Approved
            } else {
                CreditStatus::Rejected
            };
            credit.admin_comment = comment;
            credit.reviewed_by = Some(actor.user_id);
            credit.reviewed_at = Some(Utc::now());
            save_credit(&db_tx, &credit).await?;

            let (borrower_id, borrower_name) = borrower(&db_tx, &credit).await?;
            notify_users(
                &db_tx,
                [borrower_id],
                NotificationCategory::System,
                "Credit Request Review",
                &format!(
                    "Your credit request was {}. Comment: {}.",
                    credit.status.as_str().to_lowercase(),
                    comment_or_default(&credit.admin_comment)
                ),
            )
            .await?;
            let accountants = users_with_roles(&db_tx, &[Role::Accountant], false).await?;
            notify_users(
                &db_tx,
                accountants,
                NotificationCategory::System,
                "Credit Review Result",
                &format!("Credit request for {borrower_name} is {}.", credit.status),
            )
            .await?;
            tracing::info!(credit = %credit.id, status = %credit.status, "credit reviewed");
            Ok(credit)
        })
    }

    /// Hands out an approved credit; the full amount leaves the school account.
    pub async fn give_credit(&self, actor: &Actor, credit_id: Uuid) -> ResultEngine<CreditRequest> {
        access::require(actor, Action::GiveCredit)?;
        with_tx!(self, |db_tx| {
            let mut credit = require_credit(&db_tx, credit_id).await?;
            if !credit.status.can_give() {
                tracing::warn!(credit = %credit.id, status = %credit.status, "credit hand-out rejected");
                return Err(EngineError::InvalidState(
                    "only approved credits can be given".to_string(),
                ));
            }
            credit.status = CreditStatus::Given;
            credit.given_by = Some(actor.user_id);
            credit.given_at = Some(Utc::now());
            save_credit(&db_tx, &credit).await?;

            let (borrower_id, borrower_name) = borrower(&db_tx, &credit).await?;
            post_entry(
                &db_tx,
                LedgerEntryType::CreditGiven,
                -credit.amount,
                format!(
                    "Credit cash given to {borrower_name}. Reason: {}",
                    credit.reason
                ),
                Some(actor.user_id),
            )
            .await?;
            notify_users(
                &db_tx,
                [borrower_id],
                NotificationCategory::System,
                "Credit Given",
                &format!(
                    "Your approved credit of {} has been given by accountant.",
                    credit.amount
                ),
            )
            .await?;
            tracing::info!(credit = %credit.id, amount = %credit.amount, "credit given");
            Ok(credit)
        })
    }

    /// Records money paid back against a given credit.
    ///
    /// The credit closes once the running total reaches the credited amount.
    /// Repayments beyond that are still accepted and counted.
    pub async fn record_repayment(
        &self,
        actor: &Actor,
        credit_id: Uuid,
        amount: MoneyCents,
    ) -> ResultEngine<(CreditRequest, CreditRepayment)> {
        access::require(actor, Action::RecordRepayment)?;
        require_positive(amount, "amount")?;
        with_tx!(self, |db_tx| {
            let mut credit = require_credit(&db_tx, credit_id).await?;
            if !credit.status.accepts_repayment() {
                return Err(EngineError::InvalidState(
                    "only given credits can be repaid".to_string(),
                ));
            }
            let repayment = CreditRepayment {
                id: Uuid::new_v4(),
                credit_request_id: credit.id,
                amount,
                recorded_by: Some(actor.user_id),
                created_at: Utc::now(),
            };
            credit_repayments::ActiveModel::from(&repayment)
                .insert(&db_tx)
                .await?;

            credit.total_repaid = credit
                .total_repaid
                .checked_add(amount)
                .ok_or_else(|| EngineError::InvalidInput("repayment total overflow".to_string()))?;
            let previous = credit.status;
            credit.status = credit.status.after_repayment(credit.total_repaid, credit.amount);
            save_credit(&db_tx, &credit).await?;

            let (_, borrower_name) = borrower(&db_tx, &credit).await?;
            post_entry(
                &db_tx,
                LedgerEntryType::CreditRepayment,
                amount,
                format!(
                    "Credit repayment from {borrower_name}. Credit request {}.",
                    credit.id
                ),
                Some(actor.user_id),
            )
            .await?;
            if previous != credit.status {
                tracing::info!(credit = %credit.id, "credit closed");
            }
            tracing::info!(credit = %credit.id, %amount, total = %credit.total_repaid, "credit repayment recorded");
            Ok((credit, repayment))
        })
    }
}
