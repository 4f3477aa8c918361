//! Invoices, payments and the periodic billing job.
//!
//! An invoice is settled once its payments cover `amount + penalty_amount`.
//! Penalties accrue per overdue day from the global fee setting and are
//! recomputed whenever invoices are evaluated: on listing, on payment, on the
//! dashboard, and by the billing job.
//!
//! The billing job (monthly invoice generation, penalties, due reminders) is
//! triggered from outside, by the admin CLI or over HTTP. Running it twice is
//! harmless: invoice creation and reminders rely on unique indexes.

use chrono::{Days, NaiveDate, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{
    Action, Actor, EngineError, FeeSetting, Invoice, InvoiceKind, LedgerEntryType, MoneyCents,
    Month, NewInvoiceCmd, ParentNotification, ParentNotificationType, Payment, ResultEngine, Role,
    Student, access, invoices, overdue_penalty, payments,
    school_account::SCHOOL_SCOPE,
    settings::fee_settings,
    students,
    util::require_positive,
};

use super::{Engine, ledger::post_entry, notifications::notify_parent, require_user, with_tx};

/// Days before the due date a reminder goes out.
const REMINDER_LEAD_DAYS: u64 = 3;

/// What a billing run changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BillingRunSummary {
    pub month: Option<Month>,
    pub invoices_created: u64,
    pub penalties_updated: u64,
    pub invoices_paid: u64,
    pub reminders_created: u64,
}

/// Collection status of one month's invoices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BillingDashboard {
    pub month: Month,
    pub total_invoices: usize,
    pub paid_invoices: Vec<Invoice>,
    pub unpaid_invoices: Vec<Invoice>,
    pub overdue_count: usize,
}

#[derive(Clone, Copy, Debug, Default)]
struct Evaluation {
    penalty_changed: bool,
    became_paid: bool,
}

/// Clamps a configured due day into a day every month has.
pub(crate) fn clamp_due_day(due_day: u32) -> u32 {
    due_day.clamp(1, 28)
}

async fn fee_setting<C: ConnectionTrait>(db: &C) -> ResultEngine<FeeSetting> {
    let model = fee_settings::ActiveModel {
        scope: ActiveValue::Set(SCHOOL_SCOPE.to_string()),
        penalty_per_day_minor: ActiveValue::Set(0),
        updated_at: ActiveValue::Set(Utc::now()),
    };
    fee_settings::Entity::insert(model)
        .on_conflict(
            OnConflict::column(fee_settings::Column::Scope)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    let model = fee_settings::Entity::find_by_id(SCHOOL_SCOPE.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("fee settings not exists".to_string()))?;
    Ok(model.into())
}

async fn require_invoice<C: ConnectionTrait>(db: &C, invoice_id: Uuid) -> ResultEngine<Invoice> {
    invoices::Entity::find_by_id(invoice_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("invoice not exists".to_string()))?
        .try_into()
}

async fn find_student<C: ConnectionTrait>(db: &C, student_id: Uuid) -> ResultEngine<Student> {
    students::Entity::find_by_id(student_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("student not exists".to_string()))?
        .try_into()
}

async fn payments_total<C: ConnectionTrait>(db: &C, invoice_id: Uuid) -> ResultEngine<MoneyCents> {
    let rows = payments::Entity::find()
        .filter(payments::Column::InvoiceId.eq(invoice_id.to_string()))
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|row| MoneyCents::new(row.amount_minor))
        .sum())
}

/// Who the invoice is for, as shown in parent-facing messages.
async fn billed_for<C: ConnectionTrait>(db: &C, invoice: &Invoice) -> ResultEngine<String> {
    match invoice.student_id {
        Some(student_id) => Ok(find_student(db, student_id).await?.full_name()),
        None => Ok(format!("invoice {}", invoice.id)),
    }
}

/// Recomputes the penalty and the paid flag of an unpaid invoice.
///
/// Persists only when something changed. When the invoice becomes paid the
/// parent gets a thank-you notification.
async fn evaluate_invoice(
    db_tx: &DatabaseTransaction,
    invoice: &mut Invoice,
    today: NaiveDate,
    penalty_per_day: MoneyCents,
) -> ResultEngine<Evaluation> {
    let mut evaluation = Evaluation::default();
    if invoice.is_paid {
        return Ok(evaluation);
    }
    let penalty = overdue_penalty(invoice.due_date, today, penalty_per_day);
    if penalty != invoice.penalty_amount {
        invoice.penalty_amount = penalty;
        evaluation.penalty_changed = true;
    }
    if invoice.is_settled_by(payments_total(db_tx, invoice.id).await?) {
        invoice.is_paid = true;
        evaluation.became_paid = true;
    }
    if evaluation.penalty_changed || evaluation.became_paid {
        invoices::ActiveModel::from(&*invoice).update(db_tx).await?;
    }
    if evaluation.became_paid {
        let subject = billed_for(db_tx, invoice).await?;
        let notification = ParentNotification {
            id: Uuid::new_v4(),
            parent_id: invoice.parent_id,
            student_id: invoice.student_id,
            invoice_id: Some(invoice.id),
            notification_type: ParentNotificationType::ThankYou,
            title: "Payment Received".to_string(),
            message: format!(
                "Thank you. Payment for {subject} ({}) has been received successfully.",
                invoice.month
            ),
            is_read: false,
            created_at: Utc::now(),
        };
        notify_parent(db_tx, &notification).await?;
        tracing::info!(invoice = %invoice.id, "invoice settled");
    }
    Ok(evaluation)
}

/// Evaluates every unpaid invoice in `list` in place.
async fn evaluate_all(
    db_tx: &DatabaseTransaction,
    list: &mut [Invoice],
    today: NaiveDate,
) -> ResultEngine<Evaluation> {
    let penalty_per_day = fee_setting(db_tx).await?.penalty_per_day;
    let mut totals = Evaluation::default();
    for invoice in list.iter_mut() {
        let evaluation = evaluate_invoice(db_tx, invoice, today, penalty_per_day).await?;
        totals.penalty_changed |= evaluation.penalty_changed;
        totals.became_paid |= evaluation.became_paid;
    }
    Ok(totals)
}

fn collect_invoices(models: Vec<invoices::Model>) -> ResultEngine<Vec<Invoice>> {
    models.into_iter().map(Invoice::try_from).collect()
}

async fn generate_invoices(
    db_tx: &DatabaseTransaction,
    today: NaiveDate,
    due_day: u32,
) -> ResultEngine<(Month, u64)> {
    let month = Month::of(today);
    let due_date = month.day(clamp_due_day(due_day))?;
    let active: Vec<Student> = students::Entity::find()
        .filter(students::Column::Active.eq(true))
        .order_by_asc(students::Column::Id)
        .all(db_tx)
        .await?
        .into_iter()
        .map(Student::try_from)
        .collect::<ResultEngine<_>>()?;

    let now = Utc::now();
    let mut created = 0;
    for student in active {
        let invoice = Invoice {
            id: Uuid::new_v4(),
            kind: InvoiceKind::Tuition,
            parent_id: student.parent_id,
            student_id: Some(student.id),
            month,
            amount: student.monthly_tuition_fee,
            penalty_amount: MoneyCents::ZERO,
            due_date,
            is_paid: false,
            created_at: now,
        };
        created += invoices::Entity::insert(invoices::ActiveModel::from(&invoice))
            .on_conflict(
                OnConflict::columns([invoices::Column::StudentId, invoices::Column::Month])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db_tx)
            .await?;
    }
    Ok((month, created))
}

async fn apply_penalties(db_tx: &DatabaseTransaction, today: NaiveDate) -> ResultEngine<(u64, u64)> {
    let penalty_per_day = fee_setting(db_tx).await?.penalty_per_day;
    let mut unpaid = collect_invoices(
        invoices::Entity::find()
            .filter(invoices::Column::IsPaid.eq(false))
            .order_by_asc(invoices::Column::DueDate)
            .all(db_tx)
            .await?,
    )?;
    let (mut penalties, mut paid) = (0, 0);
    for invoice in &mut unpaid {
        let evaluation = evaluate_invoice(db_tx, invoice, today, penalty_per_day).await?;
        penalties += u64::from(evaluation.penalty_changed);
        paid += u64::from(evaluation.became_paid);
    }
    Ok((penalties, paid))
}

async fn send_reminders(db_tx: &DatabaseTransaction, today: NaiveDate) -> ResultEngine<u64> {
    let target = today
        .checked_add_days(Days::new(REMINDER_LEAD_DAYS))
        .ok_or_else(|| EngineError::InvalidInput("date out of range".to_string()))?;
    let due_soon = collect_invoices(
        invoices::Entity::find()
            .filter(invoices::Column::IsPaid.eq(false))
            .filter(invoices::Column::DueDate.eq(target))
            .all(db_tx)
            .await?,
    )?;
    let mut created = 0;
    for invoice in due_soon {
        let subject = billed_for(db_tx, &invoice).await?;
        let label = if invoice.kind == InvoiceKind::Tuition {
            "Tuition"
        } else {
            "Payment"
        };
        let notification = ParentNotification {
            id: Uuid::new_v4(),
            parent_id: invoice.parent_id,
            student_id: invoice.student_id,
            invoice_id: Some(invoice.id),
            notification_type: ParentNotificationType::Reminder,
            title: format!("{label} Reminder"),
            message: format!(
                "Reminder: {label} for {subject} ({}) is due on {}.",
                invoice.month, invoice.due_date
            ),
            is_read: false,
            created_at: Utc::now(),
        };
        if notify_parent(db_tx, &notification).await? {
            created += 1;
        }
    }
    Ok(created)
}

impl Engine {
    /// Bills a parent, optionally for a specific student's tuition.
    pub async fn create_invoice(&self, actor: &Actor, cmd: NewInvoiceCmd) -> ResultEngine<Invoice> {
        access::require(actor, Action::CreateInvoice)?;
        require_positive(cmd.amount, "amount")?;
        with_tx!(self, |db_tx| {
            let parent = require_user(&db_tx, cmd.parent_id).await?;
            if parent.role != Role::Parent {
                return Err(EngineError::field("parent_id", "must be a parent account"));
            }
            let kind = match cmd.student_id {
                Some(student_id) => {
                    let student = find_student(&db_tx, student_id).await?;
                    if student.parent_id != parent.id {
                        return Err(EngineError::field(
                            "student_id",
                            "student does not belong to this parent",
                        ));
                    }
                    let exists = invoices::Entity::find()
                        .filter(invoices::Column::StudentId.eq(student_id.to_string()))
                        .filter(invoices::Column::Month.eq(cmd.month.to_string()))
                        .one(&db_tx)
                        .await?
                        .is_some();
                    if exists {
                        return Err(EngineError::InvalidState(format!(
                            "a tuition invoice for {} already exists",
                            cmd.month
                        )));
                    }
                    InvoiceKind::Tuition
                }
                None => InvoiceKind::General,
            };
            let invoice = Invoice {
                id: Uuid::new_v4(),
                kind,
                parent_id: parent.id,
                student_id: cmd.student_id,
                month: cmd.month,
                amount: cmd.amount,
                penalty_amount: MoneyCents::ZERO,
                due_date: cmd.due_date,
                is_paid: false,
                created_at: Utc::now(),
            };
            invoices::ActiveModel::from(&invoice).insert(&db_tx).await?;
            tracing::info!(invoice = %invoice.id, kind = %kind, amount = %invoice.amount, "invoice created");
            Ok(invoice)
        })
    }

    /// Invoices visible to the actor, with penalties brought up to `today`.
    ///
    /// Staff see every invoice, parents their own, everybody else nothing.
    pub async fn invoices(&self, actor: &Actor, today: NaiveDate) -> ResultEngine<Vec<Invoice>> {
        access::require(actor, Action::ViewInvoices)?;
        let mut query = invoices::Entity::find();
        if !actor.is_staff() {
            if actor.role != Role::Parent {
                return Ok(Vec::new());
            }
            query = query.filter(invoices::Column::ParentId.eq(actor.user_id.to_string()));
        }
        with_tx!(self, |db_tx| {
            let mut list = collect_invoices(
                query
                    .order_by_desc(invoices::Column::Month)
                    .order_by_asc(invoices::Column::DueDate)
                    .all(&db_tx)
                    .await?,
            )?;
            evaluate_all(&db_tx, &mut list, today).await?;
            Ok(list)
        })
    }

    /// Payments visible to the actor, newest first.
    pub async fn payments(&self, actor: &Actor) -> ResultEngine<Vec<Payment>> {
        access::require(actor, Action::ViewInvoices)?;
        let mut query = payments::Entity::find();
        if !actor.is_staff() {
            if actor.role != Role::Parent {
                return Ok(Vec::new());
            }
            query = query
                .inner_join(invoices::Entity)
                .filter(invoices::Column::ParentId.eq(actor.user_id.to_string()));
        }
        query
            .order_by_desc(payments::Column::PaidAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Payment::try_from)
            .collect()
    }

    /// Records a payment toward an invoice and books it as income.
    ///
    /// Tuition payments are booked as `STUDENT_FEE`, general invoices as
    /// `MANUAL_INCOME`. The invoice is re-evaluated afterwards and may flip
    /// to paid.
    pub async fn record_payment(
        &self,
        actor: &Actor,
        invoice_id: Uuid,
        amount: MoneyCents,
        today: NaiveDate,
    ) -> ResultEngine<(Invoice, Payment)> {
        access::require(actor, Action::RecordPayment)?;
        require_positive(amount, "amount")?;
        with_tx!(self, |db_tx| {
            let mut invoice = require_invoice(&db_tx, invoice_id).await?;
            if !actor.is_staff() && invoice.parent_id != actor.user_id {
                return Err(EngineError::Forbidden(
                    "invoice belongs to another parent".to_string(),
                ));
            }
            if invoice.is_paid {
                return Err(EngineError::InvalidState(
                    "invoice is already paid".to_string(),
                ));
            }

            let payment = Payment {
                id: Uuid::new_v4(),
                invoice_id: invoice.id,
                amount,
                paid_by: Some(actor.user_id),
                paid_at: Utc::now(),
            };
            payments::ActiveModel::from(&payment).insert(&db_tx).await?;

            let (entry_type, description) = match invoice.kind {
                InvoiceKind::Tuition => {
                    let parent = require_user(&db_tx, invoice.parent_id).await?;
                    let subject = billed_for(&db_tx, &invoice).await?;
                    (
                        LedgerEntryType::StudentFee,
                        format!(
                            "Student fee received from {} for {subject} ({}).",
                            parent.display_name(),
                            invoice.month
                        ),
                    )
                }
                InvoiceKind::General => (
                    LedgerEntryType::ManualIncome,
                    format!("Finance payment received for invoice {}.", invoice.id),
                ),
            };
            post_entry(&db_tx, entry_type, amount, description, Some(actor.user_id)).await?;

            let penalty_per_day = fee_setting(&db_tx).await?.penalty_per_day;
            evaluate_invoice(&db_tx, &mut invoice, today, penalty_per_day).await?;
            tracing::info!(invoice = %invoice.id, %amount, paid = invoice.is_paid, "payment recorded");
            Ok((invoice, payment))
        })
    }

    pub async fn fee_setting(&self, actor: &Actor) -> ResultEngine<FeeSetting> {
        access::require(actor, Action::ManageFeeSettings)?;
        fee_setting(&self.database).await
    }

    /// Sets the late fee charged per overdue day.
    pub async fn update_fee_setting(
        &self,
        actor: &Actor,
        penalty_per_day: MoneyCents,
    ) -> ResultEngine<FeeSetting> {
        access::require(actor, Action::ManageFeeSettings)?;
        if penalty_per_day.is_negative() {
            return Err(EngineError::field("penalty_per_day", "must not be negative"));
        }
        with_tx!(self, |db_tx| {
            fee_setting(&db_tx).await?;
            let model = fee_settings::ActiveModel {
                scope: ActiveValue::Set(SCHOOL_SCOPE.to_string()),
                penalty_per_day_minor: ActiveValue::Set(penalty_per_day.cents()),
                updated_at: ActiveValue::Set(Utc::now()),
            };
            let setting = FeeSetting::from(model.update(&db_tx).await?);
            tracing::info!(penalty_per_day = %setting.penalty_per_day, "fee setting updated");
            Ok(setting)
        })
    }

    /// Creates this month's tuition invoice for every active student that
    /// does not have one yet.
    pub async fn generate_monthly_invoices(
        &self,
        actor: &Actor,
        today: NaiveDate,
        due_day: u32,
    ) -> ResultEngine<BillingRunSummary> {
        access::require(actor, Action::RunBilling)?;
        let (month, created) =
            with_tx!(self, |db_tx| generate_invoices(&db_tx, today, due_day).await)?;
        tracing::info!(%month, created, "monthly invoices generated");
        Ok(BillingRunSummary {
            month: Some(month),
            invoices_created: created,
            ..Default::default()
        })
    }

    /// Recomputes penalties of every unpaid invoice.
    pub async fn apply_overdue_penalties(
        &self,
        actor: &Actor,
        today: NaiveDate,
    ) -> ResultEngine<BillingRunSummary> {
        access::require(actor, Action::RunBilling)?;
        let (penalties, paid) = with_tx!(self, |db_tx| apply_penalties(&db_tx, today).await)?;
        tracing::info!(penalties, paid, "overdue penalties applied");
        Ok(BillingRunSummary {
            penalties_updated: penalties,
            invoices_paid: paid,
            ..Default::default()
        })
    }

    /// Reminds parents of invoices due in three days, once per invoice.
    pub async fn send_due_reminders(
        &self,
        actor: &Actor,
        today: NaiveDate,
    ) -> ResultEngine<BillingRunSummary> {
        access::require(actor, Action::RunBilling)?;
        let reminders = with_tx!(self, |db_tx| send_reminders(&db_tx, today).await)?;
        tracing::info!(reminders, "due reminders sent");
        Ok(BillingRunSummary {
            reminders_created: reminders,
            ..Default::default()
        })
    }

    /// All three billing steps, in order, on behalf of `actor`.
    pub async fn run_billing(
        &self,
        actor: &Actor,
        today: NaiveDate,
        due_day: u32,
    ) -> ResultEngine<BillingRunSummary> {
        access::require(actor, Action::RunBilling)?;
        self.run_scheduled_billing(today, due_day).await
    }

    /// The periodic billing job, for trusted operators such as the admin CLI.
    pub async fn run_scheduled_billing(
        &self,
        today: NaiveDate,
        due_day: u32,
    ) -> ResultEngine<BillingRunSummary> {
        let (month, invoices_created) =
            with_tx!(self, |db_tx| generate_invoices(&db_tx, today, due_day).await)?;
        let (penalties_updated, invoices_paid) =
            with_tx!(self, |db_tx| apply_penalties(&db_tx, today).await)?;
        let reminders_created = with_tx!(self, |db_tx| send_reminders(&db_tx, today).await)?;
        let summary = BillingRunSummary {
            month: Some(month),
            invoices_created,
            penalties_updated,
            invoices_paid,
            reminders_created,
        };
        tracing::info!(
            %month,
            invoices_created,
            penalties_updated,
            invoices_paid,
            reminders_created,
            "billing run finished"
        );
        Ok(summary)
    }

    /// Paid, unpaid and overdue invoices of a month.
    pub async fn billing_dashboard(
        &self,
        actor: &Actor,
        month: Month,
        today: NaiveDate,
    ) -> ResultEngine<BillingDashboard> {
        access::require(actor, Action::ViewBillingDashboard)?;
        with_tx!(self, |db_tx| {
            let mut list = collect_invoices(
                invoices::Entity::find()
                    .filter(invoices::Column::Month.eq(month.to_string()))
                    .order_by_asc(invoices::Column::DueDate)
                    .all(&db_tx)
                    .await?,
            )?;
            evaluate_all(&db_tx, &mut list, today).await?;
            let total_invoices = list.len();
            let (paid_invoices, unpaid_invoices): (Vec<Invoice>, Vec<Invoice>) =
                list.into_iter().partition(|invoice| invoice.is_paid);
            let overdue_count = unpaid_invoices
                .iter()
                .filter(|invoice| invoice.is_overdue(today))
                .count();
            Ok(BillingDashboard {
                month,
                total_invoices,
                paid_invoices,
                unpaid_invoices,
                overdue_count,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_day_is_clamped_to_every_month() {
        assert_eq!(clamp_due_day(0), 1);
        assert_eq!(clamp_due_day(5), 5);
        assert_eq!(clamp_due_day(31), 28);
    }
}
