//! Payroll generation and the approval pipeline.
//!
//! Generation reads the collaborator records (salary, attendance, bonuses,
//! deductions) and the global tax rate, and upserts one payroll per employee
//! and month. The accountant then requests payment, a director reviews, and
//! the accountant pays, which debits the school ledger.

use chrono::Utc;
use sea_orm::{
    ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{
    Action, Actor, AdjustmentCmd, AdjustmentKind, AttendanceStatus, Employee, EngineError,
    GeneratePayrollCmd, LedgerEntryType, MoneyCents, Month, NotificationCategory, Payroll,
    PayrollAdjustment, PayrollFigures, PayrollSetting, PayrollStatus, Percent, ResultEngine,
    ReviewCmd, Role, access, attendance, employees, payroll_adjustments, payrolls,
    school_account::SCHOOL_SCOPE,
    settings::payroll_settings,
    util::{comment_or_default, normalize_optional_text, require_positive},
};

use super::{
    Engine, ledger::post_entry, notifications::notify_users, notifications::users_with_roles,
    require_employee, require_user, with_tx,
};

async fn payroll_setting<C: ConnectionTrait>(db: &C) -> ResultEngine<PayrollSetting> {
    let model = payroll_settings::ActiveModel {
        scope: ActiveValue::Set(SCHOOL_SCOPE.to_string()),
        tax_rate_bp: ActiveValue::Set(0),
        updated_at: ActiveValue::Set(Utc::now()),
    };
    payroll_settings::Entity::insert(model)
        .on_conflict(
            OnConflict::column(payroll_settings::Column::Scope)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    let model = payroll_settings::Entity::find_by_id(SCHOOL_SCOPE.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("payroll settings not exists".to_string()))?;
    Ok(model.into())
}

async fn require_payroll<C: ConnectionTrait>(db: &C, payroll_id: Uuid) -> ResultEngine<Payroll> {
    payrolls::Entity::find_by_id(payroll_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("payroll not exists".to_string()))?
        .try_into()
}

async fn save_payroll<C: ConnectionTrait>(db: &C, payroll: &Payroll) -> ResultEngine<()> {
    payrolls::ActiveModel::from(payroll).update(db).await?;
    Ok(())
}

/// Display name of the user behind an employee profile.
async fn employee_name<C: ConnectionTrait>(db: &C, employee_id: Uuid) -> ResultEngine<(Uuid, String)> {
    let employee = require_employee(db, employee_id).await?;
    let user = require_user(db, employee.user_id).await?;
    Ok((user.id, user.display_name().to_string()))
}

async fn present_days<C: ConnectionTrait>(
    db: &C,
    employee_id: Uuid,
    month: Month,
) -> ResultEngine<i32> {
    let (first, last) = month.bounds()?;
    let count = attendance::Entity::find()
        .filter(attendance::Column::EmployeeId.eq(employee_id.to_string()))
        .filter(attendance::Column::Status.eq(AttendanceStatus::Present.as_str()))
        .filter(attendance::Column::Date.between(first, last))
        .count(db)
        .await?;
    i32::try_from(count).map_err(|_| EngineError::InvalidInput("too many attendance rows".to_string()))
}

/// Bonus and deduction totals of one employee for one month.
async fn adjustment_totals<C: ConnectionTrait>(
    db: &C,
    employee_id: Uuid,
    month: Month,
) -> ResultEngine<(MoneyCents, MoneyCents)> {
    let adjustments: Vec<PayrollAdjustment> = payroll_adjustments::Entity::find()
        .filter(payroll_adjustments::Column::EmployeeId.eq(employee_id.to_string()))
        .filter(payroll_adjustments::Column::Month.eq(month.to_string()))
        .all(db)
        .await?
        .into_iter()
        .map(PayrollAdjustment::try_from)
        .collect::<ResultEngine<_>>()?;
    let total = |kind: AdjustmentKind| -> MoneyCents {
        adjustments
            .iter()
            .filter(|a| a.kind == kind)
            .map(|a| a.amount)
            .sum()
    };
    Ok((total(AdjustmentKind::Bonus), total(AdjustmentKind::Deduction)))
}

impl Engine {
    /// Computes payrolls for a month and upserts them.
    ///
    /// `PAID` payrolls are never touched. `PENDING` and `REJECTED` ones are
    /// recomputed and reset to `PENDING` with their review cleared; payrolls
    /// awaiting review or already approved get new figures but keep their
    /// status. Returns the ids of every payroll written.
    pub async fn generate_payroll(
        &self,
        actor: &Actor,
        cmd: GeneratePayrollCmd,
    ) -> ResultEngine<Vec<Uuid>> {
        access::require(actor, Action::GeneratePayroll)?;
        if cmd.overtime_amount.is_negative() {
            return Err(EngineError::field("overtime_amount", "must not be negative"));
        }
        let month = cmd.month;
        with_tx!(self, |db_tx| {
            let tax_rate = payroll_setting(&db_tx).await?.tax_rate;
            let targets: Vec<Employee> = match cmd.employee_id {
                Some(employee_id) => vec![require_employee(&db_tx, employee_id).await?],
                None => employees::Entity::find()
                    .order_by_asc(employees::Column::Id)
                    .all(&db_tx)
                    .await?
                    .into_iter()
                    .map(Employee::try_from)
                    .collect::<ResultEngine<_>>()?,
            };

            let now = Utc::now();
            let mut generated = Vec::with_capacity(targets.len());
            for employee in targets {
                let total_present_days = present_days(&db_tx, employee.id, month).await?;
                let (bonus, deductions) = adjustment_totals(&db_tx, employee.id, month).await?;
                let figures = PayrollFigures::compute(
                    employee.salary,
                    cmd.overtime_amount,
                    bonus,
                    deductions,
                    tax_rate,
                );

                let existing = payrolls::Entity::find()
                    .filter(payrolls::Column::EmployeeId.eq(employee.id.to_string()))
                    .filter(payrolls::Column::Month.eq(month.to_string()))
                    .one(&db_tx)
                    .await?;

                match existing {
                    None => {
                        let payroll = Payroll {
                            id: Uuid::new_v4(),
                            employee_id: employee.id,
                            month,
                            total_present_days,
                            figures,
                            status: PayrollStatus::Pending,
                            requested_by: None,
                            requested_at: None,
                            reviewed_by: None,
                            reviewed_at: None,
                            review_comment: String::new(),
                            paid_by: None,
                            paid_at: None,
                            created_at: now,
                        };
                        payrolls::ActiveModel::from(&payroll).insert(&db_tx).await?;
                        generated.push(payroll.id);
                    }
                    Some(model) => {
                        let mut payroll = Payroll::try_from(model)?;
                        if !payroll.status.is_regenerable() {
                            tracing::debug!(payroll = %payroll.id, "paid payroll left untouched");
                            continue;
                        }
                        payroll.total_present_days = total_present_days;
                        payroll.figures = figures;
                        payroll.status = payroll.status.after_regeneration();
                        if payroll.status == PayrollStatus::Pending {
                            payroll.clear_review();
                        }
                        save_payroll(&db_tx, &payroll).await?;
                        generated.push(payroll.id);
                    }
                }
            }

            tracing::info!(%month, count = generated.len(), "payroll generated");
            Ok(generated)
        })
    }

    /// Submits payrolls for director approval.
    ///
    /// Payrolls already `APPROVED` or `PAID` are skipped. Returns the ids
    /// that moved to `PAYMENT_REQUESTED`.
    pub async fn request_payroll_payment(
        &self,
        actor: &Actor,
        payroll_ids: &[Uuid],
    ) -> ResultEngine<Vec<Uuid>> {
        access::require(actor, Action::RequestPayrollPayment)?;
        if payroll_ids.is_empty() {
            return Err(EngineError::field("payroll_ids", "must not be empty"));
        }
        with_tx!(self, |db_tx| {
            let found: Vec<Payroll> = payrolls::Entity::find()
                .filter(payrolls::Column::Id.is_in(payroll_ids.iter().map(ToString::to_string)))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Payroll::try_from)
                .collect::<ResultEngine<_>>()?;
            if found.is_empty() {
                return Err(EngineError::KeyNotFound(
                    "no payroll records found".to_string(),
                ));
            }

            let now = Utc::now();
            let mut requested = Vec::new();
            for mut payroll in found {
                if !payroll.status.can_request_payment() {
                    continue;
                }
                payroll.status = PayrollStatus::PaymentRequested;
                payroll.requested_by = Some(actor.user_id);
                payroll.requested_at = Some(now);
                payroll.clear_review();
                save_payroll(&db_tx, &payroll).await?;
                requested.push(payroll.id);
            }

            if !requested.is_empty() {
                let directors = users_with_roles(&db_tx, &[Role::Director], true).await?;
                notify_users(
                    &db_tx,
                    directors,
                    NotificationCategory::PayrollRequest,
                    "Payroll Payment Request",
                    &format!(
                        "Accountant {} requested payroll approval.",
                        actor.display_name()
                    ),
                )
                .await?;
            }
            tracing::info!(count = requested.len(), by = %actor.user_id, "payroll payment requested");
            Ok(requested)
        })
    }

    /// Approves or rejects a payroll awaiting review.
    pub async fn review_payroll(
        &self,
        actor: &Actor,
        payroll_id: Uuid,
        review: ReviewCmd,
    ) -> ResultEngine<Payroll> {
        access::require(actor, Action::ReviewPayroll)?;
        let comment = normalize_optional_text(review.comment.as_deref());
        with_tx!(self, |db_tx| {
            let mut payroll = require_payroll(&db_tx, payroll_id).await?;
            if !payroll.status.can_review() {
                tracing::warn!(payroll = %payroll.id, status = %payroll.status, "payroll review rejected");
                return Err(EngineError::InvalidState(
                    "payroll is not awaiting review".to_string(),
                ));
            }
            payroll.status = if review.approve {
                PayrollStatus::Approved
            } else {
                PayrollStatus::Rejected
            };
            payroll.review_comment = comment;
            payroll.reviewed_by = Some(actor.user_id);
            payroll.reviewed_at = Some(Utc::now());
            save_payroll(&db_tx, &payroll).await?;

            if let Some(requester) = payroll.requested_by {
                let (_, name) = employee_name(&db_tx, payroll.employee_id).await?;
                let (category, verdict) = if review.approve {
                    (NotificationCategory::PayrollApproval, "approved")
                } else {
                    (NotificationCategory::PayrollRejection, "rejected")
                };
                notify_users(
                    &db_tx,
                    [requester],
                    category,
                    "Payroll Review Update",
                    &format!(
                        "Payroll for {name} ({}) was {verdict}. Comment: {}",
                        payroll.month,
                        comment_or_default(&payroll.review_comment)
                    ),
                )
                .await?;
            }
            tracing::info!(payroll = %payroll.id, status = %payroll.status, "payroll reviewed");
            Ok(payroll)
        })
    }

    /// Pays an approved payroll and debits the net salary from the ledger.
    pub async fn pay_payroll(&self, actor: &Actor, payroll_id: Uuid) -> ResultEngine<Payroll> {
        access::require(actor, Action::PayPayroll)?;
        with_tx!(self, |db_tx| {
            let mut payroll = require_payroll(&db_tx, payroll_id).await?;
            if !payroll.status.can_pay() {
                tracing::warn!(payroll = %payroll.id, status = %payroll.status, "payroll payment rejected");
                return Err(EngineError::InvalidState(
                    "payroll must be approved before payment".to_string(),
                ));
            }
            let now = Utc::now();
            payroll.status = PayrollStatus::Paid;
            payroll.paid_by = Some(actor.user_id);
            payroll.paid_at = Some(now);
            save_payroll(&db_tx, &payroll).await?;

            let (employee_user, name) = employee_name(&db_tx, payroll.employee_id).await?;
            let net = payroll.figures.net_salary;
            post_entry(
                &db_tx,
                LedgerEntryType::SalaryPayment,
                -net,
                format!("Salary paid for {name} ({}).", payroll.month),
                Some(actor.user_id),
            )
            .await?;

            notify_users(
                &db_tx,
                [employee_user],
                NotificationCategory::PayrollPaid,
                "Monthly Salary Paid",
                &format!(
                    "Your salary for {} has been paid. Net amount: {net}.",
                    payroll.month
                ),
            )
            .await?;
            let directors = users_with_roles(&db_tx, &[Role::Director], true).await?;
            notify_users(
                &db_tx,
                directors,
                NotificationCategory::PayrollPaid,
                "Employee Paid",
                &format!("Paid: {name} for {}.", payroll.month),
            )
            .await?;

            tracing::info!(payroll = %payroll.id, %net, "payroll paid");
            Ok(payroll)
        })
    }

    /// Payrolls visible to the actor, optionally for one month.
    ///
    /// Accountants see everything, directors everything past `PENDING`, and
    /// everybody else only their own payrolls.
    pub async fn payrolls(&self, actor: &Actor, month: Option<Month>) -> ResultEngine<Vec<Payroll>> {
        access::require(actor, Action::ViewPayrolls)?;
        let mut query = payrolls::Entity::find();
        if actor.role != Role::Accountant {
            if actor.is_director() {
                query = query.filter(payrolls::Column::Status.ne(PayrollStatus::Pending.as_str()));
            } else {
                let Some(employee_id) = actor.employee_id else {
                    return Ok(Vec::new());
                };
                query = query.filter(payrolls::Column::EmployeeId.eq(employee_id.to_string()));
            }
        }
        if let Some(month) = month {
            query = query.filter(payrolls::Column::Month.eq(month.to_string()));
        }
        query
            .order_by_desc(payrolls::Column::Month)
            .order_by_desc(payrolls::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Payroll::try_from)
            .collect()
    }

    /// One payroll, readable by staff and by the employee it belongs to.
    pub async fn payroll(&self, actor: &Actor, payroll_id: Uuid) -> ResultEngine<Payroll> {
        access::require(actor, Action::ViewPayrolls)?;
        let payroll = require_payroll(&self.database, payroll_id).await?;
        if !actor.is_staff() && actor.employee_id != Some(payroll.employee_id) {
            return Err(EngineError::Forbidden(
                "payroll belongs to another employee".to_string(),
            ));
        }
        Ok(payroll)
    }

    pub async fn add_bonus(&self, actor: &Actor, cmd: AdjustmentCmd) -> ResultEngine<PayrollAdjustment> {
        self.add_adjustment(actor, AdjustmentKind::Bonus, cmd).await
    }

    pub async fn add_deduction(
        &self,
        actor: &Actor,
        cmd: AdjustmentCmd,
    ) -> ResultEngine<PayrollAdjustment> {
        self.add_adjustment(actor, AdjustmentKind::Deduction, cmd).await
    }

    async fn add_adjustment(
        &self,
        actor: &Actor,
        kind: AdjustmentKind,
        cmd: AdjustmentCmd,
    ) -> ResultEngine<PayrollAdjustment> {
        access::require(actor, Action::ManagePayrollAdjustments)?;
        require_positive(cmd.amount, "amount")?;
        let reason = normalize_optional_text(Some(&cmd.reason));
        with_tx!(self, |db_tx| {
            require_employee(&db_tx, cmd.employee_id).await?;
            let model = payroll_adjustments::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                employee_id: ActiveValue::Set(cmd.employee_id.to_string()),
                month: ActiveValue::Set(cmd.month.to_string()),
                kind: ActiveValue::Set(kind.as_str().to_string()),
                amount_minor: ActiveValue::Set(cmd.amount.cents()),
                reason: ActiveValue::Set(reason),
                created_by: ActiveValue::Set(Some(actor.user_id.to_string())),
                created_at: ActiveValue::Set(Utc::now()),
            };
            let adjustment = PayrollAdjustment::try_from(model.insert(&db_tx).await?)?;
            tracing::info!(
                employee = %adjustment.employee_id,
                month = %adjustment.month,
                kind = %kind,
                amount = %adjustment.amount,
                "payroll adjustment added"
            );
            Ok(adjustment)
        })
    }

    pub async fn payroll_setting(&self, actor: &Actor) -> ResultEngine<PayrollSetting> {
        access::require(actor, Action::ManagePayrollSettings)?;
        payroll_setting(&self.database).await
    }

    /// Sets the tax rate applied by future payroll generations.
    pub async fn update_payroll_setting(
        &self,
        actor: &Actor,
        tax_rate: Percent,
    ) -> ResultEngine<PayrollSetting> {
        access::require(actor, Action::ManagePayrollSettings)?;
        if tax_rate < Percent::ZERO || tax_rate > Percent::HUNDRED {
            return Err(EngineError::field(
                "tax_rate_bp",
                "must be between 0 and 100",
            ));
        }
        with_tx!(self, |db_tx| {
            payroll_setting(&db_tx).await?;
            let model = payroll_settings::ActiveModel {
                scope: ActiveValue::Set(SCHOOL_SCOPE.to_string()),
                tax_rate_bp: ActiveValue::Set(tax_rate.bp()),
                updated_at: ActiveValue::Set(Utc::now()),
            };
            let setting = PayrollSetting::from(model.update(&db_tx).await?);
            tracing::info!(tax_rate = %setting.tax_rate, "payroll tax rate updated");
            Ok(setting)
        })
    }
}
