//! Monthly payroll records.
//!
//! One row per `(employee, month)`. Computed fields always satisfy
//! `gross = base + overtime + bonus - deductions` and `net = gross - tax`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Month, MoneyCents, Percent,
    util::{impl_text_enum, parse_opt_uuid, parse_uuid},
};

/// Payroll approval state machine.
///
/// ```text
/// PENDING -> PAYMENT_REQUESTED -> APPROVED -> PAID
///                 ^        \
///                 |         -> REJECTED
///                 +-----------/   (request again, or regenerate to PENDING)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PayrollStatus {
    Pending,
    PaymentRequested,
    Approved,
    Rejected,
    Paid,
}

impl_text_enum!(PayrollStatus, "payroll status", {
    Pending => "PENDING",
    PaymentRequested => "PAYMENT_REQUESTED",
    Approved => "APPROVED",
    Rejected => "REJECTED",
    Paid => "PAID",
});

impl PayrollStatus {
    /// `PAID` rows are frozen: regeneration skips them.
    pub fn is_regenerable(self) -> bool {
        self != Self::Paid
    }

    /// Status a row takes after its figures are regenerated.
    pub fn after_regeneration(self) -> Self {
        match self {
            Self::Pending | Self::Rejected => Self::Pending,
            other => other,
        }
    }

    pub fn can_request_payment(self) -> bool {
        !matches!(self, Self::Paid | Self::Approved)
    }

    pub fn can_review(self) -> bool {
        self == Self::PaymentRequested
    }

    pub fn can_pay(self) -> bool {
        self == Self::Approved
    }
}

/// Derived monetary figures of a payroll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PayrollFigures {
    pub base_salary: MoneyCents,
    pub overtime_amount: MoneyCents,
    pub total_bonus: MoneyCents,
    pub total_deductions: MoneyCents,
    pub gross_salary: MoneyCents,
    pub tax_rate: Percent,
    pub tax_amount: MoneyCents,
    pub net_salary: MoneyCents,
}

impl PayrollFigures {
    /// Tax is zero when gross is not positive.
    pub fn compute(
        base_salary: MoneyCents,
        overtime_amount: MoneyCents,
        total_bonus: MoneyCents,
        total_deductions: MoneyCents,
        tax_rate: Percent,
    ) -> Self {
        let gross_salary = base_salary + overtime_amount + total_bonus - total_deductions;
        let tax_amount = if gross_salary.is_positive() {
            tax_rate.of(gross_salary)
        } else {
            MoneyCents::ZERO
        };
        Self {
            base_salary,
            overtime_amount,
            total_bonus,
            total_deductions,
            gross_salary,
            tax_rate,
            tax_amount,
            net_salary: gross_salary - tax_amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payroll {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub month: Month,
    pub total_present_days: i32,
    pub figures: PayrollFigures,
    pub status: PayrollStatus,
    pub requested_by: Option<Uuid>,
    pub requested_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_comment: String,
    pub paid_by: Option<Uuid>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Payroll {
    pub(crate) fn clear_review(&mut self) {
        self.reviewed_by = None;
        self.reviewed_at = None;
        self.review_comment.clear();
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "payrolls")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub employee_id: String,
    pub month: String,
    pub base_salary_minor: i64,
    pub total_present_days: i32,
    pub overtime_amount_minor: i64,
    pub total_bonus_minor: i64,
    pub total_deductions_minor: i64,
    pub gross_salary_minor: i64,
    pub tax_rate_bp: i64,
    pub tax_amount_minor: i64,
    pub net_salary_minor: i64,
    pub status: String,
    pub requested_by: Option<String>,
    pub requested_at: Option<DateTimeUtc>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTimeUtc>,
    pub review_comment: String,
    pub paid_by: Option<String>,
    pub paid_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employees::Entity",
        from = "Column::EmployeeId",
        to = "super::employees::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Employees,
}

impl Related<super::employees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employees.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Payroll> for ActiveModel {
    fn from(value: &Payroll) -> Self {
        let f = &value.figures;
        let opt_id = |id: Option<Uuid>| id.map(|id| id.to_string());
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            employee_id: ActiveValue::Set(value.employee_id.to_string()),
            month: ActiveValue::Set(value.month.to_string()),
            base_salary_minor: ActiveValue::Set(f.base_salary.cents()),
            total_present_days: ActiveValue::Set(value.total_present_days),
            overtime_amount_minor: ActiveValue::Set(f.overtime_amount.cents()),
            total_bonus_minor: ActiveValue::Set(f.total_bonus.cents()),
            total_deductions_minor: ActiveValue::Set(f.total_deductions.cents()),
            gross_salary_minor: ActiveValue::Set(f.gross_salary.cents()),
            tax_rate_bp: ActiveValue::Set(f.tax_rate.bp()),
            tax_amount_minor: ActiveValue::Set(f.tax_amount.cents()),
            net_salary_minor: ActiveValue::Set(f.net_salary.cents()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            requested_by: ActiveValue::Set(opt_id(value.requested_by)),
            requested_at: ActiveValue::Set(value.requested_at),
            reviewed_by: ActiveValue::Set(opt_id(value.reviewed_by)),
            reviewed_at: ActiveValue::Set(value.reviewed_at),
            review_comment: ActiveValue::Set(value.review_comment.clone()),
            paid_by: ActiveValue::Set(opt_id(value.paid_by)),
            paid_at: ActiveValue::Set(value.paid_at),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Payroll {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "payroll")?,
            employee_id: parse_uuid(&model.employee_id, "employee")?,
            month: model.month.parse()?,
            total_present_days: model.total_present_days,
            figures: PayrollFigures {
                base_salary: MoneyCents::new(model.base_salary_minor),
                overtime_amount: MoneyCents::new(model.overtime_amount_minor),
                total_bonus: MoneyCents::new(model.total_bonus_minor),
                total_deductions: MoneyCents::new(model.total_deductions_minor),
                gross_salary: MoneyCents::new(model.gross_salary_minor),
                tax_rate: Percent::from_bp(model.tax_rate_bp),
                tax_amount: MoneyCents::new(model.tax_amount_minor),
                net_salary: MoneyCents::new(model.net_salary_minor),
            },
            status: PayrollStatus::try_from(model.status.as_str())?,
            requested_by: parse_opt_uuid(model.requested_by.as_deref(), "user")?,
            requested_at: model.requested_at,
            reviewed_by: parse_opt_uuid(model.reviewed_by.as_deref(), "user")?,
            reviewed_at: model.reviewed_at,
            review_comment: model.review_comment,
            paid_by: parse_opt_uuid(model.paid_by.as_deref(), "user")?,
            paid_at: model.paid_at,
            created_at: model.created_at,
        })
    }
}
