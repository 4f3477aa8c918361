//! Invoices owed by parents, with overdue penalty accrual.
//!
//! `GENERAL` invoices are billed to a parent directly; `TUITION` invoices
//! also reference a student and exist at most once per `(student, month)`.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Month, MoneyCents,
    util::{impl_text_enum, parse_opt_uuid, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InvoiceKind {
    General,
    Tuition,
}

impl_text_enum!(InvoiceKind, "invoice kind", {
    General => "GENERAL",
    Tuition => "TUITION",
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invoice {
    pub id: Uuid,
    pub kind: InvoiceKind,
    pub parent_id: Uuid,
    pub student_id: Option<Uuid>,
    pub month: Month,
    pub amount: MoneyCents,
    pub penalty_amount: MoneyCents,
    pub due_date: NaiveDate,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    pub fn total_amount_due(&self) -> MoneyCents {
        self.amount + self.penalty_amount
    }

    /// `true` once `total_paid` covers the amount plus penalty.
    pub fn is_settled_by(&self, total_paid: MoneyCents) -> bool {
        total_paid >= self.total_amount_due()
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_paid && self.due_date < today
    }
}

/// Penalty an invoice due on `due_date` has accrued by `today`.
///
/// Zero while the invoice is not yet overdue.
pub fn overdue_penalty(
    due_date: NaiveDate,
    today: NaiveDate,
    penalty_per_day: MoneyCents,
) -> MoneyCents {
    if due_date >= today {
        return MoneyCents::ZERO;
    }
    let overdue_days = (today - due_date).num_days();
    MoneyCents::new(penalty_per_day.cents().saturating_mul(overdue_days))
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub parent_id: String,
    pub student_id: Option<String>,
    pub month: String,
    pub amount_minor: i64,
    pub penalty_amount_minor: i64,
    pub due_date: Date,
    pub is_paid: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ParentId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Parents,
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Students,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Students.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Invoice> for ActiveModel {
    fn from(value: &Invoice) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            parent_id: ActiveValue::Set(value.parent_id.to_string()),
            student_id: ActiveValue::Set(value.student_id.map(|id| id.to_string())),
            month: ActiveValue::Set(value.month.to_string()),
            amount_minor: ActiveValue::Set(value.amount.cents()),
            penalty_amount_minor: ActiveValue::Set(value.penalty_amount.cents()),
            due_date: ActiveValue::Set(value.due_date),
            is_paid: ActiveValue::Set(value.is_paid),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Invoice {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "invoice")?,
            kind: InvoiceKind::try_from(model.kind.as_str())?,
            parent_id: parse_uuid(&model.parent_id, "parent")?,
            student_id: parse_opt_uuid(model.student_id.as_deref(), "student")?,
            month: model.month.parse()?,
            amount: MoneyCents::new(model.amount_minor),
            penalty_amount: MoneyCents::new(model.penalty_amount_minor),
            due_date: model.due_date,
            is_paid: model.is_paid,
            created_at: model.created_at,
        })
    }
}
