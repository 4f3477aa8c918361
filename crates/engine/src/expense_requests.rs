//! Expense reimbursement requests.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents,
    util::{impl_text_enum, parse_opt_uuid, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExpenseCategory {
    Fuel,
    Garage,
    Other,
}

impl_text_enum!(ExpenseCategory, "expense category", {
    Fuel => "FUEL",
    Garage => "GARAGE",
    Other => "OTHER",
});

/// `PENDING -> {APPROVED, REJECTED}`, `APPROVED -> PAID`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExpenseStatus {
    Pending,
    Approved,
    Rejected,
    Paid,
}

impl_text_enum!(ExpenseStatus, "expense status", {
    Pending => "PENDING",
    Approved => "APPROVED",
    Rejected => "REJECTED",
    Paid => "PAID",
});

impl ExpenseStatus {
    pub fn can_review(self) -> bool {
        self == Self::Pending
    }

    pub fn can_pay(self) -> bool {
        self == Self::Approved
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseRequest {
    pub id: Uuid,
    pub requested_by: Uuid,
    pub category: ExpenseCategory,
    pub title: String,
    pub amount: MoneyCents,
    pub reason: String,
    pub status: ExpenseStatus,
    pub admin_comment: String,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub paid_by: Option<Uuid>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "expense_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub requested_by: String,
    pub category: String,
    pub title: String,
    pub amount_minor: i64,
    pub reason: String,
    pub status: String,
    pub admin_comment: String,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTimeUtc>,
    pub paid_by: Option<String>,
    pub paid_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::RequestedBy",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Requesters,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requesters.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ExpenseRequest> for ActiveModel {
    fn from(value: &ExpenseRequest) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            requested_by: ActiveValue::Set(value.requested_by.to_string()),
            category: ActiveValue::Set(value.category.as_str().to_string()),
            title: ActiveValue::Set(value.title.clone()),
            amount_minor: ActiveValue::Set(value.amount.cents()),
            reason: ActiveValue::Set(value.reason.clone()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            admin_comment: ActiveValue::Set(value.admin_comment.clone()),
            reviewed_by: ActiveValue::Set(value.reviewed_by.map(|id| id.to_string())),
            reviewed_at: ActiveValue::Set(value.reviewed_at),
            paid_by: ActiveValue::Set(value.paid_by.map(|id| id.to_string())),
            paid_at: ActiveValue::Set(value.paid_at),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for ExpenseRequest {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "expense request")?,
            requested_by: parse_uuid(&model.requested_by, "user")?,
            category: ExpenseCategory::try_from(model.category.as_str())?,
            title: model.title,
            amount: MoneyCents::new(model.amount_minor),
            reason: model.reason,
            status: ExpenseStatus::try_from(model.status.as_str())?,
            admin_comment: model.admin_comment,
            reviewed_by: parse_opt_uuid(model.reviewed_by.as_deref(), "user")?,
            reviewed_at: model.reviewed_at,
            paid_by: parse_opt_uuid(model.paid_by.as_deref(), "user")?,
            paid_at: model.paid_at,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_expenses_cannot_be_paid() {
        assert!(ExpenseStatus::Pending.can_review());
        assert!(!ExpenseStatus::Rejected.can_review());
        assert!(!ExpenseStatus::Rejected.can_pay());
        assert!(ExpenseStatus::Approved.can_pay());
        assert!(!ExpenseStatus::Paid.can_pay());
    }
}
