//! Employee cash credits (advances) and their repayment progress.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents,
    util::{impl_text_enum, parse_opt_uuid, parse_uuid},
};

/// `PENDING -> {APPROVED, REJECTED}`, `APPROVED -> GIVEN`, `GIVEN -> CLOSED`
/// once `total_repaid >= amount`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CreditStatus {
    Pending,
    Approved,
    Rejected,
    Given,
    Closed,
}

impl_text_enum!(CreditStatus, "credit status", {
    Pending => "PENDING",
    Approved => "APPROVED",
    Rejected => "REJECTED",
    Given => "GIVEN",
    Closed => "CLOSED",
});

impl CreditStatus {
    pub fn can_review(self) -> bool {
        self == Self::Pending
    }

    pub fn can_give(self) -> bool {
        self == Self::Approved
    }

    /// Repayments are accepted once money went out, including after closure.
    pub fn accepts_repayment(self) -> bool {
        matches!(self, Self::Given | Self::Closed)
    }

    /// Status after a repayment brought the running total to `total_repaid`.
    pub fn after_repayment(self, total_repaid: MoneyCents, amount: MoneyCents) -> Self {
        if self == Self::Given && total_repaid >= amount {
            Self::Closed
        } else {
            self
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreditRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub amount: MoneyCents,
    pub reason: String,
    pub status: CreditStatus,
    pub admin_comment: String,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub given_by: Option<Uuid>,
    pub given_at: Option<DateTime<Utc>>,
    pub total_repaid: MoneyCents,
    pub created_at: DateTime<Utc>,
}

impl CreditRequest {
    pub fn outstanding(&self) -> MoneyCents {
        self.amount - self.total_repaid
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "credit_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub employee_id: String,
    pub amount_minor: i64,
    pub reason: String,
    pub status: String,
    pub admin_comment: String,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTimeUtc>,
    pub given_by: Option<String>,
    pub given_at: Option<DateTimeUtc>,
    pub total_repaid_minor: i64,
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
    #[sea_orm(has_many = "super::credit_repayments::Entity")]
    Repayments,
}

impl Related<super::employees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employees.def()
    }
}

impl Related<super::credit_repayments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Repayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CreditRequest> for ActiveModel {
    fn from(value: &CreditRequest) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            employee_id: ActiveValue::Set(value.employee_id.to_string()),
            amount_minor: ActiveValue::Set(value.amount.cents()),
            reason: ActiveValue::Set(value.reason.clone()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            admin_comment: ActiveValue::Set(value.admin_comment.clone()),
            reviewed_by: ActiveValue::Set(value.reviewed_by.map(|id| id.to_string())),
            reviewed_at: ActiveValue::Set(value.reviewed_at),
            given_by: ActiveValue::Set(value.given_by.map(|id| id.to_string())),
            given_at: ActiveValue::Set(value.given_at),
            total_repaid_minor: ActiveValue::Set(value.total_repaid.cents()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for CreditRequest {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "credit request")?,
            employee_id: parse_uuid(&model.employee_id, "employee")?,
            amount: MoneyCents::new(model.amount_minor),
            reason: model.reason,
            status: CreditStatus::try_from(model.status.as_str())?,
            admin_comment: model.admin_comment,
            reviewed_by: parse_opt_uuid(model.reviewed_by.as_deref(), "user")?,
            reviewed_at: model.reviewed_at,
            given_by: parse_opt_uuid(model.given_by.as_deref(), "user")?,
            given_at: model.given_at,
            total_repaid: MoneyCents::new(model.total_repaid_minor),
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closes_once_fully_repaid() {
        let amount = MoneyCents::new(10_000);
        assert_eq!(
            CreditStatus::Given.after_repayment(MoneyCents::new(9_999), amount),
            CreditStatus::Given
        );
        assert_eq!(
            CreditStatus::Given.after_repayment(amount, amount),
            CreditStatus::Closed
        );
    }

    #[test]
    fn repayment_after_closure_keeps_status() {
        let amount = MoneyCents::new(100);
        assert!(CreditStatus::Closed.accepts_repayment());
        assert_eq!(
            CreditStatus::Closed.after_repayment(MoneyCents::new(500), amount),
            CreditStatus::Closed
        );
    }

    #[test]
    fn money_must_be_given_before_repayment() {
        assert!(!CreditStatus::Approved.accepts_repayment());
        assert!(!CreditStatus::Pending.accepts_repayment());
        assert!(CreditStatus::Approved.can_give());
        assert!(!CreditStatus::Given.can_give());
    }
}
