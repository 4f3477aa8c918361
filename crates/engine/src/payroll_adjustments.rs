//! Bonuses and deductions feeding payroll generation.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{
    EngineError, Month, MoneyCents,
    util::{impl_text_enum, parse_opt_uuid, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AdjustmentKind {
    Bonus,
    Deduction,
}

impl_text_enum!(AdjustmentKind, "adjustment kind", {
    Bonus => "BONUS",
    Deduction => "DEDUCTION",
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PayrollAdjustment {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub month: Month,
    pub kind: AdjustmentKind,
    pub amount: MoneyCents,
    pub reason: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "payroll_adjustments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub employee_id: String,
    pub month: String,
    pub kind: String,
    pub amount_minor: i64,
    pub reason: String,
    pub created_by: Option<String>,
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

impl TryFrom<Model> for PayrollAdjustment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "adjustment")?,
            employee_id: parse_uuid(&model.employee_id, "employee")?,
            month: model.month.parse()?,
            kind: AdjustmentKind::try_from(model.kind.as_str())?,
            amount: MoneyCents::new(model.amount_minor),
            reason: model.reason,
            created_by: parse_opt_uuid(model.created_by.as_deref(), "user")?,
            created_at: model.created_at,
        })
    }
}
