//! Daily attendance marks, counted by payroll generation.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;

use crate::util::impl_text_enum;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl_text_enum!(AttendanceStatus, "attendance status", {
    Present => "PRESENT",
    Absent => "ABSENT",
});

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "attendance")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub employee_id: String,
    pub date: NaiveDate,
    pub status: String,
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
