//! Employee profiles.
//!
//! Maintained by the HR subsystem; payroll generation only reads the salary.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, Role,
    util::{impl_text_enum, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EmployeeRole {
    Teacher,
    Accountant,
    Driver,
    Admin,
}

impl_text_enum!(EmployeeRole, "employee role", {
    Teacher => "TEACHER",
    Accountant => "ACCOUNTANT",
    Driver => "DRIVER",
    Admin => "ADMIN",
});

impl EmployeeRole {
    /// Role of the user account backing this employee (`ADMIN` is a director).
    pub fn account_role(self) -> Role {
        match self {
            Self::Teacher => Role::Teacher,
            Self::Accountant => Role::Accountant,
            Self::Driver => Role::Driver,
            Self::Admin => Role::Director,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Employee {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: EmployeeRole,
    pub salary: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub user_id: String,
    pub role: String,
    pub salary_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Employee {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "employee")?,
            user_id: parse_uuid(&model.user_id, "user")?,
            role: EmployeeRole::try_from(model.role.as_str())?,
            salary: MoneyCents::new(model.salary_minor),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_employees_are_directors() {
        assert_eq!(EmployeeRole::Admin.account_role(), Role::Director);
        assert_eq!(EmployeeRole::Driver.account_role(), Role::Driver);
    }
}
