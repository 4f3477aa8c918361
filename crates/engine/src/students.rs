//! Students, as read by the billing engine.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{EngineError, MoneyCents, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Student {
    pub id: Uuid,
    /// User with role `PARENT`.
    pub parent_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub class_name: String,
    pub active: bool,
    pub monthly_tuition_fee: MoneyCents,
    pub created_at: DateTime<Utc>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub parent_id: String,
    pub first_name: String,
    pub last_name: String,
    pub class_name: String,
    pub active: bool,
    pub monthly_tuition_fee_minor: i64,
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
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Parents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Student {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "student")?,
            parent_id: parse_uuid(&model.parent_id, "parent")?,
            first_name: model.first_name,
            last_name: model.last_name,
            class_name: model.class_name,
            active: model.active,
            monthly_tuition_fee: MoneyCents::new(model.monthly_tuition_fee_minor),
            created_at: model.created_at,
        })
    }
}
