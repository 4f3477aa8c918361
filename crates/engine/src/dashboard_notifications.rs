//! In-app notifications addressed to a single user.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{
    EngineError,
    util::{impl_text_enum, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NotificationCategory {
    PayrollRequest,
    PayrollApproval,
    PayrollRejection,
    PayrollPaid,
    System,
}

impl_text_enum!(NotificationCategory, "notification category", {
    PayrollRequest => "PAYROLL_REQUEST",
    PayrollApproval => "PAYROLL_APPROVAL",
    PayrollRejection => "PAYROLL_REJECTION",
    PayrollPaid => "PAYROLL_PAID",
    System => "SYSTEM",
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardNotification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub category: NotificationCategory,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub is_hidden: bool,
    pub created_at: DateTime<Utc>,
}

impl DashboardNotification {
    pub(crate) fn new(
        recipient_id: Uuid,
        category: NotificationCategory,
        title: &str,
        message: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_id,
            category,
            title: title.to_string(),
            message: message.to_string(),
            is_read: false,
            is_hidden: false,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "dashboard_notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub recipient_id: String,
    pub category: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub is_hidden: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::RecipientId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Recipients,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&DashboardNotification> for ActiveModel {
    fn from(value: &DashboardNotification) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            recipient_id: ActiveValue::Set(value.recipient_id.to_string()),
            category: ActiveValue::Set(value.category.as_str().to_string()),
            title: ActiveValue::Set(value.title.clone()),
            message: ActiveValue::Set(value.message.clone()),
            is_read: ActiveValue::Set(value.is_read),
            is_hidden: ActiveValue::Set(value.is_hidden),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for DashboardNotification {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "notification")?,
            recipient_id: parse_uuid(&model.recipient_id, "user")?,
            category: NotificationCategory::try_from(model.category.as_str())?,
            title: model.title,
            message: model.message,
            is_read: model.is_read,
            is_hidden: model.is_hidden,
            created_at: model.created_at,
        })
    }
}
