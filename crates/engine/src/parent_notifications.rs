//! Notifications shown to parents (tuition reminders, payment receipts).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{
    EngineError,
    util::{impl_text_enum, parse_opt_uuid, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParentNotificationType {
    Reminder,
    ThankYou,
    General,
}

impl_text_enum!(ParentNotificationType, "parent notification type", {
    Reminder => "REMINDER",
    ThankYou => "THANK_YOU",
    General => "GENERAL",
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParentNotification {
    pub id: Uuid,
    pub parent_id: Uuid,
    pub student_id: Option<Uuid>,
    /// At most one notification per `(invoice, type)`.
    pub invoice_id: Option<Uuid>,
    pub notification_type: ParentNotificationType,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "parent_notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub parent_id: String,
    pub student_id: Option<String>,
    pub invoice_id: Option<String>,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
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
        belongs_to = "super::invoices::Entity",
        from = "Column::InvoiceId",
        to = "super::invoices::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Invoices,
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ParentNotification> for ActiveModel {
    fn from(value: &ParentNotification) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            parent_id: ActiveValue::Set(value.parent_id.to_string()),
            student_id: ActiveValue::Set(value.student_id.map(|id| id.to_string())),
            invoice_id: ActiveValue::Set(value.invoice_id.map(|id| id.to_string())),
            notification_type: ActiveValue::Set(value.notification_type.as_str().to_string()),
            title: ActiveValue::Set(value.title.clone()),
            message: ActiveValue::Set(value.message.clone()),
            is_read: ActiveValue::Set(value.is_read),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for ParentNotification {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "notification")?,
            parent_id: parse_uuid(&model.parent_id, "parent")?,
            student_id: parse_opt_uuid(model.student_id.as_deref(), "student")?,
            invoice_id: parse_opt_uuid(model.invoice_id.as_deref(), "invoice")?,
            notification_type: ParentNotificationType::try_from(model.notification_type.as_str())?,
            title: model.title,
            message: model.message,
            is_read: model.is_read,
            created_at: model.created_at,
        })
    }
}
