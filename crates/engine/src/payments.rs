use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents,
    util::{parse_opt_uuid, parse_uuid},
};

/// A payment toward an [`Invoice`](crate::Invoice).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payment {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub amount: MoneyCents,
    pub paid_by: Option<Uuid>,
    pub paid_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub invoice_id: String,
    pub amount_minor: i64,
    pub paid_by: Option<String>,
    pub paid_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
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

impl From<&Payment> for ActiveModel {
    fn from(value: &Payment) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            invoice_id: ActiveValue::Set(value.invoice_id.to_string()),
            amount_minor: ActiveValue::Set(value.amount.cents()),
            paid_by: ActiveValue::Set(value.paid_by.map(|id| id.to_string())),
            paid_at: ActiveValue::Set(value.paid_at),
        }
    }
}

impl TryFrom<Model> for Payment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "payment")?,
            invoice_id: parse_uuid(&model.invoice_id, "invoice")?,
            amount: MoneyCents::new(model.amount_minor),
            paid_by: parse_opt_uuid(model.paid_by.as_deref(), "user")?,
            paid_at: model.paid_at,
        })
    }
}
