use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents,
    util::{parse_opt_uuid, parse_uuid},
};

/// Append-only repayment against a [`CreditRequest`](crate::CreditRequest).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreditRepayment {
    pub id: Uuid,
    pub credit_request_id: Uuid,
    pub amount: MoneyCents,
    pub recorded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "credit_repayments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub credit_request_id: String,
    pub amount_minor: i64,
    pub recorded_by: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::credit_requests::Entity",
        from = "Column::CreditRequestId",
        to = "super::credit_requests::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    CreditRequests,
}

impl Related<super::credit_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreditRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CreditRepayment> for ActiveModel {
    fn from(value: &CreditRepayment) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            credit_request_id: ActiveValue::Set(value.credit_request_id.to_string()),
            amount_minor: ActiveValue::Set(value.amount.cents()),
            recorded_by: ActiveValue::Set(value.recorded_by.map(|id| id.to_string())),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for CreditRepayment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "repayment")?,
            credit_request_id: parse_uuid(&model.credit_request_id, "credit request")?,
            amount: MoneyCents::new(model.amount_minor),
            recorded_by: parse_opt_uuid(model.recorded_by.as_deref(), "user")?,
            created_at: model.created_at,
        })
    }
}
