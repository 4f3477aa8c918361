//! Append-only ledger entries against the school account.
//!
//! Entries are never updated or deleted. A positive `amount_delta` is money
//! coming in, a negative one money going out.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents,
    util::{impl_text_enum, parse_opt_uuid, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LedgerEntryType {
    StudentFee,
    ManualIncome,
    SalaryPayment,
    ExpensePayment,
    CreditGiven,
    CreditRepayment,
    Other,
}

impl_text_enum!(LedgerEntryType, "ledger entry type", {
    StudentFee => "STUDENT_FEE",
    ManualIncome => "MANUAL_INCOME",
    SalaryPayment => "SALARY_PAYMENT",
    ExpensePayment => "EXPENSE_PAYMENT",
    CreditGiven => "CREDIT_GIVEN",
    CreditRepayment => "CREDIT_REPAYMENT",
    Other => "OTHER",
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub account_id: Uuid,
    pub entry_type: LedgerEntryType,
    pub amount_delta: MoneyCents,
    pub description: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub(crate) fn new(
        account_id: Uuid,
        entry_type: LedgerEntryType,
        amount_delta: MoneyCents,
        description: String,
        created_by: Option<Uuid>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            entry_type,
            amount_delta,
            description,
            created_by,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_id: String,
    pub entry_type: String,
    pub amount_delta_minor: i64,
    pub description: String,
    pub created_by: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::school_account::Entity",
        from = "Column::AccountId",
        to = "super::school_account::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Accounts,
}

impl Related<super::school_account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerEntry> for ActiveModel {
    fn from(value: &LedgerEntry) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            account_id: ActiveValue::Set(value.account_id.to_string()),
            entry_type: ActiveValue::Set(value.entry_type.as_str().to_string()),
            amount_delta_minor: ActiveValue::Set(value.amount_delta.cents()),
            description: ActiveValue::Set(value.description.clone()),
            created_by: ActiveValue::Set(value.created_by.map(|id| id.to_string())),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for LedgerEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "ledger entry")?,
            account_id: parse_uuid(&model.account_id, "account")?,
            entry_type: LedgerEntryType::try_from(model.entry_type.as_str())?,
            amount_delta: MoneyCents::new(model.amount_delta_minor),
            description: model.description,
            created_by: parse_opt_uuid(model.created_by.as_deref(), "user")?,
            created_at: model.created_at,
        })
    }
}
