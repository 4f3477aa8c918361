//! The school's cash account.
//!
//! The account is an aggregate root with a single instance per school: the
//! `school_accounts` table holds at most one row per `scope` (unique), and the
//! engine only ever uses [`SCHOOL_SCOPE`]. The row is created lazily the first
//! time a posting or a read needs it.
//!
//! `current_balance` is a denormalized running total. It must always equal the
//! sum of all `amount_delta`s in [`ledger_entries`](crate::ledger_entries) and
//! is only mutated by the ledger posting routine, in the same DB transaction
//! that appends the entry.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{EngineError, MoneyCents, util::parse_uuid};

/// Scope key of the one school account.
pub(crate) const SCHOOL_SCOPE: &str = "school";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchoolAccount {
    pub id: Uuid,
    pub current_balance: MoneyCents,
    pub is_initialized: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "school_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub scope: String,
    pub current_balance_minor: i64,
    pub is_initialized: bool,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ledger_entries::Entity")]
    LedgerEntries,
}

impl Related<super::ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for SchoolAccount {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "account")?,
            current_balance: MoneyCents::new(model.current_balance_minor),
            is_initialized: model.is_initialized,
            updated_at: model.updated_at,
        })
    }
}
