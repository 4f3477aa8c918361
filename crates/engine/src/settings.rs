//! School-wide finance settings.
//!
//! Like the school account, each settings table is a single-instance
//! aggregate keyed by a unique `scope`; rows are created with defaults on
//! first access.

use chrono::{DateTime, Utc};

use crate::{MoneyCents, Percent};

/// Global payroll configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PayrollSetting {
    pub tax_rate: Percent,
    pub updated_at: DateTime<Utc>,
}

/// Global late-fee configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeSetting {
    pub penalty_per_day: MoneyCents,
    pub updated_at: DateTime<Utc>,
}

pub mod payroll_settings {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "payroll_settings")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub scope: String,
        pub tax_rate_bp: i64,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod fee_settings {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "fee_settings")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub scope: String,
        pub penalty_per_day_minor: i64,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl From<payroll_settings::Model> for PayrollSetting {
    fn from(model: payroll_settings::Model) -> Self {
        Self {
            tax_rate: Percent::from_bp(model.tax_rate_bp),
            updated_at: model.updated_at,
        }
    }
}

impl From<fee_settings::Model> for FeeSetting {
    fn from(model: fee_settings::Model) -> Self {
        Self {
            penalty_per_day: MoneyCents::new(model.penalty_per_day_minor),
            updated_at: model.updated_at,
        }
    }
}
