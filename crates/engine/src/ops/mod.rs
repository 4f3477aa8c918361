use sea_orm::{ConnectionTrait, DatabaseConnection, prelude::*};
use uuid::Uuid;

use crate::{Employee, EngineError, ResultEngine, User, employees, users};

mod billing;
mod credits;
mod expenses;
mod ledger;
mod notifications;
mod payroll;
mod people;

pub use billing::{BillingDashboard, BillingRunSummary};
pub use ledger::{BalanceAudit, MonthlyReport};
pub use notifications::NotificationSelection;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

pub(super) async fn require_user<C: ConnectionTrait>(db: &C, user_id: Uuid) -> ResultEngine<User> {
    users::Entity::find_by_id(user_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?
        .try_into()
}

pub(super) async fn require_employee<C: ConnectionTrait>(
    db: &C,
    employee_id: Uuid,
) -> ResultEngine<Employee> {
    employees::Entity::find_by_id(employee_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("employee not exists".to_string()))?
        .try_into()
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
