//! The school ledger: one running balance plus an append-only entry log.
//!
//! [`post_entry`] is the only code path that changes the balance. It must be
//! called with an open DB transaction so the balance update, the new entry,
//! and whatever workflow state change triggered the posting commit or roll
//! back together.

use chrono::{DateTime, NaiveTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*, sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{
    Action, Actor, EngineError, LedgerEntry, LedgerEntryType, Month, MoneyCents, ResultEngine,
    SchoolAccount, access, ledger_entries,
    school_account::{self, SCHOOL_SCOPE},
    util::{normalize_optional_text, require_positive},
};

use super::{Engine, with_tx};

/// Income/expense totals of one month.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthlyReport {
    pub month: Month,
    pub total_income: MoneyCents,
    pub total_expense: MoneyCents,
    pub net_profit: MoneyCents,
    pub entries: Vec<LedgerEntry>,
}

/// Stored balance against the sum of all ledger entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BalanceAudit {
    pub stored_balance: MoneyCents,
    pub ledger_total: MoneyCents,
    pub entry_count: usize,
}

impl BalanceAudit {
    pub fn is_consistent(&self) -> bool {
        self.stored_balance == self.ledger_total
    }
}

/// Creates the account row if it does not exist yet. Safe to race: the
/// unique `scope` turns a concurrent second insert into a no-op.
async fn ensure_account<C: ConnectionTrait>(db: &C) -> ResultEngine<()> {
    let model = school_account::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4().to_string()),
        scope: ActiveValue::Set(SCHOOL_SCOPE.to_string()),
        current_balance_minor: ActiveValue::Set(0),
        is_initialized: ActiveValue::Set(false),
        updated_at: ActiveValue::Set(Utc::now()),
    };
    school_account::Entity::insert(model)
        .on_conflict(
            OnConflict::column(school_account::Column::Scope)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

async fn find_account<C: ConnectionTrait>(db: &C) -> ResultEngine<Option<school_account::Model>> {
    Ok(school_account::Entity::find()
        .filter(school_account::Column::Scope.eq(SCHOOL_SCOPE))
        .one(db)
        .await?)
}

/// Loads the account for update, creating it on first use.
async fn lock_account(db_tx: &DatabaseTransaction) -> ResultEngine<school_account::Model> {
    ensure_account(db_tx).await?;
    school_account::Entity::find()
        .filter(school_account::Column::Scope.eq(SCHOOL_SCOPE))
        .lock_exclusive()
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("school account not exists".to_string()))
}

/// Appends a ledger entry and moves the balance by `amount_delta`.
pub(super) async fn post_entry(
    db_tx: &DatabaseTransaction,
    entry_type: LedgerEntryType,
    amount_delta: MoneyCents,
    description: String,
    created_by: Option<Uuid>,
) -> ResultEngine<(SchoolAccount, LedgerEntry)> {
    let account = lock_account(db_tx).await?;
    let now = Utc::now();
    MoneyCents::new(account.current_balance_minor)
        .checked_add(amount_delta)
        .ok_or_else(|| EngineError::InvalidInput("balance overflow".to_string()))?;

    school_account::Entity::update_many()
        .col_expr(
            school_account::Column::CurrentBalanceMinor,
            Expr::col(school_account::Column::CurrentBalanceMinor).add(amount_delta.cents()),
        )
        .col_expr(school_account::Column::UpdatedAt, Expr::value(now))
        .filter(school_account::Column::Id.eq(account.id.clone()))
        .exec(db_tx)
        .await?;

    // The stored row is authoritative once the increment has run.
    let account = school_account::Entity::find_by_id(account.id)
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("school account not exists".to_string()))?;
    let account = SchoolAccount::try_from(account)?;

    let entry = LedgerEntry::new(
        account.id,
        entry_type,
        amount_delta,
        description,
        created_by,
        now,
    );
    ledger_entries::ActiveModel::from(&entry)
        .insert(db_tx)
        .await?;

    tracing::info!(
        entry_type = %entry_type,
        delta = %amount_delta,
        balance = %account.current_balance,
        "ledger entry posted"
    );
    Ok((account, entry))
}

fn month_range(month: Month) -> ResultEngine<(DateTime<Utc>, DateTime<Utc>)> {
    let (first, last) = month.bounds()?;
    let start = first.and_time(NaiveTime::MIN).and_utc();
    let end = last
        .succ_opt()
        .ok_or_else(|| EngineError::InvalidInput("month out of range".to_string()))?
        .and_time(NaiveTime::MIN)
        .and_utc();
    Ok((start, end))
}

async fn entries_in<C: ConnectionTrait>(
    db: &C,
    month: Option<Month>,
) -> ResultEngine<Vec<LedgerEntry>> {
    let mut query = ledger_entries::Entity::find();
    if let Some(month) = month {
        let (start, end) = month_range(month)?;
        query = query
            .filter(ledger_entries::Column::CreatedAt.gte(start))
            .filter(ledger_entries::Column::CreatedAt.lt(end));
    }
    query
        .order_by_desc(ledger_entries::Column::CreatedAt)
        .order_by_desc(ledger_entries::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(LedgerEntry::try_from)
        .collect()
}

impl Engine {
    /// Posts a signed movement against the school account in its own
    /// transaction.
    ///
    /// Workflows post through the same routine inside their own transaction;
    /// this entry point serves collaborators that only need the ledger.
    pub async fn record_transaction(
        &self,
        amount_delta: MoneyCents,
        entry_type: LedgerEntryType,
        description: &str,
        created_by: Option<Uuid>,
    ) -> ResultEngine<(SchoolAccount, LedgerEntry)> {
        if amount_delta.is_zero() {
            return Err(EngineError::field("amount", "must not be zero"));
        }
        let description = description.trim().to_string();
        with_tx!(self, |db_tx| {
            post_entry(&db_tx, entry_type, amount_delta, description, created_by).await
        })
    }

    /// The school account, created with a zero balance on first access.
    pub async fn account(&self, actor: &Actor) -> ResultEngine<SchoolAccount> {
        access::require(actor, Action::ViewAccount)?;
        ensure_account(&self.database).await?;
        find_account(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("school account not exists".to_string()))?
            .try_into()
    }

    /// Sets the opening balance. Allowed once.
    ///
    /// The opening balance is posted as an `OTHER` entry so the balance keeps
    /// matching the sum of the ledger.
    pub async fn initialize_account(
        &self,
        actor: &Actor,
        initial_balance: MoneyCents,
    ) -> ResultEngine<SchoolAccount> {
        access::require(actor, Action::InitializeAccount)?;
        if initial_balance.is_negative() {
            return Err(EngineError::field("initial_balance", "must not be negative"));
        }
        with_tx!(self, |db_tx| {
            let locked = lock_account(&db_tx).await?;
            if locked.is_initialized {
                return Err(EngineError::InvalidState(
                    "school account is already initialized".to_string(),
                ));
            }
            let account_id = locked.id.clone();
            let mut account = if initial_balance.is_zero() {
                SchoolAccount::try_from(locked)?
            } else {
                let description = format!("Initial balance set by {}.", actor.display_name());
                post_entry(
                    &db_tx,
                    LedgerEntryType::Other,
                    initial_balance,
                    description,
                    Some(actor.user_id),
                )
                .await?
                .0
            };

            school_account::Entity::update_many()
                .col_expr(school_account::Column::IsInitialized, Expr::value(true))
                .filter(school_account::Column::Id.eq(account_id))
                .exec(&db_tx)
                .await?;
            account.is_initialized = true;
            tracing::info!(balance = %account.current_balance, "school account initialized");
            Ok(account)
        })
    }

    /// Records income that did not come through an invoice.
    pub async fn record_manual_income(
        &self,
        actor: &Actor,
        amount: MoneyCents,
        description: Option<&str>,
    ) -> ResultEngine<(SchoolAccount, LedgerEntry)> {
        access::require(actor, Action::RecordManualIncome)?;
        require_positive(amount, "amount")?;
        let mut description = normalize_optional_text(description);
        if description.is_empty() {
            description = format!("Manual income recorded by {}.", actor.display_name());
        }
        with_tx!(self, |db_tx| {
            post_entry(
                &db_tx,
                LedgerEntryType::ManualIncome,
                amount,
                description,
                Some(actor.user_id),
            )
            .await
        })
    }

    /// Ledger entries, newest first, optionally limited to one month.
    pub async fn ledger(&self, actor: &Actor, month: Option<Month>) -> ResultEngine<Vec<LedgerEntry>> {
        access::require(actor, Action::ViewLedger)?;
        entries_in(&self.database, month).await
    }

    /// Income, expense and profit for `month`.
    pub async fn monthly_report(&self, actor: &Actor, month: Month) -> ResultEngine<MonthlyReport> {
        access::require(actor, Action::ViewReports)?;
        let entries = entries_in(&self.database, Some(month)).await?;
        let total_income: MoneyCents = entries
            .iter()
            .map(|e| e.amount_delta)
            .filter(|delta| delta.is_positive())
            .sum();
        let total_expense: MoneyCents = entries
            .iter()
            .map(|e| e.amount_delta)
            .filter(|delta| delta.is_negative())
            .sum::<MoneyCents>()
            .abs();
        Ok(MonthlyReport {
            month,
            total_income,
            total_expense,
            net_profit: total_income - total_expense,
            entries,
        })
    }

    /// Recomputes the ledger total and compares it with the stored balance.
    pub async fn audit_balance(&self, actor: &Actor) -> ResultEngine<BalanceAudit> {
        access::require(actor, Action::ViewLedger)?;
        let stored_balance = find_account(&self.database)
            .await?
            .map(|model| MoneyCents::new(model.current_balance_minor))
            .unwrap_or_default();
        let entries = entries_in(&self.database, None).await?;
        let audit = BalanceAudit {
            stored_balance,
            ledger_total: entries.iter().map(|e| e.amount_delta).sum(),
            entry_count: entries.len(),
        };
        if !audit.is_consistent() {
            tracing::error!(
                stored = %audit.stored_balance,
                ledger = %audit.ledger_total,
                "school balance does not match ledger"
            );
        }
        Ok(audit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_range_is_half_open() {
        let (start, end) = month_range("2024-12".parse().unwrap()).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-12-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }
}
