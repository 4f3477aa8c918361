mod common;

use chrono::Utc;
use engine::{EngineError, LedgerEntryType, MoneyCents, Month, Role};

use common::{accountant, director, engine, user};

#[tokio::test]
async fn account_starts_empty_and_initializes_once() {
    let engine = engine().await;
    let director = director(&engine).await;

    let account = engine.account(&director).await.unwrap();
    assert_eq!(account.current_balance, MoneyCents::ZERO);
    assert!(!account.is_initialized);

    let account = engine
        .initialize_account(&director, MoneyCents::new(100_000))
        .await
        .unwrap();
    assert!(account.is_initialized);
    assert_eq!(account.current_balance, MoneyCents::new(100_000));

    let err = engine
        .initialize_account(&director, MoneyCents::new(5_000))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
    assert_eq!(
        engine.account(&director).await.unwrap().current_balance,
        MoneyCents::new(100_000)
    );

    let ledger = engine.ledger(&director, None).await.unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].entry_type, LedgerEntryType::Other);
    assert_eq!(ledger[0].description, "Initial balance set by Daniyar Director.");
}

#[tokio::test]
async fn balance_always_matches_ledger_sum() {
    let engine = engine().await;
    let accountant = accountant(&engine).await;

    engine
        .initialize_account(&accountant, MoneyCents::new(50_000))
        .await
        .unwrap();
    engine
        .record_manual_income(&accountant, MoneyCents::new(12_345), Some("Canteen"))
        .await
        .unwrap();
    engine
        .record_transaction(
            MoneyCents::new(-2_345),
            LedgerEntryType::Other,
            "Bank fee",
            None,
        )
        .await
        .unwrap();

    let audit = engine.audit_balance(&accountant).await.unwrap();
    assert!(audit.is_consistent());
    assert_eq!(audit.stored_balance, MoneyCents::new(60_000));
    assert_eq!(audit.entry_count, 3);
}

#[tokio::test]
async fn posted_balance_is_the_stored_balance() {
    let engine = engine().await;
    let accountant = accountant(&engine).await;

    let (first, second) = tokio::join!(
        engine.record_manual_income(&accountant, MoneyCents::new(7_000), Some("Canteen")),
        engine.record_transaction(
            MoneyCents::new(-2_000),
            LedgerEntryType::Other,
            "Bank fee",
            None,
        ),
    );
    let (first, _) = first.unwrap();
    let (second, _) = second.unwrap();

    let mut returned = [first.current_balance, second.current_balance];
    returned.sort();
    let stored = engine.account(&accountant).await.unwrap().current_balance;
    assert_eq!(stored, MoneyCents::new(5_000));
    // Whichever posting ran last reports the final balance.
    assert!(
        returned == [MoneyCents::new(-2_000), stored]
            || returned == [stored, MoneyCents::new(7_000)]
    );

    let audit = engine.audit_balance(&accountant).await.unwrap();
    assert!(audit.is_consistent());
    assert_eq!(audit.stored_balance, stored);
}

#[tokio::test]
async fn zero_and_negative_amounts_are_rejected() {
    let engine = engine().await;
    let accountant = accountant(&engine).await;

    let err = engine
        .record_transaction(MoneyCents::ZERO, LedgerEntryType::Other, "noop", None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidField { ref field, .. } if field == "amount"));

    let err = engine
        .record_manual_income(&accountant, MoneyCents::new(-1), None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidField { .. }));
    assert!(engine.ledger(&accountant, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn monthly_report_splits_income_and_expense() {
    let engine = engine().await;
    let accountant = accountant(&engine).await;

    engine
        .record_manual_income(&accountant, MoneyCents::new(30_000), None)
        .await
        .unwrap();
    engine
        .record_transaction(
            MoneyCents::new(-10_000),
            LedgerEntryType::ExpensePayment,
            "Fuel",
            Some(accountant.user_id),
        )
        .await
        .unwrap();

    let month = Month::of(Utc::now().date_naive());
    let report = engine.monthly_report(&accountant, month).await.unwrap();
    assert_eq!(report.total_income, MoneyCents::new(30_000));
    assert_eq!(report.total_expense, MoneyCents::new(10_000));
    assert_eq!(report.net_profit, MoneyCents::new(20_000));
    assert_eq!(report.entries.len(), 2);

    let empty = engine
        .monthly_report(&accountant, "2001-01".parse().unwrap())
        .await
        .unwrap();
    assert!(empty.entries.is_empty());
    assert_eq!(empty.net_profit, MoneyCents::ZERO);
}

#[tokio::test]
async fn ledger_is_staff_only() {
    let engine = engine().await;
    let teacher = user(&engine, "300", Role::Teacher, "Tamara").await;

    let err = engine.ledger(&teacher, None).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
    let err = engine
        .record_manual_income(&teacher, MoneyCents::new(100), None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}
