mod common;

use engine::{
    CreditStatus, EmployeeRole, EngineError, ExpenseCategory, ExpenseStatus, LedgerEntryType,
    MoneyCents, NewCreditCmd, NewExpenseCmd, ReviewCmd, Role,
};

use common::{accountant, director, employee, engine, user};

fn fuel(amount: i64) -> NewExpenseCmd {
    NewExpenseCmd {
        category: ExpenseCategory::Fuel,
        title: "Bus fuel".to_string(),
        amount: MoneyCents::new(amount),
        reason: "Weekly route".to_string(),
    }
}

fn advance(amount: i64) -> NewCreditCmd {
    NewCreditCmd {
        amount: MoneyCents::new(amount),
        reason: "Rent".to_string(),
    }
}

#[tokio::test]
async fn approved_expense_is_paid_once() {
    let engine = engine().await;
    let accountant = accountant(&engine).await;
    let director = director(&engine).await;
    let driver = employee(&engine, "400", EmployeeRole::Driver, "Bolat", 0).await;

    let expense = engine.create_expense(&driver, fuel(4_500)).await.unwrap();
    assert_eq!(expense.status, ExpenseStatus::Pending);
    let inbox = engine.notifications(&accountant).await.unwrap();
    assert!(inbox.iter().any(|n| n.title == "New Expense Request"));

    engine
        .review_expense(&director, expense.id, ReviewCmd::approve())
        .await
        .unwrap();
    let paid = engine.pay_expense(&accountant, expense.id).await.unwrap();
    assert_eq!(paid.status, ExpenseStatus::Paid);

    let ledger = engine.ledger(&accountant, None).await.unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].entry_type, LedgerEntryType::ExpensePayment);
    assert_eq!(ledger[0].amount_delta, MoneyCents::new(-4_500));
    assert_eq!(
        ledger[0].description,
        "Expense paid: Bus fuel (FUEL). Reason: Weekly route"
    );

    let err = engine.pay_expense(&accountant, expense.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
    assert_eq!(engine.ledger(&accountant, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn rejected_expense_cannot_be_paid() {
    let engine = engine().await;
    let accountant = accountant(&engine).await;
    let director = director(&engine).await;
    let driver = employee(&engine, "400", EmployeeRole::Driver, "Bolat", 0).await;

    let expense = engine.create_expense(&driver, fuel(4_500)).await.unwrap();
    let rejected = engine
        .review_expense(&director, expense.id, ReviewCmd::reject().comment("no receipt"))
        .await
        .unwrap();
    assert_eq!(rejected.status, ExpenseStatus::Rejected);
    assert_eq!(rejected.admin_comment, "no receipt");

    let err = engine.pay_expense(&accountant, expense.id).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidState("only approved expenses can be paid".to_string())
    );
    assert!(engine.ledger(&accountant, None).await.unwrap().is_empty());

    let err = engine
        .review_expense(&director, expense.id, ReviewCmd::approve())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));

    let inbox = engine.notifications(&driver).await.unwrap();
    assert!(inbox.iter().any(|n| n.title == "Expense Review Update"
        && n.message.contains("rejected")
        && n.message.contains("no receipt")));
}

#[tokio::test]
async fn expenses_are_scoped_to_the_requester() {
    let engine = engine().await;
    let accountant = accountant(&engine).await;
    let driver = employee(&engine, "400", EmployeeRole::Driver, "Bolat", 0).await;
    let teacher = employee(&engine, "500", EmployeeRole::Teacher, "Saule", 0).await;

    engine.create_expense(&driver, fuel(100)).await.unwrap();
    engine.create_expense(&teacher, fuel(200)).await.unwrap();

    assert_eq!(engine.expenses(&accountant).await.unwrap().len(), 2);
    let own = engine.expenses(&driver).await.unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].requested_by, driver.user_id);

    let err = engine.pay_expense(&driver, own[0].id).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn credit_closes_when_fully_repaid() {
    let engine = engine().await;
    let accountant = accountant(&engine).await;
    let director = director(&engine).await;
    let teacher = employee(&engine, "500", EmployeeRole::Teacher, "Saule", 0).await;

    engine
        .initialize_account(&director, MoneyCents::new(100_000))
        .await
        .unwrap();
    let credit = engine.create_credit(&teacher, advance(30_000)).await.unwrap();

    // Money cannot come back before it went out.
    let err = engine
        .record_repayment(&accountant, credit.id, MoneyCents::new(1_000))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));

    engine
        .review_credit(&director, credit.id, ReviewCmd::approve())
        .await
        .unwrap();
    let given = engine.give_credit(&accountant, credit.id).await.unwrap();
    assert_eq!(given.status, CreditStatus::Given);
    assert_eq!(
        engine.account(&director).await.unwrap().current_balance,
        MoneyCents::new(70_000)
    );

    let (partial, _) = engine
        .record_repayment(&accountant, credit.id, MoneyCents::new(10_000))
        .await
        .unwrap();
    assert_eq!(partial.status, CreditStatus::Given);
    assert_eq!(partial.outstanding(), MoneyCents::new(20_000));

    let (closed, repayment) = engine
        .record_repayment(&accountant, credit.id, MoneyCents::new(25_000))
        .await
        .unwrap();
    assert_eq!(closed.status, CreditStatus::Closed);
    assert_eq!(closed.total_repaid, MoneyCents::new(35_000));
    assert_eq!(repayment.amount, MoneyCents::new(25_000));

    // Over-repayment is still booked.
    let (still_closed, _) = engine
        .record_repayment(&accountant, credit.id, MoneyCents::new(500))
        .await
        .unwrap();
    assert_eq!(still_closed.status, CreditStatus::Closed);

    let audit = engine.audit_balance(&director).await.unwrap();
    assert!(audit.is_consistent());
    assert_eq!(audit.stored_balance, MoneyCents::new(105_500));
}

#[tokio::test]
async fn credit_requests_need_an_employee_profile() {
    let engine = engine().await;
    let parent = user(&engine, "600", Role::Parent, "Parent").await;

    let err = engine.create_credit(&parent, advance(1_000)).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
    assert!(engine.credits(&parent).await.unwrap().is_empty());
}

#[tokio::test]
async fn rejected_credit_cannot_be_given() {
    let engine = engine().await;
    let accountant = accountant(&engine).await;
    let director = director(&engine).await;
    let teacher = employee(&engine, "500", EmployeeRole::Teacher, "Saule", 0).await;

    let credit = engine.create_credit(&teacher, advance(30_000)).await.unwrap();
    engine
        .review_credit(&director, credit.id, ReviewCmd::reject())
        .await
        .unwrap();
    let err = engine.give_credit(&accountant, credit.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
    assert!(engine.ledger(&accountant, None).await.unwrap().is_empty());

    let inbox = engine.notifications(&teacher).await.unwrap();
    assert!(inbox.iter().any(|n| n.title == "Credit Request Review"));
    let own = engine.credits(&teacher).await.unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].status, CreditStatus::Rejected);
}
