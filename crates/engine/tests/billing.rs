mod common;

use engine::{
    Actor, Engine, EngineError, InvoiceKind, LedgerEntryType, MoneyCents, Month, NewInvoiceCmd,
    NewStudentCmd, ParentNotificationType, Role, Student,
};

use common::{accountant, date, director, engine, user};

async fn student(engine: &Engine, parent: &Actor, first_name: &str, fee: i64) -> Student {
    engine
        .create_student(NewStudentCmd {
            parent_id: parent.user_id,
            first_name: first_name.to_string(),
            last_name: "Nurlanova".to_string(),
            class_name: "Sunflowers".to_string(),
            monthly_tuition_fee: MoneyCents::new(fee),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn billing_run_invoices_active_students_once() {
    let engine = engine().await;
    let accountant = accountant(&engine).await;
    let parent = user(&engine, "600", Role::Parent, "Gulnara").await;
    student(&engine, &parent, "Aru", 10_000).await;
    let inactive = student(&engine, &parent, "Dana", 10_000).await;
    engine.set_student_active(inactive.id, false).await.unwrap();

    let today = date(2024, 3, 1);
    let summary = engine.run_billing(&accountant, today, 31).await.unwrap();
    assert_eq!(summary.month, Some(Month::of(today)));
    assert_eq!(summary.invoices_created, 1);

    let again = engine.run_scheduled_billing(today, 31).await.unwrap();
    assert_eq!(again.invoices_created, 0);

    let invoices = engine.invoices(&accountant, today).await.unwrap();
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0].kind, InvoiceKind::Tuition);
    assert_eq!(invoices[0].amount, MoneyCents::new(10_000));
    // Due day is clamped to 28.
    assert_eq!(invoices[0].due_date, date(2024, 3, 28));
}

#[tokio::test]
async fn overdue_penalty_accrues_and_payment_settles() {
    let engine = engine().await;
    let accountant = accountant(&engine).await;
    let director = director(&engine).await;
    let parent = user(&engine, "600", Role::Parent, "Gulnara").await;
    student(&engine, &parent, "Aru", 10_000).await;

    engine
        .update_fee_setting(&director, MoneyCents::new(500))
        .await
        .unwrap();
    engine
        .run_scheduled_billing(date(2024, 3, 1), 5)
        .await
        .unwrap();

    let today = date(2024, 3, 15);
    let summary = engine.apply_overdue_penalties(&accountant, today).await.unwrap();
    assert_eq!(summary.penalties_updated, 1);
    let summary = engine.apply_overdue_penalties(&accountant, today).await.unwrap();
    assert_eq!(summary.penalties_updated, 0);

    let invoice = engine.invoices(&parent, today).await.unwrap().remove(0);
    assert_eq!(invoice.penalty_amount, MoneyCents::new(5_000));
    assert_eq!(invoice.total_amount_due(), MoneyCents::new(15_000));

    let (partial, _) = engine
        .record_payment(&parent, invoice.id, MoneyCents::new(10_000), today)
        .await
        .unwrap();
    assert!(!partial.is_paid);

    let (paid, payment) = engine
        .record_payment(&accountant, invoice.id, MoneyCents::new(5_000), today)
        .await
        .unwrap();
    assert!(paid.is_paid);
    assert_eq!(payment.paid_by, Some(accountant.user_id));

    let err = engine
        .record_payment(&parent, invoice.id, MoneyCents::new(100), today)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));

    let ledger = engine.ledger(&accountant, None).await.unwrap();
    assert_eq!(ledger.len(), 2);
    assert!(ledger
        .iter()
        .all(|e| e.entry_type == LedgerEntryType::StudentFee));
    assert!(ledger[0]
        .description
        .starts_with("Student fee received from Gulnara for Aru Nurlanova (2024-03)"));
    assert_eq!(
        engine.account(&accountant).await.unwrap().current_balance,
        MoneyCents::new(15_000)
    );

    let notifications = engine.parent_notifications(&parent).await.unwrap();
    let thanks: Vec<_> = notifications
        .iter()
        .filter(|n| n.notification_type == ParentNotificationType::ThankYou)
        .collect();
    assert_eq!(thanks.len(), 1);
    assert_eq!(thanks[0].invoice_id, Some(invoice.id));
    assert_eq!(thanks[0].title, "Payment Received");
}

#[tokio::test]
async fn payment_before_due_date_carries_no_penalty() {
    let engine = engine().await;
    let director = director(&engine).await;
    let parent = user(&engine, "600", Role::Parent, "Gulnara").await;
    student(&engine, &parent, "Aru", 10_000).await;

    engine
        .update_fee_setting(&director, MoneyCents::new(500))
        .await
        .unwrap();
    let today = date(2024, 3, 2);
    engine.run_scheduled_billing(today, 5).await.unwrap();
    let invoice = engine.invoices(&parent, today).await.unwrap().remove(0);

    let (paid, _) = engine
        .record_payment(&parent, invoice.id, MoneyCents::new(10_000), today)
        .await
        .unwrap();
    assert!(paid.is_paid);
    assert_eq!(paid.penalty_amount, MoneyCents::ZERO);

    // Settled invoices stop accruing.
    let later = engine.invoices(&parent, date(2024, 4, 1)).await.unwrap();
    assert_eq!(later[0].penalty_amount, MoneyCents::ZERO);
}

#[tokio::test]
async fn penalty_resets_while_invoice_is_not_overdue() {
    let engine = engine().await;
    let accountant = accountant(&engine).await;
    let director = director(&engine).await;
    let parent = user(&engine, "600", Role::Parent, "Gulnara").await;
    student(&engine, &parent, "Aru", 10_000).await;

    engine
        .update_fee_setting(&director, MoneyCents::new(500))
        .await
        .unwrap();
    engine
        .run_scheduled_billing(date(2024, 3, 1), 5)
        .await
        .unwrap();

    // Evaluated with a clock that ran ahead of the due date.
    engine
        .apply_overdue_penalties(&accountant, date(2024, 3, 25))
        .await
        .unwrap();
    let invoice = engine
        .invoices(&parent, date(2024, 3, 25))
        .await
        .unwrap()
        .remove(0);
    assert_eq!(invoice.penalty_amount, MoneyCents::new(10_000));

    let today = date(2024, 3, 3);
    let summary = engine.apply_overdue_penalties(&accountant, today).await.unwrap();
    assert_eq!(summary.penalties_updated, 1);
    let invoice = engine.invoices(&parent, today).await.unwrap().remove(0);
    assert_eq!(invoice.penalty_amount, MoneyCents::ZERO);
    assert_eq!(invoice.total_amount_due(), MoneyCents::new(10_000));

    let (paid, _) = engine
        .record_payment(&parent, invoice.id, MoneyCents::new(10_000), today)
        .await
        .unwrap();
    assert!(paid.is_paid);
}

#[tokio::test]
async fn reminders_go_out_three_days_ahead_once() {
    let engine = engine().await;
    let accountant = accountant(&engine).await;
    let parent = user(&engine, "600", Role::Parent, "Gulnara").await;
    student(&engine, &parent, "Aru", 10_000).await;

    let today = date(2024, 3, 2);
    let summary = engine.run_scheduled_billing(today, 5).await.unwrap();
    assert_eq!(summary.reminders_created, 1);
    let summary = engine.send_due_reminders(&accountant, today).await.unwrap();
    assert_eq!(summary.reminders_created, 0);

    // Not due in exactly three days.
    let summary = engine
        .send_due_reminders(&accountant, date(2024, 3, 1))
        .await
        .unwrap();
    assert_eq!(summary.reminders_created, 0);

    let notifications = engine.parent_notifications(&parent).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(
        notifications[0].notification_type,
        ParentNotificationType::Reminder
    );
    assert_eq!(
        notifications[0].message,
        "Reminder: Tuition for Aru Nurlanova (2024-03) is due on 2024-03-05."
    );
}

#[tokio::test]
async fn invoices_are_visible_to_their_parent_only() {
    let engine = engine().await;
    let accountant = accountant(&engine).await;
    let parent = user(&engine, "600", Role::Parent, "Gulnara").await;
    let other = user(&engine, "601", Role::Parent, "Marat").await;
    let teacher = user(&engine, "300", Role::Teacher, "Tamara").await;
    let today = date(2024, 3, 1);

    let invoice = engine
        .create_invoice(
            &accountant,
            NewInvoiceCmd {
                parent_id: parent.user_id,
                student_id: None,
                month: Month::of(today),
                amount: MoneyCents::new(2_500),
                due_date: date(2024, 3, 20),
            },
        )
        .await
        .unwrap();
    assert_eq!(invoice.kind, InvoiceKind::General);

    assert_eq!(engine.invoices(&parent, today).await.unwrap().len(), 1);
    assert!(engine.invoices(&other, today).await.unwrap().is_empty());
    assert!(engine.invoices(&teacher, today).await.unwrap().is_empty());

    let err = engine
        .record_payment(&other, invoice.id, MoneyCents::new(2_500), today)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    engine
        .record_payment(&parent, invoice.id, MoneyCents::new(2_500), today)
        .await
        .unwrap();
    assert_eq!(engine.payments(&parent).await.unwrap().len(), 1);
    assert!(engine.payments(&other).await.unwrap().is_empty());
    assert_eq!(engine.payments(&accountant).await.unwrap().len(), 1);

    let ledger = engine.ledger(&accountant, None).await.unwrap();
    assert_eq!(ledger[0].entry_type, LedgerEntryType::ManualIncome);
}

#[tokio::test]
async fn tuition_invoice_validation() {
    let engine = engine().await;
    let accountant = accountant(&engine).await;
    let parent = user(&engine, "600", Role::Parent, "Gulnara").await;
    let other = user(&engine, "601", Role::Parent, "Marat").await;
    let aru = student(&engine, &parent, "Aru", 10_000).await;
    let month: Month = "2024-03".parse().unwrap();
    let cmd = |parent_id| NewInvoiceCmd {
        parent_id,
        student_id: Some(aru.id),
        month,
        amount: MoneyCents::new(10_000),
        due_date: date(2024, 3, 5),
    };

    let err = engine
        .create_invoice(&accountant, cmd(other.user_id))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidField { ref field, .. } if field == "student_id"));

    engine
        .create_invoice(&accountant, cmd(parent.user_id))
        .await
        .unwrap();
    let err = engine
        .create_invoice(&accountant, cmd(parent.user_id))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));

    let err = engine
        .create_invoice(&accountant, cmd(accountant.user_id))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidField { ref field, .. } if field == "parent_id"));

    let err = engine.create_invoice(&parent, cmd(parent.user_id)).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn dashboard_splits_paid_unpaid_and_overdue() {
    let engine = engine().await;
    let accountant = accountant(&engine).await;
    let parent = user(&engine, "600", Role::Parent, "Gulnara").await;
    student(&engine, &parent, "Aru", 10_000).await;
    student(&engine, &parent, "Dana", 8_000).await;

    engine
        .run_scheduled_billing(date(2024, 3, 1), 5)
        .await
        .unwrap();
    let today = date(2024, 3, 10);
    let invoices = engine.invoices(&accountant, today).await.unwrap();
    let dana = invoices
        .iter()
        .find(|i| i.amount == MoneyCents::new(8_000))
        .unwrap();
    engine
        .record_payment(&accountant, dana.id, MoneyCents::new(8_000), today)
        .await
        .unwrap();

    let dashboard = engine
        .billing_dashboard(&accountant, "2024-03".parse().unwrap(), today)
        .await
        .unwrap();
    assert_eq!(dashboard.total_invoices, 2);
    assert_eq!(dashboard.paid_invoices.len(), 1);
    assert_eq!(dashboard.unpaid_invoices.len(), 1);
    assert_eq!(dashboard.overdue_count, 1);

    let err = engine
        .billing_dashboard(&parent, "2024-03".parse().unwrap(), today)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}
