mod common;

use engine::{
    AdjustmentCmd, AttendanceStatus, EmployeeRole, EngineError, GeneratePayrollCmd,
    LedgerEntryType, MoneyCents, Month, NotificationCategory, PayrollStatus, Percent, ReviewCmd,
};

use common::{accountant, date, director, employee, engine};

fn march() -> Month {
    "2024-03".parse().unwrap()
}

fn generate(month: Month) -> GeneratePayrollCmd {
    GeneratePayrollCmd {
        month,
        employee_id: None,
        overtime_amount: MoneyCents::ZERO,
    }
}

#[tokio::test]
async fn payroll_figures_follow_salary_adjustments_and_tax() {
    let engine = engine().await;
    let accountant = accountant(&engine).await;
    let director = director(&engine).await;
    let teacher = employee(&engine, "300", EmployeeRole::Teacher, "Tamara", 300_000).await;
    let teacher_employee = teacher.employee_id.unwrap();

    engine
        .update_payroll_setting(&director, "10".parse::<Percent>().unwrap())
        .await
        .unwrap();
    let adjustment = |amount: i64| AdjustmentCmd {
        employee_id: teacher_employee,
        month: march(),
        amount: MoneyCents::new(amount),
        reason: "March".to_string(),
    };
    engine.add_bonus(&accountant, adjustment(20_000)).await.unwrap();
    engine
        .add_deduction(&accountant, adjustment(10_000))
        .await
        .unwrap();
    for day in [4, 5] {
        engine
            .record_attendance(teacher_employee, date(2024, 3, day), AttendanceStatus::Present)
            .await
            .unwrap();
    }
    engine
        .record_attendance(teacher_employee, date(2024, 3, 6), AttendanceStatus::Absent)
        .await
        .unwrap();

    let ids = engine
        .generate_payroll(
            &accountant,
            GeneratePayrollCmd {
                employee_id: Some(teacher_employee),
                ..generate(march())
            },
        )
        .await
        .unwrap();
    assert_eq!(ids.len(), 1);

    let payroll = engine.payroll(&teacher, ids[0]).await.unwrap();
    assert_eq!(payroll.status, PayrollStatus::Pending);
    assert_eq!(payroll.total_present_days, 2);
    assert_eq!(payroll.figures.gross_salary, MoneyCents::new(310_000));
    assert_eq!(payroll.figures.tax_amount, MoneyCents::new(31_000));
    assert_eq!(payroll.figures.net_salary, MoneyCents::new(279_000));
}

#[tokio::test]
async fn approval_pipeline_pays_and_debits_the_ledger() {
    let engine = engine().await;
    let accountant = accountant(&engine).await;
    let director = director(&engine).await;
    let driver = employee(&engine, "400", EmployeeRole::Driver, "Bolat", 150_000).await;

    engine
        .initialize_account(&director, MoneyCents::new(1_000_000))
        .await
        .unwrap();
    let ids = engine
        .generate_payroll(
            &accountant,
            GeneratePayrollCmd {
                employee_id: driver.employee_id,
                ..generate(march())
            },
        )
        .await
        .unwrap();
    let payroll_id = ids[0];

    // Paying before approval is a state error and leaves the ledger alone.
    let err = engine.pay_payroll(&accountant, payroll_id).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));

    let requested = engine
        .request_payroll_payment(&accountant, &ids)
        .await
        .unwrap();
    assert_eq!(requested, ids);
    let director_inbox = engine.notifications(&director).await.unwrap();
    assert!(director_inbox
        .iter()
        .any(|n| n.category == NotificationCategory::PayrollRequest
            && n.title == "Payroll Payment Request"));

    let reviewed = engine
        .review_payroll(&director, payroll_id, ReviewCmd::approve().comment("ok"))
        .await
        .unwrap();
    assert_eq!(reviewed.status, PayrollStatus::Approved);
    assert_eq!(reviewed.reviewed_by, Some(director.user_id));

    let paid = engine.pay_payroll(&accountant, payroll_id).await.unwrap();
    assert_eq!(paid.status, PayrollStatus::Paid);
    assert_eq!(paid.paid_by, Some(accountant.user_id));

    let account = engine.account(&director).await.unwrap();
    assert_eq!(account.current_balance, MoneyCents::new(850_000));
    let ledger = engine.ledger(&director, None).await.unwrap();
    let salary = ledger
        .iter()
        .find(|e| e.entry_type == LedgerEntryType::SalaryPayment)
        .unwrap();
    assert_eq!(salary.amount_delta, MoneyCents::new(-150_000));
    assert_eq!(salary.description, "Salary paid for Bolat (2024-03).");

    let inbox = engine.notifications(&driver).await.unwrap();
    assert!(inbox.iter().any(|n| n.title == "Monthly Salary Paid"));

    // A second payment attempt fails without a second debit.
    let err = engine.pay_payroll(&accountant, payroll_id).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
    assert!(engine.audit_balance(&director).await.unwrap().is_consistent());
    assert_eq!(
        engine.account(&director).await.unwrap().current_balance,
        MoneyCents::new(850_000)
    );
}

#[tokio::test]
async fn regeneration_skips_paid_and_resets_rejected() {
    let engine = engine().await;
    let accountant = accountant(&engine).await;
    let director = director(&engine).await;
    let paid_driver = employee(&engine, "400", EmployeeRole::Driver, "Bolat", 100_000).await;
    let rejected_teacher =
        employee(&engine, "500", EmployeeRole::Teacher, "Saule", 200_000).await;

    let ids = engine.generate_payroll(&accountant, generate(march())).await.unwrap();
    // The accountant has an employee profile too.
    assert_eq!(ids.len(), 3);
    engine
        .request_payroll_payment(&accountant, &ids)
        .await
        .unwrap();

    let all = engine.payrolls(&accountant, Some(march())).await.unwrap();
    let of = |employee_id| {
        all.iter()
            .find(|p| Some(p.employee_id) == employee_id)
            .unwrap()
            .id
    };
    let paid_id = of(paid_driver.employee_id);
    let rejected_id = of(rejected_teacher.employee_id);

    engine
        .review_payroll(&director, paid_id, ReviewCmd::approve())
        .await
        .unwrap();
    engine.pay_payroll(&accountant, paid_id).await.unwrap();
    engine
        .review_payroll(&director, rejected_id, ReviewCmd::reject().comment("recheck"))
        .await
        .unwrap();

    engine
        .update_salary(&director, paid_driver.employee_id.unwrap(), MoneyCents::new(999_999))
        .await
        .unwrap();
    engine
        .update_salary(&director, rejected_teacher.employee_id.unwrap(), MoneyCents::new(250_000))
        .await
        .unwrap();
    let regenerated = engine.generate_payroll(&accountant, generate(march())).await.unwrap();
    assert!(!regenerated.contains(&paid_id));
    assert!(regenerated.contains(&rejected_id));

    let paid = engine.payroll(&accountant, paid_id).await.unwrap();
    assert_eq!(paid.status, PayrollStatus::Paid);
    assert_eq!(paid.figures.base_salary, MoneyCents::new(100_000));

    let reset = engine.payroll(&accountant, rejected_id).await.unwrap();
    assert_eq!(reset.status, PayrollStatus::Pending);
    assert_eq!(reset.figures.base_salary, MoneyCents::new(250_000));
    assert_eq!(reset.reviewed_by, None);
    assert_eq!(reset.review_comment, "");
}

#[tokio::test]
async fn regeneration_refreshes_figures_of_requested_and_approved() {
    let engine = engine().await;
    let accountant = accountant(&engine).await;
    let director = director(&engine).await;
    let driver = employee(&engine, "400", EmployeeRole::Driver, "Bolat", 100_000).await;
    let teacher = employee(&engine, "500", EmployeeRole::Teacher, "Saule", 200_000).await;

    engine.generate_payroll(&accountant, generate(march())).await.unwrap();
    let all = engine.payrolls(&accountant, Some(march())).await.unwrap();
    let of = |employee_id| {
        all.iter()
            .find(|p| Some(p.employee_id) == employee_id)
            .unwrap()
            .id
    };
    let requested_id = of(driver.employee_id);
    let approved_id = of(teacher.employee_id);

    engine
        .request_payroll_payment(&accountant, &[requested_id, approved_id])
        .await
        .unwrap();
    engine
        .review_payroll(&director, approved_id, ReviewCmd::approve())
        .await
        .unwrap();

    for employee in [&driver, &teacher] {
        engine
            .add_bonus(
                &accountant,
                AdjustmentCmd {
                    employee_id: employee.employee_id.unwrap(),
                    month: march(),
                    amount: MoneyCents::new(15_000),
                    reason: "Field trip".to_string(),
                },
            )
            .await
            .unwrap();
    }
    let regenerated = engine.generate_payroll(&accountant, generate(march())).await.unwrap();
    assert!(regenerated.contains(&requested_id));
    assert!(regenerated.contains(&approved_id));

    let requested = engine.payroll(&accountant, requested_id).await.unwrap();
    assert_eq!(requested.status, PayrollStatus::PaymentRequested);
    assert_eq!(requested.figures.total_bonus, MoneyCents::new(15_000));
    assert_eq!(requested.figures.gross_salary, MoneyCents::new(115_000));
    assert_eq!(requested.requested_by, Some(accountant.user_id));

    let approved = engine.payroll(&accountant, approved_id).await.unwrap();
    assert_eq!(approved.status, PayrollStatus::Approved);
    assert_eq!(approved.figures.total_bonus, MoneyCents::new(15_000));
    assert_eq!(approved.figures.gross_salary, MoneyCents::new(215_000));
    assert_eq!(approved.reviewed_by, Some(director.user_id));

    // Still payable with the refreshed figures.
    let paid = engine.pay_payroll(&accountant, approved_id).await.unwrap();
    assert_eq!(paid.status, PayrollStatus::Paid);
}

#[tokio::test]
async fn review_requires_a_pending_request() {
    let engine = engine().await;
    let accountant = accountant(&engine).await;
    let director = director(&engine).await;

    let ids = engine.generate_payroll(&accountant, generate(march())).await.unwrap();
    let err = engine
        .review_payroll(&director, ids[0], ReviewCmd::approve())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));

    let err = engine
        .review_payroll(&accountant, ids[0], ReviewCmd::approve())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn payroll_visibility_depends_on_role() {
    let engine = engine().await;
    let accountant = accountant(&engine).await;
    let director = director(&engine).await;
    let teacher = employee(&engine, "300", EmployeeRole::Teacher, "Tamara", 100_000).await;
    let driver = employee(&engine, "400", EmployeeRole::Driver, "Bolat", 100_000).await;

    engine.generate_payroll(&accountant, generate(march())).await.unwrap();

    assert_eq!(engine.payrolls(&accountant, None).await.unwrap().len(), 3);
    // Directors only see payrolls that left PENDING.
    assert!(engine.payrolls(&director, None).await.unwrap().is_empty());

    let own = engine.payrolls(&teacher, None).await.unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(Some(own[0].employee_id), teacher.employee_id);

    let driver_payroll = engine.payrolls(&driver, None).await.unwrap()[0].id;
    let err = engine.payroll(&teacher, driver_payroll).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn tax_rate_must_be_a_percentage() {
    let engine = engine().await;
    let director = director(&engine).await;

    let err = engine
        .update_payroll_setting(&director, Percent::from_bp(10_001))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidField { ref field, .. } if field == "tax_rate_bp"));
    assert_eq!(
        engine.payroll_setting(&director).await.unwrap().tax_rate,
        Percent::ZERO
    );
}
