//! Engine values rendered as API bodies.

use api_types::{
    account::{AccountView, LedgerEntryView, MonthlyReportView, Posting},
    billing::{
        BillingDashboardView, BillingRunView, FeeSettingView, InvoiceView, PaymentView,
    },
    notification::{NotificationView, ParentNotificationView},
    payroll::{AdjustmentView, EmployeeView, PayrollSettingView, PayrollView},
    requests::{CreditView, ExpenseView, RepaymentView},
};
use engine::{
    BillingDashboard, BillingRunSummary, CreditRepayment, CreditRequest, DashboardNotification,
    Employee, ExpenseRequest, FeeSetting, Invoice, LedgerEntry, MonthlyReport, ParentNotification,
    Payment, Payroll, PayrollAdjustment, PayrollSetting, SchoolAccount,
};

pub fn account(account: &SchoolAccount) -> AccountView {
    AccountView {
        id: account.id,
        current_balance_minor: account.current_balance.cents(),
        is_initialized: account.is_initialized,
        updated_at: account.updated_at,
    }
}

pub fn ledger_entry(entry: &LedgerEntry) -> LedgerEntryView {
    LedgerEntryView {
        id: entry.id,
        entry_type: entry.entry_type.to_string(),
        amount_delta_minor: entry.amount_delta.cents(),
        description: entry.description.clone(),
        created_by: entry.created_by,
        created_at: entry.created_at,
    }
}

pub fn posting((account_state, entry): &(SchoolAccount, LedgerEntry)) -> Posting {
    Posting {
        account: account(account_state),
        entry: ledger_entry(entry),
    }
}

pub fn monthly_report(report: &MonthlyReport) -> MonthlyReportView {
    MonthlyReportView {
        month: report.month.to_string(),
        total_income_minor: report.total_income.cents(),
        total_expense_minor: report.total_expense.cents(),
        net_profit_minor: report.net_profit.cents(),
        entries: report.entries.iter().map(ledger_entry).collect(),
    }
}

pub fn invoice(invoice: &Invoice) -> InvoiceView {
    InvoiceView {
        id: invoice.id,
        kind: invoice.kind.to_string(),
        parent_id: invoice.parent_id,
        student_id: invoice.student_id,
        month: invoice.month.to_string(),
        amount_minor: invoice.amount.cents(),
        penalty_amount_minor: invoice.penalty_amount.cents(),
        total_amount_due_minor: invoice.total_amount_due().cents(),
        due_date: invoice.due_date,
        is_paid: invoice.is_paid,
        created_at: invoice.created_at,
    }
}

pub fn payment(payment: &Payment) -> PaymentView {
    PaymentView {
        id: payment.id,
        invoice_id: payment.invoice_id,
        amount_minor: payment.amount.cents(),
        paid_by: payment.paid_by,
        paid_at: payment.paid_at,
    }
}

pub fn fee_setting(setting: &FeeSetting) -> FeeSettingView {
    FeeSettingView {
        penalty_per_day_minor: setting.penalty_per_day.cents(),
        updated_at: setting.updated_at,
    }
}

pub fn billing_run(summary: &BillingRunSummary) -> BillingRunView {
    BillingRunView {
        month: summary.month.map(|month| month.to_string()),
        invoices_created: summary.invoices_created,
        penalties_updated: summary.penalties_updated,
        invoices_paid: summary.invoices_paid,
        reminders_created: summary.reminders_created,
    }
}

pub fn billing_dashboard(dashboard: &BillingDashboard) -> BillingDashboardView {
    BillingDashboardView {
        month: dashboard.month.to_string(),
        total_invoices: dashboard.total_invoices,
        paid_count: dashboard.paid_invoices.len(),
        unpaid_count: dashboard.unpaid_invoices.len(),
        overdue_count: dashboard.overdue_count,
        paid_invoices: dashboard.paid_invoices.iter().map(invoice).collect(),
        unpaid_invoices: dashboard.unpaid_invoices.iter().map(invoice).collect(),
    }
}

pub fn payroll(payroll: &Payroll) -> PayrollView {
    let figures = &payroll.figures;
    PayrollView {
        id: payroll.id,
        employee_id: payroll.employee_id,
        month: payroll.month.to_string(),
        total_present_days: payroll.total_present_days,
        base_salary_minor: figures.base_salary.cents(),
        overtime_amount_minor: figures.overtime_amount.cents(),
        total_bonus_minor: figures.total_bonus.cents(),
        total_deductions_minor: figures.total_deductions.cents(),
        gross_salary_minor: figures.gross_salary.cents(),
        tax_rate_bp: figures.tax_rate.bp(),
        tax_amount_minor: figures.tax_amount.cents(),
        net_salary_minor: figures.net_salary.cents(),
        status: payroll.status.to_string(),
        requested_by: payroll.requested_by,
        requested_at: payroll.requested_at,
        reviewed_by: payroll.reviewed_by,
        reviewed_at: payroll.reviewed_at,
        review_comment: payroll.review_comment.clone(),
        paid_by: payroll.paid_by,
        paid_at: payroll.paid_at,
        created_at: payroll.created_at,
    }
}

pub fn adjustment(adjustment: &PayrollAdjustment) -> AdjustmentView {
    AdjustmentView {
        id: adjustment.id,
        employee_id: adjustment.employee_id,
        month: adjustment.month.to_string(),
        kind: adjustment.kind.to_string(),
        amount_minor: adjustment.amount.cents(),
        reason: adjustment.reason.clone(),
        created_at: adjustment.created_at,
    }
}

pub fn payroll_setting(setting: &PayrollSetting) -> PayrollSettingView {
    PayrollSettingView {
        tax_rate_bp: setting.tax_rate.bp(),
        updated_at: setting.updated_at,
    }
}

pub fn employee(employee: &Employee) -> EmployeeView {
    EmployeeView {
        id: employee.id,
        user_id: employee.user_id,
        role: employee.role.to_string(),
        salary_minor: employee.salary.cents(),
    }
}

pub fn expense(expense: &ExpenseRequest) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        requested_by: expense.requested_by,
        category: expense.category.to_string(),
        title: expense.title.clone(),
        amount_minor: expense.amount.cents(),
        reason: expense.reason.clone(),
        status: expense.status.to_string(),
        admin_comment: expense.admin_comment.clone(),
        reviewed_by: expense.reviewed_by,
        reviewed_at: expense.reviewed_at,
        paid_by: expense.paid_by,
        paid_at: expense.paid_at,
        created_at: expense.created_at,
    }
}

pub fn credit(credit: &CreditRequest) -> CreditView {
    CreditView {
        id: credit.id,
        employee_id: credit.employee_id,
        amount_minor: credit.amount.cents(),
        reason: credit.reason.clone(),
        status: credit.status.to_string(),
        admin_comment: credit.admin_comment.clone(),
        reviewed_by: credit.reviewed_by,
        reviewed_at: credit.reviewed_at,
        given_by: credit.given_by,
        given_at: credit.given_at,
        total_repaid_minor: credit.total_repaid.cents(),
        outstanding_minor: credit.outstanding().cents(),
        created_at: credit.created_at,
    }
}

pub fn repayment(repayment: &CreditRepayment) -> RepaymentView {
    RepaymentView {
        id: repayment.id,
        credit_request_id: repayment.credit_request_id,
        amount_minor: repayment.amount.cents(),
        recorded_by: repayment.recorded_by,
        created_at: repayment.created_at,
    }
}

pub fn notification(notification: &DashboardNotification) -> NotificationView {
    NotificationView {
        id: notification.id,
        category: notification.category.to_string(),
        title: notification.title.clone(),
        message: notification.message.clone(),
        is_read: notification.is_read,
        created_at: notification.created_at,
    }
}

pub fn parent_notification(notification: &ParentNotification) -> ParentNotificationView {
    ParentNotificationView {
        id: notification.id,
        student_id: notification.student_id,
        invoice_id: notification.invoice_id,
        notification_type: notification.notification_type.to_string(),
        title: notification.title.clone(),
        message: notification.message.clone(),
        is_read: notification.is_read,
        created_at: notification.created_at,
    }
}
