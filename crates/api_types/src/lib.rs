//! Request and response bodies of the HTTP API.
//!
//! Money travels as integer minor units (`*_minor`, cents) and rates as basis
//! points (`*_bp`, 1000 = 10.00%). Months are `YYYY-MM` strings, statuses and
//! categories their upper-case storage names.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `?month=YYYY-MM` query string shared by the list endpoints.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

/// Approve or reject a pending request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Review {
    pub approve: bool,
    pub comment: Option<String>,
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub current_balance_minor: i64,
        pub is_initialized: bool,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountInitialize {
        pub initial_balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ManualIncome {
        pub amount_minor: i64,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerEntryView {
        pub id: Uuid,
        pub entry_type: String,
        /// Signed: positive is income, negative is expense.
        pub amount_delta_minor: i64,
        pub description: String,
        pub created_by: Option<Uuid>,
        pub created_at: DateTime<Utc>,
    }

    /// Result of a ledger posting: the new balance and the entry.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Posting {
        pub account: AccountView,
        pub entry: LedgerEntryView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthlyReportView {
        pub month: String,
        pub total_income_minor: i64,
        pub total_expense_minor: i64,
        pub net_profit_minor: i64,
        pub entries: Vec<LedgerEntryView>,
    }
}

pub mod billing {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvoiceNew {
        pub parent_id: Uuid,
        /// Set for tuition invoices.
        pub student_id: Option<Uuid>,
        pub month: String,
        pub amount_minor: i64,
        pub due_date: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvoiceView {
        pub id: Uuid,
        pub kind: String,
        pub parent_id: Uuid,
        pub student_id: Option<Uuid>,
        pub month: String,
        pub amount_minor: i64,
        pub penalty_amount_minor: i64,
        pub total_amount_due_minor: i64,
        pub due_date: NaiveDate,
        pub is_paid: bool,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentNew {
        pub invoice_id: Uuid,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentView {
        pub id: Uuid,
        pub invoice_id: Uuid,
        pub amount_minor: i64,
        pub paid_by: Option<Uuid>,
        pub paid_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentRecorded {
        pub invoice: InvoiceView,
        pub payment: PaymentView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FeeSettingView {
        pub penalty_per_day_minor: i64,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FeeSettingUpdate {
        pub penalty_per_day_minor: i64,
    }

    /// Billing job trigger. Jobs always run against the server's current UTC
    /// date; `due_day` defaults to the configured due day.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BillingRun {
        pub due_day: Option<u32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BillingRunView {
        pub month: Option<String>,
        pub invoices_created: u64,
        pub penalties_updated: u64,
        pub invoices_paid: u64,
        pub reminders_created: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BillingDashboardView {
        pub month: String,
        pub total_invoices: usize,
        pub paid_count: usize,
        pub unpaid_count: usize,
        pub overdue_count: usize,
        pub paid_invoices: Vec<InvoiceView>,
        pub unpaid_invoices: Vec<InvoiceView>,
    }
}

pub mod payroll {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayrollView {
        pub id: Uuid,
        pub employee_id: Uuid,
        pub month: String,
        pub total_present_days: i32,
        pub base_salary_minor: i64,
        pub overtime_amount_minor: i64,
        pub total_bonus_minor: i64,
        pub total_deductions_minor: i64,
        pub gross_salary_minor: i64,
        pub tax_rate_bp: i64,
        pub tax_amount_minor: i64,
        pub net_salary_minor: i64,
        pub status: String,
        pub requested_by: Option<Uuid>,
        pub requested_at: Option<DateTime<Utc>>,
        pub reviewed_by: Option<Uuid>,
        pub reviewed_at: Option<DateTime<Utc>>,
        pub review_comment: String,
        pub paid_by: Option<Uuid>,
        pub paid_at: Option<DateTime<Utc>>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayrollGenerate {
        pub month: String,
        /// Only this employee; everybody when absent.
        pub employee_id: Option<Uuid>,
        #[serde(default)]
        pub overtime_amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayrollIds {
        pub payroll_ids: Vec<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AdjustmentNew {
        pub employee_id: Uuid,
        pub month: String,
        pub amount_minor: i64,
        #[serde(default)]
        pub reason: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AdjustmentView {
        pub id: Uuid,
        pub employee_id: Uuid,
        pub month: String,
        pub kind: String,
        pub amount_minor: i64,
        pub reason: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayrollSettingView {
        pub tax_rate_bp: i64,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayrollSettingUpdate {
        pub tax_rate_bp: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SalaryUpdate {
        pub employee_id: Uuid,
        pub salary_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EmployeeView {
        pub id: Uuid,
        pub user_id: Uuid,
        pub role: String,
        pub salary_minor: i64,
    }
}

pub mod requests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        /// `FUEL`, `GARAGE` or `OTHER`.
        pub category: String,
        pub title: String,
        pub amount_minor: i64,
        pub reason: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub requested_by: Uuid,
        pub category: String,
        pub title: String,
        pub amount_minor: i64,
        pub reason: String,
        pub status: String,
        pub admin_comment: String,
        pub reviewed_by: Option<Uuid>,
        pub reviewed_at: Option<DateTime<Utc>>,
        pub paid_by: Option<Uuid>,
        pub paid_at: Option<DateTime<Utc>>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CreditNew {
        pub amount_minor: i64,
        pub reason: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CreditView {
        pub id: Uuid,
        pub employee_id: Uuid,
        pub amount_minor: i64,
        pub reason: String,
        pub status: String,
        pub admin_comment: String,
        pub reviewed_by: Option<Uuid>,
        pub reviewed_at: Option<DateTime<Utc>>,
        pub given_by: Option<Uuid>,
        pub given_at: Option<DateTime<Utc>>,
        pub total_repaid_minor: i64,
        pub outstanding_minor: i64,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RepaymentNew {
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RepaymentView {
        pub id: Uuid,
        pub credit_request_id: Uuid,
        pub amount_minor: i64,
        pub recorded_by: Option<Uuid>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RepaymentRecorded {
        pub credit: CreditView,
        pub repayment: RepaymentView,
    }
}

pub mod notification {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NotificationView {
        pub id: Uuid,
        pub category: String,
        pub title: String,
        pub message: String,
        pub is_read: bool,
        pub created_at: DateTime<Utc>,
    }

    /// Either explicit ids or `all: true`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct NotificationSelection {
        pub ids: Option<Vec<Uuid>>,
        #[serde(default)]
        pub all: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Updated {
        pub updated: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParentNotificationView {
        pub id: Uuid,
        pub student_id: Option<Uuid>,
        pub invoice_id: Option<Uuid>,
        pub notification_type: String,
        pub title: String,
        pub message: String,
        pub is_read: bool,
        pub created_at: DateTime<Utc>,
    }
}
