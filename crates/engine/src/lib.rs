//! Finance core of the school administration backend.
//!
//! The [`Engine`] owns the database connection and exposes every finance
//! operation: the school ledger, payroll generation and approval, expense and
//! credit workflows, invoicing with overdue penalties, and notifications.
//! Each operation receives the authenticated [`Actor`] and checks it against
//! the capability map in [`access`] before touching any data.

pub use access::{Action, Actor, Rule};
pub use attendance::AttendanceStatus;
pub use commands::{
    AdjustmentCmd, GeneratePayrollCmd, NewCreditCmd, NewEmployeeCmd, NewExpenseCmd,
    NewInvoiceCmd, NewStudentCmd, NewUserCmd, ReviewCmd,
};
pub use credit_repayments::CreditRepayment;
pub use credit_requests::{CreditRequest, CreditStatus};
pub use dashboard_notifications::{DashboardNotification, NotificationCategory};
pub use employees::{Employee, EmployeeRole};
pub use error::EngineError;
pub use expense_requests::{ExpenseCategory, ExpenseRequest, ExpenseStatus};
pub use invoices::{Invoice, InvoiceKind, overdue_penalty};
pub use ledger_entries::{LedgerEntry, LedgerEntryType};
pub use money::{MoneyCents, Percent};
pub use month::Month;
pub use ops::{
    BalanceAudit, BillingDashboard, BillingRunSummary, Engine, EngineBuilder, MonthlyReport,
    NotificationSelection,
};
pub use parent_notifications::{ParentNotification, ParentNotificationType};
pub use payments::Payment;
pub use payroll_adjustments::{AdjustmentKind, PayrollAdjustment};
pub use payrolls::{Payroll, PayrollFigures, PayrollStatus};
pub use school_account::SchoolAccount;
pub use settings::{FeeSetting, PayrollSetting};
pub use students::Student;
pub use users::{Role, User};

pub mod access;
mod attendance;
mod commands;
mod credit_repayments;
mod credit_requests;
mod dashboard_notifications;
mod employees;
mod error;
mod expense_requests;
mod invoices;
mod ledger_entries;
mod money;
mod month;
mod ops;
mod parent_notifications;
mod payments;
mod payroll_adjustments;
mod payrolls;
mod school_account;
mod settings;
mod students;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
