//! Initial schema for the KG school finance core.
//!
//! - `users`, `employees`, `attendance`, `students`: people the finance core reads
//! - `school_accounts`, `ledger_entries`: the single money account and its journal
//! - `payroll_settings`, `payrolls`, `payroll_adjustments`: monthly salaries
//! - `expense_requests`, `credit_requests`, `credit_repayments`: staff requests
//! - `fee_settings`, `invoices`, `payments`: parent billing
//! - `dashboard_notifications`, `parent_notifications`: messages
//!
//! Money columns are integer cents (`*_minor`), rates are basis points
//! (`*_bp`), months are `YYYY-MM` text.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    PhoneNumber,
    FullName,
    Role,
    IsSuperuser,
    PasswordHash,
    CreatedAt,
}

#[derive(Iden)]
enum Employees {
    Table,
    Id,
    UserId,
    Role,
    SalaryMinor,
}

#[derive(Iden)]
enum Attendance {
    Table,
    Id,
    EmployeeId,
    Date,
    Status,
}

#[derive(Iden)]
enum Students {
    Table,
    Id,
    ParentId,
    FirstName,
    LastName,
    ClassName,
    Active,
    MonthlyTuitionFeeMinor,
    CreatedAt,
}

#[derive(Iden)]
enum SchoolAccounts {
    Table,
    Id,
    Scope,
    CurrentBalanceMinor,
    IsInitialized,
    UpdatedAt,
}

#[derive(Iden)]
enum LedgerEntries {
    Table,
    Id,
    AccountId,
    EntryType,
    AmountDeltaMinor,
    Description,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum PayrollSettings {
    Table,
    Scope,
    TaxRateBp,
    UpdatedAt,
}

#[derive(Iden)]
enum Payrolls {
    Table,
    Id,
    EmployeeId,
    Month,
    BaseSalaryMinor,
    TotalPresentDays,
    OvertimeAmountMinor,
    TotalBonusMinor,
    TotalDeductionsMinor,
    GrossSalaryMinor,
    TaxRateBp,
    TaxAmountMinor,
    NetSalaryMinor,
    Status,
    RequestedBy,
    RequestedAt,
    ReviewedBy,
    ReviewedAt,
    ReviewComment,
    PaidBy,
    PaidAt,
    CreatedAt,
}

#[derive(Iden)]
enum PayrollAdjustments {
    Table,
    Id,
    EmployeeId,
    Month,
    Kind,
    AmountMinor,
    Reason,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum ExpenseRequests {
    Table,
    Id,
    RequestedBy,
    Category,
    Title,
    AmountMinor,
    Reason,
    Status,
    AdminComment,
    ReviewedBy,
    ReviewedAt,
    PaidBy,
    PaidAt,
    CreatedAt,
}

#[derive(Iden)]
enum CreditRequests {
    Table,
    Id,
    EmployeeId,
    AmountMinor,
    Reason,
    Status,
    AdminComment,
    ReviewedBy,
    ReviewedAt,
    GivenBy,
    GivenAt,
    TotalRepaidMinor,
    CreatedAt,
}

#[derive(Iden)]
enum CreditRepayments {
    Table,
    Id,
    CreditRequestId,
    AmountMinor,
    RecordedBy,
    CreatedAt,
}

#[derive(Iden)]
enum FeeSettings {
    Table,
    Scope,
    PenaltyPerDayMinor,
    UpdatedAt,
}

#[derive(Iden)]
enum Invoices {
    Table,
    Id,
    Kind,
    ParentId,
    StudentId,
    Month,
    AmountMinor,
    PenaltyAmountMinor,
    DueDate,
    IsPaid,
    CreatedAt,
}

#[derive(Iden)]
enum Payments {
    Table,
    Id,
    InvoiceId,
    AmountMinor,
    PaidBy,
    PaidAt,
}

#[derive(Iden)]
enum DashboardNotifications {
    Table,
    Id,
    RecipientId,
    Category,
    Title,
    Message,
    IsRead,
    IsHidden,
    CreatedAt,
}

#[derive(Iden)]
enum ParentNotifications {
    Table,
    Id,
    ParentId,
    StudentId,
    InvoiceId,
    NotificationType,
    Title,
    Message,
    IsRead,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::PhoneNumber).string().not_null())
                    .col(
                        ColumnDef::new(Users::FullName)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(
                        ColumnDef::new(Users::IsSuperuser)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-phone_number-unique")
                    .table(Users::Table)
                    .col(Users::PhoneNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Employees and attendance
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Employees::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Employees::UserId).string().not_null())
                    .col(ColumnDef::new(Employees::Role).string().not_null())
                    .col(
                        ColumnDef::new(Employees::SalaryMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-employees-user_id")
                            .from(Employees::Table, Employees::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-employees-user_id-unique")
                    .table(Employees::Table)
                    .col(Employees::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Attendance::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Attendance::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Attendance::EmployeeId).string().not_null())
                    .col(ColumnDef::new(Attendance::Date).date().not_null())
                    .col(ColumnDef::new(Attendance::Status).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-attendance-employee_id")
                            .from(Attendance::Table, Attendance::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-attendance-employee_id-date-unique")
                    .table(Attendance::Table)
                    .col(Attendance::EmployeeId)
                    .col(Attendance::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Students
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Students::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Students::ParentId).string().not_null())
                    .col(ColumnDef::new(Students::FirstName).string().not_null())
                    .col(ColumnDef::new(Students::LastName).string().not_null())
                    .col(
                        ColumnDef::new(Students::ClassName)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Students::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Students::MonthlyTuitionFeeMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Students::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-students-parent_id")
                            .from(Students::Table, Students::ParentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-students-parent_id")
                    .table(Students::Table)
                    .col(Students::ParentId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. School account and ledger
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(SchoolAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SchoolAccounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SchoolAccounts::Scope).string().not_null())
                    .col(
                        ColumnDef::new(SchoolAccounts::CurrentBalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SchoolAccounts::IsInitialized)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(SchoolAccounts::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-school_accounts-scope-unique")
                    .table(SchoolAccounts::Table)
                    .col(SchoolAccounts::Scope)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LedgerEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerEntries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LedgerEntries::AccountId).string().not_null())
                    .col(ColumnDef::new(LedgerEntries::EntryType).string().not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::AmountDeltaMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(LedgerEntries::CreatedBy).string())
                    .col(
                        ColumnDef::new(LedgerEntries::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ledger_entries-account_id")
                            .from(LedgerEntries::Table, LedgerEntries::AccountId)
                            .to(SchoolAccounts::Table, SchoolAccounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ledger_entries-created_by")
                            .from(LedgerEntries::Table, LedgerEntries::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-created_at")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Payroll
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PayrollSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PayrollSettings::Scope)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PayrollSettings::TaxRateBp)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PayrollSettings::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payrolls::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payrolls::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payrolls::EmployeeId).string().not_null())
                    .col(ColumnDef::new(Payrolls::Month).string().not_null())
                    .col(
                        ColumnDef::new(Payrolls::BaseSalaryMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Payrolls::TotalPresentDays)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Payrolls::OvertimeAmountMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Payrolls::TotalBonusMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Payrolls::TotalDeductionsMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Payrolls::GrossSalaryMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Payrolls::TaxRateBp)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Payrolls::TaxAmountMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Payrolls::NetSalaryMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payrolls::Status).string().not_null())
                    .col(ColumnDef::new(Payrolls::RequestedBy).string())
                    .col(ColumnDef::new(Payrolls::RequestedAt).timestamp())
                    .col(ColumnDef::new(Payrolls::ReviewedBy).string())
                    .col(ColumnDef::new(Payrolls::ReviewedAt).timestamp())
                    .col(
                        ColumnDef::new(Payrolls::ReviewComment)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Payrolls::PaidBy).string())
                    .col(ColumnDef::new(Payrolls::PaidAt).timestamp())
                    .col(ColumnDef::new(Payrolls::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payrolls-employee_id")
                            .from(Payrolls::Table, Payrolls::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payrolls-employee_id-month-unique")
                    .table(Payrolls::Table)
                    .col(Payrolls::EmployeeId)
                    .col(Payrolls::Month)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PayrollAdjustments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PayrollAdjustments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PayrollAdjustments::EmployeeId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PayrollAdjustments::Month).string().not_null())
                    .col(ColumnDef::new(PayrollAdjustments::Kind).string().not_null())
                    .col(
                        ColumnDef::new(PayrollAdjustments::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PayrollAdjustments::Reason)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(PayrollAdjustments::CreatedBy).string())
                    .col(
                        ColumnDef::new(PayrollAdjustments::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payroll_adjustments-employee_id")
                            .from(PayrollAdjustments::Table, PayrollAdjustments::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payroll_adjustments-employee_id-month")
                    .table(PayrollAdjustments::Table)
                    .col(PayrollAdjustments::EmployeeId)
                    .col(PayrollAdjustments::Month)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Expense and credit requests
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpenseRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseRequests::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExpenseRequests::RequestedBy)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExpenseRequests::Category).string().not_null())
                    .col(ColumnDef::new(ExpenseRequests::Title).string().not_null())
                    .col(
                        ColumnDef::new(ExpenseRequests::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExpenseRequests::Reason).string().not_null())
                    .col(ColumnDef::new(ExpenseRequests::Status).string().not_null())
                    .col(
                        ColumnDef::new(ExpenseRequests::AdminComment)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(ExpenseRequests::ReviewedBy).string())
                    .col(ColumnDef::new(ExpenseRequests::ReviewedAt).timestamp())
                    .col(ColumnDef::new(ExpenseRequests::PaidBy).string())
                    .col(ColumnDef::new(ExpenseRequests::PaidAt).timestamp())
                    .col(
                        ColumnDef::new(ExpenseRequests::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_requests-requested_by")
                            .from(ExpenseRequests::Table, ExpenseRequests::RequestedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CreditRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CreditRequests::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CreditRequests::EmployeeId).string().not_null())
                    .col(
                        ColumnDef::new(CreditRequests::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CreditRequests::Reason).string().not_null())
                    .col(ColumnDef::new(CreditRequests::Status).string().not_null())
                    .col(
                        ColumnDef::new(CreditRequests::AdminComment)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(CreditRequests::ReviewedBy).string())
                    .col(ColumnDef::new(CreditRequests::ReviewedAt).timestamp())
                    .col(ColumnDef::new(CreditRequests::GivenBy).string())
                    .col(ColumnDef::new(CreditRequests::GivenAt).timestamp())
                    .col(
                        ColumnDef::new(CreditRequests::TotalRepaidMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CreditRequests::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-credit_requests-employee_id")
                            .from(CreditRequests::Table, CreditRequests::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CreditRepayments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CreditRepayments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CreditRepayments::CreditRequestId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CreditRepayments::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CreditRepayments::RecordedBy).string())
                    .col(
                        ColumnDef::new(CreditRepayments::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-credit_repayments-credit_request_id")
                            .from(CreditRepayments::Table, CreditRepayments::CreditRequestId)
                            .to(CreditRequests::Table, CreditRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Billing
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(FeeSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FeeSettings::Scope)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FeeSettings::PenaltyPerDayMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(FeeSettings::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Invoices::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Invoices::Kind).string().not_null())
                    .col(ColumnDef::new(Invoices::ParentId).string().not_null())
                    .col(ColumnDef::new(Invoices::StudentId).string())
                    .col(ColumnDef::new(Invoices::Month).string().not_null())
                    .col(
                        ColumnDef::new(Invoices::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Invoices::PenaltyAmountMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Invoices::DueDate).date().not_null())
                    .col(
                        ColumnDef::new(Invoices::IsPaid)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Invoices::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-invoices-parent_id")
                            .from(Invoices::Table, Invoices::ParentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-invoices-student_id")
                            .from(Invoices::Table, Invoices::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // NULL student ids (general invoices) never collide.
        manager
            .create_index(
                Index::create()
                    .name("idx-invoices-student_id-month-unique")
                    .table(Invoices::Table)
                    .col(Invoices::StudentId)
                    .col(Invoices::Month)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-invoices-parent_id")
                    .table(Invoices::Table)
                    .col(Invoices::ParentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-invoices-is_paid-due_date")
                    .table(Invoices::Table)
                    .col(Invoices::IsPaid)
                    .col(Invoices::DueDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payments::InvoiceId).string().not_null())
                    .col(
                        ColumnDef::new(Payments::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payments::PaidBy).string())
                    .col(ColumnDef::new(Payments::PaidAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payments-invoice_id")
                            .from(Payments::Table, Payments::InvoiceId)
                            .to(Invoices::Table, Invoices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payments-invoice_id")
                    .table(Payments::Table)
                    .col(Payments::InvoiceId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Notifications
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(DashboardNotifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DashboardNotifications::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DashboardNotifications::RecipientId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DashboardNotifications::Category)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DashboardNotifications::Title)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DashboardNotifications::Message)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DashboardNotifications::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(DashboardNotifications::IsHidden)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(DashboardNotifications::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-dashboard_notifications-recipient_id")
                            .from(
                                DashboardNotifications::Table,
                                DashboardNotifications::RecipientId,
                            )
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-dashboard_notifications-recipient_id")
                    .table(DashboardNotifications::Table)
                    .col(DashboardNotifications::RecipientId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ParentNotifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ParentNotifications::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ParentNotifications::ParentId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ParentNotifications::StudentId).string())
                    .col(ColumnDef::new(ParentNotifications::InvoiceId).string())
                    .col(
                        ColumnDef::new(ParentNotifications::NotificationType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ParentNotifications::Title)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ParentNotifications::Message)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ParentNotifications::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ParentNotifications::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-parent_notifications-parent_id")
                            .from(ParentNotifications::Table, ParentNotifications::ParentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-parent_notifications-invoice_id")
                            .from(ParentNotifications::Table, ParentNotifications::InvoiceId)
                            .to(Invoices::Table, Invoices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One reminder and one thank-you per invoice.
        manager
            .create_index(
                Index::create()
                    .name("idx-parent_notifications-invoice_id-type-unique")
                    .table(ParentNotifications::Table)
                    .col(ParentNotifications::InvoiceId)
                    .col(ParentNotifications::NotificationType)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(ParentNotifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DashboardNotifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Invoices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FeeSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CreditRepayments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CreditRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PayrollAdjustments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payrolls::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PayrollSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SchoolAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Attendance::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Employees::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
