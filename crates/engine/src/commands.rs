//! Command structs for engine write operations.
//!
//! These group the parameters of create-style operations so call sites in the
//! server and the admin CLI stay readable.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{EmployeeRole, ExpenseCategory, Month, MoneyCents, Role};

/// Register a user account.
#[derive(Clone, Debug)]
pub struct NewUserCmd {
    pub phone_number: String,
    pub full_name: String,
    pub role: Role,
    pub password: String,
    pub is_superuser: bool,
}

impl NewUserCmd {
    #[must_use]
    pub fn new(phone_number: impl Into<String>, role: Role, password: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            full_name: String::new(),
            role,
            password: password.into(),
            is_superuser: false,
        }
    }

    #[must_use]
    pub fn full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = full_name.into();
        self
    }

    #[must_use]
    pub fn superuser(mut self, is_superuser: bool) -> Self {
        self.is_superuser = is_superuser;
        self
    }
}

/// Attach an employee profile to an existing user.
#[derive(Clone, Debug)]
pub struct NewEmployeeCmd {
    pub user_id: Uuid,
    pub role: EmployeeRole,
    pub salary: MoneyCents,
}

#[derive(Clone, Debug)]
pub struct NewStudentCmd {
    pub parent_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub class_name: String,
    pub monthly_tuition_fee: MoneyCents,
}

/// Compute payrolls for `month`, for one employee or for everybody.
#[derive(Clone, Debug)]
pub struct GeneratePayrollCmd {
    pub month: Month,
    pub employee_id: Option<Uuid>,
    pub overtime_amount: MoneyCents,
}

/// A bonus or a deduction line for one employee and month.
#[derive(Clone, Debug)]
pub struct AdjustmentCmd {
    pub employee_id: Uuid,
    pub month: Month,
    pub amount: MoneyCents,
    pub reason: String,
}

/// Approve or reject a pending request.
#[derive(Clone, Debug, Default)]
pub struct ReviewCmd {
    pub approve: bool,
    pub comment: Option<String>,
}

impl ReviewCmd {
    #[must_use]
    pub fn approve() -> Self {
        Self {
            approve: true,
            comment: None,
        }
    }

    #[must_use]
    pub fn reject() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

#[derive(Clone, Debug)]
pub struct NewExpenseCmd {
    pub category: ExpenseCategory,
    pub title: String,
    pub amount: MoneyCents,
    pub reason: String,
}

#[derive(Clone, Debug)]
pub struct NewCreditCmd {
    pub amount: MoneyCents,
    pub reason: String,
}

/// Bill a parent. Setting `student_id` makes it a tuition invoice.
#[derive(Clone, Debug)]
pub struct NewInvoiceCmd {
    pub parent_id: Uuid,
    pub student_id: Option<Uuid>,
    pub month: Month,
    pub amount: MoneyCents,
    pub due_date: NaiveDate,
}
