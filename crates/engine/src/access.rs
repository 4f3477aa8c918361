//! Capability checks.
//!
//! Every engine operation receives the authenticated [`Actor`] and asks
//! [`require`] for the [`Action`] it is about to perform. The mapping
//! `(role, action) -> allow/deny` lives in one place: [`Action::rule`] plus
//! [`Actor::satisfies`].
//!
//! Object-level checks (an employee reading their own payroll, a parent paying
//! their own invoice) happen after the object is loaded, through
//! [`Actor::is_staff`].

use uuid::Uuid;

use crate::{EngineError, ResultEngine, Role};

/// The authenticated user performing an operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub phone_number: String,
    pub full_name: String,
    pub role: Role,
    pub is_superuser: bool,
    /// Set when the user has an employee profile.
    pub employee_id: Option<Uuid>,
}

impl Actor {
    /// `full_name`, falling back to the phone number.
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.phone_number
        } else {
            &self.full_name
        }
    }

    pub fn is_director(&self) -> bool {
        self.role == Role::Director || self.is_superuser
    }

    /// Directors, accountants and superusers.
    pub fn is_staff(&self) -> bool {
        matches!(self.role, Role::Director | Role::Accountant) || self.is_superuser
    }

    pub fn satisfies(&self, rule: Rule) -> bool {
        match rule {
            Rule::Authenticated => true,
            Rule::DirectorOrSuperuser => self.is_director(),
            // Superuser does not imply accountant.
            Rule::Accountant => self.role == Role::Accountant,
            Rule::DirectorOrAccountant => self.is_staff(),
            Rule::EmployeeSelf => self.employee_id.is_some(),
        }
    }

    pub fn can(&self, action: Action) -> bool {
        self.satisfies(action.rule())
    }
}

/// Permission rule sets shared by all resources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    Authenticated,
    DirectorOrSuperuser,
    Accountant,
    DirectorOrAccountant,
    EmployeeSelf,
}

/// Every guarded operation of the finance core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    ViewAccount,
    InitializeAccount,
    RecordManualIncome,
    ViewLedger,
    ViewReports,

    CreateInvoice,
    ViewInvoices,
    RecordPayment,
    RunBilling,
    ViewBillingDashboard,
    ManageFeeSettings,

    ViewPayrolls,
    GeneratePayroll,
    RequestPayrollPayment,
    ReviewPayroll,
    PayPayroll,
    ManagePayrollAdjustments,
    ManagePayrollSettings,
    UpdateSalary,

    CreateExpense,
    ViewExpenses,
    ReviewExpense,
    PayExpense,

    CreateCredit,
    ViewCredits,
    ReviewCredit,
    GiveCredit,
    RecordRepayment,

    ViewNotifications,
}

impl Action {
    pub fn rule(self) -> Rule {
        match self {
            Self::ViewAccount
            | Self::InitializeAccount
            | Self::RecordManualIncome
            | Self::ViewLedger
            | Self::ViewReports
            | Self::CreateInvoice
            | Self::RunBilling
            | Self::ViewBillingDashboard
            | Self::ManagePayrollAdjustments
            | Self::RecordRepayment => Rule::DirectorOrAccountant,

            Self::ManageFeeSettings
            | Self::ReviewPayroll
            | Self::ManagePayrollSettings
            | Self::UpdateSalary
            | Self::ReviewExpense
            | Self::ReviewCredit => Rule::DirectorOrSuperuser,

            Self::GeneratePayroll
            | Self::RequestPayrollPayment
            | Self::PayPayroll
            | Self::PayExpense
            | Self::GiveCredit => Rule::Accountant,

            Self::CreateCredit => Rule::EmployeeSelf,

            Self::ViewInvoices
            | Self::RecordPayment
            | Self::ViewPayrolls
            | Self::CreateExpense
            | Self::ViewExpenses
            | Self::ViewCredits
            | Self::ViewNotifications => Rule::Authenticated,
        }
    }
}

/// Rejects the action with [`EngineError::Forbidden`] unless the actor may perform it.
pub fn require(actor: &Actor, action: Action) -> ResultEngine<()> {
    if actor.can(action) {
        return Ok(());
    }
    tracing::warn!(user = %actor.user_id, ?action, "action denied");
    Err(EngineError::Forbidden(format!(
        "{} may not perform {action:?}",
        actor.role.as_str()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role) -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            phone_number: "555".to_string(),
            full_name: String::new(),
            role,
            is_superuser: false,
            employee_id: None,
        }
    }

    #[test]
    fn accountant_workflow_is_accountant_only() {
        let mut director = actor(Role::Director);
        director.is_superuser = true;
        assert!(!director.can(Action::PayPayroll));
        assert!(!director.can(Action::GeneratePayroll));
        assert!(actor(Role::Accountant).can(Action::PayPayroll));
    }

    #[test]
    fn reviews_need_director_or_superuser() {
        assert!(actor(Role::Director).can(Action::ReviewPayroll));
        assert!(!actor(Role::Accountant).can(Action::ReviewExpense));

        let mut teacher = actor(Role::Teacher);
        assert!(!teacher.can(Action::ReviewCredit));
        teacher.is_superuser = true;
        assert!(teacher.can(Action::ReviewCredit));
        assert!(teacher.can(Action::ViewLedger));
    }

    #[test]
    fn credit_requests_need_an_employee_profile() {
        let mut driver = actor(Role::Driver);
        assert!(!driver.can(Action::CreateCredit));
        driver.employee_id = Some(Uuid::new_v4());
        assert!(driver.can(Action::CreateCredit));
    }

    #[test]
    fn require_maps_deny_to_forbidden() {
        let parent = actor(Role::Parent);
        assert!(require(&parent, Action::CreateExpense).is_ok());
        assert!(matches!(
            require(&parent, Action::ViewLedger),
            Err(EngineError::Forbidden(_))
        ));
    }

    #[test]
    fn display_name_falls_back_to_phone() {
        let mut user = actor(Role::Parent);
        assert_eq!(user.display_name(), "555");
        user.full_name = "Amina".to_string();
        assert_eq!(user.display_name(), "Amina");
    }
}
