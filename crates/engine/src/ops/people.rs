//! Collaborator records the finance core reads: users, employees, attendance
//! and students.
//!
//! These writes exist so the admin CLI and the tests can bootstrap data; in
//! production the owning subsystems maintain them.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, QueryFilter, SqlErr, TransactionTrait, prelude::*, sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{
    Action, Actor, AttendanceStatus, Employee, EngineError, MoneyCents, NewEmployeeCmd,
    NewStudentCmd, NewUserCmd, ResultEngine, Role, Student, User, access, attendance, employees,
    students,
    users::{self, hash_password, verify_password},
    util::normalize_required_text,
};

use super::{Engine, require_employee, require_user, with_tx};

const DUPLICATE_PHONE: &str = "a user with this phone number already exists";

impl Engine {
    /// Registers a user with an argon2-hashed password.
    pub async fn create_user(&self, cmd: NewUserCmd) -> ResultEngine<User> {
        let phone_number = normalize_required_text(&cmd.phone_number, "phone_number")?;
        if cmd.password.is_empty() {
            return Err(EngineError::field("password", "must not be empty"));
        }
        let password_hash = hash_password(&cmd.password)?;

        with_tx!(self, |db_tx| {
            let exists = users::Entity::find()
                .filter(users::Column::PhoneNumber.eq(phone_number.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::field("phone_number", DUPLICATE_PHONE));
            }

            let model = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                phone_number: ActiveValue::Set(phone_number),
                full_name: ActiveValue::Set(cmd.full_name.trim().to_string()),
                role: ActiveValue::Set(cmd.role.as_str().to_string()),
                is_superuser: ActiveValue::Set(cmd.is_superuser),
                password_hash: ActiveValue::Set(password_hash),
                created_at: ActiveValue::Set(Utc::now()),
            };
            let model = model.insert(&db_tx).await.map_err(|err| {
                if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    EngineError::field("phone_number", DUPLICATE_PHONE)
                } else {
                    EngineError::from(err)
                }
            })?;
            let user = User::try_from(model)?;
            tracing::info!(user = %user.id, role = %user.role, "user created");
            Ok(user)
        })
    }

    /// Resolves login credentials into an [`Actor`].
    ///
    /// Returns `None` for an unknown phone number or a wrong password.
    pub async fn authenticate(&self, phone_number: &str, password: &str) -> ResultEngine<Option<Actor>> {
        let Some(model) = users::Entity::find()
            .filter(users::Column::PhoneNumber.eq(phone_number.trim()))
            .one(&self.database)
            .await?
        else {
            return Ok(None);
        };
        if !verify_password(password, &model.password_hash) {
            return Ok(None);
        }
        let user = User::try_from(model)?;
        let employee_id = self.employee_id_for_user(&self.database, user.id).await?;
        Ok(Some(user.into_actor(employee_id)))
    }

    /// Loads the [`Actor`] for a known user id.
    pub async fn actor(&self, user_id: Uuid) -> ResultEngine<Actor> {
        let user = require_user(&self.database, user_id).await?;
        let employee_id = self.employee_id_for_user(&self.database, user.id).await?;
        Ok(user.into_actor(employee_id))
    }

    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        require_user(&self.database, user_id).await
    }

    pub async fn user_by_phone(&self, phone_number: &str) -> ResultEngine<User> {
        users::Entity::find()
            .filter(users::Column::PhoneNumber.eq(phone_number.trim()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?
            .try_into()
    }

    pub(super) async fn employee_id_for_user<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
    ) -> ResultEngine<Option<Uuid>> {
        employees::Entity::find()
            .filter(employees::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await?
            .map(|model| Employee::try_from(model).map(|employee| employee.id))
            .transpose()
    }

    /// Attaches an employee profile to a user.
    pub async fn create_employee(&self, cmd: NewEmployeeCmd) -> ResultEngine<Employee> {
        if cmd.salary.is_negative() {
            return Err(EngineError::field("salary", "must not be negative"));
        }
        with_tx!(self, |db_tx| {
            let user = require_user(&db_tx, cmd.user_id).await?;
            if self.employee_id_for_user(&db_tx, user.id).await?.is_some() {
                return Err(EngineError::field(
                    "user_id",
                    "user already has an employee profile",
                ));
            }
            let model = employees::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                user_id: ActiveValue::Set(user.id.to_string()),
                role: ActiveValue::Set(cmd.role.as_str().to_string()),
                salary_minor: ActiveValue::Set(cmd.salary.cents()),
            };
            let employee = Employee::try_from(model.insert(&db_tx).await?)?;
            tracing::info!(employee = %employee.id, user = %user.id, "employee created");
            Ok(employee)
        })
    }

    pub async fn employee(&self, employee_id: Uuid) -> ResultEngine<Employee> {
        require_employee(&self.database, employee_id).await
    }

    /// Marks attendance for a day, replacing any earlier mark for that day.
    pub async fn record_attendance(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            require_employee(&db_tx, employee_id).await?;
            let model = attendance::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                employee_id: ActiveValue::Set(employee_id.to_string()),
                date: ActiveValue::Set(date),
                status: ActiveValue::Set(status.as_str().to_string()),
            };
            attendance::Entity::insert(model)
                .on_conflict(
                    OnConflict::columns([attendance::Column::EmployeeId, attendance::Column::Date])
                        .update_column(attendance::Column::Status)
                        .to_owned(),
                )
                .exec_without_returning(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Registers a student billed to a parent account.
    pub async fn create_student(&self, cmd: NewStudentCmd) -> ResultEngine<Student> {
        let first_name = normalize_required_text(&cmd.first_name, "first_name")?;
        let last_name = normalize_required_text(&cmd.last_name, "last_name")?;
        if cmd.monthly_tuition_fee.is_negative() {
            return Err(EngineError::field(
                "monthly_tuition_fee",
                "must not be negative",
            ));
        }
        with_tx!(self, |db_tx| {
            let parent = require_user(&db_tx, cmd.parent_id).await?;
            if parent.role != Role::Parent {
                return Err(EngineError::field("parent_id", "must be a parent account"));
            }
            let model = students::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                parent_id: ActiveValue::Set(parent.id.to_string()),
                first_name: ActiveValue::Set(first_name),
                last_name: ActiveValue::Set(last_name),
                class_name: ActiveValue::Set(cmd.class_name.trim().to_string()),
                active: ActiveValue::Set(true),
                monthly_tuition_fee_minor: ActiveValue::Set(cmd.monthly_tuition_fee.cents()),
                created_at: ActiveValue::Set(Utc::now()),
            };
            Student::try_from(model.insert(&db_tx).await?)
        })
    }

    /// Active students are invoiced by the monthly billing run.
    pub async fn set_student_active(&self, student_id: Uuid, active: bool) -> ResultEngine<()> {
        let result = students::Entity::update_many()
            .col_expr(students::Column::Active, Expr::value(active))
            .filter(students::Column::Id.eq(student_id.to_string()))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("student not exists".to_string()));
        }
        Ok(())
    }

    /// Changes the monthly base salary used by future payroll runs.
    pub async fn update_salary(
        &self,
        actor: &Actor,
        employee_id: Uuid,
        salary: MoneyCents,
    ) -> ResultEngine<Employee> {
        access::require(actor, Action::UpdateSalary)?;
        if salary.is_negative() {
            return Err(EngineError::field("salary", "must not be negative"));
        }
        with_tx!(self, |db_tx| {
            let employee = require_employee(&db_tx, employee_id).await?;
            let model = employees::ActiveModel {
                id: ActiveValue::Set(employee.id.to_string()),
                salary_minor: ActiveValue::Set(salary.cents()),
                ..Default::default()
            };
            let employee = Employee::try_from(model.update(&db_tx).await?)?;
            tracing::info!(employee = %employee.id, salary = %salary, by = %actor.user_id, "salary updated");
            Ok(employee)
        })
    }
}
