#![allow(dead_code)]

use chrono::NaiveDate;
use sea_orm::Database;

use engine::{Actor, EmployeeRole, Engine, MoneyCents, NewEmployeeCmd, NewUserCmd, Role};
use migration::MigratorTrait;

pub async fn engine() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

pub async fn user(engine: &Engine, phone: &str, role: Role, name: &str) -> Actor {
    let user = engine
        .create_user(NewUserCmd::new(phone, role, "password").full_name(name))
        .await
        .unwrap();
    engine.actor(user.id).await.unwrap()
}

pub async fn superuser(engine: &Engine, phone: &str) -> Actor {
    let user = engine
        .create_user(
            NewUserCmd::new(phone, Role::Teacher, "password")
                .full_name("Root")
                .superuser(true),
        )
        .await
        .unwrap();
    engine.actor(user.id).await.unwrap()
}

/// A user with an employee profile, reloaded so `employee_id` is set.
pub async fn employee(
    engine: &Engine,
    phone: &str,
    role: EmployeeRole,
    name: &str,
    salary: i64,
) -> Actor {
    let actor = user(engine, phone, role.account_role(), name).await;
    engine
        .create_employee(NewEmployeeCmd {
            user_id: actor.user_id,
            role,
            salary: MoneyCents::new(salary),
        })
        .await
        .unwrap();
    engine.actor(actor.user_id).await.unwrap()
}

pub async fn accountant(engine: &Engine) -> Actor {
    employee(engine, "100", EmployeeRole::Accountant, "Aida Accountant", 0).await
}

pub async fn director(engine: &Engine) -> Actor {
    user(engine, "200", Role::Director, "Daniyar Director").await
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
