use std::{error::Error, io::Write};

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{
    AttendanceStatus, EmployeeRole, Engine, MoneyCents, NewEmployeeCmd, NewStudentCmd,
    NewUserCmd, Role,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "kgschool_admin")]
#[command(about = "Admin utilities for the school finance backend (bootstrap people, run billing)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./kgschool.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Login accounts.
    User(User),
    /// Employee profiles of existing users.
    Employee(Employee),
    Student(Student),
    Attendance(Attendance),
    /// The periodic billing job.
    Billing(Billing),
    Account(Account),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    phone: String,
    #[arg(long, default_value = "")]
    name: String,
    /// DIRECTOR, ACCOUNTANT, DRIVER, TEACHER or PARENT.
    #[arg(long, value_parser = parse_role)]
    role: Role,
    #[arg(long)]
    superuser: bool,
}

#[derive(Args, Debug)]
struct Employee {
    #[command(subcommand)]
    command: EmployeeCommand,
}

#[derive(Subcommand, Debug)]
enum EmployeeCommand {
    Create(EmployeeCreateArgs),
}

#[derive(Args, Debug)]
struct EmployeeCreateArgs {
    /// Phone number of the user the profile belongs to.
    #[arg(long)]
    phone: String,
    /// TEACHER, ACCOUNTANT, DRIVER or ADMIN.
    #[arg(long, value_parser = parse_employee_role)]
    role: EmployeeRole,
    /// Monthly base salary, e.g. `300000.00`.
    #[arg(long, value_parser = parse_money, default_value = "0")]
    salary: MoneyCents,
}

#[derive(Args, Debug)]
struct Student {
    #[command(subcommand)]
    command: StudentCommand,
}

#[derive(Subcommand, Debug)]
enum StudentCommand {
    Create(StudentCreateArgs),
    /// Stop billing a student.
    Deactivate {
        #[arg(long)]
        id: Uuid,
    },
}

#[derive(Args, Debug)]
struct StudentCreateArgs {
    #[arg(long)]
    parent_phone: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long, default_value = "")]
    class_name: String,
    #[arg(long, value_parser = parse_money)]
    fee: MoneyCents,
}

#[derive(Args, Debug)]
struct Attendance {
    #[command(subcommand)]
    command: AttendanceCommand,
}

#[derive(Subcommand, Debug)]
enum AttendanceCommand {
    Record(AttendanceRecordArgs),
}

#[derive(Args, Debug)]
struct AttendanceRecordArgs {
    #[arg(long)]
    phone: String,
    /// `YYYY-MM-DD`; defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long, value_parser = parse_attendance, default_value = "PRESENT")]
    status: AttendanceStatus,
}

#[derive(Args, Debug)]
struct Billing {
    #[command(subcommand)]
    command: BillingCommand,
}

#[derive(Subcommand, Debug)]
enum BillingCommand {
    /// Generate this month's invoices, apply penalties and send reminders.
    Run {
        #[arg(long)]
        today: Option<NaiveDate>,
        #[arg(long, env = "KGSCHOOL__BILLING__DUE_DAY", default_value_t = 5)]
        due_day: u32,
    },
}

#[derive(Args, Debug)]
struct Account {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    /// Balance and ledger audit, as seen by a staff user.
    Show {
        #[arg(long = "as")]
        phone: String,
    },
}

fn parse_role(raw: &str) -> Result<Role, String> {
    Role::try_from(raw.trim().to_uppercase().as_str()).map_err(|err| err.to_string())
}

fn parse_employee_role(raw: &str) -> Result<EmployeeRole, String> {
    EmployeeRole::try_from(raw.trim().to_uppercase().as_str()).map_err(|err| err.to_string())
}

fn parse_attendance(raw: &str) -> Result<AttendanceStatus, String> {
    AttendanceStatus::try_from(raw.trim().to_uppercase().as_str()).map_err(|err| err.to_string())
}

fn parse_money(raw: &str) -> Result<MoneyCents, String> {
    raw.parse::<MoneyCents>().map_err(|err| err.to_string())
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> CliResult<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> CliResult<String> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_new_password() -> CliResult<String> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let first = prompt_password("Password: ")?;
        if first.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        if prompt_password("Confirm password: ")? == first {
            return Ok(first);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(database_url: &str) -> CliResult<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

async fn employee_id_of(engine: &Engine, phone: &str) -> CliResult<Uuid> {
    let user = engine.user_by_phone(phone).await?;
    let actor = engine.actor(user.id).await?;
    actor
        .employee_id
        .ok_or_else(|| format!("user {phone} has no employee profile").into())
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_new_password()?;
            let user = engine
                .create_user(
                    NewUserCmd::new(&args.phone, args.role, password)
                        .full_name(&args.name)
                        .superuser(args.superuser),
                )
                .await?;
            println!("created user: {} ({}, {})", user.phone_number, user.role, user.id);
        }
        Command::Employee(Employee {
            command: EmployeeCommand::Create(args),
        }) => {
            let user = engine.user_by_phone(&args.phone).await?;
            if user.role != args.role.account_role() {
                eprintln!(
                    "warning: user role {} does not match employee role {}",
                    user.role, args.role
                );
            }
            let employee = engine
                .create_employee(NewEmployeeCmd {
                    user_id: user.id,
                    role: args.role,
                    salary: args.salary,
                })
                .await?;
            println!("created employee: {} ({})", user.display_name(), employee.id);
        }
        Command::Student(Student {
            command: StudentCommand::Create(args),
        }) => {
            let parent = engine.user_by_phone(&args.parent_phone).await?;
            let student = engine
                .create_student(NewStudentCmd {
                    parent_id: parent.id,
                    first_name: args.first_name,
                    last_name: args.last_name,
                    class_name: args.class_name,
                    monthly_tuition_fee: args.fee,
                })
                .await?;
            println!("created student: {} ({})", student.full_name(), student.id);
        }
        Command::Student(Student {
            command: StudentCommand::Deactivate { id },
        }) => {
            engine.set_student_active(id, false).await?;
            println!("deactivated student: {id}");
        }
        Command::Attendance(Attendance {
            command: AttendanceCommand::Record(args),
        }) => {
            let employee_id = employee_id_of(&engine, &args.phone).await?;
            let date = args.date.unwrap_or_else(today);
            engine
                .record_attendance(employee_id, date, args.status)
                .await?;
            println!("recorded {} for {} on {date}", args.status, args.phone);
        }
        Command::Billing(Billing {
            command: BillingCommand::Run { today: day, due_day },
        }) => {
            let summary = engine
                .run_scheduled_billing(day.unwrap_or_else(today), due_day)
                .await?;
            let month = summary
                .month
                .map(|month| month.to_string())
                .unwrap_or_default();
            println!(
                "billing {month}: {} invoices created, {} penalties updated, {} invoices paid, {} reminders sent",
                summary.invoices_created,
                summary.penalties_updated,
                summary.invoices_paid,
                summary.reminders_created
            );
        }
        Command::Account(Account {
            command: AccountCommand::Show { phone },
        }) => {
            let user = engine.user_by_phone(&phone).await?;
            let actor = engine.actor(user.id).await?;
            let account = engine.account(&actor).await?;
            let audit = engine.audit_balance(&actor).await?;
            println!(
                "balance: {} (initialized: {})",
                account.current_balance, account.is_initialized
            );
            if audit.is_consistent() {
                println!("ledger: consistent");
            } else {
                eprintln!("ledger: MISMATCH, entries sum to {}", audit.ledger_total);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
