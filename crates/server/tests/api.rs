use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use chrono::{Datelike, Days, NaiveDate, Utc};
use engine::{Engine, MoneyCents, NewStudentCmd, NewUserCmd, Role};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use serde_json::{Value, json};
use server::{ServerState, router};
use tower::ServiceExt;
use uuid::Uuid;

const PASSWORD: &str = "secret";

async fn setup() -> (Router, Arc<Engine>) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    let state = ServerState::new(engine, 5);
    let engine = state.engine.clone();
    (router(state), engine)
}

async fn user(engine: &Engine, phone: &str, role: Role, name: &str) -> Uuid {
    engine
        .create_user(NewUserCmd::new(phone, role, PASSWORD).full_name(name))
        .await
        .unwrap()
        .id
}

fn basic(phone: &str, password: &str) -> String {
    let secret = format!("{phone}:{password}");
    format!("Basic {}", base64::prelude::BASE64_STANDARD.encode(secret))
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    phone: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic(phone, PASSWORD));
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn requests_without_valid_credentials_are_rejected() {
    let (app, engine) = setup().await;
    user(&engine, "100", Role::Accountant, "Aida").await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/account").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/account")
                .header(header::AUTHORIZATION, basic("100", "wrong"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, "GET", "/account", "999", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn account_is_staff_only_and_initialized_once() {
    let (app, engine) = setup().await;
    user(&engine, "100", Role::Accountant, "Aida").await;
    user(&engine, "300", Role::Teacher, "Tomiris").await;

    let (status, body) = call(&app, "GET", "/account", "300", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());

    let (status, body) = call(
        &app,
        "POST",
        "/account/initialize",
        "100",
        Some(json!({ "initial_balance_minor": 50_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["current_balance_minor"], 50_000);
    assert_eq!(body["is_initialized"], true);

    let (status, _) = call(
        &app,
        "POST",
        "/account/initialize",
        "100",
        Some(json!({ "initial_balance_minor": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        "POST",
        "/income/manual",
        "100",
        Some(json!({ "amount_minor": 2_500, "description": "Book fair" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["account"]["current_balance_minor"], 52_500);
    assert_eq!(body["entry"]["entry_type"], "MANUAL_INCOME");

    let (status, body) = call(&app, "GET", "/ledger", "100", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let (status, _) = call(&app, "GET", "/ledger?month=2024-13", "100", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn field_errors_carry_the_field_name() {
    let (app, engine) = setup().await;
    user(&engine, "300", Role::Teacher, "Tomiris").await;

    let (status, body) = call(
        &app,
        "POST",
        "/expenses",
        "300",
        Some(json!({
            "category": "FUEL",
            "title": "   ",
            "amount_minor": 1_000,
            "reason": "Trip"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "title");

    let (status, _) = call(
        &app,
        "POST",
        "/expenses",
        "300",
        Some(json!({
            "category": "TAXI",
            "title": "Ride",
            "amount_minor": 1_000,
            "reason": "Trip"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        "POST",
        "/expenses",
        "300",
        Some(json!({
            "category": "garage",
            "title": "Tyres",
            "amount_minor": 40_000,
            "reason": "Winter"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["category"], "GARAGE");
    assert_eq!(body["status"], "PENDING");
}

#[tokio::test]
async fn billing_run_and_parent_payment() {
    let (app, engine) = setup().await;
    user(&engine, "100", Role::Accountant, "Aida").await;
    let parent_id = user(&engine, "500", Role::Parent, "Saule").await;
    engine
        .create_student(NewStudentCmd {
            parent_id,
            first_name: "Ali".to_string(),
            last_name: "Nurlanov".to_string(),
            class_name: "Sunflowers".to_string(),
            monthly_tuition_fee: MoneyCents::new(20_000),
        })
        .await
        .unwrap();

    let today = Utc::now().date_naive();
    let month = today.format("%Y-%m").to_string();
    let due_date = NaiveDate::from_ymd_opt(today.year(), today.month(), 5).unwrap();

    let (status, body) = call(&app, "POST", "/fees/run", "100", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["month"], month.as_str());
    assert_eq!(body["invoices_created"], 1);

    let (status, _) = call(
        &app,
        "POST",
        "/fees/run",
        "100",
        Some(json!({ "due_day": 40 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, "POST", "/fees/run", "500", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(&app, "GET", "/invoices", "500", None).await;
    assert_eq!(status, StatusCode::OK);
    let invoices = body.as_array().cloned().unwrap_or_default();
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0]["kind"], "TUITION");
    assert_eq!(invoices[0]["due_date"], due_date.to_string());
    let invoice_id = invoices[0]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        "POST",
        "/payments",
        "500",
        Some(json!({ "invoice_id": invoice_id, "amount_minor": 20_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["invoice"]["is_paid"], true);
    assert_eq!(body["payment"]["amount_minor"], 20_000);

    let (status, body) = call(&app, "GET", "/parents/notifications", "500", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["notification_type"], "THANK_YOU");

    let uri = format!("/fees/dashboard?month={month}");
    let (status, body) = call(&app, "GET", &uri, "100", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["paid_count"], 1);
    assert_eq!(body["unpaid_count"], 0);
}

#[tokio::test]
async fn penalties_follow_the_server_clock() {
    let (app, engine) = setup().await;
    user(&engine, "100", Role::Accountant, "Aida").await;
    user(&engine, "200", Role::Director, "Daniyar").await;
    let parent_id = user(&engine, "500", Role::Parent, "Saule").await;

    let (status, _) = call(
        &app,
        "PUT",
        "/fees/settings",
        "200",
        Some(json!({ "penalty_per_day_minor": 500 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let today = Utc::now().date_naive();
    let due_date = today.checked_add_days(Days::new(10)).unwrap();
    let (status, _) = call(
        &app,
        "POST",
        "/invoices",
        "100",
        Some(json!({
            "parent_id": parent_id,
            "month": today.format("%Y-%m").to_string(),
            "amount_minor": 5_000,
            "due_date": due_date,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // A client-chosen date has no say in the penalty.
    let (status, body) = call(
        &app,
        "POST",
        "/fees/penalties/apply",
        "100",
        Some(json!({ "today": "2099-01-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["penalties_updated"], 0);

    let (status, body) = call(&app, "GET", "/invoices", "500", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["penalty_amount_minor"], 0);
    assert_eq!(body[0]["total_amount_due_minor"], 5_000);
}

#[tokio::test]
async fn malformed_requests_get_structured_errors() {
    let (app, engine) = setup().await;
    user(&engine, "100", Role::Accountant, "Aida").await;
    user(&engine, "300", Role::Teacher, "Tomiris").await;

    let (status, body) = call(
        &app,
        "POST",
        "/expenses",
        "300",
        Some(json!({ "category": "FUEL", "title": "Diesel", "reason": "Trip" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("amount_minor"));

    let (status, body) = call(&app, "GET", "/payroll/not-a-uuid", "100", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn notification_updates_need_a_selection() {
    let (app, engine) = setup().await;
    user(&engine, "100", Role::Accountant, "Aida").await;
    user(&engine, "300", Role::Teacher, "Tomiris").await;

    let (status, _) = call(
        &app,
        "POST",
        "/expenses",
        "300",
        Some(json!({
            "category": "OTHER",
            "title": "Paint",
            "amount_minor": 3_000,
            "reason": "Art class"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(&app, "GET", "/notifications", "100", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["title"], "New Expense Request");
    assert_eq!(body[0]["is_read"], false);

    let (status, _) = call(&app, "POST", "/notifications/read", "100", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        "POST",
        "/notifications/read",
        "100",
        Some(json!({ "all": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 1);

    let (status, body) = call(
        &app,
        "POST",
        "/notifications/hide",
        "100",
        Some(json!({ "all": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 1);

    let (_, body) = call(&app, "GET", "/notifications", "100", None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn unknown_payroll_is_not_found() {
    let (app, engine) = setup().await;
    user(&engine, "100", Role::Accountant, "Aida").await;

    let uri = format!("/payroll/{}", Uuid::new_v4());
    let (status, _) = call(&app, "GET", &uri, "100", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
