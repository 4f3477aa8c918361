use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{account, billing, notifications, payroll, requests};
use engine::Engine;

/// Listener address and the billing defaults handlers fall back to.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Day of month new tuition invoices fall due.
    pub due_day: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
            due_day: 5,
        }
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub due_day: u32,
}

impl ServerState {
    pub fn new(engine: Engine, due_day: u32) -> Self {
        Self {
            engine: Arc::new(engine),
            due_day,
        }
    }
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(credentials)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if credentials.username().is_empty() || credentials.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let actor = state
        .engine
        .authenticate(credentials.username(), credentials.password())
        .await
        .map_err(|err| {
            tracing::error!("authentication failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/account", get(account::get))
        .route("/account/initialize", post(account::initialize))
        .route("/ledger", get(account::ledger))
        .route("/income/manual", post(account::manual_income))
        .route("/reports/monthly", get(account::monthly_report))
        .route("/invoices", get(billing::invoices).post(billing::invoice_new))
        .route("/payments", get(billing::payments).post(billing::payment_new))
        .route(
            "/fees/settings",
            get(billing::fee_setting).put(billing::fee_setting_update),
        )
        .route("/fees/run", post(billing::run))
        .route("/fees/invoices/generate", post(billing::generate_invoices))
        .route("/fees/penalties/apply", post(billing::apply_penalties))
        .route("/fees/reminders/run", post(billing::send_reminders))
        .route("/fees/dashboard", get(billing::dashboard))
        .route("/payroll", get(payroll::list))
        .route("/payroll/generate", post(payroll::generate))
        .route("/payroll/request-payment", post(payroll::request_payment))
        .route("/payroll/bonuses", post(payroll::bonus_new))
        .route("/payroll/deductions", post(payroll::deduction_new))
        .route(
            "/payroll/settings",
            get(payroll::setting).put(payroll::setting_update),
        )
        .route("/payroll/{id}", get(payroll::get))
        .route("/payroll/{id}/review", patch(payroll::review))
        .route("/payroll/{id}/pay", patch(payroll::pay))
        .route("/employees/salary", patch(payroll::salary_update))
        .route("/expenses", get(requests::expenses).post(requests::expense_new))
        .route("/expenses/{id}/review", patch(requests::expense_review))
        .route("/expenses/{id}/pay", patch(requests::expense_pay))
        .route("/credits", get(requests::credits).post(requests::credit_new))
        .route("/credits/{id}/review", patch(requests::credit_review))
        .route("/credits/{id}/give", patch(requests::credit_give))
        .route("/credits/{id}/repayments", post(requests::repayment_new))
        .route("/notifications", get(notifications::list))
        .route("/notifications/hide", post(notifications::hide))
        .route("/notifications/read", post(notifications::read))
        .route("/parents/notifications", get(notifications::parent_list))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, config: ServerConfig) {
    let addr = format!("{}:{}", config.bind, config.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, config.due_day, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    due_day: u32,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(ServerState::new(engine, due_day))).await
}

pub fn spawn_with_listener(
    engine: Engine,
    due_day: u32,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, due_day, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
