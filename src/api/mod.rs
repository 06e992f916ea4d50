use axum::{
    Router,
    extract::{Json, Query},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::core::{
    BreakdownLine, CalculatedResults, CalculatorInputs, DEFAULT_INPUTS, InputField,
    ReconcileStep, Reconciliation, RevenueHeadline, RevenueView, Session, compute,
};

mod cli;
mod error;

pub use cli::{Cli, CliInputField, CliRevenueView, Command, InputArgs, run_cli};
pub use error::{AppError, InputError};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiInputField {
    #[serde(alias = "desiredTakeHome", alias = "desired_take_home", alias = "take-home")]
    DesiredTakeHome,
    #[serde(alias = "profitPercent", alias = "profit_percent", alias = "profit")]
    ProfitPercent,
    #[serde(
        alias = "ownersPayPercent",
        alias = "owners_pay_percent",
        alias = "owners-pay"
    )]
    OwnersPayPercent,
    #[serde(alias = "contractorPay", alias = "contractor_pay")]
    ContractorPay,
}

impl From<ApiInputField> for InputField {
    fn from(value: ApiInputField) -> Self {
        match value {
            ApiInputField::DesiredTakeHome => InputField::DesiredTakeHome,
            ApiInputField::ProfitPercent => InputField::ProfitPercent,
            ApiInputField::OwnersPayPercent => InputField::OwnersPayPercent,
            ApiInputField::ContractorPay => InputField::ContractorPay,
        }
    }
}

// Kept flat rather than flattening `InputsPayload`: query strings only carry
// strings, which `#[serde(flatten)]` cannot coerce into numbers.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CalculatePayload {
    desired_take_home: Option<f64>,
    profit_percent: Option<f64>,
    owners_pay_percent: Option<f64>,
    contractor_pay: Option<f64>,
    view: Option<RevenueView>,
}

impl CalculatePayload {
    fn inputs(&self) -> InputsPayload {
        InputsPayload {
            desired_take_home: self.desired_take_home,
            profit_percent: self.profit_percent,
            owners_pay_percent: self.owners_pay_percent,
            contractor_pay: self.contractor_pay,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
struct InputsPayload {
    desired_take_home: Option<f64>,
    profit_percent: Option<f64>,
    owners_pay_percent: Option<f64>,
    contractor_pay: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReconcilePayload {
    #[serde(default)]
    inputs: InputsPayload,
    field: ApiInputField,
    value: f64,
    #[serde(default)]
    view: Option<RevenueView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculateResponse {
    view: RevenueView,
    inputs: CalculatorInputs,
    results: CalculatedResults,
    headline: RevenueHeadline,
    breakdown: Vec<BreakdownLine>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReconcileResponse {
    field: &'static str,
    proposed_value: f64,
    converged: bool,
    iterations: Vec<ReconcileStep>,
    #[serde(flatten)]
    calculation: CalculateResponse,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn build_router() -> Router {
    Router::new()
        .route("/api/defaults", get(defaults_handler))
        .route(
            "/api/calculate",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .route("/api/reconcile", post(reconcile_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("profit-first HTTP API listening on http://{addr}");
    info!("local access: http://127.0.0.1:{}/api/calculate", addr.port());

    axum::serve(listener, build_router()).await
}

async fn defaults_handler() -> Response {
    json_response(StatusCode::OK, DEFAULT_INPUTS)
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculate_get_handler(Query(payload): Query<CalculatePayload>) -> Response {
    calculate_handler_impl(payload)
}

async fn calculate_post_handler(Json(payload): Json<CalculatePayload>) -> Response {
    calculate_handler_impl(payload)
}

fn calculate_handler_impl(payload: CalculatePayload) -> Response {
    match calculate_from_payload(&payload) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => {
            debug!(error = %err, "rejected calculate request");
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
    }
}

async fn reconcile_handler(Json(payload): Json<ReconcilePayload>) -> Response {
    match reconcile_from_payload(&payload) {
        Ok(response) => {
            info!(
                field = response.field,
                proposed_value = response.proposed_value,
                converged = response.converged,
                iterations = response.iterations.len(),
                "reconciled edit"
            );
            json_response(StatusCode::OK, response)
        }
        Err(err) => {
            debug!(error = %err, "rejected reconcile request");
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

/// Builds an input set over the defaults and rejects one whose allocations
/// already leave operating expenses negative.
fn inputs_from_payload(payload: &InputsPayload) -> Result<CalculatorInputs, InputError> {
    let provided = [
        (InputField::DesiredTakeHome, payload.desired_take_home),
        (InputField::ProfitPercent, payload.profit_percent),
        (InputField::OwnersPayPercent, payload.owners_pay_percent),
        (InputField::ContractorPay, payload.contractor_pay),
    ];

    let mut inputs = DEFAULT_INPUTS;
    for (field, value) in provided {
        if let Some(v) = value {
            inputs = inputs.with(field, InputError::check(field, v)?);
        }
    }

    let op_expenses_percent = compute(&inputs).op_expenses_percent;
    if op_expenses_percent < 0.0 {
        return Err(InputError::AllocationsExceedTotal {
            op_expenses_percent,
        });
    }
    Ok(inputs)
}

fn calculate_from_payload(payload: &CalculatePayload) -> Result<CalculateResponse, InputError> {
    let mut session = Session::with_inputs(inputs_from_payload(&payload.inputs())?);
    session.set_view(payload.view.unwrap_or_default());
    Ok(build_calculate_response(&session))
}

fn reconcile_from_payload(payload: &ReconcilePayload) -> Result<ReconcileResponse, InputError> {
    let field = InputField::from(payload.field);
    let value = InputError::check(field, payload.value)?;

    let mut session = Session::with_inputs(inputs_from_payload(&payload.inputs)?);
    session.set_view(payload.view.unwrap_or_default());
    let reconciliation = session.apply(field, value);
    Ok(build_reconcile_response(&session, reconciliation))
}

fn build_calculate_response(session: &Session) -> CalculateResponse {
    CalculateResponse {
        view: session.view(),
        inputs: *session.inputs(),
        results: session.results().clone(),
        headline: session.headline(),
        breakdown: session.breakdown(),
    }
}

fn build_reconcile_response(
    session: &Session,
    reconciliation: Reconciliation,
) -> ReconcileResponse {
    ReconcileResponse {
        field: reconciliation.field.name(),
        proposed_value: reconciliation.proposed_value,
        converged: reconciliation.converged,
        iterations: reconciliation.steps,
        calculation: build_calculate_response(session),
    }
}
