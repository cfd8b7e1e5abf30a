//! HTTP request handlers for the payroll API.
//!
//! Handlers translate JSON into engine calls and engine errors into
//! [`ApiErrorResponse`]s. The authenticated [`RequestContext`] is inserted by
//! the auth middleware in front of every `/api` route.

use axum::{
    Extension, Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::SeniorityReport;
use crate::error::EngineResult;
use crate::models::{
    AttendanceFacts, Employee, GradeDefinition, RuleDefinition, SalaryRecord,
};

use super::auth::{RequestContext, authenticate};
use super::request::{
    AdjustRequest, AdvanceQuery, AdvanceRequest, CalculateRequest, EmployeeRequest, PeriodQuery,
    RejectRequest, ResolveAdvanceRequest, SeniorityRequest, StatusRequest,
};
use super::response::{
    AdjustmentsBody, AdvanceBody, AdvancesBody, ApiErrorResponse, EmployeeBody, EmployeesBody,
    FactsBody, GradeBody, GradesBody, RuleBody, RulesBody, SalariesBody, SalaryBody,
};
use super::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiErrorResponse>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/salary", get(list_salaries))
        .route("/api/salary/pending", get(list_pending_salaries))
        .route("/api/salary/calculate", post(calculate_salary))
        .route("/api/salary/rules", get(list_rules).post(create_rule))
        .route(
            "/api/salary/rules/:id",
            get(get_rule).put(update_rule).delete(delete_rule),
        )
        .route(
            "/api/salary/history/:user_id/:year/:month",
            get(salary_history),
        )
        .route("/api/salary/:id", get(get_salary))
        .route("/api/salary/:id/approve", put(approve_salary))
        .route("/api/salary/:id/reject", put(reject_salary))
        .route("/api/salary/:id/status", put(set_salary_status))
        .route("/api/salary/:id/adjust", put(adjust_salary))
        .route("/api/salary/:id/adjustments", get(list_adjustments))
        .route(
            "/api/salary-advances",
            get(list_advances).post(request_advance),
        )
        .route("/api/salary-advances/:id", get(get_advance))
        .route("/api/salary-advances/:id/approve", put(resolve_advance))
        .route("/api/salary-grades", get(list_grades).post(create_grade))
        .route(
            "/api/salary-grades/:id",
            get(get_grade).put(update_grade).delete(delete_grade),
        )
        .route(
            "/api/employees",
            get(list_employees).post(register_employee),
        )
        .route("/api/employees/:id", get(get_employee))
        .route(
            "/api/attendance-summaries/:user_id/:year/:month",
            get(get_attendance).put(record_attendance),
        )
        .route("/api/seniority-salary/apply-all", post(apply_seniority))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .route("/health", get(health_check))
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Unwraps a JSON body, logging why it was refused.
fn parse_body<T: DeserializeOwned>(
    ctx: &RequestContext,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiErrorResponse> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        warn!(
            correlation_id = %ctx.correlation_id,
            error = %rejection.body_text(),
            "Request body rejected"
        );
        rejection.into()
    })
}

fn parse_path<T>(
    ctx: &RequestContext,
    path: Result<Path<T>, PathRejection>,
) -> Result<T, ApiErrorResponse> {
    path.map(|Path(value)| value).map_err(|rejection| {
        warn!(
            correlation_id = %ctx.correlation_id,
            error = %rejection.body_text(),
            "Path parameters rejected"
        );
        rejection.into()
    })
}

fn parse_query<T>(
    ctx: &RequestContext,
    query: Result<Query<T>, QueryRejection>,
) -> Result<T, ApiErrorResponse> {
    query.map(|Query(value)| value).map_err(|rejection| {
        warn!(
            correlation_id = %ctx.correlation_id,
            error = %rejection.body_text(),
            "Query string rejected"
        );
        rejection.into()
    })
}

/// Converts an engine result, logging refusals with the correlation id.
fn respond<T, B>(
    ctx: &RequestContext,
    operation: &'static str,
    result: EngineResult<T>,
    wrap: impl FnOnce(T) -> B,
) -> ApiResult<B> {
    match result {
        Ok(value) => Ok(Json(wrap(value))),
        Err(err) => {
            warn!(
                correlation_id = %ctx.correlation_id,
                actor = %ctx.actor.id,
                operation,
                error = %err,
                "Request failed"
            );
            Err(err.into())
        }
    }
}

fn salary(record: SalaryRecord) -> SalaryBody {
    SalaryBody { salary: record }
}

// -- Salary records ----------------------------------------------------------

/// Handler for POST /api/salary/calculate.
async fn calculate_salary(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> ApiResult<SalaryBody> {
    let request = parse_body(&ctx, payload)?;
    info!(
        correlation_id = %ctx.correlation_id,
        user_id = %request.user_id,
        month = request.month,
        year = request.year,
        "Processing salary calculation"
    );
    let result = state
        .engine()
        .calculate(request.user_id, request.month, request.year, &ctx.actor);
    respond(&ctx, "calculate", result, salary)
}

/// Handler for GET /api/salary.
async fn list_salaries(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> ApiResult<SalariesBody> {
    let query = parse_query(&ctx, query)?;
    let salaries = state.engine().salaries(query.month, query.year);
    Ok(Json(SalariesBody { salaries }))
}

/// Handler for GET /api/salary/pending.
async fn list_pending_salaries(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> ApiResult<SalariesBody> {
    let query = parse_query(&ctx, query)?;
    let salaries = state.engine().pending_salaries(query.month, query.year);
    Ok(Json(SalariesBody { salaries }))
}

/// Handler for GET /api/salary/history/:user_id/:year/:month.
async fn salary_history(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<(Uuid, i32, u32)>, PathRejection>,
) -> ApiResult<SalariesBody> {
    let (user_id, year, month) = parse_path(&ctx, path)?;
    let result = state.engine().salary_history(user_id, month, year);
    respond(&ctx, "salary history", result, |salaries| SalariesBody {
        salaries,
    })
}

/// Handler for GET /api/salary/:id.
async fn get_salary(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<SalaryBody> {
    let id = parse_path(&ctx, path)?;
    respond(&ctx, "get salary", state.engine().salary(id), salary)
}

/// Handler for PUT /api/salary/:id/approve.
async fn approve_salary(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<SalaryBody> {
    let id = parse_path(&ctx, path)?;
    respond(&ctx, "approve", state.engine().approve(id, &ctx.actor), salary)
}

/// Handler for PUT /api/salary/:id/reject.
async fn reject_salary(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<RejectRequest>, JsonRejection>,
) -> ApiResult<SalaryBody> {
    let id = parse_path(&ctx, path)?;
    let request = parse_body(&ctx, payload)?;
    let result = state.engine().reject(id, &request.reason, &ctx.actor);
    respond(&ctx, "reject", result, salary)
}

/// Handler for PUT /api/salary/:id/status.
async fn set_salary_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> ApiResult<SalaryBody> {
    let id = parse_path(&ctx, path)?;
    let request = parse_body(&ctx, payload)?;
    let result =
        state
            .engine()
            .set_status(id, request.status, request.reason.as_deref(), &ctx.actor);
    respond(&ctx, "set status", result, salary)
}

/// Handler for PUT /api/salary/:id/adjust.
///
/// Returns the bare record rather than a `{salary}` envelope.
async fn adjust_salary(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<AdjustRequest>, JsonRejection>,
) -> ApiResult<SalaryRecord> {
    let id = parse_path(&ctx, path)?;
    let request = parse_body(&ctx, payload)?;
    let result = state
        .engine()
        .adjust(id, request.delta, &request.notes, &ctx.actor);
    respond(&ctx, "adjust", result, |record| record)
}

/// Handler for GET /api/salary/:id/adjustments.
async fn list_adjustments(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<AdjustmentsBody> {
    let id = parse_path(&ctx, path)?;
    let result = state.engine().adjustment_history(id);
    respond(&ctx, "adjustment history", result, |adjustments| {
        AdjustmentsBody { adjustments }
    })
}

// -- Rules -------------------------------------------------------------------

async fn list_rules(State(state): State<AppState>) -> Json<RulesBody> {
    Json(RulesBody {
        rules: state.engine().rules(),
    })
}

async fn get_rule(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<RuleBody> {
    let id = parse_path(&ctx, path)?;
    respond(&ctx, "get rule", state.engine().rule(id), |rule| RuleBody {
        rule,
    })
}

async fn create_rule(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<RuleDefinition>, JsonRejection>,
) -> ApiResult<RuleBody> {
    let definition = parse_body(&ctx, payload)?;
    let result = state.engine().create_rule(definition, &ctx.actor);
    respond(&ctx, "create rule", result, |rule| RuleBody { rule })
}

async fn update_rule(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<RuleDefinition>, JsonRejection>,
) -> ApiResult<RuleBody> {
    let id = parse_path(&ctx, path)?;
    let definition = parse_body(&ctx, payload)?;
    let result = state.engine().update_rule(id, definition, &ctx.actor);
    respond(&ctx, "update rule", result, |rule| RuleBody { rule })
}

async fn delete_rule(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<RuleBody> {
    let id = parse_path(&ctx, path)?;
    let result = state.engine().delete_rule(id, &ctx.actor);
    respond(&ctx, "delete rule", result, |rule| RuleBody { rule })
}

// -- Advances ----------------------------------------------------------------

async fn list_advances(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    query: Result<Query<AdvanceQuery>, QueryRejection>,
) -> ApiResult<AdvancesBody> {
    let query = parse_query(&ctx, query)?;
    Ok(Json(AdvancesBody {
        advances: state.engine().advances(query.status),
    }))
}

async fn get_advance(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<AdvanceBody> {
    let id = parse_path(&ctx, path)?;
    respond(&ctx, "get advance", state.engine().advance(id), |advance| {
        AdvanceBody { advance }
    })
}

async fn request_advance(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<AdvanceRequest>, JsonRejection>,
) -> ApiResult<AdvanceBody> {
    let request = parse_body(&ctx, payload)?;
    let result = state.engine().request_advance(
        request.user_id,
        request.month,
        request.year,
        request.amount,
        &request.reason,
        &ctx.actor,
    );
    respond(&ctx, "request advance", result, |advance| AdvanceBody {
        advance,
    })
}

async fn resolve_advance(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ResolveAdvanceRequest>, JsonRejection>,
) -> ApiResult<AdvanceBody> {
    let id = parse_path(&ctx, path)?;
    let request = parse_body(&ctx, payload)?;
    let result =
        state
            .engine()
            .resolve_advance(id, request.action, &request.comments, &ctx.actor);
    respond(&ctx, "resolve advance", result, |advance| AdvanceBody {
        advance,
    })
}

// -- Grades ------------------------------------------------------------------

async fn list_grades(State(state): State<AppState>) -> Json<GradesBody> {
    Json(GradesBody {
        grades: state.engine().grades(),
    })
}

async fn get_grade(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<GradeBody> {
    let id = parse_path(&ctx, path)?;
    respond(&ctx, "get grade", state.engine().grade(id), |grade| {
        GradeBody { grade }
    })
}

async fn create_grade(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<GradeDefinition>, JsonRejection>,
) -> ApiResult<GradeBody> {
    let definition = parse_body(&ctx, payload)?;
    let result = state.engine().create_grade(definition, &ctx.actor);
    respond(&ctx, "create grade", result, |grade| GradeBody { grade })
}

async fn update_grade(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<GradeDefinition>, JsonRejection>,
) -> ApiResult<GradeBody> {
    let id = parse_path(&ctx, path)?;
    let definition = parse_body(&ctx, payload)?;
    let result = state.engine().update_grade(id, definition, &ctx.actor);
    respond(&ctx, "update grade", result, |grade| GradeBody { grade })
}

async fn delete_grade(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<GradeBody> {
    let id = parse_path(&ctx, path)?;
    let result = state.engine().delete_grade(id, &ctx.actor);
    respond(&ctx, "delete grade", result, |grade| GradeBody { grade })
}

// -- Employees and attendance ------------------------------------------------

async fn list_employees(State(state): State<AppState>) -> Json<EmployeesBody> {
    Json(EmployeesBody {
        employees: state.engine().employees(),
    })
}

async fn get_employee(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<EmployeeBody> {
    let id = parse_path(&ctx, path)?;
    respond(&ctx, "get employee", state.engine().employee(id), |employee| {
        EmployeeBody { employee }
    })
}

async fn register_employee(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<EmployeeRequest>, JsonRejection>,
) -> ApiResult<EmployeeBody> {
    let employee: Employee = parse_body(&ctx, payload)?.into();
    let result = state.engine().register_employee(employee, &ctx.actor);
    respond(&ctx, "register employee", result, |employee| EmployeeBody {
        employee,
    })
}

async fn get_attendance(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<(Uuid, i32, u32)>, PathRejection>,
) -> ApiResult<FactsBody> {
    let (user_id, year, month) = parse_path(&ctx, path)?;
    let result = state.engine().attendance(user_id, month, year);
    respond(&ctx, "get attendance", result, |facts| FactsBody { facts })
}

async fn record_attendance(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<(Uuid, i32, u32)>, PathRejection>,
    payload: Result<Json<AttendanceFacts>, JsonRejection>,
) -> ApiResult<FactsBody> {
    let (user_id, year, month) = parse_path(&ctx, path)?;
    let facts = parse_body(&ctx, payload)?;
    let result = state
        .engine()
        .record_attendance(user_id, month, year, facts, &ctx.actor);
    respond(&ctx, "record attendance", result, |facts| FactsBody { facts })
}

// -- Seniority ---------------------------------------------------------------

/// Handler for POST /api/seniority-salary/apply-all.
///
/// Per-employee failures are reported in `details` with a 200 status.
async fn apply_seniority(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<SeniorityRequest>, JsonRejection>,
) -> ApiResult<SeniorityReport> {
    let request = parse_body(&ctx, payload)?;
    let as_of = request.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let result = state
        .engine()
        .apply_seniority(request.options, as_of, &ctx.actor);

    if let Ok(report) = &result {
        if let Some(failure) = report.failure() {
            warn!(
                correlation_id = %ctx.correlation_id,
                error = %failure,
                "Seniority batch finished with errors"
            );
        }
    }
    respond(&ctx, "apply seniority", result, |report| report)
}
