//! HTTP API for the payroll engine.
//!
//! Every route lives under `/api` and requires a bearer token from
//! `engine.yaml`. Errors are returned as `{code, message, details?}`.

mod auth;
mod handlers;
mod request;
mod response;
mod state;

pub use auth::RequestContext;
pub use handlers::create_router;
pub use request::{
    AdjustRequest, AdvanceQuery, AdvanceRequest, CalculateRequest, EmployeeRequest, PeriodQuery,
    RejectRequest, ResolveAdvanceRequest, SeniorityRequest, StatusRequest,
};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
