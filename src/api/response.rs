//! Response types for the payroll API.
//!
//! This module defines the error body, its mapping from [`EngineError`], and
//! the JSON envelopes successful responses are wrapped in.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{
    Adjustment, AttendanceFacts, Employee, SalaryAdvance, SalaryGrade, SalaryRecord, SalaryRule,
};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 `VALIDATION_ERROR`.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }

    /// A 401 `UNAUTHORIZED`.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: ApiError::new("UNAUTHORIZED", message),
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        let (status, error) = match error {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfig { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            EngineError::Validation { field, .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "VALIDATION_ERROR",
                    message,
                    format!("Check the '{}' field of the request", field),
                ),
            ),
            EngineError::NotFound { .. } => {
                (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
            }
            EngineError::InvalidTransition { .. } => (
                StatusCode::CONFLICT,
                ApiError::new("INVALID_TRANSITION", message),
            ),
            EngineError::AlreadyFinalized { .. } => (
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "ALREADY_FINALIZED",
                    message,
                    "Approved and paid records keep their figures; use an adjustment instead",
                ),
            ),
            EngineError::RecordLocked { .. } => {
                (StatusCode::CONFLICT, ApiError::new("RECORD_LOCKED", message))
            }
            EngineError::Forbidden { .. } => {
                (StatusCode::FORBIDDEN, ApiError::new("FORBIDDEN", message))
            }
            EngineError::PartialBatchFailure { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("PARTIAL_BATCH_FAILURE", message),
            ),
        };
        ApiErrorResponse { status, error }
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        let error = match rejection {
            JsonRejection::JsonDataError(err) => {
                let body_text = err.body_text();
                if body_text.contains("missing field") {
                    ApiError::validation_error(body_text)
                } else {
                    ApiError::malformed_json(body_text)
                }
            }
            JsonRejection::JsonSyntaxError(err) => {
                ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
            }
            JsonRejection::MissingJsonContentType(_) => ApiError::new(
                "MISSING_CONTENT_TYPE",
                "Content-Type must be application/json",
            ),
            _ => ApiError::malformed_json("Failed to parse request body"),
        };
        ApiErrorResponse::bad_request(error)
    }
}

impl From<PathRejection> for ApiErrorResponse {
    fn from(rejection: PathRejection) -> Self {
        ApiErrorResponse::bad_request(ApiError::validation_error(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiErrorResponse {
    fn from(rejection: QueryRejection) -> Self {
        ApiErrorResponse::bad_request(ApiError::validation_error(rejection.body_text()))
    }
}

/// `{salary}`
#[derive(Debug, Serialize)]
pub struct SalaryBody {
    /// The record.
    pub salary: SalaryRecord,
}

/// `{salaries}`
#[derive(Debug, Serialize)]
pub struct SalariesBody {
    /// The records.
    pub salaries: Vec<SalaryRecord>,
}

/// `{adjustments}`
#[derive(Debug, Serialize)]
pub struct AdjustmentsBody {
    /// Adjustments in application order.
    pub adjustments: Vec<Adjustment>,
}

/// `{rule}`
#[derive(Debug, Serialize)]
pub struct RuleBody {
    /// The rule.
    pub rule: SalaryRule,
}

/// `{rules}`
#[derive(Debug, Serialize)]
pub struct RulesBody {
    /// The rules.
    pub rules: Vec<SalaryRule>,
}

/// `{grade}`
#[derive(Debug, Serialize)]
pub struct GradeBody {
    /// The grade.
    pub grade: SalaryGrade,
}

/// `{grades}`
#[derive(Debug, Serialize)]
pub struct GradesBody {
    /// The grades.
    pub grades: Vec<SalaryGrade>,
}

/// `{advance}`
#[derive(Debug, Serialize)]
pub struct AdvanceBody {
    /// The advance.
    pub advance: SalaryAdvance,
}

/// `{advances}`
#[derive(Debug, Serialize)]
pub struct AdvancesBody {
    /// The advances.
    pub advances: Vec<SalaryAdvance>,
}

/// `{employee}`
#[derive(Debug, Serialize)]
pub struct EmployeeBody {
    /// The employee.
    pub employee: Employee,
}

/// `{employees}`
#[derive(Debug, Serialize)]
pub struct EmployeesBody {
    /// The employees.
    pub employees: Vec<Employee>,
}

/// `{facts}`
#[derive(Debug, Serialize)]
pub struct FactsBody {
    /// The stored attendance summary.
    pub facts: AttendanceFacts,
}
