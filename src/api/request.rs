//! Request types for the payroll API.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::SeniorityOptions;
use crate::models::{AdjustmentDelta, AdvanceAction, AdvanceStatus, Employee, SalaryStatus};

/// Body of `POST /api/salary/calculate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    /// The employee.
    pub user_id: Uuid,
    /// Calendar month, 1 through 12.
    pub month: u32,
    /// Calendar year.
    pub year: i32,
}

/// Body of `PUT /api/salary/:id/reject`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectRequest {
    /// Why the record was rejected.
    pub reason: String,
}

/// Body of `PUT /api/salary/:id/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRequest {
    /// The target status.
    pub status: SalaryStatus,
    /// Required when rejecting.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Body of `PUT /api/salary/:id/adjust`.
///
/// Omitted components default to zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustRequest {
    /// The corrections.
    #[serde(flatten)]
    pub delta: AdjustmentDelta,
    /// Why the correction was made.
    #[serde(default)]
    pub notes: String,
}

/// Body of `POST /api/salary-advances`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceRequest {
    /// The employee.
    pub user_id: Uuid,
    /// Month the advance is netted out of.
    pub month: u32,
    /// Year the advance is netted out of.
    pub year: i32,
    /// Requested amount.
    pub amount: Decimal,
    /// Why the advance is needed.
    pub reason: String,
}

/// Body of `PUT /api/salary-advances/:id/approve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveAdvanceRequest {
    /// Approve or reject.
    pub action: AdvanceAction,
    /// Reviewer comments.
    #[serde(default)]
    pub comments: String,
}

/// Body of `POST /api/employees`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRequest {
    /// Identifier; generated when omitted.
    #[serde(default)]
    pub id: Option<Uuid>,
    /// Display name.
    pub name: String,
    /// First day of employment.
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
    /// Current grade.
    #[serde(default)]
    pub grade_id: Option<Uuid>,
}

impl From<EmployeeRequest> for Employee {
    fn from(req: EmployeeRequest) -> Self {
        Employee {
            id: req.id.unwrap_or_else(Uuid::new_v4),
            name: req.name,
            hire_date: req.hire_date,
            grade_id: req.grade_id,
            is_active: true,
        }
    }
}

/// Body of `POST /api/seniority-salary/apply-all`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeniorityRequest {
    /// Dry run and notification switches.
    #[serde(flatten)]
    pub options: SeniorityOptions,
    /// Date tenure is measured up to; today when omitted.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

/// Query of `GET /api/salary` and `GET /api/salary/pending`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeriodQuery {
    /// Restrict to one month.
    #[serde(default)]
    pub month: Option<u32>,
    /// Restrict to one year.
    #[serde(default)]
    pub year: Option<i32>,
}

/// Query of `GET /api/salary-advances`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvanceQuery {
    /// Restrict to one approval status.
    #[serde(default)]
    pub status: Option<AdvanceStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_calculate_request_uses_camel_case() {
        let json = r#"{"userId": "11111111-1111-4111-8111-111111111111", "month": 5, "year": 2026}"#;
        let request: CalculateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.month, 5);
        assert_eq!(request.year, 2026);
    }

    #[test]
    fn test_adjust_request_defaults_missing_components() {
        let json = r#"{"bonusAdjustment": "100", "notes": "overtime"}"#;
        let request: AdjustRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.delta.bonus_adjustment, Decimal::from_str("100").unwrap());
        assert!(request.delta.base_adjustment.is_zero());
        assert!(request.delta.deduction_adjustment.is_zero());
        assert_eq!(request.notes, "overtime");
    }

    #[test]
    fn test_advance_amount_accepts_number_or_string() {
        let from_number: AdvanceRequest = serde_json::from_str(
            r#"{"userId": "11111111-1111-4111-8111-111111111111", "month": 1, "year": 2026, "amount": 1500000, "reason": "rent"}"#,
        )
        .unwrap();
        let from_string: AdvanceRequest = serde_json::from_str(
            r#"{"userId": "11111111-1111-4111-8111-111111111111", "month": 1, "year": 2026, "amount": "1500000", "reason": "rent"}"#,
        )
        .unwrap();
        assert_eq!(from_number.amount, from_string.amount);
    }

    #[test]
    fn test_status_request_parses_snake_case_status() {
        let request: StatusRequest =
            serde_json::from_str(r#"{"status": "rejected", "reason": "wrong grade"}"#).unwrap();
        assert_eq!(request.status, SalaryStatus::Rejected);
        assert_eq!(request.reason.as_deref(), Some("wrong grade"));
    }

    #[test]
    fn test_seniority_request_defaults() {
        let request: SeniorityRequest = serde_json::from_str("{}").unwrap();
        assert!(!request.options.dry_run);
        assert!(request.as_of.is_none());

        let request: SeniorityRequest =
            serde_json::from_str(r#"{"dryRun": true, "asOf": "2026-07-01"}"#).unwrap();
        assert!(request.options.dry_run);
        assert_eq!(request.as_of, NaiveDate::from_ymd_opt(2026, 7, 1));
    }

    #[test]
    fn test_employee_request_generates_id() {
        let request: EmployeeRequest = serde_json::from_str(r#"{"name": "New hire"}"#).unwrap();
        let employee: Employee = request.into();
        assert!(employee.is_active);
        assert!(!employee.id.is_nil());
    }
}
