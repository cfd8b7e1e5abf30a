//! Salary advance model.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PeriodKey;

/// Approval status of an advance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceStatus {
    /// Awaiting a decision.
    Pending,
    /// Approved; will be netted out of the matching payroll run.
    Approved,
    /// Rejected; never deducted.
    Rejected,
}

impl fmt::Display for AdvanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AdvanceStatus::Pending => "pending",
            AdvanceStatus::Approved => "approved",
            AdvanceStatus::Rejected => "rejected",
        })
    }
}

/// The decision taken on a pending advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceAction {
    /// Approve the advance.
    Approve,
    /// Reject the advance.
    Reject,
}

/// A cash advance against a future month's salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryAdvance {
    /// Unique identifier.
    pub id: Uuid,
    /// The employee.
    pub user_id: Uuid,
    /// Month the advance is netted out of.
    pub month: u32,
    /// Year the advance is netted out of.
    pub year: i32,
    /// Advance amount.
    pub amount: Decimal,
    /// Why it was requested.
    pub reason: String,
    /// Approval status.
    pub approval_status: AdvanceStatus,
    /// Set once a calculation has netted this advance out.
    pub is_deducted: bool,
    /// The record that netted it out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deducted_by: Option<Uuid>,
    /// Reviewer comments.
    #[serde(default)]
    pub comments: String,
    /// When it was requested.
    pub requested_at: DateTime<Utc>,
    /// Who resolved it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,
    /// When it was resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl SalaryAdvance {
    /// Creates a pending advance for `key`.
    pub fn request(
        key: PeriodKey,
        amount: Decimal,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: key.user_id,
            month: key.month,
            year: key.year,
            amount,
            reason: reason.into(),
            approval_status: AdvanceStatus::Pending,
            is_deducted: false,
            deducted_by: None,
            comments: String::new(),
            requested_at: now,
            resolved_by: None,
            resolved_at: None,
        }
    }

    /// Returns the period this advance is netted out of.
    pub fn key(&self) -> PeriodKey {
        PeriodKey {
            user_id: self.user_id,
            year: self.year,
            month: self.month,
        }
    }

    /// Returns true if a calculation for the advance's period may deduct it.
    pub fn is_deductible(&self) -> bool {
        self.approval_status == AdvanceStatus::Approved && !self.is_deducted
    }
}
