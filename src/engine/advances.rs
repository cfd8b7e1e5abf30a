//! Salary advances.
//!
//! ```text
//! Pending ──approve──► Approved ──calculation──► Approved + deducted
//!    │
//!    └──reject──► Rejected
//! ```

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Actor, AdvanceAction, AdvanceDeduction, AdvanceStatus, Capability, PeriodKey, SalaryAdvance,
    check_amount,
};

use super::PayrollEngine;

/// Every advance request and its deduction state.
#[derive(Debug, Default)]
pub struct AdvanceLedger {
    advances: DashMap<Uuid, SalaryAdvance>,
}

impl AdvanceLedger {
    /// Stores a new advance.
    pub fn insert(&self, advance: SalaryAdvance) {
        self.advances.insert(advance.id, advance);
    }

    /// Returns one advance.
    pub fn get(&self, id: Uuid) -> EngineResult<SalaryAdvance> {
        self.advances
            .get(&id)
            .map(|a| a.value().clone())
            .ok_or_else(|| EngineError::not_found("salary advance", id))
    }

    /// Lists advances, optionally by status, oldest request first.
    pub fn list(&self, status: Option<AdvanceStatus>) -> Vec<SalaryAdvance> {
        let mut advances: Vec<SalaryAdvance> = self
            .advances
            .iter()
            .filter(|a| status.is_none_or(|s| a.approval_status == s))
            .map(|a| a.value().clone())
            .collect();
        advances.sort_by(|a, b| a.requested_at.cmp(&b.requested_at).then(a.id.cmp(&b.id)));
        advances
    }

    /// Approves or rejects a pending advance.
    pub fn resolve(
        &self,
        id: Uuid,
        action: AdvanceAction,
        comments: &str,
        resolved_by: &str,
        now: DateTime<Utc>,
    ) -> EngineResult<SalaryAdvance> {
        let mut advance = self
            .advances
            .get_mut(&id)
            .ok_or_else(|| EngineError::not_found("salary advance", id))?;

        if advance.approval_status != AdvanceStatus::Pending {
            return Err(EngineError::InvalidTransition {
                entity: "salary advance".to_string(),
                action: match action {
                    AdvanceAction::Approve => "approve",
                    AdvanceAction::Reject => "reject",
                }
                .to_string(),
                from: advance.approval_status.to_string(),
            });
        }

        advance.approval_status = match action {
            AdvanceAction::Approve => AdvanceStatus::Approved,
            AdvanceAction::Reject => AdvanceStatus::Rejected,
        };
        advance.comments = comments.trim().to_string();
        advance.resolved_by = Some(resolved_by.to_string());
        advance.resolved_at = Some(now);
        Ok(advance.value().clone())
    }

    /// Returns the approved, not yet deducted advances for `key`, oldest
    /// request first.
    pub fn deductible_for(&self, key: &PeriodKey) -> Vec<AdvanceDeduction> {
        let mut advances: Vec<SalaryAdvance> = self
            .advances
            .iter()
            .filter(|a| a.value().key() == *key && a.value().is_deductible())
            .map(|a| a.value().clone())
            .collect();
        advances.sort_by(|a, b| a.requested_at.cmp(&b.requested_at).then(a.id.cmp(&b.id)));
        advances
            .into_iter()
            .map(|a| AdvanceDeduction {
                advance_id: a.id,
                amount: a.amount,
            })
            .collect()
    }

    /// Marks advances as netted out by `record_id`.
    pub fn mark_deducted(&self, deductions: &[AdvanceDeduction], record_id: Uuid) {
        for deduction in deductions {
            if let Some(mut advance) = self.advances.get_mut(&deduction.advance_id) {
                if advance.is_deductible() {
                    advance.is_deducted = true;
                    advance.deducted_by = Some(record_id);
                }
            }
        }
    }

    /// Returns advances netted out by `record_id` to the deductible pool.
    pub fn release(&self, deductions: &[AdvanceDeduction], record_id: Uuid) {
        for deduction in deductions {
            if let Some(mut advance) = self.advances.get_mut(&deduction.advance_id) {
                if advance.deducted_by == Some(record_id) {
                    advance.is_deducted = false;
                    advance.deducted_by = None;
                }
            }
        }
    }
}

impl PayrollEngine {
    /// Records a pending advance request for an employee's month.
    pub fn request_advance(
        &self,
        user_id: Uuid,
        month: u32,
        year: i32,
        amount: Decimal,
        reason: &str,
        actor: &Actor,
    ) -> EngineResult<SalaryAdvance> {
        let key = self.period_key(user_id, month, year)?;
        if amount <= Decimal::ZERO {
            return Err(EngineError::validation("amount", "must be positive"));
        }
        check_amount("amount", amount)?;
        if reason.trim().is_empty() {
            return Err(EngineError::validation("reason", "must not be empty"));
        }
        self.directory.get(user_id)?;

        let advance = SalaryAdvance::request(key, amount, reason.trim(), Utc::now());
        self.advances.insert(advance.clone());
        info!(
            advance_id = %advance.id,
            user_id = %user_id,
            month,
            year,
            amount = %amount,
            requested_by = %actor.id,
            "Salary advance requested"
        );
        Ok(advance)
    }

    /// Approves or rejects a pending advance.
    ///
    /// An approved advance is netted out by the next calculation for its
    /// period. Fails with [`EngineError::InvalidTransition`] if the advance
    /// was already resolved.
    pub fn resolve_advance(
        &self,
        advance_id: Uuid,
        action: AdvanceAction,
        comments: &str,
        actor: &Actor,
    ) -> EngineResult<SalaryAdvance> {
        actor.require(Capability::ManagePayroll, "resolve salary advances")?;
        match self
            .advances
            .resolve(advance_id, action, comments, &actor.id, Utc::now())
        {
            Ok(advance) => {
                info!(
                    advance_id = %advance_id,
                    status = %advance.approval_status,
                    actor = %actor.id,
                    "Salary advance resolved"
                );
                Ok(advance)
            }
            Err(err) => {
                warn!(advance_id = %advance_id, error = %err, "Salary advance resolution refused");
                Err(err)
            }
        }
    }

    /// Lists advances, optionally by status.
    pub fn advances(&self, status: Option<AdvanceStatus>) -> Vec<SalaryAdvance> {
        self.advances.list(status)
    }

    /// Returns one advance.
    pub fn advance(&self, advance_id: Uuid) -> EngineResult<SalaryAdvance> {
        self.advances.get(advance_id)
    }
}
