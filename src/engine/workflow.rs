//! The salary record lifecycle.
//!
//! ```text
//! Pending ──approve──► Approved ──mark paid──► Paid
//!    │
//!    └──reject──► Rejected
//! ```
//!
//! [`RecordAction::next_status`] is the single transition table. Every
//! operation that touches a record (recalculation, review, payment and
//! adjustment) asks it before mutating anything.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, Capability, SalaryRecord, SalaryStatus};

use super::PayrollEngine;

/// Something that can be done to a salary record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordAction {
    /// Recompute the figures of an existing record.
    Recalculate,
    /// Approve for payment.
    Approve,
    /// Reject with a reason.
    Reject,
    /// Record the payout.
    MarkPaid,
    /// Apply a manual correction.
    Adjust,
}

impl RecordAction {
    /// Returns a human-readable verb for messages.
    pub fn verb(&self) -> &'static str {
        match self {
            RecordAction::Recalculate => "recalculate",
            RecordAction::Approve => "approve",
            RecordAction::Reject => "reject",
            RecordAction::MarkPaid => "mark as paid",
            RecordAction::Adjust => "adjust",
        }
    }

    /// Returns the status a record moves to when this action is applied in
    /// `from`, or `None` if the action is not allowed there.
    pub fn next_status(&self, from: SalaryStatus) -> Option<SalaryStatus> {
        use SalaryStatus::*;

        match (self, from) {
            (RecordAction::Recalculate, Pending) => Some(Pending),
            (RecordAction::Approve, Pending) => Some(Approved),
            (RecordAction::Reject, Pending) => Some(Rejected),
            (RecordAction::MarkPaid, Approved) => Some(Paid),
            (RecordAction::Adjust, Pending) => Some(Pending),
            (RecordAction::Adjust, Approved) => Some(Approved),
            _ => None,
        }
    }
}

/// Checks `action` against `record`'s status.
///
/// Fails with [`EngineError::AlreadyFinalized`] for recalculating an approved
/// or paid record, [`EngineError::RecordLocked`] for adjusting a paid or
/// rejected record, and [`EngineError::InvalidTransition`] otherwise.
pub fn check_transition(action: RecordAction, record: &SalaryRecord) -> EngineResult<SalaryStatus> {
    action.next_status(record.status).ok_or_else(|| {
        let record_id = record.id.to_string();
        let status = record.status.to_string();
        match (action, record.status) {
            (RecordAction::Recalculate, SalaryStatus::Approved | SalaryStatus::Paid) => {
                EngineError::AlreadyFinalized { record_id, status }
            }
            (RecordAction::Adjust, _) => EngineError::RecordLocked { record_id, status },
            _ => EngineError::InvalidTransition {
                entity: "salary record".to_string(),
                action: action.verb().to_string(),
                from: status,
            },
        }
    })
}

impl PayrollEngine {
    /// Approves a pending record.
    pub fn approve(&self, record_id: Uuid, actor: &Actor) -> EngineResult<SalaryRecord> {
        actor.require(Capability::ManagePayroll, "approve salaries")?;
        self.transition(record_id, RecordAction::Approve, actor, |record| {
            record.approved_at = Some(Utc::now());
        })
    }

    /// Rejects a pending record. `reason` must not be blank.
    ///
    /// Advances the record had netted out are released so the next
    /// calculation for the period deducts them again.
    pub fn reject(&self, record_id: Uuid, reason: &str, actor: &Actor) -> EngineResult<SalaryRecord> {
        actor.require(Capability::ManagePayroll, "reject salaries")?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(EngineError::validation(
                "reason",
                "a rejection reason is required",
            ));
        }

        let key = self.records.get(record_id)?.key();
        let lock = self.period_lock(key);
        let _guard = lock.lock();

        let record = self.transition(record_id, RecordAction::Reject, actor, |record| {
            record.rejection_reason = Some(reason.to_string());
        })?;
        self.advances.release(&record.advance_deductions, record.id);
        Ok(record)
    }

    /// Marks an approved record as paid. Requires the disbursement role.
    pub fn mark_paid(&self, record_id: Uuid, actor: &Actor) -> EngineResult<SalaryRecord> {
        actor.require(Capability::Disburse, "mark salaries as paid")?;
        self.transition(record_id, RecordAction::MarkPaid, actor, |record| {
            record.paid_at = Some(Utc::now());
        })
    }

    /// Moves a record to `status` through the matching transition.
    ///
    /// `reason` is required when rejecting. Moving back to pending is never
    /// allowed; recalculation is the only way to refresh a record.
    pub fn set_status(
        &self,
        record_id: Uuid,
        status: SalaryStatus,
        reason: Option<&str>,
        actor: &Actor,
    ) -> EngineResult<SalaryRecord> {
        match status {
            SalaryStatus::Approved => self.approve(record_id, actor),
            SalaryStatus::Rejected => self.reject(record_id, reason.unwrap_or_default(), actor),
            SalaryStatus::Paid => self.mark_paid(record_id, actor),
            SalaryStatus::Pending => {
                actor.require(Capability::ManagePayroll, "change salary status")?;
                let record = self.records.get(record_id)?;
                Err(EngineError::InvalidTransition {
                    entity: "salary record".to_string(),
                    action: "return to pending".to_string(),
                    from: record.status.to_string(),
                })
            }
        }
    }

    fn transition<F>(
        &self,
        record_id: Uuid,
        action: RecordAction,
        actor: &Actor,
        mutate: F,
    ) -> EngineResult<SalaryRecord>
    where
        F: FnOnce(&mut SalaryRecord),
    {
        let result = self.records.update(record_id, |record| {
            let next = check_transition(action, record)?;
            record.status = next;
            record.reviewed_by = Some(actor.id.clone());
            mutate(record);
            Ok(record.clone())
        });

        match &result {
            Ok(record) => info!(
                record_id = %record_id,
                user_id = %record.user_id,
                status = %record.status,
                actor = %actor.id,
                "Salary record {}", action.verb()
            ),
            Err(err) => warn!(
                record_id = %record_id,
                actor = %actor.id,
                error = %err,
                "Salary record transition refused"
            ),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SalaryStatus::*;

    const ALL: [SalaryStatus; 4] = [Pending, Approved, Paid, Rejected];

    #[test]
    fn test_approve_only_from_pending() {
        for from in ALL {
            let expected = (from == Pending).then_some(Approved);
            assert_eq!(RecordAction::Approve.next_status(from), expected, "from {}", from);
        }
    }

    #[test]
    fn test_reject_only_from_pending() {
        for from in ALL {
            let expected = (from == Pending).then_some(Rejected);
            assert_eq!(RecordAction::Reject.next_status(from), expected, "from {}", from);
        }
    }

    #[test]
    fn test_mark_paid_only_from_approved() {
        for from in ALL {
            let expected = (from == Approved).then_some(Paid);
            assert_eq!(RecordAction::MarkPaid.next_status(from), expected, "from {}", from);
        }
    }

    #[test]
    fn test_adjust_keeps_status_while_open() {
        assert_eq!(RecordAction::Adjust.next_status(Pending), Some(Pending));
        assert_eq!(RecordAction::Adjust.next_status(Approved), Some(Approved));
        assert_eq!(RecordAction::Adjust.next_status(Paid), None);
        assert_eq!(RecordAction::Adjust.next_status(Rejected), None);
    }

    #[test]
    fn test_nothing_returns_to_pending_except_recalculation() {
        for action in [
            RecordAction::Approve,
            RecordAction::Reject,
            RecordAction::MarkPaid,
        ] {
            for from in ALL {
                assert_ne!(action.next_status(from), Some(Pending));
            }
        }
        assert_eq!(RecordAction::Recalculate.next_status(Approved), None);
    }
}
