//! Manual adjustments to salary records.

use chrono::Utc;
use dashmap::DashMap;
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, Adjustment, AdjustmentDelta, Capability, SalaryRecord};

use super::PayrollEngine;
use super::workflow::{RecordAction, check_transition};

/// Append-only audit trail of adjustments, per salary record.
#[derive(Debug, Default)]
pub struct AdjustmentLedger {
    entries: DashMap<Uuid, Vec<Adjustment>>,
}

impl AdjustmentLedger {
    /// Appends an adjustment to its record's trail.
    pub fn append(&self, adjustment: Adjustment) {
        self.entries
            .entry(adjustment.salary_record_id)
            .or_default()
            .push(adjustment);
    }

    /// Returns a record's adjustments in the order they were applied.
    pub fn history(&self, record_id: Uuid) -> Vec<Adjustment> {
        self.entries
            .get(&record_id)
            .map(|entries| entries.value().clone())
            .unwrap_or_default()
    }
}

impl PayrollEngine {
    /// Applies additive corrections to a pending or approved record.
    ///
    /// The deltas accumulate on top of any earlier adjustment and
    /// `final_salary` is recomputed. Fails with [`EngineError::RecordLocked`]
    /// for paid or rejected records.
    pub fn adjust(
        &self,
        record_id: Uuid,
        delta: AdjustmentDelta,
        notes: &str,
        actor: &Actor,
    ) -> EngineResult<SalaryRecord> {
        actor.require(Capability::ManagePayroll, "adjust salaries")?;
        if delta.is_zero() {
            return Err(EngineError::validation(
                "adjustment",
                "at least one adjustment must be non-zero",
            ));
        }
        delta.validate()?;

        let now = Utc::now();
        let record = self.records.update(record_id, |record| {
            check_transition(RecordAction::Adjust, record)?;
            record.apply_adjustment(delta)?;
            self.adjustments.append(Adjustment::new(
                record_id,
                delta,
                notes.trim(),
                actor.id.clone(),
                now,
            ));
            Ok(record.clone())
        })?;

        info!(
            record_id = %record_id,
            actor = %actor.id,
            base_adjustment = %delta.base_adjustment,
            bonus_adjustment = %delta.bonus_adjustment,
            deduction_adjustment = %delta.deduction_adjustment,
            final_salary = %record.final_salary,
            "Salary record adjusted"
        );
        Ok(record)
    }

    /// Returns a record's adjustments in the order they were applied.
    pub fn adjustment_history(&self, record_id: Uuid) -> EngineResult<Vec<Adjustment>> {
        self.records.get(record_id)?;
        Ok(self.adjustments.history(record_id))
    }
}
