//! Manual salary adjustments.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AdjustmentDelta;

/// One audited correction applied to a salary record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Adjustment {
    /// Unique identifier.
    pub id: Uuid,
    /// The adjusted record.
    pub salary_record_id: Uuid,
    /// Added to base salary.
    pub base_adjustment: Decimal,
    /// Added to the bonus total.
    pub bonus_adjustment: Decimal,
    /// Added to the deduction total.
    pub deduction_adjustment: Decimal,
    /// Why the correction was made.
    pub notes: String,
    /// Who applied it.
    pub applied_by: String,
    /// When it was applied.
    pub applied_at: DateTime<Utc>,
}

impl Adjustment {
    /// Records `delta` against `salary_record_id`.
    pub fn new(
        salary_record_id: Uuid,
        delta: AdjustmentDelta,
        notes: impl Into<String>,
        applied_by: impl Into<String>,
        applied_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            salary_record_id,
            base_adjustment: delta.base_adjustment,
            bonus_adjustment: delta.bonus_adjustment,
            deduction_adjustment: delta.deduction_adjustment,
            notes: notes.into(),
            applied_by: applied_by.into(),
            applied_at,
        }
    }
}
