//! Attendance and leave facts for a pay period.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// Identifies one employee's pay period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodKey {
    /// The employee.
    pub user_id: Uuid,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1 through 12.
    pub month: u32,
}

impl PeriodKey {
    /// Builds a key, rejecting months outside 1..=12.
    pub fn new(user_id: Uuid, month: u32, year: i32) -> EngineResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::validation(
                "month",
                format!("must be between 1 and 12, got {}", month),
            ));
        }
        Ok(Self {
            user_id,
            year,
            month,
        })
    }
}

/// Attendance and leave counts for one pay period.
///
/// Rules read these counts through their trigger; the engine treats them as
/// opaque input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceFacts {
    /// Number of late arrivals.
    #[serde(default)]
    pub late_count: u32,
    /// Number of unexcused absences.
    #[serde(default)]
    pub absence_count: u32,
    /// Number of approved leave days.
    #[serde(default)]
    pub leave_days: u32,
    /// Number of days worked.
    #[serde(default)]
    pub worked_days: u32,
}
