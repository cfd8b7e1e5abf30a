//! The payroll engine.
//!
//! [`PayrollEngine`] owns the rule book, grade ladder, employee directory,
//! salary records and the adjustment and advance ledgers, and exposes every
//! payroll operation as a method taking the acting [`Actor`].
//!
//! # Thread Safety
//!
//! The engine is `Send + Sync` and meant to be shared behind an `Arc`.
//! Calculations for the same `(employee, month, year)` are serialized by a
//! per-period lock; status transitions check and mutate a record under its
//! store guard, so two concurrent approvals yield one success and one
//! [`EngineError::InvalidTransition`].
//!
//! [`Actor`]: crate::models::Actor
//! [`EngineError::InvalidTransition`]: crate::error::EngineError::InvalidTransition

mod adjustments;
mod advances;
mod calculator;
mod catalog;
mod directory;
mod grade_book;
mod notify;
mod records;
mod rule_book;
mod seniority;
mod workflow;

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::config::{PayrollConfig, PayrollSettings};
use crate::error::EngineResult;
use crate::models::{Employee, PeriodKey};

pub use adjustments::AdjustmentLedger;
pub use advances::AdvanceLedger;
pub use directory::{AttendanceBook, AttendanceSource, EmployeeDirectory};
pub use grade_book::GradeBook;
pub use notify::{LogNotifier, Notification, Notifier};
pub use records::RecordStore;
pub use rule_book::RuleBook;
pub use seniority::{
    SeniorityEntry, SeniorityOptions, SeniorityOutcome, SeniorityReport, SenioritySummary,
};
pub use workflow::{RecordAction, check_transition};

/// The payroll calculation and approval engine.
pub struct PayrollEngine {
    settings: PayrollSettings,
    rules: RuleBook,
    grades: GradeBook,
    directory: EmployeeDirectory,
    attendance: Arc<dyn AttendanceSource>,
    records: RecordStore,
    adjustments: AdjustmentLedger,
    advances: AdvanceLedger,
    notifier: Arc<dyn Notifier>,
    period_locks: DashMap<PeriodKey, Arc<Mutex<()>>>,
}

impl PayrollEngine {
    /// Builds an engine from a validated configuration.
    ///
    /// Attendance summaries are kept in memory and notifications are logged;
    /// use [`PayrollEngine::with_attendance_source`] and
    /// [`PayrollEngine::with_notifier`] to plug in other collaborators.
    pub fn from_config(config: &PayrollConfig) -> EngineResult<Self> {
        let rules = RuleBook::from_definitions(config.rules(), Utc::now())?;
        let grades = GradeBook::from_definitions(config.grades())?;

        let directory = EmployeeDirectory::default();
        for seed in config.employees() {
            let grade_id = seed
                .grade_code
                .as_deref()
                .map(|code| grades.by_code(code).map(|g| g.id))
                .transpose()?;
            directory.register(Employee {
                id: seed.id,
                name: seed.name.clone(),
                hire_date: seed.hire_date,
                grade_id,
                is_active: seed.is_active,
            })?;
        }

        Ok(Self {
            settings: config.settings().payroll.clone(),
            rules,
            grades,
            directory,
            attendance: Arc::new(AttendanceBook::default()),
            records: RecordStore::default(),
            adjustments: AdjustmentLedger::default(),
            advances: AdvanceLedger::default(),
            notifier: Arc::new(LogNotifier::default()),
            period_locks: DashMap::new(),
        })
    }

    /// Replaces the attendance collaborator.
    pub fn with_attendance_source(mut self, source: Arc<dyn AttendanceSource>) -> Self {
        self.attendance = source;
        self
    }

    /// Replaces the notification collaborator.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    fn period_lock(&self, key: PeriodKey) -> Arc<Mutex<()>> {
        self.period_locks.entry(key).or_default().value().clone()
    }
}
