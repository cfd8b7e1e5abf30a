//! Seniority-based grade escalation.
//!
//! The batch walks every active employee, measures tenure up to `as_of` and
//! moves the employee to the best grade that tenure allows. Each employee is
//! processed and committed on its own: one bad entry is reported in the
//! details and never aborts the batch.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{eligible_grade, years_of_service};
use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, Capability, Employee, SalaryGrade};

use super::{Notification, PayrollEngine};

/// Batch switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeniorityOptions {
    /// Report candidates without changing anything.
    #[serde(default)]
    pub dry_run: bool,
    /// Notify upgraded employees. Ignored in dry runs.
    #[serde(default)]
    pub notify_users: bool,
}

/// Counts over one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SenioritySummary {
    /// Employees examined.
    pub total: usize,
    /// Employees upgraded (or eligible, in a dry run).
    pub upgraded: usize,
    /// Employees with nothing to do.
    pub skipped: usize,
    /// Employees that could not be processed.
    pub errors: usize,
}

/// What happened to one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "status",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum SeniorityOutcome {
    /// Moved (or eligible to move) to a better grade.
    Upgraded {
        /// Code of the previous grade, if any.
        from_grade: Option<String>,
        /// Code of the new grade.
        to_grade: String,
        /// Base salary of the new grade.
        new_base_salary: Decimal,
        /// False in a dry run.
        applied: bool,
        /// True if a notification went out.
        notified: bool,
    },
    /// Nothing to do.
    Skipped {
        /// Why.
        reason: String,
    },
    /// Could not be processed.
    Error {
        /// What went wrong.
        message: String,
    },
}

/// One line of the batch report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeniorityEntry {
    /// The employee.
    pub user_id: Uuid,
    /// Display name.
    pub name: String,
    /// Tenure in years, when it could be measured.
    pub years_of_service: Option<Decimal>,
    /// The result.
    #[serde(flatten)]
    pub outcome: SeniorityOutcome,
}

/// The full batch report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeniorityReport {
    /// Counts.
    pub summary: SenioritySummary,
    /// One entry per examined employee, ordered by name.
    pub details: Vec<SeniorityEntry>,
    /// Human-readable summary line.
    pub message: String,
}

impl SeniorityReport {
    /// Returns [`EngineError::PartialBatchFailure`] if any entry failed.
    pub fn failure(&self) -> Option<EngineError> {
        (self.summary.errors > 0).then_some(EngineError::PartialBatchFailure {
            failed: self.summary.errors,
            total: self.summary.total,
        })
    }
}

impl PayrollEngine {
    /// Runs seniority escalation for every active employee as of `as_of`.
    ///
    /// In a dry run nothing is written and repeated runs give the same
    /// report. In live mode each eligible employee's grade is reassigned
    /// immediately, and with `notify_users` a notification is sent; a failed
    /// notification is logged and does not undo the upgrade.
    pub fn apply_seniority(
        &self,
        options: SeniorityOptions,
        as_of: NaiveDate,
        actor: &Actor,
    ) -> EngineResult<SeniorityReport> {
        actor.require(Capability::ManagePayroll, "run seniority escalation")?;

        let grades = self.grades.list();
        let employees: Vec<Employee> = self
            .directory
            .list()
            .into_iter()
            .filter(|e| e.is_active)
            .collect();

        let mut summary = SenioritySummary {
            total: employees.len(),
            ..SenioritySummary::default()
        };
        let mut details = Vec::with_capacity(employees.len());

        for employee in employees {
            let entry = self.escalate_one(&employee, &grades, options, as_of);
            match &entry.outcome {
                SeniorityOutcome::Upgraded { .. } => summary.upgraded += 1,
                SeniorityOutcome::Skipped { .. } => summary.skipped += 1,
                SeniorityOutcome::Error { message } => {
                    summary.errors += 1;
                    warn!(user_id = %employee.id, error = %message, "Seniority escalation failed for employee");
                }
            }
            details.push(entry);
        }

        let message = if options.dry_run {
            format!(
                "Dry run: {} of {} employee(s) eligible for upgrade",
                summary.upgraded, summary.total
            )
        } else {
            format!(
                "Upgraded {} of {} employee(s); {} skipped, {} failed",
                summary.upgraded, summary.total, summary.skipped, summary.errors
            )
        };

        info!(
            dry_run = options.dry_run,
            total = summary.total,
            upgraded = summary.upgraded,
            skipped = summary.skipped,
            errors = summary.errors,
            actor = %actor.id,
            "Seniority escalation finished"
        );

        Ok(SeniorityReport {
            summary,
            details,
            message,
        })
    }

    fn escalate_one(
        &self,
        employee: &Employee,
        grades: &[SalaryGrade],
        options: SeniorityOptions,
        as_of: NaiveDate,
    ) -> SeniorityEntry {
        let entry = |years: Option<Decimal>, outcome: SeniorityOutcome| SeniorityEntry {
            user_id: employee.id,
            name: employee.name.clone(),
            years_of_service: years,
            outcome,
        };
        let error = |years: Option<Decimal>, message: String| {
            entry(years, SeniorityOutcome::Error { message })
        };

        let Some(hire_date) = employee.hire_date else {
            return error(None, "missing hire date".to_string());
        };
        let Some(years) = years_of_service(hire_date, as_of) else {
            return error(None, format!("hire date {} is after {}", hire_date, as_of));
        };

        let current = match employee.grade_id {
            Some(grade_id) => match grades.iter().find(|g| g.id == grade_id) {
                Some(grade) => Some(grade),
                None => {
                    return error(Some(years), format!("current grade {} does not exist", grade_id));
                }
            },
            None => None,
        };

        let Some(target) = eligible_grade(years, grades) else {
            return entry(
                Some(years),
                SeniorityOutcome::Skipped {
                    reason: "no eligible grade".to_string(),
                },
            );
        };

        if current.is_some_and(|c| c.level >= target.level) {
            return entry(
                Some(years),
                SeniorityOutcome::Skipped {
                    reason: "no grade change due".to_string(),
                },
            );
        }

        let from_grade = current.map(|c| c.code.clone());
        if options.dry_run {
            return entry(
                Some(years),
                SeniorityOutcome::Upgraded {
                    from_grade,
                    to_grade: target.code.clone(),
                    new_base_salary: target.base_salary,
                    applied: false,
                    notified: false,
                },
            );
        }

        let assigned = self
            .grades
            .with_grade(target.id, |_| self.directory.assign_grade(employee.id, target.id));
        if let Err(err) = assigned {
            return error(Some(years), err.to_string());
        }
        info!(
            user_id = %employee.id,
            from_grade = from_grade.as_deref().unwrap_or("none"),
            to_grade = %target.code,
            "Employee grade escalated"
        );

        let notified = options.notify_users && self.notify_upgrade(employee, target);

        entry(
            Some(years),
            SeniorityOutcome::Upgraded {
                from_grade,
                to_grade: target.code.clone(),
                new_base_salary: target.base_salary,
                applied: true,
                notified,
            },
        )
    }

    fn notify_upgrade(&self, employee: &Employee, grade: &SalaryGrade) -> bool {
        let notification = Notification {
            user_id: employee.id,
            subject: "Salary grade upgraded".to_string(),
            message: format!(
                "Congratulations {}, you have been moved to grade {} ({}) with a base salary of {}.",
                employee.name, grade.code, grade.name, grade.base_salary
            ),
            created_at: Utc::now(),
        };
        match self.notifier.notify(&notification) {
            Ok(()) => true,
            Err(err) => {
                warn!(user_id = %employee.id, error = %err, "Upgrade notification failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use std::sync::Arc;

    use crate::config::{EngineSettings, PayrollConfig};
    use crate::engine::LogNotifier;
    use crate::models::{GradeDefinition, Role};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn grade(code: &str, level: u32, years: &str) -> GradeDefinition {
        GradeDefinition {
            code: code.to_string(),
            name: format!("Grade {}", level),
            level,
            min_years_of_service: dec(years),
            base_salary: Decimal::from(1_000_000 * i64::from(level)),
            is_active: true,
        }
    }

    fn create_test_engine() -> PayrollEngine {
        let config = PayrollConfig::new(
            EngineSettings::default(),
            Vec::new(),
            vec![grade("G1", 1, "0"), grade("G2", 2, "2"), grade("G3", 3, "5")],
            Vec::new(),
        );
        PayrollEngine::from_config(&config).unwrap()
    }

    fn hire(engine: &PayrollEngine, name: &str, hired: Option<NaiveDate>, grade: Option<&str>) -> Uuid {
        let grade_id = grade.map(|code| engine.grades.by_code(code).unwrap().id);
        let employee = Employee {
            id: Uuid::new_v4(),
            name: name.to_string(),
            hire_date: hired,
            grade_id,
            is_active: true,
        };
        engine.directory.register(employee).unwrap().id
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn admin() -> Actor {
        Actor::new("hr-admin", Role::Admin)
    }

    fn entry_for(report: &SeniorityReport, id: Uuid) -> &SeniorityEntry {
        report.details.iter().find(|e| e.user_id == id).unwrap()
    }

    #[test]
    fn test_two_and_a_half_years_reaches_level_two() {
        let engine = create_test_engine();
        let as_of = date(2026, 7, 1);
        let id = hire(&engine, "An", Some(date(2024, 1, 1)), Some("G1"));

        let report = engine
            .apply_seniority(SeniorityOptions::default(), as_of, &admin())
            .unwrap();

        match &entry_for(&report, id).outcome {
            SeniorityOutcome::Upgraded { from_grade, to_grade, applied, .. } => {
                assert_eq!(from_grade.as_deref(), Some("G1"));
                assert_eq!(to_grade, "G2");
                assert!(applied);
            }
            other => panic!("Expected upgrade, got {:?}", other),
        }
        let g2 = engine.grades.by_code("G2").unwrap();
        assert_eq!(engine.directory.get(id).unwrap().grade_id, Some(g2.id));
    }

    #[test]
    fn test_dry_run_changes_nothing_and_repeats() {
        let engine = create_test_engine();
        let as_of = date(2026, 7, 1);
        let id = hire(&engine, "An", Some(date(2015, 1, 1)), Some("G1"));
        let options = SeniorityOptions {
            dry_run: true,
            notify_users: true,
        };

        let first = engine.apply_seniority(options, as_of, &admin()).unwrap();
        let second = engine.apply_seniority(options, as_of, &admin()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.summary.upgraded, 1);
        let g1 = engine.grades.by_code("G1").unwrap();
        assert_eq!(engine.directory.get(id).unwrap().grade_id, Some(g1.id));
        assert!(first.message.starts_with("Dry run"));
    }

    #[test]
    fn test_errors_are_isolated_per_employee() {
        let engine = create_test_engine();
        let as_of = date(2026, 7, 1);
        let missing = hire(&engine, "A missing", None, Some("G1"));
        let future = hire(&engine, "B future", Some(date(2027, 1, 1)), None);
        let ok = hire(&engine, "C ok", Some(date(2020, 1, 1)), Some("G1"));

        let report = engine
            .apply_seniority(SeniorityOptions::default(), as_of, &admin())
            .unwrap();

        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.errors, 2);
        assert_eq!(report.summary.upgraded, 1);
        assert!(matches!(entry_for(&report, missing).outcome, SeniorityOutcome::Error { .. }));
        assert!(matches!(entry_for(&report, future).outcome, SeniorityOutcome::Error { .. }));
        assert!(matches!(entry_for(&report, ok).outcome, SeniorityOutcome::Upgraded { .. }));
        assert_eq!(
            report.failure(),
            Some(EngineError::PartialBatchFailure { failed: 2, total: 3 })
        );
    }

    #[test]
    fn test_employee_at_best_grade_is_skipped() {
        let engine = create_test_engine();
        let id = hire(&engine, "An", Some(date(2025, 1, 1)), Some("G1"));

        let report = engine
            .apply_seniority(SeniorityOptions::default(), date(2026, 1, 1), &admin())
            .unwrap();

        assert_eq!(
            entry_for(&report, id).outcome,
            SeniorityOutcome::Skipped {
                reason: "no grade change due".to_string()
            }
        );
        assert!(report.failure().is_none());
    }

    #[test]
    fn test_live_run_notifies_upgraded_employees() {
        let notifier = Arc::new(LogNotifier::default());
        let engine = create_test_engine().with_notifier(notifier.clone());
        let id = hire(&engine, "An", Some(date(2018, 1, 1)), None);

        let report = engine
            .apply_seniority(
                SeniorityOptions {
                    dry_run: false,
                    notify_users: true,
                },
                date(2026, 1, 1),
                &admin(),
            )
            .unwrap();

        match &entry_for(&report, id).outcome {
            SeniorityOutcome::Upgraded { from_grade, to_grade, notified, .. } => {
                assert!(from_grade.is_none());
                assert_eq!(to_grade, "G3");
                assert!(notified);
            }
            other => panic!("Expected upgrade, got {:?}", other),
        }
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].user_id, id);
    }

    #[test]
    fn test_employee_role_is_forbidden() {
        let engine = create_test_engine();
        let result = engine.apply_seniority(
            SeniorityOptions::default(),
            date(2026, 1, 1),
            &Actor::new("staff", Role::Employee),
        );
        assert!(matches!(result, Err(EngineError::Forbidden { .. })));
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let entry = SeniorityEntry {
            user_id: Uuid::nil(),
            name: "An".to_string(),
            years_of_service: Some(dec("2.5")),
            outcome: SeniorityOutcome::Skipped {
                reason: "no eligible grade".to_string(),
            },
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "no eligible grade");
        assert_eq!(json["yearsOfService"], "2.5");
    }
}
