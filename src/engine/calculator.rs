//! Salary calculation.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::apply_rules;
use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, CalculatedPay, Capability, PeriodKey, SalaryRecord, SalaryStatus};

use super::PayrollEngine;
use super::workflow::{RecordAction, check_transition};

impl PayrollEngine {
    /// Calculates (or recalculates) one employee's salary for a month.
    ///
    /// The base salary comes from the employee's current grade. Rules are
    /// evaluated against a fresh snapshot and the period's attendance facts.
    /// Every approved advance for the same period that has not been deducted
    /// yet is netted out, and is marked deducted only once the record has
    /// been stored.
    ///
    /// If the period already has a pending record its figures are replaced
    /// in place, keeping advances it already netted out and its manual
    /// adjustments. Otherwise a new pending record is created.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Validation`] for a bad month or year, or an employee
    ///   without a grade.
    /// - [`EngineError::NotFound`] for an unknown employee or grade.
    /// - [`EngineError::AlreadyFinalized`] if the period's record is already
    ///   approved or paid.
    pub fn calculate(
        &self,
        user_id: Uuid,
        month: u32,
        year: i32,
        actor: &Actor,
    ) -> EngineResult<SalaryRecord> {
        actor.require(Capability::ManagePayroll, "calculate salaries")?;
        let key = self.period_key(user_id, month, year)?;
        let employee = self.directory.get(user_id)?;
        let grade_id = employee.grade_id.ok_or_else(|| {
            EngineError::validation(
                "userId",
                format!("employee {} has no salary grade", user_id),
            )
        })?;
        let grade = self.grades.get(grade_id)?;

        let lock = self.period_lock(key);
        let _guard = lock.lock();

        let existing = self.records.live_for(&key);
        if let Some(record) = &existing {
            if let Err(err) = check_transition(RecordAction::Recalculate, record) {
                warn!(record_id = %record.id, status = %record.status, "Recalculation refused");
                return Err(err);
            }
        }

        let now = Utc::now();
        let facts = self.attendance.facts(&key);
        let snapshot = self.rules.snapshot(now);
        let evaluation = apply_rules(grade.base_salary, &facts, &snapshot)?;
        let new_advances = self.advances.deductible_for(&key);

        let pay = CalculatedPay {
            base_salary: grade.base_salary,
            grade_code: grade.code.clone(),
            line_items: evaluation.line_items,
            new_advances: new_advances.clone(),
            facts,
            rules_snapshot_at: snapshot.taken_at,
        };

        let record = match existing {
            Some(existing) => self.records.update(existing.id, |record| {
                check_transition(RecordAction::Recalculate, record)?;
                record.apply_calculation(pay, now)?;
                Ok(record.clone())
            })?,
            None => {
                let record = SalaryRecord::pending(key, pay, now)?;
                self.records.insert(record.clone());
                record
            }
        };

        self.advances.mark_deducted(&new_advances, record.id);

        info!(
            record_id = %record.id,
            user_id = %user_id,
            month,
            year,
            grade = %record.grade_code,
            final_salary = %record.final_salary,
            advances_deducted = new_advances.len(),
            "Salary calculated"
        );
        Ok(record)
    }

    /// Returns one salary record.
    pub fn salary(&self, record_id: Uuid) -> EngineResult<SalaryRecord> {
        self.records.get(record_id)
    }

    /// Lists records, optionally restricted to a month and/or year.
    pub fn salaries(&self, month: Option<u32>, year: Option<i32>) -> Vec<SalaryRecord> {
        self.records.filter(|r| {
            month.is_none_or(|m| r.month == m) && year.is_none_or(|y| r.year == y)
        })
    }

    /// Lists pending records, optionally restricted to a month and/or year.
    pub fn pending_salaries(&self, month: Option<u32>, year: Option<i32>) -> Vec<SalaryRecord> {
        self.records.filter(|r| {
            r.status == SalaryStatus::Pending
                && month.is_none_or(|m| r.month == m)
                && year.is_none_or(|y| r.year == y)
        })
    }

    /// Lists every record of one employee's period, rejected ones included.
    pub fn salary_history(&self, user_id: Uuid, month: u32, year: i32) -> EngineResult<Vec<SalaryRecord>> {
        let key = PeriodKey::new(user_id, month, year)?;
        Ok(self.records.history_for(&key))
    }

    pub(super) fn period_key(&self, user_id: Uuid, month: u32, year: i32) -> EngineResult<PeriodKey> {
        if year < self.settings.min_year || year > self.settings.max_year {
            return Err(EngineError::validation(
                "year",
                format!(
                    "must be between {} and {}, got {}",
                    self.settings.min_year, self.settings.max_year, year
                ),
            ));
        }
        PeriodKey::new(user_id, month, year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use crate::config::ConfigLoader;
    use crate::models::{AdvanceAction, Employee, Role, RuleAmount, RuleDefinition};

    const AN: &str = "11111111-1111-4111-8111-111111111111";

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_test_engine() -> PayrollEngine {
        let loader = ConfigLoader::load("./config/default").unwrap();
        PayrollEngine::from_config(loader.config()).unwrap()
    }

    fn an() -> Uuid {
        Uuid::parse_str(AN).unwrap()
    }

    fn manager() -> Actor {
        Actor::new("payroll-manager", Role::Manager)
    }

    #[test]
    fn test_recalculation_updates_pending_record_in_place() {
        let engine = create_test_engine();

        let first = engine.calculate(an(), 5, 2026, &manager()).unwrap();
        let second = engine.calculate(an(), 5, 2026, &manager()).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.final_salary, second.final_salary);
        assert_eq!(engine.salaries(Some(5), Some(2026)).len(), 1);
    }

    #[test]
    fn test_rule_edit_does_not_touch_approved_record() {
        let engine = create_test_engine();
        let admin = Actor::new("hr-admin", Role::Admin);
        let approved = engine.calculate(an(), 4, 2026, &manager()).unwrap();
        engine.approve(approved.id, &manager()).unwrap();

        let rule = engine
            .rules()
            .into_iter()
            .find(|r| r.name == "Social insurance")
            .unwrap();
        let definition = RuleDefinition {
            kind: rule.kind,
            name: rule.name.clone(),
            description: rule.description.clone(),
            amount: RuleAmount::Percentage(dec("2")),
            trigger_kind: rule.trigger_kind,
            trigger_threshold: rule.trigger_threshold,
            is_active: rule.is_active,
        };
        engine.update_rule(rule.id, definition, &admin).unwrap();

        let stored = engine.salary(approved.id).unwrap();
        assert_eq!(stored.final_salary, dec("9700000"));
        assert_eq!(stored.line_items, approved.line_items);

        let fresh = engine.calculate(an(), 5, 2026, &manager()).unwrap();
        assert_eq!(fresh.final_salary, dec("10300000"));
    }

    #[test]
    fn test_employee_without_grade_is_validation_error() {
        let engine = create_test_engine();
        let employee = engine
            .register_employee(
                Employee {
                    id: Uuid::new_v4(),
                    name: "No grade".to_string(),
                    hire_date: None,
                    grade_id: None,
                    is_active: true,
                },
                &manager(),
            )
            .unwrap();

        let result = engine.calculate(employee.id, 5, 2026, &manager());

        assert!(matches!(result, Err(EngineError::Validation { .. })));
    }

    #[test]
    fn test_year_outside_configured_bounds() {
        let engine = create_test_engine();

        let result = engine.calculate(an(), 5, 1999, &manager());

        match result {
            Err(EngineError::Validation { field, .. }) => assert_eq!(field, "year"),
            other => panic!("Expected year validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_advance_deducted_once_then_released_by_rejection() {
        let engine = create_test_engine();
        let staff = Actor::new("staff-01", Role::Employee);
        let advance = engine
            .request_advance(an(), 6, 2026, dec("1000000"), "rent", &staff)
            .unwrap();
        engine
            .resolve_advance(advance.id, AdvanceAction::Approve, "", &manager())
            .unwrap();

        let first = engine.calculate(an(), 6, 2026, &manager()).unwrap();
        let again = engine.calculate(an(), 6, 2026, &manager()).unwrap();
        assert_eq!(first.deduction, dec("1800000"));
        assert_eq!(again.deduction, dec("1800000"));
        assert!(engine.advance(advance.id).unwrap().is_deducted);

        engine.reject(first.id, "recount", &manager()).unwrap();
        assert!(!engine.advance(advance.id).unwrap().is_deducted);

        let fresh = engine.calculate(an(), 6, 2026, &manager()).unwrap();
        assert_ne!(fresh.id, first.id);
        assert_eq!(fresh.deduction, dec("1800000"));
        assert_eq!(engine.advance(advance.id).unwrap().deducted_by, Some(fresh.id));
    }

    #[test]
    fn test_pending_filter_skips_approved() {
        let engine = create_test_engine();
        let record = engine.calculate(an(), 5, 2026, &manager()).unwrap();
        assert_eq!(engine.pending_salaries(Some(5), None).len(), 1);

        engine.approve(record.id, &manager()).unwrap();

        assert!(engine.pending_salaries(Some(5), None).is_empty());
        assert_eq!(engine.salaries(None, Some(2026)).len(), 1);
    }
}
