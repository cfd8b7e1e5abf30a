//! Reference data: rules, grades, employees and attendance summaries.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Actor, AttendanceFacts, Capability, Employee, GradeDefinition, RuleDefinition, SalaryGrade,
    SalaryRule,
};

use super::PayrollEngine;

impl PayrollEngine {
    /// Lists rules in creation order.
    pub fn rules(&self) -> Vec<SalaryRule> {
        self.rules.list()
    }

    /// Returns one rule.
    pub fn rule(&self, rule_id: Uuid) -> EngineResult<SalaryRule> {
        self.rules.get(rule_id)
    }

    /// Adds a rule. Takes effect from the next calculation.
    pub fn create_rule(&self, definition: RuleDefinition, actor: &Actor) -> EngineResult<SalaryRule> {
        actor.require(Capability::ManagePayroll, "create salary rules")?;
        self.rules.create(definition, Utc::now())
    }

    /// Replaces a rule. Stored records keep the figures they were calculated with.
    pub fn update_rule(
        &self,
        rule_id: Uuid,
        definition: RuleDefinition,
        actor: &Actor,
    ) -> EngineResult<SalaryRule> {
        actor.require(Capability::ManagePayroll, "update salary rules")?;
        self.rules.update(rule_id, definition, Utc::now())
    }

    /// Deletes a rule.
    pub fn delete_rule(&self, rule_id: Uuid, actor: &Actor) -> EngineResult<SalaryRule> {
        actor.require(Capability::ManagePayroll, "delete salary rules")?;
        self.rules.delete(rule_id)
    }

    /// Lists grades ordered by level.
    pub fn grades(&self) -> Vec<SalaryGrade> {
        self.grades.list()
    }

    /// Returns one grade.
    pub fn grade(&self, grade_id: Uuid) -> EngineResult<SalaryGrade> {
        self.grades.get(grade_id)
    }

    /// Adds a grade to the ladder.
    pub fn create_grade(&self, definition: GradeDefinition, actor: &Actor) -> EngineResult<SalaryGrade> {
        actor.require(Capability::ManagePayroll, "create salary grades")?;
        self.grades.create(definition)
    }

    /// Replaces a grade's fields. The ladder must stay valid.
    pub fn update_grade(
        &self,
        grade_id: Uuid,
        definition: GradeDefinition,
        actor: &Actor,
    ) -> EngineResult<SalaryGrade> {
        actor.require(Capability::ManagePayroll, "update salary grades")?;
        self.grades.update(grade_id, definition)
    }

    /// Deletes a grade no employee holds.
    pub fn delete_grade(&self, grade_id: Uuid, actor: &Actor) -> EngineResult<SalaryGrade> {
        actor.require(Capability::ManagePayroll, "delete salary grades")?;
        self.grades
            .delete_unused(grade_id, |id| self.directory.grade_in_use(id))
    }

    /// Lists employees ordered by name.
    pub fn employees(&self) -> Vec<Employee> {
        self.directory.list()
    }

    /// Returns one employee.
    pub fn employee(&self, user_id: Uuid) -> EngineResult<Employee> {
        self.directory.get(user_id)
    }

    /// Adds an employee. A grade, if given, must exist.
    pub fn register_employee(&self, employee: Employee, actor: &Actor) -> EngineResult<Employee> {
        actor.require(Capability::ManagePayroll, "register employees")?;
        if employee.name.trim().is_empty() {
            return Err(EngineError::validation("name", "must not be empty"));
        }
        match employee.grade_id {
            Some(grade_id) => self
                .grades
                .with_grade(grade_id, |_| self.directory.register(employee)),
            None => self.directory.register(employee),
        }
    }

    /// Stores the attendance summary for one employee's month, replacing any
    /// previous one. Existing records pick it up on recalculation.
    pub fn record_attendance(
        &self,
        user_id: Uuid,
        month: u32,
        year: i32,
        facts: AttendanceFacts,
        actor: &Actor,
    ) -> EngineResult<AttendanceFacts> {
        actor.require(Capability::ManagePayroll, "record attendance")?;
        let key = self.period_key(user_id, month, year)?;
        self.directory.get(user_id)?;
        self.attendance.record(key, facts);
        info!(
            user_id = %user_id,
            month,
            year,
            late_count = facts.late_count,
            absence_count = facts.absence_count,
            leave_days = facts.leave_days,
            "Attendance summary recorded"
        );
        Ok(facts)
    }

    /// Returns the attendance facts for one employee's month.
    pub fn attendance(&self, user_id: Uuid, month: u32, year: i32) -> EngineResult<AttendanceFacts> {
        let key = self.period_key(user_id, month, year)?;
        Ok(self.attendance.facts(&key))
    }
}
