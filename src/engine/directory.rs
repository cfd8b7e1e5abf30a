//! Read-side collaborators: the employee directory and attendance summaries.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceFacts, Employee, PeriodKey};

/// Employees known to the engine.
#[derive(Debug, Default)]
pub struct EmployeeDirectory {
    employees: DashMap<Uuid, Employee>,
}

impl EmployeeDirectory {
    /// Returns one employee.
    pub fn get(&self, id: Uuid) -> EngineResult<Employee> {
        self.employees
            .get(&id)
            .map(|e| e.value().clone())
            .ok_or_else(|| EngineError::not_found("employee", id))
    }

    /// Returns every employee ordered by name.
    pub fn list(&self) -> Vec<Employee> {
        let mut employees: Vec<Employee> = self.employees.iter().map(|e| e.value().clone()).collect();
        employees.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        employees
    }

    /// Adds an employee. Identifiers must be unique.
    pub fn register(&self, employee: Employee) -> EngineResult<Employee> {
        match self.employees.entry(employee.id) {
            Entry::Occupied(_) => Err(EngineError::validation(
                "id",
                format!("employee {} already exists", employee.id),
            )),
            Entry::Vacant(slot) => {
                slot.insert(employee.clone());
                info!(user_id = %employee.id, "Employee registered");
                Ok(employee)
            }
        }
    }

    /// Moves an employee to a different grade.
    pub fn assign_grade(&self, id: Uuid, grade_id: Uuid) -> EngineResult<Employee> {
        let mut employee = self
            .employees
            .get_mut(&id)
            .ok_or_else(|| EngineError::not_found("employee", id))?;
        employee.grade_id = Some(grade_id);
        Ok(employee.value().clone())
    }

    /// Returns true if any employee holds `grade_id`.
    pub fn grade_in_use(&self, grade_id: Uuid) -> bool {
        self.employees
            .iter()
            .any(|e| e.grade_id == Some(grade_id))
    }
}

/// Supplies attendance facts for a pay period.
pub trait AttendanceSource: Send + Sync {
    /// Returns the facts for `key`. Periods without a summary have zero facts.
    fn facts(&self, key: &PeriodKey) -> AttendanceFacts;

    /// Stores the summary for `key`, replacing any previous one.
    fn record(&self, key: PeriodKey, facts: AttendanceFacts);
}

/// In-memory attendance summaries.
#[derive(Debug, Default)]
pub struct AttendanceBook {
    summaries: DashMap<PeriodKey, AttendanceFacts>,
}

impl AttendanceSource for AttendanceBook {
    fn facts(&self, key: &PeriodKey) -> AttendanceFacts {
        self.summaries.get(key).map(|f| *f).unwrap_or_default()
    }

    fn record(&self, key: PeriodKey, facts: AttendanceFacts) {
        self.summaries.insert(key, facts);
    }
}
