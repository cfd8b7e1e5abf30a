//! Employee model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_active() -> bool {
    true
}

/// An employee as seen by the payroll engine.
///
/// The engine reads employees during calculation; only seniority escalation
/// writes to them, and only `grade_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// First day of employment.
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
    /// Current salary grade.
    #[serde(default)]
    pub grade_id: Option<Uuid>,
    /// Inactive employees are skipped by batch jobs.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_employee_without_grade() {
        let json = r#"{
            "id": "6f1c1c1e-6a52-4c1e-9a4e-6a7b6c0d0001",
            "name": "Nguyen Van A",
            "hireDate": "2021-03-01"
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.name, "Nguyen Van A");
        assert_eq!(employee.hire_date, NaiveDate::from_ymd_opt(2021, 3, 1));
        assert!(employee.grade_id.is_none());
        assert!(employee.is_active);
    }
}
