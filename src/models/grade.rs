//! Salary grade model.
//!
//! Grades form a ladder ordered by `level`. Climbing the ladder requires more
//! years of service, which is what the seniority escalator keys on.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::check_amount;
use crate::error::{EngineError, EngineResult};

fn default_active() -> bool {
    true
}

/// The editable fields of a grade, used for creation and updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeDefinition {
    /// Short unique code, e.g. "G2".
    pub code: String,
    /// Display name.
    pub name: String,
    /// Position on the ladder; higher is better paid.
    pub level: u32,
    /// Tenure required to hold this grade.
    pub min_years_of_service: Decimal,
    /// Monthly base salary for holders of this grade.
    pub base_salary: Decimal,
    /// Inactive grades are never assigned by escalation.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// A salary grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryGrade {
    /// Unique identifier.
    pub id: Uuid,
    /// Short unique code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Position on the ladder.
    pub level: u32,
    /// Tenure required to hold this grade.
    pub min_years_of_service: Decimal,
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Inactive grades are never assigned by escalation.
    pub is_active: bool,
}

impl SalaryGrade {
    /// Creates a grade with a fresh identifier.
    pub fn from_definition(definition: GradeDefinition) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: definition.code,
            name: definition.name,
            level: definition.level,
            min_years_of_service: definition.min_years_of_service,
            base_salary: definition.base_salary,
            is_active: definition.is_active,
        }
    }

    /// Replaces the editable fields, keeping the identifier.
    pub fn apply_definition(&mut self, definition: GradeDefinition) {
        self.code = definition.code;
        self.name = definition.name;
        self.level = definition.level;
        self.min_years_of_service = definition.min_years_of_service;
        self.base_salary = definition.base_salary;
        self.is_active = definition.is_active;
    }
}

/// Checks that `grades` form a valid ladder.
///
/// Codes and levels must be unique, amounts non-negative, and ordering by
/// level must give strictly increasing `min_years_of_service`.
pub fn validate_ladder(grades: &[SalaryGrade]) -> EngineResult<()> {
    for grade in grades {
        if grade.code.trim().is_empty() {
            return Err(EngineError::validation("code", "must not be empty"));
        }
        if grade.base_salary < Decimal::ZERO {
            return Err(EngineError::validation(
                "baseSalary",
                format!("grade {} has a negative base salary", grade.code),
            ));
        }
        check_amount("baseSalary", grade.base_salary)?;
        if grade.min_years_of_service < Decimal::ZERO {
            return Err(EngineError::validation(
                "minYearsOfService",
                format!("grade {} requires negative tenure", grade.code),
            ));
        }
    }

    let mut ordered: Vec<&SalaryGrade> = grades.iter().collect();
    ordered.sort_by_key(|g| g.level);

    for pair in ordered.windows(2) {
        let (lower, upper) = (pair[0], pair[1]);
        if lower.level == upper.level {
            return Err(EngineError::validation(
                "level",
                format!(
                    "grades {} and {} share level {}",
                    lower.code, upper.code, lower.level
                ),
            ));
        }
        if upper.min_years_of_service <= lower.min_years_of_service {
            return Err(EngineError::validation(
                "minYearsOfService",
                format!(
                    "grade {} (level {}) must require more years than {} (level {})",
                    upper.code, upper.level, lower.code, lower.level
                ),
            ));
        }
    }

    for (i, grade) in grades.iter().enumerate() {
        if grades[i + 1..].iter().any(|other| other.code == grade.code) {
            return Err(EngineError::validation(
                "code",
                format!("duplicate grade code {}", grade.code),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn grade(code: &str, level: u32, years: &str) -> SalaryGrade {
        SalaryGrade::from_definition(GradeDefinition {
            code: code.to_string(),
            name: code.to_string(),
            level,
            min_years_of_service: Decimal::from_str(years).unwrap(),
            base_salary: Decimal::from(1_000_000),
            is_active: true,
        })
    }

    #[test]
    fn test_valid_ladder() {
        let grades = vec![grade("G1", 1, "0"), grade("G2", 2, "2"), grade("G3", 3, "5")];
        assert!(validate_ladder(&grades).is_ok());
    }

    #[test]
    fn test_ladder_order_independent_of_input_order() {
        let grades = vec![grade("G3", 3, "5"), grade("G1", 1, "0"), grade("G2", 2, "2")];
        assert!(validate_ladder(&grades).is_ok());
    }

    #[test]
    fn test_duplicate_level_rejected() {
        let grades = vec![grade("G1", 1, "0"), grade("G1b", 1, "2")];
        match validate_ladder(&grades) {
            Err(EngineError::Validation { field, .. }) => assert_eq!(field, "level"),
            other => panic!("Expected level validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_increasing_years_rejected() {
        let grades = vec![grade("G1", 1, "3"), grade("G2", 2, "3")];
        match validate_ladder(&grades) {
            Err(EngineError::Validation { field, .. }) => assert_eq!(field, "minYearsOfService"),
            other => panic!("Expected tenure validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let grades = vec![grade("G1", 1, "0"), grade("G1", 2, "2")];
        match validate_ladder(&grades) {
            Err(EngineError::Validation { field, .. }) => assert_eq!(field, "code"),
            other => panic!("Expected code validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_base_rejected() {
        let mut g = grade("G1", 1, "0");
        g.base_salary = Decimal::from(-1);
        assert!(validate_ladder(&[g]).is_err());
    }
}
