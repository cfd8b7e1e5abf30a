//! Storage for the salary grade ladder.

use parking_lot::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{GradeDefinition, SalaryGrade, validate_ladder};

/// The grade ladder. Every mutation is checked against the whole ladder
/// before it is committed.
#[derive(Debug, Default)]
pub struct GradeBook {
    grades: RwLock<Vec<SalaryGrade>>,
}

impl GradeBook {
    /// Creates a grade book from `definitions`.
    pub fn from_definitions(definitions: &[GradeDefinition]) -> EngineResult<Self> {
        let grades: Vec<SalaryGrade> = definitions
            .iter()
            .cloned()
            .map(SalaryGrade::from_definition)
            .collect();
        validate_ladder(&grades)?;
        Ok(Self {
            grades: RwLock::new(grades),
        })
    }

    /// Returns every grade ordered by level.
    pub fn list(&self) -> Vec<SalaryGrade> {
        let mut grades = self.grades.read().clone();
        grades.sort_by_key(|g| g.level);
        grades
    }

    /// Returns one grade.
    pub fn get(&self, id: Uuid) -> EngineResult<SalaryGrade> {
        self.grades
            .read()
            .iter()
            .find(|g| g.id == id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("salary grade", id))
    }

    /// Returns the grade with `code`.
    pub fn by_code(&self, code: &str) -> EngineResult<SalaryGrade> {
        self.grades
            .read()
            .iter()
            .find(|g| g.code == code)
            .cloned()
            .ok_or_else(|| EngineError::not_found("salary grade", code))
    }

    /// Adds a grade to the ladder.
    pub fn create(&self, definition: GradeDefinition) -> EngineResult<SalaryGrade> {
        let grade = SalaryGrade::from_definition(definition);
        let mut grades = self.grades.write();
        let mut candidate = grades.clone();
        candidate.push(grade.clone());
        validate_ladder(&candidate)?;
        *grades = candidate;
        info!(grade_id = %grade.id, code = %grade.code, level = grade.level, "Salary grade created");
        Ok(grade)
    }

    /// Replaces a grade's editable fields.
    pub fn update(&self, id: Uuid, definition: GradeDefinition) -> EngineResult<SalaryGrade> {
        let mut grades = self.grades.write();
        let mut candidate = grades.clone();
        let grade = candidate
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| EngineError::not_found("salary grade", id))?;
        grade.apply_definition(definition);
        let updated = grade.clone();
        validate_ladder(&candidate)?;
        *grades = candidate;
        info!(grade_id = %id, code = %updated.code, "Salary grade updated");
        Ok(updated)
    }

    /// Runs `f` against grade `id` while holding the ladder's read lock, so
    /// the grade cannot be deleted until `f` returns.
    pub fn with_grade<T, F>(&self, id: Uuid, f: F) -> EngineResult<T>
    where
        F: FnOnce(&SalaryGrade) -> EngineResult<T>,
    {
        let grades = self.grades.read();
        let grade = grades
            .iter()
            .find(|g| g.id == id)
            .ok_or_else(|| EngineError::not_found("salary grade", id))?;
        f(grade)
    }

    /// Removes a grade from the ladder unless `in_use` reports it held.
    ///
    /// `in_use` runs under the write lock, so no [`GradeBook::with_grade`]
    /// caller can hand the grade out between the check and the removal.
    pub fn delete_unused<F>(&self, id: Uuid, in_use: F) -> EngineResult<SalaryGrade>
    where
        F: FnOnce(Uuid) -> bool,
    {
        let mut grades = self.grades.write();
        let position = grades
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| EngineError::not_found("salary grade", id))?;
        if in_use(id) {
            return Err(EngineError::validation(
                "gradeId",
                format!("grade {} is assigned to employees", grades[position].code),
            ));
        }
        let removed = grades.remove(position);
        info!(grade_id = %id, code = %removed.code, "Salary grade deleted");
        Ok(removed)
    }
}
