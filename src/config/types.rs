//! Configuration types for the payroll engine.
//!
//! These are deserialized from the YAML files of a configuration directory.

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{GradeDefinition, Role, RuleDefinition};

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_min_year() -> i32 {
    2000
}

fn default_max_year() -> i32 {
    2100
}

fn default_active() -> bool {
    true
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Socket address the API listens on.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

/// Payroll calculation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PayrollSettings {
    /// Earliest year a salary may be calculated for.
    #[serde(default = "default_min_year")]
    pub min_year: i32,
    /// Latest year a salary may be calculated for.
    #[serde(default = "default_max_year")]
    pub max_year: i32,
}

impl Default for PayrollSettings {
    fn default() -> Self {
        Self {
            min_year: default_min_year(),
            max_year: default_max_year(),
        }
    }
}

/// A bearer token and the actor it authenticates.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiToken {
    /// The secret presented in `Authorization: Bearer <token>`.
    pub token: String,
    /// Actor identifier recorded in audit fields.
    pub actor: String,
    /// The actor's role.
    pub role: Role,
}

/// Contents of `engine.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineSettings {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerSettings,
    /// Payroll calculation settings.
    #[serde(default)]
    pub payroll: PayrollSettings,
    /// Accepted bearer tokens.
    #[serde(default)]
    pub api_tokens: Vec<ApiToken>,
}

/// Contents of `rules.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct RulesFile {
    /// Rules in creation order.
    pub rules: Vec<RuleDefinition>,
}

/// Contents of `grades.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct GradesFile {
    /// The grade ladder.
    pub grades: Vec<GradeDefinition>,
}

/// An employee entry in `employees.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSeed {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// First day of employment.
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
    /// Code of the employee's current grade.
    #[serde(default)]
    pub grade_code: Option<String>,
    /// Inactive employees are skipped by batch jobs.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Contents of `employees.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct EmployeesFile {
    /// The employee directory seed.
    pub employees: Vec<EmployeeSeed>,
}

/// The complete payroll configuration.
#[derive(Debug, Clone)]
pub struct PayrollConfig {
    settings: EngineSettings,
    rules: Vec<RuleDefinition>,
    grades: Vec<GradeDefinition>,
    employees: Vec<EmployeeSeed>,
}

impl PayrollConfig {
    /// Creates a configuration from its component parts.
    pub fn new(
        settings: EngineSettings,
        rules: Vec<RuleDefinition>,
        grades: Vec<GradeDefinition>,
        employees: Vec<EmployeeSeed>,
    ) -> Self {
        Self {
            settings,
            rules,
            grades,
            employees,
        }
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns the initial rules in creation order.
    pub fn rules(&self) -> &[RuleDefinition] {
        &self.rules
    }

    /// Returns the grade ladder.
    pub fn grades(&self) -> &[GradeDefinition] {
        &self.grades
    }

    /// Returns the employee seed.
    pub fn employees(&self) -> &[EmployeeSeed] {
        &self.employees
    }
}
