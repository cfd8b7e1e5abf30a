//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! configuration from YAML files.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, SalaryGrade, validate_ladder};

use super::types::{EmployeesFile, EngineSettings, GradesFile, PayrollConfig, RulesFile};

/// Loads, validates and provides access to payroll configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml     # Server address, year bounds, API tokens
/// ├── rules.yaml      # Salary rules in creation order
/// ├── grades.yaml     # Salary grade ladder
/// └── employees.yaml  # Employee directory seed
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Listening on {}", loader.settings().server.bind_address);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if any file is missing ([`EngineError::ConfigNotFound`]),
    /// contains invalid YAML ([`EngineError::ConfigParseError`]), or
    /// violates an invariant ([`EngineError::InvalidConfig`]).
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("engine.yaml"))?;
        let rules = Self::load_yaml::<RulesFile>(&path.join("rules.yaml"))?;
        let grades = Self::load_yaml::<GradesFile>(&path.join("grades.yaml"))?;
        let employees = Self::load_yaml::<EmployeesFile>(&path.join("employees.yaml"))?;

        Self::from_config(PayrollConfig::new(
            settings,
            rules.rules,
            grades.grades,
            employees.employees,
        ))
    }

    /// Validates an in-memory configuration.
    pub fn from_config(config: PayrollConfig) -> EngineResult<Self> {
        Self::validate(&config).map_err(|err| match err {
            EngineError::InvalidConfig { .. } => err,
            other => EngineError::InvalidConfig {
                message: other.to_string(),
            },
        })?;
        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate(config: &PayrollConfig) -> EngineResult<()> {
        let payroll = &config.settings().payroll;
        if payroll.min_year > payroll.max_year {
            return Err(EngineError::InvalidConfig {
                message: format!(
                    "min_year {} is after max_year {}",
                    payroll.min_year, payroll.max_year
                ),
            });
        }

        let mut tokens = HashSet::new();
        for token in &config.settings().api_tokens {
            if token.token.trim().is_empty() {
                return Err(EngineError::InvalidConfig {
                    message: format!("empty token for actor {}", token.actor),
                });
            }
            if !tokens.insert(token.token.as_str()) {
                return Err(EngineError::InvalidConfig {
                    message: format!("duplicate token for actor {}", token.actor),
                });
            }
        }

        for rule in config.rules() {
            rule.validate()?;
        }

        let grades: Vec<SalaryGrade> = config
            .grades()
            .iter()
            .cloned()
            .map(SalaryGrade::from_definition)
            .collect();
        validate_ladder(&grades)?;

        let mut ids = HashSet::new();
        for employee in config.employees() {
            if !ids.insert(employee.id) {
                return Err(EngineError::InvalidConfig {
                    message: format!("duplicate employee id {}", employee.id),
                });
            }
            if let Some(code) = &employee.grade_code {
                if !grades.iter().any(|g| &g.code == code) {
                    return Err(EngineError::InvalidConfig {
                        message: format!(
                            "employee {} references unknown grade {}",
                            employee.id, code
                        ),
                    });
                }
            }
        }

        Ok(())
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        self.config.settings()
    }

    /// Resolves a bearer token into the actor it authenticates.
    pub fn authenticate(&self, token: &str) -> Option<Actor> {
        self.config
            .settings()
            .api_tokens
            .iter()
            .find(|t| t.token == token)
            .map(|t| Actor::new(t.actor.clone(), t.role))
    }
}
