//! Configuration loading and management for the payroll engine.
//!
//! This module loads the engine settings, initial salary rules, the grade
//! ladder and the employee directory seed from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("{} grades configured", config.config().grades().len());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    ApiToken, EmployeeSeed, EmployeesFile, EngineSettings, GradesFile, PayrollConfig,
    PayrollSettings, RulesFile, ServerSettings,
};
