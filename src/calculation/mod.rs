//! Pure calculation logic for the payroll engine.
//!
//! This module contains the side-effect-free parts of payroll: evaluating
//! bonus/deduction rules against a base salary and attendance facts, and
//! measuring tenure to find the grade an employee is eligible for.

mod rule_engine;
mod tenure;

pub use rule_engine::{RuleEvaluation, RuleSnapshot, apply_rules, trigger_fires};
pub use tenure::{days_per_year, eligible_grade, years_of_service};
