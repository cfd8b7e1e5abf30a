//! Salary rule model.
//!
//! A rule is either a bonus or a deduction, and its amount is either a fixed
//! sum or a percentage of the record's base salary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::{check_amount, max_percentage, out_of_range};
use crate::error::{EngineError, EngineResult};

/// Whether a rule adds to or subtracts from the salary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Adds to the bonus total.
    Bonus,
    /// Adds to the deduction total.
    Deduction,
}

/// How a rule's amount is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountKind {
    /// The amount is paid or withheld as-is.
    Fixed,
    /// The amount is a percentage of the base salary.
    Percentage,
}

/// The amount carried by a rule, tagged by how it is applied.
///
/// Serialized as `{"amountKind": "...", "amount": "..."}` next to the
/// other rule fields.
///
/// # Example
///
/// ```
/// use payroll_engine::models::RuleAmount;
/// use rust_decimal::Decimal;
///
/// let amount = RuleAmount::Percentage(Decimal::new(75, 1)); // 7.5%
/// assert_eq!(
///     amount.contribution(Decimal::new(1_000_000, 0)).unwrap(),
///     Decimal::new(75_000, 0)
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "amountKind", content = "amount", rename_all = "snake_case")]
pub enum RuleAmount {
    /// A fixed sum.
    Fixed(Decimal),
    /// A percentage of base salary (`7.5` means 7.5%).
    Percentage(Decimal),
}

impl RuleAmount {
    /// Returns the kind of amount.
    pub fn kind(&self) -> AmountKind {
        match self {
            RuleAmount::Fixed(_) => AmountKind::Fixed,
            RuleAmount::Percentage(_) => AmountKind::Percentage,
        }
    }

    /// Returns the configured value (a sum or a percentage).
    pub fn value(&self) -> Decimal {
        match self {
            RuleAmount::Fixed(value) | RuleAmount::Percentage(value) => *value,
        }
    }

    /// Computes the money this amount contributes against `base_salary`.
    ///
    /// Fails with [`EngineError::Validation`] if the result is not
    /// representable.
    pub fn contribution(&self, base_salary: Decimal) -> EngineResult<Decimal> {
        match self {
            RuleAmount::Fixed(value) => Ok(*value),
            RuleAmount::Percentage(rate) => base_salary
                .checked_mul(*rate)
                .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
                .ok_or_else(|| out_of_range("amount")),
        }
    }
}

/// The attendance fact a rule is conditioned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Always fires.
    #[default]
    Custom,
    /// Fires when late arrivals reach the threshold.
    LateArrival,
    /// Fires when absences reach the threshold.
    Absence,
    /// Fires when leave days reach the threshold.
    Leave,
    /// Fires when there were no late arrivals and no absences.
    FullAttendance,
}

fn default_threshold() -> u32 {
    1
}

fn default_active() -> bool {
    true
}

/// The user-editable part of a rule, used for creation and updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDefinition {
    /// Bonus or deduction.
    #[serde(rename = "type")]
    pub kind: RuleKind,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// The amount and how it applies.
    #[serde(flatten)]
    pub amount: RuleAmount,
    /// The fact that gates this rule.
    #[serde(default)]
    pub trigger_kind: TriggerKind,
    /// Minimum fact count for count-based triggers.
    #[serde(default = "default_threshold")]
    pub trigger_threshold: u32,
    /// Inactive rules are kept but never evaluated.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl RuleDefinition {
    /// Checks the definition's invariants.
    pub fn validate(&self) -> EngineResult<()> {
        if self.name.trim().is_empty() {
            return Err(EngineError::validation("name", "must not be empty"));
        }
        if self.amount.value() < Decimal::ZERO {
            return Err(EngineError::validation("amount", "must not be negative"));
        }
        match self.amount {
            RuleAmount::Fixed(value) => check_amount("amount", value),
            RuleAmount::Percentage(rate) if rate > max_percentage() => Err(EngineError::validation(
                "amount",
                format!("percentage must not exceed {}", max_percentage()),
            )),
            RuleAmount::Percentage(_) => Ok(()),
        }
    }
}

/// A configured bonus or deduction rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRule {
    /// Unique identifier.
    pub id: Uuid,
    /// Bonus or deduction.
    #[serde(rename = "type")]
    pub kind: RuleKind,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// The amount and how it applies.
    #[serde(flatten)]
    pub amount: RuleAmount,
    /// The fact that gates this rule.
    pub trigger_kind: TriggerKind,
    /// Minimum fact count for count-based triggers.
    pub trigger_threshold: u32,
    /// Inactive rules are kept but never evaluated.
    pub is_active: bool,
    /// When the rule was created.
    pub created_at: DateTime<Utc>,
    /// When the rule was last modified.
    pub updated_at: DateTime<Utc>,
}

impl SalaryRule {
    /// Creates a rule from a validated definition.
    pub fn from_definition(definition: RuleDefinition, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: definition.kind,
            name: definition.name,
            description: definition.description,
            amount: definition.amount,
            trigger_kind: definition.trigger_kind,
            trigger_threshold: definition.trigger_threshold,
            is_active: definition.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the editable fields, keeping identity and creation time.
    pub fn apply_definition(&mut self, definition: RuleDefinition, now: DateTime<Utc>) {
        self.kind = definition.kind;
        self.name = definition.name;
        self.description = definition.description;
        self.amount = definition.amount;
        self.trigger_kind = definition.trigger_kind;
        self.trigger_threshold = definition.trigger_threshold;
        self.is_active = definition.is_active;
        self.updated_at = now;
    }
}
