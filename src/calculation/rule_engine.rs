//! Rule evaluation.
//!
//! [`apply_rules`] turns a base salary, the period's attendance facts and a
//! rule snapshot into an ordered list of line items. It is a pure function:
//! identical inputs always produce identical output, which is what makes
//! recalculation of a pending record idempotent. Arithmetic is checked, so
//! amounts too large to represent come back as a validation error.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::EngineResult;
use crate::models::{AttendanceFacts, LineItem, RuleKind, SalaryRule, TriggerKind, out_of_range};

/// The rule set captured at a point in time.
///
/// Calculations read rules only through a snapshot, so editing or deleting a
/// rule afterwards never changes a stored breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSnapshot {
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
    /// Rules in creation order.
    pub rules: Vec<SalaryRule>,
}

impl RuleSnapshot {
    /// Creates a snapshot of `rules` taken at `taken_at`.
    pub fn new(taken_at: DateTime<Utc>, rules: Vec<SalaryRule>) -> Self {
        Self { taken_at, rules }
    }
}

/// The outcome of evaluating a rule snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleEvaluation {
    /// One line item per fired rule, in rule order.
    pub line_items: Vec<LineItem>,
    /// Sum of bonus line items.
    pub bonus_total: Decimal,
    /// Sum of deduction line items.
    pub deduction_total: Decimal,
}

/// Returns true if `rule`'s trigger holds for `facts`.
///
/// Custom triggers always fire. Count-based triggers fire when the matching
/// fact reaches the rule's threshold; full attendance fires when there were
/// no late arrivals and no absences.
pub fn trigger_fires(rule: &SalaryRule, facts: &AttendanceFacts) -> bool {
    let threshold = rule.trigger_threshold;
    match rule.trigger_kind {
        TriggerKind::Custom => true,
        TriggerKind::LateArrival => facts.late_count >= threshold,
        TriggerKind::Absence => facts.absence_count >= threshold,
        TriggerKind::Leave => facts.leave_days >= threshold,
        TriggerKind::FullAttendance => facts.late_count == 0 && facts.absence_count == 0,
    }
}

/// Evaluates every active rule of `snapshot` against `base_salary` and `facts`.
///
/// Percentage rules are always computed against `base_salary`, never
/// against a running total.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use payroll_engine::calculation::{RuleSnapshot, apply_rules};
/// use payroll_engine::models::{
///     AttendanceFacts, RuleAmount, RuleDefinition, RuleKind, SalaryRule, TriggerKind,
/// };
/// use rust_decimal::Decimal;
///
/// let definition = |kind, amount| RuleDefinition {
///     kind,
///     name: "rule".to_string(),
///     description: String::new(),
///     amount,
///     trigger_kind: TriggerKind::Custom,
///     trigger_threshold: 1,
///     is_active: true,
/// };
/// let now = Utc::now();
/// let snapshot = RuleSnapshot::new(
///     now,
///     vec![
///         SalaryRule::from_definition(
///             definition(RuleKind::Bonus, RuleAmount::Fixed(Decimal::from(500_000))),
///             now,
///         ),
///         SalaryRule::from_definition(
///             definition(RuleKind::Deduction, RuleAmount::Percentage(Decimal::from(2))),
///             now,
///         ),
///     ],
/// );
///
/// let result =
///     apply_rules(Decimal::from(10_000_000), &AttendanceFacts::default(), &snapshot).unwrap();
/// assert_eq!(result.bonus_total, Decimal::from(500_000));
/// assert_eq!(result.deduction_total, Decimal::from(200_000));
/// ```
pub fn apply_rules(
    base_salary: Decimal,
    facts: &AttendanceFacts,
    snapshot: &RuleSnapshot,
) -> EngineResult<RuleEvaluation> {
    let mut line_items = Vec::new();
    let mut bonus_total = Decimal::ZERO;
    let mut deduction_total = Decimal::ZERO;

    for rule in snapshot.rules.iter().filter(|r| r.is_active) {
        if !trigger_fires(rule, facts) {
            debug!(rule_id = %rule.id, rule = %rule.name, "Rule trigger did not fire");
            continue;
        }

        let amount = rule.amount.contribution(base_salary)?;
        match rule.kind {
            RuleKind::Bonus => {
                bonus_total = bonus_total
                    .checked_add(amount)
                    .ok_or_else(|| out_of_range("bonus"))?;
            }
            RuleKind::Deduction => {
                deduction_total = deduction_total
                    .checked_add(amount)
                    .ok_or_else(|| out_of_range("deduction"))?;
            }
        }

        line_items.push(LineItem {
            rule_id: rule.id,
            rule_name: rule.name.clone(),
            kind: rule.kind,
            basis: rule.amount.kind(),
            rate: rule.amount.value(),
            amount,
        });
    }

    Ok(RuleEvaluation {
        line_items,
        bonus_total,
        deduction_total,
    })
}
