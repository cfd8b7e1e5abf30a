//! Property-based tests for the payroll engine.
//!
//! These tests verify invariants that hold for any rule set, attendance
//! summary and sequence of adjustments.

use chrono::Utc;
use payroll_engine::calculation::{RuleSnapshot, apply_rules, trigger_fires};
use payroll_engine::config::ConfigLoader;
use payroll_engine::engine::PayrollEngine;
use payroll_engine::models::{
    Actor, AdjustmentDelta, AttendanceFacts, CalculatedPay, PeriodKey, Role, RuleAmount,
    RuleDefinition, RuleKind, SalaryRecord, SalaryRule, TriggerKind,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

const AN: &str = "11111111-1111-4111-8111-111111111111";

// =============================================================================
// Arbitrary Strategies
// =============================================================================

/// A base salary between 0 and 100,000,000 with up to two decimals.
fn arb_base() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_amount() -> impl Strategy<Value = RuleAmount> {
    prop_oneof![
        (0i64..=5_000_000i64).prop_map(|v| RuleAmount::Fixed(Decimal::from(v))),
        (0i64..=10_000i64).prop_map(|bp| RuleAmount::Percentage(Decimal::new(bp, 2))),
    ]
}

fn arb_trigger() -> impl Strategy<Value = TriggerKind> {
    prop_oneof![
        Just(TriggerKind::Custom),
        Just(TriggerKind::LateArrival),
        Just(TriggerKind::Absence),
        Just(TriggerKind::Leave),
        Just(TriggerKind::FullAttendance),
    ]
}

fn arb_rule() -> impl Strategy<Value = SalaryRule> {
    (
        prop::bool::ANY,
        arb_amount(),
        arb_trigger(),
        0u32..5,
        prop::bool::weighted(0.8),
    )
        .prop_map(|(bonus, amount, trigger_kind, trigger_threshold, is_active)| {
            SalaryRule::from_definition(
                RuleDefinition {
                    kind: if bonus { RuleKind::Bonus } else { RuleKind::Deduction },
                    name: "generated".to_string(),
                    description: String::new(),
                    amount,
                    trigger_kind,
                    trigger_threshold,
                    is_active,
                },
                Utc::now(),
            )
        })
}

fn arb_facts() -> impl Strategy<Value = AttendanceFacts> {
    (0u32..6, 0u32..6, 0u32..6, 0u32..31).prop_map(
        |(late_count, absence_count, leave_days, worked_days)| AttendanceFacts {
            late_count,
            absence_count,
            leave_days,
            worked_days,
        },
    )
}

fn arb_delta() -> impl Strategy<Value = AdjustmentDelta> {
    (-100_000i64..100_000, -100_000i64..100_000, -100_000i64..100_000)
        .prop_filter("at least one non-zero component", |(a, b, c)| {
            *a != 0 || *b != 0 || *c != 0
        })
        .prop_map(|(base, bonus, deduction)| AdjustmentDelta {
            base_adjustment: Decimal::from(base),
            bonus_adjustment: Decimal::from(bonus),
            deduction_adjustment: Decimal::from(deduction),
        })
}

fn create_test_engine() -> PayrollEngine {
    let loader = ConfigLoader::load("./config/default").expect("Failed to load config");
    PayrollEngine::from_config(loader.config()).expect("Failed to build engine")
}

// =============================================================================
// Rule Evaluation
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Same base, facts and snapshot always give the same evaluation.
    #[test]
    fn rule_evaluation_is_deterministic(
        base in arb_base(),
        rules in prop::collection::vec(arb_rule(), 0..8),
        facts in arb_facts(),
    ) {
        let snapshot = RuleSnapshot::new(Utc::now(), rules);

        let first = apply_rules(base, &facts, &snapshot).unwrap();
        let second = apply_rules(base, &facts, &snapshot).unwrap();

        prop_assert_eq!(first, second);
    }

    /// Every line item is computed against the base, never a running total,
    /// and only active rules whose trigger fires contribute.
    #[test]
    fn line_items_match_fired_rules(
        base in arb_base(),
        rules in prop::collection::vec(arb_rule(), 0..8),
        facts in arb_facts(),
    ) {
        let snapshot = RuleSnapshot::new(Utc::now(), rules.clone());
        let evaluation = apply_rules(base, &facts, &snapshot).unwrap();

        let fired: Vec<&SalaryRule> = rules
            .iter()
            .filter(|r| r.is_active && trigger_fires(r, &facts))
            .collect();
        prop_assert_eq!(evaluation.line_items.len(), fired.len());
        for (item, rule) in evaluation.line_items.iter().zip(fired) {
            prop_assert_eq!(item.rule_id, rule.id);
            prop_assert_eq!(item.amount, rule.amount.contribution(base).unwrap());
        }

        let bonus: Decimal = evaluation
            .line_items
            .iter()
            .filter(|i| i.kind == RuleKind::Bonus)
            .map(|i| i.amount)
            .sum();
        prop_assert_eq!(evaluation.bonus_total, bonus);
    }

    /// A freshly calculated record always balances, whatever the rules.
    #[test]
    fn calculated_record_balances(
        base in arb_base(),
        rules in prop::collection::vec(arb_rule(), 0..8),
        facts in arb_facts(),
        deltas in prop::collection::vec(arb_delta(), 0..5),
    ) {
        let now = Utc::now();
        let snapshot = RuleSnapshot::new(now, rules);
        let evaluation = apply_rules(base, &facts, &snapshot).unwrap();
        let key = PeriodKey::new(Uuid::new_v4(), 4, 2026).unwrap();
        let pay = CalculatedPay {
            base_salary: base,
            grade_code: "G1".to_string(),
            line_items: evaluation.line_items,
            new_advances: Vec::new(),
            facts,
            rules_snapshot_at: now,
        };

        let mut record = SalaryRecord::pending(key, pay, now).unwrap();
        prop_assert_eq!(record.bonus, evaluation.bonus_total);
        prop_assert_eq!(record.deduction, evaluation.deduction_total);

        for delta in deltas {
            record.apply_adjustment(delta).unwrap();
            prop_assert_eq!(
                record.final_salary,
                record.base_salary + record.bonus - record.deduction
            );
        }
    }
}

// =============================================================================
// Engine Invariants
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Adjustments accumulate: the final salary moves by the sum of deltas.
    #[test]
    fn adjustments_accumulate(deltas in prop::collection::vec(arb_delta(), 1..6)) {
        let engine = create_test_engine();
        let manager = Actor::new("payroll-manager", Role::Manager);
        let user_id = Uuid::parse_str(AN).unwrap();
        let record = engine.calculate(user_id, 3, 2026, &manager).unwrap();

        let mut expected = record.final_salary;
        let mut total = AdjustmentDelta::default();
        for delta in &deltas {
            expected += delta.base_adjustment + delta.bonus_adjustment - delta.deduction_adjustment;
            total = total.checked_add(delta).unwrap();
            engine.adjust(record.id, *delta, "", &manager).unwrap();
        }

        let adjusted = engine.salary(record.id).unwrap();
        prop_assert_eq!(adjusted.final_salary, expected);
        prop_assert_eq!(adjusted.applied_adjustment, Some(total));
        prop_assert!(adjusted.is_balanced());
        prop_assert_eq!(engine.adjustment_history(record.id).unwrap().len(), deltas.len());
    }

    /// Recalculating a pending record any number of times yields one record
    /// with the same final salary.
    #[test]
    fn recalculation_is_idempotent(times in 1usize..5, late_count in 0u32..6) {
        let engine = create_test_engine();
        let manager = Actor::new("payroll-manager", Role::Manager);
        let user_id = Uuid::parse_str(AN).unwrap();
        engine
            .record_attendance(
                user_id,
                8,
                2026,
                AttendanceFacts { late_count, ..AttendanceFacts::default() },
                &manager,
            )
            .unwrap();

        let first = engine.calculate(user_id, 8, 2026, &manager).unwrap();
        for _ in 0..times {
            let again = engine.calculate(user_id, 8, 2026, &manager).unwrap();
            prop_assert_eq!(again.id, first.id);
            prop_assert_eq!(again.final_salary, first.final_salary);
        }
        prop_assert_eq!(engine.salary_history(user_id, 8, 2026).unwrap().len(), 1);
    }
}
