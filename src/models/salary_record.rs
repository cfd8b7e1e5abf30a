//! Salary record model.
//!
//! A [`SalaryRecord`] is the computed pay for one employee and one month. It
//! keeps a frozen copy of the line items that produced it so later rule edits
//! never change a stored breakdown.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::{check_amount, checked_total, net_salary, out_of_range};
use super::{AmountKind, AttendanceFacts, PeriodKey, RuleKind};
use crate::error::EngineResult;

/// Lifecycle status of a salary record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryStatus {
    /// Calculated, awaiting review. Can be recalculated.
    Pending,
    /// Approved for payment. Still adjustable.
    Approved,
    /// Paid out. Immutable.
    Paid,
    /// Rejected during review. Superseded by the next calculation.
    Rejected,
}

impl SalaryStatus {
    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            SalaryStatus::Pending => "pending",
            SalaryStatus::Approved => "approved",
            SalaryStatus::Paid => "paid",
            SalaryStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for SalaryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bonus or deduction contributed by a single rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// The rule that produced this item.
    pub rule_id: Uuid,
    /// The rule's name at calculation time.
    pub rule_name: String,
    /// Bonus or deduction.
    #[serde(rename = "type")]
    pub kind: RuleKind,
    /// Fixed sum or percentage of base.
    pub basis: AmountKind,
    /// The configured value (sum or percentage).
    pub rate: Decimal,
    /// The money contributed.
    pub amount: Decimal,
}

/// An approved advance folded into a record's deductions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceDeduction {
    /// The advance that was netted out.
    pub advance_id: Uuid,
    /// The advance amount.
    pub amount: Decimal,
}

/// Additive corrections to a record's components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentDelta {
    /// Added to base salary.
    #[serde(default)]
    pub base_adjustment: Decimal,
    /// Added to the bonus total.
    #[serde(default)]
    pub bonus_adjustment: Decimal,
    /// Added to the deduction total.
    #[serde(default)]
    pub deduction_adjustment: Decimal,
}

impl AdjustmentDelta {
    /// Returns true if every component is zero.
    pub fn is_zero(&self) -> bool {
        self.base_adjustment.is_zero()
            && self.bonus_adjustment.is_zero()
            && self.deduction_adjustment.is_zero()
    }

    /// Rejects components whose magnitude exceeds the accepted money range.
    pub fn validate(&self) -> EngineResult<()> {
        check_amount("baseAdjustment", self.base_adjustment)?;
        check_amount("bonusAdjustment", self.bonus_adjustment)?;
        check_amount("deductionAdjustment", self.deduction_adjustment)
    }

    /// Adds two deltas component-wise, failing instead of overflowing.
    pub fn checked_add(&self, other: &AdjustmentDelta) -> EngineResult<AdjustmentDelta> {
        let add = |field: &str, a: Decimal, b: Decimal| {
            a.checked_add(b).ok_or_else(|| out_of_range(field))
        };
        Ok(AdjustmentDelta {
            base_adjustment: add("baseAdjustment", self.base_adjustment, other.base_adjustment)?,
            bonus_adjustment: add("bonusAdjustment", self.bonus_adjustment, other.bonus_adjustment)?,
            deduction_adjustment: add(
                "deductionAdjustment",
                self.deduction_adjustment,
                other.deduction_adjustment,
            )?,
        })
    }
}

/// The inputs a calculation run writes onto a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculatedPay {
    /// Base salary from the employee's grade.
    pub base_salary: Decimal,
    /// Code of the grade the base came from.
    pub grade_code: String,
    /// Rule line items in evaluation order.
    pub line_items: Vec<LineItem>,
    /// Advances newly consumed by this run.
    pub new_advances: Vec<AdvanceDeduction>,
    /// Attendance facts the rules were evaluated against.
    pub facts: AttendanceFacts,
    /// When the rule snapshot was taken.
    pub rules_snapshot_at: DateTime<Utc>,
}

impl CalculatedPay {
    fn rule_total(&self, kind: RuleKind) -> EngineResult<Decimal> {
        let field = match kind {
            RuleKind::Bonus => "bonus",
            RuleKind::Deduction => "deduction",
        };
        checked_total(
            field,
            self.line_items
                .iter()
                .filter(|item| item.kind == kind)
                .map(|item| item.amount),
        )
    }
}

/// The computed pay for one employee and month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRecord {
    /// Unique identifier.
    pub id: Uuid,
    /// The employee.
    pub user_id: Uuid,
    /// Calendar month.
    pub month: u32,
    /// Calendar year.
    pub year: i32,
    /// Grade the base salary came from.
    pub grade_code: String,
    /// Base salary including base adjustments.
    pub base_salary: Decimal,
    /// Total bonuses including bonus adjustments.
    pub bonus: Decimal,
    /// Total deductions including advances and deduction adjustments.
    pub deduction: Decimal,
    /// `base_salary + bonus - deduction`.
    pub final_salary: Decimal,
    /// Lifecycle status.
    pub status: SalaryStatus,
    /// Reason given when rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    /// Frozen rule line items.
    pub line_items: Vec<LineItem>,
    /// Advances netted out of this record.
    pub advance_deductions: Vec<AdvanceDeduction>,
    /// Running total of manual adjustments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_adjustment: Option<AdjustmentDelta>,
    /// Attendance facts used by the last calculation.
    pub facts: AttendanceFacts,
    /// When the rules used by the last calculation were captured.
    pub rules_snapshot_at: DateTime<Utc>,
    /// When the record was last calculated.
    pub calculated_at: DateTime<Utc>,
    /// Who approved, rejected or paid the record last.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    /// When the record was approved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    /// When the record was marked paid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
}

impl SalaryRecord {
    /// Creates a pending record from a calculation run.
    pub fn pending(key: PeriodKey, pay: CalculatedPay, now: DateTime<Utc>) -> EngineResult<Self> {
        let mut record = SalaryRecord {
            id: Uuid::new_v4(),
            user_id: key.user_id,
            month: key.month,
            year: key.year,
            grade_code: String::new(),
            base_salary: Decimal::ZERO,
            bonus: Decimal::ZERO,
            deduction: Decimal::ZERO,
            final_salary: Decimal::ZERO,
            status: SalaryStatus::Pending,
            rejection_reason: None,
            line_items: Vec::new(),
            advance_deductions: Vec::new(),
            applied_adjustment: None,
            facts: AttendanceFacts::default(),
            rules_snapshot_at: pay.rules_snapshot_at,
            calculated_at: now,
            reviewed_by: None,
            approved_at: None,
            paid_at: None,
        };
        record.apply_calculation(pay, now)?;
        Ok(record)
    }

    /// Returns the period this record belongs to.
    pub fn key(&self) -> PeriodKey {
        PeriodKey {
            user_id: self.user_id,
            year: self.year,
            month: self.month,
        }
    }

    /// Overwrites the calculated figures, keeping previously consumed
    /// advances and the running adjustment total.
    ///
    /// Every figure is computed before any field is written, so on error the
    /// record is unchanged.
    pub fn apply_calculation(&mut self, pay: CalculatedPay, now: DateTime<Utc>) -> EngineResult<()> {
        let adjustment = self.applied_adjustment.unwrap_or_default();
        let rule_bonus = pay.rule_total(RuleKind::Bonus)?;
        let rule_deduction = pay.rule_total(RuleKind::Deduction)?;
        let advances = checked_total(
            "deduction",
            self.advance_deductions
                .iter()
                .chain(&pay.new_advances)
                .map(|a| a.amount),
        )?;

        let base_salary = checked_total("baseSalary", [pay.base_salary, adjustment.base_adjustment])?;
        let bonus = checked_total("bonus", [rule_bonus, adjustment.bonus_adjustment])?;
        let deduction = checked_total(
            "deduction",
            [rule_deduction, advances, adjustment.deduction_adjustment],
        )?;
        let final_salary = net_salary(base_salary, bonus, deduction)?;

        self.advance_deductions.extend(pay.new_advances);
        self.grade_code = pay.grade_code;
        self.base_salary = base_salary;
        self.bonus = bonus;
        self.deduction = deduction;
        self.final_salary = final_salary;
        self.line_items = pay.line_items;
        self.facts = pay.facts;
        self.rules_snapshot_at = pay.rules_snapshot_at;
        self.calculated_at = now;
        Ok(())
    }

    /// Adds an adjustment on top of the current figures.
    ///
    /// On error the record is unchanged.
    pub fn apply_adjustment(&mut self, delta: AdjustmentDelta) -> EngineResult<()> {
        let applied = self
            .applied_adjustment
            .unwrap_or_default()
            .checked_add(&delta)?;
        let base_salary = checked_total("baseSalary", [self.base_salary, delta.base_adjustment])?;
        let bonus = checked_total("bonus", [self.bonus, delta.bonus_adjustment])?;
        let deduction = checked_total("deduction", [self.deduction, delta.deduction_adjustment])?;
        let final_salary = net_salary(base_salary, bonus, deduction)?;

        self.base_salary = base_salary;
        self.bonus = bonus;
        self.deduction = deduction;
        self.final_salary = final_salary;
        self.applied_adjustment = Some(applied);
        Ok(())
    }

    /// Returns true if `final_salary == base_salary + bonus - deduction`.
    pub fn is_balanced(&self) -> bool {
        net_salary(self.base_salary, self.bonus, self.deduction)
            .is_ok_and(|net| net == self.final_salary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line_item(kind: RuleKind, amount: &str) -> LineItem {
        LineItem {
            rule_id: Uuid::new_v4(),
            rule_name: "rule".to_string(),
            kind,
            basis: AmountKind::Fixed,
            rate: dec(amount),
            amount: dec(amount),
        }
    }

    fn pay(base: &str, items: Vec<LineItem>, advances: Vec<AdvanceDeduction>) -> CalculatedPay {
        CalculatedPay {
            base_salary: dec(base),
            grade_code: "G1".to_string(),
            line_items: items,
            new_advances: advances,
            facts: AttendanceFacts::default(),
            rules_snapshot_at: Utc::now(),
        }
    }

    fn key() -> PeriodKey {
        PeriodKey::new(Uuid::new_v4(), 3, 2026).unwrap()
    }

    #[test]
    fn test_pending_record_sums_line_items() {
        let record = SalaryRecord::pending(
            key(),
            pay(
                "10000000",
                vec![
                    line_item(RuleKind::Bonus, "500000"),
                    line_item(RuleKind::Deduction, "200000"),
                ],
                vec![],
            ),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(record.status, SalaryStatus::Pending);
        assert_eq!(record.bonus, dec("500000"));
        assert_eq!(record.deduction, dec("200000"));
        assert_eq!(record.final_salary, dec("10300000"));
        assert!(record.is_balanced());
    }

    #[test]
    fn test_advances_count_as_deductions() {
        let advance = AdvanceDeduction {
            advance_id: Uuid::new_v4(),
            amount: dec("1000000"),
        };
        let record = SalaryRecord::pending(key(), pay("5000000", vec![], vec![advance]), Utc::now()).unwrap();

        assert_eq!(record.deduction, dec("1000000"));
        assert_eq!(record.final_salary, dec("4000000"));
    }

    #[test]
    fn test_recalculation_keeps_consumed_advances_and_adjustments() {
        let advance = AdvanceDeduction {
            advance_id: Uuid::new_v4(),
            amount: dec("300"),
        };
        let mut record = SalaryRecord::pending(key(), pay("1000", vec![], vec![advance]), Utc::now()).unwrap();
        record.apply_adjustment(AdjustmentDelta {
            base_adjustment: dec("100"),
            ..AdjustmentDelta::default()
        })
        .unwrap();
        assert_eq!(record.final_salary, dec("800"));

        record.apply_calculation(pay("1000", vec![], vec![]), Utc::now()).unwrap();

        assert_eq!(record.advance_deductions.len(), 1);
        assert_eq!(record.base_salary, dec("1100"));
        assert_eq!(record.deduction, dec("300"));
        assert_eq!(record.final_salary, dec("800"));
    }

    #[test]
    fn test_adjustments_accumulate() {
        let mut record = SalaryRecord::pending(key(), pay("1000", vec![], vec![]), Utc::now()).unwrap();
        record.apply_adjustment(AdjustmentDelta {
            base_adjustment: dec("100"),
            ..AdjustmentDelta::default()
        })
        .unwrap();
        record.apply_adjustment(AdjustmentDelta {
            base_adjustment: dec("50"),
            deduction_adjustment: dec("20"),
            ..AdjustmentDelta::default()
        })
        .unwrap();

        assert_eq!(record.base_salary, dec("1150"));
        assert_eq!(record.deduction, dec("20"));
        assert_eq!(record.final_salary, dec("1130"));
        let applied = record.applied_adjustment.unwrap();
        assert_eq!(applied.base_adjustment, dec("150"));
        assert_eq!(applied.deduction_adjustment, dec("20"));
    }

    #[test]
    fn test_overflowing_adjustment_leaves_record_unchanged() {
        let mut record =
            SalaryRecord::pending(key(), pay("10000000", vec![], vec![]), Utc::now()).unwrap();
        let before = record.clone();
        let huge = Decimal::MAX - Decimal::ONE;

        let result = record.apply_adjustment(AdjustmentDelta {
            base_adjustment: huge,
            bonus_adjustment: huge,
            ..AdjustmentDelta::default()
        });

        assert!(matches!(result, Err(EngineError::Validation { .. })));
        assert_eq!(record, before);
        assert!(record.is_balanced());
    }

    #[test]
    fn test_overflowing_recalculation_leaves_record_unchanged() {
        let mut record =
            SalaryRecord::pending(key(), pay("1000", vec![], vec![]), Utc::now()).unwrap();
        let before = record.clone();

        let result = record.apply_calculation(
            pay(
                "1",
                vec![
                    line_item(RuleKind::Bonus, &Decimal::MAX.to_string()),
                    line_item(RuleKind::Bonus, "1"),
                ],
                vec![],
            ),
            Utc::now(),
        );

        assert!(result.is_err());
        assert_eq!(record, before);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&SalaryStatus::Approved).unwrap(),
            "\"approved\""
        );
        assert_eq!(SalaryStatus::Paid.to_string(), "paid");
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = SalaryRecord::pending(key(), pay("1000", vec![], vec![]), Utc::now()).unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["finalSalary"], "1000");
        assert_eq!(json["status"], "pending");
        assert!(json.get("rejectionReason").is_none());
        assert!(json.get("appliedAdjustment").is_none());
    }
}
