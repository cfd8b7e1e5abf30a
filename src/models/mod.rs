//! Core data models for the payroll engine.

mod actor;
mod adjustment;
mod advance;
mod attendance;
mod employee;
mod grade;
mod money;
mod rule;
mod salary_record;

pub use actor::{Actor, Capability, Role};
pub use adjustment::Adjustment;
pub use advance::{AdvanceAction, AdvanceStatus, SalaryAdvance};
pub use attendance::{AttendanceFacts, PeriodKey};
pub use employee::Employee;
pub use grade::{GradeDefinition, SalaryGrade, validate_ladder};
pub use money::{check_amount, checked_total, max_amount, max_percentage, net_salary, out_of_range};
pub use rule::{AmountKind, RuleAmount, RuleDefinition, RuleKind, SalaryRule, TriggerKind};
pub use salary_record::{
    AdjustmentDelta, AdvanceDeduction, CalculatedPay, LineItem, SalaryRecord, SalaryStatus,
};
