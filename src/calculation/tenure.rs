//! Tenure and grade eligibility.
//!
//! Years of service are measured in whole days divided by the mean
//! Gregorian year length, so a leap day never shifts an employee across a
//! threshold early.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::SalaryGrade;

/// Mean days per year used to convert days of service into years.
pub fn days_per_year() -> Decimal {
    Decimal::new(36525, 2)
}

/// Returns fractional years of service from `hire_date` to `as_of`.
///
/// Returns `None` if `hire_date` is after `as_of`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use payroll_engine::calculation::years_of_service;
/// use rust_decimal::Decimal;
///
/// let hired = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
/// let today = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
/// assert_eq!(years_of_service(hired, today), Some(Decimal::ZERO));
/// ```
pub fn years_of_service(hire_date: NaiveDate, as_of: NaiveDate) -> Option<Decimal> {
    let days = (as_of - hire_date).num_days();
    if days < 0 {
        return None;
    }
    Some(Decimal::from(days) / days_per_year())
}

/// Finds the highest-level active grade whose tenure requirement is met.
pub fn eligible_grade(tenure: Decimal, grades: &[SalaryGrade]) -> Option<&SalaryGrade> {
    grades
        .iter()
        .filter(|g| g.is_active && g.min_years_of_service <= tenure)
        .max_by_key(|g| g.level)
}
