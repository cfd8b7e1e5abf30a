//! Bounds and checked arithmetic for monetary amounts.
//!
//! Every sum the engine stores goes through these helpers, so an overflow
//! surfaces as [`EngineError::Validation`] instead of a panic.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

/// Largest absolute monetary value accepted from callers (10^15).
pub fn max_amount() -> Decimal {
    Decimal::from(1_000_000_000_000_000_i64)
}

/// Largest percentage a rule may carry.
pub fn max_percentage() -> Decimal {
    Decimal::from(1_000)
}

/// Rejects `value` if its magnitude exceeds [`max_amount`].
pub fn check_amount(field: &str, value: Decimal) -> EngineResult<()> {
    if value.abs() > max_amount() {
        return Err(EngineError::validation(
            field,
            format!("magnitude must not exceed {}", max_amount()),
        ));
    }
    Ok(())
}

/// The error for a computation that left the representable range.
pub fn out_of_range(field: &str) -> EngineError {
    EngineError::validation(field, "result is out of range")
}

/// Sums `values`, failing instead of overflowing.
pub fn checked_total<I>(field: &str, values: I) -> EngineResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |total, value| total.checked_add(value))
        .ok_or_else(|| out_of_range(field))
}

/// Returns `base + bonus - deduction`, failing instead of overflowing.
pub fn net_salary(base: Decimal, bonus: Decimal, deduction: Decimal) -> EngineResult<Decimal> {
    base.checked_add(bonus)
        .and_then(|gross| gross.checked_sub(deduction))
        .ok_or_else(|| out_of_range("finalSalary"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_total_overflow_is_error() {
        let result = checked_total("bonus", [Decimal::MAX, Decimal::ONE]);
        assert!(matches!(result, Err(EngineError::Validation { .. })));
    }

    #[test]
    fn test_net_salary() {
        let net = net_salary(Decimal::from(1000), Decimal::from(50), Decimal::from(200)).unwrap();
        assert_eq!(net, Decimal::from(850));
        assert!(net_salary(Decimal::MIN, Decimal::ZERO, Decimal::ONE).is_err());
    }

    #[test]
    fn test_check_amount_bounds() {
        assert!(check_amount("amount", max_amount()).is_ok());
        assert!(check_amount("amount", -max_amount()).is_ok());
        assert!(check_amount("amount", max_amount() + Decimal::ONE).is_err());
    }
}
