//! Money bounds
//!
//! Every amount a client can send is capped, so sums over a bounded number
//! of lines stay far from `Decimal::MAX`. Server-side arithmetic still uses
//! the `checked_*` forms and reports overflow as an error.

use rust_decimal::Decimal;

/// 单价上限 (菜品 / 加料 / 折扣): 1,000,000.00
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// 结账折扣与税额上限: 1,000,000,000.00
pub const MAX_ADJUSTMENT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// `0 <= amount <= max`
pub fn within_bounds(amount: Decimal, max: Decimal) -> bool {
    !amount.is_sign_negative() && amount <= max
}

/// `Σ amounts`, `None` on overflow
pub fn checked_sum<I: IntoIterator<Item = Decimal>>(amounts: I) -> Option<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(within_bounds(Decimal::ZERO, MAX_PRICE));
        assert!(within_bounds(MAX_PRICE, MAX_PRICE));
        assert!(!within_bounds(MAX_PRICE + Decimal::new(1, 2), MAX_PRICE));
        assert!(!within_bounds(Decimal::new(-1, 2), MAX_PRICE));
        assert_eq!(MAX_PRICE, Decimal::new(1_000_000, 0));
    }

    #[test]
    fn test_checked_sum_overflow() {
        assert_eq!(
            checked_sum([Decimal::new(6000, 2), Decimal::new(4000, 2)]),
            Some(Decimal::new(10000, 2))
        );
        assert_eq!(checked_sum([Decimal::MAX, Decimal::ONE]), None);
        assert_eq!(checked_sum(std::iter::empty()), Some(Decimal::ZERO));
    }
}
