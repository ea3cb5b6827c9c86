//! Coupon schedules, accrued interest and transaction prices.

pub mod coupon;
pub mod pricing;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Principal repaid at maturity per unit. Prices and cash flows are quoted
/// per this face amount.
pub const PAR: Decimal = Decimal::ONE_HUNDRED;

/// Errors raised by calendar arithmetic.
///
/// With validated inputs none of these should occur; callers treat them as
/// fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("maturity {maturity} is not after settlement {settlement}")]
    MaturityNotAfterSettlement {
        settlement: NaiveDate,
        maturity: NaiveDate,
    },
    #[error("calendar arithmetic produced an invalid date {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },
    #[error("a zero-coupon instrument has no coupon period")]
    NoCouponPeriod,
}

/// Number of coupon payments per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    /// No coupons; principal only at maturity.
    Zero,
    SemiAnnual,
}

impl Frequency {
    pub fn payments_per_year(&self) -> u32 {
        match self {
            Frequency::Zero => 0,
            Frequency::SemiAnnual => 2,
        }
    }

    /// Length of one coupon period in months, `None` for zero-coupon.
    pub fn months_per_period(&self) -> Option<u32> {
        match self.payments_per_year() {
            0 => None,
            n => Some(12 / n),
        }
    }

    /// Coupon paid each period per 100 face, for an annual rate in percent.
    pub fn coupon_amount(&self, rate_percent: Decimal) -> Decimal {
        match self.payments_per_year() {
            0 => Decimal::ZERO,
            n => rate_percent / Decimal::from(n),
        }
    }
}

/// Move `(year, month)` by `delta` months, wrapping across year boundaries.
pub(crate) fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + (month as i32 - 1) + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

/// Last calendar day of the given month.
pub(crate) fn last_day_of_month(year: i32, month: u32) -> Result<u32, ScheduleError> {
    let (next_year, next_month) = shift_month(year, month, 1);
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| chrono::Datelike::day(&last))
        .ok_or(ScheduleError::InvalidDate {
            year: next_year,
            month: next_month,
            day: 1,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_shift_month_wraps_years() {
        assert_eq!(shift_month(2024, 1, -1), (2023, 12));
        assert_eq!(shift_month(2024, 3, -6), (2023, 9));
        assert_eq!(shift_month(2024, 11, 3), (2025, 2));
        assert_eq!(shift_month(2024, 12, 0), (2024, 12));
        assert_eq!(shift_month(2024, 7, -30), (2022, 1));
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2024, 2).unwrap(), 29);
        assert_eq!(last_day_of_month(2023, 2).unwrap(), 28);
        assert_eq!(last_day_of_month(2024, 4).unwrap(), 30);
        assert_eq!(last_day_of_month(2024, 12).unwrap(), 31);
    }

    #[test]
    fn test_frequency_periods() {
        assert_eq!(Frequency::Zero.months_per_period(), None);
        assert_eq!(Frequency::SemiAnnual.months_per_period(), Some(6));
        assert_eq!(Frequency::SemiAnnual.coupon_amount(dec!(4)), dec!(2));
        assert_eq!(Frequency::Zero.coupon_amount(dec!(4)), Decimal::ZERO);
    }
}
