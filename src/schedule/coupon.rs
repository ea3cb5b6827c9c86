//! Coupon dates and per-window cash flows derived from maturity alone.
//!
//! A coupon falls on every anniversary of the maturity date spaced one coupon
//! period apart, counting back from maturity. When maturity's day-of-month is
//! 28 or later the instrument is treated as month-end: every coupon falls on
//! the last calendar day of its month, so February never swallows a payment.
//! The coupon in maturity's own month is maturity itself.

use crate::schedule::{last_day_of_month, shift_month, Frequency, ScheduleError, PAR};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

/// Day-of-month from which an instrument is treated as month-end.
const MONTH_END_DAY: u32 = 28;

/// The remaining payment schedule of one instrument as of one settlement
/// date.
///
/// # Examples
///
/// ```
/// use dedicated_portfolio::schedule::coupon::CouponSchedule;
/// use dedicated_portfolio::schedule::Frequency;
/// use chrono::NaiveDate;
///
/// let settlement = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let maturity = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
/// let schedule = CouponSchedule::new(settlement, maturity, Frequency::SemiAnnual).unwrap();
///
/// assert_eq!(schedule.last_coupon_date().unwrap(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
/// assert_eq!(schedule.next_coupon_date().unwrap(), NaiveDate::from_ymd_opt(2024, 7, 15).unwrap());
/// assert_eq!(schedule.coupon_dates().unwrap().len(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CouponSchedule {
    settlement: NaiveDate,
    maturity: NaiveDate,
    frequency: Frequency,
}

impl CouponSchedule {
    pub fn new(
        settlement: NaiveDate,
        maturity: NaiveDate,
        frequency: Frequency,
    ) -> Result<Self, ScheduleError> {
        if maturity <= settlement {
            return Err(ScheduleError::MaturityNotAfterSettlement {
                settlement,
                maturity,
            });
        }
        Ok(Self {
            settlement,
            maturity,
            frequency,
        })
    }

    pub fn settlement(&self) -> NaiveDate {
        self.settlement
    }

    pub fn maturity(&self) -> NaiveDate {
        self.maturity
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Whole calendar months from settlement to maturity, ignoring days.
    pub fn months_elapsed(&self) -> i32 {
        months_between(self.settlement, self.maturity)
    }

    /// Months to back up from settlement's month to the most recent coupon
    /// anniversary month. Zero when settlement's month is itself one.
    pub fn months_since_last_coupon(&self) -> Result<u32, ScheduleError> {
        let period = self.period()?;
        Ok(months_back(self.settlement, self.maturity, period))
    }

    /// Latest coupon date on or before settlement.
    pub fn last_coupon_date(&self) -> Result<NaiveDate, ScheduleError> {
        self.coupon_on_or_before(self.settlement)
    }

    /// Earliest coupon date strictly after settlement.
    pub fn next_coupon_date(&self) -> Result<NaiveDate, ScheduleError> {
        self.next_coupon_after(self.settlement)
    }

    /// Earliest coupon date strictly after `date`.
    pub fn next_coupon_after(&self, date: NaiveDate) -> Result<NaiveDate, ScheduleError> {
        let period = self.period()? as i32;
        let last = self.coupon_on_or_before(date)?;
        let (year, month) = shift_month(last.year(), last.month(), period);
        self.coupon_date_in(year, month)
    }

    /// Latest coupon date on or before `date`.
    pub fn coupon_on_or_before(&self, date: NaiveDate) -> Result<NaiveDate, ScheduleError> {
        let period = self.period()?;
        let back = months_back(date, self.maturity, period) as i32;
        let (year, month) = shift_month(date.year(), date.month(), -back);
        let candidate = self.coupon_date_in(year, month)?;
        if candidate <= date {
            return Ok(candidate);
        }
        let (year, month) = shift_month(year, month, -(period as i32));
        self.coupon_date_in(year, month)
    }

    /// Actual days from the last coupon to settlement.
    pub fn days_since_last_coupon(&self) -> Result<i64, ScheduleError> {
        Ok((self.settlement - self.last_coupon_date()?).num_days())
    }

    /// Actual days from settlement to the next coupon.
    pub fn days_until_next_coupon(&self) -> Result<i64, ScheduleError> {
        Ok((self.next_coupon_date()? - self.settlement).num_days())
    }

    /// Actual days in the coupon period containing settlement.
    pub fn period_day_count(&self) -> Result<i64, ScheduleError> {
        Ok(self.days_since_last_coupon()? + self.days_until_next_coupon()?)
    }

    /// Number of payments still to come, maturity included.
    ///
    /// `ceil(months_elapsed / period)`, plus one when settlement sits in a
    /// coupon month ahead of that month's coupon. A zero-coupon instrument
    /// has a single payment, at maturity.
    pub fn remaining_coupon_count(&self) -> usize {
        let Some(period) = self.frequency.months_per_period() else {
            return 1;
        };
        let period = period as i32;
        let elapsed = self.months_elapsed();
        let mut count = (elapsed + period - 1) / period;
        if elapsed % period == 0 {
            let imminent = self.coupon_date_in(self.settlement.year(), self.settlement.month());
            if matches!(imminent, Ok(date) if self.settlement < date) {
                count += 1;
            }
        }
        count as usize
    }

    /// All payment dates after settlement, in order. The last is maturity.
    pub fn coupon_dates(&self) -> Result<Vec<NaiveDate>, ScheduleError> {
        if self.frequency == Frequency::Zero {
            return Ok(vec![self.maturity]);
        }
        let count = self.remaining_coupon_count();
        let mut dates = Vec::with_capacity(count);
        let mut current = self.settlement;
        for _ in 0..count {
            current = self.next_coupon_after(current)?;
            dates.push(current);
        }
        Ok(dates)
    }

    /// Cash paid per 100 face over the window `(low, high]`.
    ///
    /// Each coupon date inside the window contributes one coupon; principal
    /// is added when maturity itself falls inside the window. A window with
    /// no payment date yields zero.
    pub fn cash_in_window(
        &self,
        low: NaiveDate,
        high: NaiveDate,
        rate_percent: Decimal,
    ) -> Result<Decimal, ScheduleError> {
        let dates = self.coupon_dates()?;
        let coupon = self.frequency.coupon_amount(rate_percent);
        Ok(window_cash(&dates, self.maturity, coupon, low, high))
    }

    /// [`cash_in_window`](Self::cash_in_window) for a sequence of windows,
    /// deriving the coupon dates once.
    pub fn cash_by_window(
        &self,
        windows: &[(NaiveDate, NaiveDate)],
        rate_percent: Decimal,
    ) -> Result<Vec<Decimal>, ScheduleError> {
        let dates = self.coupon_dates()?;
        let coupon = self.frequency.coupon_amount(rate_percent);
        Ok(windows
            .iter()
            .map(|&(low, high)| window_cash(&dates, self.maturity, coupon, low, high))
            .collect())
    }

    fn period(&self) -> Result<u32, ScheduleError> {
        self.frequency
            .months_per_period()
            .ok_or(ScheduleError::NoCouponPeriod)
    }

    /// The coupon date falling in `(year, month)`, assuming it is a coupon
    /// month.
    fn coupon_date_in(&self, year: i32, month: u32) -> Result<NaiveDate, ScheduleError> {
        if year == self.maturity.year() && month == self.maturity.month() {
            return Ok(self.maturity);
        }
        let day = if self.maturity.day() >= MONTH_END_DAY {
            last_day_of_month(year, month)?
        } else {
            self.maturity.day()
        };
        NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(ScheduleError::InvalidDate { year, month, day })
    }
}

fn window_cash(
    dates: &[NaiveDate],
    maturity: NaiveDate,
    coupon: Decimal,
    low: NaiveDate,
    high: NaiveDate,
) -> Decimal {
    let in_window = |date: NaiveDate| low < date && date <= high;
    let coupons = dates.iter().filter(|d| in_window(**d)).count();
    let mut cash = coupon * Decimal::from(coupons);
    if in_window(maturity) {
        cash += PAR;
    }
    cash
}

/// `(to.year - from.year) * 12 + (to.month - from.month)`.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}

fn months_back(date: NaiveDate, maturity: NaiveDate, period: u32) -> u32 {
    let remainder = months_between(date, maturity).rem_euclid(period as i32) as u32;
    if remainder != 0 {
        period - remainder
    } else {
        0
    }
}
