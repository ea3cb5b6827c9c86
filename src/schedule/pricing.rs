//! Clean-to-dirty price conversion.

use crate::core::instrument::{Instrument, PricedInstrument};
use crate::schedule::coupon::CouponSchedule;
use crate::schedule::{Frequency, ScheduleError};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Interest accrued per 100 face between the last coupon and settlement.
///
/// `(rate_percent / freq) * days_since_last_coupon / period_day_count`, with
/// actual day counts. Zero-coupon instruments accrue nothing.
pub fn accrued_interest(
    rate_percent: Decimal,
    frequency: Frequency,
    settlement: NaiveDate,
    maturity: NaiveDate,
) -> Result<Decimal, ScheduleError> {
    if frequency == Frequency::Zero {
        return Ok(Decimal::ZERO);
    }
    let schedule = CouponSchedule::new(settlement, maturity, frequency)?;
    let days_since = Decimal::from(schedule.days_since_last_coupon()?);
    let period_days = Decimal::from(schedule.period_day_count()?);
    Ok(frequency.coupon_amount(rate_percent) * days_since / period_days)
}

/// Price one instrument for settlement: clean price plus accrued interest
/// rounded to `decimal_places`.
///
/// # Examples
///
/// ```
/// use dedicated_portfolio::core::instrument::{Instrument, InstrumentType};
/// use dedicated_portfolio::schedule::pricing::to_dirty_price;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let bill = Instrument::new(
///     "912797GB7",
///     InstrumentType::DiscountBill,
///     dec!(0),
///     NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
///     dec!(99.35),
/// );
/// let settlement = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// let priced = to_dirty_price(&bill, settlement, 8).unwrap();
/// assert_eq!(priced.transaction_price, dec!(99.35));
/// ```
pub fn to_dirty_price(
    instrument: &Instrument,
    settlement: NaiveDate,
    decimal_places: u32,
) -> Result<PricedInstrument, ScheduleError> {
    let accrued = accrued_interest(
        instrument.rate_percent(),
        instrument.frequency(),
        settlement,
        instrument.maturity,
    )?
    .round_dp(decimal_places);

    Ok(PricedInstrument {
        instrument: instrument.clone(),
        accrued_interest: accrued,
        transaction_price: instrument.clean_price + accrued,
    })
}

/// Price a whole universe. Fails on the first instrument whose schedule
/// cannot be derived.
pub fn price_universe(
    instruments: &[Instrument],
    settlement: NaiveDate,
    decimal_places: u32,
) -> Result<Vec<PricedInstrument>, ScheduleError> {
    instruments
        .iter()
        .map(|instrument| to_dirty_price(instrument, settlement, decimal_places))
        .collect()
}
