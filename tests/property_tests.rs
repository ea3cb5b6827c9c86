use chrono::{Datelike, Duration, NaiveDate};
use dedicated_portfolio::config::DedicationConfig;
use dedicated_portfolio::core::date::{format_dash_abbrev, parse_date, DateFormat};
use dedicated_portfolio::optimization::dedication::DedicationEngine;
use dedicated_portfolio::schedule::coupon::CouponSchedule;
use dedicated_portfolio::schedule::pricing::accrued_interest;
use dedicated_portfolio::schedule::{Frequency, PAR};
use dedicated_portfolio::simulation::universe::{generate_scenario, UniverseConfig};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Any date from 2000 through 2039.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..14_600).prop_map(|d| NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + Duration::days(d))
}

/// Settlement plus a maturity up to thirty years later.
fn arb_settlement_maturity() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    (arb_date(), 1i64..10_950).prop_map(|(sd, days)| (sd, sd + Duration::days(days)))
}

/// Coupon rate in percent, 0.125% steps up to 10%.
fn arb_rate_percent() -> impl Strategy<Value = Decimal> {
    (0i64..=80).prop_map(|eighths| Decimal::new(eighths * 125, 3))
}

fn is_month_end(date: NaiveDate) -> bool {
    (date + Duration::days(1)).month() != date.month()
}

fn semiannual(sd: NaiveDate, md: NaiveDate) -> CouponSchedule {
    CouponSchedule::new(sd, md, Frequency::SemiAnnual).unwrap()
}

proptest! {
    // ===================================================================
    // INVARIANT 1: Last and next coupon bracket settlement.
    //
    // last ≤ settlement < next, and stepping forward from the last coupon
    // lands on the next one.
    // ===================================================================
    #[test]
    fn coupons_bracket_settlement((sd, md) in arb_settlement_maturity()) {
        let schedule = semiannual(sd, md);
        let last = schedule.last_coupon_date().unwrap();
        let next = schedule.next_coupon_date().unwrap();

        prop_assert!(last <= sd, "last {} after settlement {}", last, sd);
        prop_assert!(sd < next, "next {} not after settlement {}", next, sd);
        prop_assert!(next <= md);
        prop_assert_eq!(schedule.next_coupon_after(last).unwrap(), next);
    }

    // ===================================================================
    // INVARIANT 2: Remaining payments end exactly at maturity.
    //
    // The schedule has as many dates as the remaining count, strictly
    // increasing, all after settlement, the last equal to maturity.
    // ===================================================================
    #[test]
    fn schedule_ends_at_maturity((sd, md) in arb_settlement_maturity()) {
        let schedule = semiannual(sd, md);
        let dates = schedule.coupon_dates().unwrap();

        prop_assert_eq!(dates.len(), schedule.remaining_coupon_count());
        prop_assert_eq!(dates.last().copied(), Some(md));
        prop_assert!(dates[0] > sd);
        prop_assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    // ===================================================================
    // INVARIANT 3: Month-end maturities share a coupon calendar.
    //
    // Maturities on the 28th through the last day of the same month pay
    // on the same dates before the final payment, each the last day of
    // its month.
    // ===================================================================
    #[test]
    fn month_end_maturities_share_coupons(
        sd in arb_date(),
        months_ahead in 1u32..240,
        day_offset in 0u32..4,
    ) {
        let target = sd.checked_add_months(chrono::Months::new(months_ahead)).unwrap();
        let first = NaiveDate::from_ymd_opt(target.year(), target.month(), 28).unwrap();
        let last_day = (28..=31)
            .rev()
            .find_map(|d| NaiveDate::from_ymd_opt(target.year(), target.month(), d))
            .unwrap();
        let other = (first + Duration::days(day_offset as i64)).min(last_day);
        prop_assume!(first > sd);

        let a = semiannual(sd, first).coupon_dates().unwrap();
        let b = semiannual(sd, other).coupon_dates().unwrap();
        prop_assert_eq!(a.len(), b.len());
        prop_assert_eq!(&a[..a.len() - 1], &b[..b.len() - 1]);
        for d in &a[..a.len() - 1] {
            prop_assert!(is_month_end(*d), "coupon {} is not a month end", d);
        }
    }

    // ===================================================================
    // INVARIANT 4: Accrued interest never exceeds one coupon.
    // ===================================================================
    #[test]
    fn accrued_within_one_coupon(
        (sd, md) in arb_settlement_maturity(),
        rate in arb_rate_percent(),
    ) {
        let accrued = accrued_interest(rate, Frequency::SemiAnnual, sd, md).unwrap();
        let coupon = Frequency::SemiAnnual.coupon_amount(rate);
        prop_assert!(accrued >= Decimal::ZERO);
        prop_assert!(accrued <= coupon, "accrued {} above coupon {}", accrued, coupon);
        prop_assert_eq!(
            accrued_interest(rate, Frequency::Zero, sd, md).unwrap(),
            Decimal::ZERO
        );
    }

    // ===================================================================
    // INVARIANT 5: Windows covering the life of an instrument collect
    // every coupon and the principal exactly once.
    // ===================================================================
    #[test]
    fn windows_collect_all_cash(
        (sd, md) in arb_settlement_maturity(),
        rate in arb_rate_percent(),
        cuts in prop::collection::btree_set(1i64..11_500, 0..6),
        tail in 0i64..400,
    ) {
        let end = md + Duration::days(tail);
        let mut bounds: Vec<NaiveDate> = cuts
            .into_iter()
            .map(|d| sd + Duration::days(d))
            .filter(|d| *d < end)
            .collect();
        bounds.push(end);

        let mut windows = Vec::with_capacity(bounds.len());
        let mut low = sd;
        for high in bounds {
            windows.push((low, high));
            low = high;
        }

        let schedule = semiannual(sd, md);
        let total: Decimal = schedule.cash_by_window(&windows, rate).unwrap().into_iter().sum();
        let expected = Frequency::SemiAnnual.coupon_amount(rate)
            * Decimal::from(schedule.remaining_coupon_count())
            + PAR;
        prop_assert_eq!(total, expected);
    }

    // ===================================================================
    // INVARIANT 6: Liability dates survive formatting and parsing.
    // ===================================================================
    #[test]
    fn dash_dates_round_trip(date in arb_date()) {
        let text = format_dash_abbrev(date);
        prop_assert_eq!(parse_date(&text, DateFormat::DashAbbrevMonth).unwrap(), date);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    // ===================================================================
    // INVARIANT 7: Every obligation date balances.
    //
    // Cash received plus carry-in equals the obligation plus carry-out,
    // for every solved portfolio.
    // ===================================================================
    #[test]
    fn solved_portfolio_balances(
        seed in any::<u64>(),
        instruments in 2usize..25,
        obligations in 1usize..8,
    ) {
        let config = UniverseConfig {
            instrument_count: instruments,
            obligation_count: obligations,
            max_amount: 10_000.0,
            min_amount: 100.0,
            seed: Some(seed),
            ..Default::default()
        };
        let scenario = generate_scenario(&config).unwrap();
        let portfolio = DedicationEngine::new(DedicationConfig::default())
            .run(scenario.settlement, &scenario.instruments, &scenario.obligations)
            .unwrap();

        prop_assert!(
            portfolio.ledger().is_balanced(1e-6),
            "max imbalance {}",
            portfolio.ledger().max_imbalance()
        );
        prop_assert!(portfolio.allocations().iter().all(|a| a.units >= -1e-9));
        prop_assert!(portfolio.surplus().iter().all(|s| *s >= -1e-9));
    }

    // ===================================================================
    // INVARIANT 8: Dedication is deterministic.
    // ===================================================================
    #[test]
    fn dedication_is_deterministic(seed in any::<u64>()) {
        let config = UniverseConfig {
            instrument_count: 15,
            obligation_count: 4,
            seed: Some(seed),
            ..Default::default()
        };
        let scenario = generate_scenario(&config).unwrap();
        let engine = DedicationEngine::new(DedicationConfig::default());
        let first = engine
            .run(scenario.settlement, &scenario.instruments, &scenario.obligations)
            .unwrap();
        let second = engine
            .run(scenario.settlement, &scenario.instruments, &scenario.obligations)
            .unwrap();

        prop_assert_eq!(first.total_cost(), second.total_cost());
        let units_a: Vec<f64> = first.allocations().iter().map(|a| a.units).collect();
        let units_b: Vec<f64> = second.allocations().iter().map(|a| a.units).collect();
        prop_assert_eq!(units_a, units_b);
    }
}
