//! Random instrument universes and liability schedules.
//!
//! Used to exercise the dedication pipeline at scale: benchmarks, property
//! tests and the `generate` command. A fixed seed reproduces the same
//! scenario exactly.

use crate::core::instrument::{Instrument, InstrumentType};
use crate::core::obligation::{Obligation, ObligationError, ObligationSchedule};
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

/// Longest tenor, in days, still issued as a bill.
const BILL_MAX_DAYS: i64 = 364;
/// Tenors beyond this are issued as bonds rather than notes.
const NOTE_MAX_DAYS: i64 = 3_650;

/// Configuration for generating a random scenario.
#[derive(Debug, Clone)]
pub struct UniverseConfig {
    pub settlement: NaiveDate,
    /// Number of instruments, including the short anchor bill.
    pub instrument_count: usize,
    pub obligation_count: usize,
    /// Latest maturity, in days after settlement.
    pub horizon_days: i64,
    /// Days from settlement to the first obligation.
    pub first_obligation_days: i64,
    /// Days between consecutive obligations.
    pub obligation_spacing_days: i64,
    /// Flat yield used to price every instrument.
    pub market_yield: f64,
    pub min_coupon_rate: f64,
    pub max_coupon_rate: f64,
    pub min_amount: f64,
    pub max_amount: f64,
    /// Seed for reproducible output; entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            settlement: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap_or_default(),
            instrument_count: 50,
            obligation_count: 10,
            horizon_days: 3_650,
            first_obligation_days: 90,
            obligation_spacing_days: 182,
            market_yield: 0.04,
            min_coupon_rate: 0.005,
            max_coupon_rate: 0.06,
            min_amount: 10_000.0,
            max_amount: 1_000_000.0,
            seed: None,
        }
    }
}

impl UniverseConfig {
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        }
    }
}

/// A generated universe and the liabilities it must fund.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub settlement: NaiveDate,
    pub instruments: Vec<Instrument>,
    pub obligations: ObligationSchedule,
}

/// Generate a universe and a liability schedule from one random stream.
pub fn generate_scenario(config: &UniverseConfig) -> Result<Scenario, ObligationError> {
    let mut rng = config.rng();
    let instruments = generate_random_universe(config, &mut rng);
    let obligations = generate_liability_schedule(config, &mut rng)?;
    Ok(Scenario {
        settlement: config.settlement,
        instruments,
        obligations,
    })
}

/// Generate a priced instrument universe.
///
/// The first instrument is always a bill maturing 28 days after settlement,
/// so any schedule whose first obligation falls later can be funded by
/// buying it and carrying the surplus forward.
pub fn generate_random_universe<R: Rng>(config: &UniverseConfig, rng: &mut R) -> Vec<Instrument> {
    let mut universe = Vec::with_capacity(config.instrument_count);
    if config.instrument_count == 0 {
        return universe;
    }
    universe.push(bill(config, "SIM000000".to_string(), 28));

    let max_days = config.horizon_days.max(29);
    for i in 1..config.instrument_count {
        let days = rng.gen_range(28..=max_days);
        let id = format!("SIM{:06}", i);
        if days <= BILL_MAX_DAYS {
            universe.push(bill(config, id, days));
            continue;
        }

        let kind = if days <= NOTE_MAX_DAYS {
            InstrumentType::CouponNote
        } else {
            InstrumentType::CouponBond
        };
        let rate = if config.max_coupon_rate > config.min_coupon_rate {
            rng.gen_range(config.min_coupon_rate..config.max_coupon_rate)
        } else {
            config.min_coupon_rate
        };
        let coupon_rate = to_decimal(rate, 5);
        let years = days as f64 / 365.25;
        let price = (100.0 + (rate - config.market_yield) * 100.0 * years).clamp(60.0, 140.0);

        universe.push(Instrument::new(
            id.as_str(),
            kind,
            coupon_rate,
            config.settlement + Duration::days(days),
            to_decimal(price, 6),
        ));
    }
    universe
}

/// Generate evenly spaced obligations with random amounts.
pub fn generate_liability_schedule<R: Rng>(
    config: &UniverseConfig,
    rng: &mut R,
) -> Result<ObligationSchedule, ObligationError> {
    let first = config.first_obligation_days.max(1);
    let spacing = config.obligation_spacing_days.max(1);

    let obligations = (0..config.obligation_count)
        .map(|i| {
            let amount = if config.max_amount > config.min_amount {
                rng.gen_range(config.min_amount..config.max_amount)
            } else {
                config.min_amount
            };
            Obligation::new(
                config.settlement + Duration::days(first + spacing * i as i64),
                to_decimal(amount, 2),
            )
        })
        .collect();
    ObligationSchedule::new(obligations)
}

fn bill(config: &UniverseConfig, id: String, days: i64) -> Instrument {
    let price = 100.0 - config.market_yield * 100.0 * days as f64 / 360.0;
    Instrument::new(
        id.as_str(),
        InstrumentType::DiscountBill,
        Decimal::ZERO,
        config.settlement + Duration::days(days),
        to_decimal(price, 6),
    )
}

fn to_decimal(value: f64, dp: u32) -> Decimal {
    Decimal::from_f64_retain(value)
        .unwrap_or(Decimal::ZERO)
        .round_dp(dp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DedicationConfig;
    use crate::optimization::dedication::DedicationEngine;

    fn seeded(instruments: usize, obligations: usize, seed: u64) -> UniverseConfig {
        UniverseConfig {
            instrument_count: instruments,
            obligation_count: obligations,
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn test_same_seed_same_scenario() {
        let config = seeded(30, 6, 7);
        let a = generate_scenario(&config).unwrap();
        let b = generate_scenario(&config).unwrap();
        assert_eq!(a.instruments, b.instruments);
        assert_eq!(a.obligations, b.obligations);
    }

    #[test]
    fn test_universe_shape() {
        let config = seeded(40, 5, 11);
        let scenario = generate_scenario(&config).unwrap();

        assert_eq!(scenario.instruments.len(), 40);
        assert_eq!(scenario.obligations.len(), 5);
        assert_eq!(scenario.instruments[0].kind, InstrumentType::DiscountBill);
        for inst in &scenario.instruments {
            assert!(inst.maturity > config.settlement);
            assert!(inst.clean_price > Decimal::ZERO);
            if inst.kind == InstrumentType::DiscountBill {
                assert_eq!(inst.coupon_rate, Decimal::ZERO);
            }
        }
        assert!(scenario.obligations.ensure_after(config.settlement).is_ok());
    }

    #[test]
    fn test_generated_scenario_is_fundable() {
        let config = seeded(25, 4, 3);
        let scenario = generate_scenario(&config).unwrap();

        let portfolio = DedicationEngine::new(DedicationConfig::default())
            .run(scenario.settlement, &scenario.instruments, &scenario.obligations)
            .unwrap();
        assert!(portfolio.ledger().is_balanced(1e-4));
        assert!(portfolio.total_cost() > 0.0);
    }

    #[test]
    fn test_empty_universe() {
        let config = seeded(0, 3, 1);
        let scenario = generate_scenario(&config).unwrap();
        assert!(scenario.instruments.is_empty());
    }
}
