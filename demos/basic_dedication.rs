//! Basic dedicated portfolio example.
//!
//! Funds a two-year pension payout schedule from a small Treasury universe
//! and shows how cash flows are matched date by date.

use chrono::NaiveDate;
use dedicated_portfolio::prelude::*;
use dedicated_portfolio::schedule::pricing::price_universe;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn main() -> Result<(), DedicationError> {
    println!("╔══════════════════════════════════════════════════╗");
    println!("║  dedicated-portfolio: Basic Dedication Example   ║");
    println!("╚══════════════════════════════════════════════════╝\n");

    let settlement = parse_date("03012024", DateFormat::Compact)?;

    // --- The universe ---
    println!("━━━ Universe ━━━\n");

    let universe = vec![
        Instrument::new("912797KA5", InstrumentType::DiscountBill, dec!(0), date(2024, 6, 27), dec!(98.72)),
        Instrument::new("912797LB2", InstrumentType::DiscountBill, dec!(0), date(2024, 12, 26), dec!(96.45)),
        Instrument::new("91282CJV4", InstrumentType::CouponNote, dec!(0.0425), date(2025, 1, 31), dec!(99.46)),
        Instrument::new("91282CKA8", InstrumentType::CouponNote, dec!(0.04625), date(2025, 8, 31), dec!(99.82)),
        Instrument::new("91282CJS1", InstrumentType::CouponNote, dec!(0.0475), date(2026, 2, 15), dec!(100.31)),
        Instrument::new("912810FT0", InstrumentType::CouponBond, dec!(0.045), date(2026, 2, 15), dec!(99.92)),
    ];

    for p in price_universe(&universe, settlement, 8)? {
        println!(
            "  {:<10} {:<14} {:>7}%  {}  clean {:>8}  accrued {:>11}  dirty {:>12}",
            p.id(),
            p.instrument.kind,
            p.instrument.rate_percent().normalize(),
            p.instrument.maturity,
            p.instrument.clean_price,
            p.accrued_interest,
            p.transaction_price
        );
    }
    println!();

    // --- The liabilities ---
    println!("━━━ Liabilities ━━━\n");

    let liabilities = ObligationSchedule::new(vec![
        Obligation::new(date(2024, 6, 30), dec!(250_000)),
        Obligation::new(date(2024, 12, 31), dec!(250_000)),
        Obligation::new(date(2025, 6, 30), dec!(300_000)),
        Obligation::new(date(2025, 12, 31), dec!(300_000)),
        Obligation::new(date(2026, 2, 28), dec!(1_000_000)),
    ])?;
    for ob in liabilities.obligations() {
        println!("  {}  {:>12}", ob.due_date(), ob.amount());
    }
    println!("  Total       {:>12}\n", liabilities.total());

    // --- Solve ---
    let engine = DedicationEngine::new(DedicationConfig::default());
    let portfolio = engine.run(settlement, &universe, &liabilities)?;

    println!("{}", PortfolioReport::from_portfolio(&portfolio));
    println!("{}", portfolio.ledger());
    println!(
        "Solved in {} simplex iterations; largest funding imbalance {:.2e}",
        portfolio.solver_iterations(),
        portfolio.ledger().max_imbalance()
    );

    Ok(())
}
