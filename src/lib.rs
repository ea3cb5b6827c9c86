//! # dedicated-portfolio
//!
//! Least-cost cash-flow matching of a liability schedule with Treasury
//! bills, notes and bonds.
//!
//! Given a universe of quoted instruments, a settlement date and a schedule
//! of dated obligations, this engine prices every instrument to its
//! transaction (dirty) price, projects its coupons and principal into the
//! windows between obligations, and solves a linear program for the
//! cheapest holdings whose cash flows, plus carried surplus, exactly meet
//! every obligation.
//!
//! ## Architecture
//!
//! - **core**: Foundational types: dates, instruments, obligations, funding ledger
//! - **schedule**: Coupon calendars, accrued interest, transaction prices
//! - **optimization**: LP formulation, simplex solver, dedication pipeline, reports
//! - **data**: Treasury price file and liability file I/O, result writers
//! - **simulation**: Seeded random universes and liability schedules

pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod optimization;
pub mod schedule;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::config::DedicationConfig;
    pub use crate::core::date::{parse_date, DateFormat};
    pub use crate::core::instrument::{Instrument, InstrumentId, InstrumentType};
    pub use crate::core::ledger::FundingLedger;
    pub use crate::core::obligation::{Obligation, ObligationSchedule};
    pub use crate::error::DedicationError;
    pub use crate::optimization::dedication::{DedicatedPortfolio, DedicationEngine};
    pub use crate::optimization::report::PortfolioReport;
    pub use crate::schedule::coupon::CouponSchedule;
    pub use crate::schedule::Frequency;
}
