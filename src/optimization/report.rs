//! Purchase report for a solved portfolio.

use crate::core::instrument::InstrumentId;
use crate::optimization::dedication::DedicatedPortfolio;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One purchased instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub cusip: InstrumentId,
    pub face_value: f64,
    pub cost: f64,
}

/// The purchases of a solved portfolio, ready to write out.
///
/// Only instruments with a strictly positive allocation appear; surplus
/// variables never do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub settlement: NaiveDate,
    pub holdings: Vec<Holding>,
    pub total_face_value: f64,
    pub total_cost: f64,
    /// Cash left over after the final obligation.
    pub residual_cash: f64,
}

impl PortfolioReport {
    pub fn from_portfolio(portfolio: &DedicatedPortfolio) -> Self {
        let holdings: Vec<Holding> = portfolio
            .purchases()
            .map(|a| Holding {
                cusip: a.id().clone(),
                face_value: a.face_value(),
                cost: a.cost(),
            })
            .collect();

        PortfolioReport {
            settlement: portfolio.settlement(),
            total_face_value: holdings.iter().map(|h| h.face_value).sum(),
            total_cost: holdings.iter().map(|h| h.cost).sum(),
            residual_cash: portfolio.ledger().residual_cash(),
            holdings,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}

impl std::fmt::Display for PortfolioReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dedicated Portfolio ===")?;
        writeln!(f, "Settlement:        {}", self.settlement)?;
        writeln!(f, "Instruments:       {}", self.holdings.len())?;
        writeln!(f, "Total Face Value:  {:.2}", self.total_face_value)?;
        writeln!(f, "Total Cost:        {:.2}", self.total_cost)?;
        writeln!(f, "Residual Cash:     {:.2}", self.residual_cash)?;

        writeln!(f, "\nHoldings:")?;
        for h in &self.holdings {
            writeln!(f, "  {:<12} face {:>16.2}  cost {:>16.2}", h.cusip, h.face_value, h.cost)?;
        }
        Ok(())
    }
}
