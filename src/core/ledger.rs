use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cash movements on one obligation date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingEntry {
    pub due_date: NaiveDate,
    /// Coupons and principal received from holdings since the previous date.
    pub received: f64,
    /// Surplus carried in from the previous date.
    pub carry_in: f64,
    /// Amount paid out.
    pub required: f64,
    /// Surplus carried forward to the next date.
    pub carry_out: f64,
}

impl FundingEntry {
    /// `received + carry_in - carry_out - required`; zero when the date is
    /// exactly funded.
    pub fn imbalance(&self) -> f64 {
        self.received + self.carry_in - self.carry_out - self.required
    }
}

/// Tracks how a portfolio funds each obligation, date by date.
///
/// The ledger is the cash view of a solved portfolio: what arrives, what is
/// paid out and what is held over.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FundingLedger {
    entries: Vec<FundingEntry>,
}

impl FundingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the next obligation date. Its carry-in is the previous
    /// entry's carry-out.
    pub fn record(&mut self, due_date: NaiveDate, received: f64, required: f64, carry_out: f64) {
        let carry_in = self.entries.last().map(|e| e.carry_out).unwrap_or(0.0);
        self.entries.push(FundingEntry {
            due_date,
            received,
            carry_in,
            required,
            carry_out,
        });
    }

    pub fn entries(&self) -> &[FundingEntry] {
        &self.entries
    }

    /// Verify every date balances within `tolerance`.
    pub fn is_balanced(&self, tolerance: f64) -> bool {
        self.entries.iter().all(|e| e.imbalance().abs() <= tolerance)
    }

    /// Largest absolute imbalance over all dates.
    pub fn max_imbalance(&self) -> f64 {
        self.entries
            .iter()
            .map(|e| e.imbalance().abs())
            .fold(0.0, f64::max)
    }

    /// Cash received from holdings over the whole horizon.
    pub fn total_received(&self) -> f64 {
        self.entries.iter().map(|e| e.received).sum()
    }

    /// Surplus left after the final obligation.
    pub fn residual_cash(&self) -> f64 {
        self.entries.last().map(|e| e.carry_out).unwrap_or(0.0)
    }
}

impl fmt::Display for FundingLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Funding Schedule ===")?;
        writeln!(
            f,
            "{:<12} {:>16} {:>16} {:>16} {:>16}",
            "Date", "Received", "Carry In", "Required", "Carry Out"
        )?;
        for e in &self.entries {
            writeln!(
                f,
                "{:<12} {:>16.2} {:>16.2} {:>16.2} {:>16.2}",
                e.due_date.to_string(),
                e.received,
                e.carry_in,
                e.required,
                e.carry_out
            )?;
        }
        Ok(())
    }
}
