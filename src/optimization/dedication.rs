//! Drive a dedication run from a raw universe to a solved portfolio.

use crate::config::DedicationConfig;
use crate::core::instrument::{Instrument, InstrumentId, PricedInstrument};
use crate::core::ledger::FundingLedger;
use crate::core::obligation::ObligationSchedule;
use crate::error::DedicationError;
use crate::optimization::formulation::{formulate, to_f64};
use crate::optimization::simplex::{LpSolver, SimplexSolver, SolverError};
use crate::schedule::pricing::price_universe;
use crate::schedule::PAR;
use chrono::NaiveDate;
use log::{debug, info};
use serde::Serialize;

/// Quantity of one instrument in a solved portfolio.
#[derive(Debug, Clone, Serialize)]
pub struct Allocation {
    pub instrument: PricedInstrument,
    /// Units of 100 face.
    pub units: f64,
}

impl Allocation {
    pub fn id(&self) -> &InstrumentId {
        self.instrument.id()
    }

    /// Face value purchased.
    pub fn face_value(&self) -> f64 {
        self.units * to_f64(PAR)
    }

    /// Cash paid at settlement.
    pub fn cost(&self) -> f64 {
        self.units * to_f64(self.instrument.transaction_price)
    }

    pub fn is_purchased(&self) -> bool {
        self.units > 0.0
    }
}

/// Result of a dedication run.
#[derive(Debug, Clone, Serialize)]
pub struct DedicatedPortfolio {
    settlement: NaiveDate,
    /// One entry per screened instrument, in universe order.
    allocations: Vec<Allocation>,
    /// Surplus carried forward after each obligation.
    surplus: Vec<f64>,
    ledger: FundingLedger,
    total_cost: f64,
    solver_iterations: usize,
}

impl DedicatedPortfolio {
    pub fn settlement(&self) -> NaiveDate {
        self.settlement
    }

    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }

    /// Allocations with a strictly positive quantity.
    pub fn purchases(&self) -> impl Iterator<Item = &Allocation> {
        self.allocations.iter().filter(|a| a.is_purchased())
    }

    pub fn surplus(&self) -> &[f64] {
        &self.surplus
    }

    pub fn ledger(&self) -> &FundingLedger {
        &self.ledger
    }

    /// Total cash paid at settlement.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn solver_iterations(&self) -> usize {
        self.solver_iterations
    }
}

/// The cash-flow matching pipeline: price, formulate, solve, interpret.
///
/// # Examples
///
/// ```
/// use dedicated_portfolio::prelude::*;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let settlement = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// let maturity = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
/// let universe = vec![Instrument::new(
///     "912797KX4",
///     InstrumentType::DiscountBill,
///     dec!(0),
///     maturity,
///     dec!(97.5),
/// )];
/// let liabilities = ObligationSchedule::new(vec![Obligation::new(maturity, dec!(1000))]).unwrap();
///
/// let engine = DedicationEngine::new(DedicationConfig::default());
/// let portfolio = engine.run(settlement, &universe, &liabilities).unwrap();
/// assert!((portfolio.total_cost() - 975.0).abs() < 1e-6);
/// ```
pub struct DedicationEngine<S = SimplexSolver> {
    config: DedicationConfig,
    solver: S,
}

impl DedicationEngine<SimplexSolver> {
    /// Engine backed by the built-in simplex solver.
    pub fn new(config: DedicationConfig) -> Self {
        let solver = SimplexSolver::new(config.solver);
        Self { config, solver }
    }
}

impl<S: LpSolver> DedicationEngine<S> {
    /// Engine backed by any other equality-constrained LP solver.
    pub fn with_solver(config: DedicationConfig, solver: S) -> Self {
        Self { config, solver }
    }

    pub fn config(&self) -> &DedicationConfig {
        &self.config
    }

    /// Build the least-cost portfolio whose cash flows, plus carried
    /// surplus, exactly meet every obligation.
    ///
    /// Instruments must already be screened: every maturity after
    /// settlement and every price positive.
    pub fn run(
        &self,
        settlement: NaiveDate,
        instruments: &[Instrument],
        obligations: &ObligationSchedule,
    ) -> Result<DedicatedPortfolio, DedicationError> {
        if instruments.is_empty() {
            return Err(DedicationError::EmptyUniverse);
        }
        obligations.ensure_after(settlement)?;

        let priced = price_universe(instruments, settlement, self.config.accrued_decimal_places)?;
        for p in &priced {
            debug!(
                "{} clean {} + accrued {} = {}",
                p.id(),
                p.instrument.clean_price,
                p.accrued_interest,
                p.transaction_price
            );
        }

        let system = formulate(settlement, &priced, obligations)?;
        let n = system.instrument_count();
        let m = system.obligation_count();
        info!(
            "Formulated cash-flow matching program: {} rows, {} instruments, {} surplus variables",
            m, n, m
        );

        let (program, cash_flows) = system.into_parts();
        let b_eq = program.b_eq.clone();
        let solution = self.solver.solve(program).map_err(|e| match e {
            SolverError::Infeasible { .. } => DedicationError::Infeasible {
                message: e.to_string(),
            },
            other => DedicationError::Solver(other),
        })?;
        info!(
            "Optimal solution found in {} iterations, cost {:.2}",
            solution.iterations, solution.objective
        );

        let (units, surplus) = solution.x.split_at(n);

        let mut ledger = FundingLedger::new();
        for (i, ob) in obligations.obligations().iter().enumerate() {
            let received = cash_flows[i]
                .iter()
                .zip(units.iter())
                .map(|(cash, x)| cash * x)
                .sum();
            ledger.record(ob.due_date(), received, b_eq[i], surplus[i]);
        }

        let allocations = priced
            .into_iter()
            .zip(units.iter())
            .map(|(instrument, &units)| Allocation { instrument, units })
            .collect::<Vec<_>>();
        debug!(
            "{} of {} instruments purchased",
            allocations.iter().filter(|a| a.is_purchased()).count(),
            allocations.len()
        );

        Ok(DedicatedPortfolio {
            settlement,
            allocations,
            surplus: surplus.to_vec(),
            ledger,
            total_cost: solution.objective,
            solver_iterations: solution.iterations,
        })
    }
}
