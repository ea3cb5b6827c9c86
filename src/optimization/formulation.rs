//! Cash-flow matching as an equality-constrained linear program.
//!
//! Decision variables are `n` instrument quantities (units of 100 face)
//! followed by `m` surplus variables, one per obligation. Row `i` reads
//!
//! ```text
//! Σ_j cash_j(window_i) · x_j + s_{i-1} - s_i = obligation_i
//! ```
//!
//! where `window_i` runs from the previous obligation date (settlement for
//! the first row), exclusive, to obligation `i`'s date, inclusive, and `s_i`
//! is cash held over from date `i` to date `i + 1`.

use crate::core::instrument::PricedInstrument;
use crate::core::obligation::ObligationSchedule;
use crate::optimization::simplex::{LinearProgram, VariableBounds};
use crate::schedule::coupon::CouponSchedule;
use crate::schedule::ScheduleError;
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// The assembled program plus the instrument cash-flow block, kept for
/// reading the solution back.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSystem {
    program: LinearProgram,
    /// `A_x`: cash paid per unit of instrument `j` in window `i`.
    cash_flows: Vec<Vec<f64>>,
}

impl ConstraintSystem {
    pub fn program(&self) -> &LinearProgram {
        &self.program
    }

    pub fn cash_flows(&self) -> &[Vec<f64>] {
        &self.cash_flows
    }

    pub fn instrument_count(&self) -> usize {
        self.program.variable_count() - self.obligation_count()
    }

    pub fn obligation_count(&self) -> usize {
        self.program.constraint_count()
    }

    /// Split into the program, which goes to the solver, and the cash-flow
    /// block.
    pub fn into_parts(self) -> (LinearProgram, Vec<Vec<f64>>) {
        (self.program, self.cash_flows)
    }
}

/// Build the cash-flow matching program.
///
/// The objective is each instrument's transaction price followed by a zero
/// for every surplus variable. All variables are bounded to `[0, ∞)`: no
/// short sales and no borrowing against later cash.
pub fn formulate(
    settlement: NaiveDate,
    instruments: &[PricedInstrument],
    obligations: &ObligationSchedule,
) -> Result<ConstraintSystem, ScheduleError> {
    let n = instruments.len();
    let m = obligations.len();
    let windows = obligations.windows(settlement);

    // Column-major first: each instrument's schedule is derived once.
    let mut columns = Vec::with_capacity(n);
    for priced in instruments {
        let instrument = &priced.instrument;
        let schedule = CouponSchedule::new(settlement, instrument.maturity, instrument.frequency())?;
        columns.push(schedule.cash_by_window(&windows, instrument.rate_percent())?);
    }

    let cash_flows: Vec<Vec<f64>> = (0..m)
        .map(|i| columns.iter().map(|column| to_f64(column[i])).collect())
        .collect();

    let a_eq = cash_flows
        .iter()
        .enumerate()
        .map(|(i, cash_row)| {
            let mut row = Vec::with_capacity(n + m);
            row.extend_from_slice(cash_row);
            row.extend((0..m).map(|k| surplus_coefficient(i, k)));
            row
        })
        .collect();

    let objective = instruments
        .iter()
        .map(|p| to_f64(p.transaction_price))
        .chain(std::iter::repeat(0.0).take(m))
        .collect();

    let b_eq = obligations
        .obligations()
        .iter()
        .map(|ob| to_f64(ob.amount()))
        .collect();

    Ok(ConstraintSystem {
        program: LinearProgram {
            objective,
            a_eq,
            b_eq,
            bounds: vec![VariableBounds::NON_NEGATIVE; n + m],
        },
        cash_flows,
    })
}

/// `A_s[i][k]`: -1 on the diagonal (cash carried out of date `i`), +1 just
/// below it (cash carried into date `i` from `i - 1`).
fn surplus_coefficient(row: usize, column: usize) -> f64 {
    if row == column {
        -1.0
    } else if row == column + 1 {
        1.0
    } else {
        0.0
    }
}

/// Non-representable values become NaN, which the solver rejects.
pub(crate) fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}
