//! Dense two-phase primal simplex for equality-constrained linear programs.
//!
//! Solves `minimize cᵀx subject to Ax = b, l <= x <= u`. Bounds are reduced
//! to the standard form `x' >= 0` by shifting lower bounds and adding one
//! slack row per finite upper bound. Phase one minimizes the sum of
//! artificial variables to find a feasible basis; phase two optimizes the
//! real objective from there. Bland's rule picks entering and leaving
//! variables, so degenerate problems cannot cycle.
//!
//! The tableau is dense. Dedication problems have a few dozen rows and at
//! most a few hundred columns, well within what a dense tableau handles.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Options for [`SimplexSolver`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplexOptions {
    /// Pivot budget across both phases.
    pub max_iterations: usize,
    /// Magnitude below which reduced costs, pivots and values count as zero.
    pub tolerance: f64,
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self {
            max_iterations: 50_000,
            tolerance: 1e-9,
        }
    }
}

/// Bounds on one decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariableBounds {
    pub lower: f64,
    pub upper: Option<f64>,
}

impl VariableBounds {
    /// `[0, ∞)`.
    pub const NON_NEGATIVE: Self = Self {
        lower: 0.0,
        upper: None,
    };
}

/// `minimize cᵀx subject to Ax = b` with per-variable bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearProgram {
    pub objective: Vec<f64>,
    pub a_eq: Vec<Vec<f64>>,
    pub b_eq: Vec<f64>,
    pub bounds: Vec<VariableBounds>,
}

impl LinearProgram {
    pub fn variable_count(&self) -> usize {
        self.objective.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.b_eq.len()
    }

    /// Check shapes, bounds and that every coefficient is finite.
    pub fn validate(&self) -> Result<(), SolverError> {
        let n = self.variable_count();
        if self.a_eq.len() != self.b_eq.len() {
            return Err(SolverError::DimensionMismatch {
                what: "right-hand side",
                expected: self.a_eq.len(),
                found: self.b_eq.len(),
            });
        }
        if self.bounds.len() != n {
            return Err(SolverError::DimensionMismatch {
                what: "bounds",
                expected: n,
                found: self.bounds.len(),
            });
        }
        if let Some(row) = self.a_eq.iter().find(|row| row.len() != n) {
            return Err(SolverError::DimensionMismatch {
                what: "constraint row",
                expected: n,
                found: row.len(),
            });
        }
        let all_finite = self.objective.iter().all(|v| v.is_finite())
            && self.b_eq.iter().all(|v| v.is_finite())
            && self.a_eq.iter().flatten().all(|v| v.is_finite());
        if !all_finite {
            return Err(SolverError::NonFinite);
        }
        for (index, b) in self.bounds.iter().enumerate() {
            let upper_ok = b.upper.map_or(true, |u| u.is_finite() && u >= b.lower);
            if !b.lower.is_finite() || !upper_ok {
                return Err(SolverError::InvalidBounds { index });
            }
        }
        Ok(())
    }
}

/// An optimal point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LpSolution {
    pub x: Vec<f64>,
    pub objective: f64,
    pub iterations: usize,
}

/// Reasons a solve fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("{what} has length {found}, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("variable {index} has invalid bounds")]
    InvalidBounds { index: usize },
    #[error("the problem contains a non-finite coefficient")]
    NonFinite,
    #[error("the constraints admit no solution within bounds (phase-one residual {residual:.6e})")]
    Infeasible { residual: f64 },
    #[error("the objective is unbounded below")]
    Unbounded,
    #[error("iteration limit of {0} reached")]
    IterationLimit(usize),
}

/// Anything that can solve an equality-constrained linear program.
pub trait LpSolver {
    fn solve(&self, program: LinearProgram) -> Result<LpSolution, SolverError>;
}

/// The built-in dense simplex solver.
#[derive(Debug, Clone, Default)]
pub struct SimplexSolver {
    options: SimplexOptions,
}

impl SimplexSolver {
    pub fn new(options: SimplexOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SimplexOptions {
        &self.options
    }
}

impl LpSolver for SimplexSolver {
    fn solve(&self, program: LinearProgram) -> Result<LpSolution, SolverError> {
        program.validate()?;
        let tol = self.options.tolerance;
        let n = program.variable_count();

        let (rows, rhs, costs) = standard_form(&program);
        let rhs_scale: f64 = 1.0 + rhs.iter().map(|b| b.abs()).sum::<f64>();
        let mut tableau = Tableau::new(rows, rhs, costs.len());
        let structural = tableau.structural;
        let mut iterations = 0;

        // Phase one: minimize the sum of artificials.
        let mut phase_one = vec![0.0; tableau.width()];
        for cost in phase_one.iter_mut().skip(structural) {
            *cost = 1.0;
        }
        tableau.price_out(&phase_one);
        tableau.optimize(tableau.width(), &self.options, &mut iterations)?;

        let residual = tableau.objective_value();
        if residual > tol * rhs_scale {
            return Err(SolverError::Infeasible { residual });
        }
        tableau.drive_out_artificials(tol);

        // Phase two: the real objective over structural columns only.
        let mut phase_two = vec![0.0; tableau.width()];
        phase_two[..costs.len()].copy_from_slice(&costs);
        tableau.price_out(&phase_two);
        tableau.optimize(structural, &self.options, &mut iterations)?;

        let shifted = tableau.primal_values(tol);
        let x: Vec<f64> = program
            .bounds
            .iter()
            .zip(shifted.iter().take(n))
            .map(|(b, v)| b.lower + v)
            .collect();
        let objective = program
            .objective
            .iter()
            .zip(x.iter())
            .map(|(c, v)| c * v)
            .sum();

        Ok(LpSolution {
            x,
            objective,
            iterations,
        })
    }
}

/// Rewrite bounds into `x' >= 0` form: shift by lower bounds and add
/// `x'_j + t_j = u_j - l_j` for each finite upper bound.
fn standard_form(program: &LinearProgram) -> (Vec<Vec<f64>>, Vec<f64>, Vec<f64>) {
    let n = program.variable_count();
    let upper: Vec<(usize, f64)> = program
        .bounds
        .iter()
        .enumerate()
        .filter_map(|(j, b)| b.upper.map(|u| (j, u - b.lower)))
        .collect();
    let width = n + upper.len();

    let mut rows = Vec::with_capacity(program.constraint_count() + upper.len());
    let mut rhs = Vec::with_capacity(program.constraint_count() + upper.len());

    for (coefficients, b) in program.a_eq.iter().zip(program.b_eq.iter()) {
        let mut row = vec![0.0; width];
        row[..n].copy_from_slice(coefficients);
        let shift: f64 = coefficients
            .iter()
            .zip(program.bounds.iter())
            .map(|(a, bound)| a * bound.lower)
            .sum();
        rows.push(row);
        rhs.push(b - shift);
    }
    for (slack, (j, range)) in upper.iter().enumerate() {
        let mut row = vec![0.0; width];
        row[*j] = 1.0;
        row[n + slack] = 1.0;
        rows.push(row);
        rhs.push(*range);
    }

    let mut costs = program.objective.clone();
    costs.resize(width, 0.0);
    (rows, rhs, costs)
}

struct Tableau {
    /// Constraint rows; the last entry of each is the right-hand side.
    rows: Vec<Vec<f64>>,
    /// Reduced costs; the last entry is minus the objective value.
    costs: Vec<f64>,
    basis: Vec<usize>,
    /// Columns before the artificial block.
    structural: usize,
}

impl Tableau {
    fn new(constraints: Vec<Vec<f64>>, rhs: Vec<f64>, structural: usize) -> Self {
        let m = constraints.len();
        let width = structural + m;

        let rows = constraints
            .into_iter()
            .zip(rhs)
            .enumerate()
            .map(|(i, (mut row, b))| {
                // Artificials need a non-negative starting value.
                let sign = if b < 0.0 { -1.0 } else { 1.0 };
                row.iter_mut().for_each(|a| *a *= sign);
                row.resize(width + 1, 0.0);
                row[structural + i] = 1.0;
                row[width] = b * sign;
                row
            })
            .collect();

        Self {
            rows,
            costs: vec![0.0; width + 1],
            basis: (structural..width).collect(),
            structural,
        }
    }

    fn width(&self) -> usize {
        self.costs.len() - 1
    }

    fn objective_value(&self) -> f64 {
        -self.costs[self.width()]
    }

    /// Reset reduced costs for `column_costs` relative to the current basis.
    fn price_out(&mut self, column_costs: &[f64]) {
        self.costs = column_costs.to_vec();
        self.costs.push(0.0);
        for (row, &basic) in self.rows.iter().zip(self.basis.iter()) {
            let cb = column_costs[basic];
            if cb != 0.0 {
                for (c, a) in self.costs.iter_mut().zip(row.iter()) {
                    *c -= cb * a;
                }
            }
        }
    }

    fn optimize(
        &mut self,
        entering_limit: usize,
        options: &SimplexOptions,
        iterations: &mut usize,
    ) -> Result<(), SolverError> {
        let tol = options.tolerance;
        let rhs = self.width();
        loop {
            let Some(entering) = (0..entering_limit).find(|&j| self.costs[j] < -tol) else {
                return Ok(());
            };

            let mut leaving: Option<(usize, f64)> = None;
            for (i, row) in self.rows.iter().enumerate() {
                let a = row[entering];
                if a <= tol {
                    continue;
                }
                let ratio = row[rhs] / a;
                leaving = match leaving {
                    None => Some((i, ratio)),
                    Some((best, best_ratio)) => {
                        let tie = (ratio - best_ratio).abs() <= tol;
                        if ratio < best_ratio - tol
                            || (tie && self.basis[i] < self.basis[best])
                        {
                            Some((i, ratio))
                        } else {
                            Some((best, best_ratio))
                        }
                    }
                };
            }
            let Some((leaving, _)) = leaving else {
                return Err(SolverError::Unbounded);
            };

            self.pivot(leaving, entering);
            *iterations += 1;
            if *iterations > options.max_iterations {
                return Err(SolverError::IterationLimit(options.max_iterations));
            }
        }
    }

    /// Replace artificials still basic after phase one by structural
    /// columns. Rows with no structural entry are redundant and keep their
    /// artificial at zero.
    fn drive_out_artificials(&mut self, tol: f64) {
        for r in 0..self.rows.len() {
            if self.basis[r] < self.structural {
                continue;
            }
            if let Some(j) = (0..self.structural).find(|&j| self.rows[r][j].abs() > tol) {
                self.pivot(r, j);
            }
        }
    }

    fn pivot(&mut self, r: usize, e: usize) {
        let p = self.rows[r][e];
        self.rows[r].iter_mut().for_each(|a| *a /= p);
        let pivot_row = self.rows[r].clone();

        for (i, row) in self.rows.iter_mut().enumerate() {
            if i == r {
                continue;
            }
            let factor = row[e];
            if factor != 0.0 {
                for (a, pa) in row.iter_mut().zip(pivot_row.iter()) {
                    *a -= factor * pa;
                }
            }
        }
        let factor = self.costs[e];
        if factor != 0.0 {
            for (c, pa) in self.costs.iter_mut().zip(pivot_row.iter()) {
                *c -= factor * pa;
            }
        }
        self.basis[r] = e;
    }

    /// Values of the structural columns; round-off below `tol` is zeroed.
    fn primal_values(&self, tol: f64) -> Vec<f64> {
        let rhs = self.width();
        let mut values = vec![0.0; self.structural];
        for (row, &basic) in self.rows.iter().zip(self.basis.iter()) {
            if basic < self.structural {
                let v = row[rhs];
                values[basic] = if v.abs() <= tol { 0.0 } else { v.max(0.0) };
            }
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn non_negative(n: usize) -> Vec<VariableBounds> {
        vec![VariableBounds::NON_NEGATIVE; n]
    }

    #[test]
    fn test_simple_equality_program() {
        // min x + 2y  s.t. x + y = 4, x - y = 2  ->  x = 3, y = 1
        let program = LinearProgram {
            objective: vec![1.0, 2.0],
            a_eq: vec![vec![1.0, 1.0], vec![1.0, -1.0]],
            b_eq: vec![4.0, 2.0],
            bounds: non_negative(2),
        };
        let solution = SimplexSolver::default().solve(program).unwrap();
        assert_relative_eq!(solution.x[0], 3.0, epsilon = 1e-9);
        assert_relative_eq!(solution.x[1], 1.0, epsilon = 1e-9);
        assert_relative_eq!(solution.objective, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_picks_cheaper_of_two_columns() {
        // min 3a + 2b  s.t. a + b = 10
        let program = LinearProgram {
            objective: vec![3.0, 2.0],
            a_eq: vec![vec![1.0, 1.0]],
            b_eq: vec![10.0],
            bounds: non_negative(2),
        };
        let solution = SimplexSolver::default().solve(program).unwrap();
        assert_relative_eq!(solution.x[0], 0.0);
        assert_relative_eq!(solution.x[1], 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_negative_rhs() {
        // min x  s.t. -x + s = -5
        let program = LinearProgram {
            objective: vec![1.0, 0.0],
            a_eq: vec![vec![-1.0, 1.0]],
            b_eq: vec![-5.0],
            bounds: non_negative(2),
        };
        let solution = SimplexSolver::default().solve(program).unwrap();
        assert_relative_eq!(solution.x[0], 5.0, epsilon = 1e-9);
        assert_relative_eq!(solution.x[1], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_infeasible() {
        // x = 1 and x = 2
        let program = LinearProgram {
            objective: vec![1.0],
            a_eq: vec![vec![1.0], vec![1.0]],
            b_eq: vec![1.0, 2.0],
            bounds: non_negative(1),
        };
        let err = SimplexSolver::default().solve(program).unwrap_err();
        assert!(matches!(err, SolverError::Infeasible { .. }));
    }

    #[test]
    fn test_infeasible_sign() {
        // x >= 0 cannot satisfy x = -3
        let program = LinearProgram {
            objective: vec![1.0],
            a_eq: vec![vec![1.0]],
            b_eq: vec![-3.0],
            bounds: non_negative(1),
        };
        assert!(matches!(
            SimplexSolver::default().solve(program),
            Err(SolverError::Infeasible { .. })
        ));
    }

    #[test]
    fn test_unbounded() {
        // min -x  s.t. x - y = 0
        let program = LinearProgram {
            objective: vec![-1.0, 0.0],
            a_eq: vec![vec![1.0, -1.0]],
            b_eq: vec![0.0],
            bounds: non_negative(2),
        };
        assert_eq!(
            SimplexSolver::default().solve(program).unwrap_err(),
            SolverError::Unbounded
        );
    }

    #[test]
    fn test_redundant_row() {
        // the second row duplicates the first
        let program = LinearProgram {
            objective: vec![1.0, 1.0],
            a_eq: vec![vec![1.0, 2.0], vec![2.0, 4.0]],
            b_eq: vec![4.0, 8.0],
            bounds: non_negative(2),
        };
        let solution = SimplexSolver::default().solve(program).unwrap();
        assert_relative_eq!(solution.objective, 2.0, epsilon = 1e-9);
        assert_relative_eq!(solution.x[1], 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_finite_bounds() {
        // min -x - 2y  s.t. x + y = 3, 1 <= x <= 2, 0 <= y <= 1.5
        let program = LinearProgram {
            objective: vec![-1.0, -2.0],
            a_eq: vec![vec![1.0, 1.0]],
            b_eq: vec![3.0],
            bounds: vec![
                VariableBounds {
                    lower: 1.0,
                    upper: Some(2.0),
                },
                VariableBounds {
                    lower: 0.0,
                    upper: Some(1.5),
                },
            ],
        };
        let solution = SimplexSolver::default().solve(program).unwrap();
        assert_relative_eq!(solution.x[0], 1.5, epsilon = 1e-9);
        assert_relative_eq!(solution.x[1], 1.5, epsilon = 1e-9);
    }

    #[test]
    fn test_dimension_mismatch() {
        let program = LinearProgram {
            objective: vec![1.0, 1.0],
            a_eq: vec![vec![1.0]],
            b_eq: vec![1.0],
            bounds: non_negative(2),
        };
        assert!(matches!(
            SimplexSolver::default().solve(program),
            Err(SolverError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_bounds() {
        let program = LinearProgram {
            objective: vec![1.0],
            a_eq: vec![vec![1.0]],
            b_eq: vec![1.0],
            bounds: vec![VariableBounds {
                lower: 2.0,
                upper: Some(1.0),
            }],
        };
        assert_eq!(
            SimplexSolver::default().solve(program).unwrap_err(),
            SolverError::InvalidBounds { index: 0 }
        );
    }

    #[test]
    fn test_iteration_limit() {
        let program = LinearProgram {
            objective: vec![1.0, 2.0],
            a_eq: vec![vec![1.0, 1.0], vec![1.0, -1.0]],
            b_eq: vec![4.0, 2.0],
            bounds: non_negative(2),
        };
        let solver = SimplexSolver::new(SimplexOptions {
            max_iterations: 1,
            ..Default::default()
        });
        assert_eq!(solver.solve(program).unwrap_err(), SolverError::IterationLimit(1));
    }
}
