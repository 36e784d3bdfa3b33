use anyhow::Result;
use log::{debug, warn};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    lar::{
        conversion_helper::{Approximate, Exact, NumericRepresentation},
        lar_solution_signature::LarSolutionSignature,
        lar_solver::{LarSolver, LarStatus},
    },
    math::{
        numeric_pair::NumericPair,
        rational::Rational,
        traits::{One, Zero},
    },
    optimisation_algorithms::{
        core_solver::{CoreSolver, CoreSolverParameters, CoreStatus},
        static_matrix::StaticMatrix,
    },
};

/// What remains of the exact solve, in terms of internal columns.
#[derive(Clone, Debug)]
pub struct LarCoreState {
    /// For each engine column its internal column.
    pub columns: Vec<usize>,
    engine_columns: FxHashMap<usize, usize>,
    pub x: Vec<NumericPair>,
    /// The infeasible row as (coefficient, internal column), and its sign.
    pub infeasible_row: Option<(Vec<(Rational, usize)>, i32)>,
}

impl LarCoreState {
    pub fn new(
        columns: Vec<usize>,
        x: Vec<NumericPair>,
        infeasible_row: Option<(Vec<(Rational, usize)>, i32)>,
    ) -> Self {
        let engine_columns = columns.iter().enumerate().map(|(j, c)| (*c, j)).collect();
        Self {
            columns,
            engine_columns,
            x,
            infeasible_row,
        }
    }

    /// The value of an internal column, if it took part in the solve.
    pub fn value(&self, column: usize) -> Option<&NumericPair> {
        self.engine_columns.get(&column).map(|j| &self.x[*j])
    }
}

impl LarSolver {
    /**
     * Runs the two passes: a floating point one to find a solution signature, and an exact one,
     * started from that signature, whose outcome is authoritative.
     */
    pub fn solve(&mut self) {
        self.core = None;
        if let Some(conflict) = self.registration_conflict {
            debug!("no simplex needed, registration found {:?}", conflict);
            self.status = LarStatus::Unsatisfiable;
            return;
        }

        let columns = self.core_columns();
        let signature = if self.settings.use_approximate_pass {
            let (signature, iterations) = self.find_solution_signature_with_doubles(&columns);
            self.total_iterations += iterations;
            signature
        } else {
            None
        };

        let mut solver = match self.solve_on_signature(&columns, signature.as_ref()) {
            Ok(solver) => solver,
            Err(error) => {
                warn!("the exact pass could not start: {:#}", error);
                self.status = LarStatus::Unknown;
                return;
            }
        };
        let core_status = solver.solve();
        self.total_iterations += solver.total_iterations();
        debug!(
            "exact pass: {:?} after {} iterations",
            core_status,
            solver.total_iterations()
        );

        self.status = match core_status {
            CoreStatus::Feasible => LarStatus::Satisfiable,
            CoreStatus::Infeasible => LarStatus::Unsatisfiable,
            CoreStatus::IterationLimit | CoreStatus::Unknown => LarStatus::Unknown,
        };

        let infeasible_row = solver.get_infeasible_row().map(|(row, sign)| {
            (
                row.into_iter()
                    .map(|(coefficient, j)| (coefficient, columns[j]))
                    .collect(),
                sign,
            )
        });
        self.core = Some(LarCoreState::new(columns, solver.x().to_vec(), infeasible_row));
    }

    /// The internal columns handed to the engine: active variables and every non-trivial left side.
    pub(crate) fn core_columns(&self) -> Vec<usize> {
        self.left_sides
            .iter()
            .filter(|(_, left_side)| match left_side.single_var() {
                Some(var) => self.active_vars.contains(&var),
                None => true,
            })
            .map(|(column, _)| column)
            .collect()
    }

    /**
     * Assembles the engine input over `columns`. Every non-trivial left side contributes the row
     * `sum coefficient * var - slack = 0`.
     *
     * Without a signature, the slacks form the basis and every other column rests on a bound. With
     * one, its basis is used if it fits, and non-basic columns rest where the signature says.
     */
    pub(crate) fn prepare_core_solver_fields<R: NumericRepresentation>(
        &self,
        columns: &[usize],
        signature: Option<&LarSolutionSignature>,
    ) -> CoreSolverParameters<R::Coefficient, R::Value> {
        let engine_columns: FxHashMap<usize, usize> =
            columns.iter().enumerate().map(|(j, c)| (*c, j)).collect();

        let mut a = StaticMatrix::new(columns.len());
        let mut slack_basis = vec![];
        for (j, column) in columns.iter().enumerate() {
            let left_side = self.left_sides.get(*column);
            if left_side.is_trivial() {
                continue;
            }
            let mut row: Vec<(usize, R::Coefficient)> = left_side
                .coefficients()
                .iter()
                .map(|(var, coefficient)| {
                    (
                        engine_columns[&self.var_left_sides[*var]],
                        R::convert_coefficient(coefficient),
                    )
                })
                .collect();
            row.push((j, -<R::Coefficient as One>::one()));
            a.add_row(row);
            slack_basis.push(j);
        }

        let basis = signature
            .and_then(|signature| {
                if signature.basis.len() != slack_basis.len() {
                    return None;
                }
                signature
                    .basis
                    .iter()
                    .map(|column| engine_columns.get(column).copied())
                    .collect::<Option<Vec<_>>>()
            })
            .unwrap_or(slack_basis);
        let basic: FxHashSet<usize> = basis.iter().copied().collect();

        let mut low_bounds = Vec::with_capacity(columns.len());
        let mut upper_bounds = Vec::with_capacity(columns.len());
        let mut column_types = Vec::with_capacity(columns.len());
        let mut x = Vec::with_capacity(columns.len());
        for (j, column) in columns.iter().enumerate() {
            let info = &self.column_infos[*column];
            low_bounds.push(R::convert_low_bound(info));
            upper_bounds.push(R::convert_upper_bound(info));
            column_types.push(info.get_column_type());
            if basic.contains(&j) {
                x.push(<R::Value as Zero>::zero());
            } else {
                let position = signature.and_then(|signature| signature.position(*column));
                x.push(R::initial_value(info, position));
            }
        }

        CoreSolverParameters {
            a,
            low_bounds,
            upper_bounds,
            column_types,
            basis,
            x,
        }
    }

    /**
     * The approximate pass. Whatever its outcome, the place it ends in is returned as a hint,
     * together with the number of iterations it took.
     */
    pub(crate) fn find_solution_signature_with_doubles(
        &self,
        columns: &[usize],
    ) -> (Option<LarSolutionSignature>, usize) {
        let parameters = self.prepare_core_solver_fields::<Approximate>(columns, None);
        match CoreSolver::new(parameters, Some(self.settings.max_approximate_iterations)) {
            Ok(mut solver) => {
                let status = solver.solve();
                debug!(
                    "{} pass: {:?} after {} iterations",
                    Approximate::NAME,
                    status,
                    solver.total_iterations()
                );
                (
                    Some(LarSolutionSignature::extract(&solver, columns)),
                    solver.total_iterations(),
                )
            }
            Err(error) => {
                debug!("{} pass could not start: {:#}", Approximate::NAME, error);
                (None, 0)
            }
        }
    }

    /// Sets up the exact pass, falling back to the slack basis if the signature does not fit.
    pub(crate) fn solve_on_signature(
        &self,
        columns: &[usize],
        signature: Option<&LarSolutionSignature>,
    ) -> Result<CoreSolver<Rational, NumericPair>> {
        let parameters = self.prepare_core_solver_fields::<Exact>(columns, signature);
        match CoreSolver::new(parameters, self.settings.max_exact_iterations) {
            Ok(solver) => Ok(solver),
            Err(error) if signature.is_some() => {
                debug!("{} pass ignores the signature: {:#}", Exact::NAME, error);
                let parameters = self.prepare_core_solver_fields::<Exact>(columns, None);
                CoreSolver::new(parameters, self.settings.max_exact_iterations)
            }
            Err(error) => Err(error),
        }
    }
}
