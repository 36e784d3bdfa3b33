use anyhow::{Result, anyhow};
use log::{debug, trace};
use ndarray::Array2;

use crate::{
    math::core_number::{CoreCoefficient, CoreValue},
    optimisation_algorithms::static_matrix::StaticMatrix,
};

/**
 * A bounded-variable simplex in feasibility mode (there is no objective).
 * It follows the general simplex of Dutertre & de Moura: basic columns are repaired one at a time,
 * picking both the violated basic column and the repairing non-basic column by lowest index
 * (Bland's rule), which guarantees termination in exact arithmetic.
 *
 * The engine is generic over the coefficient type U and the value type V, so the same code runs
 * on floats (approximate) and on rationals with an infinitesimal component (exact).
 */

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Free,
    LowBound,
    UpperBound,
    Boxed,
    Fixed,
}

impl ColumnType {
    pub fn has_low_bound(&self) -> bool {
        match self {
            ColumnType::LowBound | ColumnType::Boxed | ColumnType::Fixed => true,
            ColumnType::Free | ColumnType::UpperBound => false,
        }
    }

    pub fn has_upper_bound(&self) -> bool {
        match self {
            ColumnType::UpperBound | ColumnType::Boxed | ColumnType::Fixed => true,
            ColumnType::Free | ColumnType::LowBound => false,
        }
    }
}

/// Where a non-basic column rests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NonBasicColumnValuePosition {
    AtLowBound,
    AtUpperBound,
    AtFixed,
    FreeOfBounds,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoreStatus {
    Unknown,
    Feasible,
    Infeasible,
    IterationLimit,
}

/// The input of the engine.
#[derive(Clone, Debug)]
pub struct CoreSolverParameters<U, V> {
    pub a: StaticMatrix<U>,
    pub low_bounds: Vec<V>,
    pub upper_bounds: Vec<V>,
    pub column_types: Vec<ColumnType>,
    /// For each row the column that is basic in it.
    pub basis: Vec<usize>,
    /// Initial values; only the entries of non-basic columns are read, and these must respect their bounds.
    pub x: Vec<V>,
}

#[derive(Clone, Debug)]
pub struct CoreSolver<U, V> {
    tableau: Array2<U>,
    basis: Vec<usize>,
    /// For each column the row in which it is basic.
    basis_heading: Vec<Option<usize>>,
    x: Vec<V>,
    low_bounds: Vec<V>,
    upper_bounds: Vec<V>,
    column_types: Vec<ColumnType>,
    max_iterations: Option<usize>,
    total_iterations: usize,
    status: CoreStatus,
    infeasible_row: Option<usize>,
    infeasible_sign: i32,
}

impl<U, V> CoreSolver<U, V>
where
    U: CoreCoefficient,
    V: CoreValue<U>,
{
    pub fn new(parameters: CoreSolverParameters<U, V>, max_iterations: Option<usize>) -> Result<Self> {
        let CoreSolverParameters {
            a,
            low_bounds,
            upper_bounds,
            column_types,
            basis,
            x,
        } = parameters;

        let rows = a.row_count();
        let columns = a.column_count();
        if basis.len() != rows {
            return Err(anyhow!(
                "the basis has {} columns, but there are {} rows",
                basis.len(),
                rows
            ));
        }
        if low_bounds.len() != columns
            || upper_bounds.len() != columns
            || column_types.len() != columns
            || x.len() != columns
        {
            return Err(anyhow!("the bound, type and value vectors must have {} entries", columns));
        }

        let mut tableau = Array2::from_elem((rows, columns), U::zero());
        for (i, row) in a.rows().enumerate() {
            for (j, value) in row {
                tableau[[i, *j]] = value.clone();
            }
        }

        let mut result = Self {
            tableau,
            basis: vec![],
            basis_heading: vec![None; columns],
            x,
            low_bounds,
            upper_bounds,
            column_types,
            max_iterations,
            total_iterations: 0,
            status: CoreStatus::Unknown,
            infeasible_row: None,
            infeasible_sign: 0,
        };

        //bring the tableau into the requested basis; a basis column may end up in any row
        let mut row_basis: Vec<Option<usize>> = vec![None; rows];
        for b in basis {
            if b >= columns {
                return Err(anyhow!("basis column {} out of range", b));
            }
            if result.basis_heading[b].is_some() {
                return Err(anyhow!("column {} occurs twice in the basis", b));
            }
            let Some(i) =
                (0..rows).find(|i| row_basis[*i].is_none() && !result.tableau[[*i, b]].is_zero())
            else {
                return Err(anyhow!("basis column {} depends linearly on the others", b));
            };
            result.pivot_row(i, b);
            row_basis[i] = Some(b);
            result.basis_heading[b] = Some(i);
        }
        result.basis = row_basis
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| anyhow!("the basis does not cover every row"))?;

        for i in 0..rows {
            let value = result.compute_basic_value(i);
            let b = result.basis[i];
            result.x[b] = value;
        }

        Ok(result)
    }

    /**
     * Runs the simplex until all columns are within their bounds, an infeasible row is found, or
     * the iteration limit is reached.
     */
    pub fn solve(&mut self) -> CoreStatus {
        debug!(
            "core solver starts on {} rows and {} columns",
            self.tableau.nrows(),
            self.tableau.ncols()
        );
        self.infeasible_row = None;
        self.infeasible_sign = 0;

        let mut iterations = 0;
        loop {
            let Some(i) = self.find_violated_row() else {
                self.status = CoreStatus::Feasible;
                break;
            };

            if let Some(limit) = self.max_iterations {
                if iterations >= limit {
                    self.status = CoreStatus::IterationLimit;
                    break;
                }
            }

            let b = self.basis[i];
            let increase = self.is_below_low_bound(b);
            match self.find_entering_column(i, increase) {
                None => {
                    self.infeasible_row = Some(i);
                    self.infeasible_sign = if increase { 1 } else { -1 };
                    self.status = CoreStatus::Infeasible;
                    break;
                }
                Some(j) => {
                    let target = if increase {
                        self.low_bounds[b].clone()
                    } else {
                        self.upper_bounds[b].clone()
                    };
                    trace!("pivot: column {} leaves, column {} enters", b, j);
                    self.update_and_pivot(i, j, target);
                    iterations += 1;
                }
            }
        }

        self.total_iterations += iterations;
        debug!(
            "core solver finished with {:?} after {} iterations",
            self.status, iterations
        );
        self.status
    }

    pub fn status(&self) -> CoreStatus {
        self.status
    }

    pub fn x(&self) -> &[V] {
        &self.x
    }

    pub fn basis(&self) -> &[usize] {
        &self.basis
    }

    pub fn is_basic(&self, column: usize) -> bool {
        self.basis_heading[column].is_some()
    }

    pub fn column_count(&self) -> usize {
        self.tableau.ncols()
    }

    pub fn total_iterations(&self) -> usize {
        self.total_iterations
    }

    /**
     * After an infeasible outcome: the offending row as (coefficient, column) pairs, including the
     * basic column with coefficient one, such that the row sums to zero; and the sign, which is +1 if
     * the basic column is below its low bound and -1 if it is above its upper bound.
     */
    pub fn get_infeasible_row(&self) -> Option<(Vec<(U, usize)>, i32)> {
        let i = self.infeasible_row?;
        let row = self
            .tableau
            .row(i)
            .iter()
            .enumerate()
            .filter(|(_, value)| !value.is_zero())
            .map(|(j, value)| (value.clone(), j))
            .collect();
        Some((row, self.infeasible_sign))
    }

    /**
     * Returns the bound a non-basic column rests on, or None for a basic column or a bounded
     * column that is not at one of its bounds.
     */
    pub fn non_basic_column_value_position(&self, column: usize) -> Option<NonBasicColumnValuePosition> {
        if self.is_basic(column) {
            return None;
        }
        let value = &self.x[column];
        let column_type = self.column_types[column];
        match column_type {
            ColumnType::Fixed => Some(NonBasicColumnValuePosition::AtFixed),
            ColumnType::Free => Some(NonBasicColumnValuePosition::FreeOfBounds),
            _ => {
                if column_type.has_low_bound() && Self::equals(value, &self.low_bounds[column]) {
                    Some(NonBasicColumnValuePosition::AtLowBound)
                } else if column_type.has_upper_bound()
                    && Self::equals(value, &self.upper_bounds[column])
                {
                    Some(NonBasicColumnValuePosition::AtUpperBound)
                } else {
                    None
                }
            }
        }
    }

    pub fn column_is_feasible(&self, column: usize) -> bool {
        !self.is_below_low_bound(column) && !self.is_above_upper_bound(column)
    }

    fn equals(a: &V, b: &V) -> bool {
        let mut difference = a.clone();
        difference -= b;
        difference.is_zero()
    }

    fn less_than(a: &V, b: &V) -> bool {
        let mut difference = b.clone();
        difference -= a;
        difference.is_positive()
    }

    fn is_below_low_bound(&self, column: usize) -> bool {
        self.column_types[column].has_low_bound()
            && Self::less_than(&self.x[column], &self.low_bounds[column])
    }

    fn is_above_upper_bound(&self, column: usize) -> bool {
        self.column_types[column].has_upper_bound()
            && Self::less_than(&self.upper_bounds[column], &self.x[column])
    }

    fn can_increase(&self, column: usize) -> bool {
        !self.column_types[column].has_upper_bound()
            || Self::less_than(&self.x[column], &self.upper_bounds[column])
    }

    fn can_decrease(&self, column: usize) -> bool {
        !self.column_types[column].has_low_bound()
            || Self::less_than(&self.low_bounds[column], &self.x[column])
    }

    /// Bland: of all violated basic columns, take the one with the lowest index.
    fn find_violated_row(&self) -> Option<usize> {
        self.basis
            .iter()
            .enumerate()
            .filter(|(_, b)| !self.column_is_feasible(**b))
            .min_by_key(|(_, b)| **b)
            .map(|(i, _)| i)
    }

    /**
     * The basic column of row i equals -sum_j T[i][j] * x_j over the non-basic columns.
     * To increase it, a column with a negative entry must increase or one with a positive entry must decrease.
     */
    fn find_entering_column(&self, i: usize, increase: bool) -> Option<usize> {
        let b = self.basis[i];
        for (j, coefficient) in self.tableau.row(i).iter().enumerate() {
            if j == b || coefficient.is_zero() || self.is_basic(j) {
                continue;
            }
            let column_must_increase = coefficient.is_negative() == increase;
            if column_must_increase {
                if self.can_increase(j) {
                    return Some(j);
                }
            } else if self.can_decrease(j) {
                return Some(j);
            }
        }
        None
    }

    fn compute_basic_value(&self, i: usize) -> V {
        let b = self.basis[i];
        let mut value = V::zero();
        for (j, coefficient) in self.tableau.row(i).iter().enumerate() {
            if j == b || coefficient.is_zero() {
                continue;
            }
            value -= &self.x[j].scaled(coefficient);
        }
        value
    }

    /**
     * Moves the basic column of row i to `target` by changing the non-basic column `entering`,
     * updates all other basic columns, and swaps the two columns in the basis.
     */
    fn update_and_pivot(&mut self, i: usize, entering: usize, target: V) {
        let leaving = self.basis[i];

        let mut difference = target.clone();
        difference -= &self.x[leaving];
        let theta = difference.divided(&-self.tableau[[i, entering]].clone());

        self.x[entering] += &theta;
        self.x[leaving] = target;
        for k in 0..self.basis.len() {
            if k == i || self.tableau[[k, entering]].is_zero() {
                continue;
            }
            let change = theta.scaled(&self.tableau[[k, entering]]);
            self.x[self.basis[k]] -= &change;
        }

        self.pivot_row(i, entering);
        self.basis_heading[leaving] = None;
        self.basis_heading[entering] = Some(i);
        self.basis[i] = entering;
    }

    /// Scales row i to have a one at `column`, and eliminates `column` from all other rows.
    fn pivot_row(&mut self, i: usize, column: usize) {
        let pivot = self.tableau[[i, column]].clone();
        if !pivot.is_one() {
            for value in self.tableau.row_mut(i).iter_mut() {
                *value /= &pivot;
            }
        }
        self.tableau[[i, column]] = U::one();

        for k in 0..self.tableau.nrows() {
            if k == i || self.tableau[[k, column]].is_zero() {
                continue;
            }
            let factor = self.tableau[[k, column]].clone();
            for j in 0..self.tableau.ncols() {
                if self.tableau[[i, j]].is_zero() {
                    continue;
                }
                let mut change = self.tableau[[i, j]].clone();
                change *= &factor;
                self.tableau[[k, j]] -= &change;
                if self.tableau[[k, j]].is_zero() {
                    self.tableau[[k, j]].set_zero();
                }
            }
            self.tableau[[k, column]].set_zero();
        }
    }
}

#[cfg(test)]
mod tests {
    use ntest::timeout;

    use super::{ColumnType, CoreSolver, CoreSolverParameters, CoreStatus, NonBasicColumnValuePosition};
    use crate::{
        math::{numeric_pair::NumericPair, rational::Rational, traits::Zero},
        optimisation_algorithms::static_matrix::StaticMatrix,
        r,
    };

    fn pair(x: i64) -> NumericPair {
        NumericPair::from_rational(r!(x))
    }

    /// x + y - s = 0, with 3 <= x, 3 <= y, s <= upper
    fn two_variables_one_sum(upper: NumericPair) -> CoreSolverParameters<Rational, NumericPair> {
        let mut a = StaticMatrix::new(3);
        a.add_row(vec![(0, r!(1)), (1, r!(1)), (2, r!(-1))]);
        CoreSolverParameters {
            a,
            low_bounds: vec![pair(3), pair(3), NumericPair::zero()],
            upper_bounds: vec![NumericPair::zero(), NumericPair::zero(), upper],
            column_types: vec![ColumnType::LowBound, ColumnType::LowBound, ColumnType::UpperBound],
            basis: vec![2],
            x: vec![pair(3), pair(3), NumericPair::zero()],
        }
    }

    #[test]
    #[timeout(1000)]
    fn infeasible_row() {
        let mut solver = CoreSolver::new(two_variables_one_sum(pair(4)), None).unwrap();
        assert_eq!(solver.x()[2], pair(6));
        assert_eq!(solver.solve(), CoreStatus::Infeasible);

        let (row, sign) = solver.get_infeasible_row().unwrap();
        assert_eq!(sign, -1);
        assert_eq!(row, vec![(r!(-1), 0), (r!(-1), 1), (r!(1), 2)]);
    }

    #[test]
    #[timeout(1000)]
    fn feasible_after_pivot() {
        let mut params = two_variables_one_sum(pair(10));
        //x is boxed in [3, 4], s must be at least 9
        params.column_types = vec![ColumnType::Boxed, ColumnType::LowBound, ColumnType::LowBound];
        params.upper_bounds[0] = pair(4);
        params.low_bounds[2] = pair(9);
        let mut solver = CoreSolver::new(params, None).unwrap();
        assert_eq!(solver.solve(), CoreStatus::Feasible);
        //x enters first and overshoots its upper bound, then y repairs it
        assert_eq!(solver.total_iterations(), 2);

        let x = solver.x();
        assert_eq!(&x[0] + &x[1], x[2]);
        assert_eq!(x[0], pair(4));
        assert_eq!(x[1], pair(5));
        assert_eq!(x[2], pair(9));
        for column in 0..3 {
            assert!(solver.column_is_feasible(column));
        }
        assert!(solver.is_basic(1));
        assert_eq!(solver.basis(), &[1]);
        assert_eq!(
            solver.non_basic_column_value_position(0),
            Some(NonBasicColumnValuePosition::AtUpperBound)
        );
        assert_eq!(
            solver.non_basic_column_value_position(2),
            Some(NonBasicColumnValuePosition::AtLowBound)
        );
        assert_eq!(solver.non_basic_column_value_position(1), None);
    }

    #[test]
    #[timeout(1000)]
    fn strict_bounds() {
        //s < 6 is infeasible for x, y >= 3
        let just_below_six = NumericPair::new(r!(6), r!(-1));
        let mut solver = CoreSolver::new(two_variables_one_sum(just_below_six), None).unwrap();
        assert_eq!(solver.solve(), CoreStatus::Infeasible);

        //s <= 6 is feasible
        let mut solver = CoreSolver::new(two_variables_one_sum(pair(6)), None).unwrap();
        assert_eq!(solver.solve(), CoreStatus::Feasible);
    }

    #[test]
    #[timeout(1000)]
    fn floats() {
        let mut a = StaticMatrix::new(3);
        a.add_row(vec![(0, 1.0), (1, 1.0), (2, -1.0)]);
        let params = CoreSolverParameters {
            a,
            low_bounds: vec![0.0, 0.0, 2.5],
            upper_bounds: vec![1.0, 0.0, 0.0],
            column_types: vec![ColumnType::Boxed, ColumnType::LowBound, ColumnType::LowBound],
            basis: vec![2],
            x: vec![0.0; 3],
        };
        let mut solver = CoreSolver::new(params, None).unwrap();
        assert_eq!(solver.solve(), CoreStatus::Feasible);
        let x = solver.x();
        assert!((x[0] + x[1] - x[2]).abs() < 1e-9);
        assert!(x[2] >= 2.5 - 1e-9);
    }

    #[test]
    fn iteration_limit() {
        let mut params = two_variables_one_sum(pair(10));
        params.column_types[2] = ColumnType::LowBound;
        params.low_bounds[2] = pair(9);
        let mut solver = CoreSolver::new(params, Some(0)).unwrap();
        assert_eq!(solver.solve(), CoreStatus::IterationLimit);
    }

    #[test]
    fn invalid_basis() {
        let mut params = two_variables_one_sum(pair(4));
        params.basis = vec![];
        assert!(CoreSolver::new(params, None).is_err());

        let mut params = two_variables_one_sum(pair(4));
        params.a = StaticMatrix::new(3);
        params.a.add_row(vec![(0, r!(1))]);
        assert!(CoreSolver::new(params, None).is_err());
    }

    #[test]
    fn basis_in_any_row_order() {
        //x - s = 0 and y - t = 0, with basis given as [y, x]
        let mut a = StaticMatrix::new(4);
        a.add_row(vec![(0, r!(1)), (2, r!(-1))]);
        a.add_row(vec![(1, r!(1)), (3, r!(-1))]);
        let params = CoreSolverParameters {
            a,
            low_bounds: vec![NumericPair::zero(), NumericPair::zero(), pair(2), pair(3)],
            upper_bounds: vec![NumericPair::zero(); 4],
            column_types: vec![ColumnType::Free, ColumnType::Free, ColumnType::LowBound, ColumnType::LowBound],
            basis: vec![1, 0],
            x: vec![NumericPair::zero(), NumericPair::zero(), pair(2), pair(3)],
        };
        let mut solver = CoreSolver::new(params, None).unwrap();
        assert_eq!(solver.basis(), &[0, 1]);
        assert_eq!(solver.x()[0], pair(2));
        assert_eq!(solver.x()[1], pair(3));
        assert_eq!(solver.solve(), CoreStatus::Feasible);
        assert_eq!(solver.total_iterations(), 0);
    }
}
