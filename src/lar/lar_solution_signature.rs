use rustc_hash::FxHashMap;

use crate::{
    math::core_number::{CoreCoefficient, CoreValue},
    optimisation_algorithms::core_solver::{CoreSolver, NonBasicColumnValuePosition},
};

/**
 * Where a solve ended: the basic columns and, for each non-basic column, the bound it rests on.
 * Columns are named by their internal column (canonical left side index), so a signature found on
 * one numeric representation can seed a solve on another. It is a hint only.
 */
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LarSolutionSignature {
    pub basis: Vec<usize>,
    pub positions: FxHashMap<usize, NonBasicColumnValuePosition>,
}

impl LarSolutionSignature {
    /// `columns` maps engine columns to internal columns.
    pub fn extract<U, V>(solver: &CoreSolver<U, V>, columns: &[usize]) -> Self
    where
        U: CoreCoefficient,
        V: CoreValue<U>,
    {
        let basis = solver.basis().iter().map(|j| columns[*j]).collect();
        let mut positions = FxHashMap::default();
        for (j, column) in columns.iter().enumerate() {
            if let Some(position) = solver.non_basic_column_value_position(j) {
                positions.insert(*column, position);
            }
        }
        Self { basis, positions }
    }

    pub fn position(&self, column: usize) -> Option<NonBasicColumnValuePosition> {
        self.positions.get(&column).copied()
    }
}
