use std::collections::BTreeMap;

use anyhow::{Result, anyhow};
use log::debug;

use crate::{
    lar::{
        conversion_helper::{Exact, NumericRepresentation},
        lar_constraints::{ConstraintIndex, LconstraintKind, VarIndex},
        lar_solver::{LarSolver, LarStatus},
    },
    math::{
        numeric_pair::NumericPair,
        rational::Rational,
        traits::{One, Signed, Zero},
    },
};

pub type LarModel = BTreeMap<VarIndex, Rational>;

/// Lowers `delta` such that `value >= low` still holds once `delta` is substituted for ε.
pub fn restrict_delta_on_low_bound_column(delta: &mut Rational, value: &NumericPair, low: &NumericPair) {
    if low.x < value.x && low.y > value.y {
        let limit = (&value.x - &low.x) / (&low.y - &value.y);
        if limit < *delta {
            *delta = limit;
        }
    }
}

/// Lowers `delta` such that `value <= upper` still holds once `delta` is substituted for ε.
pub fn restrict_delta_on_upper_bound(delta: &mut Rational, value: &NumericPair, upper: &NumericPair) {
    if value.x < upper.x && value.y > upper.y {
        let limit = (&upper.x - &value.x) / (&value.y - &upper.y);
        if limit < *delta {
            *delta = limit;
        }
    }
}

impl LarSolver {
    /**
     * A positive rational that can replace ε in the exact solution: every column stays within its
     * bounds, and as strict bounds carry an ε themselves, these stay strictly satisfied.
     */
    pub fn find_delta_for_strict_bounds(&self) -> Result<Rational> {
        let core = self
            .core
            .as_ref()
            .ok_or_else(|| anyhow!("there is no exact solution to take a delta from"))?;

        let mut delta = Rational::one();
        for (value, column) in core.x.iter().zip(core.columns.iter()) {
            let info = &self.column_infos[*column];
            if info.low_bound().is_some() {
                restrict_delta_on_low_bound_column(&mut delta, value, &Exact::convert_low_bound(info));
            }
            if info.upper_bound().is_some() {
                restrict_delta_on_upper_bound(&mut delta, value, &Exact::convert_upper_bound(info));
            }
        }
        Ok(delta)
    }

    /**
     * After a satisfiable outcome, returns a value for every variable; variables that occur in no
     * constraint are zero. The model is checked against every constraint before it is returned.
     */
    pub fn get_model(&self) -> Result<LarModel> {
        if self.status != LarStatus::Satisfiable {
            return Err(anyhow!(
                "a model is only available for satisfiable problems; status is {}",
                self.status
            ));
        }
        let core = self
            .core
            .as_ref()
            .ok_or_else(|| anyhow!("there is no exact solution to take a model from"))?;
        let delta = self.find_delta_for_strict_bounds()?;
        debug!("delta for strict bounds: {}", delta);

        let model: LarModel = self
            .var_left_sides
            .iter()
            .enumerate()
            .map(|(var, column)| {
                let value = match core.value(*column) {
                    Some(value) => value.get(&delta),
                    None => Rational::zero(),
                };
                (var, value)
            })
            .collect();

        if let Some(constraint) =
            (0..self.number_of_constraints()).find(|c| !self.constraint_holds(*c, &model))
        {
            return Err(anyhow!(
                "internal error: the model violates constraint {}",
                constraint
            ));
        }
        Ok(model)
    }

    /// The original left side of the constraint under `values`; missing variables count as zero.
    pub fn get_left_side_val(&self, constraint: ConstraintIndex, values: &LarModel) -> Rational {
        let mut result = Rational::zero();
        for (coefficient, var) in &self.get_constraint(constraint).left_side {
            if let Some(value) = values.get(var) {
                result += coefficient * value;
            }
        }
        result
    }

    pub fn constraint_holds(&self, constraint: ConstraintIndex, values: &LarModel) -> bool {
        let origin = self.get_constraint(constraint);
        origin
            .kind
            .holds(&self.get_left_side_val(constraint, values), &origin.right_side)
    }

    pub fn all_constraints_hold(&self, values: &LarModel) -> bool {
        (0..self.number_of_constraints()).all(|constraint| self.constraint_holds(constraint, values))
    }

    pub fn get_canonic_left_side_val(&self, column: usize, values: &LarModel) -> Rational {
        self.left_sides.get(column).value(values)
    }

    /**
     * How far `values` are from satisfying the normalized constraint, measured on its canonical left
     * side. Strictness is ignored.
     */
    pub fn get_infeasibility_of_constraint(&self, constraint: ConstraintIndex, values: &LarModel) -> Rational {
        let normalized = self.get_normalized_constraint(constraint);
        let left = match normalized.canonic_left_side {
            Some(column) => self.get_canonic_left_side_val(column, values),
            None => Rational::zero(),
        };
        let difference = &left - &normalized.right_side;
        match normalized.kind {
            LconstraintKind::Le | LconstraintKind::Lt if difference.is_positive() => difference,
            LconstraintKind::Ge | LconstraintKind::Gt if difference.is_negative() => -difference,
            LconstraintKind::Eq => difference.abs(),
            _ => Rational::zero(),
        }
    }

    pub fn get_infeasibility_of_solution(&self, values: &LarModel) -> Rational {
        let mut result = Rational::zero();
        for constraint in 0..self.number_of_constraints() {
            result += self.get_infeasibility_of_constraint(constraint, values);
        }
        result
    }
}
