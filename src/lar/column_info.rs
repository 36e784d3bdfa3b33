use std::fmt::Display;

use crate::{
    lar::lar_constraints::{ConstraintIndex, LconstraintKind},
    math::rational::Rational,
    optimisation_algorithms::core_solver::ColumnType,
};

/**
 * The aggregated bounds of one internal column. The low bound is the maximum and the upper bound
 * the minimum of all bounds merged in; on equal values the strict bound wins. Each bound remembers
 * the constraint it came from (its witness), which is where evidence for a conflict is read from.
 */
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnInfo {
    low_bound: Option<Bound>,
    upper_bound: Option<Bound>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bound {
    pub value: Rational,
    pub is_strict: bool,
    pub witness: ConstraintIndex,
}

impl ColumnInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn low_bound(&self) -> Option<&Bound> {
        self.low_bound.as_ref()
    }

    pub fn upper_bound(&self) -> Option<&Bound> {
        self.upper_bound.as_ref()
    }

    /// Merges the bound implied by `column <kind> value`.
    pub fn update(&mut self, kind: LconstraintKind, value: &Rational, witness: ConstraintIndex) {
        match kind {
            LconstraintKind::Le | LconstraintKind::Lt => {
                self.update_upper_bound(value, kind.is_strict(), witness)
            }
            LconstraintKind::Ge | LconstraintKind::Gt => {
                self.update_low_bound(value, kind.is_strict(), witness)
            }
            LconstraintKind::Eq => {
                self.update_low_bound(value, false, witness);
                self.update_upper_bound(value, false, witness);
            }
        }
    }

    pub fn update_low_bound(&mut self, value: &Rational, is_strict: bool, witness: ConstraintIndex) {
        let tighter = match &self.low_bound {
            None => true,
            Some(old) => value > &old.value || (value == &old.value && is_strict && !old.is_strict),
        };
        if tighter {
            self.low_bound = Some(Bound {
                value: value.clone(),
                is_strict,
                witness,
            });
        }
    }

    pub fn update_upper_bound(&mut self, value: &Rational, is_strict: bool, witness: ConstraintIndex) {
        let tighter = match &self.upper_bound {
            None => true,
            Some(old) => value < &old.value || (value == &old.value && is_strict && !old.is_strict),
        };
        if tighter {
            self.upper_bound = Some(Bound {
                value: value.clone(),
                is_strict,
                witness,
            });
        }
    }

    /// No value lies between the bounds.
    pub fn is_infeasible(&self) -> bool {
        match (&self.low_bound, &self.upper_bound) {
            (Some(low), Some(upper)) => {
                low.value > upper.value
                    || (low.value == upper.value && (low.is_strict || upper.is_strict))
            }
            _ => false,
        }
    }

    pub fn is_fixed(&self) -> bool {
        match (&self.low_bound, &self.upper_bound) {
            (Some(low), Some(upper)) => {
                low.value == upper.value && !low.is_strict && !upper.is_strict
            }
            _ => false,
        }
    }

    pub fn get_column_type(&self) -> ColumnType {
        match (&self.low_bound, &self.upper_bound) {
            (None, None) => ColumnType::Free,
            (Some(_), None) => ColumnType::LowBound,
            (None, Some(_)) => ColumnType::UpperBound,
            (Some(_), Some(_)) => {
                if self.is_fixed() {
                    ColumnType::Fixed
                } else {
                    ColumnType::Boxed
                }
            }
        }
    }

    /// Whether `value` lies within the bounds, respecting strictness.
    pub fn admits(&self, value: &Rational) -> bool {
        let above_low = match &self.low_bound {
            None => true,
            Some(low) if low.is_strict => value > &low.value,
            Some(low) => value >= &low.value,
        };
        let below_upper = match &self.upper_bound {
            None => true,
            Some(upper) if upper.is_strict => value < &upper.value,
            Some(upper) => value <= &upper.value,
        };
        above_low && below_upper
    }
}

impl Display for ColumnInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.low_bound {
            None => write!(f, "(-inf")?,
            Some(low) if low.is_strict => write!(f, "({}", low.value)?,
            Some(low) => write!(f, "[{}", low.value)?,
        }
        match &self.upper_bound {
            None => write!(f, ", inf)"),
            Some(upper) if upper.is_strict => write!(f, ", {})", upper.value),
            Some(upper) => write!(f, ", {}]", upper.value),
        }
    }
}
