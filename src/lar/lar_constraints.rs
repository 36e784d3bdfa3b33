use std::{collections::BTreeMap, fmt::Display};

use strum_macros::EnumIter;

use crate::math::{rational::Rational, traits::Zero};

pub type VarIndex = usize;
pub type ConstraintIndex = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum LconstraintKind {
    Le,
    Lt,
    Ge,
    Gt,
    Eq,
}

impl LconstraintKind {
    /// The relation obtained by multiplying both sides with a negative number.
    pub fn flip(&self) -> Self {
        match self {
            LconstraintKind::Le => LconstraintKind::Ge,
            LconstraintKind::Lt => LconstraintKind::Gt,
            LconstraintKind::Ge => LconstraintKind::Le,
            LconstraintKind::Gt => LconstraintKind::Lt,
            LconstraintKind::Eq => LconstraintKind::Eq,
        }
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, LconstraintKind::Lt | LconstraintKind::Gt)
    }

    /// Whether the relation bounds its left side from above.
    pub fn is_upper(&self) -> bool {
        matches!(self, LconstraintKind::Le | LconstraintKind::Lt | LconstraintKind::Eq)
    }

    /// Whether the relation bounds its left side from below.
    pub fn is_low(&self) -> bool {
        matches!(self, LconstraintKind::Ge | LconstraintKind::Gt | LconstraintKind::Eq)
    }

    pub fn holds(&self, left: &Rational, right: &Rational) -> bool {
        match self {
            LconstraintKind::Le => left <= right,
            LconstraintKind::Lt => left < right,
            LconstraintKind::Ge => left >= right,
            LconstraintKind::Gt => left > right,
            LconstraintKind::Eq => left == right,
        }
    }
}

impl Display for LconstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                LconstraintKind::Le => "<=",
                LconstraintKind::Lt => "<",
                LconstraintKind::Ge => ">=",
                LconstraintKind::Gt => ">",
                LconstraintKind::Eq => "=",
            }
        )
    }
}

/// A constraint as the user added it: `sum coefficient * var <kind> right_side`.
#[derive(Clone, Debug)]
pub struct LarConstraint {
    pub left_side: Vec<(Rational, VarIndex)>,
    pub kind: LconstraintKind,
    pub right_side: Rational,
}

impl LarConstraint {
    pub fn new(left_side: Vec<(Rational, VarIndex)>, kind: LconstraintKind, right_side: Rational) -> Self {
        Self {
            left_side,
            kind,
            right_side,
        }
    }

    /// The left side with repeated variables merged and zero coefficients removed.
    pub fn left_side_coefficients(&self) -> BTreeMap<VarIndex, Rational> {
        let mut result: BTreeMap<VarIndex, Rational> = BTreeMap::new();
        for (coefficient, var) in &self.left_side {
            *result.entry(*var).or_insert_with(Rational::zero) += coefficient;
        }
        result.retain(|_, coefficient| !coefficient.is_zero());
        result
    }
}

/**
 * A constraint rewritten against a canonical left side `L`: the original left side equals
 * `ratio_to_original * L`, and the constraint reads `L <kind> right_side`.
 * A constraint whose left side is identically zero has no canonical left side.
 */
#[derive(Clone, Debug)]
pub struct LarNormalizedConstraint {
    pub origin: LarConstraint,
    pub canonic_left_side: Option<usize>,
    pub ratio_to_original: Rational,
    pub kind: LconstraintKind,
    pub right_side: Rational,
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::{LarConstraint, LconstraintKind};
    use crate::{r, r0};

    #[test]
    fn flip_is_an_involution() {
        for kind in LconstraintKind::iter() {
            assert_eq!(kind.flip().flip(), kind);
            assert_eq!(kind.flip().is_strict(), kind.is_strict());
            assert_eq!(kind.flip().is_upper(), kind.is_low());
        }
    }

    #[test]
    fn holds() {
        assert!(LconstraintKind::Le.holds(&r!(1), &r!(1)));
        assert!(!LconstraintKind::Lt.holds(&r!(1), &r!(1)));
        assert!(LconstraintKind::Gt.holds(&r!(3, 2), &r!(1)));
        assert!(LconstraintKind::Eq.holds(&r!(2, 4), &r!(1, 2)));
        assert!(!LconstraintKind::Ge.holds(&r!(-1), &r0!()));
    }

    #[test]
    fn merged_left_side() {
        let constraint = LarConstraint::new(
            vec![(r!(1), 2), (r!(2), 0), (r!(-1), 2), (r!(3), 1)],
            LconstraintKind::Le,
            r!(4),
        );
        let coefficients = constraint.left_side_coefficients();
        assert_eq!(coefficients.len(), 2);
        assert_eq!(coefficients[&0], r!(2));
        assert_eq!(coefficients[&1], r!(3));
    }
}
