use num_traits::ToPrimitive;
use std::{
    fmt::{Debug, Display},
    ops::{AddAssign, DivAssign, MulAssign, Neg, SubAssign},
};

use crate::math::{
    numeric_pair::NumericPair,
    rational::Rational,
    traits::{One, Signed, Zero},
};

/**
 * The entries of the matrix the simplex engine works on.
 * Implemented by f64 for the approximate pass and by Rational for the exact pass.
 */
pub trait CoreCoefficient:
    Clone
    + Debug
    + Display
    + Zero
    + One
    + Signed
    + Neg<Output = Self>
    + for<'a> AddAssign<&'a Self>
    + for<'a> SubAssign<&'a Self>
    + for<'a> MulAssign<&'a Self>
    + for<'a> DivAssign<&'a Self>
{
    fn from_rational(value: &Rational) -> Self;
}

/**
 * The column values and bounds the simplex engine works on, scalable by coefficients of type U.
 * Implemented by f64 (with U = f64) and by NumericPair (with U = Rational).
 */
pub trait CoreValue<U: CoreCoefficient>:
    Clone + Debug + Display + Zero + Signed + for<'a> AddAssign<&'a Self> + for<'a> SubAssign<&'a Self>
{
    fn scaled(&self, coefficient: &U) -> Self;

    fn divided(&self, coefficient: &U) -> Self;
}

impl CoreCoefficient for f64 {
    fn from_rational(value: &Rational) -> Self {
        match (value.numer().to_f64(), value.denom().to_f64()) {
            (Some(numer), Some(denom)) => numer / denom,
            _ => 0.0,
        }
    }
}

impl CoreCoefficient for Rational {
    fn from_rational(value: &Rational) -> Self {
        value.clone()
    }
}

impl CoreValue<f64> for f64 {
    fn scaled(&self, coefficient: &f64) -> Self {
        self * coefficient
    }

    fn divided(&self, coefficient: &f64) -> Self {
        self / coefficient
    }
}

impl CoreValue<Rational> for NumericPair {
    fn scaled(&self, coefficient: &Rational) -> Self {
        self.scale(coefficient)
    }

    fn divided(&self, coefficient: &Rational) -> Self {
        self.divide(coefficient)
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreCoefficient, CoreValue};
    use crate::{math::numeric_pair::NumericPair, r};

    #[test]
    fn rational_to_float() {
        assert_eq!(f64::from_rational(&r!(3, 4)), 0.75);
        assert_eq!(f64::from_rational(&r!(-5)), -5.0);
    }

    #[test]
    fn scaling() {
        assert_eq!(2.5f64.scaled(&2.0), 5.0);
        assert_eq!(5.0f64.divided(&-2.0), -2.5);
        let pair = NumericPair::new(r!(1), r!(-1));
        assert_eq!(pair.scaled(&r!(3)), NumericPair::new(r!(3), r!(-3)));
        assert_eq!(pair.divided(&r!(2)), NumericPair::new(r!(1, 2), r!(-1, 2)));
    }
}
