use std::{
    fmt::Display,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use crate::math::{
    rational::Rational,
    traits::{Signed, Zero},
};

/**
 * A value `x + y·ε`, where ε is a positive infinitesimal.
 * The derived ordering is lexicographic on (x, y), which is exactly the order of such values.
 *
 * A strict bound `v > b` becomes the non-strict bound `v >= (b, 1)`, and `v < b` becomes `v <= (b, -1)`.
 */
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NumericPair {
    pub x: Rational,
    pub y: Rational,
}

impl NumericPair {
    pub fn new(x: Rational, y: Rational) -> Self {
        Self { x, y }
    }

    pub fn from_rational(x: Rational) -> Self {
        Self {
            x,
            y: Rational::zero(),
        }
    }

    /// Substitutes `delta` for ε.
    pub fn get(&self, delta: &Rational) -> Rational {
        &self.x + &self.y * delta
    }

    pub fn scale(&self, factor: &Rational) -> Self {
        Self {
            x: &self.x * factor,
            y: &self.y * factor,
        }
    }

    pub fn divide(&self, factor: &Rational) -> Self {
        Self {
            x: &self.x / factor,
            y: &self.y / factor,
        }
    }
}

impl Zero for NumericPair {
    fn zero() -> Self {
        Self {
            x: Rational::zero(),
            y: Rational::zero(),
        }
    }

    fn is_zero(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }
}

impl Signed for NumericPair {
    fn abs(&self) -> Self {
        if self.is_negative() {
            -self.clone()
        } else {
            self.clone()
        }
    }

    fn is_positive(&self) -> bool {
        self.x.is_positive() || (self.x.is_zero() && self.y.is_positive())
    }

    fn is_negative(&self) -> bool {
        self.x.is_negative() || (self.x.is_zero() && self.y.is_negative())
    }
}

impl<'a> AddAssign<&'a NumericPair> for NumericPair {
    fn add_assign(&mut self, rhs: &'a NumericPair) {
        self.x += &rhs.x;
        self.y += &rhs.y;
    }
}

impl<'a> SubAssign<&'a NumericPair> for NumericPair {
    fn sub_assign(&mut self, rhs: &'a NumericPair) {
        self.x -= &rhs.x;
        self.y -= &rhs.y;
    }
}

impl<'a> Add<&'a NumericPair> for &'a NumericPair {
    type Output = NumericPair;

    fn add(self, rhs: &'a NumericPair) -> NumericPair {
        NumericPair {
            x: &self.x + &rhs.x,
            y: &self.y + &rhs.y,
        }
    }
}

impl<'a> Sub<&'a NumericPair> for &'a NumericPair {
    type Output = NumericPair;

    fn sub(self, rhs: &'a NumericPair) -> NumericPair {
        NumericPair {
            x: &self.x - &rhs.x,
            y: &self.y - &rhs.y,
        }
    }
}

impl Neg for NumericPair {
    type Output = NumericPair;

    fn neg(self) -> NumericPair {
        NumericPair {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl Display for NumericPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.y.is_zero() {
            write!(f, "{}", self.x)
        } else {
            write!(f, "({}, {}ε)", self.x, self.y)
        }
    }
}
