use num::{One as NumOne, Signed as NumSigned, Zero as NumZero};
use num_rational::BigRational;

/// Tolerance used whenever approximate (f64) values are compared.
pub const EPSILON: f64 = 1e-9;

pub trait One: Sized {
    fn one() -> Self;

    fn set_one(&mut self) {
        *self = One::one();
    }

    fn is_one(&self) -> bool;
}

pub trait Zero: Sized {
    fn zero() -> Self;

    fn set_zero(&mut self) {
        *self = Zero::zero();
    }

    fn is_zero(&self) -> bool;
}

pub trait Signed: Sized {
    fn abs(&self) -> Self;

    /// Returns true if the number is positive and false if the number is zero or negative.
    fn is_positive(&self) -> bool;

    /// Returns true if the number is negative and false if the number is zero or positive.
    fn is_negative(&self) -> bool;
}

// ============ implementations ============

impl One for BigRational {
    fn one() -> Self {
        <BigRational as NumOne>::one()
    }

    fn is_one(&self) -> bool {
        <BigRational as NumOne>::is_one(self)
    }
}

impl Zero for BigRational {
    fn zero() -> Self {
        <BigRational as NumZero>::zero()
    }

    fn is_zero(&self) -> bool {
        <BigRational as NumZero>::is_zero(self)
    }
}

impl Signed for BigRational {
    fn abs(&self) -> Self {
        <BigRational as NumSigned>::abs(self)
    }

    fn is_positive(&self) -> bool {
        <BigRational as NumSigned>::is_positive(self)
    }

    fn is_negative(&self) -> bool {
        <BigRational as NumSigned>::is_negative(self)
    }
}

impl One for f64 {
    fn one() -> Self {
        1.0
    }

    fn is_one(&self) -> bool {
        f64::abs(self - 1.0) < EPSILON
    }
}

impl Zero for f64 {
    fn zero() -> Self {
        0.0
    }

    fn is_zero(&self) -> bool {
        f64::abs(*self) < EPSILON
    }
}

impl Signed for f64 {
    fn abs(&self) -> Self {
        f64::abs(*self)
    }

    fn is_positive(&self) -> bool {
        self > &EPSILON
    }

    fn is_negative(&self) -> bool {
        self < &-EPSILON
    }
}
