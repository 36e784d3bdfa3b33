use anyhow::{Context, Result, anyhow};
use std::str::FromStr;

pub use num_bigint::BigInt;

/// Exact arbitrary-precision rational number used for all user-facing values.
pub type Rational = num_rational::BigRational;

#[macro_export]
macro_rules! r {
    ($n:expr) => {
        $crate::math::rational::Rational::from_integer($crate::math::rational::BigInt::from($n))
    };
    ($n:expr, $d:expr) => {
        $crate::math::rational::Rational::new(
            $crate::math::rational::BigInt::from($n),
            $crate::math::rational::BigInt::from($d),
        )
    };
}

#[macro_export]
macro_rules! r0 {
    () => {
        $crate::r!(0)
    };
}

#[macro_export]
macro_rules! r1 {
    () => {
        $crate::r!(1)
    };
}

/**
 * Parses an integer ("-7"), a fraction ("3/4") or a decimal ("-1.25") into an exact rational.
 */
pub fn parse_rational(s: &str) -> Result<Rational> {
    let s = s.trim();
    if s.is_empty() {
        return Err(anyhow!("empty number"));
    }

    if let Some((numer, denom)) = s.split_once('/') {
        let numer = BigInt::from_str(numer.trim()).with_context(|| format!("numerator of `{}`", s))?;
        let denom = BigInt::from_str(denom.trim()).with_context(|| format!("denominator of `{}`", s))?;
        if denom == BigInt::from(0) {
            return Err(anyhow!("zero denominator in `{}`", s));
        }
        return Ok(Rational::new(numer, denom));
    }

    let (negative, unsigned) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let value = match unsigned.split_once('.') {
        Some((integer_part, fraction_part)) => {
            if !fraction_part.chars().all(|c| c.is_ascii_digit())
                || !integer_part.chars().all(|c| c.is_ascii_digit())
                || (integer_part.is_empty() && fraction_part.is_empty())
            {
                return Err(anyhow!("`{}` is not a number", s));
            }
            let digits = format!("{}{}", integer_part, fraction_part);
            let numer = BigInt::from_str(&digits).with_context(|| format!("parsing `{}`", s))?;
            let denom = BigInt::from(10u32).pow(fraction_part.len() as u32);
            Rational::new(numer, denom)
        }
        None => Rational::from_integer(
            BigInt::from_str(unsigned).with_context(|| format!("parsing `{}`", s))?,
        ),
    };

    Ok(if negative { -value } else { value })
}
