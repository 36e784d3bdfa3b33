use crate::{
    lar::column_info::ColumnInfo,
    math::{
        core_number::{CoreCoefficient, CoreValue},
        numeric_pair::NumericPair,
        rational::Rational,
        traits::{One, Zero},
    },
    optimisation_algorithms::core_solver::NonBasicColumnValuePosition,
};

/**
 * How exact column bounds are handed to the simplex engine. This is the only place where the
 * approximate and the exact solve differ.
 */
pub trait NumericRepresentation {
    type Coefficient: CoreCoefficient;
    type Value: CoreValue<Self::Coefficient>;

    const NAME: &'static str;

    fn convert_coefficient(value: &Rational) -> Self::Coefficient {
        <Self::Coefficient as CoreCoefficient>::from_rational(value)
    }

    /// The low bound of the column, or zero if it has none.
    fn convert_low_bound(info: &ColumnInfo) -> Self::Value;

    /// The upper bound of the column, or zero if it has none.
    fn convert_upper_bound(info: &ColumnInfo) -> Self::Value;

    /**
     * The value a non-basic column starts at. The requested position is followed if the column has
     * the corresponding bound; otherwise the column starts at its low bound, its upper bound, or zero.
     */
    fn initial_value(info: &ColumnInfo, position: Option<NonBasicColumnValuePosition>) -> Self::Value {
        let column_type = info.get_column_type();
        match position {
            Some(NonBasicColumnValuePosition::AtUpperBound) if column_type.has_upper_bound() => {
                return Self::convert_upper_bound(info);
            }
            Some(NonBasicColumnValuePosition::AtLowBound | NonBasicColumnValuePosition::AtFixed)
                if column_type.has_low_bound() =>
            {
                return Self::convert_low_bound(info);
            }
            _ => {}
        }

        if column_type.has_low_bound() {
            Self::convert_low_bound(info)
        } else if column_type.has_upper_bound() {
            Self::convert_upper_bound(info)
        } else {
            <Self::Value as Zero>::zero()
        }
    }
}

/// Floating point; strictness is dropped.
pub struct Approximate;

/// Rationals with an infinitesimal: a strict low bound `b` becomes `(b, 1)`, a strict upper bound `(b, -1)`.
pub struct Exact;

impl NumericRepresentation for Approximate {
    type Coefficient = f64;
    type Value = f64;

    const NAME: &'static str = "approximate";

    fn convert_low_bound(info: &ColumnInfo) -> f64 {
        match info.low_bound() {
            Some(bound) => f64::from_rational(&bound.value),
            None => 0.0,
        }
    }

    fn convert_upper_bound(info: &ColumnInfo) -> f64 {
        match info.upper_bound() {
            Some(bound) => f64::from_rational(&bound.value),
            None => 0.0,
        }
    }
}

impl NumericRepresentation for Exact {
    type Coefficient = Rational;
    type Value = NumericPair;

    const NAME: &'static str = "exact";

    fn convert_low_bound(info: &ColumnInfo) -> NumericPair {
        match info.low_bound() {
            Some(bound) if bound.is_strict => NumericPair::new(bound.value.clone(), Rational::one()),
            Some(bound) => NumericPair::from_rational(bound.value.clone()),
            None => NumericPair::zero(),
        }
    }

    fn convert_upper_bound(info: &ColumnInfo) -> NumericPair {
        match info.upper_bound() {
            Some(bound) if bound.is_strict => NumericPair::new(bound.value.clone(), -Rational::one()),
            Some(bound) => NumericPair::from_rational(bound.value.clone()),
            None => NumericPair::zero(),
        }
    }
}
