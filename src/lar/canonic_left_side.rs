use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::{
    lar::lar_constraints::VarIndex,
    math::{
        rational::Rational,
        traits::{One, Zero},
    },
};

/**
 * A linear expression in normal form: terms sorted by variable, and the coefficient of the
 * first (lowest) variable is one. Two expressions that differ by a nonzero factor have the same
 * normal form.
 */
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CanonicLeftSide {
    coefficients: Vec<(VarIndex, Rational)>,
}

impl CanonicLeftSide {
    pub fn coefficients(&self) -> &[(VarIndex, Rational)] {
        &self.coefficients
    }

    /// A single variable needs no row in the matrix.
    pub fn is_trivial(&self) -> bool {
        self.coefficients.len() == 1
    }

    pub fn single_var(&self) -> Option<VarIndex> {
        if self.is_trivial() {
            Some(self.coefficients[0].0)
        } else {
            None
        }
    }

    pub fn value(&self, values: &BTreeMap<VarIndex, Rational>) -> Rational {
        let mut result = Rational::zero();
        for (var, coefficient) in &self.coefficients {
            if let Some(value) = values.get(var) {
                result += coefficient * value;
            }
        }
        result
    }
}

/**
 * Scales a merged, zero-free expression such that the coefficient of its lowest variable is one.
 * Returns the normal form and the factor: expression = factor * normal form.
 * An empty expression has no normal form.
 */
pub fn normalize(terms: &BTreeMap<VarIndex, Rational>) -> Option<(CanonicLeftSide, Rational)> {
    let (_, leading) = terms.iter().next()?;
    let ratio = leading.clone();
    let coefficients = terms
        .iter()
        .map(|(var, coefficient)| (*var, coefficient / &ratio))
        .collect();
    Some((CanonicLeftSide { coefficients }, ratio))
}

/**
 * Arena of canonical left sides. The index of a left side is its internal column; left sides are
 * never removed.
 */
#[derive(Clone, Debug, Default)]
pub struct CanonicLeftSideStore {
    left_sides: Vec<CanonicLeftSide>,
    index: FxHashMap<CanonicLeftSide, usize>,
}

impl CanonicLeftSideStore {
    pub fn new() -> Self {
        Self::default()
    }

    /**
     * Looks up the normal form of `terms`, inserting it if it is new.
     * Returns the index of the left side, the factor `terms = factor * left side`, and whether it was inserted.
     */
    pub fn create_or_fetch_existing_left_side(
        &mut self,
        terms: &BTreeMap<VarIndex, Rational>,
    ) -> Option<(usize, Rational, bool)> {
        let (left_side, ratio) = normalize(terms)?;
        if let Some(index) = self.index.get(&left_side) {
            return Some((*index, ratio, false));
        }
        let index = self.left_sides.len();
        self.index.insert(left_side.clone(), index);
        self.left_sides.push(left_side);
        Some((index, ratio, true))
    }

    /// The left side that consists of the variable alone.
    pub fn add_left_side_for_var(&mut self, var: VarIndex) -> usize {
        let mut terms = BTreeMap::new();
        terms.insert(var, Rational::one());
        match self.create_or_fetch_existing_left_side(&terms) {
            Some((index, _, _)) => index,
            None => unreachable!("a single term is never empty"),
        }
    }

    pub fn get(&self, index: usize) -> &CanonicLeftSide {
        &self.left_sides[index]
    }

    pub fn len(&self) -> usize {
        self.left_sides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left_sides.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &CanonicLeftSide)> {
        self.left_sides.iter().enumerate()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{CanonicLeftSideStore, normalize};
    use crate::{lar::lar_constraints::VarIndex, math::rational::Rational, r};

    fn terms(list: &[(VarIndex, Rational)]) -> BTreeMap<VarIndex, Rational> {
        list.iter().cloned().collect()
    }

    #[test]
    fn normal_form_is_independent_of_order_and_scale() {
        let (a, ratio_a) = normalize(&terms(&[(1, r!(4)), (0, r!(2))])).unwrap();
        let (b, ratio_b) = normalize(&terms(&[(0, r!(-1)), (1, r!(-2))])).unwrap();
        assert_eq!(a, b);
        assert_eq!(ratio_a, r!(2));
        assert_eq!(ratio_b, r!(-1));
        assert_eq!(a.coefficients(), &[(0, r!(1)), (1, r!(2))]);
        assert!(normalize(&BTreeMap::new()).is_none());
    }

    #[test]
    fn proportional_expressions_share_a_column() {
        let mut store = CanonicLeftSideStore::new();
        let x = store.add_left_side_for_var(0);
        let y = store.add_left_side_for_var(1);
        assert_ne!(x, y);

        let (sum, ratio, inserted) = store
            .create_or_fetch_existing_left_side(&terms(&[(0, r!(1)), (1, r!(1))]))
            .unwrap();
        assert!(inserted);
        assert_eq!(ratio, r!(1));

        let (again, ratio, inserted) = store
            .create_or_fetch_existing_left_side(&terms(&[(0, r!(2)), (1, r!(2))]))
            .unwrap();
        assert!(!inserted);
        assert_eq!(again, sum);
        assert_eq!(ratio, r!(2));

        let (scaled_x, ratio, _) = store
            .create_or_fetch_existing_left_side(&terms(&[(0, r!(-3, 2))]))
            .unwrap();
        assert_eq!(scaled_x, x);
        assert_eq!(ratio, r!(-3, 2));

        assert_eq!(store.len(), 3);
        assert!(store.get(x).is_trivial());
        assert_eq!(store.get(y).single_var(), Some(1));
        assert!(!store.get(sum).is_trivial());
    }

    #[test]
    fn evaluation() {
        let mut store = CanonicLeftSideStore::new();
        let (sum, _, _) = store
            .create_or_fetch_existing_left_side(&terms(&[(0, r!(2)), (1, r!(3))]))
            .unwrap();
        let values = terms(&[(0, r!(1)), (1, r!(2))]);
        assert_eq!(store.get(sum).value(&values), r!(4));
    }
}
