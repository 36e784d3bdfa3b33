use std::collections::BTreeMap;

use anyhow::{Result, anyhow};
use log::debug;

use crate::{
    lar::{
        lar_constraints::{ConstraintIndex, LconstraintKind, VarIndex},
        lar_solver::{LarSolver, LarStatus, RegistrationConflict},
    },
    math::{
        rational::Rational,
        traits::{One, Signed, Zero},
    },
};

/**
 * Evidence of infeasibility: weights on original constraints. Multiplying each constraint by its
 * weight (a negative weight flips the relation) and adding them up yields `0 <kind> s` with the
 * left sides cancelling exactly, and `s` such that this is false.
 */
pub type LarEvidence = Vec<(Rational, ConstraintIndex)>;

impl LarSolver {
    /**
     * After an unsatisfiable outcome, returns the evidence sorted by constraint.
     * Fails if the problem is not known to be unsatisfiable, or if the evidence does not verify,
     * which would be an internal error.
     */
    pub fn get_infeasibility_evidence(&self) -> Result<LarEvidence> {
        if self.status != LarStatus::Unsatisfiable {
            return Err(anyhow!(
                "evidence is only available for unsatisfiable problems; status is {}",
                self.status
            ));
        }

        let mut weights: BTreeMap<ConstraintIndex, Rational> = BTreeMap::new();
        match self.registration_conflict {
            Some(RegistrationConflict::Constant(constraint)) => {
                weights.insert(constraint, Rational::one());
            }
            Some(RegistrationConflict::Column(column)) => {
                //upper bound minus low bound
                self.add_bound_to_evidence(column, &Rational::one(), &mut weights)?;
                self.add_bound_to_evidence(column, &-Rational::one(), &mut weights)?;
            }
            None => {
                let (row, sign) = self
                    .core
                    .as_ref()
                    .and_then(|core| core.infeasible_row.as_ref())
                    .ok_or_else(|| anyhow!("the exact pass left no infeasible row"))?;
                for (coefficient, column) in row {
                    let multiplier = if *sign > 0 {
                        -coefficient.clone()
                    } else {
                        coefficient.clone()
                    };
                    self.add_bound_to_evidence(*column, &multiplier, &mut weights)?;
                }
            }
        }

        let evidence: LarEvidence = weights
            .into_iter()
            .filter(|(_, weight)| !weight.is_zero())
            .map(|(constraint, weight)| (weight, constraint))
            .collect();
        debug!("evidence over {} constraints", evidence.len());

        if !self.the_evidence_is_correct(&evidence) {
            return Err(anyhow!(
                "internal error: the infeasibility evidence {:?} does not verify",
                evidence
            ));
        }
        Ok(evidence)
    }

    /**
     * Adds `multiplier` times the bound on `column` to the evidence: its upper bound for a positive
     * multiplier and its low bound for a negative one, carried back to the constraint that set it.
     */
    fn add_bound_to_evidence(
        &self,
        column: usize,
        multiplier: &Rational,
        weights: &mut BTreeMap<ConstraintIndex, Rational>,
    ) -> Result<()> {
        let info = &self.column_infos[column];
        let bound = if multiplier.is_positive() {
            info.upper_bound()
        } else {
            info.low_bound()
        }
        .ok_or_else(|| anyhow!("column {} lacks the bound that makes the row infeasible", column))?;

        let ratio = &self.constraints[bound.witness].ratio_to_original;
        *weights
            .entry(bound.witness)
            .or_insert_with(Rational::zero) += multiplier / ratio;
        Ok(())
    }

    /**
     * The relation of the weighted sum: every constraint, flipped if its weight is negative, must be
     * of the upper kind (`<=`, `<`, `=`) or every one of the low kind (`>=`, `>`, `=`).
     * The sum is strict if any part is.
     */
    pub fn the_relations_are_of_same_type(
        &self,
        evidence: &[(Rational, ConstraintIndex)],
    ) -> Option<LconstraintKind> {
        if evidence.is_empty() {
            return None;
        }
        let mut all_upper = true;
        let mut all_low = true;
        let mut strict = false;
        for (weight, constraint) in evidence {
            if weight.is_zero() {
                return None;
            }
            let kind = self.get_constraint(*constraint).kind;
            let oriented = if weight.is_negative() { kind.flip() } else { kind };
            all_upper &= oriented.is_upper();
            all_low &= oriented.is_low();
            strict |= oriented.is_strict();
        }
        match (all_upper, all_low) {
            (true, true) => Some(LconstraintKind::Eq),
            (true, false) if strict => Some(LconstraintKind::Lt),
            (true, false) => Some(LconstraintKind::Le),
            (false, true) if strict => Some(LconstraintKind::Gt),
            (false, true) => Some(LconstraintKind::Ge),
            (false, false) => None,
        }
    }

    /// Every variable cancels out in the weighted sum of the original left sides.
    pub fn the_left_sides_sum_to_zero(&self, evidence: &[(Rational, ConstraintIndex)]) -> bool {
        let mut sum: BTreeMap<VarIndex, Rational> = BTreeMap::new();
        for (weight, constraint) in evidence {
            for (coefficient, var) in &self.get_constraint(*constraint).left_side {
                *sum.entry(*var).or_insert_with(Rational::zero) += weight * coefficient;
            }
        }
        sum.values().all(|coefficient| coefficient.is_zero())
    }

    /// `0 <kind> sum of weighted right sides` is false.
    pub fn the_right_sides_do_not_sum_to_zero(
        &self,
        evidence: &[(Rational, ConstraintIndex)],
        kind: LconstraintKind,
    ) -> bool {
        let mut sum = Rational::zero();
        for (weight, constraint) in evidence {
            sum += weight * &self.get_constraint(*constraint).right_side;
        }
        !kind.holds(&Rational::zero(), &sum)
    }

    pub fn the_evidence_is_correct(&self, evidence: &[(Rational, ConstraintIndex)]) -> bool {
        match self.the_relations_are_of_same_type(evidence) {
            Some(kind) => {
                self.the_left_sides_sum_to_zero(evidence)
                    && self.the_right_sides_do_not_sum_to_zero(evidence, kind)
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use ntest::timeout;

    use crate::{
        lar::{
            lar_constraints::LconstraintKind,
            lar_solver::{LarSolver, LarStatus},
        },
        r,
    };

    #[test]
    #[timeout(1000)]
    fn sum_exceeds_its_bound() {
        let mut solver = LarSolver::new();
        let x = solver.add_var("x");
        let y = solver.add_var("y");
        let c0 = solver.add_constraint(vec![(r!(1), x), (r!(1), y)], LconstraintKind::Le, r!(4));
        let c1 = solver.add_constraint(vec![(r!(1), x)], LconstraintKind::Ge, r!(3));
        let c2 = solver.add_constraint(vec![(r!(1), y)], LconstraintKind::Ge, r!(3));
        assert_eq!(solver.check(), LarStatus::Unsatisfiable);
        assert!(solver.get_registration_conflict().is_none());

        let evidence = solver.get_infeasibility_evidence().unwrap();
        assert_eq!(evidence, vec![(r!(1), c0), (r!(-1), c1), (r!(-1), c2)]);
        assert_eq!(
            solver.the_relations_are_of_same_type(&evidence),
            Some(LconstraintKind::Le)
        );
        assert!(solver.the_left_sides_sum_to_zero(&evidence));
        assert!(solver.the_right_sides_do_not_sum_to_zero(&evidence, LconstraintKind::Le));
        assert!(solver.get_model().is_err());
    }

    #[test]
    #[timeout(1000)]
    fn strict_bounds_that_touch() {
        let mut solver = LarSolver::new();
        let x = solver.add_var("x");
        let c0 = solver.add_constraint(vec![(r!(1), x)], LconstraintKind::Gt, r!(1));
        let c1 = solver.add_constraint(vec![(r!(1), x)], LconstraintKind::Lt, r!(1));
        assert_eq!(solver.check(), LarStatus::Unsatisfiable);

        let evidence = solver.get_infeasibility_evidence().unwrap();
        assert_eq!(evidence, vec![(r!(-1), c0), (r!(1), c1)]);
        assert_eq!(
            solver.the_relations_are_of_same_type(&evidence),
            Some(LconstraintKind::Lt)
        );
    }

    #[test]
    #[timeout(1000)]
    fn proportional_left_sides() {
        let mut solver = LarSolver::new();
        let x = solver.add_var("x");
        let y = solver.add_var("y");
        let c0 = solver.add_constraint(vec![(r!(1), x), (r!(1), y)], LconstraintKind::Le, r!(2));
        let c1 = solver.add_constraint(vec![(r!(2), x), (r!(2), y)], LconstraintKind::Ge, r!(6));
        assert_eq!(solver.number_of_canonic_left_sides(), 3);
        assert_eq!(solver.check(), LarStatus::Unsatisfiable);

        let evidence = solver.get_infeasibility_evidence().unwrap();
        assert_eq!(evidence, vec![(r!(1), c0), (r!(-1, 2), c1)]);
    }

    #[test]
    #[timeout(1000)]
    fn proportional_left_sides_that_agree() {
        let mut solver = LarSolver::new();
        let x = solver.add_var("x");
        let y = solver.add_var("y");
        solver.add_constraint(vec![(r!(1), x), (r!(1), y)], LconstraintKind::Le, r!(4));
        solver.add_constraint(vec![(r!(2), x), (r!(2), y)], LconstraintKind::Ge, r!(6));
        assert_eq!(solver.number_of_canonic_left_sides(), 3);
        assert_eq!(solver.check(), LarStatus::Satisfiable);
        assert!(solver.get_infeasibility_evidence().is_err());
    }

    #[test]
    #[timeout(1000)]
    fn false_constant() {
        let mut solver = LarSolver::new();
        let x = solver.add_var("x");
        solver.add_constraint(vec![(r!(1), x)], LconstraintKind::Ge, r!(0));
        let c = solver.add_constraint(vec![(r!(0), x)], LconstraintKind::Ge, r!(1));
        assert_eq!(solver.check(), LarStatus::Unsatisfiable);
        assert_eq!(solver.get_infeasibility_evidence().unwrap(), vec![(r!(1), c)]);
    }

    #[test]
    #[timeout(1000)]
    fn equalities_with_negative_ratio() {
        let mut solver = LarSolver::new();
        let x = solver.add_var("x");
        let y = solver.add_var("y");
        let z = solver.add_var("z");
        //x - y = 1, y - z = 1, z - x = 1
        let c0 = solver.add_constraint(vec![(r!(1), x), (r!(-1), y)], LconstraintKind::Eq, r!(1));
        let c1 = solver.add_constraint(vec![(r!(1), y), (r!(-1), z)], LconstraintKind::Eq, r!(1));
        let c2 = solver.add_constraint(vec![(r!(-1), x), (r!(1), z)], LconstraintKind::Eq, r!(1));
        assert_eq!(solver.get_normalized_constraint(c2).ratio_to_original, r!(-1));
        assert_eq!(solver.check(), LarStatus::Unsatisfiable);

        let evidence = solver.get_infeasibility_evidence().unwrap();
        assert_eq!(evidence.len(), 3);
        assert!(evidence.iter().all(|(weight, _)| weight == &evidence[0].0));
        assert_eq!(
            evidence.iter().map(|(_, c)| *c).collect::<Vec<_>>(),
            vec![c0, c1, c2]
        );
        assert_eq!(
            solver.the_relations_are_of_same_type(&evidence),
            Some(LconstraintKind::Eq)
        );
    }

    #[test]
    fn verification_rejects_bad_evidence() {
        let mut solver = LarSolver::new();
        let x = solver.add_var("x");
        let c0 = solver.add_constraint(vec![(r!(1), x)], LconstraintKind::Le, r!(4));
        let c1 = solver.add_constraint(vec![(r!(1), x)], LconstraintKind::Ge, r!(3));

        //the bounds are compatible
        assert!(!solver.the_evidence_is_correct(&[(r!(1), c0), (r!(-1), c1)]));
        //the left sides do not cancel
        assert!(!solver.the_left_sides_sum_to_zero(&[(r!(1), c0), (r!(-2), c1)]));
        //both constraints point the same way after flipping
        assert_eq!(solver.the_relations_are_of_same_type(&[(r!(1), c0), (r!(1), c1)]), None);
        assert_eq!(solver.the_relations_are_of_same_type(&[]), None);
    }
}
