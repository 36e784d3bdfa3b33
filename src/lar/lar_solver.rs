use std::fmt::Display;

use log::{debug, info};
use rustc_hash::FxHashSet;

use crate::{
    lar::{
        canonic_left_side::CanonicLeftSideStore,
        column_info::ColumnInfo,
        lar_constraints::{
            ConstraintIndex, LarConstraint, LarNormalizedConstraint, LconstraintKind, VarIndex,
        },
        lar_core_problem::LarCoreState,
        lar_settings::LarSettings,
    },
    math::{
        rational::Rational,
        traits::{One, Signed, Zero},
    },
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LarStatus {
    #[default]
    Unknown,
    Satisfiable,
    Unsatisfiable,
}

impl Display for LarStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                LarStatus::Unknown => "unknown",
                LarStatus::Satisfiable => "sat",
                LarStatus::Unsatisfiable => "unsat",
            }
        )
    }
}

/// A contradiction that is apparent without running the simplex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationConflict {
    /// The bounds of the internal column cross.
    Column(usize),
    /// A constraint whose left side is identically zero and that does not hold.
    Constant(ConstraintIndex),
}

/**
 * A solver for conjunctions of linear constraints over the reals.
 *
 * Constraints are normalized on registration: each left side is reduced to a canonical left side
 * (shared by all proportional left sides), and the constraint becomes a bound on the internal
 * column of that canonical left side. `check()` then decides the problem with the simplex engine,
 * after which either a model or an infeasibility certificate can be obtained.
 */
#[derive(Clone, Debug, Default)]
pub struct LarSolver {
    pub(crate) settings: LarSettings,
    pub(crate) status: LarStatus,
    pub(crate) var_names: Vec<String>,
    pub(crate) var_left_sides: Vec<usize>,
    pub(crate) active_vars: FxHashSet<VarIndex>,
    pub(crate) left_sides: CanonicLeftSideStore,
    /// Indexed by canonical left side.
    pub(crate) column_infos: Vec<ColumnInfo>,
    pub(crate) constraints: Vec<LarNormalizedConstraint>,
    pub(crate) registration_conflict: Option<RegistrationConflict>,
    pub(crate) core: Option<LarCoreState>,
    pub(crate) total_iterations: usize,
}

impl LarSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: LarSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &LarSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut LarSettings {
        &mut self.settings
    }

    /// Registers a variable. Names are not deduplicated: every call yields a fresh variable.
    pub fn add_var(&mut self, name: impl Into<String>) -> VarIndex {
        let var = self.var_names.len();
        self.var_names.push(name.into());
        let left_side = self.left_sides.add_left_side_for_var(var);
        self.var_left_sides.push(left_side);
        self.column_infos.push(ColumnInfo::new());
        debug_assert_eq!(self.column_infos.len(), self.left_sides.len());
        self.invalidate();
        var
    }

    /**
     * Registers the constraint `sum coefficient * var <kind> right_side` and returns its index.
     * A contradiction with earlier constraints is recorded, not reported: the problem becomes
     * unsatisfiable.
     *
     * # Panics
     *
     * Will panic if a variable has not been registered.
     */
    pub fn add_constraint(
        &mut self,
        left_side: Vec<(Rational, VarIndex)>,
        kind: LconstraintKind,
        right_side: Rational,
    ) -> ConstraintIndex {
        for (_, var) in &left_side {
            assert!(*var < self.var_names.len(), "unknown variable {}", var);
        }

        let index = self.constraints.len();
        let origin = LarConstraint::new(left_side, kind, right_side);
        let coefficients = origin.left_side_coefficients();
        self.active_vars.extend(coefficients.keys().copied());

        match self.left_sides.create_or_fetch_existing_left_side(&coefficients) {
            None => {
                //0 <kind> right_side
                let holds = kind.holds(&Rational::zero(), &origin.right_side);
                debug!("constraint {} has no variables; it holds: {}", index, holds);
                self.constraints.push(LarNormalizedConstraint {
                    right_side: origin.right_side.clone(),
                    origin,
                    canonic_left_side: None,
                    ratio_to_original: Rational::one(),
                    kind,
                });
                if !holds && self.registration_conflict.is_none() {
                    self.registration_conflict = Some(RegistrationConflict::Constant(index));
                }
            }
            Some((column, ratio, is_new)) => {
                if is_new {
                    self.column_infos.push(ColumnInfo::new());
                }
                let normalized_kind = if ratio.is_negative() { kind.flip() } else { kind };
                let normalized_right_side = &origin.right_side / &ratio;

                let info = &mut self.column_infos[column];
                info.update(normalized_kind, &normalized_right_side, index);
                if info.is_infeasible() && self.registration_conflict.is_none() {
                    debug!("constraint {} makes column {} infeasible: {}", index, column, info);
                    self.registration_conflict = Some(RegistrationConflict::Column(column));
                }

                self.constraints.push(LarNormalizedConstraint {
                    origin,
                    canonic_left_side: Some(column),
                    ratio_to_original: ratio,
                    kind: normalized_kind,
                    right_side: normalized_right_side,
                });
            }
        }
        debug_assert_eq!(self.column_infos.len(), self.left_sides.len());

        self.invalidate();
        index
    }

    /// Decides the problem and returns the outcome. Can be called repeatedly.
    pub fn check(&mut self) -> LarStatus {
        self.solve();
        info!(
            "{} vars, {} constraints, {} internal columns: {}",
            self.number_of_vars(),
            self.number_of_constraints(),
            self.number_of_canonic_left_sides(),
            self.status
        );
        self.status
    }

    pub fn get_status(&self) -> LarStatus {
        self.status
    }

    /// Simplex iterations over all solves so far, both passes included.
    pub fn get_total_iterations(&self) -> usize {
        self.total_iterations
    }

    /// # Panics
    ///
    /// Will panic if the variable has not been registered.
    pub fn get_variable_name(&self, var: VarIndex) -> &str {
        &self.var_names[var]
    }

    pub fn number_of_vars(&self) -> usize {
        self.var_names.len()
    }

    pub fn number_of_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn number_of_canonic_left_sides(&self) -> usize {
        self.left_sides.len()
    }

    /// The variables that occur with a nonzero coefficient in some constraint, in increasing order.
    pub fn active_var_indices(&self) -> Vec<VarIndex> {
        let mut result: Vec<VarIndex> = self.active_vars.iter().copied().collect();
        result.sort_unstable();
        result
    }

    pub fn get_constraint(&self, constraint: ConstraintIndex) -> &LarConstraint {
        &self.constraints[constraint].origin
    }

    pub fn get_normalized_constraint(&self, constraint: ConstraintIndex) -> &LarNormalizedConstraint {
        &self.constraints[constraint]
    }

    pub fn get_column_info(&self, column: usize) -> &ColumnInfo {
        &self.column_infos[column]
    }

    pub fn get_registration_conflict(&self) -> Option<RegistrationConflict> {
        self.registration_conflict
    }

    /// Registration changed the problem; earlier outcomes no longer apply.
    fn invalidate(&mut self) {
        if self.core.is_some() {
            debug!("the problem changed after a check; the previous outcome is discarded");
        }
        self.core = None;
        self.status = if self.registration_conflict.is_some() {
            LarStatus::Unsatisfiable
        } else {
            LarStatus::Unknown
        };
    }
}
