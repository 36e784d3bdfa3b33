use std::io::Write;

use anyhow::Result;

use crate::{
    lar::{
        lar_constraints::{ConstraintIndex, VarIndex},
        lar_solver::LarSolver,
    },
    math::{
        rational::Rational,
        traits::{One, Signed},
    },
};

impl LarSolver {
    /// Renders `c1*x + c2*y - ...`, or `0` for no terms.
    pub fn left_side_to_string<'a>(&self, terms: impl IntoIterator<Item = (&'a Rational, VarIndex)>) -> String {
        let mut result = String::new();
        for (coefficient, var) in terms {
            let name = self.get_variable_name(var);
            let magnitude = coefficient.abs();
            if result.is_empty() {
                if coefficient.is_negative() {
                    result.push('-');
                }
            } else if coefficient.is_negative() {
                result.push_str(" - ");
            } else {
                result.push_str(" + ");
            }
            if magnitude.is_one() {
                result.push_str(name);
            } else {
                result.push_str(&format!("{}*{}", magnitude, name));
            }
        }
        if result.is_empty() {
            result.push('0');
        }
        result
    }

    pub fn constraint_to_string(&self, constraint: ConstraintIndex) -> String {
        let origin = self.get_constraint(constraint);
        format!(
            "{} {} {}",
            self.left_side_to_string(origin.left_side.iter().map(|(c, v)| (c, *v))),
            origin.kind,
            origin.right_side
        )
    }

    pub fn print_left_side_of_constraint(&self, constraint: ConstraintIndex, out: &mut impl Write) -> Result<()> {
        let origin = self.get_constraint(constraint);
        write!(
            out,
            "{}",
            self.left_side_to_string(origin.left_side.iter().map(|(c, v)| (c, *v)))
        )?;
        Ok(())
    }

    pub fn print_constraint(&self, constraint: ConstraintIndex, out: &mut impl Write) -> Result<()> {
        writeln!(out, "{}", self.constraint_to_string(constraint))?;
        Ok(())
    }

    /// Prints the canonical left side with its bounds.
    pub fn print_canonic_left_side(&self, column: usize, out: &mut impl Write) -> Result<()> {
        let left_side = self.left_sides.get(column);
        writeln!(
            out,
            "{} in {}",
            self.left_side_to_string(left_side.coefficients().iter().map(|(v, c)| (c, *v))),
            self.column_infos[column]
        )?;
        Ok(())
    }

    /// All constraints, then all internal columns.
    pub fn print_problem(&self, out: &mut impl Write) -> Result<()> {
        for constraint in 0..self.number_of_constraints() {
            self.print_constraint(constraint, out)?;
        }
        for column in 0..self.number_of_canonic_left_sides() {
            write!(out, "column {}: ", column)?;
            self.print_canonic_left_side(column, out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        lar::{lar_constraints::LconstraintKind, lar_solver::LarSolver},
        r,
    };

    #[test]
    fn printing() {
        let mut solver = LarSolver::new();
        let x = solver.add_var("x");
        let y = solver.add_var("y");
        solver.add_constraint(vec![(r!(-2), x), (r!(1), y), (r!(-3, 2), y)], LconstraintKind::Lt, r!(7, 3));
        solver.add_constraint(vec![], LconstraintKind::Ge, r!(-1));

        assert_eq!(solver.constraint_to_string(0), "-2*x + y - 3/2*y < 7/3");
        assert_eq!(solver.constraint_to_string(1), "0 >= -1");

        let mut out = vec![];
        solver.print_left_side_of_constraint(0, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "-2*x + y - 3/2*y");

        let mut out = vec![];
        solver.print_canonic_left_side(2, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "x + 1/4*y in (-7/6, inf)\n");

        let mut out = vec![];
        solver.print_problem(&mut out).unwrap();
        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed.lines().count(), 5);
        assert!(printed.contains("column 0: x in (-inf, inf)"));
    }
}
