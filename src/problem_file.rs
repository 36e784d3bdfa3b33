use std::{
    io::{self, BufRead, Write},
    str::FromStr,
};

use anyhow::{Context, Error, Result, anyhow};
use rustc_hash::FxHashMap;

use crate::{
    lar::{
        lar_constraints::{ConstraintIndex, LconstraintKind, VarIndex},
        lar_solver::{LarSolver, LarStatus},
    },
    line_reader::LineReader,
    math::{
        rational::{Rational, parse_rational},
        traits::{One, Zero},
    },
};

/**
 * A problem in text form. Each line either declares variables or states a constraint:
 *
 * ```text
 * var x y
 * 2*x - 3/2*y + 1 <= 0.5 * y    # terms may appear on both sides
 * x > y
 * ```
 *
 * Variables are moved to the left side and constants to the right side.
 */
#[derive(Clone, Debug)]
pub struct LarProblem {
    pub solver: LarSolver,
    names: FxHashMap<String, VarIndex>,
    constraint_lines: Vec<usize>,
}

impl LarProblem {
    pub fn import(reader: &mut dyn BufRead) -> Result<Self> {
        let mut lreader = LineReader::new(reader);
        let mut result = Self {
            solver: LarSolver::new(),
            names: FxHashMap::default(),
            constraint_lines: vec![],
        };

        while lreader.next_line()? {
            let line_number = lreader.get_last_line_number();
            let line = lreader.get_last_line().to_string();
            result
                .read_line(&line)
                .with_context(|| format!("line {}: `{}`", line_number, line))?;
            if result.constraint_lines.len() < result.solver.number_of_constraints() {
                result.constraint_lines.push(line_number);
            }
        }
        Ok(result)
    }

    fn read_line(&mut self, line: &str) -> Result<()> {
        if let Some(declaration) = line.strip_prefix("var ") {
            for name in declaration.split_whitespace() {
                if !is_name(name) {
                    return Err(anyhow!("`{}` is not a valid variable name", name));
                }
                if self.names.contains_key(name) {
                    return Err(anyhow!("variable `{}` is declared twice", name));
                }
                let var = self.solver.add_var(name);
                self.names.insert(name.to_string(), var);
            }
            return Ok(());
        }

        let (left, kind, right) = split_relation(line)?;
        let (mut terms, left_constant) = self.parse_expression(left).context("left side")?;
        let (right_terms, right_constant) = self.parse_expression(right).context("right side")?;
        terms.extend(
            right_terms
                .into_iter()
                .map(|(coefficient, var)| (-coefficient, var)),
        );
        self.solver
            .add_constraint(terms, kind, right_constant - left_constant);
        Ok(())
    }

    /// Parses a sum of terms `c*name`, `name` and constants into variable terms and a constant.
    fn parse_expression(&self, expression: &str) -> Result<(Vec<(Rational, VarIndex)>, Rational)> {
        let expression: String = expression.chars().filter(|c| !c.is_whitespace()).collect();
        if expression.is_empty() {
            return Err(anyhow!("empty expression"));
        }

        //split before every sign that is not part of a coefficient
        let bytes = expression.as_bytes();
        let mut pieces = vec![];
        let mut start = 0;
        for i in 1..bytes.len() {
            if matches!(bytes[i], b'+' | b'-') && !matches!(bytes[i - 1], b'*' | b'/' | b'+' | b'-') {
                pieces.push(&expression[start..i]);
                start = i;
            }
        }
        pieces.push(&expression[start..]);

        let mut terms = vec![];
        let mut constant = Rational::zero();
        for piece in pieces {
            //`x - -y` leaves the piece `--y`
            let mut negative = false;
            let mut body = piece;
            while let Some(rest) = body.strip_prefix(['+', '-']) {
                negative ^= body.starts_with('-');
                body = rest;
            }
            let (coefficient, name) = match body.split_once('*') {
                Some((coefficient, name)) => (parse_rational(coefficient)?, Some(name)),
                None if body.starts_with(|c: char| c.is_alphabetic() || c == '_') => {
                    (Rational::one(), Some(body))
                }
                None => (parse_rational(body)?, None),
            };
            let coefficient = if negative { -coefficient } else { coefficient };
            match name {
                Some(name) => {
                    let var = self
                        .var(name)
                        .ok_or_else(|| anyhow!("variable `{}` is not declared", name))?;
                    terms.push((coefficient, var));
                }
                None => constant += coefficient,
            }
        }
        Ok((terms, constant))
    }

    pub fn var(&self, name: &str) -> Option<VarIndex> {
        self.names.get(name).copied()
    }

    /// The line of the file the constraint was read from.
    pub fn get_constraint_line(&self, constraint: ConstraintIndex) -> usize {
        self.constraint_lines[constraint]
    }

    /**
     * Writes the status and, if it has one, the model (`name = value`) or the evidence
     * (`weight  constraint`).
     */
    pub fn write_outcome(&self, out: &mut impl Write) -> Result<()> {
        let status = self.solver.get_status();
        writeln!(out, "{}", status)?;
        match status {
            LarStatus::Satisfiable => {
                for (var, value) in self.solver.get_model()? {
                    writeln!(out, "{} = {}", self.solver.get_variable_name(var), value)?;
                }
            }
            LarStatus::Unsatisfiable => {
                for (weight, constraint) in self.solver.get_infeasibility_evidence()? {
                    writeln!(
                        out,
                        "{}  {}    # line {}",
                        weight,
                        self.solver.constraint_to_string(constraint),
                        self.get_constraint_line(constraint)
                    )?;
                }
            }
            LarStatus::Unknown => {}
        }
        Ok(())
    }
}

impl FromStr for LarProblem {
    type Err = Error;

    fn from_str(s: &str) -> std::prelude::v1::Result<Self, Self::Err> {
        let mut reader = io::Cursor::new(s);
        Self::import(&mut reader)
    }
}

fn is_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn split_relation(line: &str) -> Result<(&str, LconstraintKind, &str)> {
    let position = line
        .find(['<', '>', '='])
        .ok_or_else(|| anyhow!("no relation (<=, <, >=, >, =) found"))?;
    let rest = &line[position..];
    let (kind, length) = if rest.starts_with("<=") {
        (LconstraintKind::Le, 2)
    } else if rest.starts_with(">=") {
        (LconstraintKind::Ge, 2)
    } else if rest.starts_with('<') {
        (LconstraintKind::Lt, 1)
    } else if rest.starts_with('>') {
        (LconstraintKind::Gt, 1)
    } else {
        (LconstraintKind::Eq, 1)
    };
    let right = &line[position + length..];
    if right.contains(['<', '>', '=']) {
        return Err(anyhow!("more than one relation"));
    }
    Ok((&line[..position], kind, right))
}

#[cfg(test)]
mod tests {
    use ntest::timeout;

    use super::LarProblem;
    use crate::{
        lar::{lar_constraints::LconstraintKind, lar_solver::LarStatus},
        r,
    };

    #[test]
    fn parse_constraints() {
        let problem: LarProblem = "var x y\n# comment\n2*x - 3/2*y + 1 <= 0.5*y\nx > -y + 1/3\n0 = 0\n"
            .parse()
            .unwrap();
        let x = problem.var("x").unwrap();
        let y = problem.var("y").unwrap();
        let solver = &problem.solver;
        assert_eq!(solver.number_of_vars(), 2);
        assert_eq!(solver.number_of_constraints(), 3);

        let c0 = solver.get_constraint(0);
        assert_eq!(c0.kind, LconstraintKind::Le);
        assert_eq!(c0.right_side, r!(-1));
        let coefficients = c0.left_side_coefficients();
        assert_eq!(coefficients[&x], r!(2));
        assert_eq!(coefficients[&y], r!(-2));

        let c1 = solver.get_constraint(1);
        assert_eq!(c1.kind, LconstraintKind::Gt);
        assert_eq!(c1.right_side, r!(1, 3));
        assert_eq!(c1.left_side, vec![(r!(1), x), (r!(1), y)]);

        assert!(solver.get_constraint(2).left_side.is_empty());
        assert_eq!(problem.get_constraint_line(1), 4);
    }

    #[test]
    fn repeated_signs() {
        let problem: LarProblem = "var x y\nx - -y <= 1\n+x + -2*y >= --3 - +1\n".parse().unwrap();
        let x = problem.var("x").unwrap();
        let y = problem.var("y").unwrap();
        let solver = &problem.solver;

        let c0 = solver.get_constraint(0);
        assert_eq!(c0.left_side, vec![(r!(1), x), (r!(1), y)]);
        assert_eq!(c0.right_side, r!(1));

        let c1 = solver.get_constraint(1);
        assert_eq!(c1.left_side, vec![(r!(1), x), (r!(-2), y)]);
        assert_eq!(c1.right_side, r!(2));

        assert!("var x\nx - - <= 1".parse::<LarProblem>().is_err());
    }

    #[test]
    fn parse_errors() {
        assert!("var x\nx + y <= 1".parse::<LarProblem>().is_err());
        assert!("var x x".parse::<LarProblem>().is_err());
        assert!("var 1x".parse::<LarProblem>().is_err());
        assert!("var x\nx + 1".parse::<LarProblem>().is_err());
        assert!("var x\nx <= 1 <= 2".parse::<LarProblem>().is_err());
        assert!("var x\n <= 2".parse::<LarProblem>().is_err());

        let error = "var x\n\nx <= 2*".parse::<LarProblem>().unwrap_err();
        assert!(format!("{:#}", error).contains("line 3"));
    }

    #[test]
    #[timeout(1000)]
    fn outcomes() {
        let mut problem: LarProblem = "var x y\nx + y <= 4\nx >= 3\ny >= 3\n".parse().unwrap();
        assert_eq!(problem.solver.check(), LarStatus::Unsatisfiable);
        let mut out = vec![];
        problem.write_outcome(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "unsat\n1  x + y <= 4    # line 2\n-1  x >= 3    # line 3\n-1  y >= 3    # line 4\n"
        );

        let mut problem: LarProblem = "var x\nx > 1\nx < 2\n".parse().unwrap();
        assert_eq!(problem.solver.check(), LarStatus::Satisfiable);
        let mut out = vec![];
        problem.write_outcome(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "sat\nx = 3/2\n");
    }
}
