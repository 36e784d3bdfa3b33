use std::fmt::Display;

use itertools::Itertools;

use crate::math::traits::Zero;

/**
 * A matrix with a fixed number of columns, stored as sparse rows.
 * Each row `i` denotes the equation `sum_j A[i][j] * x_j = 0`.
 */
#[derive(Clone, Debug)]
pub struct StaticMatrix<U> {
    column_count: usize,
    rows: Vec<Vec<(usize, U)>>,
}

impl<U: Zero + Clone> StaticMatrix<U> {
    pub fn new(column_count: usize) -> Self {
        Self {
            column_count,
            rows: vec![],
        }
    }

    /// Adds a row, dropping zero entries, and returns its index.
    ///
    /// # Panics
    ///
    /// Will panic if a column is out of range or occurs twice in the row.
    pub fn add_row(&mut self, mut row: Vec<(usize, U)>) -> usize {
        row.retain(|(_, value)| !value.is_zero());
        row.sort_by_key(|(column, _)| *column);
        for window in row.windows(2) {
            assert!(window[0].0 != window[1].0, "column {} occurs twice in a row", window[0].0);
        }
        if let Some((column, _)) = row.last() {
            assert!(*column < self.column_count, "column {} out of range", column);
        }
        self.rows.push(row);
        self.rows.len() - 1
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn row(&self, row: usize) -> &[(usize, U)] {
        &self.rows[row]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[(usize, U)]> {
        self.rows.iter().map(|row| row.as_slice())
    }

    pub fn get(&self, row: usize, column: usize) -> U {
        match self.rows[row].binary_search_by_key(&column, |(c, _)| *c) {
            Ok(index) => self.rows[row][index].1.clone(),
            Err(_) => U::zero(),
        }
    }
}

impl<U: Display> Display for StaticMatrix<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} columns", self.column_count)?;
        for row in &self.rows {
            writeln!(
                f,
                "{} = 0",
                row.iter()
                    .map(|(column, value)| format!("{}*c{}", value, column))
                    .join(" + ")
            )?;
        }
        Ok(())
    }
}
