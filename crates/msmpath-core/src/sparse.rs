use crate::F;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Row-indexed sparse square matrix.
///
/// Each row holds `(column, value)` pairs sorted by column index; absent
/// entries are zero. Writing an exact 0.0 removes the entry, so rows stay
/// sparse as flux is consumed. `Clone` is the snapshot primitive and
/// `PartialEq` compares entries exactly, which is what reset round-trip
/// checks rely on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpMat {
    n: usize,
    rows: Vec<Vec<(usize, F)>>,
}

impl SpMat {
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            rows: vec![Vec::new(); n],
        }
    }

    /// Builds a matrix directly from per-row pair lists. Rows are sorted by
    /// column and exact zeros dropped.
    pub fn from_rows(rows: Vec<Vec<(usize, F)>>) -> Self {
        let n = rows.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.retain(|&(_, v)| v != 0.0);
                row.sort_unstable_by_key(|&(j, _)| j);
                row
            })
            .collect();
        Self { n, rows }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn get(&self, i: usize, j: usize) -> F {
        match self.rows[i].binary_search_by_key(&j, |&(c, _)| c) {
            Ok(pos) => self.rows[i][pos].1,
            Err(_) => 0.0,
        }
    }

    pub fn set(&mut self, i: usize, j: usize, value: F) {
        match self.rows[i].binary_search_by_key(&j, |&(c, _)| c) {
            Ok(pos) => {
                if value == 0.0 {
                    self.rows[i].remove(pos);
                } else {
                    self.rows[i][pos].1 = value;
                }
            }
            Err(pos) => {
                if value != 0.0 {
                    self.rows[i].insert(pos, (j, value));
                }
            }
        }
    }

    pub fn add(&mut self, i: usize, j: usize, delta: F) {
        let v = self.get(i, j) + delta;
        self.set(i, j, v);
    }

    /// The `(column, value)` pairs of row `i`, sorted by column.
    pub fn row(&self, i: usize) -> &[(usize, F)] {
        &self.rows[i]
    }

    pub fn nnz(&self) -> usize {
        self.rows.iter().map(|r| r.len()).sum()
    }

    /// Sum over all stored entries.
    pub fn sum(&self) -> F {
        self.rows
            .iter()
            .map(|r| r.iter().map(|&(_, v)| v).sum::<F>())
            .sum()
    }

    /// Sparse matrix-vector product `A * x`.
    pub fn mul_vec(&self, x: &DVector<F>) -> DVector<F> {
        debug_assert_eq!(x.len(), self.n);
        let mut y = DVector::zeros(self.n);
        for (i, row) in self.rows.iter().enumerate() {
            let mut acc = 0.0;
            for &(j, v) in row {
                acc += v * x[j];
            }
            y[i] = acc;
        }
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_and_zero_removal() {
        let mut m = SpMat::zeros(3);
        m.set(0, 2, 1.5);
        m.set(0, 1, 0.5);
        m.set(2, 0, 3.0);

        assert_eq!(m.get(0, 2), 1.5);
        assert_eq!(m.get(1, 1), 0.0);
        assert_eq!(m.nnz(), 3);
        // rows stay sorted by column
        assert_eq!(m.row(0), &[(1, 0.5), (2, 1.5)]);

        m.set(0, 2, 0.0);
        assert_eq!(m.get(0, 2), 0.0);
        assert_eq!(m.nnz(), 2);
    }

    #[test]
    fn add_accumulates_and_cancels() {
        let mut m = SpMat::zeros(2);
        m.add(0, 1, 2.0);
        m.add(0, 1, -2.0);
        assert_eq!(m.nnz(), 0);
    }

    #[test]
    fn mul_vec_matches_dense() {
        let mut m = SpMat::zeros(3);
        m.set(0, 0, 2.0);
        m.set(0, 2, 1.0);
        m.set(1, 1, -1.0);
        m.set(2, 0, 0.5);

        let x = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let y = m.mul_vec(&x);
        assert_eq!(y.as_slice(), &[5.0, -2.0, 0.5]);
    }

    #[test]
    fn clone_is_deep_snapshot() {
        let mut m = SpMat::zeros(2);
        m.set(0, 1, 1.0);
        let snapshot = m.clone();

        m.set(0, 1, 0.25);
        assert_ne!(m, snapshot);
        m = snapshot.clone();
        assert_eq!(m, snapshot);
        assert_eq!(m.sum(), 1.0);
    }
}
