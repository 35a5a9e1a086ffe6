//! Small symmetric matrices and their eigenvalues.

use serde::{Deserialize, Serialize};

use ro_types::{DesignError, DesignResult};

/// A square symmetric matrix stored row-major, indexed 1:1 by an ordered
/// parameter list.
///
/// Information matrices built from real data are positive semi-definite up
/// to floating error; [`InfoMatrix::eigenvalues`] clamps round-off negatives
/// to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoMatrix {
    n: usize,
    data: Vec<f64>,
}

impl InfoMatrix {
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    /// Accumulate into entry (i, j) and its mirror (j, i).
    pub fn accumulate(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.n + j] += value;
        if i != j {
            self.data[j * self.n + i] += value;
        }
    }

    /// Elementwise sum; matrices for independent datasets over the same
    /// parameter ordering combine this way.
    pub fn add(&self, other: &InfoMatrix) -> DesignResult<InfoMatrix> {
        if self.n != other.n {
            return Err(DesignError::MatrixShape {
                expected: self.n,
                actual: other.n,
            });
        }
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a + b)
            .collect();
        Ok(InfoMatrix { n: self.n, data })
    }

    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    pub fn trace(&self) -> f64 {
        (0..self.n).map(|i| self.get(i, i)).sum()
    }

    /// Eigenvalues in descending order, clamped to be non-negative.
    ///
    /// Uses the classical Jacobi rotation method: repeatedly zero the largest
    /// off-diagonal element with a Givens rotation. For the handful of free
    /// parameters a sample model carries this converges in a few sweeps and
    /// is unconditionally stable on symmetric input.
    pub fn eigenvalues(&self) -> Vec<f64> {
        let n = self.n;
        if n == 0 {
            return Vec::new();
        }
        if n == 1 {
            return vec![self.data[0].max(0.0)];
        }

        let mut a = self.data.clone();
        let tol = 1e-12;
        let max_iter = 64 * n * n;

        for _ in 0..max_iter {
            // Pivot: largest off-diagonal magnitude.
            let (mut p, mut q, mut largest) = (0, 1, 0.0_f64);
            for i in 0..n {
                for j in (i + 1)..n {
                    let v = a[i * n + j].abs();
                    if v > largest {
                        largest = v;
                        p = i;
                        q = j;
                    }
                }
            }
            if largest < tol {
                break;
            }

            let app = a[p * n + p];
            let aqq = a[q * n + q];
            let apq = a[p * n + q];
            let theta = if (app - aqq).abs() < tol {
                std::f64::consts::FRAC_PI_4
            } else {
                0.5 * (2.0 * apq / (app - aqq)).atan()
            };
            let (s, c) = theta.sin_cos();

            // In-place Givens rotation of rows/columns p and q.
            for i in 0..n {
                if i == p || i == q {
                    continue;
                }
                let aip = a[i * n + p];
                let aiq = a[i * n + q];
                a[i * n + p] = c * aip + s * aiq;
                a[p * n + i] = a[i * n + p];
                a[i * n + q] = c * aiq - s * aip;
                a[q * n + i] = a[i * n + q];
            }
            a[p * n + p] = c * c * app + 2.0 * c * s * apq + s * s * aqq;
            a[q * n + q] = s * s * app - 2.0 * c * s * apq + c * c * aqq;
            a[p * n + q] = 0.0;
            a[q * n + p] = 0.0;
        }

        // The matrix is PSD in exact arithmetic; negatives are round-off.
        let mut eigs: Vec<f64> = (0..n).map(|i| a[i * n + i].max(0.0)).collect();
        eigs.sort_by(|x, y| y.partial_cmp(x).unwrap_or(std::cmp::Ordering::Equal));
        eigs
    }

    /// Smallest eigenvalue, clamped at zero. A singular matrix scalarizes to
    /// 0.0, which is a valid, comparably low score rather than an error. An empty matrix
    /// (no varying parameters) also scores 0.0.
    pub fn min_eigenvalue(&self) -> f64 {
        self.eigenvalues().last().copied().unwrap_or(0.0)
    }
}
