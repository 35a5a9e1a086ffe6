//! Search result containers.
//!
//! Every search returns its full objective surface, not just the winner:
//! the caller decides whether to take the argmax, plot the landscape, or
//! feed the scores into a later stage. `best()` accessors break ties by
//! first occurrence in scan order so repeated runs agree exactly.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ro_types::DesignResult;

/// Write a scan result (or any other report value) to disk as pretty JSON.
pub fn write_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> DesignResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

/// Which design axis a scan walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanKind {
    Angle,
    AngleWithTime,
    ContrastSingle,
    ContrastPair,
    UnderlayerGrid,
    ParameterSensitivity,
}

/// Provenance of one scan: what ran, how big it was, when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanMeta {
    pub id: Uuid,
    pub kind: ScanKind,
    pub sample: String,
    pub evaluations: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ScanMeta {
    pub(crate) fn begin(kind: ScanKind, sample: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind,
            sample: sample.to_string(),
            evaluations: 0,
            started_at: now,
            finished_at: now,
        }
    }

    pub(crate) fn finish(&mut self, evaluations: usize) {
        self.evaluations = evaluations;
        self.finished_at = Utc::now();
    }
}

/// Best point of a one-dimensional scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate1D {
    pub value: f64,
    pub min_eigenvalue: f64,
}

/// Best point of a two-dimensional scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate2D {
    pub x: f64,
    pub y: f64,
    pub min_eigenvalue: f64,
}

/// A one-dimensional sweep: objective score per candidate value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scan1D {
    pub meta: ScanMeta,
    pub xs: Vec<f64>,
    pub min_eigs: Vec<f64>,
}

impl Scan1D {
    /// Highest-scoring candidate; the earliest on an exact tie.
    pub fn best(&self) -> Option<Candidate1D> {
        let mut best: Option<Candidate1D> = None;
        for (&value, &min_eigenvalue) in self.xs.iter().zip(&self.min_eigs) {
            let better = match best {
                None => true,
                Some(b) => min_eigenvalue > b.min_eigenvalue,
            };
            if better {
                best = Some(Candidate1D {
                    value,
                    min_eigenvalue,
                });
            }
        }
        best
    }
}

/// An angle sweep repeated at several candidate counting times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeResolvedScan {
    pub times: Vec<f64>,
    pub scans: Vec<Scan1D>,
}

impl TimeResolvedScan {
    /// Best angle at each counting time, in time order.
    pub fn best_per_time(&self) -> Vec<Option<Candidate1D>> {
        self.scans.iter().map(Scan1D::best).collect()
    }
}

/// An unordered-pair sweep over one candidate range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairScan {
    pub meta: ScanMeta,
    /// The candidate range both pair members are drawn from.
    pub range: Vec<f64>,
    /// Evaluated pairs `(range[i], range[j])` with `i < j`, in scan order.
    pub pairs: Vec<(f64, f64)>,
    pub min_eigs: Vec<f64>,
}

impl PairScan {
    /// Highest-scoring pair; the earliest on an exact tie.
    pub fn best(&self) -> Option<Candidate2D> {
        let mut best: Option<Candidate2D> = None;
        for (&(x, y), &min_eigenvalue) in self.pairs.iter().zip(&self.min_eigs) {
            let better = match best {
                None => true,
                Some(b) => min_eigenvalue > b.min_eigenvalue,
            };
            if better {
                best = Some(Candidate2D {
                    x,
                    y,
                    min_eigenvalue,
                });
            }
        }
        best
    }

    /// Full `n x n` surface over `range`, row-major, with the evaluated
    /// upper triangle mirrored onto the lower one. The diagonal was never
    /// evaluated (a pair of identical conditions adds nothing) and is NaN.
    pub fn surface(&self) -> Vec<f64> {
        let n = self.range.len();
        let mut grid = vec![f64::NAN; n * n];
        let mut k = 0;
        for i in 0..n {
            for j in (i + 1)..n {
                grid[i * n + j] = self.min_eigs[k];
                grid[j * n + i] = self.min_eigs[k];
                k += 1;
            }
        }
        grid
    }
}

/// A two-dimensional grid sweep, scores stored row-major with the `x`
/// coordinate as the outer index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridScan {
    pub meta: ScanMeta,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub min_eigs: Vec<f64>,
}

impl GridScan {
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.min_eigs[i * self.ys.len() + j]
    }

    /// Highest-scoring cell; the earliest in row-major order on a tie.
    pub fn best(&self) -> Option<Candidate2D> {
        let mut best: Option<Candidate2D> = None;
        for (i, &x) in self.xs.iter().enumerate() {
            for (j, &y) in self.ys.iter().enumerate() {
                let min_eigenvalue = self.get(i, j);
                let better = match best {
                    None => true,
                    Some(b) => min_eigenvalue > b.min_eigenvalue,
                };
                if better {
                    best = Some(Candidate2D {
                        x,
                        y,
                        min_eigenvalue,
                    });
                }
            }
        }
        best
    }
}
