//! Measurement plans and simulated datasets.

use serde::{Deserialize, Serialize};

use crate::{DesignError, DesignResult};

/// One simulated acquisition: an angle, the number of Q points to record at
/// it, and the counting time spent on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnglePoint {
    /// Incident angle in degrees.
    pub angle_deg: f64,
    /// Number of Q points recorded at this angle.
    pub points: usize,
    /// Counting time in seconds.
    pub time: f64,
}

impl AnglePoint {
    pub fn new(angle_deg: f64, points: usize, time: f64) -> Self {
        Self {
            angle_deg,
            points,
            time,
        }
    }
}

/// An ordered sequence of acquisitions defining a full proposed experiment.
pub type MeasurementPlan = Vec<AnglePoint>;

/// Data produced by simulating a structure under a measurement plan.
///
/// All four arrays are per-point and equal length: momentum transfer,
/// reflectivity, reflectivity uncertainty, and incident counts (the counting
/// statistics that weight the information matrix).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedDataset {
    pub q: Vec<f64>,
    pub r: Vec<f64>,
    pub dr: Vec<f64>,
    pub counts: Vec<f64>,
}

impl SimulatedDataset {
    pub fn new(q: Vec<f64>, r: Vec<f64>, dr: Vec<f64>, counts: Vec<f64>) -> DesignResult<Self> {
        let n = q.len();
        if r.len() != n || dr.len() != n || counts.len() != n {
            return Err(DesignError::Config(format!(
                "dataset arrays have mismatched lengths: q={}, r={}, dr={}, counts={}",
                n,
                r.len(),
                dr.len(),
                counts.len()
            )));
        }
        Ok(Self { q, r, dr, counts })
    }

    pub fn len(&self) -> usize {
        self.q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    /// Concatenate another dataset's points onto this one.
    pub fn extend(&mut self, other: &SimulatedDataset) {
        self.q.extend_from_slice(&other.q);
        self.r.extend_from_slice(&other.r);
        self.dr.extend_from_slice(&other.dr);
        self.counts.extend_from_slice(&other.counts);
    }
}
