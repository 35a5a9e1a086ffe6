//! Instrument model: angles and counting times to Q grids and counts.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use ro_types::{AnglePoint, DesignError, DesignResult};

/// A time-of-flight reflectometer described by its usable wavelength band
/// and incident flux.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// Shortest usable wavelength (Å).
    pub wavelength_min: f64,
    /// Longest usable wavelength (Å).
    pub wavelength_max: f64,
    /// Incident flux reaching the sample (counts per second).
    pub flux: f64,
}

impl Default for Instrument {
    fn default() -> Self {
        Self {
            wavelength_min: 2.0,
            wavelength_max: 16.0,
            flux: 1e5,
        }
    }
}

impl Instrument {
    /// Geometrically spaced Q grid covered at one incidence angle:
    /// `q = 4π sin(θ) / λ` across the wavelength band.
    pub fn q_grid(&self, angle_deg: f64, points: usize) -> DesignResult<Vec<f64>> {
        if angle_deg <= 0.0 {
            return Err(DesignError::Config(format!(
                "angle must be positive, got {angle_deg}"
            )));
        }
        if points == 0 {
            return Err(DesignError::Config("q grid needs at least one point".into()));
        }
        let sin_theta = (angle_deg * PI / 180.0).sin();
        let q_min = 4.0 * PI * sin_theta / self.wavelength_max;
        let q_max = 4.0 * PI * sin_theta / self.wavelength_min;
        Ok(geomspace(q_min, q_max, points))
    }

    /// Incident counts landing on each Q point of an acquisition: the flux
    /// integrated over the counting time, split across the grid.
    pub fn incident_counts(&self, acquisition: &AnglePoint) -> f64 {
        self.flux * acquisition.time / acquisition.points as f64
    }
}

/// `n` geometrically spaced values from `lo` to `hi` inclusive.
pub fn geomspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![lo];
    }
    let log_lo = lo.ln();
    let log_hi = hi.ln();
    (0..n)
        .map(|i| {
            let t = i as f64 / (n - 1) as f64;
            (log_lo + t * (log_hi - log_lo)).exp()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn q_grid_monotonic_and_bounded() {
        let inst = Instrument::default();
        let q = inst.q_grid(0.7, 100).unwrap();
        assert_eq!(q.len(), 100);
        for w in q.windows(2) {
            assert!(w[0] < w[1]);
        }
        let sin_theta = (0.7_f64 * PI / 180.0).sin();
        assert!((q[0] - 4.0 * PI * sin_theta / 16.0).abs() < 1e-12);
        assert!((q[99] - 4.0 * PI * sin_theta / 2.0).abs() < 1e-12);
    }

    #[test]
    fn larger_angle_reaches_higher_q() {
        let inst = Instrument::default();
        let low = inst.q_grid(0.7, 10).unwrap();
        let high = inst.q_grid(2.0, 10).unwrap();
        assert!(high[9] > low[9]);
    }

    #[test]
    fn invalid_inputs_rejected() {
        let inst = Instrument::default();
        assert!(inst.q_grid(0.0, 10).is_err());
        assert!(inst.q_grid(-1.0, 10).is_err());
        assert!(inst.q_grid(0.7, 0).is_err());
    }

    #[test]
    fn counting_time_scales_counts() {
        let inst = Instrument::default();
        let short = AnglePoint::new(0.7, 100, 10.0);
        let long = AnglePoint::new(0.7, 100, 40.0);
        assert!((inst.incident_counts(&long) / inst.incident_counts(&short) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn geomspace_endpoints() {
        let g = geomspace(0.01, 0.1, 5);
        assert!((g[0] - 0.01).abs() < 1e-15);
        assert!((g[4] - 0.1).abs() < 1e-15);
        // Constant ratio between neighbours.
        let r0 = g[1] / g[0];
        let r1 = g[3] / g[2];
        assert!((r0 - r1).abs() < 1e-12);
    }
}
