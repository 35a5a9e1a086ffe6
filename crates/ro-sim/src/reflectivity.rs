//! Abeles-matrix specular reflectivity for slab stacks.
//!
//! The kernel follows the Parratt recursion with Névot–Croce roughness
//! factors, working in complex wave vectors so that it degrades gracefully
//! below the critical edge (total reflection) where the perpendicular wave
//! vector in the substrate becomes imaginary.

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::structure::ResolvedLayer;

/// FWHM → Gaussian sigma conversion: 1 / (2 sqrt(2 ln 2)).
const FWHM_TO_SIGMA: f64 = 0.424_660_900_144;

/// Number of abscissae used for Gaussian resolution smearing.
const SMEAR_POINTS: usize = 17;

/// Half-width of the smearing window in standard deviations.
const SMEAR_WIDTH: f64 = 3.5;

/// Model reflectivity at each Q point.
///
/// `layers` is the resolved stack, fronting first. `scale` multiplies the
/// ideal reflectivity, `bkg` adds a constant background, and `dq` is the
/// instrument resolution as a dQ/Q FWHM percentage (0 disables smearing).
pub fn reflectivity(q: &[f64], layers: &[ResolvedLayer], scale: f64, bkg: f64, dq: f64) -> Vec<f64> {
    q.iter()
        .map(|&qi| {
            let ideal = if dq > 0.0 {
                smeared(qi, layers, dq)
            } else {
                abeles(qi, layers)
            };
            scale * ideal + bkg
        })
        .collect()
}

/// Unsmeared reflectivity at a single Q point.
pub fn abeles(q: f64, layers: &[ResolvedLayer]) -> f64 {
    debug_assert!(layers.len() >= 2, "need at least fronting and backing");
    if q <= 0.0 {
        return 1.0;
    }

    let kz0_sq = (q / 2.0) * (q / 2.0);
    let rho0 = layers[0].sld * 1e-6;

    // Perpendicular wave vector in each medium. The argument goes negative
    // below the critical edge of a denser medium; the complex sqrt handles it.
    let kz: Vec<Complex64> = layers
        .iter()
        .map(|l| Complex64::new(kz0_sq - 4.0 * PI * (l.sld * 1e-6 - rho0), 0.0).sqrt())
        .collect();

    // Fresnel coefficient of the interface between layers j and j+1, with
    // the Névot–Croce factor for that interface's roughness.
    let fresnel = |j: usize| -> Complex64 {
        let (ka, kb) = (kz[j], kz[j + 1]);
        let sigma = layers[j + 1].roughness;
        (ka - kb) / (ka + kb) * (-2.0 * ka * kb * sigma * sigma).exp()
    };

    // Parratt recursion from the bottom interface upwards.
    let n = layers.len();
    let mut r = fresnel(n - 2);
    for j in (0..n - 2).rev() {
        let beta = (Complex64::i() * 2.0 * kz[j + 1] * layers[j + 1].thickness).exp();
        let rj = fresnel(j);
        let rb = r * beta;
        r = (rj + rb) / (Complex64::new(1.0, 0.0) + rj * rb);
    }

    r.norm_sqr()
}

/// Constant-dQ/Q Gaussian smearing around one Q point.
fn smeared(q: f64, layers: &[ResolvedLayer], dq_pct: f64) -> f64 {
    let sigma = q * dq_pct / 100.0 * FWHM_TO_SIGMA;
    if sigma <= 0.0 {
        return abeles(q, layers);
    }

    let mut sum = 0.0;
    let mut norm = 0.0;
    for k in 0..SMEAR_POINTS {
        let t = -SMEAR_WIDTH + 2.0 * SMEAR_WIDTH * k as f64 / (SMEAR_POINTS - 1) as f64;
        let qk = (q + t * sigma).max(1e-8);
        let w = (-0.5 * t * t).exp();
        sum += w * abeles(qk, layers);
        norm += w;
    }
    sum / norm
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::ResolvedLayer;

    fn bare_substrate(sld: f64) -> Vec<ResolvedLayer> {
        vec![
            ResolvedLayer::new(0.0, 0.0, 0.0),
            ResolvedLayer::new(0.0, sld, 0.0),
        ]
    }

    /// Fresnel reflectivity of a sharp interface, computed independently.
    fn fresnel_reference(q: f64, sld: f64) -> f64 {
        let kz0 = q / 2.0;
        let arg = kz0 * kz0 - 4.0 * PI * sld * 1e-6;
        if arg <= 0.0 {
            return 1.0;
        }
        let kzs = arg.sqrt();
        ((kz0 - kzs) / (kz0 + kzs)).powi(2)
    }

    #[test]
    fn total_reflection_below_critical_edge() {
        let layers = bare_substrate(2.047);
        // q_c = sqrt(16 pi rho) ~ 0.0101 for this substrate.
        for &q in &[0.002, 0.005, 0.008] {
            let r = abeles(q, &layers);
            assert!((r - 1.0).abs() < 1e-10, "R({q}) = {r}");
        }
    }

    #[test]
    fn matches_fresnel_above_critical_edge() {
        let layers = bare_substrate(2.047);
        for &q in &[0.02, 0.05, 0.1, 0.3] {
            let r = abeles(q, &layers);
            let expected = fresnel_reference(q, 2.047);
            assert!(
                (r - expected).abs() < 1e-12,
                "R({q}) = {r}, expected {expected}"
            );
        }
    }

    #[test]
    fn reflectivity_bounded_and_decreasing_overall() {
        let layers = vec![
            ResolvedLayer::new(0.0, 0.0, 0.0),
            ResolvedLayer::new(100.0, 4.0, 2.0),
            ResolvedLayer::new(150.0, 8.0, 2.0),
            ResolvedLayer::new(0.0, 2.047, 2.0),
        ];
        let q: Vec<f64> = (1..=100).map(|i| 0.004 * i as f64).collect();
        let r = reflectivity(&q, &layers, 1.0, 0.0, 2.0);
        for (&qi, &ri) in q.iter().zip(&r) {
            // Névot–Croce factors can overshoot unity marginally right at a
            // critical edge; allow a small margin.
            assert!(ri >= 0.0 && ri <= 1.01, "R({qi}) = {ri}");
        }
        // Kiessig fringes oscillate, but the envelope falls by orders of
        // magnitude across the range.
        assert!(r[r.len() - 1] < 1e-4 * r[0]);
    }

    #[test]
    fn roughness_damps_high_q() {
        let smooth = bare_substrate(2.047);
        let rough = vec![
            ResolvedLayer::new(0.0, 0.0, 0.0),
            ResolvedLayer::new(0.0, 2.047, 8.0),
        ];
        let q = 0.2;
        assert!(abeles(q, &rough) < abeles(q, &smooth));
    }

    #[test]
    fn scale_and_background_applied() {
        let layers = bare_substrate(2.047);
        let r = reflectivity(&[0.1], &layers, 0.5, 1e-6, 0.0);
        let ideal = abeles(0.1, &layers);
        assert!((r[0] - (0.5 * ideal + 1e-6)).abs() < 1e-15);
    }

    #[test]
    fn smearing_preserves_magnitude() {
        let layers = vec![
            ResolvedLayer::new(0.0, 0.0, 0.0),
            ResolvedLayer::new(120.0, 4.0, 2.0),
            ResolvedLayer::new(0.0, 2.047, 2.0),
        ];
        // Smeared reflectivity stays within the local min/max of the ideal
        // curve; check it is at least the same order of magnitude.
        let q = 0.08;
        let ideal = abeles(q, &layers);
        let smeared = smeared(q, &layers, 2.0);
        assert!(smeared > 0.0);
        assert!(smeared < 10.0 * ideal + 1e-6);
        assert!(smeared > 0.1 * ideal - 1e-6 || ideal < 1e-9);
    }
}
