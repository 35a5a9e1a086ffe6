//! Measurement simulation: a model response plus counting statistics.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Poisson};
use tracing::debug;

use ro_types::{DesignError, DesignResult, MeasurementPlan, SimulatedDataset};

use crate::instrument::Instrument;

/// Simulate a measurement plan against a model reflectivity function.
///
/// `model` maps a Q grid to model reflectivity under the *current* parameter
/// values; whatever arena the caller evaluates against is captured in the
/// closure. Per acquisition the instrument supplies a Q grid and incident
/// counts; the dataset's uncertainty column follows counting statistics
/// (`sigma_R = sqrt(R / incident)`).
///
/// With `noise_seed` set, reflected counts are Poisson-sampled with a
/// reproducible generator; otherwise the noiseless model curve is returned,
/// which is what information-matrix construction wants.
pub fn simulate<F>(
    model: F,
    plan: &MeasurementPlan,
    instrument: &Instrument,
    noise_seed: Option<u64>,
) -> DesignResult<SimulatedDataset>
where
    F: Fn(&[f64]) -> DesignResult<Vec<f64>>,
{
    if plan.is_empty() {
        return Err(DesignError::Config("measurement plan is empty".into()));
    }

    let mut rng = noise_seed.map(ChaCha8Rng::seed_from_u64);
    let mut dataset = SimulatedDataset::new(Vec::new(), Vec::new(), Vec::new(), Vec::new())?;

    for acquisition in plan {
        if acquisition.time <= 0.0 {
            return Err(DesignError::Config(format!(
                "counting time must be positive, got {}",
                acquisition.time
            )));
        }
        let q = instrument.q_grid(acquisition.angle_deg, acquisition.points)?;
        let r_model = model(&q)?;
        if r_model.len() != q.len() {
            return Err(DesignError::Simulation(format!(
                "model returned {} points for a {}-point grid",
                r_model.len(),
                q.len()
            )));
        }

        let incident = instrument.incident_counts(acquisition);
        debug!(
            angle = acquisition.angle_deg,
            points = acquisition.points,
            incident, "simulating acquisition"
        );

        let n = q.len();
        let mut r = Vec::with_capacity(n);
        let mut dr = Vec::with_capacity(n);
        for &ri in &r_model {
            let expected = ri * incident;
            let observed = match (&mut rng, expected > 0.0) {
                (Some(rng), true) => {
                    let sampled = Poisson::new(expected)
                        .map_err(|e| DesignError::Simulation(e.to_string()))?
                        .sample(rng);
                    sampled / incident
                }
                _ => ri,
            };
            dr.push(if ri > 0.0 && incident > 0.0 {
                (ri / incident).sqrt()
            } else {
                0.0
            });
            r.push(observed);
        }

        dataset.extend(&SimulatedDataset::new(q, r, dr, vec![incident; n])?);
    }

    Ok(dataset)
}
