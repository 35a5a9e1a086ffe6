//! Fisher information built from simulated measurements.

use serde::{Deserialize, Serialize};
use tracing::debug;

use ro_types::{DesignError, DesignResult, ParamId, ParameterArena};

use crate::matrix::InfoMatrix;

/// Relative finite-difference step as a fraction of the current value.
const REL_STEP: f64 = 5e-3;

/// Absolute step used when a parameter's value is exactly zero.
const ABS_STEP: f64 = 1e-6;

/// A model response the information machinery can differentiate: given the
/// current parameter values, the predicted measurement at each Q point.
pub trait ResponseModel {
    fn response(&self, arena: &ParameterArena, q: &[f64]) -> DesignResult<Vec<f64>>;
}

impl<F> ResponseModel for F
where
    F: Fn(&ParameterArena, &[f64]) -> DesignResult<Vec<f64>>,
{
    fn response(&self, arena: &ParameterArena, q: &[f64]) -> DesignResult<Vec<f64>> {
        self(arena, q)
    }
}

/// One dataset's contribution to an information matrix: the Q grid it was
/// recorded on, the incident counts per point, and the model that predicts it.
pub struct FisherDataset<'a> {
    pub q: &'a [f64],
    pub counts: &'a [f64],
    pub model: &'a dyn ResponseModel,
}

/// A Fisher information matrix over an ordered list of free parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fisher {
    param_ids: Vec<ParamId>,
    matrix: InfoMatrix,
}

impl Fisher {
    /// Build the combined information matrix for one or more independent
    /// datasets over a fixed parameter ordering.
    ///
    /// Per dataset, the sensitivity of the model response to each parameter
    /// is measured by central finite differences; each data point then
    /// contributes with inverse-variance weight under counting statistics.
    /// Datasets sum: they are modeled as statistically independent
    /// measurements of the same parameters.
    ///
    /// Every perturbed parameter is restored before the next one is touched;
    /// the arena is bit-identical on return, including on error.
    pub fn from_datasets(
        arena: &mut ParameterArena,
        param_ids: &[ParamId],
        datasets: &[FisherDataset<'_>],
    ) -> DesignResult<Self> {
        let n = param_ids.len();
        let mut matrix = InfoMatrix::zeros(n);

        for dataset in datasets {
            if dataset.q.len() != dataset.counts.len() {
                return Err(DesignError::Config(format!(
                    "dataset q/counts length mismatch: {} vs {}",
                    dataset.q.len(),
                    dataset.counts.len()
                )));
            }

            let base = dataset.model.response(arena, dataset.q)?;
            if base.len() != dataset.q.len() {
                return Err(DesignError::Simulation(format!(
                    "model returned {} points for a {}-point grid",
                    base.len(),
                    dataset.q.len()
                )));
            }

            // Sensitivity of the response to each parameter, per point.
            let mut gradients = Vec::with_capacity(n);
            for &id in param_ids {
                gradients.push(gradient(arena, dataset.model, dataset.q, id)?);
            }
            debug!(
                params = n,
                points = dataset.q.len(),
                "accumulating dataset contribution"
            );

            for (k, (&r, &counts)) in base.iter().zip(dataset.counts).enumerate() {
                // Counting statistics: Var(R) ~ R^2 / N_reflected = R / N_incident,
                // so the inverse-variance weight is N_incident / R.
                if r <= 0.0 || counts <= 0.0 {
                    continue;
                }
                let weight = counts / r;
                for i in 0..n {
                    for j in i..n {
                        matrix.accumulate(i, j, weight * gradients[i][k] * gradients[j][k]);
                    }
                }
            }
        }

        Ok(Self {
            param_ids: param_ids.to_vec(),
            matrix,
        })
    }

    /// Combine with another matrix computed over the same parameter ordering.
    pub fn add(&self, other: &Fisher) -> DesignResult<Fisher> {
        if self.param_ids != other.param_ids {
            return Err(DesignError::Config(
                "cannot combine information matrices over different parameter orderings".into(),
            ));
        }
        Ok(Fisher {
            param_ids: self.param_ids.clone(),
            matrix: self.matrix.add(&other.matrix)?,
        })
    }

    pub fn param_ids(&self) -> &[ParamId] {
        &self.param_ids
    }

    pub fn matrix(&self) -> &InfoMatrix {
        &self.matrix
    }

    /// The E-optimality robustness scalar: the matrix's smallest eigenvalue.
    pub fn min_eigenvalue(&self) -> f64 {
        self.matrix.min_eigenvalue()
    }
}

/// Central-difference sensitivity of the model response to one parameter.
///
/// The step is a small fraction of the current magnitude, falling back to an
/// absolute step at exactly zero. A central difference costs two evaluations
/// but is second-order accurate, which matters for the sharply nonlinear
/// response around critical edges and fringes.
fn gradient(
    arena: &mut ParameterArena,
    model: &dyn ResponseModel,
    q: &[f64],
    id: ParamId,
) -> DesignResult<Vec<f64>> {
    let value = arena.value(id)?;
    let step = if value == 0.0 {
        ABS_STEP
    } else {
        REL_STEP * value.abs()
    };

    let upper = arena.with_value(id, value + step, |a| model.response(a, q))?;
    let lower = arena.with_value(id, value - step, |a| model.response(a, q))?;

    Ok(upper
        .iter()
        .zip(&lower)
        .map(|(u, l)| (u - l) / (2.0 * step))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ro_types::Parameter;

    /// r_k = p0 * q_k + p1, a linear response with analytic Jacobian
    /// (dr/dp0 = q_k, dr/dp1 = 1).
    fn linear_model(
        p0: ParamId,
        p1: ParamId,
    ) -> impl Fn(&ParameterArena, &[f64]) -> DesignResult<Vec<f64>> {
        move |arena: &ParameterArena, q: &[f64]| {
            let a = arena.value(p0)?;
            let b = arena.value(p1)?;
            Ok(q.iter().map(|&qk| a * qk + b).collect())
        }
    }

    fn two_param_arena() -> (ParameterArena, ParamId, ParamId) {
        let mut arena = ParameterArena::new();
        let p0 = arena.push(Parameter::varying("slope", 2.0, 1.0, 3.0));
        let p1 = arena.push(Parameter::varying("offset", 1.0, 0.5, 1.5));
        (arena, p0, p1)
    }

    #[test]
    fn linear_model_matches_analytic_matrix() {
        let (mut arena, p0, p1) = two_param_arena();
        let model = linear_model(p0, p1);
        let q = [0.5, 1.0, 2.0];
        let counts = [100.0, 100.0, 100.0];

        let fisher = Fisher::from_datasets(
            &mut arena,
            &[p0, p1],
            &[FisherDataset {
                q: &q,
                counts: &counts,
                model: &model,
            }],
        )
        .unwrap();

        // Hand-computed: M[i][j] = sum_k (counts/r_k) * J_ik * J_jk with
        // r_k = 2 q_k + 1, J_0k = q_k, J_1k = 1.
        let mut expected = [[0.0_f64; 2]; 2];
        for (&qk, &ck) in q.iter().zip(&counts) {
            let r = 2.0 * qk + 1.0;
            let w = ck / r;
            expected[0][0] += w * qk * qk;
            expected[0][1] += w * qk;
            expected[1][1] += w;
        }
        expected[1][0] = expected[0][1];

        for i in 0..2 {
            for j in 0..2 {
                let got = fisher.matrix().get(i, j);
                assert!(
                    (got - expected[i][j]).abs() < 1e-6 * expected[i][j].abs().max(1.0),
                    "M[{i}][{j}] = {got}, expected {}",
                    expected[i][j]
                );
            }
        }
        assert!(fisher.matrix().is_symmetric(1e-12));
        for e in fisher.matrix().eigenvalues() {
            assert!(e >= 0.0);
        }
    }

    #[test]
    fn parameters_restored_after_build() {
        let (mut arena, p0, p1) = two_param_arena();
        let before = arena.values();
        let model = linear_model(p0, p1);
        let q = [0.5, 1.0];
        let counts = [10.0, 10.0];
        Fisher::from_datasets(
            &mut arena,
            &[p0, p1],
            &[FisherDataset {
                q: &q,
                counts: &counts,
                model: &model,
            }],
        )
        .unwrap();
        assert_eq!(arena.values(), before);
    }

    #[test]
    fn parameters_restored_even_when_model_fails() {
        let mut arena = ParameterArena::new();
        let p = arena.push(Parameter::varying("p", 2.0, 1.0, 3.0));
        let before = arena.values();
        let failing = |_: &ParameterArena, _: &[f64]| -> DesignResult<Vec<f64>> {
            Err(DesignError::Simulation("diverged".into()))
        };
        let q = [1.0];
        let counts = [1.0];
        let result = Fisher::from_datasets(
            &mut arena,
            &[p],
            &[FisherDataset {
                q: &q,
                counts: &counts,
                model: &failing,
            }],
        );
        assert!(result.is_err());
        assert_eq!(arena.values(), before);
    }

    #[test]
    fn combining_datasets_equals_adding_matrices() {
        let (mut arena, p0, p1) = two_param_arena();
        let model = linear_model(p0, p1);
        let q1 = [0.5, 1.0];
        let c1 = [50.0, 50.0];
        let q2 = [2.0, 4.0];
        let c2 = [200.0, 200.0];
        let ids = [p0, p1];

        let d1 = FisherDataset {
            q: &q1,
            counts: &c1,
            model: &model,
        };
        let d2 = FisherDataset {
            q: &q2,
            counts: &c2,
            model: &model,
        };

        let combined =
            Fisher::from_datasets(&mut arena, &ids, &[d1, d2]).unwrap();
        let f1 = Fisher::from_datasets(
            &mut arena,
            &ids,
            &[FisherDataset {
                q: &q1,
                counts: &c1,
                model: &model,
            }],
        )
        .unwrap();
        let f2 = Fisher::from_datasets(
            &mut arena,
            &ids,
            &[FisherDataset {
                q: &q2,
                counts: &c2,
                model: &model,
            }],
        )
        .unwrap();
        let summed = f1.add(&f2).unwrap();

        for i in 0..2 {
            for j in 0..2 {
                let a = combined.matrix().get(i, j);
                let b = summed.matrix().get(i, j);
                assert!((a - b).abs() < 1e-9 * a.abs().max(1.0), "({i},{j}): {a} vs {b}");
            }
        }
    }

    #[test]
    fn zero_gradient_parameter_gives_singular_matrix_not_error() {
        let mut arena = ParameterArena::new();
        let live = arena.push(Parameter::varying("live", 2.0, 1.0, 3.0));
        let dead = arena.push(Parameter::varying("dead", 5.0, 4.0, 6.0));
        // Response ignores `dead` entirely.
        let model = move |arena: &ParameterArena, q: &[f64]| -> DesignResult<Vec<f64>> {
            let a = arena.value(live)?;
            Ok(q.iter().map(|&qk| a * qk + 1.0).collect())
        };
        let q = [0.5, 1.0, 2.0];
        let counts = [100.0, 100.0, 100.0];
        let fisher = Fisher::from_datasets(
            &mut arena,
            &[live, dead],
            &[FisherDataset {
                q: &q,
                counts: &counts,
                model: &model,
            }],
        )
        .unwrap();

        // Dead parameter's row and column are exactly zero.
        assert_eq!(fisher.matrix().get(1, 1), 0.0);
        assert_eq!(fisher.matrix().get(0, 1), 0.0);
        // The matrix is singular, so the robustness scalar is zero.
        assert!(fisher.min_eigenvalue().abs() < 1e-12);
    }

    #[test]
    fn scalarization_invariant_under_parameter_relabeling() {
        let (mut arena, p0, p1) = two_param_arena();
        let model = linear_model(p0, p1);
        let q = [0.5, 1.0, 2.0];
        let counts = [100.0, 150.0, 200.0];

        let forward = Fisher::from_datasets(
            &mut arena,
            &[p0, p1],
            &[FisherDataset {
                q: &q,
                counts: &counts,
                model: &model,
            }],
        )
        .unwrap();
        let reversed = Fisher::from_datasets(
            &mut arena,
            &[p1, p0],
            &[FisherDataset {
                q: &q,
                counts: &counts,
                model: &model,
            }],
        )
        .unwrap();

        let a = forward.min_eigenvalue();
        let b = reversed.min_eigenvalue();
        assert!((a - b).abs() < 1e-9 * a.max(1.0), "{a} vs {b}");
        // Determinism: scalarizing the same matrix twice agrees exactly.
        assert_eq!(forward.min_eigenvalue(), forward.min_eigenvalue());
    }

    #[test]
    fn add_rejects_mismatched_orderings() {
        let (mut arena, p0, p1) = two_param_arena();
        let model = linear_model(p0, p1);
        let q = [1.0];
        let counts = [10.0];
        let dataset = FisherDataset {
            q: &q,
            counts: &counts,
            model: &model,
        };
        let a = Fisher::from_datasets(&mut arena, &[p0, p1], &[dataset]).unwrap();
        let dataset = FisherDataset {
            q: &q,
            counts: &counts,
            model: &model,
        };
        let b = Fisher::from_datasets(&mut arena, &[p1, p0], &[dataset]).unwrap();
        assert!(a.add(&b).is_err());
    }

    #[test]
    fn nonpositive_response_points_are_skipped() {
        let mut arena = ParameterArena::new();
        let p = arena.push(Parameter::varying("p", 1.0, 0.5, 1.5));
        // Response dips negative over part of the grid.
        let model = move |arena: &ParameterArena, q: &[f64]| -> DesignResult<Vec<f64>> {
            let a = arena.value(p)?;
            Ok(q.iter().map(|&qk| a * (qk - 1.0)).collect())
        };
        let q = [0.0, 0.5, 2.0];
        let counts = [10.0, 10.0, 10.0];
        let fisher = Fisher::from_datasets(
            &mut arena,
            &[p],
            &[FisherDataset {
                q: &q,
                counts: &counts,
                model: &model,
            }],
        )
        .unwrap();
        // Only the q=2.0 point (r = 1.0 > 0) contributes: w = 10, dr/dp = 1.
        assert!((fisher.matrix().get(0, 0) - 10.0).abs() < 1e-6);
    }
}
