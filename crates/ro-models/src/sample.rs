//! Wrapper model for a plain slab-stack sample.

use tracing::debug;

use ro_fisher::{Fisher, FisherDataset};
use ro_sim::{reflectivity, simulate, Instrument, SlabSpec, Structure, DEFAULT_BOUND_SIZE};
use ro_types::{
    DesignResult, MeasurementPlan, ParamId, ParameterArena, SimulatedDataset,
};

use crate::capability::{acquisition_grid, SampleModel, VariableAngle};

/// A solid slab stack wrapped for experimental design.
///
/// Building a `Sample` marks every interior layer's SLD and thickness as a
/// varying parameter with fractional bounds around its nominal value, so the
/// information matrix answers "how well would this measurement pin down the
/// layers I believe are there".
#[derive(Debug, Clone)]
pub struct Sample {
    name: String,
    arena: ParameterArena,
    structure: Structure,
    pub instrument: Instrument,
    pub scale: f64,
    pub bkg: f64,
    /// Instrument resolution as a dQ/Q FWHM percentage.
    pub dq: f64,
}

impl Sample {
    /// Wrap a slab stack. Specs run fronting medium first, backing last.
    pub fn from_specs(name: &str, specs: &[SlabSpec]) -> DesignResult<Self> {
        let mut arena = ParameterArena::new();
        let structure = Structure::from_specs(name, specs, &mut arena, DEFAULT_BOUND_SIZE)?;
        Ok(Self {
            name: name.to_string(),
            arena,
            structure,
            instrument: Instrument::default(),
            scale: 1.0,
            bkg: 5e-6,
            dq: 2.0,
        })
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    /// Model reflectivity at the current parameter values.
    pub fn reflectivity_curve(&self, q: &[f64]) -> DesignResult<Vec<f64>> {
        let layers = self.structure.resolve(&self.arena)?;
        Ok(reflectivity(q, &layers, self.scale, self.bkg, self.dq))
    }

    /// SLD depth profile at the current parameter values.
    pub fn sld_profile(&self, points: usize) -> DesignResult<(Vec<f64>, Vec<f64>)> {
        self.structure.sld_profile(&self.arena, points)
    }

    /// Simulate a noisy measurement of this sample under `plan`.
    pub fn simulate_measurement(
        &self,
        plan: &MeasurementPlan,
        noise_seed: Option<u64>,
    ) -> DesignResult<SimulatedDataset> {
        let layers = self.structure.resolve(&self.arena)?;
        let (scale, bkg, dq) = (self.scale, self.bkg, self.dq);
        simulate(
            |q| Ok(reflectivity(q, &layers, scale, bkg, dq)),
            plan,
            &self.instrument,
            noise_seed,
        )
    }
}

impl SampleModel for Sample {
    fn name(&self) -> &str {
        &self.name
    }

    fn arena(&self) -> &ParameterArena {
        &self.arena
    }

    fn arena_mut(&mut self) -> &mut ParameterArena {
        &mut self.arena
    }

    fn design_params(&self) -> Vec<ParamId> {
        self.arena.varying()
    }
}

impl VariableAngle for Sample {
    /// A solid stack has no solvent to exchange, so `contrast_slds` is
    /// ignored and the plan contributes a single dataset.
    fn angle_info(
        &mut self,
        plan: &MeasurementPlan,
        _contrast_slds: &[f64],
    ) -> DesignResult<Fisher> {
        let (q, counts) = acquisition_grid(&self.instrument, plan)?;
        debug!(sample = %self.name, points = q.len(), "building angle information");

        let structure = &self.structure;
        let (scale, bkg, dq) = (self.scale, self.bkg, self.dq);
        let model = move |arena: &ParameterArena, q: &[f64]| -> DesignResult<Vec<f64>> {
            let layers = structure.resolve(arena)?;
            Ok(reflectivity(q, &layers, scale, bkg, dq))
        };

        let ids = self.arena.varying();
        Fisher::from_datasets(
            &mut self.arena,
            &ids,
            &[FisherDataset {
                q: &q,
                counts: &counts,
                model: &model,
            }],
        )
    }
}

/// A 2-layer sample with well-separated SLDs.
pub fn simple_sample() -> Sample {
    let specs = [
        SlabSpec::new("Air", 0.0, 0.0, 0.0),
        SlabSpec::new("Layer 1", 4.0, 100.0, 2.0),
        SlabSpec::new("Layer 2", 8.0, 150.0, 2.0),
        SlabSpec::new("Substrate", 2.047, 0.0, 2.0),
    ];
    Sample::from_specs("simple_sample", &specs).expect("static sample definition is valid")
}

/// A 5-layer sample with many free parameters.
pub fn many_param_sample() -> Sample {
    let specs = [
        SlabSpec::new("Air", 0.0, 0.0, 0.0),
        SlabSpec::new("Layer 1", 2.0, 50.0, 6.0),
        SlabSpec::new("Layer 2", 1.7, 15.0, 2.0),
        SlabSpec::new("Layer 3", 0.8, 60.0, 2.0),
        SlabSpec::new("Layer 4", 3.2, 40.0, 2.0),
        SlabSpec::new("Layer 5", 4.0, 18.0, 2.0),
        SlabSpec::new("Substrate", 2.047, 0.0, 2.0),
    ];
    Sample::from_specs("many_param_sample", &specs).expect("static sample definition is valid")
}

/// A 2-layer sample where the second layer is very thin.
pub fn thin_layer_sample_1() -> Sample {
    let specs = [
        SlabSpec::new("Air", 0.0, 0.0, 0.0),
        SlabSpec::new("Layer 1", 4.0, 200.0, 2.0),
        SlabSpec::new("Layer 2", 6.0, 6.0, 2.0),
        SlabSpec::new("Substrate", 2.047, 0.0, 2.0),
    ];
    Sample::from_specs("thin_layer_sample_1", &specs).expect("static sample definition is valid")
}

/// A 3-layer sample ending in a very thin layer.
pub fn thin_layer_sample_2() -> Sample {
    let specs = [
        SlabSpec::new("Air", 0.0, 0.0, 0.0),
        SlabSpec::new("Layer 1", 4.0, 200.0, 2.0),
        SlabSpec::new("Layer 2", 5.0, 30.0, 6.0),
        SlabSpec::new("Layer 3", 6.0, 6.0, 2.0),
        SlabSpec::new("Substrate", 2.047, 0.0, 2.0),
    ];
    Sample::from_specs("thin_layer_sample_2", &specs).expect("static sample definition is valid")
}

/// A 2-layer sample whose layers differ by only 0.1 in SLD.
pub fn similar_sld_sample_1() -> Sample {
    let specs = [
        SlabSpec::new("Air", 0.0, 0.0, 0.0),
        SlabSpec::new("Layer 1", 0.9, 80.0, 2.0),
        SlabSpec::new("Layer 2", 1.0, 50.0, 6.0),
        SlabSpec::new("Substrate", 2.047, 0.0, 2.0),
    ];
    Sample::from_specs("similar_sld_sample_1", &specs).expect("static sample definition is valid")
}

/// A 3-layer sample with two layers of similar SLD.
pub fn similar_sld_sample_2() -> Sample {
    let specs = [
        SlabSpec::new("Air", 0.0, 0.0, 0.0),
        SlabSpec::new("Layer 1", 3.0, 50.0, 2.0),
        SlabSpec::new("Layer 2", 5.5, 30.0, 6.0),
        SlabSpec::new("Layer 3", 6.0, 35.0, 2.0),
        SlabSpec::new("Substrate", 2.047, 0.0, 2.0),
    ];
    Sample::from_specs("similar_sld_sample_2", &specs).expect("static sample definition is valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ro_types::AnglePoint;

    fn plan() -> MeasurementPlan {
        vec![AnglePoint::new(0.7, 30, 10.0), AnglePoint::new(2.3, 30, 40.0)]
    }

    #[test]
    fn simple_sample_has_four_design_params() {
        let sample = simple_sample();
        let ids = sample.design_params();
        assert_eq!(ids.len(), 4);
        let names: Vec<_> = ids
            .iter()
            .map(|&id| sample.arena().get(id).unwrap().name.clone())
            .collect();
        assert_eq!(
            names,
            vec![
                "Layer 1 SLD",
                "Layer 1 Thickness",
                "Layer 2 SLD",
                "Layer 2 Thickness"
            ]
        );
    }

    #[test]
    fn angle_info_is_positive_semidefinite_and_restores_params() {
        let mut sample = simple_sample();
        let before = sample.arena().values();
        let fisher = sample.angle_info(&plan(), &[]).unwrap();
        assert_eq!(fisher.param_ids().len(), 4);
        for e in fisher.matrix().eigenvalues() {
            assert!(e >= 0.0);
        }
        assert!(fisher.min_eigenvalue() >= 0.0);
        assert_eq!(sample.arena().values(), before);
    }

    #[test]
    fn longer_counting_never_loses_information() {
        let mut sample = simple_sample();
        let short = vec![AnglePoint::new(0.7, 30, 10.0)];
        let long = vec![AnglePoint::new(0.7, 30, 100.0)];
        let f_short = sample.angle_info(&short, &[]).unwrap();
        let f_long = sample.angle_info(&long, &[]).unwrap();
        // Counts scale linearly with time, so the whole matrix scales too.
        assert!(f_long.matrix().trace() > f_short.matrix().trace());
        let ratio = f_long.matrix().get(0, 0) / f_short.matrix().get(0, 0);
        assert!((ratio - 10.0).abs() < 1e-6);
    }

    #[test]
    fn two_angles_add_information_over_one() {
        let mut sample = simple_sample();
        let one = vec![AnglePoint::new(0.7, 30, 10.0)];
        let two = plan();
        let f_one = sample.angle_info(&one, &[]).unwrap();
        let f_two = sample.angle_info(&two, &[]).unwrap();
        assert!(f_two.matrix().trace() >= f_one.matrix().trace());
    }

    #[test]
    fn reflectivity_curve_is_physical() {
        let sample = simple_sample();
        let q = ro_sim::geomspace(0.005, 0.3, 100);
        let r = sample.reflectivity_curve(&q).unwrap();
        assert_eq!(r.len(), 100);
        for &ri in &r {
            assert!(ri > 0.0);
        }
        // Reflectivity falls by orders of magnitude over this Q range.
        assert!(r[99] < r[0] * 1e-3);
    }

    #[test]
    fn simulation_matches_plan_shape() {
        let sample = thin_layer_sample_1();
        let data = sample.simulate_measurement(&plan(), Some(7)).unwrap();
        assert_eq!(data.q.len(), 60);
        assert_eq!(data.counts.len(), 60);
    }

    #[test]
    fn predefined_samples_build() {
        for sample in [
            simple_sample(),
            many_param_sample(),
            thin_layer_sample_1(),
            thin_layer_sample_2(),
            similar_sld_sample_1(),
            similar_sld_sample_2(),
        ] {
            assert!(!sample.design_params().is_empty());
            assert!(sample.sld_profile(100).is_ok());
        }
    }
}
