//! Lipid monolayer at the air/water interface.
//!
//! The layer stack is derived from molecular volumes and scattering lengths
//! rather than declared directly: the tailgroup and headgroup thicknesses
//! follow from the area per molecule, and the headgroup SLD depends on how
//! many water molecules hydrate it at the current solvent contrast. The
//! stack is rebuilt from the arena on every evaluation so finite-difference
//! probes of any parameter propagate through the chemistry.

use tracing::debug;

use ro_fisher::{Fisher, FisherDataset};
use ro_sim::{reflectivity, Instrument, ResolvedLayer};
use ro_types::{
    DesignAxis, DesignError, DesignResult, MeasurementPlan, ParamId, Parameter, ParameterArena,
};

use crate::capability::{
    acquisition_grid, SampleModel, Underlayer, VariableAngle, VariableContrast,
};
use crate::chem;

// DPPG fragment volumes (Å^3).
const CH2_VOL: f64 = 28.1;
const CH3_VOL: f64 = 52.7 / 2.0;
const CO2_VOL: f64 = 39.0;
const C3H5_VOL: f64 = 68.8;
const PO4_VOL: f64 = 53.7;

/// A DPPG monolayer spread on a water subphase.
#[derive(Debug, Clone)]
pub struct LipidMonolayer {
    name: String,
    arena: ParameterArena,
    kernel: MonolayerKernel,
    pub instrument: Instrument,
}

/// Everything the reflectivity closure needs, free of arena borrows.
#[derive(Debug, Clone, Copy)]
struct MonolayerKernel {
    air_tg_rough: ParamId,
    lipid_apm: ParamId,
    hg_waters: ParamId,
    monolayer_rough: ParamId,
    deuterated: bool,
    scale: f64,
    bkg: f64,
    dq: f64,
}

impl MonolayerKernel {
    /// Resolve the air | tailgroup | headgroup | water stack at the current
    /// arena values for one solvent contrast (1e-6 Å^-2).
    fn layers(
        &self,
        arena: &ParameterArena,
        contrast_sld: f64,
    ) -> DesignResult<Vec<ResolvedLayer>> {
        let apm = arena.value(self.lipid_apm)?;
        let hg_waters = arena.value(self.hg_waters)?;
        let air_tg_rough = arena.value(self.air_tg_rough)?;
        let monolayer_rough = arena.value(self.monolayer_rough)?;

        // Scattering length sums of the molecular fragments.
        let ch2_sl = chem::CARBON_SL + 2.0 * chem::HYDROGEN_SL;
        let ch3_sl = chem::CARBON_SL + 3.0 * chem::HYDROGEN_SL;
        let cd2_sl = chem::CARBON_SL + 2.0 * chem::DEUTERIUM_SL;
        let cd3_sl = chem::CARBON_SL + 3.0 * chem::DEUTERIUM_SL;
        let co2_sl = chem::CARBON_SL + 2.0 * chem::OXYGEN_SL;
        let c3h5_sl = 3.0 * chem::CARBON_SL + 5.0 * chem::HYDROGEN_SL;
        let po4_sl = chem::PHOSPHORUS_SL + 4.0 * chem::OXYGEN_SL;

        let tg_vol = 28.0 * CH2_VOL + 2.0 * CH3_VOL;
        let tg_sl = if self.deuterated {
            28.0 * cd2_sl + 2.0 * cd3_sl
        } else {
            28.0 * ch2_sl + 2.0 * ch3_sl
        };

        // Headgroup plus its bound hydration water, which takes on the
        // scattering length of the current solvent mixture.
        let mut hg_vol = PO4_VOL + 2.0 * C3H5_VOL + 2.0 * CO2_VOL;
        let mut hg_sl = po4_sl + 2.0 * c3h5_sl + 2.0 * co2_sl;
        hg_vol += chem::WATER_VOL * hg_waters;
        hg_sl += chem::water_sl(contrast_sld * 1e-6) * hg_waters;

        let tg_sld = tg_sl / tg_vol * 1e6;
        let hg_sld = hg_sl / hg_vol * 1e6;
        let tg_thick = tg_vol / apm;
        let hg_thick = hg_vol / apm;

        Ok(vec![
            ResolvedLayer::new(0.0, 0.0, 0.0),
            ResolvedLayer::new(tg_thick, tg_sld, air_tg_rough),
            ResolvedLayer::new(hg_thick, hg_sld, monolayer_rough),
            ResolvedLayer::new(0.0, contrast_sld, air_tg_rough),
        ])
    }
}

impl LipidMonolayer {
    pub fn new(deuterated: bool) -> Self {
        let mut arena = ParameterArena::new();
        let air_tg_rough =
            arena.push(Parameter::fixed("Air/Tailgroup Roughness", 5.0));
        let lipid_apm =
            arena.push(Parameter::varying("Lipid Area Per Molecule", 54.1039, 30.0, 80.0));
        let hg_waters = arena.push(Parameter::fixed("Headgroup Bound Waters", 6.6874));
        let monolayer_rough = arena.push(Parameter::fixed("Monolayer Roughness", 2.0233));

        Self {
            name: "lipid_monolayer".to_string(),
            arena,
            kernel: MonolayerKernel {
                air_tg_rough,
                lipid_apm,
                hg_waters,
                monolayer_rough,
                deuterated,
                scale: 1.0,
                bkg: 5e-6,
                dq: 3.0,
            },
            instrument: Instrument::default(),
        }
    }

    pub fn deuterated(&self) -> bool {
        self.kernel.deuterated
    }

    /// Resolved stack at one contrast, for profile inspection.
    pub fn layers(&self, contrast_sld: f64) -> DesignResult<Vec<ResolvedLayer>> {
        self.kernel.layers(&self.arena, contrast_sld)
    }

    /// Monolayers float on the subphase itself; there is no substrate to
    /// deposit an underlayer on, so the axis is structurally impossible.
    pub fn underlayer_info(
        &mut self,
        _plan: &MeasurementPlan,
        _contrast_slds: &[f64],
        _underlayers: &[Underlayer],
    ) -> DesignResult<Fisher> {
        Err(DesignError::UnsupportedDesignAxis {
            sample: self.name.clone(),
            axis: DesignAxis::Underlayer,
        })
    }

    fn conditions_info(
        &mut self,
        plan: &MeasurementPlan,
        contrast_slds: &[f64],
    ) -> DesignResult<Fisher> {
        if contrast_slds.is_empty() {
            return Err(DesignError::Config(
                "a solvated sample needs at least one contrast".into(),
            ));
        }
        let (q, counts) = acquisition_grid(&self.instrument, plan)?;
        debug!(
            sample = %self.name,
            contrasts = contrast_slds.len(),
            points = q.len(),
            "building monolayer information"
        );

        let kernel = self.kernel;
        let models: Vec<_> = contrast_slds
            .iter()
            .map(|&contrast| {
                move |arena: &ParameterArena, q: &[f64]| -> DesignResult<Vec<f64>> {
                    let layers = kernel.layers(arena, contrast)?;
                    Ok(reflectivity(q, &layers, kernel.scale, kernel.bkg, kernel.dq))
                }
            })
            .collect();
        let datasets: Vec<FisherDataset<'_>> = models
            .iter()
            .map(|model| FisherDataset {
                q: &q,
                counts: &counts,
                model,
            })
            .collect();

        let ids = self.arena.varying();
        Fisher::from_datasets(&mut self.arena, &ids, &datasets)
    }
}

impl SampleModel for LipidMonolayer {
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

impl VariableAngle for LipidMonolayer {
    fn angle_info(
        &mut self,
        plan: &MeasurementPlan,
        contrast_slds: &[f64],
    ) -> DesignResult<Fisher> {
        self.conditions_info(plan, contrast_slds)
    }
}

impl VariableContrast for LipidMonolayer {
    fn contrast_info(
        &mut self,
        plan: &MeasurementPlan,
        contrast_slds: &[f64],
    ) -> DesignResult<Fisher> {
        self.conditions_info(plan, contrast_slds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ro_types::AnglePoint;

    fn plan() -> MeasurementPlan {
        vec![AnglePoint::new(0.8, 30, 20.0)]
    }

    #[test]
    fn only_area_per_molecule_varies() {
        let sample = LipidMonolayer::new(false);
        let ids = sample.design_params();
        assert_eq!(ids.len(), 1);
        let p = sample.arena().get(ids[0]).unwrap();
        assert_eq!(p.name, "Lipid Area Per Molecule");
        assert!((p.value - 54.1039).abs() < 1e-9);
        assert_eq!(p.bounds, (30.0, 80.0));
    }

    #[test]
    fn stack_thicknesses_follow_area_per_molecule() {
        let sample = LipidMonolayer::new(true);
        let layers = sample.layers(6.35).unwrap();
        assert_eq!(layers.len(), 4);
        let tg_vol = 28.0 * CH2_VOL + 2.0 * CH3_VOL;
        assert!((layers[1].thickness - tg_vol / 54.1039).abs() < 1e-6);
        // Headgroup volume grows with bound waters, so its layer is thinner
        // than the tails but not zero.
        assert!(layers[2].thickness > 0.0 && layers[2].thickness < layers[1].thickness);
        // Deuterated tails sit near 7 in SLD, the subphase at the contrast.
        assert!(layers[1].sld > 6.0 && layers[1].sld < 8.0);
        assert!((layers[3].sld - 6.35).abs() < 1e-12);
    }

    #[test]
    fn hydrogenated_tails_have_negative_sld() {
        let sample = LipidMonolayer::new(false);
        let layers = sample.layers(6.35).unwrap();
        assert!(layers[1].sld < 0.0);
    }

    #[test]
    fn headgroup_sld_tracks_contrast() {
        let sample = LipidMonolayer::new(false);
        let in_d2o = sample.layers(6.35).unwrap()[2].sld;
        let in_h2o = sample.layers(-0.56).unwrap()[2].sld;
        // Bound waters exchange with the solvent.
        assert!(in_d2o > in_h2o);
    }

    #[test]
    fn angle_info_positive_for_single_contrast() {
        let mut sample = LipidMonolayer::new(true);
        let fisher = sample.angle_info(&plan(), &[6.35]).unwrap();
        assert_eq!(fisher.param_ids().len(), 1);
        assert!(fisher.min_eigenvalue() > 0.0);
    }

    #[test]
    fn contrasts_add_information() {
        let mut sample = LipidMonolayer::new(true);
        let one = sample.contrast_info(&plan(), &[6.35]).unwrap();
        let three = sample.contrast_info(&plan(), &[6.35, 0.1, -0.56]).unwrap();
        assert!(three.min_eigenvalue() > one.min_eigenvalue());
    }

    #[test]
    fn contrast_pair_order_does_not_matter() {
        let mut sample = LipidMonolayer::new(true);
        let ab = sample.contrast_info(&plan(), &[6.35, -0.56]).unwrap();
        let ba = sample.contrast_info(&plan(), &[-0.56, 6.35]).unwrap();
        let (a, b) = (ab.min_eigenvalue(), ba.min_eigenvalue());
        assert!((a - b).abs() < 1e-9 * a.max(1e-30), "{a} vs {b}");
    }

    #[test]
    fn contrast_info_requires_a_contrast() {
        let mut sample = LipidMonolayer::new(false);
        assert!(matches!(
            sample.contrast_info(&plan(), &[]),
            Err(DesignError::Config(_))
        ));
    }

    #[test]
    fn underlayers_are_rejected() {
        let mut sample = LipidMonolayer::new(false);
        let err = sample.underlayer_info(&plan(), &[6.35], &[(50.0, 6.0)]);
        assert!(matches!(
            err,
            Err(DesignError::UnsupportedDesignAxis {
                axis: DesignAxis::Underlayer,
                ..
            })
        ));
    }

    #[test]
    fn parameters_restored_after_information_build() {
        let mut sample = LipidMonolayer::new(true);
        let before = sample.arena().values();
        sample.angle_info(&plan(), &[6.35, -0.56]).unwrap();
        assert_eq!(sample.arena().values(), before);
    }
}
