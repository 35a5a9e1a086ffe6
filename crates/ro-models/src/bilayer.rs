//! Supported DMPC bilayer on a silicon block.
//!
//! The stack is Si | SiO2 | (optional underlayers) | inner headgroup |
//! tailgroups | outer headgroup | water. Headgroup and tailgroup layers are
//! derived from the DMPC molecular volumes and scattering lengths, the oxide
//! and bilayer are partially hydrated by the bulk solvent, and extra
//! underlayers can be slotted between the oxide and the bilayer. All three
//! design axes are meaningful for this sample.

use tracing::debug;

use ro_fisher::{Fisher, FisherDataset};
use ro_sim::{reflectivity, Instrument, ResolvedLayer};
use ro_types::{
    DesignError, DesignResult, MeasurementPlan, ParamId, Parameter, ParameterArena,
};

use crate::capability::{
    acquisition_grid, SampleModel, Underlayer, VariableAngle, VariableContrast,
    VariableUnderlayer,
};
use crate::chem;

const SI_SLD: f64 = 2.073;
const SIO2_SLD: f64 = 3.41;

// DMPC headgroup and (two-chain) tailgroup volumes and scattering lengths.
const DMPC_HG_VOL: f64 = 320.9;
const DMPC_TG_VOL: f64 = 783.3;
const DMPC_HG_SL: f64 = 6.41e-4;
const DMPC_TG_SL: f64 = -3.08e-4;

/// Roughness applied to deposited underlayers (Å).
const UNDERLAYER_ROUGH: f64 = 2.0;

/// A hydrated DMPC bilayer deposited on the native oxide of silicon.
#[derive(Debug, Clone)]
pub struct LipidBilayer {
    name: String,
    arena: ParameterArena,
    kernel: BilayerKernel,
    pub instrument: Instrument,
}

#[derive(Debug, Clone, Copy)]
struct BilayerKernel {
    si_rough: ParamId,
    sio2_thick: ParamId,
    sio2_rough: ParamId,
    sio2_solv: ParamId,
    dmpc_apm: ParamId,
    bilayer_rough: ParamId,
    bilayer_solv: ParamId,
    hg_waters: ParamId,
    scale: f64,
    bkg: f64,
    dq: f64,
}

impl BilayerKernel {
    fn layers(
        &self,
        arena: &ParameterArena,
        contrast_sld: f64,
        underlayers: &[Underlayer],
    ) -> DesignResult<Vec<ResolvedLayer>> {
        let si_rough = arena.value(self.si_rough)?;
        let sio2_thick = arena.value(self.sio2_thick)?;
        let sio2_rough = arena.value(self.sio2_rough)?;
        let sio2_solv = arena.value(self.sio2_solv)?;
        let apm = arena.value(self.dmpc_apm)?;
        let bilayer_rough = arena.value(self.bilayer_rough)?;
        let bilayer_solv = arena.value(self.bilayer_solv)?;
        let hg_waters = arena.value(self.hg_waters)?;

        // Headgroup hydration water exchanges with the bulk solvent.
        let hg_vol = DMPC_HG_VOL + chem::WATER_VOL * hg_waters;
        let hg_sl = DMPC_HG_SL + chem::water_sl(contrast_sld * 1e-6) * hg_waters;
        let hg_sld = hg_sl / hg_vol * 1e6;
        let tg_sld = DMPC_TG_SL / DMPC_TG_VOL * 1e6;
        let hg_thick = hg_vol / apm;
        let tg_thick = DMPC_TG_VOL / apm;

        let sio2_sld = chem::solvate(SIO2_SLD, contrast_sld, sio2_solv);
        let hg_sld = chem::solvate(hg_sld, contrast_sld, bilayer_solv);
        let tg_sld = chem::solvate(tg_sld, contrast_sld, bilayer_solv);

        let mut layers = vec![
            ResolvedLayer::new(0.0, SI_SLD, 0.0),
            ResolvedLayer::new(sio2_thick, sio2_sld, si_rough),
        ];
        for &(thick, sld) in underlayers {
            layers.push(ResolvedLayer::new(thick, sld, UNDERLAYER_ROUGH));
        }
        // Inner headgroup sits on the oxide (or the last underlayer).
        layers.push(ResolvedLayer::new(hg_thick, hg_sld, sio2_rough));
        layers.push(ResolvedLayer::new(tg_thick, tg_sld, bilayer_rough));
        layers.push(ResolvedLayer::new(tg_thick, tg_sld, bilayer_rough));
        layers.push(ResolvedLayer::new(hg_thick, hg_sld, bilayer_rough));
        layers.push(ResolvedLayer::new(0.0, contrast_sld, bilayer_rough));
        Ok(layers)
    }
}

impl LipidBilayer {
    pub fn new() -> Self {
        let mut arena = ParameterArena::new();
        let si_rough = arena.push(Parameter::varying("Si/SiO2 Roughness", 2.0, 1.0, 8.0));
        let sio2_thick = arena.push(Parameter::varying("SiO2 Thickness", 14.7, 5.0, 20.0));
        let sio2_rough = arena.push(Parameter::fixed("SiO2/Bilayer Roughness", 2.0));
        let sio2_solv = arena.push(Parameter::fixed("SiO2 Hydration", 0.245));
        let dmpc_apm =
            arena.push(Parameter::varying("DMPC Area Per Molecule", 49.9, 30.0, 60.0));
        let bilayer_rough = arena.push(Parameter::varying("Bilayer Roughness", 6.57, 1.0, 8.0));
        let bilayer_solv = arena.push(Parameter::varying("Bilayer Hydration", 0.074, 0.0, 1.0));
        let hg_waters =
            arena.push(Parameter::varying("Headgroup Bound Waters", 3.59, 0.0, 20.0));

        Self {
            name: "lipid_bilayer".to_string(),
            arena,
            kernel: BilayerKernel {
                si_rough,
                sio2_thick,
                sio2_rough,
                sio2_solv,
                dmpc_apm,
                bilayer_rough,
                bilayer_solv,
                hg_waters,
                scale: 1.0,
                bkg: 5e-6,
                dq: 2.0,
            },
            instrument: Instrument::default(),
        }
    }

    /// Resolved stack at one contrast, optionally with underlayers.
    pub fn layers(
        &self,
        contrast_sld: f64,
        underlayers: &[Underlayer],
    ) -> DesignResult<Vec<ResolvedLayer>> {
        self.kernel.layers(&self.arena, contrast_sld, underlayers)
    }

    fn conditions_info(
        &mut self,
        plan: &MeasurementPlan,
        contrast_slds: &[f64],
        underlayers: &[Underlayer],
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
            underlayers = underlayers.len(),
            points = q.len(),
            "building bilayer information"
        );

        let kernel = self.kernel;
        let models: Vec<_> = contrast_slds
            .iter()
            .map(|&contrast| {
                let unders = underlayers.to_vec();
                move |arena: &ParameterArena, q: &[f64]| -> DesignResult<Vec<f64>> {
                    let layers = kernel.layers(arena, contrast, &unders)?;
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

impl Default for LipidBilayer {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleModel for LipidBilayer {
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

impl VariableAngle for LipidBilayer {
    fn angle_info(
        &mut self,
        plan: &MeasurementPlan,
        contrast_slds: &[f64],
    ) -> DesignResult<Fisher> {
        self.conditions_info(plan, contrast_slds, &[])
    }
}

impl VariableContrast for LipidBilayer {
    fn contrast_info(
        &mut self,
        plan: &MeasurementPlan,
        contrast_slds: &[f64],
    ) -> DesignResult<Fisher> {
        self.conditions_info(plan, contrast_slds, &[])
    }
}

impl VariableUnderlayer for LipidBilayer {
    fn underlayer_info(
        &mut self,
        plan: &MeasurementPlan,
        contrast_slds: &[f64],
        underlayers: &[Underlayer],
    ) -> DesignResult<Fisher> {
        self.conditions_info(plan, contrast_slds, underlayers)
    }
}
