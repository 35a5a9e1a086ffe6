//! Design-axis capability traits.
//!
//! A design search only makes sense along axes the sample physically has.
//! Each axis is its own trait so that search drivers can demand exactly the
//! capabilities they exercise as trait bounds, and an impossible request
//! fails at compile time rather than mid-search.

use ro_fisher::Fisher;
use ro_sim::Instrument;
use ro_types::{DesignResult, MeasurementPlan, ParamId, ParameterArena};

/// An underlayer deposited between the substrate and the sample proper,
/// given as `(thickness_angstrom, sld_1e-6_per_angstrom_sq)`.
pub type Underlayer = (f64, f64);

/// Common surface of every sample model.
pub trait SampleModel {
    fn name(&self) -> &str;

    fn arena(&self) -> &ParameterArena;

    fn arena_mut(&mut self) -> &mut ParameterArena;

    /// The parameters the experiment is being designed to resolve, in a
    /// stable order. Information matrices are indexed by this ordering.
    fn design_params(&self) -> Vec<ParamId>;
}

/// Samples for which the incidence angle is a design choice.
pub trait VariableAngle: SampleModel {
    /// Information matrix for measuring the sample with the given plan, one
    /// dataset per solvent contrast. Models without solvent exchange ignore
    /// `contrast_slds`.
    fn angle_info(
        &mut self,
        plan: &MeasurementPlan,
        contrast_slds: &[f64],
    ) -> DesignResult<Fisher>;
}

/// Samples that can be measured in different solvent contrasts.
pub trait VariableContrast: SampleModel {
    fn contrast_info(
        &mut self,
        plan: &MeasurementPlan,
        contrast_slds: &[f64],
    ) -> DesignResult<Fisher>;
}

/// Samples that admit an underlayer between substrate and sample.
pub trait VariableUnderlayer: SampleModel {
    fn underlayer_info(
        &mut self,
        plan: &MeasurementPlan,
        contrast_slds: &[f64],
        underlayers: &[Underlayer],
    ) -> DesignResult<Fisher>;
}

/// Concatenated Q grid and per-point incident counts for a measurement plan.
///
/// Each acquisition contributes its instrument Q grid and a uniform incident
/// count found by splitting the integrated flux across the grid. The counts
/// feed the inverse-variance weights of the information matrix.
pub fn acquisition_grid(
    instrument: &Instrument,
    plan: &MeasurementPlan,
) -> DesignResult<(Vec<f64>, Vec<f64>)> {
    let mut q = Vec::new();
    let mut counts = Vec::new();
    for acquisition in plan {
        let grid = instrument.q_grid(acquisition.angle_deg, acquisition.points)?;
        let incident = instrument.incident_counts(acquisition);
        counts.extend(std::iter::repeat(incident).take(grid.len()));
        q.extend(grid);
    }
    Ok((q, counts))
}
