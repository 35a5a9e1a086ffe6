//! # ro-models
//!
//! Sample models and the design-axis capabilities they expose.
//!
//! Every model owns a [`ParameterArena`](ro_types::ParameterArena) holding its
//! unknowns and answers information-matrix queries through the capability
//! traits in [`capability`]: a model implements [`VariableAngle`] if measuring
//! it at different incidence angles is meaningful, [`VariableContrast`] if it
//! can be measured in different solvent contrasts, and [`VariableUnderlayer`]
//! if an extra layer can be deposited beneath it. Asking for an axis a model
//! does not expose is a compile error, not a silent zero.

pub mod bilayer;
pub mod capability;
pub mod monolayer;
pub mod sample;

mod chem;

pub use bilayer::LipidBilayer;
pub use capability::{
    acquisition_grid, SampleModel, Underlayer, VariableAngle, VariableContrast,
    VariableUnderlayer,
};
pub use monolayer::LipidMonolayer;
pub use sample::{
    many_param_sample, similar_sld_sample_1, similar_sld_sample_2, simple_sample,
    thin_layer_sample_1, thin_layer_sample_2, Sample,
};
