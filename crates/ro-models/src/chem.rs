//! Neutron scattering lengths and solvent-contrast arithmetic shared by the
//! lipid models. Scattering lengths are in Å, volumes in Å^3, SLDs in Å^-2
//! unless a name says otherwise.

/// SLD of pure D2O (Å^-2).
pub const D2O_SLD: f64 = 6.35e-6;

/// SLD of pure H2O (Å^-2).
pub const H2O_SLD: f64 = -0.56e-6;

// Coherent scattering lengths of the relevant nuclei.
pub const CARBON_SL: f64 = 0.6646e-4;
pub const OXYGEN_SL: f64 = 0.5843e-4;
pub const HYDROGEN_SL: f64 = -0.3739e-4;
pub const PHOSPHORUS_SL: f64 = 0.5130e-4;
pub const DEUTERIUM_SL: f64 = 0.6671e-4;

/// Molecular volume of water.
pub const WATER_VOL: f64 = 30.4;

pub const H2O_SL: f64 = 2.0 * HYDROGEN_SL + OXYGEN_SL;
pub const D2O_SL: f64 = 2.0 * DEUTERIUM_SL + OXYGEN_SL;

/// Mole fraction of D2O in a water mixture of the given bulk SLD (Å^-2).
/// Contrasts outside the pure-H2O..pure-D2O range extrapolate linearly.
pub fn d2o_fraction(contrast_sld: f64) -> f64 {
    (contrast_sld - H2O_SLD) / (D2O_SLD - H2O_SLD)
}

/// Average scattering length of one water molecule at the given contrast.
pub fn water_sl(contrast_sld: f64) -> f64 {
    let x = d2o_fraction(contrast_sld);
    x * D2O_SL + (1.0 - x) * H2O_SL
}

/// Volume-fraction solvent mixing of a layer SLD with the bulk contrast.
/// Both SLDs and the result are in 1e-6 Å^-2.
pub fn solvate(layer_sld: f64, contrast_sld: f64, solvent_fraction: f64) -> f64 {
    layer_sld * (1.0 - solvent_fraction) + contrast_sld * solvent_fraction
}
