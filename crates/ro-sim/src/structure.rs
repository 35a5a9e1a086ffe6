//! Layered sample structures.
//!
//! A [`Structure`] is an ordered stack of [`Slab`]s, fronting medium first and
//! backing medium last. Slab SLDs and thicknesses are [`ParamId`]s into a
//! [`ParameterArena`] so that the same physical unknown can be shared between
//! the forward model and the information-matrix machinery; a structure is
//! turned into plain numbers with [`Structure::resolve`] at evaluation time.

use serde::{Deserialize, Serialize};

use ro_types::{DesignError, DesignResult, ParamId, Parameter, ParameterArena};

/// A slab whose SLD and thickness live in a parameter arena.
///
/// `roughness` is the Gaussian width (Å) of this slab's *top* interface, i.e.
/// between it and the slab above it in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slab {
    pub thickness: ParamId,
    pub sld: ParamId,
    pub roughness: f64,
}

/// Plain-number snapshot of a slab, the input to the reflectivity kernel.
/// SLD is in units of 1e-6 Å^-2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLayer {
    pub thickness: f64,
    pub sld: f64,
    pub roughness: f64,
}

impl ResolvedLayer {
    pub fn new(thickness: f64, sld: f64, roughness: f64) -> Self {
        Self {
            thickness,
            sld,
            roughness,
        }
    }
}

/// Declarative description of one slab, used when building a [`Structure`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlabSpec {
    pub name: String,
    /// SLD in 1e-6 Å^-2.
    pub sld: f64,
    /// Thickness in Å (ignored for the fronting and backing media).
    pub thickness: f64,
    /// Top-interface roughness in Å.
    pub roughness: f64,
}

impl SlabSpec {
    pub fn new(name: impl Into<String>, sld: f64, thickness: f64, roughness: f64) -> Self {
        Self {
            name: name.into(),
            sld,
            thickness,
            roughness,
        }
    }
}

/// An ordered slab stack: fronting medium, interior layers, backing medium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub name: String,
    pub slabs: Vec<Slab>,
}

/// Default fractional half-width of the fit bounds placed on varied
/// interior-layer parameters.
pub const DEFAULT_BOUND_SIZE: f64 = 0.2;

impl Structure {
    /// Build a structure from slab specs, pushing every SLD and thickness
    /// into `arena`. Interior-layer SLDs and thicknesses are marked varying
    /// with bounds of ±`bound_size` around their current value; the fronting
    /// and backing media stay fixed.
    ///
    /// At least one interior layer is required; a bare interface has no free
    /// parameters to design an experiment for.
    pub fn from_specs(
        name: impl Into<String>,
        specs: &[SlabSpec],
        arena: &mut ParameterArena,
        bound_size: f64,
    ) -> DesignResult<Self> {
        if specs.len() < 3 {
            return Err(DesignError::InvalidStructure(format!(
                "structure needs fronting, at least one layer, and backing; got {} slabs",
                specs.len()
            )));
        }

        let last = specs.len() - 1;
        let mut slabs = Vec::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            let interior = i != 0 && i != last;
            let sld = if interior {
                arena.push(bounded_param(
                    format!("{} SLD", spec.name),
                    spec.sld,
                    bound_size,
                ))
            } else {
                arena.push(Parameter::fixed(format!("{} SLD", spec.name), spec.sld))
            };
            let thickness = if interior {
                arena.push(bounded_param(
                    format!("{} Thickness", spec.name),
                    spec.thickness,
                    bound_size,
                ))
            } else {
                arena.push(Parameter::fixed(
                    format!("{} Thickness", spec.name),
                    spec.thickness,
                ))
            };
            slabs.push(Slab {
                thickness,
                sld,
                roughness: spec.roughness,
            });
        }

        Ok(Self {
            name: name.into(),
            slabs,
        })
    }

    /// Snapshot the stack against current arena values.
    pub fn resolve(&self, arena: &ParameterArena) -> DesignResult<Vec<ResolvedLayer>> {
        self.slabs
            .iter()
            .map(|slab| {
                Ok(ResolvedLayer {
                    thickness: arena.value(slab.thickness)?,
                    sld: arena.value(slab.sld)?,
                    roughness: slab.roughness,
                })
            })
            .collect()
    }

    /// SLD depth profile as `(z, sld)` sequences, roughness-smoothed with
    /// error functions. Pure data; rendering belongs to the caller.
    pub fn sld_profile(
        &self,
        arena: &ParameterArena,
        points: usize,
    ) -> DesignResult<(Vec<f64>, Vec<f64>)> {
        let layers = self.resolve(arena)?;

        // Interface depths, measured from the top of the first interior layer.
        let mut interfaces = Vec::with_capacity(layers.len() - 1);
        let mut depth = 0.0;
        interfaces.push((0.0, layers[1].roughness));
        for (i, layer) in layers.iter().enumerate().skip(1) {
            if i == layers.len() - 1 {
                break;
            }
            depth += layer.thickness;
            interfaces.push((depth, layers[i + 1].roughness));
        }

        let margin = 20.0;
        let z_lo = -margin;
        let z_hi = depth + margin;
        let n = points.max(2);
        let mut zs = Vec::with_capacity(n);
        let mut slds = Vec::with_capacity(n);
        for k in 0..n {
            let z = z_lo + (z_hi - z_lo) * k as f64 / (n - 1) as f64;
            let mut sld = layers[0].sld;
            for (j, &(zi, sigma)) in interfaces.iter().enumerate() {
                let delta = layers[j + 1].sld - layers[j].sld;
                let t = if sigma > 0.0 {
                    0.5 * (1.0 + erf((z - zi) / (std::f64::consts::SQRT_2 * sigma)))
                } else if z >= zi {
                    1.0
                } else {
                    0.0
                };
                sld += delta * t;
            }
            zs.push(z);
            slds.push(sld);
        }
        Ok((zs, slds))
    }
}

fn bounded_param(name: String, value: f64, bound_size: f64) -> Parameter {
    let a = value * (1.0 - bound_size);
    let b = value * (1.0 + bound_size);
    // Negative values (e.g. H2O SLD) flip the bound order.
    Parameter::varying(name, value, a.min(b), a.max(b))
}

/// Abramowitz & Stegun 7.1.26 rational approximation, |error| < 1.5e-7.
fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + 0.3275911 * x);
    let y = 1.0
        - (((((1.061405429 * t - 1.453152027) * t) + 1.421413741) * t - 0.284496736) * t
            + 0.254829592)
            * t
            * (-x * x).exp();
    sign * y
}
