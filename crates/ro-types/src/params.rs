//! Model parameters and the arena that owns them.
//!
//! Every free variable of a sample model is a [`Parameter`] stored once in a
//! [`ParameterArena`] and referenced everywhere else by [`ParamId`]. The
//! finite-difference machinery perturbs parameter values through
//! [`ParameterArena::with_value`], which restores the original value on every
//! exit path; parameters are shared across many evaluations and a leaked
//! perturbation would corrupt all later ones.

use serde::{Deserialize, Serialize};

use crate::{DesignError, DesignResult};

/// Index of a parameter in its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamId(pub usize);

/// A named scalar free variable of a sample model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Human-readable parameter name (e.g. "Layer 1 Thickness").
    pub name: String,
    /// Current value.
    pub value: f64,
    /// Inclusive (lower, upper) bounds; only enforced while `vary` is true.
    pub bounds: (f64, f64),
    /// Whether this parameter is fitted (and therefore indexes the
    /// information matrix).
    pub vary: bool,
}

impl Parameter {
    /// A fixed (non-varying) parameter with unbounded range.
    pub fn fixed(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            bounds: (f64::NEG_INFINITY, f64::INFINITY),
            vary: false,
        }
    }

    /// A varying parameter with explicit bounds.
    pub fn varying(name: impl Into<String>, value: f64, lower: f64, upper: f64) -> Self {
        Self {
            name: name.into(),
            value,
            bounds: (lower, upper),
            vary: true,
        }
    }

    /// Whether the current value lies within bounds. Only meaningful when
    /// `vary` is true.
    pub fn in_bounds(&self) -> bool {
        self.bounds.0 <= self.value && self.value <= self.bounds.1
    }
}

/// Arena of parameters addressed by [`ParamId`].
///
/// The arena is the single owner of parameter values; structures and models
/// hold ids into it. This replaces shared mutable parameter objects with
/// index-based references and keeps perturb/restore in one place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterArena {
    params: Vec<Parameter>,
}

impl ParameterArena {
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a parameter, returning its id.
    pub fn push(&mut self, param: Parameter) -> ParamId {
        let id = ParamId(self.params.len());
        self.params.push(param);
        id
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn get(&self, id: ParamId) -> DesignResult<&Parameter> {
        self.params
            .get(id.0)
            .ok_or(DesignError::UnknownParameter(id.0))
    }

    pub fn get_mut(&mut self, id: ParamId) -> DesignResult<&mut Parameter> {
        self.params
            .get_mut(id.0)
            .ok_or(DesignError::UnknownParameter(id.0))
    }

    /// Current value of a parameter.
    pub fn value(&self, id: ParamId) -> DesignResult<f64> {
        Ok(self.get(id)?.value)
    }

    /// Set a parameter's value, enforcing bounds for varying parameters.
    pub fn set_value(&mut self, id: ParamId, value: f64) -> DesignResult<()> {
        let param = self.get_mut(id)?;
        if param.vary && !(param.bounds.0 <= value && value <= param.bounds.1) {
            return Err(DesignError::Config(format!(
                "value {} for '{}' outside bounds ({}, {})",
                value, param.name, param.bounds.0, param.bounds.1
            )));
        }
        param.value = value;
        Ok(())
    }

    /// Ids of all varying parameters, in insertion order.
    ///
    /// This ordering indexes every information matrix built over the arena.
    pub fn varying(&self) -> Vec<ParamId> {
        self.params
            .iter()
            .enumerate()
            .filter(|(_, p)| p.vary)
            .map(|(i, _)| ParamId(i))
            .collect()
    }

    /// Run `f` with the parameter temporarily set to `value`, restoring the
    /// original value afterwards, including when `f` returns an error.
    ///
    /// Bounds are deliberately not enforced here: finite-difference probing
    /// may step just outside a parameter's fit bounds.
    pub fn with_value<T, F>(&mut self, id: ParamId, value: f64, f: F) -> DesignResult<T>
    where
        F: FnOnce(&ParameterArena) -> DesignResult<T>,
    {
        let original = self.value(id)?;
        self.params[id.0].value = value;
        let result = f(self);
        self.params[id.0].value = original;
        result
    }

    /// Snapshot of all current values, in arena order.
    pub fn values(&self) -> Vec<f64> {
        self.params.iter().map(|p| p.value).collect()
    }
}
