//! # ro-sim
//!
//! Forward simulation of reflectometry measurements: slab structures resolved
//! against a parameter arena, an Abeles-matrix reflectivity kernel with
//! resolution smearing, an instrument model mapping angles and counting times
//! to Q grids and incident counts, and the `simulate` driver producing
//! [`ro_types::SimulatedDataset`]s.

pub mod instrument;
pub mod reflectivity;
pub mod simulate;
pub mod structure;

pub use instrument::{geomspace, Instrument};
pub use reflectivity::reflectivity;
pub use simulate::simulate;
pub use structure::{ResolvedLayer, Slab, SlabSpec, Structure, DEFAULT_BOUND_SIZE};
