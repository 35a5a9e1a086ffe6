//! # ro-types
//!
//! Core types for refopt: model parameters and the arena they live in,
//! measurement plans, simulated datasets, and the error taxonomy shared by
//! every crate in the workspace.

pub mod errors;
pub mod measurement;
pub mod params;

pub use errors::*;
pub use measurement::*;
pub use params::*;
