//! # ro-fisher
//!
//! Fisher information aggregation: build a symmetric information matrix from
//! simulated datasets by finite-difference sensitivity analysis, combine
//! matrices across independent datasets additively, and reduce a matrix to
//! its smallest eigenvalue, the E-optimality robustness criterion the design
//! searches maximize.

pub mod fisher;
pub mod matrix;

pub use fisher::{Fisher, FisherDataset, ResponseModel};
pub use matrix::InfoMatrix;
