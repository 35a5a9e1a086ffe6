//! # ro-search
//!
//! Exhaustive design-space searches: sweep measurement conditions (incidence
//! angle, solvent contrast, underlayer geometry, or an assumed parameter
//! value), score every candidate by the smallest eigenvalue of its Fisher
//! information matrix, and report the full objective surface with provenance.

pub mod result;
pub mod scan;

pub use result::{
    write_json, Candidate1D, Candidate2D, GridScan, PairScan, Scan1D, ScanKind, ScanMeta,
    TimeResolvedScan,
};
pub use scan::{
    angle_choice, angle_choice_with_time, contrast_choice_double, contrast_choice_single,
    linspace, parameter_scan, scan_parameters, underlayer_choice,
};
