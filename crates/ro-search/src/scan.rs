//! Exhaustive sweeps over measurement conditions.
//!
//! Every driver walks its candidate grid in order, scores each candidate by
//! the smallest eigenvalue of the resulting information matrix, and returns
//! the whole objective surface. The grids are small enough in practice (tens
//! of candidates per axis) that exhaustive evaluation beats anything cleverer
//! and is trivially reproducible.

use tracing::{debug, info};

use ro_fisher::Fisher;
use ro_models::{
    SampleModel, Underlayer, VariableAngle, VariableContrast, VariableUnderlayer,
};
use ro_types::{AnglePoint, DesignResult, MeasurementPlan, ParamId};

use crate::result::{GridScan, PairScan, Scan1D, ScanKind, ScanMeta, TimeResolvedScan};

/// `n` evenly spaced values from `lo` to `hi` inclusive.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![lo];
    }
    (0..n)
        .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
        .collect()
}

/// Score one candidate measurement: build its information matrix and reduce
/// it to the E-optimality scalar.
fn score(fisher: Fisher) -> f64 {
    fisher.min_eigenvalue()
}

/// Sweep the incidence angle of one new acquisition with a fixed
/// points/time budget, on top of whatever is already in `baseline`
/// (empty for a first measurement).
pub fn angle_choice<S: VariableAngle>(
    sample: &mut S,
    baseline: &MeasurementPlan,
    angle_range: &[f64],
    points: usize,
    time: f64,
    contrast_slds: &[f64],
) -> DesignResult<Scan1D> {
    let mut meta = ScanMeta::begin(ScanKind::Angle, sample.name());
    info!(sample = sample.name(), candidates = angle_range.len(), "angle sweep");

    let mut min_eigs = Vec::with_capacity(angle_range.len());
    for &angle in angle_range {
        let mut plan = baseline.clone();
        plan.push(AnglePoint::new(angle, points, time));
        let eig = score(sample.angle_info(&plan, contrast_slds)?);
        debug!(angle, min_eigenvalue = eig, "candidate scored");
        min_eigs.push(eig);
    }

    meta.finish(angle_range.len());
    Ok(Scan1D {
        meta,
        xs: angle_range.to_vec(),
        min_eigs,
    })
}

/// Sweep the choice of a second angle on top of an already-counted baseline,
/// repeated for several candidate counting times of the new acquisition.
///
/// Shows how the optimal follow-up angle migrates as more time is spent on
/// it: short additions favor reinforcing the baseline, long ones favor new
/// Q coverage.
pub fn angle_choice_with_time<S: VariableAngle>(
    sample: &mut S,
    baseline: &MeasurementPlan,
    angle_range: &[f64],
    points: usize,
    times: &[f64],
    contrast_slds: &[f64],
) -> DesignResult<TimeResolvedScan> {
    info!(
        sample = sample.name(),
        angles = angle_range.len(),
        times = times.len(),
        "time-resolved angle sweep"
    );
    let mut scans = Vec::with_capacity(times.len());
    for &time in times {
        let mut meta = ScanMeta::begin(ScanKind::AngleWithTime, sample.name());
        let mut min_eigs = Vec::with_capacity(angle_range.len());
        for &angle in angle_range {
            let mut plan = baseline.clone();
            plan.push(AnglePoint::new(angle, points, time));
            min_eigs.push(score(sample.angle_info(&plan, contrast_slds)?));
        }
        meta.finish(angle_range.len());
        scans.push(Scan1D {
            meta,
            xs: angle_range.to_vec(),
            min_eigs,
        });
    }
    Ok(TimeResolvedScan {
        times: times.to_vec(),
        scans,
    })
}

/// Sweep the SLD of one additional contrast on top of contrasts already
/// measured (empty for a first measurement).
pub fn contrast_choice_single<S: VariableContrast>(
    sample: &mut S,
    contrast_range: &[f64],
    measured_contrasts: &[f64],
    plan: &MeasurementPlan,
) -> DesignResult<Scan1D> {
    let mut meta = ScanMeta::begin(ScanKind::ContrastSingle, sample.name());
    info!(
        sample = sample.name(),
        candidates = contrast_range.len(),
        measured = measured_contrasts.len(),
        "single-contrast sweep"
    );

    let mut min_eigs = Vec::with_capacity(contrast_range.len());
    for &contrast in contrast_range {
        let mut contrasts = measured_contrasts.to_vec();
        contrasts.push(contrast);
        min_eigs.push(score(sample.contrast_info(plan, &contrasts)?));
    }

    meta.finish(contrast_range.len());
    Ok(Scan1D {
        meta,
        xs: contrast_range.to_vec(),
        min_eigs,
    })
}

/// Sweep every unordered pair of contrasts drawn from one candidate range,
/// for a sample measured from scratch in exactly two contrasts.
pub fn contrast_choice_double<S: VariableContrast>(
    sample: &mut S,
    contrast_range: &[f64],
    plan: &MeasurementPlan,
) -> DesignResult<PairScan> {
    let mut meta = ScanMeta::begin(ScanKind::ContrastPair, sample.name());
    let n = contrast_range.len();
    info!(
        sample = sample.name(),
        candidates = n * n.saturating_sub(1) / 2,
        "contrast-pair sweep"
    );

    let mut pairs = Vec::new();
    let mut min_eigs = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let pair = (contrast_range[i], contrast_range[j]);
            let eig = score(sample.contrast_info(plan, &[pair.0, pair.1])?);
            pairs.push(pair);
            min_eigs.push(eig);
        }
        debug!(done = pairs.len(), "pair sweep progress");
    }

    meta.finish(pairs.len());
    Ok(PairScan {
        meta,
        range: contrast_range.to_vec(),
        pairs,
        min_eigs,
    })
}

/// Sweep a single underlayer's thickness and SLD on a 2D grid.
pub fn underlayer_choice<S: VariableUnderlayer>(
    sample: &mut S,
    thickness_range: &[f64],
    sld_range: &[f64],
    contrast_slds: &[f64],
    plan: &MeasurementPlan,
) -> DesignResult<GridScan> {
    let mut meta = ScanMeta::begin(ScanKind::UnderlayerGrid, sample.name());
    info!(
        sample = sample.name(),
        cells = thickness_range.len() * sld_range.len(),
        "underlayer grid sweep"
    );

    let mut min_eigs = Vec::with_capacity(thickness_range.len() * sld_range.len());
    for &thickness in thickness_range {
        for &sld in sld_range {
            let underlayers: [Underlayer; 1] = [(thickness, sld)];
            min_eigs.push(score(sample.underlayer_info(
                plan,
                contrast_slds,
                &underlayers,
            )?));
        }
        debug!(thickness, "underlayer row scored");
    }

    meta.finish(min_eigs.len());
    Ok(GridScan {
        meta,
        xs: thickness_range.to_vec(),
        ys: sld_range.to_vec(),
        min_eigs,
    })
}

/// Sweep one model parameter over candidate values and score the same
/// measurement at each, to show how sensitive a design is to the assumed
/// ground truth. The parameter is restored afterwards, error or not.
///
/// Values must lie inside the parameter's fit bounds.
pub fn parameter_scan<S: VariableAngle>(
    sample: &mut S,
    param: ParamId,
    values: &[f64],
    plan: &MeasurementPlan,
    contrast_slds: &[f64],
) -> DesignResult<Scan1D> {
    let mut meta = ScanMeta::begin(ScanKind::ParameterSensitivity, sample.name());
    info!(
        sample = sample.name(),
        candidates = values.len(),
        "parameter sensitivity sweep"
    );
    let original = sample.arena().value(param)?;

    let outcome = scan_values(sample, param, values, plan, contrast_slds);
    sample.arena_mut().set_value(param, original)?;
    let min_eigs = outcome?;

    meta.finish(values.len());
    Ok(Scan1D {
        meta,
        xs: values.to_vec(),
        min_eigs,
    })
}

/// Run [`parameter_scan`] over every design parameter, each swept across
/// `steps` evenly spaced values spanning its fit bounds.
pub fn scan_parameters<S: VariableAngle>(
    sample: &mut S,
    plan: &MeasurementPlan,
    contrast_slds: &[f64],
    steps: usize,
) -> DesignResult<Vec<Scan1D>> {
    let params = sample.design_params();
    let mut scans = Vec::with_capacity(params.len());
    for param in params {
        let (lo, hi) = sample.arena().get(param)?.bounds;
        let values = linspace(lo, hi, steps);
        scans.push(parameter_scan(sample, param, &values, plan, contrast_slds)?);
    }
    Ok(scans)
}

fn scan_values<S: VariableAngle>(
    sample: &mut S,
    param: ParamId,
    values: &[f64],
    plan: &MeasurementPlan,
    contrast_slds: &[f64],
) -> DesignResult<Vec<f64>> {
    let mut min_eigs = Vec::with_capacity(values.len());
    for &value in values {
        sample.arena_mut().set_value(param, value)?;
        min_eigs.push(score(sample.angle_info(plan, contrast_slds)?));
    }
    Ok(min_eigs)
}
