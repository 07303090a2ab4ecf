//! Profile-likelihood search over a location parameter.
//!
//! Lognormal, gamma (and chi-square through it) and Weibull carry a location
//! `loc < min(x)`. For a fixed location the remaining parameters have
//! closed-form or one-dimensional MLE solutions, so we profile the likelihood
//! over the location instead of optimizing all three parameters jointly.
//!
//! The search is deterministic:
//! - offsets `δ = min(x) - loc` are log-spaced between `range * 1e-4` and `range * 1e2`
//! - every offset is evaluated independently (parallel)
//! - the best interior local minimum of the negative log-likelihood wins; a
//!   grid endpoint is only used when the profile is monotone
//! - the chosen offset is refined by golden-section search in `ln δ`
//!
//! Interior minima are preferred because these likelihoods are unbounded as
//! `loc → min(x)` whenever the fitted shape drops below 1.

use rayon::prelude::*;

use crate::error::TestError;
use crate::math::{golden_section, min_max};

/// Number of offsets in the location grid.
pub const LOC_GRID_STEPS: usize = 61;
/// Smallest offset below the sample minimum, relative to the sample range.
pub const LOC_OFFSET_MIN_REL: f64 = 1e-4;
/// Largest offset below the sample minimum, relative to the sample range.
pub const LOC_OFFSET_MAX_REL: f64 = 1e2;

const REFINE_TOL: f64 = 1e-8;
const REFINE_MAX_ITER: usize = 200;

/// Best location with the inner parameters fitted at it.
#[derive(Debug, Clone)]
pub struct LocationFit<P> {
    pub loc: f64,
    pub params: P,
    pub nll: f64,
}

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, TestError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(TestError::fit(format!(
            "invalid location offset range: min={min}, max={max}"
        )));
    }
    if steps < 2 {
        return Err(TestError::fit("location grid needs at least 2 steps"));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    Ok(out)
}

/// Profile the negative log-likelihood over `loc < min(values)`.
///
/// `inner` receives the shifted sample `y = x - loc` (all strictly positive)
/// and returns the inner parameters with their negative log-likelihood, or
/// `None` if no valid fit exists at that location.
pub fn profile_location<P, F>(values: &[f64], inner: F) -> Result<LocationFit<P>, TestError>
where
    P: Send,
    F: Fn(&[f64]) -> Option<(P, f64)> + Sync,
{
    let (x_min, x_max) =
        min_max(values).ok_or_else(|| TestError::precondition("sample has no values"))?;
    let range = x_max - x_min;
    if !(range > 0.0) {
        return Err(TestError::precondition(
            "sample has zero range; location cannot be estimated",
        ));
    }

    let at_offset = |delta: f64| -> Option<(P, f64)> {
        let loc = x_min - delta;
        let shifted: Vec<f64> = values.iter().map(|x| x - loc).collect();
        if shifted.iter().any(|y| !(*y > 0.0)) {
            return None;
        }
        inner(&shifted).filter(|(_, nll)| nll.is_finite())
    };

    let offsets = log_space(
        range * LOC_OFFSET_MIN_REL,
        range * LOC_OFFSET_MAX_REL,
        LOC_GRID_STEPS,
    )?;
    let nlls: Vec<f64> = offsets
        .par_iter()
        .map(|&delta| at_offset(delta).map_or(f64::INFINITY, |(_, nll)| nll))
        .collect();

    let best = pick_grid_index(&nlls)
        .ok_or_else(|| TestError::fit("no valid location on the search grid"))?;

    // Refine in ln δ between the neighbouring grid points.
    let lo = offsets[best.saturating_sub(1)].ln();
    let hi = offsets[(best + 1).min(offsets.len() - 1)].ln();
    let (t, refined_nll) = golden_section(
        |t| at_offset(t.exp()).map_or(f64::INFINITY, |(_, nll)| nll),
        lo,
        hi,
        REFINE_TOL,
        REFINE_MAX_ITER,
    );
    let delta = if refined_nll < nlls[best] {
        t.exp()
    } else {
        offsets[best]
    };

    let (params, nll) =
        at_offset(delta).ok_or_else(|| TestError::fit("location refinement failed"))?;
    Ok(LocationFit {
        loc: x_min - delta,
        params,
        nll,
    })
}

/// Prefer the lowest interior local minimum; fall back to the global minimum.
fn pick_grid_index(nlls: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for i in 1..nlls.len().saturating_sub(1) {
        let v = nlls[i];
        if v.is_finite() && v <= nlls[i - 1] && v <= nlls[i + 1] {
            if best.is_none_or(|b| v < nlls[b]) {
                best = Some(i);
            }
        }
    }
    if best.is_some() {
        return best;
    }

    // Ties resolve to the lowest index.
    let mut global: Option<usize> = None;
    for (i, &v) in nlls.iter().enumerate() {
        if v.is_finite() && global.is_none_or(|g| v < nlls[g]) {
            global = Some(i);
        }
    }
    global
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_space_includes_endpoints() {
        let v = log_space(0.1, 10.0, 5).unwrap();
        assert!((v[0] - 0.1).abs() < 1e-12);
        assert!((v[v.len() - 1] - 10.0).abs() < 1e-12);
        assert!(log_space(1.0, 1.0, 5).is_err());
        assert!(log_space(0.1, 1.0, 1).is_err());
    }

    #[test]
    fn interior_minimum_beats_lower_endpoint() {
        // Unbounded toward index 0, genuine local minimum at index 4.
        let nlls = [-100.0, 5.0, 4.0, 3.0, 2.0, 3.0, 4.0];
        assert_eq!(pick_grid_index(&nlls), Some(4));
    }

    #[test]
    fn monotone_profile_uses_global_minimum() {
        let nlls = [5.0, 4.0, 3.0, 2.0, 1.0];
        assert_eq!(pick_grid_index(&nlls), Some(4));
        let nlls = [f64::INFINITY, f64::INFINITY];
        assert_eq!(pick_grid_index(&nlls), None);
    }

    #[test]
    fn recovers_location_of_quadratic_profile() {
        // Inner "likelihood" with its optimum at loc = -2 (offset 3 below min 1).
        let values = [1.0, 2.0, 3.0];
        let fit = profile_location(&values, |y| {
            let loc = values[0] - y[0];
            Some(((), (loc + 2.0).powi(2)))
        })
        .unwrap();
        assert!((fit.loc + 2.0).abs() < 1e-5, "loc={}", fit.loc);
    }

    #[test]
    fn zero_range_is_precondition_violation() {
        let err = profile_location(&[2.0, 2.0], |_| Some(((), 0.0))).unwrap_err();
        assert!(matches!(err, TestError::PreconditionViolation(_)));
    }
}
