//! Maximum-likelihood estimators for the continuous families.
//!
//! | family      | parameters            | method                                       |
//! |-------------|-----------------------|----------------------------------------------|
//! | t           | df, loc, scale        | Nelder–Mead on (ln df, loc, ln scale)         |
//! | lognorm     | shape, loc, scale     | location profile, closed-form inner MLE       |
//! | gamma       | shape, loc, scale     | location profile, Newton for the shape        |
//! | chi2        | df, loc, scale        | gamma fit, `df = 2·shape`, `scale = θ/2`      |
//! | weibull     | shape, loc, scale     | location profile, bisection for the shape     |
//! | beta        | a, b (on [0, 1])      | Nelder–Mead on (ln a, ln b)                   |
//! | exponential | scale (loc = 0)       | closed form (`scale = mean`)                  |
//! | uniform     | min, max              | sample extremes                               |

use statrs::function::beta::ln_beta;
use statrs::function::gamma::{digamma, ln_gamma};
use tracing::debug;

use crate::domain::FittedParameters;
use crate::error::TestError;
use crate::fit::location::profile_location;
use crate::math::{Moments, SimplexOptions, mad, mean, median, min_max, nelder_mead, trigamma};

/// Scale factor turning a MAD into a normal-consistent standard deviation.
const MAD_TO_SIGMA: f64 = 1.4826;

/// Student-t degrees of freedom tried as starting points.
const T_DF_STARTS: [f64; 7] = [1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0];
/// Upper bound for the t degrees of freedom (numerically normal beyond).
const T_DF_MAX: f64 = 1e8;
const T_DF_MIN: f64 = 1e-3;

const SHAPE_NEWTON_MAX_ITER: usize = 100;
const WEIBULL_BISECT_ITER: usize = 200;
const WEIBULL_SHAPE_MIN: f64 = 1e-3;
const WEIBULL_SHAPE_MAX: f64 = 1e3;

fn simplex_options() -> SimplexOptions {
    SimplexOptions {
        x_tol: 1e-6,
        f_tol: 1e-7,
        iters_per_dim: 1000,
        initial_step: Some(0.25),
    }
}

/// Student-t MLE of `(df, loc, scale)`.
pub fn fit_student_t(values: &[f64]) -> Result<FittedParameters, TestError> {
    let center = median(values).ok_or_else(|| TestError::precondition("sample has no values"))?;
    let spread = robust_spread(values)?;

    // Optimize on standardized data: z = (x - center) / spread.
    let z: Vec<f64> = values.iter().map(|x| (x - center) / spread).collect();
    let nll = |theta: &[f64]| t_nll(&z, t_df(theta[0]), theta[1], theta[2].exp());

    let start = T_DF_STARTS
        .iter()
        .map(|&df| vec![df.ln(), 0.0, 0.0])
        .min_by(|a, b| nll(a.as_slice()).total_cmp(&nll(b.as_slice())))
        .unwrap_or_else(|| vec![0.0, 0.0, 0.0]);

    let opts = simplex_options();
    let mut min = nelder_mead(&nll, &start, &opts);
    if !min.converged && min.value.is_finite() {
        // Restart from the best vertex with a fresh simplex.
        min = nelder_mead(&nll, &min.x, &opts);
    }
    // Past the cap the likelihood is flat in df; the simplex may not collapse there.
    let df_capped = t_df(min.x[0]) >= T_DF_MAX;
    if !min.value.is_finite() || !(min.converged || df_capped) {
        return Err(TestError::fit(format!(
            "t fit did not converge after {} iterations",
            min.iterations
        )));
    }

    let df = t_df(min.x[0]);
    let loc = center + spread * min.x[1];
    let scale = spread * min.x[2].exp();
    debug!(df, loc, scale, iterations = min.iterations, "fitted t");
    Ok(FittedParameters::StudentT { df, loc, scale })
}

/// Degrees of freedom from the optimizer's `ln df`, clamped at `T_DF_MAX`.
fn t_df(ln_df: f64) -> f64 {
    ln_df.exp().min(T_DF_MAX)
}

fn t_nll(z: &[f64], df: f64, loc: f64, scale: f64) -> f64 {
    if !(df.is_finite() && (T_DF_MIN..=T_DF_MAX).contains(&df) && scale > 0.0 && scale.is_finite())
    {
        return f64::INFINITY;
    }
    let n = z.len() as f64;
    let log_norm = ln_gamma((df + 1.0) / 2.0)
        - ln_gamma(df / 2.0)
        - 0.5 * (df * std::f64::consts::PI).ln()
        - scale.ln();
    let tail: f64 = z
        .iter()
        .map(|x| {
            let u = (x - loc) / scale;
            (u * u / df).ln_1p()
        })
        .sum();
    -n * log_norm + (df + 1.0) / 2.0 * tail
}

/// Lognormal MLE of `(shape, loc, scale)`.
pub fn fit_lognormal(values: &[f64]) -> Result<FittedParameters, TestError> {
    let fit = profile_location(values, |y| {
        let n = y.len() as f64;
        let logs: Vec<f64> = y.iter().map(|v| v.ln()).collect();
        let mu = mean(&logs);
        let var = logs.iter().map(|l| (l - mu) * (l - mu)).sum::<f64>() / n;
        if !(var > 0.0) {
            return None;
        }
        let sigma = var.sqrt();
        let nll = logs.iter().sum::<f64>()
            + n * sigma.ln()
            + 0.5 * n * (1.0 + (2.0 * std::f64::consts::PI).ln());
        Some(((sigma, mu.exp()), nll))
    })?;

    let (shape, scale) = fit.params;
    debug!(shape, loc = fit.loc, scale, nll = fit.nll, "fitted lognorm");
    Ok(FittedParameters::LogNormal {
        shape,
        loc: fit.loc,
        scale,
    })
}

/// Gamma MLE of `(shape, loc, scale)`.
pub fn fit_gamma(values: &[f64]) -> Result<FittedParameters, TestError> {
    let (shape, loc, scale) = gamma_mle(values)?;
    debug!(shape, loc, scale, "fitted gamma");
    Ok(FittedParameters::Gamma { shape, loc, scale })
}

/// Chi-square MLE of `(df, loc, scale)` through `χ²(k, loc, s) = Γ(k/2, loc, 2s)`.
pub fn fit_chi_squared(values: &[f64]) -> Result<FittedParameters, TestError> {
    let (shape, loc, theta) = gamma_mle(values)?;
    let df = 2.0 * shape;
    let scale = theta / 2.0;
    debug!(df, loc, scale, "fitted chi2");
    Ok(FittedParameters::ChiSquared { df, loc, scale })
}

fn gamma_mle(values: &[f64]) -> Result<(f64, f64, f64), TestError> {
    let fit = profile_location(values, |y| {
        let n = y.len() as f64;
        let mean_y = mean(y);
        let mean_ln = y.iter().map(|v| v.ln()).sum::<f64>() / n;
        let a = gamma_shape_mle(mean_y.ln() - mean_ln)?;
        let theta = mean_y / a;
        let nll = n * (ln_gamma(a) + a * theta.ln() - (a - 1.0) * mean_ln + a);
        Some(((a, theta), nll))
    })?;
    let (shape, scale) = fit.params;
    Ok((shape, fit.loc, scale))
}

/// Solve `ln a - ψ(a) = s` for the gamma shape (`s = ln mean - mean ln > 0`).
///
/// Starts from Minka's closed-form approximation and polishes with Newton.
pub fn gamma_shape_mle(s: f64) -> Option<f64> {
    if !(s.is_finite() && s > 0.0) {
        return None;
    }
    let mut a = (3.0 - s + ((s - 3.0) * (s - 3.0) + 24.0 * s).sqrt()) / (12.0 * s);
    for _ in 0..SHAPE_NEWTON_MAX_ITER {
        let f = a.ln() - digamma(a) - s;
        let df = 1.0 / a - trigamma(a);
        let mut next = a - f / df;
        if !(next.is_finite() && next > 0.0) {
            next = a / 2.0;
        }
        if (next - a).abs() <= 1e-12 * a {
            return Some(next);
        }
        a = next;
    }
    a.is_finite().then_some(a)
}

/// Weibull-minimum MLE of `(shape, loc, scale)`.
pub fn fit_weibull(values: &[f64]) -> Result<FittedParameters, TestError> {
    let fit = profile_location(values, |y| {
        let n = y.len() as f64;
        let y_max = y.iter().copied().fold(f64::MIN, f64::max);
        // Work with z = y / max(y) <= 1 so that z^c never overflows.
        let lz: Vec<f64> = y.iter().map(|v| (v / y_max).ln()).collect();
        let mean_lz = mean(&lz);
        let c = weibull_shape_mle(&lz, mean_lz)?;
        let mean_zc = lz.iter().map(|l| (c * l).exp()).sum::<f64>() / n;
        let scale = y_max * mean_zc.powf(1.0 / c);

        let sum_ln_y = n * (mean_lz + y_max.ln());
        let sum_pow: f64 = y.iter().map(|v| (v / scale).powf(c)).sum();
        let nll = -n * c.ln() + n * c * scale.ln() - (c - 1.0) * sum_ln_y + sum_pow;
        Some(((c, scale), nll))
    })?;

    let (shape, scale) = fit.params;
    debug!(shape, loc = fit.loc, scale, nll = fit.nll, "fitted weibull");
    Ok(FittedParameters::Weibull {
        shape,
        loc: fit.loc,
        scale,
    })
}

/// Root of `Σ z^c ln z / Σ z^c - 1/c - mean(ln z)`, increasing in `c`.
fn weibull_shape_mle(lz: &[f64], mean_lz: f64) -> Option<f64> {
    let score = |c: f64| {
        let mut num = 0.0;
        let mut den = 0.0;
        for &l in lz {
            let w = (c * l).exp();
            num += w * l;
            den += w;
        }
        num / den - 1.0 / c - mean_lz
    };

    let mut lo = WEIBULL_SHAPE_MIN.ln();
    let mut hi = WEIBULL_SHAPE_MAX.ln();
    if !(score(lo.exp()) < 0.0 && score(hi.exp()) > 0.0) {
        return None;
    }
    for _ in 0..WEIBULL_BISECT_ITER {
        let mid = 0.5 * (lo + hi);
        if score(mid.exp()) < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1e-14 {
            break;
        }
    }
    Some((0.5 * (lo + hi)).exp())
}

/// Min-max normalize onto `[0, 1]`, returning the bounds used.
pub fn normalize_unit(values: &[f64]) -> Result<(Vec<f64>, f64, f64), TestError> {
    let (lo, hi) = min_max(values).ok_or_else(|| TestError::precondition("sample has no values"))?;
    let range = hi - lo;
    if !(range > 0.0) {
        return Err(TestError::precondition(
            "sample has zero range; cannot normalize onto [0, 1]",
        ));
    }
    Ok((values.iter().map(|x| (x - lo) / range).collect(), lo, hi))
}

/// Min-max normalize, then pull the endpoints into the open interval with
/// `x' = (x (n - 1) + 1/2) / n`, so that `ln x` and `ln(1 - x)` stay finite.
pub fn normalize_open_unit(values: &[f64], lo: f64, hi: f64) -> Vec<f64> {
    let n = values.len() as f64;
    let range = hi - lo;
    values
        .iter()
        .map(|x| ((x - lo) / range * (n - 1.0) + 0.5) / n)
        .collect()
}

/// Beta MLE of `(a, b)` on the normalized sample (loc = 0, scale = 1).
pub fn fit_beta(values: &[f64]) -> Result<FittedParameters, TestError> {
    let (_, lo, hi) = normalize_unit(values)?;
    let xs = normalize_open_unit(values, lo, hi);
    let n = xs.len() as f64;
    let sum_ln_x: f64 = xs.iter().map(|x| x.ln()).sum();
    let sum_ln_1mx: f64 = xs.iter().map(|x| (-x).ln_1p()).sum();

    let nll = |theta: &[f64]| {
        let (a, b) = (theta[0].exp(), theta[1].exp());
        if !(a.is_finite() && b.is_finite()) {
            return f64::INFINITY;
        }
        -(a - 1.0) * sum_ln_x - (b - 1.0) * sum_ln_1mx + n * ln_beta(a, b)
    };

    // Method-of-moments start.
    let moments = Moments::of(&xs).ok_or_else(|| TestError::precondition("sample has no values"))?;
    let m = moments.mean;
    let v = moments.sample_variance();
    let common = if v > 0.0 { m * (1.0 - m) / v - 1.0 } else { 0.0 };
    let (a0, b0) = if common > 0.0 {
        (m * common, (1.0 - m) * common)
    } else {
        (1.0, 1.0)
    };

    let min = nelder_mead(nll, &[a0.ln(), b0.ln()], &simplex_options());
    if !min.converged || !min.value.is_finite() {
        return Err(TestError::fit(format!(
            "beta fit did not converge after {} iterations",
            min.iterations
        )));
    }

    let (a, b) = (min.x[0].exp(), min.x[1].exp());
    debug!(a, b, iterations = min.iterations, "fitted beta");
    Ok(FittedParameters::Beta {
        a,
        b,
        min: lo,
        max: hi,
    })
}

/// Exponential MLE of the scale with the location fixed at 0.
pub fn fit_exponential(values: &[f64]) -> Result<FittedParameters, TestError> {
    if values.iter().any(|x| *x < 0.0) {
        return Err(TestError::precondition(
            "exponential with loc = 0 requires non-negative values",
        ));
    }
    let scale = mean(values);
    if !(scale > 0.0) {
        return Err(TestError::precondition(
            "exponential requires a positive sample mean",
        ));
    }
    Ok(FittedParameters::Exponential { scale })
}

/// Normalization bounds for the uniform test.
pub fn fit_uniform(values: &[f64]) -> Result<FittedParameters, TestError> {
    let (_, min, max) = normalize_unit(values)?;
    Ok(FittedParameters::Uniform { min, max })
}

/// Normal-consistent spread: scaled MAD, falling back to the standard deviation.
fn robust_spread(values: &[f64]) -> Result<f64, TestError> {
    let from_mad = mad(values).map(|m| m * MAD_TO_SIGMA).unwrap_or(0.0);
    if from_mad > 0.0 {
        return Ok(from_mad);
    }
    let sd = Moments::of(values)
        .map(|m| m.sample_variance().sqrt())
        .unwrap_or(0.0);
    if sd > 0.0 {
        Ok(sd)
    } else {
        Err(TestError::precondition("sample has zero variance"))
    }
}
