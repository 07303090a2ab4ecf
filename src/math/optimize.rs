//! Derivative-free minimizers used by the maximum-likelihood fits.
//!
//! Both routines are fully deterministic: the same objective and starting
//! point always produce the same iterates.
//!
//! - `nelder_mead`: downhill simplex with the classic coefficients
//!   (reflection 1, expansion 2, contraction 0.5, shrink 0.5)
//! - `golden_section`: bracketed 1-D minimization

/// Options for `nelder_mead`.
#[derive(Debug, Clone)]
pub struct SimplexOptions {
    /// Absolute tolerance on simplex vertex spread.
    pub x_tol: f64,
    /// Absolute tolerance on objective spread across the simplex.
    pub f_tol: f64,
    /// Iteration budget per dimension.
    pub iters_per_dim: usize,
    /// Absolute edge length of the initial simplex. `None` perturbs each
    /// coordinate by 5% of its value (0.00025 for zero coordinates).
    pub initial_step: Option<f64>,
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self {
            x_tol: 1e-4,
            f_tol: 1e-4,
            iters_per_dim: 400,
            initial_step: None,
        }
    }
}

/// Result of a minimization.
#[derive(Debug, Clone)]
pub struct Minimum {
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Relative perturbation used to build the initial simplex.
const NONZERO_DELTA: f64 = 0.05;
/// Absolute perturbation for zero coordinates.
const ZERO_DELTA: f64 = 0.00025;

/// Minimize `f` starting from `x0`.
///
/// Non-finite objective values are treated as `+∞`, so an objective can
/// reject infeasible points by returning `f64::INFINITY`.
pub fn nelder_mead<F>(f: F, x0: &[f64], opts: &SimplexOptions) -> Minimum
where
    F: Fn(&[f64]) -> f64,
{
    let dim = x0.len();
    let eval = |x: &[f64]| {
        let v = f(x);
        if v.is_nan() { f64::INFINITY } else { v }
    };

    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(dim + 1);
    simplex.push(x0.to_vec());
    for k in 0..dim {
        let mut y = x0.to_vec();
        if let Some(step) = opts.initial_step {
            y[k] += step;
        } else if y[k] != 0.0 {
            y[k] *= 1.0 + NONZERO_DELTA;
        } else {
            y[k] = ZERO_DELTA;
        }
        simplex.push(y);
    }
    let mut values: Vec<f64> = simplex.iter().map(|x| eval(x)).collect();
    sort_simplex(&mut simplex, &mut values);

    let max_iter = opts.iters_per_dim.max(1) * dim.max(1);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iter {
        if simplex_converged(&simplex, &values, opts) {
            converged = true;
            break;
        }
        iterations += 1;

        let worst = dim;
        let center = centroid(&simplex[..worst]);

        let reflected = affine(&center, &simplex[worst], 2.0, -1.0);
        let f_reflected = eval(&reflected);

        if f_reflected < values[0] {
            let expanded = affine(&center, &simplex[worst], 3.0, -2.0);
            let f_expanded = eval(&expanded);
            if f_expanded < f_reflected {
                simplex[worst] = expanded;
                values[worst] = f_expanded;
            } else {
                simplex[worst] = reflected;
                values[worst] = f_reflected;
            }
        } else if f_reflected < values[worst - 1] {
            simplex[worst] = reflected;
            values[worst] = f_reflected;
        } else {
            let shrink = if f_reflected < values[worst] {
                // Outside contraction.
                let contracted = affine(&center, &simplex[worst], 1.5, -0.5);
                let f_contracted = eval(&contracted);
                if f_contracted <= f_reflected {
                    simplex[worst] = contracted;
                    values[worst] = f_contracted;
                    false
                } else {
                    true
                }
            } else {
                // Inside contraction.
                let contracted = affine(&center, &simplex[worst], 0.5, 0.5);
                let f_contracted = eval(&contracted);
                if f_contracted < values[worst] {
                    simplex[worst] = contracted;
                    values[worst] = f_contracted;
                    false
                } else {
                    true
                }
            };

            if shrink {
                let best = simplex[0].clone();
                for j in 1..=dim {
                    simplex[j] = affine(&best, &simplex[j], 0.5, 0.5);
                    values[j] = eval(&simplex[j]);
                }
            }
        }

        sort_simplex(&mut simplex, &mut values);
    }

    if !converged {
        converged = simplex_converged(&simplex, &values, opts);
    }

    Minimum {
        x: simplex[0].clone(),
        value: values[0],
        iterations,
        converged,
    }
}

fn simplex_converged(simplex: &[Vec<f64>], values: &[f64], opts: &SimplexOptions) -> bool {
    if !values[0].is_finite() {
        return false;
    }
    let x_spread = simplex[1..]
        .iter()
        .flat_map(|v| v.iter().zip(simplex[0].iter()).map(|(a, b)| (a - b).abs()))
        .fold(0.0_f64, f64::max);
    let f_spread = values[1..]
        .iter()
        .map(|v| (v - values[0]).abs())
        .fold(0.0_f64, f64::max);
    x_spread <= opts.x_tol && f_spread <= opts.f_tol
}

fn sort_simplex(simplex: &mut Vec<Vec<f64>>, values: &mut Vec<f64>) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    // Stable sort keeps the earlier vertex first on ties.
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    *simplex = order.iter().map(|&i| simplex[i].clone()).collect();
    *values = order.iter().map(|&i| values[i]).collect();
}

fn centroid(points: &[Vec<f64>]) -> Vec<f64> {
    let dim = points[0].len();
    let n = points.len() as f64;
    (0..dim)
        .map(|k| points.iter().map(|p| p[k]).sum::<f64>() / n)
        .collect()
}

/// `a * u + b * v`, element-wise.
fn affine(u: &[f64], v: &[f64], a: f64, b: f64) -> Vec<f64> {
    u.iter().zip(v.iter()).map(|(x, y)| a * x + b * y).collect()
}

/// Inverse golden ratio.
const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// Minimize a unimodal `f` on `[lo, hi]`; returns `(x, f(x))`.
pub fn golden_section<F>(f: F, lo: f64, hi: f64, tol: f64, max_iter: usize) -> (f64, f64)
where
    F: Fn(f64) -> f64,
{
    let eval = |x: f64| {
        let v = f(x);
        if v.is_nan() { f64::INFINITY } else { v }
    };

    let (mut a, mut b) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let mut c = b - INV_PHI * (b - a);
    let mut d = a + INV_PHI * (b - a);
    let mut fc = eval(c);
    let mut fd = eval(d);

    for _ in 0..max_iter {
        if (b - a).abs() <= tol {
            break;
        }
        if fc < fd {
            b = d;
            d = c;
            fd = fc;
            c = b - INV_PHI * (b - a);
            fc = eval(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + INV_PHI * (b - a);
            fd = eval(d);
        }
    }

    if fc < fd { (c, fc) } else { (d, fd) }
}
