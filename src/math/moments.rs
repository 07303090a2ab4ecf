//! Sample moments and order statistics.

/// Biased (population) central moments of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub n: usize,
    pub mean: f64,
    /// Second central moment (divides by `n`).
    pub m2: f64,
    pub m3: f64,
    pub m4: f64,
}

impl Moments {
    /// Two-pass computation; returns `None` for an empty slice.
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len();
        let n_f = n as f64;
        let mean = values.iter().sum::<f64>() / n_f;

        let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
        for &v in values {
            let d = v - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
        }

        Some(Self {
            n,
            mean,
            m2: m2 / n_f,
            m3: m3 / n_f,
            m4: m4 / n_f,
        })
    }

    /// Biased skewness `m3 / m2^1.5`.
    pub fn skewness(&self) -> f64 {
        self.m3 / self.m2.powf(1.5)
    }

    /// Pearson (non-excess) kurtosis `m4 / m2²`.
    pub fn kurtosis(&self) -> f64 {
        self.m4 / (self.m2 * self.m2)
    }

    /// Unbiased variance (divides by `n - 1`).
    pub fn sample_variance(&self) -> f64 {
        if self.n < 2 {
            return 0.0;
        }
        self.m2 * self.n as f64 / (self.n as f64 - 1.0)
    }
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// `(min, max)` of a non-empty slice of finite values.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// Sorted copy (total order; callers reject NaN beforehand).
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let s = sorted(values);
    let mid = s.len() / 2;
    if s.len() % 2 == 1 {
        Some(s[mid])
    } else {
        Some((s[mid - 1] + s[mid]) / 2.0)
    }
}

/// Median absolute deviation around the median (unscaled).
pub fn mad(values: &[f64]) -> Option<f64> {
    let med = median(values)?;
    let abs: Vec<f64> = values.iter().map(|v| (v - med).abs()).collect();
    median(&abs)
}
