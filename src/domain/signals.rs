//! Trend and correlation signals.
//!
//! Every function here recomputes from the full history it is handed, so a
//! value at index `i` depends only on observations up to `i`. Insufficient
//! history is `None`, which callers must treat as "signal unknown". It is
//! never collapsed to `false`.

/// Fast moving-average window for the trend filter.
pub const SMA_FAST: usize = 50;
/// Slow moving-average window for the trend filter.
pub const SMA_SLOW: usize = 200;
/// Rolling window, in weekly observations, for correlation to the benchmark.
pub const CORRELATION_WINDOW: usize = 26;

/// Trailing simple moving average. `None` until `window` observations exist.
pub fn sma(series: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; series.len()];
    }

    // Prefix sums keep this O(n) while staying a pure function of the input.
    let mut cumsum = Vec::with_capacity(series.len() + 1);
    let mut acc = 0.0;
    cumsum.push(acc);
    for &p in series {
        acc += p;
        cumsum.push(acc);
    }

    (0..series.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                Some((cumsum[i + 1] - cumsum[i + 1 - window]) / window as f64)
            }
        })
        .collect()
}

/// Entry trend condition: price > SMA50 > SMA200.
pub fn entry_signal(series: &[f64]) -> Vec<Option<bool>> {
    let fast = sma(series, SMA_FAST);
    let slow = sma(series, SMA_SLOW);
    series
        .iter()
        .zip(fast.iter().zip(slow.iter()))
        .map(|(&price, (f, s))| match (f, s) {
            (Some(f), Some(s)) => Some(price > *f && *f > *s),
            _ => None,
        })
        .collect()
}

/// Exit trend condition: price < SMA200 OR SMA50 < SMA200.
pub fn exit_signal(series: &[f64]) -> Vec<Option<bool>> {
    let fast = sma(series, SMA_FAST);
    let slow = sma(series, SMA_SLOW);
    series
        .iter()
        .zip(fast.iter().zip(slow.iter()))
        .map(|(&price, (f, s))| match (f, s) {
            (Some(f), Some(s)) => Some(price < *s || *f < *s),
            _ => None,
        })
        .collect()
}

/// Trailing Pearson correlation of `series` returns against `benchmark`
/// returns over `window` return observations. Output is aligned to the input
/// price indices; `None` until the window fills or when either side has zero
/// variance in the window.
pub fn rolling_correlation(series: &[f64], benchmark: &[f64], window: usize) -> Vec<Option<f64>> {
    let n = series.len();
    if benchmark.len() != n || window == 0 {
        return vec![None; n];
    }

    let xs = returns(series);
    let ys = returns(benchmark);

    // Prefix sums over the return series for O(1) window statistics.
    let mut sx = vec![0.0];
    let mut sy = vec![0.0];
    let mut sxx = vec![0.0];
    let mut syy = vec![0.0];
    let mut sxy = vec![0.0];
    for i in 0..xs.len() {
        sx.push(sx[i] + xs[i]);
        sy.push(sy[i] + ys[i]);
        sxx.push(sxx[i] + xs[i] * xs[i]);
        syy.push(syy[i] + ys[i] * ys[i]);
        sxy.push(sxy[i] + xs[i] * ys[i]);
    }

    (0..n)
        .map(|i| {
            // Price index i ends with return index i-1; need `window` returns.
            if i < window {
                return None;
            }
            let hi = i;
            let lo = i - window;
            let w = window as f64;
            let sum_x = sx[hi] - sx[lo];
            let sum_y = sy[hi] - sy[lo];
            let sum_xx = sxx[hi] - sxx[lo];
            let sum_yy = syy[hi] - syy[lo];
            let sum_xy = sxy[hi] - sxy[lo];

            let var_x = sum_xx - sum_x * sum_x / w;
            let var_y = sum_yy - sum_y * sum_y / w;
            if var_x <= 0.0 || var_y <= 0.0 {
                return None;
            }
            let cov = sum_xy - sum_x * sum_y / w;
            Some(cov / (var_x * var_y).sqrt())
        })
        .collect()
}

/// Simple returns, one fewer element than the input.
pub fn returns(series: &[f64]) -> Vec<f64> {
    series
        .windows(2)
        .map(|w| {
            if w[0] != 0.0 {
                (w[1] - w[0]) / w[0]
            } else {
                0.0
            }
        })
        .collect()
}
