//! Rolling-window primitives shared by the indicators and the level detector.
//!
//! Every function returns a vector the same length as its input. A position is
//! `f64::NAN` until a full window is available, and any NaN inside a window
//! makes that window's output NaN.

/// Collect the full trailing window ending at `i`, or `None` if it holds a NaN.
fn window(values: &[f64], i: usize, period: usize) -> Option<&[f64]> {
    let w = &values[i + 1 - period..=i];
    if w.iter().any(|v| v.is_nan()) {
        None
    } else {
        Some(w)
    }
}

fn rolling<F>(values: &[f64], period: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }
    for i in (period - 1)..n {
        if let Some(w) = window(values, i, period) {
            result[i] = f(w);
        }
    }
    result
}

/// The shared value of a window whose entries are all equal.
fn constant(w: &[f64]) -> Option<f64> {
    let first = *w.first()?;
    w.iter().all(|&v| v == first).then_some(first)
}

fn mean(w: &[f64]) -> f64 {
    constant(w).unwrap_or_else(|| w.iter().sum::<f64>() / w.len() as f64)
}

/// Simple rolling mean. A constant window yields its value exactly.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, mean)
}

/// Rolling sample standard deviation (divides by N - 1).
///
/// A one-bar window has no sample deviation and stays NaN. A constant
/// window is exactly 0.
pub fn rolling_sample_std(values: &[f64], period: usize) -> Vec<f64> {
    if period < 2 {
        return vec![f64::NAN; values.len()];
    }
    rolling(values, period, |w| {
        if constant(w).is_some() {
            return 0.0;
        }
        let m = mean(w);
        let ss: f64 = w.iter().map(|v| (v - m) * (v - m)).sum();
        (ss / (w.len() - 1) as f64).sqrt()
    })
}

/// Rolling maximum.
pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

/// Rolling minimum.
pub fn rolling_min(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Centered rolling maximum.
///
/// The window for bar `i` spans `i - width/2 ..= i + (width - 1) - width/2`,
/// so an even width of 20 covers ten bars before and nine after. Bars without
/// a full window on both sides stay NaN.
pub fn centered_max(values: &[f64], width: usize) -> Vec<f64> {
    centered(values, width, rolling_max)
}

/// Centered rolling minimum; see [`centered_max`] for the window alignment.
pub fn centered_min(values: &[f64], width: usize) -> Vec<f64> {
    centered(values, width, rolling_min)
}

fn centered(values: &[f64], width: usize, f: fn(&[f64], usize) -> Vec<f64>) -> Vec<f64> {
    let n = values.len();
    let trailing = f(values, width);
    let mut result = vec![f64::NAN; n];
    if width == 0 {
        return result;
    }
    // A trailing window ending at j is centred on j - (width - 1 - width/2).
    let shift = width - 1 - width / 2;
    for (j, &v) in trailing.iter().enumerate() {
        if j >= shift {
            result[j - shift] = v;
        }
    }
    result
}

/// Exponentially weighted mean with span-derived decay, defined from the first value.
///
/// alpha = 2 / (span + 1). Each output is the bias-corrected weighted average
/// of all values seen so far, with weight (1 - alpha)^k on the value k bars
/// back. Early outputs behave like a short simple average and converge to the
/// recursive EMA as history accumulates. A NaN input taints every later value.
pub fn ewm_mean(values: &[f64], span: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if span == 0 {
        return result;
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;
    let mut numerator = 0.0;
    let mut denominator = 0.0;

    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            break;
        }
        numerator = v + decay * numerator;
        denominator = 1.0 + decay * denominator;
        result[i] = numerator / denominator;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn rolling_mean_basic() {
        let r = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 2);
        assert!(r[0].is_nan());
        assert_approx(r[1], 1.5, DEFAULT_EPSILON);
        assert_approx(r[3], 3.5, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_mean_nan_window() {
        let r = rolling_mean(&[1.0, f64::NAN, 3.0, 4.0], 2);
        assert!(r[1].is_nan());
        assert!(r[2].is_nan());
        assert_approx(r[3], 3.5, DEFAULT_EPSILON);
    }

    #[test]
    fn sample_std_known_value() {
        // Sample std of [2, 4, 4, 4, 5, 5, 7, 9] = sqrt(32 / 7)
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let r = rolling_sample_std(&values, 8);
        assert_approx(r[7], (32.0_f64 / 7.0).sqrt(), DEFAULT_EPSILON);
    }

    #[test]
    fn sample_std_of_constant_is_zero() {
        let r = rolling_sample_std(&[5.0; 6], 3);
        assert_eq!(r[5], 0.0);
    }

    #[test]
    fn constant_window_is_exact_at_unrepresentable_prices() {
        for price in [42.1, 0.1, 1234.567] {
            let values = vec![price; 25];
            let mean = rolling_mean(&values, 20);
            let std = rolling_sample_std(&values, 20);
            assert_eq!(mean[24], price);
            assert_eq!(std[24], 0.0);
        }
    }

    #[test]
    fn extrema() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0];
        let hi = rolling_max(&values, 3);
        let lo = rolling_min(&values, 3);
        assert_eq!(hi[2], 4.0);
        assert_eq!(hi[4], 5.0);
        assert_eq!(lo[2], 1.0);
        assert_eq!(lo[4], 1.0);
    }

    #[test]
    fn centered_window_alignment() {
        // width 4: bar i covers i-2 ..= i+1
        let values = [1.0, 2.0, 9.0, 3.0, 4.0, 5.0];
        let r = centered_max(&values, 4);
        assert!(r[0].is_nan());
        assert!(r[1].is_nan());
        assert_eq!(r[2], 9.0); // [1, 2, 9, 3]
        assert_eq!(r[3], 9.0); // [2, 9, 3, 4]
        assert_eq!(r[4], 9.0); // [9, 3, 4, 5]
        assert!(r[5].is_nan()); // needs bar 6
    }

    #[test]
    fn centered_odd_width_is_symmetric() {
        let values = [1.0, 7.0, 2.0, 3.0, 1.0];
        let r = centered_max(&values, 3);
        assert!(r[0].is_nan());
        assert_eq!(r[1], 7.0);
        assert_eq!(r[2], 7.0);
        assert_eq!(r[3], 3.0);
        assert!(r[4].is_nan());
    }

    #[test]
    fn ewm_first_value_is_input() {
        let r = ewm_mean(&[10.0, 20.0], 3);
        assert_approx(r[0], 10.0, DEFAULT_EPSILON);
        // alpha = 0.5: (20 + 0.5 * 10) / (1 + 0.5) = 16.666...
        assert_approx(r[1], 25.0 / 1.5, DEFAULT_EPSILON);
    }

    #[test]
    fn ewm_of_constant_is_constant() {
        let r = ewm_mean(&[7.0; 50], 12);
        assert!(r.iter().all(|v| (v - 7.0).abs() < 1e-12));
    }

    #[test]
    fn ewm_converges_to_recursive_ema() {
        let values: Vec<f64> = (0..400).map(|i| 100.0 + (i as f64 * 0.1).sin()).collect();
        let r = ewm_mean(&values, 5);
        let alpha = 2.0 / 6.0;
        let mut ema = values[0];
        for &v in &values[1..] {
            ema = alpha * v + (1.0 - alpha) * ema;
        }
        assert_approx(r[399], ema, 1e-9);
    }
}
