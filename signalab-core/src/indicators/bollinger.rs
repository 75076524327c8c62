//! Bollinger Bands — moving average +/- standard deviation multiplier.
//!
//! Three bands (separate Indicator instances):
//! - Middle: SMA(close, period)
//! - Upper: middle + k * stddev(close, period)
//! - Lower: middle - k * stddev(close, period)
//!
//! Uses the sample stddev (divide by N - 1).
//! Lookback: period - 1.

use super::indicator::{Indicator, IndicatorKey};
use super::rolling::{rolling_mean, rolling_sample_std};
use crate::domain::Bar;

/// Which band of the Bollinger Bands to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
}

/// Upper, middle and lower bands computed together.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

impl Bollinger {
    fn with_band(period: usize, multiplier: f64, band: BollingerBand) -> Self {
        assert!(period >= 2, "Bollinger period must be >= 2");
        assert!(
            multiplier > 0.0 && multiplier.is_finite(),
            "Bollinger multiplier must be positive and finite"
        );
        Self {
            period,
            multiplier,
            band,
        }
    }

    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::with_band(period, multiplier, BollingerBand::Upper)
    }

    pub fn middle(period: usize, multiplier: f64) -> Self {
        Self::with_band(period, multiplier, BollingerBand::Middle)
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::with_band(period, multiplier, BollingerBand::Lower)
    }

    pub fn compute_all(&self, bars: &[Bar]) -> BollingerSeries {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let middle = rolling_mean(&closes, self.period);
        let stddev = rolling_sample_std(&closes, self.period);
        let upper = middle
            .iter()
            .zip(&stddev)
            .map(|(m, s)| m + self.multiplier * s)
            .collect();
        let lower = middle
            .iter()
            .zip(&stddev)
            .map(|(m, s)| m - self.multiplier * s)
            .collect();
        BollingerSeries {
            upper,
            middle,
            lower,
        }
    }
}

impl Indicator for Bollinger {
    fn key(&self) -> IndicatorKey {
        match self.band {
            BollingerBand::Upper => IndicatorKey::BollingerUpper,
            BollingerBand::Middle => IndicatorKey::BollingerMiddle,
            BollingerBand::Lower => IndicatorKey::BollingerLower,
        }
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let all = self.compute_all(bars);
        match self.band {
            BollingerBand::Upper => all.upper,
            BollingerBand::Middle => all.middle,
            BollingerBand::Lower => all.lower,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn bollinger_middle_is_sma() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = Bollinger::middle(3, 2.0).compute(&bars);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        assert_approx(result[3], 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_uses_sample_stddev() {
        // Window [10, 11, 12]: sample std = 1.0
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let all = Bollinger::upper(3, 2.0).compute_all(&bars);
        assert_approx(all.upper[2], 13.0, DEFAULT_EPSILON);
        assert_approx(all.lower[2], 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_bands_symmetric() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let all = Bollinger::upper(3, 2.0).compute_all(&bars);
        for i in 2..5 {
            let half_width = all.upper[i] - all.middle[i];
            assert_approx(all.middle[i] - all.lower[i], half_width, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn bollinger_constant_price_zero_width() {
        let bars = make_bars(&[100.0; 25]);
        let all = Bollinger::upper(20, 2.0).compute_all(&bars);
        assert_eq!(all.upper[24], 100.0);
        assert_eq!(all.middle[24], 100.0);
        assert_eq!(all.lower[24], 100.0);
    }

    #[test]
    fn bollinger_lookback() {
        assert_eq!(Bollinger::upper(20, 2.0).lookback(), 19);
        assert_eq!(Bollinger::lower(20, 2.0).key(), IndicatorKey::BollingerLower);
    }
}
