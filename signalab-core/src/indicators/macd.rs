//! Moving Average Convergence Divergence (MACD).
//!
//! Three series (separate Indicator instances, like the Bollinger bands):
//! - Line: EWM(close, fast) - EWM(close, slow)
//! - Signal: EWM(line, signal)
//! - Histogram: line - signal
//!
//! The exponential means carry no minimum-periods floor, so every series is
//! defined from the first bar.
//! Lookback: 0.

use super::indicator::{Indicator, IndicatorKey};
use super::rolling::ewm_mean;
use crate::domain::Bar;

/// Which MACD output to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdOutput {
    Line,
    Signal,
    Histogram,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    output: MacdOutput,
}

/// All three MACD series, computed together.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl Macd {
    fn with_output(fast: usize, slow: usize, signal: usize, output: MacdOutput) -> Self {
        assert!(fast >= 1 && slow >= 1 && signal >= 1, "MACD spans must be >= 1");
        assert!(fast < slow, "MACD fast span must be shorter than slow span");
        Self {
            fast,
            slow,
            signal,
            output,
        }
    }

    pub fn line(fast: usize, slow: usize, signal: usize) -> Self {
        Self::with_output(fast, slow, signal, MacdOutput::Line)
    }

    pub fn signal(fast: usize, slow: usize, signal: usize) -> Self {
        Self::with_output(fast, slow, signal, MacdOutput::Signal)
    }

    pub fn histogram(fast: usize, slow: usize, signal: usize) -> Self {
        Self::with_output(fast, slow, signal, MacdOutput::Histogram)
    }

    /// Compute line, signal and histogram in one pass over the closes.
    pub fn compute_all(&self, bars: &[Bar]) -> MacdSeries {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let fast = ewm_mean(&closes, self.fast);
        let slow = ewm_mean(&closes, self.slow);
        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ewm_mean(&line, self.signal);
        let histogram = line.iter().zip(&signal).map(|(l, s)| l - s).collect();
        MacdSeries {
            line,
            signal,
            histogram,
        }
    }
}

impl Indicator for Macd {
    fn key(&self) -> IndicatorKey {
        match self.output {
            MacdOutput::Line => IndicatorKey::MacdLine,
            MacdOutput::Signal => IndicatorKey::MacdSignal,
            MacdOutput::Histogram => IndicatorKey::MacdHistogram,
        }
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let all = self.compute_all(bars);
        match self.output {
            MacdOutput::Line => all.line,
            MacdOutput::Signal => all.signal,
            MacdOutput::Histogram => all.histogram,
        }
    }
}
