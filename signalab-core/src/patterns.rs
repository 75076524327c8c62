//! Candlestick pattern detection.
//!
//! Single-bar patterns look at body/shadow geometry; engulfing patterns also
//! look at the previous bar. Detection is a pure function of (previous, current).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::Bar;

/// The fixed pattern catalog, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PatternKind {
    Doji,
    Hammer,
    ShootingStar,
    BullishEngulfing,
    BearishEngulfing,
}

impl PatternKind {
    pub const ALL: [PatternKind; 5] = [
        Self::Doji,
        Self::Hammer,
        Self::ShootingStar,
        Self::BullishEngulfing,
        Self::BearishEngulfing,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Doji => "Doji",
            Self::Hammer => "Hammer",
            Self::ShootingStar => "Shooting Star",
            Self::BullishEngulfing => "Bullish Engulfing",
            Self::BearishEngulfing => "Bearish Engulfing",
        }
    }

    /// Whether `current` (with optional predecessor) forms this pattern.
    pub fn matches(self, previous: Option<&Bar>, current: &Bar) -> bool {
        match self {
            Self::Doji => is_doji(current),
            Self::Hammer => is_hammer(current),
            Self::ShootingStar => is_shooting_star(current),
            Self::BullishEngulfing => previous.is_some_and(|p| is_bullish_engulfing(p, current)),
            Self::BearishEngulfing => previous.is_some_and(|p| is_bearish_engulfing(p, current)),
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Body under 10% of the range. A zero-range bar is never a doji.
pub fn is_doji(bar: &Bar) -> bool {
    let range = bar.range();
    range > 0.0 && bar.body() / range < 0.1
}

pub fn is_hammer(bar: &Bar) -> bool {
    let body = bar.body();
    bar.lower_shadow() > 2.0 * body && bar.upper_shadow() < body
}

pub fn is_shooting_star(bar: &Bar) -> bool {
    let body = bar.body();
    bar.upper_shadow() > 2.0 * body && bar.lower_shadow() < body
}

pub fn is_bullish_engulfing(previous: &Bar, current: &Bar) -> bool {
    current.is_bullish()
        && previous.is_bearish()
        && current.open < previous.close
        && current.close > previous.open
}

pub fn is_bearish_engulfing(previous: &Bar, current: &Bar) -> bool {
    current.is_bearish()
        && previous.is_bullish()
        && current.open > previous.close
        && current.close < previous.open
}

/// Per-bar pattern flags aligned with the input bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternFlags {
    flags: Vec<[bool; 5]>,
}

impl PatternFlags {
    pub fn detect(bars: &[Bar]) -> Self {
        let flags = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| {
                let previous = i.checked_sub(1).map(|p| &bars[p]);
                let mut row = [false; 5];
                for (slot, kind) in row.iter_mut().zip(PatternKind::ALL) {
                    *slot = kind.matches(previous, bar);
                }
                row
            })
            .collect();
        Self { flags }
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Whether `kind` fired on bar `index`.
    pub fn is_set(&self, index: usize, kind: PatternKind) -> bool {
        self.flags
            .get(index)
            .map(|row| row[kind as usize])
            .unwrap_or(false)
    }

    /// Patterns that fired on bar `index`.
    pub fn at(&self, index: usize) -> Vec<PatternKind> {
        PatternKind::ALL
            .into_iter()
            .filter(|&kind| self.is_set(index, kind))
            .collect()
    }

    /// Patterns that fired anywhere in the trailing `lookback` bars, in catalog order.
    pub fn recent(&self, lookback: usize) -> Vec<PatternKind> {
        let start = self.flags.len().saturating_sub(lookback);
        PatternKind::ALL
            .into_iter()
            .filter(|&kind| (start..self.flags.len()).any(|i| self.is_set(i, kind)))
            .collect()
    }
}
