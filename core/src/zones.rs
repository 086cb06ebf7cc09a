// core/src/zones.rs
use serde::Serialize;

use crate::types::Sport;

/// Sone som brøk av kapasitet. Grenser er `[low, high)`, siste sone er
/// ubegrenset oppover (`high = ∞`) og inkluderer alt over `low`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Zone {
    pub name: &'static str,
    pub low: f64,
    pub high: f64,
    pub color: &'static str,
}

impl Zone {
    const fn new(name: &'static str, low: f64, high: f64, color: &'static str) -> Self {
        Self { name, low, high, color }
    }

    pub fn contains(&self, ratio: f64) -> bool {
        ratio >= self.low && (ratio < self.high || self.high == f64::INFINITY)
    }

    /// Absolutte grenser (W eller m/s) for gitt kapasitet.
    pub fn bounds(&self, capacity: f64) -> (f64, f64) {
        (self.low * capacity, self.high * capacity)
    }
}

/// Effektsoner (% CP).
pub const CYCLING_ZONES: [Zone; 7] = [
    Zone::new("Z1 - Active Recovery", 0.0, 0.56, "#71d874"),
    Zone::new("Z2 - Endurance", 0.56, 0.76, "#d8c518"),
    Zone::new("Z3 - Tempo", 0.76, 0.91, "#ffe082"),
    Zone::new("Z4 - Threshold", 0.91, 1.06, "#e68264"),
    Zone::new("Z5 - VO2max", 1.06, 1.21, "#e04141"),
    Zone::new("Z6 - Anaerobic", 1.21, 1.51, "#e62968"),
    Zone::new("Z7 - Neuromuscular", 1.51, f64::INFINITY, "#c528e1"),
];

/// Fartssoner (% CS).
pub const RUNNING_ZONES: [Zone; 5] = [
    Zone::new("Z1 - Easy", 0.0, 0.80, "#c8e6c9"),
    Zone::new("Z2 - Steady", 0.80, 0.90, "#fff9c4"),
    Zone::new("Z3 - Tempo", 0.90, 1.00, "#ffe082"),
    Zone::new("Z4 - Threshold", 1.00, 1.05, "#ffccbc"),
    Zone::new("Z5 - Interval", 1.05, f64::INFINITY, "#ef9a9a"),
];

pub fn zone_table(sport: Sport) -> &'static [Zone] {
    match sport {
        Sport::Cycling => &CYCLING_ZONES,
        Sport::Running => &RUNNING_ZONES,
    }
}

/// Første sone i tabellen som inneholder `intensity / capacity`.
pub fn classify(intensity: f64, capacity: f64, table: &[Zone]) -> Option<&Zone> {
    if capacity.is_nan() || capacity <= 0.0 || !intensity.is_finite() {
        return None;
    }
    let ratio = intensity / capacity;
    table.iter().find(|z| z.contains(ratio))
}

/// Sjekker at tabellen dekker [0, ∞) uten hull eller overlapp.
pub fn is_partition(table: &[Zone]) -> bool {
    let Some(first) = table.first() else {
        return false;
    };
    let contiguous = table.windows(2).all(|w| w[0].high == w[1].low && w[0].low < w[0].high);
    first.low == 0.0 && contiguous && table.last().is_some_and(|z| z.high == f64::INFINITY)
}
