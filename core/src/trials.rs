// core/src/trials.rs
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::timefmt::parse_time_input;
use crate::types::TrialObservation;

/// Faste testvarigheter for sykkel (3, 6 og 20 min).
pub const CYCLING_TRIAL_TIMES_S: [f64; 3] = [180.0, 360.0, 1200.0];

pub const KM_M: f64 = 1000.0;
pub const MILE_M: f64 = 1609.34;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CyclingTrials {
    pub p3: f64,
    pub p6: f64,
    pub p20: f64,
}

impl CyclingTrials {
    pub fn observations(&self) -> Result<Vec<TrialObservation>> {
        let powers = [self.p3, self.p6, self.p20];
        if powers.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Err(CoreError::InvalidInput(
                "please enter 3, 6 and 20-min powers".into(),
            ));
        }
        Ok(CYCLING_TRIAL_TIMES_S
            .iter()
            .zip(powers)
            .map(|(&t, p)| TrialObservation::new(t, p))
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Lengden av "per enhet" i tempo-input (km eller mile).
    pub fn unit_length_m(&self) -> f64 {
        match self {
            UnitSystem::Metric => KM_M,
            UnitSystem::Imperial => MILE_M,
        }
    }

    /// Standard testdistanser (1/3/5/10 km eller mi).
    pub fn distances_m(&self) -> [f64; 4] {
        match self {
            UnitSystem::Metric => [1000.0, 3000.0, 5000.0, 10000.0],
            UnitSystem::Imperial => [1609.34, 4828.02, 8046.7, 16093.4],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Tempo per km/mi
    #[default]
    Pace,
    /// Total tid for distansen
    Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEntry {
    pub distance_m: f64,
    /// Fritekst "MM:SS" / "HH:MM:SS"
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningTrials {
    #[serde(default)]
    pub unit: UnitSystem,
    #[serde(default)]
    pub mode: InputMode,
    pub entries: Vec<RunEntry>,
}

impl RunningTrials {
    /// Bygg fra standarddistansene; tomme felt hoppes over.
    pub fn from_standard(unit: UnitSystem, mode: InputMode, values: &[&str]) -> Self {
        let entries = unit
            .distances_m()
            .iter()
            .zip(values)
            .map(|(&d, v)| RunEntry { distance_m: d, value: v.to_string() })
            .collect();
        Self { unit, mode, entries }
    }

    /// Ugyldige tidsfelt hoppes over; minst to må gjenstå.
    pub fn observations(&self) -> Result<Vec<TrialObservation>> {
        let mut out = Vec::with_capacity(self.entries.len());
        for e in &self.entries {
            let Some(t) = parse_time_input(&e.value) else {
                log::debug!("skipping run entry {:?}", e.value);
                continue;
            };
            let total = match self.mode {
                InputMode::Pace => t * (e.distance_m / self.unit.unit_length_m()),
                InputMode::Duration => t,
            };
            if total > 0.0 && e.distance_m > 0.0 {
                out.push(TrialObservation::new(total, e.distance_m / total));
            }
        }
        if out.len() < 2 {
            return Err(CoreError::InvalidInput(
                "please enter at least two valid paces".into(),
            ));
        }
        Ok(out)
    }
}
