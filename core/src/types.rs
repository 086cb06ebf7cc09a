use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    Cycling,
    Running,
}

/// Én testobservasjon: varighet (sek) og intensitet (W eller m/s).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialObservation {
    pub time_s: f64,
    pub intensity: f64,
}

impl TrialObservation {
    pub fn new(time_s: f64, intensity: f64) -> Self {
        Self { time_s, intensity }
    }

    /// Arbeid (J) for sykkel, distanse (m) for løp.
    pub fn work(&self) -> f64 {
        self.intensity * self.time_s
    }

    pub fn is_valid(&self) -> bool {
        self.time_s.is_finite()
            && self.intensity.is_finite()
            && self.time_s > 0.0
            && self.intensity > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Lineær arbeid–tid: W = CP·t + W′
    TwoParameter,
    /// Hyperbolsk: P = CP + W′/(t + τ), kun sykkel
    ThreeParameter,
}

/// Tilpasset modell. `capacity` er CP (W) eller CS (m/s), `reserve` er
/// W′ (J) eller D′ (m).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub capacity: f64,
    pub reserve: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_constant: Option<f64>,
}

impl FittedModel {
    pub fn new(capacity: f64, reserve: f64) -> Self {
        Self { capacity, reserve, time_constant: None }
    }

    /// Forutsetning for simulering: begge parametre endelige og positive.
    pub fn check_simulatable(&self) -> Result<()> {
        if !(self.capacity.is_finite() && self.capacity > 0.0) {
            return Err(CoreError::MissingModel(format!(
                "capacity must be positive, got {}",
                self.capacity
            )));
        }
        if !(self.reserve.is_finite() && self.reserve > 0.0) {
            return Err(CoreError::MissingModel(format!(
                "reserve must be positive, got {}",
                self.reserve
            )));
        }
        Ok(())
    }
}

/// Hvilken referanse %-linjer i sykkeløkter regnes mot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingBase {
    #[default]
    Cp,
    Ftp,
}

/// Avledede terskler (rene brøker av fitten).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub ftp: Option<f64>,
    pub lt1: f64,
    pub lt2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub sport: Sport,
    pub kind: ModelKind,
    pub model: FittedModel,
    pub thresholds: Thresholds,
}

impl FitReport {
    /// Basis for %-linjer i øktteksten. Løp bruker alltid CS.
    pub fn base(&self, training_base: TrainingBase) -> Result<f64> {
        match (self.sport, training_base) {
            (Sport::Cycling, TrainingBase::Ftp) => self
                .thresholds
                .ftp
                .ok_or_else(|| CoreError::MissingModel("FTP not available".into())),
            _ => Ok(self.model.capacity),
        }
    }

    /// Referanse for `Power` i .zwo: FTP for sykkel (CP uten 20-min test), CS for løp.
    /// Uavhengig av valgt treningsbasis.
    pub fn export_reference(&self) -> f64 {
        match self.sport {
            Sport::Cycling => self.thresholds.ftp.unwrap_or(self.model.capacity),
            Sport::Running => self.model.capacity,
        }
    }
}

/// Ett parset intervall. Rekkefølgen i sekvensen er kronologisk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntervalDescriptor {
    /// Markør; bidrar ikke med varighet.
    Section { label: String, start_offset_s: u32 },
    Steady { duration_s: u32, intensity: f64 },
    /// Bånd for visning; simuleres på midtpunktet.
    Ranged { duration_s: u32, low: f64, high: f64 },
}

impl IntervalDescriptor {
    pub fn duration_s(&self) -> u32 {
        match self {
            IntervalDescriptor::Section { .. } => 0,
            IntervalDescriptor::Steady { duration_s, .. }
            | IntervalDescriptor::Ranged { duration_s, .. } => *duration_s,
        }
    }

    /// Intensiteten som brukes i simuleringen (None for seksjoner).
    pub fn effort_intensity(&self) -> Option<f64> {
        match self {
            IntervalDescriptor::Section { .. } => None,
            IntervalDescriptor::Steady { intensity, .. } => Some(*intensity),
            IntervalDescriptor::Ranged { low, high, .. } => Some((low + high) / 2.0),
        }
    }

    pub fn is_effort(&self) -> bool {
        !matches!(self, IntervalDescriptor::Section { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceSample {
    pub time_s: u32,
    pub intensity: f64,
    pub reserve_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSpan {
    pub label: String,
    pub start_s: u32,
    pub end_s: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeBand {
    pub start_s: u32,
    pub end_s: u32,
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTrace {
    pub sport: Sport,
    pub samples: Vec<TraceSample>,
    pub sections: Vec<SectionSpan>,
    pub bands: Vec<RangeBand>,
}

impl SessionTrace {
    pub fn intensities(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.intensity).collect()
    }

    pub fn duration_s(&self) -> u32 {
        self.samples.len() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SessionSummary {
    pub duration_s: u32,
    pub average: f64,
    pub normalized: f64,
    pub vi: Option<f64>,
    pub r#if: Option<f64>,
    pub training_load: Option<f64>,
    /// Kun sykkel (kJ).
    pub total_work_kj: Option<f64>,
    /// Kun sykkel (kJ over CP).
    pub work_above_capacity_kj: Option<f64>,
    pub min_reserve_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneTime {
    pub zone: String,
    pub seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedSession {
    pub trace: SessionTrace,
    pub summary: SessionSummary,
    pub zone_time: Vec<ZoneTime>,
}
