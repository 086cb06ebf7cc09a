// core/src/config.rs
use serde::{Deserialize, Serialize};
use serde_path_to_error as spte;
use std::path::Path;

use crate::error::{CoreError, Result};
use crate::metrics::NP_WINDOW;
use crate::types::Sport;

/// Grenser for grid-search i 3-parametermodellen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSearchCfg {
    pub cp_min: u32,
    pub cp_max: u32,
    pub cp_step: u32,
    pub tau_min: u32,
    pub tau_max: u32,
    pub tau_step: u32,
}

impl Default for GridSearchCfg {
    fn default() -> Self {
        Self {
            cp_min: 100,
            cp_max: 400,
            cp_step: 1,
            tau_min: 1,
            tau_max: 200,
            tau_step: 5,
        }
    }
}

impl GridSearchCfg {
    pub fn cp_values(&self) -> impl Iterator<Item = f64> {
        (self.cp_min..=self.cp_max)
            .step_by(self.cp_step.max(1) as usize)
            .map(f64::from)
    }

    pub fn tau_values(&self) -> impl Iterator<Item = f64> {
        (self.tau_min..=self.tau_max)
            .step_by(self.tau_step.max(1) as usize)
            .map(f64::from)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdCfg {
    /// FTP = brøk × 20-min effekt
    pub ftp_fraction: f64,
    pub lt1_fraction: f64,
    pub lt2_fraction: f64,
}

impl Default for ThresholdCfg {
    fn default() -> Self {
        Self {
            ftp_fraction: 0.95,
            lt1_fraction: 0.75,
            lt2_fraction: 0.90,
        }
    }
}

/// Skalering av restitusjonsleddet per idrett.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryCfg {
    pub cycling_scale: f64,
    pub running_scale: f64,
}

impl Default for RecoveryCfg {
    fn default() -> Self {
        Self {
            cycling_scale: 1.0,
            running_scale: 0.5,
        }
    }
}

impl RecoveryCfg {
    pub fn scale_for(&self, sport: Sport) -> f64 {
        match sport {
            Sport::Cycling => self.cycling_scale,
            Sport::Running => self.running_scale,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rolling_window: usize,
    pub grid: GridSearchCfg,
    pub thresholds: ThresholdCfg,
    pub recovery: RecoveryCfg,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rolling_window: NP_WINDOW,
            grid: GridSearchCfg::default(),
            thresholds: ThresholdCfg::default(),
            recovery: RecoveryCfg::default(),
        }
    }
}

fn positive(name: &str, v: f64) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(CoreError::Config(format!("{name} must be finite and positive, got {v}")))
    }
}

impl EngineConfig {
    /// Parser JSON; feilmelding inkluderer sti til feltet (f.eks. `grid.cp_step`).
    pub fn from_json_str(s: &str) -> Result<Self> {
        let de = &mut serde_json::Deserializer::from_str(s);
        let cfg: EngineConfig = spte::deserialize(de)
            .map_err(|e| CoreError::Config(format!("{} at {}", e.inner(), e.path())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))?;
        let cfg = Self::from_json_str(&contents)?;
        log::info!("config loaded from {}", path.display());
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rolling_window == 0 {
            return Err(CoreError::Config("rolling_window must be > 0".into()));
        }
        let g = &self.grid;
        if g.cp_step == 0 || g.tau_step == 0 {
            return Err(CoreError::Config("grid steps must be > 0".into()));
        }
        if g.cp_min == 0 || g.cp_min > g.cp_max || g.tau_min > g.tau_max {
            return Err(CoreError::Config(format!(
                "empty grid: cp {}..={}, tau {}..={}",
                g.cp_min, g.cp_max, g.tau_min, g.tau_max
            )));
        }
        positive("thresholds.ftp_fraction", self.thresholds.ftp_fraction)?;
        positive("thresholds.lt1_fraction", self.thresholds.lt1_fraction)?;
        positive("thresholds.lt2_fraction", self.thresholds.lt2_fraction)?;
        positive("recovery.cycling_scale", self.recovery.cycling_scale)?;
        positive("recovery.running_scale", self.recovery.running_scale)?;
        Ok(())
    }
}
