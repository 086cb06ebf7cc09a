// core/src/predict.rs
use serde::{Deserialize, Serialize};

use crate::timefmt::pace_from_speed;
use crate::types::FittedModel;

/// 1–6 min.
pub const CYCLING_PREDICTION_TIMES_S: [f64; 6] = [60.0, 120.0, 180.0, 240.0, 300.0, 360.0];
pub const CYCLING_RESERVE_PERCENTS: [f64; 6] = [100.0, 90.0, 80.0, 70.0, 60.0, 50.0];
pub const RUNNING_PREDICTION_DISTANCES_M: [f64; 5] = [1000.0, 2000.0, 3000.0, 5000.0, 10000.0];
pub const RUNNING_RESERVE_PERCENTS: [f64; 4] = [100.0, 90.0, 80.0, 70.0];

/// P = CP + f·W′ / t
pub fn predicted_power(model: &FittedModel, duration_s: f64, reserve_fraction: f64) -> Option<f64> {
    if duration_s > 0.0 {
        Some(model.capacity + model.reserve * reserve_fraction / duration_s)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerRow {
    pub duration_s: f64,
    /// Én verdi per prosent i `CYCLING_RESERVE_PERCENTS`.
    pub watts: Vec<f64>,
}

pub fn cycling_prediction_table(model: &FittedModel) -> Vec<PowerRow> {
    CYCLING_PREDICTION_TIMES_S
        .iter()
        .map(|&t| PowerRow {
            duration_s: t,
            watts: CYCLING_RESERVE_PERCENTS
                .iter()
                .filter_map(|pct| predicted_power(model, t, pct / 100.0))
                .collect(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunPrediction {
    pub distance_m: f64,
    pub time_s: f64,
    pub speed_ms: f64,
    pub pace_s_per_km: f64,
}

/// t = (d − f·D′) / CS. `None` når distansen er innenfor D′ (t ≤ 0).
pub fn predicted_run(model: &FittedModel, distance_m: f64, reserve_fraction: f64) -> Option<RunPrediction> {
    if model.capacity <= 0.0 {
        return None;
    }
    let time_s = (distance_m - model.reserve * reserve_fraction) / model.capacity;
    if !(time_s.is_finite() && time_s > 0.0) {
        return None;
    }
    let speed_ms = distance_m / time_s;
    Some(RunPrediction {
        distance_m,
        time_s,
        speed_ms,
        pace_s_per_km: pace_from_speed(speed_ms)?,
    })
}

pub fn running_prediction_table(model: &FittedModel) -> Vec<Option<RunPrediction>> {
    RUNNING_PREDICTION_DISTANCES_M
        .iter()
        .map(|&d| predicted_run(model, d, 1.0))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReserveRow {
    pub distance_m: f64,
    /// Én per prosent i `RUNNING_RESERVE_PERCENTS`.
    pub predictions: Vec<Option<RunPrediction>>,
}

pub fn running_reserve_table(model: &FittedModel) -> Vec<RunReserveRow> {
    RUNNING_PREDICTION_DISTANCES_M
        .iter()
        .map(|&d| RunReserveRow {
            distance_m: d,
            predictions: RUNNING_RESERVE_PERCENTS
                .iter()
                .map(|pct| predicted_run(model, d, pct / 100.0))
                .collect(),
        })
        .collect()
}
