// core/src/api.rs
//
// JSON-grensesnitt mot visningslaget: tekst inn, tekst ut.
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_path_to_error as spte;

use crate::config::EngineConfig;
use crate::error::{CoreError, Result};
use crate::export::{to_zwo, ZwoOptions};
use crate::fit::{fit_cycling, fit_running};
use crate::parser::{parse_session, ParseContext};
use crate::predict::{cycling_prediction_table, running_prediction_table, running_reserve_table, PowerRow};
use crate::predict::{RunPrediction, RunReserveRow};
use crate::simulate::{simulate, SimulationOptions};
use crate::trials::{CyclingTrials, RunningTrials};
use crate::types::{FitReport, IntervalDescriptor, ModelKind, SimulatedSession, Sport, TrainingBase};
use crate::zones::zone_table;

fn default_model() -> ModelKind {
    ModelKind::TwoParameter
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "sport", rename_all = "snake_case")]
pub enum FitRequest {
    Cycling {
        trials: CyclingTrials,
        #[serde(default = "default_model")]
        model: ModelKind,
    },
    Running {
        trials: RunningTrials,
    },
}

/// Sone i absolutte enheter for tabellvisning. `high = None` betyr åpen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneBand {
    pub name: String,
    pub color: String,
    pub low_pct: f64,
    pub high_pct: Option<f64>,
    pub low: f64,
    pub high: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sport", rename_all = "snake_case")]
pub enum Predictions {
    Cycling { power: Vec<PowerRow> },
    Running { paces: Vec<Option<RunPrediction>>, reserve_use: Vec<RunReserveRow> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResponse {
    pub report: FitReport,
    pub zones: Vec<ZoneBand>,
    pub predictions: Predictions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulateRequest {
    pub fit: FitReport,
    pub text: String,
    #[serde(default)]
    pub training_base: TrainingBase,
    /// Legg ved .zwo-eksport i svaret.
    #[serde(default)]
    pub zwo: Option<ZwoOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulateResponse {
    pub descriptors: Vec<IntervalDescriptor>,
    pub skipped: Vec<String>,
    pub session: SimulatedSession,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zwo: Option<String>,
}

fn from_json<T: DeserializeOwned>(s: &str) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_str(s);
    spte::deserialize(de).map_err(|e| CoreError::Json(format!("{} at {}", e.inner(), e.path())))
}

fn resolve_cfg(cfg_json: Option<&str>) -> Result<EngineConfig> {
    match cfg_json {
        Some(s) if !s.trim().is_empty() => EngineConfig::from_json_str(s),
        _ => Ok(EngineConfig::default()),
    }
}

pub fn zone_bands(sport: Sport, capacity: f64) -> Vec<ZoneBand> {
    zone_table(sport)
        .iter()
        .map(|z| {
            let open = z.high.is_infinite();
            ZoneBand {
                name: z.name.to_string(),
                color: z.color.to_string(),
                low_pct: z.low * 100.0,
                high_pct: (!open).then_some(z.high * 100.0),
                low: z.low * capacity,
                high: (!open).then_some(z.high * capacity),
            }
        })
        .collect()
}

pub fn fit_request(req: &FitRequest, cfg: &EngineConfig) -> Result<FitResponse> {
    let report = match req {
        FitRequest::Cycling { trials, model } => fit_cycling(trials, *model, cfg)?,
        FitRequest::Running { trials } => fit_running(trials, cfg)?,
    };
    let predictions = match report.sport {
        Sport::Cycling => Predictions::Cycling { power: cycling_prediction_table(&report.model) },
        Sport::Running => Predictions::Running {
            paces: running_prediction_table(&report.model),
            reserve_use: running_reserve_table(&report.model),
        },
    };
    Ok(FitResponse {
        zones: zone_bands(report.sport, report.model.capacity),
        predictions,
        report,
    })
}

pub fn simulate_request(req: &SimulateRequest, cfg: &EngineConfig) -> Result<SimulateResponse> {
    let fit = &req.fit;
    fit.model.check_simulatable()?;
    let ctx = ParseContext { sport: fit.sport, base: fit.base(req.training_base)? };

    let parsed = parse_session(&req.text, &ctx);
    if parsed.descriptors.is_empty() {
        return Err(CoreError::NothingToSimulate);
    }
    let session = simulate(
        &parsed.descriptors,
        &fit.model,
        fit.sport,
        &SimulationOptions::for_sport(fit.sport, cfg),
    )?;
    let zwo = match &req.zwo {
        Some(opts) => Some(to_zwo(&parsed.descriptors, fit.export_reference(), fit.sport, opts)?),
        None => None,
    };
    Ok(SimulateResponse {
        descriptors: parsed.descriptors,
        skipped: parsed.skipped,
        session,
        zwo,
    })
}

/// Fit fra JSON-forespørsel; valgfri config som JSON.
pub fn fit_model_json(request_json: &str, cfg_json: Option<&str>) -> Result<String> {
    let cfg = resolve_cfg(cfg_json)?;
    let req: FitRequest = from_json(request_json)?;
    let resp = fit_request(&req, &cfg)?;
    Ok(serde_json::to_string(&resp)?)
}

pub fn simulate_session_json(request_json: &str, cfg_json: Option<&str>) -> Result<String> {
    let cfg = resolve_cfg(cfg_json)?;
    let req: SimulateRequest = from_json(request_json)?;
    let resp = simulate_request(&req, &cfg)?;
    Ok(serde_json::to_string(&resp)?)
}
