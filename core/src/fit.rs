// core/src/fit.rs
use crate::config::{EngineConfig, GridSearchCfg, ThresholdCfg};
use crate::error::{CoreError, Result};
use crate::telemetry;
use crate::trials::{CyclingTrials, RunningTrials};
use crate::types::{FitReport, FittedModel, ModelKind, Sport, Thresholds, TrialObservation};

fn check_observations(obs: &[TrialObservation]) -> Result<()> {
    if obs.len() < 2 {
        return Err(CoreError::InvalidInput(format!(
            "at least 2 observations required, got {}",
            obs.len()
        )));
    }
    if let Some(bad) = obs.iter().find(|o| !o.is_valid()) {
        return Err(CoreError::InvalidInput(format!(
            "observation must be finite and positive: t={} intensity={}",
            bad.time_s, bad.intensity
        )));
    }
    Ok(())
}

/// 2-parametermodell: minste kvadraters linje gjennom (t, arbeid).
///
/// Samme formel gir CS/D′ for løp, der arbeid = distanse.
pub fn fit_two_parameter(obs: &[TrialObservation]) -> Result<FittedModel> {
    check_observations(obs)?;

    let n = obs.len() as f64;
    let sum_t: f64 = obs.iter().map(|o| o.time_s).sum();
    let sum_w: f64 = obs.iter().map(|o| o.work()).sum();
    let sum_tt: f64 = obs.iter().map(|o| o.time_s * o.time_s).sum();
    let sum_tw: f64 = obs.iter().map(|o| o.time_s * o.work()).sum();

    let denom = n * sum_tt - sum_t * sum_t;
    // Relativ toleranse: like tider gir ~0 opp til avrundingsfeil
    if denom.abs() <= 1e-12 * n * sum_tt {
        return Err(CoreError::DegenerateFit(
            "trial times are not spread enough to fit a line".into(),
        ));
    }

    let capacity = (n * sum_tw - sum_t * sum_w) / denom;
    let reserve = (sum_w - capacity * sum_t) / n;
    log::debug!("2p fit: n={n} denom={denom:.3} capacity={capacity:.4} reserve={reserve:.4}");

    finish(FittedModel::new(capacity, reserve))
}

/// 3-parametermodell via grov grid-search over (CP, τ).
///
/// W′ for hvert gridpunkt er snittet av (P − CP)·(t + τ). Dette er en
/// tilnærming, ikke en ekte ikke-lineær optimering: oppløsningen er
/// begrenset av gridsteget, og CP utenfor gridet kan ikke finnes.
pub fn fit_three_parameter(obs: &[TrialObservation], grid: &GridSearchCfg) -> Result<FittedModel> {
    check_observations(obs)?;

    let n = obs.len() as f64;
    let mut best: Option<(f64, FittedModel)> = None;

    for cp in grid.cp_values() {
        for tau in grid.tau_values() {
            let w_est = obs
                .iter()
                .map(|o| (o.intensity - cp) * (o.time_s + tau))
                .sum::<f64>()
                / n;
            let err: f64 = obs
                .iter()
                .map(|o| {
                    let pred = cp + w_est / (o.time_s + tau);
                    (pred - o.intensity).powi(2)
                })
                .sum();

            // Streng `<`: første treff i iterasjonsrekkefølgen vinner ved likhet
            let better = match &best {
                Some((best_err, _)) => err < *best_err,
                None => err.is_finite(),
            };
            if better {
                best = Some((
                    err,
                    FittedModel { capacity: cp, reserve: w_est, time_constant: Some(tau) },
                ));
            }
        }
    }

    let (sse, model) = best.ok_or_else(|| {
        CoreError::DegenerateFit("grid search found no finite candidate".into())
    })?;
    log::debug!(
        "3p fit: capacity={} tau={:?} reserve={:.1} sse={sse:.4}",
        model.capacity,
        model.time_constant,
        model.reserve
    );
    finish(model)
}

fn finish(model: FittedModel) -> Result<FittedModel> {
    if !(model.capacity.is_finite() && model.capacity > 0.0) {
        return Err(CoreError::DegenerateFit(format!(
            "capacity must be finite and positive, got {}",
            model.capacity
        )));
    }
    if !model.reserve.is_finite() {
        return Err(CoreError::DegenerateFit(format!(
            "reserve is not finite: {}",
            model.reserve
        )));
    }
    Ok(model)
}

/// Felles inngang: velger modell og teller resultatet.
pub fn fit_model(
    sport: Sport,
    kind: ModelKind,
    obs: &[TrialObservation],
    cfg: &EngineConfig,
) -> Result<FittedModel> {
    let res = match (sport, kind) {
        (_, ModelKind::TwoParameter) => fit_two_parameter(obs),
        (Sport::Cycling, ModelKind::ThreeParameter) => fit_three_parameter(obs, &cfg.grid),
        (Sport::Running, ModelKind::ThreeParameter) => Err(CoreError::InvalidInput(
            "three-parameter model is only available for cycling".into(),
        )),
    };
    match &res {
        Ok(m) => {
            telemetry::fits_total().inc();
            log::info!(
                "{sport:?} {kind:?} fit: capacity={:.2} reserve={:.1}",
                m.capacity,
                m.reserve
            );
        }
        Err(e) => {
            telemetry::fits_rejected_total().inc();
            log::warn!("{sport:?} {kind:?} fit rejected: {e}");
        }
    }
    res
}

/// Terskler som faste brøker av kapasiteten; FTP kun når 20-min effekt finnes.
pub fn derive_thresholds(model: &FittedModel, p20: Option<f64>, cfg: &ThresholdCfg) -> Thresholds {
    Thresholds {
        ftp: p20.map(|p| p * cfg.ftp_fraction),
        lt1: model.capacity * cfg.lt1_fraction,
        lt2: model.capacity * cfg.lt2_fraction,
    }
}

pub fn fit_cycling(trials: &CyclingTrials, kind: ModelKind, cfg: &EngineConfig) -> Result<FitReport> {
    let obs = trials.observations().inspect_err(|_| {
        telemetry::fits_rejected_total().inc();
    })?;
    let model = fit_model(Sport::Cycling, kind, &obs, cfg)?;
    Ok(FitReport {
        sport: Sport::Cycling,
        kind,
        model,
        thresholds: derive_thresholds(&model, Some(trials.p20), &cfg.thresholds),
    })
}

pub fn fit_running(trials: &RunningTrials, cfg: &EngineConfig) -> Result<FitReport> {
    let obs = trials.observations().inspect_err(|_| {
        telemetry::fits_rejected_total().inc();
    })?;
    let model = fit_model(Sport::Running, ModelKind::TwoParameter, &obs, cfg)?;
    Ok(FitReport {
        sport: Sport::Running,
        kind: ModelKind::TwoParameter,
        model,
        thresholds: derive_thresholds(&model, None, &cfg.thresholds),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_observation_is_invalid_not_degenerate() {
        let obs = [TrialObservation::new(180.0, f64::NAN), TrialObservation::new(360.0, 300.0)];
        assert!(matches!(fit_two_parameter(&obs), Err(CoreError::InvalidInput(_))));
    }
}
