use conditioning_core::config::GridSearchCfg;
use conditioning_core::fit::{derive_thresholds, fit_cycling, fit_running, fit_three_parameter, fit_two_parameter};
use conditioning_core::trials::{InputMode, UnitSystem};
use conditioning_core::{CoreError, CyclingTrials, EngineConfig, ModelKind, RunningTrials, TrialObservation};
use serde::Deserialize;

fn obs(pairs: &[(f64, f64)]) -> Vec<TrialObservation> {
    pairs.iter().map(|&(t, p)| TrialObservation::new(t, p)).collect()
}

#[test]
fn two_parameter_recovers_exact_line() {
    let (c, r) = (265.0, 18500.0);
    let data: Vec<TrialObservation> = [180.0, 360.0, 1200.0]
        .iter()
        .map(|&t| TrialObservation::new(t, (c * t + r) / t))
        .collect();
    let m = fit_two_parameter(&data).unwrap();
    assert!((m.capacity - c).abs() < 1e-7, "CP {}", m.capacity);
    assert!((m.reserve - r).abs() < 1e-4, "W' {}", m.reserve);
    assert_eq!(m.time_constant, None);
}

#[test]
fn two_parameter_matches_hand_computed_ols() {
    let data = obs(&[(180.0, 350.0), (360.0, 300.0), (1200.0, 250.0)]);
    // Håndregnet: Σt=1740, Σw=471000, Σt²=1602000, Σtw=410220000
    let cp = (3.0 * 410_220_000.0 - 1740.0 * 471_000.0) / (3.0 * 1_602_000.0 - 1740.0 * 1740.0);
    let wp = (471_000.0 - cp * 1740.0) / 3.0;
    let m = fit_two_parameter(&data).unwrap();
    assert!((m.capacity - cp).abs() < 1e-9);
    assert!((m.reserve - wp).abs() < 1e-6);
    assert!((m.capacity - 231.174).abs() < 1e-3);
}

#[test]
fn duplicate_times_are_degenerate() {
    let data = obs(&[(300.0, 300.0), (300.0, 290.0), (300.0, 310.0)]);
    assert!(matches!(fit_two_parameter(&data), Err(CoreError::DegenerateFit(_))));
}

#[test]
fn too_few_or_bad_observations_are_invalid() {
    assert!(matches!(fit_two_parameter(&obs(&[(180.0, 350.0)])), Err(CoreError::InvalidInput(_))));
    let bad = obs(&[(180.0, 350.0), (360.0, -1.0)]);
    assert!(matches!(fit_two_parameter(&bad), Err(CoreError::InvalidInput(_))));
}

#[test]
fn negative_capacity_is_rejected() {
    // Mer arbeid på kort tid enn lang tid → negativ helning
    let data = obs(&[(180.0, 1000.0), (1200.0, 10.0)]);
    assert!(matches!(fit_two_parameter(&data), Err(CoreError::DegenerateFit(_))));
}

#[test]
fn three_parameter_finds_grid_point() {
    let (cp, w, tau) = (250.0, 20000.0, 31.0);
    let data: Vec<TrialObservation> = [180.0, 360.0, 1200.0]
        .iter()
        .map(|&t| TrialObservation::new(t, cp + w / (t + tau)))
        .collect();
    let m = fit_three_parameter(&data, &GridSearchCfg::default()).unwrap();
    assert_eq!(m.capacity, cp);
    assert_eq!(m.time_constant, Some(tau));
    assert!((m.reserve - w).abs() < 1e-6);
}

#[test]
fn three_parameter_is_deterministic() {
    let data = obs(&[(180.0, 350.0), (360.0, 300.0), (1200.0, 250.0)]);
    let grid = GridSearchCfg::default();
    let a = fit_three_parameter(&data, &grid).unwrap();
    let b = fit_three_parameter(&data, &grid).unwrap();
    assert_eq!(a, b);
    assert!(a.capacity >= 100.0 && a.capacity <= 400.0);
}

#[test]
fn cycling_report_has_thresholds() {
    let trials = CyclingTrials { p3: 350.0, p6: 300.0, p20: 250.0 };
    let report = fit_cycling(&trials, ModelKind::TwoParameter, &EngineConfig::default()).unwrap();
    assert_eq!(report.thresholds.ftp, Some(237.5));
    assert!((report.thresholds.lt1 - 0.75 * report.model.capacity).abs() < 1e-12);
    assert!((report.thresholds.lt2 - 0.90 * report.model.capacity).abs() < 1e-12);

    let t = derive_thresholds(&report.model, None, &EngineConfig::default().thresholds);
    assert_eq!(t.ftp, None);
}

#[test]
fn cycling_missing_power_is_invalid() {
    let trials = CyclingTrials { p3: f64::NAN, p6: 300.0, p20: 250.0 };
    let err = fit_cycling(&trials, ModelKind::TwoParameter, &EngineConfig::default()).unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));
}

#[test]
fn running_fit_from_total_times() {
    // CS = 4.5 m/s, D′ = 150 m → t = (d − D′)/CS
    let times: Vec<String> = [1000.0, 3000.0, 5000.0, 10000.0]
        .iter()
        .map(|d| {
            let t: f64 = (d - 150.0) / 4.5;
            format!("{}:{:.6}", (t / 60.0).floor(), t % 60.0)
        })
        .collect();
    let refs: Vec<&str> = times.iter().map(String::as_str).collect();
    let trials = RunningTrials::from_standard(UnitSystem::Metric, InputMode::Duration, &refs);
    let report = fit_running(&trials, &EngineConfig::default()).unwrap();
    assert!((report.model.capacity - 4.5).abs() < 1e-6);
    assert!((report.model.reserve - 150.0).abs() < 1e-3);
}

#[test]
fn running_pace_entries_and_skips() {
    // 4:00/km på 1k, 4:10/km på 5k, resten tomt
    let trials = RunningTrials::from_standard(UnitSystem::Metric, InputMode::Pace, &["4:00", "", "4:10", "abc"]);
    let obs = trials.observations().unwrap();
    assert_eq!(obs.len(), 2);
    assert!((obs[0].time_s - 240.0).abs() < 1e-9);
    assert!((obs[1].time_s - 1250.0).abs() < 1e-9);

    let one = RunningTrials::from_standard(UnitSystem::Metric, InputMode::Pace, &["4:00"]);
    let err = fit_running(&one, &EngineConfig::default()).unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));
}

#[test]
fn running_rejects_three_parameter() {
    let data = obs(&[(240.0, 4.2), (1250.0, 4.0)]);
    let err = conditioning_core::fit_model(
        conditioning_core::Sport::Running,
        ModelKind::ThreeParameter,
        &data,
        &EngineConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));
}

#[derive(Debug, Deserialize)]
struct Row {
    athlete: String,
    p3: f64,
    p6: f64,
    p20: f64,
}

#[test]
fn csv_fixtures_fit_with_both_models() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/cycling_trials.csv");
    let mut rdr = csv::Reader::from_path(path).expect("fixture");
    let cfg = EngineConfig::default();
    for row in rdr.deserialize::<Row>() {
        let row = row.unwrap();
        let trials = CyclingTrials { p3: row.p3, p6: row.p6, p20: row.p20 };
        let two = fit_cycling(&trials, ModelKind::TwoParameter, &cfg).unwrap();
        let three = fit_cycling(&trials, ModelKind::ThreeParameter, &cfg).unwrap();
        assert!(two.model.capacity < row.p20, "{}: CP under 20-min effekt", row.athlete);
        assert!(two.model.reserve > 0.0, "{}", row.athlete);
        assert!(three.model.time_constant.is_some(), "{}", row.athlete);
    }
}

#[test]
fn grid_ties_keep_first_point() {
    // Like observasjoner passer eksakt i hvert gridpunkt: SSE = 0 overalt.
    // Heltallsprodukter holder regningen eksakt i f64.
    let o = obs(&[(300.0, 250.0), (300.0, 250.0)]);
    let grid = GridSearchCfg { cp_min: 200, cp_max: 210, cp_step: 5, tau_min: 10, tau_max: 30, tau_step: 10 };
    let m = fit_three_parameter(&o, &grid).unwrap();
    assert_eq!(m.capacity, 200.0);
    assert_eq!(m.time_constant, Some(10.0));
    assert_eq!(m.reserve, 50.0 * 310.0);
}
