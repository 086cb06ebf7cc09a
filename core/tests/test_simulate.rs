use conditioning_core::config::EngineConfig;
use conditioning_core::simulate::{generate_session, simulate, ReserveBalance, SimulationOptions};
use conditioning_core::{
    fit_cycling, parse_session, CoreError, CyclingTrials, FittedModel, IntervalDescriptor, ModelKind,
    ParseContext, Sport,
};

fn cycling_opts() -> SimulationOptions {
    SimulationOptions::for_sport(Sport::Cycling, &EngineConfig::default())
}

fn model() -> FittedModel {
    FittedModel::new(250.0, 20000.0)
}

#[test]
fn end_to_end_steady_at_capacity() {
    let cfg = EngineConfig::default();
    let trials = CyclingTrials { p3: 350.0, p6: 300.0, p20: 250.0 };
    let fit = fit_cycling(&trials, ModelKind::TwoParameter, &cfg).unwrap();
    let cp = fit.model.capacity;

    let ctx = ParseContext { sport: Sport::Cycling, base: cp };
    let session = generate_session("5min @ 100%", &ctx, &fit.model, &cfg).unwrap();
    let samples = &session.trace.samples;

    assert_eq!(samples.len(), 300);
    assert!(samples.iter().all(|s| s.intensity == cp));
    assert_eq!(samples[0].time_s, 1);
    assert_eq!(samples[299].time_s, 300);
    // I == CP: ingen tømming, full reserve gir null restitusjon
    assert!(samples[0].reserve_balance <= fit.model.reserve);
    assert!(samples.windows(2).all(|w| w[1].reserve_balance <= w[0].reserve_balance));

    let s = &session.summary;
    assert!((s.vi.unwrap() - 1.0).abs() < 1e-9);
    assert!((s.r#if.unwrap() - 1.0).abs() < 1e-9);
    // 300 s på IF 1.0 → 300/3600·100
    assert!((s.training_load.unwrap() - 300.0 / 36.0).abs() < 1e-6);
    assert!((s.total_work_kj.unwrap() - cp * 0.3).abs() < 1e-6);
    assert!(s.work_above_capacity_kj.unwrap().abs() < 1e-9);
}

#[test]
fn reserve_stays_within_bounds() {
    let text = "Warm up >>\n10min @ 60%\n6x(2min @ 130%, 1min @ 40%)\n3x(30sec @ 600w, 30sec @ 100w)\n10min @ 200-260w";
    let m = model();
    let parsed = parse_session(text, &ParseContext { sport: Sport::Cycling, base: m.capacity });
    let session = simulate(&parsed.descriptors, &m, Sport::Cycling, &cycling_opts()).unwrap();

    for s in &session.trace.samples {
        assert!(s.reserve_balance >= 0.0 && s.reserve_balance <= m.reserve, "{s:?}");
    }
    // 6×2 min på 325 W tømmer W′ helt
    assert_eq!(session.summary.min_reserve_balance, 0.0);
    assert_eq!(session.trace.bands.len(), 1);
    assert_eq!(session.trace.bands[0].end_s - session.trace.bands[0].start_s, 600);
}

#[test]
fn depletion_is_linear_above_capacity() {
    let m = model();
    let d = [IntervalDescriptor::Steady { duration_s: 10, intensity: 350.0 }];
    let session = simulate(&d, &m, Sport::Cycling, &cycling_opts()).unwrap();
    let last = session.trace.samples.last().unwrap();
    assert_eq!(last.reserve_balance, 20000.0 - 10.0 * 100.0);
}

#[test]
fn running_recovers_at_half_rate() {
    let m = FittedModel::new(4.0, 200.0);
    let mut bike = ReserveBalance::new(&m, 1.0);
    let mut run = ReserveBalance::new(&m, 0.5);
    for _ in 0..50 {
        bike.step(6.0, 1.0);
        run.step(6.0, 1.0);
    }
    assert_eq!(run.balance(), 100.0);
    let b = bike.step(2.0, 1.0) - 100.0;
    let r = run.step(2.0, 1.0) - 100.0;
    assert!((b - 1.0).abs() < 1e-12);
    assert!((r - 0.5).abs() < 1e-12);
}

#[test]
fn sections_become_spans() {
    let m = model();
    let text = "Warm up >>\n5min @ 50%\nMain >>\n2min @ 100%\nCool >>\n3min @ 40%";
    let parsed = parse_session(text, &ParseContext { sport: Sport::Cycling, base: m.capacity });
    let session = simulate(&parsed.descriptors, &m, Sport::Cycling, &cycling_opts()).unwrap();
    let spans: Vec<(String, u32, u32)> = session
        .trace
        .sections
        .iter()
        .map(|s| (s.label.clone(), s.start_s, s.end_s))
        .collect();
    assert_eq!(
        spans,
        vec![("Warm up".into(), 0, 300), ("Main".into(), 300, 420), ("Cool".into(), 420, 600)]
    );
}

#[test]
fn zone_time_sums_to_duration() {
    let m = model();
    let parsed = parse_session("5min @ 50%\n5min @ 100%\n1min @ 200%", &ParseContext { sport: Sport::Cycling, base: m.capacity });
    let session = simulate(&parsed.descriptors, &m, Sport::Cycling, &cycling_opts()).unwrap();
    let total: u32 = session.zone_time.iter().map(|z| z.seconds).sum();
    assert_eq!(total, 660);
    assert_eq!(session.zone_time[0].seconds, 300);
    assert_eq!(session.zone_time[3].seconds, 300);
    assert_eq!(session.zone_time[6].seconds, 60);
}

#[test]
fn running_session_has_no_work_totals() {
    let m = FittedModel::new(4.0, 200.0);
    let opts = SimulationOptions::for_sport(Sport::Running, &EngineConfig::default());
    let parsed = parse_session("10min @ 80%CS\n1km @ 105%CS", &ParseContext { sport: Sport::Running, base: 4.0 });
    let session = simulate(&parsed.descriptors, &m, Sport::Running, &opts).unwrap();
    assert_eq!(session.summary.total_work_kj, None);
    assert_eq!(session.summary.work_above_capacity_kj, None);
    assert!(session.summary.r#if.unwrap() < 1.0);
}

#[test]
fn nothing_to_simulate_vs_empty_session() {
    let m = model();
    let ctx = ParseContext { sport: Sport::Cycling, base: m.capacity };
    let cfg = EngineConfig::default();

    let err = generate_session("just some notes", &ctx, &m, &cfg).unwrap_err();
    assert_eq!(err, CoreError::NothingToSimulate);

    let err = generate_session("Only a label >>", &ctx, &m, &cfg).unwrap_err();
    assert_eq!(err, CoreError::NothingToSimulate);

    let err = generate_session("0min @ 100%\n0sec @ 200w", &ctx, &m, &cfg).unwrap_err();
    assert_eq!(err, CoreError::EmptySession);
}

#[test]
fn missing_model_rejected_before_parsing() {
    let ctx = ParseContext { sport: Sport::Cycling, base: 250.0 };
    let cfg = EngineConfig::default();
    for m in [FittedModel::new(0.0, 20000.0), FittedModel::new(250.0, 0.0), FittedModel::new(f64::NAN, 1.0)] {
        let err = generate_session("garbage only", &ctx, &m, &cfg).unwrap_err();
        assert!(matches!(err, CoreError::MissingModel(_)), "{err:?}");
    }
}

#[test]
fn regeneration_is_identical() {
    let m = model();
    let ctx = ParseContext { sport: Sport::Cycling, base: m.capacity };
    let cfg = EngineConfig::default();
    let text = "4x(3min @ 115%, 3min @ 50%)";
    let a = generate_session(text, &ctx, &m, &cfg).unwrap();
    let b = generate_session(text, &ctx, &m, &cfg).unwrap();
    assert_eq!(a, b);
}

#[test]
fn sessions_over_a_week_are_rejected() {
    let m = model();
    let ctx = ParseContext { sport: Sport::Cycling, base: m.capacity };
    // Hver linje er under grensen, summen er over (2 × 100 t)
    let err = generate_session("6000min @ 50%\n6000min @ 50%", &ctx, &m, &EngineConfig::default()).unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)), "{err:?}");
}
