// core/src/simulate.rs
use crate::config::EngineConfig;
use crate::error::{CoreError, Result};
use crate::metrics::{
    intensity_factor, mean, rolling_fourth_power_mean, total_work_kj, training_load, variability_index,
    work_above_capacity_kj,
};
use crate::parser::{parse_session, ParseContext};
use crate::telemetry;
use crate::types::{
    FittedModel, IntervalDescriptor, RangeBand, SectionSpan, SessionSummary, SessionTrace, SimulatedSession,
    Sport, TraceSample, ZoneTime,
};
use crate::zones::{classify, zone_table};

/// Tidssteg i simuleringen (sek).
pub const DT_S: f64 = 1.0;

/// Lengste økt som simuleres (7 døgn).
pub const MAX_SESSION_S: u64 = 7 * 24 * 3600;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationOptions {
    /// Skalering av restitusjonsleddet (1.0 sykkel, 0.5 løp som standard).
    pub recovery_scale: f64,
    pub rolling_window: usize,
}

impl SimulationOptions {
    pub fn for_sport(sport: Sport, cfg: &EngineConfig) -> Self {
        Self {
            recovery_scale: cfg.recovery.scale_for(sport),
            rolling_window: cfg.rolling_window,
        }
    }
}

/// W′bal / D′bal-tilstand.
///
/// Over kapasitet tømmes reserven med (I − C)·dt. Ved eller under kapasitet
/// fylles den med (C − I)·dt·(1 − bal/reserve)·skala. Restitusjonsleddet er
/// en heuristikk, ikke den differensielle W′bal-modellen fra litteraturen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReserveBalance {
    capacity: f64,
    reserve: f64,
    recovery_scale: f64,
    balance: f64,
}

impl ReserveBalance {
    pub fn new(model: &FittedModel, recovery_scale: f64) -> Self {
        Self {
            capacity: model.capacity,
            reserve: model.reserve,
            recovery_scale,
            balance: model.reserve,
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Ett tidssteg; returnerer ny balanse, klemt til [0, reserve].
    pub fn step(&mut self, intensity: f64, dt: f64) -> f64 {
        if intensity > self.capacity {
            self.balance -= (intensity - self.capacity) * dt;
        } else {
            let headroom = 1.0 - self.balance / self.reserve;
            self.balance += (self.capacity - intensity) * dt * headroom * self.recovery_scale;
        }
        self.balance = self.balance.clamp(0.0, self.reserve);
        self.balance
    }
}

/// Simulerer en parset økt sekund for sekund.
pub fn simulate(
    descriptors: &[IntervalDescriptor],
    model: &FittedModel,
    sport: Sport,
    opts: &SimulationOptions,
) -> Result<SimulatedSession> {
    model.check_simulatable()?;
    if !descriptors.iter().any(IntervalDescriptor::is_effort) {
        return Err(CoreError::NothingToSimulate);
    }
    let total: u64 = descriptors.iter().map(|d| u64::from(d.duration_s())).sum();
    if total == 0 {
        return Err(CoreError::EmptySession);
    }
    if total > MAX_SESSION_S {
        return Err(CoreError::InvalidInput(format!(
            "session lasts {total} s, limit is {MAX_SESSION_S} s"
        )));
    }

    let mut state = ReserveBalance::new(model, opts.recovery_scale);
    let mut samples = Vec::with_capacity(total as usize);
    let mut section_starts: Vec<(String, u32)> = Vec::new();
    let mut bands = Vec::new();
    let mut elapsed = 0u32;

    for d in descriptors {
        let intensity = match d {
            IntervalDescriptor::Section { label, .. } => {
                // Posisjonen i sporet, ikke parserens offset, er fasit her
                section_starts.push((label.clone(), elapsed));
                continue;
            }
            IntervalDescriptor::Steady { intensity, .. } => *intensity,
            IntervalDescriptor::Ranged { duration_s, low, high } => {
                bands.push(RangeBand {
                    start_s: elapsed,
                    end_s: elapsed + duration_s,
                    low: *low,
                    high: *high,
                });
                (low + high) / 2.0
            }
        };
        for _ in 0..d.duration_s() {
            elapsed += 1;
            let reserve_balance = state.step(intensity, DT_S);
            samples.push(TraceSample { time_s: elapsed, intensity, reserve_balance });
        }
    }

    let sections = section_spans(section_starts, elapsed);
    let trace = SessionTrace { sport, samples, sections, bands };
    let summary = summarize(&trace, model, opts.rolling_window);
    let zone_time = time_in_zones(&trace, model.capacity);

    telemetry::sessions_simulated_total().inc();
    log::info!(
        "{sport:?} session simulated: {} s, avg={:.2} norm={:.2} min_bal={:.1}",
        summary.duration_s,
        summary.average,
        summary.normalized,
        summary.min_reserve_balance
    );

    Ok(SimulatedSession { trace, summary, zone_time })
}

fn section_spans(starts: Vec<(String, u32)>, end: u32) -> Vec<SectionSpan> {
    let next_starts: Vec<u32> = starts.iter().skip(1).map(|(_, s)| *s).chain([end]).collect();
    starts
        .into_iter()
        .zip(next_starts)
        .map(|((label, start_s), end_s)| SectionSpan { label, start_s, end_s })
        .collect()
}

/// Øktstatistikk fra intensitetssporet.
pub fn summarize(trace: &SessionTrace, model: &FittedModel, window: usize) -> SessionSummary {
    let xs = trace.intensities();
    let duration_s = trace.duration_s();
    let average = mean(&xs);
    let normalized = rolling_fourth_power_mean(&xs, window);
    let r_if = intensity_factor(normalized, model.capacity);

    let (total_work_kj, work_above_capacity_kj) = match trace.sport {
        Sport::Cycling => (
            Some(total_work_kj(&xs, DT_S)),
            Some(work_above_capacity_kj(&xs, model.capacity, DT_S)),
        ),
        Sport::Running => (None, None),
    };

    SessionSummary {
        duration_s,
        average,
        normalized,
        vi: variability_index(normalized, average),
        r#if: r_if,
        training_load: training_load(normalized, r_if, f64::from(duration_s), model.capacity),
        total_work_kj,
        work_above_capacity_kj,
        min_reserve_balance: trace
            .samples
            .iter()
            .map(|s| s.reserve_balance)
            .fold(model.reserve, f64::min),
    }
}

/// Sekunder per sone, i tabellrekkefølge.
pub fn time_in_zones(trace: &SessionTrace, capacity: f64) -> Vec<ZoneTime> {
    let table = zone_table(trace.sport);
    let mut counts = vec![0u32; table.len()];
    for s in &trace.samples {
        if let Some(z) = classify(s.intensity, capacity, table) {
            if let Some(i) = table.iter().position(|t| t.name == z.name) {
                counts[i] += 1;
            }
        }
    }
    table
        .iter()
        .zip(counts)
        .map(|(z, seconds)| ZoneTime { zone: z.name.to_string(), seconds })
        .collect()
}

/// Parse + simuler. Modellen sjekkes før teksten røres.
pub fn generate_session(
    text: &str,
    ctx: &ParseContext,
    model: &FittedModel,
    cfg: &EngineConfig,
) -> Result<SimulatedSession> {
    model.check_simulatable()?;
    let parsed = parse_session(text, ctx);
    if parsed.descriptors.is_empty() {
        return Err(CoreError::NothingToSimulate);
    }
    simulate(&parsed.descriptors, model, ctx.sport, &SimulationOptions::for_sport(ctx.sport, cfg))
}
