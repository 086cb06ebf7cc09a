// core/src/telemetry.rs
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

pub struct Telemetry {
    pub registry: Registry,
    fits_total: IntCounter,
    fits_rejected_total: IntCounter,
    sessions_simulated_total: IntCounter,
    session_lines_skipped_total: IntCounter,
}

fn counter(registry: &Registry, name: &str, help: &str) -> IntCounter {
    // Navn/hjelpetekst er statiske og gyldige; registrering feiler kun ved duplikat.
    let c = IntCounter::new(name, help).expect("valid counter opts");
    registry
        .register(Box::new(c.clone()))
        .expect("counter registered once");
    c
}

impl Telemetry {
    fn new() -> Self {
        let registry = Registry::new();
        Self {
            fits_total: counter(&registry, "conditioning_fits_total", "Completed model fits"),
            fits_rejected_total: counter(
                &registry,
                "conditioning_fits_rejected_total",
                "Model fits rejected as invalid or degenerate",
            ),
            sessions_simulated_total: counter(
                &registry,
                "conditioning_sessions_simulated_total",
                "Simulated sessions",
            ),
            session_lines_skipped_total: counter(
                &registry,
                "conditioning_session_lines_skipped_total",
                "Unparseable session lines skipped",
            ),
            registry,
        }
    }
}

static TELEMETRY: Lazy<Telemetry> = Lazy::new(Telemetry::new);

pub fn telemetry() -> &'static Telemetry {
    &TELEMETRY
}

pub fn fits_total() -> &'static IntCounter {
    &TELEMETRY.fits_total
}

pub fn fits_rejected_total() -> &'static IntCounter {
    &TELEMETRY.fits_rejected_total
}

pub fn sessions_simulated_total() -> &'static IntCounter {
    &TELEMETRY.sessions_simulated_total
}

pub fn session_lines_skipped_total() -> &'static IntCounter {
    &TELEMETRY.session_lines_skipped_total
}

/// Registeret i Prometheus tekstformat.
pub fn gather_text() -> String {
    let mut buf = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&TELEMETRY.registry.gather(), &mut buf) {
        log::warn!("telemetry encode failed: {e}");
        return String::new();
    }
    String::from_utf8(buf).unwrap_or_default()
}
