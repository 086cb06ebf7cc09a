/// Standard vindu for normalisert intensitet (sek ved 1 Hz).
pub const NP_WINDOW: usize = 30;

/// Aritmetisk snitt; 0.0 for tom input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Normalisert intensitet:
/// 1) rullende snitt over `window` samples (steg 1)
/// 2) ^4-middel
/// 3) fjerderot
///
/// Kortere serier enn vinduet gir vanlig snitt.
pub fn rolling_fourth_power_mean(values: &[f64], window: usize) -> f64 {
    if window == 0 || values.len() < window {
        return mean(values);
    }
    let fourth: Vec<f64> = values.windows(window).map(|w| mean(w).powi(4)).collect();
    mean(&fourth).powf(0.25)
}

/// NP (sykkel) med standard 30s-vindu.
pub fn normalized_power(power: &[f64]) -> f64 {
    rolling_fourth_power_mean(power, NP_WINDOW)
}

/// Normalisert fart (løp), samme transform som NP.
pub fn normalized_speed(speed: &[f64]) -> f64 {
    rolling_fourth_power_mean(speed, NP_WINDOW)
}

/// VI = normalisert / snitt
pub fn variability_index(normalized: f64, average: f64) -> Option<f64> {
    if average > 0.0 && normalized.is_finite() {
        Some(normalized / average)
    } else {
        None
    }
}

/// IF = normalisert / kapasitet (CP eller CS)
pub fn intensity_factor(normalized: f64, capacity: f64) -> Option<f64> {
    if capacity > 0.0 && normalized.is_finite() {
        Some(normalized / capacity)
    } else {
        None
    }
}

/// Treningsbelastning = varighet·NP·IF / (kapasitet·3600) · 100
pub fn training_load(normalized: f64, r_if: Option<f64>, duration_s: f64, capacity: f64) -> Option<f64> {
    match r_if {
        Some(ifv) if capacity > 0.0 => Some(duration_s * normalized * ifv / (capacity * 3600.0) * 100.0),
        _ => None,
    }
}

/// Totalt arbeid i kJ, `dt` sek per sample.
pub fn total_work_kj(power: &[f64], dt: f64) -> f64 {
    power.iter().map(|p| p * dt).sum::<f64>() / 1000.0
}

/// Arbeid over CP i kJ.
pub fn work_above_capacity_kj(power: &[f64], capacity: f64, dt: f64) -> f64 {
    power.iter().map(|p| (p - capacity).max(0.0) * dt).sum::<f64>() / 1000.0
}
