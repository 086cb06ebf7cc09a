/// "MM:SS" eller "HH:MM:SS" → sekunder. Alt annet gir `None`.
pub fn parse_time_input(val: &str) -> Option<f64> {
    let val = val.trim();
    if val.is_empty() {
        return None;
    }
    let parts: Vec<f64> = val
        .split(':')
        .map(|p| p.trim().parse::<f64>().ok().filter(|x| x.is_finite()))
        .collect::<Option<Vec<_>>>()?;
    match parts.as_slice() {
        [m, s] => Some(m * 60.0 + s),
        [h, m, s] => Some(h * 3600.0 + m * 60.0 + s),
        _ => None,
    }
}

fn min_sec(sec: f64) -> Option<(u64, u64)> {
    if !sec.is_finite() || sec < 0.0 {
        return None;
    }
    // Rund av først så 59.6s ikke blir "0:60"
    let total = sec.round() as u64;
    Some((total / 60, total % 60))
}

/// Sekunder → "M:SS".
pub fn format_time(sec: f64) -> String {
    match min_sec(sec) {
        Some((m, s)) => format!("{m}:{s:02}"),
        None => "--:--".to_string(),
    }
}

/// Sek per km → "M:SS/km".
pub fn format_pace(sec_per_km: f64) -> String {
    format!("{}/km", format_time(sec_per_km))
}

/// Fart (m/s) → tempo i sek per km.
pub fn pace_from_speed(speed_ms: f64) -> Option<f64> {
    if speed_ms > 0.0 && speed_ms.is_finite() {
        Some(1000.0 / speed_ms)
    } else {
        None
    }
}
