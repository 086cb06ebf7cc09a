// core/src/report.rs
use std::fmt::Write as _;

use crate::timefmt::{format_pace, format_time, pace_from_speed};
use crate::types::{FitReport, SessionSummary, Sport};

fn opt(v: Option<f64>, dp: usize) -> String {
    v.map_or_else(|| "-".to_string(), |x| format!("{x:.dp$}"))
}

pub fn render_session_report(fit: &FitReport, summary: &SessionSummary) -> String {
    let mut out = String::new();
    let m = &fit.model;
    match fit.sport {
        Sport::Cycling => {
            out.push_str("--- Power Report ---\n");
            if let Some(ftp) = fit.thresholds.ftp {
                let _ = writeln!(out, "FTP: {ftp:.1} W");
            }
            let _ = writeln!(out, "CP: {:.1} W", m.capacity);
            let _ = writeln!(out, "W': {:.1} kJ", m.reserve / 1000.0);
            if let Some(tau) = m.time_constant {
                let _ = writeln!(out, "tau: {tau:.1} s");
            }
            let _ = writeln!(out, "Duration: {}", format_time(f64::from(summary.duration_s)));
            let _ = writeln!(out, "Avg power: {:.1} W", summary.average);
            let _ = writeln!(out, "NP: {:.1} W", summary.normalized);
            let _ = writeln!(out, "Work: {} kJ", opt(summary.total_work_kj, 1));
            let _ = writeln!(out, "Work above CP: {} kJ", opt(summary.work_above_capacity_kj, 1));
        }
        Sport::Running => {
            out.push_str("--- Run Report ---\n");
            let cs_pace = pace_from_speed(m.capacity).map_or_else(|| "-".into(), format_pace);
            let _ = writeln!(out, "CS: {:.2} m/s ({cs_pace})", m.capacity);
            let _ = writeln!(out, "D': {:.1} m", m.reserve);
            let _ = writeln!(out, "Duration: {}", format_time(f64::from(summary.duration_s)));
            let avg_pace = pace_from_speed(summary.average).map_or_else(|| "-".into(), format_pace);
            let _ = writeln!(out, "Avg speed: {:.2} m/s ({avg_pace})", summary.average);
            let _ = writeln!(out, "NS: {:.2} m/s", summary.normalized);
        }
    }
    let _ = writeln!(out, "VI: {}", opt(summary.vi, 2));
    let _ = writeln!(out, "IF: {}", opt(summary.r#if, 2));
    let _ = writeln!(out, "Load: {}", opt(summary.training_load, 0));
    out
}

pub fn print_session_report(fit: &FitReport, summary: &SessionSummary) {
    print!("{}", render_session_report(fit, summary));
}
