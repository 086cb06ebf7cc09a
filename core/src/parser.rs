// core/src/parser.rs
//
// Linjebasert øktspråk (store/små bokstaver likegyldig):
//
//   Warm up >>                     seksjon
//   10min @ 55%                    % av basis (sykkel)
//   30sec @ 400w                   absolutt watt
//   5min @ 200-250w                wattbånd, simuleres på midtpunktet
//   4min @ 95-100%CS               % av CS, tidsbasert (løp)
//   1km @ 105%CS                   % av CS, distansebasert (løp)
//   3min @ 4:30/km                 absolutt tempo (løp)
//   3x(1min @ 120%, 1min @ 50%)    repetisjon, kan nøstes
//
// Ukjente linjer hoppes over; parsing feiler aldri. Linjer som ekspanderer
// over grensene hoppes over på samme måte.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::simulate::MAX_SESSION_S;
use crate::telemetry;
use crate::types::{IntervalDescriptor, Sport};

/// Øvre grense for repetisjoner i én blokk.
pub const MAX_REPEAT: u32 = 1000;

/// Maks nøstedybde for repetisjoner.
pub const MAX_REPEAT_DEPTH: u32 = 8;

/// Maks antall intervaller én linje kan ekspandere til.
pub const MAX_LINE_DESCRIPTORS: usize = 100_000;

macro_rules! re {
    ($name:ident, $pat:expr) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($pat).expect("valid session regex"));
    };
}

const DUR: &str = r"(?:(\d+)\s*min)?\s*(?:(\d+)\s*sec)?\s*";

re!(SECTION, r"(?i)(.+)\s*>>");
re!(REPEAT, r"(?i)(\d+)\s*x\s*\((.+)\)");
re!(CYCLE_PCT, &format!(r"(?i){DUR}@\s*(\d+(?:\.\d+)?)\s*%"));
re!(CYCLE_WATTS, &format!(r"(?i){DUR}@\s*(\d+(?:\.\d+)?)\s*w"));
re!(CYCLE_RANGE, &format!(r"(?i){DUR}@\s*(\d+(?:\.\d+)?)\s*-\s*(\d+(?:\.\d+)?)\s*w"));
re!(RUN_TIME_CS, &format!(r"(?i){DUR}@\s*(\d+(?:\.\d+)?)(?:\s*-\s*(\d+(?:\.\d+)?))?\s*%\s*CS"));
re!(RUN_DIST_CS, r"(?i)(\d+(?:\.\d+)?)\s*(km|m)\s*@\s*(\d+(?:\.\d+)?)(?:\s*-\s*(\d+(?:\.\d+)?))?\s*%\s*CS");
re!(RUN_PACE, &format!(r"(?i){DUR}@\s*(\d+):(\d{{1,2}})\s*/\s*km"));

/// Parser-kontekst: idrett og basisverdi for %-linjer
/// (CP eller FTP for sykkel, CS for løp).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParseContext {
    pub sport: Sport,
    pub base: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedSession {
    pub descriptors: Vec<IntervalDescriptor>,
    /// Linjer som ikke ga noe intervall (trimmet tekst).
    pub skipped: Vec<String>,
}

impl ParsedSession {
    pub fn total_duration_s(&self) -> u32 {
        self.descriptors.iter().map(|d| d.duration_s()).sum()
    }

    pub fn has_efforts(&self) -> bool {
        self.descriptors.iter().any(|d| d.is_effort())
    }
}

/// Parser hele økten til en flat, kronologisk sekvens.
pub fn parse_session(text: &str, ctx: &ParseContext) -> ParsedSession {
    let mut out = ParsedSession::default();
    let mut cursor = 0u32;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let mark = (out.descriptors.len(), cursor);
        let mut budget = LineBudget::default();
        let produced = match expand(line, ctx, 0, &mut budget, &mut cursor, &mut out.descriptors) {
            Ok(n) => n,
            Err(OverBudget) => {
                // Hele linjen forkastes, også det som rakk å ekspanderes
                out.descriptors.truncate(mark.0);
                cursor = mark.1;
                log::warn!("session line exceeds expansion limits: {line:?}");
                0
            }
        };
        if produced == 0 {
            log::warn!("skipping unparseable session line: {line:?}");
            telemetry::session_lines_skipped_total().inc();
            out.skipped.push(line.to_string());
        }
    }

    log::debug!(
        "parsed {} descriptors ({} s), skipped {} lines",
        out.descriptors.len(),
        cursor,
        out.skipped.len()
    );
    out
}

/// Linjen ekspanderer over grensene for dybde, antall eller varighet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OverBudget;

/// Løpende forbruk for én linje.
#[derive(Debug, Default)]
struct LineBudget {
    descriptors: usize,
    seconds: u64,
}

impl LineBudget {
    fn check(&self) -> Result<(), OverBudget> {
        if self.descriptors > MAX_LINE_DESCRIPTORS || self.seconds > MAX_SESSION_S {
            return Err(OverBudget);
        }
        Ok(())
    }

    fn charge(&mut self, duration_s: u32) -> Result<(), OverBudget> {
        self.descriptors += 1;
        self.seconds += u64::from(duration_s);
        self.check()
    }

    /// Etter første runde: avvis hvis de resterende rundene vil sprenge grensene.
    fn project(&self, start: (usize, u64), remaining: u32) -> Result<(), OverBudget> {
        let per_rep = (self.descriptors - start.0, self.seconds - start.1);
        let projected = LineBudget {
            descriptors: self
                .descriptors
                .saturating_add(per_rep.0.saturating_mul(remaining as usize)),
            seconds: self
                .seconds
                .saturating_add(per_rep.1.saturating_mul(u64::from(remaining))),
        };
        projected.check()
    }
}

/// Ekspanderer ett element (linje eller blokkdel) inn i `out`.
/// Returnerer antall produserte intervaller.
fn expand(
    item: &str,
    ctx: &ParseContext,
    depth: u32,
    budget: &mut LineBudget,
    cursor: &mut u32,
    out: &mut Vec<IntervalDescriptor>,
) -> Result<usize, OverBudget> {
    let item = item.trim();
    if item.is_empty() {
        return Ok(0);
    }

    if let Some(c) = REPEAT.captures(item) {
        if depth >= MAX_REPEAT_DEPTH {
            return Err(OverBudget);
        }
        let reps = match c[1].parse::<u32>() {
            Ok(n) if n <= MAX_REPEAT => n,
            _ => return Ok(0),
        };
        let blocks = split_top_level(&c[2]);
        let start = (budget.descriptors, budget.seconds);
        let mut produced = 0;
        for rep in 0..reps {
            for b in &blocks {
                produced += expand(b, ctx, depth + 1, budget, cursor, out)?;
            }
            if rep == 0 {
                if produced == 0 {
                    // Tom blokk gir ingenting ved neste runde heller
                    break;
                }
                budget.project(start, reps - 1)?;
            }
        }
        return Ok(produced);
    }

    if let Some(c) = SECTION.captures(item) {
        budget.charge(0)?;
        out.push(IntervalDescriptor::Section {
            label: c[1].trim().to_string(),
            start_offset_s: *cursor,
        });
        return Ok(1);
    }

    match parse_effort(item, ctx) {
        Some(d) => {
            budget.charge(d.duration_s())?;
            *cursor = cursor.saturating_add(d.duration_s());
            out.push(d);
            Ok(1)
        }
        None => Ok(0),
    }
}

/// Splitter på komma utenfor parenteser.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, ch) in s.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim());
    parts
}

/// Ett innsatsintervall (ikke seksjon, ikke repetisjon).
pub fn parse_effort(item: &str, ctx: &ParseContext) -> Option<IntervalDescriptor> {
    match ctx.sport {
        Sport::Cycling => parse_cycling(item, ctx.base),
        Sport::Running => parse_running(item, ctx.base),
    }
}

/// Varighet fra gruppe 1 (min) og 2 (sek). `None` hvis ingen av dem finnes.
fn duration(c: &Captures) -> Option<u32> {
    if c.get(1).is_none() && c.get(2).is_none() {
        return None;
    }
    let min: u32 = c.get(1).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
    let sec: u32 = c.get(2).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
    min.checked_mul(60)?.checked_add(sec)
}

fn num(c: &Captures, i: usize) -> Option<f64> {
    c.get(i)?.as_str().parse::<f64>().ok().filter(|x| x.is_finite())
}

/// Midtpunktet av `low[-high]` i prosent, som brøk.
fn mid_fraction(c: &Captures, lo: usize, hi: usize) -> Option<f64> {
    let low = num(c, lo)? / 100.0;
    let high = c.get(hi).map_or(Some(low), |_| num(c, hi).map(|h| h / 100.0))?;
    Some((low + high) / 2.0)
}

fn parse_cycling(item: &str, base: f64) -> Option<IntervalDescriptor> {
    if let Some(c) = CYCLE_PCT.captures(item) {
        if let (Some(duration_s), Some(pct)) = (duration(&c), num(&c, 3)) {
            if base.is_finite() && base > 0.0 {
                return Some(IntervalDescriptor::Steady { duration_s, intensity: base * (pct / 100.0) });
            }
        }
    }
    if let Some(c) = CYCLE_WATTS.captures(item) {
        if let (Some(duration_s), Some(intensity)) = (duration(&c), num(&c, 3)) {
            return Some(IntervalDescriptor::Steady { duration_s, intensity });
        }
    }
    if let Some(c) = CYCLE_RANGE.captures(item) {
        if let (Some(duration_s), Some(a), Some(b)) = (duration(&c), num(&c, 3), num(&c, 4)) {
            return Some(IntervalDescriptor::Ranged { duration_s, low: a.min(b), high: a.max(b) });
        }
    }
    None
}

fn parse_running(item: &str, cs: f64) -> Option<IntervalDescriptor> {
    let cs_ok = cs.is_finite() && cs > 0.0;

    if let Some(c) = RUN_TIME_CS.captures(item) {
        if let (Some(duration_s), Some(frac), true) = (duration(&c), mid_fraction(&c, 3, 4), cs_ok) {
            return Some(IntervalDescriptor::Steady { duration_s, intensity: cs * frac });
        }
    }
    if let Some(c) = RUN_DIST_CS.captures(item) {
        let unit = if c[2].eq_ignore_ascii_case("km") { 1000.0 } else { 1.0 };
        if let (Some(n), Some(frac), true) = (num(&c, 1), mid_fraction(&c, 3, 4), cs_ok) {
            let speed = cs * frac;
            if speed > 0.0 {
                // Hele sekunder: sporet er per sekund
                let secs = (n * unit / speed).ceil();
                if secs <= u32::MAX as f64 {
                    return Some(IntervalDescriptor::Steady { duration_s: secs as u32, intensity: speed });
                }
            }
        }
    }
    if let Some(c) = RUN_PACE.captures(item) {
        let pace_s = num(&c, 3)? * 60.0 + num(&c, 4)?;
        if let (Some(duration_s), true) = (duration(&c), pace_s > 0.0) {
            return Some(IntervalDescriptor::Steady { duration_s, intensity: 1000.0 / pace_s });
        }
    }
    None
}
