// core/src/export.rs
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::error::{CoreError, Result};
use crate::types::{IntervalDescriptor, Sport};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZwoOptions {
    pub author: String,
    pub name: String,
    pub description: String,
}

impl Default for ZwoOptions {
    fn default() -> Self {
        Self {
            author: "Conditioning Planner".to_string(),
            name: "Workout".to_string(),
            description: "Generated from CP/FTP tool".to_string(),
        }
    }
}

/// Ett eksportert steg: varighet og intensitet som brøk av referansen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkoutStep {
    pub duration_s: u32,
    pub fraction: f64,
}

/// Innsatser med positiv varighet og intensitet; bånd på midtpunktet.
pub fn workout_steps(descriptors: &[IntervalDescriptor], reference: f64) -> Result<Vec<WorkoutStep>> {
    if !(reference.is_finite() && reference > 0.0) {
        return Err(CoreError::MissingModel(format!(
            "export reference must be positive, got {reference}"
        )));
    }
    let steps: Vec<WorkoutStep> = descriptors
        .iter()
        .filter_map(|d| {
            let intensity = d.effort_intensity()?;
            let duration_s = d.duration_s();
            (duration_s > 0 && intensity > 0.0).then_some(WorkoutStep {
                duration_s,
                fraction: intensity / reference,
            })
        })
        .collect();
    if steps.is_empty() {
        return Err(CoreError::NothingToSimulate);
    }
    Ok(steps)
}

fn text_element<W: Write>(w: &mut Writer<W>, name: &str, text: &str) -> quick_xml::Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    // BytesText::new escaper teksten
    w.write_event(Event::Text(BytesText::new(text)))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Zwift .zwo (XML).
pub fn to_zwo(
    descriptors: &[IntervalDescriptor],
    reference: f64,
    sport: Sport,
    opts: &ZwoOptions,
) -> Result<String> {
    let steps = workout_steps(descriptors, reference)?;
    let sport_type = match sport {
        Sport::Cycling => "bike",
        Sport::Running => "run",
    };

    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    w.write_event(Event::Start(BytesStart::new("workout_file")))?;
    text_element(&mut w, "author", &opts.author)?;
    text_element(&mut w, "name", &opts.name)?;
    text_element(&mut w, "description", &opts.description)?;
    text_element(&mut w, "sportType", sport_type)?;

    w.write_event(Event::Start(BytesStart::new("tags")))?;
    let mut tag = BytesStart::new("tag");
    tag.push_attribute(("name", "Custom"));
    w.write_event(Event::Empty(tag))?;
    w.write_event(Event::End(BytesEnd::new("tags")))?;

    w.write_event(Event::Start(BytesStart::new("workout")))?;
    for s in &steps {
        let duration = s.duration_s.to_string();
        let power = format!("{:.2}", s.fraction);
        let mut step = BytesStart::new("SteadyState");
        step.push_attribute(("Duration", duration.as_str()));
        step.push_attribute(("Power", power.as_str()));
        w.write_event(Event::Empty(step))?;
    }
    w.write_event(Event::End(BytesEnd::new("workout")))?;
    w.write_event(Event::End(BytesEnd::new("workout_file")))?;

    let xml = String::from_utf8(w.into_inner()).map_err(|e| CoreError::Export(e.to_string()))?;
    log::debug!("zwo export: {} steps", steps.len());
    Ok(xml)
}
