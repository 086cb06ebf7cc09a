use conditioning_core::export::{to_zwo, workout_steps, ZwoOptions};
use conditioning_core::{parse_session, CoreError, IntervalDescriptor, ParseContext, Sport};

#[test]
fn zwo_has_one_step_per_effort() {
    let parsed = parse_session(
        "Warm up >>\n10min @ 50%\n2x(1min @ 120%, 1min @ 60%)\n5min @ 180-220w",
        &ParseContext { sport: Sport::Cycling, base: 200.0 },
    );
    let opts = ZwoOptions { name: "Over/unders & more".into(), ..Default::default() };
    let xml = to_zwo(&parsed.descriptors, 200.0, Sport::Cycling, &opts).unwrap();

    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains("<name>Over/unders &amp; more</name>"));
    assert!(xml.contains("<sportType>bike</sportType>"));
    assert_eq!(xml.matches("<SteadyState").count(), 6);
    assert!(xml.contains("<SteadyState Duration=\"600\" Power=\"0.50\"/>"));
    assert!(xml.contains("<SteadyState Duration=\"60\" Power=\"1.20\"/>"));
    // bånd eksporteres på midtpunktet
    assert!(xml.contains("<SteadyState Duration=\"300\" Power=\"1.00\"/>"));
}

#[test]
fn zero_steps_are_dropped() {
    let d = [
        IntervalDescriptor::Steady { duration_s: 0, intensity: 200.0 },
        IntervalDescriptor::Steady { duration_s: 60, intensity: 0.0 },
        IntervalDescriptor::Steady { duration_s: 60, intensity: 150.0 },
    ];
    let steps = workout_steps(&d, 300.0).unwrap();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].fraction, 0.5);
}

#[test]
fn nothing_to_export() {
    let d = [IntervalDescriptor::Section { label: "x".into(), start_offset_s: 0 }];
    assert_eq!(to_zwo(&d, 250.0, Sport::Cycling, &ZwoOptions::default()).unwrap_err(), CoreError::NothingToSimulate);
    assert!(matches!(workout_steps(&d, 0.0), Err(CoreError::MissingModel(_))));
}

#[test]
fn header_text_is_escaped_and_tagged() {
    let d = [IntervalDescriptor::Steady { duration_s: 300, intensity: 250.0 }];
    let opts = ZwoOptions {
        author: "Coach <B>".into(),
        description: "Hold \"steady\"".into(),
        ..Default::default()
    };
    let xml = to_zwo(&d, 250.0, Sport::Running, &opts).unwrap();
    assert!(xml.contains("<author>Coach &lt;B&gt;</author>"));
    assert!(!xml.contains("<B>"));
    assert!(xml.contains("<sportType>run</sportType>"));
    assert!(xml.contains("<tag name=\"Custom\"/>"));
    assert!(xml.contains("<SteadyState Duration=\"300\" Power=\"1.00\"/>"));
    assert!(xml.trim_end().ends_with("</workout_file>"));
}
