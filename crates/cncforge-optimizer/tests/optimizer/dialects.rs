use cncforge_core::Controller;
use cncforge_optimizer::{optimize, OptimizationOptions, Preset};

const CONTOUR: &str = "G90 G17 G21
T2 M6
S6000 M3
G0 X0 Y0 Z5
G1 Z-2 F250
G1 X20 Y0
G1 X20 Y20
G2 X0 Y20 R10
G81 X10 Y10 Z-8 R2 F120
X15
G80
G0 Z5
M30";

#[test]
fn test_fanuc_quality_branch() {
    let options = OptimizationOptions::preset(Preset::Quality, Controller::Fanuc);
    let result = optimize(CONTOUR, "fanuc", &options).unwrap();
    let lines: Vec<&str> = result.optimized_code.lines().collect();

    assert!(result.validation.is_valid, "{:?}", result.validation.errors);
    assert_eq!(lines.iter().filter(|l| l.starts_with("G05.1 Q1")).count(), 1);
    assert_eq!(lines.iter().filter(|l| l.starts_with("G05.1 Q0")).count(), 1);
    assert!(lines.contains(&"G1 Z-2. F250. ,R0.1"));
    assert!(lines.contains(&"G1 X20. Y0. ,R0.1"));
    assert!(lines.contains(&"G2 X0. Y20. R10."));
}

#[test]
fn test_fanuc_advanced_is_compact() {
    let options = OptimizationOptions::preset(Preset::Advanced, Controller::Fanuc);
    let result = optimize(CONTOUR, "fanuc", &options).unwrap();

    assert!(result.validation.is_valid, "{:?}", result.validation.errors);
    assert!(result.optimized_code.lines().all(|l| !l.contains(' ')));
    assert!(result.optimized_code.contains("G5.1Q3"));
    assert!(result.optimized_code.contains("G5.1Q0"));
}

#[test]
fn test_heidenhain_conversational_with_cycles() {
    let options = OptimizationOptions::preset(Preset::Advanced, Controller::Heidenhain);
    let result = optimize(CONTOUR, "heidenhain", &options).unwrap();
    let lines: Vec<&str> = result.optimized_code.lines().collect();

    assert_eq!(lines[0], "0 BEGIN PGM CNCFORGE MM");
    assert_eq!(*lines.last().unwrap(), format!("{} END PGM CNCFORGE MM", lines.len() - 1));
    assert!(lines.contains(&"1 TOOL CALL 2 Z"));
    assert_eq!(lines.iter().filter(|l| l.contains("CYCL DEF 200 DRILLING")).count(), 1);
    assert_eq!(lines.iter().filter(|l| l.ends_with("FMAX M99")).count(), 2);
    assert!(lines.iter().any(|l| l.contains("CR X+0 Y+20 R+10 DR-")));

    // validation ran on the ISO text before conversion
    assert!(result.validation.is_valid);
    assert!(result.validation.warnings.is_empty());
}

#[test]
fn test_heidenhain_input_passes_through() {
    let source = "0 BEGIN PGM PART MM\n1 L X+10 R0 FMAX\n2 END PGM PART MM";
    let options = OptimizationOptions::preset(Preset::Speed, Controller::Heidenhain);
    let result = optimize(source, "heidenhain", &options).unwrap();

    assert_eq!(result.optimized_code, source);
    assert!(result.improvements.is_empty());
    assert_eq!(result.stats.reduction_percent, 0.0);
    assert_eq!(result.validation.warnings.len(), 1);
}

#[test]
fn test_other_controllers_use_generic_rules_only() {
    let options = OptimizationOptions::preset(Preset::Advanced, Controller::Okuma);
    let result = optimize(CONTOUR, "okuma", &options).unwrap();
    assert!(!result.optimized_code.contains("G05.1"));
    assert!(!result.optimized_code.contains("BEGIN PGM"));
    assert!(result.validation.is_valid);
}
