use cncforge_core::Controller;
use cncforge_optimizer::{optimize, OptimizationOptions, OptimizationResult, Preset};

const DRILL_PROGRAM: &str = "G90\nG0 X0 Y0 Z5\nG1 Z-5 F100\nG81 X20 Y20 Z-10 R0\nG0 Z5";

#[test]
fn test_fanuc_basic_program() {
    let options = OptimizationOptions::preset(Preset::Basic, Controller::Fanuc);
    let result = optimize(DRILL_PROGRAM, "fanuc", &options).unwrap();

    assert!(result.stats.optimized_lines <= result.stats.original_lines);
    assert!(result.validation.is_valid, "{:?}", result.validation.errors);
    assert!(result.validation.errors.is_empty());
    assert_eq!(result.stats.original_lines, 5);
}

#[test]
fn test_controller_identifier_is_case_insensitive() {
    let options = OptimizationOptions::preset(Preset::Basic, Controller::Fanuc);
    assert!(optimize(DRILL_PROGRAM, "FANUC", &options).is_ok());
}

#[test]
fn test_redundant_program_is_reduced() {
    let source = "G90\nG90\nG0 X10 Y10\nG0 X10 Y10\n\nG1 X20 F200\nG1 X30 F200";
    let options = OptimizationOptions::preset(Preset::Speed, Controller::Generic);
    let result = optimize(source, "generic", &options).unwrap();

    assert_eq!(result.optimized_code, "G90\nG0 X10 Y10\nG1 X20 F200\nG1 X30");
    assert!(result.stats.reduction_percent > 0.0);
    assert!(result.stats.estimated_time_reduction > 0.0);
    assert!(!result.improvements.is_empty());
}

#[test]
fn test_rapid_chain_collapses() {
    let source = "G0 X0 Y0\nG0 X10 Y0\nG0 X20 Y0\nG0 X30 Y0\nG1 X40 F100";
    let options = OptimizationOptions::preset(Preset::Speed, Controller::Siemens);
    let result = optimize(source, "siemens", &options).unwrap();
    assert_eq!(result.optimized_code, "G0 X30 Y0\nG1 X40 F100");
}

#[test]
fn test_envelope_breach_reported() {
    let options = OptimizationOptions::preset(Preset::Basic, Controller::Haas);
    let result = optimize("G0 X5 Y0\nG0 X2000 Y0", "haas", &options).unwrap();

    assert!(!result.validation.is_valid);
    assert_eq!(result.validation.errors.len(), 1);
    assert!(result.validation.errors[0].starts_with("line 2:"));
}

#[test]
fn test_parse_warnings_surface_in_validation() {
    let options = OptimizationOptions::preset(Preset::Basic, Controller::Generic);
    let result = optimize("G0 X0 Y0\nG2 X10 Y0 F100", "generic", &options).unwrap();
    assert!(result.validation.is_valid);
    assert!(result
        .validation
        .warnings
        .iter()
        .any(|w| w.contains("without center offsets or radius")));
}

#[test]
fn test_result_serializes_camel_case() {
    let options = OptimizationOptions::preset(Preset::Basic, Controller::Fanuc);
    let result = optimize(DRILL_PROGRAM, "fanuc", &options).unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert!(json.get("optimizedCode").is_some());
    assert!(json["stats"].get("reductionPercent").is_some());
    assert!(json["stats"].get("estimatedTimeReduction").is_some());
    assert_eq!(json["validation"]["isValid"], serde_json::json!(true));

    let back: OptimizationResult = serde_json::from_value(json).unwrap();
    assert_eq!(back, result);
}
