//! Post-optimization safety check
//!
//! Re-resolves the rewritten ISO text through the toolpath engine and checks
//! every waypoint against the machine envelope and the feed ceiling.

use cncforge_toolpath::ToolpathStream;
use serde::{Deserialize, Serialize};

use crate::options::OptimizationOptions;

/// Outcome of the safety check
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// False when any error was found
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// A report with nothing to say
    pub fn passed() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// A passed report carrying one warning
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            warnings: vec![reason.into()],
            ..Self::passed()
        }
    }
}

/// Consecutive points of one line report an issue once
fn push_once(list: &mut Vec<String>, message: String) {
    if list.last() != Some(&message) {
        list.push(message);
    }
}

/// Check an ISO program against the envelope and feed limits in `options`
///
/// Returns a passed report without looking at the text when the safety
/// check is turned off.
pub fn validate_program(text: &str, options: &OptimizationOptions) -> ValidationReport {
    if !options.safety_check() {
        return ValidationReport::passed();
    }
    let Ok(mut stream) = ToolpathStream::new(text, *options.toolpath()) else {
        return ValidationReport::skipped("nothing to validate: program has no executable lines");
    };

    let envelope = options.envelope();
    let limits = options.feed_limits();
    let controller = options.controller();
    let mut report = ValidationReport::passed();
    let mut points = 0usize;

    for point in stream.by_ref() {
        points += 1;
        let violations = envelope.violations(point.position());
        if !violations.is_empty() {
            let axes: String = violations.iter().collect();
            push_once(
                &mut report.errors,
                format!("line {}: move outside the machine envelope on {}", point.line, axes),
            );
        }

        match point.feed {
            Some(feed) if feed < 0.0 => push_once(
                &mut report.errors,
                format!("line {}: negative feed rate {}", point.line, feed),
            ),
            Some(feed) if !point.is_rapid && feed > limits.max => push_once(
                &mut report.errors,
                format!(
                    "line {}: feed rate {} exceeds the {} ceiling of {}",
                    point.line, feed, controller, limits.max
                ),
            ),
            None if point.is_feed_move() => push_once(
                &mut report.warnings,
                format!("line {}: feed move without an active feed rate", point.line),
            ),
            _ => {}
        }
    }

    report
        .warnings
        .extend(stream.into_warnings().iter().map(ToString::to_string));
    report.is_valid = report.errors.is_empty();

    tracing::debug!(
        "Validated {} point(s): {} error(s), {} warning(s)",
        points,
        report.errors.len(),
        report.warnings.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::Preset;
    use cncforge_core::{Controller, Envelope};

    fn basic() -> OptimizationOptions {
        OptimizationOptions::preset(Preset::Basic, Controller::Fanuc)
    }

    #[test]
    fn test_clean_program_passes() {
        let report = validate_program("G0 X0 Y0 Z5\nG1 Z-5 F100\nG1 X10", &basic());
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_envelope_violation_is_error() {
        let options = OptimizationOptions::builder(Controller::Generic)
            .envelope(Envelope::new([0.0, 0.0, -10.0], [100.0, 100.0, 50.0]))
            .build()
            .unwrap();
        let report = validate_program("G0 X50 Y50\nG0 X150 Y-5", &options);
        assert!(!report.is_valid);
        assert_eq!(report.errors, vec!["line 2: move outside the machine envelope on XY"]);
    }

    #[test]
    fn test_feed_errors() {
        let report = validate_program("G1 X1 F-5\nG1 X2 F20000", &basic());
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].contains("negative feed rate"));
        assert!(report.errors[1].contains("exceeds the Fanuc ceiling of 15000"));
    }

    #[test]
    fn test_feed_at_ceiling_passes() {
        let report = validate_program("G1 X1 F15000\nG1 X2 F15000.001", &basic());
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("line 2:"));
    }

    #[test]
    fn test_missing_feed_is_warning() {
        let report = validate_program("G1 X10\nG1 X20", &basic());
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_check_disabled() {
        let options = OptimizationOptions::builder(Controller::Generic)
            .safety_check(false)
            .build()
            .unwrap();
        assert_eq!(validate_program("G0 X5000", &options), ValidationReport::passed());
    }
}
