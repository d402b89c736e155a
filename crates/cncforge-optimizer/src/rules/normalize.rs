//! Normalization: trim, drop empty lines, optionally strip comments

use cncforge_toolpath::split_comment;

use crate::options::OptimizationOptions;
use crate::pipeline::OptimizationRule;

pub struct NormalizeRule;

impl OptimizationRule for NormalizeRule {
    fn name(&self) -> &str {
        "normalize"
    }

    fn description(&self) -> &str {
        "Normalized whitespace and dropped empty lines"
    }

    fn is_enabled(&self, _options: &OptimizationOptions) -> bool {
        true
    }

    fn apply(&self, lines: &[String], options: &OptimizationOptions) -> Vec<String> {
        lines
            .iter()
            .filter_map(|line| {
                let trimmed = line.trim();
                let kept = if options.strip_comments() {
                    split_comment(trimmed).0
                } else {
                    trimmed.to_string()
                };
                (!kept.is_empty()).then_some(kept)
            })
            .collect()
    }

    fn summarize(&self, before: &[String], after: &[String]) -> String {
        if after.len() < before.len() {
            format!(
                "Removed {} empty or comment-only line(s)",
                before.len() - after.len()
            )
        } else {
            "Normalized whitespace and comments".to_string()
        }
    }
}
