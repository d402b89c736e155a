//! Optimization rule pipeline

use std::sync::Arc;

use crate::options::OptimizationOptions;
use crate::rules;

/// Trait for program rewrite rules
///
/// A rule takes the whole program as lines and returns the rewritten lines.
/// Rules are applied in registration order; each one can be toggled through
/// the options.
pub trait OptimizationRule: Send + Sync {
    /// Short identifier
    fn name(&self) -> &str;

    /// What the rule does, used in the improvement audit trail
    fn description(&self) -> &str;

    /// Whether the options turn this rule on
    fn is_enabled(&self, options: &OptimizationOptions) -> bool;

    /// Rewrite the program
    fn apply(&self, lines: &[String], options: &OptimizationOptions) -> Vec<String>;

    /// Whether the output is still ISO words (false for conversational output)
    fn keeps_iso_form(&self) -> bool {
        true
    }

    /// Audit trail entry for a change this rule made
    fn summarize(&self, before: &[String], after: &[String]) -> String {
        if after.len() < before.len() {
            format!(
                "{}: removed {} line(s)",
                self.description(),
                before.len() - after.len()
            )
        } else {
            let changed = before
                .iter()
                .zip(after.iter())
                .filter(|(a, b)| a != b)
                .count();
            format!("{}: rewrote {} line(s)", self.description(), changed.max(1))
        }
    }
}

/// Arc-wrapped rule for sharing between optimizers
pub type RuleHandle = Arc<dyn OptimizationRule>;

/// What a pipeline run produced
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub lines: Vec<String>,
    /// Output of the last rule that kept ISO form
    pub iso_lines: Vec<String>,
    /// One entry per rule that changed the program
    pub improvements: Vec<String>,
}

/// Ordered set of rewrite rules
pub struct RulePipeline {
    rules: Vec<RuleHandle>,
}

impl RulePipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// The full rule set in its canonical order: normalize, redundancy,
    /// consolidation, feed/arc, then the controller branches
    pub fn standard() -> Self {
        let mut pipeline = Self::new();
        pipeline.register_all(vec![
            Arc::new(rules::normalize::NormalizeRule),
            Arc::new(rules::redundancy::RedundancyRule),
            Arc::new(rules::consolidation::RapidMergeRule),
            Arc::new(rules::consolidation::ModalMergeRule),
            Arc::new(rules::feed_arc::FeedRateRule),
            Arc::new(rules::feed_arc::ArcFitRule),
            Arc::new(rules::fanuc::CornerRoundingRule),
            Arc::new(rules::fanuc::SmoothingRule),
            Arc::new(rules::fanuc::FormatRule),
            Arc::new(rules::heidenhain::ConversationalRule),
        ]);
        pipeline
    }

    /// Register a rule; rules run in registration order
    pub fn register(&mut self, rule: RuleHandle) -> &mut Self {
        self.rules.push(rule);
        self
    }

    pub fn register_all(&mut self, rules: Vec<RuleHandle>) -> &mut Self {
        self.rules.extend(rules);
        self
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Name, description and enabled flag of every rule
    pub fn list_rules(&self, options: &OptimizationOptions) -> Vec<(&str, &str, bool)> {
        self.rules
            .iter()
            .map(|r| (r.name(), r.description(), r.is_enabled(options)))
            .collect()
    }

    /// Run every enabled rule over the program
    pub fn run(&self, lines: Vec<String>, options: &OptimizationOptions) -> PipelineOutput {
        let mut current = lines;
        let mut iso_lines: Option<Vec<String>> = None;
        let mut improvements = Vec::new();

        for rule in &self.rules {
            if !rule.is_enabled(options) {
                continue;
            }

            let next = rule.apply(&current, options);
            if next != current {
                tracing::debug!("Rule '{}' changed the program", rule.name());
                improvements.push(rule.summarize(&current, &next));
            }
            if !rule.keeps_iso_form() && iso_lines.is_none() {
                iso_lines = Some(current.clone());
            }
            current = next;
        }

        PipelineOutput {
            iso_lines: iso_lines.unwrap_or_else(|| current.clone()),
            lines: current,
            improvements,
        }
    }
}

impl Default for RulePipeline {
    fn default() -> Self {
        Self::standard()
    }
}
