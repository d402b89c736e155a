//! Optimization entry points

use cncforge_core::{Controller, ProgramError, Result};
use cncforge_toolpath::has_executable_lines;

use crate::options::OptimizationOptions;
use crate::pipeline::RulePipeline;
use crate::result::OptimizationResult;
use crate::rules::heidenhain::is_conversational;
use crate::stats::OptimizationStats;
use crate::validation::{validate_program, ValidationReport};

/// Runs a rule pipeline over programs
///
/// Holds no per-program state; one optimizer can serve any number of runs.
pub struct Optimizer {
    pipeline: RulePipeline,
}

impl Optimizer {
    /// Optimizer with the standard rule set
    pub fn new() -> Self {
        Self {
            pipeline: RulePipeline::standard(),
        }
    }

    pub fn with_pipeline(pipeline: RulePipeline) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &RulePipeline {
        &self.pipeline
    }

    /// Optimize `source` for `controller`
    ///
    /// Fails only on contract errors: an empty program, or options whose
    /// controller-specific flags do not fit `controller`.
    pub fn run(
        &self,
        source: &str,
        controller: Controller,
        options: &OptimizationOptions,
    ) -> Result<OptimizationResult> {
        let options = options.retarget(controller)?;
        if source.trim().is_empty() {
            return Err(ProgramError::Empty.into());
        }

        let lines: Vec<String> = source.lines().map(String::from).collect();
        if options.is_heidenhain() && is_conversational(&lines) {
            tracing::debug!("Program is already conversational, passing through");
            let validation = if options.safety_check() {
                ValidationReport::skipped("conversational program was not re-validated")
            } else {
                ValidationReport::passed()
            };
            return Ok(OptimizationResult {
                optimized_code: source.to_string(),
                stats: OptimizationStats::compute(source, source, &lines),
                validation,
                improvements: Vec::new(),
            });
        }
        if !has_executable_lines(source) {
            return Err(ProgramError::Empty.into());
        }

        let output = self.pipeline.run(lines, &options);
        let optimized_code = output.lines.join("\n");
        let iso_text = output.iso_lines.join("\n");
        let stats = OptimizationStats::compute(source, &optimized_code, &output.iso_lines);
        let validation = validate_program(&iso_text, &options);

        tracing::debug!(
            "Optimized for {}: {} -> {} line(s), {} improvement(s), valid: {}",
            controller,
            stats.original_lines,
            stats.optimized_lines,
            output.improvements.len(),
            validation.is_valid
        );

        Ok(OptimizationResult {
            optimized_code,
            stats,
            validation,
            improvements: output.improvements,
        })
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Optimize `source` for the controller named by `controller`
///
/// The identifier is matched case-insensitively against the accepted set;
/// anything else is an `UnknownController` error.
pub fn optimize(
    source: &str,
    controller: &str,
    options: &OptimizationOptions,
) -> Result<OptimizationResult> {
    let controller: Controller = controller.parse()?;
    optimize_for(source, controller, options)
}

/// Optimize `source` for an already parsed controller
pub fn optimize_for(
    source: &str,
    controller: Controller,
    options: &OptimizationOptions,
) -> Result<OptimizationResult> {
    Optimizer::new().run(source, controller, options)
}
