//! Optimization result

use serde::{Deserialize, Serialize};

use crate::stats::OptimizationStats;
use crate::validation::ValidationReport;

/// Everything one optimization run produced
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub optimized_code: String,
    pub stats: OptimizationStats,
    pub validation: ValidationReport,
    /// One entry per rule that changed the program; empty when already optimal
    pub improvements: Vec<String>,
}

impl OptimizationResult {
    pub fn is_already_optimal(&self) -> bool {
        self.improvements.is_empty()
    }
}
