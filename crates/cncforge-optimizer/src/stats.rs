//! Optimization statistics

use cncforge_core::constants::NOMINAL_BLOCK_LENGTH;
use cncforge_toolpath::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Before/after figures of one optimization
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationStats {
    pub original_lines: usize,
    pub optimized_lines: usize,
    /// `max(0, (1 - optimized / original) * 100)`
    pub reduction_percent: f64,
    /// Seconds saved, estimated from removed motion lines at the dominant feed
    pub estimated_time_reduction: f64,
}

fn motion_lines<'a>(lines: impl Iterator<Item = &'a str>) -> usize {
    lines
        .enumerate()
        .filter_map(|(i, raw)| tokenize(i + 1, raw))
        .filter(|line| line.has_axis_words())
        .count()
}

/// Most frequent F value of a program; ties go to the lower feed
pub fn dominant_feed(source: &str) -> Option<f64> {
    let mut counts: BTreeMap<i64, (usize, f64)> = BTreeMap::new();
    for line in source
        .lines()
        .enumerate()
        .filter_map(|(i, raw)| tokenize(i + 1, raw))
    {
        if let Some(feed) = line.value('F').filter(|f| *f > 0.0) {
            let entry = counts.entry((feed * 1000.0).round() as i64).or_insert((0, feed));
            entry.0 += 1;
        }
    }
    counts
        .values()
        .fold(None, |best: Option<(usize, f64)>, &(count, feed)| match best {
            Some((best_count, _)) if best_count >= count => best,
            _ => Some((count, feed)),
        })
        .map(|(_, feed)| feed)
}

impl OptimizationStats {
    /// Compare the source with the rewritten text
    ///
    /// `iso_lines` is the rewritten program in ISO form, which differs from
    /// `optimized` only for conversational output.
    pub fn compute(source: &str, optimized: &str, iso_lines: &[String]) -> Self {
        let original_lines = source.lines().count();
        let optimized_lines = optimized.lines().count();
        let reduction_percent = if original_lines == 0 {
            0.0
        } else {
            ((1.0 - optimized_lines as f64 / original_lines as f64) * 100.0).max(0.0)
        };

        let removed = motion_lines(source.lines())
            .saturating_sub(motion_lines(iso_lines.iter().map(String::as_str)));
        let estimated_time_reduction = match dominant_feed(source) {
            Some(feed) => removed as f64 * NOMINAL_BLOCK_LENGTH / feed * 60.0,
            None => 0.0,
        };

        Self {
            original_lines,
            optimized_lines,
            reduction_percent,
            estimated_time_reduction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(String::from).collect()
    }

    #[test]
    fn test_dominant_feed() {
        assert_eq!(dominant_feed("G1 X1 F100\nG1 X2 F200\nG1 X3 F200"), Some(200.0));
        assert_eq!(dominant_feed("G1 X1 F300\nG1 X2 F100"), Some(100.0));
        assert_eq!(dominant_feed("G0 X1"), None);
    }

    #[test]
    fn test_reduction_and_time() {
        let source = "G90\nG0 X0\nG0 X0\nG1 X10 F120\nG1 X10";
        let optimized = "G90\nG0 X0\nG1 X10 F120";
        let stats = OptimizationStats::compute(source, optimized, &lines(optimized));
        assert_eq!(stats.original_lines, 5);
        assert_eq!(stats.optimized_lines, 3);
        assert!((stats.reduction_percent - 40.0).abs() < 1e-9);
        // two motion lines removed at F120: 2 * 1 / 120 min
        assert!((stats.estimated_time_reduction - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_growth_is_not_negative() {
        let stats = OptimizationStats::compute("G0 X1", "G0 X1\nM30", &lines("G0 X1\nM30"));
        assert_eq!(stats.reduction_percent, 0.0);
        assert_eq!(stats.estimated_time_reduction, 0.0);
    }
}
