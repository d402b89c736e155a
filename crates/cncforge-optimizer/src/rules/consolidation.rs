//! Rapid chain merging and modal code merging

use cncforge_core::PositioningMode;
use cncforge_toolpath::{resolve_line, ModalState, Motion, MotionMode, Step};
use glam::DVec3;
use std::collections::BTreeSet;

use super::modal_group;
use crate::block::Block;
use crate::options::OptimizationOptions;
use crate::pipeline::OptimizationRule;

/// Minimum move length considered when testing direction
const MIN_MOVE: f64 = 1e-9;

pub struct RapidMergeRule;

/// A rapid already written to the output, open for extension
struct OpenRapid {
    index: usize,
    start: DVec3,
    end: DVec3,
}

/// `a -> b` continues `start -> a` in the same direction
fn continues(start: DVec3, a: DVec3, b: DVec3) -> bool {
    let first = a - start;
    let second = b - a;
    if first.length() < MIN_MOVE || second.length() < MIN_MOVE {
        return false;
    }
    let (u, v) = (first.normalize(), second.normalize());
    u.cross(v).length() < 1e-9 && u.dot(v) > 0.0
}

/// Rapid-only line in absolute mode: G0 and axis words, F only if it restates
fn is_pure_rapid(block: &Block<'_>, before: &ModalState, step: &Step) -> bool {
    let Some(line) = block.line.as_ref() else {
        return false;
    };
    if block.has_comment()
        || before.positioning != PositioningMode::Absolute
        || before.cycle.is_some()
        || !block.letters_within(&['G', 'X', 'Y', 'Z', 'F'])
    {
        return false;
    }
    let keys = block.g_keys();
    let rapid_code = if keys.is_empty() {
        before.motion == MotionMode::Rapid
    } else {
        keys.iter().all(|k| *k == 0)
    };
    let feed_kept = line.value('F').is_none_or(|f| before.feed_rate == Some(f));
    rapid_code && feed_kept && matches!(step, Step::Motion(Motion::Rapid { .. }))
}

impl OptimizationRule for RapidMergeRule {
    fn name(&self) -> &str {
        "merge_rapids"
    }

    fn description(&self) -> &str {
        "Merged collinear rapid moves"
    }

    fn is_enabled(&self, options: &OptimizationOptions) -> bool {
        options.merge_rapids()
    }

    fn apply(&self, lines: &[String], _options: &OptimizationOptions) -> Vec<String> {
        let mut state = ModalState::new();
        let mut out: Vec<String> = Vec::with_capacity(lines.len());
        let mut open: Option<OpenRapid> = None;

        for (i, raw) in lines.iter().enumerate() {
            let block = Block::parse(i + 1, raw);
            let Some(line) = block.line.as_ref() else {
                out.push(raw.clone());
                open = None;
                continue;
            };

            let before = state.clone();
            let resolution = resolve_line(state, line);
            state = resolution.state;

            if !is_pure_rapid(&block, &before, &resolution.step) {
                out.push(raw.clone());
                open = None;
                continue;
            }
            let end = state.position;

            match open.as_mut() {
                Some(prev) if continues(prev.start, prev.end, end) => {
                    let text = if block.g_keys().is_empty() {
                        format!("G0 {}", raw)
                    } else {
                        raw.clone()
                    };
                    out[prev.index] = text;
                    prev.end = end;
                }
                _ => {
                    out.push(raw.clone());
                    open = Some(OpenRapid {
                        index: out.len() - 1,
                        start: before.position,
                        end,
                    });
                }
            }
        }
        out
    }

    fn summarize(&self, before: &[String], after: &[String]) -> String {
        format!(
            "Merged {} collinear rapid move(s)",
            before.len().saturating_sub(after.len())
        )
    }
}

pub struct ModalMergeRule;

/// Modal groups of a pure modal line, or None if the line is anything else
fn modal_groups(block: &Block<'_>) -> Option<BTreeSet<&'static str>> {
    let keys = block.g_keys();
    if keys.is_empty() || block.has_comment() || !block.letters_within(&['G']) {
        return None;
    }
    let groups: Option<BTreeSet<_>> = keys.iter().map(|k| modal_group(*k)).collect();
    // two codes of one group on the same line is left alone
    groups.filter(|g| g.len() == keys.len())
}

impl OptimizationRule for ModalMergeRule {
    fn name(&self) -> &str {
        "merge_modal"
    }

    fn description(&self) -> &str {
        "Merged consecutive modal code lines"
    }

    fn is_enabled(&self, options: &OptimizationOptions) -> bool {
        options.merge_modal_codes()
    }

    fn apply(&self, lines: &[String], _options: &OptimizationOptions) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(lines.len());
        let mut pending: Option<(usize, BTreeSet<&'static str>)> = None;

        for (i, raw) in lines.iter().enumerate() {
            let block = Block::parse(i + 1, raw);
            let Some(groups) = modal_groups(&block) else {
                out.push(raw.clone());
                pending = None;
                continue;
            };

            match pending.as_mut() {
                Some((index, seen)) if seen.is_disjoint(&groups) => {
                    let merged = format!("{} {}", out[*index], raw.trim());
                    out[*index] = merged;
                    seen.extend(groups);
                }
                _ => {
                    out.push(raw.clone());
                    pending = Some((out.len() - 1, groups));
                }
            }
        }
        out
    }

    fn summarize(&self, before: &[String], after: &[String]) -> String {
        format!(
            "Merged {} modal line(s) into their neighbours",
            before.len().saturating_sub(after.len())
        )
    }
}
