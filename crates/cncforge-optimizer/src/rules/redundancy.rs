//! Redundancy elimination
//!
//! Drops motion lines that go nowhere and modal lines that only restate a
//! mode already set explicitly earlier in the program.

use cncforge_core::constants::COORD_TOLERANCE;
use cncforge_toolpath::{resolve_line, CycleCode, ModalState, Motion, MotionMode, Step};
use std::collections::BTreeMap;

use super::modal_group;
use crate::block::Block;
use crate::options::OptimizationOptions;
use crate::pipeline::OptimizationRule;

pub struct RedundancyRule;

/// Letters a droppable motion line may contain
const MOTION_LETTERS: [char; 5] = ['G', 'X', 'Y', 'Z', 'F'];

fn mode_key(mode: MotionMode) -> u32 {
    match mode {
        MotionMode::Rapid => 0,
        MotionMode::Linear => 10,
        MotionMode::ArcCw => 20,
        MotionMode::ArcCcw => 30,
    }
}

/// Pure modal line whose every code repeats the explicitly set mode
fn restates_modes(block: &Block<'_>, explicit: &BTreeMap<&'static str, u32>) -> bool {
    let keys = block.g_keys();
    !keys.is_empty()
        && !block.has_comment()
        && block.letters_within(&['G'])
        && keys.iter().all(|key| {
            modal_group(*key).is_some_and(|group| explicit.get(group) == Some(key))
        })
}

/// Motion line that neither moves the tool nor changes any mode
fn goes_nowhere(block: &Block<'_>, before: &ModalState, step: &Step) -> bool {
    let Some(line) = block.line.as_ref() else {
        return false;
    };
    if block.has_comment() || !block.letters_within(&MOTION_LETTERS) || before.cycle.is_some() {
        return false;
    }
    if !line.has_axis_words() {
        return false;
    }
    let current_mode = mode_key(before.motion);
    if !block.g_keys().iter().all(|k| *k == current_mode) {
        return false;
    }
    if let Some(feed) = line.value('F') {
        if before.feed_rate != Some(feed) {
            return false;
        }
    }
    match step {
        Step::Motion(Motion::Rapid { end, .. }) | Step::Motion(Motion::Linear { end, .. }) => {
            end.distance(before.position) < COORD_TOLERANCE * 1e-3
        }
        _ => false,
    }
}

impl OptimizationRule for RedundancyRule {
    fn name(&self) -> &str {
        "redundancy"
    }

    fn description(&self) -> &str {
        "Removed redundant blocks"
    }

    fn is_enabled(&self, options: &OptimizationOptions) -> bool {
        options.remove_redundant()
    }

    fn apply(&self, lines: &[String], _options: &OptimizationOptions) -> Vec<String> {
        let mut state = ModalState::new();
        let mut explicit: BTreeMap<&'static str, u32> = BTreeMap::new();
        let mut out = Vec::with_capacity(lines.len());

        for (i, raw) in lines.iter().enumerate() {
            let block = Block::parse(i + 1, raw);
            let Some(line) = block.line.as_ref() else {
                out.push(raw.clone());
                continue;
            };

            if restates_modes(&block, &explicit) {
                tracing::trace!("line {}: restated mode dropped", i + 1);
                continue;
            }
            for key in line.g_codes() {
                if let Some(group) = modal_group(key) {
                    explicit.insert(group, key);
                } else if CycleCode::from_key(key).is_some() {
                    explicit.insert("cycle", key);
                }
            }

            let resolution = resolve_line(state.clone(), line);
            if goes_nowhere(&block, &state, &resolution.step) {
                tracing::trace!("line {}: zero-length move dropped", i + 1);
                continue;
            }
            state = resolution.state;
            out.push(raw.clone());
        }
        out
    }

    fn summarize(&self, before: &[String], after: &[String]) -> String {
        format!(
            "Removed {} redundant block(s)",
            before.len().saturating_sub(after.len())
        )
    }
}
