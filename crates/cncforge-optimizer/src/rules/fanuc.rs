//! Fanuc branch: corner rounding, smoothing brackets, number formatting

use cncforge_toolpath::{resolve_line, ModalState, Motion, Step};
use glam::DVec3;

use crate::block::{Block, WordSpan};
use crate::format::{compact_code, compact_value, format_number, with_decimal_point};
use crate::options::OptimizationOptions;
use crate::pipeline::OptimizationRule;

/// Code key of G05.1
const SMOOTHING_KEY: u32 = 51;

/// Letters whose values take a decimal point on Fanuc
const DECIMAL_LETTERS: [char; 9] = ['X', 'Y', 'Z', 'I', 'J', 'K', 'R', 'Q', 'F'];

/// Feed-move direction of each line, None for everything else
fn feed_directions(lines: &[String]) -> Vec<Option<DVec3>> {
    let mut state = ModalState::new();
    lines
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let line = cncforge_toolpath::tokenize(i + 1, raw)?;
            let start = state.position;
            let resolution = resolve_line(std::mem::take(&mut state), &line);
            state = resolution.state;
            match resolution.step {
                Step::Motion(Motion::Linear { end, .. }) if end.distance(start) > 1e-9 => {
                    Some((end - start).normalize())
                }
                _ => None,
            }
        })
        .collect()
}

/// Insert text at the end of the code part, ahead of any comment
fn append_word(raw: &str, word: &str) -> String {
    let cut = raw.find(['(', ';']).unwrap_or(raw.len());
    let (code, comment) = raw.split_at(cut);
    if comment.is_empty() {
        format!("{} {}", code.trim_end(), word)
    } else {
        format!("{} {} {}", code.trim_end(), word, comment)
    }
}

pub struct CornerRoundingRule;

impl OptimizationRule for CornerRoundingRule {
    fn name(&self) -> &str {
        "fanuc_corner_rounding"
    }

    fn description(&self) -> &str {
        "Added ,R corner rounding between feed moves"
    }

    fn is_enabled(&self, options: &OptimizationOptions) -> bool {
        options.is_fanuc() && options.fanuc().corner_rounding
    }

    fn apply(&self, lines: &[String], options: &OptimizationOptions) -> Vec<String> {
        let directions = feed_directions(lines);
        let radius = format_number(options.fanuc().corner_radius, options.decimal_places());

        lines
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                let next = directions.get(i + 1).copied().flatten();
                let corner = match (directions[i], next) {
                    (Some(a), Some(b)) => a.dot(b) < 1.0 - 1e-9,
                    _ => false,
                };
                if corner && !Block::parse(i + 1, raw).has_corner_word() {
                    append_word(raw, &format!(",R{}", radius))
                } else {
                    raw.clone()
                }
            })
            .collect()
    }

    fn summarize(&self, before: &[String], after: &[String]) -> String {
        let added = before
            .iter()
            .zip(after)
            .filter(|(b, a)| b != a)
            .count();
        format!("Added corner rounding to {} block(s)", added)
    }
}

pub struct SmoothingRule;

impl OptimizationRule for SmoothingRule {
    fn name(&self) -> &str {
        "fanuc_smoothing"
    }

    fn description(&self) -> &str {
        "Bracketed the program with G05.1 smoothing"
    }

    fn is_enabled(&self, options: &OptimizationOptions) -> bool {
        let fanuc = options.fanuc();
        options.is_fanuc() && (fanuc.contour_smoothing || fanuc.nano_smoothing)
    }

    fn apply(&self, lines: &[String], options: &OptimizationOptions) -> Vec<String> {
        let blocks: Vec<Block<'_>> = lines
            .iter()
            .enumerate()
            .map(|(i, raw)| Block::parse(i + 1, raw))
            .collect();

        if blocks.iter().any(|b| b.g_keys().contains(&SMOOTHING_KEY)) {
            return lines.to_vec();
        }
        let Some(first_motion) = blocks
            .iter()
            .position(|b| b.line.as_ref().is_some_and(|l| l.has_axis_words()))
        else {
            return lines.to_vec();
        };
        let end = blocks
            .iter()
            .position(|b| {
                b.line
                    .as_ref()
                    .is_some_and(|l| l.m_codes().any(|m| m == 30 || m == 2))
            })
            .or_else(|| {
                lines
                    .last()
                    .filter(|l| l.trim() == "%")
                    .map(|_| lines.len() - 1)
            })
            .filter(|end| *end > first_motion)
            .unwrap_or(lines.len());

        let mode = if options.fanuc().nano_smoothing { 3 } else { 1 };
        let mut out = Vec::with_capacity(lines.len() + 2);
        out.extend_from_slice(&lines[..first_motion]);
        out.push(format!("G05.1 Q{}", mode));
        out.extend_from_slice(&lines[first_motion..end]);
        out.push("G05.1 Q0".to_string());
        out.extend_from_slice(&lines[end..]);
        out
    }
}

pub struct FormatRule;

impl FormatRule {
    fn word(span: &WordSpan, text: &str, raw: &str, compact: bool, decimal: bool) -> String {
        let value = &raw[span.value_range.clone()];
        let prefix = if span.corner { "," } else { "" };
        let takes_point = DECIMAL_LETTERS.contains(&span.letter);

        let value = match span.letter {
            'G' | 'M' if compact && !span.corner => compact_code(value),
            _ if takes_point && compact => compact_value(value, decimal || value.contains('.')),
            _ if takes_point && decimal => with_decimal_point(value),
            _ if compact => value.to_string(),
            _ => return text.to_string(),
        };
        format!("{}{}{}", prefix, span.letter, value)
    }
}

impl OptimizationRule for FormatRule {
    fn name(&self) -> &str {
        "fanuc_format"
    }

    fn description(&self) -> &str {
        "Applied Fanuc number formatting"
    }

    fn is_enabled(&self, options: &OptimizationOptions) -> bool {
        let fanuc = options.fanuc();
        options.is_fanuc() && (fanuc.compact_format || fanuc.decimal_format)
    }

    fn apply(&self, lines: &[String], options: &OptimizationOptions) -> Vec<String> {
        let compact = options.fanuc().compact_format;
        let decimal = options.fanuc().decimal_format;

        lines
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                let block = Block::parse(i + 1, raw);
                if block.spans.is_empty() {
                    return raw.clone();
                }
                // G05.1 takes an integer mode in Q
                let smoothing = block.g_keys().contains(&SMOOTHING_KEY);
                block.rewrite(compact, |span, text| {
                    let decimal = decimal && !(smoothing && span.letter == 'Q');
                    Self::word(span, text, raw, compact, decimal)
                })
            })
            .collect()
    }
}
