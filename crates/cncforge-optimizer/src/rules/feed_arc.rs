//! Feed rate normalization and arc fitting

use cncforge_core::{Plane, PositioningMode};
use cncforge_toolpath::{resolve_line, CycleCode, ModalState, Motion, MotionMode, Step};
use glam::{DVec2, DVec3};
use std::f64::consts::TAU;

use crate::block::Block;
use crate::format::format_number;
use crate::options::OptimizationOptions;
use crate::pipeline::OptimizationRule;

pub struct FeedRateRule;

impl OptimizationRule for FeedRateRule {
    fn name(&self) -> &str {
        "feed_rates"
    }

    fn description(&self) -> &str {
        "Clamped feed rates and removed repeated F words"
    }

    fn is_enabled(&self, options: &OptimizationOptions) -> bool {
        options.optimize_feed_rates()
    }

    fn apply(&self, lines: &[String], options: &OptimizationOptions) -> Vec<String> {
        let limits = options.feed_limits();
        let mut modal: Option<f64> = None;
        let mut out = Vec::with_capacity(lines.len());

        for (i, raw) in lines.iter().enumerate() {
            let block = Block::parse(i + 1, raw);
            let Some(index) = block.find('F') else {
                out.push(raw.clone());
                continue;
            };
            let value = block.spans[index].value;
            let clamped = limits.clamp(value);

            if modal.is_some_and(|m| (m - clamped).abs() < 1e-9) {
                let text = block.without_span(index);
                if !text.is_empty() {
                    out.push(text);
                }
                continue;
            }
            modal = Some(clamped);
            if (clamped - value).abs() > 1e-9 {
                tracing::debug!("line {}: feed {} clamped to {}", i + 1, value, clamped);
                let text = format_number(clamped, options.decimal_places());
                out.push(block.with_value(index, &text));
            } else {
                out.push(raw.clone());
            }
        }
        out
    }
}

/// Shortest line chain worth replacing with an arc
const MIN_ARC_RUN: usize = 4;

/// Fits beyond this radius are treated as straight lines
const MAX_FIT_RADIUS: f64 = 1e5;

pub struct ArcFitRule;

#[derive(Debug, Clone, Copy)]
struct Segment {
    start: DVec3,
    end: DVec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Fit {
    center: DVec2,
    clockwise: bool,
}

/// Per-line facts gathered in one pass over the program
struct LineFacts {
    segment: Option<Segment>,
    /// Relies on a modal G1 from an earlier line
    modal_linear: bool,
    /// Programs its own motion mode or cycle
    sets_motion: bool,
}

const MOTION_KEYS: [u32; 4] = [0, 10, 20, 30];

fn gather(lines: &[String]) -> Vec<LineFacts> {
    let mut state = ModalState::new();
    lines
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let block = Block::parse(i + 1, raw);
            let Some(line) = block.line.as_ref() else {
                return LineFacts {
                    segment: None,
                    modal_linear: false,
                    sets_motion: false,
                };
            };
            let keys = block.g_keys();
            let before = state.clone();
            let resolution = resolve_line(state.clone(), line);
            state = resolution.state;

            let linear_end = match resolution.step {
                Step::Motion(Motion::Linear { end, .. }) => Some(end),
                _ => None,
            };
            let explicit_motion = keys
                .iter()
                .any(|k| MOTION_KEYS.contains(k) || CycleCode::from_key(*k).is_some());
            let plain_g1 = if keys.is_empty() {
                before.motion == MotionMode::Linear
            } else {
                keys.iter().all(|k| *k == 10)
            };
            let segment = linear_end
                .filter(|end| end.distance(before.position) > 1e-9)
                .filter(|_| {
                    plain_g1
                        && !block.has_comment()
                        && block.letters_within(&['G', 'X', 'Y'])
                        && before.positioning == PositioningMode::Absolute
                        && before.plane == Plane::XY
                        && before.cycle.is_none()
                })
                .map(|end| Segment {
                    start: before.position,
                    end,
                });

            LineFacts {
                segment,
                modal_linear: linear_end.is_some() && !explicit_motion,
                sets_motion: explicit_motion,
            }
        })
        .collect()
}

fn circumcenter(a: DVec2, b: DVec2, c: DVec2) -> Option<DVec2> {
    let (b, c) = (b - a, c - a);
    let d = 2.0 * b.perp_dot(c);
    if d.abs() < 1e-12 {
        return None;
    }
    let (bb, cc) = (b.length_squared(), c.length_squared());
    let ux = (c.y * bb - b.y * cc) / d;
    let uy = (b.x * cc - c.x * bb) / d;
    Some(a + DVec2::new(ux, uy))
}

/// Fit one arc through every point, each chord within `tolerance`
fn fit_arc(points: &[DVec2], tolerance: f64) -> Option<Fit> {
    let n = points.len();
    if n < MIN_ARC_RUN + 1 {
        return None;
    }
    let center = circumcenter(points[0], points[n / 2], points[n - 1])?;
    let radius = points[0].distance(center);
    if radius <= tolerance || radius > MAX_FIT_RADIUS {
        return None;
    }
    if points
        .iter()
        .any(|p| (p.distance(center) - radius).abs() > tolerance)
    {
        return None;
    }

    let mut sweep = 0.0;
    let mut turn = 0.0;
    for pair in points.windows(2) {
        let half = pair[0].distance(pair[1]) / 2.0;
        if half >= radius || radius - (radius * radius - half * half).sqrt() > tolerance {
            return None;
        }
        let (u, v) = (pair[0] - center, pair[1] - center);
        let angle = u.perp_dot(v).atan2(u.dot(v));
        if angle.abs() < 1e-12 || (turn != 0.0 && angle.signum() != turn) {
            return None;
        }
        turn = angle.signum();
        sweep += angle;
    }
    if sweep.abs() >= TAU - 1e-9 {
        return None;
    }
    Some(Fit {
        center,
        clockwise: turn < 0.0,
    })
}

/// Longest run of segments starting at `first` that fits one arc
fn longest_fit(facts: &[LineFacts], first: usize, tolerance: f64) -> Option<(usize, Fit)> {
    let start = facts[first].segment?;
    let mut points = vec![start.start.truncate(), start.end.truncate()];
    let mut previous = start.end;
    let mut best = None;

    for (last, fact) in facts.iter().enumerate().skip(first + 1) {
        let Some(segment) = fact.segment else {
            break;
        };
        if segment.start.distance(previous) > 1e-9 {
            break;
        }
        points.push(segment.end.truncate());
        previous = segment.end;
        if last + 1 - first < MIN_ARC_RUN {
            continue;
        }
        match fit_arc(&points, tolerance) {
            Some(fit) => best = Some((last, fit)),
            None => break,
        }
    }
    best
}

fn arc_line(
    lines: &[String],
    facts: &[LineFacts],
    first: usize,
    last: usize,
    fit: Fit,
    places: u8,
) -> Option<String> {
    let start = facts[first].segment?.start;
    let end = facts[last].segment?.end;
    let block = Block::parse(last + 1, &lines[last]);
    let word = |letter: char, value: f64| match block.find(letter) {
        Some(index) => block.raw[block.spans[index].range.clone()].trim().to_string(),
        None => format!("{}{}", letter, format_number(value, places)),
    };
    Some(format!(
        "{} {} {} I{} J{}",
        if fit.clockwise { "G2" } else { "G3" },
        word('X', end.x),
        word('Y', end.y),
        format_number(fit.center.x - start.x, places),
        format_number(fit.center.y - start.y, places),
    ))
}

impl OptimizationRule for ArcFitRule {
    fn name(&self) -> &str {
        "arc_fitting"
    }

    fn description(&self) -> &str {
        "Replaced line chains with arcs"
    }

    fn is_enabled(&self, options: &OptimizationOptions) -> bool {
        options.simplify_arcs()
    }

    fn apply(&self, lines: &[String], options: &OptimizationOptions) -> Vec<String> {
        let facts = gather(lines);
        let mut out = Vec::with_capacity(lines.len());
        let mut restore_linear = false;
        let mut i = 0;

        while i < lines.len() {
            let fitted = longest_fit(&facts, i, options.arc_tolerance()).and_then(|(last, fit)| {
                arc_line(lines, &facts, i, last, fit, options.decimal_places())
                    .map(|text| (last, text))
            });
            if let Some((last, text)) = fitted {
                tracing::trace!("lines {}-{} fitted as one arc", i + 1, last + 1);
                out.push(text);
                restore_linear = true;
                i = last + 1;
                continue;
            }

            let fact = &facts[i];
            if restore_linear && fact.modal_linear {
                out.push(format!("G1 {}", lines[i]));
                restore_linear = false;
            } else {
                if fact.sets_motion {
                    restore_linear = false;
                }
                out.push(lines[i].clone());
            }
            i += 1;
        }
        out
    }

    fn summarize(&self, before: &[String], after: &[String]) -> String {
        format!(
            "Replaced {} line segment(s) with arcs",
            before.len().saturating_sub(after.len())
        )
    }
}
