//! Motion resolver
//!
//! Combines one tokenized line with the incoming modal state and yields the
//! next state plus what the line asks the machine to do.

use glam::{DVec2, DVec3};

use super::arc::{resolve_arc, ArcDirection, ArcMove, CenterSpec};
use super::cycles::FixedCycle;
use super::modal::{ActiveCycle, ModalState, MotionMode};
use super::shapes::ShapeRequest;
use super::tokenizer::{MotionClass, ProgramLine};
use crate::diagnostics::ParseWarning;

/// A single resolved motion
#[derive(Debug, Clone, PartialEq)]
pub enum Motion {
    Rapid {
        end: DVec3,
        line: usize,
    },
    Linear {
        end: DVec3,
        feed: Option<f64>,
        line: usize,
    },
    Arc(ArcMove),
    Dwell {
        at: DVec3,
        seconds: f64,
        line: usize,
    },
    Shape(ShapeRequest),
}

impl Motion {
    /// Position of the tool once the motion completes
    pub fn end(&self) -> DVec3 {
        match self {
            Self::Rapid { end, .. } | Self::Linear { end, .. } => *end,
            Self::Arc(arc) => arc.end,
            Self::Dwell { at, .. } => *at,
            Self::Shape(shape) => shape.end_position(),
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Self::Rapid { line, .. } | Self::Linear { line, .. } | Self::Dwell { line, .. } => {
                *line
            }
            Self::Arc(arc) => arc.line,
            Self::Shape(shape) => shape.line,
        }
    }

    pub fn feed(&self) -> Option<f64> {
        match self {
            Self::Rapid { .. } | Self::Dwell { .. } => None,
            Self::Linear { feed, .. } => *feed,
            Self::Arc(arc) => arc.feed,
            Self::Shape(shape) => shape.feed,
        }
    }
}

/// What one line resolves to
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Mode changes only; the tool does not move
    Idle,
    Motion(Motion),
    /// Handed to the cycle expander
    Cycle(FixedCycle),
}

/// Output of [`resolve_line`]
#[derive(Debug, Clone)]
pub struct Resolution {
    /// State after the line
    pub state: ModalState,
    pub step: Step,
    pub warnings: Vec<ParseWarning>,
}

/// Resolve one line against `state`
///
/// The incoming state is consumed and the updated one returned, so the
/// caller threads it through the program strictly in line order.
pub fn resolve_line(state: ModalState, line: &ProgramLine) -> Resolution {
    let mut next = state;
    let mut warnings = Vec::new();
    next.apply_modes(line);

    let step = match line.motion_class() {
        MotionClass::Arc(direction) => {
            if line.has_axis_words() || has_center_words(&next, line) {
                arc_or_linear(&next, line, direction, &mut warnings)
            } else {
                Step::Idle
            }
        }
        MotionClass::Linear { rapid } => {
            if line.has_axis_words() {
                straight(&next, line, rapid)
            } else {
                Step::Idle
            }
        }
        MotionClass::Cycle(code) => {
            let active = ActiveCycle::from_line(code, line);
            cycle_step(&mut next, active, line, &mut warnings)
        }
        MotionClass::Shape(kind) => match ShapeRequest::from_line(kind, &next, line) {
            Ok(request) => Step::Motion(Motion::Shape(request)),
            Err(warning) => {
                warnings.push(warning);
                Step::Idle
            }
        },
        MotionClass::Dwell => {
            let seconds = line.value('P').or_else(|| line.value('X')).unwrap_or(0.0);
            Step::Motion(Motion::Dwell {
                at: next.position,
                seconds,
                line: line.number,
            })
        }
        MotionClass::NonMotion(key) => {
            if line.has_axis_words() {
                warnings.push(ParseWarning::new(
                    line.number,
                    format!("axis words on G{} ignored", key / 10),
                ));
            }
            Step::Idle
        }
        MotionClass::ModalOnly => {
            if !line.has_axis_words() {
                Step::Idle
            } else if let Some(active) = next.cycle {
                cycle_step(&mut next, active.updated_by(line), line, &mut warnings)
            } else {
                match next.motion {
                    MotionMode::Rapid => straight(&next, line, true),
                    MotionMode::Linear => straight(&next, line, false),
                    MotionMode::ArcCw => {
                        arc_or_linear(&next, line, ArcDirection::Clockwise, &mut warnings)
                    }
                    MotionMode::ArcCcw => {
                        arc_or_linear(&next, line, ArcDirection::CounterClockwise, &mut warnings)
                    }
                }
            }
        }
    };

    match &step {
        Step::Idle => {}
        Step::Motion(motion) => next.position = motion.end(),
        Step::Cycle(cycle) => next.position = cycle.end_position(),
    }

    tracing::trace!("line {}: {:?}", line.number, step);

    Resolution {
        state: next,
        step,
        warnings,
    }
}

fn straight(state: &ModalState, line: &ProgramLine, rapid: bool) -> Step {
    let end = state.resolve_target(line);
    let motion = if rapid {
        Motion::Rapid {
            end,
            line: line.number,
        }
    } else {
        Motion::Linear {
            end,
            feed: state.feed_rate,
            line: line.number,
        }
    };
    Step::Motion(motion)
}

fn has_center_words(state: &ModalState, line: &ProgramLine) -> bool {
    let (a, b) = state.plane.offset_letters();
    line.has(a) || line.has(b) || line.has('R')
}

fn center_spec(state: &ModalState, line: &ProgramLine) -> Option<CenterSpec> {
    let (a, b) = state.plane.offset_letters();
    match (line.value(a), line.value(b), line.value('R')) {
        (None, None, Some(r)) => Some(CenterSpec::Radius(r)),
        (None, None, None) => None,
        (i, j, _) => Some(CenterSpec::Offsets(DVec2::new(
            i.unwrap_or(0.0),
            j.unwrap_or(0.0),
        ))),
    }
}

fn arc_or_linear(
    state: &ModalState,
    line: &ProgramLine,
    direction: ArcDirection,
    warnings: &mut Vec<ParseWarning>,
) -> Step {
    let end = state.resolve_target(line);
    let linear = Motion::Linear {
        end,
        feed: state.feed_rate,
        line: line.number,
    };

    let Some(center) = center_spec(state, line) else {
        warnings.push(ParseWarning::new(
            line.number,
            format!(
                "G{} without center offsets or radius, treated as linear move",
                direction.g_code()
            ),
        ));
        return Step::Motion(linear);
    };

    match resolve_arc(
        state.position,
        end,
        center,
        direction,
        state.plane,
        state.feed_rate,
        line.number,
        warnings,
    ) {
        Some(arc) => Step::Motion(Motion::Arc(arc)),
        None => Step::Motion(linear),
    }
}

fn cycle_step(
    state: &mut ModalState,
    active: ActiveCycle,
    line: &ProgramLine,
    warnings: &mut Vec<ParseWarning>,
) -> Step {
    let (cycle, cycle_warnings) = FixedCycle::resolve(state, &active, line);
    warnings.extend(cycle_warnings);
    state.cycle = Some(active);
    Step::Cycle(cycle)
}
