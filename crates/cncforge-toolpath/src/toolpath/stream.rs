//! Lazy toolpath iteration

use cncforge_core::ProgramError;
use std::collections::VecDeque;
use std::iter::Enumerate;
use std::str::Lines;

use super::ToolpathPoint;
use crate::config::ToolpathConfig;
use crate::diagnostics::ParseWarning;
use crate::gcode::{
    expand_cycle, expand_shape, has_executable_lines, interpolate_arc, resolve_line, tokenize,
    ModalState, Motion, Step,
};

/// Iterator over the toolpath of a program
///
/// Resolves one source line at a time and buffers only that line's
/// expansion, so peak memory is bounded by the largest single expansion
/// rather than by program length.
pub struct ToolpathStream<'a> {
    lines: Enumerate<Lines<'a>>,
    state: ModalState,
    config: ToolpathConfig,
    buffer: VecDeque<ToolpathPoint>,
    warnings: Vec<ParseWarning>,
}

impl<'a> ToolpathStream<'a> {
    pub fn new(text: &'a str, config: ToolpathConfig) -> Result<Self, ProgramError> {
        if !has_executable_lines(text) {
            return Err(ProgramError::Empty);
        }
        Ok(Self {
            lines: text.lines().enumerate(),
            state: ModalState::new(),
            config,
            buffer: VecDeque::new(),
            warnings: Vec::new(),
        })
    }

    /// Warnings recorded so far. Complete once the stream is drained.
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<ParseWarning> {
        self.warnings
    }

    /// Modal state after the last consumed line
    pub fn state(&self) -> &ModalState {
        &self.state
    }

    fn expand(&mut self, step: Step) {
        match step {
            Step::Idle => {}
            Step::Motion(Motion::Rapid { end, line }) => {
                self.buffer.push_back(ToolpathPoint::rapid(end, line));
            }
            Step::Motion(Motion::Linear { end, feed, line }) => {
                self.buffer.push_back(ToolpathPoint::linear(end, feed, line));
            }
            Step::Motion(Motion::Arc(arc)) => {
                let points = interpolate_arc(&arc, self.config.resolution());
                self.buffer.extend(
                    points
                        .into_iter()
                        .skip(1)
                        .map(|at| ToolpathPoint::arc(at, &arc)),
                );
            }
            Step::Motion(Motion::Dwell { at, line, .. }) => {
                self.buffer.push_back(ToolpathPoint::dwell(at, line));
            }
            Step::Motion(Motion::Shape(request)) => {
                let expansion = expand_shape(&request, &self.config);
                self.buffer.extend(expansion.points);
                self.warnings.extend(expansion.warnings);
            }
            Step::Cycle(cycle) => {
                let expansion = expand_cycle(&cycle, &self.config);
                self.buffer.extend(expansion.points);
                self.warnings.extend(expansion.warnings);
            }
        }
    }
}

impl Iterator for ToolpathStream<'_> {
    type Item = ToolpathPoint;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(point) = self.buffer.pop_front() {
                return Some(point);
            }
            let (index, raw) = self.lines.next()?;
            let Some(line) = tokenize(index + 1, raw) else {
                continue;
            };
            let resolution = resolve_line(std::mem::take(&mut self.state), &line);
            self.state = resolution.state;
            self.warnings.extend(resolution.warnings);
            self.expand(resolution.step);
        }
    }
}
