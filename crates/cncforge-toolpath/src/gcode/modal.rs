//! Modal state tracker
//!
//! Persistent program context carried from line to line until a code
//! changes it. The state is a plain value: each resolution step takes one
//! and hands back the next, so nothing can observe it out of line order.

use cncforge_core::{Plane, PositioningMode};
use glam::DVec3;

use super::cycles::CycleCode;
use super::tokenizer::ProgramLine;

/// Sticky motion group (G0 / G1 / G2 / G3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionMode {
    #[default]
    Rapid,
    Linear,
    ArcCw,
    ArcCcw,
}

impl MotionMode {
    fn from_key(key: u32) -> Option<Self> {
        match key {
            0 => Some(Self::Rapid),
            10 => Some(Self::Linear),
            20 => Some(Self::ArcCw),
            30 => Some(Self::ArcCcw),
            _ => None,
        }
    }
}

/// A canned cycle kept active between lines
///
/// The raw Z/R/Q/P words are kept so that repeat lines resolve them against
/// the state at the time of the repeat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveCycle {
    pub code: CycleCode,
    pub z: Option<f64>,
    pub r: Option<f64>,
    pub q: Option<f64>,
    pub p: Option<f64>,
}

impl ActiveCycle {
    /// Merge the words of a repeat line into the stored cycle words
    pub fn updated_by(&self, line: &ProgramLine) -> Self {
        Self {
            code: self.code,
            z: line.value('Z').or(self.z),
            r: line.value('R').or(self.r),
            q: line.value('Q').or(self.q),
            p: line.value('P').or(self.p),
        }
    }

    pub fn from_line(code: CycleCode, line: &ProgramLine) -> Self {
        Self {
            code,
            z: line.value('Z'),
            r: line.value('R'),
            q: line.value('Q'),
            p: line.value('P'),
        }
    }
}

/// Program context threaded through every resolution step
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModalState {
    pub positioning: PositioningMode,
    pub plane: Plane,
    pub position: DVec3,
    /// Active feed rate (F is modal)
    pub feed_rate: Option<f64>,
    pub motion: MotionMode,
    pub cycle: Option<ActiveCycle>,
    pub spindle_speed: Option<f64>,
    pub tool: Option<u32>,
}

impl ModalState {
    /// Initial state: absolute, XY plane, origin, no feed, rapid, no cycle
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the mode-setting words of a line
    ///
    /// Handles G90/G91, G17/G18/G19, G80, the sticky motion group, and the
    /// F/S/T words. Never touches the position.
    pub fn apply_modes(&mut self, line: &ProgramLine) {
        for key in line.g_codes() {
            match key {
                900 => self.positioning = PositioningMode::Absolute,
                910 => self.positioning = PositioningMode::Incremental,
                170 => self.plane = Plane::XY,
                180 => self.plane = Plane::ZX,
                190 => self.plane = Plane::YZ,
                800 => self.cycle = None,
                k => {
                    if let Some(mode) = MotionMode::from_key(k) {
                        self.motion = mode;
                        self.cycle = None;
                    }
                }
            }
        }

        if let Some(feed) = line.value('F') {
            self.feed_rate = Some(feed);
        }
        if let Some(speed) = line.value('S') {
            self.spindle_speed = Some(speed);
        }
        if let Some(tool) = line.value('T') {
            self.tool = Some(tool.abs().round() as u32);
        }
    }

    /// Resolve one axis word against the current value
    pub fn resolve_axis(&self, current: f64, word: Option<f64>) -> f64 {
        match (self.positioning, word) {
            (PositioningMode::Absolute, Some(value)) => value,
            (PositioningMode::Incremental, Some(delta)) => current + delta,
            (_, None) => current,
        }
    }

    /// Target position named by the line's X/Y/Z words
    pub fn resolve_target(&self, line: &ProgramLine) -> DVec3 {
        DVec3::new(
            self.resolve_axis(self.position.x, line.value('X')),
            self.resolve_axis(self.position.y, line.value('Y')),
            self.resolve_axis(self.position.z, line.value('Z')),
        )
    }

    pub fn is_incremental(&self) -> bool {
        self.positioning == PositioningMode::Incremental
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcode::cycles::CycleKind;
    use crate::gcode::tokenizer::tokenize;

    fn line(text: &str) -> ProgramLine {
        tokenize(1, text).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let state = ModalState::new();
        assert_eq!(state.positioning, PositioningMode::Absolute);
        assert_eq!(state.plane, Plane::XY);
        assert_eq!(state.position, DVec3::ZERO);
        assert_eq!(state.feed_rate, None);
        assert_eq!(state.motion, MotionMode::Rapid);
        assert!(state.cycle.is_none());
    }

    #[test]
    fn test_mode_words() {
        let mut state = ModalState::new();
        state.apply_modes(&line("G91 G18 G1 F250 S12000 T3"));
        assert!(state.is_incremental());
        assert_eq!(state.plane, Plane::ZX);
        assert_eq!(state.motion, MotionMode::Linear);
        assert_eq!(state.feed_rate, Some(250.0));
        assert_eq!(state.spindle_speed, Some(12000.0));
        assert_eq!(state.tool, Some(3));
        assert_eq!(state.position, DVec3::ZERO);
    }

    #[test]
    fn test_absolute_target_keeps_missing_axes() {
        let mut state = ModalState::new();
        state.position = DVec3::new(1.0, 2.0, 3.0);
        let target = state.resolve_target(&line("G1 X10"));
        assert_eq!(target, DVec3::new(10.0, 2.0, 3.0));
    }

    #[test]
    fn test_incremental_target_adds_deltas() {
        let mut state = ModalState::new();
        state.position = DVec3::new(1.0, 2.0, 3.0);
        state.apply_modes(&line("G91"));
        let target = state.resolve_target(&line("G1 X10 Z-1"));
        assert_eq!(target, DVec3::new(11.0, 2.0, 2.0));
    }

    #[test]
    fn test_motion_codes_cancel_cycle() {
        let mut state = ModalState::new();
        state.cycle = Some(ActiveCycle::from_line(
            CycleCode::Known(CycleKind::Drilling),
            &line("G81 Z-5 R1"),
        ));
        state.apply_modes(&line("G0 Z10"));
        assert!(state.cycle.is_none());

        state.cycle = Some(ActiveCycle::from_line(
            CycleCode::Known(CycleKind::Drilling),
            &line("G81 Z-5 R1"),
        ));
        state.apply_modes(&line("G80"));
        assert!(state.cycle.is_none());
    }

    #[test]
    fn test_repeat_words_merge() {
        let active = ActiveCycle::from_line(
            CycleCode::Known(CycleKind::PeckDrilling),
            &line("G83 Z-20 R-2 Q5"),
        );
        let repeated = active.updated_by(&line("X10 Z-12"));
        assert_eq!(repeated.z, Some(-12.0));
        assert_eq!(repeated.r, Some(-2.0));
        assert_eq!(repeated.q, Some(5.0));
    }
}
